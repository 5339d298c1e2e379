//! Read-only projections of board state for broadcast.
//!
//! The engine performs no I/O. The session layer serializes these views and
//! fans them out to every observer of a board: a full `BoardView` after
//! lifecycle changes, a minimal `Delta` after each successful move.

use crate::board::Phase;
use crate::player::Player;
use crate::point::Point;
use crate::tile::{Tile, TileColor, TileKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// A single move payload: either a destination cell or an opaque integer.
///
/// The integer arm is reserved for non-positional moves; every current tile
/// kind moves by point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Move {
    Point(Point),
    Scalar(i64),
}

impl Move {
    /// The destination cell, if this is a positional move.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Move::Point(p) => Some(*p),
            Move::Scalar(_) => None,
        }
    }
}

impl From<Point> for Move {
    fn from(p: Point) -> Self {
        Move::Point(p)
    }
}

/// Minimal per-move event broadcast after a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// The turn pointer after the move was applied.
    pub turn: u32,
    #[serde(rename = "move")]
    pub mv: Move,
}

/// Rendering hook for one tile kind. Asset resolution is the static-serving
/// layer's concern; the engine leaves it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    #[serde(rename = "script_url", default)]
    pub script_url: String,
}

/// One palette slot per tile kind.
pub fn standard_palette() -> HashMap<TileKind, PaletteEntry> {
    TileKind::ALL
        .iter()
        .map(|&kind| (kind, PaletteEntry::default()))
        .collect()
}

/// One tile as observers see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileView {
    #[serde(rename = "tile_type")]
    pub kind: TileKind,
    pub open: bool,
    /// Omitted when colorless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TileColor>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl TileView {
    pub fn from_tile(tile: &Tile) -> Self {
        let mut data = tile.data.clone();
        if tile.energy > 0 {
            data.insert("energy".to_string(), json!(tile.energy));
        }
        Self {
            kind: tile.kind,
            open: tile.open,
            color: (tile.color != TileColor::ColorLess).then_some(tile.color),
            data,
        }
    }
}

/// One seat as observers see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub nickname: String,
    pub position: Point,
    /// False once the player has been eliminated or has left.
    pub active: bool,
}

impl PlayerView {
    pub fn from_player(player: &Player) -> Self {
        Self {
            nickname: player.nickname.clone(),
            position: player.pos,
            active: player.is_active,
        }
    }
}

/// Read-only serialization of a whole board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub palette: HashMap<TileKind, PaletteEntry>,
    pub phase: Phase,
    pub width: u16,
    pub height: u16,
    pub turn: u32,
    #[serde(rename = "checkTurn")]
    pub check_turn: u32,
    /// Row-major rows of tiles.
    #[serde(rename = "board")]
    pub tiles: Vec<Vec<TileView>>,
    pub players: Vec<PlayerView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_wire_format() {
        let mv: Move = serde_json::from_str(r#"{"x": 2, "y": 1}"#).unwrap();
        assert_eq!(mv, Move::Point(Point::new(2, 1)));
        assert_eq!(mv.as_point(), Some(Point::new(2, 1)));

        let mv: Move = serde_json::from_str("7").unwrap();
        assert_eq!(mv, Move::Scalar(7));
        assert_eq!(mv.as_point(), None);

        let encoded = serde_json::to_string(&Move::Point(Point::new(0, 3))).unwrap();
        assert_eq!(encoded, r#"{"x":0,"y":3}"#);
    }

    #[test]
    fn test_delta_wire_format() {
        let delta = Delta {
            turn: 4,
            mv: Move::Point(Point::new(1, 1)),
        };
        let encoded = serde_json::to_value(&delta).unwrap();
        assert_eq!(encoded["turn"], 4);
        assert_eq!(encoded["move"]["x"], 1);
    }

    #[test]
    fn test_tile_view_omits_colorless_and_carries_energy() {
        let tile = Tile::new(Point::new(0, 0), TileKind::Layout, TileColor::ColorLess, 3);
        let view = TileView::from_tile(&tile);
        assert_eq!(view.color, None);
        assert_eq!(view.data["energy"], 3);

        let encoded = serde_json::to_value(&view).unwrap();
        assert!(encoded.get("color").is_none());
        assert_eq!(encoded["tile_type"], "Layout");
    }

    #[test]
    fn test_tile_view_keeps_real_colors() {
        let tile = Tile::new(Point::new(0, 0), TileKind::Teleport, TileColor::Red, 0);
        let view = TileView::from_tile(&tile);
        assert_eq!(view.color, Some(TileColor::Red));
        assert!(view.data.is_empty());
    }

    #[test]
    fn test_standard_palette_covers_all_kinds() {
        let palette = standard_palette();
        assert_eq!(palette.len(), TileKind::ALL.len());
        assert!(palette.contains_key(&TileKind::Zero));
    }
}
