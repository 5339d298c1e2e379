//! Deck configuration and grid filling.
//!
//! A deck is a declarative recipe for a board layout: entries with a count
//! are guaranteed placements, entries without one are weighted filler
//! choices drawn at random to pad the grid. `fill_grid` turns a deck into a
//! concrete row-major tile grid.

use crate::board::GameError;
use crate::point::Point;
use crate::tile::{Tile, TileColor, TileKind, MAX_LAYOUT_ENERGY, WILDCARD_ENERGY};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who may find and join a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Publicity {
    /// Listed publicly; anyone may join.
    Public,
    /// Joinable by code, never listed.
    #[default]
    Unlisted,
    /// Closed to everyone but the founding players.
    Private,
}

/// Declarative setup for one tile template in a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileSetup {
    #[serde(rename = "tile_type")]
    pub kind: TileKind,
    /// `None` is the decode-time "unspecified" sentinel: resolved to a
    /// random real color per placement. Distinct from `ColorLess`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<TileColor>,
    /// `None` resolves per kind at placement: 1-4 uniform for `Layout`,
    /// always 4 for `Wildcard`. An explicit value is honored as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<u8>,
    /// Opaque payload copied onto every tile placed from this setup.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

/// One deck entry: a tile template plus how many copies are guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckEntry {
    pub tile: TileSetup,
    /// `Some(n)`: exactly `n` guaranteed placements (before truncation).
    /// `None`: a weighted filler choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl DeckEntry {
    /// A weighted filler choice for `kind` with everything unspecified.
    pub fn choice(kind: TileKind) -> Self {
        Self {
            tile: TileSetup {
                kind,
                color: None,
                energy: None,
                data: Map::new(),
            },
            count: None,
        }
    }

    /// Exactly `count` guaranteed placements of `kind`.
    pub fn guaranteed(kind: TileKind, count: u32) -> Self {
        Self {
            count: Some(count),
            ..Self::choice(kind)
        }
    }
}

/// Full game setup as decoded from the session layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    /// 0 means no seat cap.
    #[serde(rename = "maxPlayers")]
    pub max_players: u8,
    pub publicity: Publicity,
    pub deck: Vec<DeckEntry>,
}

impl Default for GameConfig {
    /// The stock anything-goes board: 6x6, uncapped, every kind a choice.
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            max_players: 0,
            publicity: Publicity::default(),
            deck: TileKind::ALL.map(DeckEntry::choice).to_vec(),
        }
    }
}

/// Expand a deck into a concrete row-major grid of exactly
/// `width * height` tiles (index = y * width + x).
///
/// Guaranteed placements beyond the cell count are shuffled and truncated;
/// a shortfall is padded by drawing uniformly from the choice entries, or
/// fails with `DeckUnderfill` when there are none. The final placement list
/// is shuffled so declared order carries no positional bias.
pub fn fill_grid(
    width: u16,
    height: u16,
    deck: &[DeckEntry],
    rng: &mut impl Rng,
) -> Result<Vec<Tile>, GameError> {
    let cells = width as usize * height as usize;

    let mut placements: Vec<&TileSetup> = Vec::with_capacity(cells);
    for entry in deck {
        if let Some(count) = entry.count {
            for _ in 0..count {
                placements.push(&entry.tile);
            }
        }
    }

    let choices: Vec<&TileSetup> = deck
        .iter()
        .filter(|entry| entry.count.is_none())
        .map(|entry| &entry.tile)
        .collect();

    if placements.len() < cells {
        if choices.is_empty() {
            return Err(GameError::DeckUnderfill {
                cells,
                guaranteed: placements.len(),
            });
        }
        while placements.len() < cells {
            placements.push(choices[rng.gen_range(0..choices.len())]);
        }
    } else if placements.len() > cells {
        placements.shuffle(rng);
        placements.truncate(cells);
    }

    placements.shuffle(rng);

    Ok(placements
        .into_iter()
        .enumerate()
        .map(|(i, setup)| {
            let pos = Point::new((i % width as usize) as u16, (i / width as usize) as u16);
            materialize(setup, pos, rng)
        })
        .collect())
}

/// Turn one setup into a concrete tile, resolving unspecified color and
/// energy.
fn materialize(setup: &TileSetup, pos: Point, rng: &mut impl Rng) -> Tile {
    let color = setup.color.unwrap_or_else(|| match setup.kind {
        TileKind::Wall => TileColor::ColorLess,
        _ => TileColor::random(rng),
    });
    let energy = match setup.kind {
        TileKind::Layout => setup
            .energy
            .unwrap_or_else(|| rng.gen_range(1..=MAX_LAYOUT_ENERGY)),
        TileKind::Wildcard => WILDCARD_ENERGY,
        TileKind::Teleport | TileKind::Wall | TileKind::Zero => 0,
    };
    let mut tile = Tile::new(pos, setup.kind, color, energy);
    tile.data = setup.data.clone();
    tile
}
