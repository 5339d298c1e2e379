//! Tiles and their movement rules.
//!
//! Every cell on the board holds one `Tile`. The tile a player stands on
//! decides which moves they may make, and the tile they land on decides
//! what happens next:
//! - `Layout`: hop along a path of exactly `energy` orthogonal steps
//! - `Wildcard`: hop along a path of up to 4 orthogonal steps
//! - `Teleport`: jump to any color-matched non-teleport cell
//! - `Wall`: impassable, never open
//! - `Zero`: landing rotates every active player one seat along turn order
//!
//! The kind set is closed and matched exhaustively; there is no open-ended
//! dispatch.

use crate::board::Board;
use crate::point::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Movement budget of every `Wildcard` tile.
pub const WILDCARD_ENERGY: u8 = 4;

/// Largest energy a `Layout` tile is dealt.
pub const MAX_LAYOUT_ENERGY: u8 = 4;

/// Kind of a board tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Layout,
    Teleport,
    Wall,
    Wildcard,
    Zero,
}

impl TileKind {
    /// All tile kinds.
    pub const ALL: [TileKind; 5] = [
        TileKind::Layout,
        TileKind::Teleport,
        TileKind::Wall,
        TileKind::Wildcard,
        TileKind::Zero,
    ];
}

/// Color of a board tile.
///
/// `ColorLess` is a real color: a colorless teleport tile matches any
/// destination color. A color left out of a deck entry is "unspecified"
/// and is represented as `Option<TileColor>::None` during decoding, never
/// as `ColorLess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileColor {
    ColorLess,
    Red,
    Yellow,
    Green,
    Blue,
}

impl TileColor {
    /// The four real colors (everything except `ColorLess`).
    pub const REAL: [TileColor; 4] = [
        TileColor::Red,
        TileColor::Yellow,
        TileColor::Green,
        TileColor::Blue,
    ];

    /// Draw one of the four real colors uniformly.
    pub fn random(rng: &mut impl Rng) -> TileColor {
        TileColor::REAL[rng.gen_range(0..TileColor::REAL.len())]
    }
}

/// One board cell.
///
/// Identity (kind, color, energy) is fixed at fill time; only `open` changes
/// over a game, plus the wholesale replacement a `Zero` landing performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the grid.
    pub pos: Point,
    /// Whether players may still enter this cell. Cleared permanently when a
    /// player departs a non-teleport tile.
    pub open: bool,
    pub color: TileColor,
    pub kind: TileKind,
    /// Movement budget for `Layout` (1-4) and `Wildcard` (always 4), 0 otherwise.
    pub energy: u8,
    /// Opaque per-tile payload carried through from the deck setup.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Tile {
    /// Create a tile. Walls start closed, everything else open.
    pub fn new(pos: Point, kind: TileKind, color: TileColor, energy: u8) -> Self {
        Self {
            pos,
            open: !matches!(kind, TileKind::Wall),
            color,
            kind,
            energy,
            data: Map::new(),
        }
    }

    /// Whether a player may be seeded here at game start.
    pub fn can_start(&self) -> bool {
        matches!(self.kind, TileKind::Layout | TileKind::Wildcard)
    }

    /// Whether the player at seat `mover` may end up on this cell.
    ///
    /// A teleport cell additionally needs at least one eligible destination
    /// and a mover who is not already standing on a teleport (teleport
    /// chains are illegal).
    pub fn can_land(&self, board: &Board, mover: usize) -> bool {
        if !self.open || board.is_occupied(self.pos) {
            return false;
        }
        match self.kind {
            TileKind::Wall => false,
            TileKind::Layout | TileKind::Wildcard | TileKind::Zero => true,
            TileKind::Teleport => {
                let mover_on_teleport = board
                    .tile_at(board.players[mover].pos)
                    .map(|t| t.kind == TileKind::Teleport)
                    .unwrap_or(false);
                !mover_on_teleport && self.destinations(board).next().is_some()
            }
        }
    }

    /// Legal landing squares for the player at seat `mover` standing on this
    /// tile.
    pub fn available_moves(&self, board: &Board, mover: usize) -> HashSet<Point> {
        let mut moves = HashSet::new();
        match self.kind {
            TileKind::Layout => {
                let mut path = vec![self.pos];
                energy_walk(board, mover, &mut path, self.pos, self.energy, true, &mut moves);
            }
            TileKind::Wildcard => {
                let mut path = vec![self.pos];
                energy_walk(
                    board,
                    mover,
                    &mut path,
                    self.pos,
                    WILDCARD_ENERGY,
                    false,
                    &mut moves,
                );
            }
            TileKind::Teleport => {
                moves.extend(self.destinations(board));
            }
            // A wall is never occupied; a zero tile is pure landing effect.
            TileKind::Wall | TileKind::Zero => {}
        }
        moves
    }

    /// Where this tile teleports to: every open, unoccupied, non-teleport
    /// cell of matching color. A colorless teleport matches any color.
    fn destinations<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = Point> + 'a {
        board
            .tiles
            .iter()
            .filter(move |t| {
                t.kind != TileKind::Teleport
                    && t.open
                    && !board.is_occupied(t.pos)
                    && (self.color == TileColor::ColorLess || t.color == self.color)
            })
            .map(|t| t.pos)
    }
}

/// Depth-first walk over open, unoccupied tiles with backtracking.
///
/// A path may not revisit a cell, but distinct paths may reach the same
/// endpoint (it is collected once). With `exact`, only cells at the full
/// remaining depth land; otherwise every cell along the way does.
fn energy_walk(
    board: &Board,
    mover: usize,
    path: &mut Vec<Point>,
    pos: Point,
    remaining: u8,
    exact: bool,
    out: &mut HashSet<Point>,
) {
    if remaining == 0 {
        return;
    }
    for next in pos.neighbors(board.width, board.height) {
        if path.contains(&next) {
            continue;
        }
        let Some(tile) = board.tile_at(next) else {
            continue;
        };
        if !tile.open || board.is_occupied(next) {
            continue;
        }
        if (!exact || remaining == 1) && tile.can_land(board, mover) {
            out.insert(next);
        }
        path.push(next);
        energy_walk(board, mover, path, next, remaining - 1, exact, out);
        path.pop();
    }
}
