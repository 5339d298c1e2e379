//! Gridlock game engine.
//!
//! Gridlock is a turn-based multiplayer board game on a grid that decays as
//! it is played: tiles close permanently behind the players, each tile kind
//! carries its own movement rule, and the last player able to move wins.
//!
//! This crate is the pure engine: board state, per-kind move legality, the
//! turn and elimination state machine, deck-driven grid generation, and
//! read-only snapshots. It performs no I/O and takes no locks; the
//! companion `gridlock-registry` crate owns board lookup and locking, and a
//! session layer owns transport and broadcast.
//!
//! # Modules
//!
//! - [`point`]: bounds-aware grid coordinates
//! - [`tile`]: tile kinds and their move-generation rules
//! - [`player`]: seats, elimination and soft deletion
//! - [`board`]: the board aggregate and its phase/turn state machine
//! - [`deck`]: declarative deck configuration and grid filling
//! - [`dto`]: snapshot and delta projections for broadcast

pub mod board;
pub mod deck;
pub mod dto;
pub mod player;
pub mod point;
pub mod tile;

// Re-export commonly used types
pub use board::{Board, GameError, Phase};
pub use deck::{fill_grid, DeckEntry, GameConfig, Publicity, TileSetup};
pub use dto::{standard_palette, BoardView, Delta, Move, PaletteEntry, PlayerView, TileView};
pub use player::Player;
pub use point::Point;
pub use tile::{Tile, TileColor, TileKind, MAX_LAYOUT_ENERGY, WILDCARD_ENERGY};
