//! Player seats.

use crate::point::Point;
use serde::{Deserialize, Serialize};

/// A seat at a board.
///
/// Seats are appended on join. While a game is running they are never
/// physically removed: `deleted` soft-removes a player so that
/// `turn % players.len()` keeps selecting stable indices. Hard removal
/// (splicing the seat out) happens only in the lobby and rematch-vote
/// phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique per board.
    pub nickname: String,
    /// Still in the running game. Cleared on elimination and on soft leave.
    pub is_active: bool,
    /// Soft-deleted: the seat remains for index stability, the player is gone.
    pub deleted: bool,
    /// Current cell.
    pub pos: Point,
}

impl Player {
    /// A fresh seat at the zero position.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            is_active: true,
            deleted: false,
            pos: Point::default(),
        }
    }

    /// Counts for turn taking: active and not soft-deleted.
    pub fn in_play(&self) -> bool {
        self.is_active && !self.deleted
    }
}
