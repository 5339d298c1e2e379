//! Board state machine.
//!
//! A `Board` is one game's entire mutable state: the tile grid, the seats,
//! the phase, and the turn counters. Every operation validates first and
//! mutates only on success. The board itself takes no locks; callers
//! serialize access (see the gridlock-registry crate).

use crate::deck::{fill_grid, DeckEntry, GameConfig, Publicity};
use crate::dto::{standard_palette, BoardView, Delta, Move, PlayerView, TileView};
use crate::player::Player;
use crate::point::Point;
use crate::tile::{Tile, TileKind};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

/// Coarse game lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Gathering players; joins, hard leaves and kicks allowed.
    Lobby,
    /// Game in progress; moves and soft leaves allowed.
    Started,
    /// Game over; waiting for a unanimous rematch vote.
    #[serde(rename = "rematch-vote")]
    RematchVote,
}

/// Errors from board operations.
///
/// All of these reject the operation without mutating the board. `Internal`
/// marks a broken invariant surfacing after validation; it fails the single
/// operation, never the process.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("it is not your turn")]
    NotYourTurn,

    #[error("invalid destination")]
    InvalidDestination,

    #[error("the game has not started")]
    GameNotStarted,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("the game is full")]
    GameFull,

    #[error("this lobby is not open to new players")]
    LobbyClosed,

    #[error("no player named {0}")]
    PlayerNotFound(String),

    #[error("nickname {0} is already taken")]
    NicknameTaken(String),

    #[error("only {eligible} start tiles for {players} players")]
    NotEnoughStartCells { players: usize, eligible: usize },

    #[error("deck guarantees {guaranteed} of {cells} cells and has no filler choices")]
    DeckUnderfill { cells: usize, guaranteed: usize },

    #[error("only the host may do that")]
    NotHost,

    #[error("no rematch vote is in progress")]
    NoRematchVote,

    #[error("invalid board configuration: {0}")]
    InvalidConfig(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// One game's full mutable state. The aggregate root and the unit of locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: u16,
    pub height: u16,
    /// Seat cap; 0 means uncapped.
    pub max_players: u8,
    pub publicity: Publicity,
    /// The deck recipe this board was created from; reused for rematch refills.
    pub deck: Vec<DeckEntry>,
    /// Row-major grid, index = y * width + x.
    pub tiles: Vec<Tile>,
    /// Seats in turn order.
    pub players: Vec<Player>,
    /// Turn pointer; `turn % players.len()` selects the current seat.
    pub turn: u32,
    /// Counter of accepted moves, for session-layer desync detection. Bumps
    /// on every accepted move whether or not the turn advances.
    pub check_turn: u32,
    pub phase: Phase,
    /// Rematch ballots by nickname.
    pub rematch_votes: HashMap<String, bool>,
}

impl Board {
    /// Create a lobby-phase board from `config` and seat the founding
    /// players.
    ///
    /// Founders bypass the publicity check (a private lobby's creator still
    /// gets their seat) but not the capacity or nickname checks.
    pub fn new(config: GameConfig, founders: &[String]) -> Result<Self, GameError> {
        if config.width == 0 || config.height == 0 {
            return Err(GameError::InvalidConfig(
                "board dimensions must be non-zero".into(),
            ));
        }
        let mut rng = rand::thread_rng();
        let tiles = fill_grid(config.width, config.height, &config.deck, &mut rng)?;
        let mut board = Self {
            width: config.width,
            height: config.height,
            max_players: config.max_players,
            publicity: config.publicity,
            deck: config.deck,
            tiles,
            players: Vec::new(),
            turn: 0,
            check_turn: 0,
            phase: Phase::Lobby,
            rematch_votes: HashMap::new(),
        };
        for nickname in founders {
            board.seat(nickname)?;
        }
        Ok(board)
    }

    // ==================== Lobby ====================

    /// Seat a new player. Lobby phase only; private and full lobbies reject.
    pub fn join(&mut self, nickname: &str) -> Result<(), GameError> {
        match self.phase {
            Phase::Lobby => {}
            Phase::Started | Phase::RematchVote => return Err(GameError::AlreadyStarted),
        }
        if self.publicity == Publicity::Private {
            return Err(GameError::LobbyClosed);
        }
        self.seat(nickname)
    }

    fn seat(&mut self, nickname: &str) -> Result<(), GameError> {
        if self.seated().any(|p| p.nickname == nickname) {
            return Err(GameError::NicknameTaken(nickname.to_string()));
        }
        if self.max_players > 0 && self.seated().count() >= self.max_players as usize {
            return Err(GameError::GameFull);
        }
        self.players.push(Player::new(nickname));
        Ok(())
    }

    /// Remove a player.
    ///
    /// Outside a running game the seat is spliced out entirely. During a
    /// game the seat is soft-deleted so turn indices stay stable, the turn
    /// advances past the leaver if it was theirs, and the game ends if at
    /// most one player remains in play.
    pub fn leave(&mut self, nickname: &str) -> Result<(), GameError> {
        let idx = self.player_index(nickname)?;
        match self.phase {
            Phase::Lobby | Phase::RematchVote => {
                self.players.remove(idx);
                self.rematch_votes.remove(nickname);
            }
            Phase::Started => {
                let was_current = idx == self.current_index()?;
                let player = &mut self.players[idx];
                player.deleted = true;
                player.is_active = false;
                info!(nickname, "player left the game");
                if self.in_play().count() <= 1 {
                    self.finish_game();
                } else if was_current {
                    self.advance_turn();
                }
            }
        }
        Ok(())
    }

    /// Remove `target` from the lobby. Host only, lobby phase only.
    pub fn kick(&mut self, by: &str, target: &str) -> Result<(), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::AlreadyStarted);
        }
        if !self.is_host(by) {
            return Err(GameError::NotHost);
        }
        let idx = self.player_index(target)?;
        self.players.remove(idx);
        info!(by, target, "player kicked");
        Ok(())
    }

    /// Change who may find and join this lobby. Host only.
    pub fn set_publicity(&mut self, by: &str, publicity: Publicity) -> Result<(), GameError> {
        if !self.is_host(by) {
            return Err(GameError::NotHost);
        }
        self.publicity = publicity;
        Ok(())
    }

    /// The host is the first seat still belonging to someone.
    pub fn is_host(&self, nickname: &str) -> bool {
        self.host() == Some(nickname)
    }

    /// Nickname of the host, if any seat is taken.
    pub fn host(&self) -> Option<&str> {
        self.seated().next().map(|p| p.nickname.as_str())
    }

    // ==================== Starting ====================

    /// Start (or, after a rematch vote, restart) the game: fresh grid from
    /// the deck, a distinct random start cell for every seated player, turn
    /// counters reset.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase == Phase::Started {
            return Err(GameError::AlreadyStarted);
        }
        let players = self.seated().count();
        let cells = self.width as usize * self.height as usize;
        if players == 0 || players > cells {
            return Err(GameError::NotEnoughStartCells {
                players,
                eligible: cells,
            });
        }

        let mut rng = rand::thread_rng();
        let tiles = fill_grid(self.width, self.height, &self.deck, &mut rng)?;
        let mut eligible: Vec<Point> = tiles
            .iter()
            .filter(|t| t.open && t.can_start())
            .map(|t| t.pos)
            .collect();
        if eligible.len() < players {
            return Err(GameError::NotEnoughStartCells {
                players,
                eligible: eligible.len(),
            });
        }
        eligible.shuffle(&mut rng);

        self.tiles = tiles;
        for (player, pos) in self
            .players
            .iter_mut()
            .filter(|p| !p.deleted)
            .zip(eligible)
        {
            player.is_active = true;
            player.pos = pos;
        }
        // Soft-deleted seats linger at the front after mid-game leaves, so
        // the opening turn pointer must land on a live seat itself.
        self.turn = self
            .players
            .iter()
            .position(|p| p.in_play())
            .unwrap_or(0) as u32;
        self.check_turn = 0;
        self.rematch_votes.clear();
        self.phase = Phase::Started;
        info!(players, "game started");
        Ok(())
    }

    // ==================== Moving ====================

    /// Validate and apply one move for `nickname`. Returns the delta to
    /// broadcast. Any validation failure rejects without mutation.
    pub fn submit_move(&mut self, nickname: &str, mv: Move) -> Result<Delta, GameError> {
        if self.phase != Phase::Started {
            return Err(GameError::GameNotStarted);
        }
        let current = self.current_index()?;
        if self.players[current].nickname != nickname {
            return Err(GameError::NotYourTurn);
        }
        let dest = mv.as_point().ok_or(GameError::InvalidDestination)?;
        let from_pos = self.players[current].pos;
        let from = self.tile_at(from_pos).cloned().ok_or_else(|| {
            GameError::Internal(format!("current player's tile at {from_pos} vanished"))
        })?;
        if !from.available_moves(self, current).contains(&dest) {
            debug!(player = nickname, to = %dest, "rejected move");
            return Err(GameError::InvalidDestination);
        }

        self.check_turn += 1;
        debug!(
            player = nickname,
            from = %from_pos,
            to = %dest,
            kind = ?from.kind,
            "move accepted"
        );
        let landed = self.apply_move(current, dest)?;
        if landed {
            self.advance_turn();
        }
        Ok(Delta {
            turn: self.turn,
            mv,
        })
    }

    /// Relocate the mover and run the destination tile's landing effect.
    /// Returns whether the move ends the mover's turn.
    fn apply_move(&mut self, mover: usize, dest: Point) -> Result<bool, GameError> {
        let from_pos = self.players[mover].pos;
        let from_kind = self
            .tile_at(from_pos)
            .map(|t| t.kind)
            .ok_or_else(|| GameError::Internal(format!("source tile at {from_pos} vanished")))?;
        // Departed tiles close for good; teleport pads stay re-enterable.
        if from_kind != TileKind::Teleport {
            if let Some(tile) = self.tile_at_mut(from_pos) {
                tile.open = false;
            }
        }
        self.players[mover].pos = dest;

        let dest_kind = self
            .tile_at(dest)
            .map(|t| t.kind)
            .ok_or_else(|| GameError::Internal(format!("destination tile at {dest} vanished")))?;
        if dest_kind == TileKind::Zero {
            self.rotate_players(mover, dest)?;
        }
        Ok(dest_kind != TileKind::Teleport)
    }

    /// Zero-tile landing effect: every player in play shifts to the next
    /// in-play player's former cell along turn order, the last one taking
    /// the zero cell itself, which is replaced wholesale by a copy of the
    /// tile that player vacated.
    fn rotate_players(&mut self, mover: usize, dest: Point) -> Result<(), GameError> {
        let n = self.players.len();
        let order: Vec<usize> = (0..n)
            .map(|step| (mover + step) % n)
            .filter(|&idx| self.players[idx].in_play())
            .collect();
        if order.len() < 2 {
            return Ok(());
        }

        let old: Vec<Point> = order.iter().map(|&i| self.players[i].pos).collect();
        let last_tile = self
            .tile_at(old[order.len() - 1])
            .cloned()
            .ok_or_else(|| GameError::Internal("rotation source tile vanished".into()))?;
        for (slot, &idx) in order.iter().enumerate() {
            self.players[idx].pos = old[(slot + 1) % order.len()];
            debug!(player = %self.players[idx].nickname, to = %self.players[idx].pos, "rotated");
        }
        let dest_idx = self.tile_index(dest)?;
        self.tiles[dest_idx] = Tile {
            pos: dest,
            ..last_tile
        };
        Ok(())
    }

    /// Advance the turn pointer to the next seat that is in play and has at
    /// least one legal move, eliminating stuck players on the way. Finishes
    /// the game once at most one player remains in play.
    fn advance_turn(&mut self) {
        loop {
            if self.in_play().count() <= 1 {
                self.finish_game();
                return;
            }
            self.turn = self.turn.wrapping_add(1);
            let idx = self.turn as usize % self.players.len();
            if !self.players[idx].in_play() {
                continue;
            }
            if self.moves_for(idx).is_empty() {
                self.players[idx].is_active = false;
                info!(player = %self.players[idx].nickname, "player eliminated: no moves left");
                continue;
            }
            return;
        }
    }

    /// Transition to the rematch vote, reporting the outcome for telemetry.
    fn finish_game(&mut self) {
        match self.in_play().next() {
            Some(winner) => info!(winner = %winner.nickname, turns = self.turn, "game over"),
            None => info!(turns = self.turn, "game over with nobody left in play"),
        }
        self.rematch_votes.clear();
        self.phase = Phase::RematchVote;
    }

    // ==================== Rematch ====================

    /// Record a rematch ballot. Returns whether every seated player has now
    /// voted yes, at which point the caller restarts the board.
    ///
    /// A "no" ballot is recorded and simply holds the vote open until its
    /// owner changes their mind; it neither resets nor ends the vote.
    pub fn vote_rematch(&mut self, nickname: &str, vote: bool) -> Result<bool, GameError> {
        if self.phase != Phase::RematchVote {
            return Err(GameError::NoRematchVote);
        }
        let idx = self.player_index(nickname)?;
        let nickname = self.players[idx].nickname.clone();
        self.rematch_votes.insert(nickname, vote);
        Ok(self
            .seated()
            .all(|p| self.rematch_votes.get(&p.nickname) == Some(&true)))
    }

    // ==================== Queries ====================

    /// The seat whose turn it is, while a game is running.
    pub fn current_player(&self) -> Option<&Player> {
        if self.phase != Phase::Started || self.players.is_empty() {
            return None;
        }
        self.players.get(self.turn as usize % self.players.len())
    }

    /// Legal landing squares for the seat at `idx`.
    pub fn moves_for(&self, idx: usize) -> HashSet<Point> {
        match self.tile_at(self.players[idx].pos) {
            Some(tile) => tile.available_moves(self, idx),
            None => HashSet::new(),
        }
    }

    /// Tile at `p`, if `p` is on the grid.
    pub fn tile_at(&self, p: Point) -> Option<&Tile> {
        self.tile_index(p).ok().map(|i| &self.tiles[i])
    }

    fn tile_at_mut(&mut self, p: Point) -> Option<&mut Tile> {
        match self.tile_index(p) {
            Ok(i) => Some(&mut self.tiles[i]),
            Err(_) => None,
        }
    }

    fn tile_index(&self, p: Point) -> Result<usize, GameError> {
        if p.x >= self.width || p.y >= self.height {
            return Err(GameError::Internal(format!("coordinate {p} out of bounds")));
        }
        Ok(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Whether any seated player stands on `p`. Eliminated players still
    /// block their cell; soft-deleted seats do not.
    pub fn is_occupied(&self, p: Point) -> bool {
        self.seated().any(|player| player.pos == p)
    }

    /// Seats that still belong to someone (not soft-deleted).
    pub fn seated(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.deleted)
    }

    /// Players still in the running game.
    pub fn in_play(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.in_play())
    }

    fn player_index(&self, nickname: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| !p.deleted && p.nickname == nickname)
            .ok_or_else(|| GameError::PlayerNotFound(nickname.to_string()))
    }

    fn current_index(&self) -> Result<usize, GameError> {
        if self.players.is_empty() {
            return Err(GameError::Internal("no seats at a running board".into()));
        }
        Ok(self.turn as usize % self.players.len())
    }

    /// The configuration this board was created from.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width,
            height: self.height,
            max_players: self.max_players,
            publicity: self.publicity,
            deck: self.deck.clone(),
        }
    }

    /// Read-only projection of the whole board for broadcast.
    pub fn snapshot(&self) -> BoardView {
        let mut rows = Vec::with_capacity(self.height as usize);
        for y in 0..self.height {
            let mut row = Vec::with_capacity(self.width as usize);
            for x in 0..self.width {
                let idx = y as usize * self.width as usize + x as usize;
                row.push(TileView::from_tile(&self.tiles[idx]));
            }
            rows.push(row);
        }
        BoardView {
            palette: standard_palette(),
            phase: self.phase,
            width: self.width,
            height: self.height,
            turn: self.turn,
            check_turn: self.check_turn,
            tiles: rows,
            players: self.seated().map(PlayerView::from_player).collect(),
        }
    }
}
