//! Integration tests for the Gridlock engine.
//!
//! These drive whole games through the public `Board` API, from lobby to
//! rematch vote.

use gridlock_core::*;
use std::collections::HashMap;

fn grid(width: u16, height: u16, kind: TileKind, energy: u8) -> Vec<Tile> {
    let mut tiles = Vec::new();
    for y in 0..height {
        for x in 0..width {
            tiles.push(Tile::new(
                Point::new(x, y),
                kind,
                TileColor::ColorLess,
                energy,
            ));
        }
    }
    tiles
}

/// A mid-game board with hand-placed tiles and seats.
fn running_board(width: u16, height: u16, tiles: Vec<Tile>, seats: &[(&str, u16, u16)]) -> Board {
    let players = seats
        .iter()
        .map(|&(nickname, x, y)| {
            let mut player = Player::new(nickname);
            player.pos = Point::new(x, y);
            player
        })
        .collect();
    Board {
        width,
        height,
        max_players: 0,
        publicity: Publicity::Unlisted,
        deck: vec![DeckEntry::choice(TileKind::Wildcard)],
        tiles,
        players,
        turn: 0,
        check_turn: 0,
        phase: Phase::Started,
        rematch_votes: HashMap::new(),
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_first_move_on_tiny_wildcard_board() {
    let mut board = running_board(
        2,
        2,
        grid(2, 2, TileKind::Wildcard, WILDCARD_ENERGY),
        &[("p0", 0, 0), ("p1", 1, 1)],
    );

    let delta = board
        .submit_move("p0", Move::Point(Point::new(0, 1)))
        .unwrap();

    assert_eq!(board.check_turn, 1);
    assert_eq!(delta.turn, 1);
    assert_eq!(board.current_player().unwrap().nickname, "p1");
}

#[test]
fn test_layout_accepts_exact_distance_only() {
    let mut board = running_board(
        3,
        3,
        grid(3, 3, TileKind::Layout, 2),
        &[("p0", 0, 0), ("p1", 2, 2)],
    );

    // Distance 1 is one step short of the energy budget.
    assert_eq!(
        board.submit_move("p0", Move::Point(Point::new(1, 0))),
        Err(GameError::InvalidDestination)
    );
    assert_eq!(board.check_turn, 0);

    // Distance 2 is exact.
    board
        .submit_move("p0", Move::Point(Point::new(2, 0)))
        .unwrap();
    assert_eq!(board.check_turn, 1);
    assert_eq!(board.players[0].pos, Point::new(2, 0));
}

#[test]
fn test_turn_skips_eliminated_player_automatically() {
    let mut tiles = grid(3, 3, TileKind::Wildcard, WILDCARD_ENERGY);
    // Wall off the middle seat: both neighbors of (2,0) are closed.
    tiles[1].open = false; // (1,0)
    tiles[5].open = false; // (2,1)
    let mut board = running_board(3, 3, tiles, &[("a", 0, 0), ("b", 2, 0), ("c", 0, 2)]);

    board
        .submit_move("a", Move::Point(Point::new(0, 1)))
        .unwrap();

    assert!(!board.players[1].is_active, "b was stuck and is eliminated");
    assert_eq!(board.current_player().unwrap().nickname, "c");
    assert_eq!(board.phase, Phase::Started);
}

#[test]
fn test_lobby_to_rematch_lifecycle() {
    let config = GameConfig {
        width: 4,
        height: 4,
        max_players: 3,
        publicity: Publicity::Unlisted,
        deck: vec![
            DeckEntry::choice(TileKind::Wildcard),
            DeckEntry::guaranteed(TileKind::Zero, 1),
            DeckEntry::guaranteed(TileKind::Teleport, 1),
        ],
    };
    let mut board = Board::new(config, &names(&["ada"])).unwrap();
    board.join("grace").unwrap();
    assert_eq!(board.join("ada"), Err(GameError::NicknameTaken("ada".into())));

    board.start().unwrap();
    assert_eq!(board.phase, Phase::Started);

    // Play until the decaying grid ends the game.
    let mut previous_check_turn = 0;
    let mut iterations = 0;
    while board.phase == Phase::Started {
        iterations += 1;
        assert!(iterations < 500, "grid decay must end the game");

        let idx = board.turn as usize % board.players.len();
        let moves = board.moves_for(idx);
        assert!(
            !moves.is_empty(),
            "the turn pointer never rests on a stuck player"
        );
        let dest = *moves.iter().next().unwrap();
        let nickname = board.players[idx].nickname.clone();
        board.submit_move(&nickname, Move::Point(dest)).unwrap();

        assert_eq!(board.check_turn, previous_check_turn + 1);
        previous_check_turn = board.check_turn;
    }

    assert_eq!(board.phase, Phase::RematchVote);
    assert!(board.in_play().count() <= 1);

    // Unanimous rematch restarts with fresh counters and layout.
    assert!(!board.vote_rematch("ada", true).unwrap());
    assert!(board.vote_rematch("grace", true).unwrap());
    board.start().unwrap();
    assert_eq!(board.phase, Phase::Started);
    assert_eq!(board.check_turn, 0);
    assert_eq!(board.turn, 0);
    assert!(board.players.iter().all(|p| p.is_active));
}

#[test]
fn test_snapshot_tracks_the_game() {
    let mut board = running_board(
        2,
        2,
        grid(2, 2, TileKind::Wildcard, WILDCARD_ENERGY),
        &[("p0", 0, 0), ("p1", 1, 1)],
    );
    board
        .submit_move("p0", Move::Point(Point::new(0, 1)))
        .unwrap();

    let view = board.snapshot();
    assert_eq!(view.check_turn, 1);
    assert_eq!(view.turn, 1);
    assert!(!view.tiles[0][0].open, "the vacated cell shows closed");
    let p0 = view.players.iter().find(|p| p.nickname == "p0").unwrap();
    assert_eq!(p0.position, Point::new(0, 1));
}
