//! End-to-end scenarios through the public API.

use chess_core::{Color, Fen, Piece, Square};
use chess_variants::{
    san_to_move, Game, GameError, GameResult, GameStatus, Position, RuleSet, SanError,
    StandardChess, SuicideChess, Variant,
};

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

#[test]
fn classic_start_has_twenty_moves() {
    let game = Game::new(Variant::Classic);
    assert_eq!(game.legal_moves().len(), 20);
    assert_eq!(game.position().side_to_move(), Color::White);
    assert_eq!(game.to_fen(), Fen::STARTPOS);
}

#[test]
fn suicide_capture_is_forced() {
    let mut game = Game::new(Variant::Suicide);
    game.make_move_san("e4").unwrap();
    game.make_move_san("d5").unwrap();

    let legal = game.legal_moves();
    assert_eq!(legal.len(), 1);
    let only = legal.get(0).unwrap();
    assert_eq!((only.from(), only.to()), (sq("e4"), sq("d5")));
    assert_eq!(game.pseudo_legal_moves().len(), 31);

    assert!(matches!(
        game.make_move_san("Nf3"),
        Err(GameError::InvalidSan(SanError::IllegalMove(_)))
    ));
    game.make_move_san("exd5").unwrap();
    assert_eq!(game.move_history()[2].san, "exd5");
}

#[test]
fn suicide_king_promotion_from_san() {
    let mut game = Game::from_fen(Variant::Suicide, "8/4P3/8/8/8/8/8/k7 w - - 0 1").unwrap();
    let m = game.make_move_san("e8K").unwrap();
    assert_eq!(m.to(), sq("e8"));
    assert_eq!(m.promotion(), Some(Piece::King));
    assert_eq!(game.move_history()[0].san, "e8=K");
    assert_eq!(
        game.position().piece_at(sq("e8")),
        Some((Piece::King, Color::White))
    );
}

#[test]
fn ambiguous_san_is_an_error() {
    let position = Position::from_fen("3k4/8/8/8/8/8/4K3/R6R w - - 0 1").unwrap();
    assert!(matches!(
        san_to_move(&position, &StandardChess, "Rd1"),
        Err(SanError::AmbiguousMove { .. })
    ));

    let mut game = Game::from_fen(Variant::Classic, "3k4/8/8/8/8/8/4K3/R6R w - - 0 1").unwrap();
    assert!(matches!(
        game.make_move_san("Rd1"),
        Err(GameError::InvalidSan(SanError::AmbiguousMove { .. }))
    ));
    assert_eq!(game.ply_count(), 0);
}

#[test]
fn suicide_never_castles() {
    let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
    let classic = Position::from_fen(fen).unwrap();
    assert!(StandardChess
        .legal_moves(&classic)
        .iter()
        .any(|m| m.is_castling()));

    let unprepared = Position::from_fen(fen).unwrap();
    assert!(!SuicideChess
        .legal_moves(&unprepared)
        .iter()
        .any(|m| m.is_castling()));

    let game = Game::from_fen(Variant::Suicide, fen).unwrap();
    assert!(game.position().castling().is_empty());
    assert!(!game.legal_moves().iter().any(|m| m.is_castling()));
}

#[test]
fn promotion_choices_per_variant() {
    // Push to b8, or capture on a8 or c8.
    let fen = "r1n5/1P6/8/8/8/8/8/k6K w - - 0 1";
    let position = Position::from_fen(fen).unwrap();

    let classic = StandardChess.legal_moves(&position);
    let classic_promotions = classic.iter().filter(|m| m.is_promotion()).count();
    assert_eq!(classic_promotions, 12);
    assert!(!classic.iter().any(|m| m.promotion() == Some(Piece::King)));

    // Captures are forced, so only the two capturing arrivals remain.
    let suicide = SuicideChess.legal_moves(&position);
    assert_eq!(suicide.len(), 10);
    for target in [sq("a8"), sq("c8")] {
        assert!(suicide
            .iter()
            .any(|m| m.to() == target && m.promotion() == Some(Piece::King)));
    }
}

#[test]
fn suicide_moves_every_king() {
    let position = Position::from_fen("8/8/8/8/8/8/8/K1K4k w - - 0 1").unwrap();
    let moves = SuicideChess.legal_moves(&position);
    let origins: Vec<Square> = moves.iter().map(|m| m.from()).collect();
    assert!(origins.contains(&Square::A1));
    assert!(origins.contains(&Square::C1));
    // a1: a2 b1 b2; c1: b1 b2 c2 d1 d2.
    assert_eq!(moves.len(), 8);
}

#[test]
fn no_moves_means_game_over() {
    let mate = Game::from_fen(
        Variant::Classic,
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
    )
    .unwrap();
    assert!(mate.legal_moves().is_empty());
    assert_eq!(mate.status(), GameStatus::Checkmate);

    let stale = Game::from_fen(Variant::Classic, "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(stale.legal_moves().is_empty());
    assert_eq!(stale.status(), GameStatus::Stalemate);

    let suicide = Game::from_fen(Variant::Suicide, "8/8/8/8/8/p7/P7/7r w - - 0 1").unwrap();
    assert!(suicide.legal_moves().is_empty());
    assert_eq!(suicide.result(), Some(GameResult::WhiteWins));
}

#[test]
fn take_back_through_the_game() {
    let mut game = Game::new(Variant::Classic);
    for san in ["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"] {
        game.make_move_san(san).unwrap();
    }
    let after = game.position().clone();
    for _ in 0..6 {
        game.retract_move().unwrap();
    }
    assert_eq!(game.position(), &Position::startpos());
    assert_eq!(
        game.position().zobrist_hash(),
        Position::startpos().zobrist_hash()
    );
    for san in ["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"] {
        game.make_move_san(san).unwrap();
    }
    assert_eq!(game.position(), &after);
}

#[test]
fn uci_feed_with_king_promotion() {
    let mut game = Game::from_fen(Variant::Suicide, "8/4P3/8/8/8/8/8/k7 w - - 0 1").unwrap();
    let m = game.make_move_uci("e7e8k").unwrap();
    assert_eq!(m.promotion(), Some(Piece::King));

    let mut classic = Game::from_fen(Variant::Classic, "8/4P3/8/8/8/8/8/k6K w - - 0 1").unwrap();
    assert!(matches!(
        classic.make_move_uci("e7e8k"),
        Err(GameError::IllegalMove(_))
    ));
}
