//! Perft reference counts.
//!
//! Standard positions and counts from the Chess Programming Wiki. Deeper
//! searches are ignored by default; run them with
//! `cargo test -p chess-variants --test perft -- --ignored`.

use chess_variants::{perft, perft_divide, Position, RuleSet, StandardChess, SuicideChess};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn check(fen: &str, expected: &[u64]) {
    let mut position = Position::from_fen(fen).unwrap();
    let before = position.clone();
    for (depth, &nodes) in expected.iter().enumerate() {
        let depth = depth as u32 + 1;
        assert_eq!(
            perft(&mut position, &StandardChess, depth),
            nodes,
            "{} at depth {}",
            fen,
            depth
        );
    }
    assert_eq!(position, before);
    assert_eq!(position.zobrist_hash(), position.compute_hash());
}

#[test]
fn startpos() {
    check(chess_core::Fen::STARTPOS, &[20, 400, 8902]);
}

#[test]
fn kiwipete() {
    check(KIWIPETE, &[48, 2039]);
}

#[test]
fn position_3() {
    check(POSITION_3, &[14, 191, 2812]);
}

#[test]
fn position_4() {
    check(POSITION_4, &[6, 264, 9467]);
}

#[test]
fn position_5() {
    check(POSITION_5, &[44, 1486]);
}

#[test]
#[ignore = "slow in debug builds"]
fn deep() {
    check(chess_core::Fen::STARTPOS, &[20, 400, 8902, 197_281]);
    check(KIWIPETE, &[48, 2039, 97_862]);
    check(POSITION_3, &[14, 191, 2812, 43_238]);
}

#[test]
fn divide_matches_total() {
    let mut position = Position::from_fen(KIWIPETE).unwrap();
    let divide = perft_divide(&mut position, &StandardChess, 2);
    assert_eq!(divide.len(), 48);
    assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 2039);
    assert!(divide.iter().any(|(m, _)| m == "e1g1"));
}

#[test]
fn suicide_startpos() {
    let mut position = SuicideChess.initial_position();
    assert_eq!(perft(&mut position, &SuicideChess, 1), 20);
    assert_eq!(perft(&mut position, &SuicideChess, 2), 400);
    assert_eq!(perft(&mut position, &SuicideChess, 3), 8067);
}
