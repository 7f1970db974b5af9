//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth.
//! The counts for well-known positions are published, so any mismatch
//! points at a generation or make/unmake bug.

use super::legal_moves;
use crate::{Position, RuleSet};

/// Counts leaf nodes at `depth`, playing and retracting moves on `position`.
pub fn perft<R: RuleSet + ?Sized>(position: &mut Position, rules: &R, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position, rules);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for m in moves {
        nodes += position.with_move(m, |after| perft(after, rules, depth - 1));
    }
    nodes
}

/// Node counts below each root move, sorted by coordinate notation.
pub fn perft_divide<R: RuleSet + ?Sized>(
    position: &mut Position,
    rules: &R,
    depth: u32,
) -> Vec<(String, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut results: Vec<(String, u64)> = legal_moves(position, rules)
        .into_iter()
        .map(|m| {
            let nodes = position.with_move(m, |after| perft(after, rules, depth - 1));
            (m.to_uci(), nodes)
        })
        .collect();
    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StandardChess, SuicideChess};

    #[test]
    fn startpos_shallow() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, &StandardChess, 0), 1);
        assert_eq!(perft(&mut position, &StandardChess, 1), 20);
        assert_eq!(perft(&mut position, &StandardChess, 2), 400);
        assert_eq!(position, Position::startpos());
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut position = Position::startpos();
        let divide = perft_divide(&mut position, &StandardChess, 2);
        assert_eq!(divide.len(), 20);
        assert!(divide.iter().all(|(_, n)| *n == 20));
        assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert_eq!(divide[0].0, "a2a3");
    }

    #[test]
    fn suicide_startpos_depth_one() {
        let mut position = SuicideChess.initial_position();
        assert_eq!(perft(&mut position, &SuicideChess, 1), 20);
    }
}
