//! Sliding piece attacks from precomputed rays.
//!
//! Each square has one ray per direction running to the board edge. The
//! attack set along a ray stops at the first blocker, which is found with a
//! single bit scan: forward for directions that increase the square index,
//! reverse for those that decrease it.

use crate::Bitboard;
use chess_core::Square;

#[derive(Clone, Copy)]
enum Direction {
    North,
    NorthEast,
    East,
    NorthWest,
    South,
    SouthWest,
    West,
    SouthEast,
}

impl Direction {
    const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// (file delta, rank delta) in table order.
    const STEPS: [(i8, i8); 8] = [
        (0, 1),
        (1, 1),
        (1, 0),
        (-1, 1),
        (0, -1),
        (-1, -1),
        (-1, 0),
        (1, -1),
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }

    /// True when stepping in this direction increases the square index.
    #[inline]
    const fn is_positive(self) -> bool {
        (self as usize) < 4
    }
}

/// Indexed `[direction][square]`; excludes the origin square.
const RAYS: [[Bitboard; 64]; 8] = compute_rays();

const fn compute_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (df, dr) = Direction::STEPS[dir];
        let mut sq = 0;
        while sq < 64 {
            let mut f = (sq % 8) as i8 + df;
            let mut r = (sq / 8) as i8 + dr;
            let mut bits = 0u64;
            while f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
                f += df;
                r += dr;
            }
            rays[dir][sq] = Bitboard(bits);
            sq += 1;
        }
        dir += 1;
    }
    rays
}

#[inline]
fn ray_attacks(dir: Direction, sq: Square, occupied: Bitboard) -> Bitboard {
    let ray = RAYS[dir.index()][sq.index() as usize];
    let blockers = ray & occupied;
    let first = if dir.is_positive() {
        blockers.bitscan_forward()
    } else {
        blockers.bitscan_reverse()
    };
    match first {
        Some(blocker) => ray ^ RAYS[dir.index()][blocker.index() as usize],
        None => ray,
    }
}

/// Squares a rook on `sq` attacks given the board occupancy. The first
/// blocker along each line is included.
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Direction::ORTHOGONAL
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(dir, sq, occupied))
}

/// Squares a bishop on `sq` attacks given the board occupancy.
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    Direction::DIAGONAL
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(dir, sq, occupied))
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn squares(names: &[&str]) -> Bitboard {
        names
            .iter()
            .fold(Bitboard::EMPTY, |acc, n| acc | Bitboard::from_square(sq(n)))
    }

    #[test]
    fn rook_on_empty_board() {
        assert_eq!(rook_attacks(sq("d4"), Bitboard::EMPTY).count(), 14);
        assert_eq!(rook_attacks(Square::A1, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn bishop_on_empty_board() {
        assert_eq!(bishop_attacks(sq("d4"), Bitboard::EMPTY).count(), 13);
        assert_eq!(bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn rook_stops_at_first_blocker() {
        let occupied = squares(&["d6", "d7", "b4", "d2", "g4"]);
        let attacks = rook_attacks(sq("d4"), occupied);
        assert_eq!(
            attacks,
            squares(&["d5", "d6", "c4", "b4", "d3", "d2", "e4", "f4", "g4"])
        );
    }

    #[test]
    fn bishop_stops_at_first_blocker() {
        let occupied = squares(&["f6", "b2", "a7"]);
        let attacks = bishop_attacks(sq("d4"), occupied);
        assert!(attacks.contains(sq("f6")));
        assert!(!attacks.contains(sq("g7")));
        assert!(attacks.contains(sq("b2")));
        assert!(!attacks.contains(sq("a1")));
        assert!(attacks.contains(sq("a7")));
        assert!(attacks.contains(sq("g1")));
    }

    #[test]
    fn rays_exclude_origin() {
        for index in 0..64 {
            let origin = Square::from_index(index).unwrap();
            assert!(!queen_attacks(origin, Bitboard::FULL).contains(origin));
        }
    }
}
