//! Attack tables for leaping pieces and pawn push helpers.

use crate::Bitboard;
use chess_core::{Color, Square};

pub use super::rays::{bishop_attacks, queen_attacks, rook_attacks};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const WHITE_PAWN_OFFSETS: [(i8, i8); 2] = [(-1, 1), (1, 1)];
const BLACK_PAWN_OFFSETS: [(i8, i8); 2] = [(-1, -1), (1, -1)];

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_OFFSETS);

/// Indexed `[color][square]`.
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&WHITE_PAWN_OFFSETS),
    leaper_table(&BLACK_PAWN_OFFSETS),
];

/// Builds a table of single-step targets for each square, dropping
/// offsets (file delta, rank delta) that leave the board.
const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let f = file + offsets[i].0;
            let r = rank + offsets[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq] = Bitboard(bits);
        sq += 1;
    }
    table
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Targets of single pawn pushes for every pawn in `pawns`.
#[inline]
pub fn pawn_single_pushes(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    pawns.forward(color) & empty
}

/// Targets of double pawn pushes. Only pawns whose single push lands on
/// the third rank from their side may advance twice.
#[inline]
pub fn pawn_double_pushes(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    let third_rank = match color {
        Color::White => Bitboard::RANK_3,
        Color::Black => Bitboard::RANK_6,
    };
    (pawn_single_pushes(pawns, color, empty) & third_rank).forward(color) & empty
}

/// Squares in `targets` that any pawn in `pawns` can capture on.
#[inline]
pub fn pawn_captures(pawns: Bitboard, color: Color, targets: Bitboard) -> Bitboard {
    let span = match color {
        Color::White => pawns.north_east() | pawns.north_west(),
        Color::Black => pawns.south_east() | pawns.south_west(),
    };
    span & targets
}
