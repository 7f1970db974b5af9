//! Zobrist keys for position identification.
//!
//! A position key is the XOR of one random value per occupied
//! (color, piece, square) triple, plus values for the side to move, the
//! castling rights and the en-passant file. Because XOR is its own inverse,
//! applying a move only touches the handful of values that change.

use crate::CastlingRights;
use chess_core::{Color, File, Piece, Square};

pub struct ZobristKeys {
    /// Indexed `[color][piece][square]`.
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One key per raw castling-rights value (0-15).
    castling: [u64; 16],
    en_passant: [u64; 8],
}

/// splitmix64 step, returning the new state and the output value.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (state, z ^ (z >> 31))
}

impl ZobristKeys {
    /// Derives all keys from a fixed seed so hashes are stable across runs.
    const fn generate(seed: u64) -> Self {
        let mut state = seed;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut castling = [0u64; 16];
        let mut en_passant = [0u64; 8];

        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut sq = 0;
                while sq < 64 {
                    let (next, value) = splitmix64(state);
                    state = next;
                    pieces[color][piece][sq] = value;
                    sq += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        let (next, black_to_move) = splitmix64(state);
        state = next;

        // The empty set of rights keeps key 0 so positions without castling
        // hash the same whether or not the field was ever touched.
        let mut i = 1;
        while i < 16 {
            let (next, value) = splitmix64(state);
            state = next;
            castling[i] = value;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            let (next, value) = splitmix64(state);
            state = next;
            en_passant[i] = value;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub const fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.index() as usize]
    }

    #[inline]
    pub const fn black_to_move(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub const fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.raw() as usize]
    }

    #[inline]
    pub const fn en_passant(&self, file: File) -> u64 {
        self.en_passant[file.index() as usize]
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::generate(0x2545_F491_4F6C_DD1D);
