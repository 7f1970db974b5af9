//! Mutable board state with undo history.

use chess_core::{Color, Fen, FenCastling, FenError, File, Move, Piece, Rank, Square};
use thiserror::Error;

use crate::movegen::pawn_attacks;
use crate::zobrist::ZOBRIST;
use crate::Bitboard;

/// Errors raised when a position operation is called outside its
/// preconditions.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("no move to retract: history is empty")]
    EmptyHistory,
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    pub const fn kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        self.0 & flag != 0
    }

    #[inline]
    pub const fn queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        self.0 & flag != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The rights left after a move touches `from` and `to`. Moving the king
    /// or a rook off its home square, or capturing on a rook's home square,
    /// forfeits the matching right.
    #[inline]
    pub const fn after_touching(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & Self::keep_mask(from) & Self::keep_mask(to))
    }

    const fn keep_mask(sq: Square) -> u8 {
        match sq.index() {
            0 => !Self::WHITE_QUEENSIDE,
            4 => !(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
            7 => !Self::WHITE_KINGSIDE,
            56 => !Self::BLACK_QUEENSIDE,
            60 => !(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
            63 => !Self::BLACK_KINGSIDE,
            _ => 0b1111,
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<FenCastling> for CastlingRights {
    fn from(c: FenCastling) -> Self {
        let mut flags = 0;
        if c.white_kingside {
            flags |= Self::WHITE_KINGSIDE;
        }
        if c.white_queenside {
            flags |= Self::WHITE_QUEENSIDE;
        }
        if c.black_kingside {
            flags |= Self::BLACK_KINGSIDE;
        }
        if c.black_queenside {
            flags |= Self::BLACK_QUEENSIDE;
        }
        CastlingRights(flags)
    }
}

impl From<CastlingRights> for FenCastling {
    fn from(rights: CastlingRights) -> Self {
        FenCastling {
            white_kingside: rights.kingside(Color::White),
            white_queenside: rights.queenside(Color::White),
            black_kingside: rights.kingside(Color::Black),
            black_queenside: rights.queenside(Color::Black),
        }
    }
}

/// What `apply_move` overwrites, kept so `retract_move` can restore it.
#[derive(Debug, Clone, Copy)]
struct Undo {
    mv: Move,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    /// Zobrist key of the position before `mv`.
    key: u64,
}

/// A chess position.
///
/// Holds one bitboard per (color, piece) pair, so a side may own any number
/// of kings. The position is mutated in place by [`Position::apply_move`]
/// and restored by [`Position::retract_move`]; cloning it produces a fully
/// independent copy.
#[derive(Debug, Clone)]
pub struct Position {
    /// Indexed `[color][piece]`.
    boards: [[Bitboard; 6]; 2],
    /// Union of each color's piece boards.
    colors: [Bitboard; 2],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<Undo>,
    /// Cached zobrist key, `None` until first needed.
    hash: Option<u64>,
}

impl Position {
    /// An empty board with White to move.
    pub fn empty() -> Self {
        let mut position = Position {
            boards: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
            hash: None,
        };
        position.hash = Some(position.compute_hash());
        position
    }

    /// The standard initial position.
    pub fn startpos() -> Self {
        let mut position = Position::empty();
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for color in Color::BOTH {
            let back = Rank::ALL[color.back_rank() as usize];
            let pawns = match color {
                Color::White => Rank::R2,
                Color::Black => Rank::R7,
            };
            for (file, piece) in File::ALL.into_iter().zip(BACK_RANK) {
                position.xor_piece(Square::new(file, back), piece, color);
                position.xor_piece(Square::new(file, pawns), Piece::Pawn, color);
            }
        }
        position.castling = CastlingRights::ALL;
        position.hash = Some(position.compute_hash());
        position
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_parsed(&Fen::parse(fen)?))
    }

    /// Builds a position from an already parsed FEN record.
    pub fn from_parsed(fen: &Fen) -> Self {
        let mut position = Position::empty();
        for &(sq, piece, color) in &fen.placement {
            position.xor_piece(sq, piece, color);
        }
        position.side_to_move = fen.side_to_move;
        position.castling = fen.castling.into();
        position.en_passant = fen.en_passant;
        position.halfmove_clock = fen.halfmove_clock;
        position.fullmove_number = fen.fullmove_number;
        position.hash = Some(position.compute_hash());
        position
    }

    /// The position as a FEN record.
    pub fn to_parsed(&self) -> Fen {
        let mut placement = Vec::with_capacity(self.occupied().count() as usize);
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                let sq = Square::new(file, rank);
                if let Some((piece, color)) = self.piece_at(sq) {
                    placement.push((sq, piece, color));
                }
            }
        }
        Fen {
            placement,
            side_to_move: self.side_to_move,
            castling: self.castling.into(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    pub fn to_fen(&self) -> String {
        self.to_parsed().to_fen()
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Replaces the castling rights, keeping the cached key in step.
    pub fn set_castling(&mut self, rights: CastlingRights) {
        if let Some(hash) = self.hash.as_mut() {
            *hash ^= ZOBRIST.castling(self.castling) ^ ZOBRIST.castling(rights);
        }
        self.castling = rights;
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let color = Color::BOTH
            .into_iter()
            .find(|c| self.colors[c.index()].contains(sq))?;
        Piece::ALL
            .into_iter()
            .find(|p| self.boards[color.index()][p.index()].contains(sq))
            .map(|piece| (piece, color))
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.boards[color.index()][piece.index()]
    }

    /// All squares occupied by `color`.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Number of pieces `color` has on the board, kings and pawns included.
    #[inline]
    pub fn piece_count(&self, color: Color) -> u32 {
        self.colors[color.index()].count()
    }

    /// Number of moves applied since this position was set up.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Applied moves, oldest first.
    pub fn moves(&self) -> impl DoubleEndedIterator<Item = Move> + '_ {
        self.history.iter().map(|u| u.mv)
    }

    #[inline]
    fn xor_piece(&mut self, sq: Square, piece: Piece, color: Color) {
        let bb = Bitboard::from_square(sq);
        self.boards[color.index()][piece.index()] ^= bb;
        self.colors[color.index()] ^= bb;
    }

    /// The pawn removed by an en-passant capture landing on `to`.
    #[inline]
    fn en_passant_victim(m: Move) -> Square {
        Square::new(m.to().file(), m.from().rank())
    }

    /// Rook origin and destination for a castling move.
    fn castling_rook(m: Move) -> Option<(Square, Square)> {
        let rank = m.from().rank();
        if !m.is_castling() {
            None
        } else if m.to().file() > m.from().file() {
            Some((Square::new(File::H, rank), Square::new(File::F, rank)))
        } else {
            Some((Square::new(File::A, rank), Square::new(File::D, rank)))
        }
    }

    /// The en-passant part of the key. The file only counts when a pawn of
    /// the side to move could actually capture onto the target square.
    fn en_passant_key(&self) -> u64 {
        match self.en_passant {
            Some(ep)
                if (pawn_attacks(ep, self.side_to_move.opposite())
                    & self.pieces_of(Piece::Pawn, self.side_to_move))
                .is_not_empty() =>
            {
                ZOBRIST.en_passant(ep.file())
            }
            _ => 0,
        }
    }

    /// Computes the zobrist key from scratch.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.pieces_of(piece, color) {
                    hash ^= ZOBRIST.piece(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move();
        }
        hash ^ ZOBRIST.castling(self.castling) ^ self.en_passant_key()
    }

    /// The zobrist key of this position, from the cache when present.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash.unwrap_or_else(|| self.compute_hash())
    }

    /// Plays `m`, which must have been generated for this position.
    pub fn apply_move(&mut self, m: Move) {
        debug_assert_eq!(m.color(), self.side_to_move);
        debug_assert_eq!(self.piece_at(m.from()), Some((m.piece(), m.color())));

        let key = self.zobrist_hash();
        let us = self.side_to_move;
        let them = us.opposite();
        let mut hash = key ^ self.en_passant_key() ^ ZOBRIST.castling(self.castling);

        self.history.push(Undo {
            mv: m,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            key,
        });

        if let Some(captured) = m.captured() {
            let victim = if m.is_en_passant() {
                Self::en_passant_victim(m)
            } else {
                m.to()
            };
            self.xor_piece(victim, captured, them);
            hash ^= ZOBRIST.piece(them, captured, victim);
        }

        let placed = m.promotion().unwrap_or(m.piece());
        self.xor_piece(m.from(), m.piece(), us);
        self.xor_piece(m.to(), placed, us);
        hash ^= ZOBRIST.piece(us, m.piece(), m.from()) ^ ZOBRIST.piece(us, placed, m.to());

        if let Some((rook_from, rook_to)) = Self::castling_rook(m) {
            self.xor_piece(rook_from, Piece::Rook, us);
            self.xor_piece(rook_to, Piece::Rook, us);
            hash ^= ZOBRIST.piece(us, Piece::Rook, rook_from) ^ ZOBRIST.piece(us, Piece::Rook, rook_to);
        }

        self.castling = self.castling.after_touching(m.from(), m.to());
        self.en_passant = if m.is_double_push() {
            Square::from_coords(
                m.from().file().index() as i8,
                (m.from().rank().index() + m.to().rank().index()) as i8 / 2,
            )
        } else {
            None
        };

        if m.piece() == Piece::Pawn || m.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;

        hash ^= ZOBRIST.black_to_move() ^ ZOBRIST.castling(self.castling) ^ self.en_passant_key();
        self.hash = Some(hash);
    }

    /// Undoes the most recent move and returns it.
    pub fn retract_move(&mut self) -> Result<Move, PositionError> {
        let undo = self.history.pop().ok_or(PositionError::EmptyHistory)?;
        Ok(self.restore(undo))
    }

    /// Plays `m`, runs `f` on the resulting position, then takes back `m`
    /// and anything `f` left on the history.
    pub(crate) fn with_move<T>(&mut self, m: Move, f: impl FnOnce(&mut Position) -> T) -> T {
        let base = self.history.len();
        self.apply_move(m);
        let out = f(self);
        while self.history.len() > base {
            let Some(undo) = self.history.pop() else {
                break;
            };
            self.restore(undo);
        }
        out
    }

    fn restore(&mut self, undo: Undo) -> Move {
        let m = undo.mv;
        let us = m.color();

        if let Some((rook_from, rook_to)) = Self::castling_rook(m) {
            self.xor_piece(rook_to, Piece::Rook, us);
            self.xor_piece(rook_from, Piece::Rook, us);
        }

        self.xor_piece(m.to(), m.promotion().unwrap_or(m.piece()), us);
        self.xor_piece(m.from(), m.piece(), us);

        if let Some(captured) = m.captured() {
            let victim = if m.is_en_passant() {
                Self::en_passant_victim(m)
            } else {
                m.to()
            };
            self.xor_piece(victim, captured, us.opposite());
        }

        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }
        self.hash = Some(undo.key);
        m
    }

    /// An independent copy of this position. With `ignore_hashes` the cached
    /// key is dropped and recomputed on first use.
    pub fn deep_copy(&self, ignore_hashes: bool) -> Position {
        let mut copy = self.clone();
        if ignore_hashes {
            copy.hash = None;
        }
        copy
    }

    /// How many earlier positions in the reversible-move window share this
    /// position's key and side to move.
    pub fn repetition_count(&self) -> usize {
        let key = self.zobrist_hash();
        let window = (self.halfmove_clock as usize).min(self.history.len());
        self.history
            .iter()
            .rev()
            .take(window)
            .skip(1)
            .step_by(2)
            .filter(|u| u.key == key)
            .count()
    }
}

/// Board state equality. History and the hash cache are not compared.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.boards == other.boards
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Position {}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}
