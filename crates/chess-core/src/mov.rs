//! Move representation.

use crate::{Color, Piece, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Characteristics of a move, as a small bit set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(1 << 1);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1 << 2);
    pub const SHORT_CASTLE: MoveFlags = MoveFlags(1 << 3);
    pub const LONG_CASTLE: MoveFlags = MoveFlags(1 << 4);
    pub const PROMOTION: MoveFlags = MoveFlags(1 << 5);
    pub const CHECK: MoveFlags = MoveFlags(1 << 6);

    #[inline]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: MoveFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: MoveFlags) -> MoveFlags {
        MoveFlags(self.0 | other.0)
    }
}

impl BitOr for MoveFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for MoveFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MoveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(MoveFlags, &str); 7] = [
            (MoveFlags::CAPTURE, "CAPTURE"),
            (MoveFlags::DOUBLE_PUSH, "DOUBLE_PUSH"),
            (MoveFlags::EN_PASSANT, "EN_PASSANT"),
            (MoveFlags::SHORT_CASTLE, "SHORT_CASTLE"),
            (MoveFlags::LONG_CASTLE, "LONG_CASTLE"),
            (MoveFlags::PROMOTION, "PROMOTION"),
            (MoveFlags::CHECK, "CHECK"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&set.join(" | "))
        }
    }
}

/// A single ply.
///
/// A move records what was on the board when it was generated: the moving
/// piece, the captured piece and the promotion choice. It is only meaningful
/// for the position it was generated from and is never re-derived from the
/// board afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    color: Color,
    captured: Option<Piece>,
    promotion: Option<Piece>,
    flags: MoveFlags,
}

impl Move {
    /// A quiet move.
    #[inline]
    pub const fn new(from: Square, to: Square, piece: Piece, color: Color) -> Self {
        Move {
            from,
            to,
            piece,
            color,
            captured: None,
            promotion: None,
            flags: MoveFlags::NONE,
        }
    }

    /// Returns a copy of this move capturing `captured`.
    #[inline]
    pub const fn capturing(mut self, captured: Piece) -> Self {
        self.captured = Some(captured);
        self.flags = self.flags.union(MoveFlags::CAPTURE);
        self
    }

    /// Returns a copy of this move promoting to `piece`.
    #[inline]
    pub const fn promoting(mut self, piece: Piece) -> Self {
        self.promotion = Some(piece);
        self.flags = self.flags.union(MoveFlags::PROMOTION);
        self
    }

    /// Returns a copy of this move with extra characteristic flags.
    #[inline]
    pub const fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = self.flags.union(flags);
        self
    }

    #[inline]
    pub const fn from(self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(self) -> Square {
        self.to
    }

    #[inline]
    pub const fn piece(self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn color(self) -> Color {
        self.color
    }

    #[inline]
    pub const fn captured(self) -> Option<Piece> {
        self.captured
    }

    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.promotion
    }

    #[inline]
    pub const fn flags(self) -> MoveFlags {
        self.flags
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_double_push(self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PUSH)
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.flags.contains(MoveFlags::PROMOTION)
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.flags
            .intersects(MoveFlags::SHORT_CASTLE.union(MoveFlags::LONG_CASTLE))
    }

    #[inline]
    pub const fn gives_check(self) -> bool {
        self.flags.contains(MoveFlags::CHECK)
    }

    /// Long algebraic coordinates, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(self) -> String {
        match self.promotion {
            Some(piece) => format!(
                "{}{}{}",
                self.from,
                self.to,
                piece.to_san_char().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({} {} {:?})", self.to_uci(), self.piece, self.flags)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// A coordinate move as reported by engines and servers.
///
/// It carries only squares and the promotion choice; it must be matched
/// against a legal move list to become a [`Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl UciMove {
    /// Parses `e2e4`, `e7e8q` or `e7e8k`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => match Piece::from_san_char(c.to_ascii_uppercase())? {
                Piece::Pawn => return None,
                piece => Some(piece),
            },
            None => None,
        };
        Some(UciMove {
            from,
            to,
            promotion,
        })
    }

    /// Returns true if `m` is the move this coordinate pair names.
    pub fn matches(&self, m: Move) -> bool {
        m.from() == self.from && m.to() == self.to && m.promotion() == self.promotion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn builder_sets_flags() {
        let m = Move::new(sq("e7"), sq("d8"), Piece::Pawn, Color::White)
            .capturing(Piece::Rook)
            .promoting(Piece::Queen);
        assert!(m.is_capture());
        assert!(m.is_promotion());
        assert!(!m.is_castling());
        assert_eq!(m.captured(), Some(Piece::Rook));
        assert_eq!(m.promotion(), Some(Piece::Queen));
        assert_eq!(m.to_uci(), "e7d8q");
    }

    #[test]
    fn quiet_move() {
        let m = Move::new(sq("g1"), sq("f3"), Piece::Knight, Color::White);
        assert!(!m.is_capture());
        assert_eq!(m.flags(), MoveFlags::NONE);
        assert_eq!(m.to_string(), "g1f3");
    }

    #[test]
    fn castle_and_check_flags() {
        let m = Move::new(Square::E1, Square::G1, Piece::King, Color::White)
            .with_flags(MoveFlags::SHORT_CASTLE);
        assert!(m.is_castling());
        assert!(!m.gives_check());
        assert!(m.with_flags(MoveFlags::CHECK).gives_check());
    }

    #[test]
    fn flags_debug() {
        let flags = MoveFlags::CAPTURE | MoveFlags::PROMOTION;
        assert_eq!(format!("{:?}", flags), "CAPTURE | PROMOTION");
        assert_eq!(format!("{:?}", MoveFlags::NONE), "NONE");
    }

    #[test]
    fn uci_parse() {
        let m = UciMove::parse("e2e4").unwrap();
        assert_eq!(m.from, sq("e2"));
        assert_eq!(m.to, sq("e4"));
        assert_eq!(m.promotion, None);

        assert_eq!(UciMove::parse("e7e8q").unwrap().promotion, Some(Piece::Queen));
        assert_eq!(UciMove::parse("e7e8K").unwrap().promotion, Some(Piece::King));
        assert!(UciMove::parse("e7e8p").is_none());
        assert!(UciMove::parse("e7e8x").is_none());
        assert!(UciMove::parse("e2").is_none());
        assert!(UciMove::parse("e2e4qq").is_none());
        assert!(UciMove::parse("e2e9").is_none());
    }

    #[test]
    fn uci_matches() {
        let m = Move::new(sq("a7"), sq("a8"), Piece::Pawn, Color::White).promoting(Piece::King);
        assert!(UciMove::parse("a7a8k").unwrap().matches(m));
        assert!(!UciMove::parse("a7a8q").unwrap().matches(m));
    }
}
