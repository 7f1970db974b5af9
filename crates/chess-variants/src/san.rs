//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1".
//!
//! Both directions are relative to a position and a rule set: encoding
//! disambiguates against the legal moves, and decoding matches against them.

use crate::{MoveList, Position, RuleSet};
use chess_core::{File, Move, MoveFlags, Piece, Rank, Square};
use thiserror::Error;

/// Error type for SAN parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("ambiguous move {san}: candidates {candidates:?}")]
    AmbiguousMove { san: String, candidates: Vec<String> },
}

/// Outcome of matching SAN text against the legal moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanResolution {
    NotFound,
    Unique(Move),
    Ambiguous(Vec<Move>),
}

impl SanResolution {
    pub fn from_candidates(mut candidates: Vec<Move>) -> Self {
        match candidates.len() {
            0 => SanResolution::NotFound,
            1 => SanResolution::Unique(candidates.remove(0)),
            _ => SanResolution::Ambiguous(candidates),
        }
    }
}

/// Converts a legal move to SAN. `position` is the state before the move.
pub fn move_to_san<R: RuleSet + ?Sized>(position: &Position, rules: &R, m: Move) -> String {
    move_to_san_in(position, rules, m, &rules.legal_moves(position))
}

/// Like [`move_to_san`], reusing an already generated legal move list.
pub fn move_to_san_in<R: RuleSet + ?Sized>(
    position: &Position,
    rules: &R,
    m: Move,
    legal: &MoveList,
) -> String {
    let mut san = String::with_capacity(8);

    if m.flags().contains(MoveFlags::SHORT_CASTLE) {
        san.push_str("O-O");
    } else if m.flags().contains(MoveFlags::LONG_CASTLE) {
        san.push_str("O-O-O");
    } else {
        let piece = m.piece();
        if piece == Piece::Pawn {
            if m.is_capture() {
                san.push(m.from().file().to_char());
            }
        } else {
            san.push(piece.to_san_char());
            san.push_str(&disambiguation(m, legal));
        }
        if m.is_capture() {
            san.push('x');
        }
        san.push_str(&m.to().to_algebraic());
        if let Some(promotion) = m.promotion() {
            san.push('=');
            san.push(promotion.to_san_char());
        }
    }

    if rules.has_check() {
        let mut after = position.deep_copy(true);
        after.apply_move(m);
        if rules.is_check(&after) {
            san.push(if rules.legal_moves(&after).is_empty() {
                '#'
            } else {
                '+'
            });
        }
    }
    san
}

/// The shortest origin hint that separates `m` from other legal moves of
/// the same piece kind to the same square: file, then rank, then both.
fn disambiguation(m: Move, legal: &MoveList) -> String {
    let rivals: Vec<Square> = legal
        .iter()
        .filter(|o| o.piece() == m.piece() && o.to() == m.to() && o.from() != m.from())
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != m.from().file()) {
        m.from().file().to_char().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != m.from().rank()) {
        m.from().rank().to_char().to_string()
    } else {
        m.from().to_algebraic()
    }
}

/// Parses SAN and returns the unique legal move it names.
pub fn san_to_move<R: RuleSet + ?Sized>(
    position: &Position,
    rules: &R,
    san: &str,
) -> Result<Move, SanError> {
    san_to_move_in(rules, san, &rules.legal_moves(position))
}

/// Like [`san_to_move`], matching against an already generated legal list.
pub fn san_to_move_in<R: RuleSet + ?Sized>(
    rules: &R,
    san: &str,
    legal: &MoveList,
) -> Result<Move, SanError> {
    match resolve_san_in(rules, san, legal)? {
        SanResolution::Unique(m) => Ok(m),
        SanResolution::NotFound => Err(SanError::IllegalMove(san.trim().to_string())),
        SanResolution::Ambiguous(candidates) => Err(SanError::AmbiguousMove {
            san: san.trim().to_string(),
            candidates: candidates.iter().map(|m| m.to_uci()).collect(),
        }),
    }
}

/// Matches SAN against the legal moves of `position`, reporting all three
/// outcomes instead of failing on no match or several.
pub fn resolve_san<R: RuleSet + ?Sized>(
    position: &Position,
    rules: &R,
    san: &str,
) -> Result<SanResolution, SanError> {
    resolve_san_in(rules, san, &rules.legal_moves(position))
}

pub fn resolve_san_in<R: RuleSet + ?Sized>(
    rules: &R,
    san: &str,
    legal: &MoveList,
) -> Result<SanResolution, SanError> {
    let san = san.trim();
    if san.is_empty() {
        return Err(SanError::Empty);
    }

    let strict = san.trim_end_matches(['+', '#', '!', '?']);
    if strict.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    if let Some(resolution) = rules.resolve_san_override(strict, legal) {
        return Ok(resolution);
    }

    let candidates: Vec<Move> = match strict {
        "O-O" | "0-0" => legal
            .iter()
            .copied()
            .filter(|m| m.flags().contains(MoveFlags::SHORT_CASTLE))
            .collect(),
        "O-O-O" | "0-0-0" => legal
            .iter()
            .copied()
            .filter(|m| m.flags().contains(MoveFlags::LONG_CASTLE))
            .collect(),
        _ => {
            let parsed = ParsedSan::parse(strict)?;
            legal.iter().copied().filter(|&m| parsed.matches(m)).collect()
        }
    };

    Ok(SanResolution::from_candidates(candidates))
}

/// Parsed components of a non-castling SAN string.
#[derive(Debug, PartialEq, Eq)]
struct ParsedSan {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
    capture: bool,
}

impl ParsedSan {
    fn parse(san: &str) -> Result<Self, SanError> {
        let invalid = || SanError::InvalidFormat(san.to_string());
        let mut chars: Vec<char> = san.chars().collect();

        let piece = match chars.first() {
            Some(&c) if c.is_ascii_uppercase() => {
                chars.remove(0);
                Piece::from_san_char(c).ok_or_else(invalid)?
            }
            Some(_) => Piece::Pawn,
            None => return Err(SanError::Empty),
        };

        let capture = chars.contains(&'x');
        chars.retain(|&c| c != 'x');

        let promotion = match chars.iter().position(|&c| c == '=') {
            Some(eq) => {
                if eq + 2 != chars.len() {
                    return Err(invalid());
                }
                let letter = chars[eq + 1];
                chars.truncate(eq);
                Some(Piece::from_san_char(letter).ok_or_else(invalid)?)
            }
            // A pawn move may name its promotion without '=' (e8Q).
            None if piece == Piece::Pawn
                && chars.last().is_some_and(|c| c.is_ascii_uppercase()) =>
            {
                let letter = chars.pop().ok_or_else(invalid)?;
                Some(Piece::from_san_char(letter).ok_or_else(invalid)?)
            }
            None => None,
        };

        if chars.len() < 2 || chars.len() > 4 {
            return Err(invalid());
        }
        let split = chars.len() - 2;
        let to = Square::new(
            File::from_char(chars[split]).ok_or_else(invalid)?,
            Rank::from_char(chars[split + 1]).ok_or_else(invalid)?,
        );

        let (from_file, from_rank) = match chars[..split] {
            [] => (None, None),
            [c] => match (File::from_char(c), Rank::from_char(c)) {
                (Some(file), _) => (Some(file), None),
                (None, Some(rank)) => (None, Some(rank)),
                (None, None) => return Err(invalid()),
            },
            [f, r] => (
                Some(File::from_char(f).ok_or_else(invalid)?),
                Some(Rank::from_char(r).ok_or_else(invalid)?),
            ),
            _ => return Err(invalid()),
        };

        Ok(ParsedSan {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
            capture,
        })
    }

    fn matches(&self, m: Move) -> bool {
        // A pawn move without an origin file is a push along the file.
        let from_file = match (self.piece, self.from_file) {
            (Piece::Pawn, None) => Some(self.to.file()),
            (_, file) => file,
        };
        m.piece() == self.piece
            && m.to() == self.to
            && m.promotion() == self.promotion
            && from_file.map_or(true, |f| m.from().file() == f)
            && self.from_rank.map_or(true, |r| m.from().rank() == r)
            && (!self.capture || m.is_capture())
    }
}
