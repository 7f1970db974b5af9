//! Rule set abstraction for chess variants.
//!
//! This module provides the [`RuleSet`] trait. Move generation, the SAN codec
//! and [`Game`](crate::Game) are written once against it; a variant only
//! supplies the handful of hooks where its rules differ from standard chess.

mod standard;
mod suicide;

pub use standard::StandardChess;
pub use suicide::SuicideChess;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::san::SanResolution;
use crate::trace::Tracer;
use crate::{movegen, Bitboard, MoveList, Position};
use chess_core::{Color, Piece};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw(DrawReason),
}

impl GameResult {
    /// The result in which `color` wins.
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub const fn winner(self) -> Option<Color> {
        match self {
            GameResult::WhiteWins => Some(Color::White),
            GameResult::BlackWins => Some(Color::Black),
            GameResult::Draw(_) => None,
        }
    }

    /// The PGN result token.
    pub const fn as_pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    InsufficientMaterial,
    /// 100 half-moves without pawn move or capture; claimable.
    FiftyMoveRule,
    /// 150 half-moves; automatic.
    SeventyFiveMoveRule,
    /// Claimable.
    ThreefoldRepetition,
    /// Automatic.
    FivefoldRepetition,
    Agreement,
    /// Suicide: the side to move is out of moves and both sides hold the
    /// same number of pieces.
    EqualPieceCount,
}

/// Where a game stands after the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    /// The side to move is in check but has a legal move.
    Check,
    Checkmate,
    /// The side to move has no legal move and is not in check. In variants
    /// without checkmate this is how every game without resignation ends;
    /// the result then depends on the rule set.
    Stalemate,
    Draw(DrawReason),
    /// The given side resigned.
    Resigned(Color),
}

impl GameStatus {
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check)
    }
}

/// A selectable rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    #[serde(alias = "standard", alias = "chess")]
    Classic,
    Suicide,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown variant: {0:?}")]
pub struct UnknownVariant(pub String);

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Classic, Variant::Suicide];

    /// The rule set implementing this variant.
    pub fn rules(self) -> &'static dyn RuleSet {
        match self {
            Variant::Classic => &StandardChess,
            Variant::Suicide => &SuicideChess,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Suicide => "suicide",
        }
    }
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "standard" | "chess" => Ok(Variant::Classic),
            "suicide" => Ok(Variant::Suicide),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for implementing chess variants.
///
/// A rule set is stateless and shared across games. Generation itself lives
/// in [`movegen`]; the rule set answers the questions where variants differ
/// and decides which pseudo-legal moves are legal.
///
/// # Example
///
/// ```
/// use chess_variants::{RuleSet, SuicideChess};
///
/// let position = SuicideChess.initial_position();
/// let moves = SuicideChess.legal_moves(&position);
/// assert_eq!(moves.len(), 20);
/// ```
pub trait RuleSet: fmt::Debug + Send + Sync {
    fn variant(&self) -> Variant;

    fn initial_position(&self) -> Position;

    /// Adjusts a position loaded from outside (e.g. FEN) to this rule set.
    fn prepare_position(&self, _position: &mut Position) {}

    /// Pieces a pawn may promote to, in generation order.
    fn promotion_pieces(&self) -> &'static [Piece];

    fn allows_castling(&self) -> bool;

    /// Whether the variant knows check at all. Without it no move carries
    /// the check flag and SAN gets no `+`/`#` suffix.
    fn has_check(&self) -> bool;

    /// Which of the mover's kings generate king moves.
    fn king_move_origins(&self, kings: Bitboard) -> Bitboard;

    /// Narrows pseudo-legal moves to legal ones.
    fn filter_legal_moves(&self, position: &Position, pseudo: MoveList, tracer: &Tracer)
        -> MoveList;

    /// True when the position could have arisen from a legal move, i.e. the
    /// side that just moved did not leave a king attacked.
    fn is_legal_position(&self, position: &Position) -> bool;

    /// The result when the side to move has no legal move.
    fn no_moves_result(&self, position: &Position) -> GameResult;

    fn is_insufficient_material(&self, position: &Position) -> bool;

    /// Variant-specific SAN forms. `None` hands the text to the generic
    /// decoder.
    fn resolve_san_override(&self, _san: &str, _legal: &MoveList) -> Option<SanResolution> {
        None
    }

    fn is_check(&self, position: &Position) -> bool {
        self.has_check() && movegen::is_king_attacked(position, position.side_to_move())
    }

    fn legal_moves(&self, position: &Position) -> MoveList {
        movegen::legal_moves(position, self)
    }

    fn pseudo_legal_moves(&self, position: &Position) -> MoveList {
        movegen::pseudo_legal_moves(position, self)
    }

    /// The result decided by this position alone: no legal moves, the
    /// seventy-five-move rule or insufficient material. Repetition needs the
    /// game history and is handled by [`Game`](crate::Game).
    fn game_result(&self, position: &Position) -> Option<GameResult> {
        if self.legal_moves(position).is_empty() {
            Some(self.no_moves_result(position))
        } else if position.halfmove_clock() >= 150 {
            Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule))
        } else if self.is_insufficient_material(position) {
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        } else {
            None
        }
    }
}
