//! Bitboard chess engine for standard chess and its variants.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit board representation with efficient operations
//! - [`Position`] - Board state with in-place apply/retract and a Zobrist key
//! - [`RuleSet`] - Trait for implementing chess variants, with
//!   [`StandardChess`] and [`SuicideChess`]
//! - [`Game`] - Complete game management with history, tags and PGN export
//! - SAN notation parsing and generation
//!
//! # Architecture
//!
//! Move generation is written once over bitboards and asks the active
//! [`RuleSet`] wherever variants differ: promotion choices, castling, which
//! kings move, and how pseudo-legal moves are narrowed to legal ones.
//!
//! # Example
//!
//! ```
//! use chess_variants::{Game, GameStatus, RuleSet, SuicideChess, Variant};
//!
//! // Using a rule set directly (stateless)
//! let position = SuicideChess.initial_position();
//! let moves = SuicideChess.legal_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! // Using Game for full game management
//! let mut game = Game::new(Variant::Suicide);
//! game.make_move_san("e3").unwrap();
//! game.make_move_san("b5").unwrap();
//! // The bishop must now take on b5.
//! assert_eq!(game.legal_moves().len(), 1);
//! assert_eq!(game.status(), GameStatus::InProgress);
//! ```

mod bitboard;
mod config;
mod game;
pub mod movegen;
mod position;
pub mod rules;
pub mod san;
pub mod trace;
mod zobrist;

pub use bitboard::Bitboard;
pub use config::{ConfigError, GameConfig};
pub use game::{Game, GameError, GameMove};
pub use movegen::{
    is_king_attacked, is_square_attacked, legal_moves, perft::perft, perft::perft_divide,
    pseudo_legal_moves, MoveList,
};
pub use position::{CastlingRights, Position, PositionError};
pub use rules::{
    DrawReason, GameResult, GameStatus, RuleSet, StandardChess, SuicideChess, UnknownVariant,
    Variant,
};
pub use san::{move_to_san, resolve_san, san_to_move, SanError, SanResolution};
pub use trace::{RejectReason, TraceEvent, TraceHook, Tracer};
