//! Core value types for chess and its variants.
//!
//! This crate provides the fundamental types shared by the engine and its
//! callers:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], [`MoveFlags`] and [`UciMove`] for move representation
//! - [`Fen`] parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenCastling, FenError};
pub use mov::{Move, MoveFlags, UciMove};
pub use piece::Piece;
pub use square::{File, ParseSquareError, Rank, Square};
