//! Full game management with history tracking.
//!
//! The [`Game`] struct provides complete game state management including:
//! - Move history with SAN notation and take-back
//! - Repetition and move-count draw rules
//! - Draw claiming, agreement and resignation
//! - PGN-style tags and export

use std::collections::BTreeMap;

use crate::movegen::legal_moves_traced;
use crate::rules::{DrawReason, GameResult, GameStatus, RuleSet, Variant};
use crate::san::{move_to_san_in, san_to_move_in, SanError};
use crate::trace::{TraceEvent, TraceHook, Tracer};
use crate::{MoveList, Position, PositionError};
use chess_core::{Color, Fen, FenError, Move, UciMove};
use serde::Serialize;
use thiserror::Error;

/// A recorded move in game history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMove {
    /// The move in internal format.
    pub mov: Move,
    /// SAN notation for the move.
    pub san: String,
    /// Zobrist hash of the position before the move.
    pub hash_before: u64,
}

/// Error type for game operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("invalid SAN: {0}")]
    InvalidSan(#[from] SanError),

    #[error(transparent)]
    IllegalState(#[from] PositionError),

    #[error("game has already ended")]
    GameAlreadyOver,

    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,

    #[error(transparent)]
    Fen(#[from] FenError),
}

/// A chess game under one rule set.
///
/// Unlike [`Position`], which represents a single board state, `Game` keeps
/// the SAN record, the metadata tags and the game status, and applies the
/// draw rules that need the move history.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    variant: Variant,
    rules: &'static dyn RuleSet,
    moves: Vec<GameMove>,
    tags: BTreeMap<String, String>,
    status: GameStatus,
    /// Set when the game ended by claim, agreement or resignation.
    ended_by_players: bool,
    tracer: Tracer,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Variant::Classic)
    }
}

impl Game {
    /// The seven-tag roster, written first and in this order.
    const ROSTER: [&'static str; 7] = [
        "Event", "Site", "Date", "Round", "White", "Black", "Result",
    ];

    /// Creates a new game from the variant's initial position.
    pub fn new(variant: Variant) -> Self {
        Self::from_position(variant, variant.rules().initial_position())
    }

    /// Creates a game from a FEN string. The `FEN` and `SetUp` tags record
    /// the non-standard start.
    pub fn from_fen(variant: Variant, fen: &str) -> Result<Self, GameError> {
        let mut position = Position::from_fen(fen)?;
        variant.rules().prepare_position(&mut position);
        let mut game = Self::from_position(variant, position);
        if game.position.to_fen() != Fen::STARTPOS || variant != Variant::Classic {
            game.tags.insert("SetUp".to_string(), "1".to_string());
            game.tags.insert("FEN".to_string(), game.position.to_fen());
        }
        Ok(game)
    }

    /// Creates a game from an existing position. Moves already on the
    /// position's history are kept for retraction and repetition, but are
    /// not part of the game record.
    pub fn from_position(variant: Variant, position: Position) -> Self {
        let mut tags = BTreeMap::new();
        for (name, value) in [
            ("Event", "?"),
            ("Site", "?"),
            ("Date", "????.??.??"),
            ("Round", "?"),
            ("White", "?"),
            ("Black", "?"),
            ("Result", "*"),
        ] {
            tags.insert(name.to_string(), value.to_string());
        }
        tags.insert("Variant".to_string(), variant.name().to_string());

        let mut game = Game {
            position,
            variant,
            rules: variant.rules(),
            moves: Vec::new(),
            tags,
            status: GameStatus::InProgress,
            ended_by_players: false,
            tracer: Tracer::disabled(),
        };
        game.refresh_status();
        game
    }

    /// Routes generation and play events to `hook`.
    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.tracer = Tracer::new(Some(hook));
        self
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn rules(&self) -> &'static dyn RuleSet {
        self.rules
    }

    pub fn legal_moves(&self) -> MoveList {
        legal_moves_traced(&self.position, self.rules, &self.tracer)
    }

    pub fn pseudo_legal_moves(&self) -> MoveList {
        self.rules.pseudo_legal_moves(&self.position)
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.rules.is_check(&self.position)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        match self.status {
            GameStatus::InProgress | GameStatus::Check => None,
            GameStatus::Checkmate | GameStatus::Stalemate => {
                Some(self.rules.no_moves_result(&self.position))
            }
            GameStatus::Draw(reason) => Some(GameResult::Draw(reason)),
            GameStatus::Resigned(color) => Some(GameResult::win_for(color.opposite())),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    /// Returns the number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Plays a move. Only squares and promotion choice are compared, so a
    /// hand-built [`Move`] is accepted and replaced by the generated one.
    pub fn make_move(&mut self, m: Move) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let legal = self.legal_moves();
        let found = legal
            .iter()
            .copied()
            .find(|l| l.from() == m.from() && l.to() == m.to() && l.promotion() == m.promotion())
            .ok_or_else(|| GameError::IllegalMove(m.to_uci()))?;
        Ok(self.record(found, &legal))
    }

    /// Plays a move given in SAN notation.
    pub fn make_move_san(&mut self, san: &str) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let legal = self.legal_moves();
        let m = san_to_move_in(self.rules, san, &legal)?;
        Ok(self.record(m, &legal))
    }

    /// Plays a move given in coordinate notation (`e2e4`, `e7e8k`).
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let wanted = UciMove::parse(uci)
            .ok_or_else(|| GameError::IllegalMove(format!("invalid UCI: {}", uci)))?;
        let legal = self.legal_moves();
        let found = legal
            .iter()
            .copied()
            .find(|&m| wanted.matches(m))
            .ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        Ok(self.record(found, &legal))
    }

    /// Takes back the last move. A game ended by resignation, agreement or
    /// a draw claim resumes.
    pub fn retract_move(&mut self) -> Result<Move, GameError> {
        let m = self.position.retract_move()?;
        self.moves.pop();
        self.tracer.emit(TraceEvent::MoveRetracted { mv: m });
        self.ended_by_players = false;
        self.refresh_status();
        Ok(m)
    }

    /// An independent copy for analysis. The copy shares the trace hook.
    pub fn deep_copy(&self, ignore_hashes: bool) -> Game {
        Game {
            position: self.position.deep_copy(ignore_hashes),
            ..self.clone()
        }
    }

    fn record(&mut self, m: Move, legal: &MoveList) -> Move {
        let san = move_to_san_in(&self.position, self.rules, m, legal);
        let hash_before = self.position.zobrist_hash();
        self.position.apply_move(m);
        self.tracer.emit(TraceEvent::MoveApplied {
            mv: m,
            san: san.clone(),
        });
        self.moves.push(GameMove {
            mov: m,
            san,
            hash_before,
        });
        self.refresh_status();
        m
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.status.is_over() {
            Err(GameError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }

    /// Recomputes the status from the position, unless the players ended
    /// the game themselves.
    fn refresh_status(&mut self) {
        if !self.ended_by_players {
            self.status = self.evaluate();
        }
        let token = self.result().map_or("*", GameResult::as_pgn);
        self.tags.insert("Result".to_string(), token.to_string());
    }

    fn evaluate(&self) -> GameStatus {
        let in_check = self.rules.is_check(&self.position);
        if self.legal_moves().is_empty() {
            return if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.position_count() >= 5 {
            GameStatus::Draw(DrawReason::FivefoldRepetition)
        } else if self.position.halfmove_clock() >= 150 {
            GameStatus::Draw(DrawReason::SeventyFiveMoveRule)
        } else if self.rules.is_insufficient_material(&self.position) {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if in_check {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }

    /// How many times the current position has occurred, this one included.
    pub fn position_count(&self) -> usize {
        self.position.repetition_count() + 1
    }

    /// Returns true if a draw can be claimed (threefold repetition or the
    /// fifty-move rule).
    pub fn can_claim_draw(&self) -> bool {
        !self.is_game_over() && self.claimable_draw().is_some()
    }

    fn claimable_draw(&self) -> Option<DrawReason> {
        if self.position_count() >= 3 {
            Some(DrawReason::ThreefoldRepetition)
        } else if self.position.halfmove_clock() >= 100 {
            Some(DrawReason::FiftyMoveRule)
        } else {
            None
        }
    }

    pub fn claim_draw(&mut self) -> Result<GameResult, GameError> {
        self.ensure_in_progress()?;
        let reason = self.claimable_draw().ok_or(GameError::CannotClaimDraw)?;
        self.end_by_players(GameStatus::Draw(reason));
        Ok(GameResult::Draw(reason))
    }

    /// Agrees to a draw (both players must agree in real chess).
    pub fn agree_draw(&mut self) -> Result<GameResult, GameError> {
        self.ensure_in_progress()?;
        self.end_by_players(GameStatus::Draw(DrawReason::Agreement));
        Ok(GameResult::Draw(DrawReason::Agreement))
    }

    /// `color` resigns.
    pub fn resign(&mut self, color: Color) -> Result<GameResult, GameError> {
        self.ensure_in_progress()?;
        self.end_by_players(GameStatus::Resigned(color));
        Ok(GameResult::win_for(color.opposite()))
    }

    fn end_by_players(&mut self, status: GameStatus) {
        self.status = status;
        self.ended_by_players = true;
        self.refresh_status();
        tracing::debug!(?status, "game ended by the players");
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Sets a metadata tag. `Result` is owned by the game and cannot be set.
    pub fn set_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if name != "Result" {
            self.tags.insert(name, value.into());
        }
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Renders the game as PGN: the seven-tag roster, the remaining tags in
    /// name order, and SAN movetext wrapped at 80 columns.
    pub fn to_pgn(&self) -> String {
        let mut pgn = String::new();
        for name in Self::ROSTER {
            if let Some(value) = self.tags.get(name) {
                pgn.push_str(&format!("[{} \"{}\"]\n", name, escape_tag(value)));
            }
        }
        for (name, value) in &self.tags {
            if !Self::ROSTER.contains(&name.as_str()) {
                pgn.push_str(&format!("[{} \"{}\"]\n", name, escape_tag(value)));
            }
        }
        pgn.push('\n');

        let start = self
            .tags
            .get("FEN")
            .and_then(|fen| Fen::parse(fen).ok())
            .map_or((1, Color::White), |fen| {
                (fen.fullmove_number, fen.side_to_move)
            });
        let mut tokens = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        let (mut number, mut to_move) = start;
        for (i, gm) in self.moves.iter().enumerate() {
            if to_move == Color::White {
                tokens.push(format!("{}.", number));
            } else if i == 0 {
                tokens.push(format!("{}...", number));
            }
            tokens.push(gm.san.clone());
            if to_move == Color::Black {
                number += 1;
            }
            to_move = to_move.opposite();
        }
        tokens.push(self.tag("Result").unwrap_or("*").to_string());

        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() && line.len() + 1 + token.len() > 80 {
                pgn.push_str(&line);
                pgn.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&token);
        }
        pgn.push_str(&line);
        pgn.push('\n');
        pgn
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
