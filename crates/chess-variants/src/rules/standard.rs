//! Standard chess rules implementation.

use super::{DrawReason, GameResult, RuleSet, Variant};
use crate::movegen::is_king_attacked;
use crate::trace::{RejectReason, TraceEvent, Tracer};
use crate::{Bitboard, MoveList, Position};
use chess_core::{Color, MoveFlags, Piece};

/// Standard chess rules (FIDE).
///
/// - Promotion to queen, rook, bishop or knight
/// - Castling on both wings
/// - A move is legal only if it leaves none of the mover's kings attacked
/// - Checkmate, stalemate and insufficient material
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];
}

impl RuleSet for StandardChess {
    fn variant(&self) -> Variant {
        Variant::Classic
    }

    fn initial_position(&self) -> Position {
        Position::startpos()
    }

    fn promotion_pieces(&self) -> &'static [Piece] {
        &Self::PROMOTIONS
    }

    fn allows_castling(&self) -> bool {
        true
    }

    fn has_check(&self) -> bool {
        true
    }

    /// Only the first king is considered; standard positions have one.
    fn king_move_origins(&self, kings: Bitboard) -> Bitboard {
        match kings.bitscan_forward() {
            Some(sq) => Bitboard::from_square(sq),
            None => Bitboard::EMPTY,
        }
    }

    /// Plays each move on a scratch copy and keeps those that leave the
    /// mover's kings unattacked, flagging the ones that attack the
    /// opponent's king.
    fn filter_legal_moves(
        &self,
        position: &Position,
        pseudo: MoveList,
        tracer: &Tracer,
    ) -> MoveList {
        let us = position.side_to_move();
        let traced = tracer.is_enabled();
        let mut scratch = position.deep_copy(true);
        let mut legal = MoveList::with_capacity(pseudo.len());

        for m in pseudo {
            let (leaves_king, checks) = scratch.with_move(m, |after| {
                let leaves_king = is_king_attacked(after, us);
                (leaves_king, !leaves_king && is_king_attacked(after, us.opposite()))
            });

            if leaves_king {
                if traced {
                    tracer.emit(TraceEvent::MoveRejected {
                        mv: m,
                        reason: RejectReason::KingLeftAttacked,
                    });
                }
            } else if checks {
                legal.push(m.with_flags(MoveFlags::CHECK));
            } else {
                legal.push(m);
            }
        }
        legal
    }

    fn is_legal_position(&self, position: &Position) -> bool {
        !is_king_attacked(position, position.side_to_move().opposite())
    }

    fn no_moves_result(&self, position: &Position) -> GameResult {
        let to_move = position.side_to_move();
        if is_king_attacked(position, to_move) {
            GameResult::win_for(to_move.opposite())
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        }
    }

    /// K v K, K+minor v K, and bishops-only endings where every bishop
    /// stands on the same square color.
    fn is_insufficient_material(&self, position: &Position) -> bool {
        let heavy_or_pawns = [Piece::Pawn, Piece::Rook, Piece::Queen]
            .into_iter()
            .any(|p| {
                Color::BOTH
                    .into_iter()
                    .any(|c| position.pieces_of(p, c).is_not_empty())
            });
        if heavy_or_pawns {
            return false;
        }

        let knights = position.pieces_of(Piece::Knight, Color::White)
            | position.pieces_of(Piece::Knight, Color::Black);
        let bishops = position.pieces_of(Piece::Bishop, Color::White)
            | position.pieces_of(Piece::Bishop, Color::Black);
        let minors = (knights | bishops).count();

        if minors <= 1 {
            return true;
        }
        if knights.is_empty() {
            let light = (bishops & Bitboard::LIGHT_SQUARES).is_not_empty();
            let dark = (bishops & !Bitboard::LIGHT_SQUARES).is_not_empty();
            return !(light && dark);
        }
        false
    }
}
