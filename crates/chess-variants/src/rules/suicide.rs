//! Suicide chess (FICS rules).

use super::{DrawReason, GameResult, RuleSet, Variant};
use crate::san::SanResolution;
use crate::trace::{RejectReason, TraceEvent, Tracer};
use crate::{Bitboard, MoveList, Position};
use chess_core::{File, Move, Piece, Rank, Square};

/// Suicide chess as played on FICS.
///
/// The goal is to lose every piece. Captures are compulsory, there is no
/// check so kings are ordinary pieces that may be captured, pawns may
/// promote to a king, and castling does not exist. When the side to move
/// has no legal move the player with fewer pieces wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuicideChess;

impl SuicideChess {
    const PROMOTIONS: [Piece; 5] = [
        Piece::Queen,
        Piece::Rook,
        Piece::Bishop,
        Piece::Knight,
        Piece::King,
    ];
}

/// A pawn promotion to king written in one of the short suicide forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KingPromotion {
    /// `e8K`
    To(Square),
    /// `edK`
    Files(File, File),
    /// `ed8K`, also written `exd8K`
    FileTo(File, Square),
}

impl KingPromotion {
    /// Parses the king-promotion forms. `san` must already be free of
    /// annotation suffixes.
    fn parse(san: &str) -> Option<Self> {
        let body = san.strip_suffix('K')?;
        let body = body.strip_suffix('=').unwrap_or(body);
        let chars: Vec<char> = body.chars().filter(|&c| c != 'x').collect();
        match *chars.as_slice() {
            [f, r] if Rank::from_char(r).is_some() => Some(KingPromotion::To(Square::new(
                File::from_char(f)?,
                Rank::from_char(r)?,
            ))),
            [from, to] => Some(KingPromotion::Files(
                File::from_char(from)?,
                File::from_char(to)?,
            )),
            [from, f, r] => Some(KingPromotion::FileTo(
                File::from_char(from)?,
                Square::new(File::from_char(f)?, Rank::from_char(r)?),
            )),
            _ => None,
        }
    }

    fn matches(self, m: Move) -> bool {
        if m.piece() != Piece::Pawn || m.promotion() != Some(Piece::King) {
            return false;
        }
        match self {
            KingPromotion::To(to) => m.to() == to,
            KingPromotion::Files(from, to) => m.from().file() == from && m.to().file() == to,
            KingPromotion::FileTo(from, to) => m.from().file() == from && m.to() == to,
        }
    }
}

impl RuleSet for SuicideChess {
    fn variant(&self) -> Variant {
        Variant::Suicide
    }

    fn initial_position(&self) -> Position {
        let mut position = Position::startpos();
        self.prepare_position(&mut position);
        position
    }

    /// Castling rights carried in by a FEN are meaningless here.
    fn prepare_position(&self, position: &mut Position) {
        position.set_castling(crate::CastlingRights::NONE);
    }

    fn promotion_pieces(&self) -> &'static [Piece] {
        &Self::PROMOTIONS
    }

    fn allows_castling(&self) -> bool {
        false
    }

    fn has_check(&self) -> bool {
        false
    }

    fn king_move_origins(&self, kings: Bitboard) -> Bitboard {
        kings
    }

    /// Captures are compulsory: when any capture exists, only captures are
    /// legal.
    fn filter_legal_moves(
        &self,
        _position: &Position,
        pseudo: MoveList,
        tracer: &Tracer,
    ) -> MoveList {
        let captures = pseudo.iter().filter(|m| m.is_capture()).count();
        if captures == 0 {
            return pseudo;
        }

        tracer.emit(TraceEvent::MandatoryCapture {
            captures,
            discarded: pseudo.len() - captures,
        });
        let traced = tracer.is_enabled();
        let mut only_captures = MoveList::with_capacity(captures);
        for m in pseudo {
            if m.is_capture() {
                only_captures.push_high(m);
            } else if traced {
                tracer.emit(TraceEvent::MoveRejected {
                    mv: m,
                    reason: RejectReason::CaptureAvailable,
                });
            }
        }
        only_captures
    }

    fn is_legal_position(&self, _position: &Position) -> bool {
        true
    }

    fn no_moves_result(&self, position: &Position) -> GameResult {
        let to_move = position.side_to_move();
        let mine = position.piece_count(to_move);
        let theirs = position.piece_count(to_move.opposite());
        match mine.cmp(&theirs) {
            std::cmp::Ordering::Less => GameResult::win_for(to_move),
            std::cmp::Ordering::Greater => GameResult::win_for(to_move.opposite()),
            std::cmp::Ordering::Equal => GameResult::Draw(DrawReason::EqualPieceCount),
        }
    }

    fn is_insufficient_material(&self, _position: &Position) -> bool {
        false
    }

    /// Resolves `e8K`, `edK`, `ed8K` and `exd8K` against the legal moves.
    /// Exactly one match is required; there is no check to break ties.
    fn resolve_san_override(&self, san: &str, legal: &MoveList) -> Option<SanResolution> {
        if !san.starts_with(|c: char| File::from_char(c).is_some()) {
            return None;
        }
        let form = KingPromotion::parse(san)?;
        let candidates: Vec<Move> = legal.iter().copied().filter(|&m| form.matches(m)).collect();
        Some(SanResolution::from_candidates(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::legal_moves_traced;
    use chess_core::Color;
    use std::sync::{Arc, Mutex};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        let mut position = Position::from_fen(fen).unwrap();
        SuicideChess.prepare_position(&mut position);
        position
    }

    #[test]
    fn initial_position_has_no_castling() {
        let position = SuicideChess.initial_position();
        assert!(position.castling().is_empty());
        assert_eq!(position.zobrist_hash(), position.compute_hash());
        assert_eq!(SuicideChess.legal_moves(&position).len(), 20);
    }

    #[test]
    fn castling_never_generated() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(!SuicideChess
            .legal_moves(&position)
            .iter()
            .any(|m| m.is_castling()));
        SuicideChess.prepare_position(&mut position);
        assert!(position.castling().is_empty());
    }

    #[test]
    fn capture_is_mandatory() {
        let position = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let moves = SuicideChess.legal_moves(&position);
        assert_eq!(moves.len(), 1);
        let only = moves.get(0).unwrap();
        assert_eq!((only.from(), only.to()), (sq("e4"), sq("d5")));
        assert!(moves.low_priority().is_empty());
    }

    #[test]
    fn hook_sees_quiet_moves_rejected() {
        let position = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let rejected = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&rejected);
        let tracer = Tracer::new(Some(Arc::new(move |event: &TraceEvent| {
            if let TraceEvent::MoveRejected { reason, .. } = event {
                assert_eq!(*reason, RejectReason::CaptureAvailable);
                *sink.lock().unwrap() += 1;
            }
        })));

        let legal = legal_moves_traced(&position, &SuicideChess, &tracer);
        assert_eq!(legal.len(), 1);
        assert_eq!(
            *rejected.lock().unwrap(),
            SuicideChess.pseudo_legal_moves(&position).len() - 1
        );
    }

    #[test]
    fn king_may_be_left_attacked() {
        let position = pos("4k3/8/8/8/8/8/4r3/K7 w - - 0 1");
        assert!(SuicideChess.is_legal_position(&position));
        assert!(!SuicideChess.is_check(&position));
        assert_eq!(SuicideChess.legal_moves(&position).len(), 3);
    }

    #[test]
    fn king_can_be_captured() {
        let position = pos("8/8/8/8/8/8/1k6/K7 w - - 0 1");
        let moves = SuicideChess.legal_moves(&position);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves.get(0).unwrap().captured(), Some(Piece::King));
    }

    #[test]
    fn fewer_pieces_wins_when_out_of_moves() {
        // White pawn blocked, White has fewer pieces.
        let blocked = pos("8/8/8/8/8/p7/P7/8 w - - 0 1");
        assert!(SuicideChess.legal_moves(&blocked).is_empty());
        assert_eq!(
            SuicideChess.game_result(&blocked),
            Some(GameResult::Draw(DrawReason::EqualPieceCount))
        );

        let fewer = pos("8/8/8/8/8/p7/P7/7r w - - 0 1");
        assert_eq!(SuicideChess.game_result(&fewer), Some(GameResult::WhiteWins));

        let no_pieces = pos("8/8/8/8/8/8/8/7r w - - 0 1");
        assert_eq!(SuicideChess.game_result(&no_pieces), Some(GameResult::WhiteWins));

        let stuck = pos("8/8/8/8/8/p7/P7/B7 b - - 0 1");
        assert!(SuicideChess.legal_moves(&stuck).is_empty());
        assert_eq!(SuicideChess.game_result(&stuck), Some(GameResult::BlackWins));
    }

    #[test]
    fn king_promotion_forms() {
        assert_eq!(KingPromotion::parse("e8K"), Some(KingPromotion::To(sq("e8"))));
        assert_eq!(KingPromotion::parse("e8=K"), Some(KingPromotion::To(sq("e8"))));
        assert_eq!(
            KingPromotion::parse("edK"),
            Some(KingPromotion::Files(File::E, File::D))
        );
        assert_eq!(
            KingPromotion::parse("ed8K"),
            Some(KingPromotion::FileTo(File::E, sq("d8")))
        );
        assert_eq!(
            KingPromotion::parse("exd8K"),
            Some(KingPromotion::FileTo(File::E, sq("d8")))
        );
        assert_eq!(KingPromotion::parse("e8Q"), None);
        assert_eq!(KingPromotion::parse("e9K"), None);
        assert_eq!(KingPromotion::parse("K"), None);
    }

    #[test]
    fn override_resolves_king_promotion() {
        let position = pos("8/4P3/8/8/8/8/8/k7 w - - 0 1");
        let legal = SuicideChess.legal_moves(&position);
        match SuicideChess.resolve_san_override("e8K", &legal) {
            Some(SanResolution::Unique(m)) => {
                assert_eq!(m.to(), sq("e8"));
                assert_eq!(m.promotion(), Some(Piece::King));
                assert_eq!(m.color(), Color::White);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(SuicideChess.resolve_san_override("Ka2", &legal).is_none());
        assert!(SuicideChess.resolve_san_override("e8Q", &legal).is_none());
        assert_eq!(
            SuicideChess.resolve_san_override("d8K", &legal),
            Some(SanResolution::NotFound)
        );
    }

    #[test]
    fn override_reports_ambiguity() {
        let position = pos("3r4/2P1P3/8/8/8/8/8/k7 w - - 0 1");
        let legal = SuicideChess.legal_moves(&position);
        match SuicideChess.resolve_san_override("d8K", &legal) {
            Some(SanResolution::Ambiguous(candidates)) => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            SuicideChess.resolve_san_override("cdK", &legal),
            Some(SanResolution::Unique(_))
        ));
    }
}
