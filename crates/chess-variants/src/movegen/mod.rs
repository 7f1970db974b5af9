//! Move generation.
//!
//! Generation is split in two stages. [`pseudo_legal_moves`] produces every
//! move that obeys piece movement, consulting the rule set for the handful of
//! variant deltas (promotion choices, castling, which kings move). The rule
//! set's [`filter_legal_moves`](crate::RuleSet::filter_legal_moves) then turns
//! that list into the legal one.

mod attacks;
pub mod perft;
mod rays;

use crate::trace::{TraceEvent, Tracer};
use crate::{Bitboard, Position, RuleSet};
use chess_core::{Color, File, Move, MoveFlags, Piece, Rank, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, pawn_captures,
    pawn_double_pushes, pawn_single_pushes, queen_attacks, rook_attacks,
};

/// Moves in two priority tiers.
///
/// Captures and checking moves go to the high tier, everything else to the
/// low tier. Iteration yields the high tier first. The tiers are an ordering
/// hint for consumers; they carry no legality meaning.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    high: Vec<Move>,
    low: Vec<Move>,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MoveList {
            high: Vec::with_capacity(capacity / 4),
            low: Vec::with_capacity(capacity),
        }
    }

    /// Adds a move to the tier its flags select.
    #[inline]
    pub fn push(&mut self, m: Move) {
        if m.is_capture() || m.gives_check() {
            self.high.push(m);
        } else {
            self.low.push(m);
        }
    }

    /// Adds a move to the high tier regardless of its flags.
    #[inline]
    pub fn push_high(&mut self, m: Move) {
        self.high.push(m);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }

    pub fn high_priority(&self) -> &[Move] {
        &self.high
    }

    pub fn low_priority(&self) -> &[Move] {
        &self.low
    }

    pub fn iter(&self) -> std::iter::Chain<std::slice::Iter<'_, Move>, std::slice::Iter<'_, Move>> {
        self.high.iter().chain(self.low.iter())
    }

    pub fn get(&self, index: usize) -> Option<Move> {
        if index < self.high.len() {
            Some(self.high[index])
        } else {
            self.low.get(index - self.high.len()).copied()
        }
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.high.contains(m) || self.low.contains(m)
    }

    pub fn any_capture(&self) -> bool {
        self.iter().any(|m| m.is_capture())
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.high.retain(&mut f);
        self.low.retain(&mut f);
    }

    /// All moves, high tier first.
    pub fn to_vec(&self) -> Vec<Move> {
        self.iter().copied().collect()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::iter::Chain<std::slice::Iter<'a, Move>, std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Chain<std::vec::IntoIter<Move>, std::vec::IntoIter<Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.high.into_iter().chain(self.low)
    }
}

impl FromIterator<Move> for MoveList {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut list = MoveList::new();
        for m in iter {
            list.push(m);
        }
        list
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveList")
            .field("high", &self.high)
            .field("low", &self.low)
            .finish()
    }
}

/// The legal moves for the side to move under `rules`.
pub fn legal_moves<R: RuleSet + ?Sized>(position: &Position, rules: &R) -> MoveList {
    legal_moves_traced(position, rules, &Tracer::disabled())
}

pub fn legal_moves_traced<R: RuleSet + ?Sized>(
    position: &Position,
    rules: &R,
    tracer: &Tracer,
) -> MoveList {
    let pseudo = pseudo_legal_moves(position, rules);
    tracer.emit(TraceEvent::PseudoLegalGenerated {
        count: pseudo.len(),
    });
    rules.filter_legal_moves(position, pseudo, tracer)
}

/// Every move for the side to move that obeys piece movement, before any
/// king-safety or variant filtering.
pub fn pseudo_legal_moves<R: RuleSet + ?Sized>(position: &Position, rules: &R) -> MoveList {
    let mut moves = MoveList::with_capacity(64);
    let us = position.side_to_move();
    let targets = !position.occupied_by(us);
    let occupied = position.occupied();

    generate_pawn_moves(position, rules.promotion_pieces(), &mut moves);

    for from in position.pieces_of(Piece::Knight, us) {
        push_piece_moves(position, Piece::Knight, from, knight_attacks(from) & targets, &mut moves);
    }
    for from in position.pieces_of(Piece::Bishop, us) {
        let attacks = bishop_attacks(from, occupied) & targets;
        push_piece_moves(position, Piece::Bishop, from, attacks, &mut moves);
    }
    for from in position.pieces_of(Piece::Rook, us) {
        let attacks = rook_attacks(from, occupied) & targets;
        push_piece_moves(position, Piece::Rook, from, attacks, &mut moves);
    }
    for from in position.pieces_of(Piece::Queen, us) {
        let attacks = queen_attacks(from, occupied) & targets;
        push_piece_moves(position, Piece::Queen, from, attacks, &mut moves);
    }
    for from in rules.king_move_origins(position.pieces_of(Piece::King, us)) {
        push_piece_moves(position, Piece::King, from, king_attacks(from) & targets, &mut moves);
    }

    if rules.allows_castling() {
        generate_castling_moves(position, &mut moves);
    }

    moves
}

/// The kind of enemy piece standing on `sq`, if any.
#[inline]
fn captured_on(position: &Position, sq: Square, them: Color) -> Option<Piece> {
    if !position.occupied_by(them).contains(sq) {
        return None;
    }
    Piece::ALL
        .into_iter()
        .find(|&p| position.pieces_of(p, them).contains(sq))
}

fn push_piece_moves(
    position: &Position,
    piece: Piece,
    from: Square,
    targets: Bitboard,
    moves: &mut MoveList,
) {
    let us = position.side_to_move();
    for to in targets {
        let m = Move::new(from, to, piece, us);
        moves.push(match captured_on(position, to, us.opposite()) {
            Some(captured) => m.capturing(captured),
            None => m,
        });
    }
}

fn push_pawn_move(m: Move, promotions: &[Piece], moves: &mut MoveList) {
    if Bitboard::PROMOTION_RANKS.contains(m.to()) {
        for &piece in promotions {
            moves.push(m.promoting(piece));
        }
    } else {
        moves.push(m);
    }
}

fn generate_pawn_moves(position: &Position, promotions: &[Piece], moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = us.opposite();
    let pawns = position.pieces_of(Piece::Pawn, us);
    let empty = position.empty_squares();
    let back = match us {
        Color::White => -1,
        Color::Black => 1,
    };

    for to in pawn_single_pushes(pawns, us, empty) {
        if let Some(from) = to.shift_rank(back) {
            push_pawn_move(Move::new(from, to, Piece::Pawn, us), promotions, moves);
        }
    }

    for to in pawn_double_pushes(pawns, us, empty) {
        if let Some(from) = to.shift_rank(2 * back) {
            moves.push(
                Move::new(from, to, Piece::Pawn, us).with_flags(MoveFlags::DOUBLE_PUSH),
            );
        }
    }

    let enemies = position.occupied_by(them);
    for from in pawns {
        for to in pawn_captures(Bitboard::from_square(from), us, enemies) {
            if let Some(captured) = captured_on(position, to, them) {
                let m = Move::new(from, to, Piece::Pawn, us).capturing(captured);
                push_pawn_move(m, promotions, moves);
            }
        }
    }

    if let Some(ep) = position.en_passant() {
        for from in pawn_attacks(ep, them) & pawns {
            let victim = Square::new(ep.file(), from.rank());
            if position.pieces_of(Piece::Pawn, them).contains(victim)
                && !position.occupied().contains(ep)
            {
                moves.push(
                    Move::new(from, ep, Piece::Pawn, us)
                        .capturing(Piece::Pawn)
                        .with_flags(MoveFlags::EN_PASSANT),
                );
            }
        }
    }
}

/// King-side and queen-side castling. The king must stand on its home square
/// with the rook in its corner, the squares between them must be empty, and
/// the king may not be in check or pass through an attacked square. Whether
/// the destination is attacked is left to the legality filter.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = us.opposite();
    let rights = position.castling();
    let rank = Rank::ALL[us.back_rank() as usize];
    let king_from = Square::new(File::E, rank);

    if !(rights.kingside(us) || rights.queenside(us))
        || !position.pieces_of(Piece::King, us).contains(king_from)
        || is_square_attacked(position, king_from, them)
    {
        return;
    }

    let occupied = position.occupied();
    let rooks = position.pieces_of(Piece::Rook, us);
    let sides = [
        (
            rights.kingside(us),
            File::H,
            &[File::F, File::G][..],
            File::F,
            File::G,
            MoveFlags::SHORT_CASTLE,
        ),
        (
            rights.queenside(us),
            File::A,
            &[File::B, File::C, File::D][..],
            File::D,
            File::C,
            MoveFlags::LONG_CASTLE,
        ),
    ];

    for (allowed, rook_file, between, pass, dest, flag) in sides {
        if !allowed || !rooks.contains(Square::new(rook_file, rank)) {
            continue;
        }
        let path = between
            .iter()
            .fold(Bitboard::EMPTY, |acc, &f| acc | Bitboard::from_square(Square::new(f, rank)));
        if (path & occupied).is_not_empty()
            || is_square_attacked(position, Square::new(pass, rank), them)
        {
            continue;
        }
        moves.push(
            Move::new(king_from, Square::new(dest, rank), Piece::King, us).with_flags(flag),
        );
    }
}

/// Returns true if `sq` is attacked by any piece of `by`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let occupied = position.occupied();
    let queens = position.pieces_of(Piece::Queen, by);

    (pawn_attacks(sq, by.opposite()) & position.pieces_of(Piece::Pawn, by)).is_not_empty()
        || (knight_attacks(sq) & position.pieces_of(Piece::Knight, by)).is_not_empty()
        || (king_attacks(sq) & position.pieces_of(Piece::King, by)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (position.pieces_of(Piece::Bishop, by) | queens))
            .is_not_empty()
        || (rook_attacks(sq, occupied) & (position.pieces_of(Piece::Rook, by) | queens))
            .is_not_empty()
}

/// Returns true if any king of `color` is attacked. A side without kings is
/// never in check.
pub fn is_king_attacked(position: &Position, color: Color) -> bool {
    position
        .pieces_of(Piece::King, color)
        .into_iter()
        .any(|king| is_square_attacked(position, king, color.opposite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StandardChess, SuicideChess};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn movelist_tiers() {
        let mut list = MoveList::new();
        assert!(list.is_empty());
        let quiet = Move::new(sq("e2"), sq("e4"), Piece::Pawn, Color::White);
        let capture =
            Move::new(sq("d1"), sq("d7"), Piece::Queen, Color::White).capturing(Piece::Pawn);
        let check = Move::new(sq("f1"), sq("b5"), Piece::Bishop, Color::White)
            .with_flags(MoveFlags::CHECK);
        list.push(quiet);
        list.push(capture);
        list.push(check);

        assert_eq!(list.len(), 3);
        assert_eq!(list.high_priority(), &[capture, check]);
        assert_eq!(list.low_priority(), &[quiet]);
        assert_eq!(list.to_vec(), vec![capture, check, quiet]);
        assert_eq!(list.get(2), Some(quiet));
        assert_eq!(list.get(3), None);
        assert!(list.any_capture());

        list.retain(|m| !m.is_capture());
        assert_eq!(list.to_vec(), vec![check, quiet]);
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let position = Position::startpos();
        assert_eq!(pseudo_legal_moves(&position, &StandardChess).len(), 20);
        assert_eq!(legal_moves(&position, &StandardChess).len(), 20);
    }

    #[test]
    fn square_attacks_in_startpos() {
        let position = Position::startpos();
        assert!(is_square_attacked(&position, sq("e3"), Color::White));
        assert!(is_square_attacked(&position, sq("f3"), Color::White));
        assert!(!is_square_attacked(&position, sq("e4"), Color::White));
        assert!(!is_king_attacked(&position, Color::White));
        assert!(!is_king_attacked(&position, Color::Black));
    }

    #[test]
    fn castling_generated_when_path_clear() {
        let position = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let moves = pseudo_legal_moves(&position, &StandardChess);
        let castles: Vec<Move> = moves.iter().copied().filter(|m| m.is_castling()).collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.iter().any(|m| m.to() == Square::G1));
        assert!(castles.iter().any(|m| m.to() == Square::C1));
    }

    #[test]
    fn no_castling_through_attacked_square() {
        let position = pos("r3k2r/pppp1ppp/8/8/8/5r2/PPPP3P/R3K2R w KQkq - 0 1");
        let moves = pseudo_legal_moves(&position, &StandardChess);
        assert!(!moves.iter().any(|m| m.flags().contains(MoveFlags::SHORT_CASTLE)));
        assert!(moves.iter().any(|m| m.flags().contains(MoveFlags::LONG_CASTLE)));
    }

    #[test]
    fn no_castling_out_of_check_or_without_rook() {
        let in_check = pos("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!pseudo_legal_moves(&in_check, &StandardChess)
            .iter()
            .any(|m| m.is_castling()));

        let no_rook = pos("4k3/8/8/8/8/8/8/4K2R w KQ - 0 1");
        let castles: Vec<Move> = pseudo_legal_moves(&no_rook, &StandardChess)
            .iter()
            .copied()
            .filter(|m| m.is_castling())
            .collect();
        assert_eq!(castles.len(), 1);
    }

    #[test]
    fn en_passant_generated() {
        let position = pos("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1");
        let moves = pseudo_legal_moves(&position, &StandardChess);
        let ep: Vec<Move> = moves.iter().copied().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].from(), sq("f5"));
        assert_eq!(ep[0].to(), sq("e6"));
        assert_eq!(ep[0].captured(), Some(Piece::Pawn));
    }

    #[test]
    fn promotion_choices_follow_rules() {
        let position = pos("8/P7/8/8/8/8/8/4K2k w - - 0 1");
        let standard = pseudo_legal_moves(&position, &StandardChess);
        assert_eq!(standard.iter().filter(|m| m.is_promotion()).count(), 4);
        let suicide = pseudo_legal_moves(&position, &SuicideChess);
        let promos: Vec<Piece> = suicide.iter().filter_map(|m| m.promotion()).collect();
        assert_eq!(promos.len(), 5);
        assert!(promos.contains(&Piece::King));
    }

    #[test]
    fn captures_record_victim() {
        let position = pos("4k3/8/3q4/8/4N3/8/8/4K3 w - - 0 1");
        let moves = pseudo_legal_moves(&position, &StandardChess);
        let capture = moves
            .iter()
            .find(|m| m.to() == sq("d6"))
            .copied()
            .unwrap();
        assert!(capture.is_capture());
        assert_eq!(capture.captured(), Some(Piece::Queen));
        assert_eq!(moves.high_priority(), &[capture]);
    }

    #[test]
    fn every_king_moves_in_suicide() {
        let position = pos("8/8/8/8/8/8/8/K6K w - - 0 1");
        let suicide = pseudo_legal_moves(&position, &SuicideChess);
        assert_eq!(suicide.len(), 6);
        let standard = pseudo_legal_moves(&position, &StandardChess);
        assert_eq!(standard.len(), 3);
    }

    #[test]
    fn multiple_kings_any_attacked() {
        let position = pos("8/8/8/8/8/8/r7/K6K w - - 0 1");
        assert!(is_king_attacked(&position, Color::White));
        let kingless = pos("8/8/8/8/8/8/r7/8 w - - 0 1");
        assert!(!is_king_attacked(&kingless, Color::White));
    }
}
