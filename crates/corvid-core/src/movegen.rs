//! Pseudolegal move generation.
//!
//! Generators fill a caller-provided [`MoveList`] and return the count.
//! Moves may still leave the mover's king in check; [`Position::make_move`]
//! rejects those. Castling is the exception: its transit squares are
//! verified here because `make_move` only checks the king's final square.

use std::ops::Index;

use crate::attacks::{between, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::moves::Move;
use crate::piece::{Color, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// Upper bound on pseudolegal moves in any reachable position.
pub const MAX_MOVES: usize = 256;

/// A move together with its mutable ordering score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-capacity move buffer.
pub struct MoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList {
            moves: [ScoredMove::default(); MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES);
        if self.len < MAX_MOVES {
            self.moves[self.len] = ScoredMove { mv, score: 0 };
            self.len += 1;
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredMove> {
        self.moves[..self.len].iter()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ScoredMove] {
        &mut self.moves[..self.len]
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.iter().any(|sm| sm.mv == mv)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = ScoredMove;

    fn index(&self, i: usize) -> &ScoredMove {
        &self.moves[..self.len][i]
    }
}

/// Which squares each move family may land on.
struct Targets {
    pieces: Bitboard,
    king: Bitboard,
    pushes: Bitboard,
    pawn_captures: Bitboard,
    quiet_pushes: bool,
    en_passant: bool,
}

/// Every pseudolegal move.
pub fn generate_moves(pos: &Position, list: &mut MoveList) -> usize {
    list.clear();
    let us = pos.side_to_move();
    let not_own = !pos.color(us);
    generate(
        pos,
        list,
        &Targets {
            pieces: not_own,
            king: not_own,
            pushes: !Bitboard::EMPTY,
            pawn_captures: pos.color(!us),
            quiet_pushes: true,
            en_passant: true,
        },
    );
    push_castling(pos, list);
    list.len()
}

/// Captures (en passant included) and every promotion.
pub fn generate_captures(pos: &Position, list: &mut MoveList) -> usize {
    list.clear();
    let enemy = pos.color(!pos.side_to_move());
    generate(
        pos,
        list,
        &Targets {
            pieces: enemy,
            king: enemy,
            pushes: !Bitboard::EMPTY,
            pawn_captures: enemy,
            quiet_pushes: false,
            en_passant: true,
        },
    );
    list.len()
}

/// Replies to check: king steps, plus captures of a single checker and
/// interpositions on the line between it and the king.
pub fn generate_evasions(pos: &Position, list: &mut MoveList) -> usize {
    list.clear();
    let us = pos.side_to_move();
    let not_own = !pos.color(us);
    let checkers = pos.checkers();
    let Some(king) = pos.king_square(us) else {
        return 0;
    };

    if checkers.several() {
        for to in king_attacks(king) & not_own {
            list.push(Move::new(king, to));
        }
        return list.len();
    }

    let Some(checker) = checkers.first() else {
        return generate_moves(pos, list);
    };
    let block = between(king, checker);
    // A double-pushed pawn giving check can be taken en passant; the
    // en-passant square itself may also interpose on a diagonal check.
    let en_passant = pos.en_passant().is_some_and(|ep| {
        block.contains(ep) || ep.offset(-us.forward()) == checker
    });

    generate(
        pos,
        list,
        &Targets {
            pieces: block | checker.bitboard(),
            king: not_own,
            pushes: block,
            pawn_captures: checker.bitboard(),
            quiet_pushes: true,
            en_passant,
        },
    );
    list.len()
}

fn generate(pos: &Position, list: &mut MoveList, targets: &Targets) {
    let us = pos.side_to_move();
    let occ = pos.occupied();

    push_pawn_moves(pos, list, targets);

    for from in pos.pieces_of(us, PieceKind::Knight) {
        push_all(list, from, knight_attacks(from) & targets.pieces);
    }
    for from in pos.pieces_of(us, PieceKind::Bishop) {
        push_all(list, from, bishop_attacks(from, occ) & targets.pieces);
    }
    for from in pos.pieces_of(us, PieceKind::Rook) {
        push_all(list, from, rook_attacks(from, occ) & targets.pieces);
    }
    for from in pos.pieces_of(us, PieceKind::Queen) {
        push_all(list, from, queen_attacks(from, occ) & targets.pieces);
    }
    if let Some(king) = pos.king_square(us) {
        push_all(list, king, king_attacks(king) & targets.king);
    }
}

#[inline]
fn push_all(list: &mut MoveList, from: Square, to: Bitboard) {
    for to in to {
        list.push(Move::new(from, to));
    }
}

fn push_promotions(list: &mut MoveList, from: Square, to: Square) {
    for kind in [PieceKind::Queen, PieceKind::Knight, PieceKind::Rook, PieceKind::Bishop] {
        list.push(Move::promotion(from, to, kind));
    }
}

fn push_pawn_moves(pos: &Position, list: &mut MoveList, targets: &Targets) {
    let us = pos.side_to_move();
    let empty = !pos.occupied();
    let (start_rank, last_rank) = match us {
        Color::White => (Bitboard::RANK_2, Bitboard::RANK_8),
        Color::Black => (Bitboard::RANK_7, Bitboard::RANK_1),
    };

    for from in pos.pieces_of(us, PieceKind::Pawn) {
        let one = from.offset(us.forward());
        if empty.contains(one) {
            if last_rank.contains(one) {
                if targets.pushes.contains(one) {
                    push_promotions(list, from, one);
                }
            } else if targets.quiet_pushes {
                if targets.pushes.contains(one) {
                    list.push(Move::new(from, one));
                }
                if start_rank.contains(from) {
                    let two = one.offset(us.forward());
                    if empty.contains(two) && targets.pushes.contains(two) {
                        list.push(Move::new(from, two));
                    }
                }
            }
        }

        let attacks = pawn_attacks(us, from);
        for to in attacks & targets.pawn_captures {
            if last_rank.contains(to) {
                push_promotions(list, from, to);
            } else {
                list.push(Move::new(from, to));
            }
        }

        if targets.en_passant
            && let Some(ep) = pos.en_passant()
            && attacks.contains(ep)
        {
            list.push(Move::en_passant(from, ep));
        }
    }
}

fn push_castling(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let rights = pos.castling();
    if !rights.contains(CastleRights::short(us)) && !rights.contains(CastleRights::long(us)) {
        return;
    }
    if pos.in_check(us) {
        return;
    }

    let rank = us.back_rank();
    let occ = pos.occupied();
    let sq = |file: u8| Square::from_coords(file, rank);
    let (Some(king), Some(b), Some(c), Some(d), Some(f), Some(g)) =
        (sq(4), sq(1), sq(2), sq(3), sq(5), sq(6))
    else {
        return;
    };

    if rights.contains(CastleRights::short(us))
        && !occ.contains(f)
        && !occ.contains(g)
        && !pos.is_attacked(f, them)
    {
        list.push(Move::castle(king, g));
    }
    if rights.contains(CastleRights::long(us))
        && !occ.contains(b)
        && !occ.contains(c)
        && !occ.contains(d)
        && !pos.is_attacked(d, them)
    {
        list.push(Move::castle(king, c));
    }
}
