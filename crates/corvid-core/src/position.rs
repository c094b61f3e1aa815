//! Mutable board state with make/unmake and repetition bookkeeping.

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castling::CastleRights;
use crate::moves::{Move, MoveKind};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// State that cannot be recomputed when a move is taken back.
#[derive(Debug, Clone, Copy)]
struct Undo {
    hash: u64,
    captured: Option<Piece>,
    castling: CastleRights,
    en_passant: Option<Square>,
    fifty: u16,
    fullmove: u16,
}

/// A chess position plus the stack of moves that led to it.
///
/// Moves are applied in place with [`make_move`](Position::make_move) and
/// reverted with [`unmake_move`](Position::unmake_move). Every made move
/// leaves an entry on the undo stack, which doubles as the hash history
/// used for repetition detection.
#[derive(Clone)]
pub struct Position {
    mailbox: [Option<Piece>; 64],
    by_kind: [Bitboard; 6],
    by_color: [Bitboard; 2],
    side: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    fifty: u16,
    fullmove: u16,
    hash: u64,
    history: Vec<Undo>,
}

impl Position {
    pub(crate) fn empty() -> Position {
        Position {
            mailbox: [None; 64],
            by_kind: [Bitboard::EMPTY; 6],
            by_color: [Bitboard::EMPTY; 2],
            side: Color::White,
            castling: CastleRights::NONE,
            en_passant: None,
            fifty: 0,
            fullmove: 1,
            hash: zobrist::castling(CastleRights::NONE),
            history: Vec::with_capacity(256),
        }
    }

    /// The standard initial position.
    pub fn startpos() -> Position {
        let mut pos = Position::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back.into_iter().enumerate() {
            let file = file as u8;
            for (color, back_rank, pawn_rank) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
                if let (Some(piece_sq), Some(pawn_sq)) =
                    (Square::from_coords(file, back_rank), Square::from_coords(file, pawn_rank))
                {
                    pos.put(piece_sq, Piece::new(color, kind));
                    pos.put(pawn_sq, Piece::new(color, PieceKind::Pawn));
                }
            }
        }
        pos.set_castling(CastleRights::ALL);
        pos
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.index()]
    }

    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.by_kind[kind.index()]
    }

    #[inline]
    pub fn color(&self, color: Color) -> Bitboard {
        self.by_color[color.index()]
    }

    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.by_kind[kind.index()] & self.by_color[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[0] | self.by_color[1]
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color, PieceKind::King).first()
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn fifty_move_counter(&self) -> u16 {
        self.fifty
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Number of moves on the undo stack.
    #[inline]
    pub fn game_ply(&self) -> usize {
        self.history.len()
    }

    /// `true` if `color` has anything besides pawns and its king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let kings_and_pawns = self.pieces(PieceKind::King) | self.pieces(PieceKind::Pawn);
        (self.color(color) & !kings_and_pawns).any()
    }

    // ── Attack queries ──────────────────────────────────────────────────────

    /// Pieces of both colours attacking `sq` through occupancy `occ`.
    pub fn attackers_to(&self, sq: Square, occ: Bitboard) -> Bitboard {
        let diagonal = self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen);
        let straight = self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen);
        (pawn_attacks(Color::White, sq) & self.pieces_of(Color::Black, PieceKind::Pawn))
            | (pawn_attacks(Color::Black, sq) & self.pieces_of(Color::White, PieceKind::Pawn))
            | (knight_attacks(sq) & self.pieces(PieceKind::Knight))
            | (king_attacks(sq) & self.pieces(PieceKind::King))
            | (bishop_attacks(sq, occ) & diagonal)
            | (rook_attacks(sq, occ) & straight)
    }

    /// `true` if any piece of `by` attacks `sq`.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let them = self.color(by);
        let occ = self.occupied();
        (pawn_attacks(!by, sq) & them & self.pieces(PieceKind::Pawn)).any()
            || (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).any()
            || (king_attacks(sq) & them & self.pieces(PieceKind::King)).any()
            || (bishop_attacks(sq, occ)
                & them
                & (self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen)))
                .any()
            || (rook_attacks(sq, occ)
                & them
                & (self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen)))
                .any()
    }

    /// `true` if `side`'s king is attacked.
    pub fn in_check(&self, side: Color) -> bool {
        self.king_square(side)
            .is_some_and(|king| self.is_attacked(king, !side))
    }

    /// Enemy pieces giving check to the side to move.
    pub fn checkers(&self) -> Bitboard {
        match self.king_square(self.side) {
            Some(king) => self.attackers_to(king, self.occupied()) & self.color(!self.side),
            None => Bitboard::EMPTY,
        }
    }

    // ── Draw detection ──────────────────────────────────────────────────────

    /// Fifty-move rule, or the current position already occurred with the
    /// same side to move since the last irreversible move.
    pub fn repetition_draw(&self) -> bool {
        if self.fifty >= 100 {
            return true;
        }
        let window = (self.fifty as usize).min(self.history.len());
        let len = self.history.len();
        (2..=window)
            .step_by(2)
            .any(|back| self.history[len - back].hash == self.hash)
    }

    // ── Make / unmake ───────────────────────────────────────────────────────

    /// Play a pseudolegal move. Returns `false` and leaves the position
    /// untouched if the move would leave the mover's king in check.
    pub fn make_move(&mut self, mv: Move) -> bool {
        let us = self.side;
        let them = !us;
        let from = mv.from();
        let to = mv.to();

        let Some(moving) = self.mailbox[from.index()] else {
            return false;
        };
        if moving.color != us {
            return false;
        }

        let capture_sq = match mv.kind() {
            MoveKind::EnPassant => to.offset(-us.forward()),
            _ => to,
        };
        let captured = self.mailbox[capture_sq.index()];

        self.history.push(Undo {
            hash: self.hash,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            fifty: self.fifty,
            fullmove: self.fullmove,
        });

        self.hash ^= zobrist::en_passant(self.en_passant);
        self.en_passant = None;

        if captured.is_some() {
            self.remove(capture_sq);
        }
        if captured.is_some() || moving.kind == PieceKind::Pawn {
            self.fifty = 0;
        } else {
            self.fifty = self.fifty.saturating_add(1);
        }

        self.shift(from, to);

        match mv.kind() {
            MoveKind::Promotion => {
                let promo = mv.promoted().unwrap_or(PieceKind::Queen);
                self.remove(to);
                self.put(to, Piece::new(us, promo));
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = rook_castle_squares(to);
                self.shift(rook_from, rook_to);
            }
            MoveKind::Normal if moving.kind == PieceKind::Pawn => {
                if from.index().abs_diff(to.index()) == 16 {
                    let passed = from.offset(us.forward());
                    if (pawn_attacks(us, passed) & self.pieces_of(them, PieceKind::Pawn)).any() {
                        self.en_passant = Some(passed);
                        self.hash ^= zobrist::en_passant(self.en_passant);
                    }
                }
            }
            _ => {}
        }

        self.set_castling(self.castling.after_move(from, to));

        self.side = them;
        self.hash ^= zobrist::KEYS.black_to_move;
        if us == Color::Black {
            self.fullmove = self.fullmove.saturating_add(1);
        }

        if self.in_check(us) {
            self.unmake_move(mv);
            return false;
        }
        true
    }

    /// Take back `mv`, which must be the last move made.
    pub fn unmake_move(&mut self, mv: Move) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_move with empty history");
            return;
        };

        self.side = !self.side;
        let us = self.side;

        let from = mv.from();
        let to = mv.to();
        match mv.kind() {
            MoveKind::Promotion => {
                self.remove(to);
                self.put(from, Piece::new(us, PieceKind::Pawn));
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = rook_castle_squares(to);
                self.shift(rook_to, rook_from);
                self.shift(to, from);
            }
            _ => self.shift(to, from),
        }

        if let Some(piece) = undo.captured {
            let capture_sq = match mv.kind() {
                MoveKind::EnPassant => to.offset(-us.forward()),
                _ => to,
            };
            self.put(capture_sq, piece);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.fifty = undo.fifty;
        self.fullmove = undo.fullmove;
        self.hash = undo.hash;
    }

    /// Pass the turn. Repetition detection never looks past a null move.
    pub fn make_null_move(&mut self) {
        self.history.push(Undo {
            hash: self.hash,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            fifty: self.fifty,
            fullmove: self.fullmove,
        });
        self.hash ^= zobrist::en_passant(self.en_passant);
        self.en_passant = None;
        self.fifty = 0;
        self.side = !self.side;
        self.hash ^= zobrist::KEYS.black_to_move;
    }

    pub fn unmake_null_move(&mut self) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_null_move with empty history");
            return;
        };
        self.side = !self.side;
        self.en_passant = undo.en_passant;
        self.fifty = undo.fifty;
        self.hash = undo.hash;
    }

    // ── Low-level mutation (kept in sync with the hash) ─────────────────────

    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        self.mailbox[sq.index()] = Some(piece);
        self.by_kind[piece.kind.index()] |= sq.bitboard();
        self.by_color[piece.color.index()] |= sq.bitboard();
        self.hash ^= zobrist::piece(piece, sq);
    }

    fn remove(&mut self, sq: Square) {
        if let Some(piece) = self.mailbox[sq.index()].take() {
            self.by_kind[piece.kind.index()] &= !sq.bitboard();
            self.by_color[piece.color.index()] &= !sq.bitboard();
            self.hash ^= zobrist::piece(piece, sq);
        }
    }

    fn shift(&mut self, from: Square, to: Square) {
        if let Some(piece) = self.mailbox[from.index()] {
            self.remove(from);
            self.put(to, piece);
        }
    }

    pub(crate) fn set_castling(&mut self, rights: CastleRights) {
        self.hash ^= zobrist::castling(self.castling) ^ zobrist::castling(rights);
        self.castling = rights;
    }

    pub(crate) fn set_side(&mut self, side: Color) {
        if side != self.side {
            self.hash ^= zobrist::KEYS.black_to_move;
            self.side = side;
        }
    }

    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        self.hash ^= zobrist::en_passant(self.en_passant) ^ zobrist::en_passant(sq);
        self.en_passant = sq;
    }

    pub(crate) fn set_counters(&mut self, fifty: u16, fullmove: u16) {
        self.fifty = fifty;
        self.fullmove = fullmove.max(1);
    }

    /// Hash recomputed from scratch; equals [`hash`](Position::hash) when
    /// incremental updates are correct.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = zobrist::castling(self.castling) ^ zobrist::en_passant(self.en_passant);
        if self.side == Color::Black {
            hash ^= zobrist::KEYS.black_to_move;
        }
        for sq in self.occupied() {
            if let Some(piece) = self.mailbox[sq.index()] {
                hash ^= zobrist::piece(piece, sq);
            }
        }
        hash
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
fn rook_castle_squares(king_to: Square) -> (Square, Square) {
    let rank = king_to.rank();
    let (from_file, to_file) = if king_to.file() == 6 { (7, 5) } else { (0, 3) };
    match (Square::from_coords(from_file, rank), Square::from_coords(to_file, rank)) {
        (Some(from), Some(to)) => (from, to),
        _ => (king_to, king_to),
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position(\"{self}\")")
    }
}
