//! Static exchange evaluation.
//!
//! Plays out the capture sequence on one square with each side always
//! recapturing with its least valuable attacker, then lets either side stop
//! early when continuing would lose material. Pins are ignored.

use crate::attacks::{bishop_attacks, rook_attacks};
use crate::moves::{Move, MoveKind};
use crate::piece::PieceKind;
use crate::position::Position;

const SEE_VALUE: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

/// Exchange value of a piece kind in centipawns.
#[inline]
pub fn see_value(kind: PieceKind) -> i32 {
    SEE_VALUE[kind.index()]
}

impl Position {
    /// Net material the side to move gains by playing `mv` and the best
    /// exchange that follows on the destination square.
    pub fn see(&self, mv: Move) -> i32 {
        let us = self.side_to_move();
        let from = mv.from();
        let to = mv.to();
        let Some(mover) = self.piece_on(from) else {
            return 0;
        };

        let mut occ = self.occupied().without(from);
        let mut gain = [0i32; 32];
        gain[0] = match mv.kind() {
            MoveKind::EnPassant => {
                occ = occ.without(to.offset(-us.forward()));
                see_value(PieceKind::Pawn)
            }
            _ => self.piece_on(to).map_or(0, |victim| see_value(victim.kind)),
        };

        // Value of whatever currently stands on `to`, i.e. the next victim.
        let mut on_square = see_value(mover.kind);
        if let Some(promo) = mv.promoted() {
            gain[0] += see_value(promo) - see_value(PieceKind::Pawn);
            on_square = see_value(promo);
        }

        let diagonal = self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen);
        let straight = self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen);
        let mut attackers = self.attackers_to(to, occ) & occ;
        let mut side = !us;
        let mut depth = 0;

        while depth + 1 < gain.len() {
            let ours = attackers & self.color(side);
            let Some((sq, kind)) = PieceKind::ALL
                .iter()
                .find_map(|&kind| (ours & self.pieces(kind)).first().map(|sq| (sq, kind)))
            else {
                break;
            };

            depth += 1;
            gain[depth] = on_square - gain[depth - 1];
            on_square = see_value(kind);

            occ = occ.without(sq);
            attackers |= (bishop_attacks(to, occ) & diagonal) | (rook_attacks(to, occ) & straight);
            attackers &= occ;
            side = !side;
        }

        while depth > 0 {
            depth -= 1;
            gain[depth] = -(-gain[depth]).max(gain[depth + 1]);
        }
        gain[0]
    }
}

#[cfg(test)]
mod tests {
    use crate::moves::Move;
    use crate::position::Position;

    fn see(fen: &str, text: &str) -> i32 {
        let pos: Position = fen.parse().unwrap();
        let mv = Move::parse(text, &pos).unwrap();
        pos.see(mv)
    }

    #[test]
    fn undefended_piece_is_won_outright() {
        assert_eq!(see("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 320);
    }

    #[test]
    fn defended_piece_nets_the_difference() {
        assert_eq!(see("4k3/8/4p3/3n4/4P3/8/8/4K3 w - - 0 1", "e4d5"), 220);
    }

    #[test]
    fn queen_grabbing_a_defended_pawn_loses() {
        assert_eq!(see("7k/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1", "e3c5"), 100 - 900);
    }

    #[test]
    fn xray_rook_supports_the_exchange() {
        // Rxd5 rxd5 Rxd5: the d1 rook stands behind the d2 rook.
        assert_eq!(see("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1", "d2d5"), 100);
    }

    #[test]
    fn quiet_promotion_counts_the_new_piece() {
        assert_eq!(see("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8q"), 800);
    }

    #[test]
    fn en_passant_wins_a_pawn() {
        assert_eq!(see("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", "e5d6"), 100);
    }
}
