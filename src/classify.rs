use shakmaty::{Chess, Move, Position};

/// Tie-break category of a candidate move.
///
/// When several candidates share the extreme evaluation, selection prefers
/// Other over Check over Capture, so the bot avoids handing out material or
/// obvious initiative when it has equally bad quiet moves available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCategory {
    Capture,
    Check,
    Other,
}

/// Preference order for tie-breaking, most preferred first.
pub const FALLBACK_ORDER: [MoveCategory; 3] =
    [MoveCategory::Other, MoveCategory::Check, MoveCategory::Capture];

/// Tags a candidate move. `position_after` is the position with the move
/// already played. Captures (including en passant) take precedence over
/// checks; a quiet non-checking move is Other.
pub fn classify(candidate: Move, position_after: &Chess) -> MoveCategory {
    if candidate.is_capture() {
        MoveCategory::Capture
    } else if position_after.is_check() {
        MoveCategory::Check
    } else {
        MoveCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use shakmaty::{CastlingMode, fen::Fen, uci::UciMove};

    use super::*;

    fn position(fen: &str) -> Chess {
        Fen::from_str(fen)
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn play(pos: &Chess, uci: &str) -> (Move, Chess) {
        let m = UciMove::from_str(uci).unwrap().to_move(pos).unwrap();
        let mut after = pos.clone();
        after.play_unchecked(m);
        (m, after)
    }

    #[test]
    fn pawn_takes_pawn_is_a_capture() {
        let pos = position("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        let (m, after) = play(&pos, "e4d5");
        assert_eq!(classify(m, &after), MoveCategory::Capture);
    }

    #[test]
    fn en_passant_is_a_capture() {
        let pos = position("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let (m, after) = play(&pos, "e5f6");
        assert_eq!(classify(m, &after), MoveCategory::Capture);
    }

    #[test]
    fn rook_check_is_a_check() {
        let pos = position("8/3k4/8/8/8/8/4R3/4K3 w - - 0 1");
        let (m, after) = play(&pos, "e2e7");
        assert_eq!(classify(m, &after), MoveCategory::Check);
    }

    #[test]
    fn capturing_with_check_counts_as_capture() {
        // Rxe7+ both captures and checks; the capture bucket wins.
        let pos = position("4k3/4p3/8/8/8/8/4R3/4K3 w - - 0 1");
        let (m, after) = play(&pos, "e2e7");
        assert!(after.is_check());
        assert_eq!(classify(m, &after), MoveCategory::Capture);
    }

    #[test]
    fn quiet_move_is_other() {
        let pos = position("8/3k4/8/8/8/8/4R3/4K3 w - - 0 1");
        let (m, after) = play(&pos, "e1d1");
        assert_eq!(classify(m, &after), MoveCategory::Other);
    }
}
