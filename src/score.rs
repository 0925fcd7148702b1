use std::cmp::Ordering;
use std::fmt;

/// An engine evaluation, relative to the side to move of the position it
/// was requested for. Higher is better for that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns.
    Cp(i32),
    /// Moves until mate. Positive: the side to move mates. Zero or
    /// negative: the side to move gets mated.
    Mate(i32),
}

impl Score {
    // Winning mates above every centipawn score (faster mate first),
    // losing mates below every centipawn score (slower mate first).
    fn sort_key(self) -> (i8, i64) {
        match self {
            Score::Mate(n) if n > 0 => (1, -(n as i64)),
            Score::Cp(cp) => (0, cp as i64),
            Score::Mate(n) => (-1, -(n as i64)),
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Score::Cp(cp) => write!(f, "{cp:+}cp"),
            Score::Mate(n) => write!(f, "#{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winning_mates_beat_everything() {
        assert!(Score::Mate(1) > Score::Mate(5));
        assert!(Score::Mate(5) > Score::Cp(10_000));
        assert!(Score::Mate(5) > Score::Cp(-10_000));
    }

    #[test]
    fn losing_mates_lose_to_everything() {
        assert!(Score::Mate(-1) < Score::Mate(-5));
        assert!(Score::Mate(-5) < Score::Cp(-10_000));
        assert!(Score::Mate(0) < Score::Mate(-1));
    }

    #[test]
    fn centipawns_order_by_value() {
        assert!(Score::Cp(-31) < Score::Cp(0));
        assert!(Score::Cp(0) < Score::Cp(12));
    }

    #[test]
    fn equality_is_exact() {
        assert_eq!(Score::Cp(42), Score::Cp(42));
        assert_ne!(Score::Cp(42), Score::Cp(43));
        assert_ne!(Score::Cp(1), Score::Mate(1));
        assert_eq!(Score::Cp(42).cmp(&Score::Cp(42)), Ordering::Equal);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Score::Cp(34).to_string(), "+34cp");
        assert_eq!(Score::Cp(-7).to_string(), "-7cp");
        assert_eq!(Score::Mate(-2).to_string(), "#-2");
    }
}
