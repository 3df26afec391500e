//! Editor session configuration.
//!
//! # Invariants
//! - `history_limit` is always within `1..=HISTORY_LIMIT_MAX` after
//!   normalization.

const HISTORY_DEFAULT_LIMIT: usize = 100;
const HISTORY_LIMIT_MAX: usize = 10_000;

/// Tunables for one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of undo steps kept. Defaults to 100 and clamps to 10_000.
    pub history_limit: usize,
    /// Coalesce contiguous `insert_text` commands into one undo step.
    pub merge_typing: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: HISTORY_DEFAULT_LIMIT,
            merge_typing: true,
        }
    }
}

impl EditorConfig {
    /// Returns a copy with out-of-range values replaced by their defaults or
    /// bounds.
    pub fn normalized(self) -> Self {
        Self {
            history_limit: normalize_history_limit(self.history_limit),
            ..self
        }
    }
}

fn normalize_history_limit(limit: usize) -> usize {
    match limit {
        0 => HISTORY_DEFAULT_LIMIT,
        value if value > HISTORY_LIMIT_MAX => HISTORY_LIMIT_MAX,
        value => value,
    }
}
