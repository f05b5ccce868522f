//! Decides what to do with the candidates a resolution run produced.

use crate::profile::ProfileCandidate;

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Exactly one candidate: use it.
    Proceed(String),
    /// Several candidates: someone has to pick.
    AskUser(Vec<ProfileCandidate>),
    /// Nothing found: try the single-URL lookup.
    Fallback,
}

pub fn select(mut candidates: Vec<ProfileCandidate>) -> Decision {
    match candidates.len() {
        0 => Decision::Fallback,
        1 => Decision::Proceed(candidates.remove(0).url),
        _ => Decision::AskUser(candidates),
    }
}

/// External disambiguation, e.g. a prompt in a terminal or a web form.
pub trait CandidateChooser: Send + Sync {
    /// Index of the chosen candidate, or `None` when the user declines.
    fn choose(&self, candidates: &[ProfileCandidate]) -> Option<usize>;
}
