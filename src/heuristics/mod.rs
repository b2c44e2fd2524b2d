//! Pure text-analysis heuristics: sentence segmentation, verb and weak-lead
//! detection, and flagged-term matching. Nothing here does I/O or holds
//! state, so each piece can be tested in isolation and swapped for a proper
//! NLP component without touching the gating logic.

pub mod segmenter;
pub mod terms;
pub mod verbs;

pub use segmenter::*;
pub use terms::*;
pub use verbs::*;
