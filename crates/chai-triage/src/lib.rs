#![forbid(unsafe_code)]
//! chai-triage library.
//!
//! Scores pending tasks into ranked, explained recommendations. The
//! scoring is a pure function of the pending snapshot and the supplied
//! time, so identical inputs always produce identical output.

pub mod recommend;
pub mod score;

pub use recommend::{Recommendations, ScoredTask, get_recommendations};
pub use score::{SignalInputs, SignalWeights, signal_score};
