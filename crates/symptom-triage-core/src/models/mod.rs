//! Domain models for the symptom triage system.

mod advice;
mod catalog;
mod conversation;
mod diagnosis;
mod matching;

pub use advice::*;
pub use catalog::*;
pub use conversation::*;
pub use diagnosis::*;
pub use matching::*;
