//! Linear softmax classifier for symptom triage.
//!
//! This crate loads a trained multinomial model from a JSON artifact and
//! turns a binary symptom vector into a probability for every known label.
//! It knows nothing about symptom matching or advice; the core crate wraps
//! it behind its classifier boundary.

pub mod artifact;
pub mod softmax;

pub use artifact::*;
pub use softmax::*;
