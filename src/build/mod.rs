// src/build/mod.rs

//! Build attempt records.
//!
//! - [`outcome`] defines [`BuildOutcome`], the immutable record of how one
//!   execution attempt of a rule concluded, plus the opaque [`CacheResult`]
//!   carried through from the artifact cache collaborator.

pub mod outcome;

pub use outcome::{BuildOutcome, CacheResult, CacheResultKind};
