#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! File integrity guard for filever
//!
//! Two entry points:
//! - [`Verifier`] re-checks every record of a loaded index against the live
//!   filesystem (existence, size, content digest) with a bounded pool of
//!   worker tasks, counting outcomes into a caller-owned
//!   [`VerificationStats`].
//! - [`SplitComparator`] digests equal-sized windows of two or more files
//!   and reports which windows disagree.
//!
//! Neither repairs or deletes anything.

mod splits;
mod stats;
mod verifier;

pub use splits::{compare_splits, split_windows, SplitComparator, MAX_SPLITS};
pub use stats::{Outcome, StatsSnapshot, VerificationStats};
pub use verifier::{verify, ProgressSink, VerificationResult, Verifier};
