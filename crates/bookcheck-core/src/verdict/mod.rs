//! Verdict module - failure taxonomy and pass/fail policy

mod failure;
mod policy;

pub use failure::{Failure, FailureKind, Mismatch, RequestSnapshot};
pub use policy::{EXIT_FAIL, EXIT_PASS, EXIT_TOOL_ERROR, Verdict, VerdictStatus};
