//! Local git operations for amend mode.

pub mod amend;
pub mod executor;

pub use amend::{amend_and_push, combine_message};
pub use executor::{GitExecutor, SystemGit};
