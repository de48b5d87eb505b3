//! high-level operations on sprig repositories
//!
//! each operation loads the commit graph and staging area, checks its
//! preconditions, and persists the whole state before returning.

mod add;
mod branch;
mod checkout;
mod commit;
mod log;
mod merge;
mod remove;
mod status;

pub use add::{add, AddOutcome};
pub use branch::{branch, rm_branch};
pub use checkout::{checkout_branch, checkout_file, reset};
pub use commit::commit;
pub use log::{find, global_log, log, LogEntry};
pub use merge::{merge, MergeOutcome};
pub use remove::{remove, RemoveOutcome};
pub use status::{status, Modification, Status};
