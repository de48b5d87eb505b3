pub mod write;

pub use write::{fsync_dir, remove_if_exists, write_atomic};
