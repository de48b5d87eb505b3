mod commit;

pub use commit::{Commit, FileMap};
