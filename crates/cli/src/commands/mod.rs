pub mod process;
pub mod summary;

pub use process::*;
pub use summary::*;
