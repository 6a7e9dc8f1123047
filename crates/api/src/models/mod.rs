pub mod entry;
pub mod library;
pub mod matching;

pub use entry::*;
pub use library::*;
pub use matching::*;
