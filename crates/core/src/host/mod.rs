//! Host adapters: concrete [`LoadingContext`](classcope_api::LoadingContext)
//! implementations for hosts that describe themselves as file-system roots.

pub mod fs;

pub use fs::FsLoadingContext;
