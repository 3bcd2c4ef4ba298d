//! Command implementations.

pub mod comments;
pub mod helpers;
pub mod threads;

pub use comments::{run_more, run_post, run_show};
pub use helpers::load_context;
pub use threads::{run_migrate, run_threads};
