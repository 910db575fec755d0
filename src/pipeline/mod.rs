//! Pipeline entry points for collector operations.
//!
//! - `run_collect`: Collect posts and save them as a session
//! - `run_load`: Read a saved session back
//! - `run_validate`: Check a configuration file

pub mod collect;
pub mod load;
pub mod validate;

pub use collect::{CollectTarget, run_collect};
pub use load::{SessionKind, run_load};
pub use validate::run_validate;
