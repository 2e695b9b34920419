//! Command handlers for the blackbox CLI.

pub mod diff;
pub mod history;
pub mod logging;
pub mod record;

pub use diff::*;
pub use history::*;
pub use logging::*;
pub use record::*;
