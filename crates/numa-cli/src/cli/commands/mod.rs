//! CLI command handlers, one per file.

mod check;
mod checksum;
mod control;
mod run;

pub use check::run_check;
pub use checksum::run_checksum;
pub use control::{run_check_now, run_restart};
pub use run::run_poller;
