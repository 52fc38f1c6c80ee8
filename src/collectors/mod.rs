pub mod arcconf;
pub mod executor;

pub use arcconf::{Arcconf, VersionTable};
pub use executor::{CommandExecutor, CommandOutput, ProcessExecutor, ResultCode};
