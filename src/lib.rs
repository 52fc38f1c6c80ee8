//! arcscan - typed access to Adaptec/Microsemi `arcconf` controllers
//!
//! Runs the vendor utility, parses its dash-separated `label : value`
//! reports and keeps a cross-linked graph of controllers, arrays, logical
//! drives, physical drives, enclosures and background tasks.
//!
//! ```text
//!   CommandExecutor ──► Arcconf ──► parser::{text, attribute, properties, segment}
//!                                        │
//!                                        ▼
//!        Controller ─┬─ PhysicalDrive / Enclosure
//!                    ├─ LogicalDrive ── LogicalDriveSegment
//!                    ├─ Array ── ArrayMembers
//!                    └─ Task
//! ```
//!
//! # Modules
//!
//! - [`collectors`]: command execution and the arcconf client
//! - [`parser`]: report tokenizing, attribute coercion, property building
//! - [`models`]: synchronized entities
//! - [`config`]: TOML configuration
//! - [`error`]: error types

pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod util;

pub use collectors::{Arcconf, CommandExecutor, CommandOutput, ProcessExecutor, ResultCode, VersionTable};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    Array, ArrayMembers, Controller, ControllerMode, DeviceAddress, Enclosure, EnclosureKind, FieldSet,
    LogicalDrive, LogicalDriveSegment, NewLogicalDrive, PhysicalDrive, Task,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
