pub mod array;
pub mod controller;
pub mod fields;
pub mod logical_drive;
pub mod physical_drive;
pub mod task;

pub use array::{Array, ArrayMembers};
pub use controller::{Controller, ControllerMode, NewLogicalDrive};
pub use fields::FieldSet;
pub use logical_drive::{LogicalDrive, LogicalDriveSegment};
pub use physical_drive::{parse_device_report, DeviceAddress, DeviceReport, Enclosure, EnclosureKind, PhysicalDrive};
pub use task::Task;
