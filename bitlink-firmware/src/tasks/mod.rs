//! Embassy tasks wiring the board to the protocol core

pub mod commands;
pub mod dispatch;
pub mod sensor;
pub mod telemetry;

pub use commands::commands_task;
pub use dispatch::dispatch_task;
pub use sensor::{button_task, sensor_task};
pub use telemetry::telemetry_task;
