//! Test utilities: a scripted in-memory driver and small builders.

pub mod recording;
pub mod test_helpers;

pub use recording::{DriverEvent, ExecutedCommand, FailPoint, RecordingAdapter, RecordingConnection};
pub use test_helpers::{create_test_cursor, create_test_row};
