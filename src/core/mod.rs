pub mod etl;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod rules;
pub mod summary;
pub mod timeparse;
pub mod xlsx;

pub use crate::domain::model::{AttendanceReport, AttendanceSheet};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
