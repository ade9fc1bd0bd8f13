pub mod record_repository;
pub mod report_repository;

pub use record_repository::{CsvRecordStore, RecordStore};
pub use report_repository::{ReportBundle, ReportRepository};
