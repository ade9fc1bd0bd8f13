pub mod mission_completed_controller;
pub mod mission_report_controller;
pub mod mission_start_controller;
