pub mod alert;
pub mod alert_detail;
pub mod alert_investigation;
pub mod alert_type;
pub mod case;
pub mod case_response;
pub mod case_status;
pub mod log_entry;
pub mod severity_level;
pub mod user;
