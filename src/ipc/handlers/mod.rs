pub mod core;
pub mod dashboard;
pub mod improvement;
pub mod progress;
pub mod reports;
pub mod students;
