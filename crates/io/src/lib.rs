// File I/O operations

pub mod audit;
pub mod csv;
pub mod pipeline;
pub mod xlsx;

pub use audit::{AuditLog, AuditSummary};
pub use pipeline::{load_source, validate_file, ValidationRequest};
