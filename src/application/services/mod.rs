//! Application services
//!
//! Concrete services that drive the tree engine. Key generation is the only
//! source of randomness; everything downstream is deterministic.

mod audit;
mod compare;
mod keys;

pub use audit::{AuditReport, AuditService};
pub use compare::{CompareRequest, ComparisonReport, ComparisonService, ReportRow, TreeKind};
pub use keys::KeyGenerator;
