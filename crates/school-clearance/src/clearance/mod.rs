//! Department clearance workflow: departments, checklist items and per-student decisions.
//!
//! Status is always derived from the embedded decision records of a student's aggregate.
//! Storage sits behind [`ClearanceStore`] so the service can run against any document store.

pub mod board;
pub mod certificate;
pub mod decision;
pub mod domain;
pub mod integrity;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use board::{
    BoardQuery, BoardTotals, ClearanceBoard, ClearanceProgress, DepartmentStatusEntry,
    StudentClearanceSummary,
};
pub use certificate::{CertificateLine, CertificateRefusal, ClearanceCertificate};
pub use decision::{ClearanceLookup, DecisionOutcome, DecisionRequest};
pub use domain::{
    ClearanceItem, ClearanceItemFields, ClearanceItemId, ClearanceStatus, Department,
    DepartmentClearanceRecord, DepartmentFields, DepartmentId, NewStudentClearance, Student,
    StudentClearance, StudentClearanceId, StudentId,
};
pub use integrity::InvariantViolation;
pub use memory::InMemoryClearanceStore;
pub use repository::{ClearanceFilter, ClearanceStore, RecordKind, StoreError};
pub use router::clearance_router;
pub use service::{ClearanceError, ClearanceService, DepartmentDeletion};
pub use status::{department_record, department_status, is_fully_cleared, DepartmentStatus};
pub use validation::{ValidationError, MIN_NAME_CHARS};
