//! Status computation over a student's clearance aggregate.
//!
//! Everything here is recomputed from the embedded decision records on every read; nothing
//! is cached on the aggregate itself.

use serde::{Deserialize, Serialize};

use super::domain::{
    ClearanceStatus, Department, DepartmentClearanceRecord, DepartmentId, StudentClearance,
};

/// Per (student, department) state. `Pending` is the absence of a decision record and is
/// distinct from an explicit `NotCleared` rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentStatus {
    Pending,
    Cleared,
    NotCleared,
}

impl DepartmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Cleared => "Cleared",
            Self::NotCleared => "Not Cleared",
        }
    }
}

impl From<ClearanceStatus> for DepartmentStatus {
    fn from(value: ClearanceStatus) -> Self {
        match value {
            ClearanceStatus::Cleared => Self::Cleared,
            ClearanceStatus::NotCleared => Self::NotCleared,
        }
    }
}

/// Decision recorded for `department_id`, if any. A student without an aggregate has no
/// decisions at all.
pub fn department_record<'a>(
    clearance: Option<&'a StudentClearance>,
    department_id: &DepartmentId,
) -> Option<&'a DepartmentClearanceRecord> {
    clearance?
        .department_clearances
        .iter()
        .find(|record| &record.department_id == department_id)
}

pub fn department_status(
    clearance: Option<&StudentClearance>,
    department_id: &DepartmentId,
) -> DepartmentStatus {
    department_record(clearance, department_id)
        .map(|record| DepartmentStatus::from(record.status))
        .unwrap_or(DepartmentStatus::Pending)
}

/// True only when at least one department is configured and every one of them has a
/// `cleared` decision. Zero departments never yields a cleared student.
pub fn is_fully_cleared(clearance: Option<&StudentClearance>, departments: &[Department]) -> bool {
    !departments.is_empty()
        && departments.iter().all(|department| {
            department_status(clearance, &department.id) == DepartmentStatus::Cleared
        })
}

/// Number of configured departments that have cleared the student.
pub fn cleared_count(clearance: Option<&StudentClearance>, departments: &[Department]) -> usize {
    departments
        .iter()
        .filter(|department| {
            department_status(clearance, &department.id) == DepartmentStatus::Cleared
        })
        .count()
}
