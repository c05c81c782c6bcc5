use std::fmt;

use serde::Serialize;

use super::domain::{
    ClearanceItem, ClearanceItemFields, ClearanceItemId, Department, DepartmentClearanceRecord,
    DepartmentFields, DepartmentId, NewStudentClearance, Student, StudentClearance,
    StudentClearanceId, StudentId,
};

/// Record kinds held by the store, used to qualify not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Department,
    ClearanceItem,
    StudentClearance,
    Student,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Department => "department",
            Self::ClearanceItem => "clearance item",
            Self::StudentClearance => "student clearance",
            Self::Student => "student",
        };
        f.write_str(label)
    }
}

/// Filter applied to a scan of student clearances. Empty filter returns everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearanceFilter {
    pub student_id: Option<StudentId>,
    pub academic_year: Option<String>,
}

impl ClearanceFilter {
    pub fn student(student_id: &StudentId) -> Self {
        Self {
            student_id: Some(student_id.clone()),
            academic_year: None,
        }
    }

    pub fn matches(&self, clearance: &StudentClearance) -> bool {
        self.student_id
            .as_ref()
            .map_or(true, |id| &clearance.student_id == id)
            && self
                .academic_year
                .as_deref()
                .map_or(true, |year| clearance.academic_year == year)
    }
}

/// Document store the clearance engine runs against.
///
/// Every `collect`-style method returns records in insertion order. `delete_*` on a missing
/// id is a no-op; `patch_*` on a missing id reports [`StoreError::NotFound`]. No operation
/// spans more than one record kind.
pub trait ClearanceStore: Send + Sync {
    fn insert_department(&self, fields: DepartmentFields) -> Result<DepartmentId, StoreError>;
    fn patch_department(&self, id: &DepartmentId, fields: DepartmentFields)
        -> Result<(), StoreError>;
    fn delete_department(&self, id: &DepartmentId) -> Result<(), StoreError>;
    fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>, StoreError>;
    fn departments(&self) -> Result<Vec<Department>, StoreError>;

    fn insert_item(&self, fields: ClearanceItemFields) -> Result<ClearanceItemId, StoreError>;
    fn patch_item(&self, id: &ClearanceItemId, fields: ClearanceItemFields)
        -> Result<(), StoreError>;
    fn delete_item(&self, id: &ClearanceItemId) -> Result<(), StoreError>;
    fn get_item(&self, id: &ClearanceItemId) -> Result<Option<ClearanceItem>, StoreError>;
    fn items(&self, department_id: Option<&DepartmentId>)
        -> Result<Vec<ClearanceItem>, StoreError>;

    fn insert_clearance(
        &self,
        clearance: NewStudentClearance,
    ) -> Result<StudentClearanceId, StoreError>;
    /// Replace the embedded decision list of an existing aggregate.
    fn patch_clearance(
        &self,
        id: &StudentClearanceId,
        department_clearances: Vec<DepartmentClearanceRecord>,
    ) -> Result<(), StoreError>;
    fn clearances(&self, filter: &ClearanceFilter) -> Result<Vec<StudentClearance>, StoreError>;

    fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StoreError>;
    fn students(&self) -> Result<Vec<Student>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found in store")]
    NotFound { kind: RecordKind, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
