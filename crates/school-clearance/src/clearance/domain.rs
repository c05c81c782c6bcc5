use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of an administrative office that signs off on students.
    DepartmentId
);
record_id!(
    /// Identifier of a checklist entry owned by a department.
    ClearanceItemId
);
record_id!(
    /// Identifier of a per-student clearance aggregate.
    StudentClearanceId
);
record_id!(StudentId);

/// Administrative office (Library, Finance, ...) that must approve a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub officer_name: String,
    pub officer_title: String,
}

/// Editable field set of a department. Updates always replace the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub officer_name: String,
    pub officer_title: String,
}

impl Department {
    pub fn from_fields(id: DepartmentId, fields: DepartmentFields) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            officer_name: fields.officer_name,
            officer_title: fields.officer_title,
        }
    }

    pub fn apply(&mut self, fields: DepartmentFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.officer_name = fields.officer_name;
        self.officer_title = fields.officer_title;
    }
}

/// Informational checklist entry shown to the officer; never tracked individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceItem {
    pub id: ClearanceItemId,
    pub department_id: DepartmentId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearanceItemFields {
    pub department_id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ClearanceItem {
    pub fn from_fields(id: ClearanceItemId, fields: ClearanceItemFields) -> Self {
        Self {
            id,
            department_id: fields.department_id,
            name: fields.name,
            description: fields.description,
        }
    }

    pub fn apply(&mut self, fields: ClearanceItemFields) {
        self.department_id = fields.department_id;
        self.name = fields.name;
        self.description = fields.description;
    }
}

/// Officer decision recorded against a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceStatus {
    Cleared,
    NotCleared,
}

impl ClearanceStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cleared => "cleared",
            Self::NotCleared => "not_cleared",
        }
    }
}

impl fmt::Display for ClearanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One department's decision embedded in a [`StudentClearance`].
///
/// `officer_name` and `officer_title` are a snapshot of the department's officer at the
/// time of the decision, not of whoever submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentClearanceRecord {
    pub department_id: DepartmentId,
    pub status: ClearanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub officer_name: String,
    pub officer_title: String,
    pub date: DateTime<Utc>,
}

/// Aggregate of every department decision for one student in one academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentClearance {
    pub id: StudentClearanceId,
    pub student_id: StudentId,
    pub academic_year: String,
    pub department_clearances: Vec<DepartmentClearanceRecord>,
}

/// Payload used when the first decision for a student creates the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentClearance {
    pub student_id: StudentId,
    pub academic_year: String,
    pub department_clearances: Vec<DepartmentClearanceRecord>,
}

impl StudentClearance {
    pub fn from_new(id: StudentClearanceId, new: NewStudentClearance) -> Self {
        Self {
            id,
            student_id: new.student_id,
            academic_year: new.academic_year,
            department_clearances: new.department_clearances,
        }
    }
}

/// Read-only view of a registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub grade: String,
    pub status: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Short human reference printed on certificates.
    pub fn reference_code(&self) -> String {
        let chars: Vec<char> = self.id.0.chars().collect();
        let start = chars.len().saturating_sub(8);
        chars[start..].iter().collect::<String>().to_uppercase()
    }
}
