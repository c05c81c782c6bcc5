use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ClearanceStatus, Department, DepartmentClearanceRecord, DepartmentId, StudentClearance,
    StudentClearanceId, StudentId,
};
use super::status::DepartmentStatus;

/// Officer decision submitted for one student and one department.
///
/// The officer identity is not part of the request: the stored record always snapshots the
/// department's current officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub student_id: StudentId,
    pub department_id: DepartmentId,
    pub status: ClearanceStatus,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Defaults to the calendar year of the decision timestamp.
    #[serde(default)]
    pub academic_year: Option<String>,
}

impl DecisionRequest {
    pub fn academic_year_or(&self, decided_at: DateTime<Utc>) -> String {
        self.academic_year
            .clone()
            .unwrap_or_else(|| default_academic_year(decided_at))
    }
}

pub fn default_academic_year(decided_at: DateTime<Utc>) -> String {
    decided_at.year().to_string()
}

/// How the "existing" aggregate is located when a decision arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceLookup {
    /// First aggregate for the student in insertion order, whatever its academic year.
    #[default]
    FirstByStudent,
    /// First aggregate matching both the student and the academic year.
    StudentAndYear,
}

impl ClearanceLookup {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" | "first_by_student" => Some(Self::FirstByStudent),
            "student_year" | "student_and_year" => Some(Self::StudentAndYear),
            _ => None,
        }
    }

    /// Pick the aggregate this policy treats as current from an insertion-ordered scan.
    pub fn select<'a>(
        self,
        candidates: &'a [StudentClearance],
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Option<&'a StudentClearance> {
        candidates.iter().find(|clearance| {
            &clearance.student_id == student_id
                && match (self, academic_year) {
                    (Self::StudentAndYear, Some(year)) => clearance.academic_year == year,
                    _ => true,
                }
        })
    }

    /// Read-side selection. An explicit year always narrows the scan to that year; without
    /// one the policy applies as for decisions.
    pub fn select_for_read<'a>(
        self,
        candidates: &'a [StudentClearance],
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Option<&'a StudentClearance> {
        match academic_year {
            Some(year) => candidates.iter().find(|clearance| {
                &clearance.student_id == student_id && clearance.academic_year == year
            }),
            None => self.select(candidates, student_id, None),
        }
    }
}

/// Build the embedded record for a decision, snapshotting the department's officer.
pub fn snapshot_record(
    department: &Department,
    status: ClearanceStatus,
    remarks: Option<String>,
    decided_at: DateTime<Utc>,
) -> DepartmentClearanceRecord {
    DepartmentClearanceRecord {
        department_id: department.id.clone(),
        status,
        remarks,
        officer_name: department.officer_name.clone(),
        officer_title: department.officer_title.clone(),
        date: decided_at,
    }
}

/// What `apply_decision` did to the embedded list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionEffect {
    Appended,
    Replaced { previous: ClearanceStatus },
}

impl DecisionEffect {
    pub fn previous_status(self) -> DepartmentStatus {
        match self {
            Self::Appended => DepartmentStatus::Pending,
            Self::Replaced { previous } => previous.into(),
        }
    }
}

/// Find-and-replace on `department_id`; append only when the department has no record yet.
pub fn apply_decision(
    records: &mut Vec<DepartmentClearanceRecord>,
    record: DepartmentClearanceRecord,
) -> DecisionEffect {
    match records
        .iter_mut()
        .find(|existing| existing.department_id == record.department_id)
    {
        Some(existing) => {
            let previous = existing.status;
            *existing = record;
            DecisionEffect::Replaced { previous }
        }
        None => {
            records.push(record);
            DecisionEffect::Appended
        }
    }
}

/// Result of a recorded decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionOutcome {
    pub clearance_id: StudentClearanceId,
    pub student_id: StudentId,
    pub academic_year: String,
    pub previous_status: DepartmentStatus,
    pub status: DepartmentStatus,
    pub created: bool,
    pub record: DepartmentClearanceRecord,
}
