//! Administrator overview of every student's clearance progress.

use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::ClearanceLookup;
use super::domain::{
    Department, DepartmentId, Student, StudentClearance, StudentClearanceId, StudentId,
};
use super::status::{self, DepartmentStatus};

/// Optional narrowing of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BoardQuery {
    /// Case-insensitive substring over first name, last name and grade.
    #[serde(default)]
    pub search: Option<String>,
    /// Only aggregates filed under this year are shown.
    #[serde(default)]
    pub academic_year: Option<String>,
}

impl BoardQuery {
    pub fn matches(&self, student: &Student) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => needle.to_lowercase(),
            _ => return true,
        };

        [&student.first_name, &student.last_name, &student.grade]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One department cell for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentStatusEntry {
    pub department_id: DepartmentId,
    pub department_name: String,
    pub status: DepartmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl DepartmentStatusEntry {
    pub fn for_department(department: &Department, clearance: Option<&StudentClearance>) -> Self {
        let record = status::department_record(clearance, &department.id);
        Self {
            department_id: department.id.clone(),
            department_name: department.name.clone(),
            status: record
                .map(|record| record.status.into())
                .unwrap_or(DepartmentStatus::Pending),
            remarks: record.and_then(|record| record.remarks.clone()),
            officer_name: record.map(|record| record.officer_name.clone()),
            officer_title: record.map(|record| record.officer_title.clone()),
            decided_at: record.map(|record| record.date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceProgress {
    NotStarted,
    InProgress,
    FullyCleared,
}

/// Every configured department's status for one student, plus the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentClearanceSummary {
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearance_id: Option<StudentClearanceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    pub departments: Vec<DepartmentStatusEntry>,
    pub cleared_count: usize,
    pub department_count: usize,
    pub fully_cleared: bool,
    pub progress: ClearanceProgress,
}

impl StudentClearanceSummary {
    pub fn build(
        student: &Student,
        clearance: Option<&StudentClearance>,
        departments: &[Department],
    ) -> Self {
        let entries: Vec<DepartmentStatusEntry> = departments
            .iter()
            .map(|department| DepartmentStatusEntry::for_department(department, clearance))
            .collect();
        let fully_cleared = status::is_fully_cleared(clearance, departments);
        let progress = if fully_cleared {
            ClearanceProgress::FullyCleared
        } else if entries
            .iter()
            .all(|entry| entry.status == DepartmentStatus::Pending)
        {
            ClearanceProgress::NotStarted
        } else {
            ClearanceProgress::InProgress
        };

        Self {
            student_id: student.id.clone(),
            student_name: student.full_name(),
            grade: student.grade.clone(),
            clearance_id: clearance.map(|clearance| clearance.id.clone()),
            academic_year: clearance.map(|clearance| clearance.academic_year.clone()),
            cleared_count: status::cleared_count(clearance, departments),
            department_count: departments.len(),
            departments: entries,
            fully_cleared,
            progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentHeader {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardTotals {
    pub total_students: usize,
    pub fully_cleared: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearanceBoard {
    pub departments: Vec<DepartmentHeader>,
    pub rows: Vec<StudentClearanceSummary>,
    pub totals: BoardTotals,
}

impl ClearanceBoard {
    pub fn build(
        students: &[Student],
        clearances: &[StudentClearance],
        departments: &[Department],
        query: &BoardQuery,
        lookup: ClearanceLookup,
    ) -> Self {
        let rows: Vec<StudentClearanceSummary> = students
            .iter()
            .filter(|student| query.matches(student))
            .map(|student| {
                let clearance =
                    lookup.select_for_read(clearances, &student.id, query.academic_year.as_deref());
                StudentClearanceSummary::build(student, clearance, departments)
            })
            .collect();

        let mut totals = BoardTotals {
            total_students: rows.len(),
            ..BoardTotals::default()
        };
        for row in &rows {
            match row.progress {
                ClearanceProgress::FullyCleared => totals.fully_cleared += 1,
                ClearanceProgress::InProgress => totals.in_progress += 1,
                ClearanceProgress::NotStarted => totals.not_started += 1,
            }
        }

        Self {
            departments: departments
                .iter()
                .map(|department| DepartmentHeader {
                    id: department.id.clone(),
                    name: department.name.clone(),
                })
                .collect(),
            rows,
            totals,
        }
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![
            "Student ID".to_string(),
            "Student".to_string(),
            "Grade".to_string(),
        ];
        header.extend(self.departments.iter().map(|department| department.name.clone()));
        header.push("Fully Cleared".to_string());
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![
                row.student_id.to_string(),
                row.student_name.clone(),
                row.grade.clone(),
            ];
            record.extend(row.departments.iter().map(|entry| entry.status.label().to_string()));
            record.push(if row.fully_cleared { "Yes" } else { "No" }.to_string());
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
