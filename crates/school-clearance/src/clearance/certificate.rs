use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{Department, Student, StudentClearance, StudentId};
use super::status;

/// Why a certificate cannot be printed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum CertificateRefusal {
    #[error("clearance data not found for this student")]
    NoClearanceRecord,
    #[error("student has not been fully cleared by all departments")]
    NotFullyCleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateLine {
    pub department_name: String,
    pub officer_name: String,
    pub officer_title: String,
    pub cleared_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Printable proof that every department signed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearanceCertificate {
    pub reference_code: String,
    pub student_id: StudentId,
    pub student_name: String,
    pub grade: String,
    pub academic_year: String,
    pub issued_on: NaiveDate,
    pub lines: Vec<CertificateLine>,
}

impl ClearanceCertificate {
    pub fn issue(
        student: &Student,
        clearance: Option<&StudentClearance>,
        departments: &[Department],
        issued_on: NaiveDate,
    ) -> Result<Self, CertificateRefusal> {
        let clearance = clearance.ok_or(CertificateRefusal::NoClearanceRecord)?;
        if !status::is_fully_cleared(Some(clearance), departments) {
            return Err(CertificateRefusal::NotFullyCleared);
        }

        let lines = departments
            .iter()
            .filter_map(|department| {
                let record = status::department_record(Some(clearance), &department.id)?;
                Some(CertificateLine {
                    department_name: department.name.clone(),
                    officer_name: record.officer_name.clone(),
                    officer_title: record.officer_title.clone(),
                    cleared_on: record.date,
                    remarks: record.remarks.clone(),
                })
            })
            .collect();

        Ok(Self {
            reference_code: student.reference_code(),
            student_id: student.id.clone(),
            student_name: student.full_name(),
            grade: student.grade.clone(),
            academic_year: clearance.academic_year.clone(),
            issued_on,
            lines,
        })
    }
}
