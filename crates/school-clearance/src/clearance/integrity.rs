//! Consistency findings the engine tolerates but does not enforce.
//!
//! Nothing here mutates the store. Findings are reported so an administrator can repair
//! the data by hand.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::decision::ClearanceLookup;
use super::domain::{
    ClearanceItem, ClearanceItemId, Department, DepartmentId, Student, StudentClearance,
    StudentClearanceId, StudentId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// More than one aggregate for the same student and academic year.
    DuplicateStudentClearance {
        student_id: StudentId,
        academic_year: String,
        clearance_ids: Vec<StudentClearanceId>,
    },
    /// Aggregates that first-match lookup will never update.
    ShadowedClearance {
        student_id: StudentId,
        active: StudentClearanceId,
        shadowed: Vec<StudentClearanceId>,
    },
    DuplicateDepartmentRecord {
        clearance_id: StudentClearanceId,
        department_id: DepartmentId,
        occurrences: usize,
    },
    /// Decision left behind by a deleted department.
    UnknownDepartmentReference {
        clearance_id: StudentClearanceId,
        department_id: DepartmentId,
    },
    /// Item whose department is gone, typically after an interrupted cascade delete.
    OrphanedItem {
        item_id: ClearanceItemId,
        department_id: DepartmentId,
    },
    UnknownStudent {
        clearance_id: StudentClearanceId,
        student_id: StudentId,
    },
}

impl InvariantViolation {
    pub fn describe(&self) -> String {
        match self {
            Self::DuplicateStudentClearance {
                student_id,
                academic_year,
                clearance_ids,
            } => format!(
                "student {student_id} has {} clearance records for {academic_year}",
                clearance_ids.len()
            ),
            Self::ShadowedClearance {
                student_id,
                active,
                shadowed,
            } => format!(
                "student {student_id} resolves to {active}; {} other record(s) are never updated",
                shadowed.len()
            ),
            Self::DuplicateDepartmentRecord {
                clearance_id,
                department_id,
                occurrences,
            } => format!(
                "clearance {clearance_id} holds {occurrences} decisions for department {department_id}"
            ),
            Self::UnknownDepartmentReference {
                clearance_id,
                department_id,
            } => format!("clearance {clearance_id} references unknown department {department_id}"),
            Self::OrphanedItem {
                item_id,
                department_id,
            } => format!("item {item_id} belongs to unknown department {department_id}"),
            Self::UnknownStudent {
                clearance_id,
                student_id,
            } => format!("clearance {clearance_id} belongs to unknown student {student_id}"),
        }
    }
}

/// Full scan of the store contents an audit runs over.
#[derive(Debug, Clone, Copy)]
pub struct IntegritySnapshot<'a> {
    pub departments: &'a [Department],
    pub items: &'a [ClearanceItem],
    pub clearances: &'a [StudentClearance],
    pub students: &'a [Student],
}

pub fn audit(snapshot: IntegritySnapshot<'_>, lookup: ClearanceLookup) -> Vec<InvariantViolation> {
    let known_departments: HashSet<&DepartmentId> =
        snapshot.departments.iter().map(|department| &department.id).collect();
    let known_students: HashSet<&StudentId> =
        snapshot.students.iter().map(|student| &student.id).collect();

    let mut findings = Vec::new();

    let mut by_student_year: BTreeMap<(&StudentId, &str), Vec<StudentClearanceId>> =
        BTreeMap::new();
    let mut by_student: BTreeMap<&StudentId, Vec<StudentClearanceId>> = BTreeMap::new();
    for clearance in snapshot.clearances {
        by_student_year
            .entry((&clearance.student_id, clearance.academic_year.as_str()))
            .or_default()
            .push(clearance.id.clone());
        by_student
            .entry(&clearance.student_id)
            .or_default()
            .push(clearance.id.clone());
    }

    for ((student_id, academic_year), clearance_ids) in by_student_year {
        if clearance_ids.len() > 1 {
            findings.push(InvariantViolation::DuplicateStudentClearance {
                student_id: student_id.clone(),
                academic_year: academic_year.to_string(),
                clearance_ids,
            });
        }
    }

    if lookup == ClearanceLookup::FirstByStudent {
        for (student_id, mut clearance_ids) in by_student {
            if clearance_ids.len() > 1 {
                let active = clearance_ids.remove(0);
                findings.push(InvariantViolation::ShadowedClearance {
                    student_id: student_id.clone(),
                    active,
                    shadowed: clearance_ids,
                });
            }
        }
    }

    for clearance in snapshot.clearances {
        if !known_students.contains(&clearance.student_id) {
            findings.push(InvariantViolation::UnknownStudent {
                clearance_id: clearance.id.clone(),
                student_id: clearance.student_id.clone(),
            });
        }

        let mut occurrences: BTreeMap<&DepartmentId, usize> = BTreeMap::new();
        for record in &clearance.department_clearances {
            *occurrences.entry(&record.department_id).or_default() += 1;
        }
        for (department_id, count) in occurrences {
            if count > 1 {
                findings.push(InvariantViolation::DuplicateDepartmentRecord {
                    clearance_id: clearance.id.clone(),
                    department_id: department_id.clone(),
                    occurrences: count,
                });
            }
            if !known_departments.contains(department_id) {
                findings.push(InvariantViolation::UnknownDepartmentReference {
                    clearance_id: clearance.id.clone(),
                    department_id: department_id.clone(),
                });
            }
        }
    }

    for item in snapshot.items {
        if !known_departments.contains(&item.department_id) {
            findings.push(InvariantViolation::OrphanedItem {
                item_id: item.id.clone(),
                department_id: item.department_id.clone(),
            });
        }
    }

    findings
}
