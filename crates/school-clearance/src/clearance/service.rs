use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::board::{BoardQuery, ClearanceBoard, StudentClearanceSummary};
use super::certificate::{CertificateRefusal, ClearanceCertificate};
use super::decision::{self, ClearanceLookup, DecisionEffect, DecisionOutcome, DecisionRequest};
use super::domain::{
    ClearanceItem, ClearanceItemFields, ClearanceItemId, Department, DepartmentFields,
    DepartmentId, NewStudentClearance, Student, StudentClearance, StudentId,
};
use super::integrity::{self, IntegritySnapshot, InvariantViolation};
use super::repository::{ClearanceFilter, ClearanceStore, RecordKind, StoreError};
use super::validation::{self, ValidationError};

/// Clearance engine operations over a [`ClearanceStore`].
///
/// Each call performs plain store reads and writes with no transaction around them. In
/// particular [`record_decision`](Self::record_decision) is a read-modify-write of the
/// embedded decision list, so two concurrent decisions for one student can lose an update.
pub struct ClearanceService<S> {
    store: Arc<S>,
    lookup: ClearanceLookup,
}

impl<S> Clone for ClearanceService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lookup: self.lookup,
        }
    }
}

/// Outcome of a cascade delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentDeletion {
    pub department_id: DepartmentId,
    pub items_removed: usize,
}

impl<S> ClearanceService<S>
where
    S: ClearanceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_lookup(store, ClearanceLookup::default())
    }

    pub fn with_lookup(store: Arc<S>, lookup: ClearanceLookup) -> Self {
        Self { store, lookup }
    }

    pub fn lookup(&self) -> ClearanceLookup {
        self.lookup
    }

    pub fn list_departments(&self) -> Result<Vec<Department>, ClearanceError> {
        Ok(self.store.departments()?)
    }

    pub fn get_department(&self, id: &DepartmentId) -> Result<Department, ClearanceError> {
        self.store
            .get_department(id)?
            .ok_or_else(|| ClearanceError::not_found(RecordKind::Department, id))
    }

    /// Duplicate names are accepted.
    pub fn create_department(
        &self,
        fields: DepartmentFields,
    ) -> Result<DepartmentId, ClearanceError> {
        let fields = validation::department_fields(fields)?;
        let name = fields.name.clone();
        let id = self.store.insert_department(fields)?;
        info!(department_id = %id, %name, "department created");
        Ok(id)
    }

    /// Replaces the full editable field set.
    pub fn update_department(
        &self,
        id: &DepartmentId,
        fields: DepartmentFields,
    ) -> Result<DepartmentId, ClearanceError> {
        let fields = validation::department_fields(fields)?;
        self.get_department(id)?;
        self.store
            .patch_department(id, fields)
            .map_err(ClearanceError::from_store)?;
        info!(department_id = %id, "department updated");
        Ok(id.clone())
    }

    /// Deletes the department's items, then the department. The two phases are separate
    /// store calls; a failure in between leaves orphaned items behind. Decisions already
    /// recorded against the department are left in place.
    pub fn delete_department(
        &self,
        id: &DepartmentId,
    ) -> Result<DepartmentDeletion, ClearanceError> {
        let items = self.store.items(Some(id))?;
        for item in &items {
            self.store.delete_item(&item.id)?;
        }
        self.store.delete_department(id)?;

        info!(department_id = %id, items_removed = items.len(), "department deleted");
        Ok(DepartmentDeletion {
            department_id: id.clone(),
            items_removed: items.len(),
        })
    }

    pub fn list_items(
        &self,
        department_id: Option<&DepartmentId>,
    ) -> Result<Vec<ClearanceItem>, ClearanceError> {
        Ok(self.store.items(department_id)?)
    }

    pub fn create_item(
        &self,
        fields: ClearanceItemFields,
    ) -> Result<ClearanceItemId, ClearanceError> {
        let fields = validation::item_fields(fields)?;
        self.get_department(&fields.department_id)?;
        let department_id = fields.department_id.clone();
        let id = self.store.insert_item(fields)?;
        debug!(item_id = %id, %department_id, "clearance item created");
        Ok(id)
    }

    pub fn update_item(
        &self,
        id: &ClearanceItemId,
        fields: ClearanceItemFields,
    ) -> Result<ClearanceItemId, ClearanceError> {
        let fields = validation::item_fields(fields)?;
        if self.store.get_item(id)?.is_none() {
            return Err(ClearanceError::not_found(RecordKind::ClearanceItem, id));
        }
        self.get_department(&fields.department_id)?;
        self.store
            .patch_item(id, fields)
            .map_err(ClearanceError::from_store)?;
        Ok(id.clone())
    }

    pub fn delete_item(&self, id: &ClearanceItemId) -> Result<ClearanceItemId, ClearanceError> {
        self.store.delete_item(id)?;
        debug!(item_id = %id, "clearance item deleted");
        Ok(id.clone())
    }

    /// Record an officer decision for one student and one department.
    ///
    /// Replaces the department's existing entry when there is one, otherwise appends it.
    /// The first decision for a student creates the aggregate.
    pub fn record_decision(
        &self,
        request: DecisionRequest,
        decided_at: DateTime<Utc>,
    ) -> Result<DecisionOutcome, ClearanceError> {
        let request = validation::decision(request)?;
        let department = self.get_department(&request.department_id)?;
        self.get_student(&request.student_id)?;

        let academic_year = request.academic_year_or(decided_at);
        let record = decision::snapshot_record(
            &department,
            request.status,
            request.remarks.clone(),
            decided_at,
        );

        let existing = self.find_clearance(&request.student_id, Some(academic_year.as_str()))?;
        let outcome = match existing {
            Some(existing) => {
                let mut records = existing.department_clearances;
                let effect = decision::apply_decision(&mut records, record.clone());
                self.store
                    .patch_clearance(&existing.id, records)
                    .map_err(ClearanceError::from_store)?;

                DecisionOutcome {
                    clearance_id: existing.id,
                    student_id: request.student_id,
                    academic_year: existing.academic_year,
                    previous_status: effect.previous_status(),
                    status: request.status.into(),
                    created: false,
                    record,
                }
            }
            None => {
                let clearance_id = self.store.insert_clearance(NewStudentClearance {
                    student_id: request.student_id.clone(),
                    academic_year: academic_year.clone(),
                    department_clearances: vec![record.clone()],
                })?;

                DecisionOutcome {
                    clearance_id,
                    student_id: request.student_id,
                    academic_year,
                    previous_status: DecisionEffect::Appended.previous_status(),
                    status: request.status.into(),
                    created: true,
                    record,
                }
            }
        };

        info!(
            student_id = %outcome.student_id,
            department_id = %department.id,
            clearance_id = %outcome.clearance_id,
            from = ?outcome.previous_status,
            to = ?outcome.status,
            created = outcome.created,
            "clearance decision recorded"
        );
        Ok(outcome)
    }

    /// Aggregate shown for the student: the one filed under `academic_year` when given,
    /// otherwise the one the lookup policy treats as current.
    pub fn student_clearance(
        &self,
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Result<Option<StudentClearance>, ClearanceError> {
        self.read_clearance(student_id, academic_year)
    }

    pub fn student_summary(
        &self,
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Result<StudentClearanceSummary, ClearanceError> {
        let student = self.get_student(student_id)?;
        let clearance = self.read_clearance(student_id, academic_year)?;
        let departments = self.store.departments()?;
        Ok(StudentClearanceSummary::build(
            &student,
            clearance.as_ref(),
            &departments,
        ))
    }

    pub fn board(&self, query: &BoardQuery) -> Result<ClearanceBoard, ClearanceError> {
        let students = self.store.students()?;
        let clearances = self.store.clearances(&ClearanceFilter::default())?;
        let departments = self.store.departments()?;
        Ok(ClearanceBoard::build(
            &students,
            &clearances,
            &departments,
            query,
            self.lookup,
        ))
    }

    pub fn certificate(
        &self,
        student_id: &StudentId,
        academic_year: Option<&str>,
        issued_on: NaiveDate,
    ) -> Result<ClearanceCertificate, ClearanceError> {
        let student = self.get_student(student_id)?;
        let clearance = self.read_clearance(student_id, academic_year)?;
        let departments = self.store.departments()?;
        let certificate =
            ClearanceCertificate::issue(&student, clearance.as_ref(), &departments, issued_on)?;
        Ok(certificate)
    }

    pub fn audit(&self) -> Result<Vec<InvariantViolation>, ClearanceError> {
        let departments = self.store.departments()?;
        let items = self.store.items(None)?;
        let clearances = self.store.clearances(&ClearanceFilter::default())?;
        let students = self.store.students()?;

        let findings = integrity::audit(
            IntegritySnapshot {
                departments: &departments,
                items: &items,
                clearances: &clearances,
                students: &students,
            },
            self.lookup,
        );
        if !findings.is_empty() {
            warn!(findings = findings.len(), "clearance integrity audit found issues");
        }
        Ok(findings)
    }

    fn get_student(&self, id: &StudentId) -> Result<Student, ClearanceError> {
        self.store
            .get_student(id)?
            .ok_or_else(|| ClearanceError::not_found(RecordKind::Student, id))
    }

    fn find_clearance(
        &self,
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Result<Option<StudentClearance>, ClearanceError> {
        let candidates = self.store.clearances(&ClearanceFilter::student(student_id))?;
        Ok(self
            .lookup
            .select(&candidates, student_id, academic_year)
            .cloned())
    }

    fn read_clearance(
        &self,
        student_id: &StudentId,
        academic_year: Option<&str>,
    ) -> Result<Option<StudentClearance>, ClearanceError> {
        let candidates = self.store.clearances(&ClearanceFilter::student(student_id))?;
        Ok(self
            .lookup
            .select_for_read(&candidates, student_id, academic_year)
            .cloned())
    }
}

/// Error raised by the clearance service.
#[derive(Debug, thiserror::Error)]
pub enum ClearanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error(transparent)]
    Certificate(#[from] CertificateRefusal),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to export clearance board: {0}")]
    Export(#[from] csv::Error),
}

impl ClearanceError {
    pub fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// A store-level miss on patch means the record vanished after it was read.
    fn from_store(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Certificate(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
