use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::clearance::domain::{
    ClearanceItem, ClearanceItemFields, ClearanceItemId, ClearanceStatus, Department,
    DepartmentClearanceRecord, DepartmentFields, DepartmentId, NewStudentClearance, Student,
    StudentClearance, StudentClearanceId, StudentId,
};
use crate::clearance::memory::InMemoryClearanceStore;
use crate::clearance::repository::{ClearanceFilter, ClearanceStore, StoreError};
use crate::clearance::{ClearanceLookup, ClearanceService, DecisionRequest};

pub(super) fn library_fields() -> DepartmentFields {
    DepartmentFields {
        name: "Library".to_string(),
        description: Some("Books and reading room".to_string()),
        officer_name: "Grace Mensah".to_string(),
        officer_title: "Head Librarian".to_string(),
    }
}

pub(super) fn finance_fields() -> DepartmentFields {
    DepartmentFields {
        name: "Finance".to_string(),
        description: None,
        officer_name: "Kwame Asante".to_string(),
        officer_title: "Bursar".to_string(),
    }
}

pub(super) fn decided_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 12, hour, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn decision(
    student_id: &StudentId,
    department_id: &DepartmentId,
    status: ClearanceStatus,
    remarks: Option<&str>,
) -> DecisionRequest {
    DecisionRequest {
        student_id: student_id.clone(),
        department_id: department_id.clone(),
        status,
        remarks: remarks.map(str::to_string),
        academic_year: None,
    }
}

/// Library and Finance departments plus two students, Ada and Kofi.
pub(super) struct Fixture {
    pub(super) store: Arc<InMemoryClearanceStore>,
    pub(super) service: ClearanceService<InMemoryClearanceStore>,
    pub(super) library: DepartmentId,
    pub(super) finance: DepartmentId,
    pub(super) ada: StudentId,
    pub(super) kofi: StudentId,
}

pub(super) fn fixture() -> Fixture {
    fixture_with_lookup(ClearanceLookup::FirstByStudent)
}

pub(super) fn fixture_with_lookup(lookup: ClearanceLookup) -> Fixture {
    let store = Arc::new(InMemoryClearanceStore::new());
    let ada = store
        .add_student("Ada", "Obi", "Grade 12")
        .expect("student added");
    let kofi = store
        .add_student("Kofi", "Boateng", "Grade 11")
        .expect("student added");
    let service = ClearanceService::with_lookup(store.clone(), lookup);
    let library = service
        .create_department(library_fields())
        .expect("library created");
    let finance = service
        .create_department(finance_fields())
        .expect("finance created");

    Fixture {
        store,
        service,
        library,
        finance,
        ada,
        kofi,
    }
}

pub(super) fn record(department_id: &str, status: ClearanceStatus) -> DepartmentClearanceRecord {
    DepartmentClearanceRecord {
        department_id: DepartmentId::new(department_id),
        status,
        remarks: None,
        officer_name: "Officer".to_string(),
        officer_title: "Head".to_string(),
        date: decided_at(9),
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collected");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Store that answers reads but fails every write.
pub(super) struct ReadOnlyStore {
    pub(super) inner: InMemoryClearanceStore,
}

fn read_only() -> StoreError {
    StoreError::Unavailable("read only".to_string())
}

impl ClearanceStore for ReadOnlyStore {
    fn insert_department(&self, _fields: DepartmentFields) -> Result<DepartmentId, StoreError> {
        Err(read_only())
    }

    fn patch_department(
        &self,
        _id: &DepartmentId,
        _fields: DepartmentFields,
    ) -> Result<(), StoreError> {
        Err(read_only())
    }

    fn delete_department(&self, _id: &DepartmentId) -> Result<(), StoreError> {
        Err(read_only())
    }

    fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>, StoreError> {
        self.inner.get_department(id)
    }

    fn departments(&self) -> Result<Vec<Department>, StoreError> {
        self.inner.departments()
    }

    fn insert_item(&self, _fields: ClearanceItemFields) -> Result<ClearanceItemId, StoreError> {
        Err(read_only())
    }

    fn patch_item(
        &self,
        _id: &ClearanceItemId,
        _fields: ClearanceItemFields,
    ) -> Result<(), StoreError> {
        Err(read_only())
    }

    fn delete_item(&self, _id: &ClearanceItemId) -> Result<(), StoreError> {
        Err(read_only())
    }

    fn get_item(&self, id: &ClearanceItemId) -> Result<Option<ClearanceItem>, StoreError> {
        self.inner.get_item(id)
    }

    fn items(
        &self,
        department_id: Option<&DepartmentId>,
    ) -> Result<Vec<ClearanceItem>, StoreError> {
        self.inner.items(department_id)
    }

    fn insert_clearance(
        &self,
        _clearance: NewStudentClearance,
    ) -> Result<StudentClearanceId, StoreError> {
        Err(read_only())
    }

    fn patch_clearance(
        &self,
        _id: &StudentClearanceId,
        _records: Vec<DepartmentClearanceRecord>,
    ) -> Result<(), StoreError> {
        Err(read_only())
    }

    fn clearances(&self, filter: &ClearanceFilter) -> Result<Vec<StudentClearance>, StoreError> {
        self.inner.clearances(filter)
    }

    fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        self.inner.get_student(id)
    }

    fn students(&self) -> Result<Vec<Student>, StoreError> {
        self.inner.students()
    }
}

/// Store whose item deletes succeed but whose department delete fails, leaving the
/// cascade half done.
pub(super) struct InterruptedCascadeStore {
    pub(super) inner: InMemoryClearanceStore,
    pub(super) fail_department_delete: AtomicBool,
}

impl InterruptedCascadeStore {
    pub(super) fn new(inner: InMemoryClearanceStore) -> Self {
        Self {
            inner,
            fail_department_delete: AtomicBool::new(true),
        }
    }
}

impl ClearanceStore for InterruptedCascadeStore {
    fn insert_department(&self, fields: DepartmentFields) -> Result<DepartmentId, StoreError> {
        self.inner.insert_department(fields)
    }

    fn patch_department(
        &self,
        id: &DepartmentId,
        fields: DepartmentFields,
    ) -> Result<(), StoreError> {
        self.inner.patch_department(id, fields)
    }

    fn delete_department(&self, id: &DepartmentId) -> Result<(), StoreError> {
        if self.fail_department_delete.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.delete_department(id)
    }

    fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>, StoreError> {
        self.inner.get_department(id)
    }

    fn departments(&self) -> Result<Vec<Department>, StoreError> {
        self.inner.departments()
    }

    fn insert_item(&self, fields: ClearanceItemFields) -> Result<ClearanceItemId, StoreError> {
        self.inner.insert_item(fields)
    }

    fn patch_item(
        &self,
        id: &ClearanceItemId,
        fields: ClearanceItemFields,
    ) -> Result<(), StoreError> {
        self.inner.patch_item(id, fields)
    }

    fn delete_item(&self, id: &ClearanceItemId) -> Result<(), StoreError> {
        self.inner.delete_item(id)
    }

    fn get_item(&self, id: &ClearanceItemId) -> Result<Option<ClearanceItem>, StoreError> {
        self.inner.get_item(id)
    }

    fn items(
        &self,
        department_id: Option<&DepartmentId>,
    ) -> Result<Vec<ClearanceItem>, StoreError> {
        self.inner.items(department_id)
    }

    fn insert_clearance(
        &self,
        clearance: NewStudentClearance,
    ) -> Result<StudentClearanceId, StoreError> {
        self.inner.insert_clearance(clearance)
    }

    fn patch_clearance(
        &self,
        id: &StudentClearanceId,
        records: Vec<DepartmentClearanceRecord>,
    ) -> Result<(), StoreError> {
        self.inner.patch_clearance(id, records)
    }

    fn clearances(&self, filter: &ClearanceFilter) -> Result<Vec<StudentClearance>, StoreError> {
        self.inner.clearances(filter)
    }

    fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        self.inner.get_student(id)
    }

    fn students(&self) -> Result<Vec<Student>, StoreError> {
        self.inner.students()
    }
}
