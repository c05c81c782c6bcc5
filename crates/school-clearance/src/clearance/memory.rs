use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    ClearanceItem, ClearanceItemFields, ClearanceItemId, Department, DepartmentClearanceRecord,
    DepartmentFields, DepartmentId, NewStudentClearance, Student, StudentClearance,
    StudentClearanceId, StudentId,
};
use super::repository::{ClearanceFilter, ClearanceStore, RecordKind, StoreError};

/// Process-local store keeping every record kind in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryClearanceStore {
    departments: Mutex<Vec<Department>>,
    items: Mutex<Vec<ClearanceItem>>,
    clearances: Mutex<Vec<StudentClearance>>,
    students: Mutex<Vec<Student>>,
    sequence: AtomicU64,
}

impl InMemoryClearanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Students are owned by registration; the engine only reads them.
    pub fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        grade: &str,
    ) -> Result<StudentId, StoreError> {
        let id = StudentId(self.next_id("stu"));
        lock(&self.students)?.push(Student {
            id: id.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            grade: grade.to_string(),
            status: "active".to_string(),
        });
        Ok(id)
    }

    fn next_id(&self, prefix: &str) -> String {
        let value = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{value:06}")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
}

impl ClearanceStore for InMemoryClearanceStore {
    fn insert_department(&self, fields: DepartmentFields) -> Result<DepartmentId, StoreError> {
        let id = DepartmentId(self.next_id("dept"));
        lock(&self.departments)?.push(Department::from_fields(id.clone(), fields));
        Ok(id)
    }

    fn patch_department(
        &self,
        id: &DepartmentId,
        fields: DepartmentFields,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.departments)?;
        let department = guard
            .iter_mut()
            .find(|department| &department.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::Department,
                id: id.to_string(),
            })?;
        department.apply(fields);
        Ok(())
    }

    fn delete_department(&self, id: &DepartmentId) -> Result<(), StoreError> {
        lock(&self.departments)?.retain(|department| &department.id != id);
        Ok(())
    }

    fn get_department(&self, id: &DepartmentId) -> Result<Option<Department>, StoreError> {
        Ok(lock(&self.departments)?
            .iter()
            .find(|department| &department.id == id)
            .cloned())
    }

    fn departments(&self) -> Result<Vec<Department>, StoreError> {
        Ok(lock(&self.departments)?.clone())
    }

    fn insert_item(&self, fields: ClearanceItemFields) -> Result<ClearanceItemId, StoreError> {
        let id = ClearanceItemId(self.next_id("item"));
        lock(&self.items)?.push(ClearanceItem::from_fields(id.clone(), fields));
        Ok(id)
    }

    fn patch_item(
        &self,
        id: &ClearanceItemId,
        fields: ClearanceItemFields,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.items)?;
        let item = guard
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::ClearanceItem,
                id: id.to_string(),
            })?;
        item.apply(fields);
        Ok(())
    }

    fn delete_item(&self, id: &ClearanceItemId) -> Result<(), StoreError> {
        lock(&self.items)?.retain(|item| &item.id != id);
        Ok(())
    }

    fn get_item(&self, id: &ClearanceItemId) -> Result<Option<ClearanceItem>, StoreError> {
        Ok(lock(&self.items)?.iter().find(|item| &item.id == id).cloned())
    }

    fn items(
        &self,
        department_id: Option<&DepartmentId>,
    ) -> Result<Vec<ClearanceItem>, StoreError> {
        Ok(lock(&self.items)?
            .iter()
            .filter(|item| department_id.map_or(true, |id| &item.department_id == id))
            .cloned()
            .collect())
    }

    fn insert_clearance(
        &self,
        clearance: NewStudentClearance,
    ) -> Result<StudentClearanceId, StoreError> {
        let id = StudentClearanceId(self.next_id("clr"));
        lock(&self.clearances)?.push(StudentClearance::from_new(id.clone(), clearance));
        Ok(id)
    }

    fn patch_clearance(
        &self,
        id: &StudentClearanceId,
        department_clearances: Vec<DepartmentClearanceRecord>,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.clearances)?;
        let clearance = guard
            .iter_mut()
            .find(|clearance| &clearance.id == id)
            .ok_or_else(|| StoreError::NotFound {
                kind: RecordKind::StudentClearance,
                id: id.to_string(),
            })?;
        clearance.department_clearances = department_clearances;
        Ok(())
    }

    fn clearances(&self, filter: &ClearanceFilter) -> Result<Vec<StudentClearance>, StoreError> {
        Ok(lock(&self.clearances)?
            .iter()
            .filter(|clearance| filter.matches(clearance))
            .cloned()
            .collect())
    }

    fn get_student(&self, id: &StudentId) -> Result<Option<Student>, StoreError> {
        Ok(lock(&self.students)?
            .iter()
            .find(|student| &student.id == id)
            .cloned())
    }

    fn students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(lock(&self.students)?.clone())
    }
}
