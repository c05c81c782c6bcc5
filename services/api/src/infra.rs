use chrono::{DateTime, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use school_clearance::clearance::{
    ClearanceItemFields, ClearanceService, ClearanceStatus, DecisionRequest,
    DepartmentFields, DepartmentId, InMemoryClearanceStore, StoreError, StudentId,
};
use school_clearance::error::AppError;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Ids of the records created by [`seed_demo_school`].
#[derive(Debug, Clone)]
pub(crate) struct DemoSchool {
    pub(crate) library: DepartmentId,
    pub(crate) finance: DepartmentId,
    pub(crate) sports: DepartmentId,
    pub(crate) students: Vec<StudentId>,
}

const DEMO_STUDENTS: [(&str, &str, &str); 4] = [
    ("Ama", "Darko", "Grade 12"),
    ("Kojo", "Mensah", "Grade 12"),
    ("Esi", "Quaye", "Grade 11"),
    ("Yaw", "Boateng", "Grade 11"),
];

fn department(name: &str, description: &str, officer_name: &str, title: &str) -> DepartmentFields {
    DepartmentFields {
        name: name.to_string(),
        description: Some(description.to_string()),
        officer_name: officer_name.to_string(),
        officer_title: title.to_string(),
    }
}

fn item(department_id: &DepartmentId, name: &str) -> ClearanceItemFields {
    ClearanceItemFields {
        department_id: department_id.clone(),
        name: name.to_string(),
        description: None,
    }
}

fn register_students(store: &InMemoryClearanceStore) -> Result<Vec<StudentId>, StoreError> {
    DEMO_STUDENTS
        .iter()
        .map(|(first, last, grade)| store.add_student(first, last, grade))
        .collect()
}

/// Registers students, departments and checklist items for demos and local runs.
pub(crate) fn seed_demo_school(
    store: &InMemoryClearanceStore,
    service: &ClearanceService<InMemoryClearanceStore>,
) -> Result<DemoSchool, AppError> {
    let students = register_students(store).map_err(|err| AppError::Clearance(err.into()))?;

    let library = service.create_department(department(
        "Library",
        "Books, laptops and reading room",
        "Grace Mensah",
        "Head Librarian",
    ))?;
    let finance = service.create_department(department(
        "Finance",
        "Tuition and feeding fees",
        "Kwame Asante",
        "Bursar",
    ))?;
    let sports = service.create_department(department(
        "Sports",
        "Kits and equipment",
        "Efua Owusu",
        "Games Master",
    ))?;

    for fields in [
        item(&library, "Return borrowed books"),
        item(&library, "Pay overdue fines"),
        item(&finance, "Settle tuition balance"),
        item(&sports, "Return team jersey"),
    ] {
        service.create_item(fields)?;
    }

    Ok(DemoSchool {
        library,
        finance,
        sports,
        students,
    })
}

pub(crate) fn decision(
    student_id: &StudentId,
    department_id: &DepartmentId,
    status: ClearanceStatus,
    remarks: Option<&str>,
    academic_year: &str,
) -> DecisionRequest {
    DecisionRequest {
        student_id: student_id.clone(),
        department_id: department_id.clone(),
        status,
        remarks: remarks.map(str::to_string),
        academic_year: Some(academic_year.to_string()),
    }
}

/// Fixed timestamp on the given day of the demo term.
pub(crate) fn demo_timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, day.clamp(1, 30), 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}
