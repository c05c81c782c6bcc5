use chrono::NaiveDate;

use super::common::*;
use crate::clearance::domain::{
    ClearanceItemFields, ClearanceStatus, NewStudentClearance, StudentId,
};
use crate::clearance::repository::{ClearanceStore, RecordKind};
use crate::clearance::status::DepartmentStatus;
use crate::clearance::{
    BoardQuery, CertificateRefusal, ClearanceError, ClearanceLookup, ClearanceProgress,
    InvariantViolation,
};

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 30).expect("valid date")
}

fn clear_everywhere(fx: &Fixture, student: &StudentId) {
    for department in [&fx.library, &fx.finance] {
        fx.service
            .record_decision(
                decision(student, department, ClearanceStatus::Cleared, None),
                decided_at(9),
            )
            .expect("decision recorded");
    }
}

#[test]
fn board_reports_progress_per_student() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);

    let board = fx.service.board(&BoardQuery::default()).expect("board");

    assert_eq!(board.departments.len(), 2);
    assert_eq!(board.totals.total_students, 2);
    assert_eq!(board.totals.fully_cleared, 1);
    assert_eq!(board.totals.not_started, 1);
    assert_eq!(board.totals.in_progress, 0);

    let ada = &board.rows[0];
    assert!(ada.fully_cleared);
    assert_eq!(ada.cleared_count, 2);
    assert_eq!(ada.progress, ClearanceProgress::FullyCleared);

    let kofi = &board.rows[1];
    assert!(!kofi.fully_cleared);
    assert!(kofi.clearance_id.is_none());
    assert!(kofi
        .departments
        .iter()
        .all(|entry| entry.status == DepartmentStatus::Pending));
}

#[test]
fn rejection_marks_student_in_progress() {
    let fx = fixture();
    fx.service
        .record_decision(
            decision(
                &fx.kofi,
                &fx.finance,
                ClearanceStatus::NotCleared,
                Some("outstanding fees"),
            ),
            decided_at(9),
        )
        .expect("decision recorded");

    let summary = fx
        .service
        .student_summary(&fx.kofi, None)
        .expect("summary");
    assert_eq!(summary.progress, ClearanceProgress::InProgress);
    let finance = summary
        .departments
        .iter()
        .find(|entry| entry.department_id == fx.finance)
        .expect("finance entry");
    assert_eq!(finance.status, DepartmentStatus::NotCleared);
    assert_eq!(finance.remarks.as_deref(), Some("outstanding fees"));
    assert_eq!(finance.officer_title.as_deref(), Some("Bursar"));
}

#[test]
fn board_search_matches_names_and_grade_case_insensitively() {
    let fx = fixture();

    let by_name = fx
        .service
        .board(&BoardQuery {
            search: Some("boat".to_string()),
            academic_year: None,
        })
        .expect("board");
    assert_eq!(by_name.rows.len(), 1);
    assert_eq!(by_name.rows[0].student_id, fx.kofi);

    let by_grade = fx
        .service
        .board(&BoardQuery {
            search: Some("GRADE 12".to_string()),
            academic_year: None,
        })
        .expect("board");
    assert_eq!(by_grade.rows.len(), 1);
    assert_eq!(by_grade.rows[0].student_id, fx.ada);

    let blank = fx
        .service
        .board(&BoardQuery {
            search: Some("   ".to_string()),
            academic_year: None,
        })
        .expect("board");
    assert_eq!(blank.rows.len(), 2);
}

#[test]
fn board_with_no_departments_clears_nobody() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);
    fx.service.delete_department(&fx.library).expect("deleted");
    fx.service.delete_department(&fx.finance).expect("deleted");

    let board = fx.service.board(&BoardQuery::default()).expect("board");
    assert_eq!(board.totals.fully_cleared, 0);
    assert!(board.rows.iter().all(|row| !row.fully_cleared));
}

#[test]
fn board_csv_has_one_column_per_department() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);

    let csv = fx
        .service
        .board(&BoardQuery::default())
        .expect("board")
        .to_csv()
        .expect("csv");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "Student ID,Student,Grade,Library,Finance,Fully Cleared"
    );
    assert_eq!(
        lines[1],
        format!("{},Ada Obi,Grade 12,Cleared,Cleared,Yes", fx.ada)
    );
    assert_eq!(
        lines[2],
        format!("{},Kofi Boateng,Grade 11,Pending,Pending,No", fx.kofi)
    );
}

#[test]
fn certificate_lists_each_department_signature() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);

    let certificate = fx
        .service
        .certificate(&fx.ada, None, issue_date())
        .expect("certificate issued");

    assert_eq!(certificate.student_name, "Ada Obi");
    assert_eq!(certificate.academic_year, "2026");
    assert_eq!(certificate.issued_on, issue_date());
    assert_eq!(certificate.lines.len(), 2);
    assert_eq!(certificate.lines[0].department_name, "Library");
    assert_eq!(certificate.lines[0].officer_name, "Grace Mensah");
    assert_eq!(certificate.lines[1].officer_title, "Bursar");
    assert_eq!(certificate.reference_code, "U-000001");
}

#[test]
fn certificate_is_refused_until_fully_cleared() {
    let fx = fixture();
    match fx.service.certificate(&fx.kofi, None, issue_date()) {
        Err(ClearanceError::Certificate(CertificateRefusal::NoClearanceRecord)) => {}
        other => panic!("expected missing record refusal, got {other:?}"),
    }

    fx.service
        .record_decision(
            decision(&fx.kofi, &fx.library, ClearanceStatus::Cleared, None),
            decided_at(9),
        )
        .expect("decision recorded");
    match fx.service.certificate(&fx.kofi, None, issue_date()) {
        Err(ClearanceError::Certificate(CertificateRefusal::NotFullyCleared)) => {}
        other => panic!("expected not fully cleared refusal, got {other:?}"),
    }

    match fx
        .service
        .certificate(&StudentId::new("stu-ghost"), None, issue_date())
    {
        Err(ClearanceError::NotFound {
            kind: RecordKind::Student,
            ..
        }) => {}
        other => panic!("expected missing student, got {other:?}"),
    }
}

#[test]
fn audit_is_clean_for_engine_written_data() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);
    assert!(fx.service.audit().expect("audit").is_empty());
}

#[test]
fn audit_reports_stale_and_duplicate_records() {
    let fx = fixture();
    clear_everywhere(&fx, &fx.ada);
    fx.service
        .create_item(ClearanceItemFields {
            department_id: fx.finance.clone(),
            name: "Settle tuition".to_string(),
            description: None,
        })
        .expect("item created");

    fx.store
        .delete_department(&fx.finance)
        .expect("raw delete skips cascade");
    fx.store
        .insert_clearance(NewStudentClearance {
            student_id: fx.ada.clone(),
            academic_year: "2026".to_string(),
            department_clearances: vec![
                record(fx.library.as_str(), ClearanceStatus::Cleared),
                record(fx.library.as_str(), ClearanceStatus::NotCleared),
            ],
        })
        .expect("duplicate inserted");
    fx.store
        .insert_clearance(NewStudentClearance {
            student_id: StudentId::new("stu-ghost"),
            academic_year: "2026".to_string(),
            department_clearances: Vec::new(),
        })
        .expect("ghost inserted");

    let findings = fx.service.audit().expect("audit");

    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::DuplicateStudentClearance { student_id, clearance_ids, .. }
            if student_id == &fx.ada && clearance_ids.len() == 2
    )));
    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::ShadowedClearance { student_id, shadowed, .. }
            if student_id == &fx.ada && shadowed.len() == 1
    )));
    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::DuplicateDepartmentRecord { occurrences: 2, .. }
    )));
    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::UnknownDepartmentReference { department_id, .. }
            if department_id == &fx.finance
    )));
    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::OrphanedItem { department_id, .. } if department_id == &fx.finance
    )));
    assert!(findings.iter().any(|finding| matches!(
        finding,
        InvariantViolation::UnknownStudent { student_id, .. }
            if student_id == &StudentId::new("stu-ghost")
    )));
    assert!(findings
        .iter()
        .all(|finding| !finding.describe().is_empty()));
}

#[test]
fn audit_skips_shadowing_under_year_lookup() {
    let fx = fixture_with_lookup(ClearanceLookup::StudentAndYear);
    for year in ["2025", "2026"] {
        let mut request = decision(&fx.ada, &fx.library, ClearanceStatus::Cleared, None);
        request.academic_year = Some(year.to_string());
        fx.service
            .record_decision(request, decided_at(9))
            .expect("decision recorded");
    }

    let findings = fx.service.audit().expect("audit");
    assert!(findings.is_empty(), "unexpected findings: {findings:?}");
}

#[test]
fn year_filter_hides_records_from_other_years() {
    let fx = fixture();
    let mut request = decision(&fx.ada, &fx.library, ClearanceStatus::Cleared, None);
    request.academic_year = Some("2025".to_string());
    fx.service
        .record_decision(request, decided_at(9))
        .expect("decision recorded");

    let board = fx
        .service
        .board(&BoardQuery {
            search: Some("obi".to_string()),
            academic_year: Some("2026".to_string()),
        })
        .expect("board");
    let ada = &board.rows[0];
    assert!(ada.academic_year.is_none());
    assert_eq!(ada.progress, ClearanceProgress::NotStarted);
    assert_eq!(ada.departments[0].status, DepartmentStatus::Pending);

    let summary = fx
        .service
        .student_summary(&fx.ada, Some("2026"))
        .expect("summary");
    assert!(summary.clearance_id.is_none());

    let earlier = fx
        .service
        .student_summary(&fx.ada, Some("2025"))
        .expect("summary");
    assert_eq!(earlier.academic_year.as_deref(), Some("2025"));
    assert_eq!(earlier.departments[0].status, DepartmentStatus::Cleared);

    match fx.service.certificate(&fx.ada, Some("2026"), issue_date()) {
        Err(ClearanceError::Certificate(CertificateRefusal::NoClearanceRecord)) => {}
        other => panic!("expected missing record refusal, got {other:?}"),
    }
}
