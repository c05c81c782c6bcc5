use crate::infra::{decision, demo_timestamp, seed_demo_school, DemoSchool};
use clap::Args;
use school_clearance::clearance::{
    BoardQuery, ClearanceBoard, ClearanceService, ClearanceStatus, InMemoryClearanceStore,
};
use school_clearance::error::AppError;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Academic year the demo decisions are filed under.
    #[arg(long, default_value = "2026")]
    pub(crate) academic_year: String,
    /// Write the final clearance board to this CSV file.
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { academic_year, csv } = args;

    let store = Arc::new(InMemoryClearanceStore::new());
    let service = ClearanceService::new(store.clone());
    let school = seed_demo_school(&store, &service)?;

    println!("School clearance demo ({academic_year})");
    let departments = service.list_departments()?;
    for department in &departments {
        let items = service.list_items(Some(&department.id))?;
        println!(
            "- {} signed by {} ({}) | {} checklist item(s)",
            department.name,
            department.officer_name,
            department.officer_title,
            items.len()
        );
    }

    record_demo_decisions(&service, &school, &academic_year)?;

    let board = service.board(&BoardQuery {
        search: None,
        academic_year: Some(academic_year.clone()),
    })?;
    render_board(&board);

    if let Some(student) = school.students.first() {
        let issued_on = demo_timestamp(30).date_naive();
        match service.certificate(student, Some(academic_year.as_str()), issued_on) {
            Ok(certificate) => println!(
                "\nCertificate {} issued to {} on {}",
                certificate.reference_code, certificate.student_name, certificate.issued_on
            ),
            Err(err) => println!("\nCertificate withheld: {err}"),
        }
    }

    let findings = service.audit()?;
    println!("\nIntegrity audit: {} finding(s)", findings.len());
    for finding in &findings {
        println!("- {}", finding.describe());
    }

    if let Some(path) = csv {
        let file = File::create(&path)?;
        board
            .write_csv(file)
            .map_err(|err| AppError::Clearance(err.into()))?;
        println!("\nBoard written to {}", path.display());
    }

    Ok(())
}

fn record_demo_decisions(
    service: &ClearanceService<InMemoryClearanceStore>,
    school: &DemoSchool,
    academic_year: &str,
) -> Result<(), AppError> {
    let [ama, kojo, esi, ..] = school.students.as_slice() else {
        return Ok(());
    };

    let steps = [
        (ama, &school.library, ClearanceStatus::Cleared, None),
        (ama, &school.finance, ClearanceStatus::Cleared, None),
        (ama, &school.sports, ClearanceStatus::Cleared, None),
        (kojo, &school.library, ClearanceStatus::Cleared, None),
        (
            kojo,
            &school.library,
            ClearanceStatus::NotCleared,
            Some("missing book"),
        ),
        (kojo, &school.finance, ClearanceStatus::Cleared, None),
        (
            esi,
            &school.finance,
            ClearanceStatus::NotCleared,
            Some("outstanding fees"),
        ),
    ];

    println!("\nDecisions");
    for (day, (student, department, status, remarks)) in (1..).zip(steps) {
        let outcome = service.record_decision(
            decision(student, department, status, remarks, academic_year),
            demo_timestamp(day),
        )?;
        println!(
            "- {} @ {}: {} -> {}{}",
            outcome.student_id,
            outcome.record.officer_title,
            outcome.previous_status.label(),
            outcome.status.label(),
            outcome
                .record
                .remarks
                .as_deref()
                .map(|remarks| format!(" ({remarks})"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

fn render_board(board: &ClearanceBoard) {
    println!("\nClearance board");
    for row in &board.rows {
        let cells: Vec<String> = row
            .departments
            .iter()
            .map(|entry| format!("{}: {}", entry.department_name, entry.status.label()))
            .collect();
        println!(
            "- {} ({}) | {}/{} cleared | {}",
            row.student_name,
            row.grade,
            row.cleared_count,
            row.department_count,
            cells.join(", ")
        );
    }
    println!(
        "Totals: {} student(s) | {} fully cleared | {} in progress | {} not started",
        board.totals.total_students,
        board.totals.fully_cleared,
        board.totals.in_progress,
        board.totals.not_started
    );
}
