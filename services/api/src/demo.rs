use crate::infra::{
    default_eligibility_config, seed_demo_directory, ConsoleMailer, InMemoryRecordStore,
};
use clap::Args;
use coop_portal::error::AppError;
use coop_portal::workflows::coop::{
    CoopError, CoopProgramService, EmployerId, FacultyId, Grade, PostingId, StudentId,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the final state of every co-op record at the end of the demo.
    #[arg(long)]
    pub(crate) list_records: bool,
}

/// Walk a seeded cohort through the full decision pipeline: selection with
/// eligibility snapshots, the summary workflow, a cross-department denial,
/// and grading.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRecordStore::default());
    seed_demo_directory(&store);
    let service = CoopProgramService::new(
        store.clone(),
        Arc::new(ConsoleMailer),
        default_eligibility_config(),
    );

    let maya = StudentId("STU-2025-0001".to_string());
    let dev = StudentId("STU-2025-0002".to_string());
    let robotics = EmployerId("EMP-2025-0001".to_string());
    let controls = PostingId("POS-2025-0001".to_string());
    let cs_coordinator = FacultyId("FAC-2025-0001".to_string());
    let ee_coordinator = FacultyId("FAC-2025-0002".to_string());

    println!("Co-op portal workflow demo");
    println!("\n-- Selection with an eligible student --");

    let application = service.apply_to_posting(&maya, &controls)?;
    println!(
        "{} applied to {} ({})",
        application.student.0, application.posting.0, application.status.label()
    );

    let selected = service.select_applicant(&robotics, &application.id)?;
    println!(
        "Employer selected {} (application now {})",
        selected.student.0,
        selected.status.label()
    );

    let record = store
        .coop_record_for_application(&selected.id)
        .expect("selection opens a co-op record");
    println!(
        "Co-op record {} opened in state '{}'",
        record.id.0,
        record.status.label()
    );

    println!("\n-- Summary review and grading --");
    let record = service.submit_summary(
        &maya,
        &record.id,
        "Designed and validated the actuator test rig for the fall line.",
    )?;
    println!("Summary submitted ({})", record.status.label());

    match service.approve_summary(&ee_coordinator, &record.id) {
        Err(CoopError::PermissionDenied(reason)) => {
            println!("EE coordinator turned away: {reason}");
        }
        other => {
            println!("unexpected outcome for out-of-department approval: {other:?}");
        }
    }

    let record = service.approve_summary(&cs_coordinator, &record.id)?;
    println!("CS coordinator approved ({})", record.status.label());

    let record = service.assign_grade(&cs_coordinator, &record.id, Grade::A)?;
    println!(
        "Grade {} recorded; record is now {} and immutable",
        record.grade.map(Grade::label).unwrap_or("?"),
        record.status.label()
    );

    println!("\n-- Selection with an ineligible student --");
    let application = service.apply_to_posting(&dev, &controls)?;
    let selected = service.select_applicant(&robotics, &application.id)?;
    let verdict = store
        .eligibility_records()
        .into_iter()
        .rev()
        .find(|snapshot| snapshot.student == dev)
        .expect("selection snapshots eligibility");
    println!(
        "Employer selected {}; eligibility verdict '{}' (failed: {:?}) — no mail goes out, \
         but the co-op record still opens",
        selected.student.0,
        verdict.verdict.label(),
        verdict
            .failed_metrics
            .iter()
            .map(|metric| metric.label())
            .collect::<Vec<_>>()
    );

    println!("\n-- Department dashboard --");
    let report = service.department_report(&cs_coordinator)?;
    println!(
        "{}: {} students, {} in co-op, {} active, {} awaiting review, {} awaiting grade, {} graded",
        report.department,
        report.students_in_department,
        report.coop_students,
        report.active,
        report.summaries_awaiting_review,
        report.approved_awaiting_grade,
        report.graded
    );

    if args.list_records {
        println!("\nCo-op records");
        for record in store.all_coop_records() {
            println!(
                "- {} | student {} | status {} | grade {}",
                record.id.0,
                record.student.0,
                record.status.label(),
                record.grade.map(Grade::label).unwrap_or("-")
            );
        }
    }

    Ok(())
}
