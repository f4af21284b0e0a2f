//! Demo data seed script
//!
//! Seeds the database with a realistic demo slice:
//! - 4 users: 1 admin, 1 program manager, 1 tutor, 1 view-only account
//! - 1 partner school with an onboarding in flight (tasks + milestones)
//! - 1 program (Foundational Literacy, 5 levels)
//! - 12 students with baseline placements
//! - auto-generated cohorts with one attendance sheet each
//!
//! Usage:
//!   DATABASE_URL=... JWT_SECRET=... DEMO_PASSWORD=Demo2024! ./seed-demo
//!
//! Environment variables:
//!   DATABASE_URL   — PostgreSQL connection string (required)
//!   JWT_SECRET     — token signing secret (required)
//!   DEMO_PASSWORD  — password for all demo accounts (default: Demo2024!)

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use std::env;

use edubridge_api::db;
use edubridge_api::models::cohort::{
    AttendanceEntry, GenerateCohortsRequest, RecordAttendanceRequest,
};
use edubridge_api::models::onboarding::{
    CompleteTaskRequest, CreateMilestoneRequest, CreateOnboardingRequest, CreateTaskRequest,
    CreateTrainingSessionRequest, OnboardingPhase, TaskPriority, TaskStatus, UpdateTaskRequest,
};
use edubridge_api::models::program::CreateProgramRequest;
use edubridge_api::models::school::CreateSchoolRequest;
use edubridge_api::models::student::{
    AssessmentKind, CreateStudentRequest, RecordAssessmentRequest,
};
use edubridge_api::models::user::{RegisterRequest, UserRole};
use edubridge_api::services::cohorts::CohortService;
use edubridge_api::services::identity::LocalIdentityProvider;
use edubridge_api::services::onboarding::OnboardingService;
use edubridge_api::services::programs::ProgramService;
use edubridge_api::services::schools::SchoolService;
use edubridge_api::services::students::StudentService;
use edubridge_api::services::users::UserService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET required")?;
    let demo_password = env::var("DEMO_PASSWORD").unwrap_or_else(|_| "Demo2024!".to_string());

    println!("=== Seed Demo Data ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    db::provision_schema(&pool)
        .await
        .context("Failed to provision schema")?;

    let identity = LocalIdentityProvider::new(pool.clone(), jwt_secret, 3600);

    // 1. Clean previous demo data
    println!("Cleaning previous demo data...");
    let old_school: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT id FROM schools WHERE name = $1")
            .bind(DEMO_SCHOOL_NAME)
            .fetch_optional(&pool)
            .await?;
    if let Some(school_id) = old_school {
        edubridge_api::services::schools::purge_school(&pool, school_id)
            .await
            .context("Failed to purge previous demo school")?;
    }
    for email in DEMO_EMAILS {
        sqlx::query("DELETE FROM users WHERE email = $1")
            .bind(email)
            .execute(&pool)
            .await?;
        sqlx::query("DELETE FROM auth_accounts WHERE email = $1")
            .bind(email)
            .execute(&pool)
            .await?;
    }
    sqlx::query("DELETE FROM programs WHERE name = $1")
        .bind(DEMO_PROGRAM_NAME)
        .execute(&pool)
        .await?;

    // 2. Users
    println!("Creating users...");
    let staff = [
        ("admin@edubridge.demo", "Anita Deshpande", UserRole::Admin),
        ("manager@edubridge.demo", "Ravi Kulkarni", UserRole::ProgramManager),
        ("tutor@edubridge.demo", "Sneha Patil", UserRole::Tutor),
        ("viewer@edubridge.demo", "Trust Dashboard", UserRole::ViewUser),
    ];
    let mut tutor_id = None;
    let mut manager_id = None;
    for (email, display_name, role) in staff {
        let user = UserService::register(
            &pool,
            &identity,
            &RegisterRequest {
                email: email.into(),
                password: demo_password.clone(),
                display_name: display_name.into(),
                role: Some(role.clone()),
                phone: None,
                school_id: None,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register {email}: {e}"))?;
        match &role {
            UserRole::Tutor => tutor_id = Some(user.id),
            UserRole::ProgramManager => manager_id = Some(user.id),
            _ => {}
        }
        println!("  {email} ({display_name}, {role})");
    }

    // 3. School and program
    println!("Creating school and program...");
    let school = SchoolService::create(
        &pool,
        &CreateSchoolRequest {
            name: DEMO_SCHOOL_NAME.into(),
            address: Some("Plot 14, Shivaji Nagar".into()),
            city: "Pune".into(),
            pincode: "411005".into(),
            contact_name: Some("Prakash Joshi".into()),
            contact_phone: Some("+91 98220 11223".into()),
            contact_email: Some("principal@gmsdemo.example".into()),
        },
    )
    .await?;
    let program = ProgramService::create(
        &pool,
        &CreateProgramRequest {
            name: DEMO_PROGRAM_NAME.into(),
            description: Some("Reading and comprehension ladder, levels 1-5".into()),
            level_count: Some(5),
            pass_threshold: Some(60),
        },
    )
    .await?;

    // 4. Students with baseline assessments
    println!("Creating students...");
    let students = [
        ("Aarav", "Sharma", 82),
        ("Diya", "Patel", 45),
        ("Vihaan", "Singh", 68),
        ("Ananya", "Kumar", 30),
        ("Arjun", "Joshi", 91),
        ("Isha", "Deshmukh", 55),
        ("Kabir", "Mehta", 73),
        ("Myra", "Nair", 22),
        ("Reyansh", "Gupta", 61),
        ("Saanvi", "Iyer", 49),
        ("Advait", "Rao", 77),
        ("Zara", "Khan", 38),
    ];
    for (first, last, percent) in students {
        let student = StudentService::create(
            &pool,
            &CreateStudentRequest {
                first_name: first.into(),
                last_name: last.into(),
                gender: None,
                date_of_birth: None,
                guardian_name: None,
                guardian_phone: None,
                school_id: school.id,
                program_id: Some(program.id),
            },
        )
        .await?;
        StudentService::record_assessment(
            &pool,
            student.id,
            &RecordAssessmentRequest {
                kind: AssessmentKind::Baseline,
                score: percent,
                max_score: 100,
                conducted_at: None,
            },
            tutor_id,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to place {first}: {e}"))?;
    }

    // 5. Cohorts + one attendance sheet each
    println!("Generating cohorts...");
    let generated = CohortService::generate(
        &pool,
        &GenerateCohortsRequest {
            school_id: school.id,
            program_id: program.id,
            max_size: Some(5),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Cohort generation failed: {e}"))?;
    let session_date = Utc::now().date_naive() - Duration::days(1);
    for item in &generated {
        sqlx::query("UPDATE cohorts SET tutor_id = $1 WHERE id = $2")
            .bind(tutor_id)
            .bind(item.cohort.id)
            .execute(&pool)
            .await?;
        let detail = CohortService::get_detail(&pool, item.cohort.id)
            .await?
            .context("generated cohort vanished")?;
        let entries: Vec<AttendanceEntry> = detail
            .students
            .iter()
            .enumerate()
            .map(|(i, s)| AttendanceEntry {
                student_id: s.id,
                present: i % 4 != 3,
                remarks: None,
            })
            .collect();
        CohortService::record_attendance(
            &pool,
            item.cohort.id,
            &RecordAttendanceRequest {
                session_date,
                entries,
            },
            tutor_id,
        )
        .await?;
        println!("  {} ({} students)", item.cohort.name, item.student_count);
    }

    // 6. Onboarding in flight
    println!("Creating onboarding workflow...");
    let onboarding = OnboardingService::create(
        &pool,
        &CreateOnboardingRequest {
            school_id: school.id,
            coordinator_id: manager_id,
            target_launch_date: Some(Utc::now().date_naive() + Duration::days(45)),
            notes: Some("Demo onboarding seeded for walkthroughs".into()),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create onboarding: {e}"))?;

    let tasks = [
        ("Sign MOU with school trust", OnboardingPhase::InitialSetup, TaskPriority::High, true),
        ("Collect student rosters", OnboardingPhase::Documentation, TaskPriority::Medium, true),
        ("Verify classroom availability", OnboardingPhase::InfrastructureSetup, TaskPriority::Medium, false),
        ("Train lead teachers on curriculum", OnboardingPhase::TeacherTraining, TaskPriority::High, false),
        ("Run two-week pilot with one cohort", OnboardingPhase::PilotTesting, TaskPriority::Critical, false),
    ];
    for (title, phase, priority, done) in tasks {
        let task = OnboardingService::create_task(
            &pool,
            onboarding.id,
            &CreateTaskRequest {
                title: title.into(),
                description: None,
                phase,
                priority: Some(priority),
                due_date: None,
                assigned_to: manager_id,
                blockers: None,
            },
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create task '{title}': {e}"))?;
        if done {
            OnboardingService::update_task(
                &pool,
                onboarding.id,
                task.id,
                &UpdateTaskRequest {
                    title: None,
                    description: None,
                    phase: None,
                    priority: None,
                    status: Some(TaskStatus::InProgress),
                    completion_percentage: None,
                    due_date: None,
                    assigned_to: None,
                    blockers: None,
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start task '{title}': {e}"))?;
            OnboardingService::complete_task(
                &pool,
                onboarding.id,
                task.id,
                &CompleteTaskRequest {
                    comment: Some("Done during demo seed".into()),
                },
                manager_id,
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to complete task '{title}': {e}"))?;
        }
    }

    OnboardingService::create_milestone(
        &pool,
        onboarding.id,
        &CreateMilestoneRequest {
            title: "Agreement signed".into(),
            description: None,
            phase: OnboardingPhase::InitialSetup,
            target_date: None,
            sign_off_required: Some(true),
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create milestone: {e}"))?;

    OnboardingService::add_training_session(
        &pool,
        onboarding.id,
        &CreateTrainingSessionRequest {
            title: "Curriculum orientation".into(),
            session_date: Utc::now().date_naive() - Duration::days(3),
            trainer: Some("Sneha Patil".into()),
            audience: Some("Lead teachers".into()),
            attendee_count: Some(6),
            notes: None,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create training session: {e}"))?;

    println!();
    println!("=== Demo data seeded successfully! ===");
    println!("  School   : {} ({})", school.name, school.city);
    println!("  Program  : {} ({} levels)", program.name, program.level_count);
    println!("  Students : {}", students.len());
    println!("  Cohorts  : {}", generated.len());
    println!("  Password : {demo_password}");

    Ok(())
}

const DEMO_SCHOOL_NAME: &str = "Govt Model School (Demo)";
const DEMO_PROGRAM_NAME: &str = "Foundational Literacy (Demo)";
const DEMO_EMAILS: [&str; 4] = [
    "admin@edubridge.demo",
    "manager@edubridge.demo",
    "tutor@edubridge.demo",
    "viewer@edubridge.demo",
];
