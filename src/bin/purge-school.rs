/// Remove one school and every record hanging off it: students, profiles,
/// assessments, attendance, cohorts and the onboarding workflow.
///
/// Usage: purge-school --id UUID
///        purge-school --name "School name"

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use edubridge_api::services::schools;

#[derive(Parser)]
#[command(name = "purge-school", about = "Purge a school and all of its records")]
struct Args {
    /// School id to purge
    #[arg(long, conflicts_with = "name")]
    id: Option<Uuid>,

    /// School name to purge (must match exactly one row)
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL environment variable not set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let school_id = match (args.id, args.name) {
        (Some(id), _) => id,
        (None, Some(name)) => {
            let ids: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM schools WHERE name = $1")
                .bind(&name)
                .fetch_all(&pool)
                .await?;
            match ids.as_slice() {
                [id] => *id,
                [] => {
                    tracing::error!("No school named '{}'", name);
                    std::process::exit(1);
                }
                _ => {
                    tracing::error!("Multiple schools named '{}', use --id instead", name);
                    std::process::exit(1);
                }
            }
        }
        (None, None) => {
            tracing::error!("Either --id or --name is required");
            std::process::exit(1);
        }
    };

    let name: Option<String> = sqlx::query_scalar("SELECT name FROM schools WHERE id = $1")
        .bind(school_id)
        .fetch_optional(&pool)
        .await?;
    let Some(name) = name else {
        tracing::error!("No school with id {}", school_id);
        std::process::exit(1);
    };

    tracing::info!("Purging school '{}' ({})...", name, school_id);

    let summary = schools::purge_school(&pool, school_id).await?;

    tracing::info!(
        "Purge complete: {} students, {} cohorts, {} profiles, {} assessments, {} attendance records, {} onboardings",
        summary.students,
        summary.cohorts,
        summary.profiles,
        summary.assessments,
        summary.attendance_records,
        summary.onboardings
    );

    Ok(())
}
