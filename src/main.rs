use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edubridge_api::config::Config;
use edubridge_api::services::identity::LocalIdentityProvider;
use edubridge_api::services::metrics;
use edubridge_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::provision_schema(&pool).await?;
    info!("Database connected and schema provisioned");

    let identity = Arc::new(LocalIdentityProvider::new(
        pool.clone(),
        config.jwt_secret.clone(),
        config.token_expiry_seconds,
    ));

    metrics::start(pool.clone());

    let state = AppState {
        db: pool,
        config: config.clone(),
        identity,
    };

    // CORS: the configured frontend origin plus localhost for development.
    let cors_origin = {
        let base = config.app_base_url.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            let o = match origin.to_str() {
                Ok(s) => s,
                Err(_) => return false,
            };
            if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
                return true;
            }
            o == base
        })
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let api = Router::new()
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/register", post(routes::auth::register))
        // Users
        .route(
            "/users",
            get(routes::users::list_users).post(routes::auth::register),
        )
        .route(
            "/users/{id}",
            put(routes::users::update_user).delete(routes::users::delete_user),
        )
        // Schools
        .route(
            "/schools",
            get(routes::schools::list_schools).post(routes::schools::create_school),
        )
        .route(
            "/schools/{id}",
            get(routes::schools::get_school)
                .put(routes::schools::update_school)
                .delete(routes::schools::delete_school),
        )
        // Programs
        .route(
            "/programs",
            get(routes::programs::list_programs).post(routes::programs::create_program),
        )
        .route(
            "/programs/{id}",
            get(routes::programs::get_program)
                .put(routes::programs::update_program)
                .delete(routes::programs::delete_program),
        )
        // Students
        .route(
            "/students",
            get(routes::students::list_students).post(routes::students::create_student),
        )
        .route(
            "/students/{id}",
            get(routes::students::get_student)
                .put(routes::students::update_student)
                .delete(routes::students::delete_student),
        )
        .route(
            "/students/{id}/profile",
            get(routes::students::get_student_profile),
        )
        .route(
            "/students/{id}/assessments",
            get(routes::students::list_assessments).post(routes::students::record_assessment),
        )
        // Cohorts
        .route(
            "/cohorts",
            get(routes::cohorts::list_cohorts).post(routes::cohorts::create_cohort),
        )
        .route("/cohorts/generate", post(routes::cohorts::generate_cohorts))
        .route(
            "/cohorts/{id}",
            get(routes::cohorts::get_cohort)
                .put(routes::cohorts::update_cohort)
                .delete(routes::cohorts::delete_cohort),
        )
        .route("/cohorts/{id}/students", put(routes::cohorts::set_students))
        .route(
            "/cohorts/{id}/attendance",
            get(routes::cohorts::list_attendance).post(routes::cohorts::record_attendance),
        )
        // School onboarding
        .route(
            "/school-onboarding",
            get(routes::onboarding::list_onboardings)
                .post(routes::onboarding::create_onboarding),
        )
        .route(
            "/school-onboarding/{id}",
            get(routes::onboarding::get_onboarding)
                .put(routes::onboarding::update_onboarding)
                .delete(routes::onboarding::delete_onboarding),
        )
        .route(
            "/school-onboarding/{id}/report",
            get(routes::onboarding::get_report),
        )
        .route(
            "/school-onboarding/{id}/tasks",
            post(routes::onboarding::create_task),
        )
        .route(
            "/school-onboarding/{id}/tasks/{task_id}",
            put(routes::onboarding::update_task).delete(routes::onboarding::delete_task),
        )
        .route(
            "/school-onboarding/{id}/tasks/{task_id}/complete",
            post(routes::onboarding::complete_task),
        )
        .route(
            "/school-onboarding/{id}/tasks/{task_id}/comments",
            get(routes::onboarding::list_task_comments)
                .post(routes::onboarding::add_task_comment),
        )
        .route(
            "/school-onboarding/{id}/milestones",
            post(routes::onboarding::create_milestone),
        )
        .route(
            "/school-onboarding/{id}/milestones/{milestone_id}",
            put(routes::onboarding::update_milestone),
        )
        .route(
            "/school-onboarding/{id}/milestones/{milestone_id}/complete",
            post(routes::onboarding::complete_milestone),
        )
        .route(
            "/school-onboarding/{id}/milestones/{milestone_id}/sign-offs",
            get(routes::onboarding::list_sign_offs),
        )
        .route(
            "/school-onboarding/{id}/training-sessions",
            post(routes::onboarding::add_training_session),
        )
        .route(
            "/school-onboarding/{id}/support-tickets",
            post(routes::onboarding::add_support_ticket),
        )
        .route(
            "/school-onboarding/{id}/support-tickets/{ticket_id}",
            put(routes::onboarding::update_support_ticket),
        )
        // Student profiles
        .route(
            "/student-profiles",
            post(routes::profiles::create_profile),
        )
        .route("/student-profiles/{id}", get(routes::profiles::get_profile))
        .route(
            "/student-profiles/{id}/report",
            get(routes::profiles::get_profile_report),
        )
        .route(
            "/student-profiles/{id}/academic-records",
            post(routes::profiles::add_academic_record),
        )
        .route(
            "/student-profiles/{id}/behavioral-records",
            post(routes::profiles::add_behavioral_record),
        )
        .route(
            "/student-profiles/{id}/interventions",
            post(routes::profiles::add_intervention),
        )
        .route(
            "/student-profiles/{id}/communication-logs",
            post(routes::profiles::add_communication_log),
        )
        .route(
            "/student-profiles/{id}/goals",
            post(routes::profiles::add_goal),
        )
        .route(
            "/student-profiles/{id}/goals/{goal_id}",
            put(routes::profiles::update_goal),
        )
        // Volunteer requests
        .route(
            "/volunteer-requests",
            get(routes::volunteers::list).post(routes::volunteers::submit),
        )
        .route("/volunteer-requests/{id}", put(routes::volunteers::update))
        // Read-only views
        .route("/views/summary", get(routes::views::summary))
        .route("/views/schools/{id}", get(routes::views::school_view));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("edubridge API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
