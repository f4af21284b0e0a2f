use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Provision the full schema (idempotent — safe to call on every startup).
/// Enum-valued columns are TEXT with CHECK constraints; foreign keys exist
/// only inside an aggregate (onboarding children, profile children), so
/// deleting a school does not cascade to its onboarding or cohorts.
pub async fn provision_schema(pool: &PgPool) -> anyhow::Result<()> {
    // --- Identity accounts (local credential store) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS auth_accounts (
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            uid           TEXT UNIQUE NOT NULL,
            email         VARCHAR(255) UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Users (profiles linked to an identity uid) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS users (
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            auth_uid     TEXT UNIQUE NOT NULL,
            email        VARCHAR(255) UNIQUE NOT NULL,
            display_name VARCHAR(255) NOT NULL,
            role         TEXT NOT NULL DEFAULT 'view_user'
                         CHECK (role IN ('admin','program_manager','tutor','view_user')),
            phone        VARCHAR(32),
            school_id    UUID,
            is_active    BOOLEAN NOT NULL DEFAULT TRUE,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Schools ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS schools (
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name          VARCHAR(255) NOT NULL,
            address       TEXT,
            city          VARCHAR(128) NOT NULL,
            pincode       VARCHAR(16) NOT NULL,
            contact_name  VARCHAR(255),
            contact_phone VARCHAR(32),
            contact_email VARCHAR(255),
            is_active     BOOLEAN NOT NULL DEFAULT TRUE,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Programs ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS programs (
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name           VARCHAR(255) NOT NULL,
            description    TEXT,
            level_count    INT NOT NULL DEFAULT 4 CHECK (level_count >= 1),
            pass_threshold INT NOT NULL DEFAULT 60
                           CHECK (pass_threshold >= 0 AND pass_threshold <= 100),
            is_active      BOOLEAN NOT NULL DEFAULT TRUE,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Students ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS students (
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            first_name     VARCHAR(128) NOT NULL,
            last_name      VARCHAR(128) NOT NULL,
            gender         VARCHAR(16),
            date_of_birth  DATE,
            guardian_name  VARCHAR(255),
            guardian_phone VARCHAR(32),
            school_id      UUID NOT NULL,
            program_id     UUID,
            cohort_id      UUID,
            current_level  INT NOT NULL DEFAULT 0 CHECK (current_level >= 0),
            is_active      BOOLEAN NOT NULL DEFAULT TRUE,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE INDEX IF NOT EXISTS students_school_idx ON students(school_id);
           CREATE INDEX IF NOT EXISTS students_cohort_idx ON students(cohort_id)"#,
    )
    .execute(pool)
    .await?;

    // --- Cohorts ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS cohorts (
            id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name       VARCHAR(255) NOT NULL,
            school_id  UUID NOT NULL,
            program_id UUID NOT NULL,
            tutor_id   UUID,
            level      INT NOT NULL CHECK (level >= 1),
            max_size   INT NOT NULL DEFAULT 20 CHECK (max_size >= 1),
            is_active  BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Attendance ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS attendance_records (
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            cohort_id    UUID NOT NULL,
            student_id   UUID NOT NULL,
            session_date DATE NOT NULL,
            present      BOOLEAN NOT NULL,
            remarks      TEXT,
            recorded_by  UUID,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (cohort_id, student_id, session_date)
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Assessments ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS assessments (
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            student_id   UUID NOT NULL,
            program_id   UUID NOT NULL,
            kind         TEXT NOT NULL CHECK (kind IN ('baseline','level')),
            level        INT NOT NULL,
            score        INT NOT NULL,
            max_score    INT NOT NULL,
            percent      INT NOT NULL,
            promoted     BOOLEAN NOT NULL DEFAULT FALSE,
            conducted_by UUID,
            conducted_at TIMESTAMPTZ NOT NULL,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE INDEX IF NOT EXISTS assessments_student_idx ON assessments(student_id)"#,
    )
    .execute(pool)
    .await?;

    // --- School onboardings (aggregate root) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS school_onboardings (
            id                 UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            school_id          UUID UNIQUE NOT NULL,
            coordinator_id     UUID,
            status             TEXT NOT NULL DEFAULT 'not_started'
                               CHECK (status IN ('not_started','in_progress','completed','on_hold')),
            current_phase      TEXT NOT NULL DEFAULT 'initial_setup'
                               CHECK (current_phase IN ('initial_setup','documentation',
                                 'teacher_training','infrastructure_setup','pilot_testing',
                                 'full_launch','post_launch_support')),
            overall_progress   INT NOT NULL DEFAULT 0
                               CHECK (overall_progress >= 0 AND overall_progress <= 100),
            target_launch_date DATE,
            actual_launch_date DATE,
            notes              TEXT,
            created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Per-phase progress (derived, rewritten on every roll-up) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS onboarding_phase_progress (
            onboarding_id UUID NOT NULL REFERENCES school_onboardings(id) ON DELETE CASCADE,
            phase         TEXT NOT NULL,
            progress      INT NOT NULL DEFAULT 0,
            status        TEXT NOT NULL DEFAULT 'pending',
            PRIMARY KEY (onboarding_id, phase)
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Onboarding tasks ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS onboarding_tasks (
            id                    UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            onboarding_id         UUID NOT NULL REFERENCES school_onboardings(id) ON DELETE CASCADE,
            title                 VARCHAR(255) NOT NULL,
            description           TEXT,
            phase                 TEXT NOT NULL
                                  CHECK (phase IN ('initial_setup','documentation',
                                    'teacher_training','infrastructure_setup','pilot_testing',
                                    'full_launch','post_launch_support')),
            priority              TEXT NOT NULL DEFAULT 'medium'
                                  CHECK (priority IN ('low','medium','high','critical')),
            status                TEXT NOT NULL DEFAULT 'pending'
                                  CHECK (status IN ('pending','in_progress','completed','skipped','blocked')),
            completion_percentage INT NOT NULL DEFAULT 0
                                  CHECK (completion_percentage >= 0 AND completion_percentage <= 100),
            due_date              DATE,
            completed_date        TIMESTAMPTZ,
            assigned_to           UUID,
            blockers              TEXT[] NOT NULL DEFAULT '{}',
            created_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at            TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE INDEX IF NOT EXISTS onboarding_tasks_parent_idx ON onboarding_tasks(onboarding_id)"#,
    )
    .execute(pool)
    .await?;

    // --- Task comments (append-only) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS task_comments (
            id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            task_id    UUID NOT NULL REFERENCES onboarding_tasks(id) ON DELETE CASCADE,
            author_id  UUID,
            body       TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Milestones ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS onboarding_milestones (
            id                UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            onboarding_id     UUID NOT NULL REFERENCES school_onboardings(id) ON DELETE CASCADE,
            title             VARCHAR(255) NOT NULL,
            description       TEXT,
            phase             TEXT NOT NULL
                              CHECK (phase IN ('initial_setup','documentation',
                                'teacher_training','infrastructure_setup','pilot_testing',
                                'full_launch','post_launch_support')),
            status            TEXT NOT NULL DEFAULT 'pending'
                              CHECK (status IN ('pending','in_progress','completed','skipped','blocked')),
            target_date       DATE,
            completed_date    TIMESTAMPTZ,
            sign_off_required BOOLEAN NOT NULL DEFAULT FALSE,
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Milestone sign-offs (append-only) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS milestone_sign_offs (
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            milestone_id UUID NOT NULL REFERENCES onboarding_milestones(id) ON DELETE CASCADE,
            signed_by    UUID NOT NULL,
            note         TEXT,
            signed_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Training sessions (append-only log) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS training_sessions (
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            onboarding_id  UUID NOT NULL REFERENCES school_onboardings(id) ON DELETE CASCADE,
            title          VARCHAR(255) NOT NULL,
            session_date   DATE NOT NULL,
            trainer        VARCHAR(255),
            audience       VARCHAR(255),
            attendee_count INT NOT NULL DEFAULT 0,
            notes          TEXT,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Support tickets ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS support_tickets (
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            onboarding_id UUID NOT NULL REFERENCES school_onboardings(id) ON DELETE CASCADE,
            subject       VARCHAR(255) NOT NULL,
            description   TEXT,
            severity      TEXT NOT NULL DEFAULT 'medium'
                          CHECK (severity IN ('low','medium','high')),
            status        TEXT NOT NULL DEFAULT 'open'
                          CHECK (status IN ('open','in_progress','resolved')),
            resolved_at   TIMESTAMPTZ,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Student profiles (aggregate root, one per student) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS student_profiles (
            id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            student_id UUID UNIQUE NOT NULL,
            notes      TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Profile child collections (append-only) ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS academic_records (
            id         UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            profile_id UUID NOT NULL REFERENCES student_profiles(id) ON DELETE CASCADE,
            subject    VARCHAR(128) NOT NULL,
            term       VARCHAR(64) NOT NULL,
            score      INT NOT NULL,
            max_score  INT NOT NULL,
            grade      VARCHAR(8),
            remarks    TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS behavioral_records (
            id           UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            profile_id   UUID NOT NULL REFERENCES student_profiles(id) ON DELETE CASCADE,
            category     TEXT NOT NULL CHECK (category IN ('positive','concern','incident')),
            description  TEXT NOT NULL,
            action_taken TEXT,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS interventions (
            id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            profile_id  UUID NOT NULL REFERENCES student_profiles(id) ON DELETE CASCADE,
            kind        VARCHAR(128) NOT NULL,
            description TEXT,
            status      TEXT NOT NULL DEFAULT 'planned'
                        CHECK (status IN ('planned','ongoing','completed','discontinued')),
            started_on  DATE,
            ended_on    DATE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS communication_logs (
            id             UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            profile_id     UUID NOT NULL REFERENCES student_profiles(id) ON DELETE CASCADE,
            channel        TEXT NOT NULL CHECK (channel IN ('call','meeting','message','home_visit')),
            contact_person VARCHAR(255),
            summary        TEXT NOT NULL,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS goals (
            id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            profile_id  UUID NOT NULL REFERENCES student_profiles(id) ON DELETE CASCADE,
            title       VARCHAR(255) NOT NULL,
            description TEXT,
            status      TEXT NOT NULL DEFAULT 'not_started'
                        CHECK (status IN ('not_started','in_progress','achieved','abandoned')),
            target_date DATE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- Volunteer requests ---
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS volunteer_requests (
            id            UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name          VARCHAR(255) NOT NULL,
            email         VARCHAR(255) NOT NULL,
            phone         VARCHAR(32) NOT NULL,
            city          VARCHAR(128) NOT NULL,
            pincode       VARCHAR(16) NOT NULL,
            interest_area VARCHAR(128),
            message       TEXT,
            status        TEXT NOT NULL DEFAULT 'new'
                          CHECK (status IN ('new','contacted','onboarded','declined')),
            created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    )
    .execute(pool)
    .await?;

    // --- updated_at trigger function ---
    sqlx::raw_sql(
        r#"CREATE OR REPLACE FUNCTION update_updated_at()
           RETURNS TRIGGER AS $fn$
           BEGIN NEW.updated_at = NOW(); RETURN NEW; END;
           $fn$ LANGUAGE plpgsql"#,
    )
    .execute(pool)
    .await?;

    // --- Triggers (one per table, idempotent via DROP IF EXISTS + CREATE) ---
    for table in &[
        "users",
        "schools",
        "programs",
        "students",
        "cohorts",
        "school_onboardings",
        "onboarding_tasks",
        "onboarding_milestones",
        "support_tickets",
        "student_profiles",
        "goals",
        "volunteer_requests",
    ] {
        let trigger = format!("{table}_updated_at");
        sqlx::raw_sql(&format!(
            r#"DROP TRIGGER IF EXISTS "{trigger}" ON "{table}";
               CREATE TRIGGER "{trigger}"
               BEFORE UPDATE ON "{table}"
               FOR EACH ROW EXECUTE FUNCTION update_updated_at()"#
        ))
        .execute(pool)
        .await?;
    }

    tracing::info!("Database schema provisioned");
    Ok(())
}
