use sqlx::PgPool;
use uuid::Uuid;

use crate::models::program::{CreateProgramRequest, Program, UpdateProgramRequest};

pub struct ProgramService;

impl ProgramService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<Program>> {
        let programs = sqlx::query_as::<_, Program>("SELECT * FROM programs ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(programs)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Program>> {
        let program = sqlx::query_as::<_, Program>("SELECT * FROM programs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(program)
    }

    pub async fn create(pool: &PgPool, req: &CreateProgramRequest) -> anyhow::Result<Program> {
        let program = sqlx::query_as::<_, Program>(
            "INSERT INTO programs (name, description, level_count, pass_threshold)
             VALUES ($1, $2, COALESCE($3, 4), COALESCE($4, 60))
             RETURNING *",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.level_count)
        .bind(req.pass_threshold)
        .fetch_one(pool)
        .await?;
        Ok(program)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateProgramRequest,
    ) -> anyhow::Result<Option<Program>> {
        let program = sqlx::query_as::<_, Program>(
            "UPDATE programs
             SET name           = COALESCE($1, name),
                 description    = COALESCE($2, description),
                 level_count    = COALESCE($3, level_count),
                 pass_threshold = COALESCE($4, pass_threshold),
                 is_active      = COALESCE($5, is_active)
             WHERE id = $6
             RETURNING *",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.level_count)
        .bind(req.pass_threshold)
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(program)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
