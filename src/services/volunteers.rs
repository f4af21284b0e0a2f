use sqlx::PgPool;
use uuid::Uuid;

use crate::models::volunteer::{SubmitVolunteerRequest, UpdateVolunteerRequest, VolunteerRequest};

pub struct VolunteerService;

impl VolunteerService {
    /// Required fields of the public form, in display order. The handler
    /// reports every missing one in a single 400.
    pub fn missing_fields(req: &SubmitVolunteerRequest) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&req.name) {
            missing.push("name");
        }
        if blank(&req.email) {
            missing.push("email");
        }
        if blank(&req.phone) {
            missing.push("phone");
        }
        if blank(&req.city) {
            missing.push("city");
        }
        if blank(&req.pincode) {
            missing.push("pincode");
        }
        missing
    }

    /// Caller must have validated the required fields first.
    pub async fn submit(
        pool: &PgPool,
        req: &SubmitVolunteerRequest,
    ) -> anyhow::Result<VolunteerRequest> {
        let request = sqlx::query_as::<_, VolunteerRequest>(
            "INSERT INTO volunteer_requests (name, email, phone, city, pincode, interest_area, message)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.city)
        .bind(&req.pincode)
        .bind(&req.interest_area)
        .bind(&req.message)
        .fetch_one(pool)
        .await?;
        Ok(request)
    }

    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<VolunteerRequest>> {
        let requests = sqlx::query_as::<_, VolunteerRequest>(
            "SELECT * FROM volunteer_requests ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(requests)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateVolunteerRequest,
    ) -> anyhow::Result<Option<VolunteerRequest>> {
        let request = sqlx::query_as::<_, VolunteerRequest>(
            "UPDATE volunteer_requests
             SET status        = COALESCE($1, status),
                 interest_area = COALESCE($2, interest_area),
                 message       = COALESCE($3, message)
             WHERE id = $4
             RETURNING *",
        )
        .bind(&req.status)
        .bind(&req.interest_area)
        .bind(&req.message)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_all_blanks() {
        let req = SubmitVolunteerRequest {
            name: Some("Asha".into()),
            email: Some("asha@example.org".into()),
            phone: Some("  ".into()),
            city: None,
            pincode: None,
            interest_area: None,
            message: None,
        };
        assert_eq!(
            VolunteerService::missing_fields(&req),
            vec!["phone", "city", "pincode"]
        );
    }

    #[test]
    fn complete_submission_has_no_missing_fields() {
        let req = SubmitVolunteerRequest {
            name: Some("Asha".into()),
            email: Some("asha@example.org".into()),
            phone: Some("9876543210".into()),
            city: Some("Pune".into()),
            pincode: Some("411001".into()),
            interest_area: None,
            message: None,
        };
        assert!(VolunteerService::missing_fields(&req).is_empty());
    }
}
