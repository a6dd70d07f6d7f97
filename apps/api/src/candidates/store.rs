//! Candidate gateway: the persistence contract for the candidate aggregate.
//!
//! Every operation works on the whole aggregate (candidate + education +
//! experience) and runs inside a single Postgres transaction, so a failure at
//! any step rolls back everything the operation did.
//!
//! `AppState` holds an `Arc<dyn CandidateStore>`; `PgCandidateStore` is the
//! production backend.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::candidates::validation::{
    CandidateUpdate, EducationInput, ExperienceInput, NewCandidate,
};
use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateRow, EducationRow, ExperienceRow};

pub const CREATE_FAILED: &str = "Error al crear el candidato";
pub const FIND_FAILED: &str = "Error al buscar el candidato";
pub const UPDATE_FAILED: &str = "Error al actualizar el candidato";
pub const DELETE_FAILED: &str = "Error al borrar el candidato";

/// The candidate gateway. Lookups are by email only; unknown emails yield
/// `AppError::NotFound`.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Inserts the candidate and all child rows.
    async fn create(&self, new: NewCandidate) -> Result<Candidate, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Candidate, AppError>;

    /// Applies the supplied scalar fields and replaces both child collections
    /// wholesale. The email itself never changes.
    async fn replace_by_email(
        &self,
        email: &str,
        update: CandidateUpdate,
    ) -> Result<Candidate, AppError>;

    /// Removes education rows, then experience rows, then the candidate.
    /// Returns the aggregate as it was before deletion.
    async fn delete_by_email(&self, email: &str) -> Result<Candidate, AppError>;
}

#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn create(&self, new: NewCandidate) -> Result<Candidate, AppError> {
        let created = create_in_tx(&self.pool, &new)
            .await
            .map_err(AppError::store(CREATE_FAILED))?;

        info!(
            "Created candidate {} ({} education, {} experience)",
            created.candidate.id,
            created.education.len(),
            created.experience.len()
        );
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Candidate, AppError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(AppError::store(FIND_FAILED))?;

        load_aggregate(&mut conn, email, false)
            .await
            .map_err(AppError::store(FIND_FAILED))?
            .ok_or_else(AppError::candidate_not_found)
    }

    async fn replace_by_email(
        &self,
        email: &str,
        update: CandidateUpdate,
    ) -> Result<Candidate, AppError> {
        let updated = replace_in_tx(&self.pool, email, &update)
            .await
            .map_err(AppError::store(UPDATE_FAILED))?
            .ok_or_else(AppError::candidate_not_found)?;

        info!(
            "Replaced candidate {} ({} education, {} experience)",
            updated.candidate.id,
            updated.education.len(),
            updated.experience.len()
        );
        Ok(updated)
    }

    async fn delete_by_email(&self, email: &str) -> Result<Candidate, AppError> {
        let deleted = delete_in_tx(&self.pool, email)
            .await
            .map_err(AppError::store(DELETE_FAILED))?
            .ok_or_else(AppError::candidate_not_found)?;

        info!("Deleted candidate {}", deleted.candidate.id);
        Ok(deleted)
    }
}

async fn create_in_tx(pool: &PgPool, new: &NewCandidate) -> sqlx::Result<Candidate> {
    let mut tx = pool.begin().await?;

    let candidate: CandidateRow = sqlx::query_as(
        r#"
        INSERT INTO candidates (id, first_name, last_name, email, phone, address, resume_path)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.address)
    .bind(&new.resume_path)
    .fetch_one(&mut *tx)
    .await?;

    let education = insert_education(&mut tx, candidate.id, &new.education).await?;
    let experience = insert_experience(&mut tx, candidate.id, &new.experience).await?;

    tx.commit().await?;

    Ok(Candidate {
        candidate,
        education,
        experience,
    })
}

async fn replace_in_tx(
    pool: &PgPool,
    email: &str,
    update: &CandidateUpdate,
) -> sqlx::Result<Option<Candidate>> {
    let mut tx = pool.begin().await?;

    let Some(existing) = lock_candidate(&mut tx, email).await? else {
        return Ok(None);
    };

    let candidate: CandidateRow = sqlx::query_as(
        r#"
        UPDATE candidates
        SET first_name = COALESCE($2, first_name),
            last_name  = COALESCE($3, last_name),
            phone      = COALESCE($4, phone),
            address    = COALESCE($5, address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.address)
    .fetch_one(&mut *tx)
    .await?;

    delete_children(&mut tx, candidate.id).await?;
    let education = insert_education(&mut tx, candidate.id, &update.education).await?;
    let experience = insert_experience(&mut tx, candidate.id, &update.experience).await?;

    tx.commit().await?;

    Ok(Some(Candidate {
        candidate,
        education,
        experience,
    }))
}

async fn delete_in_tx(pool: &PgPool, email: &str) -> sqlx::Result<Option<Candidate>> {
    let mut tx = pool.begin().await?;

    let Some(prior) = load_aggregate(&mut tx, email, true).await? else {
        return Ok(None);
    };

    delete_children(&mut tx, prior.candidate.id).await?;
    sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(prior.candidate.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(prior))
}

async fn lock_candidate(conn: &mut PgConnection, email: &str) -> sqlx::Result<Option<CandidateRow>> {
    sqlx::query_as("SELECT * FROM candidates WHERE email = $1 FOR UPDATE")
        .bind(email)
        .fetch_optional(conn)
        .await
}

/// Loads the candidate and its children. With `lock` the candidate row is
/// held `FOR UPDATE` until the surrounding transaction ends.
async fn load_aggregate(
    conn: &mut PgConnection,
    email: &str,
    lock: bool,
) -> sqlx::Result<Option<Candidate>> {
    let candidate: Option<CandidateRow> = if lock {
        lock_candidate(&mut *conn, email).await?
    } else {
        sqlx::query_as("SELECT * FROM candidates WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?
    };
    let Some(candidate) = candidate else {
        return Ok(None);
    };

    let education: Vec<EducationRow> = sqlx::query_as(
        r#"
        SELECT id, candidate_id, institution, degree, start_date, end_date, description
        FROM educations
        WHERE candidate_id = $1
        ORDER BY sort_order ASC
        "#,
    )
    .bind(candidate.id)
    .fetch_all(&mut *conn)
    .await?;

    let experience: Vec<ExperienceRow> = sqlx::query_as(
        r#"
        SELECT id, candidate_id, company, position, start_date, end_date, responsibilities
        FROM experiences
        WHERE candidate_id = $1
        ORDER BY sort_order ASC
        "#,
    )
    .bind(candidate.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Candidate {
        candidate,
        education,
        experience,
    }))
}

/// Education first, then experience.
async fn delete_children(conn: &mut PgConnection, candidate_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM educations WHERE candidate_id = $1")
        .bind(candidate_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM experiences WHERE candidate_id = $1")
        .bind(candidate_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_education(
    conn: &mut PgConnection,
    candidate_id: Uuid,
    entries: &[EducationInput],
) -> sqlx::Result<Vec<EducationRow>> {
    let mut rows = Vec::with_capacity(entries.len());
    for (sort_order, edu) in entries.iter().enumerate() {
        let row: EducationRow = sqlx::query_as(
            r#"
            INSERT INTO educations
                (id, candidate_id, sort_order, institution, degree, start_date, end_date, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, candidate_id, institution, degree, start_date, end_date, description
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(sort_order as i32)
        .bind(&edu.institution)
        .bind(&edu.degree)
        .bind(edu.start_date)
        .bind(edu.end_date)
        .bind(&edu.description)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

async fn insert_experience(
    conn: &mut PgConnection,
    candidate_id: Uuid,
    entries: &[ExperienceInput],
) -> sqlx::Result<Vec<ExperienceRow>> {
    let mut rows = Vec::with_capacity(entries.len());
    for (sort_order, exp) in entries.iter().enumerate() {
        let row: ExperienceRow = sqlx::query_as(
            r#"
            INSERT INTO experiences
                (id, candidate_id, sort_order, company, position, start_date, end_date, responsibilities)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, candidate_id, company, position, start_date, end_date, responsibilities
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(sort_order as i32)
        .bind(&exp.company)
        .bind(&exp.position)
        .bind(exp.start_date)
        .bind(exp.end_date)
        .bind(&exp.responsibilities)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}
