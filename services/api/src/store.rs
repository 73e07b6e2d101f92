//! Postgres-backed student store.
//!
//! One pooled client per operation, one statement per operation; the UNIQUE
//! constraint on `admit_id` is the only collision guard for generated
//! identifiers, matching the registration contract.

use std::str::FromStr;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use scholar_registry::config::DatabaseConfig;
use scholar_registry::registry::{
    digits_of, AdmitId, ListQuery, NewStudent, PageInfo, RepositoryError, StudentPage,
    StudentRecord, StudentRepository, StudentUpdate,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    student_id      UUID PRIMARY KEY,
    admit_id        TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    father_name     TEXT NOT NULL,
    grade           TEXT NOT NULL,
    contact         TEXT NOT NULL,
    contact_digits  TEXT NOT NULL,
    school          TEXT NOT NULL,
    photo_url       TEXT NOT NULL DEFAULT '',
    test_center     TEXT NOT NULL,
    result          TEXT NOT NULL DEFAULT 'Pending',
    score           TEXT NOT NULL DEFAULT 'Not Available',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const RETURNING: &str = "student_id, admit_id, name, father_name, grade, contact, school, \
                         photo_url, test_center, result, score, created_at, updated_at";

/// Pooled Postgres store holding the single student collection.
pub(crate) struct PgStudentRepository {
    pool: Pool,
}

impl PgStudentRepository {
    /// Build the pool from the configured connection string and make sure
    /// the students table exists.
    pub(crate) async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let pg_config = tokio_postgres::Config::from_str(&config.url).map_err(|err| {
            RepositoryError::Unavailable(format!("invalid connection string: {err}"))
        })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .build()
            .map_err(|err| RepositoryError::Unavailable(format!("failed to build pool: {err}")))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn client(&self) -> Result<deadpool_postgres::Object, RepositoryError> {
        self.pool
            .get()
            .await
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))
    }

    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA).await.map_err(map_pg_error)
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn insert(&self, student: NewStudent) -> Result<StudentRecord, RepositoryError> {
        let client = self.client().await?;
        let contact_digits = digits_of(&student.contact);

        let stmt = format!(
            "INSERT INTO students \
             (student_id, admit_id, name, father_name, grade, contact, contact_digits, \
              school, photo_url, test_center, result, score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {RETURNING}"
        );
        let row = client
            .query_one(
                stmt.as_str(),
                &[
                    &student.student_id,
                    &student.admit_id.0,
                    &student.name,
                    &student.father_name,
                    &student.grade,
                    &student.contact,
                    &contact_digits,
                    &student.school,
                    &student.photo_url,
                    &student.test_center,
                    &student.result,
                    &student.score,
                ],
            )
            .await
            .map_err(map_pg_error)?;

        Ok(row_to_record(&row))
    }

    async fn fetch(&self, admit_id: &AdmitId) -> Result<Option<StudentRecord>, RepositoryError> {
        let client = self.client().await?;
        let stmt = format!("SELECT {RETURNING} FROM students WHERE admit_id = $1");
        let row = client
            .query_opt(stmt.as_str(), &[&admit_id.0])
            .await
            .map_err(map_pg_error)?;
        Ok(row.map(|row| row_to_record(&row)))
    }

    async fn find_by_contact_digits(
        &self,
        digits: &str,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        let client = self.client().await?;
        // The needle is digits only, so no LIKE metacharacters can sneak in.
        let stmt = format!(
            "SELECT {RETURNING} FROM students \
             WHERE contact_digits LIKE '%' || $1 || '%' \
             ORDER BY created_at ASC, admit_id ASC LIMIT 1"
        );
        let row = client
            .query_opt(stmt.as_str(), &[&digits])
            .await
            .map_err(map_pg_error)?;
        Ok(row.map(|row| row_to_record(&row)))
    }

    async fn update_result(
        &self,
        admit_id: &AdmitId,
        result: &str,
        score: &str,
    ) -> Result<StudentRecord, RepositoryError> {
        let client = self.client().await?;
        let stmt = format!(
            "UPDATE students SET result = $2, score = $3, updated_at = now() \
             WHERE admit_id = $1 RETURNING {RETURNING}"
        );
        let row = client
            .query_opt(stmt.as_str(), &[&admit_id.0, &result, &score])
            .await
            .map_err(map_pg_error)?;
        row.map(|row| row_to_record(&row))
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        admit_id: &AdmitId,
        update: &StudentUpdate,
    ) -> Result<StudentRecord, RepositoryError> {
        if update.is_empty() {
            return self.fetch(admit_id).await?.ok_or(RepositoryError::NotFound);
        }

        let client = self.client().await?;
        let contact_digits = update.contact.as_deref().map(digits_of);

        let fields: [(&str, Option<&String>); 9] = [
            ("name", update.name.as_ref()),
            ("father_name", update.father.as_ref()),
            ("grade", update.grade.as_ref()),
            ("contact", update.contact.as_ref()),
            ("school", update.school.as_ref()),
            ("photo_url", update.photo_url.as_ref()),
            ("test_center", update.center.as_ref()),
            ("result", update.result.as_ref()),
            ("score", update.score.as_ref()),
        ];

        let mut assignments: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&admit_id.0];
        for (column, value) in fields {
            if let Some(value) = value {
                params.push(value);
                assignments.push(format!("{column} = ${}", params.len()));
            }
        }
        if let Some(digits) = contact_digits.as_ref() {
            params.push(digits);
            assignments.push(format!("contact_digits = ${}", params.len()));
        }
        assignments.push("updated_at = now()".to_string());

        let stmt = format!(
            "UPDATE students SET {} WHERE admit_id = $1 RETURNING {RETURNING}",
            assignments.join(", ")
        );
        let row = client
            .query_opt(stmt.as_str(), &params)
            .await
            .map_err(map_pg_error)?;
        row.map(|row| row_to_record(&row))
            .ok_or(RepositoryError::NotFound)
    }

    async fn list(&self, query: &ListQuery) -> Result<StudentPage, RepositoryError> {
        let client = self.client().await?;

        let pattern = query.search_term().map(like_pattern);
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let where_clause = match pattern.as_ref() {
            Some(pattern) => {
                params.push(pattern);
                "WHERE name ILIKE $1 ESCAPE '\\' \
                 OR admit_id ILIKE $1 ESCAPE '\\' \
                 OR school ILIKE $1 ESCAPE '\\'"
            }
            None => "",
        };

        let order = "ORDER BY created_at DESC, admit_id DESC";

        if !query.wants_pagination() {
            let stmt = format!("SELECT {RETURNING} FROM students {where_clause} {order}");
            let rows = client
                .query(stmt.as_str(), &params)
                .await
                .map_err(map_pg_error)?;
            return Ok(StudentPage {
                records: rows.iter().map(row_to_record).collect(),
                pagination: None,
            });
        }

        let count_stmt = format!("SELECT COUNT(*) FROM students {where_clause}");
        let total: i64 = client
            .query_one(count_stmt.as_str(), &params)
            .await
            .map_err(map_pg_error)?
            .get(0);

        let page = query.page_number();
        let size = query.page_size();
        let limit = size as i64;
        let offset = ((page - 1) * size) as i64;

        let stmt = format!(
            "SELECT {RETURNING} FROM students {where_clause} {order} \
             LIMIT {limit} OFFSET {offset}"
        );
        let rows = client
            .query(stmt.as_str(), &params)
            .await
            .map_err(map_pg_error)?;

        Ok(StudentPage {
            records: rows.iter().map(row_to_record).collect(),
            pagination: Some(PageInfo::compute(page, size, total as u64)),
        })
    }

    async fn delete(&self, admit_id: &AdmitId) -> Result<(), RepositoryError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM students WHERE admit_id = $1", &[&admit_id.0])
            .await
            .map_err(map_pg_error)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn map_pg_error(err: tokio_postgres::Error) -> RepositoryError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        RepositoryError::Duplicate
    } else {
        RepositoryError::Unavailable(err.to_string())
    }
}

fn row_to_record(row: &Row) -> StudentRecord {
    StudentRecord {
        student_id: row.get("student_id"),
        admit_id: AdmitId(row.get("admit_id")),
        name: row.get("name"),
        father_name: row.get("father_name"),
        grade: row.get("grade"),
        contact: row.get("contact"),
        school: row.get("school"),
        photo_url: row.get("photo_url"),
        test_center: row.get("test_center"),
        result: row.get("result"),
        score: row.get("score"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Escape LIKE metacharacters so a search term always means "contains this
/// literally", then wrap it for substring matching.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
