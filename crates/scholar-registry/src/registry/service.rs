use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::admit_id::generate_admit_id;
use super::domain::{
    digits_of, AdmitId, RegistrationForm, StudentRecord, StudentUpdate, ValidationError,
    RESULT_PENDING, SCORE_NOT_AVAILABLE,
};
use super::repository::{
    ListQuery, NewStudent, RepositoryError, StudentPage, StudentRepository,
};

/// Service wiring the identifier generator and the student store together.
/// Every operation is a single store call; there are no transactions and no
/// cross-request coordination.
pub struct StudentService<R> {
    repository: Arc<R>,
}

impl<R> StudentService<R>
where
    R: StudentRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validate and persist a new registration.
    ///
    /// The admit id is minted exactly once per attempt; a duplicate-key
    /// failure is handed back to the caller, who retries registration from
    /// scratch and thereby gets a fresh id.
    pub async fn register(&self, form: RegistrationForm) -> Result<StudentRecord, ServiceError> {
        form.validate()?;

        let student = NewStudent {
            student_id: Uuid::new_v4(),
            admit_id: generate_admit_id(),
            name: form.name,
            father_name: form.father,
            grade: form.grade,
            contact: form.contact,
            school: form.school,
            photo_url: form.photo_url.unwrap_or_default(),
            test_center: form.center,
            result: RESULT_PENDING.to_string(),
            score: SCORE_NOT_AVAILABLE.to_string(),
        };

        let record = self.repository.insert(student).await?;
        info!(admit_id = %record.admit_id, "student registered");
        Ok(record)
    }

    /// Fetch the full record behind an admit id. A malformed id is just a
    /// string that matches nothing.
    pub async fn admit_card(&self, admit_id: &AdmitId) -> Result<StudentRecord, ServiceError> {
        let record = self
            .repository
            .fetch(admit_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Loose phone lookup: the query is reduced to its digits and matched
    /// as a substring of the stored contact's digits, so formatting
    /// differences (dashes, spaces, country codes) don't matter.
    ///
    /// Multiple students can share a household phone; only the first match
    /// by store ordering is returned.
    pub async fn find_by_phone(&self, raw_phone: &str) -> Result<StudentRecord, ServiceError> {
        let digits = digits_of(raw_phone);
        if digits.is_empty() {
            return Err(RepositoryError::NotFound.into());
        }

        let record = self
            .repository
            .find_by_contact_digits(&digits)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Overwrite the result and score fields. The canonical result values
    /// are caller discipline; the store accepts any string.
    pub async fn update_result(
        &self,
        admit_id: &AdmitId,
        result: &str,
        score: &str,
    ) -> Result<StudentRecord, ServiceError> {
        let record = self.repository.update_result(admit_id, result, score).await?;
        info!(admit_id = %record.admit_id, result = %record.result, "result updated");
        Ok(record)
    }

    /// Apply an admin patch to any subset of mutable fields.
    pub async fn update(
        &self,
        admit_id: &AdmitId,
        update: &StudentUpdate,
    ) -> Result<StudentRecord, ServiceError> {
        Ok(self.repository.update(admit_id, update).await?)
    }

    /// Newest-first listing with optional search and pagination.
    pub async fn list(&self, query: &ListQuery) -> Result<StudentPage, ServiceError> {
        Ok(self.repository.list(query).await?)
    }

    /// Delete the record behind an admit id.
    pub async fn delete(&self, admit_id: &AdmitId) -> Result<(), ServiceError> {
        self.repository.delete(admit_id).await?;
        info!(admit_id = %admit_id, "student deleted");
        Ok(())
    }
}

/// Error raised by the student service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
