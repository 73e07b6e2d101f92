use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::Value;

use crate::registry::domain::{AdmitId, RegistrationForm, StudentRecord, StudentUpdate};
use crate::registry::repository::{
    ListQuery, NewStudent, PageInfo, RepositoryError, StudentPage, StudentRepository,
};
use crate::registry::router::{admin_router, registry_router};
use crate::registry::service::StudentService;

/// Mutexed stand-in for the production store. Records keep insertion order
/// so "first match" and "newest first" are deterministic even when two
/// inserts land on the same millisecond.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<Vec<StudentRecord>>>,
}

impl MemoryRepository {
    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[async_trait]
impl StudentRepository for MemoryRepository {
    async fn insert(&self, student: NewStudent) -> Result<StudentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|record| record.admit_id == student.admit_id) {
            return Err(RepositoryError::Duplicate);
        }

        let now = Utc::now();
        let record = StudentRecord {
            student_id: student.student_id,
            admit_id: student.admit_id,
            name: student.name,
            father_name: student.father_name,
            grade: student.grade,
            contact: student.contact,
            school: student.school,
            photo_url: student.photo_url,
            test_center: student.test_center,
            result: student.result,
            score: student.score,
            created_at: now,
            updated_at: now,
        };
        guard.push(record.clone());
        Ok(record)
    }

    async fn fetch(&self, admit_id: &AdmitId) -> Result<Option<StudentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.admit_id == admit_id).cloned())
    }

    async fn find_by_contact_digits(
        &self,
        digits: &str,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| record.contact_digits().contains(digits))
            .cloned())
    }

    async fn update_result(
        &self,
        admit_id: &AdmitId,
        result: &str,
        score: &str,
    ) -> Result<StudentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.admit_id == admit_id)
            .ok_or(RepositoryError::NotFound)?;
        record.result = result.to_string();
        record.score = score.to_string();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn update(
        &self,
        admit_id: &AdmitId,
        update: &StudentUpdate,
    ) -> Result<StudentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.admit_id == admit_id)
            .ok_or(RepositoryError::NotFound)?;
        update.apply(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn list(&self, query: &ListQuery) -> Result<StudentPage, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");

        let mut matched: Vec<StudentRecord> = guard
            .iter()
            .filter(|record| match query.search_term() {
                Some(term) => {
                    let term = term.to_lowercase();
                    record.name.to_lowercase().contains(&term)
                        || record.admit_id.as_str().to_lowercase().contains(&term)
                        || record.school.to_lowercase().contains(&term)
                }
                None => true,
            })
            .cloned()
            .collect();
        matched.reverse();

        if !query.wants_pagination() {
            return Ok(StudentPage {
                records: matched,
                pagination: None,
            });
        }

        let total = matched.len() as u64;
        let page = query.page_number();
        let size = query.page_size();
        let offset = ((page - 1) * size) as usize;
        let records = matched
            .into_iter()
            .skip(offset)
            .take(size as usize)
            .collect();

        Ok(StudentPage {
            records,
            pagination: Some(PageInfo::compute(page, size, total)),
        })
    }

    async fn delete(&self, admit_id: &AdmitId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let position = guard
            .iter()
            .position(|record| &record.admit_id == admit_id)
            .ok_or(RepositoryError::NotFound)?;
        guard.remove(position);
        Ok(())
    }
}

/// Store whose inserts always report an admit-id collision.
pub(super) struct ConflictRepository;

#[async_trait]
impl StudentRepository for ConflictRepository {
    async fn insert(&self, _student: NewStudent) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::Duplicate)
    }

    async fn fetch(&self, _admit_id: &AdmitId) -> Result<Option<StudentRecord>, RepositoryError> {
        Ok(None)
    }

    async fn find_by_contact_digits(
        &self,
        _digits: &str,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Ok(None)
    }

    async fn update_result(
        &self,
        _admit_id: &AdmitId,
        _result: &str,
        _score: &str,
    ) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        _admit_id: &AdmitId,
        _update: &StudentUpdate,
    ) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    async fn list(&self, _query: &ListQuery) -> Result<StudentPage, RepositoryError> {
        Ok(StudentPage {
            records: Vec::new(),
            pagination: None,
        })
    }

    async fn delete(&self, _admit_id: &AdmitId) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

/// Store where every operation fails, for exercising the 500 paths.
pub(super) struct UnavailableRepository;

#[async_trait]
impl StudentRepository for UnavailableRepository {
    async fn insert(&self, _student: NewStudent) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn fetch(&self, _admit_id: &AdmitId) -> Result<Option<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn find_by_contact_digits(
        &self,
        _digits: &str,
    ) -> Result<Option<StudentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn update_result(
        &self,
        _admit_id: &AdmitId,
        _result: &str,
        _score: &str,
    ) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn update(
        &self,
        _admit_id: &AdmitId,
        _update: &StudentUpdate,
    ) -> Result<StudentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn list(&self, _query: &ListQuery) -> Result<StudentPage, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    async fn delete(&self, _admit_id: &AdmitId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn sample_form() -> RegistrationForm {
    RegistrationForm {
        name: "Ali Khan".to_string(),
        father: "Imran Khan".to_string(),
        grade: "8".to_string(),
        contact: "03001234567".to_string(),
        school: "ABC School".to_string(),
        photo_url: None,
        center: "Center A".to_string(),
    }
}

pub(super) fn second_form() -> RegistrationForm {
    RegistrationForm {
        name: "Sara Ahmed".to_string(),
        father: "Bilal Ahmed".to_string(),
        grade: "10".to_string(),
        contact: "0331-582-1144".to_string(),
        school: "City Grammar School".to_string(),
        photo_url: Some("https://photos.example/sara.jpg".to_string()),
        center: "Center B".to_string(),
    }
}

pub(super) fn build_service() -> (Arc<StudentService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(StudentService::new(repository.clone()));
    (service, repository)
}

pub(super) fn full_router(service: Arc<StudentService<MemoryRepository>>) -> Router {
    registry_router(service.clone()).merge(admin_router(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
