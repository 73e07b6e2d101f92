use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use scholar_registry::registry::{
    AdmitId, ListQuery, NewStudent, PageInfo, RepositoryError, StudentPage, StudentRecord,
    StudentRepository, StudentUpdate,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Mutexed stand-in for the Postgres store; backs the CLI demo and the
/// route tests. Insertion order doubles as store ordering, so the oldest
/// record wins phone lookup and listings reverse to newest-first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentRepository {
    records: Arc<Mutex<Vec<StudentRecord>>>,
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
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
        let records = matched
            .into_iter()
            .skip(((page - 1) * size) as usize)
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
