use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{AdmitId, StudentRecord, StudentUpdate};

/// Fields persisted for a brand-new registrant. The store stamps the
/// timestamps and derives the contact digits for phone lookup.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub student_id: Uuid,
    pub admit_id: AdmitId,
    pub name: String,
    pub father_name: String,
    pub grade: String,
    pub contact: String,
    pub school: String,
    pub photo_url: String,
    pub test_center: String,
    pub result: String,
    pub score: String,
}

/// Listing parameters. Pagination kicks in only when either knob is
/// supplied; a bare listing returns everything.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn wants_pagination(&self) -> bool {
        self.page.is_some() || self.limit.is_some()
    }

    pub fn page_number(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.limit.unwrap_or(10).max(1)
    }

    /// Search term, if one was actually provided.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Pagination metadata echoed to the admin table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "currentPage")]
    pub current_page: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "totalStudents")]
    pub total_students: u64,
}

impl PageInfo {
    /// Offset-pagination arithmetic shared by the store implementations.
    pub fn compute(current_page: u64, page_size: u64, total_students: u64) -> Self {
        let total_pages = if total_students == 0 {
            0
        } else {
            total_students.div_ceil(page_size)
        };

        Self {
            current_page,
            total_pages,
            total_students,
        }
    }
}

/// One listing result: records newest-first, metadata only when the query
/// asked for pagination.
#[derive(Debug, Clone)]
pub struct StudentPage {
    pub records: Vec<StudentRecord>,
    pub pagination: Option<PageInfo>,
}

/// Storage abstraction over the single student collection, so the service
/// and router can be exercised against an in-memory stand-in.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Insert a new record; a colliding admit id yields `Duplicate` and
    /// writes nothing.
    async fn insert(&self, student: NewStudent) -> Result<StudentRecord, RepositoryError>;

    /// Exact admit-id fetch.
    async fn fetch(&self, admit_id: &AdmitId) -> Result<Option<StudentRecord>, RepositoryError>;

    /// First record, oldest first, whose contact digits contain `digits`.
    async fn find_by_contact_digits(
        &self,
        digits: &str,
    ) -> Result<Option<StudentRecord>, RepositoryError>;

    /// Overwrite `result` and `score`, leaving every other field untouched.
    async fn update_result(
        &self,
        admit_id: &AdmitId,
        result: &str,
        score: &str,
    ) -> Result<StudentRecord, RepositoryError>;

    /// Apply an admin patch to the matching record.
    async fn update(
        &self,
        admit_id: &AdmitId,
        update: &StudentUpdate,
    ) -> Result<StudentRecord, RepositoryError>;

    /// Newest-first listing with optional search and offset pagination.
    async fn list(&self, query: &ListQuery) -> Result<StudentPage, RepositoryError>;

    /// Remove the matching record.
    async fn delete(&self, admit_id: &AdmitId) -> Result<(), RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("duplicate admit id")]
    Duplicate,
    #[error("student not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
