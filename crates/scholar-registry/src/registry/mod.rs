//! Student registration and result management over the single student
//! collection: registration, admit-card and phone lookup, admin result
//! editing, listing with search/pagination, and deletion.

pub mod admit_id;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use admit_id::generate_admit_id;
pub use domain::{
    digits_of, AdmitId, PhoneMatchView, RegistrationForm, RegistrationReceipt, StudentRecord,
    StudentUpdate, StudentView, ValidationError, RESULT_PENDING, SCORE_NOT_AVAILABLE,
};
pub use repository::{
    ListQuery, NewStudent, PageInfo, RepositoryError, StudentPage, StudentRepository,
};
pub use router::{admin_router, registry_router};
pub use service::{ServiceError, StudentService};
