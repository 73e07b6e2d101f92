use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public identifier printed on the admit card; the record key for every
/// lookup, update, and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdmitId(pub String);

impl AdmitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdmitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default `result` until an admin records the outcome.
pub const RESULT_PENDING: &str = "Pending";
/// Default `score` until an admin records the outcome.
pub const SCORE_NOT_AVAILABLE: &str = "Not Available";

/// Strip everything but ASCII digits. Phone lookup compares these on both
/// sides so `0331-582-1144` and `03315821144` meet in the middle.
pub fn digits_of(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Registration payload as submitted by the public site. Wire keys follow
/// the form field names (`father`, `center`, `photoUrl`); absent fields
/// deserialize to empty strings and fail presence validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub father: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub school: String,
    #[serde(default, rename = "photoUrl")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub center: String,
}

impl RegistrationForm {
    /// Every field except the photo is mandatory; whitespace-only counts
    /// as missing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required: [(&'static str, &str); 6] = [
            ("name", &self.name),
            ("father", &self.father),
            ("grade", &self.grade),
            ("contact", &self.contact),
            ("school", &self.school),
            ("center", &self.center),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError { field });
            }
        }

        Ok(())
    }
}

/// A registration submission missing a required field; no write is
/// attempted for these.
#[derive(Debug, thiserror::Error)]
#[error("missing required field: {field}")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Persisted student record, one per registrant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn contact_digits(&self) -> String {
        digits_of(&self.contact)
    }

    /// Full wire projection used by fetch, update, and listing responses.
    pub fn view(&self) -> StudentView {
        StudentView {
            student_id: self.student_id,
            admit_id: self.admit_id.0.clone(),
            name: self.name.clone(),
            father: self.father_name.clone(),
            grade: self.grade.clone(),
            contact: self.contact.clone(),
            school: self.school.clone(),
            photo_url: self.photo_url.clone(),
            center: self.test_center.clone(),
            result: self.result.clone(),
            score: self.score.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Minimal projection returned by phone lookup.
    pub fn phone_match_view(&self) -> PhoneMatchView {
        PhoneMatchView {
            admit_id: self.admit_id.0.clone(),
            name: self.name.clone(),
            grade: self.grade.clone(),
        }
    }

    /// Registration receipt: the public admit id plus the internal record
    /// reference.
    pub fn receipt(&self) -> RegistrationReceipt {
        RegistrationReceipt {
            admit_id: self.admit_id.0.clone(),
            student_id: self.student_id,
        }
    }
}

/// Admin patch; only supplied fields are written. The admit id, internal
/// id, and creation timestamp are never patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub father: Option<String>,
    pub grade: Option<String>,
    pub contact: Option<String>,
    pub school: Option<String>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub center: Option<String>,
    pub result: Option<String>,
    pub score: Option<String>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.father.is_none()
            && self.grade.is_none()
            && self.contact.is_none()
            && self.school.is_none()
            && self.photo_url.is_none()
            && self.center.is_none()
            && self.result.is_none()
            && self.score.is_none()
    }

    /// Apply the patch in place; the store implementation refreshes
    /// `updated_at` itself.
    pub fn apply(&self, record: &mut StudentRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(father) = &self.father {
            record.father_name = father.clone();
        }
        if let Some(grade) = &self.grade {
            record.grade = grade.clone();
        }
        if let Some(contact) = &self.contact {
            record.contact = contact.clone();
        }
        if let Some(school) = &self.school {
            record.school = school.clone();
        }
        if let Some(photo_url) = &self.photo_url {
            record.photo_url = photo_url.clone();
        }
        if let Some(center) = &self.center {
            record.test_center = center.clone();
        }
        if let Some(result) = &self.result {
            record.result = result.clone();
        }
        if let Some(score) = &self.score {
            record.score = score.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentView {
    #[serde(rename = "studentId")]
    pub student_id: Uuid,
    #[serde(rename = "admitId")]
    pub admit_id: String,
    pub name: String,
    pub father: String,
    pub grade: String,
    pub contact: String,
    pub school: String,
    #[serde(rename = "photoUrl")]
    pub photo_url: String,
    pub center: String,
    pub result: String,
    pub score: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneMatchView {
    #[serde(rename = "admitId")]
    pub admit_id: String,
    pub name: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationReceipt {
    #[serde(rename = "admitId")]
    pub admit_id: String,
    #[serde(rename = "studentId")]
    pub student_id: Uuid,
}
