use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Clone)]
pub struct Competition {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub is_open: bool,
    pub cap: Option<i64>,
    pub rules_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCompetition {
    pub id: Option<i64>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub is_open: Option<bool>,
    pub cap: Option<i64>,
    pub rules_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<DbCompetition> for Competition {
    fn from(db: DbCompetition) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            slug: db.slug.unwrap_or_default(),
            title: db.title.unwrap_or_default(),
            is_open: db.is_open.unwrap_or_default(),
            cap: db.cap,
            rules_url: db.rules_url,
            created_at: utc_or_now(db.created_at),
            updated_at: utc_or_now(db.updated_at),
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Registration {
    pub id: i64,
    pub competition_id: i64,
    pub competition_title: String, // Denormalized for display without a join
    pub name: String,
    pub index_no: String,
    pub grade: i64,
    pub class_letter: String,
    pub email: String,
    pub whatsapp: String,
    pub reference_code: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbRegistration {
    pub id: Option<i64>,
    pub competition_id: Option<i64>,
    pub competition_title: Option<String>,
    pub name: Option<String>,
    pub index_no: Option<String>,
    pub grade: Option<i64>,
    pub class_letter: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub reference_code: Option<String>,
    pub submitted_at: Option<NaiveDateTime>,
}

impl From<DbRegistration> for Registration {
    fn from(db: DbRegistration) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            competition_id: db.competition_id.unwrap_or_default(),
            competition_title: db.competition_title.unwrap_or_default(),
            name: db.name.unwrap_or_default(),
            index_no: db.index_no.unwrap_or_default(),
            grade: db.grade.unwrap_or_default(),
            class_letter: db.class_letter.unwrap_or_default(),
            email: db.email.unwrap_or_default(),
            whatsapp: db.whatsapp.unwrap_or_default(),
            reference_code: db.reference_code.unwrap_or_default(),
            submitted_at: utc_or_now(db.submitted_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Replaced,
    // Set administratively, never by the submission write-path
    Withdrawn,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Replaced => "replaced",
            SubmissionStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "replaced" => SubmissionStatus::Replaced,
            "withdrawn" => SubmissionStatus::Withdrawn,
            _ => SubmissionStatus::Submitted,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Submission {
    pub id: i64,
    pub registration_id: i64,
    pub text: String,
    pub drive_url: String,
    pub created_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub is_current: bool,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbSubmission {
    pub id: Option<i64>,
    pub registration_id: Option<i64>,
    pub text: Option<String>,
    pub drive_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub is_current: Option<bool>,
}

impl From<DbSubmission> for Submission {
    fn from(db: DbSubmission) -> Self {
        Self {
            id: db.id.unwrap_or_default(),
            registration_id: db.registration_id.unwrap_or_default(),
            text: db.text.unwrap_or_default(),
            drive_url: db.drive_url.unwrap_or_default(),
            created_at: utc_or_now(db.created_at),
            status: SubmissionStatus::from_db(db.status.as_deref().unwrap_or_default()),
            is_current: db.is_current.unwrap_or_default(),
        }
    }
}

/// Raw (pre-normalization) registration input as it arrives from the form.
pub struct NewRegistration {
    pub category_slug: String,
    pub name: String,
    pub index_no: String,
    pub grade: i64,
    pub class_letter: String,
    pub email: String,
    pub whatsapp: String,
}

#[derive(Debug)]
pub struct RegistrationReceipt {
    pub id: i64,
    pub reference_code: String,
}

/// Raw submission input; grade/class_letter are only required when the
/// index number matches more than one registration in the competition.
pub struct NewSubmission {
    pub category_slug: String,
    pub index_no: String,
    pub text: String,
    pub drive_url: String,
    pub grade: Option<i64>,
    pub class_letter: Option<String>,
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub id: i64,
    pub registration_id: i64,
}

fn utc_or_now(dt: Option<NaiveDateTime>) -> DateTime<Utc> {
    dt.map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
        .unwrap_or_else(Utc::now)
}
