use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::db::{
    get_competition_by_slug, list_competitions, register_participant, seed_competitions,
    submit_project,
};
use crate::error::AppError;
use crate::models::{Competition, NewRegistration, NewSubmission};
use crate::validation::{AppErrorExt, ErrorResponse, JsonValidateExt};

#[derive(Deserialize, Validate, Clone)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Select a competition"))]
    pub category_slug: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Index number is required"))]
    pub index_no: String,
    pub grade: i64,
    #[validate(length(min = 1, message = "Class letter is required"))]
    pub class_letter: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "WhatsApp number is required"))]
    pub whatsapp: String,
}

impl From<RegisterRequest> for NewRegistration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            category_slug: req.category_slug,
            name: req.name,
            index_no: req.index_no,
            grade: req.grade,
            class_letter: req.class_letter,
            email: req.email,
            whatsapp: req.whatsapp,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub reference_code: String,
}

#[post("/register", data = "<registration>")]
pub async fn api_register_participant(
    registration: Json<RegisterRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<RegisterResponse>>, Custom<Json<ErrorResponse>>> {
    let validated = registration.validate_custom()?;

    let receipt = register_participant(db, &NewRegistration::from(validated))
        .await
        .validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(RegisterResponse {
            id: receipt.id,
            reference_code: receipt.reference_code,
        }),
    ))
}

#[derive(Deserialize, Validate, Clone)]
pub struct SubmitRequest {
    #[validate(length(min = 1, message = "Select a competition"))]
    pub category_slug: String,
    #[validate(length(min = 1, message = "Index number is required"))]
    pub index_no: String,
    pub text: String,
    #[validate(length(min = 1, message = "Drive link is required"))]
    pub drive_url: String,
    pub grade: Option<i64>,
    pub class_letter: Option<String>,
}

impl From<SubmitRequest> for NewSubmission {
    fn from(req: SubmitRequest) -> Self {
        Self {
            category_slug: req.category_slug,
            index_no: req.index_no,
            text: req.text,
            drive_url: req.drive_url,
            grade: req.grade,
            class_letter: req.class_letter,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub registration_id: i64,
}

#[post("/submissions", data = "<submission>")]
pub async fn api_submit_project(
    submission: Json<SubmitRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<SubmitResponse>>, Custom<Json<ErrorResponse>>> {
    let validated = submission.validate_custom()?;

    let receipt = submit_project(db, &NewSubmission::from(validated))
        .await
        .validate_custom()?;

    Ok(Custom(
        Status::Created,
        Json(SubmitResponse {
            id: receipt.id,
            registration_id: receipt.registration_id,
        }),
    ))
}

#[derive(Serialize, Deserialize)]
pub struct CompetitionResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub is_open: bool,
    pub cap: Option<i64>,
    pub rules_url: Option<String>,
}

impl From<Competition> for CompetitionResponse {
    fn from(comp: Competition) -> Self {
        Self {
            id: comp.id,
            slug: comp.slug,
            title: comp.title,
            is_open: comp.is_open,
            cap: comp.cap,
            rules_url: comp.rules_url,
        }
    }
}

#[get("/competitions/<slug>")]
pub async fn api_get_competition(
    slug: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CompetitionResponse>, Custom<Json<ErrorResponse>>> {
    let comp = get_competition_by_slug(db, slug)
        .await
        .validate_custom()?
        .ok_or(AppError::CompetitionNotFound)
        .validate_custom()?;

    Ok(Json(CompetitionResponse::from(comp)))
}

#[get("/competitions")]
pub async fn api_list_competitions(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<CompetitionResponse>>, Custom<Json<ErrorResponse>>> {
    let competitions = list_competitions(db).await.validate_custom()?;

    Ok(Json(
        competitions
            .into_iter()
            .map(CompetitionResponse::from)
            .collect(),
    ))
}

#[derive(Serialize, Deserialize)]
pub struct SeedResponse {
    pub created: u64,
}

#[post("/admin/seed")]
pub async fn api_seed_competitions(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<SeedResponse>, Custom<Json<ErrorResponse>>> {
    let created = seed_competitions(db).await.validate_custom()?;

    Ok(Json(SeedResponse { created }))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
