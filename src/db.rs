use crate::error::AppError;
use crate::models::{
    Competition, DbCompetition, DbRegistration, DbSubmission, NewRegistration, NewSubmission,
    Registration, RegistrationReceipt, Submission, SubmissionReceipt, SubmissionStatus,
};
use crate::normalize::{
    REFERENCE_CODE_RETRIES, clamp_grade, is_drive_url, normalize_class_letter, normalize_email,
    normalize_index_no, normalize_name, normalize_url, normalize_whatsapp, reference_code,
};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

/// The fixed category set the site launches with. Seeding skips slugs that
/// already exist, so re-running is safe on any partial prior state.
const SEED_COMPETITIONS: [(&str, &str); 3] = [
    ("web", "Web Developing"),
    ("video", "Video Editing"),
    ("graphic", "Graphic Design"),
];

#[instrument]
pub async fn get_competition_by_slug(
    pool: &Pool<Sqlite>,
    slug: &str,
) -> Result<Option<Competition>, AppError> {
    let row = sqlx::query_as::<_, DbCompetition>("SELECT * FROM competitions WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Competition::from))
}

#[instrument]
pub async fn list_competitions(pool: &Pool<Sqlite>) -> Result<Vec<Competition>, AppError> {
    let rows = sqlx::query_as::<_, DbCompetition>("SELECT * FROM competitions ORDER BY title")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Competition::from).collect())
}

#[instrument]
pub async fn create_competition(
    pool: &Pool<Sqlite>,
    slug: &str,
    title: &str,
    is_open: bool,
    cap: Option<i64>,
) -> Result<i64, AppError> {
    info!("Creating competition");
    let now = Utc::now().naive_utc();

    let res = sqlx::query(
        "INSERT INTO competitions (slug, title, is_open, cap, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(slug)
    .bind(title)
    .bind(is_open)
    .bind(cap)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn seed_competitions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    info!("Seeding competitions");

    let mut created = 0;
    for (slug, title) in SEED_COMPETITIONS {
        if get_competition_by_slug(pool, slug).await?.is_none() {
            create_competition(pool, slug, title, true, None).await?;
            created += 1;
        }
    }

    Ok(created)
}

#[instrument]
pub async fn find_registration_by_roll(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    grade: i64,
    class_letter: &str,
    index_no: &str,
) -> Result<Option<Registration>, AppError> {
    let row = sqlx::query_as::<_, DbRegistration>(
        "SELECT * FROM registrations
         WHERE competition_id = ? AND grade = ? AND class_letter = ? AND index_no = ?",
    )
    .bind(competition_id)
    .bind(grade)
    .bind(class_letter)
    .bind(index_no)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Registration::from))
}

#[instrument]
pub async fn find_registration_by_email(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    email: &str,
) -> Result<Option<Registration>, AppError> {
    let row = sqlx::query_as::<_, DbRegistration>(
        "SELECT * FROM registrations WHERE competition_id = ? AND email = ?",
    )
    .bind(competition_id)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Registration::from))
}

#[instrument]
pub async fn find_registrations_by_index(
    pool: &Pool<Sqlite>,
    competition_id: i64,
    index_no: &str,
) -> Result<Vec<Registration>, AppError> {
    let rows = sqlx::query_as::<_, DbRegistration>(
        "SELECT * FROM registrations WHERE competition_id = ? AND index_no = ?",
    )
    .bind(competition_id)
    .bind(index_no)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Registration::from).collect())
}

#[instrument]
pub async fn count_registrations(
    pool: &Pool<Sqlite>,
    competition_id: i64,
) -> Result<i64, AppError> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE competition_id = ?")
            .bind(competition_id)
            .fetch_one(pool)
            .await?;

    Ok(count.0)
}

#[instrument(skip(pool))]
pub async fn reference_code_in_use(pool: &Pool<Sqlite>, code: &str) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM registrations WHERE reference_code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Registration write-path. Sequential fail-fast checks, one insert on
/// success, no writes on any failure. The composite unique indexes catch
/// the race where two identical registrations pass the checks at once;
/// that late violation maps to the same conflict error.
#[instrument(skip_all, fields(category_slug = %input.category_slug))]
pub async fn register_participant(
    pool: &Pool<Sqlite>,
    input: &NewRegistration,
) -> Result<RegistrationReceipt, AppError> {
    info!("Registering participant");

    let comp = get_competition_by_slug(pool, &input.category_slug)
        .await?
        .ok_or(AppError::CompetitionNotFound)?;
    if !comp.is_open {
        return Err(AppError::RegistrationsClosed);
    }

    let name = normalize_name(&input.name);
    let index_no = normalize_index_no(&input.index_no);
    let grade = clamp_grade(input.grade);
    let class_letter = normalize_class_letter(&input.class_letter);
    let email = normalize_email(&input.email);
    let whatsapp = normalize_whatsapp(&input.whatsapp);

    if find_registration_by_roll(pool, comp.id, grade, &class_letter, &index_no)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateRoll);
    }

    if find_registration_by_email(pool, comp.id, &email)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateEmail);
    }

    if let Some(cap) = comp.cap {
        let count = count_registrations(pool, comp.id).await?;
        if count >= cap {
            return Err(AppError::CapacityReached);
        }
    }

    // Bounded best-effort uniqueness; after the retry budget the last code
    // is accepted and the unique index has the final say.
    let mut code = reference_code();
    for _ in 0..REFERENCE_CODE_RETRIES {
        if !reference_code_in_use(pool, &code).await? {
            break;
        }
        code = reference_code();
    }

    let res = sqlx::query(
        "INSERT INTO registrations
         (competition_id, competition_title, name, index_no, grade, class_letter,
          email, whatsapp, reference_code, submitted_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(comp.id)
    .bind(&comp.title)
    .bind(&name)
    .bind(&index_no)
    .bind(grade)
    .bind(&class_letter)
    .bind(&email)
    .bind(&whatsapp)
    .bind(&code)
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await
    .map_err(registration_conflict)?;

    Ok(RegistrationReceipt {
        id: res.last_insert_rowid(),
        reference_code: code,
    })
}

/// Submission write-path. Resolves the registration from category + index
/// number, disambiguating by grade/class when several registrations share
/// the raw index string, then retires any prior current submission and
/// inserts the new one in a single transaction.
#[instrument(skip_all, fields(category_slug = %input.category_slug))]
pub async fn submit_project(
    pool: &Pool<Sqlite>,
    input: &NewSubmission,
) -> Result<SubmissionReceipt, AppError> {
    info!("Recording project submission");

    let comp = get_competition_by_slug(pool, &input.category_slug)
        .await?
        .ok_or(AppError::CompetitionNotFound)?;

    if !is_drive_url(&input.drive_url) {
        return Err(AppError::InvalidDriveUrl);
    }
    let drive_url = normalize_url(&input.drive_url);
    let index_no = normalize_index_no(&input.index_no);

    let matches = find_registrations_by_index(pool, comp.id, &index_no).await?;

    let target = match matches.len() {
        0 => return Err(AppError::RegistrationNotFound),
        1 => matches
            .into_iter()
            .next()
            .ok_or(AppError::RegistrationNotFound)?,
        _ => {
            // A blank class letter counts as missing, so the caller is told
            // to supply the fields rather than that no registration exists
            let supplied_class = input
                .class_letter
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let (Some(grade), Some(class_letter)) = (input.grade, supplied_class) else {
                return Err(AppError::RegistrationAmbiguous);
            };
            let grade = clamp_grade(grade);
            let class_letter = normalize_class_letter(class_letter);

            find_registration_by_roll(pool, comp.id, grade, &class_letter, &index_no)
                .await?
                .ok_or(AppError::RegistrationNotFound)?
        }
    };

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, DbSubmission>(
        "SELECT * FROM submissions WHERE registration_id = ? AND is_current = 1",
    )
    .bind(target.id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(current) = current {
        sqlx::query("UPDATE submissions SET is_current = 0, status = ? WHERE id = ?")
            .bind(SubmissionStatus::Replaced.as_str())
            .bind(current.id)
            .execute(&mut *tx)
            .await?;
    }

    let res = sqlx::query(
        "INSERT INTO submissions (registration_id, text, drive_url, created_at, status, is_current)
         VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(target.id)
    .bind(input.text.trim())
    .bind(&drive_url)
    .bind(Utc::now().naive_utc())
    .bind(SubmissionStatus::Submitted.as_str())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(SubmissionReceipt {
        id: res.last_insert_rowid(),
        registration_id: target.id,
    })
}

#[instrument]
pub async fn get_current_submission(
    pool: &Pool<Sqlite>,
    registration_id: i64,
) -> Result<Option<Submission>, AppError> {
    let row = sqlx::query_as::<_, DbSubmission>(
        "SELECT * FROM submissions WHERE registration_id = ? AND is_current = 1",
    )
    .bind(registration_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Submission::from))
}

#[instrument]
pub async fn get_submissions(
    pool: &Pool<Sqlite>,
    registration_id: i64,
) -> Result<Vec<Submission>, AppError> {
    let rows = sqlx::query_as::<_, DbSubmission>(
        "SELECT * FROM submissions WHERE registration_id = ? ORDER BY created_at, id",
    )
    .bind(registration_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Submission::from).collect())
}

/// A unique-index violation on registration insert means a concurrent
/// request won the race after our checks passed; surface it as the same
/// conflict the fast-path check would have produced.
fn registration_conflict(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation {
            let msg = db_err.message();
            if msg.contains("email") {
                return AppError::DuplicateEmail;
            }
            if msg.contains("reference_code") {
                return AppError::Internal("Reference code collision".to_string());
            }
            return AppError::DuplicateRoll;
        }
    }
    AppError::Database(err)
}
