use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

pub const REFERENCE_CODE_LENGTH: usize = 6;
pub const REFERENCE_CODE_RETRIES: usize = 5;

// No 0/O/1/I so codes survive being read out loud or copied by hand.
pub const REFERENCE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

static DRIVE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(drive\.google\.com|docs\.google\.com)/.+")
        .expect("invalid drive url pattern")
});

pub fn normalize_email(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Best-effort normalization to international +94 form. Numbers that match
/// none of the three patterns pass through stripped but otherwise unchanged;
/// this layer does not reject.
pub fn normalize_whatsapp(s: &str) -> String {
    let raw: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if raw.starts_with("+94") {
        raw
    } else if let Some(rest) = raw.strip_prefix('0') {
        format!("+94{}", rest)
    } else if raw.len() == 9 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("+94{}", raw)
    } else {
        raw
    }
}

/// Grades outside [6, 13] are silently corrected, matching the form's
/// behavior, rather than rejected.
pub fn clamp_grade(grade: i64) -> i64 {
    grade.clamp(6, 13)
}

pub fn normalize_class_letter(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn normalize_index_no(s: &str) -> String {
    s.trim().to_string()
}

pub fn normalize_name(s: &str) -> String {
    s.trim().to_string()
}

/// Allow-list gate for deliverable links, not a full URL validator.
pub fn is_drive_url(url: &str) -> bool {
    DRIVE_URL_RE.is_match(url.trim())
}

pub fn normalize_url(url: &str) -> String {
    url.trim().to_string()
}

/// One candidate reference code; uniqueness is the caller's concern
/// (bounded retry against existing registrations, DB unique index as
/// the backstop).
pub fn reference_code() -> String {
    let mut rng = rand::rng();
    (0..REFERENCE_CODE_LENGTH)
        .map(|_| {
            let i = rng.random_range(0..REFERENCE_CODE_ALPHABET.len());
            REFERENCE_CODE_ALPHABET[i] as char
        })
        .collect()
}
