//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HTTP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9.\-]+(:[0-9]{1,5})?(/[^\s?#]*)?$").unwrap()
});
static RE_CLOUD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]{1,64}$").unwrap());
static RE_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-]+)*$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "PUBLIC_BASE_URL" => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL without query or fragment".into());
            }
        }
        "CLOUDINARY_CLOUD_NAME" => {
            if !RE_CLOUD_NAME.is_match(value) {
                return Err("must be 1-64 letters, digits, '-' or '_'".into());
            }
        }
        "CLOUDINARY_FOLDER" => {
            if !value.is_empty() && !RE_FOLDER.is_match(value) {
                return Err("must be slash-separated names of letters, digits, '-' or '_'".into());
            }
        }
        "BRAND_HEADING" | "BRAND_SUB" => {
            if value.chars().count() > 64 {
                return Err("must be at most 64 characters".into());
            }
        }
        "PREVIEW_WIDTH" => validate_int_range(value, 64, 2048)?,
        // Up to one year.
        "SESSION_RETENTION_HOURS" => validate_int_range(value, 0, 8760)?,
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
