//! Property validation rules for command input
//!
//! Every rule fails with `PropertyValidation` naming the property so hosts
//! can attach the message to the right form field.

use crate::errors::{FolioError, Result};

pub const MAX_TITLE_LENGTH: usize = 300;
pub const MAX_URL_SLUG_LENGTH: usize = 200;
pub const DEFINITION_CODE_LENGTH: usize = 6;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

fn invalid(property: &str, value: &str, message: impl Into<String>) -> FolioError {
    FolioError::PropertyValidation {
        property: property.to_string(),
        message: message.into(),
        value: Some(value.to_string()),
    }
}

/// Titles are required and bounded
pub fn validate_title(property: &str, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(invalid(property, title, "A title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(invalid(
            property,
            title,
            format!("Title must be {} characters or fewer", MAX_TITLE_LENGTH),
        ));
    }
    Ok(())
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

/// Url slugs are lower-case letters, digits and hyphens
pub fn validate_url_slug(property: &str, slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(invalid(property, slug, "A url slug is required"));
    }
    if slug.len() > MAX_URL_SLUG_LENGTH {
        return Err(invalid(
            property,
            slug,
            format!("Url slug must be {} characters or fewer", MAX_URL_SLUG_LENGTH),
        ));
    }
    if !slug.chars().all(is_slug_char) || slug.starts_with('-') || slug.ends_with('-') {
        return Err(invalid(
            property,
            slug,
            "Url slug may only contain lower-case letters, numbers and hyphens",
        ));
    }
    Ok(())
}

/// Page url paths follow the slug rules, except that the empty path is the
/// directory's index page
pub fn validate_url_path(property: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    validate_url_slug(property, path)
}

/// Definition codes are exactly six upper-case letters or digits
pub fn validate_definition_code(code: &str) -> Result<()> {
    let valid = code.len() == DEFINITION_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !valid {
        return Err(invalid(
            "definition_code",
            code,
            "Definition code must be six upper-case letters or digits",
        ));
    }
    Ok(())
}

/// Locale codes such as `en` or `en-GB`
pub fn validate_iso_code(code: &str) -> Result<()> {
    let mut parts = code.split('-');
    let language_ok = parts
        .next()
        .map(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    let rest_ok = parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()));
    if !(language_ok && rest_ok) {
        return Err(invalid("iso_code", code, "Not a valid locale code"));
    }
    Ok(())
}

/// Returns the lower-cased extension when it is a supported image type
pub fn validate_image_extension(extension: &str) -> Result<String> {
    let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.contains(&normalized.as_str()) {
        return Err(invalid(
            "extension",
            extension,
            format!("Unsupported image type; expected one of {}", IMAGE_EXTENSIONS.join(", ")),
        ));
    }
    Ok(normalized)
}

/// Trim, drop empties, de-duplicate case-insensitively and sort
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            continue;
        }
        out.push(tag.to_string());
    }
    out.sort_by_key(|t| t.to_lowercase());
    out
}

/// Turn free text into a url slug
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(MAX_URL_SLUG_LENGTH);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
