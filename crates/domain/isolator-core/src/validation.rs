#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Profile name is required")]
    EmptyName,
    #[error("No file selected")]
    EmptyFileName,
    #[error("Profile name cannot be \".\" or \"..\"")]
    DotSegment,
}

/// Check a name that addresses an existing profile.
///
/// `.` and `..` are refused: URL parsers resolve them as path segments even
/// when percent-encoded, so they can never address a profile.
pub fn check_profile_name(name: &str) -> Result<&str, ValidationError> {
    match name {
        "" => Err(ValidationError::EmptyName),
        "." | ".." => Err(ValidationError::DotSegment),
        _ => Ok(name),
    }
}

/// Trims the raw input. Charset and uniqueness rules belong to the backend.
pub fn validate_profile_name(raw: &str) -> Result<String, ValidationError> {
    check_profile_name(raw.trim()).map(str::to_string)
}

/// File name without directories or archive extensions (`work.tar.gz` -> `work`).
pub fn archive_stem(file_name: &str) -> Result<String, ValidationError> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() {
        return Err(ValidationError::EmptyFileName);
    }

    let lower = base.to_ascii_lowercase();
    let stem_len = [".tar.gz", ".tgz", ".zip", ".tar"]
        .iter()
        .find(|ext| lower.ends_with(*ext) && lower.len() > ext.len())
        .map(|ext| base.len() - ext.len())
        .unwrap_or(base.len());

    Ok(base[..stem_len].to_string())
}
