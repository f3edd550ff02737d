//! Request field checks shared by the directory operations.

use crate::error::DirectoryError;

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_CONTACT_NAME_LEN: usize = 50;
pub const MAX_PHONE_NUMBER_LEN: usize = 15;
pub const MAX_EMAIL_LEN: usize = 50;

/// Return the trimmed value of a required field, or a validation error naming it.
pub fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, DirectoryError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DirectoryError::validation(format!("{} is required", field))),
    }
}

/// Reject values longer than the column they are stored in.
pub fn max_len<'a>(field: &str, value: &'a str, limit: usize) -> Result<&'a str, DirectoryError> {
    if value.chars().count() > limit {
        return Err(DirectoryError::validation(format!(
            "{} must be at most {} characters",
            field, limit
        )));
    }
    Ok(value)
}

/// A phone number as stored: trimmed, non-empty, at most 15 characters.
pub fn phone_number(value: Option<&str>) -> Result<String, DirectoryError> {
    let phone = required("phone_number", value)?;
    Ok(max_len("phone_number", phone, MAX_PHONE_NUMBER_LEN)?.to_string())
}

/// Optional email. Blank counts as absent.
pub fn email(value: Option<&str>) -> Result<Option<String>, DirectoryError> {
    let Some(email) = value.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };

    max_len("email", email, MAX_EMAIL_LEN)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(Some(email.to_string()))
        }
        _ => Err(DirectoryError::validation("email is not a valid address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("name", Some("  Bob ")).unwrap(), "Bob");
        assert!(matches!(
            required("name", Some("   ")),
            Err(DirectoryError::Validation(msg)) if msg == "name is required"
        ));
        assert!(required("name", None).is_err());
    }

    #[test]
    fn test_phone_number_length() {
        assert_eq!(phone_number(Some("+1")).unwrap(), "+1");
        assert_eq!(phone_number(Some("+14155551234")).unwrap(), "+14155551234");
        assert!(phone_number(Some("+1415555123412345")).is_err());
    }

    #[test]
    fn test_email() {
        assert_eq!(email(None).unwrap(), None);
        assert_eq!(email(Some("")).unwrap(), None);
        assert_eq!(
            email(Some("bob@example.com")).unwrap(),
            Some("bob@example.com".into())
        );
        assert!(email(Some("bob")).is_err());
        assert!(email(Some("@example.com")).is_err());
    }
}
