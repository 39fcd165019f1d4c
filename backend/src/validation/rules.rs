//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates a person's display name.
///
/// Requirements:
/// - Not blank after trimming
/// - At most 100 characters
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("display_name_blank"));
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::new("display_name_too_long"));
    }

    Ok(())
}

/// Validates password strength for new and updated accounts.
///
/// Requirements:
/// - 8-128 characters in length
/// - At least one letter and one digit
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(8..=128).contains(&length) {
        return Err(ValidationError::new("password_invalid_length"));
    }

    if !password.chars().any(|c| c.is_alphabetic()) || !password.chars().any(|c| c.is_numeric()) {
        return Err(ValidationError::new("password_too_weak"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_rejects_blank() {
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
    }

    #[test]
    fn display_name_rejects_too_long() {
        let name = "x".repeat(101);
        assert!(validate_display_name(&name).is_err());
    }

    #[test]
    fn display_name_accepts_valid() {
        assert!(validate_display_name("Dana Whitfield").is_ok());
    }

    #[test]
    fn password_rejects_too_short() {
        assert!(validate_password_strength("ab1").is_err());
    }

    #[test]
    fn password_rejects_letters_only() {
        assert!(validate_password_strength("abcdefgh").is_err());
    }

    #[test]
    fn password_rejects_digits_only() {
        assert!(validate_password_strength("12345678").is_err());
    }

    #[test]
    fn password_accepts_valid() {
        assert!(validate_password_strength("s3cret-passphrase").is_ok());
    }
}
