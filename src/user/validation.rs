//! Input validation for user records.

use thiserror::Error;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum first/last name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("id is required")]
    IdRequired,

    #[error("username is required")]
    UsernameRequired,

    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    #[error("username cannot contain whitespace or control characters")]
    UsernameInvalidChars,

    #[error("first name is required")]
    FirstNameRequired,

    #[error("last name is required")]
    LastNameRequired,

    #[error("name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,

    #[error("email is required")]
    EmailRequired,

    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    #[error("invalid email format")]
    EmailInvalidFormat,

    #[error("password is required")]
    PasswordRequired,

    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    #[error("user is not active")]
    UserNotActive,
}

/// Validate a record id.
pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::IdRequired);
    }
    Ok(())
}

/// Validate a username: non-blank, no whitespace, bounded length.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}

/// Validate a first name.
pub fn validate_first_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::FirstNameRequired);
    }
    validate_name_length(name)
}

/// Validate a last name.
pub fn validate_last_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::LastNameRequired);
    }
    validate_name_length(name)
}

fn validate_name_length(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validate a required email address.
///
/// Accepts `local@domain.tld` where no part contains `@` or whitespace.
///
/// # Examples
///
/// ```
/// use usermail::user::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("user@localhost").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if !is_well_formed_email(email) {
        return Err(ValidationError::EmailInvalidFormat);
    }
    Ok(())
}

fn is_well_formed_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Some dot in the domain must have text on both sides
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate a plain-text password.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1).is_ok());
        assert_eq!(validate_id(0), Err(ValidationError::IdRequired));
        assert_eq!(validate_id(-5), Err(ValidationError::IdRequired));
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ada_l").is_ok());
        assert_eq!(validate_username("   "), Err(ValidationError::UsernameRequired));
        assert_eq!(
            validate_username("ada lovelace"),
            Err(ValidationError::UsernameInvalidChars)
        );
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::UsernameTooLong)
        );
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_first_name("Ada").is_ok());
        assert_eq!(validate_first_name(""), Err(ValidationError::FirstNameRequired));
        assert_eq!(validate_last_name(" "), Err(ValidationError::LastNameRequired));
        assert_eq!(
            validate_last_name(&"x".repeat(101)),
            Err(ValidationError::NameTooLong)
        );
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.co.uk").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        assert_eq!(validate_email("invalid"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("user@example"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("user@.com"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("user@example."), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("a@b@c.com"), Err(ValidationError::EmailInvalidFormat));
        assert_eq!(validate_email("us er@example.com"), Err(ValidationError::EmailInvalidFormat));
    }

    #[test]
    fn test_validate_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&email), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"a".repeat(128)).is_ok());
        assert_eq!(validate_password(""), Err(ValidationError::PasswordRequired));
        assert_eq!(validate_password("short"), Err(ValidationError::PasswordTooShort));
        assert_eq!(
            validate_password(&"a".repeat(129)),
            Err(ValidationError::PasswordTooLong)
        );
    }
}
