//! Input validation utilities

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;

/// Outcome of a single field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Password strength meter reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0 (empty) to 5
    pub score: u8,
    pub label: &'static str,
    pub color: &'static str,
}

/// Whether `email` looks like `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email.trim())
}

/// Validate email
pub fn validate_email(email: &str) -> Validation {
    if email.trim().is_empty() {
        return Validation::fail("Email is required");
    }

    if email.len() > 254 {
        return Validation::fail("Email must be at most 254 characters long");
    }

    if !is_valid_email(email) {
        return Validation::fail("Please enter a valid email address");
    }

    Validation::ok()
}

/// Validate password
pub fn validate_password(password: &str) -> Validation {
    if password.is_empty() {
        return Validation::fail("Password is required");
    }

    if password.chars().count() < 8 {
        return Validation::fail("Password must be at least 8 characters long");
    }

    let classes = CharClasses::of(password);

    if !classes.upper {
        return Validation::fail("Password must contain at least one uppercase letter");
    }

    if !classes.lower {
        return Validation::fail("Password must contain at least one lowercase letter");
    }

    if !classes.digit {
        return Validation::fail("Password must contain at least one number");
    }

    if !classes.special {
        return Validation::fail("Password must contain at least one special character");
    }

    Validation::ok()
}

/// Validate that the confirmation matches the password
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Validation {
    if confirmation.is_empty() {
        return Validation::fail("Please confirm your password");
    }

    if password != confirmation {
        return Validation::fail("Passwords do not match");
    }

    Validation::ok()
}

/// Score a password for the strength meter
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            label: "",
            color: "gray",
        };
    }

    let length = password.chars().count();
    let classes = CharClasses::of(password);
    let score = [
        length >= 8,
        length >= 12,
        classes.upper && classes.lower,
        classes.digit,
        classes.special,
    ]
    .iter()
    .filter(|passed| **passed)
    .count() as u8;

    let (label, color) = match score {
        0 | 1 => ("Very weak", "red"),
        2 => ("Weak", "orange"),
        3 => ("Fair", "yellow"),
        4 => ("Good", "lightgreen"),
        _ => ("Strong", "green"),
    };

    PasswordStrength {
        score,
        label,
        color,
    }
}

/// Validate a first or last name
pub fn validate_name(name: &str, field: &str) -> Validation {
    let name = name.trim();
    if name.is_empty() {
        return Validation::fail(format!("{} is required", field));
    }

    if name.chars().count() < 2 {
        return Validation::fail(format!("{} must be at least 2 characters long", field));
    }

    static NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NAME_REGEX
        .get_or_init(|| Regex::new(r"^[\p{L} '\-]+$").expect("Failed to compile name regex"));

    if !regex.is_match(name) {
        return Validation::fail(format!(
            "{} can only contain letters, spaces, hyphens and apostrophes",
            field
        ));
    }

    Validation::ok()
}

/// Validate an image selected for upload
///
/// The type is taken from `content_type` when known, otherwise from the file
/// extension. Only JPEG and PNG are accepted.
pub fn validate_image_file(
    file_name: &str,
    content_type: Option<&str>,
    size: u64,
    max_bytes: Option<u64>,
) -> Validation {
    let max_bytes = max_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

    let is_image = match content_type {
        Some(mime) => matches!(
            mime.to_ascii_lowercase().as_str(),
            "image/jpeg" | "image/jpg" | "image/png"
        ),
        None => image_mime_type(file_name).is_some(),
    };

    if !is_image {
        return Validation::fail("Please upload a JPEG or PNG image");
    }

    if size == 0 {
        return Validation::fail("The selected file is empty");
    }

    if size > max_bytes {
        return Validation::fail(format!(
            "File size must be less than {}",
            format_size(max_bytes)
        ));
    }

    Validation::ok()
}

/// MIME type of a JPEG or PNG file, judged by extension
pub fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Fields of the registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Validate the whole registration form
///
/// Returns `(field, message)` for each invalid field, in form order.
pub fn validate_registration(form: &RegistrationForm<'_>) -> Vec<(&'static str, String)> {
    [
        ("firstName", validate_name(form.first_name, "First name")),
        ("lastName", validate_name(form.last_name, "Last name")),
        ("email", validate_email(form.email)),
        ("password", validate_password(form.password)),
        (
            "confirmPassword",
            validate_password_confirmation(form.password, form.confirm_password),
        ),
    ]
    .into_iter()
    .filter(|(_, result)| !result.is_valid)
    .map(|(field, result)| (field, result.message))
    .collect()
}

struct CharClasses {
    upper: bool,
    lower: bool,
    digit: bool,
    special: bool,
}

impl CharClasses {
    fn of(password: &str) -> Self {
        let mut classes = CharClasses {
            upper: false,
            lower: false,
            digit: false,
            special: false,
        };

        for c in password.chars() {
            if c.is_uppercase() {
                classes.upper = true;
            } else if c.is_lowercase() {
                classes.lower = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else if !c.is_alphanumeric() && !c.is_whitespace() {
                classes.special = true;
            }
        }

        classes
    }
}

fn format_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_passwords_are_invalid() {
        for password in ["", "a", "Ab1!", "Abcd12!"] {
            assert!(!validate_password(password).is_valid, "{}", password);
        }
    }

    #[test]
    fn test_password_requires_every_class() {
        assert_eq!(
            validate_password("abcdefg1!").message,
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_password("ABCDEFG1!").message,
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            validate_password("Abcdefgh!").message,
            "Password must contain at least one number"
        );
        assert_eq!(
            validate_password("Abcdefgh1").message,
            "Password must contain at least one special character"
        );
        assert!(validate_password("Abcdefg1!").is_valid);
    }

    #[test]
    fn test_emails_without_domain_are_invalid() {
        for email in ["plainaddress", "user@", "user@domain", "@domain.com", "a b@c.de"] {
            assert!(!is_valid_email(email), "{}", email);
        }
        assert!(is_valid_email("jane.doe+eyes@clinic.example.org"));
        assert_eq!(validate_email("").message, "Email is required");
    }

    #[test]
    fn test_password_strength_meter() {
        assert_eq!(password_strength("").score, 0);
        assert_eq!(password_strength("abc").label, "Very weak");
        assert_eq!(password_strength("abcdefgh").label, "Very weak");
        assert_eq!(password_strength("Abcdefgh").label, "Weak");
        assert_eq!(password_strength("Abcdefg1").label, "Fair");
        assert_eq!(password_strength("Abcdefg1!").label, "Good");

        let strong = password_strength("Abcdefghij1!");
        assert_eq!(strong.score, 5);
        assert_eq!(strong.color, "green");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Anne-Marie", "First name").is_valid);
        assert!(validate_name("O'Brien", "Last name").is_valid);
        assert!(validate_name("Zoë", "First name").is_valid);
        assert_eq!(
            validate_name("J", "First name").message,
            "First name must be at least 2 characters long"
        );
        assert!(!validate_name("R2D2", "First name").is_valid);
    }

    #[test]
    fn test_oversized_jpeg_cites_limit() {
        let result = validate_image_file("eye.jpg", Some("image/jpeg"), 6 * 1024 * 1024, None);
        assert!(!result.is_valid);
        assert_eq!(result.message, "File size must be less than 5MB");
    }

    #[test]
    fn test_image_type_checks() {
        assert!(validate_image_file("eye.PNG", None, 10, None).is_valid);
        assert!(!validate_image_file("eye.gif", None, 10, None).is_valid);
        assert!(!validate_image_file("eye.jpg", Some("application/pdf"), 10, None).is_valid);
        assert!(!validate_image_file("eye.jpg", Some("image/jpeg"), 0, None).is_valid);
    }

    #[test]
    fn test_validate_registration_collects_fields() {
        let errors = validate_registration(&RegistrationForm {
            first_name: "Jane",
            last_name: "D",
            email: "jane@",
            password: "Secret1!",
            confirm_password: "Secret1?",
        });

        assert_eq!(
            errors.iter().map(|(field, _)| *field).collect::<Vec<_>>(),
            vec!["lastName", "email", "confirmPassword"]
        );
        assert_eq!(errors[2].1, "Passwords do not match");
    }
}
