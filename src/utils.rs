//! Input validation helpers shared by the API handlers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Permissive email shape check: local@domain.tld
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Check email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Check that a trimmed string's character count falls in [min, max]
pub fn check_length(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    len >= min && len <= max
}

/// Validate a contact form submission.
/// Returns field-level error messages; empty means the input is valid.
pub fn validate_contact(name: &str, email: &str, subject: &str, message: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if !check_length(name, 2, 100) {
        errors.push("name must be between 2 and 100 characters".to_string());
    }
    if !is_valid_email(email) {
        errors.push("email is not a valid email address".to_string());
    }
    if !check_length(subject, 3, 200) {
        errors.push("subject must be between 3 and 200 characters".to_string());
    }
    if !check_length(message, 10, 2000) {
        errors.push("message must be between 10 and 2000 characters".to_string());
    }

    errors
}

/// Validate a registration request.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if !check_length(username, 3, 50) {
        errors.push("username must be between 3 and 50 characters".to_string());
    }
    if !is_valid_email(email) {
        errors.push("email is not a valid email address".to_string());
    }
    if password.chars().count() < 8 {
        errors.push("password must be at least 8 characters".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user @example.com"));
    }

    #[test]
    fn test_contact_message_length_boundary() {
        // 9 characters rejected, 10 accepted
        let errors = validate_contact("Alice", "alice@example.com", "Hello", "123456789");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("message"));

        let errors = validate_contact("Alice", "alice@example.com", "Hello", "1234567890");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_contact_collects_all_errors() {
        let errors = validate_contact("A", "bad", "ab", "short");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_contact_trims_whitespace() {
        // Padding spaces do not count towards the minimum
        let errors = validate_contact("  A  ", "a@b.co", "Hi there", "long enough message");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("name"));
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration("alice", "alice@example.com", "password1").is_empty());
        assert_eq!(
            validate_registration("al", "alice@example.com", "password1").len(),
            1
        );
        assert_eq!(
            validate_registration("alice", "alice@example.com", "short").len(),
            1
        );
    }
}
