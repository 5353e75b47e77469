//! Account and credential validation rules.
//!
//! These are the business rules themselves; how failures are presented is the
//! caller's concern.

use std::sync::OnceLock;

use regex::Regex;

/// Common weak passwords to check against
const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty",
    "abc123",
    "password1",
    "admin",
    "welcome",
];

#[must_use]
pub fn validate_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
        .is_match(email)
}

/// 3-15 characters, letters and digits only.
#[must_use]
pub fn validate_username(username: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{3,15}$").expect("Invalid regex"))
        .is_match(username)
}

/// Exactly 10 digits.
#[must_use]
pub fn validate_phone(phone: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{10}$").expect("Invalid regex"))
        .is_match(phone)
}

/// Adjacent identical characters, or adjacent ascending digits ("12") or
/// letters by character code ("ab"), anywhere in the password.
fn has_sequential_chars(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(2).any(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if a == b {
            return true;
        }
        if a.is_ascii_digit() && b.is_ascii_digit() && a as u32 + 1 == b as u32 {
            return true;
        }
        a.is_ascii_alphabetic() && b.is_ascii_alphabetic() && a as u32 + 1 == b as u32
    })
}

fn is_weak_password(password: &str) -> bool {
    let lower = password.to_lowercase();
    WEAK_PASSWORDS.iter().any(|weak| lower.contains(weak))
}

/// Full password policy. Returns the user-facing message for the first rule
/// the password breaks.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| "@#!&$*".contains(c));
    if !has_letter || !has_digit || !has_special {
        return Err(
            "Password must include at least one letter, one number, and one special character (@#!&$*)",
        );
    }

    if has_sequential_chars(password) {
        return Err("Password cannot contain consecutive characters or sequential patterns");
    }

    if is_weak_password(password) {
        return Err("Password is too common or weak. Please choose a stronger password");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(validate_email("mia@example.com"));
        assert!(validate_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!validate_email("plainaddress"));
        assert!(!validate_email("missing@tld"));
        assert!(!validate_email("two words@example.com"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn username_length_bounds() {
        assert!(!validate_username("ab"));
        assert!(validate_username("abc"));
        assert!(validate_username("validUser1"));
        assert!(validate_username("a23456789012345"));
        assert!(!validate_username("a234567890123456"));
    }

    #[test]
    fn username_rejects_special_characters() {
        assert!(!validate_username("valid_123"));
        assert!(!validate_username("has space"));
        assert!(!validate_username("dash-ed"));
    }

    #[test]
    fn phone_must_be_ten_digits() {
        assert!(validate_phone("5551234567"));
        assert!(!validate_phone("555123456"));
        assert!(!validate_phone("55512345678"));
        assert!(!validate_phone("555-123-4567"));
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("x9#b7").is_err());
        assert!(validate_password("x9#b7m").is_ok());
    }

    #[test]
    fn password_requires_all_character_classes() {
        // no digit
        assert!(validate_password("xw#qty").is_err());
        // no letter
        assert!(validate_password("195#73").is_err());
        // no special
        assert!(validate_password("xw9qt7").is_err());
    }

    #[test]
    fn password_rejects_adjacent_identical() {
        assert!(validate_password("xx9#t7m").is_err());
        assert!(validate_password("x9#t77m").is_err());
    }

    #[test]
    fn password_rejects_ascending_runs() {
        // "ab" ascending letters
        assert!(validate_password("ab9#t7m").is_err());
        // "12" ascending digits
        assert!(validate_password("x12#t7m").is_err());
        // descending is fine
        assert!(validate_password("x21#t7m").is_ok());
        // case break is not an ascending pair ('a' + 1 != 'B')
        assert!(validate_password("aB9#t7m").is_ok());
    }

    #[test]
    fn password_rejects_weak_substrings() {
        assert!(validate_password("x9#Qwerty").is_err());
        assert!(validate_password("x9#admin").is_err());
        assert!(validate_password("PASSWORD9#x").is_err());
    }

    #[test]
    fn password_accepts_strong_values() {
        assert!(validate_password("x9t#m4q").is_ok());
        assert!(validate_password("n5w@f8z").is_ok());
    }
}
