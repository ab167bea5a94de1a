use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;
use validator::{Validate, ValidationError};

/// Request body for user registration.
///
/// `confirm_password` and the recovery fields are accepted but carry no
/// rules of their own.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    #[validate(custom(function = "validate_email_address"))]
    pub email: String,

    #[validate(custom(function = "validate_password_length"))]
    pub password: String,

    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub recovery_question1: String,
    pub recovery_answer1: String,
    pub recovery_question2: String,
    pub recovery_answer2: String,
    pub birthday: String,
    #[serde(default)]
    pub gender: Option<String>,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Invalid email address".into());
    Err(error)
}

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 16;

/// Length in user-perceived characters (extended grapheme clusters).
fn validate_password_length(password: &str) -> Result<(), ValidationError> {
    let len = password.graphemes(true).count();
    if (PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Ok(());
    }
    let mut error = ValidationError::new("length");
    error.message = Some("Password must be 8-16 characters".into());
    error.add_param("min".into(), &PASSWORD_MIN);
    error.add_param("max".into(), &PASSWORD_MAX);
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::fixtures::register_request;

    #[test]
    fn accepts_valid_registration() {
        let req = register_request("ada", "ada@example.com", "password1");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_empty_username() {
        let err = register_request("", "ada@example.com", "password1")
            .validate()
            .unwrap_err();
        assert!(err.field_errors().contains_key("username"));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["", "ada", "ada@", "ada@example", "a da@example.com"] {
            let err = register_request("ada", email, "password1")
                .validate()
                .unwrap_err();
            let fields = err.field_errors();
            assert_eq!(fields["email"][0].code, "email", "email {email:?}");
        }
    }

    #[test]
    fn rejects_malformed_domain_dots() {
        for email in ["a@..c", "a@b..c", "a@.b.c", "a@b.c.", "a@b."] {
            let err = register_request("ada", email, "password1")
                .validate()
                .unwrap_err();
            assert_eq!(err.field_errors()["email"][0].code, "email", "email {email:?}");
        }
        for email in ["ada@example.com", "a@b.co.uk", "first.last@mail.example.org"] {
            assert!(
                register_request("ada", email, "password1").validate().is_ok(),
                "email {email:?}"
            );
        }
    }

    #[test]
    fn password_length_bounds_are_inclusive() {
        assert!(register_request("ada", "ada@example.com", "12345678")
            .validate()
            .is_ok());
        assert!(register_request("ada", "ada@example.com", "1234567890123456")
            .validate()
            .is_ok());

        for password in ["", "1234567", "12345678901234567"] {
            let err = register_request("ada", "ada@example.com", password)
                .validate()
                .unwrap_err();
            assert_eq!(err.field_errors()["password"][0].code, "length");
        }
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // 16 characters, 32 bytes
        let req = register_request("ada", "ada@example.com", &"é".repeat(16));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn password_length_counts_graphemes_not_code_points() {
        // "e" + combining acute: one character, two code points
        let decomposed = "e\u{301}";
        let nine = decomposed.repeat(9);
        assert!(register_request("ada", "ada@example.com", &nine)
            .validate()
            .is_ok());

        let seven = decomposed.repeat(7);
        let err = register_request("ada", "ada@example.com", &seven)
            .validate()
            .unwrap_err();
        assert_eq!(err.field_errors()["password"][0].code, "length");
    }

    #[test]
    fn mismatched_confirmation_is_not_checked() {
        let mut req = register_request("ada", "ada@example.com", "password1");
        req.confirm_password = "something-else".into();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn reports_every_failing_field() {
        let err = register_request("", "nope", "short").validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn deserializes_camel_case_body() {
        let body = serde_json::json!({
            "username": "Ada",
            "email": "ada@example.com",
            "password": "password1",
            "confirmPassword": "password1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "recoveryQuestion1": "q1",
            "recoveryAnswer1": "a1",
            "recoveryQuestion2": "q2",
            "recoveryAnswer2": "a2",
            "birthday": "1815-12-10"
        });
        let req: RegisterRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.recovery_answer2, "a2");
        assert_eq!(req.gender, None);
    }
}
