//! Input normalization and field rules.
//!
//! Each input type trims its own text fields and checks them with the
//! combinators below; named rules live in a closed enum so a typo in a rule
//! name is a compile error rather than a silently skipped check.

use std::collections::HashSet;

use crate::contract::model::{ConfirmSignupRequest, LoginRequest, NewAppointment, SignupRequest};
use crate::domain::clock::parse_timestamp;
use crate::domain::error::DomainError;

pub const TITLE_MAX: usize = 128;
pub const USERNAME_MIN: usize = 2;
pub const USERNAME_MAX: usize = 80;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 64;
pub const CODE_MIN: usize = 1;
pub const CODE_MAX: usize = 6;

/// Named predicate applied to a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    HasUpper,
    HasLower,
    HasDigit,
    HasSpecial,
    NoDupes,
    NoSpaces,
    Iso8601,
    Email,
}

impl Rule {
    pub const ALL: [Rule; 8] = [
        Rule::HasUpper,
        Rule::HasLower,
        Rule::HasDigit,
        Rule::HasSpecial,
        Rule::NoDupes,
        Rule::NoSpaces,
        Rule::Iso8601,
        Rule::Email,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Rule::HasUpper => "hasupper",
            Rule::HasLower => "haslower",
            Rule::HasDigit => "hasdigit",
            Rule::HasSpecial => "hasspecial",
            Rule::NoDupes => "nodupes",
            Rule::NoSpaces => "nospaces",
            Rule::Iso8601 => "iso8601",
            Rule::Email => "email",
        }
    }

    /// Registry lookup by rule name.
    pub fn from_name(name: &str) -> Option<Rule> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    pub fn check(self, value: &str) -> bool {
        match self {
            Rule::HasUpper => value.chars().any(char::is_uppercase),
            Rule::HasLower => value.chars().any(char::is_lowercase),
            Rule::HasDigit => value.chars().any(|c| c.is_ascii_digit()),
            Rule::HasSpecial => value
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
            Rule::NoDupes => {
                let mut seen = HashSet::new();
                value.chars().all(|c| seen.insert(c))
            }
            Rule::NoSpaces => !value.chars().any(char::is_whitespace),
            Rule::Iso8601 => parse_timestamp(value).is_ok(),
            Rule::Email => looks_like_email(value),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Rule::HasUpper => "must contain an uppercase letter",
            Rule::HasLower => "must contain a lowercase letter",
            Rule::HasDigit => "must contain a digit",
            Rule::HasSpecial => "must contain a special character",
            Rule::NoDupes => "must not repeat characters",
            Rule::NoSpaces => "must not contain whitespace",
            Rule::Iso8601 => "must be an RFC 3339 timestamp with offset",
            Rule::Email => "must be a valid email address",
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// A named text field under validation.
pub struct Field<'a> {
    name: &'static str,
    value: &'a str,
}

impl<'a> Field<'a> {
    pub fn new(name: &'static str, value: &'a str) -> Self {
        Self { name, value }
    }

    fn fail(&self, message: impl Into<String>) -> DomainError {
        DomainError::malformed(self.name, message)
    }

    pub fn required(self) -> Result<Self, DomainError> {
        if self.value.is_empty() {
            return Err(self.fail("is required"));
        }
        Ok(self)
    }

    pub fn len_between(self, min: usize, max: usize) -> Result<Self, DomainError> {
        let len = self.value.chars().count();
        if len < min || len > max {
            return Err(self.fail(format!(
                "length {len} is outside {min}..={max} characters"
            )));
        }
        Ok(self)
    }

    pub fn max_len(self, max: usize) -> Result<Self, DomainError> {
        self.len_between(0, max)
    }

    pub fn satisfies(self, rule: Rule) -> Result<Self, DomainError> {
        if !rule.check(self.value) {
            return Err(self.fail(rule.describe()));
        }
        Ok(self)
    }

    pub fn satisfies_all(self, rules: &[Rule]) -> Result<Self, DomainError> {
        rules.iter().try_fold(self, |field, rule| field.satisfies(*rule))
    }
}

/// Inbound request that normalizes its own text and validates itself.
pub trait Input: Sized {
    /// Trim surrounding whitespace on every text field.
    fn normalized(self) -> Self;

    fn validate(&self) -> Result<(), DomainError>;

    /// Normalize, then validate.
    fn prepare(self) -> Result<Self, DomainError> {
        let input = self.normalized();
        input.validate()?;
        Ok(input)
    }
}

fn trimmed(s: String) -> String {
    let t = s.trim();
    if t.len() == s.len() {
        s
    } else {
        t.to_string()
    }
}

impl Input for NewAppointment {
    fn normalized(self) -> Self {
        Self {
            begins_at: trimmed(self.begins_at),
            title: self.title.map(trimmed).filter(|t| !t.is_empty()),
        }
    }

    // Timestamp parsing happens in the lifecycle manager so its failure maps
    // to the same MalformedInput either way.
    fn validate(&self) -> Result<(), DomainError> {
        Field::new("begins_at", &self.begins_at).required()?;
        if let Some(title) = &self.title {
            Field::new("title", title).max_len(TITLE_MAX)?;
        }
        Ok(())
    }
}

impl Input for SignupRequest {
    fn normalized(self) -> Self {
        Self {
            username: trimmed(self.username),
            email: trimmed(self.email),
            password: trimmed(self.password),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        Field::new("username", &self.username)
            .required()?
            .len_between(USERNAME_MIN, USERNAME_MAX)?;
        Field::new("email", &self.email)
            .required()?
            .satisfies(Rule::Email)?;
        Field::new("password", &self.password)
            .required()?
            .len_between(PASSWORD_MIN, PASSWORD_MAX)?
            .satisfies_all(&[
                Rule::HasSpecial,
                Rule::HasDigit,
                Rule::HasUpper,
                Rule::HasLower,
            ])?;
        Ok(())
    }
}

impl Input for LoginRequest {
    fn normalized(self) -> Self {
        Self {
            email: trimmed(self.email),
            password: trimmed(self.password),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        Field::new("email", &self.email)
            .required()?
            .satisfies(Rule::Email)?;
        Field::new("password", &self.password)
            .required()?
            .len_between(PASSWORD_MIN, PASSWORD_MAX)?;
        Ok(())
    }
}

impl Input for ConfirmSignupRequest {
    fn normalized(self) -> Self {
        Self {
            email: trimmed(self.email),
            code: trimmed(self.code),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        Field::new("email", &self.email)
            .required()?
            .satisfies(Rule::Email)?;
        Field::new("code", &self.code)
            .required()?
            .len_between(CODE_MIN, CODE_MAX)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password: &str) -> SignupRequest {
        SignupRequest {
            username: "  alice ".into(),
            email: " alice@example.com ".into(),
            password: password.into(),
        }
    }

    fn malformed_field(err: DomainError) -> String {
        match err {
            DomainError::MalformedInput { field, .. } => field,
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn registry_resolves_every_rule_by_name() {
        for rule in Rule::ALL {
            assert_eq!(Rule::from_name(rule.name()), Some(rule));
        }
        assert_eq!(Rule::from_name("hasemoji"), None);
    }

    #[test]
    fn rule_predicates() {
        assert!(Rule::HasUpper.check("abC"));
        assert!(!Rule::HasUpper.check("abc"));
        assert!(Rule::HasLower.check("ABc"));
        assert!(Rule::HasDigit.check("a1"));
        assert!(Rule::HasSpecial.check("a!"));
        assert!(!Rule::HasSpecial.check("a b"));
        assert!(Rule::NoDupes.check("abc"));
        assert!(!Rule::NoDupes.check("abca"));
        assert!(Rule::NoSpaces.check("abc"));
        assert!(!Rule::NoSpaces.check("a c"));
        assert!(Rule::Iso8601.check("2025-08-15T14:00:00Z"));
        assert!(!Rule::Iso8601.check("2025-08-15 14:00"));
        assert!(Rule::Email.check("a@b.co"));
        assert!(!Rule::Email.check("a@b"));
        assert!(!Rule::Email.check("@b.co"));
        assert!(!Rule::Email.check("a@@b.co"));
    }

    #[test]
    fn signup_is_trimmed_before_validation() {
        let req = signup(" Secr3t!pass ").prepare().unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.email, "alice@example.com");
        assert_eq!(req.password, "Secr3t!pass");
    }

    #[test]
    fn signup_password_policy() {
        assert_eq!(malformed_field(signup("short1!").prepare().unwrap_err()), "password");
        assert_eq!(malformed_field(signup("nouppercase1!").prepare().unwrap_err()), "password");
        assert_eq!(malformed_field(signup("NoDigits!!").prepare().unwrap_err()), "password");
        assert_eq!(malformed_field(signup("NoSpecial123").prepare().unwrap_err()), "password");
    }

    #[test]
    fn blank_title_becomes_none_and_long_title_is_rejected() {
        let req = NewAppointment {
            begins_at: " 2025-08-15T14:00:00Z ".into(),
            title: Some("   ".into()),
        }
        .prepare()
        .unwrap();
        assert_eq!(req.begins_at, "2025-08-15T14:00:00Z");
        assert_eq!(req.title, None);

        let long = NewAppointment {
            begins_at: "2025-08-15T14:00:00Z".into(),
            title: Some("x".repeat(TITLE_MAX + 1)),
        };
        assert_eq!(malformed_field(long.prepare().unwrap_err()), "title");
    }

    #[test]
    fn confirmation_code_length() {
        let ok = ConfirmSignupRequest {
            email: "a@b.co".into(),
            code: "123456".into(),
        };
        assert!(ok.prepare().is_ok());

        let too_long = ConfirmSignupRequest {
            email: "a@b.co".into(),
            code: "1234567".into(),
        };
        assert_eq!(malformed_field(too_long.prepare().unwrap_err()), "code");
    }
}
