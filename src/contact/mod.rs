//! Contact form validation and acknowledgement messages.
//!
//! Validation rules are a fixed table keyed by [`Field`]; the user-facing
//! messages for each rule and the per-reason acknowledgements live in
//! `config.toml`.

use std::{collections::BTreeMap, fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use strum_macros::{EnumString, VariantArray};
use thiserror::Error;
use tracing::{info, warn};

use crate::CONFIG;


#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Subject,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }

    pub fn rules(&self) -> FieldRules {
        match self {
            Field::Name => FieldRules {
                required: true,
                min_length: Some(2),
                max_length: Some(50),
                pattern: Some(&NAME_PATTERN),
            },
            Field::Email => FieldRules {
                required: true,
                min_length: None,
                max_length: None,
                pattern: Some(&EMAIL_PATTERN),
            },
            Field::Phone => FieldRules {
                required: false,
                min_length: None,
                max_length: None,
                pattern: Some(&PHONE_PATTERN),
            },
            Field::Subject => FieldRules {
                required: true,
                min_length: Some(5),
                max_length: Some(100),
                pattern: None,
            },
            Field::Message => FieldRules {
                required: true,
                min_length: Some(10),
                max_length: Some(1000),
                pattern: None,
            },
        }
    }

    pub fn message(&self, rule: Rule) -> &'static str {
        let messages = &CONFIG.messages;
        match (self, rule) {
            (Field::Name, Rule::Required) => messages.name.required,
            (Field::Name, Rule::MinLength) => messages.name.min_length,
            (Field::Name, Rule::MaxLength) => messages.name.max_length,
            (Field::Name, Rule::Pattern) => messages.name.pattern,
            (Field::Email, Rule::Required) => messages.email.required,
            (Field::Email, Rule::MinLength) => messages.email.min_length,
            (Field::Email, Rule::MaxLength) => messages.email.max_length,
            (Field::Email, Rule::Pattern) => messages.email.pattern,
            (Field::Phone, Rule::Required) => messages.phone.required,
            (Field::Phone, Rule::MinLength) => messages.phone.min_length,
            (Field::Phone, Rule::MaxLength) => messages.phone.max_length,
            (Field::Phone, Rule::Pattern) => messages.phone.pattern,
            (Field::Subject, Rule::Required) => messages.subject.required,
            (Field::Subject, Rule::MinLength) => messages.subject.min_length,
            (Field::Subject, Rule::MaxLength) => messages.subject.max_length,
            (Field::Subject, Rule::Pattern) => messages.subject.pattern,
            (Field::Message, Rule::Required) => messages.message.required,
            (Field::Message, Rule::MinLength) => messages.message.min_length,
            (Field::Message, Rule::MaxLength) => messages.message.max_length,
            (Field::Message, Rule::Pattern) => messages.message.pattern,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    MinLength,
    MaxLength,
    Pattern,
}

/// Whether a pattern must cover the whole value or just occur in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMatch {
    Full,
    Search,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    mode: PatternMatch,
}

impl Pattern {
    pub fn full(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{source})$"))?,
            mode: PatternMatch::Full,
        })
    }

    pub fn search(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
            mode: PatternMatch::Search,
        })
    }

    pub fn mode(&self) -> PatternMatch {
        self.mode
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

static NAME_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::search(r"^[a-zA-Z\s]+$").expect("name pattern compiles"));
static EMAIL_PATTERN: LazyLock<Pattern> = LazyLock::new(|| {
    Pattern::search(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static PHONE_PATTERN: LazyLock<Pattern> =
    LazyLock::new(|| Pattern::full(r"[+]?[1-9]\d{0,15}").expect("phone pattern compiles"));

#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static Pattern>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub message: &'static str,
}

/// Checks `value` against every rule and reports all violations, in the
/// order required, minimum length, maximum length, pattern.
///
/// Length and pattern rules only apply to non-empty values, so an empty
/// optional field is always valid. Lengths count characters.
pub fn validate_field(field: Field, value: &str, rules: &FieldRules) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut violate = |rule: Rule| {
        violations.push(Violation {
            rule,
            message: field.message(rule),
        })
    };

    if rules.required && value.trim().is_empty() {
        violate(Rule::Required);
    }

    if value.is_empty() {
        return violations;
    }

    let length = value.chars().count();
    if rules.min_length.is_some_and(|min| length < min) {
        violate(Rule::MinLength);
    }
    if rules.max_length.is_some_and(|max| length > max) {
        violate(Rule::MaxLength);
    }
    if rules.pattern.is_some_and(|pattern| !pattern.is_match(value)) {
        violate(Rule::Pattern);
    }

    violations
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContactReason {
    FamilyUpdate,
    TreeCorrection,
    MemorySharing,
    EventInvitation,
    Support,
    General,
}

impl ContactReason {
    pub fn response(&self) -> ResponseMessage {
        let responses = &CONFIG.responses;
        let (title, body) = match self {
            Self::FamilyUpdate => (responses.family_update.title, responses.family_update.body),
            Self::TreeCorrection => (
                responses.tree_correction.title,
                responses.tree_correction.body,
            ),
            Self::MemorySharing => (
                responses.memory_sharing.title,
                responses.memory_sharing.body,
            ),
            Self::EventInvitation => (
                responses.event_invitation.title,
                responses.event_invitation.body,
            ),
            Self::Support => (responses.support.title, responses.support.body),
            Self::General => (responses.general.title, responses.general.body),
        };
        ResponseMessage { title, body }
    }
}

#[derive(
    Serialize,
    Deserialize,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    VariantArray,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Relationship {
    Immediate,
    Extended,
    Married,
    Descendant,
    Friend,
    Other,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMessage {
    pub title: &'static str,
    pub body: &'static str,
}

/// Acknowledgement for a reason tag; unknown tags get the general message.
pub fn response_message_for(tag: &str) -> ResponseMessage {
    ContactReason::from_str(tag)
        .unwrap_or(ContactReason::General)
        .response()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactFormSubmission {
    pub reason: ContactReason,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub relationship: Relationship,
    pub subject: String,
    pub message: String,
}

impl ContactFormSubmission {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => self.phone.as_deref().unwrap_or_default(),
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FormValidation {
    pub is_valid: bool,
    /// First violated rule message per invalid field.
    pub field_errors: BTreeMap<Field, &'static str>,
}

pub fn validate_form(submission: &ContactFormSubmission) -> FormValidation {
    validate_form_with(submission, |field| field.rules())
}

pub fn validate_form_with<F>(submission: &ContactFormSubmission, rules: F) -> FormValidation
where
    F: Fn(Field) -> FieldRules,
{
    use strum::VariantArray;

    let field_errors: BTreeMap<Field, &'static str> = Field::VARIANTS
        .iter()
        .filter_map(|&field| {
            validate_field(field, submission.value(field), &rules(field))
                .first()
                .map(|violation| (field, violation.message))
        })
        .collect();

    FormValidation {
        is_valid: field_errors.is_empty(),
        field_errors,
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact form is invalid: {}", summarize(.0))]
    ValidationFailed(FormValidation),

    #[error("could not deliver contact form: {0}")]
    Delivery(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn summarize(validation: &FormValidation) -> String {
    validation
        .field_errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Delivers validated submissions (mail, queue, ...).
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn deliver(&self, submission: &ContactFormSubmission) -> Result<(), Self::Error>;
}

/// Validates `submission`, hands it to `transport`, and returns the
/// acknowledgement for its reason.
pub fn submit<T: Transport>(
    submission: &ContactFormSubmission,
    transport: &T,
) -> Result<ResponseMessage, ContactError> {
    let validation = validate_form(submission);
    if !validation.is_valid {
        warn!(
            fields = validation.field_errors.len(),
            "rejected contact form submission"
        );
        return Err(ContactError::ValidationFailed(validation));
    }

    transport
        .deliver(submission)
        .map_err(|e| ContactError::Delivery(Box::new(e)))?;

    info!(reason = ?submission.reason, "contact form delivered");
    Ok(submission.reason.response())
}

/// Transport that only records the submission in the log.
pub struct LogTransport;

impl Transport for LogTransport {
    type Error = std::convert::Infallible;

    fn deliver(&self, submission: &ContactFormSubmission) -> Result<(), Self::Error> {
        info!(
            reason = ?submission.reason,
            relationship = ?submission.relationship,
            from = %submission.email,
            subject = %submission.subject,
            "contact form received"
        );
        Ok(())
    }
}
