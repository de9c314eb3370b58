//! Input validators run when the user submits.
//!
//! Every built-in validator treats blank input specially: when empty input
//! is allowed it is valid, otherwise it fails with a "required" message
//! specific to the validator.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{Error, Result};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static email regex")
});

// ── Result ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

impl From<bool> for ValidationResult {
    fn from(is_valid: bool) -> Self {
        if is_valid {
            Self::valid()
        } else {
            Self::invalid("Invalid input")
        }
    }
}

impl From<(bool, &str)> for ValidationResult {
    fn from((is_valid, message): (bool, &str)) -> Self {
        Self {
            is_valid,
            message: message.to_string(),
        }
    }
}

impl From<(bool, String)> for ValidationResult {
    fn from((is_valid, message): (bool, String)) -> Self {
        Self { is_valid, message }
    }
}

// ── Validator trait ──────────────────────────────────────────────────

pub trait Validator {
    fn validate(&self, text: &str) -> ValidationResult;

    /// Whether blank input counts as valid.
    fn allow_empty(&self) -> bool {
        true
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn validate(&self, text: &str) -> ValidationResult {
        (**self).validate(text)
    }

    fn allow_empty(&self) -> bool {
        (**self).allow_empty()
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Shared blank-input rule. `None` means the caller should keep validating.
fn check_blank(text: &str, allow_empty: bool, required: &str) -> Option<ValidationResult> {
    if !is_blank(text) {
        None
    } else if allow_empty {
        Some(ValidationResult::valid())
    } else {
        Some(ValidationResult::invalid(required))
    }
}

// ── Email ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EmailValidator {
    allow_empty: bool,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self { allow_empty: true }
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Default for EmailValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for EmailValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if let Some(result) = check_blank(text, self.allow_empty, "Email address is required") {
            return result;
        }
        if EMAIL_PATTERN.is_match(text.trim()) {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid("Invalid email format")
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Date ─────────────────────────────────────────────────────────────

/// Accepts text matching a chrono `strftime` format, e.g. `%Y-%m-%d`.
pub struct DateValidator {
    format: String,
    allow_empty: bool,
}

impl DateValidator {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
            allow_empty: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }

    fn parses(&self, text: &str) -> bool {
        NaiveDate::parse_from_str(text, &self.format).is_ok()
            || NaiveDateTime::parse_from_str(text, &self.format).is_ok()
            || NaiveTime::parse_from_str(text, &self.format).is_ok()
    }
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl Validator for DateValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if let Some(result) = check_blank(text, self.allow_empty, "Date is required") {
            return result;
        }
        if self.parses(text.trim()) {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(format!("Invalid date format. Expected: {}", self.format))
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Numbers ──────────────────────────────────────────────────────────

fn check_bounds<T: PartialOrd + fmt::Display>(
    value: T,
    min: Option<T>,
    max: Option<T>,
) -> ValidationResult {
    match (min, max) {
        (Some(min), _) if value < min => {
            ValidationResult::invalid(format!("Value must be at least {min}"))
        }
        (_, Some(max)) if value > max => {
            ValidationResult::invalid(format!("Value must be at most {max}"))
        }
        _ => ValidationResult::valid(),
    }
}

#[derive(Debug, Clone)]
pub struct IntegerValidator {
    min: Option<i64>,
    max: Option<i64>,
    allow_empty: bool,
}

impl IntegerValidator {
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            allow_empty: true,
        }
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Default for IntegerValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for IntegerValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if let Some(result) = check_blank(text, self.allow_empty, "Integer value is required") {
            return result;
        }
        match text.trim().parse::<i64>() {
            Ok(value) => check_bounds(value, self.min, self.max),
            Err(_) => ValidationResult::invalid("Invalid integer format"),
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

#[derive(Debug, Clone)]
pub struct FloatValidator {
    min: Option<f64>,
    max: Option<f64>,
    allow_empty: bool,
}

impl FloatValidator {
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            allow_empty: true,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Default for FloatValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for FloatValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if let Some(result) = check_blank(text, self.allow_empty, "Number is required") {
            return result;
        }
        match text.trim().parse::<f64>() {
            Ok(value) => check_bounds(value, self.min, self.max),
            Err(_) => ValidationResult::invalid("Invalid number format"),
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Regex ────────────────────────────────────────────────────────────

/// Requires the whole input to match `pattern`.
pub struct RegexValidator {
    pattern: Regex,
    message: String,
    allow_empty: bool,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        let compiled = Regex::new(&anchored).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            message: "Invalid format".to_string(),
            allow_empty: true,
        })
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Validator for RegexValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if let Some(result) = check_blank(text, self.allow_empty, "Input is required") {
            return result;
        }
        if self.pattern.is_match(text) {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(self.message.clone())
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Length ───────────────────────────────────────────────────────────

/// Bounds on the number of characters (not bytes).
#[derive(Debug, Clone)]
pub struct LengthValidator {
    min: Option<usize>,
    max: Option<usize>,
    allow_empty: bool,
}

impl LengthValidator {
    pub fn new() -> Self {
        Self {
            min: None,
            max: None,
            allow_empty: true,
        }
    }

    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Default for LengthValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for LengthValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        // Only truly empty input is exempt; whitespace still counts.
        if text.is_empty() && self.allow_empty {
            return ValidationResult::valid();
        }
        let len = text.chars().count();
        match (self.min, self.max) {
            (Some(1), _) if len < 1 => ValidationResult::invalid("Input is required"),
            (Some(min), _) if len < min => {
                ValidationResult::invalid(format!("Must be at least {min} characters"))
            }
            (_, Some(max)) if len > max => {
                ValidationResult::invalid(format!("Must be at most {max} characters"))
            }
            _ => ValidationResult::valid(),
        }
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Function ─────────────────────────────────────────────────────────

type CheckFn = Box<dyn Fn(&str) -> ValidationResult>;

/// Wraps a closure returning anything convertible into a
/// [`ValidationResult`]: `bool`, `(bool, &str)`, `(bool, String)`, or the
/// result itself.
pub struct FunctionValidator {
    check: CheckFn,
    allow_empty: bool,
}

impl FunctionValidator {
    pub fn new<F, R>(check: F) -> Self
    where
        F: Fn(&str) -> R + 'static,
        R: Into<ValidationResult>,
    {
        Self {
            check: Box::new(move |text| check(text).into()),
            allow_empty: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Validator for FunctionValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if is_blank(text) && self.allow_empty {
            return ValidationResult::valid();
        }
        (self.check)(text)
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Composite ────────────────────────────────────────────────────────

/// All inner validators must pass; the first failure is reported.
pub struct CompositeValidator {
    validators: Vec<Box<dyn Validator>>,
    allow_empty: bool,
}

impl CompositeValidator {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self {
            validators,
            allow_empty: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.allow_empty = false;
        self
    }
}

impl Validator for CompositeValidator {
    fn validate(&self, text: &str) -> ValidationResult {
        if is_blank(text) && self.allow_empty && self.validators.iter().all(|v| v.allow_empty()) {
            return ValidationResult::valid();
        }
        self.validators
            .iter()
            .map(|v| v.validate(text))
            .find(|result| !result.is_valid)
            .unwrap_or_else(ValidationResult::valid)
    }

    fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

// ── Convenience constructors ─────────────────────────────────────────

pub fn email() -> EmailValidator {
    EmailValidator::new()
}

pub fn date(format: &str) -> DateValidator {
    DateValidator::new(format)
}

pub fn integer() -> IntegerValidator {
    IntegerValidator::new()
}

pub fn float_num() -> FloatValidator {
    FloatValidator::new()
}

pub fn regex(pattern: &str) -> Result<RegexValidator> {
    RegexValidator::new(pattern)
}

pub fn length() -> LengthValidator {
    LengthValidator::new()
}

pub fn custom<F, R>(check: F) -> FunctionValidator
where
    F: Fn(&str) -> R + 'static,
    R: Into<ValidationResult>,
{
    FunctionValidator::new(check)
}

pub fn combine(validators: Vec<Box<dyn Validator>>) -> CompositeValidator {
    CompositeValidator::new(validators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        let v = email();
        assert!(v.validate("user@example.com").is_valid);
        assert!(v.validate("  user@example.com  ").is_valid);
        assert_eq!(v.validate("not-an-email").message, "Invalid email format");
        assert!(v.validate("").is_valid);
        assert_eq!(
            email().required().validate("   "),
            ValidationResult::invalid("Email address is required")
        );
    }

    #[test]
    fn test_date() {
        let v = date("%Y-%m-%d");
        assert!(v.validate("2024-02-29").is_valid);
        assert!(!v.validate("2023-02-29").is_valid);
        assert_eq!(
            v.validate("29/02/2024").message,
            "Invalid date format. Expected: %Y-%m-%d"
        );
        assert!(date("%d/%m/%Y %H:%M").validate("01/03/2024 12:30").is_valid);
        assert!(date("%H:%M").validate("23:59").is_valid);
    }

    #[test]
    fn test_integer_bounds() {
        let v = integer().min(1).max(10);
        assert!(v.validate("5").is_valid);
        assert!(v.validate(" 10 ").is_valid);
        assert_eq!(v.validate("0").message, "Value must be at least 1");
        assert_eq!(v.validate("11").message, "Value must be at most 10");
        assert_eq!(v.validate("1.5").message, "Invalid integer format");
        assert_eq!(
            integer().required().validate("").message,
            "Integer value is required"
        );
    }

    #[test]
    fn test_float_bounds() {
        let v = float_num().min(0.0).max(1.0);
        assert!(v.validate("0.5").is_valid);
        assert_eq!(v.validate("1.5").message, "Value must be at most 1");
        assert_eq!(v.validate("abc").message, "Invalid number format");
    }

    #[test]
    fn test_regex_matches_whole_input() {
        let v = regex(r"\d{3}").unwrap().message("Three digits");
        assert!(v.validate("123").is_valid);
        assert_eq!(v.validate("1234").message, "Three digits");
        assert_eq!(
            regex("a").unwrap().required().validate("").message,
            "Input is required"
        );
    }

    #[test]
    fn test_regex_invalid_pattern() {
        let err = regex("(unclosed").err().unwrap();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn test_length_counts_chars() {
        let v = length().min(2).max(3);
        assert!(v.validate("éé").is_valid);
        assert_eq!(v.validate("a").message, "Must be at least 2 characters");
        assert_eq!(v.validate("abcd").message, "Must be at most 3 characters");
        assert!(v.validate("").is_valid);
        assert_eq!(length().min(1).required().validate("").message, "Input is required");
    }

    #[test]
    fn test_custom_return_types() {
        assert!(custom(|t: &str| t.starts_with('a')).validate("abc").is_valid);
        assert_eq!(
            custom(|t: &str| t.starts_with('a')).validate("xyz").message,
            "Invalid input"
        );
        assert_eq!(
            custom(|_: &str| (false, "nope")).validate("x").message,
            "nope"
        );
        assert_eq!(
            custom(|t: &str| (false, format!("bad {t}"))).validate("x").message,
            "bad x"
        );
        assert!(custom(|_: &str| false).validate("  ").is_valid);
        assert!(!custom(|_: &str| false).required().validate("").is_valid);
    }

    #[test]
    fn test_combine_first_failure_wins() {
        let validators: Vec<Box<dyn Validator>> = vec![
            Box::new(length().min(3)),
            Box::new(regex("[a-z]+").unwrap().message("Lowercase only")),
        ];
        let v = combine(validators);
        assert!(v.validate("abc").is_valid);
        assert_eq!(v.validate("ab").message, "Must be at least 3 characters");
        assert_eq!(v.validate("ABC").message, "Lowercase only");
        assert!(v.validate("").is_valid);
    }

    #[test]
    fn test_combine_empty_with_required_member() {
        let validators: Vec<Box<dyn Validator>> = vec![Box::new(email().required())];
        let v = combine(validators);
        assert_eq!(v.validate("").message, "Email address is required");
    }
}
