// Field Validation - declarative per-field checks that collect every failure
// before a request is allowed to touch the data layer

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{AppError, AppResult};

pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
pub const USERNAME_PATTERN: &str = r"^[a-zA-Z0-9_]+$";
pub const URL_PATTERN: &str = r"^https?://\S+$";
pub const CURRENCY_PATTERN: &str = r"^[A-Z]{3}$";

static COMPILED_PATTERNS: Lazy<Mutex<HashMap<&'static str, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValidator {
    NotBlank,
    MinLength(usize),
    MaxLength(usize),
    Pattern(&'static str), // Regex pattern
    Range(f64, f64),       // Min, Max for numeric fields
}

fn matches_pattern(pattern: &'static str, value: &str) -> AppResult<bool> {
    let mut compiled = match COMPILED_PATTERNS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(regex) = compiled.get(pattern) {
        return Ok(regex.is_match(value));
    }

    let regex = Regex::new(pattern)
        .map_err(|e| AppError::Internal(format!("Invalid validation pattern {}: {}", pattern, e)))?;
    let matched = regex.is_match(value);
    compiled.insert(pattern, regex);
    Ok(matched)
}

/// Accumulates field errors; `finish` turns them into a single validation error
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    /// Required text field: absent or blank is "<field> is required"
    pub fn required_str(
        &mut self,
        field: &str,
        value: Option<&str>,
        validators: &[FieldValidator],
    ) -> AppResult<&mut Self> {
        match value {
            Some(v) if !v.trim().is_empty() => self.check_str(field, v, validators),
            _ => Ok(self.push(format!("{} is required", field))),
        }
    }

    /// Optional text field; only checked when present
    pub fn optional_str(
        &mut self,
        field: &str,
        value: Option<&str>,
        validators: &[FieldValidator],
    ) -> AppResult<&mut Self> {
        match value {
            Some(v) => self.check_str(field, v, validators),
            None => Ok(self),
        }
    }

    pub fn required<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.push(format!("{} is required", field));
        }
        self
    }

    pub fn check_str(
        &mut self,
        field: &str,
        value: &str,
        validators: &[FieldValidator],
    ) -> AppResult<&mut Self> {
        let length = value.chars().count();
        for validator in validators {
            match validator {
                FieldValidator::NotBlank => {
                    if value.trim().is_empty() {
                        self.push(format!("{} cannot be empty", field));
                    }
                }
                FieldValidator::MinLength(min) => {
                    if length < *min {
                        self.push(format!("{} must be at least {} characters", field, min));
                    }
                }
                FieldValidator::MaxLength(max) => {
                    if length > *max {
                        self.push(format!("{} cannot exceed {} characters", field, max));
                    }
                }
                FieldValidator::Pattern(pattern) => {
                    if !value.is_empty() && !matches_pattern(pattern, value)? {
                        self.push(format!("{} format is invalid", field));
                    }
                }
                FieldValidator::Range(..) => {}
            }
        }
        Ok(self)
    }

    pub fn check_number(&mut self, field: &str, value: f64, validators: &[FieldValidator]) -> &mut Self {
        if !value.is_finite() {
            return self.push(format!("{} must be a finite number", field));
        }
        for validator in validators {
            if let FieldValidator::Range(min, max) = validator {
                if value < *min || value > *max {
                    if *max == f64::MAX {
                        self.push(format!("{} must be at least {}", field, min));
                    } else {
                        self.push(format!("{} must be between {} and {}", field, min, max));
                    }
                }
            }
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self, message: &str) -> AppResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: message.to_string(),
                details: self.errors,
            })
        }
    }
}

/// Trim, and treat blank as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
