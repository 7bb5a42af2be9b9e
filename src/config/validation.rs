//! Configuration validation.
//!
//! Runs on the deserialized [`EngineConfig`] and collects every issue
//! instead of stopping at the first one.

use std::time::Duration;

use crate::error::{Severity, ValidationIssue};
use crate::lang::Lang;

use super::schema::{EngineConfig, TimingConfig};

/// Stage durations above this are reported as suspicious.
const LONG_STAGE: Duration = Duration::from_secs(60 * 60);

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a validator with no collected issues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config` and returns everything found.
    pub fn validate(mut self, config: &EngineConfig) -> ValidationResult {
        self.validate_timings(&config.timings);
        self.validate_sweep(config);
        self.validate_lang(&config.lang);

        ValidationResult {
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn validate_timings(&mut self, timings: &TimingConfig) {
        for (name, duration) in fixed_timings(timings) {
            self.validate_stage_duration(&format!("timings.{name}"), duration);
        }
        self.validate_stage_duration("timings.discussion.base", timings.discussion.base);
        if timings.discussion.per_player > LONG_STAGE {
            self.add_warning(
                "timings.discussion.per_player",
                "extra discussion time per player is longer than an hour",
            );
        }
    }

    fn validate_stage_duration(&mut self, path: &str, duration: Duration) {
        if duration.is_zero() {
            self.add_error(path, "duration must be positive");
        } else if duration > LONG_STAGE {
            self.add_warning(path, "stage lasts longer than an hour");
        }
    }

    fn validate_sweep(&mut self, config: &EngineConfig) {
        let interval = config.sweep.interval;
        if interval.is_zero() {
            self.add_error("sweep.interval", "sweep interval must be positive");
            return;
        }
        let shortest = fixed_timings(&config.timings)
            .into_iter()
            .map(|(_, d)| d)
            .filter(|d| !d.is_zero())
            .min();
        if let Some(shortest) = shortest {
            if interval > shortest {
                self.add_warning(
                    "sweep.interval",
                    &format!(
                        "sweep interval {} is longer than the shortest stage ({})",
                        humantime::format_duration(interval),
                        humantime::format_duration(shortest)
                    ),
                );
            }
        }
    }

    fn validate_lang(&mut self, lang: &Lang) {
        let required: [(&str, &str, &[&str]); 8] = [
            ("lang.morning", lang.morning.as_str(), &["{order}"]),
            ("lang.vote", lang.vote.as_str(), &["{vote}"]),
            ("lang.jailed", lang.jailed.as_str(), &["{name}"]),
            ("lang.killed", lang.killed.as_str(), &["{name}"]),
            ("lang.night_victim", lang.night_victim.as_str(), &["{name}"]),
            ("lang.shooting", lang.shooting.as_str(), &["{order}"]),
            ("lang.don_check", lang.don_check.as_str(), &["{order}"]),
            ("lang.sheriff_check", lang.sheriff_check.as_str(), &["{order}"]),
        ];
        for (path, template, placeholders) in required {
            for placeholder in placeholders {
                if !template.contains(placeholder) {
                    self.add_warning(
                        path,
                        &format!("template does not use {placeholder}; players will not see it"),
                    );
                }
            }
        }
        if lang.abstain.trim().is_empty() {
            self.add_error("lang.abstain", "abstain label cannot be empty");
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

fn fixed_timings(t: &TimingConfig) -> [(&'static str, Duration); 10] {
    [
        ("cards", t.cards),
        ("set_order", t.set_order),
        ("get_order", t.get_order),
        ("vote", t.vote),
        ("last_words", t.last_words),
        ("night", t.night),
        ("shooting", t.shooting),
        ("don_check", t.don_check),
        ("sheriff_check", t.sheriff_check),
        ("last_words_victim", t.last_words_victim),
    ]
}
