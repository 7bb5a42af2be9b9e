//! Configuration loading pipeline.
//!
//! 1. Read the file (size-limited, BOM stripped)
//! 2. Expand environment variables on the raw text
//! 3. Parse YAML into [`EngineConfig`]
//! 4. Validate, collecting every issue

use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;

use super::schema::EngineConfig;
use super::validation::Validator;

/// Reads an environment variable and parses it, falling back to `default`.
pub fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<EngineConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    max_config_size: usize,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            max_config_size: env_or("NIGHTWATCH_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

impl ConfigLoader {
    /// Creates a loader with the default size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, references
    /// a required variable that is unset, fails to parse, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.max_config_size),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_str(&raw, path)
    }

    /// Loads and validates configuration text; `path` is used in messages.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file access errors.
    pub fn load_str(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw, path)?;
        let mut warnings = env_sub.warnings;

        let config: EngineConfig = if substituted.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let result = Validator::new().validate(&config);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text so substituted values get normal YAML typing.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Supports:
    /// - `${VAR}` - value, or empty string with a warning if unset
    /// - `${VAR:-default}` - `default` if unset
    /// - `${VAR:?message}` - error if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw: &str, source: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        let mut line = 1usize;

        while let Some(c) = chars.next() {
            if c == '\n' {
                line += 1;
            }
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = Self::parse_var_spec(&mut chars).ok_or_else(|| {
                        ConfigError::ParseError {
                            path: source.to_path_buf(),
                            line: Some(line),
                            message: "unclosed environment variable reference".to_string(),
                        }
                    })?;
                    match std::env::var(&spec.name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => match spec.fallback {
                            Fallback::Default(default) => result.push_str(&default),
                            Fallback::Required(message) => {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: spec.name,
                                    location: format!("{}:{line}: {message}", source.display()),
                                });
                            }
                            Fallback::Empty => self.warnings.push(LoadWarning {
                                message: format!(
                                    "environment variable '{}' is not set, using empty string",
                                    spec.name
                                ),
                                location: Some(format!("{}:{line}", source.display())),
                            }),
                        },
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Parses the inside of `${...}`; `None` if the reference never closes.
    fn parse_var_spec(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<VarSpec> {
        let mut name = String::new();
        while let Some(c) = chars.next() {
            match c {
                '}' => {
                    return Some(VarSpec {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let default = Self::read_until_close(chars)?;
                    return Some(VarSpec {
                        name,
                        fallback: Fallback::Default(default),
                    });
                }
                ':' if chars.peek() == Some(&'?') => {
                    chars.next();
                    let message = Self::read_until_close(chars)?;
                    return Some(VarSpec {
                        name,
                        fallback: Fallback::Required(message),
                    });
                }
                _ => name.push(c),
            }
        }
        None
    }

    /// Reads up to the matching `}`, keeping nested braces.
    fn read_until_close(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
        let mut value = String::new();
        let mut depth = 1;
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }
        None
    }
}

struct VarSpec {
    name: String,
    fallback: Fallback,
}

enum Fallback {
    Empty,
    Default(String),
    Required(String),
}
