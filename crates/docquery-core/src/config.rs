//! Query compiler configuration.

use std::env;

use docquery_model::{PatternLimits, RegexPattern};

use crate::error::CriteriaResult;

/// Configuration for pattern compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Upper bound, in bytes, on a compiled regex program.
    pub regex_size_limit: usize,
    /// Maximum syntax nesting depth of a regex.
    pub regex_nest_limit: u32,
    /// Maximum backtracking steps per match for lookaround or backreference patterns.
    pub regex_backtrack_limit: usize,
}

impl QueryConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `DOCQUERY_REGEX_SIZE_LIMIT`, `DOCQUERY_REGEX_NEST_LIMIT` and
    /// `DOCQUERY_REGEX_BACKTRACK_LIMIT`; missing or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = PatternLimits::default();
        Self {
            regex_size_limit: env_parse("DOCQUERY_REGEX_SIZE_LIMIT", defaults.size_limit),
            regex_nest_limit: env_parse("DOCQUERY_REGEX_NEST_LIMIT", defaults.nest_limit),
            regex_backtrack_limit: env_parse(
                "DOCQUERY_REGEX_BACKTRACK_LIMIT",
                defaults.backtrack_limit,
            ),
        }
    }

    /// The limits to apply when compiling patterns.
    #[must_use]
    pub fn pattern_limits(&self) -> PatternLimits {
        PatternLimits {
            size_limit: self.regex_size_limit,
            nest_limit: self.regex_nest_limit,
            backtrack_limit: self.regex_backtrack_limit,
        }
    }

    /// Compile a pattern under this configuration's limits.
    pub fn compile_pattern(&self, source: &str, options: &str) -> CriteriaResult<RegexPattern> {
        Ok(RegexPattern::with_limits(
            source,
            options,
            self.pattern_limits(),
        )?)
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        let defaults = PatternLimits::default();
        Self {
            regex_size_limit: defaults.size_limit,
            regex_nest_limit: defaults.nest_limit,
            regex_backtrack_limit: defaults.backtrack_limit,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
