//! Compiled regular expression values.
//!
//! A [`RegexPattern`] keeps the source text and the option string exactly as
//! they go on the wire, alongside a compiled matcher. Identity is the pair
//! `(source, options)`: two separately compiled patterns with the same source
//! and flags are equal and hash alike.
//!
//! Patterns compile with the linear-time `regex` engine when it can express
//! them. Lookaround and backreferences, which the query dialect accepts, fall
//! back to the backtracking `fancy-regex` engine.

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Compilation limits applied when building a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternLimits {
    /// Approximate upper bound, in bytes, on the compiled program size.
    pub size_limit: usize,
    /// Maximum nesting depth of the pattern syntax (linear-time engine).
    pub nest_limit: u32,
    /// Maximum backtracking steps per match (backtracking engine).
    pub backtrack_limit: usize,
}

impl Default for PatternLimits {
    fn default() -> Self {
        Self {
            size_limit: 10 * (1 << 20),
            nest_limit: 250,
            backtrack_limit: 1_000_000,
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Linear(Regex),
    Backtracking(fancy_regex::Regex),
}

/// A regular expression with its wire options.
#[derive(Debug, Clone)]
pub struct RegexPattern {
    source: String,
    options: String,
    matcher: Matcher,
}

impl RegexPattern {
    /// Compile a pattern without options.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::InvalidPattern` if the source does not compile.
    pub fn new(source: &str) -> Result<Self, PatternError> {
        Self::with_limits(source, "", PatternLimits::default())
    }

    /// Compile a pattern with an option string such as `"im"`.
    pub fn with_options(source: &str, options: &str) -> Result<Self, PatternError> {
        Self::with_limits(source, options, PatternLimits::default())
    }

    /// Compile a pattern with explicit compilation limits.
    pub fn with_limits(
        source: &str,
        options: &str,
        limits: PatternLimits,
    ) -> Result<Self, PatternError> {
        let options = canonical_options(options)?;
        let matcher = compile_linear(source, &options, limits)
            .or_else(|e| match e {
                regex::Error::CompiledTooBig(_) => Err(e.to_string()),
                _ => compile_backtracking(source, &options, limits),
            })
            .map_err(|message| PatternError::InvalidPattern {
                source_text: source.to_owned(),
                message,
            })?;

        Ok(Self {
            source: source.to_owned(),
            options,
            matcher,
        })
    }

    /// The pattern source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The canonical (sorted, de-duplicated) option string.
    #[must_use]
    pub fn options(&self) -> &str {
        &self.options
    }

    /// Returns `true` if the pattern needed the backtracking engine.
    #[must_use]
    pub fn is_backtracking(&self) -> bool {
        matches!(self.matcher, Matcher::Backtracking(_))
    }

    /// Test the compiled pattern against a string.
    ///
    /// # Errors
    ///
    /// Returns `PatternError::MatchAborted` if a backtracking match exceeds
    /// its step limit.
    pub fn is_match(&self, haystack: &str) -> Result<bool, PatternError> {
        match &self.matcher {
            Matcher::Linear(regex) => Ok(regex.is_match(haystack)),
            Matcher::Backtracking(regex) => {
                regex
                    .is_match(haystack)
                    .map_err(|e| PatternError::MatchAborted {
                        source_text: self.source.clone(),
                        message: e.to_string(),
                    })
            }
        }
    }
}

fn compile_linear(
    source: &str,
    options: &str,
    limits: PatternLimits,
) -> Result<Matcher, regex::Error> {
    let mut builder = RegexBuilder::new(source);
    builder
        .size_limit(limits.size_limit)
        .nest_limit(limits.nest_limit);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            _ => builder.unicode(true),
        };
    }
    builder.build().map(Matcher::Linear)
}

fn compile_backtracking(
    source: &str,
    options: &str,
    limits: PatternLimits,
) -> Result<Matcher, String> {
    // Unicode is already the default; the other options become inline flags.
    let flags: String = options.chars().filter(|c| *c != 'u').collect();
    let pattern = if flags.is_empty() {
        source.to_owned()
    } else {
        format!("(?{flags}){source}")
    };
    fancy_regex::RegexBuilder::new(&pattern)
        .backtrack_limit(limits.backtrack_limit)
        .delegate_size_limit(limits.size_limit)
        .build()
        .map(Matcher::Backtracking)
        .map_err(|e| e.to_string())
}

/// Validate, de-duplicate and sort an option string.
fn canonical_options(options: &str) -> Result<String, PatternError> {
    let mut flags: Vec<char> = Vec::with_capacity(options.len());
    for option in options.chars() {
        if !matches!(option, 'i' | 'm' | 's' | 'x' | 'u') {
            return Err(PatternError::UnsupportedOption { option });
        }
        if !flags.contains(&option) {
            flags.push(option);
        }
    }
    flags.sort_unstable();
    Ok(flags.into_iter().collect())
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.options == other.options
    }
}

impl Eq for RegexPattern {}

impl Hash for RegexPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.options.hash(state);
    }
}

impl fmt::Display for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.options)
    }
}
