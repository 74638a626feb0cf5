//! Typed values bound by declaration lines, and the supported languages.
//!
//! Every value renders through `Display` in its natural textual form, which is
//! exactly what ends up on the solution's stdin.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A decimal number read from a declaration token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parse a token that is entirely numeric: an optional leading `-`, digits,
    /// and at most one decimal point. Anything else (exponents, hex, `NaN`,
    /// a leading `+`) is rejected.
    pub fn parse(token: &str) -> Option<Self> {
        let unsigned = token.strip_prefix('-').unwrap_or(token);
        let mut seen_digit = false;
        let mut seen_dot = false;
        for ch in unsigned.chars() {
            match ch {
                '0'..='9' => seen_digit = true,
                '.' if !seen_dot => seen_dot = true,
                _ => return None,
            }
        }
        if !seen_digit {
            return None;
        }
        if !seen_dot && let Ok(value) = token.parse::<i64>() {
            return Some(Number::Int(value));
        }
        // Integers wider than i64 fall through to f64 as well.
        token.parse::<f64>().ok().map(Number::float)
    }

    /// Build a float, folding `-0.0` into `0.0` so it renders as `0`.
    pub fn float(value: f64) -> Self {
        if value == 0.0 {
            Number::Float(0.0)
        } else {
            Number::Float(value)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// A single value: a number when the token is numeric, otherwise the raw token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
}

impl Scalar {
    /// Coerce a raw token, keeping it verbatim when it is not a number.
    pub fn from_token(token: &str) -> Self {
        match Number::parse(token) {
            Some(number) => Scalar::Number(number),
            None => Scalar::Text(token.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(number) => number.fmt(f),
            Scalar::Text(text) => f.write_str(text),
        }
    }
}

/// The right-hand side of a binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Scalar>),
}

impl fmt::Display for Value {
    /// Sequences render as their elements joined by a single space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => scalar.fmt(f),
            Value::Sequence(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    element.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

/// One `key = value` pair from a declaration line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub key: String,
    pub value: Value,
}

impl Binding {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn scalar(key: impl Into<String>, token: &str) -> Self {
        Self::new(key, Value::Scalar(Scalar::from_token(token)))
    }

    pub fn sequence<'a>(key: impl Into<String>, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(
            key,
            Value::Sequence(tokens.into_iter().map(Scalar::from_token).collect()),
        )
    }
}

/// Solution language. C++ is compiled once per run; Python is handed to the
/// interpreter as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Python,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language {0:?} (expected cpp or python)")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Detect the language from a solution file extension (`.cpp` or `.py`).
    pub fn from_path(path: &Path) -> Result<Self, UnsupportedLanguage> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("cpp") => Ok(Language::Cpp),
            Some("py") => Ok(Language::Python),
            other => Err(UnsupportedLanguage(
                other.map(|ext| format!(".{ext}")).unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cpp" | "c++" => Ok(Language::Cpp),
            "python" | "py" => Ok(Language::Python),
            _ => Err(UnsupportedLanguage(value.to_string())),
        }
    }
}
