//! Declaration line parser.
//!
//! A declaration line binds named values for one test case:
//!
//! ```text
//! nums = [2 7 11 15], target = 9
//! ```
//!
//! The scanner is a single forward pass over the line:
//!
//! ```text
//! line     := (pair | skipped char)*
//! pair     := ident ws* '=' ws* value
//! ident    := [A-Za-z0-9_]+
//! value    := '[' (sep* element)* sep* ']'  |  token
//! sep      := whitespace | ','
//! element  := run of chars other than sep and ']'
//! token    := run of chars other than whitespace and '='
//! ```
//!
//! A single trailing `,` on a token separates it from the next pair, so
//! `s = "a,b", k = 2` keeps the inner comma. A sequence missing its `]` ends
//! before the next `ident ws* '='`, and that pair is parsed normally.
//!
//! Text that does not start a pair is skipped. Malformed input never aborts
//! the parse: the bindings that could be recovered are returned together with
//! a list of [`ParseIssue`]s.

use serde::Serialize;
use thiserror::Error;

use crate::core::types::{Binding, Scalar, Value};

/// Result of parsing one declaration line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedLine {
    /// Bindings in left-to-right order of appearance.
    pub bindings: Vec<Binding>,
    /// Problems found while scanning. Never fatal.
    pub issues: Vec<ParseIssue>,
}

/// A recoverable problem in a declaration line. Columns are 1-based chars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseIssue {
    /// `[` was never closed; the sequence ended at the next pair or at the
    /// end of the line.
    #[error("sequence for `{key}` opened at column {column} is not terminated")]
    UnterminatedSequence { key: String, column: usize },
    /// `key =` was followed by nothing usable; the pair was dropped.
    #[error("`{key}` has no value at column {column}")]
    MissingValue { key: String, column: usize },
}

/// Parse one declaration line into its ordered bindings.
///
/// A line without any `key = value` pair yields no bindings and no issues.
pub fn parse_declaration(line: &str) -> ParsedLine {
    let mut scanner = Scanner::new(line);
    let mut parsed = ParsedLine::default();

    while !scanner.at_end() {
        let Some(key) = scanner.take_identifier() else {
            scanner.bump();
            continue;
        };
        scanner.skip_whitespace();
        if !scanner.eat('=') {
            continue;
        }
        scanner.skip_whitespace();

        let column = scanner.column();
        if scanner.eat('[') {
            let (elements, terminated) = scanner.take_sequence();
            if !terminated {
                parsed.issues.push(ParseIssue::UnterminatedSequence {
                    key: key.clone(),
                    column,
                });
            }
            parsed
                .bindings
                .push(Binding::new(key, Value::Sequence(elements)));
        } else {
            let token = scanner.take_token();
            if token.is_empty() {
                parsed.issues.push(ParseIssue::MissingValue { key, column });
            } else {
                parsed
                    .bindings
                    .push(Binding::new(key, Value::Scalar(Scalar::from_token(&token))));
            }
        }
    }

    parsed
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn column(&self) -> usize {
        self.pos + 1
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        self.skip_while(pred);
        self.chars[start..self.pos].iter().collect()
    }

    fn take_identifier(&mut self) -> Option<String> {
        let ident = self.take_while(is_ident_char);
        (!ident.is_empty()).then_some(ident)
    }

    fn take_token(&mut self) -> String {
        let start = self.pos;
        self.skip_while(|ch| !ch.is_whitespace() && ch != '=');
        let run = &self.chars[start..self.pos];

        // `a=1,b=2`: the identifier after the last comma is the next key.
        if self.next_non_whitespace() == Some('=')
            && let Some(comma) = run.iter().rposition(|&ch| ch == ',')
            && comma + 1 < run.len()
            && run[comma + 1..].iter().all(|&ch| is_ident_char(ch))
        {
            let token = run[..comma].iter().collect();
            self.pos = start + comma;
            return token;
        }

        match run.split_last() {
            Some((&',', rest)) => rest.iter().collect(),
            _ => run.iter().collect(),
        }
    }

    fn next_non_whitespace(&self) -> Option<char> {
        self.chars[self.pos..]
            .iter()
            .copied()
            .find(|ch| !ch.is_whitespace())
    }

    /// Whether `ident ws* '='` starts at the current position.
    fn at_pair_start(&self) -> bool {
        let rest = &self.chars[self.pos..];
        let ident_len = rest.iter().take_while(|&&ch| is_ident_char(ch)).count();
        ident_len > 0
            && rest[ident_len..]
                .iter()
                .find(|ch| !ch.is_whitespace())
                .is_some_and(|&ch| ch == '=')
    }

    /// Read elements up to the closing `]`. Returns `false` when the line
    /// ends or another pair starts first; that pair is left unconsumed.
    fn take_sequence(&mut self) -> (Vec<Scalar>, bool) {
        let mut elements = Vec::new();
        loop {
            self.skip_while(is_sequence_separator);
            match self.peek() {
                None => return (elements, false),
                Some(']') => {
                    self.bump();
                    return (elements, true);
                }
                Some(_) if self.at_pair_start() => return (elements, false),
                Some(_) => {
                    let element = self.take_while(|ch| !is_sequence_separator(ch) && ch != ']');
                    elements.push(Scalar::from_token(&element));
                }
            }
        }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_sequence_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}
