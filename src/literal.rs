//! Classification of operand text into typed literals.
//!
//! Families are tried in a fixed order and matched against the whole token
//! text, ignoring case. The first family that matches and converts wins.
//! Text that matches no family is not a literal; the parser then reads it
//! as a field reference.

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use uuid::Uuid;

use crate::error::SyntaxError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Null,
    Boolean,
    Long,
    Integer,
    Guid,
    Text,
    Double,
    Date,
    DateTime,
    List,
}

const FAMILIES: [(Family, &str); 10] = [
    (Family::Null, "null"),
    (Family::Boolean, "true|false"),
    (Family::Long, "[-+]?[0-9]+L"),
    (Family::Integer, "[-+]?[0-9]+"),
    (
        Family::Guid,
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    ),
    (Family::Text, "'(?:[^']|'')*'"),
    (
        Family::Double,
        r"[-+]?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:e[-+]?[0-9]+)?[df]?",
    ),
    (Family::Date, "[0-9]{4}-[0-9]{2}-[0-9]{2}"),
    (
        Family::DateTime,
        r"(?:datetime')?[0-9]{4}-[0-9]{2}-[0-9]{2}t[0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?'?",
    ),
    (Family::List, r"\[.*\]"),
];

/// Ordered literal families.
#[derive(Debug, Clone)]
pub struct LiteralClassifier {
    families: Vec<(Family, Regex)>,
}

impl LiteralClassifier {
    pub fn new() -> Result<Self, SyntaxError> {
        let families = FAMILIES
            .iter()
            .map(|(family, pattern)| {
                RegexBuilder::new(&format!("^(?:{})$", pattern))
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (*family, regex))
                    .map_err(|e| SyntaxError::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LiteralClassifier { families })
    }

    /// The literal `text` denotes, or `None` when it is not a literal.
    pub fn classify(&self, text: &str) -> Option<Value> {
        self.families
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .find_map(|(family, _)| self.convert(*family, text))
    }

    fn convert(&self, family: Family, text: &str) -> Option<Value> {
        match family {
            Family::Null => Some(Value::Null),
            Family::Boolean => Some(Value::Boolean(text.eq_ignore_ascii_case("true"))),
            Family::Long => parse_integer(&text[..text.len() - 1]).map(Value::Long),
            Family::Integer => {
                let n = parse_integer(text)?;
                Some(match i32::try_from(n) {
                    Ok(small) => Value::Integer(small),
                    Err(_) => Value::Long(n),
                })
            }
            Family::Guid => Uuid::parse_str(text).ok().map(Value::Guid),
            Family::Text => Some(Value::String(text[1..text.len() - 1].replace("''", "'"))),
            Family::Double => text
                .trim_end_matches(['d', 'D', 'f', 'F'])
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Double),
            Family::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            Family::DateTime => parse_datetime(text).map(Value::DateTime),
            Family::List => self.convert_list(&text[1..text.len() - 1]),
        }
    }

    fn convert_list(&self, body: &str) -> Option<Value> {
        if body.trim().is_empty() {
            return Some(Value::List(Vec::new()));
        }
        let items = body
            .split(',')
            .map(str::trim)
            .map(|item| {
                self.classify(item)
                    .unwrap_or_else(|| Value::String(item.to_string()))
            })
            .collect();
        Some(Value::List(items))
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    text.strip_prefix('+').unwrap_or(text).parse::<i64>().ok()
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let lower = text.to_ascii_lowercase();
    let bare = lower
        .strip_prefix("datetime'")
        .unwrap_or(&lower)
        .trim_end_matches('\'');
    ["%Y-%m-%dt%H:%M:%S%.f", "%Y-%m-%dt%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(bare, format).ok())
}
