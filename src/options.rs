// ABOUTME: Directive option values and validators for the reveal-slides application
// ABOUTME: Each option grammar is validated independently before a directive runs

use url::Url;

/// A validated directive option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
    Flag,
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Flag => Some(true),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Option grammars a directive may declare for its fields.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    /// One of a fixed set of lowercase tokens.
    Choice(&'static [&'static str]),
    /// yes/no, true/false, 0/1.
    Boolean,
    /// A boolean token if it parses as one, otherwise free text.
    Ternary,
    /// Comma-separated list; items are trimmed and empties dropped.
    CommaList,
    NonNegativeInt,
    Int,
    /// A URI or relative path; no embedded whitespace allowed.
    Uri,
    /// Present-or-absent option with no value.
    Flag,
    /// Free text, possibly empty.
    Unchanged,
    /// Free text, must be non-empty.
    UnchangedRequired,
    /// Whitespace-separated CSS class names.
    ClassList,
}

impl Validator {
    /// Validate a raw option value. `None` means the option was given with
    /// no value at all (`:autoplay:`).
    pub fn validate(&self, raw: Option<&str>) -> std::result::Result<OptionValue, String> {
        let text = raw.map(str::trim).unwrap_or("");
        match self {
            Validator::Choice(values) => {
                let token = text.to_lowercase();
                if values.contains(&token.as_str()) {
                    Ok(OptionValue::Str(token))
                } else {
                    Err(format!(
                        "\"{}\" unknown; choose from {}",
                        text,
                        values.join(", ")
                    ))
                }
            }
            Validator::Boolean => parse_boolean(text)
                .map(OptionValue::Bool)
                .ok_or_else(|| format!("unknown boolean value: \"{}\"", text)),
            Validator::Ternary => Ok(match parse_boolean(text) {
                Some(b) => OptionValue::Bool(b),
                None => OptionValue::Str(text.to_string()),
            }),
            Validator::CommaList => Ok(OptionValue::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Validator::NonNegativeInt => text
                .parse::<u64>()
                .map(|n| OptionValue::Int(n as i64))
                .map_err(|_| format!("\"{}\" is not a non-negative integer", text)),
            Validator::Int => text
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|_| format!("\"{}\" is not an integer", text)),
            Validator::Uri => {
                if text.is_empty() {
                    return Err("URI value required".to_string());
                }
                if text.split_whitespace().count() > 1 {
                    return Err(format!("URI cannot contain whitespace: \"{}\"", text));
                }
                if text.contains("://") {
                    Url::parse(text).map_err(|e| format!("invalid URI \"{}\": {}", text, e))?;
                }
                Ok(OptionValue::Str(text.to_string()))
            }
            Validator::Flag => {
                if text.is_empty() {
                    Ok(OptionValue::Flag)
                } else {
                    Err(format!("no value permitted: \"{}\"", text))
                }
            }
            Validator::Unchanged => Ok(OptionValue::Str(text.to_string())),
            Validator::UnchangedRequired => {
                if text.is_empty() {
                    Err("value required".to_string())
                } else {
                    Ok(OptionValue::Str(text.to_string()))
                }
            }
            Validator::ClassList => parse_class_list(text).map(OptionValue::List),
        }
    }
}

/// Recognize yes/no, true/false, 0/1 boolean tokens.
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "0" | "no" | "false" => Some(false),
        "1" | "yes" | "true" => Some(true),
        _ => None,
    }
}

/// Split a whitespace-separated class list, normalizing to lowercase.
/// Class names must be alphanumeric with `-` or `_`.
pub fn parse_class_list(text: &str) -> std::result::Result<Vec<String>, String> {
    let mut classes = Vec::new();
    for token in text.split_whitespace() {
        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            || !token.starts_with(|c: char| c.is_ascii_alphabetic())
        {
            return Err(format!("invalid class name: \"{}\"", token));
        }
        classes.push(token.to_lowercase());
    }
    if classes.is_empty() {
        return Err("at least one class name required".to_string());
    }
    Ok(classes)
}
