// Mon Oct 19 2026 - Alex

use crate::pattern::{Mark, Pattern, PatternError};

pub struct PatternCompiler;

impl PatternCompiler {
    pub fn compile(source: &str) -> Result<Pattern, PatternError> {
        let mut value = Vec::new();
        let mut mask = Vec::new();
        let mut marks: Vec<Mark> = Vec::new();

        for token in strip_comments(source).split_whitespace() {
            if let Some(label) = token.strip_prefix('*') {
                let label = if label.is_empty() {
                    None
                } else {
                    let starts_ok = label.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_');
                    if !starts_ok || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(PatternError::malformed(token, "invalid capture label"));
                    }
                    if marks.iter().any(|m| m.label.as_deref() == Some(label)) {
                        return Err(PatternError::DuplicateLabel(label.to_string()));
                    }
                    Some(label.to_string())
                };
                marks.push(Mark {
                    ordinal: marks.len(),
                    index: value.len(),
                    label,
                });
                continue;
            }

            let (v, m) = match token.split_once('/') {
                Some((v, m)) => (v, m),
                None => (token, "0xff"),
            };
            let v = parse_u8(v).ok_or_else(|| PatternError::malformed(token, "value is not a byte"))?;
            let m = parse_u8(m).ok_or_else(|| PatternError::malformed(token, "mask is not a byte"))?;
            value.push(v);
            mask.push(m);
        }

        Ok(Pattern::new(value, mask, marks))
    }
}

pub fn compile(source: &str) -> Result<Pattern, PatternError> {
    PatternCompiler::compile(source)
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split_once("//").map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse_u8(text: &str) -> Option<u8> {
    let (digits, radix) = if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (rest, 16)
    } else if let Some(rest) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        (rest, 8)
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (rest, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    // from_str_radix would accept a sign
    if !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    u8::from_str_radix(&cleaned, radix).ok()
}
