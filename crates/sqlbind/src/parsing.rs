// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Token scanning shared by the builders.

use crate::value::Properties;

/// Finds `open…close` tokens in a text and replaces each through a handler.
///
/// A token whose opener is preceded by `\` is kept literally (the backslash
/// is dropped); the same escape works for the closer inside an expression.
/// An unterminated token is kept as-is.
pub struct GenericTokenParser<'a> {
    open: &'a str,
    close: &'a str,
}

impl<'a> GenericTokenParser<'a> {
    pub fn new(open: &'a str, close: &'a str) -> Self {
        Self { open, close }
    }

    pub fn parse(&self, text: &str, handler: &mut dyn FnMut(&str) -> String) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut i = 0usize;
        while let Some(rel) = text[i..].find(self.open) {
            let start = i + rel;
            if start > 0 && bytes[start - 1] == b'\\' {
                out.push_str(&text[i..start - 1]);
                out.push_str(self.open);
                i = start + self.open.len();
                continue;
            }
            out.push_str(&text[i..start]);

            let mut expression = String::new();
            let mut j = start + self.open.len();
            let mut closed = false;
            while let Some(rel_close) = text[j..].find(self.close) {
                let at = j + rel_close;
                if at > 0 && bytes[at - 1] == b'\\' {
                    expression.push_str(&text[j..at - 1]);
                    expression.push_str(self.close);
                    j = at + self.close.len();
                } else {
                    expression.push_str(&text[j..at]);
                    j = at + self.close.len();
                    closed = true;
                    break;
                }
            }
            if closed {
                out.push_str(&handler(&expression));
                i = j;
            } else {
                out.push_str(&text[start..]);
                i = text.len();
                break;
            }
        }
        out.push_str(&text[i..]);
        out
    }
}

/// `${key}` substitution against a variable table.
///
/// Unknown keys are left in place so that later passes (or the reader) can
/// see what did not resolve.
pub struct PropertyParser;

impl PropertyParser {
    pub fn parse(text: &str, variables: &Properties) -> String {
        if !text.contains("${") {
            return text.to_string();
        }
        GenericTokenParser::new("${", "}").parse(text, &mut |key| {
            variables
                .get(key)
                .cloned()
                .unwrap_or_else(|| format!("${{{}}}", key))
        })
    }
}

/// Parses the simple line-oriented `key=value` properties format.
///
/// `#` and `!` start comment lines; `:` is accepted as separator.
pub fn parse_properties(text: &str) -> Properties {
    let mut props = Properties::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let split = line
            .find('=')
            .or_else(|| line.find(':'));
        if let Some(pos) = split {
            let key = line[..pos].trim();
            let value = line[pos + 1..].trim();
            if !key.is_empty() {
                props.insert(key.to_string(), value.to_string());
            }
        }
    }
    props
}
