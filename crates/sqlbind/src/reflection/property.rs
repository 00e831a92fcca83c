// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Dotted property-path tokenization and accessor-name conventions.

use crate::error::ReflectionError;

/// One segment of a dotted property expression.
///
/// `a.b[3].c` splits into `(a)`, `(b, index 3)`, `(c)`. The first `.`
/// separates `name[index?]` from the remaining children; the first `[`/`]`
/// pair isolates the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTokenizer {
    name: String,
    indexed_name: String,
    index: Option<String>,
    children: Option<String>,
}

impl PropertyTokenizer {
    pub fn new(expression: &str) -> Self {
        let (head, children) = match expression.find('.') {
            Some(pos) => (&expression[..pos], Some(expression[pos + 1..].to_string())),
            None => (expression, None),
        };
        let indexed_name = head.to_string();
        let (name, index) = match head.find('[') {
            Some(pos) => {
                let close = head.rfind(']').unwrap_or(head.len());
                (
                    head[..pos].to_string(),
                    Some(head[pos + 1..close].to_string()),
                )
            }
            None => (head.to_string(), None),
        };
        Self {
            name,
            indexed_name,
            index,
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Segment text including its index suffix, e.g. `b[3]`.
    pub fn indexed_name(&self) -> &str {
        &self.indexed_name
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn children(&self) -> Option<&str> {
        self.children.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// Tokenizer over the remaining children.
    pub fn next_segment(&self) -> Option<PropertyTokenizer> {
        self.children.as_deref().map(PropertyTokenizer::new)
    }
}

/// Accessor-name conventions: `getX`/`isX` read, `setX` writes.
pub struct PropertyNamer;

impl PropertyNamer {
    pub fn is_getter(name: &str) -> bool {
        (name.starts_with("get") && name.len() > 3) || (name.starts_with("is") && name.len() > 2)
    }

    pub fn is_setter(name: &str) -> bool {
        name.starts_with("set") && name.len() > 3
    }

    /// Strips the accessor prefix and decapitalizes the first letter, unless
    /// the second letter is already uppercase (`getURL` stays `URL`).
    pub fn method_to_property(name: &str) -> Result<String, ReflectionError> {
        let stripped = if name.starts_with("is") && name.len() > 2 {
            &name[2..]
        } else if (name.starts_with("get") || name.starts_with("set")) && name.len() > 3 {
            &name[3..]
        } else {
            return Err(ReflectionError::InvalidSource {
                message: format!("'{}' does not follow accessor naming", name),
            });
        };
        let mut chars = stripped.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => {
                return Err(ReflectionError::InvalidSource {
                    message: format!("'{}' has an empty property name", name),
                })
            }
        };
        let keep_case = stripped.chars().nth(1).is_some_and(char::is_uppercase);
        let property = if keep_case {
            stripped.to_string()
        } else {
            first.to_lowercase().collect::<String>() + chars.as_str()
        };
        Ok(property)
    }

    /// Names rejected as properties regardless of accessor shape.
    pub fn is_valid_property(name: &str) -> bool {
        !name.starts_with('$') && name != "serialVersionUID" && name != "class"
    }
}
