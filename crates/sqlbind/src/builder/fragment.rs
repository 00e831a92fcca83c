// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 sqlbind project

//! Owned XML snapshots.
//!
//! Parsed documents borrow their source text, but sql fragments and pending
//! statements outlive the parse. `XmlFragment` is a small owned tree taken
//! from a document node, with `${…}` substitution applied at capture time.

use crate::error::BuilderError;
use crate::parsing::PropertyParser;
use crate::value::Properties;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlFragment),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlFragment {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlFragment {
    /// Captures an element, substituting `${…}` in attributes and text.
    pub fn capture(node: roxmltree::Node<'_, '_>, variables: &Properties) -> Self {
        let name = node.tag_name().name().to_string();
        let attrs = node
            .attributes()
            .map(|a| {
                (
                    a.name().to_string(),
                    PropertyParser::parse(a.value(), variables),
                )
            })
            .collect();
        let children = node
            .children()
            .filter_map(|child| {
                if child.is_element() {
                    Some(XmlNode::Element(Self::capture(child, variables)))
                } else if child.is_text() {
                    child
                        .text()
                        .map(|t| XmlNode::Text(PropertyParser::parse(t, variables)))
                } else {
                    None
                }
            })
            .collect();
        Self {
            name,
            attrs,
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attr(
        &self,
        element: &'static str,
        name: &'static str,
    ) -> Result<&str, BuilderError> {
        self.attr(name)
            .filter(|value| !value.is_empty())
            .ok_or(BuilderError::MissingAttribute {
                element,
                attribute: name,
            })
    }

    pub fn attr_bool(&self, name: &str, default: bool) -> Result<bool, BuilderError> {
        match self.attr(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| BuilderError::InvalidValue {
                key: name.to_string(),
                value: raw.to_string(),
                expected: "boolean",
            }),
        }
    }

    pub fn attr_u64(&self, name: &str) -> Result<Option<u64>, BuilderError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| BuilderError::InvalidValue {
                    key: name.to_string(),
                    value: raw.to_string(),
                    expected: "integer",
                }),
        }
    }

    pub fn attr_u32(&self, name: &str) -> Result<Option<u32>, BuilderError> {
        match self.attr(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| BuilderError::InvalidValue {
                    key: name.to_string(),
                    value: raw.to_string(),
                    expected: "integer",
                }),
        }
    }

    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlFragment> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlFragment> {
        self.child_elements().filter(move |el| el.name == name)
    }

    pub fn first_child(&self, name: &str) -> Option<&XmlFragment> {
        self.child_elements().find(|el| el.name == name)
    }

    /// Concatenated text of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// Nested `<property name="…" value="…"/>` children as a table.
    pub fn property_children(&self) -> Result<Properties, BuilderError> {
        let mut props = Properties::new();
        for property in self.children_named("property") {
            let name = property.required_attr("property", "name")?;
            let value = property.required_attr("property", "value")?;
            props.insert(name.to_string(), value.to_string());
        }
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(xml: &str, vars: &Properties) -> XmlFragment {
        let doc = roxmltree::Document::parse(xml).unwrap();
        XmlFragment::capture(doc.root_element(), vars)
    }

    #[test]
    fn test_capture_substitutes_variables() {
        let mut vars = Properties::new();
        vars.insert("table".into(), "users".into());
        let frag = capture(
            r#"<select id="x" resultType="${table}">select * from ${table}</select>"#,
            &vars,
        );
        assert_eq!(frag.attr("resultType"), Some("users"));
        assert!(frag.text().contains("from users"));
    }

    #[test]
    fn test_children_and_properties() {
        let frag = capture(
            r#"<cache type="PERPETUAL">
                 <property name="size" value="512"/>
                 <property name="timeout" value="10"/>
               </cache>"#,
            &Properties::new(),
        );
        let props = frag.property_children().unwrap();
        assert_eq!(props.get("size").map(String::as_str), Some("512"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_required_attr() {
        let frag = capture("<mapper/>", &Properties::new());
        assert!(frag.required_attr("mapper", "namespace").is_err());
    }
}
