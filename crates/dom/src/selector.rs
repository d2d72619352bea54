//! CSS selector subset used to locate elements.
//!
//! Supported syntax:
//! - type selectors (`div`) and the universal selector (`*`)
//! - `#id`, `.class`, `[attr]` and `[attr=value]` (value optionally quoted)
//! - the descendant combinator (whitespace)
//! - comma-separated selector lists
//!
//! Other combinators and pseudo-classes are rejected at parse time.
//! Quoted attribute values cannot contain whitespace.

use crate::error::{DomError, Result};
use std::fmt;
use std::str::FromStr;

/// Read access to a node, as needed for matching.
pub trait SelectorSubject: Sized {
    /// Lower-case tag name, or `None` when the node is not an element.
    fn tag_name(&self) -> Option<&str>;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Parent node if it is an element.
    fn parent_element(&self) -> Option<Self>;
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

/// Compounds joined by descendant combinators, left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeFilter {
    name: String,
    value: Option<String>,
}

impl Selector {
    /// Parse a selector list, rejecting anything outside the supported subset.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in source.split(',') {
            let mut compounds = Vec::new();
            for token in part.split_whitespace() {
                compounds.push(parse_compound(token).map_err(|reason| invalid(&reason))?);
            }
            if compounds.is_empty() {
                return Err(invalid("empty selector"));
            }
            alternatives.push(Complex { compounds });
        }

        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// The selector text as written (trimmed).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `subject` matches any selector of the list.
    pub fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches(subject))
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Complex {
    fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(subject) {
            return false;
        }

        // Right to left; greedy is exact for descendant-only chains.
        let mut current = subject.parent_element();
        for compound in ancestors.iter().rev() {
            loop {
                let Some(node) = current else {
                    return false;
                };
                current = node.parent_element();
                if compound.matches(&node) {
                    break;
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches<S: SelectorSubject>(&self, subject: &S) -> bool {
        let Some(tag) = subject.tag_name() else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = subject.attribute("class").unwrap_or_default();
            let has_all = self
                .classes
                .iter()
                .all(|class| class_attr.split_whitespace().any(|c| c == class));
            if !has_all {
                return false;
            }
        }
        self.attributes.iter().all(|filter| {
            match (subject.attribute(&filter.name), &filter.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }
}

fn parse_compound(token: &str) -> std::result::Result<Compound, String> {
    let mut compound = Compound::default();
    let mut rest = token;

    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped;
    } else {
        let (ident, tail) = take_ident(rest);
        if !ident.is_empty() {
            compound.tag = Some(ident.to_ascii_lowercase());
        }
        rest = tail;
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err("expected identifier after '#'".to_string());
                }
                compound.id = Some(ident.to_string());
                rest = tail;
            }
            '.' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err("expected identifier after '.'".to_string());
                }
                compound.classes.push(ident.to_string());
                rest = tail;
            }
            '[' => {
                let end = rest
                    .find(']')
                    .ok_or_else(|| "unterminated attribute selector".to_string())?;
                compound.attributes.push(parse_attribute(&rest[1..end])?);
                rest = &rest[end + 1..];
            }
            '>' | '+' | '~' => return Err(format!("unsupported combinator '{c}'")),
            ':' => return Err("pseudo-classes are not supported".to_string()),
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(compound)
}

fn parse_attribute(body: &str) -> std::result::Result<AttributeFilter, String> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name.trim(), Some(unquote(value.trim()))),
        None => (body.trim(), None),
    };
    let (ident, tail) = take_ident(name);
    if ident.is_empty() || !tail.is_empty() {
        return Err(format!("invalid attribute name '{name}'"));
    }
    Ok(AttributeFilter {
        name: ident.to_ascii_lowercase(),
        value: value.map(str::to_string),
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Tiny tree: nodes indexed by position, parent by index.
    struct Tree {
        nodes: Vec<(Option<&'static str>, HashMap<&'static str, &'static str>, Option<usize>)>,
    }

    #[derive(Clone, Copy)]
    struct Node<'a> {
        tree: &'a Tree,
        index: usize,
    }

    impl SelectorSubject for Node<'_> {
        fn tag_name(&self) -> Option<&str> {
            self.tree.nodes[self.index].0
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.tree.nodes[self.index].1.get(name).copied()
        }

        fn parent_element(&self) -> Option<Self> {
            self.tree.nodes[self.index].2.map(|index| Node {
                tree: self.tree,
                index,
            })
        }
    }

    fn tree() -> Tree {
        Tree {
            nodes: vec![
                (Some("html"), HashMap::new(), None),
                (
                    Some("body"),
                    HashMap::from([("class", "page dark")]),
                    Some(0),
                ),
                (
                    Some("div"),
                    HashMap::from([("id", "app"), ("data-role", "main")]),
                    Some(1),
                ),
                (
                    Some("button"),
                    HashMap::from([("class", "primary big")]),
                    Some(2),
                ),
                (None, HashMap::new(), Some(3)),
            ],
        }
    }

    fn matches(selector: &str, index: usize) -> bool {
        let tree = tree();
        Selector::parse(selector)
            .unwrap()
            .matches(&Node { tree: &tree, index })
    }

    #[test]
    fn test_simple_selectors() {
        assert!(matches("button", 3));
        assert!(matches("BUTTON", 3));
        assert!(matches("#app", 2));
        assert!(matches(".primary", 3));
        assert!(matches(".big.primary", 3));
        assert!(matches("*", 0));
        assert!(!matches("#app", 3));
        assert!(!matches(".secondary", 3));
    }

    #[test]
    fn test_attribute_selectors() {
        assert!(matches("[data-role]", 2));
        assert!(matches("div[data-role=main]", 2));
        assert!(matches("[data-role=\"main\"]", 2));
        assert!(!matches("[data-role=aside]", 2));
        assert!(!matches("[hidden]", 2));
    }

    #[test]
    fn test_descendant_combinator() {
        assert!(matches("body button", 3));
        assert!(matches("html .dark #app .primary", 3));
        assert!(!matches("button div", 2));
        assert!(!matches("#app body", 1));
    }

    #[test]
    fn test_selector_list() {
        assert!(matches("span, .primary", 3));
        assert!(!matches("span, p", 3));
    }

    #[test]
    fn test_non_element_never_matches() {
        assert!(!matches("*", 4));
    }

    #[test]
    fn test_invalid_selectors() {
        for source in ["", "  ", "div,", "#", ".", "a > b", "a:hover", "[x", "[=v]", "a!"] {
            let err = Selector::parse(source).unwrap_err();
            assert!(
                matches!(err, DomError::InvalidSelector { .. }),
                "{source:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_source() {
        let selector: Selector = "  div.note ".parse().unwrap();
        assert_eq!(selector.to_string(), "div.note");
        assert_eq!(selector.as_str(), "div.note");
    }
}
