//! Parsed form of a path template.
//!
//! A template is an ordered list of [`TemplateNode`]s. Conditional bodies
//! are templates themselves, so the tree is walked recursively.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One element of a parsed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateNode {
    /// Text copied verbatim
    Literal { text: String },

    /// `:name:` (required) or `:name?:` (optional)
    TagRef { name: String, required: bool },

    /// `?condition?"body"`
    Conditional {
        condition: Condition,
        body: Vec<TemplateNode>,
    },
}

impl TemplateNode {
    pub fn literal(text: impl Into<String>) -> Self {
        TemplateNode::Literal { text: text.into() }
    }

    pub fn tag(name: impl Into<String>, required: bool) -> Self {
        TemplateNode::TagRef {
            name: name.into(),
            required,
        }
    }
}

/// A parsed template together with the string it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub source: String,
    pub nodes: Vec<TemplateNode>,
}

/// OR-combination of tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub tests: Vec<Test>,
}

/// A tag name, optionally compared against a literal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

impl Test {
    /// Bare presence test
    pub fn present(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            comparison: None,
        }
    }

    pub fn compare(tag: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            comparison: Some(Comparison {
                op,
                value: value.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: Operator,
    pub value: String,
}

/// Comparison operators. `<>` parses to [`Operator::Ne`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Ne,
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    /// Spellings, longest first so that `>=` is never read as `>`.
    pub const SYMBOLS: [(&'static str, Operator); 7] = [
        ("!=", Operator::Ne),
        ("<>", Operator::Ne),
        ("==", Operator::Eq),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ];

    /// Match an operator at the start of `text`, returning it and its length.
    pub fn match_prefix(text: &str) -> Option<(Operator, usize)> {
        Self::SYMBOLS
            .iter()
            .find(|(symbol, _)| text.starts_with(symbol))
            .map(|(symbol, op)| (*op, symbol.len()))
    }

    /// Whether `ordering` (left compared to right) satisfies the operator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Ne => "!=",
            Operator::Eq => "==",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
