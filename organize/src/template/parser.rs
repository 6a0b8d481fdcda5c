//! Template string -> [`Template`].
//!
//! Grammar:
//!
//! ```text
//! template    := (literal | tagref | conditional)*
//! tagref      := ':' name ['?'] ':'
//! conditional := '?' condition '?' '"' template '"'
//! condition   := test ('|' test)*
//! test        := name [op literal]
//! ```
//!
//! Inside a condition header, `:...:` spans are opaque, so a `?` there does
//! not end the header. A conditional body ends at the first `"` that does
//! not close a nested conditional's body. Outside any body a `"` is plain
//! text.

use crate::error::{TemplateError, TemplateResult};

use super::ast::{Comparison, Condition, Operator, Template, TemplateNode, Test};

/// Parse a template string.
pub fn parse(template: &str) -> TemplateResult<Template> {
    let mut parser = Parser {
        chars: template.chars().collect(),
        pos: 0,
    };
    let nodes = parser.parse_sequence(None)?;
    Ok(Template {
        source: template.to_string(),
        nodes,
    })
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Parse nodes until end of input, or until the closing `"` of the body
    /// whose opening quote sits at `body_start`.
    fn parse_sequence(&mut self, body_start: Option<usize>) -> TemplateResult<Vec<TemplateNode>> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            match c {
                ':' => {
                    flush_literal(&mut literal, &mut nodes);
                    nodes.push(self.parse_tag_ref()?);
                }
                '?' => {
                    flush_literal(&mut literal, &mut nodes);
                    nodes.push(self.parse_conditional()?);
                }
                '"' if body_start.is_some() => {
                    self.pos += 1;
                    flush_literal(&mut literal, &mut nodes);
                    return Ok(nodes);
                }
                _ => {
                    literal.push(c);
                    self.pos += 1;
                }
            }
        }

        if let Some(position) = body_start {
            return Err(TemplateError::UnbalancedQuotes { position });
        }

        flush_literal(&mut literal, &mut nodes);
        Ok(nodes)
    }

    fn parse_tag_ref(&mut self) -> TemplateResult<TemplateNode> {
        let start = self.pos;
        self.pos += 1;

        let mut name = String::new();
        loop {
            match self.bump() {
                Some(':') => break,
                Some(c) => name.push(c),
                None => return Err(TemplateError::UnterminatedTag { position: start }),
            }
        }

        let (name, required) = match name.strip_suffix('?') {
            Some(stripped) => (stripped.to_string(), false),
            None => (name, true),
        };

        if name.is_empty() {
            return Err(TemplateError::EmptyTagName { position: start });
        }

        Ok(TemplateNode::TagRef { name, required })
    }

    fn parse_conditional(&mut self) -> TemplateResult<TemplateNode> {
        let start = self.pos;
        self.pos += 1;

        let mut header = String::new();
        let mut in_tag = false;
        loop {
            match self.bump() {
                None => return Err(TemplateError::UnterminatedCondition { position: start }),
                Some(':') => {
                    in_tag = !in_tag;
                    header.push(':');
                }
                Some('?') if !in_tag => break,
                Some('"') if !in_tag => {
                    return Err(TemplateError::UnterminatedCondition { position: start })
                }
                Some(c) => header.push(c),
            }
        }

        let condition = parse_condition(&header, start)?;

        let body_start = self.pos;
        if self.bump() != Some('"') {
            return Err(TemplateError::ExpectedBody {
                position: body_start,
            });
        }

        let body = self.parse_sequence(Some(body_start))?;
        Ok(TemplateNode::Conditional { condition, body })
    }
}

fn flush_literal(literal: &mut String, nodes: &mut Vec<TemplateNode>) {
    if !literal.is_empty() {
        nodes.push(TemplateNode::Literal {
            text: std::mem::take(literal),
        });
    }
}

/// Parse the text between a conditional's two `?`.
pub fn parse_condition(header: &str, position: usize) -> TemplateResult<Condition> {
    let tests = header
        .split('|')
        .map(|test| parse_test(test, position))
        .collect::<TemplateResult<Vec<_>>>()?;
    Ok(Condition { tests })
}

fn parse_test(text: &str, position: usize) -> TemplateResult<Test> {
    let op_start = text.find(['!', '=', '<', '>']);

    let Some(op_start) = op_start else {
        let tag = clean_name(text);
        if tag.is_empty() {
            return Err(TemplateError::EmptyTest { position });
        }
        return Ok(Test::present(tag));
    };

    let (op, op_len) = Operator::match_prefix(&text[op_start..]).ok_or_else(|| {
        TemplateError::UnknownOperator {
            test: text.to_string(),
        }
    })?;

    let tag = clean_name(&text[..op_start]);
    if tag.is_empty() {
        return Err(TemplateError::MissingOperand {
            test: text.to_string(),
        });
    }

    // compared exactly as written, surrounding spaces included
    let value = text[op_start + op_len..].to_string();
    Ok(Test {
        tag,
        comparison: Some(Comparison { op, value }),
    })
}

/// Test names may be written bare or as `:name:`/`:name?:`.
fn clean_name(name: &str) -> String {
    let name = name.trim().trim_matches(':');
    name.strip_suffix('?').unwrap_or(name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> TemplateNode {
        TemplateNode::literal(text)
    }

    fn tag(name: &str) -> TemplateNode {
        TemplateNode::tag(name, true)
    }

    fn opt(name: &str) -> TemplateNode {
        TemplateNode::tag(name, false)
    }

    #[test]
    fn test_literals_and_tags() {
        let t = parse(":tracknumber: :title:.:format:").unwrap();
        assert_eq!(
            t.nodes,
            vec![tag("tracknumber"), lit(" "), tag("title"), lit("."), tag("format")]
        );
    }

    #[test]
    fn test_optional_tag() {
        let t = parse("[:label?:]").unwrap();
        assert_eq!(t.nodes, vec![lit("["), opt("label"), lit("]")]);
    }

    #[test]
    fn test_conditional_with_comparison() {
        let t = parse("?disctotal!=1?\"Disc :discnumber:\"").unwrap();
        assert_eq!(
            t.nodes,
            vec![TemplateNode::Conditional {
                condition: Condition {
                    tests: vec![Test::compare("disctotal", Operator::Ne, "1")],
                },
                body: vec![lit("Disc "), tag("discnumber")],
            }]
        );
    }

    #[test]
    fn test_nested_conditionals() {
        let t = parse(
            ":year: - :album: [:FORMAT:]?label|catalogno?\" {:label?:?label?\" \":catalogno?:}\"",
        )
        .unwrap();

        assert_eq!(t.nodes.len(), 7);
        let TemplateNode::Conditional { condition, body } = &t.nodes[6] else {
            panic!("expected conditional, got {:?}", t.nodes[6]);
        };
        assert_eq!(
            condition.tests,
            vec![Test::present("label"), Test::present("catalogno")]
        );
        assert_eq!(
            body,
            &vec![
                lit(" {"),
                opt("label"),
                TemplateNode::Conditional {
                    condition: Condition {
                        tests: vec![Test::present("label")],
                    },
                    body: vec![lit(" ")],
                },
                opt("catalogno"),
                lit("}"),
            ]
        );
    }

    #[test]
    fn test_question_mark_inside_tag_is_not_a_condition() {
        // `:label?:` before a conditional must not open one
        let t = parse(":label?:?catalogno?\"x\"").unwrap();
        assert_eq!(t.nodes[0], opt("label"));
        assert!(matches!(t.nodes[1], TemplateNode::Conditional { .. }));
    }

    #[test]
    fn test_colon_tags_in_condition_header() {
        let t = parse("?:label?:?\"L\"").unwrap();
        let TemplateNode::Conditional { condition, .. } = &t.nodes[0] else {
            panic!("expected conditional");
        };
        assert_eq!(condition.tests, vec![Test::present("label")]);
    }

    #[test]
    fn test_ge_operator() {
        let t = parse("?year>=2000?\"new\"").unwrap();
        let TemplateNode::Conditional { condition, .. } = &t.nodes[0] else {
            panic!("expected conditional");
        };
        assert_eq!(condition.tests, vec![Test::compare("year", Operator::Ge, "2000")]);
    }

    #[test]
    fn test_comparison_literal_kept_verbatim() {
        let t = parse("?media== CD?\"x\"|?:media: != Vinyl ?\"y\"").unwrap();
        let TemplateNode::Conditional { condition, .. } = &t.nodes[0] else {
            panic!("expected conditional");
        };
        assert_eq!(condition.tests, vec![Test::compare("media", Operator::Eq, " CD")]);
        let TemplateNode::Conditional { condition, .. } = &t.nodes[2] else {
            panic!("expected conditional");
        };
        assert_eq!(condition.tests, vec![Test::compare("media", Operator::Ne, " Vinyl ")]);
    }

    #[test]
    fn test_quote_outside_body_is_literal() {
        let t = parse("say \"hi\"").unwrap();
        assert_eq!(t.nodes, vec![lit("say \"hi\"")]);
    }

    #[test]
    fn test_malformed_conditionals() {
        assert_eq!(
            parse("?disctotal?\"Disc").unwrap_err(),
            TemplateError::UnbalancedQuotes { position: 11 }
        );
        assert_eq!(
            parse("?disctotal?Disc").unwrap_err(),
            TemplateError::ExpectedBody { position: 11 }
        );
        assert_eq!(
            parse("?disctotal").unwrap_err(),
            TemplateError::UnterminatedCondition { position: 0 }
        );
        // nested body closes, outer does not
        assert!(matches!(
            parse("?a?\"x?b?\"y\"").unwrap_err(),
            TemplateError::UnbalancedQuotes { position: 3 }
        ));
    }

    #[test]
    fn test_malformed_tags_and_tests() {
        assert_eq!(
            parse("a :title").unwrap_err(),
            TemplateError::UnterminatedTag { position: 2 }
        );
        assert_eq!(parse("::").unwrap_err(), TemplateError::EmptyTagName { position: 0 });
        assert_eq!(parse("??\"x\"").unwrap_err(), TemplateError::EmptyTest { position: 0 });
        assert!(matches!(
            parse("?year=2000?\"x\"").unwrap_err(),
            TemplateError::UnknownOperator { .. }
        ));
        assert!(matches!(
            parse("?==1?\"x\"").unwrap_err(),
            TemplateError::MissingOperand { .. }
        ));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "?disctotal!=1?\"Disc :discnumber:\"";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }
}
