//! CSS selector parsing and matching
//!
//! Supported grammar:
//! - compound: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr op value]`
//!   with `=`, `~=`, `|=`, `^=`, `$=`, `*=`
//! - pseudo-classes: `:nth-child(An+B | odd | even)`, `:first-child`,
//!   `:last-child`, `:only-child`
//! - combinators: descendant, `>`, `+`, `~`; comma-separated groups
//!
//! Everything else is rejected with a [`SelectorError`], mirroring how a
//! browser throws on `querySelectorAll` with bad syntax.

use crate::document::Document;
use crate::errors::SelectorError;
use crate::model::NodeId;

/// Parsed selector group list (`a, b > c`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<ComplexSelector>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ComplexSelector {
    /// Leftmost compound first
    parts: Vec<SelectorPart>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct SelectorPart {
    compound: Compound,
    /// Relation to the part on the left
    combinator: Option<Combinator>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrCondition>,
    pseudos: Vec<PseudoClass>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudos.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Match {
        name: String,
        op: AttrOp,
        value: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum PseudoClass {
    NthChild(Nth),
    FirstChild,
    LastChild,
    OnlyChild,
}

/// `An+B` formula over 1-based child positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Nth {
    a: i64,
    b: i64,
}

impl Nth {
    fn matches(&self, index: i64) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        // widened: coefficients come from untrusted stored paths
        let diff = i128::from(index) - i128::from(self.b);
        let a = i128::from(self.a);
        diff % a == 0 && diff / a >= 0
    }
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        Parser::new(selector).parse_list()
    }

    pub(crate) fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|group| group.matches_at(doc, node, group.parts.len() - 1))
    }
}

impl ComplexSelector {
    fn matches_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        let part = &self.parts[idx];
        if !part.compound.matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match part.combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_at(doc, parent, idx - 1)),
            Combinator::Descendant => {
                let mut cursor = doc.parent(node);
                while let Some(ancestor) = cursor {
                    if self.matches_at(doc, ancestor, idx - 1) {
                        return true;
                    }
                    cursor = doc.parent(ancestor);
                }
                false
            }
            Combinator::NextSibling => doc
                .previous_element_sibling(node)
                .is_some_and(|prev| self.matches_at(doc, prev, idx - 1)),
            Combinator::SubsequentSibling => {
                let mut cursor = doc.previous_element_sibling(node);
                while let Some(prev) = cursor {
                    if self.matches_at(doc, prev, idx - 1) {
                        return true;
                    }
                    cursor = doc.previous_element_sibling(prev);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(data) = doc.element_data(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if data.tag_name != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if data.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| data.has_class(class)) {
            return false;
        }
        let attrs_ok = self.attributes.iter().all(|condition| match condition {
            AttrCondition::Exists(name) => data.attribute(name).is_some(),
            AttrCondition::Match { name, op, value } => data
                .attribute(name)
                .is_some_and(|actual| attr_op_matches(*op, actual, value)),
        });
        if !attrs_ok {
            return false;
        }
        self.pseudos.iter().all(|pseudo| {
            let siblings = doc.element_siblings(node);
            let Some(pos) = siblings.iter().position(|s| *s == node) else {
                return false;
            };
            match pseudo {
                PseudoClass::NthChild(nth) => nth.matches(pos as i64 + 1),
                PseudoClass::FirstChild => pos == 0,
                PseudoClass::LastChild => pos + 1 == siblings.len(),
                PseudoClass::OnlyChild => siblings.len() == 1,
            }
        })
    }
}

fn attr_op_matches(op: AttrOp, actual: &str, expected: &str) -> bool {
    match op {
        AttrOp::Equals => actual == expected,
        AttrOp::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|t| t == expected)
        }
        AttrOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError::new(self.source, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(ch) if ch == expected => Ok(()),
            Some(ch) => Err(self.error(format!("expected '{expected}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn parse_list(mut self) -> Result<SelectorList, SelectorError> {
        let mut groups = Vec::new();
        loop {
            self.skip_ws();
            groups.push(self.parse_complex()?);
            self.skip_ws();
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(ch) => return Err(self.error(format!("unexpected character '{ch}'"))),
            }
        }
        Ok(SelectorList { groups })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut parts = vec![SelectorPart {
            compound: self.parse_compound()?,
            combinator: None,
        }];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(ch) => return Err(self.error(format!("unexpected character '{ch}'"))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            parts.push(SelectorPart {
                compound: self.parse_compound()?,
                combinator: Some(combinator),
            });
        }
        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.universal = true;
        } else if self.at_ident_start() {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    let id = self.parse_ident()?;
                    if compound.id.replace(id).is_some() {
                        return Err(self.error("more than one id in a compound selector"));
                    }
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.parse_pseudo()?);
                }
                None | Some(',' | '>' | '+' | '~') => break,
                Some(ch) if ch.is_whitespace() => break,
                Some('*') => return Err(self.error("misplaced universal selector")),
                Some(ch) if compound.is_empty() => {
                    return Err(self.error(format!("unexpected character '{ch}'")))
                }
                Some(ch) => {
                    return Err(self.error(format!("unexpected character '{ch}' in compound selector")))
                }
            }
        }

        if compound.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttrCondition, SelectorError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.bump() {
            Some(']') => return Ok(AttrCondition::Exists(name)),
            Some('=') => AttrOp::Equals,
            Some(prefix @ ('~' | '|' | '^' | '$' | '*')) => {
                self.expect('=')?;
                match prefix {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            Some(ch) => return Err(self.error(format!("unexpected '{ch}' in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(quote)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(AttrCondition::Match { name, op, value })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements are not supported"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(PseudoClass::FirstChild),
            "last-child" => Ok(PseudoClass::LastChild),
            "only-child" => Ok(PseudoClass::OnlyChild),
            "nth-child" => {
                self.expect('(')?;
                let start = self.pos;
                while self.peek().is_some_and(|ch| ch != ')') {
                    self.pos += 1;
                }
                let argument: String = self.chars[start..self.pos].iter().collect();
                self.expect(')')?;
                Ok(PseudoClass::NthChild(self.parse_nth(&argument)?))
            }
            other => Err(self.error(format!("unsupported pseudo-class ':{other}'"))),
        }
    }

    fn parse_nth(&self, argument: &str) -> Result<Nth, SelectorError> {
        let compact: String = argument
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let invalid = || self.error(format!("invalid :nth-child argument '{argument}'"));
        match compact.as_str() {
            "" => return Err(invalid()),
            "odd" => return Ok(Nth { a: 2, b: 1 }),
            "even" => return Ok(Nth { a: 2, b: 0 }),
            _ => {}
        }
        let Some((a_part, b_part)) = compact.split_once('n') else {
            let b = parse_signed(&compact).ok_or_else(invalid)?;
            return Ok(Nth { a: 0, b });
        };
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            other => parse_signed(other).ok_or_else(invalid)?,
        };
        let b = if b_part.is_empty() {
            0
        } else if b_part.starts_with(['+', '-']) {
            parse_signed(b_part).ok_or_else(invalid)?
        } else {
            return Err(invalid());
        };
        Ok(Nth { a, b })
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(ch) if ch == quote => return Ok(out),
                Some('\\') => match self.peek() {
                    None => return Err(self.error("unterminated string")),
                    Some('\n') => self.pos += 1,
                    Some(_) => out.push(self.parse_escape()?),
                },
                Some('\n') => return Err(self.error("newline in string")),
                Some(ch) => out.push(ch),
            }
        }
    }

    fn at_ident_start(&self) -> bool {
        match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some('-'), Some('-'), _) => true,
            (Some('-'), Some(next), after) => {
                is_name_start(next) || (next == '\\' && after.is_some_and(|c| c != '\n'))
            }
            (Some('\\'), Some(next), _) => next != '\n',
            (Some(ch), _, _) => is_name_start(ch),
            (None, _, _) => false,
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        if !self.at_ident_start() {
            return Err(match self.peek() {
                Some(ch) => self.error(format!("expected identifier, found '{ch}'")),
                None => self.error("expected identifier, found end of input"),
            });
        }
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                out.push(self.parse_escape()?);
            } else if is_name_char(ch) {
                self.pos += 1;
                out.push(ch);
            } else {
                break;
            }
        }
        Ok(out)
    }

    /// Called with the cursor just past a backslash.
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let mut hex = String::new();
        while hex.len() < 6 && self.peek().is_some_and(|ch| ch.is_ascii_hexdigit()) {
            hex.push(self.chars[self.pos]);
            self.pos += 1;
        }
        if hex.is_empty() {
            return match self.bump() {
                Some('\n') | None => Err(self.error("invalid escape")),
                Some(ch) => Ok(ch),
            };
        }
        if self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        let code = u32::from_str_radix(&hex, 16).map_err(|_| self.error("invalid escape"))?;
        Ok(match char::from_u32(code) {
            Some(ch) if code != 0 => ch,
            _ => '\u{fffd}',
        })
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start(ch) || ch.is_ascii_digit() || ch == '-'
}

fn parse_signed(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('+').unwrap_or(text);
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse_html(
            r#"<body>
                <ul id="list" class="items">
                  <li class="item first">one</li>
                  <li class="item" data-testid="row-2">two</li>
                  <li class="item last" lang="en-US">three</li>
                </ul>
                <p class="note">tail</p>
              </body>"#,
        )
        .unwrap()
    }

    fn tags(doc: &Document, selector: &str) -> Vec<String> {
        doc.query_selector_all(selector)
            .unwrap()
            .into_iter()
            .map(|n| doc.element(n).unwrap().text_content())
            .collect()
    }

    #[test]
    fn test_compound_selectors() {
        let doc = doc();
        assert_eq!(tags(&doc, "li.item.first"), vec!["one"]);
        assert_eq!(tags(&doc, r#"li[data-testid="row-2"]"#), vec!["two"]);
        assert_eq!(tags(&doc, "li[data-testid=row-2]"), vec!["two"]);
        assert_eq!(tags(&doc, "[lang|=en]"), vec!["three"]);
        assert_eq!(tags(&doc, "li[class~=last]"), vec!["three"]);
        assert_eq!(tags(&doc, "LI:nth-child(2)"), vec!["two"]);
        assert_eq!(tags(&doc, "li:nth-child(odd)"), vec!["one", "three"]);
        assert_eq!(tags(&doc, "li:nth-child(-n+2)"), vec!["one", "two"]);
        assert_eq!(tags(&doc, "li:last-child"), vec!["three"]);
    }

    #[test]
    fn test_combinators() {
        let doc = doc();
        assert_eq!(tags(&doc, "body > ul > li:nth-child(3)"), vec!["three"]);
        assert_eq!(tags(&doc, "body li.first"), vec!["one"]);
        assert_eq!(tags(&doc, "li.first + li"), vec!["two"]);
        assert_eq!(tags(&doc, "li.first ~ li"), vec!["two", "three"]);
        assert_eq!(tags(&doc, "ul>li:first-child"), vec!["one"]);
        assert!(tags(&doc, "p > li").is_empty());
    }

    #[test]
    fn test_groups_keep_document_order() {
        let doc = doc();
        assert_eq!(tags(&doc, "p.note, li.first"), vec!["one", "tail"]);
    }

    #[test]
    fn test_descendant_backtracks() {
        let doc = Document::parse_html(
            r#"<div class="a"><div class="b"><div><span>x</span></div></div></div>"#,
        )
        .unwrap();
        assert_eq!(tags(&doc, ".a > .b span"), vec!["x"]);
        assert_eq!(tags(&doc, ".a div > span"), vec!["x"]);
    }

    #[test]
    fn test_nth_formula() {
        let nth = Nth { a: 3, b: -1 };
        assert!(nth.matches(2));
        assert!(nth.matches(5));
        assert!(!nth.matches(3));
        assert!(Nth { a: -1, b: 3 }.matches(1));
        assert!(!Nth { a: -1, b: 3 }.matches(4));
    }

    #[test]
    fn test_nth_extreme_coefficients() {
        assert!(Nth { a: 1, b: i64::MIN }.matches(1));
        assert!(!Nth { a: -1, b: i64::MIN }.matches(1));
        assert!(!Nth { a: i64::MIN, b: i64::MAX }.matches(1));
        assert!(!Nth { a: 0, b: i64::MAX }.matches(1));

        let doc = doc();
        assert_eq!(
            tags(&doc, "li:nth-child(n-9223372036854775808)"),
            vec!["one", "two", "three"]
        );
        assert!(tags(&doc, "li:nth-child(-n-9223372036854775808)").is_empty());
        assert!(tags(&doc, "li:nth-child(-9223372036854775808n+9223372036854775807)").is_empty());
        assert!(doc.query_selector_all("li:nth-child(99999999999999999999)").is_err());
    }

    #[test]
    fn test_escaped_identifiers() {
        let doc = Document::parse_html(r#"<div class="hover:bg-blue w-1/2">x</div>"#).unwrap();
        assert_eq!(tags(&doc, r"div.hover\:bg-blue.w-1\/2"), vec!["x"]);
    }

    #[test]
    fn test_malformed_selectors_are_errors() {
        let doc = doc();
        for selector in [
            "",
            "   ",
            "div.",
            "div.hover:bg-blue",
            "div.w-1/2",
            ".2col",
            "#-1",
            "li[data-testid=\"a\"b\"]",
            "li[data-testid=\"open",
            "li:nth-child(x)",
            "li:nth-child(2n 1)",
            "li::before",
            "li,",
            "> li",
            "li >",
            "li#a#b",
            "li*",
        ] {
            let result = doc.query_selector_all(selector);
            assert!(result.is_err(), "expected error for {selector:?}");
        }
    }

    #[test]
    fn test_error_carries_selector() {
        let err = SelectorList::parse("button.a/b").unwrap_err();
        assert_eq!(err.selector, "button.a/b");
        assert!(err.reason.contains('/'));
    }
}
