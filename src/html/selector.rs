//! CSS selector parsing and matching.
//!
//! Covers the selector syntax people actually type into an editor call:
//! type, universal, id, class and attribute selectors, the four
//! combinators, and the tree-structural and logical pseudo-classes.
//! Matching runs right to left from a candidate element, backtracking
//! through ancestors for the descendant combinator.

use markup5ever_rcdom::Handle;

use super::node;

/// Selector syntax error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct SelectorError {
    message: String,
    position: usize,
}

/// Comma-separated list of complex selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored left to right.
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, PartialEq)]
struct CompoundSelector {
    components: Vec<SelectorComponent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq)]
enum SelectorComponent {
    Universal,
    Type(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClass),
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeSelector {
    name: String,
    matcher: Option<AttributeMatcher>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeMatcher {
    /// `[attr=value]`
    Exact(String),
    /// `[attr~=value]`
    Includes(String),
    /// `[attr|=value]`
    DashMatch(String),
    /// `[attr^=value]`
    Prefix(String),
    /// `[attr$=value]`
    Suffix(String),
    /// `[attr*=value]`
    Substring(String),
}

#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Not(SelectorList),
    Is(SelectorList),
    Checked,
    Disabled,
    Enabled,
}

/// `An+B` expression of the `:nth-*` pseudo-classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NthExpression {
    a: i32,
    b: i32,
}

const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list(false)
    }

    /// Whether `element` matches any selector in the list.
    pub fn matches(&self, element: &Handle) -> bool {
        self.selectors.iter().any(|selector| selector.matches(element))
    }

    /// First matching element below `root` in document order.
    pub fn query_first(&self, root: &Handle) -> Option<Handle> {
        let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
        while let Some(current) = stack.pop() {
            if node::is_element(&current) && self.matches(&current) {
                return Some(current);
            }
            stack.extend(current.children.borrow().iter().rev().cloned());
        }
        None
    }
}

impl ComplexSelector {
    fn matches(&self, element: &Handle) -> bool {
        self.matches_at(self.compounds.len() - 1, element)
    }

    fn matches_at(&self, index: usize, element: &Handle) -> bool {
        if !self.compounds[index].matches(element) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = index - 1;
        match self.combinators[next] {
            Combinator::Child => {
                node::parent_element(element).is_some_and(|parent| self.matches_at(next, &parent))
            }
            Combinator::Descendant => {
                let mut ancestor = node::parent_element(element);
                while let Some(current) = ancestor {
                    if self.matches_at(next, &current) {
                        return true;
                    }
                    ancestor = node::parent_element(&current);
                }
                false
            }
            Combinator::NextSibling => node::previous_element_siblings(element)
                .first()
                .is_some_and(|sibling| self.matches_at(next, sibling)),
            Combinator::SubsequentSibling => node::previous_element_siblings(element)
                .iter()
                .any(|sibling| self.matches_at(next, sibling)),
        }
    }
}

impl CompoundSelector {
    fn matches(&self, element: &Handle) -> bool {
        self.components
            .iter()
            .all(|component| component.matches(element))
    }
}

impl SelectorComponent {
    fn matches(&self, element: &Handle) -> bool {
        match self {
            Self::Universal => node::is_element(element),
            Self::Type(tag) => {
                node::local_name(element).is_some_and(|name| name.eq_ignore_ascii_case(tag))
            }
            Self::Id(id) => node::attribute(element, "id").is_some_and(|value| value == *id),
            Self::Class(class) => node::attribute(element, "class")
                .is_some_and(|value| value.split_whitespace().any(|c| c == class.as_str())),
            Self::Attribute(selector) => {
                selector.matches(node::attribute(element, &selector.name).as_deref())
            }
            Self::PseudoClass(pseudo) => pseudo.matches(element),
        }
    }
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(value)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };
        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_owned()
            }
        };
        let value = fold(value);
        match matcher {
            AttributeMatcher::Exact(expected) => value == fold(expected),
            AttributeMatcher::Includes(expected) => {
                let expected = fold(expected);
                !expected.is_empty() && value.split_whitespace().any(|word| word == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                value == expected || value.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && value.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && value.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && value.contains(&fold(expected))
            }
        }
    }
}

impl PseudoClass {
    fn matches(&self, element: &Handle) -> bool {
        match self {
            Self::Root => node::parent(element).is_some_and(|parent| node::is_document(&parent)),
            Self::Empty => element.children.borrow().iter().all(|child| {
                !node::is_element(child) && node::text_content(child).is_empty()
            }),
            Self::FirstChild => sibling_position(element, false).0 == 1,
            Self::LastChild => {
                let (position, count) = sibling_position(element, false);
                position == count
            }
            Self::OnlyChild => sibling_position(element, false).1 == 1,
            Self::FirstOfType => sibling_position(element, true).0 == 1,
            Self::LastOfType => {
                let (position, count) = sibling_position(element, true);
                position == count
            }
            Self::OnlyOfType => sibling_position(element, true).1 == 1,
            Self::NthChild(expr) => expr.matches(sibling_position(element, false).0),
            Self::NthLastChild(expr) => {
                let (position, count) = sibling_position(element, false);
                expr.matches(count - position + 1)
            }
            Self::NthOfType(expr) => expr.matches(sibling_position(element, true).0),
            Self::NthLastOfType(expr) => {
                let (position, count) = sibling_position(element, true);
                expr.matches(count - position + 1)
            }
            Self::Not(list) => !list.matches(element),
            Self::Is(list) => list.matches(element),
            Self::Checked => {
                node::has_attribute(element, "checked")
                    || (node::local_name(element) == Some("option")
                        && node::has_attribute(element, "selected"))
            }
            Self::Disabled => is_form_control(element) && node::has_attribute(element, "disabled"),
            Self::Enabled => is_form_control(element) && !node::has_attribute(element, "disabled"),
        }
    }
}

fn is_form_control(element: &Handle) -> bool {
    node::local_name(element).is_some_and(|name| FORM_CONTROLS.contains(&name))
}

/// 1-based position of `element` among its element siblings and the sibling
/// count, optionally restricted to siblings with the same tag name.
fn sibling_position(element: &Handle, same_type: bool) -> (i32, i32) {
    let (siblings, index) = node::element_siblings(element);
    if !same_type {
        return (to_i32(index + 1), to_i32(siblings.len()));
    }
    let tag = node::local_name(element);
    let mut position = 0;
    let mut count = 0;
    for (i, sibling) in siblings.iter().enumerate() {
        if node::local_name(sibling) == tag {
            count += 1;
            if i <= index {
                position = count;
            }
        }
    }
    (position, count)
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl NthExpression {
    /// Parse `odd`, `even`, `3`, `2n`, `2n+1`, `-n+3` and friends.
    fn parse(s: &str) -> Option<Self> {
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let s = s.to_ascii_lowercase();
        match s.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }
        if let Ok(b) = s.parse::<i32>() {
            return Some(Self { a: 0, b });
        }
        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            coefficient => coefficient.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with('+') || rest.starts_with('-') {
            rest.parse().ok()?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Whether 1-based index `n` is selected.
    ///
    /// Evaluated in `i64` so that coefficients near the `i32` limits can
    /// neither overflow nor hit `MIN % -1`.
    fn matches(self, n: i32) -> bool {
        let (a, b, n) = (i64::from(self.a), i64::from(self.b), i64::from(n));
        if a == 0 {
            return n == b;
        }
        let diff = n - b;
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError {
            message: message.into(),
            position: self.pos,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    /// Parse a selector list. `nested` lists end at `)` instead of end of input.
    fn parse_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(')') if nested => break,
                None if !nested => break,
                None => return Err(self.error("unterminated pseudo-class argument")),
                Some(c) => return Err(self.error(format!("unexpected character {c:?}"))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',' | ')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected character {c:?}"))),
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                let tag = self.parse_ident()?;
                components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            let component = match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    SelectorComponent::Id(self.parse_ident()?)
                }
                Some('.') => {
                    self.pos += 1;
                    SelectorComponent::Class(self.parse_ident()?)
                }
                Some('[') => SelectorComponent::Attribute(self.parse_attribute()?),
                Some(':') => SelectorComponent::PseudoClass(self.parse_pseudo_class()?),
                _ => break,
            };
            components.push(component);
        }
        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected selector, found {c:?}")),
                None => self.error("expected selector"),
            });
        }
        Ok(CompoundSelector { components })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                let escaped = self
                    .bump()
                    .ok_or_else(|| self.error("dangling escape"))?;
                ident.push(escaped);
            } else if is_ident_char(c) {
                self.pos += 1;
                ident.push(c);
            } else {
                break;
            }
        }
        if ident.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| self.error("dangling escape"))?;
                    value.push(escaped);
                }
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.expect('[')?;
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.pos += 1;
                self.expect('=')?;
                c
            }
            Some(c) => return Err(self.error(format!("unexpected character {c:?} in attribute selector"))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_string(quote)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.pos += 1;
                case_insensitive = true;
                self.skip_whitespace();
            }
            Some('s' | 'S') => {
                self.pos += 1;
                self.skip_whitespace();
            }
            _ => {}
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Includes(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo_class(&mut self) -> Result<PseudoClass, SelectorError> {
        self.expect(':')?;
        if self.peek() == Some(':') {
            return Err(self.error("pseudo-elements never match elements"));
        }
        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.peek() != Some('(') {
            return match name.as_str() {
                "root" => Ok(PseudoClass::Root),
                "empty" => Ok(PseudoClass::Empty),
                "first-child" => Ok(PseudoClass::FirstChild),
                "last-child" => Ok(PseudoClass::LastChild),
                "only-child" => Ok(PseudoClass::OnlyChild),
                "first-of-type" => Ok(PseudoClass::FirstOfType),
                "last-of-type" => Ok(PseudoClass::LastOfType),
                "only-of-type" => Ok(PseudoClass::OnlyOfType),
                "checked" => Ok(PseudoClass::Checked),
                "disabled" => Ok(PseudoClass::Disabled),
                "enabled" => Ok(PseudoClass::Enabled),
                _ => Err(self.error(format!("unsupported pseudo-class :{name}"))),
            };
        }

        self.pos += 1;
        let pseudo = match name.as_str() {
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c != ')') {
                    self.pos += 1;
                }
                let arg: String = self.chars[start..self.pos].iter().collect();
                let expr = NthExpression::parse(&arg)
                    .ok_or_else(|| self.error(format!("invalid :{name}() argument {arg:?}")))?;
                match name.as_str() {
                    "nth-child" => PseudoClass::NthChild(expr),
                    "nth-last-child" => PseudoClass::NthLastChild(expr),
                    "nth-of-type" => PseudoClass::NthOfType(expr),
                    _ => PseudoClass::NthLastOfType(expr),
                }
            }
            "not" => PseudoClass::Not(self.parse_list(true)?),
            "is" | "where" => PseudoClass::Is(self.parse_list(true)?),
            _ => return Err(self.error(format!("unsupported pseudo-class :{name}()"))),
        };
        self.expect(')')?;
        Ok(pseudo)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
