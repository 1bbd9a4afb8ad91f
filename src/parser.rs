use std::mem;

use crate::ast::{self, Body, Group, Lookahead, Node, Position, Repetition, Set};
use crate::error::{ParseError, ParseErrorKind};
use crate::escape;

/// A root or group whose closing token has not been seen yet.
#[derive(Default)]
struct Frame {
    index: Option<usize>,
    lookahead: Lookahead,
    /// Finished alternatives, filled once a `|` is seen.
    options: Vec<Vec<Node>>,
    /// The alternative currently being read.
    nodes: Vec<Node>,
}

impl Frame {
    fn group(index: Option<usize>, lookahead: Lookahead) -> Self {
        Self {
            index,
            lookahead,
            ..Self::default()
        }
    }

    fn alternate(&mut self) {
        self.options.push(mem::take(&mut self.nodes));
    }

    fn into_body(mut self) -> Body {
        if self.options.is_empty() {
            Body::Sequence(self.nodes)
        } else {
            self.options.push(self.nodes);
            Body::Alternation(self.options)
        }
    }

    fn into_group(self) -> Node {
        let (index, lookahead) = (self.index, self.lookahead);
        Node::Group(Group {
            body: self.into_body(),
            index,
            lookahead,
        })
    }
}

/// Parser for regular expressions.
///
/// The pattern is escape-decoded up front; columns in errors refer to the
/// decoded text. Open groups are kept on an explicit stack and turned into
/// nodes when their `)` is read.
pub struct Parser<'a> {
    pub pattern: &'a str,
    pub pos: usize,
    chars: Vec<char>,
    next_group_index: usize,
    current: Frame,
    parents: Vec<Frame>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given pattern.
    pub fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            pos: 0,
            chars: escape::decode(pattern).chars().collect(),
            next_group_index: 1,
            current: Frame::default(),
            parents: Vec::new(),
        }
    }

    /// Allocate the number of the next capturing group.
    fn alloc_group_index(&mut self) -> usize {
        let index = self.next_group_index;
        self.next_group_index += 1;
        index
    }

    /// Peek at the next character in the pattern without advancing.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Advance the parser by one character and return it.
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.pattern, kind)
    }

    fn push(&mut self, node: Node) {
        self.current.nodes.push(node);
    }

    /// Entry point for parsing a regex pattern.
    ///
    /// Example:
    /// - Pattern: `ab`  → Root(Sequence([Char('a'), Char('b')]))
    /// - Pattern: `a|b` → Root(Alternation([[Char('a')], [Char('b')]]))
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        while let Some(c) = self.advance() {
            match c {
                '\\' => {
                    let node = self.parse_escape();
                    self.push(node);
                }
                '^' => self.push(Node::Position(Position::Start)),
                '$' => self.push(Node::Position(Position::End)),
                '[' => {
                    let node = self.parse_class()?;
                    self.push(node);
                }
                '.' => self.push(ast::any_char()),
                '(' => self.open_group()?,
                ')' => self.close_group()?,
                '|' => self.current.alternate(),
                '{' => self.parse_brace()?,
                '?' => self.repeat(0, Some(1))?,
                '+' => self.repeat(1, None)?,
                '*' => self.repeat(0, None)?,
                c => self.push(Node::char(c)),
            }
        }

        if !self.parents.is_empty() {
            return Err(self.error(ParseErrorKind::UnterminatedGroup));
        }
        Ok(Node::Root(mem::take(&mut self.current).into_body()))
    }

    /// Parse the character after a `\`.
    ///
    /// Examples:
    /// - `\b` → Position(WordBoundary)
    /// - `\d` → Set([Range(48, 57)])
    /// - `\1` → Reference(1)
    /// - `\.` → Char('.')
    fn parse_escape(&mut self) -> Node {
        match self.advance() {
            Some('b') => Node::Position(Position::WordBoundary),
            Some('B') => Node::Position(Position::NonWordBoundary),
            Some(c) if c.is_ascii_digit() => Node::Reference(c as usize - '0' as usize),
            Some(c) => shorthand_set(c).unwrap_or_else(|| Node::char(c)),
            None => Node::char('\\'), // Lone backslash at end
        }
    }

    /// Parse a character class after its `[`.
    ///
    /// Examples:
    /// - `[abc]`  → Set { members: [Char('a'), Char('b'), Char('c')], negated: false }
    /// - `[^0-9]` → Set { members: [Range(48, 57)], negated: true }
    fn parse_class(&mut self) -> Result<Node, ParseError> {
        let negated = self.peek() == Some('^');
        if negated {
            self.advance();
        }
        let (members, consumed) = class_body(&self.chars[self.pos..])
            .ok_or_else(|| self.error(ParseErrorKind::UnterminatedClass))?;
        self.pos += consumed;
        Ok(Node::Set(Set { members, negated }))
    }

    /// Open a group after its `(`, reading `?:`, `?=` or `?!` if present.
    fn open_group(&mut self) -> Result<(), ParseError> {
        let mut lookahead = Lookahead::None;
        let mut capturing = true;
        if self.peek() == Some('?') {
            self.advance();
            match self.advance() {
                Some('=') => lookahead = Lookahead::Positive,
                Some('!') => lookahead = Lookahead::Negative,
                Some(':') | None => {}
                Some(character) => {
                    return Err(self.error(ParseErrorKind::InvalidGroup {
                        character,
                        column: self.pos - 1,
                    }));
                }
            }
            capturing = false;
        }
        let index = capturing.then(|| self.alloc_group_index());
        let parent = mem::replace(&mut self.current, Frame::group(index, lookahead));
        self.parents.push(parent);
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), ParseError> {
        let Some(parent) = self.parents.pop() else {
            return Err(self.error(ParseErrorKind::UnmatchedParen(self.pos - 1)));
        };
        let group = mem::replace(&mut self.current, parent);
        self.push(group.into_group());
        Ok(())
    }

    /// Parse `{min}`, `{min,}` or `{min,max}` after its `{`. Anything else
    /// leaves the `{` as a literal character.
    fn parse_brace(&mut self) -> Result<(), ParseError> {
        match quantifier(&self.chars[self.pos..]) {
            Some((min, max, consumed)) => {
                self.repeat(min, max)?;
                self.pos += consumed;
                Ok(())
            }
            None => {
                self.push(Node::char('{'));
                Ok(())
            }
        }
    }

    /// Wrap the previous node in a repetition. The quantifier has just been
    /// consumed, so its column is `pos - 1`.
    fn repeat(&mut self, min: u32, max: Option<u32>) -> Result<(), ParseError> {
        let Some(node) = self.current.nodes.pop() else {
            return Err(self.error(ParseErrorKind::NothingToRepeat(self.pos - 1)));
        };
        self.push(Node::Repetition(Repetition {
            min,
            max,
            node: Box::new(node),
        }));
        Ok(())
    }
}

/// `\w`, `\d`, `\s` and their upper-case negations.
fn shorthand_set(c: char) -> Option<Node> {
    match c {
        'w' => Some(ast::word(false)),
        'W' => Some(ast::word(true)),
        'd' => Some(ast::digit(false)),
        'D' => Some(ast::digit(true)),
        's' => Some(ast::whitespace(false)),
        'S' => Some(ast::whitespace(true)),
        _ => None,
    }
}

/// Read a class body up to and including its closing `]`.
///
/// Returns the members and the number of characters consumed, or `None` if
/// the input ends first.
///
/// Example:
/// - `a-z0-9]` → ([Range(97, 122), Range(48, 57)], 8)
pub(crate) fn class_body(chars: &[char]) -> Option<(Vec<Node>, usize)> {
    let mut members = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let rest = &chars[i..];
        if let ['\\', e, ..] = rest {
            if let Some(set) = shorthand_set(*e) {
                members.push(set);
                i += 2;
                continue;
            }
        }
        if let Some((range, len)) = class_range(rest) {
            members.push(range);
            i += len;
            continue;
        }
        match rest {
            [']', ..] => return Some((members, i + 1)),
            ['\\', c, ..] => {
                members.push(Node::char(*c));
                i += 2;
            }
            [c, ..] => {
                members.push(Node::char(*c));
                i += 1;
            }
            [] => break,
        }
    }
    None
}

/// Read `X-Y` where either end may be escaped.
fn class_range(rest: &[char]) -> Option<(Node, usize)> {
    let (from, mut len) = match rest {
        ['\\', c, ..] => (*c, 2),
        [c, ..] if *c != ']' && *c != '\\' => (*c, 1),
        _ => return None,
    };
    if rest.get(len) != Some(&'-') {
        return None;
    }
    len += 1;
    let to = match &rest[len..] {
        ['\\', c, ..] if *c != ']' => {
            len += 2;
            *c
        }
        [c, ..] if *c != ']' => {
            len += 1;
            *c
        }
        _ => return None,
    };
    Some((
        Node::Range {
            from: from as u32,
            to: to as u32,
        },
        len,
    ))
}

/// Read `min}`, `min,}` or `min,max}`, returning the bounds and the number of
/// characters consumed.
fn quantifier(chars: &[char]) -> Option<(u32, Option<u32>, usize)> {
    let digits = |from: usize| {
        chars
            .get(from..)
            .map_or(0, |s| s.iter().take_while(|c| c.is_ascii_digit()).count())
    };
    let number = |from: usize, len: usize| -> Option<u32> {
        chars[from..from + len].iter().collect::<String>().parse().ok()
    };

    let len = digits(0);
    if len == 0 {
        return None;
    }
    let min = number(0, len)?;
    let mut i = len;
    let max = if chars.get(i) == Some(&',') {
        i += 1;
        let len = digits(i);
        if len == 0 {
            None
        } else {
            let max = number(i, len)?;
            i += len;
            Some(max)
        }
    } else {
        Some(min)
    };
    if chars.get(i) != Some(&'}') {
        return None;
    }
    Some((min, max, i + 1))
}
