/// A node of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Top level of the pattern.
    Root(Body),
    Group(Group),
    /// Zero-width assertion; never produces output.
    Position(Position),
    /// Character class, including the predefined `\w`, `\d`, `\s` and `.`.
    Set(Set),
    /// Contiguous codepoint interval, only meaningful inside a [`Set`].
    Range { from: u32, to: u32 },
    Repetition(Repetition),
    /// Backreference to a capturing group, 1-based.
    Reference(usize),
    Char(u32),
}

/// Contents of a root or group: a plain sequence, or alternatives once a `|`
/// has been seen at that depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Sequence(Vec<Node>),
    Alternation(Vec<Vec<Node>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub body: Body,
    /// Group number for capturing groups, `None` for `(?:`, `(?=` and `(?!`.
    pub index: Option<usize>,
    pub lookahead: Lookahead,
}

impl Group {
    pub fn is_capturing(&self) -> bool {
        self.index.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookahead {
    #[default]
    None,
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Start,
    End,
    WordBoundary,
    NonWordBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    /// `Char`, `Range` or nested `Set` nodes.
    pub members: Vec<Node>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    pub min: u32,
    /// `None` when unbounded (`*`, `+`, `{n,}`).
    pub max: Option<u32>,
    pub node: Box<Node>,
}

impl Node {
    pub fn char(c: char) -> Node {
        Node::Char(c as u32)
    }

    /// Number of nodes in the tree rooted here.
    pub fn size(&self) -> usize {
        let body_size = |body: &Body| match body {
            Body::Sequence(nodes) => nodes.iter().map(Node::size).sum::<usize>(),
            Body::Alternation(options) => options.iter().flatten().map(Node::size).sum(),
        };
        1 + match self {
            Node::Root(body) => body_size(body),
            Node::Group(group) => body_size(&group.body),
            Node::Set(set) => set.members.iter().map(Node::size).sum(),
            Node::Repetition(rep) => rep.node.size(),
            _ => 0,
        }
    }
}

fn set(members: Vec<Node>, negated: bool) -> Node {
    Node::Set(Set { members, negated })
}

/// `[0-9]`, or `[^0-9]` when negated.
pub fn digit(negated: bool) -> Node {
    set(vec![Node::Range { from: 48, to: 57 }], negated)
}

/// `[_a-zA-Z0-9]`, or its negation.
pub fn word(negated: bool) -> Node {
    set(
        vec![
            Node::Char(95),
            Node::Range { from: 97, to: 122 },
            Node::Range { from: 65, to: 90 },
            Node::Range { from: 48, to: 57 },
        ],
        negated,
    )
}

/// Whitespace and line terminators matched by `\s`, or their negation.
pub fn whitespace(negated: bool) -> Node {
    set(
        vec![
            Node::Char(9),
            Node::Char(10),
            Node::Char(11),
            Node::Char(12),
            Node::Char(13),
            Node::Char(32),
            Node::Char(160),
            Node::Char(5760),
            Node::Range { from: 8192, to: 8202 },
            Node::Char(8232),
            Node::Char(8233),
            Node::Char(8239),
            Node::Char(8287),
            Node::Char(12288),
            Node::Char(65279),
        ],
        negated,
    )
}

/// `.`: anything but a line terminator.
pub fn any_char() -> Node {
    set(
        vec![
            Node::Char(10),
            Node::Char(13),
            Node::Char(8232),
            Node::Char(8233),
        ],
        true,
    )
}
