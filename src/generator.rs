use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ast::{Body, Lookahead, Node, Set};
use crate::error::GenerationError;
use crate::random::{self, RandomSource};
use crate::range_set::RangeSet;

/// How many picks a set gets to land on a valid `char` before giving up.
const MAX_CODEPOINT_ROUNDS: usize = 100;

/// Settings that shape generated strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Extra repetitions allowed above `min` for `*`, `+` and `{n,}`.
    pub max_repetition: u32,
    /// Every generated codepoint from a character class falls in this set,
    /// negated classes included.
    pub char_range: RangeSet,
    /// Randomly flip the case of ASCII letters.
    pub ignore_case: bool,
    /// Draw from the per-process seed so repeated calls give the same output.
    pub fixed_seed: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_repetition: 10,
            char_range: RangeSet::from_range((32, 126)),
            ignore_case: false,
            fixed_seed: false,
        }
    }
}

impl GeneratorConfig {
    /// Build a config from flag letters: `i` ignores case, `f` fixes the seed.
    /// Other letters are ignored.
    pub fn from_flags(flags: &str) -> Self {
        Self {
            ignore_case: flags.contains('i'),
            fixed_seed: flags.contains('f'),
            ..Self::default()
        }
    }
}

/// Group number → text the group produced during the current generation.
type Captures = HashMap<usize, String>;

/// Generate a random string matched by `node`.
///
/// Uses the thread-local generator, or a generator seeded from
/// [`random::process_seed`] when `config.fixed_seed` is set.
pub fn generate(node: &Node, config: &GeneratorConfig) -> Result<String, GenerationError> {
    if config.fixed_seed {
        generate_with(node, config, &mut random::fixed_rng())
    } else {
        generate_with(node, config, &mut rand::thread_rng())
    }
}

/// Generate a random string matched by `node`, drawing choices from `rng`.
pub fn generate_with<R: RandomSource + ?Sized>(
    node: &Node,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<String, GenerationError> {
    let mut captures = Captures::new();
    let output = Renderer { config, rng }.render(node, &mut captures)?;
    debug!(chars = output.chars().count(), groups = captures.len(), "generated string");
    Ok(output)
}

struct Renderer<'a, R: ?Sized> {
    config: &'a GeneratorConfig,
    rng: &'a mut R,
}

impl<R: RandomSource + ?Sized> Renderer<'_, R> {
    fn render(&mut self, node: &Node, captures: &mut Captures) -> Result<String, GenerationError> {
        match node {
            Node::Root(body) => self.render_body(body, captures),
            Node::Group(group) => {
                if group.lookahead != Lookahead::None {
                    return Ok(String::new());
                }
                let text = self.render_body(&group.body, captures)?;
                if let Some(index) = group.index {
                    captures.insert(index, text.clone());
                }
                Ok(text)
            }
            Node::Position(_) => Ok(String::new()),
            Node::Set(set) => self.render_set(set),
            Node::Repetition(rep) => {
                let max = match rep.max {
                    Some(max) => max.max(rep.min),
                    None => rep.min.saturating_add(self.config.max_repetition),
                };
                let count = self.rng.int_in(rep.min.into(), max.into());
                let mut out = String::new();
                for _ in 0..count {
                    out.push_str(&self.render(&rep.node, captures)?);
                }
                Ok(out)
            }
            Node::Reference(index) => Ok(captures.get(index).cloned().unwrap_or_default()),
            Node::Char(code) => {
                let code = if self.config.ignore_case && self.rng.coin() {
                    toggle_case(*code)
                } else {
                    *code
                };
                char::from_u32(code)
                    .map(String::from)
                    .ok_or(GenerationError::NoValidCodepoint)
            }
            Node::Range { .. } => Err(GenerationError::UnknownToken),
        }
    }

    /// Render one alternative of a root or group, picked at random.
    fn render_body(&mut self, body: &Body, captures: &mut Captures) -> Result<String, GenerationError> {
        let nodes = match body {
            Body::Sequence(nodes) => nodes.as_slice(),
            Body::Alternation(options) => {
                let last = options.len().saturating_sub(1) as u64;
                let pick = self.rng.int_in(0, last) as usize;
                options.get(pick).map_or(&[][..], Vec::as_slice)
            }
        };
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.render(node, captures)?);
        }
        Ok(out)
    }

    fn render_set(&mut self, set: &Set) -> Result<String, GenerationError> {
        let allowed = self.expand(set)?;
        if allowed.is_empty() {
            return Ok(String::new());
        }
        for round in 0..MAX_CODEPOINT_ROUNDS {
            let pick = self.rng.int_in(0, allowed.len() - 1);
            if let Some(c) = allowed.index(pick).and_then(char::from_u32) {
                return Ok(c.to_string());
            }
            trace!(round, pick, "picked codepoint is not a char, retrying");
        }
        Err(GenerationError::NoValidCodepoint)
    }

    /// The codepoints a set may produce: its members, folded for case when
    /// ignoring case, then bounded by the configured range.
    fn expand(&self, set: &Set) -> Result<RangeSet, GenerationError> {
        let mut members = RangeSet::new();
        for member in &set.members {
            let part = match member {
                Node::Char(code) => RangeSet::from_range(*code),
                Node::Range { from, to } if from <= to => RangeSet::from_range((*from, *to)),
                Node::Range { .. } => RangeSet::new(),
                Node::Set(nested) => self.expand(nested)?,
                _ => return Err(GenerationError::UnknownToken),
            };
            members.add_set(&part);
            if self.config.ignore_case {
                // Only ASCII letters have another case.
                for code in part.iter().take_while(|&code| code <= u32::from(b'z')) {
                    let other = toggle_case(code);
                    if other != code {
                        members.add(other);
                    }
                }
            }
        }

        let mut allowed = self.config.char_range.clone();
        if set.negated {
            allowed.subtract_set(&members);
        } else {
            allowed.intersect_set(&members);
        }
        Ok(allowed)
    }
}

fn toggle_case(code: u32) -> u32 {
    match char::from_u32(code) {
        Some(c) if c.is_ascii_lowercase() => code - 32,
        Some(c) if c.is_ascii_uppercase() => code + 32,
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, Group, Position, Repetition};
    use crate::parser::Parser;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Always takes the lowest choice and never flips case.
    struct Lowest;

    impl RandomSource for Lowest {
        fn int_in(&mut self, min: u64, _max: u64) -> u64 {
            min
        }

        fn coin(&mut self) -> bool {
            false
        }
    }

    /// Always takes the highest choice and always flips case.
    struct Highest;

    impl RandomSource for Highest {
        fn int_in(&mut self, _min: u64, max: u64) -> u64 {
            max
        }

        fn coin(&mut self) -> bool {
            true
        }
    }

    fn compile(pattern: &str) -> Node {
        Parser::new(pattern).parse().unwrap()
    }

    fn run(pattern: &str, config: &GeneratorConfig, rng: &mut impl RandomSource) -> String {
        generate_with(&compile(pattern), config, rng).unwrap()
    }

    #[test]
    fn test_repetition_bounds() {
        let config = GeneratorConfig::default();
        assert_eq!(run("a{2,5}", &config, &mut Lowest), "aa");
        assert_eq!(run("a{2,5}", &config, &mut Highest), "aaaaa");
        assert_eq!(run("a+", &config, &mut Highest), "a".repeat(11));
        assert_eq!(run("a*", &config, &mut Lowest), "");
    }

    #[test]
    fn test_unbounded_repetition_uses_cap() {
        let config = GeneratorConfig {
            max_repetition: 0,
            ..GeneratorConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(run(".*", &config, &mut rng), "");
        }
        assert_eq!(run("b{3,}", &config, &mut Highest), "bbb");
    }

    #[test]
    fn test_reversed_bounds_use_min() {
        let config = GeneratorConfig::default();
        assert_eq!(run("a{4,2}", &config, &mut Highest), "aaaa");
    }

    #[test]
    fn test_alternation_picks_each_option() {
        let config = GeneratorConfig::default();
        assert_eq!(run("foo|bar|baz", &config, &mut Lowest), "foo");
        assert_eq!(run("foo|bar|baz", &config, &mut Highest), "baz");
    }

    #[test]
    fn test_set_picks_from_ends() {
        let config = GeneratorConfig::default();
        assert_eq!(run("[a-c]", &config, &mut Lowest), "a");
        assert_eq!(run("[a-c]", &config, &mut Highest), "c");
        assert_eq!(run("[^!-~]", &config, &mut Lowest), " ");
    }

    #[test]
    fn test_empty_set_renders_nothing() {
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(run(r"x[^\W\w]y", &config, &mut rng), "xy");
        assert_eq!(run("[\u{100}]", &config, &mut rng), "");
    }

    #[test]
    fn test_lookahead_renders_nothing() {
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            assert_eq!(run("hi(?= no one)", &config, &mut rng), "hi");
            assert_eq!(run("hi(?! no one)", &config, &mut rng), "hi");
        }
    }

    #[test]
    fn test_positions_render_nothing() {
        let config = GeneratorConfig::default();
        assert_eq!(run(r"^a\b$\B", &config, &mut Lowest), "a");
    }

    #[test]
    fn test_backreferences() {
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let out = run(r"(\w{1,4})-\1", &config, &mut rng);
            let (left, right) = out.split_once('-').unwrap();
            assert_eq!(left, right);
        }
        assert_eq!(run(r"(a)(b)\2\1", &config, &mut rng), "abba");
    }

    #[test]
    fn test_missing_references_are_empty() {
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(13);
        assert_eq!(run(r"\1(a)", &config, &mut rng), "a");
        assert_eq!(run(r"(a)\7", &config, &mut rng), "a");
        assert_eq!(run(r"(?:a)\1", &config, &mut rng), "a");
    }

    #[test]
    fn test_captures_do_not_leak_between_runs() {
        let config = GeneratorConfig::default();
        let node = compile(r"\1(a|b)");
        for _ in 0..10 {
            let out = generate_with(&node, &config, &mut Highest).unwrap();
            assert_eq!(out, "b");
        }
    }

    #[test]
    fn test_ignore_case() {
        let config = GeneratorConfig {
            ignore_case: true,
            ..GeneratorConfig::default()
        };
        assert_eq!(run("aB1", &config, &mut Highest), "Ab1");
        assert_eq!(run("aB1", &config, &mut Lowest), "aB1");
        // `[b]` grows to `[Bb]`; the lowest pick is `B`.
        assert_eq!(run("[b]", &config, &mut Lowest), "B");
    }

    #[test]
    fn test_char_range_bounds_negated_sets() {
        let mut config = GeneratorConfig::default();
        config.char_range.subtract((0, 126)).add((127, 0x3ff));
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let out = run("[^a]{10}", &config, &mut rng);
            assert!(out.chars().all(|c| (127..=0x3ff).contains(&(c as u32))), "{out:?}");
        }
        assert_eq!(run("[a-z]", &config, &mut rng), "");
    }

    #[test]
    fn test_surrogates_are_skipped() {
        let config = GeneratorConfig {
            char_range: RangeSet::from_range((0xd800, 0xe000)),
            ..GeneratorConfig::default()
        };
        assert_eq!(run(r"[\s\S]", &config, &mut Highest), "\u{e000}");
        assert_eq!(
            generate_with(&compile(r"[\s\S]"), &config, &mut Lowest),
            Err(GenerationError::NoValidCodepoint)
        );
    }

    #[test]
    fn test_unknown_token() {
        let config = GeneratorConfig::default();
        let bare_range = Node::Range { from: 97, to: 98 };
        assert_eq!(
            generate_with(&bare_range, &config, &mut Lowest),
            Err(GenerationError::UnknownToken)
        );

        let odd_member = Node::Set(Set {
            members: vec![Node::Position(Position::Start)],
            negated: false,
        });
        assert_eq!(
            generate_with(&odd_member, &config, &mut Lowest),
            Err(GenerationError::UnknownToken)
        );
    }

    #[test]
    fn test_hand_built_tree() {
        let node = Node::Root(Body::Sequence(vec![
            Node::Group(Group {
                body: Body::Sequence(vec![Node::Repetition(Repetition {
                    min: 2,
                    max: Some(2),
                    node: Box::new(ast::digit(false)),
                })]),
                index: Some(1),
                lookahead: Lookahead::None,
            }),
            Node::Reference(1),
        ]));
        let config = GeneratorConfig::default();
        assert_eq!(generate_with(&node, &config, &mut Lowest).unwrap(), "0000");
    }

    #[test]
    fn test_from_flags() {
        let config = GeneratorConfig::from_flags("fi");
        assert!(config.ignore_case);
        assert!(config.fixed_seed);
        assert_eq!(config.max_repetition, 10);
        assert_eq!(config.char_range.to_string(), "[ 32-126 ]");
        assert_eq!(GeneratorConfig::from_flags("gx"), GeneratorConfig::default());
    }

    #[test]
    fn test_fixed_seed_repeats() {
        let config = GeneratorConfig::from_flags("f");
        let node = compile(".{100}");
        let first = generate(&node, &config).unwrap();
        assert_eq!(first.chars().count(), 100);
        assert_eq!(generate(&node, &config).unwrap(), first);
    }
}
