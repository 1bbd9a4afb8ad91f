//! Generate random strings that match a regular expression.
//!
//! ```
//! use randexp::RandExp;
//!
//! let re = RandExp::new(r"H[euioa]llo{1,10} (World|You)").unwrap();
//! let greeting = re.generate().unwrap();
//! assert!(greeting.starts_with('H'));
//! ```

pub mod ast;
pub mod error;
pub mod escape;
pub mod generator;
pub mod parser;
pub mod random;
pub mod range;
pub mod range_set;

use tracing::debug;

pub use error::{Error, GenerationError, ParseError, ParseErrorKind, Result};
pub use generator::{generate, generate_with, GeneratorConfig};
pub use random::RandomSource;
pub use range::Range;
pub use range_set::RangeSet;

/// Parse `pattern` into a tree ready for generation.
pub fn compile(pattern: &str) -> Result<ast::Node, ParseError> {
    let node = parser::Parser::new(pattern).parse()?;
    debug!(pattern, nodes = node.size(), "compiled pattern");
    Ok(node)
}

/// A compiled pattern together with its generation settings.
#[derive(Debug, Clone)]
pub struct RandExp {
    ast: ast::Node,
    pub config: GeneratorConfig,
}

impl RandExp {
    pub fn new(pattern: &str) -> Result<Self, ParseError> {
        Self::with_flags(pattern, "")
    }

    /// Compile with flag letters: `i` ignores case, `f` fixes the seed.
    pub fn with_flags(pattern: &str, flags: &str) -> Result<Self, ParseError> {
        Ok(Self {
            ast: compile(pattern)?,
            config: GeneratorConfig::from_flags(flags),
        })
    }

    pub fn ast(&self) -> &ast::Node {
        &self.ast
    }

    pub fn generate(&self) -> Result<String, GenerationError> {
        generate(&self.ast, &self.config)
    }

    pub fn generate_with<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<String, GenerationError> {
        generate_with(&self.ast, &self.config, rng)
    }
}
