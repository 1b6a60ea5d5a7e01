//! maspace notation front-end.
//!
//! maspace is a plain-text math notation where spacing decides grouping:
//! `a+b/c` is `a+\frac{b}{c}` while `a+b / c` is `\frac{a+b}{c}`. The
//! output of [`maspace_to_tex`] is meant to be handed to the typesetting
//! engine.

pub mod expr;
pub mod symbol;
pub mod token;

use thiserror::Error;

use token::Token;

/// Errors produced while converting maspace notation into TeX
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Nothing to convert
    #[error("input is empty")]
    Empty,

    /// A character that starts no token
    #[error("unexpected {found:?} at byte {offset}")]
    UnexpectedChar { offset: usize, found: char },

    /// Too many distinct spacings or brackets nested too deeply
    #[error("expression nests {nesting} levels deep, the limit is {max}")]
    TooDeep { nesting: usize, max: usize },

    /// Tokens that do not fit the grammar
    #[error("{description}; unconsumed tokens {unconsumed:?}")]
    Parse {
        description: String,
        unconsumed: Vec<Token>,
    },
}

/// Convert maspace notation into TeX.
///
/// ```
/// assert_eq!(maspace::maspace_to_tex("a+b/c").unwrap(), r"a+\frac{b}{c}");
/// assert_eq!(maspace::maspace_to_tex("a+b / c").unwrap(), r"\frac{a+b}{c}");
/// ```
pub fn maspace_to_tex(input: &str) -> Result<String, NotationError> {
    let tokens = token::tokenize(input)?;
    let math = expr::parse(&tokens)?;
    Ok(math.to_string())
}
