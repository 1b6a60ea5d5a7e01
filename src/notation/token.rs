//! Tokenizer for maspace notation.
//!
//! Spaces are significant: the number of spaces around a binary operator (or
//! between two juxtaposed operands) becomes the token's binding order, and the
//! parser groups low orders before high ones.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, anychar, char, digit1},
    combinator::{map, map_opt, opt, recognize, value},
    multi::{many0, many0_count, many1, many1_count},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::symbol;
use super::NotationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Juxtaposition of two operands
    Cat(usize),
    Sub(usize),
    Sup(usize),
    Under(usize),
    Over(usize),
    Frac(usize),
    /// `index _/ radicand`
    Root(usize),
    /// Prefix operator applied to the following operand
    Op(String, usize),
    Open(String),
    Close(String),
    /// `atomic` is false when the TeX spans several atoms (e.g. `12`) and
    /// needs braces before scripts are attached.
    Symbol { tex: String, atomic: bool },
    UnicodeSub(String),
    UnicodeSup(String),
}

impl Token {
    /// Binding order; tokens that do not bind have order 0.
    pub fn order(&self) -> usize {
        match self {
            Token::Cat(n)
            | Token::Sub(n)
            | Token::Sup(n)
            | Token::Under(n)
            | Token::Over(n)
            | Token::Frac(n)
            | Token::Root(n)
            | Token::Op(_, n) => *n,
            _ => 0,
        }
    }

    /// Same token with its binding order replaced; non-binding tokens are unchanged.
    pub fn with_order(&self, order: usize) -> Token {
        match self {
            Token::Cat(_) => Token::Cat(order),
            Token::Sub(_) => Token::Sub(order),
            Token::Sup(_) => Token::Sup(order),
            Token::Under(_) => Token::Under(order),
            Token::Over(_) => Token::Over(order),
            Token::Frac(_) => Token::Frac(order),
            Token::Root(_) => Token::Root(order),
            Token::Op(tex, _) => Token::Op(tex.clone(), order),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Binary {
    Sub,
    Sup,
    Under,
    Over,
    Frac,
    Root,
}

impl Binary {
    fn token(self, order: usize) -> Token {
        match self {
            Binary::Sub => Token::Sub(order),
            Binary::Sup => Token::Sup(order),
            Binary::Under => Token::Under(order),
            Binary::Over => Token::Over(order),
            Binary::Frac => Token::Frac(order),
            Binary::Root => Token::Root(order),
        }
    }
}

/// Split maspace input into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, NotationError> {
    let normalized: String = input
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    let mut tokens = Vec::new();
    let mut s = normalized.as_str();
    let mut expect_operand = true;

    while !s.is_empty() {
        if expect_operand {
            if let Ok((rest, token)) = alt((take_op, take_open))(s) {
                tokens.push(token);
                s = rest;
                continue;
            }
            match take_symbol(s) {
                Ok((rest, token)) => {
                    tokens.push(token);
                    s = rest;
                    expect_operand = false;
                }
                Err(_) => return Err(unexpected(&normalized, s)),
            }
            continue;
        }

        if let Ok((rest, text)) = take_superscript_run(s) {
            tokens.push(Token::UnicodeSup(super::maspace_to_tex(&text)?));
            s = rest;
        } else if let Ok((rest, text)) = take_subscript_run(s) {
            tokens.push(Token::UnicodeSub(super::maspace_to_tex(&text)?));
            s = rest;
        } else if let Ok((rest, token)) = take_close(s) {
            tokens.push(token);
            s = rest;
        } else if let Ok((rest, token)) = take_binary(s) {
            tokens.push(token);
            s = rest;
            expect_operand = true;
        } else {
            let (rest, n) = take_cat(s).map_err(|_| unexpected(&normalized, s))?;
            tokens.push(Token::Cat(n));
            s = rest;
            expect_operand = true;
        }
    }
    Ok(tokens)
}

fn unexpected(input: &str, rest: &str) -> NotationError {
    NotationError::UnexpectedChar {
        offset: input.len() - rest.len(),
        found: rest.chars().next().unwrap_or(' '),
    }
}

fn num_space(s: &str) -> IResult<&str, usize> {
    many0_count(char(' '))(s)
}

fn primes(s: &str) -> IResult<&str, &str> {
    recognize(many0_count(char('\'')))(s)
}

fn take_cat(s: &str) -> IResult<&str, usize> {
    num_space(s)
}

fn take_binary(s: &str) -> IResult<&str, Token> {
    let (s, (left, op, right)) = tuple((
        num_space,
        alt((
            value(Binary::Over, tag("^^")),
            value(Binary::Under, tag("__")),
            value(Binary::Root, tag("_/")),
            value(Binary::Sup, tag("^")),
            value(Binary::Sub, tag("_")),
            value(Binary::Frac, alt((tag("/"), tag("∕")))),
        )),
        num_space,
    ))(s)?;
    Ok((s, op.token(left.max(right))))
}

pub fn take_op(s: &str) -> IResult<&str, Token> {
    map(
        pair(alt((take_op_unicode, take_root_in_angle, take_op_in_angle)), num_space),
        |(tex, n)| Token::Op(tex, n),
    )(s)
}

fn take_op_unicode(s: &str) -> IResult<&str, String> {
    map_opt(anychar, |c| match c {
        '√' => Some(r"\sqrt".to_string()),
        '∛' => Some(r"\sqrt[3]".to_string()),
        '∜' => Some(r"\sqrt[4]".to_string()),
        _ => None,
    })(s)
}

fn take_root_in_angle(s: &str) -> IResult<&str, String> {
    map(
        delimited(
            tuple((tag("<'"), num_space, alt((tag("root"), tag("sqrt"))), num_space)),
            digit1,
            pair(num_space, char('>')),
        ),
        |index: &str| format!(r"\sqrt[{}]", index),
    )(s)
}

fn take_op_in_angle(s: &str) -> IResult<&str, String> {
    map(
        delimited(pair(tag("<'"), num_space), alpha1, pair(num_space, char('>'))),
        |name: &str| match name {
            "root" | "sqrt" => r"\sqrt".to_string(),
            _ => format!(r"\{}", name),
        },
    )(s)
}

pub fn take_open(s: &str) -> IResult<&str, Token> {
    terminated(
        map(
            alt((
                delimited(
                    char('`'),
                    map_opt(take_until("`"), symbol::tex_of_ascii_art_open),
                    char('`'),
                ),
                map_opt(anychar, symbol::tex_of_open_char),
            )),
            |tex| Token::Open(tex.to_string()),
        ),
        num_space,
    )(s)
}

pub fn take_close(s: &str) -> IResult<&str, Token> {
    preceded(
        num_space,
        map(
            pair(
                alt((
                    delimited(
                        char('`'),
                        map_opt(take_until("`"), symbol::tex_of_ascii_art_close),
                        char('`'),
                    ),
                    map_opt(anychar, symbol::tex_of_close_char),
                )),
                primes,
            ),
            |(tex, ticks)| Token::Close(format!("{}{}", tex, ticks)),
        ),
    )(s)
}

pub fn take_symbol(s: &str) -> IResult<&str, Token> {
    map(
        pair(
            alt((take_named_symbol, take_ascii_art_symbol, take_number, take_char_symbol)),
            primes,
        ),
        |((tex, atomic), ticks)| Token::Symbol {
            tex: format!("{}{}", tex, ticks),
            atomic,
        },
    )(s)
}

/// `<name accent accent...>`
fn take_named_symbol(s: &str) -> IResult<&str, (String, bool)> {
    map(
        delimited(
            char('<'),
            pair(alpha1, many0(preceded(many1_count(char(' ')), alpha1))),
            pair(num_space, char('>')),
        ),
        |(name, accents): (&str, Vec<&str>)| {
            let tex = accents
                .into_iter()
                .fold(symbol::tex_of_name(name), |tex, accent| {
                    format!(r"\{}{{{}}}", accent, tex)
                });
            (tex, true)
        },
    )(s)
}

fn take_ascii_art_symbol(s: &str) -> IResult<&str, (String, bool)> {
    map(
        delimited(
            char('`'),
            map_opt(take_until("`"), symbol::tex_of_ascii_art),
            char('`'),
        ),
        |tex| (tex.to_string(), true),
    )(s)
}

fn take_number(s: &str) -> IResult<&str, (String, bool)> {
    map(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |n: &str| (n.to_string(), n.len() == 1),
    )(s)
}

fn take_char_symbol(s: &str) -> IResult<&str, (String, bool)> {
    map(
        pair(
            map_opt(anychar, symbol::tex_of_char),
            many0(map_opt(anychar, symbol::tex_of_accent)),
        ),
        |(base, accents)| {
            let tex = accents
                .into_iter()
                .fold(base, |tex, accent| format!("{}{{{}}}", accent, tex));
            (tex, true)
        },
    )(s)
}

fn take_superscript_run(s: &str) -> IResult<&str, String> {
    map(many1(map_opt(anychar, symbol::superscript_text)), |parts| parts.concat())(s)
}

fn take_subscript_run(s: &str) -> IResult<&str, String> {
    map(many1(map_opt(anychar, symbol::subscript_text)), |parts| parts.concat())(s)
}
