//! Order-based parser turning maspace tokens into a TeX tree.
//!
//! Every grammar level is parameterised by an `order`: binary tokens only bind
//! at the level whose order equals their spacing, so `a _b_c` groups `b_c`
//! (order 0) before attaching it to `a` (order 1).

use std::fmt::{self, Display};

use super::token::Token;
use super::NotationError;

/// Upper bound on `(bracket depth + 1) * (distinct orders)`; every unit costs
/// one pass through the grammar levels on the stack.
pub const MAX_NESTING: usize = 128;

pub fn parse(tokens: &[Token]) -> Result<Math, NotationError> {
    if tokens.is_empty() {
        return Err(NotationError::Empty);
    }
    let tokens = rank_orders(tokens);
    let order_max = tokens.iter().map(Token::order).max().unwrap_or(0);
    let nesting = (bracket_depth(&tokens) + 1) * (order_max + 1);
    if nesting > MAX_NESTING {
        return Err(NotationError::TooDeep {
            nesting,
            max: MAX_NESTING,
        });
    }
    let (rest, math) = Math::parse(&tokens, order_max, order_max)?;
    if !rest.is_empty() {
        return Err(unconsumed("some tokens are unconsumed", rest));
    }
    Ok(math)
}

/// Replace each order by its rank among the distinct orders present.
///
/// Grouping only compares orders, so `a<100 spaces>b` parses like `a b`.
fn rank_orders(tokens: &[Token]) -> Vec<Token> {
    let mut orders: Vec<usize> = tokens.iter().map(Token::order).collect();
    orders.sort_unstable();
    orders.dedup();
    tokens
        .iter()
        .map(|token| {
            let rank = orders.binary_search(&token.order()).unwrap_or(0);
            token.with_order(rank)
        })
        .collect()
}

fn bracket_depth(tokens: &[Token]) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    for token in tokens {
        match token {
            Token::Open(_) => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            Token::Close(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

fn unconsumed(description: &str, tokens: &[Token]) -> NotationError {
    NotationError::Parse {
        description: description.to_string(),
        unconsumed: tokens.to_vec(),
    }
}

/// Concatenate TeX fragments, separating a trailing control word from a
/// following letter (`\alpha` + `x` must not become `\alphax`).
pub(crate) fn join_tex<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::new();
    for part in parts {
        let starts_with_letter = part.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if starts_with_letter && ends_with_control_word(&out) {
            out.push(' ');
        }
        out.push_str(&part);
    }
    out
}

fn ends_with_control_word(s: &str) -> bool {
    let head = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    head.len() < s.len() && head.ends_with('\\')
}

/// Wrap in braces unless the fragment is a single TeX atom.
fn group(tex: String, atomic: bool) -> String {
    if atomic {
        tex
    } else {
        format!("{{{}}}", tex)
    }
}

fn write_scripts(
    f: &mut fmt::Formatter<'_>,
    base: String,
    atomic: bool,
    sup: Option<&dyn Display>,
    sub: Option<&dyn Display>,
) -> fmt::Result {
    if sup.is_none() && sub.is_none() {
        return f.write_str(&base);
    }
    f.write_str(&group(base, atomic))?;
    if let Some(sup) = sup {
        write!(f, "^{{{}}}", sup)?;
    }
    if let Some(sub) = sub {
        write!(f, "_{{{}}}", sub)?;
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub struct Math(Vec<Root>);

impl Math {
    pub fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let mut roots = vec![];
        let mut tokens = tokens;
        loop {
            let (rest, root) = Root::parse(tokens, order, order_max)?;
            roots.push(root);
            tokens = match rest {
                [Token::Cat(ord), rest @ ..] if *ord == order => rest,
                _ => return Ok((rest, Self(roots))),
            };
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(self.0.as_slice(), [root] if root.is_atomic())
    }
}

impl Display for Math {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_tex(self.0.iter().map(ToString::to_string)))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Root {
    Root { index: Frac, radicand: Frac },
    Plain(Frac),
}

impl Root {
    fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let (tokens, first) = Frac::parse(tokens, order, order_max)?;
        match tokens {
            [Token::Root(ord), tokens @ ..] if *ord == order => {
                let (tokens, radicand) = Frac::parse(tokens, order, order_max)?;
                Ok((
                    tokens,
                    Self::Root {
                        index: first,
                        radicand,
                    },
                ))
            }
            _ => Ok((tokens, Self::Plain(first))),
        }
    }

    fn is_atomic(&self) -> bool {
        match self {
            Self::Root { .. } => true,
            Self::Plain(frac) => frac.is_atomic(),
        }
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { index, radicand } => write!(f, "\\sqrt[{}]{{{}}}", index, radicand),
            Self::Plain(frac) => write!(f, "{}", frac),
        }
    }
}

/// `a / b / c` is left-associative: `\frac{\frac{a}{b}}{c}`.
#[derive(Debug, PartialEq, Eq)]
pub struct Frac(Vec<Stack>);

impl Frac {
    fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let (mut tokens, first) = Stack::parse(tokens, order, order_max)?;
        let mut terms = vec![first];
        loop {
            match tokens {
                [Token::Frac(ord), rest @ ..] if *ord == order => {
                    let (rest, term) = Stack::parse(rest, order, order_max)?;
                    terms.push(term);
                    tokens = rest;
                }
                _ => return Ok((tokens, Self(terms))),
            }
        }
    }

    fn is_atomic(&self) -> bool {
        match self.0.as_slice() {
            [single] => single.is_atomic(),
            _ => true,
        }
    }
}

impl Display for Frac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms = self.0.iter().map(ToString::to_string);
        let first = terms.next().unwrap_or_default();
        let tex = terms.fold(first, |nume, denom| format!("\\frac{{{}}}{{{}}}", nume, denom));
        f.write_str(&tex)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Stack {
    body: Inter,
    over: Option<Inter>,
    under: Option<Inter>,
}

impl Stack {
    fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let (tokens, body) = Inter::parse(tokens, order, order_max)?;
        let (mut over, mut under) = (None, None);
        let mut tokens = tokens;
        // Each limit may appear once, in either order.
        loop {
            match tokens {
                [Token::Over(ord), rest @ ..] if *ord == order && over.is_none() => {
                    let (rest, limit) = Inter::parse(rest, order, order_max)?;
                    over = Some(limit);
                    tokens = rest;
                }
                [Token::Under(ord), rest @ ..] if *ord == order && under.is_none() => {
                    let (rest, limit) = Inter::parse(rest, order, order_max)?;
                    under = Some(limit);
                    tokens = rest;
                }
                _ => return Ok((tokens, Self { body, over, under })),
            }
        }
    }

    fn is_atomic(&self) -> bool {
        self.over.is_some() || self.under.is_some() || self.body.is_atomic()
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { body, over, under } = self;
        match (over, under) {
            (Some(over), Some(under)) => write!(
                f,
                "\\underset{{{}}}{{\\overset{{{}}}{{{}}}}}",
                under, over, body
            ),
            (Some(over), None) => write!(f, "\\overset{{{}}}{{{}}}", over, body),
            (None, Some(under)) => write!(f, "\\underset{{{}}}{{{}}}", under, body),
            (None, None) => write!(f, "{}", body),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Inter {
    body: Simple,
    sup: Option<Simple>,
    sub: Option<Simple>,
}

impl Inter {
    fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let (tokens, body) = Simple::parse(tokens, order, order_max)?;
        let (mut sup, mut sub) = (None, None);
        let mut tokens = tokens;
        loop {
            match tokens {
                [Token::Sup(ord), rest @ ..] if *ord == order && sup.is_none() => {
                    let (rest, script) = Simple::parse(rest, order, order_max)?;
                    sup = Some(script);
                    tokens = rest;
                }
                [Token::Sub(ord), rest @ ..] if *ord == order && sub.is_none() => {
                    let (rest, script) = Simple::parse(rest, order, order_max)?;
                    sub = Some(script);
                    tokens = rest;
                }
                _ => return Ok((tokens, Self { body, sup, sub })),
            }
        }
    }

    fn is_atomic(&self) -> bool {
        self.sup.is_none() && self.sub.is_none() && self.body.is_atomic()
    }
}

impl Display for Inter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scripts(
            f,
            self.body.to_string(),
            self.body.is_atomic(),
            self.sup.as_ref().map(|s| s as &dyn Display),
            self.sub.as_ref().map(|s| s as &dyn Display),
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Simple {
    /// Operand made of a lower-order expression
    Expr {
        operator: Option<String>,
        body: Math,
    },
    /// Symbol or bracketed group with optional Unicode scripts
    Atom {
        operator: Option<String>,
        atom: Atom,
        sup: Option<String>,
        sub: Option<String>,
    },
}

impl Simple {
    fn parse(
        tokens: &[Token],
        order: usize,
        order_max: usize,
    ) -> Result<(&[Token], Self), NotationError> {
        let (operator, tokens) = match tokens {
            [] => return Err(unconsumed("expected an operand but the input ended", tokens)),
            [Token::Op(operator, ord), tokens @ ..] if *ord == order => {
                (Some(operator.to_owned()), tokens)
            }
            _ => (None, tokens),
        };

        if order > 0 {
            let (tokens, body) = Math::parse(tokens, order - 1, order_max)?;
            return Ok((tokens, Self::Expr { operator, body }));
        }

        let (tokens, atom) = match tokens {
            [Token::Symbol { tex, atomic }, tokens @ ..] => (
                tokens,
                Atom::Symbol {
                    tex: tex.to_owned(),
                    atomic: *atomic,
                },
            ),
            [Token::Open(open), tokens @ ..] => {
                let (tokens, body) = Math::parse(tokens, order_max, order_max)?;
                match tokens {
                    [Token::Close(close), tokens @ ..] => (
                        tokens,
                        Atom::Group {
                            open: open.to_owned(),
                            body,
                            close: close.to_owned(),
                        },
                    ),
                    _ => return Err(unconsumed("unbalanced bracket", tokens)),
                }
            }
            _ => return Err(unconsumed("expected a symbol or an opening bracket", tokens)),
        };

        let (mut sup, mut sub) = (None, None);
        let mut tokens = tokens;
        loop {
            match tokens {
                [Token::UnicodeSup(script), rest @ ..] if sup.is_none() => {
                    sup = Some(script.to_owned());
                    tokens = rest;
                }
                [Token::UnicodeSub(script), rest @ ..] if sub.is_none() => {
                    sub = Some(script.to_owned());
                    tokens = rest;
                }
                _ => break,
            }
        }
        Ok((
            tokens,
            Self::Atom {
                operator,
                atom,
                sup,
                sub,
            },
        ))
    }

    fn is_atomic(&self) -> bool {
        match self {
            Self::Expr {
                operator: Some(_), ..
            }
            | Self::Atom {
                operator: Some(_), ..
            } => true,
            Self::Expr { body, .. } => body.is_atomic(),
            Self::Atom { atom, sup, sub, .. } => sup.is_none() && sub.is_none() && atom.is_atomic(),
        }
    }
}

/// Display adapter for the scripted part of a [`Simple::Atom`].
struct Scripted<'a> {
    atom: &'a Atom,
    sup: Option<&'a String>,
    sub: Option<&'a String>,
}

impl Display for Scripted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scripts(
            f,
            self.atom.to_string(),
            self.atom.is_atomic(),
            self.sup.map(|s| s as &dyn Display),
            self.sub.map(|s| s as &dyn Display),
        )
    }
}

impl Display for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr {
                operator: Some(operator),
                body,
            } => write!(f, "{}{{{}}}", operator, body),
            Self::Expr {
                operator: None,
                body,
            } => write!(f, "{}", body),
            Self::Atom {
                operator,
                atom,
                sup,
                sub,
            } => {
                let scripted = Scripted {
                    atom,
                    sup: sup.as_ref(),
                    sub: sub.as_ref(),
                };
                match operator {
                    Some(operator) => write!(f, "{}{{{}}}", operator, scripted),
                    None => write!(f, "{}", scripted),
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Atom {
    Symbol {
        tex: String,
        atomic: bool,
    },
    /// `[ ... ]` opens and closes with `.` and renders as its bare body.
    Group {
        open: String,
        body: Math,
        close: String,
    },
}

impl Atom {
    fn is_invisible_group(open: &str, close: &str) -> bool {
        open == "." && close == "."
    }

    fn is_atomic(&self) -> bool {
        match self {
            Self::Symbol { atomic, .. } => *atomic,
            Self::Group { open, body, close } if Self::is_invisible_group(open, close) => {
                body.is_atomic()
            }
            Self::Group { .. } => true,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol { tex, .. } => f.write_str(tex),
            Self::Group { open, body, close } if Self::is_invisible_group(open, close) => {
                write!(f, "{}", body)
            }
            Self::Group { open, body, close } => f.write_str(&join_tex([
                format!("\\left{}", open),
                body.to_string(),
                format!("\\right{}", close),
            ])),
        }
    }
}
