//! Character, name and ascii-art tables for maspace symbols.

use std::iter::once;

use unicode_normalization::UnicodeNormalization;

/// TeX for a single input character, or `None` when the character is not a symbol.
pub fn tex_of_char(c: char) -> Option<String> {
    let tex = match c {
        'A'..='Z'
        | 'a'..='z'
        | '0'..='9'
        | '!'
        | ','
        | '.'
        | ';'
        | '?'
        | '@'
        | '*'
        | '+'
        | '-'
        | ':'
        | '<'
        | '='
        | '>'
        | '|' => return Some(c.to_string()),
        '$' | '%' | '&' | '#' => return Some(format!(r"\{}", c)),
        '~' => r"\sim",
        '−' => "-",
        '′' => "'",
        // Greek
        'α' => r"\alpha",
        'β' => r"\beta",
        'γ' => r"\gamma",
        'δ' => r"\delta",
        'ε' => r"\varepsilon",
        'ϵ' => r"\epsilon",
        'ζ' => r"\zeta",
        'η' => r"\eta",
        'θ' => r"\theta",
        'ϑ' => r"\vartheta",
        'ι' => r"\iota",
        'κ' => r"\kappa",
        'λ' => r"\lambda",
        'μ' => r"\mu",
        'ν' => r"\nu",
        'ξ' => r"\xi",
        'ο' => "o",
        'π' => r"\pi",
        'ϖ' => r"\varpi",
        'ρ' => r"\rho",
        'ϱ' => r"\varrho",
        'σ' => r"\sigma",
        'ς' => r"\varsigma",
        'τ' => r"\tau",
        'υ' => r"\upsilon",
        'φ' => r"\varphi",
        'ϕ' => r"\phi",
        'χ' => r"\chi",
        'ψ' => r"\psi",
        'ω' => r"\omega",
        'Γ' => r"\Gamma",
        'Δ' => r"\Delta",
        'Θ' => r"\Theta",
        'Λ' => r"\Lambda",
        'Ξ' => r"\Xi",
        'Π' => r"\Pi",
        'Σ' => r"\Sigma",
        'Υ' => r"\Upsilon",
        'Φ' => r"\Phi",
        'Ψ' => r"\Psi",
        'Ω' => r"\Omega",
        'Α' => "A",
        'Β' => "B",
        'Ε' => "E",
        'Ζ' => "Z",
        'Η' => "H",
        'Ι' => "I",
        'Κ' => "K",
        'Μ' => "M",
        'Ν' => "N",
        'Ο' => "O",
        'Ρ' => "P",
        'Τ' => "T",
        'Χ' => "X",
        // Operators and relations
        '∞' => r"\infty",
        '∂' => r"\partial",
        '∇' => r"\nabla",
        '∑' => r"\sum",
        '∏' => r"\prod",
        '∐' => r"\coprod",
        '∫' => r"\int",
        '∬' => r"\iint",
        '∭' => r"\iiint",
        '∮' => r"\oint",
        '±' => r"\pm",
        '∓' => r"\mp",
        '×' => r"\times",
        '÷' => r"\div",
        '·' | '⋅' => r"\cdot",
        '∘' => r"\circ",
        '∗' => r"\ast",
        '≤' => r"\le",
        '≥' => r"\ge",
        '≠' => r"\ne",
        '≈' => r"\approx",
        '≡' => r"\equiv",
        '≅' => r"\cong",
        '∼' => r"\sim",
        '≃' => r"\simeq",
        '∝' => r"\propto",
        '≪' => r"\ll",
        '≫' => r"\gg",
        '→' => r"\to",
        '←' => r"\leftarrow",
        '↔' => r"\leftrightarrow",
        '⇒' => r"\Rightarrow",
        '⇐' => r"\Leftarrow",
        '⇔' => r"\Leftrightarrow",
        '↦' => r"\mapsto",
        '↑' => r"\uparrow",
        '↓' => r"\downarrow",
        '∀' => r"\forall",
        '∃' => r"\exists",
        '∄' => r"\nexists",
        '∈' => r"\in",
        '∉' => r"\notin",
        '∋' => r"\ni",
        '⊂' => r"\subset",
        '⊃' => r"\supset",
        '⊆' => r"\subseteq",
        '⊇' => r"\supseteq",
        '∪' => r"\cup",
        '∩' => r"\cap",
        '∅' => r"\emptyset",
        '∧' => r"\land",
        '∨' => r"\lor",
        '¬' => r"\neg",
        '⊗' => r"\otimes",
        '⊕' => r"\oplus",
        '⊖' => r"\ominus",
        '⊙' => r"\odot",
        '∥' => r"\parallel",
        '⊥' => r"\perp",
        '∠' => r"\angle",
        '…' => r"\ldots",
        '⋯' => r"\cdots",
        '⋮' => r"\vdots",
        '⋱' => r"\ddots",
        'ℏ' => r"\hbar",
        'ℓ' => r"\ell",
        '℘' => r"\wp",
        'ℵ' => r"\aleph",
        _ => return tex_of_letterlike(c).or_else(|| tex_of_math_alphanumeric(c)),
    };
    Some(tex.to_string())
}

/// Letterlike-block characters that fill the holes of the mathematical alphanumeric block.
fn tex_of_letterlike(c: char) -> Option<String> {
    let (styles, base) = match c {
        'ℎ' => (ITALIC, 'h'),
        'ℬ' => (SCRIPT, 'B'),
        'ℰ' => (SCRIPT, 'E'),
        'ℱ' => (SCRIPT, 'F'),
        'ℋ' => (SCRIPT, 'H'),
        'ℐ' => (SCRIPT, 'I'),
        'ℒ' => (SCRIPT, 'L'),
        'ℳ' => (SCRIPT, 'M'),
        'ℛ' => (SCRIPT, 'R'),
        'ℯ' => (SCRIPT, 'e'),
        'ℊ' => (SCRIPT, 'g'),
        'ℴ' => (SCRIPT, 'o'),
        'ℭ' => (FRAKTUR, 'C'),
        'ℌ' => (FRAKTUR, 'H'),
        'ℑ' => (FRAKTUR, 'I'),
        'ℜ' => (FRAKTUR, 'R'),
        'ℨ' => (FRAKTUR, 'Z'),
        'ℂ' => (DOUBLE_STRUCK, 'C'),
        'ℍ' => (DOUBLE_STRUCK, 'H'),
        'ℕ' => (DOUBLE_STRUCK, 'N'),
        'ℙ' => (DOUBLE_STRUCK, 'P'),
        'ℚ' => (DOUBLE_STRUCK, 'Q'),
        'ℝ' => (DOUBLE_STRUCK, 'R'),
        'ℤ' => (DOUBLE_STRUCK, 'Z'),
        _ => return None,
    };
    Some(styled(styles, base))
}

const BOLD: &[&str] = &[r"\mathbf"];
const ITALIC: &[&str] = &[r"\mathit"];
const BOLD_ITALIC: &[&str] = &[r"\boldsymbol"];
const SCRIPT: &[&str] = &[r"\mathscr"];
const BOLD_SCRIPT: &[&str] = &[r"\boldsymbol", r"\mathscr"];
const FRAKTUR: &[&str] = &[r"\mathfrak"];
const BOLD_FRAKTUR: &[&str] = &[r"\boldsymbol", r"\mathfrak"];
const DOUBLE_STRUCK: &[&str] = &[r"\mathbb"];
const SANS_SERIF: &[&str] = &[r"\mathsf"];
const MONOSPACE: &[&str] = &[r"\mathtt"];

/// `(first code point, ASCII base, length, styles)` for each run of the
/// Mathematical Alphanumeric Symbols block.
const ALPHANUMERIC_RUNS: &[(u32, char, u32, &[&str])] = &[
    (0x1D400, 'A', 26, BOLD),
    (0x1D41A, 'a', 26, BOLD),
    (0x1D434, 'A', 26, ITALIC),
    (0x1D44E, 'a', 26, ITALIC),
    (0x1D468, 'A', 26, BOLD_ITALIC),
    (0x1D482, 'a', 26, BOLD_ITALIC),
    (0x1D49C, 'A', 26, SCRIPT),
    (0x1D4B6, 'a', 26, SCRIPT),
    (0x1D4D0, 'A', 26, BOLD_SCRIPT),
    (0x1D4EA, 'a', 26, BOLD_SCRIPT),
    (0x1D504, 'A', 26, FRAKTUR),
    (0x1D51E, 'a', 26, FRAKTUR),
    (0x1D538, 'A', 26, DOUBLE_STRUCK),
    (0x1D552, 'a', 26, DOUBLE_STRUCK),
    (0x1D56C, 'A', 26, BOLD_FRAKTUR),
    (0x1D586, 'a', 26, BOLD_FRAKTUR),
    // Sans-serif in all four weights collapses to \mathsf.
    (0x1D5A0, 'A', 26, SANS_SERIF),
    (0x1D5BA, 'a', 26, SANS_SERIF),
    (0x1D5D4, 'A', 26, SANS_SERIF),
    (0x1D5EE, 'a', 26, SANS_SERIF),
    (0x1D608, 'A', 26, SANS_SERIF),
    (0x1D622, 'a', 26, SANS_SERIF),
    (0x1D63C, 'A', 26, SANS_SERIF),
    (0x1D656, 'a', 26, SANS_SERIF),
    (0x1D670, 'A', 26, MONOSPACE),
    (0x1D68A, 'a', 26, MONOSPACE),
    (0x1D7CE, '0', 10, BOLD),
    (0x1D7D8, '0', 10, DOUBLE_STRUCK),
    (0x1D7E2, '0', 10, SANS_SERIF),
    (0x1D7EC, '0', 10, SANS_SERIF),
    (0x1D7F6, '0', 10, MONOSPACE),
];

fn tex_of_math_alphanumeric(c: char) -> Option<String> {
    let code = u32::from(c);
    ALPHANUMERIC_RUNS
        .iter()
        .find(|(start, _, len, _)| (*start..*start + *len).contains(&code))
        .and_then(|(start, base, _, styles)| {
            let base = char::from_u32(u32::from(*base) + code - start)?;
            Some(styled(styles, base))
        })
}

fn styled(styles: &[&str], base: char) -> String {
    styles
        .iter()
        .rev()
        .fold(base.to_string(), |inner, style| format!("{}{{{}}}", style, inner))
}

/// TeX accent command for a combining character following a symbol.
pub fn tex_of_accent(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{0300}' => r"\grave",
        '\u{0301}' => r"\acute",
        '\u{0302}' => r"\hat",
        '\u{0303}' => r"\tilde",
        '\u{0304}' => r"\bar",
        '\u{0305}' => r"\overline",
        '\u{0306}' => r"\breve",
        '\u{0307}' => r"\dot",
        '\u{0308}' => r"\ddot",
        '\u{030A}' => r"\mathring",
        '\u{030C}' => r"\check",
        '\u{20D7}' => r"\vec",
        _ => return None,
    })
}

/// TeX for the name inside `<...>`. Single letters stay as they are.
pub fn tex_of_name(name: &str) -> String {
    if name.chars().count() == 1 {
        name.to_string()
    } else {
        format!(r"\{}", name)
    }
}

/// Symbols written between backquotes.
pub fn tex_of_ascii_art(s: &str) -> Option<&'static str> {
    Some(match s {
        "(X)" => r"\otimes",
        "(+)" => r"\oplus",
        "(-)" => r"\ominus",
        "(.)" => r"\odot",
        "(/)" => r"\oslash",
        "->" => r"\to",
        "<-" => r"\leftarrow",
        "<->" => r"\leftrightarrow",
        "=>" => r"\Rightarrow",
        "<=>" => r"\Leftrightarrow",
        "|->" => r"\mapsto",
        "<=" => r"\le",
        ">=" => r"\ge",
        "!=" => r"\ne",
        "==" => r"\equiv",
        "~=" => r"\cong",
        "~~" => r"\approx",
        "+-" => r"\pm",
        "-+" => r"\mp",
        "xx" => r"\times",
        "-:" => r"\div",
        "**" => r"\ast",
        "@" => r"\circ",
        "..." => r"\ldots",
        "oo" => r"\infty",
        "del" => r"\partial",
        "grad" => r"\nabla",
        "AA" => r"\forall",
        "EE" => r"\exists",
        "in" => r"\in",
        "!in" => r"\notin",
        "sub" => r"\subset",
        "sube" => r"\subseteq",
        "sup" => r"\supset",
        "supe" => r"\supseteq",
        "uu" => r"\cup",
        "nn" => r"\cap",
        "O/" => r"\emptyset",
        "^^" => r"\land",
        "vv" => r"\lor",
        _ => return None,
    })
}

pub fn tex_of_open_char(c: char) -> Option<&'static str> {
    Some(match c {
        '(' => "(",
        '[' => ".",
        '{' => r"\{",
        '⟨' => r"\langle",
        '⌈' => r"\lceil",
        '⌊' => r"\lfloor",
        '⌜' => r"\ulcorner",
        '⌞' => r"\llcorner",
        _ => return None,
    })
}

pub fn tex_of_close_char(c: char) -> Option<&'static str> {
    Some(match c {
        ')' => ")",
        ']' => ".",
        '}' => r"\}",
        '⟩' => r"\rangle",
        '⌉' => r"\rceil",
        '⌋' => r"\rfloor",
        '⌝' => r"\urcorner",
        '⌟' => r"\lrcorner",
        _ => return None,
    })
}

pub fn tex_of_ascii_art_open(s: &str) -> Option<&'static str> {
    Some(match s {
        "[" => "[",
        "[<" => r"\langle",
        "[|" => r"\lvert",
        "[||" => r"\lVert",
        "[^" => r"\lceil",
        "[_" => r"\lfloor",
        "[|^" => r"\ulcorner",
        "[|_" => r"\llcorner",
        "[[]" => "]",
        "[[)" => ")",
        "[[}" => r"\}",
        "[[>" => r"\rangle",
        _ => return None,
    })
}

pub fn tex_of_ascii_art_close(s: &str) -> Option<&'static str> {
    Some(match s {
        "]" => "]",
        ">]" => r"\rangle",
        "|]" => r"\rvert",
        "||]" => r"\rVert",
        "^]" => r"\rceil",
        "_]" => r"\rfloor",
        "^|]" => r"\urcorner",
        "_|]" => r"\lrcorner",
        "[]]" => "[",
        "(]]" => "(",
        "{]]" => r"\{",
        "<]]" => r"\langle",
        _ => return None,
    })
}

/// Plain maspace text for a Unicode superscript character.
pub fn superscript_text(c: char) -> Option<String> {
    let special = match c {
        'ᵅ' => 'α',
        'ᵋ' => 'ε',
        'ᶥ' => 'ι',
        'ᶲ' => 'ϕ',
        'ꜛ' => '↑',
        'ꜜ' => '↓',
        'ꜝ' => '!',
        '⁺' | '⁻' | '⁼' | '⁽' | '⁾' | '⁰' | '¹' | '²' | '³' | '⁴' | '⁵' | '⁶' | '⁷' | '⁸' | '⁹'
        | 'ᴬ' | 'ᴮ' | 'ᴰ' | 'ᴱ' | 'ᴳ' | 'ᴴ' | 'ᴵ' | 'ᴶ' | 'ᴷ' | 'ᴸ' | 'ᴹ' | 'ᴺ' | 'ᴼ' | 'ᴾ'
        | 'ᴿ' | 'ᵀ' | 'ᵁ' | 'ⱽ' | 'ᵂ' | 'ᵃ' | 'ᵇ' | 'ᶜ' | 'ᵈ' | 'ᵉ' | 'ᵍ' | 'ʰ' | 'ⁱ' | 'ʲ'
        | 'ᵏ' | 'ˡ' | 'ᵐ' | 'ⁿ' | 'ᵒ' | 'ᵖ' | 'ʳ' | 'ˢ' | 'ᵗ' | 'ᵘ' | 'ᵛ' | 'ʷ' | 'ˣ' | 'ʸ'
        | 'ᶻ' | 'ᵝ' | 'ᵞ' | '\u{1D5F}' | 'ᶿ' | 'ᵠ' | 'ᵡ' => return Some(once(c).nfkc().collect()),
        _ => return None,
    };
    Some(special.to_string())
}

/// Plain maspace text for a Unicode subscript character.
pub fn subscript_text(c: char) -> Option<String> {
    match c {
        '₊' | '₋' | '₌' | '₍' | '₎' | '₀' | '₁' | '₂' | '₃' | '₄' | '₅' | '₆' | '₇' | '₈' | '₉'
        | 'ₐ' | 'ₑ' | 'ₕ' | 'ᵢ' | 'ⱼ' | 'ₖ' | 'ₗ' | 'ₘ' | 'ₙ' | 'ₒ' | 'ₚ' | 'ᵣ' | 'ₛ' | 'ₜ'
        | 'ᵤ' | 'ᵥ' | 'ₓ' | 'ᵦ' | 'ᵧ' | 'ᵨ' | 'ᵩ' | 'ᵪ' => Some(once(c).nfkc().collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_alphanumerics() {
        assert_eq!(tex_of_char('𝐀').as_deref(), Some(r"\mathbf{A}"));
        assert_eq!(tex_of_char('𝕫').as_deref(), Some(r"\mathbb{z}"));
        assert_eq!(tex_of_char('𝟘').as_deref(), Some(r"\mathbb{0}"));
        assert_eq!(tex_of_char('𝓐').as_deref(), Some(r"\boldsymbol{\mathscr{A}}"));
        assert_eq!(tex_of_char('ℝ').as_deref(), Some(r"\mathbb{R}"));
        assert_eq!(tex_of_char('ℎ').as_deref(), Some(r"\mathit{h}"));
    }

    #[test]
    fn test_plain_and_escaped_chars() {
        assert_eq!(tex_of_char('x').as_deref(), Some("x"));
        assert_eq!(tex_of_char('%').as_deref(), Some(r"\%"));
        assert_eq!(tex_of_char('α').as_deref(), Some(r"\alpha"));
        assert_eq!(tex_of_char('−').as_deref(), Some("-"));
        assert_eq!(tex_of_char('('), None);
        assert_eq!(tex_of_char('☃'), None);
    }

    #[test]
    fn test_script_text() {
        assert_eq!(superscript_text('²').as_deref(), Some("2"));
        assert_eq!(superscript_text('ᵃ').as_deref(), Some("a"));
        assert_eq!(superscript_text('ᵅ').as_deref(), Some("α"));
        assert_eq!(subscript_text('ₕ').as_deref(), Some("h"));
        assert_eq!(subscript_text('₁').as_deref(), Some("1"));
        assert_eq!(subscript_text('x'), None);
    }
}
