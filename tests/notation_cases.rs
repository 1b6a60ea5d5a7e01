//! maspace notation to TeX, end to end

use maspace::{maspace_to_tex, Error, NotationError};

fn tex(input: &str) -> String {
    maspace_to_tex(input).unwrap_or_else(|e| panic!("{:?} failed: {}", input, e))
}

#[test]
fn test_spacing_decides_fraction_extent() {
    assert_eq!(tex("a+b/c"), r"a+\frac{b}{c}");
    assert_eq!(tex("a+b / c"), r"\frac{a+b}{c}");
    assert_eq!(tex("x^2 / 2"), r"\frac{x^{2}}{2}");
}

#[test]
fn test_brackets() {
    assert_eq!(tex("(a+b)/2"), r"\frac{\left(a+b\right)}{2}");
    // Square brackets group without printing anything
    assert_eq!(tex("[a+b]^2"), r"{a+b}^{2}");
}

#[test]
fn test_named_symbols_and_roots() {
    assert_eq!(tex("<alpha>x"), r"\alpha x");
    assert_eq!(tex("3_/ 8"), r"\sqrt[3]{8}");
}

#[test]
fn test_mixed_unicode_and_ascii() {
    assert_eq!(
        tex(r"a + bᵃ⁺ᵇ⁼ᶜₕₒ/c <alpha>[<beta hat>^2] `(X)`   5_/ 1.23"),
        r"a+\frac{b^{a+b=c}_{ho}}{c}\alpha\hat{\beta}^{2}\otimes\sqrt[5]{1.23}"
    );
}

#[test]
fn test_scripted_compound_bases_are_braced() {
    assert_eq!(tex(r"a _b_c  ^d ^e+f _g  /h"), r"\frac{{a_{b_{c}}}^{d^{e+f}_{g}}}{h}");
    assert_eq!(tex(r"a _b_c^d ^[e+f _g/h]"), r"a^{{e+f}_{\frac{g}{h}}}_{b^{d}_{c}}");
}

#[test]
fn test_wide_spacing_only_ranks_matter() {
    let wide = format!("a{}b", " ".repeat(10_000));
    assert_eq!(tex(&wide), "ab");
    let spread = format!("a+b{}/{}c", " ".repeat(300), " ".repeat(300));
    assert_eq!(tex(&spread), r"\frac{a+b}{c}");
}

#[test]
fn test_deep_nesting_is_an_error() {
    let brackets = format!("{}a{}", "(".repeat(500), ")".repeat(500));
    assert!(matches!(
        maspace_to_tex(&brackets),
        Err(NotationError::TooDeep { nesting: 501, .. })
    ));

    // Every distinct spacing adds a level
    let mut staircase = String::from("a");
    for width in 1..=200 {
        staircase.push_str(&" ".repeat(width));
        staircase.push('a');
    }
    assert!(matches!(maspace_to_tex(&staircase), Err(NotationError::TooDeep { .. })));

    let nested = format!("{}a{}", "(".repeat(30), ")".repeat(30));
    assert!(tex(&nested).starts_with(r"\left(\left("));
}

#[test]
fn test_errors() {
    assert_eq!(maspace_to_tex(""), Err(NotationError::Empty));
    assert!(matches!(maspace_to_tex("a^"), Err(NotationError::Parse { .. })));
    assert!(matches!(
        maspace_to_tex("a + ☃"),
        Err(NotationError::UnexpectedChar { found: '☃', .. })
    ));

    // Notation errors convert into the crate error
    let err: Error = maspace_to_tex("(a").unwrap_err().into();
    assert!(matches!(err, Error::Notation(NotationError::Parse { .. })));
}
