//! Inspection of serialized engine output.

use scraper::{ElementRef, Html, Node};

/// First top-level element, provided only whitespace or comments precede it.
fn root_element(fragment: &Html) -> Option<ElementRef<'_>> {
    // parse_fragment wraps the input in a synthetic <html> element
    for child in fragment.root_element().children() {
        match child.value() {
            Node::Element(_) => return ElementRef::wrap(child),
            Node::Text(text) if !text.trim().is_empty() => return None,
            _ => {}
        }
    }
    None
}

/// Name of the top-level element in `markup`, if it starts with one.
///
/// ```
/// use maspace::markup::root_element_name;
/// assert_eq!(root_element_name("<mjx-container><svg></svg></mjx-container>").as_deref(), Some("mjx-container"));
/// assert_eq!(root_element_name("just text"), None);
/// ```
pub fn root_element_name(markup: &str) -> Option<String> {
    let fragment = Html::parse_fragment(markup);
    root_element(&fragment).map(|el| el.value().name().to_string())
}

/// Whether the root element carries `display="true"`, which is how MathJax
/// marks block-level output.
pub fn is_display_block(markup: &str) -> bool {
    let fragment = Html::parse_fragment(markup);
    root_element(&fragment)
        .and_then(|el| el.value().attr("display"))
        .map_or(false, |v| v == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_element_name() {
        let html = r#"<mjx-container class="MathJax" jax="SVG"><svg xmlns="http://www.w3.org/2000/svg"></svg></mjx-container>"#;
        assert_eq!(root_element_name(html).as_deref(), Some("mjx-container"));
        assert_eq!(root_element_name("  <svg></svg>").as_deref(), Some("svg"));
        assert_eq!(root_element_name(""), None);
    }

    #[test]
    fn test_text_before_root_is_rejected() {
        assert_eq!(root_element_name("junk<svg/>"), None);
        assert_eq!(root_element_name("\n\t<svg/>").as_deref(), Some("svg"));
        assert_eq!(root_element_name("<!-- note --><svg/>").as_deref(), Some("svg"));
        assert!(!is_display_block(r#"x<mjx-container display="true"></mjx-container>"#));
    }

    #[test]
    fn test_is_display_block() {
        assert!(is_display_block(r#"<mjx-container display="true"></mjx-container>"#));
        assert!(!is_display_block(r#"<mjx-container></mjx-container>"#));
        assert!(!is_display_block(r#"<mjx-container display="false"></mjx-container>"#));
        assert!(!is_display_block("plain"));
    }
}
