//! The typeset adapter: one expression in, one markup string out.

use log::debug;

use crate::handle::EngineHandle;
use crate::{markup, maspace_to_tex, Error, ExpressionInput, RenderOptions, Result};

/// Typeset `input` with the injected engine and return the outer HTML of the
/// result node.
///
/// The TeX is passed to the engine unchanged. Engine errors propagate as-is:
/// [`Error::RenderingEngineUnavailable`] until the engine is ready,
/// [`Error::RenderingFailure`] when it rejects the expression, and
/// [`Error::ResultUnextractable`] when the result cannot be serialized.
/// Calls are independent, so many may be in flight on the same handle.
pub async fn render_expression(engine: &EngineHandle, input: &ExpressionInput) -> Result<String> {
    let node = engine.convert(&input.tex, input.options).await?;
    let html = engine.outer_html(node).await?;
    if markup::root_element_name(&html).is_none() {
        return Err(Error::ResultUnextractable(
            "serialized result has no root element".into(),
        ));
    }
    debug!("rendered {} bytes of TeX into {} bytes of markup", input.tex.len(), html.len());
    Ok(html)
}

/// Convert maspace notation to TeX, then typeset it.
pub async fn render_maspace(
    engine: &EngineHandle,
    notation: &str,
    options: RenderOptions,
) -> Result<String> {
    let tex = maspace_to_tex(notation)?;
    render_expression(engine, &ExpressionInput { tex, options }).await
}
