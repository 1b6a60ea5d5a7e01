//! maspace
//!
//! Plain-text math notation to TeX, and TeX to SVG markup through a MathJax
//! engine embedded in a Boa JavaScript context.
//!
//! # Features
//!
//! - **Notation front-end**: [`maspace_to_tex`] turns whitespace-precedence
//!   maspace notation into TeX
//! - **Typeset adapter**: [`render_expression`] forwards TeX to an injected
//!   [`EngineHandle`] and returns the serialized markup
//! - **MathJax backend** (default `mathjax` feature): loads a MathJax build
//!   from a file, a URL, or an inline script
//!
//! # Example
//!
//! ```no_run
//! use maspace::{render_expression, EngineConfig, EngineHandle, ExpressionInput};
//!
//! # async fn run() -> maspace::Result<()> {
//! let engine = EngineHandle::start_mathjax(EngineConfig::default()).await?;
//! let tex = maspace::maspace_to_tex("x^2 + y^2 / 2")?;
//! let svg = render_expression(&engine, &ExpressionInput::display(tex)).await?;
//! println!("{}", svg);
//! # Ok(())
//! # }
//! ```

use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{EngineConfig, ScriptSource};

pub mod notation;
pub use notation::{maspace_to_tex, NotationError};

pub mod markup;

// Worker-thread handle giving async access to a (non-Send) engine
pub mod handle;
pub use handle::{EngineHandle, EngineState, HandleLimits, RenderedNode};

pub mod adapter;
pub use adapter::{render_expression, render_maspace};

// MathJax running inside Boa
#[cfg(feature = "mathjax")]
pub mod mathjax;

/// Rendering options passed to the engine with every expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderOptions {
    /// Render as a standalone block instead of inline with surrounding text
    pub display: bool,
}

/// One expression to typeset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionInput {
    /// TeX source handed to the engine unchanged
    pub tex: String,
    pub options: RenderOptions,
}

impl ExpressionInput {
    /// Block (display-mode) expression
    pub fn display(tex: impl Into<String>) -> Self {
        Self {
            tex: tex.into(),
            options: RenderOptions { display: true },
        }
    }

    /// Inline expression
    pub fn inline(tex: impl Into<String>) -> Self {
        Self {
            tex: tex.into(),
            options: RenderOptions { display: false },
        }
    }
}

/// Core trait for typesetting engine implementations
///
/// Engines are driven from a single worker thread owned by an
/// [`EngineHandle`], so they need not be `Send`. A conversion yields an
/// opaque node that stays inside the engine until it is serialized or
/// released.
pub trait TypesetEngine {
    /// Opaque conversion result
    type Node;

    /// Convert TeX into a result node, waiting for the engine to settle
    fn convert(&mut self, tex: &str, options: &RenderOptions) -> Result<Self::Node>;

    /// Serialize a result node into a markup string
    fn outer_html(&mut self, node: Self::Node) -> Result<String>;

    /// Drop a node that will never be serialized
    fn release(&mut self, node: Self::Node) {
        drop(node);
    }
}
