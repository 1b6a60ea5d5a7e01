//! MathJaxEngine: MathJax's SVG output running inside a Boa context.

use std::time::Duration;

use boa_engine::{Context, JsValue, Source};
use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{EngineConfig, ScriptSource};
use crate::{Error, RenderOptions, Result, TypesetEngine};

const HARNESS: &str = include_str!("mathjax_harness.js");

/// A [`TypesetEngine`] evaluating a MathJax build in Boa.
///
/// The context is not `Send`; run it through an
/// [`EngineHandle`](crate::EngineHandle).
pub struct MathJaxEngine {
    ctx: Context,
    fetcher: Fetcher,
    max_event_loop_turns: u32,
}

/// Reads scripts from disk or over HTTP
struct Fetcher {
    user_agent: String,
    timeout: Duration,
}

/// Id of a result node kept in the harness node table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathJaxNode(u64);

#[derive(Debug, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum Startup {
    Pending,
    Ready,
    Failed { error: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum Job {
    Pending,
    Fulfilled { node: u64 },
    Rejected { error: String },
}

#[derive(Debug, Deserialize)]
struct Serialized {
    html: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConsoleLine {
    level: String,
    text: String,
}

trait Settles {
    fn is_pending(&self) -> bool;
}

impl Settles for Startup {
    fn is_pending(&self) -> bool {
        matches!(self, Startup::Pending)
    }
}

impl Settles for Job {
    fn is_pending(&self) -> bool {
        matches!(self, Job::Pending)
    }
}

impl MathJaxEngine {
    /// Load the configured script and wait for MathJax startup to finish.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        info!("loading MathJax from {}", config.script);
        let fetcher = Fetcher {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_millis(config.fetch_timeout_ms),
        };
        let script = fetcher.load(&config.script)?;

        let mut ctx = Context::default();
        if config.script_loop_iteration_limit > 0 {
            ctx.runtime_limits_mut()
                .set_loop_iteration_limit(config.script_loop_iteration_limit);
        }
        if config.script_recursion_limit < usize::MAX {
            ctx.runtime_limits_mut()
                .set_recursion_limit(config.script_recursion_limit);
        }

        let mut engine = Self {
            ctx,
            fetcher,
            max_event_loop_turns: config.max_event_loop_turns,
        };
        engine
            .eval_raw(HARNESS)
            .map_err(|e| Error::InitializationError(format!("harness: {}", e)))?;
        let base = config.component_base();
        if let Some(base) = &base {
            debug!("MathJax components load from {}", base);
        }
        let base = serde_json::to_string(&base)
            .map_err(|e| Error::InitializationError(format!("component base: {}", e)))?;
        engine
            .eval_raw(&format!("__maspace_configure({})", base))
            .map_err(Error::InitializationError)?;
        let loaded = engine.eval_raw(&script);
        engine.forward_console();
        loaded.map_err(|e| Error::InitializationError(format!("engine script: {}", e)))?;
        engine
            .eval_raw("__maspace_watch_startup()")
            .map_err(Error::InitializationError)?;

        match engine
            .settle::<Startup>("__maspace_startup_status()")
            .map_err(|e| Error::InitializationError(e.to_string()))?
        {
            Startup::Ready => {
                info!("MathJax ready");
                Ok(engine)
            }
            Startup::Failed { error } => Err(Error::InitializationError(error)),
            Startup::Pending => Err(Error::InitializationError(format!(
                "startup did not finish within {} event-loop turns",
                engine.max_event_loop_turns
            ))),
        }
    }

    /// Result nodes converted but not yet serialized or released.
    pub fn pending_nodes(&mut self) -> Result<usize> {
        self.eval_json("__maspace_pending_nodes()")
    }

    fn eval_raw(&mut self, code: &str) -> std::result::Result<JsValue, String> {
        self.ctx
            .eval(Source::from_bytes(code.as_bytes()))
            .map_err(|e| format!("Script thrown: {}", e))
    }

    /// Evaluate an expression returning a JSON string and decode it.
    fn eval_json<T: DeserializeOwned>(&mut self, code: &str) -> Result<T> {
        let value = self.eval_raw(code).map_err(Error::RenderingFailure)?;
        let text = value
            .as_string()
            .map(|s| s.to_std_string_escaped())
            .ok_or_else(|| {
                Error::RenderingFailure(format!(
                    "harness returned a non-string value: {}",
                    value.display()
                ))
            })?;
        serde_json::from_str(&text)
            .map_err(|e| Error::RenderingFailure(format!("harness returned malformed JSON: {}", e)))
    }

    /// Drain the job queue, serve component loads and fire timers until
    /// `status` reports a settled state.
    fn settle<T: DeserializeOwned + Settles>(&mut self, status: &str) -> Result<T> {
        for _ in 0..self.max_event_loop_turns {
            let _ = self.ctx.run_jobs();
            self.serve_requires()?;
            let current: T = self.eval_json(status)?;
            if !current.is_pending() {
                self.forward_console();
                return Ok(current);
            }
            self.eval_raw("__maspace_run_timers()")
                .map_err(Error::RenderingFailure)?;
        }
        self.forward_console();
        self.eval_json(status)
    }

    /// Load every component the MathJax loader asked for since the last turn.
    fn serve_requires(&mut self) -> Result<()> {
        while let Some(url) = self.eval_json::<Option<String>>("__maspace_next_require()")? {
            debug!("loading MathJax component {}", url);
            let loaded = match self.fetcher.load(&ScriptSource::parse(&url)) {
                Ok(code) => self.eval_raw(&code).map(|_| ()),
                Err(e) => Err(e.to_string()),
            };
            let error = match loaded {
                Ok(()) => "null".to_string(),
                Err(e) => {
                    warn!("component {} failed: {}", url, e);
                    serde_json::to_string(&e).map_err(|e| Error::RenderingFailure(e.to_string()))?
                }
            };
            self.eval_raw(&format!("__maspace_finish_require({})", error))
                .map_err(Error::RenderingFailure)?;
        }
        Ok(())
    }

    fn forward_console(&mut self) {
        let lines: Vec<ConsoleLine> = match self.eval_json("__maspace_drain_console()") {
            Ok(lines) => lines,
            Err(_) => return,
        };
        for line in lines {
            match line.level.as_str() {
                "error" => error!(target: "maspace::mathjax::console", "{}", line.text),
                "warn" => warn!(target: "maspace::mathjax::console", "{}", line.text),
                _ => debug!(target: "maspace::mathjax::console", "{}", line.text),
            }
        }
    }
}

impl TypesetEngine for MathJaxEngine {
    type Node = MathJaxNode;

    fn convert(&mut self, tex: &str, options: &RenderOptions) -> Result<MathJaxNode> {
        let literal = serde_json::to_string(tex)
            .map_err(|e| Error::RenderingFailure(format!("cannot encode expression: {}", e)))?;
        let job: u64 = self.eval_json(&format!("__maspace_convert({}, {})", literal, options.display))?;
        match self.settle::<Job>(&format!("__maspace_poll({})", job))? {
            Job::Fulfilled { node } => Ok(MathJaxNode(node)),
            Job::Rejected { error } => Err(Error::RenderingFailure(error)),
            Job::Pending => {
                // A late result must not stay in the node table
                if let Err(e) = self.eval_raw(&format!("__maspace_abandon({})", job)) {
                    warn!("failed to abandon conversion job {}: {}", job, e);
                }
                Err(Error::RenderingFailure(format!(
                    "conversion did not settle within {} event-loop turns",
                    self.max_event_loop_turns
                )))
            }
        }
    }

    fn outer_html(&mut self, node: MathJaxNode) -> Result<String> {
        let out: Serialized = self
            .eval_json(&format!("__maspace_outer_html({})", node.0))
            .map_err(|e| match e {
                Error::RenderingFailure(msg) => Error::ResultUnextractable(msg),
                other => other,
            })?;
        match out {
            Serialized { html: Some(html), .. } => Ok(html),
            Serialized { error, .. } => Err(Error::ResultUnextractable(
                error.unwrap_or_else(|| "adaptor returned no markup".into()),
            )),
        }
    }

    fn release(&mut self, node: MathJaxNode) {
        if let Err(e) = self.eval_raw(&format!("__maspace_release({})", node.0)) {
            warn!("failed to release result node {}: {}", node.0, e);
        }
    }
}

impl Fetcher {
    fn load(&self, source: &ScriptSource) -> Result<String> {
        match source {
            ScriptSource::Inline(code) => Ok(code.clone()),
            ScriptSource::Path(path) => std::fs::read_to_string(path)
                .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e))),
            ScriptSource::Url(url) => self.fetch(url),
        }
    }

    fn fetch(&self, url: &str) -> Result<String> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        let resp = client
            .get(url)
            .header("User-Agent", self.user_agent.clone())
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::LoadError(format!("{} returned HTTP {}", url, status)));
        }
        let body = resp
            .text()
            .map_err(|e| Error::NetworkError(format!("Failed to read {}: {}", url, e)))?;
        debug!("fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const STUB: &str = include_str!("../tests/fixtures/mathjax-stub.js");

    fn stub_config() -> EngineConfig {
        EngineConfig {
            script: ScriptSource::Inline(STUB.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_and_serialize() {
        let mut engine = MathJaxEngine::new(stub_config()).unwrap();
        let node = engine.convert(r"\frac{a}{b}", &RenderOptions { display: true }).unwrap();
        let html = engine.outer_html(node).unwrap();
        assert!(html.starts_with("<mjx-container"));
        assert!(html.contains(r#"display="true""#));
        assert!(html.contains(r"\frac{a}{b}"));
        assert_eq!(engine.pending_nodes().unwrap(), 0);
    }

    #[test]
    fn test_rejection_is_rendering_failure() {
        let mut engine = MathJaxEngine::new(stub_config()).unwrap();
        match engine.convert(r"\frac{a}{b", &RenderOptions::default()) {
            Err(Error::RenderingFailure(msg)) => assert!(msg.contains("Missing close brace")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_release_drops_node() {
        let mut engine = MathJaxEngine::new(stub_config()).unwrap();
        let node = engine.convert("x", &RenderOptions::default()).unwrap();
        assert_eq!(engine.pending_nodes().unwrap(), 1);
        engine.release(node);
        assert_eq!(engine.pending_nodes().unwrap(), 0);
        assert!(matches!(engine.outer_html(node), Err(Error::ResultUnextractable(_))));
    }

    #[test]
    fn test_missing_api_fails_init() {
        let config = EngineConfig {
            script: ScriptSource::Inline("var MathJax = { startup: {} };".into()),
            ..Default::default()
        };
        match MathJaxEngine::new(config) {
            Err(Error::InitializationError(msg)) => assert!(msg.contains("tex2svgPromise")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("engine without tex2svgPromise must not start"),
        }
    }

    #[test]
    fn test_throwing_script_fails_init() {
        let config = EngineConfig {
            script: ScriptSource::Inline("throw new Error('boom');".into()),
            ..Default::default()
        };
        assert!(matches!(MathJaxEngine::new(config), Err(Error::InitializationError(_))));
    }

    #[test]
    fn test_unsettled_conversion_leaves_nothing_behind() {
        let config = EngineConfig {
            max_event_loop_turns: 10,
            ..stub_config()
        };
        let mut engine = MathJaxEngine::new(config).unwrap();
        match engine.convert(r"\slow", &RenderOptions::default()) {
            Err(Error::RenderingFailure(msg)) => assert!(msg.contains("did not settle")),
            other => panic!("unexpected result: {:?}", other),
        }
        // Later conversions tick the timers that finish the abandoned one
        for i in 0..20 {
            let node = engine.convert(&format!("x_{}", i), &RenderOptions::default()).unwrap();
            engine.outer_html(node).unwrap();
        }
        assert_eq!(engine.pending_nodes().unwrap(), 0);
        let jobs: usize = engine.eval_json("__maspace_pending_jobs()").unwrap();
        assert_eq!(jobs, 0);
    }

    #[test]
    fn test_runaway_loop_is_stopped() {
        let config = EngineConfig {
            script: ScriptSource::Inline("while (true) {}".into()),
            ..Default::default()
        };
        assert!(matches!(MathJaxEngine::new(config), Err(Error::InitializationError(_))));
    }

    fn loader_script() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/loader/tex-svg.js")
    }

    #[test]
    fn test_lite_adaptor_loaded_from_script_directory() {
        let config = EngineConfig {
            script: ScriptSource::Path(loader_script()),
            ..Default::default()
        };
        let mut engine = MathJaxEngine::new(config).unwrap();
        let node = engine.convert("x", &RenderOptions { display: true }).unwrap();
        let html = engine.outer_html(node).unwrap();
        assert!(html.contains(r#"data-adaptor="lite""#));
        assert!(html.contains(r#"display="true""#));
    }

    #[test]
    fn test_missing_component_fails_init() {
        let config = EngineConfig {
            script: ScriptSource::Path(loader_script()),
            component_base: Some("does/not/exist".into()),
            ..Default::default()
        };
        match MathJaxEngine::new(config) {
            Err(Error::InitializationError(msg)) => assert!(msg.contains("liteDOM.js"), "{}", msg),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("engine without an adaptor must not start"),
        }
    }

    #[test]
    fn test_no_browser_globals() {
        let mut engine = MathJaxEngine::new(stub_config()).unwrap();
        let kinds: Vec<String> = engine
            .eval_json("JSON.stringify([typeof window, typeof document])")
            .unwrap();
        assert_eq!(kinds, vec!["undefined", "undefined"]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let config = EngineConfig {
            script: ScriptSource::Path("does/not/exist.js".into()),
            ..Default::default()
        };
        assert!(matches!(MathJaxEngine::new(config), Err(Error::LoadError(_))));
    }
}
