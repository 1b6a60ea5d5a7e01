use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{oneshot, watch};

use crate::{EngineConfig, Error, RenderOptions, Result, TypesetEngine};

/// Lifecycle of the engine behind an [`EngineHandle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// The worker is still constructing the engine
    Loading,
    /// Conversions are accepted
    Ready,
    /// Construction failed; the message is the initialization error
    Failed(String),
    /// The worker has shut down
    Closed,
}

/// Per-call limits applied by the handle before and while talking to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleLimits {
    /// 0 => wait forever
    pub render_timeout_ms: u64,
    /// 0 => unlimited
    pub max_expression_bytes: usize,
}

impl Default for HandleLimits {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for HandleLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            render_timeout_ms: config.render_timeout_ms,
            max_expression_bytes: config.max_expression_bytes,
        }
    }
}

enum Command {
    Convert(String, RenderOptions, oneshot::Sender<Result<u64>>),
    Serialize(u64, oneshot::Sender<Result<String>>),
    Release(u64),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly engine handle backed by a dedicated worker thread.
///
/// The worker thread owns the (possibly non-`Send`) [`TypesetEngine`] and
/// executes commands sent from async tasks. Clones share the same worker, so
/// the handle can be passed to concurrent renders freely. Commands are run
/// one at a time in arrival order.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: Sender<Command>,
    state: watch::Receiver<EngineState>,
    limits: HandleLimits,
}

/// A conversion result still held by the engine.
///
/// Pass it to [`EngineHandle::outer_html`] to serialize it; dropping it
/// releases the node inside the engine.
pub struct RenderedNode {
    id: u64,
    cmd_tx: Sender<Command>,
    consumed: bool,
}

impl RenderedNode {
    fn into_id(mut self) -> u64 {
        self.consumed = true;
        self.id
    }
}

impl Drop for RenderedNode {
    fn drop(&mut self) {
        if !self.consumed {
            let _ = self.cmd_tx.send(Command::Release(self.id));
        }
    }
}

impl std::fmt::Debug for RenderedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedNode").field("id", &self.id).finish()
    }
}

impl EngineHandle {
    /// Spawn the worker thread and return immediately.
    ///
    /// `factory` runs on the worker thread. Until it returns the handle is in
    /// [`EngineState::Loading`] and every conversion fails with
    /// [`Error::RenderingEngineUnavailable`].
    pub fn launch<E, F>(limits: HandleLimits, factory: F) -> Self
    where
        E: TypesetEngine + 'static,
        F: FnOnce() -> Result<E> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (state_tx, state_rx) = watch::channel(EngineState::Loading);

        thread::spawn(move || {
            // Initialize engine on the worker thread
            let mut engine = match factory() {
                Ok(e) => e,
                Err(err) => {
                    warn!("typesetting engine failed to initialize: {}", err);
                    let _ = state_tx.send(EngineState::Failed(err.to_string()));
                    return;
                }
            };
            info!("typesetting engine ready");
            let _ = state_tx.send(EngineState::Ready);

            let mut nodes: HashMap<u64, E::Node> = HashMap::new();
            let mut next_id: u64 = 0;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Convert(tex, options, resp) => {
                        debug!("convert ({} bytes, display={})", tex.len(), options.display);
                        let res = engine.convert(&tex, &options).map(|node| {
                            next_id += 1;
                            nodes.insert(next_id, node);
                            next_id
                        });
                        // Caller gave up (timeout or cancellation); don't keep the node
                        if let Err(Ok(id)) = resp.send(res) {
                            if let Some(node) = nodes.remove(&id) {
                                engine.release(node);
                            }
                        }
                    }
                    Command::Serialize(id, resp) => {
                        let res = match nodes.remove(&id) {
                            Some(node) => engine.outer_html(node),
                            None => Err(Error::ResultUnextractable(format!(
                                "unknown result node {}",
                                id
                            ))),
                        };
                        let _ = resp.send(res);
                    }
                    Command::Release(id) => {
                        if let Some(node) = nodes.remove(&id) {
                            engine.release(node);
                        }
                    }
                    Command::Close(resp) => {
                        for (_, node) in nodes.drain() {
                            engine.release(node);
                        }
                        let _ = state_tx.send(EngineState::Closed);
                        let _ = resp.send(Ok(()));
                        break;
                    }
                }
            }
            debug!("typesetting worker exiting");
            let _ = state_tx.send(EngineState::Closed);
        });

        Self {
            cmd_tx,
            state: state_rx,
            limits,
        }
    }

    /// Spawn the worker and wait until the engine is ready.
    pub async fn start<E, F>(limits: HandleLimits, factory: F) -> Result<Self>
    where
        E: TypesetEngine + 'static,
        F: FnOnce() -> Result<E> + Send + 'static,
    {
        let handle = Self::launch(limits, factory);
        handle.wait_ready().await?;
        Ok(handle)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    pub fn limits(&self) -> HandleLimits {
        self.limits
    }

    /// Wait for initialization to finish.
    ///
    /// Returns the initialization error if the engine failed to load.
    pub async fn wait_ready(&self) -> Result<()> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| *s != EngineState::Loading)
            .await
            .map_err(|_| Error::RenderingEngineUnavailable)?
            .clone();
        match settled {
            EngineState::Ready => Ok(()),
            EngineState::Failed(msg) => Err(Error::InitializationError(msg)),
            EngineState::Loading | EngineState::Closed => Err(Error::RenderingEngineUnavailable),
        }
    }

    /// Convert TeX into a result node held by the engine.
    pub async fn convert(&self, tex: &str, options: RenderOptions) -> Result<RenderedNode> {
        self.ensure_ready()?;
        let max = self.limits.max_expression_bytes;
        if max > 0 && tex.len() > max {
            return Err(Error::InputRejected {
                len: tex.len(),
                max,
            });
        }
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Convert(tex.to_string(), options, tx))
            .map_err(|_| Error::RenderingEngineUnavailable)?;
        let id = self.wait(rx).await?;
        Ok(RenderedNode {
            id,
            cmd_tx: self.cmd_tx.clone(),
            consumed: false,
        })
    }

    /// Serialize a result node into markup. The node is consumed.
    pub async fn outer_html(&self, node: RenderedNode) -> Result<String> {
        let id = node.into_id();
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Serialize(id, tx))
            .map_err(|_| Error::RenderingEngineUnavailable)?;
        self.wait(rx).await
    }

    /// Stop the worker. Other clones see [`EngineState::Closed`] afterwards.
    pub async fn close(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Close(tx)).is_err() {
            // Worker already gone
            return Ok(());
        }
        rx.await.map_err(|_| Error::RenderingEngineUnavailable)?
    }

    fn ensure_ready(&self) -> Result<()> {
        match *self.state.borrow() {
            EngineState::Ready => Ok(()),
            _ => Err(Error::RenderingEngineUnavailable),
        }
    }

    async fn wait<T>(&self, rx: oneshot::Receiver<Result<T>>) -> Result<T> {
        let timeout_ms = self.limits.render_timeout_ms;
        let res = if timeout_ms > 0 {
            tokio::time::timeout(Duration::from_millis(timeout_ms), rx)
                .await
                .map_err(|_| Error::Timeout(timeout_ms))?
        } else {
            rx.await
        };
        res.map_err(|_| Error::RenderingEngineUnavailable)?
    }
}

#[cfg(feature = "mathjax")]
impl EngineHandle {
    /// Launch a [`MathJaxEngine`](crate::mathjax::MathJaxEngine) without waiting for it to load.
    pub fn launch_mathjax(config: EngineConfig) -> Self {
        let limits = HandleLimits::from(&config);
        Self::launch(limits, move || crate::mathjax::MathJaxEngine::new(config))
    }

    /// Launch a [`MathJaxEngine`](crate::mathjax::MathJaxEngine) and wait until it is ready.
    pub async fn start_mathjax(config: EngineConfig) -> Result<Self> {
        let handle = Self::launch_mathjax(config);
        handle.wait_ready().await?;
        Ok(handle)
    }
}
