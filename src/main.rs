use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "maspace", version, about = "Plain-text math notation to TeX and SVG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the TeX for each maspace expression
    Tex {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Typeset each expression to SVG markup with MathJax
    Render {
        /// Inline instead of display (block) math
        #[arg(long)]
        inline: bool,
        /// Inputs are TeX already; skip the maspace conversion
        #[arg(long)]
        tex: bool,
        /// MathJax build to load instead of the configured one
        #[arg(long, value_name = "PATH|URL")]
        script: Option<String>,
        /// JSON engine configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(required = true)]
        inputs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Tex { inputs } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for input in &inputs {
                let tex = maspace::maspace_to_tex(input)
                    .with_context(|| format!("converting {:?}", input))?;
                writeln!(out, "{}", tex)?;
            }
            Ok(())
        }
        Command::Render {
            inline,
            tex,
            script,
            config,
            inputs,
        } => render(inline, tex, script, config, inputs).await,
    }
}

#[cfg(feature = "mathjax")]
async fn render(
    inline: bool,
    tex: bool,
    script: Option<String>,
    config: Option<PathBuf>,
    inputs: Vec<String>,
) -> Result<()> {
    use maspace::{render_expression, EngineConfig, EngineHandle, ExpressionInput, RenderOptions, ScriptSource};

    let mut config = match config {
        Some(path) => EngineConfig::from_json_file(&path)?,
        None => EngineConfig::default(),
    };
    if let Some(script) = script {
        config.script = ScriptSource::parse(&script);
    }

    let options = RenderOptions { display: !inline };
    let requests = inputs
        .into_iter()
        .map(|input| {
            let source = if tex {
                input
            } else {
                maspace::maspace_to_tex(&input).with_context(|| format!("converting {:?}", input))?
            };
            Ok(ExpressionInput { tex: source, options })
        })
        .collect::<Result<Vec<_>>>()?;

    let engine = EngineHandle::start_mathjax(config)
        .await
        .context("starting MathJax")?;

    // All renders are queued at once; output keeps input order
    let rendered =
        futures::future::join_all(requests.iter().map(|input| render_expression(&engine, input)))
            .await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (input, markup) in requests.iter().zip(rendered) {
        let markup = markup.with_context(|| format!("rendering {:?}", input.tex))?;
        writeln!(out, "{}", markup)?;
    }
    drop(out);

    engine.close().await?;
    Ok(())
}

#[cfg(not(feature = "mathjax"))]
async fn render(
    _inline: bool,
    _tex: bool,
    _script: Option<String>,
    _config: Option<PathBuf>,
    _inputs: Vec<String>,
) -> Result<()> {
    anyhow::bail!("maspace was built without the `mathjax` feature")
}
