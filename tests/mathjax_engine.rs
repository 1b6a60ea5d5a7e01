//! MathJax backend driven through `EngineHandle`, using a stub MathJax build
#![cfg(feature = "mathjax")]

use std::path::PathBuf;

use maspace::markup::{is_display_block, root_element_name};
use maspace::{
    render_expression, render_maspace, EngineConfig, EngineHandle, Error, ExpressionInput,
    RenderOptions, ScriptSource,
};
use tiny_http::{Response, Server};

const STUB: &str = include_str!("fixtures/mathjax-stub.js");
const LOADER: &str = include_str!("fixtures/loader/tex-svg.js");
const LITE_ADAPTOR: &str = include_str!("fixtures/loader/adaptors/liteDOM.js");

fn stub_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mathjax-stub.js")
}

fn stub_config() -> EngineConfig {
    EngineConfig {
        script: ScriptSource::Path(stub_path()),
        ..Default::default()
    }
}

/// Serve the stub at `/mathjax.js` and the loader build under `/es5/`;
/// every other path is a 404.
fn start_script_server(requests: usize) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    std::thread::spawn(move || {
        for _ in 0..requests {
            let request = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let body = match request.url() {
                "/mathjax.js" => Some(STUB),
                "/es5/tex-svg.js" => Some(LOADER),
                "/es5/adaptors/liteDOM.js" => Some(LITE_ADAPTOR),
                _ => None,
            };
            let response = match body {
                Some(script) => Response::from_string(script).with_header(
                    "Content-Type: application/javascript"
                        .parse::<tiny_http::Header>()
                        .unwrap(),
                ),
                None => Response::from_string("Not Found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_render_with_stub_from_file() {
    let engine = EngineHandle::start_mathjax(stub_config()).await.unwrap();

    let html = render_expression(&engine, &ExpressionInput::display(r"\frac{a}{b}"))
        .await
        .unwrap();
    assert_eq!(root_element_name(&html).as_deref(), Some("mjx-container"));
    assert!(is_display_block(&html));
    assert!(html.contains(r#"data-tex="\frac{a}{b}""#));

    let inline = render_expression(&engine, &ExpressionInput::inline(r"\frac{a}{b}"))
        .await
        .unwrap();
    assert!(!is_display_block(&inline));

    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_render_with_stub_from_url() {
    let base = start_script_server(1);
    let config = EngineConfig {
        script: ScriptSource::parse(&format!("{}/mathjax.js", base)),
        ..Default::default()
    };
    let engine = EngineHandle::start_mathjax(config).await.unwrap();
    let html = render_expression(&engine, &ExpressionInput::inline("x^2"))
        .await
        .unwrap();
    assert!(html.contains(r#"data-tex="x^2""#));
}

#[tokio::test]
async fn test_lite_adaptor_fetched_next_to_script() {
    let base = start_script_server(2);
    let config = EngineConfig {
        script: ScriptSource::parse(&format!("{}/es5/tex-svg.js", base)),
        ..Default::default()
    };
    let engine = EngineHandle::start_mathjax(config).await.unwrap();
    let html = render_expression(&engine, &ExpressionInput::inline("y"))
        .await
        .unwrap();
    assert_eq!(root_element_name(&html).as_deref(), Some("mjx-container"));
    assert!(html.contains(r#"data-adaptor="lite""#));
    assert!(!is_display_block(&html));
}

#[tokio::test]
async fn test_missing_script_url_fails_to_start() {
    let base = start_script_server(1);
    let config = EngineConfig {
        script: ScriptSource::Url(format!("{}/missing.js", base)),
        ..Default::default()
    };
    let engine = EngineHandle::launch_mathjax(config);
    match engine.wait_ready().await {
        Err(Error::InitializationError(msg)) => assert!(msg.contains("404"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
    let res = render_expression(&engine, &ExpressionInput::inline("x")).await;
    assert!(matches!(res, Err(Error::RenderingEngineUnavailable)));
}

#[tokio::test]
async fn test_malformed_tex_is_rendering_failure() {
    let engine = EngineHandle::start_mathjax(stub_config()).await.unwrap();
    match render_expression(&engine, &ExpressionInput::display(r"\frac{a}{b")).await {
        Err(Error::RenderingFailure(msg)) => assert!(msg.contains("Missing close brace")),
        other => panic!("expected rendering failure, got {:?}", other),
    }
    match render_expression(&engine, &ExpressionInput::display("a}")).await {
        Err(Error::RenderingFailure(msg)) => assert!(msg.contains("Extra close brace")),
        other => panic!("expected rendering failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unserializable_node() {
    let engine = EngineHandle::start_mathjax(stub_config()).await.unwrap();
    let res = render_expression(&engine, &ExpressionInput::display(r"\unserializable")).await;
    match res {
        Err(Error::ResultUnextractable(msg)) => assert!(msg.contains("cannot be serialized")),
        other => panic!("expected unextractable result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_stub_renders() {
    let engine = EngineHandle::start_mathjax(stub_config()).await.unwrap();
    let inputs: Vec<ExpressionInput> = (0..20)
        .map(|i| ExpressionInput::display(format!("a_{{{}}}", i)))
        .collect();
    let results =
        futures::future::join_all(inputs.iter().map(|input| render_expression(&engine, input)))
            .await;
    for (input, result) in inputs.iter().zip(results) {
        let html = result.unwrap();
        assert!(html.contains(&format!(r#"data-tex="{}""#, input.tex)));
    }
}

#[tokio::test]
async fn test_render_maspace_through_stub() {
    let engine = EngineHandle::start_mathjax(stub_config()).await.unwrap();
    let html = render_maspace(&engine, "x^2 / 2", RenderOptions { display: true })
        .await
        .unwrap();
    assert!(html.contains(r#"data-tex="\frac{x^{2}}{2}""#));
}

#[tokio::test]
#[ignore] // Requires network access to the MathJax CDN
async fn test_real_mathjax_from_cdn() {
    let engine = EngineHandle::start_mathjax(EngineConfig::default())
        .await
        .expect("MathJax failed to load");
    let html = render_expression(&engine, &ExpressionInput::display(r"\frac{a}{b}"))
        .await
        .unwrap();
    assert_eq!(root_element_name(&html).as_deref(), Some("mjx-container"));
    assert!(html.contains("<svg"));
    assert!(is_display_block(&html));

    let bad = render_expression(&engine, &ExpressionInput::display(r"\frac{a}{b")).await;
    assert!(matches!(bad, Err(Error::RenderingFailure(_))));
}

#[tokio::test]
#[ignore] // Requires MASPACE_MATHJAX_DIR pointing at a MathJax 3 `es5` directory
async fn test_real_mathjax_from_directory() {
    let dir = PathBuf::from(std::env::var("MASPACE_MATHJAX_DIR").expect("MASPACE_MATHJAX_DIR not set"));
    let config = EngineConfig {
        script: ScriptSource::Path(dir.join("tex-svg-full.js")),
        ..Default::default()
    };
    let engine = EngineHandle::start_mathjax(config)
        .await
        .expect("MathJax failed to start with the lite adaptor");
    let html = render_expression(&engine, &ExpressionInput::display(r"\frac{a}{b}"))
        .await
        .unwrap();
    assert_eq!(root_element_name(&html).as_deref(), Some("mjx-container"));
    assert!(html.contains("<svg"));
    assert!(is_display_block(&html));
}
