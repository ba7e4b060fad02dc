//! End-to-end tests: HTTP backend, file storage and controller together

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use dtour_core::client::{ExecutionBackend, ExecutionRequest, GistRequest, HttpBackend};
use dtour_core::config::Config;
use dtour_core::controller::{ActionOutcome, TourController};
use dtour_core::error::Error;
use dtour_core::host::RecordingNavigator;
use dtour_core::render::RenderedOutput;
use dtour_core::session::NavigationContext;
use dtour_core::storage::{JsonFileStorage, Storage};

/// Serve `replies` in order, one per connection; yields the raw requests
async fn serve(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let reason = if status == 200 { "OK" } else { "Internal Server Error" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        requests
    });

    (base, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        if data.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

fn backend(base: &str) -> HttpBackend {
    HttpBackend::builder()
        .api_base(base)
        .gist_api(base)
        .timeout_secs(5)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_http_run_wire_format() {
    let (base, server) = serve(vec![(
        200,
        r#"{"output":"Hello","errors":[],"warnings":[{"line":3,"message":"deprecated"}]}"#,
    )])
    .await;

    let response = backend(&base)
        .execute(&ExecutionRequest::new("void main() {}", "dmd", "-O"))
        .await
        .unwrap();
    assert_eq!(response.output, "Hello");
    assert_eq!(response.warnings[0].line, 3);

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /api/v1/run HTTP/1.1"));
    assert!(requests[0].contains(r#""color":true"#));
    assert!(requests[0].contains(r#""args":"-O""#));
}

#[tokio::test]
async fn test_http_fetch_source_path() {
    let (base, server) = serve(vec![(200, r#"{"sourceCode":"import std.stdio;"}"#)]).await;

    let source = backend(&base)
        .fetch_source("en", "basics", "imports")
        .await
        .unwrap();
    assert_eq!(source, "import std.stdio;");

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /api/v1/source/en/basics/imports HTTP/1.1"));
}

#[tokio::test]
async fn test_http_error_status_keeps_body() {
    let (base, _server) = serve(vec![(500, "sandbox unavailable")]).await;

    let err = backend(&base).format("void main(){}").await.unwrap_err();
    match err {
        Error::ServerError { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "sandbox unavailable");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_gist_posts_single_file() {
    let (base, server) = serve(vec![(
        200,
        r#"{"id":"abc123","html_url":"https://gist.github.com/abc123"}"#,
    )])
    .await;

    let gist = backend(&base)
        .create_gist(&GistRequest::for_source("void main() {}"))
        .await
        .unwrap();
    assert_eq!(gist.id, "abc123");

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /gists HTTP/1.1"));
    assert!(requests[0].contains(r#""main.d""#));
}

#[tokio::test]
async fn test_controller_session_survives_restart() {
    let (base, _server) = serve(vec![
        (200, r#"{"sourceCode":"void main() {}"}"#),
        (200, r#"{"sourceCode":"void main() {}"}"#),
        (200, r#"{"output":"\u001b[32mok\u001b[0m"}"#),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.json");
    let page = NavigationContext::new("en", "basics", "imports");

    let build = || {
        TourController::builder()
            .config(Config::default())
            .backend(Arc::new(backend(&base)))
            .storage(Arc::new(JsonFileStorage::new(&path)))
            .navigator(Arc::new(RecordingNavigator::new("https://tour.dlang.org")))
            .build()
            .unwrap()
    };

    let first = build();
    assert_eq!(
        first.init_from_context(page.clone()).await.unwrap(),
        ActionOutcome::Applied
    );
    first.edit("void main() { writeln(1); }");
    drop(first);

    let storage = JsonFileStorage::new(&path);
    assert_eq!(
        storage.get("sourcecode_en_basics_imports").unwrap().as_deref(),
        Some("void main() { writeln(1); }")
    );

    let second = build();
    second.init_from_context(page).await.unwrap();
    assert_eq!(second.source(), "void main() { writeln(1); }");

    assert_eq!(second.run(None).await, ActionOutcome::Applied);
    match second.output() {
        RenderedOutput::Markup(html) => {
            assert_eq!(html.as_str(), "<span style=\"color:#00aa00\">ok</span>");
        }
        other => panic!("expected markup, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_service_renders_server_error() {
    let http = HttpBackend::builder()
        .api_base("http://127.0.0.1:9")
        .timeout_secs(2)
        .build()
        .unwrap();
    let controller = TourController::builder()
        .backend(Arc::new(http))
        .build()
        .unwrap();

    let outcome = controller
        .init_from_context(NavigationContext::new("en", "basics", "imports"))
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Failed);
    assert!(controller.output().as_str().starts_with("Server error: "));
    assert!(!controller.session().is_loaded());
}
