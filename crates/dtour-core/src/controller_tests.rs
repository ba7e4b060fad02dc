//! Controller tests against a scripted execution backend

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::client::{
    ExecutionBackend, ExecutionRequest, ExecutionResponse, GistRequest, GistResponse,
    ShortenRequest, WireDiagnostic,
};
use crate::config::Config;
use crate::controller::{ActionOutcome, TourController, WAITING_MESSAGE};
use crate::error::{Error, Result};
use crate::host::{MemoryClipboard, RecordingNavigator, Visit};
use crate::hotkeys::HotkeyDispatcher;
use crate::render::RenderedOutput;
use crate::session::{ImportParams, NavigationContext, import_key};
use crate::storage::{MemoryStorage, Storage};

type Reply<T> = oneshot::Receiver<Result<T>>;

/// Backend answering from queues filled by the test
#[derive(Default)]
struct ScriptedBackend {
    sources: Mutex<VecDeque<Result<String>>>,
    runs: Mutex<VecDeque<Reply<ExecutionResponse>>>,
    formats: Mutex<VecDeque<Reply<String>>>,
    shortens: Mutex<VecDeque<Reply<String>>>,
    gists: Mutex<VecDeque<Reply<GistResponse>>>,
    requests: Mutex<Vec<ExecutionRequest>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedBackend {
    fn source(&self, result: Result<String>) {
        self.sources.lock().unwrap().push_back(result);
    }

    /// Queue a reply that is released by the returned sender
    fn hold<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> oneshot::Sender<Result<T>> {
        let (tx, rx) = oneshot::channel();
        queue.lock().unwrap().push_back(rx);
        tx
    }

    fn pending_run(&self) -> oneshot::Sender<Result<ExecutionResponse>> {
        Self::hold(&self.runs)
    }

    fn run_reply(&self, result: Result<ExecutionResponse>) {
        let _ = self.pending_run().send(result);
    }

    fn pending_format(&self) -> oneshot::Sender<Result<String>> {
        Self::hold(&self.formats)
    }

    fn format_reply(&self, result: Result<String>) {
        let _ = self.pending_format().send(result);
    }

    fn pending_shorten(&self) -> oneshot::Sender<Result<String>> {
        Self::hold(&self.shortens)
    }

    fn shorten_reply(&self, result: Result<String>) {
        let _ = self.pending_shorten().send(result);
    }

    fn pending_gist(&self) -> oneshot::Sender<Result<GistResponse>> {
        Self::hold(&self.gists)
    }

    fn gist_reply(&self, result: Result<GistResponse>) {
        let _ = self.pending_gist().send(result);
    }

    fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn pop<T>(&self, queue: &Mutex<VecDeque<Result<T>>>, call: &'static str) -> Result<T> {
        self.calls.lock().unwrap().push(call);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other(format!("unscripted {} call", call))))
    }

    async fn answer<T>(&self, queue: &Mutex<VecDeque<Reply<T>>>, call: &'static str) -> Result<T> {
        self.calls.lock().unwrap().push(call);
        let reply = queue.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(Error::Other("reply dropped".to_string()))),
            None => Err(Error::Other(format!("unscripted {} call", call))),
        }
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn fetch_source(&self, _language: &str, _chapter_id: &str, _section: &str) -> Result<String> {
        self.pop(&self.sources, "fetch_source")
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer(&self.runs, "execute").await
    }

    async fn format(&self, _source: &str) -> Result<String> {
        self.answer(&self.formats, "format").await
    }

    async fn shorten(&self, _request: &ShortenRequest) -> Result<String> {
        self.answer(&self.shortens, "shorten").await
    }

    async fn create_gist(&self, _request: &GistRequest) -> Result<GistResponse> {
        self.answer(&self.gists, "create_gist").await
    }
}

struct Harness {
    backend: Arc<ScriptedBackend>,
    storage: Arc<MemoryStorage>,
    navigator: Arc<RecordingNavigator>,
    clipboard: Arc<MemoryClipboard>,
    controller: Arc<TourController>,
}

impl Harness {
    fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        let backend = Arc::new(ScriptedBackend::default());
        let navigator = Arc::new(RecordingNavigator::new("https://tour.dlang.org"));
        let clipboard = Arc::new(MemoryClipboard::new());
        let controller = TourController::builder()
            .config(Config::default())
            .backend(backend.clone())
            .storage(storage.clone())
            .navigator(navigator.clone())
            .clipboard(clipboard.clone())
            .build()
            .unwrap();
        Self {
            backend,
            storage,
            navigator,
            clipboard,
            controller: Arc::new(controller),
        }
    }

    async fn load_page(&self, source: &str) {
        self.backend.source(Ok(source.to_string()));
        let outcome = self.controller.init_from_context(page()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Applied);
    }

    /// Yield until the backend has received `count` execution requests
    async fn wait_for_requests(&self, count: usize) {
        for _ in 0..1000 {
            if self.backend.requests().len() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("backend never received {} requests", count);
    }

    /// Yield until the backend has seen a `call`
    async fn wait_for_call(&self, call: &str) {
        for _ in 0..1000 {
            if self.backend.calls().contains(&call) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("backend never received a {} call", call);
    }
}

fn page() -> NavigationContext {
    NavigationContext::new("en", "basics", "imports").with_repo("dlang-tour/english")
}

fn response(output: &str) -> ExecutionResponse {
    ExecutionResponse {
        output: output.to_string(),
        ..ExecutionResponse::default()
    }
}

fn server_error(body: &str) -> Error {
    Error::ServerError {
        status: 500,
        body: body.to_string(),
    }
}

// ========== Initialization ==========

#[tokio::test]
async fn test_init_from_context_loads_default() {
    let h = Harness::new();
    h.load_page("void main() {}").await;

    let session = h.controller.session();
    assert_eq!(session.source(), "void main() {}");
    assert_eq!(session.reset_code, "void main() {}");
    assert_eq!(session.persistence_key, "sourcecode_en_basics_imports");
    assert_eq!(session.compiler, "dmd");
}

#[tokio::test]
async fn test_edit_survives_new_page_load() {
    let storage = Arc::new(MemoryStorage::new());
    let first = Harness::with_storage(storage.clone());
    first.load_page("void main() {}").await;
    first.controller.edit("void main() { int x; }");
    first.controller.set_args("-O");

    let second = Harness::with_storage(storage);
    second.load_page("void main() {}").await;
    let session = second.controller.session();
    assert_eq!(session.source(), "void main() { int x; }");
    assert_eq!(session.reset_code, "void main() {}");
    assert_eq!(session.args, "-O");
}

#[tokio::test]
async fn test_reset_restores_latest_baseline() {
    let h = Harness::new();
    h.load_page("baseline").await;
    h.controller.edit("edited once");
    h.controller.edit("edited twice");
    h.controller.set_compiler("ldc");
    h.controller.reset();

    let session = h.controller.session();
    assert_eq!(session.source(), "baseline");
    assert_eq!(session.compiler, "dmd");
    assert_eq!(
        h.storage.get("sourcecode_en_basics_imports").unwrap().as_deref(),
        Some("baseline")
    );
}

#[tokio::test]
async fn test_init_from_context_fetch_failure() {
    let h = Harness::new();
    h.backend.source(Err(server_error("no such page")));

    let outcome = h.controller.init_from_context(page()).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Failed);
    assert!(!h.controller.session().is_loaded());
    assert_eq!(
        h.controller.output(),
        RenderedOutput::Text("Server error: no such page".to_string())
    );
}

#[tokio::test]
async fn test_init_from_context_rejects_empty_ids() {
    let h = Harness::new();
    let err = h
        .controller
        .init_from_context(NavigationContext::new("en", "", "imports"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_page_without_snippet_does_not_fetch() {
    let h = Harness::new();
    let context = page().with_source(false);
    let outcome = h.controller.init_from_context(context).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Skipped);
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_navigation_clears_share_link_and_output() {
    let h = Harness::new();
    h.load_page("a").await;
    h.backend.shorten_reply(Ok("https://is.gd/x".to_string()));
    h.controller.shorten().await;
    assert!(h.controller.share_link().is_some());

    h.load_page("b").await;
    assert!(h.controller.share_link().is_none());
    assert_eq!(h.controller.output(), RenderedOutput::default());
}

#[tokio::test]
async fn test_init_from_import_with_url_source() {
    let h = Harness::new();
    let params = ImportParams::for_host("run.dlang.io")
        .with_source("void main() {}")
        .with_compiler("ldc");

    h.controller.init_from_import(None, &params).unwrap();
    let session = h.controller.session();
    assert_eq!(session.persistence_key, import_key("void main() {}"));
    assert_eq!(session.compiler, "ldc");
}

#[tokio::test]
async fn test_init_from_import_decodes_embedded_default() {
    let h = Harness::new();
    let params = ImportParams::for_host("run.dlang.io");

    // "void main() {}"
    h.controller
        .init_from_import(Some("dm9pZCBtYWluKCkge30="), &params)
        .unwrap();
    let session = h.controller.session();
    assert_eq!(session.source(), "void main() {}");
    assert_eq!(session.persistence_key, "run_import_default_run.dlang.io");
}

#[tokio::test]
async fn test_init_from_import_invalid_base64() {
    let h = Harness::new();
    let params = ImportParams::for_host("run.dlang.io");

    let err = h.controller.init_from_import(Some("%%%"), &params).unwrap_err();
    assert!(matches!(err, Error::DecodeError(_)));
    assert!(!h.controller.session().is_loaded());
    assert!(h.controller.output().as_str().starts_with("Failed to decode snippet"));
}

// ========== Execution ==========

#[tokio::test]
async fn test_run_applies_output_and_diagnostics() {
    let h = Harness::new();
    h.load_page("import std.stdio;\nvoid main() { x; }").await;
    h.controller.set_args("-g");
    h.backend.run_reply(Ok(ExecutionResponse {
        output: "\u{1b}[31monlineapp.d(2): Error\u{1b}[0m".to_string(),
        errors: vec![WireDiagnostic {
            line: 2,
            message: "undefined identifier x".to_string(),
        }],
        warnings: vec![WireDiagnostic {
            line: 1,
            message: "unused import".to_string(),
        }],
    }));

    assert_eq!(h.controller.run(None).await, ActionOutcome::Applied);

    let request = &h.backend.requests()[0];
    assert_eq!(request.args, "-g");
    assert!(request.color);
    assert_eq!(request.compiler, "dmd");

    let view = h.controller.view();
    assert!(view.lint_enabled);
    assert_eq!(view.diagnostics.len(), 2);
    assert!(view.output.is_markup());
    assert!(view.output.as_str().contains("color:#aa0000"));

    let annotations = h.controller.annotations();
    assert_eq!(annotations[0].from_line, 1);
    assert_eq!(annotations[0].to_col, "void main() { x; }".len());
    assert_eq!(annotations[1].from_line, 0);
}

#[tokio::test]
async fn test_run_shows_waiting_state_while_in_flight() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply = h.backend.pending_run();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.run(None).await });
    h.wait_for_requests(1).await;

    let view = h.controller.view();
    assert_eq!(view.output, RenderedOutput::Text(WAITING_MESSAGE.to_string()));
    assert!(!view.lint_enabled);
    assert!(view.diagnostics.is_empty());
    assert!(h.controller.progress().is_running());

    reply.send(Ok(response("done"))).unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Applied);
    assert!(!h.controller.progress().is_running());
    assert!(!h.controller.lint_enabled());
}

#[tokio::test]
async fn test_latest_run_wins_over_late_response() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply_a = h.backend.pending_run();
    let reply_b = h.backend.pending_run();

    let controller = h.controller.clone();
    let run_a = tokio::spawn(async move { controller.run(None).await });
    h.wait_for_requests(1).await;

    let controller = h.controller.clone();
    let run_b = tokio::spawn(async move { controller.run(Some("-O".to_string())).await });
    h.wait_for_requests(2).await;

    reply_b.send(Ok(response("B"))).unwrap();
    assert_eq!(run_b.await.unwrap(), ActionOutcome::Applied);

    reply_a.send(Ok(response("A"))).unwrap();
    assert_eq!(run_a.await.unwrap(), ActionOutcome::Discarded);

    assert_eq!(h.controller.view().raw_output, "B");
    assert_eq!(h.controller.output().as_str(), "B");
}

#[tokio::test]
async fn test_superseded_run_keeps_successor_progress() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply_a = h.backend.pending_run();
    let reply_b = h.backend.pending_run();

    let controller = h.controller.clone();
    let run_a = tokio::spawn(async move { controller.run(None).await });
    h.wait_for_requests(1).await;
    let controller = h.controller.clone();
    let run_b = tokio::spawn(async move { controller.run(None).await });
    h.wait_for_requests(2).await;

    reply_a.send(Ok(response("A"))).unwrap();
    assert_eq!(run_a.await.unwrap(), ActionOutcome::Discarded);
    assert!(h.controller.progress().is_running());

    reply_b.send(Ok(response("B"))).unwrap();
    assert_eq!(run_b.await.unwrap(), ActionOutcome::Applied);
    assert!(!h.controller.progress().is_running());
}

#[tokio::test]
async fn test_run_failure_renders_server_error() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    h.backend.run_reply(Err(server_error("compiler crashed\n")));

    assert_eq!(h.controller.run(None).await, ActionOutcome::Failed);
    assert_eq!(
        h.controller.output(),
        RenderedOutput::Text("Server error: compiler crashed".to_string())
    );
}

#[tokio::test]
async fn test_run_without_session_is_skipped() {
    let h = Harness::new();
    assert_eq!(h.controller.run(None).await, ActionOutcome::Skipped);
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn test_asm_unsupported_compiler_sends_nothing() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    h.controller.set_compiler("gdc");

    assert_eq!(h.controller.asm().await, ActionOutcome::Unsupported);
    assert!(h.backend.requests().is_empty());
    assert_eq!(
        h.controller.output(),
        RenderedOutput::Text("gdc doesn't support ASM output".to_string())
    );
}

#[tokio::test]
async fn test_ir_on_ldc_is_highlighted() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    h.controller.set_compiler("ldc");
    h.backend.run_reply(Ok(response("define i32 @_Dmain() {\n  ret i32 0\n}")));

    assert_eq!(h.controller.ir().await, ActionOutcome::Applied);
    assert_eq!(h.backend.requests()[0].args, "-output-ll");
    assert!(h.controller.output().as_str().contains("hl-keyword"));
    assert_eq!(h.controller.session().args, "");
}

// ========== Format and sharing ==========

#[tokio::test]
async fn test_format_replaces_source_only() {
    let h = Harness::new();
    h.load_page("void main(){}").await;
    h.controller.set_compiler("ldc");
    h.backend.format_reply(Ok("void main() {}\n".to_string()));

    assert_eq!(h.controller.format().await, ActionOutcome::Applied);
    let session = h.controller.session();
    assert_eq!(session.source(), "void main() {}\n");
    assert_eq!(session.reset_code, "void main(){}");
    assert_eq!(session.compiler, "ldc");
    assert_eq!(
        h.storage.get("sourcecode_en_basics_imports").unwrap().as_deref(),
        Some("void main() {}\n")
    );
}

#[tokio::test]
async fn test_shorten_and_copy_link() {
    let h = Harness::new();
    h.load_page("void main() {}").await;

    let err = h.controller.copy_share_link().unwrap_err();
    assert!(matches!(err, Error::NoShareLink));

    h.backend.shorten_reply(Ok("https://is.gd/abc".to_string()));
    assert_eq!(h.controller.shorten().await, ActionOutcome::Applied);
    assert_eq!(h.controller.copy_share_link().unwrap(), "https://is.gd/abc");
    assert_eq!(h.clipboard.content().as_deref(), Some("https://is.gd/abc"));
}

#[tokio::test]
async fn test_create_gist_opens_and_shares() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    h.backend.gist_reply(Ok(GistResponse {
        id: "abc123".to_string(),
        html_url: "https://gist.github.com/abc123".to_string(),
    }));

    assert_eq!(h.controller.create_gist().await, ActionOutcome::Applied);
    assert_eq!(
        h.navigator.last(),
        Some(Visit::NewContext("https://gist.github.com/abc123".to_string()))
    );
    assert_eq!(
        h.controller.share_link().unwrap().url,
        "https://tour.dlang.org/gist?id=abc123&compiler=dmd&args="
    );
}

fn next_page() -> NavigationContext {
    NavigationContext::new("en", "basics", "functions").with_repo("dlang-tour/english")
}

/// Navigate to `next_page` while a session-bound request is in flight
async fn move_to_next_page(h: &Harness) {
    h.backend.source(Ok("void next() {}".to_string()));
    let outcome = h.controller.init_from_context(next_page()).await.unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);
}

#[tokio::test]
async fn test_format_reply_after_navigation_is_discarded() {
    let h = Harness::new();
    h.load_page("void main(){}").await;
    let reply = h.backend.pending_format();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.format().await });
    h.wait_for_call("format").await;
    move_to_next_page(&h).await;

    reply.send(Ok("void main() {}\n".to_string())).unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Discarded);

    assert_eq!(h.controller.source(), "void next() {}");
    assert_eq!(h.storage.get("sourcecode_en_basics_functions").unwrap(), None);
    assert_eq!(h.storage.get("sourcecode_en_basics_imports").unwrap(), None);
}

#[tokio::test]
async fn test_format_reply_after_import_is_discarded() {
    let h = Harness::new();
    h.load_page("void main(){}").await;
    let reply = h.backend.pending_format();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.format().await });
    h.wait_for_call("format").await;

    let params = ImportParams::for_host("run.dlang.io").with_source("int x;");
    h.controller.init_from_import(None, &params).unwrap();

    reply.send(Ok("void main() {}\n".to_string())).unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Discarded);
    assert_eq!(h.controller.source(), "int x;");
}

#[tokio::test]
async fn test_shorten_reply_after_navigation_is_discarded() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply = h.backend.pending_shorten();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.shorten().await });
    h.wait_for_call("shorten").await;
    move_to_next_page(&h).await;

    reply.send(Ok("https://is.gd/old".to_string())).unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Discarded);
    assert!(h.controller.share_link().is_none());
}

#[tokio::test]
async fn test_late_shorten_failure_leaves_new_page_output() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply = h.backend.pending_shorten();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.shorten().await });
    h.wait_for_call("shorten").await;
    move_to_next_page(&h).await;

    reply.send(Err(server_error("down"))).unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Discarded);
    assert_eq!(h.controller.output(), RenderedOutput::default());
}

#[tokio::test]
async fn test_gist_reply_after_navigation_is_discarded() {
    let h = Harness::new();
    h.load_page("void main() {}").await;
    let reply = h.backend.pending_gist();

    let controller = h.controller.clone();
    let task = tokio::spawn(async move { controller.create_gist().await });
    h.wait_for_call("create_gist").await;
    move_to_next_page(&h).await;

    reply
        .send(Ok(GistResponse {
            id: "abc123".to_string(),
            html_url: "https://gist.github.com/abc123".to_string(),
        }))
        .unwrap();
    assert_eq!(task.await.unwrap(), ActionOutcome::Discarded);
    assert!(h.controller.share_link().is_none());
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_import_from_gist_navigates_to_id() {
    let h = Harness::new();
    h.load_page("void main() {}").await;

    let outcome = h
        .controller
        .import_from_gist("https://gist.github.com/anonymous/abc123")
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);

    let visit = h.navigator.last().unwrap();
    let url = url::Url::parse(visit.url()).unwrap();
    assert_eq!(url.path_segments().unwrap().last(), Some("abc123"));
    assert_eq!(url.path(), "/gist/abc123");

    assert_eq!(h.controller.import_from_gist("").unwrap(), ActionOutcome::Skipped);
    assert_eq!(h.navigator.visits().len(), 1);
}

#[tokio::test]
async fn test_standalone_url_and_github_link() {
    let h = Harness::new();
    h.load_page("void main() {}").await;

    let url = h.controller.build_standalone_url().unwrap();
    assert!(url.starts_with("https://run.dlang.io/?compiler=dmd&args=&source=void%20main"));

    assert_eq!(
        h.controller.edit_on_github_url().as_deref(),
        Some("https://github.com/dlang-tour/english/edit/master/public/content/en/basics/imports.md")
    );
    assert!(h.controller.edit_on_github().unwrap());
}

#[tokio::test]
async fn test_add_library_edits_and_persists() {
    let h = Harness::new();
    h.load_page("void main() {}").await;

    assert_eq!(h.controller.add_library("mir", "1.1.1"), ActionOutcome::Applied);
    let expected = "/+dub.sdl:\ndependency \"mir\" version=\"~>1.1.1\"\n+/\nvoid main() {}";
    assert_eq!(h.controller.source(), expected);
    assert_eq!(
        h.storage.get("sourcecode_en_basics_imports").unwrap().as_deref(),
        Some(expected)
    );
}

#[tokio::test]
async fn test_add_library_rejects_json_header() {
    let h = Harness::new();
    h.load_page("/+dub.json:\n{}\n+/\nvoid main() {}").await;

    assert_eq!(h.controller.add_library("mir", "1.1.1"), ActionOutcome::Failed);
    assert!(h.controller.output().as_str().contains("Unsupported package header"));
}

// ========== Navigation and hotkeys ==========

#[tokio::test]
async fn test_navigation_to_neighbours() {
    let h = Harness::new();
    h.backend.source(Ok("x".to_string()));
    let context = page().with_pages(Some("/tour/en/basics/modules".to_string()), None);
    h.controller.init_from_context(context).await.unwrap();

    assert!(h.controller.navigate_prev().unwrap());
    assert_eq!(
        h.navigator.last(),
        Some(Visit::Navigate("https://tour.dlang.org/tour/en/basics/modules".to_string()))
    );
    assert!(!h.controller.navigate_next().unwrap());
    assert_eq!(h.navigator.visits().len(), 1);
}

#[tokio::test]
async fn test_hotkey_dispatch() {
    let h = Harness::new();
    h.load_page("baseline").await;
    h.controller.edit("changed");
    let hotkeys = HotkeyDispatcher::default();

    let dispatch = hotkeys
        .dispatch(&h.controller, &"ctrl+r".parse().unwrap())
        .await
        .unwrap();
    assert!(dispatch.handled);
    assert!(dispatch.prevent_default);
    assert_eq!(h.controller.source(), "baseline");

    let dispatch = hotkeys
        .dispatch(&h.controller, &"left".parse().unwrap())
        .await
        .unwrap();
    assert!(!dispatch.handled);
    assert!(!dispatch.prevent_default);

    let dispatch = hotkeys
        .dispatch(&h.controller, &"ctrl+x".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(dispatch.action, None);
}
