//! Tour controller
//!
//! One [`TourController`] is built per page load. It owns the session store,
//! the view state and the progress indicator, and routes every user action
//! through the execution backend and back into the renderer and the
//! diagnostics mapper.
//!
//! Actions take `&self`; overlapping actions interleave at await points.
//! Run-family requests (run, asm, ir, ast) capture a generation ticket when
//! issued and only apply their result if no newer run-family request was
//! issued in the meantime. Session-bound requests (format, shorten, gist)
//! capture the session epoch and are dropped if a navigation or import
//! replaced the session before the reply arrived.

mod builder;
mod variant;
mod view;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::{ExecutionBackend, ExecutionRequest, GistRequest, Purpose, ShortenRequest};
use crate::config::Config;
use crate::diagnostics::{Annotation, DiagnosticSet};
use crate::error::{Error, Result};
use crate::events::{EventBus, TourEvent};
use crate::host::{Clipboard, Navigator};
use crate::library;
use crate::progress::ProgressIndicator;
use crate::render::{self, RenderedOutput};
use crate::session::{ImportParams, NavigationContext, Session, SessionStore};
use crate::share::{self, ShareLink};

pub use builder::TourControllerBuilder;
pub use variant::variant_args;
pub use view::{ActionOutcome, ViewState, WAITING_MESSAGE};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Session controller for one page
pub struct TourController {
    config: Config,
    store: Mutex<SessionStore>,
    view: Mutex<ViewState>,
    context: Mutex<Option<NavigationContext>>,
    generation: AtomicU64,
    epoch: AtomicU64,
    progress: ProgressIndicator,
    events: EventBus,
    backend: Arc<dyn ExecutionBackend>,
    navigator: Arc<dyn Navigator>,
    clipboard: Arc<dyn Clipboard>,
}

impl std::fmt::Debug for TourController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourController")
            .field("session", &self.session())
            .field("view", &self.view())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("epoch", &self.epoch.load(Ordering::SeqCst))
            .finish()
    }
}

impl TourController {
    pub fn builder() -> TourControllerBuilder {
        TourControllerBuilder::new()
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Session {
        lock(&self.store).session().clone()
    }

    /// Current editable source; empty when no session is loaded
    pub fn source(&self) -> String {
        lock(&self.store).session().source().to_string()
    }

    pub fn view(&self) -> ViewState {
        lock(&self.view).clone()
    }

    pub fn output(&self) -> RenderedOutput {
        lock(&self.view).output.clone()
    }

    pub fn diagnostics(&self) -> DiagnosticSet {
        lock(&self.view).diagnostics.clone()
    }

    /// Annotations against the current buffer
    pub fn annotations(&self) -> Vec<Annotation> {
        let source = self.source();
        lock(&self.view).annotations(&source)
    }

    pub fn lint_enabled(&self) -> bool {
        lock(&self.view).lint_enabled
    }

    pub fn share_link(&self) -> Option<ShareLink> {
        lock(&self.view).share_link.clone()
    }

    pub fn context(&self) -> Option<NavigationContext> {
        lock(&self.context).clone()
    }

    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    /// Subscribe to session and view changes
    pub fn subscribe(&self) -> broadcast::Receiver<TourEvent> {
        self.events.subscribe()
    }

    // ========== Initialization ==========

    /// Load the session of a tour page
    ///
    /// Clears output, diagnostics and the share link, then fetches the page's
    /// default snippet. A failed fetch leaves the session unloaded and shows
    /// the failure in the output area.
    pub async fn init_from_context(&self, context: NavigationContext) -> Result<ActionOutcome> {
        context.validate()?;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.clear_view();
        lock(&self.store).unload();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *lock(&self.context) = Some(context.clone());

        if !context.has_source {
            debug!(key = %context.persistence_key(), "Page has no snippet");
            return Ok(ActionOutcome::Skipped);
        }

        let fetched = self
            .backend
            .fetch_source(&context.language, &context.chapter_id, &context.section)
            .await;

        if lock(&self.context).as_ref() != Some(&context) {
            debug!("Discarding page source for a superseded navigation");
            return Ok(ActionOutcome::Discarded);
        }

        match fetched {
            Ok(source) => {
                lock(&self.store).load_context(&context, source);
                Ok(ActionOutcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, key = %context.persistence_key(), "Failed to fetch page source");
                self.show(render::render_error(&e));
                Ok(ActionOutcome::Failed)
            }
        }
    }

    /// Load an imported snippet
    ///
    /// A `source` URL parameter is used verbatim; otherwise `encoded` is the
    /// base64 of the host's embedded default.
    pub fn init_from_import(&self, encoded: Option<&str>, params: &ImportParams) -> Result<ActionOutcome> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.clear_view();
        *lock(&self.context) = None;

        let decoded = match &params.source {
            Some(_) => None,
            None => match encoded.map(decode_snippet).transpose() {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(error = %e, "Failed to decode embedded snippet");
                    lock(&self.store).unload();
                    self.epoch.fetch_add(1, Ordering::SeqCst);
                    self.show(render::render_message(e.to_string()));
                    return Err(e);
                }
            },
        };

        lock(&self.store).load_import(params, decoded);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        Ok(ActionOutcome::Applied)
    }

    // ========== Editing ==========

    pub fn edit(&self, text: impl Into<String>) {
        lock(&self.store).edit(text);
    }

    pub fn set_compiler(&self, compiler: impl Into<String>) {
        lock(&self.store).set_compiler(compiler);
    }

    pub fn set_args(&self, args: impl Into<String>) {
        lock(&self.store).set_args(args);
    }

    pub fn reset(&self) {
        lock(&self.store).reset();
    }

    /// Add a dub dependency to the snippet's package header
    pub fn add_library(&self, name: &str, version: &str) -> ActionOutcome {
        let mut store = lock(&self.store);
        if !store.session().is_loaded() {
            return ActionOutcome::Skipped;
        }
        let edited = library::add_dependency(store.session().source(), name, version);
        match edited {
            Ok(edited) => {
                store.edit(edited);
                info!(library = %name, version = %version, "Added library to snippet header");
                ActionOutcome::Applied
            }
            Err(e) => {
                drop(store);
                warn!(error = %e, "Failed to add library");
                self.show(render::render_message(e.to_string()));
                ActionOutcome::Failed
            }
        }
    }

    // ========== Execution ==========

    /// Compile and run the snippet, optionally with different arguments
    pub async fn run(&self, args_override: Option<String>) -> ActionOutcome {
        self.execute(Purpose::Run, args_override).await
    }

    /// Show the disassembly of the snippet
    pub async fn asm(&self) -> ActionOutcome {
        self.execute_variant(Purpose::Asm).await
    }

    /// Show the LLVM IR of the snippet
    pub async fn ir(&self) -> ActionOutcome {
        self.execute_variant(Purpose::Ir).await
    }

    /// Show the lowered AST of the snippet
    pub async fn ast(&self) -> ActionOutcome {
        self.execute_variant(Purpose::Ast).await
    }

    async fn execute_variant(&self, purpose: Purpose) -> ActionOutcome {
        let session = self.session();
        match variant_args(purpose, &session.compiler, &session.args) {
            Ok(args) => self.execute(purpose, Some(args)).await,
            Err(e) => {
                info!(compiler = %session.compiler, variant = %purpose, "Variant not supported");
                self.show(render::render_message(e.to_string()));
                ActionOutcome::Unsupported
            }
        }
    }

    async fn execute(&self, purpose: Purpose, args_override: Option<String>) -> ActionOutcome {
        let snapshot = {
            let store = lock(&self.store);
            if !store.session().is_loaded() {
                debug!(purpose = %purpose, "No session loaded, nothing to run");
                return ActionOutcome::Skipped;
            }
            store.persist();
            store.snapshot()
        };
        let args = args_override.unwrap_or(snapshot.args);
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut view = lock(&self.view);
            view.diagnostics.clear();
            view.lint_enabled = false;
            view.output = render::render_message(WAITING_MESSAGE);
            view.show_output = true;
        }
        self.emit_view_changed();
        let progress_ticket = self.progress.start();

        let request =
            ExecutionRequest::new(snapshot.source, snapshot.compiler, args.clone()).with_purpose(purpose);
        debug!(purpose = %purpose, ticket, compiler = %request.compiler, "Sending execution request");
        let result = self.backend.execute(&request).await;

        self.progress.stop(progress_ticket);
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(purpose = %purpose, ticket, "Discarding stale response");
            return ActionOutcome::Discarded;
        }

        let outcome = match result {
            Ok(response) => {
                let diagnostics = response.diagnostics();
                let mut view = lock(&self.view);
                view.lint_enabled = diagnostics.lint_enabled();
                view.diagnostics = diagnostics;
                view.output = render::render_output(&response.output, &args);
                view.raw_output = response.output;
                view.show_output = true;
                ActionOutcome::Applied
            }
            Err(e) => {
                warn!(purpose = %purpose, error = %e, "Execution request failed");
                let mut view = lock(&self.view);
                view.output = render::render_error(&e);
                view.show_output = true;
                ActionOutcome::Failed
            }
        };
        self.emit_view_changed();
        outcome
    }

    /// Replace the snippet with the formatter's output
    pub async fn format(&self) -> ActionOutcome {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let Some(source) = self.loaded_source() else {
            return ActionOutcome::Skipped;
        };
        let result = self.backend.format(&source).await;
        if self.superseded(epoch, "format") {
            return ActionOutcome::Discarded;
        }
        match result {
            Ok(formatted) => {
                lock(&self.store).replace_source(formatted);
                ActionOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "Format request failed");
                self.show(render::render_error(&e));
                ActionOutcome::Failed
            }
        }
    }

    // ========== Sharing ==========

    /// Create a short link for the snippet
    pub async fn shorten(&self) -> ActionOutcome {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let session = self.session();
        if !session.is_loaded() {
            return ActionOutcome::Skipped;
        }
        let request = ShortenRequest {
            source: session.source().to_string(),
            compiler: session.compiler.clone(),
            args: session.args.clone(),
        };
        let result = self.backend.shorten(&request).await;
        if self.superseded(epoch, "shorten") {
            return ActionOutcome::Discarded;
        }
        match result {
            Ok(url) => {
                info!(url = %url, "Short link created");
                self.set_share_link(Some(ShareLink::new(url)));
                ActionOutcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "Shorten request failed");
                self.show(render::render_error(&e));
                ActionOutcome::Failed
            }
        }
    }

    /// Publish the snippet as a gist and open it in a new context
    pub async fn create_gist(&self) -> ActionOutcome {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let session = self.session();
        if !session.is_loaded() {
            return ActionOutcome::Skipped;
        }
        let result = self
            .backend
            .create_gist(&GistRequest::for_source(session.source()))
            .await;
        if self.superseded(epoch, "create_gist") {
            return ActionOutcome::Discarded;
        }
        let gist = match result {
            Ok(gist) => gist,
            Err(e) => {
                warn!(error = %e, "Gist request failed");
                self.show(render::render_error(&e));
                return ActionOutcome::Failed;
            }
        };

        info!(id = %gist.id, "Gist created");
        if let Err(e) = self.navigator.open_in_new_context(&gist.html_url) {
            warn!(error = %e, url = %gist.html_url, "Failed to open gist");
        }
        match share::gist_share_url(&self.navigator.origin(), &gist.id, &session.compiler, &session.args) {
            Ok(url) => self.set_share_link(Some(ShareLink::new(url))),
            Err(e) => warn!(error = %e, "Failed to build gist share link"),
        }
        ActionOutcome::Applied
    }

    /// Navigate to the in-app replay of a gist
    pub fn import_from_gist(&self, url_or_id: &str) -> Result<ActionOutcome> {
        let Some(id) = share::gist_id(url_or_id) else {
            return Ok(ActionOutcome::Skipped);
        };
        let session = self.session();
        let route = share::gist_route(&self.navigator.origin(), &id, &session.compiler, &session.args)?;
        self.navigate(&route)?;
        Ok(ActionOutcome::Applied)
    }

    /// Link opening the snippet in the standalone editor
    pub fn build_standalone_url(&self) -> Result<String> {
        let session = self.session();
        share::standalone_url(
            &self.navigator.origin(),
            &self.config.service.standalone_origin,
            &self.config.service.local_hosts,
            &session.compiler,
            &session.args,
            session.source(),
        )
    }

    /// Copy the last share link to the clipboard
    pub fn copy_share_link(&self) -> Result<String> {
        let link = self.share_link().ok_or(Error::NoShareLink)?;
        self.clipboard.copy(&link.url)?;
        Ok(link.url)
    }

    /// Link to edit the current page's source
    pub fn edit_on_github_url(&self) -> Option<String> {
        lock(&self.context).as_ref().map(|context| {
            let repo = if context.repo.is_empty() {
                self.config.session.github_repo.as_str()
            } else {
                context.repo.as_str()
            };
            share::github_edit_url(repo, &context.language, &context.chapter_id, &context.section)
        })
    }

    /// Open the edit link in a new context; false outside a tour page
    pub fn edit_on_github(&self) -> Result<bool> {
        let Some(url) = self.edit_on_github_url() else {
            return Ok(false);
        };
        self.navigator.open_in_new_context(&url)?;
        Ok(true)
    }

    // ========== Navigation ==========

    /// Go to the previous page; false when there is none
    pub fn navigate_prev(&self) -> Result<bool> {
        let page = self.context().and_then(|c| c.prev_page);
        self.navigate_page(page)
    }

    /// Go to the next page; false when there is none
    pub fn navigate_next(&self) -> Result<bool> {
        let page = self.context().and_then(|c| c.next_page);
        self.navigate_page(page)
    }

    fn navigate_page(&self, page: Option<String>) -> Result<bool> {
        let Some(page) = page else {
            return Ok(false);
        };
        let url = match Url::parse(&page) {
            Ok(url) => url,
            Err(_) => {
                let origin = self.navigator.origin();
                Url::parse(&origin)
                    .and_then(|base| base.join(&page))
                    .map_err(|e| Error::NavigationError(format!("Invalid page '{}': {}", page, e)))?
            }
        };
        self.navigate(url.as_str())?;
        Ok(true)
    }

    fn navigate(&self, url: &str) -> Result<()> {
        info!(url = %url, "Navigating");
        self.navigator.navigate(url)?;
        self.events.emit(TourEvent::Navigated {
            url: url.to_string(),
        });
        Ok(())
    }

    // ========== View ==========

    fn loaded_source(&self) -> Option<String> {
        let store = lock(&self.store);
        store
            .session()
            .is_loaded()
            .then(|| store.session().source().to_string())
    }

    /// True when the session a request was issued for has been replaced
    fn superseded(&self, epoch: u64, action: &str) -> bool {
        let stale = self.epoch.load(Ordering::SeqCst) != epoch;
        if stale {
            debug!(action, epoch, "Discarding reply for a replaced session");
        }
        stale
    }

    fn show(&self, output: RenderedOutput) {
        {
            let mut view = lock(&self.view);
            view.output = output;
            view.show_output = true;
        }
        self.events.emit(TourEvent::OutputChanged);
    }

    fn clear_view(&self) {
        let had_link = {
            let mut view = lock(&self.view);
            let had_link = view.share_link.is_some();
            *view = ViewState::default();
            had_link
        };
        self.emit_view_changed();
        if had_link {
            self.events.emit(TourEvent::ShareLinkChanged { url: None });
        }
    }

    fn set_share_link(&self, link: Option<ShareLink>) {
        let url = link.as_ref().map(|l| l.url.clone());
        lock(&self.view).share_link = link;
        self.events.emit(TourEvent::ShareLinkChanged { url });
    }

    fn emit_view_changed(&self) {
        let (count, lint_enabled) = {
            let view = lock(&self.view);
            (view.diagnostics.len(), view.lint_enabled)
        };
        self.events.emit(TourEvent::OutputChanged);
        self.events.emit(TourEvent::DiagnosticsChanged {
            count,
            lint_enabled,
        });
    }
}

/// Decode a base64 snippet as UTF-8
pub fn decode_snippet(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::DecodeError(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::DecodeError(format!("invalid UTF-8: {}", e)))
}
