//! Language Server Protocol transport
//!
//! Speaks JSON-RPC over stdin/stdout through `lsp-server`. Messages are
//! handled one at a time on the loop thread; all state lives in the
//! [`Orchestrator`] the loop owns.

use crate::config::{InitializationOptions, WorkspaceConfig};
use crate::diagnostics::DiagnosticPublisher;
use crate::errors::ServerError;
use crate::frontend::scan::ScanFrontend;
use crate::frontend::CompilerFrontend;
use crate::handlers;
use crate::orchestrator::{CycleReport, Orchestrator};
use crate::utils::{cast_notification, cast_request, invalid_params_response};
use crate::Context;
use crossbeam_channel::Sender;
use lsp_server::{Connection, Message, Notification, Request, Response};
use lsp_types::notification::{
    DidChangeConfiguration, DidChangeTextDocument, DidChangeWatchedFiles, DidCloseTextDocument,
    DidOpenTextDocument, DidSaveTextDocument, Notification as _, PublishDiagnostics,
};
use lsp_types::request::{Completion, DocumentSymbolRequest, HoverRequest, Request as _};
use lsp_types::{
    CompletionOptions, Diagnostic, HoverProviderCapability, InitializeParams, InitializeResult,
    OneOf, PublishDiagnosticsParams, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Url,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings taken from the command line. They win over anything the client
/// sends in the initialize request.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    pub root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Publishes diagnostics as `textDocument/publishDiagnostics` notifications.
/// Send failures are logged; they never interrupt a compile cycle.
pub struct ConnectionPublisher {
    sender: Sender<Message>,
    ctx: Context,
}

impl ConnectionPublisher {
    pub fn new(sender: Sender<Message>, ctx: Context) -> Self {
        Self { sender, ctx }
    }
}

impl DiagnosticPublisher for ConnectionPublisher {
    fn publish(&mut self, uri: Url, diagnostics: Vec<Diagnostic>) {
        let params = PublishDiagnosticsParams { uri, diagnostics, version: None };
        let notification = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
        if let Err(e) = self.sender.send(Message::Notification(notification)) {
            self.ctx.try_log(|logger| error!(logger, "Failed to publish diagnostics: {}", e));
        }
    }
}

pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
            open_close: Some(true),
            change: Some(TextDocumentSyncKind::INCREMENTAL),
            save: Some(TextDocumentSyncSaveOptions::Supported(true)),
            ..Default::default()
        })),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![".".to_string()]),
            ..Default::default()
        }),
        document_symbol_provider: Some(OneOf::Left(true)),
        ..Default::default()
    }
}

/// Run the Language Server Protocol server until the client shuts it down
pub fn run_lsp(options: ServerOptions, ctx: &Context) -> Result<(), ServerError> {
    ctx.try_log(|logger| info!(logger, "Starting nextflow language server"));

    let (connection, io_threads) = Connection::stdio();

    let (initialize_id, initialize_params) = connection.initialize_start()?;
    let initialize_params: InitializeParams = serde_json::from_value(initialize_params)?;
    let init_options =
        InitializationOptions::from_value(initialize_params.initialization_options.clone());

    let root = options.root.or_else(|| workspace_root(&initialize_params));
    let requested_base = options.output_dir.or(init_options.output_directory);
    let owns_output_base = requested_base.is_none();
    let output_base = requested_base.unwrap_or_else(default_output_base);

    let initialize_result = InitializeResult {
        capabilities: server_capabilities(),
        server_info: Some(ServerInfo {
            name: "nextflow-language-server".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    };
    connection.initialize_finish(initialize_id, serde_json::to_value(initialize_result)?)?;

    ctx.try_log(|logger| {
        info!(logger, "Initialized (root: {:?}, output: {})", root, output_base.display())
    });

    let publisher = ConnectionPublisher::new(connection.sender.clone(), ctx.clone());
    let classpath = init_options.classpath.unwrap_or_default();
    let config = WorkspaceConfig::default().with_classpath(classpath);
    let mut orchestrator =
        Orchestrator::new(ScanFrontend::new(output_base.clone()), publisher, config, ctx.clone());
    orchestrator.set_workspace_root(root);

    let outcome = main_loop(connection, orchestrator, ctx);
    if owns_output_base {
        remove_output_base(&output_base, ctx);
    }
    outcome?;
    io_threads.join()?;

    ctx.try_log(|logger| info!(logger, "Language server stopped"));
    Ok(())
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let folder = params.workspace_folders.as_ref().and_then(|folders| folders.first());
    folder
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(|uri| uri.to_file_path().ok())
}

fn default_output_base() -> PathBuf {
    std::env::temp_dir().join(format!("nextflow-lsp-{}", std::process::id()))
}

/// Deletes the scratch base and every session directory below it.
fn remove_output_base(base: &Path, ctx: &Context) {
    if !base.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(base) {
        ctx.try_log(|logger| {
            warn!(logger, "Failed to remove output directory {}: {}", base.display(), e)
        });
    }
}

fn main_loop<F, P>(
    connection: Connection,
    mut orchestrator: Orchestrator<F, P>,
    ctx: &Context,
) -> Result<(), ServerError>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    for message in &connection.receiver {
        match message {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    ctx.try_log(|logger| info!(logger, "Shutdown requested"));
                    return Ok(());
                }
                let response = handle_request(req, &mut orchestrator, ctx);
                connection
                    .sender
                    .send(Message::Response(response))
                    .map_err(|e| ServerError::Send(e.to_string()))?;
            }
            Message::Notification(not) => handle_notification(not, &mut orchestrator, ctx),
            Message::Response(resp) => {
                ctx.try_log(|logger| debug!(logger, "Ignoring response to request {}", resp.id));
            }
        }
    }
    Ok(())
}

fn handle_request<F, P>(
    req: Request,
    orchestrator: &mut Orchestrator<F, P>,
    ctx: &Context,
) -> Response
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    match req.method.as_str() {
        Completion::METHOD => {
            respond::<Completion, _>(req, ctx, |params| handlers::completion(orchestrator, params))
        }
        HoverRequest::METHOD => {
            respond::<HoverRequest, _>(req, ctx, |params| handlers::hover(orchestrator, params))
        }
        DocumentSymbolRequest::METHOD => respond::<DocumentSymbolRequest, _>(req, ctx, |params| {
            handlers::document_symbol(orchestrator, params)
        }),
        _ => {
            ctx.try_log(|logger| debug!(logger, "Unhandled request: {}", req.method));
            Response::new_err(
                req.id,
                lsp_server::ErrorCode::MethodNotFound as i32,
                format!("Method not found: {}", req.method),
            )
        }
    }
}

fn respond<R, T>(req: Request, ctx: &Context, handle: impl FnOnce(R::Params) -> T) -> Response
where
    R: lsp_types::request::Request,
    R::Params: DeserializeOwned,
    T: Serialize,
{
    match cast_request::<R>(req) {
        Ok((id, params)) => Response::new_ok(id, handle(params)),
        Err((id, e)) => {
            ctx.try_log(|logger| warn!(logger, "Invalid {} params: {}", R::METHOD, e));
            invalid_params_response(id, &format!("Invalid parameters: {}", e))
        }
    }
}

fn handle_notification<F, P>(
    not: Notification,
    orchestrator: &mut Orchestrator<F, P>,
    ctx: &Context,
) where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let method = not.method.clone();
    let report = match method.as_str() {
        DidOpenTextDocument::METHOD => {
            notify::<DidOpenTextDocument>(not, ctx, |p| handlers::did_open(orchestrator, p))
        }
        DidChangeTextDocument::METHOD => {
            notify::<DidChangeTextDocument>(not, ctx, |p| handlers::did_change(orchestrator, p))
        }
        DidSaveTextDocument::METHOD => notify::<DidSaveTextDocument>(not, ctx, |p| {
            handlers::did_save(orchestrator, p);
            None
        }),
        DidCloseTextDocument::METHOD => {
            notify::<DidCloseTextDocument>(not, ctx, |p| handlers::did_close(orchestrator, p))
        }
        DidChangeWatchedFiles::METHOD => notify::<DidChangeWatchedFiles>(not, ctx, |p| {
            handlers::did_change_watched_files(orchestrator, p)
        }),
        DidChangeConfiguration::METHOD => notify::<DidChangeConfiguration>(not, ctx, |p| {
            handlers::did_change_configuration(orchestrator, p)
        }),
        _ => {
            ctx.try_log(|logger| debug!(logger, "Unhandled notification: {}", method));
            None
        }
    };

    if let Some(report) = report {
        ctx.try_log(|logger| {
            debug!(
                logger,
                "{}: session {} (reused: {}), {} error(s), {} file(s) published",
                method,
                report.session,
                report.reused,
                report.errors,
                report.published
            )
        });
    }
}

fn notify<N>(
    not: Notification,
    ctx: &Context,
    handle: impl FnOnce(N::Params) -> Option<CycleReport>,
) -> Option<CycleReport>
where
    N: lsp_types::notification::Notification,
    N::Params: DeserializeOwned,
{
    match cast_notification::<N>(not) {
        Ok(params) => handle(params),
        Err(e) => {
            ctx.try_log(|logger| warn!(logger, "Malformed {} notification: {}", N::METHOD, e));
            None
        }
    }
}
