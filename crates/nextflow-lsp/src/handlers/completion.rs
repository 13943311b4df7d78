//! Code completion handler

use super::prepare;
use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::CompilerFrontend;
use crate::index::IndexedNode;
use crate::orchestrator::Orchestrator;
use crate::utils::identifier_prefix;
use lsp_types::{CompletionItem, CompletionParams, CompletionResponse};

/// Offers every indexed declaration whose name starts with the identifier
/// left of the cursor.
pub fn completion<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: CompletionParams,
) -> Option<CompletionResponse>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let position = params.text_document_position;
    let uri = position.text_document.uri;
    prepare(orchestrator, &uri);

    let prefix = orchestrator
        .documents()
        .text(&uri)
        .map(|text| identifier_prefix(text, position.position))
        .unwrap_or_default();

    let items: Vec<CompletionItem> = orchestrator
        .index()
        .completion_candidates(&prefix)
        .into_iter()
        .map(completion_item)
        .collect();

    Some(CompletionResponse::Array(items))
}

fn completion_item(node: &IndexedNode) -> CompletionItem {
    CompletionItem {
        label: node.name.clone(),
        kind: Some(node.presentation.completion_kind),
        detail: node.detail.clone().or_else(|| node.parent.clone()),
        ..Default::default()
    }
}
