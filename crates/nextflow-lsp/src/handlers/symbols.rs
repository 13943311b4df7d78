//! Document outline handler

use super::prepare;
use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::CompilerFrontend;
use crate::index::IndexedNode;
use crate::orchestrator::Orchestrator;
use lsp_types::{DocumentSymbol, DocumentSymbolParams, DocumentSymbolResponse, Position, Range};

pub fn document_symbol<F, P>(
    orchestrator: &mut Orchestrator<F, P>,
    params: DocumentSymbolParams,
) -> Option<DocumentSymbolResponse>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let uri = params.text_document.uri;
    prepare(orchestrator, &uri);

    let symbols = outline(orchestrator.index().nodes(&uri));
    Some(DocumentSymbolResponse::Nested(symbols))
}

/// Nests nodes under their parent declaration. A parent is the closest
/// earlier node with the parent's name whose range encloses the child.
pub fn outline(nodes: &[IndexedNode]) -> Vec<DocumentSymbol> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        let parent = node.parent.as_ref().and_then(|parent| {
            (0..i).rev().find(|&j| {
                nodes[j].name == *parent && encloses(&nodes[j].range, &node.range)
            })
        });
        match parent {
            Some(j) => children[j].push(i),
            None => roots.push(i),
        }
    }

    roots.into_iter().map(|i| build(nodes, &children, i)).collect()
}

fn encloses(outer: &Range, inner: &Range) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

#[allow(deprecated)]
fn build(nodes: &[IndexedNode], children: &[Vec<usize>], i: usize) -> DocumentSymbol {
    let node = &nodes[i];
    let nested: Vec<DocumentSymbol> =
        children[i].iter().map(|&child| build(nodes, children, child)).collect();

    let name_end = Position::new(
        node.range.start.line,
        node.range.start.character + node.name.encode_utf16().count() as u32,
    );
    let selection_range = if name_end <= node.range.end {
        Range::new(node.range.start, name_end)
    } else {
        node.range
    };

    DocumentSymbol {
        name: node.name.clone(),
        detail: node.detail.clone(),
        kind: node.presentation.symbol_kind,
        tags: None,
        deprecated: None,
        range: node.range,
        selection_range,
        children: if nested.is_empty() { None } else { Some(nested) },
    }
}
