//! Hover handler

use super::prepare;
use crate::diagnostics::DiagnosticPublisher;
use crate::frontend::{CompilerFrontend, NodeKind};
use crate::index::IndexedNode;
use crate::orchestrator::Orchestrator;
use lsp_types::{Hover, HoverContents, HoverParams, MarkupContent, MarkupKind};

pub fn hover<F, P>(orchestrator: &mut Orchestrator<F, P>, params: HoverParams) -> Option<Hover>
where
    F: CompilerFrontend,
    P: DiagnosticPublisher,
{
    let position = params.text_document_position_params;
    let uri = position.text_document.uri;
    prepare(orchestrator, &uri);

    let node = orchestrator.index().node_at(&uri, position.position)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: render(node),
        }),
        range: Some(node.range),
    })
}

fn signature(node: &IndexedNode) -> String {
    let lead = node.detail.as_deref().unwrap_or(node.presentation.keyword);
    match node.kind {
        NodeKind::Method => format!("{} {}()", lead, node.name),
        NodeKind::Field | NodeKind::Property | NodeKind::Variable => {
            format!("{} {}", lead, node.name)
        }
        _ => format!("{} {}", node.presentation.keyword, node.name),
    }
}

fn render(node: &IndexedNode) -> String {
    let mut value = format!("```groovy\n{}\n```", signature(node));
    if let Some(parent) = &node.parent {
        value.push_str(&format!("\n\nDeclared in `{}`", parent));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{AstNode, SourceSpan};
    use lsp_types::Url;

    fn node(name: &str, kind: NodeKind) -> AstNode {
        AstNode::new(name, kind, SourceSpan::on_line(1, 1, name.len() as u32))
    }

    #[test]
    fn test_render_signatures() {
        let uri = Url::parse("file:///work/main.nf").unwrap();

        let process = IndexedNode::from_ast(&uri, node("ALIGN", NodeKind::Process));
        assert_eq!(render(&process), "```groovy\nprocess ALIGN\n```");

        let method = IndexedNode::from_ast(
            &uri,
            node("describe", NodeKind::Method).with_detail("String").with_parent("Sample"),
        );
        assert_eq!(render(&method), "```groovy\nString describe()\n```\n\nDeclared in `Sample`");

        let variable = IndexedNode::from_ast(&uri, node("reads", NodeKind::Variable));
        assert_eq!(signature(&variable), "def reads");
    }
}
