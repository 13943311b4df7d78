use lsp_types::{CompletionItemKind, SymbolKind};

/// What a declaration is. Closed on purpose: everything the editor shows for a
/// node is derived from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Class,
    Interface,
    Enum,
    Method,
    Field,
    Property,
    Variable,
    Process,
    Workflow,
}

/// Editor-facing metadata for a [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub completion_kind: CompletionItemKind,
    pub symbol_kind: SymbolKind,
    /// Keyword shown in hovers.
    pub keyword: &'static str,
}

impl NodeKind {
    pub fn presentation(self) -> Presentation {
        let (completion_kind, symbol_kind, keyword) = match self {
            NodeKind::Class => (CompletionItemKind::CLASS, SymbolKind::CLASS, "class"),
            NodeKind::Interface => {
                (CompletionItemKind::INTERFACE, SymbolKind::INTERFACE, "interface")
            }
            NodeKind::Enum => (CompletionItemKind::ENUM, SymbolKind::ENUM, "enum"),
            NodeKind::Method => (CompletionItemKind::METHOD, SymbolKind::METHOD, "def"),
            NodeKind::Field | NodeKind::Property => {
                (CompletionItemKind::FIELD, SymbolKind::FIELD, "field")
            }
            NodeKind::Variable => (CompletionItemKind::VARIABLE, SymbolKind::VARIABLE, "def"),
            NodeKind::Process => (CompletionItemKind::FUNCTION, SymbolKind::FUNCTION, "process"),
            NodeKind::Workflow => (CompletionItemKind::MODULE, SymbolKind::MODULE, "workflow"),
        };
        Presentation { completion_kind, symbol_kind, keyword }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(NodeKind::Class, CompletionItemKind::CLASS, SymbolKind::CLASS)]
    #[test_case(NodeKind::Interface, CompletionItemKind::INTERFACE, SymbolKind::INTERFACE)]
    #[test_case(NodeKind::Enum, CompletionItemKind::ENUM, SymbolKind::ENUM)]
    #[test_case(NodeKind::Method, CompletionItemKind::METHOD, SymbolKind::METHOD)]
    #[test_case(NodeKind::Field, CompletionItemKind::FIELD, SymbolKind::FIELD)]
    #[test_case(NodeKind::Property, CompletionItemKind::FIELD, SymbolKind::FIELD)]
    #[test_case(NodeKind::Variable, CompletionItemKind::VARIABLE, SymbolKind::VARIABLE)]
    fn test_presentation(kind: NodeKind, completion: CompletionItemKind, symbol: SymbolKind) {
        let presentation = kind.presentation();
        assert_eq!(presentation.completion_kind, completion);
        assert_eq!(presentation.symbol_kind, symbol);
    }
}
