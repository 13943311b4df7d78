//! LSP utility functions

pub mod file_scanner;

use lsp_server::{RequestId, Response};
use lsp_types::Position;
use serde::de::DeserializeOwned;

/// Cast an LSP request to a specific type
pub fn cast_request<R>(
    req: lsp_server::Request,
) -> Result<(RequestId, R::Params), (RequestId, serde_json::Error)>
where
    R: lsp_types::request::Request,
    R::Params: DeserializeOwned,
{
    match serde_json::from_value::<R::Params>(req.params) {
        Ok(params) => Ok((req.id, params)),
        Err(e) => Err((req.id, e)),
    }
}

/// Cast an LSP notification to a specific type
pub fn cast_notification<N>(not: lsp_server::Notification) -> Result<N::Params, serde_json::Error>
where
    N: lsp_types::notification::Notification,
    N::Params: DeserializeOwned,
{
    serde_json::from_value::<N::Params>(not.params)
}

/// Create an error response for requests whose params failed to parse
pub fn invalid_params_response(id: RequestId, message: &str) -> Response {
    Response::new_err(id, lsp_server::ErrorCode::InvalidParams as i32, message.to_string())
}

/// Convert an LSP position (UTF-16 columns) to a byte offset in `text`.
///
/// A column past the end of its line resolves to the end of that line; a
/// line past the end of the text yields `None`.
pub fn position_to_offset(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..position.line {
        let newline = text[line_start..].find('\n')?;
        line_start += newline + 1;
    }

    let line_end = text[line_start..].find('\n').map_or(text.len(), |i| line_start + i);

    let mut units = 0u32;
    for (idx, ch) in text[line_start..line_end].char_indices() {
        if units >= position.character {
            return Some(line_start + idx);
        }
        units += ch.len_utf16() as u32;
    }

    Some(line_end)
}

/// Returns the identifier fragment immediately left of `position`.
pub fn identifier_prefix(text: &str, position: Position) -> String {
    let Some(offset) = position_to_offset(text, position) else {
        return String::new();
    };

    let before = &text[..offset];
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_alphanumeric() || *ch == '_' || *ch == '$')
        .last()
        .map_or(offset, |(idx, _)| idx);

    before[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_to_offset() {
        let text = "process foo {\n  input:\n}\n";
        assert_eq!(position_to_offset(text, Position::new(0, 0)), Some(0));
        assert_eq!(position_to_offset(text, Position::new(1, 2)), Some(16));
        assert_eq!(position_to_offset(text, Position::new(1, 99)), Some(22));
        assert_eq!(position_to_offset(text, Position::new(3, 0)), Some(text.len()));
        assert_eq!(position_to_offset(text, Position::new(4, 0)), None);
    }

    #[test]
    fn test_position_to_offset_counts_utf16_units() {
        let text = "a😀b";
        // the emoji is two UTF-16 units and four bytes
        assert_eq!(position_to_offset(text, Position::new(0, 3)), Some(5));
    }

    #[test]
    fn test_identifier_prefix() {
        let text = "def x = fooB\nsay(";
        assert_eq!(identifier_prefix(text, Position::new(0, 12)), "fooB");
        assert_eq!(identifier_prefix(text, Position::new(0, 8)), "");
        assert_eq!(identifier_prefix(text, Position::new(1, 4)), "");
        assert_eq!(identifier_prefix(text, Position::new(1, 2)), "sa");
    }
}
