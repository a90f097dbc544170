// Placeholder markup and final answer formatting
use crate::rag::retrieval::RetrievalResult;

/// Shown when the run fails for any reason
pub const ERROR_MESSAGE: &str =
    "<span class=\"error\">Error: Failed to connect to AI service. Check console or network.</span>";

/// Initial placeholder content
pub fn initializing() -> String {
    "<div class=\"progress\"><span>Initializing RAG pipeline...</span></div>".to_string()
}

/// Step 1 placeholder content
pub fn analyzing() -> String {
    "<div class=\"progress\">\
     <div><strong>Step 1: Intent Analysis</strong></div>\
     <div>Analyzing query for keywords...</div>\
     </div>"
        .to_string()
}

/// Step 2 placeholder content, listing which documents were accessed
pub fn retrieved(result: &RetrievalResult) -> String {
    let items: String = result
        .iter()
        .map(|doc| format!("<li>Accessed Knowledge: <em>{}</em></li>", doc.id))
        .collect();

    format!(
        "<div class=\"progress\">\
         <div><strong>Step 2: Retrieval</strong></div>\
         <ul>{}</ul>\
         <div>Generating response...</div>\
         </div>",
        items
    )
}

/// Final assistant message: line breaks as `<br>` plus a sources footer
pub fn format_response(text: &str, source_count: usize) -> String {
    let formatted = text.replace("\r\n", "<br>").replace('\n', "<br>");

    format!(
        "<div>{}</div>\n<div class=\"footer\"><span>Generated by AI</span> <span>Context Sources: {}</span></div>",
        formatted, source_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::rag::retrieval::RetrievalEngine;
    use std::sync::Arc;

    #[test]
    fn test_format_response_footer() {
        let html = format_response("Turn off idle devices.", 2);
        assert!(html.contains("Turn off idle devices."));
        assert!(html.contains("Context Sources: 2"));
        assert!(html.contains("Generated by AI"));
    }

    #[test]
    fn test_format_response_normalizes_line_breaks() {
        let html = format_response("a\nb\r\nc", 1);
        assert!(html.contains("a<br>b<br>c"));
        assert!(!html.contains('\r'));
    }

    #[test]
    fn test_retrieved_lists_document_ids() {
        let engine = RetrievalEngine::new(Arc::new(KnowledgeBase::builtin()));
        let result = engine.retrieve("xyz");
        let html = retrieved(&result);
        assert!(html.contains("<em>dev_logs</em>"));
        assert!(html.contains("<em>tariff</em>"));
        assert!(html.contains("Generating response..."));
    }

    #[test]
    fn test_stage_markup() {
        assert!(initializing().contains("Initializing RAG pipeline"));
        assert!(analyzing().contains("Step 1: Intent Analysis"));
        assert!(ERROR_MESSAGE.contains("Failed to connect to AI service"));
    }
}
