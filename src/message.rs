/// Fixed last line of every rendered alert banner.
pub const TRACE_TRAILER: &str = "TRACING INFORMATION APPEARS BELOW:";

/// Titled multi-section text block for warning/error/critical reports.
///
/// Empty sections are omitted entirely; the rendered banner never contains an
/// empty `DETAILS:` or `SUGGESTIONS:` header.
#[derive(Debug, Clone, Default)]
pub struct AlertMessage {
    title: String,
    details: String,
    suggestions: String,
}

impl AlertMessage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Why is this being raised? What are the consequences?
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// What steps might the reader take to resolve it?
    pub fn suggestions(mut self, suggestions: impl Into<String>) -> Self {
        self.suggestions = suggestions.into();
        self
    }

    pub fn render(&self) -> String {
        let mut out = self.title.to_uppercase();
        out.push('\n');

        if !self.details.is_empty() {
            out.push_str("DETAILS:\n");
            out.push_str(&self.details);
            out.push_str("\n\n");
        }

        if !self.suggestions.is_empty() {
            out.push_str("SUGGESTIONS:\n");
            out.push_str(&self.suggestions);
            out.push_str("\n\n");
        }

        // Exactly one blank line before the trailer.
        if !out.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(TRACE_TRAILER);

        out
    }
}
