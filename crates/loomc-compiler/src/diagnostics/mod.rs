//! Diagnostics collection.
//!
//! The analyzer never formats a diagnostic itself: it reports structured
//! `DiagnosticMessage`s into a `Diagnostics` sink threaded through the whole
//! pipeline by `&mut`, and only `DiagnosticsPrinter` (invoked at the
//! boundary, typically by the CLI) turns them into rendered text.

mod message;
mod printer;
mod source_map;

pub use message::{DiagnosticKind, DiagnosticMessage, Fix, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;
pub use source_map::{SourceId, SourceMap};

use loomc_core::Span;

#[derive(Default, Debug, Clone)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin reporting a diagnostic at `span` in `source`. Call `.message()`
    /// then `.emit()` (optionally `.fix()`/`.related_to()` in between) to
    /// push it into the sink.
    pub fn report(&mut self, source: SourceId, kind: DiagnosticKind, span: Span) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            sink: self,
            source,
            severity: Severity::Error,
            kind,
            span,
            message: String::new(),
            fix: None,
            related: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn printer<'a>(&'a self, sources: &'a SourceMap) -> DiagnosticsPrinter<'a> {
        DiagnosticsPrinter::new(self, sources)
    }
}

/// Builder for one diagnostic. Dropping it without calling `.emit()` loses
/// the diagnostic silently, matching `Vec::push`-style collectors elsewhere
/// in this stack — callers are expected to chain straight through to
/// `.emit()`.
pub struct DiagnosticBuilder<'a> {
    sink: &'a mut Diagnostics,
    source: SourceId,
    severity: Severity,
    kind: DiagnosticKind,
    span: Span,
    message: String,
    fix: Option<Fix>,
    related: Vec<RelatedInfo>,
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn fix(mut self, span: Span, replacement: impl Into<String>, description: impl Into<String>) -> Self {
        self.fix = Some(Fix { span, replacement: replacement.into(), description: description.into() });
        self
    }

    pub fn related_to(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo { span, message: message.into() });
        self
    }

    pub fn emit(self) {
        let _ = self.source; // SourceId is carried for future multi-source printing.
        self.sink.messages.push(DiagnosticMessage {
            severity: self.severity,
            kind: self.kind,
            span: self.span,
            message: self.message,
            fix: self.fix,
            related: self.related,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loomc_core::Span;

    #[test]
    fn reported_diagnostics_are_collected() {
        let mut sources = SourceMap::new();
        let src = sources.add("t.lang", "x");
        let mut diags = Diagnostics::new();
        diags
            .report(src, DiagnosticKind::UndeclaredIdentifier, Span::new(0, 1))
            .message("`x` is not declared")
            .emit();
        assert_eq!(diags.error_count(), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn unemitted_builder_is_dropped() {
        let mut sources = SourceMap::new();
        let src = sources.add("t.lang", "x");
        let mut diags = Diagnostics::new();
        let _ = diags.report(src, DiagnosticKind::UndeclaredIdentifier, Span::new(0, 1));
        assert!(diags.is_empty());
    }
}
