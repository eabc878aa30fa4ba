//! Renders collected diagnostics as human-readable, source-annotated text.
//!
//! This is the only collaborator in the crate allowed to format a
//! diagnostic; the analyzer only ever collects `DiagnosticMessage`s.

use annotate_snippets::{Level, Renderer, Snippet};

use super::message::{Severity, DiagnosticMessage};
use super::source_map::{SourceId, SourceMap};
use super::Diagnostics;

pub struct DiagnosticsPrinter<'a> {
    diagnostics: &'a Diagnostics,
    sources: &'a SourceMap,
    source: SourceId,
    color: bool,
}

impl<'a> DiagnosticsPrinter<'a> {
    pub(super) fn new(diagnostics: &'a Diagnostics, sources: &'a SourceMap) -> Self {
        // Single-translation-unit front end: every diagnostic currently
        // points at the one source the map was built from.
        Self { diagnostics, sources, source: SourceId::first(), color: true }
    }

    /// Toggle ANSI styling, e.g. when stdout/stderr is piped rather than a
    /// terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render every collected diagnostic as a single string, one rendered
    /// snippet per diagnostic separated by a blank line.
    pub fn render(&self) -> String {
        let renderer = if self.color { Renderer::styled() } else { Renderer::plain() };
        let mut out = String::new();
        for message in self.diagnostics.iter() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&self.render_one(message, &renderer));
            out.push('\n');
        }
        out
    }

    fn render_one(&self, message: &DiagnosticMessage, renderer: &Renderer) -> String {
        let level = match message.severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        };
        let source_text = self.sources.text(self.source);
        let start = message.span.start as usize;
        let end = message.span.end.max(message.span.start + 1) as usize;
        let title = format!("{} [{}]", message.message, message.kind.code());
        let snippet = Snippet::source(source_text)
            .origin(self.sources.name(self.source))
            .annotation(level.span(start..end.min(source_text.len())).label(&message.message));
        let report = level.title(&title).snippet(snippet);
        renderer.render(report).to_string()
    }
}
