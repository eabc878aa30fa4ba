//! The pieces of a single diagnostic: severity, kind, location, and the
//! optional fix-it / related-location annotations.

use loomc_core::Span;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The specific condition a diagnostic reports. One variant per error kind
/// named in §7 of the front end's specification, plus the fuel/recursion
/// limits which are reported as fatal `Error`s rather than through this
/// enum — see `crate::Error`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum DiagnosticKind {
    UnterminatedString,
    UnterminatedComment,
    InvalidEscape,
    MalformedNumber,
    UnexpectedCharacter,
    ExpectedToken,
    UnexpectedToken,
    ExpectedDeclaration,
    ExpectedStatement,
    ExpectedExpression,
    Redeclaration,
    UndeclaredIdentifier,
    UndeclaredLabel,
    DuplicateLabel,
    NotAFunction,
    NotAStruct,
    UnknownField,
    ArityMismatch,
    TypeMismatch,
    NotAnLvalue,
    MissingMain,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    CaseOutsideSwitch,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnterminatedString => "lex-unterminated-string",
            DiagnosticKind::UnterminatedComment => "lex-unterminated-comment",
            DiagnosticKind::InvalidEscape => "lex-invalid-escape",
            DiagnosticKind::MalformedNumber => "lex-malformed-number",
            DiagnosticKind::UnexpectedCharacter => "lex-unexpected-character",
            DiagnosticKind::ExpectedToken => "parse-expected-token",
            DiagnosticKind::UnexpectedToken => "parse-unexpected-token",
            DiagnosticKind::ExpectedDeclaration => "parse-expected-declaration",
            DiagnosticKind::ExpectedStatement => "parse-expected-statement",
            DiagnosticKind::ExpectedExpression => "parse-expected-expression",
            DiagnosticKind::Redeclaration => "sema-redeclaration",
            DiagnosticKind::UndeclaredIdentifier => "sema-undeclared-identifier",
            DiagnosticKind::UndeclaredLabel => "sema-undeclared-label",
            DiagnosticKind::DuplicateLabel => "sema-duplicate-label",
            DiagnosticKind::NotAFunction => "sema-not-a-function",
            DiagnosticKind::NotAStruct => "sema-not-a-struct",
            DiagnosticKind::UnknownField => "sema-unknown-field",
            DiagnosticKind::ArityMismatch => "sema-arity-mismatch",
            DiagnosticKind::TypeMismatch => "sema-type-mismatch",
            DiagnosticKind::NotAnLvalue => "sema-not-an-lvalue",
            DiagnosticKind::MissingMain => "sema-missing-main",
            DiagnosticKind::BreakOutsideLoop => "sema-break-outside-loop",
            DiagnosticKind::ContinueOutsideLoop => "sema-continue-outside-loop",
            DiagnosticKind::CaseOutsideSwitch => "sema-case-outside-switch",
        }
    }
}

/// An edit suggested alongside a diagnostic.
#[derive(Clone, Debug)]
pub struct Fix {
    pub span: Span,
    pub replacement: String,
    pub description: String,
}

/// A secondary location that adds context to the primary diagnostic (e.g.
/// "first declared here").
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct DiagnosticMessage {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
    pub fix: Option<Fix>,
    pub related: Vec<RelatedInfo>,
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}: {}",
            self.severity,
            self.kind.code(),
            self.span,
            self.message
        )
    }
}
