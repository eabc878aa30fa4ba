//! Compiler front end for a C-like language with structured-messaging and
//! lightweight-thread extensions: lexer, recursive-descent parser/analyzer,
//! and shared symbol/type tables, producing a typed tree ready for handoff
//! to an external code generator.
//!
//! - `lexer` - tokenization
//! - `keywords` - reserved-word manifest loading
//! - `analyze` - the identifier table and frame-displacement allocator
//! - `parser` - recursive-descent parsing combined with semantic analysis
//! - `diagnostics` - error reporting
//! - `driver` - end-to-end compilation pipeline

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod diagnostics;
pub mod driver;
pub mod keywords;
pub mod lexer;
pub mod parser;

pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use diagnostics::{SourceId, SourceMap};
pub use loomc_core::Span;
pub use driver::{CodegenHandoff, Driver};

/// Errors that can occur while running the compilation pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// The keyword manifest handed to the driver could not be parsed.
    #[error("invalid keyword manifest: {0}")]
    KeywordManifest(#[from] keywords::ManifestError),

    /// Analysis completed but reported one or more diagnostics; codegen
    /// handoff does not happen until the caller has seen and addressed them.
    /// Carries the source map alongside the diagnostics so a caller can
    /// still render them with `DiagnosticsPrinter` after the failure.
    #[error("compilation failed with {} errors", .0.error_count())]
    AnalysisFailed(Diagnostics, SourceMap),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
