#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core interning tables shared by the loomc front end: the representation
//! table (identifier/keyword spellings), the mode table (structural types),
//! and source-position bookkeeping.
//!
//! These tables outlive any single compiler pass — they are built once per
//! compilation and handed, read-mostly, to every stage from the lexer
//! through the tree builder.

pub mod mode;
pub mod repr;
pub mod span;

pub use mode::{Field, Mode, ModeIndex, ModeTable, Shape};
pub use repr::{Repr, ReprTable};
pub use span::{LineIndex, Position, Span};
