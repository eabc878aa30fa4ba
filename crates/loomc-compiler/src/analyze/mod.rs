//! Semantic analysis collaborators shared across the parser's single
//! combined parse-and-analyze pass: the scoped identifier table and the
//! per-function frame allocator.

pub mod frame;
pub mod symtab;

pub use frame::FrameAllocator;
pub use symtab::{IdentEntry, IdentIndex, IdentKind, RedeclarationError, SymbolTable};
