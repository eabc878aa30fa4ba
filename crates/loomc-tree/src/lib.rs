//! The flat, tagged, append-only tree handed to the (out-of-scope) code
//! generator, plus the owned in-memory form the analyzer actually builds.
//!
//! [`node`] is the tagged-variant tree the parser and analyzer construct and
//! walk; [`serialize`] is the only place that turns it into the raw
//! [`tag::Tag`] integer stream; [`validate`] checks the stream's structural
//! invariants independently of how it was produced.

#![allow(clippy::comparison_chain)]

pub mod builder;
pub mod functions;
pub mod node;
pub mod serialize;
pub mod tag;
pub mod validate;

pub use builder::TreeBuilder;
pub use functions::{FunctionEntry, FunctionsTable};
pub use node::{
    Annotation, AssignOp, BinaryOp, Decl, Displacement, Expr, FuncDef, Initializer, Program,
    Stmt, UnaryOp, VarDecl,
};
pub use serialize::serialize;
pub use tag::Tag;
pub use validate::{check_balance, read_tags, DecodeError};
