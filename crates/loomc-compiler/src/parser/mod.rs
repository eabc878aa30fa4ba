//! Recursive-descent parser combined with semantic analysis: each
//! `parse_*` method in [`decl`], [`stmt`], and [`expr`] both recognizes
//! grammar and resolves/validates it against the live tables ([`SymbolTable`],
//! [`ModeTable`], [`ReprTable`]) in the same pass, directly building
//! [`loomc_tree::node`] nodes — there is no separate untyped-AST phase to
//! type-check afterwards, mirroring how the reference compiler's recursive
//! descent allocates displacements and resolves references as it goes.

pub mod decl;
pub mod expr;
pub mod stmt;

use loomc_core::{Mode, ModeTable, ReprTable};
use loomc_tree::TreeBuilder;

use crate::analyze::{FrameAllocator, SymbolTable};
use crate::diagnostics::{Diagnostics, DiagnosticKind, SourceId};
use crate::lexer::{Token, TokenKind};
use crate::Error;

/// Execution-fuel and recursion-depth limits, generalizing the reference
/// compiler's implicit C-stack recursion bound into explicit, catchable
/// counters — the idiomatic substitute for "the OS will SIGSEGV on
/// adversarially deep input" in a language without a segfault-as-signal
/// safety net.
#[derive(Clone, Copy, Debug)]
pub struct AnalyzerConfig {
    pub parse_fuel: u32,
    pub recursion_limit: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { parse_fuel: 1_000_000, recursion_limit: 256 }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_fuel(mut self, fuel: u32) -> Self {
        self.config.parse_fuel = fuel;
        self
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.config.recursion_limit = limit;
        self
    }

    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source_id: SourceId,
    pub(crate) reprs: &'a mut ReprTable,
    pub(crate) modes: &'a mut ModeTable,
    pub(crate) symbols: SymbolTable,
    pub(crate) tree: TreeBuilder,
    pub(crate) frame: FrameAllocator,
    pub(crate) diagnostics: &'a mut Diagnostics,
    pub(crate) loop_depth: u32,
    pub(crate) switch_depth: u32,
    pub(crate) declared_labels: std::collections::HashSet<loomc_core::Repr>,
    pub(crate) goto_refs: Vec<(loomc_core::Repr, loomc_core::Span)>,
    /// Return mode of the function body currently being parsed, checked
    /// against each `return` statement inside it. `Mode::Void` at top level,
    /// where no `return` is reachable.
    pub(crate) current_return_mode: Mode,
    fuel_remaining: u32,
    depth: u32,
    config: AnalyzerConfig,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: Vec<Token>,
        source_id: SourceId,
        reprs: &'a mut ReprTable,
        modes: &'a mut ModeTable,
        diagnostics: &'a mut Diagnostics,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source_id,
            reprs,
            modes,
            symbols: SymbolTable::new(),
            tree: TreeBuilder::new(),
            frame: FrameAllocator::new(),
            diagnostics,
            loop_depth: 0,
            switch_depth: 0,
            declared_labels: std::collections::HashSet::new(),
            goto_refs: Vec::new(),
            current_return_mode: Mode::Void,
            fuel_remaining: config.parse_fuel,
            depth: 0,
            config,
        }
    }

    pub fn into_tree(self) -> TreeBuilder {
        self.tree
    }

    /// Consume the parser, handing back the tree builder together with the
    /// ident-tab it resolved references against — the driver needs both for
    /// the codegen handoff, after which neither is mutated again.
    pub fn into_tree_and_symbols(self) -> (TreeBuilder, SymbolTable) {
        (self.tree, self.symbols)
    }

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn nth_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn bump(&mut self) -> Token {
        let token = *self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Consume one unit of parse fuel. Returns an error once exhausted,
    /// the bounded substitute for an unbounded adversarial-input loop.
    pub(crate) fn consume_fuel(&mut self) -> Result<(), Error> {
        if self.fuel_remaining == 0 {
            return Err(Error::ExecFuelExhausted);
        }
        self.fuel_remaining -= 1;
        Ok(())
    }

    /// Enter one level of recursive descent. Pair with [`Parser::leave`].
    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.recursion_limit {
            return Err(Error::RecursionLimitExceeded);
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Skip tokens up to and including the next `;` or a matching `}`,
    /// the sync-token recovery strategy this front end uses instead of
    /// full error-production grammar.
    pub(crate) fn sync_to_statement_boundary(&mut self) {
        let mut depth = 0i32;
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::Raw(crate::lexer::RawKind::LBrace) => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::Raw(crate::lexer::RawKind::RBrace) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.bump();
                }
                TokenKind::Raw(crate::lexer::RawKind::Semi) if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Reset per-function label bookkeeping before parsing a new function
    /// body. Labels are function-scoped, so gotos may reference a label
    /// declared later in the same function but never one in another.
    pub(crate) fn begin_function_labels(&mut self) {
        self.declared_labels.clear();
        self.goto_refs.clear();
    }

    /// After a function body has been fully parsed, every goto referenced
    /// against a label that never appeared is reported once here — this is
    /// why label checking happens after the whole body is walked rather
    /// than inline at each `goto`.
    pub(crate) fn check_goto_targets(&mut self) {
        let refs = std::mem::take(&mut self.goto_refs);
        for (label, span) in refs {
            if !self.declared_labels.contains(&label) {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::UndeclaredLabel, span)
                    .message(format!("label `{}` is never defined in this function", self.reprs.spelling(label)))
                    .emit();
            }
        }
    }

    pub(crate) fn int_keyword_mode(&self, code: u32) -> Option<Mode> {
        use crate::keywords::code;
        match code {
            c if c == code::INT => Some(Mode::Int),
            c if c == code::FLOAT => Some(Mode::Float),
            c if c == code::CHAR => Some(Mode::Char),
            c if c == code::VOID => Some(Mode::Void),
            _ => None,
        }
    }
}
