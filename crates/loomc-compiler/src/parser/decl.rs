//! External declarations: type specifiers, struct definitions, variable
//! declarations, and function definitions.

use loomc_core::{Field, Mode, Shape};
use loomc_tree::{Expr, Initializer, VarDecl};

use crate::analyze::IdentKind;
use crate::diagnostics::DiagnosticKind;
use crate::keywords::code;
use crate::lexer::{RawKind, TokenKind};
use crate::Error;

use super::expr::to_rvalue;
use super::Parser;

impl<'a> Parser<'a> {
    /// Parse every external declaration until end of input, pushing each
    /// into the tree builder.
    pub fn parse_program(&mut self) -> Result<(), Error> {
        while !self.at_eof() {
            self.parse_external_decl()?;
        }
        if !self.tree.had_main() {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::MissingMain, self.current().span)
                .message("no function named `main` was declared")
                .emit();
        }
        Ok(())
    }

    fn parse_external_decl(&mut self) -> Result<(), Error> {
        self.consume_fuel()?;
        let start = self.current().span;

        if matches!(self.peek_kind(), TokenKind::Keyword(c) if c == code::STRUCT)
            && matches!(self.nth_kind(1), TokenKind::Ident(_))
            && matches!(self.nth_kind(2), TokenKind::Raw(RawKind::LBrace))
        {
            let mode = self.parse_struct_specifier()?;
            if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Semi)) {
                self.bump();
                self.tree.push_struct_only(mode, start);
                return Ok(());
            }
            return self.parse_declarators_tail(Mode::Composite(mode), start);
        }

        let Some(mode) = self.parse_type_specifier()? else {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ExpectedDeclaration, start)
                .message("expected a type specifier to start a declaration")
                .emit();
            self.sync_to_statement_boundary();
            return Ok(());
        };
        self.parse_declarators_tail(mode, start)
    }

    /// After a type specifier has been parsed (and, for structs, is already
    /// installed in mode-tab), parse either a function definition (single
    /// declarator followed by `(`) or one-or-more comma-separated variable
    /// declarators terminated by `;`.
    fn parse_declarators_tail(&mut self, mode: Mode, start: loomc_core::Span) -> Result<(), Error> {
        let (name, _) = self.expect_ident_repr("expected a declarator name")?;

        if matches!(self.peek_kind(), TokenKind::Raw(RawKind::LParen)) {
            return self.parse_func_def_tail(mode, name, start);
        }

        self.parse_var_decl_tail(mode, name, start, true)?;
        while matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
            self.bump();
            let (name, _) = self.expect_ident_repr("expected a declarator name")?;
            self.parse_var_decl_tail(mode, name, start, true)?;
        }
        self.expect_raw(RawKind::Semi, "expected `;` after declaration")?;
        Ok(())
    }

    fn parse_var_decl_tail(
        &mut self,
        mode: Mode,
        name: loomc_core::Repr,
        start: loomc_core::Span,
        top_level: bool,
    ) -> Result<(), Error> {
        let dim_sizes = self.parse_array_dims()?;
        let dims = dim_sizes.len() as u32;

        let init = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Eq)) {
            self.bump();
            Some(self.parse_initializer()?)
        } else {
            None
        };

        let word_size = if dims > 0 { 1 } else { self.mode_word_size(mode) };
        let displacement = if top_level && self.symbols.depth() == 1 {
            self.tree.fresh_global_displacement()
        } else {
            self.frame.alloc(word_size)
        };

        if let Err(err) = self.symbols.declare(name, mode, displacement, IdentKind::Variable) {
            self.report_redeclaration(name, start, err);
        }

        self.tree.push_var(VarDecl { name, mode, dims, dim_sizes, init, displacement, span: start });
        Ok(())
    }

    /// Parse zero-or-more `[ expr ]` declarator suffixes, outermost first,
    /// per §4.7's "handles arrays (`[expr]`)". An empty `[]` (no size
    /// expression) is treated as a zero-sized placeholder rather than
    /// requiring one, matching how a bare `int a[];` declarator parses
    /// elsewhere in this front end.
    pub(crate) fn parse_array_dims(&mut self) -> Result<Vec<Expr>, Error> {
        let mut dim_sizes = Vec::new();
        while matches!(self.peek_kind(), TokenKind::Raw(RawKind::LBracket)) {
            let open = self.bump().span;
            let size = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBracket)) {
                Expr::IntConst { value: 0, span: open }
            } else {
                to_rvalue(self.parse_expr()?)
            };
            self.expect_raw(RawKind::RBracket, "expected `]` after array dimension")?;
            dim_sizes.push(size);
        }
        Ok(dim_sizes)
    }

    fn parse_initializer(&mut self) -> Result<Initializer, Error> {
        if matches!(self.peek_kind(), TokenKind::Raw(RawKind::LBrace)) {
            self.bump();
            let mut items = Vec::new();
            if !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBrace)) {
                loop {
                    items.push(self.parse_initializer()?);
                    if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                        self.bump();
                        continue;
                    }
                    break;
                }
            }
            self.expect_raw(RawKind::RBrace, "expected `}` to close initializer list")?;
            return Ok(Initializer::List { is_struct: false, items });
        }
        Ok(Initializer::Expr(Box::new(super::expr::to_rvalue(self.parse_expr()?))))
    }

    fn parse_func_def_tail(
        &mut self,
        ret_mode: Mode,
        name: loomc_core::Repr,
        start: loomc_core::Span,
    ) -> Result<(), Error> {
        self.bump(); // `(`
        self.symbols.enter_scope();

        let mut params = Vec::new();
        let mut param_modes = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RParen)) {
            loop {
                let Some(param_mode) = self.parse_type_specifier()? else {
                    let span = self.current().span;
                    self.diagnostics
                        .report(self.source_id, DiagnosticKind::ExpectedDeclaration, span)
                        .message("expected a parameter type")
                        .emit();
                    break;
                };
                let (param_name, _) = self.expect_ident_repr("expected a parameter name")?;
                let displacement = self.frame.alloc(self.mode_word_size(param_mode));
                if let Err(err) = self.symbols.declare(param_name, param_mode, displacement, IdentKind::Parameter) {
                    self.report_redeclaration(param_name, start, err);
                }
                params.push(param_name);
                param_modes.push(param_mode);
                if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect_raw(RawKind::RParen, "expected `)` after parameter list")?;

        let func_mode = self.modes.intern(Shape::Function { ret: ret_mode, params: param_modes });
        let func_mode = Mode::Composite(func_mode);
        if let Err(err) = self.symbols.declare(name, func_mode, 0, IdentKind::Function) {
            self.report_redeclaration(name, start, err);
        }

        self.begin_function_labels();
        let prev_return_mode = self.current_return_mode;
        self.current_return_mode = ret_mode;
        let body = self.parse_block()?;
        self.current_return_mode = prev_return_mode;
        self.check_goto_targets();
        self.symbols.leave_scope();

        let is_main = self.reprs.spelling(name) == "main";
        self.tree.push_func(loomc_tree::FuncDef {
            name,
            mode: match func_mode {
                Mode::Composite(index) => index,
                _ => unreachable!("function mode is always composite"),
            },
            params,
            body: Box::new(body),
            is_main,
            span: start,
        });
        Ok(())
    }

    /// `struct { field-decl* }`, installing the struct's mode on first
    /// sight. Matches `init_modetab`'s struct-header shape: field count,
    /// word size, then `(mode, name)` pairs.
    fn parse_struct_specifier(&mut self) -> Result<loomc_core::ModeIndex, Error> {
        self.bump(); // `struct`
        let _tag_name = if let TokenKind::Ident(repr) = self.peek_kind() {
            self.bump();
            Some(repr)
        } else {
            None
        };
        self.expect_raw(RawKind::LBrace, "expected `{` to open struct body")?;

        let mut fields = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBrace)) && !self.at_eof() {
            let Some(field_mode) = self.parse_type_specifier()? else {
                self.sync_to_statement_boundary();
                continue;
            };
            loop {
                let (field_name, _) = self.expect_ident_repr("expected a field name")?;
                fields.push(Field { mode: field_mode, name: field_name });
                if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                    self.bump();
                    continue;
                }
                break;
            }
            self.expect_raw(RawKind::Semi, "expected `;` after field declaration")?;
        }
        self.expect_raw(RawKind::RBrace, "expected `}` to close struct body")?;

        Ok(self.modes.intern(Shape::Struct { fields }))
    }

    /// `int | float | char | void | struct {...} | *type`. Returns `None`
    /// if the current token does not start a type specifier.
    pub(crate) fn parse_type_specifier(&mut self) -> Result<Option<Mode>, Error> {
        let base = match self.peek_kind() {
            TokenKind::Keyword(c) if c == code::INT => Mode::Int,
            TokenKind::Keyword(c) if c == code::FLOAT => Mode::Float,
            TokenKind::Keyword(c) if c == code::CHAR => Mode::Char,
            TokenKind::Keyword(c) if c == code::VOID => Mode::Void,
            TokenKind::Keyword(c) if c == code::STRUCT => {
                if matches!(self.nth_kind(1), TokenKind::Raw(RawKind::LBrace))
                    || (matches!(self.nth_kind(1), TokenKind::Ident(_))
                        && matches!(self.nth_kind(2), TokenKind::Raw(RawKind::LBrace)))
                {
                    Mode::Composite(self.parse_struct_specifier()?)
                } else {
                    return Ok(None);
                }
            }
            _ => return Ok(None),
        };

        let mut mode = base;
        while matches!(self.peek_kind(), TokenKind::Raw(RawKind::Star)) {
            self.bump();
            mode = match mode {
                Mode::Void => Mode::VoidPointer,
                other => Mode::Composite(self.modes.intern(Shape::Pointer { pointee: other })),
            };
        }
        Ok(Some(mode))
    }

    fn mode_word_size(&self, mode: Mode) -> u32 {
        self.modes.word_size(mode)
    }

    fn report_redeclaration(
        &mut self,
        name: loomc_core::Repr,
        span: loomc_core::Span,
        err: crate::analyze::RedeclarationError,
    ) {
        let _ = err;
        self.diagnostics
            .report(self.source_id, DiagnosticKind::Redeclaration, span)
            .message(format!("`{}` is already declared in this scope", self.reprs.spelling(name)))
            .emit();
    }
}
