//! Statements and the control-flow constructs of the language, including the
//! messaging/thread extensions (`t_create_direct`, `t_msg_send`,
//! `t_msg_receive`) layered on top of ordinary call syntax.

use loomc_core::Mode;
use loomc_tree::Stmt;

use crate::analyze::IdentKind;
use crate::diagnostics::DiagnosticKind;
use crate::keywords::code;
use crate::lexer::{RawKind, TokenKind};
use crate::Error;

use super::expr::to_rvalue;
use super::Parser;

impl<'a> Parser<'a> {
    pub fn parse_block(&mut self) -> Result<Stmt, Error> {
        self.consume_fuel()?;
        self.enter()?;
        self.expect_raw(RawKind::LBrace, "expected `{`")?;
        self.symbols.enter_scope();
        let cursor = self.frame.cursor();

        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBrace)) && !self.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect_raw(RawKind::RBrace, "expected `}` to close block")?;

        self.frame.rewind(cursor);
        self.symbols.leave_scope();
        self.leave();
        Ok(Stmt::Block(stmts))
    }

    pub fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        self.consume_fuel()?;
        self.enter()?;
        let result = self.parse_stmt_inner();
        self.leave();
        result
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            TokenKind::Raw(RawKind::LBrace) => self.parse_block(),
            TokenKind::Raw(RawKind::Semi) => {
                self.bump();
                Ok(Stmt::Nop)
            }
            TokenKind::Keyword(c) if c == code::T_CREATE_DIRECT => self.parse_create_direct(),
            TokenKind::Keyword(c) if c == code::IF => self.parse_if(),
            TokenKind::Keyword(c) if c == code::FOR => self.parse_for(),
            TokenKind::Keyword(c) if c == code::WHILE => self.parse_while(),
            TokenKind::Keyword(c) if c == code::DO => self.parse_do_while(),
            TokenKind::Keyword(c) if c == code::SWITCH => self.parse_switch(),
            TokenKind::Keyword(c) if c == code::CASE => self.parse_case(),
            TokenKind::Keyword(c) if c == code::DEFAULT => self.parse_default(),
            TokenKind::Keyword(c) if c == code::RETURN => self.parse_return(),
            TokenKind::Keyword(c) if c == code::BREAK => self.parse_break(),
            TokenKind::Keyword(c) if c == code::CONTINUE => self.parse_continue(),
            TokenKind::Keyword(c) if c == code::GOTO => self.parse_goto(),
            TokenKind::Keyword(c) if c == code::PRINT => self.parse_print(),
            TokenKind::Keyword(c) if c == code::PRINTF => self.parse_printf(),
            TokenKind::Keyword(c) if c == code::GET => self.parse_get(),
            TokenKind::Keyword(c)
                if c == code::INT || c == code::FLOAT || c == code::CHAR || c == code::VOID || c == code::STRUCT =>
            {
                self.parse_local_decl()
            }
            TokenKind::Ident(_) if matches!(self.nth_kind(1), TokenKind::Raw(RawKind::Colon)) => self.parse_label(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect_raw(RawKind::Semi, "expected `;` after expression statement")?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_local_decl(&mut self) -> Result<Stmt, Error> {
        self.parse_local_var_decls()
    }

    fn parse_label(&mut self) -> Result<Stmt, Error> {
        let (name, span) = self.expect_ident_repr("expected a label name")?;
        self.expect_raw(RawKind::Colon, "expected `:` after label")?;
        if !self.declared_labels.insert(name) {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::DuplicateLabel, span)
                .message(format!("label `{}` is defined more than once", self.reprs.spelling(name)))
                .emit();
        }
        let body = self.parse_stmt()?;
        Ok(Stmt::Label { name, body: Box::new(body) })
    }

    fn parse_create_direct(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LBrace, "expected `{` after `t_create_direct`")?;
        self.symbols.enter_scope();
        let cursor = self.frame.cursor();
        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBrace)) && !self.at_eof() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect_raw(RawKind::RBrace, "expected `}` to close `t_create_direct` block")?;
        self.frame.rewind(cursor);
        self.symbols.leave_scope();
        Ok(Stmt::CreateDirect(stmts))
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LParen, "expected `(` after `if`")?;
        let cond = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::RParen, "expected `)` after condition")?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if matches!(self.peek_kind(), TokenKind::Keyword(c) if c == code::ELSE) {
            self.bump();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If { cond, then_branch, else_branch })
    }

    fn parse_for(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LParen, "expected `(` after `for`")?;
        self.symbols.enter_scope();
        let cursor = self.frame.cursor();

        let init = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Semi)) {
            self.bump();
            None
        } else {
            Some(Box::new(self.parse_for_init()?))
        };
        let cond = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Semi)) {
            None
        } else {
            Some(to_rvalue(self.parse_expr()?))
        };
        self.expect_raw(RawKind::Semi, "expected `;` after for-condition")?;
        let step = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::RParen)) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_raw(RawKind::RParen, "expected `)` after for-clauses")?;

        self.loop_depth += 1;
        let body = Box::new(self.parse_stmt()?);
        self.loop_depth -= 1;

        self.frame.rewind(cursor);
        self.symbols.leave_scope();
        Ok(Stmt::For { init, cond, step, body })
    }

    fn parse_for_init(&mut self) -> Result<Stmt, Error> {
        if matches!(
            self.peek_kind(),
            TokenKind::Keyword(c)
                if c == code::INT || c == code::FLOAT || c == code::CHAR || c == code::VOID || c == code::STRUCT
        ) {
            return self.parse_local_var_decls();
        }
        let expr = self.parse_expr()?;
        self.expect_raw(RawKind::Semi, "expected `;` after for-init")?;
        Ok(Stmt::Expr(expr))
    }

    fn parse_while(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LParen, "expected `(` after `while`")?;
        let cond = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::RParen, "expected `)` after condition")?;
        self.loop_depth += 1;
        let body = Box::new(self.parse_stmt()?);
        self.loop_depth -= 1;
        Ok(Stmt::While { cond, body })
    }

    fn parse_do_while(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.loop_depth += 1;
        let body = Box::new(self.parse_stmt()?);
        self.loop_depth -= 1;
        if !matches!(self.peek_kind(), TokenKind::Keyword(c) if c == code::WHILE) {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ExpectedToken, self.current().span)
                .message("expected `while` after `do` block")
                .emit();
        } else {
            self.bump();
        }
        self.expect_raw(RawKind::LParen, "expected `(` after `while`")?;
        let cond = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::RParen, "expected `)` after condition")?;
        self.expect_raw(RawKind::Semi, "expected `;` after `do ... while (...)`")?;
        Ok(Stmt::DoWhile { body, cond })
    }

    fn parse_switch(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LParen, "expected `(` after `switch`")?;
        let scrutinee = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::RParen, "expected `)` after switch scrutinee")?;
        self.switch_depth += 1;
        let body = Box::new(self.parse_stmt()?);
        self.switch_depth -= 1;
        Ok(Stmt::Switch { scrutinee, body })
    }

    fn parse_case(&mut self) -> Result<Stmt, Error> {
        let span = self.bump().span;
        if self.switch_depth == 0 {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::CaseOutsideSwitch, span)
                .message("`case` outside of a `switch`")
                .emit();
        }
        let value = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::Colon, "expected `:` after case value")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::Case { value, body })
    }

    fn parse_default(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::Colon, "expected `:` after `default`")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::Default { body })
    }

    fn parse_return(&mut self) -> Result<Stmt, Error> {
        let span = self.bump().span;
        let mode = self.current_return_mode;
        if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Semi)) {
            self.bump();
            if mode != Mode::Void {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::TypeMismatch, span)
                    .message("missing return value in a function that does not return void")
                    .emit();
            }
            return Ok(Stmt::Return { value: None, mode });
        }
        let expr = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::Semi, "expected `;` after return value")?;
        if mode == Mode::Void {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::TypeMismatch, span)
                .message("returning a value from a function declared to return void")
                .emit();
        } else if !self.modes_assignable(mode, self.infer_mode(&expr)) {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::TypeMismatch, span)
                .message("returned value's type does not match the function's return type")
                .emit();
        }
        Ok(Stmt::Return { value: Some(expr), mode })
    }

    fn parse_break(&mut self) -> Result<Stmt, Error> {
        let span = self.bump().span;
        self.expect_raw(RawKind::Semi, "expected `;` after `break`")?;
        if self.loop_depth == 0 && self.switch_depth == 0 {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::BreakOutsideLoop, span)
                .message("`break` outside of a loop or `switch`")
                .emit();
        }
        Ok(Stmt::Break)
    }

    fn parse_continue(&mut self) -> Result<Stmt, Error> {
        let span = self.bump().span;
        self.expect_raw(RawKind::Semi, "expected `;` after `continue`")?;
        if self.loop_depth == 0 {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ContinueOutsideLoop, span)
                .message("`continue` outside of a loop")
                .emit();
        }
        Ok(Stmt::Continue)
    }

    fn parse_goto(&mut self) -> Result<Stmt, Error> {
        self.bump();
        let (name, span) = self.expect_ident_repr("expected a label name after `goto`")?;
        self.expect_raw(RawKind::Semi, "expected `;` after `goto` target")?;
        self.goto_refs.push((name, span));
        Ok(Stmt::Goto(name))
    }

    fn parse_print(&mut self) -> Result<Stmt, Error> {
        self.bump();
        // `print ident;` (read one global by name) vs. `print expr;`
        // (an expression-statement print with no formatting): the built-in
        // reads-a-global form only applies to a bare identifier directly
        // followed by `;`.
        if let TokenKind::Ident(repr) = self.peek_kind() {
            if matches!(self.nth_kind(1), TokenKind::Raw(RawKind::Semi)) {
                self.bump();
                self.bump();
                if self.symbols.resolve(repr).is_none() {
                    self.diagnostics
                        .report(self.source_id, DiagnosticKind::UndeclaredIdentifier, self.current().span)
                        .message(format!("`{}` is not declared", self.reprs.spelling(repr)))
                        .emit();
                }
                return Ok(Stmt::PrintId(repr));
            }
        }
        let expr = to_rvalue(self.parse_expr()?);
        self.expect_raw(RawKind::Semi, "expected `;` after `print` expression")?;
        Ok(Stmt::Print(expr))
    }

    fn parse_printf(&mut self) -> Result<Stmt, Error> {
        self.bump();
        self.expect_raw(RawKind::LParen, "expected `(` after `printf`")?;
        let format = Box::new(to_rvalue(self.parse_expr()?));
        let mut args = Vec::new();
        while matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
            self.bump();
            args.push(to_rvalue(self.parse_expr()?));
        }
        self.expect_raw(RawKind::RParen, "expected `)` after `printf` arguments")?;
        self.expect_raw(RawKind::Semi, "expected `;` after `printf(...)`")?;
        Ok(Stmt::Printf { format, args })
    }

    fn parse_get(&mut self) -> Result<Stmt, Error> {
        self.bump();
        let (name, span) = self.expect_ident_repr("expected an identifier after `get`")?;
        self.expect_raw(RawKind::Semi, "expected `;` after `get` target")?;
        if self.symbols.resolve(name).is_none() {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::UndeclaredIdentifier, span)
                .message(format!("`{}` is not declared", self.reprs.spelling(name)))
                .emit();
        }
        Ok(Stmt::GetId(name))
    }

    /// Parse one-or-more comma-separated local variable declarators after a
    /// type specifier already recognized by `parse_stmt_inner`, returning
    /// the block-local equivalent of `parse_declarators_tail` but as a
    /// single `Stmt` (locals declared with an initializer list longer than
    /// one declarator become a `Stmt::Block` of individual `Stmt::Decl`s).
    fn parse_local_var_decls(&mut self) -> Result<Stmt, Error> {
        let start = self.current().span;
        let mode = self
            .parse_type_specifier()?
            .expect("caller only invokes this after peeking a type specifier");

        let mut decls = Vec::new();
        loop {
            let (name, _) = self.expect_ident_repr("expected a declarator name")?;
            decls.push(self.parse_one_local_var(mode, name, start)?);
            if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect_raw(RawKind::Semi, "expected `;` after declaration")?;

        if decls.len() == 1 {
            return Ok(Stmt::Decl(decls.pop().unwrap()));
        }
        Ok(Stmt::Block(decls.into_iter().map(Stmt::Decl).collect()))
    }

    fn parse_one_local_var(
        &mut self,
        mode: loomc_core::Mode,
        name: loomc_core::Repr,
        start: loomc_core::Span,
    ) -> Result<loomc_tree::VarDecl, Error> {
        let dim_sizes = self.parse_array_dims()?;
        let dims = dim_sizes.len() as u32;
        let init = if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Eq)) {
            self.bump();
            Some(self.parse_initializer_expr_only()?)
        } else {
            None
        };
        let word_size = if dims > 0 { 1 } else { self.modes.word_size(mode) };
        let displacement = self.frame.alloc(word_size);
        if self.symbols.declare(name, mode, displacement, IdentKind::Variable).is_err() {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::Redeclaration, start)
                .message(format!("`{}` is already declared in this scope", self.reprs.spelling(name)))
                .emit();
        }
        Ok(loomc_tree::VarDecl { name, mode, dims, dim_sizes, init, displacement, span: start })
    }

    fn parse_initializer_expr_only(&mut self) -> Result<loomc_tree::Initializer, Error> {
        if matches!(self.peek_kind(), TokenKind::Raw(RawKind::LBrace)) {
            self.bump();
            let mut items = Vec::new();
            if !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RBrace)) {
                loop {
                    items.push(self.parse_initializer_expr_only()?);
                    if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                        self.bump();
                        continue;
                    }
                    break;
                }
            }
            self.expect_raw(RawKind::RBrace, "expected `}` to close initializer list")?;
            return Ok(loomc_tree::Initializer::List { is_struct: false, items });
        }
        Ok(loomc_tree::Initializer::Expr(Box::new(to_rvalue(self.parse_expr()?))))
    }
}
