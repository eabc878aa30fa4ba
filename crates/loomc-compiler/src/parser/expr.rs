//! Expression parsing and the annotation stack: for each operand, tracks
//! whether its value lives on the evaluation stack (`VAL`), behind an
//! address on the evaluation stack (`ADDR`), or at a known displacement
//! (`IDENT`), per this front end's expression-analyzer contract.

use loomc_core::Mode;
use loomc_tree::{Annotation, AssignOp, BinaryOp, Expr, UnaryOp};

use crate::analyze::IdentKind;
use crate::diagnostics::DiagnosticKind;
use crate::lexer::{RawKind, TokenKind};
use crate::Error;

use super::Parser;

impl<'a> Parser<'a> {
    pub fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.consume_fuel()?;
        self.enter()?;
        let result = self.parse_assignment();
        self.leave();
        result
    }

    fn parse_assignment(&mut self) -> Result<Expr, Error> {
        let lhs = self.parse_conditional()?;
        let op = match self.peek_kind() {
            TokenKind::Raw(RawKind::Eq) => AssignOp::Assign,
            TokenKind::Raw(RawKind::PlusEq) => AssignOp::Add,
            TokenKind::Raw(RawKind::MinusEq) => AssignOp::Sub,
            TokenKind::Raw(RawKind::StarEq) => AssignOp::Mul,
            TokenKind::Raw(RawKind::SlashEq) => AssignOp::Div,
            TokenKind::Raw(RawKind::PercentEq) => AssignOp::Mod,
            TokenKind::Raw(RawKind::ShlEq) => AssignOp::Shl,
            TokenKind::Raw(RawKind::ShrEq) => AssignOp::Shr,
            TokenKind::Raw(RawKind::AmpEq) => AssignOp::BitAnd,
            TokenKind::Raw(RawKind::PipeEq) => AssignOp::BitOr,
            TokenKind::Raw(RawKind::CaretEq) => AssignOp::BitXor,
            _ => return Ok(lhs),
        };
        self.bump();
        let value = to_rvalue(self.parse_assignment()?);
        let span = lhs.span().to(value.span());
        if !is_lvalue(&lhs) {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::NotAnLvalue, span)
                .message("left-hand side of assignment is not assignable")
                .emit();
        } else {
            let target_mode = self.infer_mode(&lhs);
            let value_mode = self.infer_mode(&value);
            if !self.modes_assignable(target_mode, value_mode) {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::TypeMismatch, span)
                    .message("assigned value's type does not match the target's type")
                    .emit();
            }
        }
        Ok(Expr::Assign { op, target: Box::new(lhs), value: Box::new(value), span })
    }

    fn parse_conditional(&mut self) -> Result<Expr, Error> {
        let cond = self.parse_binary(0)?;
        if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Question)) {
            self.bump();
            let cond = to_rvalue(cond);
            let then_expr = to_rvalue(self.parse_assignment()?);
            self.expect_raw(RawKind::Colon, "expected `:` in conditional expression")?;
            let else_expr = to_rvalue(self.parse_assignment()?);
            let span = cond.span().to(else_expr.span());
            return Ok(Expr::Cond {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }
        Ok(cond)
    }

    /// Precedence-climbing binary-operator parser. `min_bp` is the minimum
    /// binding power an operator must have to be consumed at this level.
    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, Error> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some((op, bp)) = self.peek_binary_op() else { break };
            if bp < min_bp {
                break;
            }
            let op_span = self.current().span;
            self.bump();
            lhs = to_rvalue(lhs);
            let rhs = to_rvalue(self.parse_binary(bp + 1)?);
            if is_arithmetic_op(op) {
                let lmode = self.infer_mode(&lhs);
                let rmode = self.infer_mode(&rhs);
                if !is_numeric(lmode) || !is_numeric(rmode) {
                    self.diagnostics
                        .report(self.source_id, DiagnosticKind::TypeMismatch, op_span)
                        .message("arithmetic operator requires numeric operands")
                        .emit();
                }
            }
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, u8)> {
        use RawKind::*;
        Some(match self.peek_kind() {
            TokenKind::Raw(PipePipe) => (BinaryOp::Or, 1),
            TokenKind::Raw(AmpAmp) => (BinaryOp::And, 2),
            TokenKind::Raw(Pipe) => (BinaryOp::BitOr, 3),
            TokenKind::Raw(Caret) => (BinaryOp::BitXor, 4),
            TokenKind::Raw(Amp) => (BinaryOp::BitAnd, 5),
            TokenKind::Raw(EqEq) => (BinaryOp::Eq, 6),
            TokenKind::Raw(BangEq) => (BinaryOp::Ne, 6),
            TokenKind::Raw(Lt) => (BinaryOp::Lt, 7),
            TokenKind::Raw(LtEq) => (BinaryOp::Le, 7),
            TokenKind::Raw(Gt) => (BinaryOp::Gt, 7),
            TokenKind::Raw(GtEq) => (BinaryOp::Ge, 7),
            TokenKind::Raw(ShlOp) => (BinaryOp::Shl, 8),
            TokenKind::Raw(ShrOp) => (BinaryOp::Shr, 8),
            TokenKind::Raw(Plus) => (BinaryOp::Add, 9),
            TokenKind::Raw(Minus) => (BinaryOp::Sub, 9),
            TokenKind::Raw(Star) => (BinaryOp::Mul, 10),
            TokenKind::Raw(Slash) => (BinaryOp::Div, 10),
            TokenKind::Raw(Percent) => (BinaryOp::Mod, 10),
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        self.consume_fuel()?;
        let (op, start) = match self.peek_kind() {
            TokenKind::Raw(RawKind::Minus) => (UnaryOp::Neg, self.current().span),
            TokenKind::Raw(RawKind::Bang) => (UnaryOp::Not, self.current().span),
            TokenKind::Raw(RawKind::Tilde) => (UnaryOp::BitNot, self.current().span),
            TokenKind::Raw(RawKind::PlusPlus) => (UnaryOp::PreInc, self.current().span),
            TokenKind::Raw(RawKind::MinusMinus) => (UnaryOp::PreDec, self.current().span),
            TokenKind::Raw(RawKind::Amp) => (UnaryOp::AddrOf, self.current().span),
            TokenKind::Raw(RawKind::Star) => (UnaryOp::Deref, self.current().span),
            _ => return self.parse_postfix(),
        };
        self.bump();
        let operand = self.parse_unary()?;
        // `&`/`++`/`--` need the operand's address or displacement, not its
        // loaded value; every other unary operator computes on a value.
        let operand = match op {
            UnaryOp::AddrOf | UnaryOp::PreInc | UnaryOp::PreDec => operand,
            _ => to_rvalue(operand),
        };
        let span = start.to(operand.span());
        let expr = Expr::Unary { op, operand: Box::new(operand), span };
        if op == UnaryOp::Deref {
            return Ok(Expr::AddrToVal { inner: Box::new(expr), span });
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::Raw(RawKind::Dot) | TokenKind::Raw(RawKind::Arrow) => {
                    self.bump();
                    let (field_repr, field_span) = self.expect_ident_repr("expected field name")?;
                    let span = expr.span().to(field_span);
                    let field_displacement = self.resolve_field(&expr, field_repr, span);
                    expr = Expr::Select {
                        base: Box::new(expr),
                        field_displacement,
                        annotation: Annotation::Addr,
                        span,
                    };
                }
                TokenKind::Raw(RawKind::LBracket) => {
                    self.bump();
                    let index = to_rvalue(self.parse_expr()?);
                    let close = self.expect_raw(RawKind::RBracket, "expected `]`")?;
                    let span = expr.span().to(close);
                    expr = Expr::Slice { base: Box::new(expr), index: Box::new(index), span };
                }
                TokenKind::Raw(RawKind::LParen) => {
                    expr = self.parse_call(expr)?;
                }
                TokenKind::Raw(RawKind::PlusPlus) => {
                    let end = self.bump().span;
                    let span = expr.span().to(end);
                    expr = Expr::Unary { op: UnaryOp::PostInc, operand: Box::new(expr), span };
                }
                TokenKind::Raw(RawKind::MinusMinus) => {
                    let end = self.bump().span;
                    let span = expr.span().to(end);
                    expr = Expr::Unary { op: UnaryOp::PostDec, operand: Box::new(expr), span };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, Error> {
        let Expr::Ident { repr, span: callee_span, .. } = callee else {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::NotAFunction, callee.span())
                .message("called expression is not a function name")
                .emit();
            self.skip_call_parens()?;
            return Ok(callee);
        };
        self.bump(); // `(`
        let mut args = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::Raw(RawKind::RParen)) {
            loop {
                args.push(to_rvalue(self.parse_assignment()?));
                if matches!(self.peek_kind(), TokenKind::Raw(RawKind::Comma)) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        let close = self.expect_raw(RawKind::RParen, "expected `)` after call arguments")?;
        self.check_call_arity(repr, &args, callee_span);
        Ok(Expr::Call { callee: repr, args, span: callee_span.to(close) })
    }

    fn skip_call_parens(&mut self) -> Result<(), Error> {
        self.bump();
        let mut depth = 1;
        while depth > 0 && !self.at_eof() {
            match self.bump().kind {
                TokenKind::Raw(RawKind::LParen) => depth += 1,
                TokenKind::Raw(RawKind::RParen) => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    fn check_call_arity(&mut self, callee: loomc_core::Repr, args: &[Expr], span: loomc_core::Span) {
        let Some(ident) = self.symbols.resolve(callee) else { return };
        let entry = self.symbols.entry(ident);
        if entry.kind != IdentKind::Function {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::NotAFunction, span)
                .message(format!("`{}` is not a function", self.reprs.spelling(callee)))
                .emit();
            return;
        }
        let Mode::Composite(mode_index) = entry.mode else { return };
        let params = match self.modes.shape(mode_index) {
            loomc_core::Shape::Function { params, .. } => params.clone(),
            _ => return,
        };
        if params.len() != args.len() {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ArityMismatch, span)
                .message(format!(
                    "`{}` expects {} argument(s), found {}",
                    self.reprs.spelling(callee),
                    params.len(),
                    args.len()
                ))
                .emit();
            return;
        }
        for (param_mode, arg) in params.iter().zip(args.iter()) {
            let arg_mode = self.infer_mode(arg);
            if !self.modes_assignable(*param_mode, arg_mode) {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::TypeMismatch, arg.span())
                    .message(format!(
                        "argument type does not match the declared parameter type in a call to `{}`",
                        self.reprs.spelling(callee)
                    ))
                    .emit();
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        self.consume_fuel()?;
        let token = *self.current();
        match token.kind {
            TokenKind::IntLiteral(value) => {
                self.bump();
                Ok(Expr::IntConst { value, span: token.span })
            }
            TokenKind::FloatLiteral(value) => {
                self.bump();
                Ok(Expr::FloatConst { value, span: token.span })
            }
            TokenKind::StringLiteral(value) => {
                self.bump();
                Ok(Expr::StringConst { value, span: token.span })
            }
            TokenKind::CharLiteral(ch) => {
                self.bump();
                Ok(Expr::IntConst { value: ch as i64, span: token.span })
            }
            TokenKind::Ident(repr) => {
                self.bump();
                Ok(self.resolve_ident(repr, token.span))
            }
            TokenKind::Raw(RawKind::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_raw(RawKind::RParen, "expected `)`")?;
                Ok(inner)
            }
            _ => {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::ExpectedExpression, token.span)
                    .message("expected an expression")
                    .emit();
                self.bump();
                Ok(Expr::IntConst { value: 0, span: token.span })
            }
        }
    }

    fn resolve_ident(&mut self, repr: loomc_core::Repr, span: loomc_core::Span) -> Expr {
        match self.symbols.resolve(repr) {
            Some(index) => {
                let entry = self.symbols.entry(index);
                Expr::Ident {
                    repr,
                    displacement: entry.displacement,
                    annotation: Annotation::Ident(entry.displacement),
                    span,
                }
            }
            None => {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::UndeclaredIdentifier, span)
                    .message(format!("`{}` is not declared", self.reprs.spelling(repr)))
                    .emit();
                Expr::Ident { repr, displacement: 0, annotation: Annotation::Val, span }
            }
        }
    }

    fn resolve_field(&mut self, base: &Expr, field: loomc_core::Repr, span: loomc_core::Span) -> u32 {
        let Some(mode) = self.infer_struct_mode(base) else {
            self.diagnostics
                .report(self.source_id, DiagnosticKind::NotAStruct, span)
                .message("base of `.`/`->` is not a struct")
                .emit();
            return 0;
        };
        match self.modes.find_field(mode, field) {
            Some((displacement, _)) => displacement,
            None => {
                self.diagnostics
                    .report(self.source_id, DiagnosticKind::UnknownField, span)
                    .message(format!("no field `{}` on this struct", self.reprs.spelling(field)))
                    .emit();
                0
            }
        }
    }

    fn infer_struct_mode(&self, expr: &Expr) -> Option<loomc_core::ModeIndex> {
        if let Expr::Ident { repr, .. } = expr {
            let index = self.symbols.resolve(*repr)?;
            if let Mode::Composite(mode_index) = self.symbols.entry(index).mode {
                if matches!(self.modes.shape(mode_index), loomc_core::Shape::Struct { .. }) {
                    return Some(mode_index);
                }
            }
        }
        None
    }

    /// Recovers an already-built expression's mode by walking the tree and
    /// re-resolving identifiers/fields/calls against the live tables, the
    /// same way `resolve_ident`/`resolve_field`/`check_call_arity` did while
    /// building it. Used only by the type checks below; it never reports
    /// diagnostics of its own, and falls back to `Mode::Int` for anything it
    /// cannot classify (an already-undeclared identifier, for instance,
    /// which has its own diagnostic from when it was first resolved).
    pub(crate) fn infer_mode(&self, expr: &Expr) -> Mode {
        match expr {
            Expr::IntConst { .. } => Mode::Int,
            Expr::FloatConst { .. } => Mode::Float,
            Expr::StringConst { .. } => Mode::VoidPointer,
            Expr::Ident { repr, .. } => match self.symbols.resolve(*repr) {
                Some(index) => self.symbols.entry(index).mode,
                None => Mode::Int,
            },
            Expr::Select { base, field_displacement, .. } => match self.infer_struct_mode(base) {
                Some(mode_index) => self.modes.field_mode_at(mode_index, *field_displacement).unwrap_or(Mode::Int),
                None => Mode::Int,
            },
            Expr::AddrToVal { inner, .. } => match self.infer_mode(inner) {
                Mode::Composite(index) => match self.modes.shape(index) {
                    loomc_core::Shape::Pointer { pointee } => *pointee,
                    _ => Mode::Int,
                },
                Mode::VoidPointer => Mode::Void,
                other => other,
            },
            Expr::Slice { base, .. } => match self.infer_mode(base) {
                Mode::Composite(index) => match self.modes.shape(index) {
                    loomc_core::Shape::Array { element } => *element,
                    loomc_core::Shape::Pointer { pointee } => *pointee,
                    _ => Mode::Int,
                },
                Mode::VoidPointer => Mode::Void,
                other => other,
            },
            Expr::Call { callee, .. } => match self.symbols.resolve(*callee) {
                Some(index) => match self.symbols.entry(index).mode {
                    Mode::Composite(mode_index) => match self.modes.shape(mode_index) {
                        loomc_core::Shape::Function { ret, .. } => *ret,
                        _ => Mode::Int,
                    },
                    other => other,
                },
                None => Mode::Int,
            },
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Not => Mode::Int,
                // No pointer-to-T mode is synthesized for `&expr` here; see DESIGN.md.
                UnaryOp::AddrOf => Mode::VoidPointer,
                _ => self.infer_mode(operand),
            },
            Expr::Binary { op, lhs, rhs, .. } => {
                if is_comparison_or_logical_op(*op) {
                    Mode::Int
                } else {
                    let lmode = self.infer_mode(lhs);
                    let rmode = self.infer_mode(rhs);
                    if lmode == Mode::Float || rmode == Mode::Float { Mode::Float } else { Mode::Int }
                }
            }
            Expr::Assign { target, .. } => self.infer_mode(target),
            Expr::Cond { then_expr, .. } => self.infer_mode(then_expr),
        }
    }

    /// Whether a value of mode `value` may be stored into, passed as, or
    /// returned as a target of mode `target`. Numeric modes freely convert
    /// into each other (the original's widening rule, without a dedicated
    /// tree node for the conversion — see the `TIdenttovald` note in
    /// DESIGN.md); pointer-like modes (`VoidPointer` and any `Pointer`
    /// shape) are mutually compatible regardless of pointee, matching how a
    /// C-like front end treats `void*` as assignable to and from any
    /// pointer; everything else must match exactly.
    pub(crate) fn modes_assignable(&self, target: Mode, value: Mode) -> bool {
        if is_numeric(target) && is_numeric(value) {
            return true;
        }
        if target == value {
            return true;
        }
        let is_pointerish = |mode: Mode| match mode {
            Mode::VoidPointer => true,
            Mode::Composite(index) => matches!(self.modes.shape(index), loomc_core::Shape::Pointer { .. }),
            _ => false,
        };
        is_pointerish(target) && is_pointerish(value)
    }

    pub(crate) fn expect_raw(&mut self, expected: RawKind, message: &str) -> Result<loomc_core::Span, Error> {
        if self.peek_kind() == TokenKind::Raw(expected) {
            Ok(self.bump().span)
        } else {
            let span = self.current().span;
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ExpectedToken, span)
                .message(message)
                .emit();
            Ok(span)
        }
    }

    pub(crate) fn expect_ident_repr(&mut self, message: &str) -> Result<(loomc_core::Repr, loomc_core::Span), Error> {
        if let TokenKind::Ident(repr) = self.peek_kind() {
            let span = self.bump().span;
            Ok((repr, span))
        } else {
            let span = self.current().span;
            self.diagnostics
                .report(self.source_id, DiagnosticKind::ExpectedToken, span)
                .message(message)
                .emit();
            Ok((self.reprs.intern("<error>"), span))
        }
    }
}

fn is_lvalue(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident { .. } | Expr::Select { .. } | Expr::Slice { .. } | Expr::AddrToVal { .. })
}

fn is_numeric(mode: Mode) -> bool {
    matches!(mode, Mode::Int | Mode::Float | Mode::Char)
}

fn is_arithmetic_op(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
}

fn is_comparison_or_logical_op(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::And
            | BinaryOp::Or
    )
}

/// Forces an operand out of addressable position into rvalue position.
///
/// `resolve_ident` annotates every name lookup as `Ident(displacement)` —
/// "this value lives at a known displacement, not yet loaded" — because at
/// that point the analyzer cannot tell whether the name is about to be used
/// as an assignment target (which wants the bare displacement, `TIdent`) or
/// read for its value (which wants a load, `TIdenttoval`). Every call site
/// that consumes an operand purely for its value — a binary/ternary operand,
/// a call argument, the source of an assignment, a subscript index — calls
/// this once the operand is fully parsed to pick the load tag. Assignment
/// targets and the operand of `&`/`++`/`--` are deliberately left unconverted.
pub(crate) fn to_rvalue(expr: Expr) -> Expr {
    match expr {
        Expr::Ident { repr, displacement, annotation: Annotation::Ident(_), span } => {
            Expr::Ident { repr, displacement, annotation: Annotation::Val, span }
        }
        other => other,
    }
}
