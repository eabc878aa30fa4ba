//! Flattening a [`crate::node::Node`] tree into the flat, postfix, tagged
//! integer stream the code generator boundary consumes.
//!
//! Every entry is a [`crate::tag::Tag`] discriminant followed by a
//! fixed-or-counted run of payload words. Because the arity of each tag is
//! known up front (either fixed, or preceded by an explicit count word for
//! variable-length children such as call arguments), the stream is
//! self-describing: [`read_tags`] can recover the tag sequence from the flat
//! words alone, with no access to the source tree, which is what the
//! round-trip test in this crate's test suite checks.

use loomc_core::Mode;

use crate::functions::FunctionsTable;
use crate::node::{
    AssignOp, BinaryOp, Decl, Expr, FuncDef, Initializer, Program, Stmt, UnaryOp, VarDecl,
};
use crate::tag::Tag;

fn mode_word(mode: Mode) -> i32 {
    match mode {
        Mode::Int => -1,
        Mode::Float => -2,
        Mode::Char => -3,
        Mode::Void => -4,
        Mode::VoidPointer => -5,
        Mode::Composite(index) => index.as_u32() as i32,
    }
}

/// Flattens a program into the tagged word stream plus the function
/// entry-offset table recorded during the walk.
pub fn serialize(program: &Program) -> (Vec<i32>, FunctionsTable) {
    let mut words = Vec::new();
    let mut functions = FunctionsTable::new();
    for decl in &program.decls {
        serialize_decl(decl, &mut words, &mut functions);
    }
    (words, functions)
}

fn push_tag(words: &mut Vec<i32>, tag: Tag) {
    words.push(tag as i32);
}

fn serialize_decl(decl: &Decl, words: &mut Vec<i32>, functions: &mut FunctionsTable) {
    match decl {
        Decl::Func(func) => serialize_func(func, words, functions),
        Decl::Var(var) => serialize_var_decl(var, words),
        Decl::StructOnly { mode, .. } => {
            push_tag(words, Tag::TStructbeg);
            words.push(mode.as_u32() as i32);
            push_tag(words, Tag::TStructend);
        }
    }
}

fn serialize_func(func: &FuncDef, words: &mut Vec<i32>, functions: &mut FunctionsTable) {
    let offset = words.len() as u32;
    functions.record(func.name, offset);

    push_tag(words, Tag::TFuncdef);
    words.push(func.name.as_u32() as i32);
    words.push(func.mode.as_u32() as i32);
    words.push(func.params.len() as i32);
    for param in &func.params {
        words.push(param.as_u32() as i32);
    }
    serialize_stmt(&func.body, words);
}

fn serialize_var_decl(var: &VarDecl, words: &mut Vec<i32>) {
    if var.dims > 0 {
        push_tag(words, Tag::TDeclarr);
        words.push(var.dim_sizes.len() as i32);
        for size in &var.dim_sizes {
            serialize_expr(size, words);
        }
    }
    push_tag(words, Tag::TDeclid);
    words.push(var.name.as_u32() as i32);
    words.push(mode_word(var.mode));
    words.push(var.dims as i32);
    words.push(var.displacement);
    match &var.init {
        None => words.push(0),
        Some(init) => {
            words.push(1);
            serialize_initializer(init, words);
        }
    }
}

fn serialize_initializer(init: &Initializer, words: &mut Vec<i32>) {
    match init {
        Initializer::Expr(expr) => serialize_expr(expr, words),
        Initializer::List { is_struct, items } => {
            push_tag(words, if *is_struct { Tag::TStructinit } else { Tag::TBeginit });
            words.push(items.len() as i32);
            for item in items {
                serialize_initializer(item, words);
            }
        }
    }
}

fn serialize_stmt(stmt: &Stmt, words: &mut Vec<i32>) {
    match stmt {
        Stmt::Block(stmts) => {
            push_tag(words, Tag::TBegin);
            for s in stmts {
                serialize_stmt(s, words);
            }
            push_tag(words, Tag::TEnd);
        }
        Stmt::CreateDirect(stmts) => {
            push_tag(words, Tag::CREATEDIRECTC);
            for s in stmts {
                serialize_stmt(s, words);
            }
            push_tag(words, Tag::EXITC);
        }
        Stmt::Decl(var) => serialize_var_decl(var, words),
        Stmt::Expr(expr) => serialize_expr(expr, words),
        Stmt::If { cond, then_branch, else_branch } => {
            push_tag(words, Tag::TIf);
            let else_slot = words.len();
            words.push(0);
            serialize_expr(cond, words);
            serialize_stmt(then_branch, words);
            if let Some(else_branch) = else_branch {
                words[else_slot] = words.len() as i32;
                serialize_stmt(else_branch, words);
            }
        }
        Stmt::For { init, cond, step, body } => {
            push_tag(words, Tag::TFor);
            let var_slot = words.len();
            words.push(0);
            let cond_slot = words.len();
            words.push(0);
            let inc_slot = words.len();
            words.push(0);
            let body_slot = words.len();
            words.push(0);
            if let Some(init) = init {
                words[var_slot] = words.len() as i32;
                serialize_stmt(init, words);
            }
            if let Some(cond) = cond {
                words[cond_slot] = words.len() as i32;
                serialize_expr(cond, words);
            }
            if let Some(step) = step {
                words[inc_slot] = words.len() as i32;
                serialize_expr(step, words);
            }
            words[body_slot] = words.len() as i32;
            serialize_stmt(body, words);
        }
        Stmt::While { cond, body } => {
            push_tag(words, Tag::TWhile);
            serialize_expr(cond, words);
            serialize_stmt(body, words);
        }
        Stmt::DoWhile { body, cond } => {
            push_tag(words, Tag::TDo);
            serialize_stmt(body, words);
            serialize_expr(cond, words);
        }
        Stmt::Switch { scrutinee, body } => {
            push_tag(words, Tag::TSwitch);
            serialize_expr(scrutinee, words);
            serialize_stmt(body, words);
        }
        Stmt::Case { value, body } => {
            push_tag(words, Tag::TCase);
            serialize_expr(value, words);
            serialize_stmt(body, words);
        }
        Stmt::Default { body } => {
            push_tag(words, Tag::TDefault);
            serialize_stmt(body, words);
        }
        Stmt::Return { value, mode } => match value {
            Some(expr) => {
                push_tag(words, Tag::TReturnval);
                words.push(mode_word(*mode));
                serialize_expr(expr, words);
            }
            None => push_tag(words, Tag::TReturnvoid),
        },
        Stmt::Break => push_tag(words, Tag::TBreak),
        Stmt::Continue => push_tag(words, Tag::TContinue),
        Stmt::Goto(label) => {
            push_tag(words, Tag::TGoto);
            words.push(label.as_u32() as i32);
        }
        Stmt::Label { name, body } => {
            push_tag(words, Tag::TLabel);
            words.push(name.as_u32() as i32);
            serialize_stmt(body, words);
        }
        Stmt::PrintId(name) => {
            push_tag(words, Tag::TPrintid);
            words.push(name.as_u32() as i32);
        }
        Stmt::Printf { format, args } => {
            push_tag(words, Tag::TPrintf);
            words.push(args.len() as i32);
            serialize_expr(format, words);
            for arg in args {
                serialize_expr(arg, words);
            }
        }
        Stmt::GetId(name) => {
            push_tag(words, Tag::TGetid);
            words.push(name.as_u32() as i32);
        }
        Stmt::Print(expr) => {
            push_tag(words, Tag::TPrint);
            serialize_expr(expr, words);
        }
        Stmt::Nop => push_tag(words, Tag::NOP),
    }
}

/// Serializes one complete top-level expression, including the single
/// shared `TExprend` that closes it. Nested sub-expressions (operands of
/// a binary operator, call arguments, the base of a select...) are never
/// individually terminated — the reference compiler's tree walker
/// ("Может быть общий TExprend") shares one terminator across the whole
/// expression, not one per postfix node, so every recursive reference to
/// a child expression below goes through [`serialize_expr_node`] instead.
fn serialize_expr(expr: &Expr, words: &mut Vec<i32>) {
    serialize_expr_node(expr, words);
    push_tag(words, Tag::TExprend);
}

fn serialize_expr_node(expr: &Expr, words: &mut Vec<i32>) {
    match expr {
        Expr::Ident { repr, displacement, annotation, .. } => {
            push_tag(words, annotation_tag(*annotation));
            words.push(repr.as_u32() as i32);
            words.push(*displacement);
        }
        Expr::IntConst { value, .. } => {
            push_tag(words, Tag::TConst);
            words.push(*value as i32);
        }
        Expr::FloatConst { value, .. } => {
            push_tag(words, Tag::TConstd);
            let bits = value.to_bits();
            words.push((bits & 0xffff_ffff) as i32);
            words.push((bits >> 32) as i32);
        }
        Expr::StringConst { value, .. } => {
            push_tag(words, Tag::TString);
            words.push(value.as_u32() as i32);
        }
        Expr::Cond { cond, then_expr, else_expr } => {
            push_tag(words, Tag::TCondexpr);
            serialize_expr_node(cond, words);
            serialize_expr_node(then_expr, words);
            serialize_expr_node(else_expr, words);
        }
        Expr::Select { base, field_displacement, .. } => {
            serialize_expr_node(base, words);
            push_tag(words, Tag::TSelect);
            words.push(*field_displacement as i32);
        }
        Expr::AddrToVal { inner, .. } => {
            serialize_expr_node(inner, words);
            push_tag(words, Tag::TAddrtoval);
        }
        Expr::Slice { base, index, .. } => {
            serialize_expr_node(base, words);
            push_tag(words, Tag::TSliceident);
            serialize_expr_node(index, words);
            push_tag(words, Tag::TSlice);
        }
        Expr::Call { callee, args, .. } => {
            push_tag(words, Tag::TCall1);
            words.push(callee.as_u32() as i32);
            words.push(args.len() as i32);
            for arg in args {
                serialize_expr_node(arg, words);
            }
            push_tag(words, Tag::TCall2);
        }
        Expr::Unary { op, operand, .. } => {
            serialize_expr_node(operand, words);
            words.push(unary_op_word(*op));
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            serialize_expr_node(lhs, words);
            serialize_expr_node(rhs, words);
            words.push(binary_op_word(*op));
        }
        Expr::Assign { op, target, value, .. } => {
            serialize_expr_node(target, words);
            serialize_expr_node(value, words);
            words.push(assign_op_word(*op));
        }
    }
}

fn annotation_tag(annotation: crate::node::Annotation) -> Tag {
    use crate::node::Annotation;
    match annotation {
        Annotation::Val => Tag::TIdenttoval,
        Annotation::Addr => Tag::TIdenttoaddr,
        Annotation::Ident(_) => Tag::TIdent,
    }
}

fn unary_op_word(op: UnaryOp) -> i32 {
    op as u8 as i32 + 1000
}

fn binary_op_word(op: BinaryOp) -> i32 {
    op as u8 as i32 + 2000
}

fn assign_op_word(op: AssignOp) -> i32 {
    op as u8 as i32 + 3000
}

/// Unary/binary/assign operator words live in a range disjoint from
/// [`Tag`]'s discriminants, mirroring the reference compiler's
/// `is_lexeme` range check that tells an operator lexeme apart from a
/// structural tree tag. [`crate::validate`] uses this to recognize an
/// operator word it should skip over without trying to decode it as a tag.
pub(crate) fn is_operator_word(word: i32) -> bool {
    (1000..4000).contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Program;
    use loomc_core::{ModeIndex, Repr, Span};

    #[test]
    fn empty_program_serializes_to_no_words() {
        let program = Program::default();
        let (words, functions) = serialize(&program);
        assert!(words.is_empty());
        assert!(functions.is_empty());
    }

    #[test]
    fn array_decl_emits_size_expr_then_inner_declid() {
        use crate::node::Initializer;
        use loomc_core::Mode;

        let var = VarDecl {
            name: Repr::from_raw(4),
            mode: Mode::Int,
            dims: 1,
            dim_sizes: vec![Expr::IntConst { value: 2, span: Span::new(0, 1) }],
            init: Some(Initializer::List {
                is_struct: false,
                items: vec![
                    Initializer::Expr(Box::new(Expr::IntConst { value: 1, span: Span::new(0, 1) })),
                    Initializer::Expr(Box::new(Expr::IntConst { value: 2, span: Span::new(0, 1) })),
                ],
            }),
            displacement: -1,
            span: Span::new(0, 1),
        };
        let mut words = Vec::new();
        serialize_var_decl(&var, &mut words);
        let tags = crate::validate::read_tags(&words).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::TDeclarr,
                Tag::TConst,
                Tag::TExprend,
                Tag::TDeclid,
                Tag::TBeginit,
                Tag::TConst,
                Tag::TExprend,
                Tag::TConst,
                Tag::TExprend,
            ]
        );
    }

    #[test]
    fn if_else_records_the_else_branchs_tree_offset() {
        let stmt = Stmt::If {
            cond: Expr::IntConst { value: 1, span: Span::new(0, 1) },
            then_branch: Box::new(Stmt::Break),
            else_branch: Some(Box::new(Stmt::Continue)),
        };
        let mut words = Vec::new();
        serialize_stmt(&stmt, &mut words);
        // words[0] is the TIf tag; words[1] is the else-offset slot, which
        // must equal the word index where TContinue actually appears.
        let else_offset = words[1] as usize;
        assert_eq!(words[else_offset], Tag::TContinue as i32);
    }

    #[test]
    fn for_loop_records_each_present_childs_tree_offset() {
        let stmt = Stmt::For {
            init: None,
            cond: Some(Expr::IntConst { value: 1, span: Span::new(0, 1) }),
            step: None,
            body: Box::new(Stmt::Break),
        };
        let mut words = Vec::new();
        serialize_stmt(&stmt, &mut words);
        // var-offset is absent (init is None).
        assert_eq!(words[1], 0);
        let cond_offset = words[2] as usize;
        assert_eq!(words[cond_offset], Tag::TConst as i32);
        // inc-offset is absent (step is None).
        assert_eq!(words[3], 0);
        let body_offset = words[4] as usize;
        assert_eq!(words[body_offset], Tag::TBreak as i32);
    }

    #[test]
    fn function_records_its_offset() {
        let program = Program {
            decls: vec![Decl::Func(FuncDef {
                name: Repr::from_raw(5),
                mode: ModeIndex::from_raw(9),
                params: vec![],
                body: Box::new(Stmt::Block(vec![Stmt::Nop])),
                is_main: true,
                span: Span::new(0, 1),
            })],
        };
        let (words, functions) = serialize(&program);
        assert_eq!(functions.lookup(Repr::from_raw(5)), Some(0));
        assert_eq!(words[0], Tag::TFuncdef as i32);
    }
}
