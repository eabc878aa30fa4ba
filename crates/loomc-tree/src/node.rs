//! The in-memory tree: an owned, tagged variant rather than a raw integer
//! stream. [`crate::serialize`] is the only place that turns a [`Node`] into
//! the flat tag/payload encoding described in [`crate::tag`] — keeping the
//! two concerns apart means the validator can be a property of the
//! serializer instead of a separate runtime pass over already-flattened data.

use loomc_core::{Mode, ModeIndex, Repr, Span};

/// A word offset: non-negative for locals (from the current frame base),
/// negative for globals (from the global segment base).
pub type Displacement = i32;

/// Where an expression's value lives once evaluated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Annotation {
    /// On top of the evaluation stack.
    Val,
    /// An address is on top of the evaluation stack.
    Addr,
    /// Addressable directly by a known frame/global displacement.
    Ident(Displacement),
}

/// A whole compiled program: the external declarations in source order.
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}

#[derive(Clone, Debug)]
pub enum Decl {
    Func(FuncDef),
    Var(VarDecl),
    /// A struct definition with no accompanying variable (`struct P {...};`).
    StructOnly { mode: ModeIndex, span: Span },
}

#[derive(Clone, Debug)]
pub struct FuncDef {
    pub name: Repr,
    pub mode: ModeIndex,
    pub params: Vec<Repr>,
    pub body: Box<Stmt>,
    /// `true` for the function literally named `main`.
    pub is_main: bool,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: Repr,
    pub mode: Mode,
    /// Array dimension count; 0 for non-arrays. Equal to `dim_sizes.len()`.
    pub dims: u32,
    /// One size expression per `[ ... ]` pair, outermost first. Empty for
    /// non-arrays.
    pub dim_sizes: Vec<Expr>,
    pub init: Option<Initializer>,
    pub displacement: Displacement,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Initializer {
    Expr(Box<Expr>),
    /// A brace-enclosed list: `{ e1, e2, ... }` (`TBeginit`) or a struct
    /// member-wise initializer (`TStructinit`).
    List { is_struct: bool, items: Vec<Initializer> },
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Block(Vec<Stmt>),
    /// A thread-spawning block: `t_create_direct { ... }`. Lowered as a
    /// transparent grouping marker pair around an ordinary block.
    CreateDirect(Vec<Stmt>),
    Decl(VarDecl),
    Expr(Expr),
    If { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>> },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    Switch { scrutinee: Expr, body: Box<Stmt> },
    Case { value: Expr, body: Box<Stmt> },
    Default { body: Box<Stmt> },
    /// `mode` is the enclosing function's return mode, carried here so the
    /// serializer can emit `TReturnval`'s type argument without re-resolving
    /// it from the function signature.
    Return { value: Option<Expr>, mode: Mode },
    Break,
    Continue,
    Goto(Repr),
    Label { name: Repr, body: Box<Stmt> },
    /// `print ident;` built-in: read one global by name.
    PrintId(Repr),
    /// `printf(fmt, args...)` built-in: format string plus positional args.
    Printf { format: Box<Expr>, args: Vec<Expr> },
    /// `get ident;` built-in: write one global by name.
    GetId(Repr),
    /// `print expr;` without formatting.
    Print(Expr),
    Nop,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Ident { repr: Repr, displacement: Displacement, annotation: Annotation, span: Span },
    IntConst { value: i64, span: Span },
    FloatConst { value: f64, span: Span },
    StringConst { value: Repr, span: Span },
    /// `a ? b : c`.
    Cond { cond: Box<Expr>, then_expr: Box<Expr>, else_expr: Box<Expr> },
    /// `a.field` / `a->field`; `field_displacement` is the field's word
    /// offset within the struct.
    Select { base: Box<Expr>, field_displacement: u32, annotation: Annotation, span: Span },
    /// `*p` or the implicit address-to-value conversion inserted when an
    /// addressed operand is read.
    AddrToVal { inner: Box<Expr>, span: Span },
    /// `a[i]`.
    Slice { base: Box<Expr>, index: Box<Expr>, span: Span },
    /// A call with zero-or-more non-empty arguments (`TCall1`) down to the
    /// call's closing marker (`TCall2`).
    Call { callee: Repr, args: Vec<Expr>, span: Span },
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Assign { op: AssignOp, target: Box<Expr>, value: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident { span, .. }
            | Expr::IntConst { span, .. }
            | Expr::FloatConst { span, .. }
            | Expr::StringConst { span, .. }
            | Expr::Select { span, .. }
            | Expr::AddrToVal { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Call { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. } => *span,
            Expr::Cond { cond, else_expr, .. } => cond.span().to(else_expr.span()),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    AddrOf,
    Deref,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}
