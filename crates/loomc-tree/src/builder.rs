//! Incremental assembly of a [`Program`], mirroring the teacher's
//! builder/label-allocator split (`CompilerBuilder`/`Compiler::fresh_label`)
//! but generalized to this front end's displacement/main-flag bookkeeping
//! instead of jump labels.

use loomc_core::Repr;

use crate::node::{Decl, FuncDef, Program, VarDecl};

/// Accumulates top-level declarations and the handoff bookkeeping the
/// driver passes to the code generator boundary: the global displacement
/// counter and whether a `main` function was seen.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    decls: Vec<Decl>,
    next_global_displacement: i32,
    had_main: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next global displacement (globals count down from -1).
    pub fn fresh_global_displacement(&mut self) -> i32 {
        self.next_global_displacement -= 1;
        self.next_global_displacement
    }

    pub fn push_func(&mut self, func: FuncDef) {
        if func.is_main {
            self.had_main = true;
        }
        self.decls.push(Decl::Func(func));
    }

    pub fn push_var(&mut self, var: VarDecl) {
        self.decls.push(Decl::Var(var));
    }

    pub fn push_struct_only(&mut self, mode: loomc_core::ModeIndex, span: loomc_core::Span) {
        self.decls.push(Decl::StructOnly { mode, span });
    }

    pub fn had_main(&self) -> bool {
        self.had_main
    }

    /// The absolute value of the last global displacement handed out; the
    /// frame-size accounting the code generator needs for the global
    /// segment.
    pub fn global_displacement(&self) -> i32 {
        -self.next_global_displacement
    }

    pub fn finish(self) -> Program {
        Program { decls: self.decls }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use loomc_core::{Mode, Span};
    use crate::node::VarDecl;

    #[test]
    fn global_displacements_count_downward() {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.fresh_global_displacement(), -1);
        assert_eq!(builder.fresh_global_displacement(), -2);
        assert_eq!(builder.global_displacement(), 2);
    }

    #[test]
    fn had_main_tracks_the_entry_point() {
        let mut builder = TreeBuilder::new();
        assert!(!builder.had_main());
        builder.push_var(VarDecl {
            name: Repr::from_raw(0),
            mode: Mode::Int,
            dims: 0,
            dim_sizes: Vec::new(),
            init: None,
            displacement: 0,
            span: Span::new(0, 0),
        });
        assert!(!builder.had_main());
    }
}
