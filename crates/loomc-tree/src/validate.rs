//! Structural validation of the flat tree encoding.
//!
//! Two independent checks:
//! - [`read_tags`] decodes the flat word stream back into a bare tag
//!   sequence, without consulting the source tree, so callers can compare it
//!   against the tag sequence walked directly off the [`crate::node::Node`]
//!   tree (`collect_tags` in this crate's test suite) as a "serialize, then
//!   reparse structurally" round trip.
//! - [`check_balance`] walks a tag sequence and confirms every `TBegin`,
//!   `TStructbeg`, and `CREATEDIRECTC` is closed by its matching tag, in
//!   order, with nothing left open at the end.

use crate::tag::Tag;

struct Cursor<'a> {
    words: &'a [i32],
    pos: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DecodeError {
    pub position: usize,
}

impl<'a> Cursor<'a> {
    fn new(words: &'a [i32]) -> Self {
        Self { words, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos >= self.words.len()
    }

    fn take(&mut self) -> Result<i32, DecodeError> {
        let word = self
            .words
            .get(self.pos)
            .copied()
            .ok_or(DecodeError { position: self.pos })?;
        self.pos += 1;
        Ok(word)
    }

    fn take_tag(&mut self) -> Result<Tag, DecodeError> {
        let pos = self.pos;
        let word = self.take()?;
        Tag::try_from(word).map_err(|_| DecodeError { position: pos })
    }

    fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        for _ in 0..n {
            self.take()?;
        }
        Ok(())
    }
}

/// Decode a flat word stream into its tag sequence, re-walking the same
/// grammar the serializer used to produce it.
pub fn read_tags(words: &[i32]) -> Result<Vec<Tag>, DecodeError> {
    let mut out = Vec::new();
    let mut cursor = Cursor::new(words);
    while !cursor.done() {
        decode_decl(&mut cursor, &mut out)?;
    }
    Ok(out)
}

fn decode_decl(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    let tag = cursor.take_tag()?;
    out.push(tag);
    match tag {
        Tag::TFuncdef => {
            cursor.skip(2)?; // name, mode
            let nparams = cursor.take()? as usize;
            cursor.skip(nparams)?;
            decode_stmt(cursor, out)
        }
        Tag::TDeclid => decode_var_decl_tail(cursor, out),
        Tag::TDeclarr => decode_array_decl(cursor, out),
        Tag::TStructbeg => {
            cursor.skip(1)?; // mode
            let close = cursor.take_tag()?;
            out.push(close);
            Ok(())
        }
        _ => Err(DecodeError { position: cursor.pos }),
    }
}

/// `TDeclarr | n | n size-expressions, then 1 inner decl`: a count word,
/// that many size expressions, then a `TDeclid` for the array itself.
fn decode_array_decl(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    let n = cursor.take()? as usize;
    for _ in 0..n {
        decode_expr(cursor, out)?;
    }
    let inner = cursor.take_tag()?;
    out.push(inner);
    match inner {
        Tag::TDeclid => decode_var_decl_tail(cursor, out),
        _ => Err(DecodeError { position: cursor.pos }),
    }
}

fn decode_var_decl_tail(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    cursor.skip(4)?; // name, mode, dims, displacement
    let has_init = cursor.take()?;
    if has_init != 0 {
        decode_initializer(cursor, out)?;
    }
    Ok(())
}

fn decode_initializer(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    // An initializer is either an expression (which self-terminates with
    // TExprend) or a TBeginit/TStructinit list.
    let pos = cursor.pos;
    let tag = cursor.take_tag()?;
    match tag {
        Tag::TBeginit | Tag::TStructinit => {
            out.push(tag);
            let count = cursor.take()? as usize;
            for _ in 0..count {
                decode_initializer(cursor, out)?;
            }
            Ok(())
        }
        _ => {
            cursor.pos = pos;
            decode_expr(cursor, out)
        }
    }
}

fn decode_stmt(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    let pos = cursor.pos;
    let tag = cursor.take_tag()?;
    out.push(tag);
    match tag {
        Tag::TBegin => {
            loop {
                if cursor.words.get(cursor.pos).copied() == Some(Tag::TEnd as i32) {
                    cursor.pos += 1;
                    out.push(Tag::TEnd);
                    break;
                }
                decode_stmt(cursor, out)?;
            }
            Ok(())
        }
        Tag::CREATEDIRECTC => {
            loop {
                if cursor.words.get(cursor.pos).copied() == Some(Tag::EXITC as i32) {
                    cursor.pos += 1;
                    out.push(Tag::EXITC);
                    break;
                }
                decode_stmt(cursor, out)?;
            }
            Ok(())
        }
        Tag::TDeclid => decode_var_decl_tail(cursor, out),
        Tag::TDeclarr => decode_array_decl(cursor, out),
        Tag::TIf => {
            // A slot holding either zero or the else-stmt's tree offset,
            // not a presence boolean; the decoder only needs zero-or-not.
            let else_offset = cursor.take()?;
            decode_expr(cursor, out)?;
            decode_stmt(cursor, out)?;
            if else_offset != 0 {
                decode_stmt(cursor, out)?;
            }
            Ok(())
        }
        Tag::TFor => {
            let var_offset = cursor.take()?;
            let cond_offset = cursor.take()?;
            let inc_offset = cursor.take()?;
            cursor.skip(1)?; // body-offset
            if var_offset != 0 {
                decode_stmt(cursor, out)?;
            }
            if cond_offset != 0 {
                decode_expr(cursor, out)?;
            }
            if inc_offset != 0 {
                decode_expr(cursor, out)?;
            }
            decode_stmt(cursor, out)
        }
        Tag::TWhile => {
            decode_expr(cursor, out)?;
            decode_stmt(cursor, out)
        }
        Tag::TDo => {
            decode_stmt(cursor, out)?;
            decode_expr(cursor, out)
        }
        Tag::TSwitch => {
            decode_expr(cursor, out)?;
            decode_stmt(cursor, out)
        }
        Tag::TCase => {
            decode_expr(cursor, out)?;
            decode_stmt(cursor, out)
        }
        Tag::TDefault => decode_stmt(cursor, out),
        Tag::TReturnval => {
            cursor.skip(1)?;
            decode_expr(cursor, out)
        }
        Tag::TReturnvoid | Tag::TBreak | Tag::TContinue | Tag::NOP => Ok(()),
        Tag::TGoto => cursor.skip(1),
        Tag::TLabel => {
            cursor.skip(1)?;
            decode_stmt(cursor, out)
        }
        Tag::TPrintid | Tag::TGetid => cursor.skip(1),
        Tag::TPrintf => {
            let nargs = cursor.take()? as usize;
            decode_expr(cursor, out)?;
            for _ in 0..nargs {
                decode_expr(cursor, out)?;
            }
            Ok(())
        }
        Tag::TPrint => decode_expr(cursor, out),
        // An expression statement: `tag` is already the expression's own
        // leading node, since there is no dedicated wrapper tag for it.
        _ => {
            decode_expr_node_payload(cursor, tag, pos)?;
            if tag == Tag::TExprend {
                Ok(())
            } else {
                decode_expr(cursor, out)
            }
        }
    }
}

/// Decode one complete top-level expression, up to and including the
/// single `TExprend` that closes it.
///
/// Unlike declarations and statements, an expression's sub-expressions
/// precede it in the word stream rather than nesting after it (it is a
/// postfix encoding), and since [`crate::serialize`] shares one
/// `TExprend` across the whole expression rather than emitting one per
/// node, there is nothing for a nested child to recurse into: decoding
/// is a flat left-to-right scan that consumes each tag's own fixed
/// payload and skips over operator words, stopping at the shared
/// terminator.
fn decode_expr(cursor: &mut Cursor, out: &mut Vec<Tag>) -> Result<(), DecodeError> {
    loop {
        let pos = cursor.pos;
        let word = cursor.take()?;
        if crate::serialize::is_operator_word(word) {
            continue;
        }
        let tag = Tag::try_from(word).map_err(|_| DecodeError { position: pos })?;
        out.push(tag);
        decode_expr_node_payload(cursor, tag, pos)?;
        if tag == Tag::TExprend {
            return Ok(());
        }
    }
}

/// Consumes the fixed (or counted) payload words that follow `tag` inside
/// an expression, without touching `out` — used both by [`decode_expr`]'s
/// own scan and by [`decode_stmt`]'s expression-statement fallback, which
/// has already read and pushed the leading tag before dispatching here.
fn decode_expr_node_payload(cursor: &mut Cursor, tag: Tag, pos: usize) -> Result<(), DecodeError> {
    match tag {
        Tag::TIdenttoval | Tag::TIdenttoaddr | Tag::TIdent => cursor.skip(2),
        Tag::TConst => cursor.skip(1),
        Tag::TConstd => cursor.skip(2),
        Tag::TString => cursor.skip(1),
        Tag::TSelect => cursor.skip(1),
        Tag::TCall1 => {
            cursor.skip(1)?; // callee
            cursor.skip(1) // arg count; arg boundaries are implicit in the flat scan
        }
        Tag::TAddrtoval | Tag::TSliceident | Tag::TSlice | Tag::TCondexpr | Tag::TCall2 | Tag::TExprend => {
            Ok(())
        }
        _ => Err(DecodeError { position: pos }),
    }
}

/// Confirm every open marker (`TBegin`, `TStructbeg`, `CREATEDIRECTC`) in a
/// tag sequence is closed, in order, by its matching tag, with nothing left
/// open at the end.
pub fn check_balance(tags: &[Tag]) -> bool {
    let mut stack = Vec::new();
    for &tag in tags {
        if tag.is_open() {
            stack.push(tag);
        } else if tag.is_close() {
            match stack.pop() {
                Some(open) if open.matching_close() == Some(tag) => {}
                _ => return false,
            }
        }
    }
    stack.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Decl, FuncDef, Program, Stmt};
    use crate::serialize::serialize;
    use loomc_core::{Mode, ModeIndex, Repr, Span};

    #[test]
    fn round_trips_a_simple_function() {
        let program = Program {
            decls: vec![Decl::Func(FuncDef {
                name: Repr::from_raw(1),
                mode: ModeIndex::from_raw(0),
                params: vec![],
                body: Box::new(Stmt::Block(vec![Stmt::Break, Stmt::Nop])),
                is_main: true,
                span: Span::new(0, 1),
            })],
        };
        let (words, _) = serialize(&program);
        let tags = read_tags(&words).unwrap();
        assert_eq!(
            tags,
            vec![Tag::TFuncdef, Tag::TBegin, Tag::TBreak, Tag::NOP, Tag::TEnd]
        );
        assert!(check_balance(&tags));
    }

    #[test]
    fn unbalanced_tags_are_rejected() {
        let tags = vec![Tag::TBegin, Tag::TStructbeg, Tag::TEnd];
        assert!(!check_balance(&tags));
    }

    #[test]
    fn round_trips_a_binary_expression_with_one_shared_terminator() {
        use crate::node::{Annotation, BinaryOp, Expr};

        let expr = Expr::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Expr::Ident {
                repr: Repr::from_raw(2),
                displacement: 0,
                annotation: Annotation::Val,
                span: Span::new(0, 1),
            }),
            rhs: Box::new(Expr::IntConst { value: 1, span: Span::new(2, 3) }),
            span: Span::new(0, 3),
        };
        let program = Program {
            decls: vec![Decl::Func(FuncDef {
                name: Repr::from_raw(1),
                mode: ModeIndex::from_raw(0),
                params: vec![],
                body: Box::new(Stmt::Block(vec![Stmt::Return { value: Some(expr), mode: Mode::Int }])),
                is_main: true,
                span: Span::new(0, 1),
            })],
        };
        let (words, _) = serialize(&program);
        let tags = read_tags(&words).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::TFuncdef,
                Tag::TBegin,
                Tag::TReturnval,
                Tag::TIdenttoval,
                Tag::TConst,
                Tag::TExprend,
                Tag::TEnd,
            ]
        );
        assert!(check_balance(&tags));
    }

    #[test]
    fn round_trips_a_call_with_a_select_argument() {
        use crate::node::{Annotation, Expr};

        let select = Expr::Select {
            base: Box::new(Expr::Ident {
                repr: Repr::from_raw(3),
                displacement: 4,
                annotation: Annotation::Val,
                span: Span::new(0, 1),
            }),
            field_displacement: 1,
            annotation: Annotation::Val,
            span: Span::new(0, 3),
        };
        let call = Expr::Call { callee: Repr::from_raw(9), args: vec![select], span: Span::new(0, 6) };
        let program = Program {
            decls: vec![Decl::Func(FuncDef {
                name: Repr::from_raw(1),
                mode: ModeIndex::from_raw(0),
                params: vec![],
                body: Box::new(Stmt::Block(vec![Stmt::Expr(call)])),
                is_main: true,
                span: Span::new(0, 1),
            })],
        };
        let (words, _) = serialize(&program);
        let tags = read_tags(&words).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::TFuncdef,
                Tag::TBegin,
                Tag::TCall1,
                Tag::TIdenttoval,
                Tag::TSelect,
                Tag::TCall2,
                Tag::TExprend,
                Tag::TEnd,
            ]
        );
        assert!(check_balance(&tags));
    }
}
