use std::fmt::{self, Formatter};

use crate::syntax::tree::{
    Binding, Decl, Expr,
    Expr::{ApplyExpr, AtomExpr, IfExpr, LambdaExpr, LetExpr, LetStarExpr, QuoteExpr},
    Program, ProgramItem,
};

pub struct Desugar;

#[derive(Debug, PartialEq)]
pub enum DesugarError {
    EmptyLetStar,
}

impl fmt::Display for DesugarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DesugarError::EmptyLetStar => {
                write!(f, "DesugarError: let* form requires at least one binding")
            }
        }
    }
}

impl Desugar {
    /// Rewrite every sequential-let in the surface tree into a chain of
    /// single-binding lets. All other nodes are rebuilt structurally.
    pub fn run(input: Program) -> Result<Program, DesugarError> {
        input.desugar()
    }
}

trait Desugarable: Sized {
    fn desugar(self) -> Result<Self, DesugarError>;
}

impl<T: Desugarable> Desugarable for Vec<T> {
    fn desugar(self) -> Result<Self, DesugarError> {
        self.into_iter().map(|d| d.desugar()).collect()
    }
}

impl<T: Desugarable> Desugarable for Box<T> {
    fn desugar(self) -> Result<Self, DesugarError> {
        Ok(Box::new((*self).desugar()?))
    }
}

impl Desugarable for ProgramItem {
    fn desugar(self) -> Result<Self, DesugarError> {
        match self {
            ProgramItem::ExprItem(expr) => Ok(ProgramItem::ExprItem(expr.desugar()?)),
            ProgramItem::DeclItem(decl) => Ok(ProgramItem::DeclItem(decl.desugar()?)),
        }
    }
}

impl Desugarable for Decl {
    fn desugar(self) -> Result<Self, DesugarError> {
        match self {
            Decl::DefineDecl(name, val) => Ok(Decl::DefineDecl(name, val.desugar()?)),
        }
    }
}

impl Desugarable for Binding {
    fn desugar(self) -> Result<Self, DesugarError> {
        Ok(Binding(self.0, self.1.desugar()?))
    }
}

impl Desugarable for Expr {
    fn desugar(self) -> Result<Self, DesugarError> {
        match self {
            AtomExpr(atom) => Ok(AtomExpr(atom)),
            QuoteExpr(datum) => Ok(QuoteExpr(datum)),
            ApplyExpr(rator, rands) => Ok(ApplyExpr(rator.desugar()?, rands.desugar()?)),
            IfExpr(test, then, alt) => {
                Ok(IfExpr(test.desugar()?, then.desugar()?, alt.desugar()?))
            }
            LambdaExpr(params, body) => Ok(LambdaExpr(params, body.desugar()?)),
            LetExpr(bindings, body) => Ok(LetExpr(bindings.desugar()?, body.desugar()?)),
            LetStarExpr(bindings, body) => {
                expand_let_star(bindings.desugar()?, body.desugar()?)
            }
        }
    }
}

/// `(let* ((x1 v1) .. (xn vn)) body)` becomes a right-nested chain of
/// single-binding lets, so each value expression only sees the bindings
/// strictly before it. The binding list is consumed and folded over a fresh
/// reversed copy; nothing is reversed in place.
fn expand_let_star(mut bindings: Vec<Binding>, body: Vec<Expr>) -> Result<Expr, DesugarError> {
    let innermost = match bindings.pop() {
        Some(last) => LetExpr(vec![last], body),
        None => return Err(DesugarError::EmptyLetStar),
    };
    Ok(bindings
        .into_iter()
        .rev()
        .fold(innermost, |inner, binding| {
            LetExpr(vec![binding], vec![inner])
        }))
}
