use std::fmt::{self, Formatter};

use crate::syntax::tree::{Atom, Decl, Expr, Lit, Program};

pub mod js;

#[derive(Debug, PartialEq)]
pub enum CodegenError {
    // operator name and received operand count
    ArityMismatch(String, usize),
    UnknownOperator(String),
    NotApplicable,
    EmptyBody,
    TooManyExpressions(usize),
    UnexpectedLetStar,
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::ArityMismatch(op, got) => {
                write!(f, "TranslateError: cannot apply '{}' on {} operands", op, got)
            }
            CodegenError::UnknownOperator(op) => {
                write!(f, "TranslateError: unrecognized primitive operator '{}'", op)
            }
            CodegenError::NotApplicable => {
                write!(f, "TranslateError: expression in operator position is not applicable")
            }
            CodegenError::EmptyBody => {
                write!(f, "TranslateError: function body must contain an expression")
            }
            CodegenError::TooManyExpressions(count) => {
                write!(f, "TranslateError: too many expressions in function body: {}", count)
            }
            CodegenError::UnexpectedLetStar => {
                write!(f, "TranslateError: let* must be desugared before translation")
            }
        }
    }
}

pub trait PartialCodeGenerator {
    type Output;

    fn partial_codegen_decl(&self, decl: Decl) -> Result<Self::Output, CodegenError>;

    fn partial_codegen_expr(&self, expr: Expr) -> Result<Self::Output, CodegenError>;

    fn partial_codegen_atom(&self, atom: Atom) -> Result<Self::Output, CodegenError>;

    fn partial_codegen_lit(&self, lit: Lit) -> Result<Self::Output, CodegenError>;
}

pub trait CodeGenerator {
    type Output;

    fn codegen(&self, input: Program) -> Result<Self::Output, CodegenError>;
}
