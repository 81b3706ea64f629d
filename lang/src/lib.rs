use std::fmt::{self, Formatter};

use crate::{
    codegen::{js::JsCodeGenerator, CodeGenerator, CodegenError},
    syntax::{
        desugar::{Desugar, DesugarError},
        parse::{ParseError, SfParser},
        tree::Program,
    },
};

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod codegen;
pub mod syntax;

#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Desugar(DesugarError),
    Codegen(CodegenError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Desugar(e) => write!(f, "{}", e),
            CompileError::Codegen(e) => write!(f, "{}", e),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<DesugarError> for CompileError {
    fn from(e: DesugarError) -> Self {
        CompileError::Desugar(e)
    }
}

impl From<CodegenError> for CompileError {
    fn from(e: CodegenError) -> Self {
        CompileError::Codegen(e)
    }
}

pub struct Compiler;

impl Compiler {
    /// Parse the surface language and desugar it to the core tree.
    pub fn ast(input: &str) -> Result<Program, CompileError> {
        let surface = SfParser::ast(input)?;
        Ok(Desugar::run(surface)?)
    }

    /// Full pipeline: surface text in, JavaScript text out.
    pub fn compile(input: &str) -> Result<String, CompileError> {
        let core = Compiler::ast(input)?;
        Ok(JsCodeGenerator::new().codegen(core)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{CompileError, Compiler};

    #[test]
    fn compiles_a_program_end_to_end() {
        let js = Compiler::compile(
            "(define square (lambda (n) (* n n))) \
             (let* ((a 2) (b (square a))) (+ a b))",
        )
        .unwrap();
        assert_eq!(
            js,
            "const square = ((n) => (n * n));\n((a) => ((b) => (a + b))(square(a)))(2)"
        );
    }

    #[test]
    fn parse_errors_are_captured() {
        match Compiler::compile("(define") {
            Err(CompileError::Parse(_)) => (),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn codegen_errors_are_captured() {
        match Compiler::compile("(< 1 2 3)") {
            Err(CompileError::Codegen(_)) => (),
            other => panic!("expected a translate error, got {:?}", other),
        }
    }
}
