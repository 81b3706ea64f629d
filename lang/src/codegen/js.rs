use crate::{
    codegen::{CodeGenerator, CodegenError, PartialCodeGenerator},
    syntax::tree::{
        Atom,
        Atom::{AtomLit, AtomPrimOp, AtomVar},
        Binding, Datum,
        Datum::{DatumNil, DatumSymbol},
        Decl,
        Decl::DefineDecl,
        Expr,
        Expr::{ApplyExpr, AtomExpr, IfExpr, LambdaExpr, LetExpr, LetStarExpr, QuoteExpr},
        Ident, Lit,
        Lit::{LitBool, LitNumber, LitString},
        Program, ProgramItem,
    },
};

/// The variadic helper applied by `list`: folds its arguments into a chain
/// of two-slot arrays terminated by the interned empty-list symbol.
const LIST_BUILDER: &str = "((...params) => {\n    let val = Symbol.for(\"()\");\n    params.reverse().forEach((param) => {val = [param, val]});\n    return val;\n})";

pub struct JsCodeGenerator;

impl JsCodeGenerator {
    pub fn new() -> JsCodeGenerator {
        JsCodeGenerator {}
    }
}

impl PartialCodeGenerator for JsCodeGenerator {
    type Output = String;

    fn partial_codegen_decl(&self, decl: Decl) -> Result<String, CodegenError> {
        Ok(decl.lower_to_js()?.render())
    }

    fn partial_codegen_expr(&self, expr: Expr) -> Result<String, CodegenError> {
        Ok(expr.lower_to_js()?.render())
    }

    fn partial_codegen_atom(&self, atom: Atom) -> Result<String, CodegenError> {
        Ok(atom.lower_to_js()?.render())
    }

    fn partial_codegen_lit(&self, lit: Lit) -> Result<String, CodegenError> {
        Ok(lit.lower_to_js()?.render())
    }
}

impl CodeGenerator for JsCodeGenerator {
    type Output = String;

    fn codegen(&self, input: Program) -> Result<String, CodegenError> {
        let forms = input
            .into_iter()
            .map(|item| match item {
                ProgramItem::ExprItem(expr) => self.partial_codegen_expr(expr),
                ProgramItem::DeclItem(decl) => self.partial_codegen_decl(decl),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(forms.join(";\n"))
    }
}

/// Target-language expression tree. Lowering builds this; `render` is the
/// only place source text is produced.
#[derive(Debug, PartialEq)]
enum Js {
    Number(f64),
    Bool(bool),
    Str(String),
    Symbol(String),
    Id(Ident),
    Infix(String, Vec<Js>),
    Ternary(Box<Js>, Box<Js>, Box<Js>),
    Not(Box<Js>),
    TypeOf(Box<Js>, &'static str),
    IsArray(Box<Js>),
    Index(Box<Js>, u8),
    Pair(Box<Js>, Box<Js>),
    Arrow(Vec<Ident>, Box<Js>),
    Call(Box<Js>, Vec<Js>),
    FoldClosure(String, &'static str),
    ListBuilder,
    Const(Ident, Box<Js>),
}

impl Js {
    fn render(self) -> String {
        match self {
            Js::Number(v) => v.to_string(),
            Js::Bool(v) => v.to_string(),
            Js::Str(s) => format!("\"{}\"", escape_string(s)),
            Js::Symbol(name) => format!("Symbol.for(\"{}\")", name),
            Js::Id(name) => sanitize_id(name.as_str()),
            Js::Infix(op, operands) => format!(
                "({})",
                operands
                    .into_iter()
                    .map(Js::render)
                    .collect::<Vec<_>>()
                    .join(&format!(" {} ", op))
            ),
            Js::Ternary(test, then, alt) => format!(
                "({} ? {} : {})",
                test.render(),
                then.render(),
                alt.render()
            ),
            Js::Not(operand) => format!("(!{})", operand.render()),
            Js::TypeOf(operand, tag) => {
                format!("(typeof({}) === \"{}\")", operand.render(), tag)
            }
            Js::IsArray(operand) => format!("Array.isArray({})", operand.render()),
            Js::Index(pair, slot) => format!("{}[{}]", pair.render(), slot),
            Js::Pair(head, tail) => format!("[{}, {}]", head.render(), tail.render()),
            Js::Arrow(params, body) => format!(
                "(({}) => {})",
                params
                    .iter()
                    .map(|p| sanitize_id(p))
                    .collect::<Vec<_>>()
                    .join(","),
                body.render()
            ),
            Js::Call(callee, args) => format!(
                "{}({})",
                callee.render(),
                args.into_iter()
                    .map(Js::render)
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            Js::FoldClosure(op, identity) => format!(
                "((...args) => args.reduce(((x,y)=>x{}y), {}))",
                op, identity
            ),
            Js::ListBuilder => LIST_BUILDER.to_owned(),
            Js::Const(name, value) => {
                format!("const {} = {}", sanitize_id(name.as_str()), value.render())
            }
        }
    }
}

/// Characters the target language does not allow in identifiers, replaced
/// the same way at every occurrence of the same name.
fn sanitize_id(id: &str) -> String {
    id.replace('-', "_")
        .replace('>', "_right_arrow_")
        .replace('?', "_question_mark_")
}

// TODO: escape embedded '"' and '\' instead of passing the text through
fn escape_string(s: String) -> String {
    s
}

trait TargetJs {
    fn lower_to_js(self) -> Result<Js, CodegenError>;
}

impl<T: TargetJs> TargetJs for Box<T> {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        (*self).lower_to_js()
    }
}

impl TargetJs for Lit {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        Ok(match self {
            LitNumber(v) => Js::Number(v),
            LitBool(v) => Js::Bool(v),
            LitString(v) => Js::Str(v),
        })
    }
}

impl TargetJs for Datum {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        Ok(match self {
            DatumSymbol(name) => Js::Symbol(name),
            DatumNil => Js::Symbol("()".to_owned()),
        })
    }
}

impl TargetJs for Atom {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        match self {
            AtomLit(lit) => lit.lower_to_js(),
            AtomVar(id) => Ok(Js::Id(id)),
            AtomPrimOp(op) => primop_value(op),
        }
    }
}

impl TargetJs for Expr {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        match self {
            AtomExpr(atom) => atom.lower_to_js(),
            QuoteExpr(datum) => datum.lower_to_js(),
            IfExpr(test, then, alt) => Ok(Js::Ternary(
                Box::new(test.lower_to_js()?),
                Box::new(then.lower_to_js()?),
                Box::new(alt.lower_to_js()?),
            )),
            LambdaExpr(params, body) => lower_lambda(params, body),
            LetExpr(bindings, body) => lower_let(bindings, body),
            LetStarExpr(_, _) => Err(CodegenError::UnexpectedLetStar),
            ApplyExpr(rator, rands) => lower_apply(*rator, rands),
        }
    }
}

impl TargetJs for Decl {
    fn lower_to_js(self) -> Result<Js, CodegenError> {
        match self {
            DefineDecl(name, value) => Ok(Js::Const(name, Box::new(value.lower_to_js()?))),
        }
    }
}

fn lower_all(exprs: Vec<Expr>) -> Result<Vec<Js>, CodegenError> {
    exprs.into_iter().map(|e| e.lower_to_js()).collect()
}

fn lower_lambda(params: Vec<Ident>, mut body: Vec<Expr>) -> Result<Js, CodegenError> {
    if body.len() > 1 {
        return Err(CodegenError::TooManyExpressions(body.len()));
    }
    let body = body.pop().ok_or(CodegenError::EmptyBody)?;
    Ok(Js::Arrow(params, Box::new(body.lower_to_js()?)))
}

/// `(let ((x1 v1) .. (xn vn)) body)` applies a lambda over the binding
/// values in declaration order.
fn lower_let(bindings: Vec<Binding>, body: Vec<Expr>) -> Result<Js, CodegenError> {
    let mut params = Vec::with_capacity(bindings.len());
    let mut args = Vec::with_capacity(bindings.len());
    for Binding(id, value) in bindings {
        params.push(id);
        args.push(value.lower_to_js()?);
    }
    let lambda = lower_lambda(params, body)?;
    Ok(Js::Call(Box::new(lambda), args))
}

fn lower_apply(rator: Expr, rands: Vec<Expr>) -> Result<Js, CodegenError> {
    match rator {
        AtomExpr(AtomPrimOp(op)) => lower_primop_apply(op, rands),
        AtomExpr(AtomVar(id)) => Ok(Js::Call(Box::new(Js::Id(id)), lower_all(rands)?)),
        rator @ LambdaExpr(..) => {
            Ok(Js::Call(Box::new(rator.lower_to_js()?), lower_all(rands)?))
        }
        _ => Err(CodegenError::NotApplicable),
    }
}

fn lower_primop_apply(op: Ident, rands: Vec<Expr>) -> Result<Js, CodegenError> {
    match op.as_str() {
        "+" | "-" => fold_infix(op, rands, Js::Number(0.0)),
        "*" | "/" => fold_infix(op, rands, Js::Number(1.0)),
        "and" => fold_infix("&".to_owned(), rands, Js::Bool(true)),
        "or" => fold_infix("|".to_owned(), rands, Js::Bool(false)),
        "<" | ">" => {
            let (lhs, rhs) = lower_two(&op, rands)?;
            Ok(Js::Infix(op, vec![lhs, rhs]))
        }
        "=" | "eq?" | "string=?" => {
            let (lhs, rhs) = lower_two(&op, rands)?;
            Ok(Js::Infix("===".to_owned(), vec![lhs, rhs]))
        }
        "not" => Ok(Js::Not(Box::new(lower_one(&op, rands)?))),
        "symbol?" => Ok(Js::TypeOf(Box::new(lower_one(&op, rands)?), "symbol")),
        "boolean?" => Ok(Js::TypeOf(Box::new(lower_one(&op, rands)?), "boolean")),
        "number?" => Ok(Js::TypeOf(Box::new(lower_one(&op, rands)?), "number")),
        "string?" => Ok(Js::TypeOf(Box::new(lower_one(&op, rands)?), "string")),
        "pair?" => Ok(Js::IsArray(Box::new(lower_one(&op, rands)?))),
        "car" => Ok(Js::Index(Box::new(lower_one(&op, rands)?), 0)),
        "cdr" => Ok(Js::Index(Box::new(lower_one(&op, rands)?), 1)),
        "cons" => {
            let (head, tail) = lower_two(&op, rands)?;
            Ok(Js::Pair(Box::new(head), Box::new(tail)))
        }
        "list" => Ok(Js::Call(Box::new(Js::ListBuilder), lower_all(rands)?)),
        _ => Err(CodegenError::UnknownOperator(op)),
    }
}

/// Chain the operands with one infix operator. No operands yields the
/// operator's identity element; a single operand passes through unchanged,
/// so unary `-` and `/` do not negate or invert.
fn fold_infix(op: String, rands: Vec<Expr>, identity: Js) -> Result<Js, CodegenError> {
    let mut operands = lower_all(rands)?;
    if operands.is_empty() {
        return Ok(identity);
    }
    if operands.len() == 1 {
        return Ok(operands.remove(0));
    }
    Ok(Js::Infix(op, operands))
}

fn lower_one(op: &str, mut rands: Vec<Expr>) -> Result<Js, CodegenError> {
    if rands.len() != 1 {
        return Err(CodegenError::ArityMismatch(op.to_owned(), rands.len()));
    }
    match rands.pop() {
        Some(only) => only.lower_to_js(),
        None => unreachable!("operand count checked"),
    }
}

fn lower_two(op: &str, mut rands: Vec<Expr>) -> Result<(Js, Js), CodegenError> {
    if rands.len() != 2 {
        return Err(CodegenError::ArityMismatch(op.to_owned(), rands.len()));
    }
    let second = rands.pop();
    let first = rands.pop();
    match (first, second) {
        (Some(first), Some(second)) => Ok((first.lower_to_js()?, second.lower_to_js()?)),
        _ => unreachable!("operand count checked"),
    }
}

/// A primitive referenced outside operator position becomes a closure with
/// the same semantics.
fn primop_value(op: Ident) -> Result<Js, CodegenError> {
    fn x() -> Js {
        Js::Id("x".to_owned())
    }
    fn y() -> Js {
        Js::Id("y".to_owned())
    }
    fn unary(body: Js) -> Js {
        Js::Arrow(vec!["x".to_owned()], Box::new(body))
    }
    fn binary(body: Js) -> Js {
        Js::Arrow(vec!["x".to_owned(), "y".to_owned()], Box::new(body))
    }

    match op.as_str() {
        "+" | "-" => Ok(Js::FoldClosure(op, "0")),
        "*" | "/" => Ok(Js::FoldClosure(op, "1")),
        "and" => Ok(Js::FoldClosure("&".to_owned(), "true")),
        "or" => Ok(Js::FoldClosure("|".to_owned(), "false")),
        "<" | ">" => Ok(binary(Js::Infix(op, vec![x(), y()]))),
        "=" | "eq?" | "string=?" => {
            Ok(binary(Js::Infix("===".to_owned(), vec![x(), y()])))
        }
        "not" => Ok(unary(Js::Not(Box::new(x())))),
        "symbol?" => Ok(unary(Js::TypeOf(Box::new(x()), "symbol"))),
        "boolean?" => Ok(unary(Js::TypeOf(Box::new(x()), "boolean"))),
        "number?" => Ok(unary(Js::TypeOf(Box::new(x()), "number"))),
        "string?" => Ok(unary(Js::TypeOf(Box::new(x()), "string"))),
        "pair?" => Ok(unary(Js::IsArray(Box::new(x())))),
        "car" => Ok(unary(Js::Index(Box::new(x()), 0))),
        "cdr" => Ok(unary(Js::Index(Box::new(x()), 1))),
        "cons" => Ok(binary(Js::Pair(Box::new(x()), Box::new(y())))),
        "list" => Ok(Js::ListBuilder),
        _ => Err(CodegenError::UnknownOperator(op)),
    }
}

#[cfg(test)]
mod tests {
    use super::{JsCodeGenerator, LIST_BUILDER};
    use crate::{
        codegen::{CodeGenerator, CodegenError},
        syntax::{desugar::Desugar, parse::SfParser},
    };

    fn translate(input: &str) -> String {
        let ast = SfParser::ast(input).unwrap();
        let core = Desugar::run(ast).unwrap();
        JsCodeGenerator::new().codegen(core).unwrap()
    }

    fn translate_err(input: &str) -> CodegenError {
        let ast = SfParser::ast(input).unwrap();
        let core = Desugar::run(ast).unwrap();
        JsCodeGenerator::new().codegen(core).unwrap_err()
    }

    #[test]
    fn arithmetic_folds_with_identity() {
        assert_eq!(translate("(+ 3 5 7)"), "(3 + 5 + 7)");
        assert_eq!(translate("(* 2 3)"), "(2 * 3)");
        assert_eq!(translate("(- 9 4 1)"), "(9 - 4 - 1)");
        assert_eq!(translate("(+ 3)"), "3");
        assert_eq!(translate("(+)"), "0");
        assert_eq!(translate("(*)"), "1");
    }

    #[test]
    fn conditional_renders_as_ternary() {
        assert_eq!(translate("(if (> x 3) 4 5)"), "((x > 3) ? 4 : 5)");
    }

    #[test]
    fn let_becomes_applied_lambda() {
        assert_eq!(
            translate("(let ((a 1) (b 2)) (+ a b))"),
            "((a,b) => (a + b))(1,2)"
        );
    }

    #[test]
    fn zero_binding_let_is_an_empty_application() {
        assert_eq!(translate("(let () 1)"), "(() => 1)()");
    }

    #[test]
    fn lambda_renders_as_arrow() {
        assert_eq!(translate("(lambda (x y) (* x y))"), "((x,y) => (x * y))");
    }

    #[test]
    fn define_renders_as_const() {
        assert_eq!(translate("(define pi 3.14)"), "const pi = 3.14");
    }

    #[test]
    fn literal_encodings() {
        assert_eq!(translate("3.14"), "3.14");
        assert_eq!(translate("#t"), "true");
        assert_eq!(translate("#f"), "false");
        assert_eq!(translate("\"a\""), "\"a\"");
        assert_eq!(translate("'a"), "Symbol.for(\"a\")");
        assert_eq!(translate("'()"), "Symbol.for(\"()\")");
    }

    #[test]
    fn comparison_operators_are_strictly_binary() {
        assert_eq!(
            translate_err("(< 1 2 3)"),
            CodegenError::ArityMismatch("<".to_owned(), 3)
        );
        assert_eq!(
            translate_err("(> 1)"),
            CodegenError::ArityMismatch(">".to_owned(), 1)
        );
        assert_eq!(
            translate_err("(eq? 'a)"),
            CodegenError::ArityMismatch("eq?".to_owned(), 1)
        );
        assert_eq!(
            translate_err("(string=? \"a\" \"b\" \"c\")"),
            CodegenError::ArityMismatch("string=?".to_owned(), 3)
        );
    }

    #[test]
    fn identity_comparisons_render_as_strict_equality() {
        assert_eq!(translate("(= 1 2)"), "(1 === 2)");
        assert_eq!(
            translate("(eq? 'a 'b)"),
            "(Symbol.for(\"a\") === Symbol.for(\"b\"))"
        );
        assert_eq!(translate("(string=? \"a\" \"b\")"), "(\"a\" === \"b\")");
    }

    #[test]
    fn boolean_operators_fold_bitwise() {
        assert_eq!(translate("(and #t #f)"), "(true & false)");
        assert_eq!(translate("(or #f #f #t)"), "(false | false | true)");
        assert_eq!(translate("(and)"), "true");
        assert_eq!(translate("(or)"), "false");
        assert_eq!(translate("(not #t)"), "(!true)");
        assert_eq!(
            translate_err("(not #t #f)"),
            CodegenError::ArityMismatch("not".to_owned(), 2)
        );
    }

    #[test]
    fn type_predicates_check_runtime_tags() {
        assert_eq!(translate("(number? 1)"), "(typeof(1) === \"number\")");
        assert_eq!(translate("(boolean? #t)"), "(typeof(true) === \"boolean\")");
        assert_eq!(
            translate("(symbol? 'a)"),
            "(typeof(Symbol.for(\"a\")) === \"symbol\")"
        );
        assert_eq!(translate("(string? \"a\")"), "(typeof(\"a\") === \"string\")");
        assert_eq!(translate("(pair? x)"), "Array.isArray(x)");
    }

    #[test]
    fn pair_operations() {
        assert_eq!(translate("(cons 1 2)"), "[1, 2]");
        assert_eq!(translate("(car p)"), "p[0]");
        assert_eq!(translate("(cdr p)"), "p[1]");
        assert_eq!(
            translate_err("(car p q)"),
            CodegenError::ArityMismatch("car".to_owned(), 2)
        );
        assert_eq!(
            translate_err("(cons 1)"),
            CodegenError::ArityMismatch("cons".to_owned(), 1)
        );
    }

    #[test]
    fn list_applies_the_builder_closure() {
        assert_eq!(translate("(list 1 2)"), format!("{}(1,2)", LIST_BUILDER));
        assert_eq!(translate("(list)"), format!("{}()", LIST_BUILDER));
    }

    #[test]
    fn variable_and_inline_lambda_application() {
        assert_eq!(translate("(f 1 2)"), "f(1,2)");
        assert_eq!(translate("((lambda (x) x) 3)"), "((x) => x)(3)");
    }

    #[test]
    fn applying_a_literal_is_rejected() {
        assert_eq!(translate_err("(1 2)"), CodegenError::NotApplicable);
    }

    #[test]
    fn multi_expression_bodies_are_rejected() {
        assert_eq!(
            translate_err("(lambda (x) 1 2)"),
            CodegenError::TooManyExpressions(2)
        );
        assert_eq!(
            translate_err("(let ((a 1)) a a)"),
            CodegenError::TooManyExpressions(2)
        );
    }

    #[test]
    fn identifier_sanitizing_is_consistent_across_occurrences() {
        assert_eq!(
            translate("(lambda (x-1?) (+ x-1? 1))"),
            "((x_1_question_mark_) => (x_1_question_mark_ + 1))"
        );
        assert_eq!(
            translate("(define list->pair (lambda (l) (car l)))"),
            "const list__right_arrow_pair = ((l) => l[0])"
        );
    }

    #[test]
    fn primitive_in_value_position_becomes_a_closure() {
        assert_eq!(
            translate("(define add +)"),
            "const add = ((...args) => args.reduce(((x,y)=>x+y), 0))"
        );
        assert_eq!(
            translate("(define conj and)"),
            "const conj = ((...args) => args.reduce(((x,y)=>x&y), true))"
        );
        assert_eq!(translate("(define first car)"), "const first = ((x) => x[0])");
        assert_eq!(translate("(define mk list)"), format!("const mk = {}", LIST_BUILDER));
    }

    #[test]
    fn program_forms_join_with_statement_separators() {
        assert_eq!(
            translate("(define one 1) (+ one 1)"),
            "const one = 1;\n(one + 1)"
        );
    }

    #[test]
    fn let_star_translates_end_to_end() {
        assert_eq!(
            translate("(let* ((a 1) (b (+ a 1))) (+ a b))"),
            "((a) => ((b) => (a + b))((a + 1)))(1)"
        );
    }
}
