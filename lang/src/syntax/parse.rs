use std::{collections::HashSet, result::Result};

use lazy_static::lazy_static;
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser,
};

use crate::syntax::tree::{
    Atom::*, Datum::*, Decl::*, Expr::*, Lit::*, ProgramItem::*, *,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct SfParser;

pub type ParseErrorVariant = ErrorVariant<Rule>;
pub type ParseError = Error<Rule>;

lazy_static! {
    /// Identifiers with a fixed translation rule instead of a variable lookup.
    pub static ref PRIMITIVES: HashSet<&'static str> = [
        "+", "-", "*", "/", "<", ">", "=", "and", "or", "not", "eq?",
        "string=?", "symbol?", "boolean?", "number?", "string?", "pair?",
        "car", "cdr", "cons", "list",
    ]
    .iter()
    .copied()
    .collect();
}

impl SfParser {
    pub fn ast(input: &str) -> Result<Program, ParseError> {
        let pairs = SfParser::parse(Rule::unit, input)?;
        Ok(parse_unit(pairs))
    }
}

fn parse_unit(pairs: Pairs<Rule>) -> Program {
    pairs
        .into_iter()
        .flat_map(|unit| unit.into_inner())
        .filter_map(|node| match node.as_rule() {
            Rule::expr => Some(ExprItem(parse_expr(node))),
            Rule::decl => Some(DeclItem(parse_decl(node))),
            Rule::EOI => None,
            _ => unreachable!("rule should be expr or decl"),
        })
        .collect()
}

fn parse_decl(node: Pair<Rule>) -> Decl {
    let mut iter = node.into_inner().skip_while(|p| p.as_rule() != Rule::id);
    let id = iter.next().unwrap().as_str();
    let expr = parse_expr(iter.next().unwrap());
    DefineDecl(id.to_owned(), expr)
}

fn parse_expr(node: Pair<Rule>) -> Expr {
    let child = node.into_inner().next().unwrap();
    match child.as_rule() {
        Rule::literal => AtomExpr(AtomLit(parse_lit(child))),
        Rule::quote => QuoteExpr(parse_datum(child)),
        Rule::if_expr => parse_if(child),
        Rule::lambda_expr => parse_lambda(child),
        Rule::let_expr => parse_let(child, false),
        Rule::let_star_expr => parse_let(child, true),
        Rule::application => parse_application(child),
        Rule::id => AtomExpr(parse_id(child.as_str())),
        _ => unreachable!("expr inner should be a form, literal or id"),
    }
}

fn parse_id(id: &str) -> Atom {
    match PRIMITIVES.contains(id) {
        true => AtomPrimOp(id.to_owned()),
        _ => AtomVar(id.to_owned()),
    }
}

fn parse_if(node: Pair<Rule>) -> Expr {
    let mut iter = node.into_inner().filter(|p| p.as_rule() == Rule::expr);
    let test = parse_expr(iter.next().unwrap());
    let then = parse_expr(iter.next().unwrap());
    let alt = parse_expr(iter.next().unwrap());
    IfExpr(Box::new(test), Box::new(then), Box::new(alt))
}

fn parse_lambda(node: Pair<Rule>) -> Expr {
    let mut params = Vec::new();
    let mut body = Vec::new();
    for child in node.into_inner() {
        match child.as_rule() {
            Rule::id => params.push(child.as_str().to_owned()),
            Rule::expr => body.push(parse_expr(child)),
            Rule::kw_lambda => (),
            _ => unreachable!("lambda inner should be params or body"),
        }
    }
    LambdaExpr(params, body)
}

fn parse_let(node: Pair<Rule>, sequential: bool) -> Expr {
    let mut bindings = Vec::new();
    let mut body = Vec::new();
    for child in node.into_inner() {
        match child.as_rule() {
            Rule::binding => bindings.push(parse_binding(child)),
            Rule::expr => body.push(parse_expr(child)),
            Rule::kw_let | Rule::kw_let_star => (),
            _ => unreachable!("let inner should be bindings or body"),
        }
    }
    match sequential {
        true => LetStarExpr(bindings, body),
        _ => LetExpr(bindings, body),
    }
}

fn parse_binding(node: Pair<Rule>) -> Binding {
    let mut iter = node.into_inner();
    let id = iter.next().unwrap().as_str();
    let value = parse_expr(iter.next().unwrap());
    Binding(id.to_owned(), value)
}

fn parse_application(node: Pair<Rule>) -> Expr {
    let mut iter = node.into_inner().map(parse_expr);
    let rator = iter.next().unwrap();
    let rands = iter.collect();
    ApplyExpr(Box::new(rator), rands)
}

fn parse_datum(node: Pair<Rule>) -> Datum {
    let child = node.into_inner().next().unwrap();
    match child.as_rule() {
        Rule::nil => DatumNil,
        Rule::symbol => DatumSymbol(child.as_str().to_owned()),
        _ => unreachable!("quoted datum should be a symbol or ()"),
    }
}

fn parse_lit(lit: Pair<Rule>) -> Lit {
    let lit = lit.into_inner().next().unwrap();
    match lit.as_rule() {
        Rule::number_lit => LitNumber(lit.as_str().parse::<f64>().unwrap()),
        Rule::bool_lit => LitBool(lit.as_str() == "#t"),
        Rule::string_lit => {
            let s = lit.as_str();
            // the quotes are part of the match; the content is kept verbatim
            LitString(s[1..s.len() - 1].to_owned())
        }
        _ => unreachable!("unsupported literal type: {:?}", lit.as_rule()),
    }
}

#[cfg(test)]
mod tests {
    use super::SfParser;
    use crate::syntax::tree::{
        Atom::*, Binding, Datum::*, Decl::*, Expr::*, Lit::*, ProgramItem::*,
    };

    #[test]
    fn parses_primitive_application() {
        let ast = SfParser::ast("(+ 3 5)").unwrap();
        assert_eq!(
            ast,
            vec![ExprItem(ApplyExpr(
                Box::new(AtomExpr(AtomPrimOp("+".to_owned()))),
                vec![
                    AtomExpr(AtomLit(LitNumber(3.0))),
                    AtomExpr(AtomLit(LitNumber(5.0))),
                ],
            ))]
        );
    }

    #[test]
    fn parses_define() {
        let ast = SfParser::ast("(define pi 3.14)").unwrap();
        assert_eq!(
            ast,
            vec![DeclItem(DefineDecl(
                "pi".to_owned(),
                AtomExpr(AtomLit(LitNumber(3.14))),
            ))]
        );
    }

    #[test]
    fn parses_quoted_data() {
        let ast = SfParser::ast("'a '()").unwrap();
        assert_eq!(
            ast,
            vec![
                ExprItem(QuoteExpr(DatumSymbol("a".to_owned()))),
                ExprItem(QuoteExpr(DatumNil)),
            ]
        );
    }

    #[test]
    fn parses_let_star() {
        let ast = SfParser::ast("(let* ((a 1)) a)").unwrap();
        assert_eq!(
            ast,
            vec![ExprItem(LetStarExpr(
                vec![Binding("a".to_owned(), AtomExpr(AtomLit(LitNumber(1.0))))],
                vec![AtomExpr(AtomVar("a".to_owned()))],
            ))]
        );
    }

    #[test]
    fn keyword_prefix_is_an_ordinary_identifier() {
        let ast = SfParser::ast("(letter 1)").unwrap();
        assert_eq!(
            ast,
            vec![ExprItem(ApplyExpr(
                Box::new(AtomExpr(AtomVar("letter".to_owned()))),
                vec![AtomExpr(AtomLit(LitNumber(1.0)))],
            ))]
        );
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert!(SfParser::ast("(+ 1 2").is_err());
    }
}
