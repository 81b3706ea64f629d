pub type Ident = String;

#[derive(Debug, PartialEq, Clone)]
pub enum Lit {
    LitNumber(f64),
    LitBool(bool),
    LitString(String),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Atom {
    AtomLit(Lit),
    AtomVar(Ident),
    AtomPrimOp(Ident),
}

/// A quoted datum: either a symbol or the empty list `'()`.
#[derive(Debug, PartialEq, Clone)]
pub enum Datum {
    DatumSymbol(String),
    DatumNil,
}

/// One `let`/`let*` binding: exactly one identifier and its value.
#[derive(Debug, PartialEq, Clone)]
pub struct Binding(pub Ident, pub Expr);

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    AtomExpr(Atom),
    QuoteExpr(Datum),
    ApplyExpr(Box<Expr>, Vec<Expr>),
    IfExpr(Box<Expr>, Box<Expr>, Box<Expr>),
    LambdaExpr(Vec<Ident>, Vec<Expr>),
    LetExpr(Vec<Binding>, Vec<Expr>),
    // surface form only, eliminated by the desugarer
    LetStarExpr(Vec<Binding>, Vec<Expr>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Decl {
    DefineDecl(Ident, Expr),
}

#[derive(Debug, PartialEq, Clone)]
pub enum ProgramItem {
    ExprItem(Expr),
    DeclItem(Decl),
}

pub type Program = Vec<ProgramItem>;
