//! The unresolved AST a source statement parses into, before name/field/enum
//! resolution turns it into a `crate::expr::Expr` tree.
use crate::error::SourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(i64),
    Key(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathAst {
    pub root: String,
    pub segments: Vec<PathSegment>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentAst {
    pub name: Option<String>,
    pub value: ExprAst,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallAst {
    pub name: String,
    pub args: Vec<ArgumentAst>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprAst {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    BytesLit(Vec<u8>),
    BoolLit(bool),
    NilLit,
    EnumSym(String, SourceSpan),
    Path(PathAst),
    Call(CallAst),
    List(Vec<ExprAst>),
    Map(Vec<(String, ExprAst)>),
    Add(Box<ExprAst>, Box<ExprAst>),
    Sub(Box<ExprAst>, Box<ExprAst>),
    Mul(Box<ExprAst>, Box<ExprAst>),
    Div(Box<ExprAst>, Box<ExprAst>),
    And(Box<ExprAst>, Box<ExprAst>),
    Or(Box<ExprAst>, Box<ExprAst>),
    Not(Box<ExprAst>),
    Compare(CompareOp, Box<ExprAst>, Box<ExprAst>),
}

/// The root of a compiled statement: `editor(...) [where boolExpr]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementAst {
    pub action: CallAst,
    pub filter: Option<ExprAst>,
}
