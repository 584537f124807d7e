//! Recursive-descent parser: token stream -> unresolved AST. Name/field/enum
//! resolution happens afterwards in `crate::compiler`.
pub mod ast;

use crate::error::{CompileError, CompileErrorKind, CompileResult, SourceSpan};
use crate::lexer::{tokenize, Token, TokenKind};
use ast::{ArgumentAst, CallAst, CompareOp, ExprAst, PathAst, PathSegment, StatementAst};

pub fn parse_statement(src: &str) -> CompileResult<StatementAst> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let statement = parser.statement()?;
    parser.expect_eof()?;
    Ok(statement)
}

pub fn parse_bool_expr(src: &str) -> CompileResult<ExprAst> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.bool_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

pub fn parse_value_expr(src: &str) -> CompileResult<ExprAst> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.math_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn span(&self) -> SourceSpan {
        self.current().span
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(CompileError::new(
                CompileErrorKind::Syntax(format!("expected {kind:?}, found {:?}", self.current().kind)),
                self.span(),
            ))
        }
    }

    fn expect_ident(&mut self) -> CompileResult<(String, SourceSpan)> {
        let span = self.span();
        match self.current().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, span))
            }
            other => Err(CompileError::new(
                CompileErrorKind::Syntax(format!("expected an identifier, found {other:?}")),
                span,
            )),
        }
    }

    fn expect_eof(&mut self) -> CompileResult<()> {
        if matches!(self.current().kind, TokenKind::Eof) {
            Ok(())
        } else {
            Err(CompileError::new(
                CompileErrorKind::Syntax(format!("unexpected trailing input {:?}", self.current().kind)),
                self.span(),
            ))
        }
    }

    // statement := editor [ "where" boolExpr ]
    fn statement(&mut self) -> CompileResult<StatementAst> {
        let action = self.call()?;
        let filter = if self.eat(&TokenKind::Where) {
            Some(self.bool_expr()?)
        } else {
            None
        };
        Ok(StatementAst { action, filter })
    }

    // editor/converter := ident "(" [ argument {"," argument} ] ")"
    fn call(&mut self) -> CompileResult<CallAst> {
        let (name, span) = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        let mut seen_named = false;
        if !self.check(&TokenKind::RParen) {
            loop {
                let arg = self.argument()?;
                if arg.name.is_some() {
                    seen_named = true;
                } else if seen_named {
                    return Err(CompileError::new(CompileErrorKind::PositionalAfterNamed, span));
                }
                args.push(arg);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(CallAst { name, args, span })
    }

    // argument := [ ident "=" ] value
    fn argument(&mut self) -> CompileResult<ArgumentAst> {
        if let TokenKind::Ident(name) = self.current().kind.clone() {
            let checkpoint = self.pos;
            self.advance();
            if self.eat(&TokenKind::Eq) {
                let value = self.math_expr()?;
                return Ok(ArgumentAst { name: Some(name), value });
            }
            self.pos = checkpoint;
        }
        let value = self.math_expr()?;
        Ok(ArgumentAst { name: None, value })
    }

    // boolExpr := orTerm {"or" orTerm}
    fn bool_expr(&mut self) -> CompileResult<ExprAst> {
        let mut left = self.or_term()?;
        while self.eat(&TokenKind::Or) {
            let right = self.or_term()?;
            left = ExprAst::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // orTerm := andTerm {"and" andTerm}
    fn or_term(&mut self) -> CompileResult<ExprAst> {
        let mut left = self.and_term()?;
        while self.eat(&TokenKind::And) {
            let right = self.and_term()?;
            left = ExprAst::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    // andTerm := ["not"] (comparison | "(" boolExpr ")" | bool | converter)
    fn and_term(&mut self) -> CompileResult<ExprAst> {
        let negate = self.eat(&TokenKind::Not);

        let inner = if self.eat(&TokenKind::LParen) {
            let e = self.bool_expr()?;
            self.expect(TokenKind::RParen)?;
            e
        } else if self.eat(&TokenKind::True) {
            ExprAst::BoolLit(true)
        } else if self.eat(&TokenKind::False) {
            ExprAst::BoolLit(false)
        } else if self.is_call_ahead() {
            ExprAst::Call(self.call()?)
        } else {
            self.comparison()?
        };

        Ok(if negate { ExprAst::Not(Box::new(inner)) } else { inner })
    }

    fn is_call_ahead(&self) -> bool {
        matches!(self.current().kind, TokenKind::Ident(_))
            && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::LParen))
    }

    // comparison := value cmpOp value
    fn comparison(&mut self) -> CompileResult<ExprAst> {
        let left = self.math_expr()?;
        let op = match self.current().kind {
            TokenKind::EqEq => CompareOp::Eq,
            TokenKind::NotEq => CompareOp::NotEq,
            TokenKind::Lt => CompareOp::Lt,
            TokenKind::LtEq => CompareOp::LtEq,
            TokenKind::Gt => CompareOp::Gt,
            TokenKind::GtEq => CompareOp::GtEq,
            _ => {
                return Err(CompileError::new(
                    CompileErrorKind::Syntax("expected a comparison operator".into()),
                    self.span(),
                ))
            }
        };
        self.advance();
        let right = self.math_expr()?;
        Ok(ExprAst::Compare(op, Box::new(left), Box::new(right)))
    }

    // mathExpr := term {("+"|"-") term}
    fn math_expr(&mut self) -> CompileResult<ExprAst> {
        let mut left = self.term()?;
        loop {
            if self.eat(&TokenKind::Plus) {
                let right = self.term()?;
                left = ExprAst::Add(Box::new(left), Box::new(right));
            } else if self.eat(&TokenKind::Minus) {
                let right = self.term()?;
                left = ExprAst::Sub(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    // term := factor {("*"|"/") factor}; factor == value
    fn term(&mut self) -> CompileResult<ExprAst> {
        let mut left = self.value()?;
        loop {
            if self.eat(&TokenKind::Star) {
                let right = self.value()?;
                left = ExprAst::Mul(Box::new(left), Box::new(right));
            } else if self.eat(&TokenKind::Slash) {
                let right = self.value()?;
                left = ExprAst::Div(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    // value := literal | path | editor | converter | list | map
    //        | "(" mathExpr ")" | bool | "nil" | enumSym | bytesLit
    fn value(&mut self) -> CompileResult<ExprAst> {
        let span = self.span();
        match self.current().kind.clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(ExprAst::IntLit(i))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(ExprAst::FloatLit(f))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(ExprAst::StringLit(s))
            }
            TokenKind::Bytes(b) => {
                self.advance();
                Ok(ExprAst::BytesLit(b))
            }
            TokenKind::True => {
                self.advance();
                Ok(ExprAst::BoolLit(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(ExprAst::BoolLit(false))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(ExprAst::NilLit)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.math_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.list_literal(),
            TokenKind::LBrace => self.map_literal(),
            TokenKind::Ident(name) => {
                if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::LParen)) {
                    Ok(ExprAst::Call(self.call()?))
                } else if is_enum_symbol(&name) {
                    self.advance();
                    Ok(ExprAst::EnumSym(name, span))
                } else {
                    Ok(ExprAst::Path(self.path()?))
                }
            }
            other => Err(CompileError::new(
                CompileErrorKind::Syntax(format!("unexpected token {other:?} in value position")),
                span,
            )),
        }
    }

    // path := [ ident "." ] ident { "." ident | "[" key "]" }
    fn path(&mut self) -> CompileResult<PathAst> {
        let span = self.span();
        let (root, _) = self.expect_ident()?;
        let mut segments = Vec::new();

        loop {
            if self.eat(&TokenKind::Dot) {
                let (field, _) = self.expect_ident()?;
                segments.push(PathSegment::Field(field));
            } else if self.eat(&TokenKind::LBracket) {
                segments.push(self.key()?);
                self.expect(TokenKind::RBracket)?;
            } else {
                break;
            }
        }

        Ok(PathAst { root, segments, span })
    }

    // key := string | int
    fn key(&mut self) -> CompileResult<PathSegment> {
        let span = self.span();
        match self.current().kind.clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(PathSegment::Key(s))
            }
            TokenKind::Int(i) => {
                self.advance();
                Ok(PathSegment::Index(i))
            }
            other => Err(CompileError::new(
                CompileErrorKind::Syntax(format!("expected a string or int key, found {other:?}")),
                span,
            )),
        }
    }

    fn list_literal(&mut self) -> CompileResult<ExprAst> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                items.push(self.math_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(ExprAst::List(items))
    }

    fn map_literal(&mut self) -> CompileResult<ExprAst> {
        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let span = self.span();
                let TokenKind::Str(key) = self.current().kind.clone() else {
                    return Err(CompileError::new(
                        CompileErrorKind::Syntax("map keys must be string literals".into()),
                        span,
                    ));
                };
                self.advance();
                self.expect(TokenKind::Colon)?;
                let value = self.math_expr()?;
                entries.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(ExprAst::Map(entries))
    }
}

fn is_enum_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::*;

    #[test]
    fn parses_a_statement_with_a_where_clause() {
        let stmt = parse_statement(r#"set(span.name, "cat") where IsEmpty(name)"#).unwrap();
        assert_eq!(stmt.action.name, "set");
        assert_eq!(stmt.action.args.len(), 2);
        assert!(matches!(stmt.filter, Some(ExprAst::Call(ref c)) if c.name == "IsEmpty"));
    }

    #[test]
    fn parses_a_bare_statement_without_where() {
        let stmt = parse_statement("route()").unwrap();
        assert_eq!(stmt.action.name, "route");
        assert!(stmt.filter.is_none());
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_value_expr("1 + 1 * 2").unwrap();
        assert_eq!(
            expr,
            ExprAst::Add(
                Box::new(ExprAst::IntLit(1)),
                Box::new(ExprAst::Mul(Box::new(ExprAst::IntLit(1)), Box::new(ExprAst::IntLit(2))))
            )
        );
    }

    #[test]
    fn parses_a_field_and_index_path() {
        let expr = parse_value_expr(r#"attrs["k"].nested[0]"#).unwrap();
        let ExprAst::Path(path) = expr else { panic!("expected a path") };
        assert_eq!(path.root, "attrs");
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Key("k".into()),
                PathSegment::Field("nested".into()),
                PathSegment::Index(0),
            ]
        );
    }

    #[test]
    fn parses_named_and_positional_arguments() {
        let call = parse_statement("sum(Left=3)").unwrap().action;
        assert_eq!(call.args[0].name.as_deref(), Some("Left"));
    }

    #[test]
    fn rejects_positional_argument_after_named() {
        let err = parse_statement("sum(Left=3, 4)").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::PositionalAfterNamed);
    }

    #[test]
    fn parses_an_enum_symbol() {
        let expr = parse_value_expr("SPAN_KIND_CLIENT").unwrap();
        assert_eq!(expr, ExprAst::EnumSym("SPAN_KIND_CLIENT".into(), SourceSpan::new(1, 1)));
    }

    #[test]
    fn parses_bool_expr_precedence_and_and_short_circuit_shape() {
        // "a or b and c" should group as "a or (b and c)" (and binds tighter).
        let expr = parse_bool_expr("true or false and false").unwrap();
        assert!(matches!(expr, ExprAst::Or(_, ref rhs) if matches!(**rhs, ExprAst::And(..))));
    }

    #[test]
    fn parses_negated_parenthesized_bool_expr() {
        let expr = parse_bool_expr("not (true or false)").unwrap();
        assert!(matches!(expr, ExprAst::Not(ref inner) if matches!(**inner, ExprAst::Or(..))));
    }

    #[test]
    fn parses_list_and_map_literals() {
        assert_eq!(
            parse_value_expr("[1, \"two\", true]").unwrap(),
            ExprAst::List(vec![
                ExprAst::IntLit(1),
                ExprAst::StringLit("two".into()),
                ExprAst::BoolLit(true),
            ])
        );
        assert_eq!(
            parse_value_expr(r#"{"a": 1}"#).unwrap(),
            ExprAst::Map(vec![("a".into(), ExprAst::IntLit(1))])
        );
    }
}
