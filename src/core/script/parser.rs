//! Recursive descent parser for the script language.
//!
//! Binary arithmetic and bitwise operators share one precedence-climbing loop
//! driven by [`binary_precedence`]; everything above them (comparisons,
//! boolean operators, conditional expressions) gets its own level.

use std::rc::Rc;

use super::ast::{BinOp, CmpOp, Expr, FunctionDef, Param, Program, Stmt, StmtKind, Target, UnaryOp};
use super::error::{ScriptError, ScriptResult};
use super::lexer::{Spanned, Token, tokenize};

/// Deepest expression or block nesting accepted before giving up
const MAX_NESTING: usize = 100;

/// Operator precedence for binary operators (higher = binds tighter)
fn binary_precedence(token: &Token) -> Option<(BinOp, u8)> {
    let entry = match token {
        Token::Pipe => (BinOp::BitOr, 1),
        Token::Caret => (BinOp::BitXor, 2),
        Token::Ampersand => (BinOp::BitAnd, 3),
        Token::LessLess => (BinOp::Shl, 4),
        Token::GreaterGreater => (BinOp::Shr, 4),
        Token::Plus => (BinOp::Add, 5),
        Token::Minus => (BinOp::Sub, 5),
        Token::Star => (BinOp::Mul, 6),
        Token::Slash => (BinOp::Div, 6),
        Token::SlashSlash => (BinOp::FloorDiv, 6),
        Token::Percent => (BinOp::Mod, 6),
        _ => return None,
    };
    Some(entry)
}

fn augmented_op(token: &Token) -> Option<BinOp> {
    match token {
        Token::PlusAssign => Some(BinOp::Add),
        Token::MinusAssign => Some(BinOp::Sub),
        Token::StarAssign => Some(BinOp::Mul),
        Token::SlashAssign => Some(BinOp::Div),
        _ => None,
    }
}

/// Parse a complete program
pub fn parse(source: &str) -> ScriptResult<Program> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        depth: 0,
        loop_depth: 0,
        function_depth: 0,
    };
    parser.program()
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    loop_depth: usize,
    function_depth: usize,
}

impl Parser {
    // ==================== Token cursor ====================

    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    fn peek(&self) -> &Token {
        self.current().map_or(&Token::Eof, |s| &s.token)
    }

    fn peek_next(&self) -> &Token {
        self.tokens.get(self.pos + 1).map_or(&Token::Eof, |s| &s.token)
    }

    fn line(&self) -> usize {
        self.current().map_or(1, |s| s.line)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, message: &str) -> ScriptResult<()> {
        if self.eat(token) {
            Ok(())
        } else if *self.peek() == Token::Eof {
            Err(self.error())
        } else {
            Err(ScriptError::syntax(message, self.line()))
        }
    }

    fn expect_name(&mut self) -> ScriptResult<String> {
        match self.advance() {
            Token::Name(name) => Ok(name),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error())
            }
        }
    }

    fn error(&self) -> ScriptError {
        match self.peek() {
            Token::Eof => ScriptError::syntax("unexpected EOF while parsing", self.line()),
            Token::Indent => ScriptError::indentation("unexpected indent", self.line()),
            _ => ScriptError::syntax("invalid syntax", self.line()),
        }
    }

    fn nested<T>(
        &mut self,
        message: &str,
        f: impl FnOnce(&mut Self) -> ScriptResult<T>,
    ) -> ScriptResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ScriptError::syntax(message, self.line()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ==================== Statements ====================

    fn program(&mut self) -> ScriptResult<Program> {
        let mut body = Vec::new();
        while *self.peek() != Token::Eof {
            if self.eat(&Token::Newline) {
                continue;
            }
            body.extend(self.statement()?);
        }
        Ok(Program { body })
    }

    fn statement(&mut self) -> ScriptResult<Vec<Stmt>> {
        let stmt = match self.peek() {
            Token::If => self.if_statement()?,
            Token::While => self.while_statement()?,
            Token::For => self.for_statement()?,
            Token::Def => self.def_statement()?,
            Token::Indent => return Err(self.error()),
            _ => return self.simple_statements(),
        };
        Ok(vec![stmt])
    }

    /// One or more `;`-separated simple statements ending the logical line
    fn simple_statements(&mut self) -> ScriptResult<Vec<Stmt>> {
        let mut stmts = vec![self.simple_statement()?];
        while self.eat(&Token::Semicolon) {
            if matches!(self.peek(), Token::Newline | Token::Eof) {
                break;
            }
            stmts.push(self.simple_statement()?);
        }
        if !self.eat(&Token::Newline) && *self.peek() != Token::Eof {
            return Err(self.error());
        }
        Ok(stmts)
    }

    fn simple_statement(&mut self) -> ScriptResult<Stmt> {
        let line = self.line();
        let kind = match self.peek() {
            Token::Pass => {
                self.advance();
                StmtKind::Pass
            }
            Token::Break => {
                if self.loop_depth == 0 {
                    return Err(ScriptError::syntax("'break' outside loop", line));
                }
                self.advance();
                StmtKind::Break
            }
            Token::Continue => {
                if self.loop_depth == 0 {
                    return Err(ScriptError::syntax("'continue' not properly in loop", line));
                }
                self.advance();
                StmtKind::Continue
            }
            Token::Return => {
                if self.function_depth == 0 {
                    return Err(ScriptError::syntax("'return' outside function", line));
                }
                self.advance();
                if matches!(self.peek(), Token::Newline | Token::Semicolon | Token::Eof) {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.expression()?))
                }
            }
            Token::Global => {
                self.advance();
                let mut names = vec![self.expect_name()?];
                while self.eat(&Token::Comma) {
                    names.push(self.expect_name()?);
                }
                StmtKind::Global(names)
            }
            _ => self.expression_statement()?,
        };
        Ok(Stmt { line, kind })
    }

    fn expression_statement(&mut self) -> ScriptResult<StmtKind> {
        let expr = self.expression()?;
        if self.eat(&Token::Assign) {
            let target = self.target(expr)?;
            let value = self.expression()?;
            if *self.peek() == Token::Assign {
                return Err(self.error());
            }
            return Ok(StmtKind::Assign { target, value });
        }
        if let Some(op) = augmented_op(self.peek()) {
            self.advance();
            let target = self.target(expr)?;
            let value = self.expression()?;
            return Ok(StmtKind::AugAssign { target, op, value });
        }
        Ok(StmtKind::Expr(expr))
    }

    fn target(&self, expr: Expr) -> ScriptResult<Target> {
        match expr {
            Expr::Name(name) => Ok(Target::Name(name)),
            Expr::Index { target, index } => Ok(Target::Index {
                target: *target,
                index: *index,
            }),
            Expr::Call { .. } | Expr::Method { .. } => Err(ScriptError::syntax(
                "cannot assign to function call",
                self.line(),
            )),
            _ => Err(ScriptError::syntax("cannot assign to expression", self.line())),
        }
    }

    /// `:` followed by an indented block or a one-line body
    fn block(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.expect(&Token::Colon, "expected ':'")?;
        if !self.eat(&Token::Newline) {
            return self.simple_statements();
        }
        if !self.eat(&Token::Indent) {
            return Err(ScriptError::indentation(
                "expected an indented block",
                self.line(),
            ));
        }
        self.nested("too many statically nested blocks", |p| {
            let mut body = Vec::new();
            while !p.eat(&Token::Dedent) {
                if *p.peek() == Token::Eof {
                    break;
                }
                if p.eat(&Token::Newline) {
                    continue;
                }
                body.extend(p.statement()?);
            }
            Ok(body)
        })
    }

    fn loop_body(&mut self) -> ScriptResult<Vec<Stmt>> {
        self.loop_depth += 1;
        let body = self.block();
        self.loop_depth -= 1;
        body
    }

    fn if_statement(&mut self) -> ScriptResult<Stmt> {
        let line = self.line();
        self.advance();
        let cond = self.expression()?;
        let mut branches = vec![(cond, self.block()?)];
        let mut otherwise = None;
        loop {
            if self.eat(&Token::Elif) {
                let cond = self.expression()?;
                branches.push((cond, self.block()?));
            } else if self.eat(&Token::Else) {
                otherwise = Some(self.block()?);
                break;
            } else {
                break;
            }
        }
        Ok(Stmt {
            line,
            kind: StmtKind::If {
                branches,
                otherwise,
            },
        })
    }

    fn while_statement(&mut self) -> ScriptResult<Stmt> {
        let line = self.line();
        self.advance();
        let cond = self.expression()?;
        let body = self.loop_body()?;
        Ok(Stmt {
            line,
            kind: StmtKind::While { cond, body },
        })
    }

    fn for_statement(&mut self) -> ScriptResult<Stmt> {
        let line = self.line();
        self.advance();
        let var = self.expect_name()?;
        self.expect(&Token::In, "expected 'in'")?;
        let iter = self.expression()?;
        let body = self.loop_body()?;
        Ok(Stmt {
            line,
            kind: StmtKind::For { var, iter, body },
        })
    }

    fn def_statement(&mut self) -> ScriptResult<Stmt> {
        let line = self.line();
        self.advance();
        let name = self.expect_name()?;
        self.expect(&Token::LParen, "expected '('")?;

        let mut params: Vec<Param> = Vec::new();
        while !self.eat(&Token::RParen) {
            let param = self.expect_name()?;
            if params.iter().any(|p| p.name == param) {
                return Err(ScriptError::syntax(
                    format!("duplicate argument '{}' in function definition", param),
                    self.line(),
                ));
            }
            let default = if self.eat(&Token::Assign) {
                Some(self.expression()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(ScriptError::syntax(
                        "non-default argument follows default argument",
                        self.line(),
                    ));
                }
                None
            };
            params.push(Param {
                name: param,
                default,
            });
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RParen, "expected ')'")?;
                break;
            }
        }

        let saved_loops = std::mem::take(&mut self.loop_depth);
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        self.loop_depth = saved_loops;

        Ok(Stmt {
            line,
            kind: StmtKind::Def(Rc::new(FunctionDef::new(name, params, body?))),
        })
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> ScriptResult<Expr> {
        self.nested("expression nested too deeply", Self::conditional)
    }

    fn conditional(&mut self) -> ScriptResult<Expr> {
        let then = self.or_expr()?;
        if !self.eat(&Token::If) {
            return Ok(then);
        }
        let cond = self.or_expr()?;
        self.expect(&Token::Else, "expected 'else' after 'if' expression")?;
        let otherwise = self.expression()?;
        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn or_expr(&mut self) -> ScriptResult<Expr> {
        let first = self.and_expr()?;
        if *self.peek() != Token::Or {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::Or) {
            operands.push(self.and_expr()?);
        }
        Ok(Expr::Or(operands))
    }

    fn and_expr(&mut self) -> ScriptResult<Expr> {
        let first = self.not_expr()?;
        if *self.peek() != Token::And {
            return Ok(first);
        }
        let mut operands = vec![first];
        while self.eat(&Token::And) {
            operands.push(self.not_expr()?);
        }
        Ok(Expr::And(operands))
    }

    fn not_expr(&mut self) -> ScriptResult<Expr> {
        if self.eat(&Token::Not) {
            let operand = self.nested("expression nested too deeply", Self::not_expr)?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ScriptResult<Expr> {
        let first = self.binary(0)?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Token::EqEq => CmpOp::Eq,
                Token::NotEq => CmpOp::NotEq,
                Token::Less => CmpOp::Lt,
                Token::LessEq => CmpOp::Le,
                Token::Greater => CmpOp::Gt,
                Token::GreaterEq => CmpOp::Ge,
                Token::In => CmpOp::In,
                Token::Not if *self.peek_next() == Token::In => {
                    self.advance();
                    CmpOp::NotIn
                }
                Token::Is if *self.peek_next() == Token::Not => {
                    self.advance();
                    CmpOp::IsNot
                }
                Token::Is => CmpOp::Is,
                _ => break,
            };
            self.advance();
            rest.push((op, self.binary(0)?));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Compare {
                first: Box::new(first),
                rest,
            })
        }
    }

    /// Precedence climbing over the left-associative binary operators.
    ///
    /// Every operator this loop consumes applies to everything folded so far,
    /// so a run of two or more becomes one flat [`Expr::Chain`].
    fn binary(&mut self, min_prec: u8) -> ScriptResult<Expr> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        while let Some((op, prec)) = binary_precedence(self.peek()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            rest.push((op, self.binary(prec + 1)?));
        }
        match rest.len() {
            0 => Ok(first),
            1 => {
                let (op, right) = rest.remove(0);
                Ok(Expr::Binary {
                    op,
                    left: Box::new(first),
                    right: Box::new(right),
                })
            }
            _ => Ok(Expr::Chain {
                first: Box::new(first),
                rest,
            }),
        }
    }

    fn unary(&mut self) -> ScriptResult<Expr> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Pos,
            Token::Tilde => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.nested("expression nested too deeply", Self::unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// `**` binds tighter than a unary operator on its left and is right-associative
    fn power(&mut self) -> ScriptResult<Expr> {
        let base = self.postfix()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        let exponent = self.nested("expression nested too deeply", Self::unary)?;
        Ok(Expr::Binary {
            op: BinOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        })
    }

    /// Calls, subscripts and method calls; each one wraps the tree so far and
    /// counts against the nesting limit.
    fn postfix(&mut self) -> ScriptResult<Expr> {
        let outer = self.depth;
        let result = self.postfix_chain();
        self.depth = outer;
        result
    }

    fn postfix_chain(&mut self) -> ScriptResult<Expr> {
        let mut expr = self.atom()?;
        loop {
            if matches!(self.peek(), Token::LParen | Token::LBracket | Token::Dot) {
                if self.depth >= MAX_NESTING {
                    return Err(ScriptError::syntax("expression nested too deeply", self.line()));
                }
                self.depth += 1;
            }
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let (args, kwargs) = self.call_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        kwargs,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    expr = self.subscript(expr)?;
                }
                Token::Dot => {
                    self.advance();
                    let name = self.expect_name()?;
                    self.expect(&Token::LParen, "invalid syntax")?;
                    let (args, kwargs) = self.call_arguments()?;
                    if !kwargs.is_empty() {
                        return Err(ScriptError::type_error(format!(
                            "{}() takes no keyword arguments",
                            name
                        )));
                    }
                    expr = Expr::Method {
                        receiver: Box::new(expr),
                        name,
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Arguments after `(` up to and including `)`
    fn call_arguments(&mut self) -> ScriptResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        while !self.eat(&Token::RParen) {
            if matches!(self.peek(), Token::Name(_)) && *self.peek_next() == Token::Assign {
                let name = self.expect_name()?;
                self.advance();
                if kwargs.iter().any(|(k, _)| *k == name) {
                    return Err(ScriptError::syntax(
                        format!("keyword argument repeated: {}", name),
                        self.line(),
                    ));
                }
                kwargs.push((name, self.expression()?));
            } else {
                if !kwargs.is_empty() {
                    return Err(ScriptError::syntax(
                        "positional argument follows keyword argument",
                        self.line(),
                    ));
                }
                args.push(self.expression()?);
            }
            if !self.eat(&Token::Comma) {
                self.expect(&Token::RParen, "expected ')'")?;
                break;
            }
        }
        Ok((args, kwargs))
    }

    /// Index or slice after `[`
    fn subscript(&mut self, target: Expr) -> ScriptResult<Expr> {
        let start = if *self.peek() == Token::Colon {
            None
        } else {
            Some(self.expression()?)
        };
        if !self.eat(&Token::Colon) {
            self.expect(&Token::RBracket, "expected ']'")?;
            let index = start.ok_or_else(|| self.error())?;
            return Ok(Expr::Index {
                target: Box::new(target),
                index: Box::new(index),
            });
        }
        let stop = if *self.peek() == Token::RBracket {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&Token::RBracket, "expected ']'")?;
        Ok(Expr::Slice {
            target: Box::new(target),
            start: start.map(Box::new),
            stop: stop.map(Box::new),
        })
    }

    fn atom(&mut self) -> ScriptResult<Expr> {
        let expr = match self.peek().clone() {
            Token::Int(n) => Expr::Int(n),
            Token::Float(f) => Expr::Float(f),
            Token::Str(s) => {
                self.advance();
                // Adjacent literals concatenate
                let mut text = s;
                while let Token::Str(more) = self.peek() {
                    text.push_str(more);
                    self.advance();
                }
                return Ok(Expr::Str(Rc::from(text)));
            }
            Token::Name(name) => Expr::Name(name),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::None => Expr::None,
            Token::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&Token::RParen, "expected ')'")?;
                return Ok(inner);
            }
            Token::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.eat(&Token::RBracket) {
                    items.push(self.expression()?);
                    if !self.eat(&Token::Comma) {
                        self.expect(&Token::RBracket, "expected ']'")?;
                        break;
                    }
                }
                return Ok(Expr::List(items));
            }
            _ => return Err(self.error()),
        };
        self.advance();
        Ok(expr)
    }
}
