//! Syntax tree produced by the parser and walked by the interpreter

use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Invert,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Invert => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Bool(bool),
    None,
    List(Vec<Expr>),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Left-associative run `a + b * c - d`, folded left to right
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinOp, Expr)>,
    },
    /// Chained comparison: `a < b <= c`
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    /// Two or more operands; yields the first falsy one or the last
    And(Vec<Expr>),
    /// Two or more operands; yields the first truthy one or the last
    Or(Vec<Expr>),
    Not(Box<Expr>),
    /// `then if cond else otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        target: Box<Expr>,
        start: Option<Box<Expr>>,
        stop: Option<Box<Expr>>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Method {
        receiver: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Index { target: Expr, index: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    /// Names local to every call: parameters and anything the body binds,
    /// less those the body declares `global`
    pub local_names: HashSet<String>,
}

impl FunctionDef {
    pub fn new(name: String, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        let mut bound: HashSet<String> = params.iter().map(|p| p.name.clone()).collect();
        let mut global = HashSet::new();
        collect_bindings(&body, &mut bound, &mut global);
        let local_names = bound.difference(&global).cloned().collect();
        Self {
            name,
            params,
            body,
            local_names,
        }
    }
}

/// Names bound and declared global by `body`, not descending into nested `def`s
fn collect_bindings(body: &[Stmt], bound: &mut HashSet<String>, global: &mut HashSet<String>) {
    for stmt in body {
        match &stmt.kind {
            StmtKind::Assign {
                target: Target::Name(name),
                ..
            }
            | StmtKind::AugAssign {
                target: Target::Name(name),
                ..
            } => {
                bound.insert(name.clone());
            }
            StmtKind::For { var, body, .. } => {
                bound.insert(var.clone());
                collect_bindings(body, bound, global);
            }
            StmtKind::While { body, .. } => collect_bindings(body, bound, global),
            StmtKind::If {
                branches,
                otherwise,
            } => {
                for (_, body) in branches {
                    collect_bindings(body, bound, global);
                }
                if let Some(body) = otherwise {
                    collect_bindings(body, bound, global);
                }
            }
            StmtKind::Def(def) => {
                bound.insert(def.name.clone());
            }
            StmtKind::Global(names) => global.extend(names.iter().cloned()),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Assign {
        target: Target,
        value: Expr,
    },
    AugAssign {
        target: Target,
        op: BinOp,
        value: Expr,
    },
    If {
        branches: Vec<(Expr, Vec<Stmt>)>,
        otherwise: Option<Vec<Stmt>>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    For {
        var: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    Def(Rc<FunctionDef>),
    Return(Option<Expr>),
    Global(Vec<String>),
    Break,
    Continue,
    Pass,
}

/// A parsed script
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}
