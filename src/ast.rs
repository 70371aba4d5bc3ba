use crate::error::Span;
use crate::value::Value;
use std::cell::RefCell;

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression {
        expr: Expr,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Function(FunctionDecl),
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal {
        value: Value,
    },
    Variable {
        name: String,
    },
    Assign {
        name: String,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },
    /// Calls only ever name their callee directly; there are no first-class
    /// function values.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal { value: Value::Null }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

/// Parameters and body of a user function.
#[derive(Debug, Clone)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Box<Stmt>,
}

/// A `prikol` declaration as it sits in the tree.
///
/// The first time the declaration executes, its definition is moved out of
/// the tree into the function table. After that the node is consumed and
/// only its name remains.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub span: Span,
    definition: RefCell<Option<Function>>,
}

impl FunctionDecl {
    pub fn new(name: String, params: Vec<String>, body: Stmt, span: Span) -> Self {
        Self {
            name,
            span,
            definition: RefCell::new(Some(Function {
                params,
                body: Box::new(body),
            })),
        }
    }

    /// Move the definition out, leaving the node consumed.
    pub fn take(&self) -> Option<Function> {
        self.definition.borrow_mut().take()
    }

    pub fn is_consumed(&self) -> bool {
        self.definition.borrow().is_none()
    }

    /// Parameter names, while the definition is still in the tree.
    pub fn params(&self) -> Option<Vec<String>> {
        self.definition.borrow().as_ref().map(|f| f.params.clone())
    }
}
