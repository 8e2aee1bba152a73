// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Number};
use core::{
    borrow::Borrow,
    fmt,
    hash::{Hash, Hasher},
};
use std::{collections::HashMap, sync::Arc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const ALL: [Self; 6] = [
        Self::Neg,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Pow,
    ];

    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add | Self::Sub => 2,
            Self::Mul | Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        match self {
            Self::Neg | Self::Pow => Associativity::Right,
            Self::Add | Self::Sub | Self::Mul | Self::Div => Associativity::Left,
        }
    }

    /// Prefix operators have no left operand.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    /// Name the operator is also callable by.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pow => "pow",
        }
    }

    pub const fn fun(&self) -> Fun {
        match self {
            Self::Neg => Fun::new(1, stdlib::neg),
            Self::Add => Fun::new(2, stdlib::add),
            Self::Sub => Fun::new(2, stdlib::sub),
            Self::Mul => Fun::new(2, stdlib::mul),
            Self::Div => Fun::new(2, stdlib::div),
            Self::Pow => Fun::new(2, stdlib::pow),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    Val(Number),
    /// Variable or constant named by the span.
    Ident,
    Operator(OperatorTyp, Vec<Expr>),
    /// Function named by the span.
    Call(Vec<Expr>),
}

/// Expression tree produced by [`crate::parse::parse`].
#[derive(Clone, Debug)]
pub struct Expr {
    pub node: Node,
    pub loc: SubStr,
    depth: usize,
}

impl Expr {
    pub fn leaf(node: Node, loc: SubStr) -> Self {
        Self {
            node,
            loc,
            depth: 1,
        }
    }

    pub fn branch(node: Node, loc: SubStr) -> Self {
        let depth = match &node {
            Node::Operator(_, args) | Node::Call(args) => {
                1 + args.iter().map(Expr::depth).max().unwrap_or(0)
            }
            Node::Val(_) | Node::Ident => 1,
        };
        Self { node, loc, depth }
    }

    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub fn args(&self) -> &[Expr] {
        match &self.node {
            Node::Operator(_, args) | Node::Call(args) => args,
            Node::Val(_) | Node::Ident => &[],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Node::Val(val) => write!(f, "{val}"),
            Node::Operator(typ, _) => f.write_str(typ.name()),
            Node::Ident | Node::Call(_) => f.write_str(self.loc.get()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalErrTyp {
    UndefinedIdent,
    /// Declared variable that has no value bound.
    NullVar,
    NotAValue,
    NotCallable,
}

/// Evaluation failure at the identifier spanned by `loc`.
#[derive(Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: SubStr,
}

impl EvalErr {
    fn at(typ: EvalErrTyp, expr: &Expr) -> Self {
        Self {
            typ,
            loc: expr.loc.clone(),
        }
    }
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.loc.get();
        match self.typ {
            EvalErrTyp::UndefinedIdent => write!(f, "undefined identifier '{name}'"),
            EvalErrTyp::NullVar => write!(f, "variable '{name}' has no value"),
            EvalErrTyp::NotAValue => write!(f, "function '{name}' is used as a value"),
            EvalErrTyp::NotCallable => write!(f, "'{name}' is not a function"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(Vec<Number>) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(Vec<Number>) -> Number) -> Self {
        Self { arity, fun }
    }
}

#[derive(Clone, Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

/// Identifier table key, either spanned in user input or builtin.
///
/// Keys compare and hash as their text, so the table can be queried with
/// a plain `&str`.
#[derive(Clone, Debug)]
pub enum IdentKey {
    Source(SubStr),
    Builtin(&'static str),
}

impl IdentKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Source(s) => s.get(),
            Self::Builtin(s) => s,
        }
    }
}

impl Borrow<str> for IdentKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for IdentKey {}

impl Hash for IdentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Source(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Builtin(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

pub fn eval(expr: &Expr, idents: &Idents) -> Result<Number, EvalErr> {
    fn eval_args(args: &[Expr], idents: &Idents) -> Result<Vec<Number>, EvalErr> {
        args.iter().map(|arg| eval(arg, idents)).collect()
    }

    match &expr.node {
        Node::Val(val) => Ok(*val),

        Node::Operator(typ, args) => Ok((typ.fun().fun)(eval_args(args, idents)?)),

        Node::Ident => match idents.get(expr.loc.get()) {
            Some(Ident::Var(Some(val)) | Ident::Const(val)) => Ok(*val),
            Some(Ident::Var(None)) => Err(EvalErr::at(EvalErrTyp::NullVar, expr)),
            Some(Ident::Fun(_)) => Err(EvalErr::at(EvalErrTyp::NotAValue, expr)),
            None => Err(EvalErr::at(EvalErrTyp::UndefinedIdent, expr)),
        },

        Node::Call(args) => match idents.get(expr.loc.get()) {
            Some(Ident::Fun(fun)) if fun.arity == args.len() => {
                Ok((fun.fun)(eval_args(args, idents)?))
            }
            Some(_) => Err(EvalErr::at(EvalErrTyp::NotCallable, expr)),
            None => Err(EvalErr::at(EvalErrTyp::UndefinedIdent, expr)),
        },
    }
}

/// A compiled expression of one variable, callable at any `x`.
#[derive(Clone, Debug)]
pub struct Function {
    src: Arc<String>,
    expr: Expr,
    idents: Idents,
}

impl Function {
    /// Binds `expr` to a table that declares [`stdlib::X`].
    pub fn new(src: Arc<String>, expr: Expr, mut idents: Idents) -> Self {
        idents.insert(stdlib::X.into(), Ident::Var(None));
        Self { src, expr, idents }
    }

    pub fn src(&self) -> &Arc<String> {
        &self.src
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn idents(&self) -> &Idents {
        &self.idents
    }

    pub fn eval(&mut self, x: Number) -> Result<Number, EvalErr> {
        if let Some(var) = self.idents.get_mut(stdlib::X) {
            *var = Ident::Var(Some(x));
        }
        eval(&self.expr, &self.idents)
    }
}
