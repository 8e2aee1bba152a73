// SPDX: CC0-1.0

//! Builtin identifiers. Assumes `Number = f64`.

use crate::{
    eval::{Fun, Ident, IdentKey, Idents, OperatorTyp},
    Number,
};
use core::{f64::consts, iter};

/// The plotted variable.
pub const X: &str = "x";

const CONSTANTS: [(&str, Number); 3] = [
    ("pi", consts::PI),
    ("tau", consts::TAU),
    ("e", consts::E),
];

const FUNCTIONS: [(&str, Fun); 23] = [
    ("abs", Fun::new(1, abs)),
    ("sqrt", Fun::new(1, sqrt)),
    ("cbrt", Fun::new(1, cbrt)),
    ("exp", Fun::new(1, exp)),
    ("ln", Fun::new(1, ln)),
    ("log", Fun::new(2, log)),
    ("floor", Fun::new(1, floor)),
    ("ceil", Fun::new(1, ceil)),
    ("sign", Fun::new(1, sign)),
    ("min", Fun::new(2, min)),
    ("max", Fun::new(2, max)),
    ("sin", Fun::new(1, sin)),
    ("cos", Fun::new(1, cos)),
    ("tan", Fun::new(1, tan)),
    ("asin", Fun::new(1, asin)),
    ("acos", Fun::new(1, acos)),
    ("atan", Fun::new(1, atan)),
    ("arcsin", Fun::new(1, asin)),
    ("arccos", Fun::new(1, acos)),
    ("arctan", Fun::new(1, atan)),
    ("sinh", Fun::new(1, sinh)),
    ("cosh", Fun::new(1, cosh)),
    ("tanh", Fun::new(1, tanh)),
];

/// Table with `x` declared but unbound, every operator under its name,
/// and the builtin functions and constants.
pub fn standard_idents() -> Idents {
    let operators = OperatorTyp::ALL
        .iter()
        .map(|op| (op.name(), Ident::Fun(op.fun())));
    let functions = FUNCTIONS.iter().map(|&(name, fun)| (name, Ident::Fun(fun)));
    let constants = CONSTANTS
        .iter()
        .map(|&(name, val)| (name, Ident::Const(val)));

    iter::once((X, Ident::Var(None)))
        .chain(operators)
        .chain(functions)
        .chain(constants)
        .map(|(name, ident)| (IdentKey::from(name), ident))
        .collect()
}

// arity is checked when the tree is built, so a mismatch here is a bug
#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    match args.try_into() {
        Ok(args) => args,
        Err(_) => panic!("expected {N} arguments, got {}", args.len()),
    }
}

macro_rules! unary {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(args: Vec<Number>) -> Number {
                let [x] = expect_n::<1>(&args);
                x.$name()
            }
        )*
    };
}

unary!(abs, sqrt, cbrt, exp, ln, floor, ceil);
unary!(sin, cos, tan, asin, acos, atan, sinh, cosh, tanh);

pub fn neg(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    -x
}

pub fn add(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x + y
}

pub fn sub(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x - y
}

pub fn mul(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x * y
}

pub fn div(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x / y
}

pub fn pow(args: Vec<Number>) -> Number {
    let [base, exp] = expect_n::<2>(&args);
    base.powf(exp)
}

pub fn log(args: Vec<Number>) -> Number {
    let [x, base] = expect_n::<2>(&args);
    x.log(base)
}

/// Like `signum`, but zero at zero.
pub fn sign(args: Vec<Number>) -> Number {
    let [x] = expect_n::<1>(&args);
    if x == 0.0 {
        0.0
    } else {
        x.signum()
    }
}

pub fn min(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x.min(y)
}

pub fn max(args: Vec<Number>) -> Number {
    let [x, y] = expect_n::<2>(&args);
    x.max(y)
}
