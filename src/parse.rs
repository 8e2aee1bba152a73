// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)
// that assembles the output queue into a tree as it goes

use crate::{
    eval::{Associativity, Expr, Function, Ident, IdentKey, Idents, Node, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

/// Deepest expression tree accepted, so evaluation never runs out of stack.
pub const MAX_DEPTH: usize = 256;

/// Function application binds like unary negation.
const FUN_PRECEDENCE: i8 = OperatorTyp::Neg.precedence();

#[derive(Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    Empty,
    ArgCount {
        name: IdentKey,
        arity: usize,
        found: usize,
    },
    StackMismatch {
        expected: usize,
        found: usize,
    },
    TooDeep,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::Empty => write!(f, "empty expression"),
            Self::ArgCount { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),
            Self::StackMismatch { expected, found } => write!(
                f,
                "expected {expected} value{s} but found {found}",
                s = if *expected == 1 { "" } else { "s" }
            ),
            Self::TooDeep => write!(f, "expression is nested more than {MAX_DEPTH} levels deep"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typ)
    }
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    /// `base` is the output length when the function was pushed; its
    /// arguments are the values after it.
    Fun { arity: usize, base: usize },
    /// `base` is the output length when the paren was opened.
    OpenParen { base: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

impl ShuntOp {
    fn is_open_paren(&self) -> bool {
        matches!(self.typ, ShuntOpTyp::OpenParen { .. })
    }

    /// Whether this operator, sitting on the stack, must be output before
    /// `incoming` is pushed.
    fn pops_before(&self, incoming: OperatorTyp) -> bool {
        let prec = match self.typ {
            ShuntOpTyp::Operator(op) => op.precedence(),
            ShuntOpTyp::Fun { .. } => FUN_PRECEDENCE,
            ShuntOpTyp::OpenParen { .. } => return false,
        };
        prec > incoming.precedence()
            || (prec == incoming.precedence() && incoming.associativity() == Associativity::Left)
    }

    fn output(self, out: &mut Vec<Expr>) -> Result<(), ParseErr> {
        let (name, arity, base): (IdentKey, usize, usize) = match self.typ {
            ShuntOpTyp::Operator(typ) => (typ.name().into(), typ.fun().arity, 0),
            ShuntOpTyp::Fun { arity, base } => (self.loc.clone().into(), arity, base),
            ShuntOpTyp::OpenParen { .. } => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ParenMismatch,
                    loc: self.loc,
                })
            }
        };

        let found = out.len().saturating_sub(base);
        if found < arity {
            return Err(ParseErr {
                typ: ParseErrTyp::ArgCount {
                    name,
                    arity,
                    found,
                },
                loc: self.loc,
            });
        }
        let args = out.split_off(out.len() - arity);
        let node = match self.typ {
            ShuntOpTyp::Operator(typ) => Node::Operator(typ, args),
            _ => Node::Call(args),
        };

        let expr = Expr::branch(node, self.loc);
        if expr.depth() > MAX_DEPTH {
            return Err(ParseErr {
                typ: ParseErrTyp::TooDeep,
                loc: expr.loc,
            });
        }
        out.push(expr);
        Ok(())
    }
}

/// Pops operators into the output until an open paren is on top.
fn unwind_to_paren(ops: &mut Vec<ShuntOp>, out: &mut Vec<Expr>) -> Result<(), ParseErr> {
    while ops.last().is_some_and(|op| !op.is_open_paren()) {
        if let Some(op) = ops.pop() {
            op.output(out)?;
        }
    }
    Ok(())
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Expr, ParseErr> {
    let src = Arc::clone(lex.src());
    let mut out: Vec<Expr> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack
    // whether the previous token left a value behind
    let mut operand = false;

    for tok in lex {
        let tok = tok?;
        let starts_operand = matches!(
            tok.typ,
            TokTyp::Number | TokTyp::Ident | TokTyp::OpenParen
        );
        if operand && starts_operand {
            // two values side by side, such as `2x`, `x sin` or `1 2 max`
            return Err(ParseErr {
                typ: ParseErrTyp::StackMismatch {
                    expected: 1,
                    found: 2,
                },
                loc: tok.loc,
            });
        }
        operand = matches!(tok.typ, TokTyp::Number | TokTyp::CloseParen);

        match tok.typ {
            TokTyp::Number => {
                let num: Number = tok.loc.get().parse().map_err(|err| ParseErr {
                    typ: ParseErrTyp::ParseNum(err),
                    loc: tok.loc.clone(),
                })?;
                out.push(Expr::leaf(Node::Val(num), tok.loc));
            }

            TokTyp::Ident => {
                if let Some(Ident::Fun(fun)) = idents.get(tok.loc.get()) {
                    ops.push(ShuntOp {
                        typ: ShuntOpTyp::Fun {
                            arity: fun.arity,
                            base: out.len(),
                        },
                        loc: tok.loc,
                    });
                } else {
                    // unknown identifiers are assumed to be variables and
                    // fail when evaluated
                    operand = true;
                    out.push(Expr::leaf(Node::Ident, tok.loc));
                }
            }

            TokTyp::Op(o1) => {
                if !o1.is_prefix() {
                    while ops.last().is_some_and(|o2| o2.pops_before(o1)) {
                        if let Some(o2) = ops.pop() {
                            o2.output(&mut out)?;
                        }
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
            }

            TokTyp::Comma => unwind_to_paren(&mut ops, &mut out)?,

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen { base: out.len() },
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                unwind_to_paren(&mut ops, &mut out)?;

                let base = match ops.pop() {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen { base },
                        ..
                    }) => base,
                    _ => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::ParenMismatch,
                            loc: tok.loc,
                        })
                    }
                };

                let found = out.len().saturating_sub(base);
                if let Some(ShuntOpTyp::Fun { arity, .. }) = ops.last().map(|op| op.typ) {
                    if let Some(op) = ops.pop() {
                        if found != arity {
                            return Err(ParseErr {
                                typ: ParseErrTyp::ArgCount {
                                    name: op.loc.clone().into(),
                                    arity,
                                    found,
                                },
                                loc: op.loc,
                            });
                        }
                        op.output(&mut out)?;
                    }
                } else if found != 1 {
                    // a plain group holds exactly one value
                    let loc = out.get(base + 1).map_or(tok.loc, |extra| extra.loc.clone());
                    return Err(ParseErr {
                        typ: ParseErrTyp::StackMismatch { expected: 1, found },
                        loc,
                    });
                }
            }
        }
    }

    while let Some(op) = ops.pop() {
        op.output(&mut out)?;
    }

    match out.len() {
        0 => Err(ParseErr {
            typ: ParseErrTyp::Empty,
            loc: SubStr::all(src),
        }),
        1 => Ok(out.remove(0)),
        found => Err(ParseErr {
            typ: ParseErrTyp::StackMismatch { expected: 1, found },
            loc: out.swap_remove(1).loc,
        }),
    }
}

/// Lexes and parses `src` into a callable of `x`.
pub fn compile(src: &Arc<String>, idents: Idents) -> Result<Function, ParseErr> {
    let expr = parse(Lexer::new(src), &idents)?;
    Ok(Function::new(Arc::clone(src), expr, idents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lex::Reserved, stdlib};

    fn sexpr(expr: &Expr) -> String {
        if expr.args().is_empty() {
            expr.to_string()
        } else {
            let args: Vec<String> = expr.args().iter().map(sexpr).collect();
            format!("({expr} {})", args.join(" "))
        }
    }

    fn tree(src: &str) -> Result<String, ParseErr> {
        let src = Arc::new(src.to_string());
        let idents = stdlib::standard_idents();
        parse(Lexer::new(&src), &idents).map(|expr| sexpr(&expr))
    }

    fn err(src: &str) -> ParseErr {
        match tree(src) {
            Ok(tree) => panic!("expected error, parsed {tree}"),
            Err(err) => err,
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(tree("1 + 2 * x").unwrap(), "(add 1 (mul 2 x))");
        assert_eq!(tree("1 - 2 - 3").unwrap(), "(sub (sub 1 2) 3)");
        assert_eq!(tree("2 ^ 3 ^ x").unwrap(), "(pow 2 (pow 3 x))");
        assert_eq!(tree("(1 + 2) * x").unwrap(), "(mul (add 1 2) x)");
    }

    #[test]
    fn test_negation() {
        assert_eq!(tree("-x^2").unwrap(), "(neg (pow x 2))");
        assert_eq!(tree("2^-x").unwrap(), "(pow 2 (neg x))");
        assert_eq!(tree("--x").unwrap(), "(neg (neg x))");
        assert_eq!(tree("x * -1").unwrap(), "(mul x (neg 1))");
        assert_eq!(tree("x-1").unwrap(), "(sub x 1)");
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(tree("sin(x)").unwrap(), "(sin x)");
        assert_eq!(tree("log(x, 2) + 1").unwrap(), "(add (log x 2) 1)");
        assert_eq!(tree("3 + max(x, 1)").unwrap(), "(add 3 (max x 1))");
        assert_eq!(tree("sin x * 2").unwrap(), "(mul (sin x) 2)");
        assert_eq!(tree("sin x ^ 2").unwrap(), "(sin (pow x 2))");
        assert_eq!(tree("sqrt(abs(x))").unwrap(), "(sqrt (abs x))");
    }

    #[test]
    fn test_unknown_identifier_parses_as_variable() {
        assert_eq!(tree("hello").unwrap(), "hello");
    }

    #[test]
    fn test_arg_count_errors() {
        let e = err("max(1)");
        assert!(matches!(
            e.typ,
            ParseErrTyp::ArgCount {
                arity: 2,
                found: 1,
                ..
            }
        ));
        assert_eq!(e.loc.get(), "max");

        let e = err("sin(x, 2)");
        assert!(matches!(
            e.typ,
            ParseErrTyp::ArgCount {
                arity: 1,
                found: 2,
                ..
            }
        ));

        let e = err("x +");
        assert!(matches!(e.typ, ParseErrTyp::ArgCount { found: 1, .. }));
        assert_eq!(e.to_string(), "function 'add' requires 2 arguments, but found 1");
    }

    #[test]
    fn test_implicit_multiplication_is_a_stack_mismatch() {
        let e = err("2x");
        assert!(matches!(
            e.typ,
            ParseErrTyp::StackMismatch {
                expected: 1,
                found: 2
            }
        ));
        assert_eq!(e.loc.get(), "x");

        let e = err("2 (x + 1)");
        assert!(matches!(e.typ, ParseErrTyp::StackMismatch { .. }));
        assert_eq!(e.loc.get(), "(");
    }

    #[test]
    fn test_function_after_a_value_is_rejected() {
        let cases = [
            ("x sin", "sin"),
            ("2 sqrt", "sqrt"),
            ("1 2 max", "2"),
            ("x 2 max", "2"),
        ];
        for (src, at) in cases {
            let e = err(src);
            assert!(
                matches!(
                    e.typ,
                    ParseErrTyp::StackMismatch {
                        expected: 1,
                        found: 2
                    }
                ),
                "{src}: {e}"
            );
            assert_eq!(e.loc.get(), at, "{src}");
        }
        let e = err("(x) sin");
        assert_eq!(e.loc.get(), "sin");
    }

    #[test]
    fn test_function_arguments_follow_the_name() {
        let e = err("sin");
        assert!(matches!(
            e.typ,
            ParseErrTyp::ArgCount {
                arity: 1,
                found: 0,
                ..
            }
        ));
        let e = err("2 + max");
        assert!(matches!(
            e.typ,
            ParseErrTyp::ArgCount {
                arity: 2,
                found: 0,
                ..
            }
        ));
        assert_eq!(e.loc.get(), "max");
        assert!(matches!(err("max(1 2)").typ, ParseErrTyp::StackMismatch { .. }));
    }

    #[test]
    fn test_group_holds_one_value() {
        let e = err("max((1, 2))");
        assert!(matches!(
            e.typ,
            ParseErrTyp::StackMismatch {
                expected: 1,
                found: 2
            }
        ));
        assert_eq!(e.loc.get(), "2");
        assert!(matches!(
            err("()").typ,
            ParseErrTyp::StackMismatch { found: 0, .. }
        ));
        assert!(matches!(
            err("(x, 1) + 2").typ,
            ParseErrTyp::StackMismatch { found: 2, .. }
        ));
        assert_eq!(tree("((x))").unwrap(), "x");
    }

    #[test]
    fn test_paren_mismatch() {
        assert!(matches!(err("(x + 1").typ, ParseErrTyp::ParenMismatch));
        assert!(matches!(err("x + 1)").typ, ParseErrTyp::ParenMismatch));
    }

    #[test]
    fn test_empty_and_bad_numbers() {
        assert!(matches!(err("").typ, ParseErrTyp::Empty));
        assert!(matches!(err("   ").typ, ParseErrTyp::Empty));
        assert!(matches!(err("1.2.3").typ, ParseErrTyp::ParseNum(_)));
    }

    #[test]
    fn test_lex_errors_surface() {
        let e = err("x = 1");
        assert!(matches!(
            e.typ,
            ParseErrTyp::LexErr(LexErrTyp::Reserved(Reserved::Equals))
        ));
        assert_eq!(e.loc.start(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}x", "-".repeat(MAX_DEPTH + 10));
        assert!(matches!(err(&deep).typ, ParseErrTyp::TooDeep));
        let shallow = format!("{}x", "-".repeat(MAX_DEPTH - 1));
        assert!(tree(&shallow).is_ok());
    }

    #[test]
    fn test_compile_binds_x() {
        let mut f = compile(&Arc::new(String::from("x * x")), stdlib::standard_idents())
            .expect("compiles");
        assert_eq!(f.eval(3.0).unwrap(), 9.0);
        assert_eq!(f.src().as_str(), "x * x");
    }
}
