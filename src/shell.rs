// SPDX: CC0-1.0

use crate::{
    app::{Key, SubmitErr},
    eval::{EvalErr, EvalErrTyp, Expr, Ident, Idents},
    lex::{LexErrTyp, Reserved, SubStr},
    parse::{ParseErr, ParseErrTyp},
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The viewer key that pans this way.
    pub const fn key(self) -> Key {
        match self {
            Self::Up => Key::Up,
            Self::Down => Key::Down,
            Self::Left => Key::Left,
            Self::Right => Key::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetWin,
    Pan(Direction),
    Back,
    PrintTree,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetWin,
            Self::Pan(Direction::Up),
            Self::Pan(Direction::Down),
            Self::Pan(Direction::Left),
            Self::Pan(Direction::Right),
            Self::Back,
            Self::PrintTree,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetWin => "set window parameters",
            Self::Pan(Direction::Up) => "pan up (also 'k' or the up arrow)",
            Self::Pan(Direction::Down) => "pan down (also 'j' or the down arrow)",
            Self::Pan(Direction::Left) => "pan left (also 'h' or the left arrow)",
            Self::Pan(Direction::Right) => "pan right (also 'l' or the right arrow)",
            Self::Back => "go back to editing the function",
            Self::PrintTree => "print the parsed expression (for debugging)",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetWin => "window",
            Self::Pan(Direction::Up) => "up",
            Self::Pan(Direction::Down) => "down",
            Self::Pan(Direction::Left) => "left",
            Self::Pan(Direction::Right) => "right",
            Self::Back => "back",
            Self::PrintTree => "tree",
        }
    }

    /// Other spellings, including what a terminal sends for arrow keys
    /// (after lowercasing).
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Pan(Direction::Up) => &["k", "\x1b[a"],
            Self::Pan(Direction::Down) => &["j", "\x1b[b"],
            Self::Pan(Direction::Right) => &["l", "\x1b[c"],
            Self::Pan(Direction::Left) => &["h", "\x1b[d"],
            Self::Back => &["\x1b"],
            _ => &[],
        }
    }

    /// Commands that make sense while the function is still being typed.
    pub const fn on_input_screen(&self) -> bool {
        matches!(self, Self::Help | Self::Quit | Self::SetWin)
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() || c.aliases().contains(&s) {
                return Ok(*c);
            }
        }
        Err(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.src()[..span.start()].chars().count()),
        "^".repeat(span.get().chars().count().max(1))
    )?;
    Ok(())
}

pub fn dump_tree<W: Write>(
    mut out: W,
    expr: &Expr,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    fn inner<W: Write>(out: &mut W, expr: &Expr, depth: usize) -> io::Result<()> {
        writeln!(out, "{}{expr}", "  ".repeat(depth))?;
        for arg in expr.args() {
            inner(out, arg, depth + 1)?;
        }
        Ok(())
    }

    writeln!(out, "{title}: ")?;
    inner(&mut out, expr, 1)
}

/// Name in `idents` most similar to `text`, if any is close enough to be
/// worth suggesting.
pub fn similar_ident<'a>(idents: &'a Idents, text: &str) -> Option<(&'a str, &'a Ident)> {
    let text = text.to_ascii_lowercase();
    idents
        .iter()
        .map(|(k, v)| {
            (
                strsim::normalized_damerau_levenshtein(&text, &k.as_str().to_ascii_lowercase()),
                (k.as_str(), v),
            )
        })
        .filter(|(sim, _)| *sim > 0.3)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, kv)| kv)
}

fn parse_notes<W: Write>(mut out: W, err: &ParseErr) -> io::Result<()> {
    match &err.typ {
        ParseErrTyp::LexErr(lex_err) => match lex_err {
            LexErrTyp::InvalidChar => writeln!(
                out,
                "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
            )?,
            LexErrTyp::Reserved(reserved) => match reserved {
                Reserved::Comparison => {
                    writeln!(out, "note: expected an expression but found an inequality")?
                }
                Reserved::Equals => writeln!(
                    out,
                    "note: enter only the right hand side, for example 'x^2' instead of 'y = x^2'"
                )?,
                Reserved::Pipe => writeln!(
                    out,
                    "note: use the 'abs' function to compute absolute value"
                )?,
                Reserved::Bracket => writeln!(out, "note: use '(' and ')' for grouping")?,
            },
        },

        ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,

        ParseErrTyp::StackMismatch { .. } => writeln!(
            out,
            "note: values need an operator between them, so for example '5x' would be '5*x', and function names go before their arguments",
        )?,

        ParseErrTyp::ArgCount { .. } => {
            writeln!(out, "note: separate function arguments with ','")?
        }

        ParseErrTyp::ParenMismatch | ParseErrTyp::Empty | ParseErrTyp::TooDeep => {}
    }
    Ok(())
}

fn eval_notes<W: Write>(mut out: W, err: &EvalErr, idents: &Idents) -> io::Result<()> {
    if err.typ == EvalErrTyp::UndefinedIdent {
        if let Some((key, ident)) = similar_ident(idents, err.loc.get()) {
            let ident_typ = match ident {
                Ident::Var(_) => "variable",
                Ident::Const(_) => "constant",
                Ident::Fun(_) => "function",
            };
            writeln!(out, "note: {ident_typ} '{key}' has a similar name")?;
        }
    }
    Ok(())
}

/// Explains why the input screen rejected the function.
pub fn report_submit_err<W: Write>(
    mut out: W,
    err: &SubmitErr,
    idents: &Idents,
) -> io::Result<()> {
    match err {
        SubmitErr::Empty => writeln!(out, "error: {err}"),
        SubmitErr::Parse(parse_err) => {
            underline(&mut out, &parse_err.loc)?;
            writeln!(out, "parse error: {parse_err}")?;
            parse_notes(&mut out, parse_err)
        }
        SubmitErr::NoValidSamples(cause) => {
            if let Some(eval_err) = cause {
                underline(&mut out, &eval_err.loc)?;
                writeln!(out, "evaluation error: {eval_err}")?;
                eval_notes(&mut out, eval_err, idents)?;
            }
            writeln!(out, "error: {err}")
        }
        SubmitErr::Viewport(_) => {
            writeln!(out, "error: {err}")?;
            writeln!(out, "note: use the 'window' command to fix the bounds")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::SubmitErr, parse, stdlib};

    fn report(src: &str) -> String {
        let idents = stdlib::standard_idents();
        let src = Arc::new(src.to_string());
        let err = match parse::compile(&src, idents.clone()) {
            Ok(mut f) => SubmitErr::NoValidSamples(f.eval(0.0).err()),
            Err(err) => SubmitErr::Parse(err),
        };
        let mut out = Vec::new();
        report_submit_err(&mut out, &err, &idents).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_command_names_and_aliases() {
        assert_eq!("up".parse(), Ok(Command::Pan(Direction::Up)));
        assert_eq!("k".parse(), Ok(Command::Pan(Direction::Up)));
        assert_eq!("\x1b[d".parse(), Ok(Command::Pan(Direction::Left)));
        assert_eq!("tree".parse(), Ok(Command::PrintTree));
        assert_eq!("sin(x)".parse::<Command>(), Err(()));
        for c in Command::exhaustive() {
            assert_eq!(c.name().parse(), Ok(*c));
        }
    }

    #[test]
    fn test_pan_commands_map_to_their_own_key() {
        let pans: Vec<(&str, Key)> = Command::exhaustive()
            .iter()
            .filter_map(|c| match c {
                Command::Pan(dir) => Some((c.name(), dir.key())),
                _ => None,
            })
            .collect();
        assert_eq!(
            pans,
            vec![
                ("up", Key::Up),
                ("down", Key::Down),
                ("left", Key::Left),
                ("right", Key::Right),
            ]
        );
        let mut helps: Vec<&str> = Command::exhaustive().iter().map(Command::help).collect();
        helps.sort_unstable();
        helps.dedup();
        assert_eq!(helps.len(), Command::exhaustive().len());
    }

    #[test]
    fn test_value_after_value_note() {
        let out = report("x sin");
        assert!(out.contains("parse error: expected 1 value but found 2"), "{out}");
        assert!(out.contains("function names go before their arguments"), "{out}");
    }

    #[test]
    fn test_parse_error_is_underlined() {
        let out = report("x + |x|");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "x + |x|");
        assert_eq!(lines[1], "    ^");
        assert_eq!(lines[2], "parse error: unsupported character");
        assert!(lines[3].contains("'abs'"));
    }

    #[test]
    fn test_undefined_identifier_suggestion() {
        let out = report("2 * sqr");
        assert!(out.contains("evaluation error: undefined identifier 'sqr'"), "{out}");
        assert!(out.contains("note: function 'sqrt' has a similar name"), "{out}");
    }

    #[test]
    fn test_no_suggestion_for_unrelated_name() {
        let idents = stdlib::standard_idents();
        assert!(similar_ident(&idents, "qqqqqqqqqq").is_none());
    }

    #[test]
    fn test_dump_tree() {
        let f = parse::compile(&Arc::new(String::from("1 + sin(x)")), stdlib::standard_idents())
            .unwrap();
        let mut out = Vec::new();
        dump_tree(&mut out, f.expr(), format_args!("tree")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "tree: \n  add\n    1\n    sin\n      x\n"
        );
    }
}
