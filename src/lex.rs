// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, ops::Range, str::CharIndices};
use std::sync::Arc;

/// Byte range into a shared source string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    src: Arc<String>,
    range: Range<usize>,
}

impl SubStr {
    #[inline]
    pub fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self {
            src,
            range: start..start + len,
        }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let range = 0..src.len();
        Self { src, range }
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn get(&self) -> &str {
        &self.src[self.range.clone()]
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,
}

impl TokTyp {
    /// Whether a `-` following this token has no left operand.
    const fn expects_operand(prev: Option<Self>) -> bool {
        matches!(
            prev,
            None | Some(Self::Op(_) | Self::Comma | Self::OpenParen)
        )
    }
}

/// Characters from ordinary math notation that expressions may not use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reserved {
    Comparison,
    Equals,
    Pipe,
    Bracket,
}

impl Reserved {
    const fn from_char(chr: char) -> Option<Self> {
        match chr {
            '<' | '>' => Some(Self::Comparison),
            '=' => Some(Self::Equals),
            '|' => Some(Self::Pipe),
            '[' | ']' | '{' | '}' => Some(Self::Bracket),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Reserved(Reserved),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidChar => "invalid character",
            Self::Reserved(_) => "unsupported character",
        };
        f.write_str(msg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

fn is_numeric(chr: char) -> bool {
    chr.is_ascii_digit() || chr == '.'
}

/// Splits a source string into tokens, stopping at the first error.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    chars: Peekable<CharIndices<'src>>,
    prev: Option<TokTyp>,
    failed: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            prev: None,
            failed: false,
        }
    }

    pub fn src(&self) -> &Arc<String> {
        self.src
    }

    fn span(&self, range: Range<usize>) -> SubStr {
        SubStr::new(Arc::clone(self.src), range.start, range.len())
    }

    /// Byte offset of the next unread character.
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(idx, _)| idx)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, chr)| chr.is_whitespace()).is_some() {}
    }

    /// Consumes characters while `accept` holds and returns the offset it
    /// stopped at.
    fn run(&mut self, accept: impl Fn(char) -> bool) -> usize {
        while self.chars.next_if(|&(_, chr)| accept(chr)).is_some() {}
        self.offset()
    }

    fn symbol(&self, chr: char) -> Option<TokTyp> {
        let typ = match chr {
            '+' => TokTyp::Op(OperatorTyp::Add),
            '-' if TokTyp::expects_operand(self.prev) => TokTyp::Op(OperatorTyp::Neg),
            '-' => TokTyp::Op(OperatorTyp::Sub),
            '*' => TokTyp::Op(OperatorTyp::Mul),
            '/' => TokTyp::Op(OperatorTyp::Div),
            '^' => TokTyp::Op(OperatorTyp::Pow),
            ',' => TokTyp::Comma,
            '(' => TokTyp::OpenParen,
            ')' => TokTyp::CloseParen,
            _ => return None,
        };
        Some(typ)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();

        let (start, chr) = self.chars.next()?;
        let (typ, end) = if let Some(typ) = self.symbol(chr) {
            (typ, start + chr.len_utf8())
        } else if chr.is_ascii_alphabetic() {
            (TokTyp::Ident, self.run(|chr| chr.is_ascii_alphanumeric()))
        } else if is_numeric(chr) {
            (TokTyp::Number, self.run(is_numeric))
        } else {
            self.failed = true;
            let typ = Reserved::from_char(chr).map_or(LexErrTyp::InvalidChar, LexErrTyp::Reserved);
            return Some(Err(LexErr {
                typ,
                loc: self.span(start..start + chr.len_utf8()),
            }));
        };

        self.prev = Some(typ);
        Some(Ok(Tok {
            typ,
            loc: self.span(start..end),
        }))
    }
}
