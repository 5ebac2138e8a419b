//! Reading of problem descriptions written in (a subset of) the extensible data notation.
//!
//! A description is a stream of top-level values, typically one map per planning problem:
//!
//! ```text
//! {:name  "block-world"
//!  :start [(on a table)]
//!  :goal  [(on a b)]
//!  :actions [(define-action move [?x ?y]
//!              {:preconditions [(clear ?x)] :additions [(on ?x ?y)] :deletions [(on ?x table)]})]}
//! ```
//!
//! Lists `(...)` and vectors `[...]` are both read as sequences. Values keep track of where they
//! were read so that errors can point back at the input.

pub mod input;
pub mod reader;

pub use reader::EdnReader;

use crate::errors::{Span, Spanned};
use crate::Sym;
use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};

/// Kind of brackets enclosing a sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Delimiter {
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Bracket,
}

/// A value read from the input.
#[derive(Clone, PartialEq)]
pub enum Edn {
    /// Symbol, number or any other bare token (e.g. `move`, `?x`, `42`)
    Atom(Sym),
    /// A keyword such as `:name`, the leading colon is part of the symbol.
    Keyword(Sym),
    /// A string literal, with escape sequences resolved.
    Str(Sym),
    Seq(EdnSeq),
    Map(EdnMap),
}

#[derive(Clone)]
pub struct EdnSeq {
    pub delimiter: Delimiter,
    items: Vec<Edn>,
    span: Span,
}

impl EdnSeq {
    pub(crate) fn new(delimiter: Delimiter, items: Vec<Edn>, span: Span) -> Self {
        EdnSeq { delimiter, items, span }
    }

    pub fn items(&self) -> &[Edn] {
        &self.items
    }
}

/// Equality ignores the origin of the sequence.
impl PartialEq for EdnSeq {
    fn eq(&self, other: &Self) -> bool {
        self.delimiter == other.delimiter && self.items == other.items
    }
}

/// A map, with its entries in the order in which they appear in the input.
#[derive(Clone)]
pub struct EdnMap {
    entries: Vec<(Edn, Edn)>,
    span: Span,
}

impl EdnMap {
    pub(crate) fn new(entries: Vec<(Edn, Edn)>, span: Span) -> Self {
        EdnMap { entries, span }
    }

    pub fn entries(&self) -> &[(Edn, Edn)] {
        &self.entries
    }

    /// Returns the value associated to the keyword `key` (e.g. `":name"`).
    /// Keys of a map read from the input are unique.
    pub fn get(&self, key: &str) -> Option<&Edn> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_keyword().is_some_and(|k| k == key))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for EdnMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Edn {
    pub fn as_atom(&self) -> Option<&Sym> {
        match self {
            Edn::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_atom(&self, expected: &str) -> bool {
        self.as_atom().is_some_and(|a| a == expected)
    }

    pub fn as_keyword(&self) -> Option<&Sym> {
        match self {
            Edn::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&Sym> {
        match self {
            Edn::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Atom or string, the two ways of writing a name.
    pub fn as_name(&self) -> Option<&Sym> {
        match self {
            Edn::Atom(s) | Edn::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    pub fn as_seq(&self) -> Option<&[Edn]> {
        match self {
            Edn::Seq(s) => Some(s.items()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&EdnMap> {
        match self {
            Edn::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl Spanned for Edn {
    fn span(&self) -> Option<&Span> {
        match self {
            Edn::Atom(s) | Edn::Keyword(s) | Edn::Str(s) => s.span.as_ref(),
            Edn::Seq(s) => Some(&s.span),
            Edn::Map(m) => Some(&m.span),
        }
    }
}

impl Spanned for &Edn {
    fn span(&self) -> Option<&Span> {
        (*self).span()
    }
}

impl Display for Edn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Edn::Atom(s) | Edn::Keyword(s) => write!(f, "{s}"),
            Edn::Str(s) => write!(f, "{:?}", s.as_str()),
            Edn::Seq(s) => match s.delimiter {
                Delimiter::Paren => write!(f, "({})", s.items.iter().format(" ")),
                Delimiter::Bracket => write!(f, "[{}]", s.items.iter().format(" ")),
            },
            Edn::Map(m) => write!(
                f,
                "{{{}}}",
                m.entries.iter().format_with(", ", |(k, v), f| f(&format_args!("{k} {v}")))
            ),
        }
    }
}

impl Debug for Edn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
