use crate::errors::{Span, Spanned};
use std::{
    borrow::Cow,
    fmt::{Debug, Display},
};

/// Symbol read from a problem description (action name, predicate, constant, keyword, ...),
/// possibly annotated with the place it was read from.
///
/// Equality, ordering and hashing only consider the symbol itself, never its origin: the same
/// name read at two different places denotes the same symbol.
#[derive(Clone)]
pub struct Sym {
    /// The underlying type uses small string optimization to avoid heap allocation for short identifiers
    symbol: compact_str::CompactString,
    /// Origin of the symbol, used to point at it in error messages.
    pub span: Option<Span>,
}

impl Sym {
    pub fn new<'a>(s: impl Into<Cow<'a, str>>) -> Sym {
        Sym {
            symbol: s.into().into(),
            span: None,
        }
    }

    pub fn with_source<'a>(s: impl Into<Cow<'a, str>>, source: Span) -> Sym {
        Sym {
            symbol: s.into().into(),
            span: Some(source),
        }
    }

    pub fn as_str(&self) -> &str {
        self.symbol.as_str()
    }

    /// The symbol without its source annotation.
    pub fn detached(&self) -> Sym {
        Sym {
            symbol: self.symbol.clone(),
            span: None,
        }
    }
}

impl AsRef<str> for Sym {
    fn as_ref(&self) -> &str {
        &self.symbol
    }
}

impl std::borrow::Borrow<str> for Sym {
    fn borrow(&self) -> &str {
        &self.symbol
    }
}

impl From<&str> for Sym {
    fn from(value: &str) -> Self {
        Sym::new(value)
    }
}

impl From<String> for Sym {
    fn from(value: String) -> Self {
        Sym::new(value)
    }
}

impl From<&Sym> for Sym {
    fn from(value: &Sym) -> Self {
        value.clone()
    }
}

impl Spanned for Sym {
    fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }
}

impl Spanned for &Sym {
    fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }
}

impl Debug for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
impl Display for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl PartialEq for Sym {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl PartialEq<str> for Sym {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}
impl PartialEq<&str> for Sym {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
impl PartialEq<Sym> for str {
    fn eq(&self, other: &Sym) -> bool {
        self == other.as_str()
    }
}

impl Eq for Sym {}

impl PartialOrd for Sym {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Sym {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl std::hash::Hash for Sym {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state)
    }
}
