//! Interface to the logic in which facts, preconditions and effects are written.
//!
//! The loader never looks inside formulas or terms: it only asks the logic to read them, to tell
//! variables from values and to substitute variables. Equality and hashing of formulas are those
//! of the logic's own types.

mod binding;
pub mod fol;

pub use binding::*;
pub use fol::Fol;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use derivative::Derivative;

use crate::edn::Edn;
use crate::errors::Message;

/// Capabilities required from a logic to load planning problems written in it.
pub trait Logic: Sized {
    type Formula: Clone + Eq + Hash + Debug + Display;
    /// A term that may be bound to a variable.
    type Value: Clone + Eq + Hash + Debug + Display;
    type Variable: Clone + Eq + Hash + Debug + Display;

    fn read_formula(&self, expr: &Edn) -> Result<Self::Formula, Message>;

    /// Reads a term, telling apart (open) variables from values.
    fn read_term(&self, expr: &Edn) -> Result<Term<Self>, Message>;

    /// True if the value does not mention any variable.
    fn is_ground(&self, value: &Self::Value) -> bool;

    /// Replaces in `formula` every free occurrence of a variable bound in `binding` by its value.
    fn substitute(&self, formula: &Self::Formula, binding: &Binding<Self>) -> Self::Formula;
}

/// A term as read by a [`Logic`]: either a value or an open variable.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub enum Term<L: Logic> {
    Value(L::Value),
    Variable(L::Variable),
}

impl<L: Logic> Term<L> {
    pub fn into_variable(self) -> Option<L::Variable> {
        match self {
            Term::Variable(v) => Some(v),
            Term::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<L::Value> {
        match self {
            Term::Value(v) => Some(v),
            Term::Variable(_) => None,
        }
    }
}

impl<L: Logic> Display for Term<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Value(v) => write!(f, "{v}"),
            Term::Variable(v) => write!(f, "{v}"),
        }
    }
}
