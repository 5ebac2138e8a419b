use std::fmt::Display;

use derivative::Derivative;

use crate::logic::{Fol, Logic};
use crate::utils::disp_sorted;

/// Set of formulas, in no particular order.
pub type FormulaSet<L = Fol> = hashbrown::HashSet<<L as Logic>::Formula>;

/// Facts holding at some point in time (e.g. the initial state or the goal of a problem).
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub struct State<L: Logic = Fol> {
    facts: FormulaSet<L>,
}

impl<L: Logic> State<L> {
    pub fn initialize_with(facts: FormulaSet<L>) -> Self {
        State { facts }
    }

    pub fn facts(&self) -> &FormulaSet<L> {
        &self.facts
    }

    pub fn contains(&self, fact: &L::Formula) -> bool {
        self.facts.contains(fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &L::Formula> + '_ {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<L: Logic> Display for State<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        disp_sorted(f, self.facts.iter(), ", ")?;
        write!(f, "}}")
    }
}
