use std::collections::BTreeMap;
use std::fmt::Display;

use derivative::Derivative;
use itertools::Itertools;

use crate::action::{Action, Actions};
use crate::errors::LoadError;
use crate::logic::{Fol, Logic};
use crate::state::{FormulaSet, State};
use crate::utils::disp_sorted;
use crate::Sym;

/// A planning problem: background knowledge, initial state, goal and the action templates available
/// to go from one to the other, possibly accompanied by known solutions.
///
/// Problems are immutable once built. The action index is built together with the problem and
/// always holds exactly one entry per action.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub struct PlanningProblem<L: Logic = Fol> {
    name: String,
    background: FormulaSet<L>,
    start: State<L>,
    goal: State<L>,
    actions: Actions<L>,
    expected_action_sequences: Option<Vec<Vec<Action<L>>>>,
}

impl<L: Logic> PlanningProblem<L> {
    /// Creates a problem without reference plans, failing if two actions share the same name.
    pub fn new(
        name: impl Into<String>,
        background: FormulaSet<L>,
        start: State<L>,
        goal: State<L>,
        actions: impl IntoIterator<Item = Action<L>>,
    ) -> Result<Self, LoadError> {
        Ok(Self::from_index(name, background, start, goal, Actions::from_actions(actions)?))
    }

    pub fn from_index(
        name: impl Into<String>,
        background: FormulaSet<L>,
        start: State<L>,
        goal: State<L>,
        actions: Actions<L>,
    ) -> Self {
        PlanningProblem {
            name: name.into(),
            background,
            start,
            goal,
            actions,
            expected_action_sequences: None,
        }
    }

    /// Attaches known solutions to the problem. Plans are a set: a sequence equal to a previous
    /// one is only kept once.
    pub fn with_expected_plans(mut self, plans: impl IntoIterator<Item = Vec<Action<L>>>) -> Self {
        let mut unique: Vec<Vec<Action<L>>> = Vec::new();
        for plan in plans {
            if !unique.contains(&plan) {
                unique.push(plan);
            }
        }
        self.expected_action_sequences = Some(unique);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background(&self) -> &FormulaSet<L> {
        &self.background
    }

    pub fn start(&self) -> &State<L> {
        &self.start
    }

    pub fn goal(&self) -> &State<L> {
        &self.goal
    }

    /// Action templates, sorted by name.
    pub fn actions(&self) -> impl Iterator<Item = &Action<L>> + '_ {
        self.actions.iter()
    }

    pub fn action(&self, name: &str) -> Option<&Action<L>> {
        self.actions.get(name)
    }

    pub fn action_index(&self) -> &Actions<L> {
        &self.actions
    }

    pub fn action_map(&self) -> &BTreeMap<Sym, Action<L>> {
        self.actions.as_map()
    }

    /// Known solutions of the problem, `None` if the description did not provide any.
    pub fn expected_action_sequences(&self) -> Option<&[Vec<Action<L>>]> {
        self.expected_action_sequences.as_deref()
    }
}

impl<L: Logic> Display for PlanningProblem<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "# Problem: {}", self.name)?;
        write!(f, "\n# Background\n  {{")?;
        disp_sorted(f, self.background.iter(), ", ")?;
        write!(f, "}}")?;
        write!(f, "\n# Start\n  {}", self.start)?;
        write!(f, "\n# Goal\n  {}", self.goal)?;
        write!(f, "\n# Actions")?;
        for a in self.actions.iter() {
            let details = a.details().to_string();
            write!(f, "\n  {}", details.replace('\n', "\n  "))?;
        }
        if let Some(plans) = &self.expected_action_sequences {
            write!(f, "\n# Expected plans")?;
            for plan in plans {
                write!(f, "\n  [{}]", plan.iter().format(" "))?;
            }
        }
        Ok(())
    }
}
