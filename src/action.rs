use std::collections::BTreeMap;
use std::fmt::Display;

use derivative::Derivative;
use itertools::Itertools;

use crate::errors::LoadError;
use crate::logic::{Binding, Fol, InvalidBinding, Logic};
use crate::state::FormulaSet;
use crate::utils::{Fmt, disp_sorted};
use crate::Sym;

/// A STRIPS action.
///
/// An action is a *template* as long as it has open variables (its parameters), which are
/// replaced by values when the action is instantiated. A *grounded* action has no open variable
/// and records the values it was instantiated with in [`Action::arguments`]. An action without
/// parameters is both a template and its only grounding.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub struct Action<L: Logic = Fol> {
    name: Sym,
    /// Open variables, in the order in which they are bound on instantiation.
    parameters: Vec<L::Variable>,
    arguments: Vec<L::Value>,
    preconditions: FormulaSet<L>,
    additions: FormulaSet<L>,
    deletions: FormulaSet<L>,
}

impl<L: Logic> Action<L> {
    pub fn template(
        name: impl Into<Sym>,
        parameters: Vec<L::Variable>,
        preconditions: FormulaSet<L>,
        additions: FormulaSet<L>,
        deletions: FormulaSet<L>,
    ) -> Self {
        Action {
            name: name.into(),
            parameters,
            arguments: Vec::new(),
            preconditions,
            additions,
            deletions,
        }
    }

    pub fn name(&self) -> &Sym {
        &self.name
    }

    pub fn open_variables(&self) -> &[L::Variable] {
        &self.parameters
    }

    /// Values that were bound to the parameters of the template this action was instantiated from.
    pub fn arguments(&self) -> &[L::Value] {
        &self.arguments
    }

    pub fn is_grounded(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn preconditions(&self) -> &FormulaSet<L> {
        &self.preconditions
    }

    pub fn additions(&self) -> &FormulaSet<L> {
        &self.additions
    }

    pub fn deletions(&self) -> &FormulaSet<L> {
        &self.deletions
    }

    /// Positional binding of the open variables to `values`.
    pub fn bind(&self, values: impl IntoIterator<Item = L::Value>) -> Result<Binding<L>, InvalidBinding> {
        Binding::new(&self.parameters, values)
    }

    /// Replaces the variables of `binding` throughout preconditions, additions and deletions.
    /// Parameters not bound by `binding` remain open.
    pub fn instantiate(&self, logic: &L, binding: &Binding<L>) -> Action<L> {
        let sub = |set: &FormulaSet<L>| -> FormulaSet<L> { set.iter().map(|f| logic.substitute(f, binding)).collect() };
        let mut arguments = self.arguments.clone();
        let mut parameters = Vec::with_capacity(self.parameters.len());
        for param in &self.parameters {
            match binding.get(param) {
                Some(value) => arguments.push(value.clone()),
                None => parameters.push(param.clone()),
            }
        }
        Action {
            name: self.name.clone(),
            parameters,
            arguments,
            preconditions: sub(&self.preconditions),
            additions: sub(&self.additions),
            deletions: sub(&self.deletions),
        }
    }

    /// Multi-line description of the action, including its preconditions and effects.
    pub fn details(&self) -> impl Display + '_ {
        Fmt(move |f: &mut std::fmt::Formatter| {
            write!(f, "{self}")?;
            for (label, set) in [
                ("preconditions", &self.preconditions),
                ("additions", &self.additions),
                ("deletions", &self.deletions),
            ] {
                write!(f, "\n  {label}: {{")?;
                disp_sorted(f, set.iter(), ", ")?;
                write!(f, "}}")?;
            }
            Ok(())
        })
    }
}

/// Short form of the action: its name followed by its open variables or arguments,
/// e.g., `(move ?x ?y)` or `(move a b)`.
impl<L: Logic> Display for Action<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.parameters.is_empty() && self.arguments.is_empty() {
            return write!(f, "({})", self.name);
        }
        write!(
            f,
            "({} {})",
            self.name,
            self.arguments
                .iter()
                .map(|a| a.to_string())
                .chain(self.parameters.iter().map(|p| p.to_string()))
                .format(" ")
        )
    }
}

/// Actions of a problem, indexed by name.
#[derive(Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    Default(bound = "")
)]
pub struct Actions<L: Logic = Fol> {
    actions: BTreeMap<Sym, Action<L>>,
}

impl<L: Logic> Actions<L> {
    /// Builds the index, failing if two actions share a name.
    pub fn from_actions(actions: impl IntoIterator<Item = Action<L>>) -> Result<Self, LoadError> {
        let mut index = Actions::default();
        for action in actions {
            index.add(action)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, action: Action<L>) -> Result<(), LoadError> {
        if let Some(prev) = self.actions.get(&action.name) {
            return Err(LoadError::DuplicateActionName {
                name: action.name,
                previous: prev.name.clone(),
            });
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Action<L>> {
        self.actions.get(name)
    }

    /// Actions, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Action<L>> + '_ {
        self.actions.values()
    }

    pub fn as_map(&self) -> &BTreeMap<Sym, Action<L>> {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fol::{FolTerm, Formula, Var};

    fn set(formulas: impl IntoIterator<Item = Formula>) -> FormulaSet {
        formulas.into_iter().collect()
    }

    fn x() -> FolTerm {
        FolTerm::Var(Var::new("?x"))
    }

    fn pickup() -> Action {
        Action::template(
            "pickup",
            vec![Var::new("?x")],
            set([Formula::pred("clear", [x()])]),
            set([Formula::pred("holding", [x()])]),
            set([Formula::pred("clear", [x()])]),
        )
    }

    #[test]
    fn instantiation_grounds_every_set() {
        let template = pickup();
        assert!(!template.is_grounded());
        let binding = template.bind([FolTerm::constant("a")]).unwrap();
        let grounded = template.instantiate(&Fol, &binding);
        assert!(grounded.is_grounded());
        assert_eq!(grounded.arguments(), &[FolTerm::constant("a")]);
        assert_eq!(grounded.preconditions(), &set([Formula::pred("clear", [FolTerm::constant("a")])]));
        assert_eq!(grounded.additions(), &set([Formula::pred("holding", [FolTerm::constant("a")])]));
        assert_eq!(grounded.to_string(), "(pickup a)");
        assert_eq!(template.to_string(), "(pickup ?x)");
    }

    #[test]
    fn partial_binding_leaves_variables_open() {
        let template: Action = Action::template(
            "move",
            vec![Var::new("?x"), Var::new("?y")],
            set([]),
            set([]),
            set([]),
        );
        let mut binding = Binding::empty();
        binding.add(Var::new("?y"), FolTerm::constant("b")).unwrap();
        let partial = template.instantiate(&Fol, &binding);
        assert_eq!(partial.open_variables(), &[Var::new("?x")]);
        assert!(!partial.is_grounded());
    }

    #[test]
    fn index_rejects_duplicate_names() {
        let res = Actions::from_actions([pickup(), pickup()]);
        assert!(matches!(res, Err(LoadError::DuplicateActionName { name, .. }) if name == "pickup"));
        let index = Actions::from_actions([pickup()]).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get("pickup").is_some());
        assert!(index.get("drop").is_none());
    }

    #[test]
    fn details_lists_effects() {
        let details = pickup().details().to_string();
        assert!(details.starts_with("(pickup ?x)"));
        assert!(details.contains("preconditions: {(clear ?x)}"));
        assert!(details.contains("additions: {(holding ?x)}"));
    }
}
