use crate::action::{Action, Actions};
use crate::edn::Edn;
use crate::errors::{LoadError, Spanned};
use crate::logic::{InvalidBinding, Logic, Term};
use crate::Sym;

/// Grounds action templates of a problem from the arguments written in a plan.
pub struct ActionInstantiator<'a, L: Logic> {
    logic: &'a L,
    actions: &'a Actions<L>,
}

impl<'a, L: Logic> ActionInstantiator<'a, L> {
    pub fn new(logic: &'a L, actions: &'a Actions<L>) -> Self {
        ActionInstantiator { logic, actions }
    }

    /// Binds the open variables of `template`, in order, to the ground values read from `values`.
    pub fn instantiate(&self, template: &Action<L>, values: &[Edn]) -> Result<Action<L>, LoadError> {
        let formula_error = |cause| LoadError::FormulaParse {
            tokens: values.to_vec(),
            cause,
        };
        let mut parsed = Vec::with_capacity(values.len());
        for token in values {
            match self.logic.read_term(token).map_err(formula_error)? {
                Term::Value(v) if self.logic.is_ground(&v) => parsed.push(v),
                _ => return Err(formula_error(token.invalid("expected a ground value"))),
            }
        }
        let expected = template.open_variables().len();
        if parsed.len() != expected {
            return Err(LoadError::ArityMismatch {
                action: template.name().clone(),
                expected,
                actual: parsed.len(),
            });
        }
        if expected == 0 {
            return Ok(template.clone());
        }
        let binding = template.bind(parsed).map_err(|err| match err {
            InvalidBinding::DifferentLength { expected, actual } => LoadError::ArityMismatch {
                action: template.name().clone(),
                expected,
                actual,
            },
            cause => LoadError::Binding {
                action: template.name().clone(),
                cause,
            },
        })?;
        Ok(template.instantiate(self.logic, &binding))
    }

    /// Reads a plan entry: either the bare name of an action without parameters (`wait`)
    /// or an action name followed by its arguments (`(move a b)`).
    pub fn read_instantiated_action(&self, spec: &Edn) -> Result<Action<L>, LoadError> {
        let malformed = |reason: &str| LoadError::MalformedPlan {
            spec: spec.clone(),
            reason: reason.to_string(),
        };
        let (name, values) = match spec {
            Edn::Atom(name) | Edn::Str(name) => (name, &[] as &[Edn]),
            Edn::Seq(seq) => {
                let (head, values) = seq
                    .items()
                    .split_first()
                    .ok_or_else(|| malformed("expected an action name"))?;
                let name = head.as_name().ok_or_else(|| malformed("expected an action name"))?;
                (name, values)
            }
            _ => return Err(malformed("expected an action name or a list")),
        };
        let template = self
            .actions
            .get(name.as_str())
            .ok_or_else(|| LoadError::UnknownAction { name: name.clone() })?;
        self.instantiate(template, values).map_err(|err| at_usage(err, name))
    }

    /// Reads a sequence of plan entries. Any entry failing fails the plan.
    pub fn read_plan(&self, spec: &Edn) -> Result<Vec<Action<L>>, LoadError> {
        let entries = spec.as_seq().ok_or_else(|| LoadError::MalformedPlan {
            spec: spec.clone(),
            reason: "expected a sequence of actions".to_string(),
        })?;
        entries.iter().map(|e| self.read_instantiated_action(e)).collect()
    }
}

/// Points an arity error at the place the action is used rather than at its definition.
fn at_usage(err: LoadError, usage: &Sym) -> LoadError {
    match err {
        LoadError::ArityMismatch { expected, actual, .. } => LoadError::ArityMismatch {
            action: usage.clone(),
            expected,
            actual,
        },
        e => e,
    }
}
