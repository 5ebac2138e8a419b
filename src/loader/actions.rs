use itertools::Itertools;

use crate::action::Action;
use crate::edn::Edn;
use crate::errors::LoadError;
use crate::loader::formulas::FormulaSetReader;
use crate::logic::{Logic, Term};
use crate::state::FormulaSet;

/// Head of an action template definition.
pub const ACTION_DEFINER: &str = "define-action";

const PRECONDITIONS: &str = ":preconditions";
const ADDITIONS: &str = ":additions";
const DELETIONS: &str = ":deletions";

/// Reads action templates of the form
/// `(define-action NAME [?v1 ?v2 ...] {:preconditions [...] :additions [...] :deletions [...]})`.
pub struct ActionSchemaReader<'l, L: Logic> {
    logic: &'l L,
}

impl<'l, L: Logic> ActionSchemaReader<'l, L> {
    pub fn new(logic: &'l L) -> Self {
        ActionSchemaReader { logic }
    }

    pub fn read(&self, spec: &Edn) -> Result<Action<L>, LoadError> {
        let malformed = |reason: &str| LoadError::MalformedAction {
            spec: spec.clone(),
            reason: reason.to_string(),
        };
        let [definer, name, variables, properties] = spec
            .as_seq()
            .ok_or_else(|| malformed("expected a list"))?
        else {
            return Err(malformed("expected `(define-action NAME [VARIABLES] {PROPERTIES})`"));
        };
        if !definer.is_atom(ACTION_DEFINER) {
            return Err(malformed("expected the `define-action` marker"));
        }
        let name = name.as_name().ok_or_else(|| malformed("expected an action name"))?;

        let variables = variables
            .as_seq()
            .ok_or_else(|| malformed("expected a sequence of variables"))?;
        let mut parameters = Vec::with_capacity(variables.len());
        for token in variables {
            let term = self.logic.read_term(token).map_err(|cause| LoadError::FormulaParse {
                tokens: variables.to_vec(),
                cause,
            })?;
            match term {
                Term::Variable(v) if parameters.contains(&v) => {
                    return Err(malformed(&format!("variable {v} appears twice in the parameters")));
                }
                Term::Variable(v) => parameters.push(v),
                Term::Value(_) => {
                    return Err(LoadError::VariableType {
                        action: name.clone(),
                        token: token.clone(),
                    });
                }
            }
        }

        let properties = properties
            .as_map()
            .ok_or_else(|| malformed("expected a map of properties"))?;
        if let Some((key, _)) = properties
            .entries()
            .iter()
            .find(|(k, _)| !k.as_keyword().is_some_and(|k| [PRECONDITIONS, ADDITIONS, DELETIONS].contains(&k.as_str())))
        {
            return Err(malformed(&format!("unsupported property `{key}`")));
        }
        let formulas = FormulaSetReader::new(self.logic);
        let read_property = |key: &str| -> Result<FormulaSet<L>, LoadError> {
            match properties.get(key) {
                None => Ok(FormulaSet::<L>::default()),
                Some(value) => {
                    let tokens = value
                        .as_seq()
                        .ok_or_else(|| malformed(&format!("`{key}` must be a sequence of formulas")))?;
                    formulas.read(tokens)
                }
            }
        };
        let preconditions = read_property(PRECONDITIONS)?;
        let additions = read_property(ADDITIONS)?;
        let deletions = read_property(DELETIONS)?;

        Ok(Action::template(name.clone(), parameters, preconditions, additions, deletions))
    }

    /// Reads all action templates. If any of them is invalid, all failures are reported together
    /// and no action is returned.
    pub fn read_all(&self, specs: &[Edn]) -> Result<Vec<Action<L>>, LoadError> {
        let (actions, failures): (Vec<_>, Vec<_>) = specs
            .iter()
            .map(|spec| self.read(spec).map_err(|e| (spec.clone(), e)))
            .partition_result();
        if failures.is_empty() {
            Ok(actions)
        } else {
            Err(LoadError::ActionSetParse { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edn::reader::{read_all, read_one};
    use crate::logic::Fol;
    use crate::logic::fol::{FolTerm, Formula, Var};

    fn read(s: &str) -> Result<Action, LoadError> {
        ActionSchemaReader::new(&Fol).read(&read_one(s).unwrap())
    }

    const MOVE: &str = "(define-action move [?x ?y]
        {:preconditions [(clear ?x)] :additions [(on ?x ?y)] :deletions [(on ?x table)]})";

    #[test]
    fn reads_template() {
        let action = read(MOVE).unwrap();
        assert_eq!(action.name(), "move");
        assert_eq!(action.open_variables(), &[Var::new("?x"), Var::new("?y")]);
        let x = FolTerm::Var(Var::new("?x"));
        assert!(action.preconditions().contains(&Formula::pred("clear", [x.clone()])));
        assert!(action.deletions().contains(&Formula::pred("on", [x, FolTerm::constant("table")])));
    }

    #[test]
    fn missing_properties_are_empty() {
        let action = read("(define-action wait [] {})").unwrap();
        assert!(action.is_grounded());
        assert!(action.preconditions().is_empty() && action.additions().is_empty() && action.deletions().is_empty());
    }

    #[test]
    fn malformed_definitions() {
        for bad in [
            "(defun move [?x] {})",
            "(define-action move [?x])",
            "(define-action move [?x] {} extra)",
            "(define-action (move) [?x] {})",
            "(define-action move ?x {})",
            "(define-action move [?x ?x] {})",
            "(define-action move [?x] [])",
            "(define-action move [?x] {:effects []})",
            "(define-action move [?x] {:additions on})",
            "move",
        ] {
            assert!(
                matches!(read(bad), Err(LoadError::MalformedAction { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn parameters_must_be_variables() {
        assert!(matches!(
            read("(define-action move [?x b] {})"),
            Err(LoadError::VariableType { action, token }) if action == "move" && token.is_atom("b")
        ));
        assert!(matches!(
            read("(define-action move [?x ()] {})"),
            Err(LoadError::FormulaParse { .. })
        ));
    }

    #[test]
    fn invalid_formula_fails_the_action() {
        assert!(matches!(
            read("(define-action move [?x] {:preconditions [(clear ?x) ()]})"),
            Err(LoadError::FormulaParse { .. })
        ));
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let specs = read_all(&format!("{MOVE} (define-action wait [] {{}}) (define-action bad [a] {{}}) (oops)")).unwrap();
        let reader = ActionSchemaReader::new(&Fol);
        match reader.read_all(&specs) {
            Err(LoadError::ActionSetParse { failures }) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].0, specs[2]);
                assert_eq!(failures[1].0, specs[3]);
            }
            other => panic!("expected an action set error, got {other:?}"),
        }
        assert_eq!(reader.read_all(&specs[..2]).unwrap().len(), 2);
    }
}
