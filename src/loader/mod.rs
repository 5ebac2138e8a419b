//! Loading of planning problems from their textual description.
//!
//! Each top-level map of the input describes one problem:
//!
//! ```text
//! {:name "block-world"
//!  :background []                        ; optional
//!  :start [(on a table) (clear a) (clear b)]
//!  :goal [(on a b)]
//!  :actions [(define-action move [?x ?y]
//!              {:preconditions [(clear ?x)] :additions [(on ?x ?y)] :deletions [(on ?x table)]})]
//!  :expected-plans [[(move a b)]]}       ; optional
//! ```

pub mod actions;
pub mod formulas;
pub mod instantiate;

pub use actions::ActionSchemaReader;
pub use formulas::FormulaSetReader;
pub use instantiate::ActionInstantiator;

use std::path::Path;
use std::sync::Arc;

use derivative::Derivative;
use thiserror::Error;

use crate::action::{Action, Actions};
use crate::config::{LoaderConfig, PlanFailurePolicy, RecordFailurePolicy};
use crate::edn::input::Input;
use crate::edn::{Edn, EdnReader};
use crate::errors::{LoadError, Message};
use crate::logic::{Fol, Logic};
use crate::problem::PlanningProblem;
use crate::state::{FormulaSet, State};

const NAME: &str = ":name";
const BACKGROUND: &str = ":background";
const START: &str = ":start";
const GOAL: &str = ":goal";
const ACTIONS: &str = ":actions";
const EXPECTED_PLANS: &str = ":expected-plans";

/// Error of a loading call, together with the problems that were loaded before the failing record
/// (always empty with [`RecordFailurePolicy::Atomic`]).
#[derive(Error, Derivative)]
#[derivative(Debug(bound = ""))]
#[error("{error}")]
pub struct LoadFailure<L: Logic = Fol> {
    pub loaded: Vec<PlanningProblem<L>>,
    pub error: LoadError,
}

/// Reads planning problems, one per record of the input, in the order of the input.
pub struct PlanningProblemLoader<L: Logic = Fol> {
    logic: L,
    config: LoaderConfig,
}

impl PlanningProblemLoader<Fol> {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_logic(Fol, config)
    }
}

impl Default for PlanningProblemLoader<Fol> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<L: Logic> PlanningProblemLoader<L> {
    pub fn with_logic(logic: L, config: LoaderConfig) -> Self {
        PlanningProblemLoader { logic, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    pub fn load_str(&self, text: &str) -> Result<Vec<PlanningProblem<L>>, LoadFailure<L>> {
        self.load_input(Input::from_string(text))
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<PlanningProblem<L>>, LoadFailure<L>> {
        let input = Input::from_file(path).map_err(|cause| LoadFailure {
            loaded: Vec::new(),
            error: LoadError::Io {
                path: path.display().to_string(),
                cause: Arc::new(cause),
            },
        })?;
        self.load_input(input)
    }

    pub fn load_input(&self, input: Input) -> Result<Vec<PlanningProblem<L>>, LoadFailure<L>> {
        self.load_records(EdnReader::new(input))
    }

    /// Builds a problem from each record until the end of `records`.
    /// Stops at the first record that cannot be read, see [`RecordFailurePolicy`] for what
    /// happens to the problems loaded before it.
    pub fn load_records(
        &self,
        records: impl IntoIterator<Item = Result<Edn, Message>>,
    ) -> Result<Vec<PlanningProblem<L>>, LoadFailure<L>> {
        let mut loaded = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let _span = tracing::span!(tracing::Level::DEBUG, "record", index).entered();
            let result = match record {
                Ok(record) => self.read_problem(&record).map_err(|e| LoadError::InRecord {
                    index,
                    name: record_name(&record),
                    source: Box::new(e),
                }),
                Err(syntax) => Err(LoadError::InRecord {
                    index,
                    name: None,
                    source: Box::new(syntax.into()),
                }),
            };
            match result {
                Ok(problem) => {
                    tracing::debug!(name = problem.name(), "loaded problem");
                    loaded.push(problem);
                }
                Err(error) => {
                    tracing::debug!(%error, "failed to load record");
                    if self.config.record_failure == RecordFailurePolicy::Atomic {
                        loaded.clear();
                    }
                    return Err(LoadFailure { loaded, error });
                }
            }
        }
        Ok(loaded)
    }

    /// Reads a single problem. Nothing of the record is kept if any of its parts is invalid,
    /// except for reference plans that are dropped under [`PlanFailurePolicy::Drop`].
    pub fn read_problem(&self, record: &Edn) -> Result<PlanningProblem<L>, LoadError> {
        let malformed = |reason: String| LoadError::MalformedRecord {
            record: record.clone(),
            reason,
        };
        let fields = record
            .as_map()
            .ok_or_else(|| malformed("expected a map".to_string()))?;
        let field = |key: &str| fields.get(key).ok_or_else(|| malformed(format!("missing field `{key}`")));

        let name = field(NAME)?
            .as_name()
            .ok_or_else(|| malformed(format!("`{NAME}` must be a symbol or a string")))?;

        let formulas = FormulaSetReader::new(&self.logic);
        let background = match fields.get(BACKGROUND) {
            Some(value) => formulas.read(sequence(record, BACKGROUND, value)?)?,
            None => FormulaSet::<L>::default(),
        };
        let start = State::initialize_with(formulas.read(sequence(record, START, field(START)?)?)?);
        let goal = State::initialize_with(formulas.read(sequence(record, GOAL, field(GOAL)?)?)?);

        let templates = ActionSchemaReader::new(&self.logic).read_all(sequence(record, ACTIONS, field(ACTIONS)?)?)?;
        let actions = Actions::from_actions(templates)?;
        tracing::debug!(
            background = background.len(),
            start = start.len(),
            goal = goal.len(),
            actions = actions.len(),
            "read problem `{name}`"
        );

        let problem = PlanningProblem::from_index(name.as_str(), background, start, goal, actions);
        match fields.get(EXPECTED_PLANS) {
            Some(plans) => {
                let plans = self.read_expected_plans(sequence(record, EXPECTED_PLANS, plans)?, problem.action_index())?;
                Ok(problem.with_expected_plans(plans))
            }
            None => Ok(problem),
        }
    }

    fn read_expected_plans(&self, specs: &[Edn], actions: &Actions<L>) -> Result<Vec<Vec<Action<L>>>, LoadError> {
        let instantiator = ActionInstantiator::new(&self.logic, actions);
        let mut plans = Vec::with_capacity(specs.len());
        for spec in specs {
            match instantiator.read_plan(spec) {
                Ok(plan) => plans.push(plan),
                Err(error) if self.config.plan_failure == PlanFailurePolicy::Drop => {
                    tracing::warn!("Dropping reference plan {spec}: {error}");
                }
                Err(error) => return Err(error),
            }
        }
        tracing::debug!(plans = plans.len(), dropped = specs.len() - plans.len());
        Ok(plans)
    }
}

fn sequence<'e>(record: &Edn, key: &str, value: &'e Edn) -> Result<&'e [Edn], LoadError> {
    value.as_seq().ok_or_else(|| LoadError::MalformedRecord {
        record: record.clone(),
        reason: format!("`{key}` must be a sequence"),
    })
}

fn record_name(record: &Edn) -> Option<String> {
    record
        .as_map()
        .and_then(|fields| fields.get(NAME))
        .and_then(Edn::as_name)
        .map(|name| name.to_string())
}
