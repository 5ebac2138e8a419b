use std::path::{Path, PathBuf};

use strips_model::logic::fol::{FolTerm, Formula};
use strips_model::{
    LoadError, LoaderConfig, PlanFailurePolicy, PlanningProblem, PlanningProblemLoader, RecordFailurePolicy,
};

const BLOCK_WORLD: &str = r#"
{:name "block-world"
 :background []
 :start [(on a table)]
 :goal [(on a b)]
 :actions [(define-action move [?x ?y]
             {:preconditions [(clear ?x)] :additions [(on ?x ?y)] :deletions [(on ?x table)]})]
 :expected-plans [[(move a b)] [(move a b c)] [(fly a)] [(move b a)]]}
"#;

const LIGHTS: &str = r#"
{:name lights
 :start [dark]
 :goal [lit]
 :actions [(define-action switch [] {:preconditions [dark] :additions [lit] :deletions [dark]})]}
"#;

const MALFORMED: &str = r#"
{:name broken
 :start [(on a table)]
 :goal [(on a b)]
 :actions [(define-action move [?x a] {})]}
"#;

fn fact(pred: &str, args: &[&str]) -> Formula {
    Formula::pred(pred, args.iter().map(|a| FolTerm::constant(*a)))
}

fn load(config: LoaderConfig, input: &str) -> Result<Vec<PlanningProblem>, strips_model::LoadFailure> {
    PlanningProblemLoader::new(config).load_str(input)
}

#[test]
fn block_world_grounding() {
    let problems = load(LoaderConfig::default(), BLOCK_WORLD).unwrap();
    let [pb] = problems.as_slice() else {
        panic!("expected a single problem");
    };
    let plans = pb.expected_action_sequences().unwrap();
    assert_eq!(plans.len(), 2);
    let move_ab = &plans[0][0];
    assert!(move_ab.is_grounded());
    assert!(move_ab.preconditions().contains(&fact("clear", &["a"])));
    assert!(move_ab.additions().contains(&fact("on", &["a", "b"])));
    assert!(move_ab.deletions().contains(&fact("on", &["a", "table"])));
    assert_eq!(plans[1][0].to_string(), "(move b a)");
}

#[test]
fn keep_loaded_returns_records_before_the_failure() {
    let input = format!("{BLOCK_WORLD} {LIGHTS} {MALFORMED} {LIGHTS}");
    let failure = load(LoaderConfig::default(), &input).unwrap_err();
    assert_eq!(failure.loaded.len(), 2);
    assert_eq!(failure.loaded[0].name(), "block-world");
    assert_eq!(failure.loaded[1].name(), "lights");
    assert!(matches!(failure.error, LoadError::InRecord { index: 2, .. }));
    assert!(matches!(failure.error.root(), LoadError::ActionSetParse { .. }));
}

#[test]
fn atomic_returns_nothing_on_failure() {
    let config = LoaderConfig::default().with_record_failure(RecordFailurePolicy::Atomic);
    let failure = load(config, &format!("{BLOCK_WORLD} {LIGHTS} {MALFORMED}")).unwrap_err();
    assert!(failure.loaded.is_empty());
    assert!(matches!(failure.error.root(), LoadError::ActionSetParse { failures } if failures.len() == 1));

    assert_eq!(load(config, &format!("{BLOCK_WORLD} {LIGHTS}")).unwrap().len(), 2);
}

#[test]
fn strict_plans_reject_the_record() {
    let config = LoaderConfig::default().with_plan_failure(PlanFailurePolicy::Fail);
    let failure = load(config, &format!("{LIGHTS} {BLOCK_WORLD}")).unwrap_err();
    assert_eq!(failure.loaded.len(), 1);
    assert!(matches!(failure.error.root(), LoadError::ArityMismatch { expected: 2, actual: 3, .. }));
}

#[test]
fn duplicate_action_names_fail_the_record() {
    let input = r#"
        {:name dup :start [] :goal []
         :actions [(define-action wait [] {}) (define-action wait [?x] {})]}"#;
    let failure = load(LoaderConfig::default(), input).unwrap_err();
    assert!(failure.loaded.is_empty());
    assert!(matches!(failure.error.root(), LoadError::DuplicateActionName { name, .. } if name == "wait"));
}

#[test]
fn malformed_formula_fails_the_record_wherever_it_is() {
    for goal in ["[() (on a b) (clear a)]", "[(on a b) () (clear a)]", "[(on a b) (clear a) ()]"] {
        let input = format!("{{:name pb :start [] :goal {goal} :actions []}}");
        let failure = load(LoaderConfig::default(), &input).unwrap_err();
        assert!(matches!(failure.error.root(), LoadError::FormulaParse { tokens, .. } if tokens.len() == 3));
    }
}

#[test]
fn diagnostics_point_at_the_input() {
    let failure = load(LoaderConfig::default(), MALFORMED).unwrap_err();
    let rendered = failure.error.to_message().to_string();
    assert!(rendered.contains("expected a variable"));
    assert!(rendered.contains("while loading record #0 (broken)"));
}

#[test]
fn empty_input_has_no_problem() {
    assert!(load(LoaderConfig::default(), "").unwrap().is_empty());
    assert!(load(LoaderConfig::default(), "; only a comment\n").unwrap().is_empty());
}

fn fixture(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join(path)
}

#[test]
fn loads_files() {
    let problems = PlanningProblemLoader::default()
        .load_file(&fixture("problems/block_world.edn"))
        .unwrap();
    assert_eq!(problems.len(), 2);
    assert_eq!(problems[0].name(), "block-world");
    assert_eq!(problems[1].name(), "tower");
}

#[test]
fn file_diagnostics_name_the_file() {
    let failure = PlanningProblemLoader::default()
        .load_file(&fixture("invalid/parameter_not_variable.edn"))
        .unwrap_err();
    assert_eq!(failure.loaded.len(), 1);
    assert!(matches!(failure.error.root(), LoadError::ActionSetParse { .. }));
    let rendered = failure.error.to_message().to_string();
    assert!(rendered.contains("parameter_not_variable.edn"));
    assert!(rendered.contains("while loading record #1 (broken)"));
}

#[test]
fn string_arguments_keep_the_plan() {
    let input = r#"
        {:name gripper :start [(at "ball 1" rooma)] :goal [(carry "ball 1")]
         :actions [(define-action pick [?o] {:preconditions [(at ?o rooma)] :additions [(carry ?o)]})]
         :expected-plans [[(pick "ball 1")]]}"#;
    let problems = load(LoaderConfig::default(), input).unwrap();
    let plans = problems[0].expected_action_sequences().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0][0].to_string(), r#"(pick "ball 1")"#);
    assert!(problems[0].goal().contains(&Formula::pred("carry", [FolTerm::Str("ball 1".into())])));
}

#[test]
fn repeated_record_fields_are_rejected() {
    let input = "{:name pb :start [] :goal []
                  :actions [(define-action a [] {})] :actions [(define-action b [] {})]}";
    let failure = load(LoaderConfig::default(), input).unwrap_err();
    assert!(failure.loaded.is_empty());
    assert!(matches!(failure.error.root(), LoadError::Syntax(msg) if msg.title().contains("duplicate key")));
}
