//! Policies of the loader regarding invalid input.
//!
//! Both policies can be set programmatically or from the environment, see [`LoaderConfig::from_env`].

use std::fmt::Display;
use std::str::FromStr;

use derive_more::derive::Display;

/// What happens to the problems already loaded when a record of the same input is invalid.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display)]
pub enum RecordFailurePolicy {
    /// Loading stops at the invalid record; problems read before it are returned along with the error.
    #[default]
    #[display("keep-loaded")]
    KeepLoaded,
    /// A single invalid record fails the whole input: no problem is returned.
    #[display("atomic")]
    Atomic,
}

impl FromStr for RecordFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep-loaded" => Ok(RecordFailurePolicy::KeepLoaded),
            "atomic" => Ok(RecordFailurePolicy::Atomic),
            _ => Err(format!("Unknown record failure policy `{s}` (expected `keep-loaded` or `atomic`)")),
        }
    }
}

/// What happens to a reference plan that mentions an action that cannot be instantiated.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Display)]
pub enum PlanFailurePolicy {
    /// The plan is silently removed from the expected plans of the problem.
    #[default]
    #[display("drop")]
    Drop,
    /// The record containing the plan is rejected.
    #[display("fail")]
    Fail,
}

impl FromStr for PlanFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(PlanFailurePolicy::Drop),
            "fail" => Ok(PlanFailurePolicy::Fail),
            _ => Err(format!("Unknown plan failure policy `{s}` (expected `drop` or `fail`)")),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LoaderConfig {
    pub record_failure: RecordFailurePolicy,
    pub plan_failure: PlanFailurePolicy,
}

/// Environment variable overriding [`LoaderConfig::record_failure`]
pub const RECORD_FAILURE_VAR: &str = "STRIPS_RECORD_FAILURE";
/// Environment variable overriding [`LoaderConfig::plan_failure`]
pub const PLAN_FAILURE_VAR: &str = "STRIPS_PLAN_FAILURE";

impl LoaderConfig {
    pub fn with_record_failure(mut self, policy: RecordFailurePolicy) -> Self {
        self.record_failure = policy;
        self
    }

    pub fn with_plan_failure(mut self, policy: PlanFailurePolicy) -> Self {
        self.plan_failure = policy;
        self
    }

    /// Default configuration, where each policy may be overridden by its environment variable
    /// (`STRIPS_RECORD_FAILURE` and `STRIPS_PLAN_FAILURE`).
    /// A variable that cannot be parsed is reported and ignored.
    pub fn from_env() -> Self {
        LoaderConfig {
            record_failure: read_env(RECORD_FAILURE_VAR),
            plan_failure: read_env(PLAN_FAILURE_VAR),
        }
    }
}

fn read_env<T>(var: &str) -> T
where
    T: FromStr + Default + Display,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(value) => parse_or_default(var, &value),
        Err(std::env::VarError::NotPresent) => T::default(),
        Err(err) => {
            tracing::warn!("{var}: {err}. Using default: \"{}\"", T::default());
            T::default()
        }
    }
}

fn parse_or_default<T>(var: &str, value: &str) -> T
where
    T: FromStr + Default + Display,
    T::Err: Display,
{
    match T::from_str(value) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                "could not parse the value \"{value}\" for environment variable \"{var}\" ({err}). Using default: \"{}\"",
                T::default()
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_round_trip_through_their_names() {
        for p in [RecordFailurePolicy::KeepLoaded, RecordFailurePolicy::Atomic] {
            assert_eq!(p.to_string().parse::<RecordFailurePolicy>(), Ok(p));
        }
        for p in [PlanFailurePolicy::Drop, PlanFailurePolicy::Fail] {
            assert_eq!(p.to_string().parse::<PlanFailurePolicy>(), Ok(p));
        }
    }

    #[test]
    fn invalid_values_fall_back_to_default() {
        let p: PlanFailurePolicy = parse_or_default("TEST_VAR", "sometimes");
        assert_eq!(p, PlanFailurePolicy::Drop);
        let p: RecordFailurePolicy = parse_or_default("TEST_VAR", "atomic");
        assert_eq!(p, RecordFailurePolicy::Atomic);
    }

    #[test]
    fn builder() {
        let config = LoaderConfig::default()
            .with_record_failure(RecordFailurePolicy::Atomic)
            .with_plan_failure(PlanFailurePolicy::Fail);
        assert_eq!(config.record_failure, RecordFailurePolicy::Atomic);
        assert_eq!(config.plan_failure, PlanFailurePolicy::Fail);
        assert_eq!(LoaderConfig::default().plan_failure, PlanFailurePolicy::Drop);
    }
}
