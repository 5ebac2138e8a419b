use derivative::Derivative;
use smallvec::SmallVec;
use thiserror::Error;

use crate::logic::Logic;

/// Positional binding of variables to values.
///
/// The i-th parameter is bound to the i-th instance. Parameters are distinct.
#[derive(Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = ""),
    Default(bound = "")
)]
pub struct Binding<L: Logic> {
    parameters: SmallVec<[L::Variable; 4]>,
    instances: SmallVec<[L::Value; 4]>,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum InvalidBinding {
    #[error("Different number of arguments in binding: expected {expected} but got {actual}")]
    DifferentLength { expected: usize, actual: usize },
    #[error("Variable {0} appears twice in the binding")]
    DuplicatedEntry(String),
}

impl<L: Logic> Binding<L> {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds each parameter to the value at the same position.
    pub fn new(params: &[L::Variable], instances: impl IntoIterator<Item = L::Value>) -> Result<Self, InvalidBinding> {
        let instances: SmallVec<[L::Value; 4]> = instances.into_iter().collect();
        if params.len() != instances.len() {
            return Err(InvalidBinding::DifferentLength {
                expected: params.len(),
                actual: instances.len(),
            });
        }
        let mut binding = Binding::empty();
        for (param, instance) in params.iter().zip(instances) {
            binding.add(param.clone(), instance)?;
        }
        Ok(binding)
    }

    pub fn add(&mut self, param: L::Variable, instance: L::Value) -> Result<(), InvalidBinding> {
        if self.parameters.contains(&param) {
            return Err(InvalidBinding::DuplicatedEntry(param.to_string()));
        }
        self.parameters.push(param);
        self.instances.push(instance);
        Ok(())
    }

    /// Value bound to `var`, if any.
    pub fn get(&self, var: &L::Variable) -> Option<&L::Value> {
        self.parameters
            .iter()
            .position(|x| x == var)
            .map(|i| &self.instances[i])
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&L::Variable, &L::Value)> + '_ {
        self.parameters.iter().zip(self.instances.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fol::{Fol, FolTerm, Var};

    fn var(name: &str) -> Var {
        Var::new(name)
    }

    #[test]
    fn positional() {
        let b: Binding<Fol> = Binding::new(
            &[var("?x"), var("?y")],
            [FolTerm::constant("a"), FolTerm::constant("b")],
        )
        .unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(&var("?x")), Some(&FolTerm::constant("a")));
        assert_eq!(b.get(&var("?y")), Some(&FolTerm::constant("b")));
        assert_eq!(b.get(&var("?z")), None);
    }

    #[test]
    fn rejects_length_mismatch() {
        let res: Result<Binding<Fol>, _> = Binding::new(&[var("?x")], []);
        assert_eq!(res, Err(InvalidBinding::DifferentLength { expected: 1, actual: 0 }));
    }

    #[test]
    fn rejects_duplicates() {
        let res: Result<Binding<Fol>, _> = Binding::new(
            &[var("?x"), var("?x")],
            [FolTerm::constant("a"), FolTerm::constant("b")],
        );
        assert!(matches!(res, Err(InvalidBinding::DuplicatedEntry(_))));
    }
}
