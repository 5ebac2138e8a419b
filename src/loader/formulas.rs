use crate::edn::Edn;
use crate::errors::LoadError;
use crate::logic::Logic;
use crate::state::FormulaSet;

/// Reads a sequence of formulas into a set, all or nothing.
pub struct FormulaSetReader<'l, L: Logic> {
    logic: &'l L,
}

impl<'l, L: Logic> FormulaSetReader<'l, L> {
    pub fn new(logic: &'l L) -> Self {
        FormulaSetReader { logic }
    }

    /// Fails on the first formula that cannot be read, the error carrying the complete sequence.
    pub fn read(&self, tokens: &[Edn]) -> Result<FormulaSet<L>, LoadError> {
        tokens
            .iter()
            .map(|token| self.logic.read_formula(token))
            .collect::<Result<FormulaSet<L>, _>>()
            .map_err(|cause| LoadError::FormulaParse {
                tokens: tokens.to_vec(),
                cause,
            })
    }
}
