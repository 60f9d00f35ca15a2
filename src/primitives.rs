//! Registry of operators (grouped by arity) and terminals.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{EnumError, Result};

/// The primitive set a search runs over.
///
/// Operators are grouped into buckets by arity; the buckets are kept in
/// ascending arity order, which fixes the arity sequence `K`. Terminals are
/// fitting parameters followed by variables, each in insertion order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PrimitiveSet {
    operators: BTreeMap<usize, Vec<String>>,
    variables: Vec<String>,
    fitting_parameters: Vec<String>,
}

impl PrimitiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operator taking `arity` operands.
    ///
    /// Fails with [`EnumError::InvalidArity`] when `arity < 1`.
    pub fn add_operator(&mut self, name: impl Into<String>, arity: usize) -> Result<()> {
        let name = name.into();
        if arity < 1 {
            return Err(EnumError::InvalidArity { name, arity });
        }
        debug!("add_operator(name = {}, arity = {})", name, arity);
        self.operators.entry(arity).or_default().push(name);
        Ok(())
    }

    pub fn add_variable(&mut self, name: impl Into<String>) {
        self.variables.push(name.into());
    }

    pub fn add_fitting_parameter(&mut self, name: impl Into<String>) {
        self.fitting_parameters.push(name.into());
    }

    /// Fitting parameters, then variables.
    pub fn terminals(&self) -> Vec<String> {
        self.fitting_parameters.iter().chain(self.variables.iter()).cloned().collect()
    }

    pub fn num_terminals(&self) -> usize {
        self.fitting_parameters.len() + self.variables.len()
    }

    /// Sorted distinct arities.
    pub fn arities(&self) -> Vec<usize> {
        self.operators.keys().copied().collect()
    }

    /// Operators of the given arity, in insertion order. Empty if none.
    pub fn operators(&self, arity: usize) -> &[String] {
        self.operators.get(&arity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn fitting_parameters(&self) -> &[String] {
        &self.fitting_parameters
    }
}
