//! Named geometry parameters.
//!
//! A [`ParameterStore`] is filled top to bottom: every value is either a
//! literal or derived from parameters defined before it, so definition order
//! is the dependency order. Once complete, the store is frozen into an
//! immutable [`Parameters`] table that builders read from.

mod detector;

pub use detector::define_detector_parameters;

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{ParameterError, Result};

/// Mutable, string-keyed table of scalar geometry values.
#[derive(Debug, Default)]
pub struct ParameterStore {
    values: HashMap<String, f64>,
    order: Vec<String>,
    misses: RefCell<Vec<String>>,
}

impl ParameterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a parameter.
    ///
    /// An overwritten parameter keeps its original position in
    /// [`names`](Self::names).
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is NaN or infinite.
    pub fn define(&mut self, name: &str, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(ParameterError::NonFinite {
                name: name.to_owned(),
                value,
            }
            .into());
        }
        match self.values.insert(name.to_owned(), value) {
            Some(previous) => {
                tracing::debug!(name, previous, value, "geometry parameter overridden");
            }
            None => self.order.push(name.to_owned()),
        }
        Ok(value)
    }

    /// Defines a parameter computed from already-defined ones.
    ///
    /// # Errors
    ///
    /// Propagates any error from `rhs` (typically an undefined reference) or
    /// from [`define`](Self::define).
    pub fn derive<F>(&mut self, name: &str, rhs: F) -> Result<f64>
    where
        F: FnOnce(&ParameterStore) -> Result<f64>,
    {
        let value = rhs(self)?;
        self.define(name, value)
    }

    /// Strict lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Undefined`] if `name` was never defined.
    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ParameterError::Undefined(name.to_owned()).into())
    }

    /// Lenient lookup: an undefined name logs a warning, is recorded as a
    /// miss and reads as `0.0`.
    ///
    /// Only for values where zero is a deliberate default.
    #[must_use]
    pub fn get_or_zero(&self, name: &str) -> f64 {
        if let Some(value) = self.values.get(name) {
            return *value;
        }
        tracing::warn!(name, "geometry parameter is not defined, using 0");
        self.misses.borrow_mut().push(name.to_owned());
        0.0
    }

    /// Names looked up through [`get_or_zero`](Self::get_or_zero) that were undefined.
    #[must_use]
    pub fn misses(&self) -> Vec<String> {
        self.misses.borrow().clone()
    }

    /// Returns `true` if `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parameter names in first-definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of defined parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing has been defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Finishes definition and returns the read-only table.
    #[must_use]
    pub fn freeze(self) -> Parameters {
        let misses = self.misses.into_inner();
        if !misses.is_empty() {
            tracing::warn!(count = misses.len(), "geometry parameters were read before definition");
        }
        Parameters {
            values: self.values,
            order: self.order,
        }
    }
}

/// Immutable geometry parameter table.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: HashMap<String, f64>,
    order: Vec<String>,
}

impl Parameters {
    /// Strict lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Undefined`] if `name` is missing.
    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ParameterError::Undefined(name.to_owned()).into())
    }

    /// Looks up a count-valued parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Undefined`] if `name` is missing.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn count(&self, name: &str) -> Result<usize> {
        Ok(self.get(name)?.round().max(0.0) as usize)
    }

    /// Parameter names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(name, value)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.order
            .iter()
            .filter_map(|n| self.values.get(n).map(|v| (n.as_str(), *v)))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_value_reads_earlier_definitions() {
        let mut store = ParameterStore::new();
        store.define("A", 5.0).unwrap();
        store.derive("B", |s| Ok(s.get("A")? * 2.0)).unwrap();
        assert_relative_eq!(store.get("B").unwrap(), 10.0);
    }

    #[test]
    fn lenient_miss_reads_zero_and_is_recorded() {
        let store = ParameterStore::new();
        assert_relative_eq!(store.get_or_zero("Unknown"), 0.0);
        assert_eq!(store.misses(), vec!["Unknown".to_owned()]);
    }

    #[test]
    fn strict_miss_is_an_error() {
        let store = ParameterStore::new();
        assert!(store.get("Unknown").is_err());
    }

    #[test]
    fn derive_with_undefined_reference_fails() {
        let mut store = ParameterStore::new();
        let result = store.derive("B", |s| Ok(s.get("A")? + 1.0));
        assert!(result.is_err());
        assert!(!store.contains("B"));
    }

    #[test]
    fn override_keeps_first_position() {
        let mut store = ParameterStore::new();
        store.define("A", 1.0).unwrap();
        store.define("B", 2.0).unwrap();
        store.define("A", 3.0).unwrap();
        let names: Vec<_> = store.names().collect();
        assert_eq!(names, ["A", "B"]);
        assert_relative_eq!(store.get("A").unwrap(), 3.0);
    }

    #[test]
    fn non_finite_rejected() {
        let mut store = ParameterStore::new();
        assert!(store.define("Bad", f64::NAN).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn frozen_table_preserves_values_and_order() {
        let mut store = ParameterStore::new();
        store.define("N", 24.0).unwrap();
        store.derive("Step", |s| Ok(360.0 / s.get("N")?)).unwrap();
        let params = store.freeze();
        assert_eq!(params.count("N").unwrap(), 24);
        assert_relative_eq!(params.get("Step").unwrap(), 15.0);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, [("N", 24.0), ("Step", 15.0)]);
    }
}
