//! Linear expressions over solver variables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a variable created through a [`MipSolver`](super::MipSolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn new(index: usize) -> Self {
        VarId(index)
    }

    /// Creation order of the variable within its solver.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered list of `(coefficient, variable)` terms plus a constant.
///
/// Terms are kept in insertion order and are not merged, so the expression
/// handed to the solver is exactly the one the builder assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: Vec<(f64, VarId)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Append `coef · var` and return the expression (builder style).
    pub fn term(mut self, coef: f64, var: VarId) -> Self {
        self.add_term(coef, var);
        self
    }

    pub fn add_term(&mut self, coef: f64, var: VarId) {
        self.terms.push((coef, var));
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn terms(&self) -> &[(f64, VarId)] {
        &self.terms
    }

    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0.0
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Value of the expression under an assignment.
    pub fn evaluate(&self, value: impl Fn(VarId) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(coef, var)| acc + coef * value(var))
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        LinearExpr::new().term(1.0, var)
    }
}

impl FromIterator<(f64, VarId)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (f64, VarId)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

impl Extend<(f64, VarId)> for LinearExpr {
    fn extend<I: IntoIterator<Item = (f64, VarId)>>(&mut self, iter: I) {
        self.terms.extend(iter);
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &(coef, var) in &self.terms {
            if first {
                write!(f, "{coef}·x{}", var.0)?;
                first = false;
            } else if coef < 0.0 {
                write!(f, " - {}·x{}", -coef, var.0)?;
            } else {
                write!(f, " + {coef}·x{}", var.0)?;
            }
        }
        if self.constant != 0.0 || first {
            if first {
                write!(f, "{}", self.constant)?;
            } else if self.constant < 0.0 {
                write!(f, " - {}", -self.constant)?;
            } else {
                write!(f, " + {}", self.constant)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_keep_insertion_order() {
        let a = VarId::new(0);
        let b = VarId::new(1);
        let expr = LinearExpr::new().term(2.0, b).term(-1.0, a).term(3.0, b);
        assert_eq!(expr.terms(), &[(2.0, b), (-1.0, a), (3.0, b)]);
        assert_eq!(expr.len(), 3);
    }

    #[test]
    fn test_evaluate() {
        let a = VarId::new(0);
        let b = VarId::new(1);
        let mut expr: LinearExpr = [(2.0, a), (-1.0, b)].into_iter().collect();
        expr.add_constant(5.0);
        let values = [3.0, 4.0];
        assert_eq!(expr.evaluate(|v| values[v.index()]), 7.0);
    }

    #[test]
    fn test_display() {
        let expr = LinearExpr::new()
            .term(1.0, VarId::new(0))
            .term(-2.5, VarId::new(3));
        assert_eq!(expr.to_string(), "1·x0 - 2.5·x3");
        assert_eq!(LinearExpr::constant(4.0).to_string(), "4");
    }
}
