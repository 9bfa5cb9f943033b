//! Dense variable storage indexed by entity, scenario and period.
//!
//! Lookups through `get` are bounds-checked and return `None` outside the
//! grid; `Index` panics and is reserved for indices the builder produced.

use super::VarId;
use std::ops::Index;

/// Variables indexed by `(row, period)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarGrid {
    rows: usize,
    cols: usize,
    data: Vec<VarId>,
}

impl VarGrid {
    /// Fill a `rows × cols` grid in row-major order.
    pub fn build(rows: usize, cols: usize, mut make: impl FnMut(usize, usize) -> VarId) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(make(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<VarId> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[VarId]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }
}

impl Index<(usize, usize)> for VarGrid {
    type Output = VarId;

    fn index(&self, (row, col): (usize, usize)) -> &VarId {
        assert!(
            row < self.rows && col < self.cols,
            "grid index ({row}, {col}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

/// Variables indexed by `(resource, scenario, period)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioGrid {
    resources: usize,
    scenarios: usize,
    periods: usize,
    data: Vec<VarId>,
}

impl ScenarioGrid {
    pub fn build(
        resources: usize,
        scenarios: usize,
        periods: usize,
        mut make: impl FnMut(usize, usize, usize) -> VarId,
    ) -> Self {
        let mut data = Vec::with_capacity(resources * scenarios * periods);
        for r in 0..resources {
            for s in 0..scenarios {
                for t in 0..periods {
                    data.push(make(r, s, t));
                }
            }
        }
        Self {
            resources,
            scenarios,
            periods,
            data,
        }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.resources, self.scenarios, self.periods)
    }

    pub fn get(&self, resource: usize, scenario: usize, period: usize) -> Option<VarId> {
        if resource < self.resources && scenario < self.scenarios && period < self.periods {
            Some(self.data[self.offset(resource, scenario, period)])
        } else {
            None
        }
    }

    /// The `period` series for one resource in one scenario.
    pub fn series(&self, resource: usize, scenario: usize) -> Option<&[VarId]> {
        if resource < self.resources && scenario < self.scenarios {
            let start = self.offset(resource, scenario, 0);
            Some(&self.data[start..start + self.periods])
        } else {
            None
        }
    }

    fn offset(&self, r: usize, s: usize, t: usize) -> usize {
        (r * self.scenarios + s) * self.periods + t
    }
}

impl Index<(usize, usize, usize)> for ScenarioGrid {
    type Output = VarId;

    fn index(&self, (r, s, t): (usize, usize, usize)) -> &VarId {
        assert!(
            r < self.resources && s < self.scenarios && t < self.periods,
            "grid index ({r}, {s}, {t}) out of bounds for {}x{}x{}",
            self.resources,
            self.scenarios,
            self.periods
        );
        &self.data[self.offset(r, s, t)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_grid_bounds() {
        let mut next = 0;
        let grid = VarGrid::build(2, 3, |_, _| {
            next += 1;
            VarId::new(next - 1)
        });
        assert_eq!(grid[(1, 2)], VarId::new(5));
        assert_eq!(grid.get(0, 1), Some(VarId::new(1)));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.row(1).map(|r| r.len()), Some(3));
        assert!(grid.row(2).is_none());
    }

    #[test]
    fn test_scenario_grid_layout() {
        let grid = ScenarioGrid::build(2, 3, 4, |r, s, t| VarId::new(r * 100 + s * 10 + t));
        assert_eq!(grid[(1, 2, 3)], VarId::new(123));
        assert_eq!(grid.get(0, 1, 2), Some(VarId::new(12)));
        assert_eq!(grid.get(0, 3, 0), None);
        let series = grid.series(1, 0).unwrap();
        assert_eq!(series, &[VarId::new(100), VarId::new(101), VarId::new(102), VarId::new(103)]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_panics_outside() {
        let grid = VarGrid::build(1, 1, |_, _| VarId::new(0));
        let _ = grid[(0, 1)];
    }
}
