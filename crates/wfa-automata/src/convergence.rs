// When a relaxed distance counts as "no change".

/// Decides whether a relaxation changed a tentative distance enough to
/// propagate it further.
pub trait ConvergenceCondition<W> {
    /// `true` when `candidate` is indistinguishable from `previous`.
    fn converged(&self, previous: &W, candidate: &W) -> bool;
}

/// Converged only on exact equality.
///
/// Terminates on cyclic automata only over k-closed semirings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactConvergence;

impl<W: PartialEq> ConvergenceCondition<W> for ExactConvergence {
    fn converged(&self, previous: &W, candidate: &W) -> bool {
        previous == candidate
    }
}

/// Converged when two `f64` weights differ by at most `epsilon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceConvergence {
    pub epsilon: f64,
}

impl ToleranceConvergence {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for ToleranceConvergence {
    fn default() -> Self {
        Self { epsilon: 1e-9 }
    }
}

impl ConvergenceCondition<f64> for ToleranceConvergence {
    fn converged(&self, previous: &f64, candidate: &f64) -> bool {
        // Equal infinities have a NaN difference.
        previous == candidate || (previous - candidate).abs() <= self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact() {
        assert!(ExactConvergence.converged(&1.0, &1.0));
        assert!(!ExactConvergence.converged(&1.0, &1.0000001));
    }

    #[test]
    fn tolerance() {
        let c = ToleranceConvergence::new(1e-3);
        assert!(c.converged(&1.0, &1.0005));
        assert!(!c.converged(&1.0, &1.01));
        assert!(c.converged(&f64::INFINITY, &f64::INFINITY));
        assert!(!c.converged(&f64::INFINITY, &1.0));
    }
}
