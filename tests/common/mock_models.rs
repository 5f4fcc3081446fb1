//! Small DAE models with known solutions

use intercal_rs::error::{ModelError, ModelResult};
use intercal_rs::physics::{DaeModel, EquationKind};
use nalgebra::DVector;
use num_dual::Dual64;

/// `dy_i/dt = -k y_i` for `n` unknowns, plus the algebraic total `s = sum y_i`
pub struct ExponentialDecay {
    rate: f64,
    kinds: Vec<EquationKind>,
    names: Vec<String>,
}

impl ExponentialDecay {
    pub fn new(n: usize, rate: f64) -> Self {
        let mut kinds = vec![EquationKind::Differential; n];
        kinds.push(EquationKind::Algebraic);
        let mut names: Vec<String> = (0..n).map(|i| format!("y{i}")).collect();
        names.push("total".into());
        Self { rate, kinds, names }
    }

    /// Exact value of every `y_i` at `t`
    pub fn exact(&self, t: f64) -> f64 {
        (-self.rate * t).exp()
    }

    fn check(&self, len: usize) -> ModelResult<()> {
        if len != self.kinds.len() {
            return Err(ModelError::StateLength { expected: self.kinds.len(), actual: len });
        }
        Ok(())
    }
}

impl DaeModel for ExponentialDecay {
    fn unknowns(&self) -> usize {
        self.kinds.len()
    }

    fn equation_kinds(&self) -> &[EquationKind] {
        &self.kinds
    }

    fn variable_names(&self) -> &[String] {
        &self.names
    }

    fn initial_values(&self) -> DVector<f64> {
        let n = self.kinds.len();
        DVector::from_fn(n, |i, _| if i + 1 < n { 1.0 } else { 0.0 })
    }

    fn residual(&self, _t: f64, y: &[f64], ydot: &[f64]) -> ModelResult<DVector<f64>> {
        self.check(y.len())?;
        let n = y.len() - 1;
        let mut r: Vec<f64> = (0..n).map(|i| ydot[i] + self.rate * y[i]).collect();
        r.push(y[n] - y[..n].iter().sum::<f64>());
        Ok(DVector::from_vec(r))
    }

    fn residual_dual(&self, _t: f64, y: &[Dual64], ydot: &[Dual64]) -> ModelResult<Vec<Dual64>> {
        self.check(y.len())?;
        let n = y.len() - 1;
        let mut r: Vec<Dual64> = (0..n).map(|i| ydot[i] + y[i] * self.rate).collect();
        r.push(y[n] - y[..n].iter().fold(Dual64::from_re(0.0), |acc, &v| acc + v));
        Ok(r)
    }

    fn name(&self) -> &str {
        "ExponentialDecay"
    }
}
