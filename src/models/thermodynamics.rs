//! Solid-phase thermodynamics: chemical potential and activity
//!
//! A thermodynamic model maps the local composition of a particle (and its
//! average) to the reduced-state chemical potential `mu_R` at every node, plus
//! the activity `exp(mu_R / T)` the kinetics need. It is made of two parts:
//!
//! - a **homogeneous** free-energy form evaluated node by node
//!   ([`SolidSolution`] for one species, [`SublatticeSolution`] for two
//!   coupled species)
//! - an optional **non-homogeneous** correction for particles with an
//!   internal profile: gradient energy `-kappa * curvature` and coherency
//!   strain `B (y - ybar)` ([`GradientEnergy`], [`CoupledGradientEnergy`])
//!
//! One- and two-species materials are distinct types behind
//! [`ParticleThermo`], so the assembler dispatches once per particle and each
//! path is statically typed.
//!
//! # Registry
//!
//! | Name              | Species | Form                                        |
//! |-------------------|---------|---------------------------------------------|
//! | `ideal_sln`       | 1       | `T ln(y/(1-y))`                             |
//! | `reg_sln`         | 1       | ideal + `Omega (1 - 2y)`                    |
//! | `graphite_1param` | 1       | power-law tails + smoothed linear branches  |
//! | `graphite_2param` | 2       | layered regular solution with cross terms   |
//! | `LiNaFePO4`       | 2       | two-sublattice interaction series           |
//!
//! Concentrations are never clamped: `y` outside (0, 1) produces NaN, which
//! the solver treats as a failed step.

use crate::error::{ConfigError, ConfigResult};
use crate::params::{MaterialParams, ParticleParameters, ReferenceScales, SolidScheme, WettingBoundary};
use crate::physics::{Scalar, lift, one_minus};

/// Registered thermodynamic model names
pub const THERMODYNAMICS: &[&str] = &["ideal_sln", "reg_sln", "graphite_1param", "graphite_2param", "LiNaFePO4"];

// =================================================================================================
// Output
// =================================================================================================

/// Chemical potential and activity at every node of one species
#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalPotential<D> {
    pub mu: Vec<D>,
    pub activity: Vec<D>,
}

// =================================================================================================
// Homogeneous forms
// =================================================================================================

fn step_up<D: Scalar>(x: D, center: f64, width: f64) -> D {
    ((x - center) / width).tanh() * 0.5 + 0.5
}

fn step_down<D: Scalar>(x: D, center: f64, width: f64) -> D {
    ((x - center) / width).tanh() * (-0.5) + 0.5
}

/// `T ln(y / (1 - y))`
pub fn ideal_solution<D: Scalar>(y: D, t: f64) -> D {
    (y / one_minus(y)).ln() * t
}

/// Ideal solution plus enthalpy of mixing `Omega (1 - 2y)`
pub fn regular_solution<D: Scalar>(y: D, t: f64, omega: f64) -> D {
    ideal_solution(y, t) + (-y * 2.0 + 1.0) * omega
}

/// Single-species homogeneous free-energy forms
#[derive(Debug, Clone, PartialEq)]
pub enum SolidSolution {
    Ideal,
    Regular { omega: f64 },
    GraphiteOneParam { omega_a: f64, omega_b: f64 },
}

impl SolidSolution {
    pub fn potential<D: Scalar>(&self, y: D, t: f64) -> D {
        match *self {
            SolidSolution::Ideal => ideal_solution(y, t),
            SolidSolution::Regular { omega } => regular_solution(y, t, omega),
            SolidSolution::GraphiteOneParam { omega_a, omega_b } => {
                let width = 5e-2;
                let tail = 5e-2;
                let slope = 0.45;
                let left_tail = y.powf(0.85).recip() * (-tail);
                let right_tail = one_minus(y).powf(0.85).recip() * tail;
                let left_lin = (-y + 0.26) * (slope * omega_a * 4.0) * step_down(y, 0.5, width);
                let right_lin = ((-y + 0.74) * (slope * omega_a * 4.0) + omega_b) * step_up(y, 0.5, width);
                left_tail + right_tail + left_lin + right_lin
            }
        }
    }
}

/// Two-species homogeneous free-energy forms
#[derive(Debug, Clone, PartialEq)]
pub enum SublatticeSolution {
    /// Two graphite layers, each a regular solution, coupled by cross terms
    GraphiteTwoParam { omega_a: f64, omega_b: f64, omega_c: f64, e_vdw: f64 },
    /// Two species sharing one lattice with vacancies (olivine Li/Na)
    TwoSublattice {
        series_1: Vec<f64>,
        series_2: Vec<f64>,
        cross: f64,
        cross_vacancy: f64,
        /// Standard-state offsets, added after the activity
        theta: [f64; 2],
    },
}

/// Chemical potential of species `x` in a lattice shared with species `y`
fn sublattice_potential<D: Scalar>(x: D, y: D, own: &[f64], other: &[f64], cross: f64, cross_vacancy: f64, t: f64) -> D {
    let vacancy = one_minus(y) - x;
    let mut mu = (x / vacancy).ln() * t;

    let s = one_minus(y) - x * 2.0;
    let mut s_pow = lift::<D>(1.0);
    for (k, l) in own.iter().enumerate() {
        let k = k as f64;
        mu += s_pow * (s - x * vacancy * (2.0 * k) / s) * *l;
        s_pow *= s;
    }

    let s2 = one_minus(x) - y * 2.0;
    let mut s2_pow = lift::<D>(1.0);
    for (k, l) in other.iter().enumerate() {
        let k = k as f64;
        mu -= y * s2_pow * ((one_minus(x) - y) * k / s2 + 1.0) * *l;
        s2_pow *= s2;
    }

    mu + y * cross + y * s * cross_vacancy
}

impl SublatticeSolution {
    pub fn potentials<D: Scalar>(&self, y1: D, y2: D, t: f64) -> (D, D) {
        match self {
            SublatticeSolution::GraphiteTwoParam { omega_a, omega_b, omega_c, e_vdw } => {
                let vdw = |y: D| y * y * one_minus(y) * one_minus(y) * (30.0 * e_vdw);
                let mu1 = regular_solution(y1, t, *omega_a)
                    + y2 * *omega_b
                    + y2 * one_minus(y2) * (-y1 * 2.0 + 1.0) * *omega_c
                    + vdw(y1);
                let mu2 = regular_solution(y2, t, *omega_a)
                    + y1 * *omega_b
                    + y1 * one_minus(y1) * (-y2 * 2.0 + 1.0) * *omega_c
                    + vdw(y2);
                (mu1, mu2)
            }
            SublatticeSolution::TwoSublattice { series_1, series_2, cross, cross_vacancy, .. } => (
                sublattice_potential(y1, y2, series_1, series_2, *cross, *cross_vacancy, t),
                sublattice_potential(y2, y1, series_2, series_1, *cross, *cross_vacancy, t),
            ),
        }
    }

    /// Offsets added to each species' potential after the activity is taken
    pub fn offsets(&self) -> [f64; 2] {
        match self {
            SublatticeSolution::GraphiteTwoParam { .. } => [0.0, 0.0],
            SublatticeSolution::TwoSublattice { theta, .. } => *theta,
        }
    }
}

// =================================================================================================
// Non-homogeneous corrections
// =================================================================================================

/// Ghost-node rule for one species
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GhostRule {
    /// Ghost value pinned to a wetting concentration
    Fixed(f64),
    /// Ghost value `y_end + dx * beta`
    Flux(f64),
    /// Ghost value `y_end + dx * y_end (1 - y_end) * 6 beta`
    Natural(f64),
}

/// Ghost-node rule for two coupled species
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairGhostRule {
    /// Species 1 pinned to `c_wet`, species 2 to the other phase's `0.98 - c_wet`
    Fixed(f64),
    Flux(f64, f64),
    /// Flux scaled by the local vacancy fraction `1 - y1 - y2`
    Natural(f64, f64),
}

/// Second difference with ghost nodes, on a unit-length grid of `y.len()` nodes
fn curvature<D: Scalar>(y: &[D], left: D, right: D) -> Vec<D> {
    let n = y.len();
    let dx = 1.0 / n as f64;
    let inv_dx2 = 1.0 / (dx * dx);
    (0..n)
        .map(|k| {
            let prev = if k == 0 { left } else { y[k - 1] };
            let next = if k + 1 == n { right } else { y[k + 1] };
            (prev - y[k] * 2.0 + next) * inv_dx2
        })
        .collect()
}

/// Gradient-energy and coherency-strain correction for one species
#[derive(Debug, Clone, PartialEq)]
pub struct GradientEnergy {
    pub kappa: f64,
    pub b: f64,
    pub ghost: GhostRule,
}

impl GradientEnergy {
    /// `-kappa * curv + B (y - ybar)`; zero for a single-node particle
    pub fn correction<D: Scalar>(&self, y: &[D], ybar: D) -> Vec<D> {
        let n = y.len();
        if n <= 1 {
            return vec![lift::<D>(0.0); n];
        }
        let dx = 1.0 / n as f64;
        let ghost = |end: D| match self.ghost {
            GhostRule::Fixed(c) => lift::<D>(c),
            GhostRule::Flux(beta) => end + dx * beta,
            GhostRule::Natural(beta) => end + end * one_minus(end) * (dx * 6.0 * beta),
        };
        let curv = curvature(y, ghost(y[0]), ghost(y[n - 1]));
        y.iter()
            .zip(curv)
            .map(|(&yk, c)| c * (-self.kappa) + (yk - ybar) * self.b)
            .collect()
    }
}

/// Coupled correction for two species
#[derive(Debug, Clone, PartialEq)]
pub struct CoupledGradientEnergy {
    pub kappa_1: f64,
    pub kappa_2: f64,
    pub kappa_12: f64,
    pub b_1: f64,
    pub b_2: f64,
    pub ghost: PairGhostRule,
}

impl CoupledGradientEnergy {
    pub fn correction<D: Scalar>(&self, y1: &[D], y2: &[D], ybar1: D, ybar2: D) -> (Vec<D>, Vec<D>) {
        let n = y1.len();
        if n <= 1 {
            return (vec![lift::<D>(0.0); n], vec![lift::<D>(0.0); n]);
        }
        let dx = 1.0 / n as f64;
        let ends = [0, n - 1];
        let [(l1, r1), (l2, r2)] = match self.ghost {
            PairGhostRule::Fixed(c_wet) => {
                let (w1, w2) = (lift::<D>(c_wet), lift::<D>(0.98 - c_wet));
                [(w1, w1), (w2, w2)]
            }
            PairGhostRule::Flux(beta_1, beta_2) => {
                let g1 = ends.map(|k| y1[k] + dx * beta_1);
                let g2 = ends.map(|k| y2[k] + dx * beta_2);
                [(g1[0], g1[1]), (g2[0], g2[1])]
            }
            PairGhostRule::Natural(beta_1, beta_2) => {
                let vac = |k: usize| one_minus(y1[k]) - y2[k];
                let g1 = ends.map(|k| y1[k] + y1[k] * vac(k) * (dx * 6.0 * beta_1));
                let g2 = ends.map(|k| y2[k] + y2[k] * vac(k) * (dx * 6.0 * beta_2));
                [(g1[0], g1[1]), (g2[0], g2[1])]
            }
        };
        let curv1 = curvature(y1, l1, r1);
        let curv2 = curvature(y2, l2, r2);

        let b12 = (self.b_1 * self.b_2).sqrt();
        let strain_ref_1 = ybar1 * self.b_1 + ybar2 * b12;
        let strain_ref_2 = ybar1 * b12 + ybar2 * self.b_2;

        let mu1 = (0..n)
            .map(|k| {
                curv1[k] * (-self.kappa_1) - curv2[k] * self.kappa_12 + y1[k] * self.b_1 + y2[k] * b12 - strain_ref_1
            })
            .collect();
        let mu2 = (0..n)
            .map(|k| {
                curv2[k] * (-self.kappa_2) - curv1[k] * self.kappa_12 + y1[k] * b12 + y2[k] * self.b_2 - strain_ref_2
            })
            .collect();
        (mu1, mu2)
    }
}

// =================================================================================================
// Particle thermodynamics
// =================================================================================================

/// Thermodynamics of a single-species particle
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSpeciesThermo {
    pub solution: SolidSolution,
    pub gradient: Option<GradientEnergy>,
    pub mu_ref: f64,
}

impl SingleSpeciesThermo {
    pub fn potential<D: Scalar>(&self, y: &[D], ybar: D, t: f64) -> ChemicalPotential<D> {
        let mut mu: Vec<D> = y.iter().map(|&yk| self.solution.potential(yk, t)).collect();
        if let Some(gradient) = &self.gradient {
            for (m, c) in mu.iter_mut().zip(gradient.correction(y, ybar)) {
                *m += c;
            }
        }
        let activity = mu.iter().map(|&m| (m / t).exp()).collect();
        for m in mu.iter_mut() {
            *m += self.mu_ref;
        }
        ChemicalPotential { mu, activity }
    }
}

/// Thermodynamics of a two-species particle
#[derive(Debug, Clone, PartialEq)]
pub struct TwoSpeciesThermo {
    pub solution: SublatticeSolution,
    pub gradient: Option<CoupledGradientEnergy>,
    pub mu_ref: f64,
}

impl TwoSpeciesThermo {
    pub fn potentials<D: Scalar>(
        &self,
        y1: &[D],
        y2: &[D],
        ybar1: D,
        ybar2: D,
        t: f64,
    ) -> (ChemicalPotential<D>, ChemicalPotential<D>) {
        let n = y1.len();
        let (mut mu1, mut mu2): (Vec<D>, Vec<D>) =
            (0..n).map(|k| self.solution.potentials(y1[k], y2[k], t)).unzip();
        if let Some(gradient) = &self.gradient {
            let (c1, c2) = gradient.correction(y1, y2, ybar1, ybar2);
            for k in 0..n {
                mu1[k] += c1[k];
                mu2[k] += c2[k];
            }
        }
        let act1 = mu1.iter().map(|&m| (m / t).exp()).collect();
        let act2 = mu2.iter().map(|&m| (m / t).exp()).collect();
        let [theta_1, theta_2] = self.solution.offsets();
        for m in mu1.iter_mut() {
            *m += theta_1 + self.mu_ref;
        }
        for m in mu2.iter_mut() {
            *m += theta_2 + self.mu_ref;
        }
        (ChemicalPotential { mu: mu1, activity: act1 }, ChemicalPotential { mu: mu2, activity: act2 })
    }
}

/// Thermodynamics of one particle, by species count
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleThermo {
    Single(SingleSpeciesThermo),
    Pair(TwoSpeciesThermo),
}

impl ParticleThermo {
    pub fn species(&self) -> usize {
        match self {
            ParticleThermo::Single(_) => 1,
            ParticleThermo::Pair(_) => 2,
        }
    }
}

// =================================================================================================
// Registry
// =================================================================================================

/// Build the thermodynamics of one particle from its registry name
pub fn resolve(
    material: &MaterialParams,
    particle: &ParticleParameters,
    scales: &ReferenceScales,
) -> ConfigResult<ParticleThermo> {
    let name = material.thermodynamics.as_str();
    let structured = material.scheme == SolidScheme::ReactionLimited;

    let single = |solution: SolidSolution| {
        let gradient = structured.then(|| GradientEnergy {
            kappa: particle.kappa,
            b: particle.b,
            ghost: match material.wetting {
                WettingBoundary::Fixed { c_wet } => GhostRule::Fixed(c_wet),
                WettingBoundary::Flux { beta, .. } => GhostRule::Flux(beta),
                WettingBoundary::Natural { beta, .. } => GhostRule::Natural(beta),
            },
        });
        ParticleThermo::Single(SingleSpeciesThermo { solution, gradient, mu_ref: material.mu_ref })
    };

    let pair = |solution: SublatticeSolution| -> ConfigResult<ParticleThermo> {
        if material.scheme == SolidScheme::RadialDiffusion {
            return Err(ConfigError::IncompatibleScheme {
                feature: "two-species thermodynamics",
                required: "ACR or homog",
                actual: material.scheme.name().to_string(),
            });
        }
        let gradient = structured.then(|| CoupledGradientEnergy {
            kappa_1: particle.kappa,
            kappa_2: particle.kappa_2,
            kappa_12: particle.kappa_12,
            b_1: particle.b,
            b_2: particle.b_2,
            ghost: match material.wetting {
                WettingBoundary::Fixed { c_wet } => PairGhostRule::Fixed(c_wet),
                WettingBoundary::Flux { beta, beta_2 } => PairGhostRule::Flux(beta, beta_2),
                WettingBoundary::Natural { beta, beta_2 } => PairGhostRule::Natural(beta, beta_2),
            },
        });
        Ok(ParticleThermo::Pair(TwoSpeciesThermo { solution, gradient, mu_ref: material.mu_ref }))
    };

    match name {
        "ideal_sln" => Ok(single(SolidSolution::Ideal)),
        "reg_sln" => Ok(single(SolidSolution::Regular { omega: particle.omega })),
        "graphite_1param" => Ok(single(SolidSolution::GraphiteOneParam {
            omega_a: particle.omega,
            omega_b: scales.energy(material.omega_b),
        })),
        "graphite_2param" => pair(SublatticeSolution::GraphiteTwoParam {
            omega_a: particle.omega,
            omega_b: scales.energy(material.omega_b),
            omega_c: scales.energy(material.omega_c),
            e_vdw: scales.energy(material.e_vdw),
        }),
        "LiNaFePO4" => pair(SublatticeSolution::TwoSublattice {
            series_1: material.l_series_1.clone(),
            series_2: material.l_series_2.clone(),
            cross: scales.energy(material.omega_b),
            cross_vacancy: scales.energy(material.omega_c),
            theta: [-scales.potential(material.v_theta[0]), -scales.potential(material.v_theta[1])],
        }),
        _ => Err(ConfigError::UnknownModel { kind: "thermodynamic", name: name.to_string() }),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_dual::Dual64;

    // ── helpers ──

    fn acr_single(kappa: f64, b: f64, c_wet: f64) -> SingleSpeciesThermo {
        SingleSpeciesThermo {
            solution: SolidSolution::Regular { omega: 4.5 },
            gradient: Some(GradientEnergy { kappa, b, ghost: GhostRule::Fixed(c_wet) }),
            mu_ref: 0.0,
        }
    }

    #[test]
    fn test_ideal_solution_is_zero_at_half_filling() {
        assert_eq!(ideal_solution(0.5_f64, 1.0), 0.0);
    }

    #[test]
    fn test_regular_solution_antisymmetry() {
        for &y in &[0.05, 0.2, 0.37] {
            let a = regular_solution(y, 1.0, 3.0);
            let b = regular_solution(1.0 - y, 1.0, 3.0);
            assert_relative_eq!(a, -b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_temperature_scales_entropy_only() {
        let y = 0.3_f64;
        let hot = regular_solution(y, 2.0, 1.5);
        let cold = regular_solution(y, 1.0, 1.5);
        assert_relative_eq!(hot - cold, (y / (1.0 - y)).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_node_has_no_gradient_correction() {
        let thermo = acr_single(10.0, 5.0, 0.98);
        let with = thermo.potential(&[0.3_f64], 0.3, 1.0);
        assert_relative_eq!(with.mu[0], regular_solution(0.3, 1.0, 4.5), epsilon = 1e-14);
    }

    #[test]
    fn test_uniform_profile_at_wetting_value_has_no_correction() {
        let gradient = GradientEnergy { kappa: 2.0, b: 1.0, ghost: GhostRule::Fixed(0.4) };
        let y = vec![0.4_f64; 6];
        let c = gradient.correction(&y, 0.4);
        assert!(c.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_wetting_raises_end_curvature() {
        let gradient = GradientEnergy { kappa: 1.0, b: 0.0, ghost: GhostRule::Fixed(0.9) };
        let y = vec![0.1_f64; 4];
        let c = gradient.correction(&y, 0.1);
        // curvature at the ends is (0.9 - 0.1) / dx^2 = 0.8 * 16
        assert_relative_eq!(c[0], -12.8, epsilon = 1e-10);
        assert_relative_eq!(c[3], -12.8, epsilon = 1e-10);
        assert_relative_eq!(c[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_strain_term_vanishes_on_average() {
        let gradient = GradientEnergy { kappa: 0.0, b: 3.0, ghost: GhostRule::Flux(0.0) };
        let y = vec![0.1_f64, 0.2, 0.6];
        let ybar = 0.3;
        let c = gradient.correction(&y, ybar);
        assert_relative_eq!(c.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_activity_excludes_reference_offset() {
        let mut thermo = acr_single(0.0, 0.0, 0.5);
        thermo.mu_ref = 2.0;
        let cp = thermo.potential(&[0.2_f64, 0.2], 0.2, 1.0);
        let bare = regular_solution(0.2, 1.0, 4.5);
        assert_relative_eq!(cp.mu[0], bare + 2.0, epsilon = 1e-12);
        assert_relative_eq!(cp.activity[0], bare.exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_pair_fixed_ghosts_use_complementary_value() {
        let gradient = CoupledGradientEnergy {
            kappa_1: 1.0,
            kappa_2: 1.0,
            kappa_12: 0.0,
            b_1: 0.0,
            b_2: 0.0,
            ghost: PairGhostRule::Fixed(0.7),
        };
        let y1 = vec![0.7_f64; 3];
        let y2 = vec![0.28_f64; 3];
        let (c1, c2) = gradient.correction(&y1, &y2, 0.7, 0.28);
        assert!(c1.iter().all(|v| v.abs() < 1e-10));
        assert!(c2.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn test_graphite_pair_is_symmetric() {
        let solution = SublatticeSolution::GraphiteTwoParam { omega_a: 2.0, omega_b: 0.5, omega_c: 1.0, e_vdw: 0.1 };
        let (a1, a2) = solution.potentials(0.2_f64, 0.6, 1.0);
        let (b1, b2) = solution.potentials(0.6_f64, 0.2, 1.0);
        assert_relative_eq!(a1, b2, epsilon = 1e-12);
        assert_relative_eq!(a2, b1, epsilon = 1e-12);
    }

    #[test]
    fn test_sublattice_dual_derivative_matches_finite_difference() {
        let solution = SublatticeSolution::TwoSublattice {
            series_1: vec![3.97, 0.097, 1.11],
            series_2: vec![0.945, 8.02],
            cross: 0.3,
            cross_vacancy: -0.2,
            theta: [0.0, 0.0],
        };
        let (x, y) = (0.3, 0.2);
        let h = 1e-6;
        let (plus, _) = solution.potentials(x + h, y, 1.0);
        let (minus, _) = solution.potentials(x - h, y, 1.0);
        let fd = (plus - minus) / (2.0 * h);

        let (dual, _) = solution.potentials(Dual64::new(x, 1.0), Dual64::from_re(y), 1.0);
        assert_relative_eq!(dual.eps, fd, max_relative = 1e-6);
    }

    /// Graphite one-parameter form written out on plain floats
    fn graphite_reference(y: f64, omega_a: f64, omega_b: f64) -> f64 {
        let down = 0.5 - 0.5 * ((y - 0.5) / 5e-2).tanh();
        let up = 0.5 + 0.5 * ((y - 0.5) / 5e-2).tanh();
        -5e-2 / y.powf(0.85)
            + 5e-2 / (1.0 - y).powf(0.85)
            + 0.45 * omega_a * 4.0 * (0.26 - y) * down
            + (0.45 * omega_a * 4.0 * (0.74 - y) + omega_b) * up
    }

    #[test]
    fn test_graphite_one_parameter_branches() {
        let solution = SolidSolution::GraphiteOneParam { omega_a: 3.4, omega_b: 1.2 };
        for y in [0.3, 0.5, 0.7] {
            assert_relative_eq!(solution.potential(y, 1.0), graphite_reference(y, 3.4, 1.2), epsilon = 1e-12);
        }
        // below half filling the left linear branch dominates, above it the right one
        let left = solution.potential(0.3, 1.0);
        assert_relative_eq!(left, -5e-2 / 0.3_f64.powf(0.85) + 5e-2 / 0.7_f64.powf(0.85) - 0.2448, epsilon = 5e-3);
        let right = solution.potential(0.7, 1.0);
        assert_relative_eq!(right, -5e-2 / 0.7_f64.powf(0.85) + 5e-2 / 0.3_f64.powf(0.85) + 1.2 + 0.2448, epsilon = 5e-3);
        // no entropic term: temperature does not enter
        assert_eq!(solution.potential(0.7, 1.3), right);
    }

    #[test]
    fn test_graphite_one_parameter_dual_derivative_matches_finite_difference() {
        let solution = SolidSolution::GraphiteOneParam { omega_a: 3.4, omega_b: 1.2 };
        let h = 1e-6;
        for y in [0.1, 0.48, 0.52, 0.9] {
            let fd = (solution.potential(y + h, 1.0) - solution.potential(y - h, 1.0)) / (2.0 * h);
            let dual = solution.potential(Dual64::new(y, 1.0), 1.0);
            assert_relative_eq!(dual.re, solution.potential(y, 1.0), epsilon = 1e-14);
            assert_relative_eq!(dual.eps, fd, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_composition_is_nan() {
        assert!(ideal_solution(1.2_f64, 1.0).is_nan());
    }
}
