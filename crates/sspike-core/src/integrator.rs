// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Rate Integrator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fluence-weighted NC elastic rate for a single proton recoil bin.
//!
//! rate(T_p) = scale · ∫_{E_min}^{E_max} dσ/dT_p(E, T_p) · Φ(E) dE
//!
//! Φ is the flavor fluence interpolated linearly between grid energies,
//! so the integrand has a kink at every grid node. Nodes inside the
//! domain are passed to the quadrature as breakpoints.

use crate::cross_section::{AxialSign, NcElasticCrossSection};
use ndarray::ArrayView1;
use sspike_math::interp::interp;
use sspike_math::quadrature::{integrate_with_breakpoints, QuadConfig, QuadResult};
use sspike_types::config::IntegrationConfig;
use tracing::warn;

/// Minimum neutrino energy [GeV] able to give a proton recoil `t_p` [GeV].
///
/// E_min = (T_p + √(T_p·(T_p + 2M_p))) / 2
pub fn kinematic_threshold(t_p: f64, m_p: f64) -> f64 {
    (t_p + (t_p * (t_p + 2.0 * m_p)).sqrt()) / 2.0
}

#[derive(Debug, Clone, Copy)]
pub struct RateIntegrator {
    xs: NcElasticCrossSection,
    upper_energy: f64,
    quad: QuadConfig,
}

impl RateIntegrator {
    pub fn new(xs: NcElasticCrossSection, cfg: &IntegrationConfig) -> Self {
        Self {
            xs,
            upper_energy: cfg.upper_energy,
            quad: QuadConfig {
                epsabs: cfg.epsabs,
                epsrel: cfg.epsrel,
                limit: cfg.limit,
            },
        }
    }

    pub fn upper_energy(&self) -> f64 {
        self.upper_energy
    }

    /// Raw quadrature result before scaling.
    ///
    /// An empty domain (`e_min >= upper_energy`) integrates to exactly 0.
    pub fn integrate(
        &self,
        t_p: f64,
        energy: ArrayView1<f64>,
        fluence: ArrayView1<f64>,
        e_min: f64,
        sign: AxialSign,
    ) -> QuadResult {
        let upper = self.upper_energy;
        if !(e_min < upper) {
            return QuadResult {
                value: 0.0,
                abs_error: 0.0,
                intervals: 0,
                evaluations: 0,
                converged: true,
            };
        }

        let nodes: Vec<f64> = energy
            .iter()
            .copied()
            .filter(|&e| e > e_min && e < upper)
            .collect();
        let integrand = |e: f64| self.xs.differential(e, t_p, sign) * interp(e, energy, fluence);

        integrate_with_breakpoints(integrand, e_min, upper, &nodes, &self.quad)
    }

    /// Scaled rate contribution of one flavor to one recoil bin.
    ///
    /// Quadrature non-convergence is logged; the best estimate is kept.
    pub fn rate(
        &self,
        t_p: f64,
        energy: ArrayView1<f64>,
        fluence: ArrayView1<f64>,
        e_min: f64,
        scale: f64,
        sign: AxialSign,
    ) -> f64 {
        let r = self.integrate(t_p, energy, fluence, e_min, sign);
        if !r.converged {
            warn!(
                t_p,
                e_min,
                value = r.value,
                abs_error = r.abs_error,
                intervals = r.intervals,
                "quadrature did not reach tolerance"
            );
        }
        r.value * scale
    }
}
