// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Proton Quenching
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Proton recoil energy → electron-equivalent visible energy.
//!
//! E_vis = T_p · q(s·T_p), where q is the tabulated quenching factor,
//! interpolated piecewise-linearly and clamped at the curve ends, and s
//! is the lookup scale (1 by default).

use crate::io;
use ndarray::{Array1, ArrayView1};
use sspike_math::interp::interp;
use sspike_types::error::SspikeResult;
use sspike_types::state::QuenchingCurve;
use std::path::Path;

/// Bundled reference curve, `recoil_energy,factor` per line.
///
/// Holds only the lowest point of the measured curve (0.1 MeV). Recoils
/// looked up in GeV all clamp to it. MeV lookups need the full curve,
/// supplied as `<data_dir>/proton_quenching.csv`.
const REFERENCE_CURVE: &str = include_str!("../data/proton_quenching.csv");

/// Parse the bundled reference curve.
pub fn reference_curve() -> SspikeResult<QuenchingCurve> {
    io::parse_quenching(REFERENCE_CURVE, "<bundled proton_quenching.csv>")
}

#[derive(Debug, Clone)]
pub struct QuenchingTransform {
    curve: QuenchingCurve,
    lookup_scale: f64,
}

impl QuenchingTransform {
    pub fn new(curve: QuenchingCurve) -> Self {
        Self {
            curve,
            lookup_scale: 1.0,
        }
    }

    pub fn reference() -> SspikeResult<Self> {
        Ok(Self::new(reference_curve()?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> SspikeResult<Self> {
        Ok(Self::new(io::read_quenching(path)?))
    }

    /// Multiply recoil energies by `scale` before the curve lookup.
    pub fn with_lookup_scale(mut self, scale: f64) -> Self {
        self.lookup_scale = scale;
        self
    }

    pub fn curve(&self) -> &QuenchingCurve {
        &self.curve
    }

    /// Quenching factor at recoil `t_p` [GeV].
    pub fn factor(&self, t_p: f64) -> f64 {
        interp(
            t_p * self.lookup_scale,
            self.curve.energy(),
            self.curve.factor(),
        )
    }

    /// Visible energy [GeV] of a proton with recoil `t_p` [GeV].
    pub fn visible_energy(&self, t_p: f64) -> f64 {
        t_p * self.factor(t_p)
    }

    pub fn visible_energies(&self, t_p: ArrayView1<f64>) -> Array1<f64> {
        t_p.mapv(|t| self.visible_energy(t))
    }
}
