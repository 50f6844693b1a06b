// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — NC Elastic Cross-Section
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Neutral-current neutrino-proton elastic scattering.
//!
//! Differential cross-section with respect to proton recoil energy:
//!   A    = (G_F·ħc)² · M_p / (2π·E²)          [GeV⁻³ cm²]
//!   nu2  = (C_v + a·C_a)² · E²
//!   p2   = (C_v² − C_a²) · M_p · T_p
//!   pnu  = (C_v − a·C_a)² · (E − T_p)²
//!   dσ/dT_p = A · (nu2 + pnu − p2)           [cm² GeV⁻¹]
//! with a = +1 for neutrinos and a = −1 for antineutrinos.

use sspike_types::constants::PhysicsConstants;
use std::f64::consts::PI;

/// Sign of the axial coupling term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxialSign {
    #[default]
    Neutrino,
    Antineutrino,
}

impl AxialSign {
    pub fn value(self) -> f64 {
        match self {
            AxialSign::Neutrino => 1.0,
            AxialSign::Antineutrino => -1.0,
        }
    }
}

/// dσ/dT_p(E, T_p) [cm² GeV⁻¹] for neutrino energy `e` and recoil `t_p` [GeV].
///
/// Returns 0 when either energy is exactly zero.
pub fn dxs_nc(e: f64, t_p: f64, sign: AxialSign, pc: &PhysicsConstants) -> f64 {
    if e == 0.0 || t_p == 0.0 {
        return 0.0;
    }
    let a = sign.value();

    let coeff = (pc.g_f * pc.hbar_c).powi(2) * pc.m_p / 2.0 / PI / (e * e);
    let nu2 = (pc.c_v + a * pc.c_a).powi(2) * e * e;
    let p2 = (pc.c_v * pc.c_v - pc.c_a * pc.c_a) * pc.m_p * t_p;
    let pnu = (pc.c_v - a * pc.c_a).powi(2) * (e - t_p).powi(2);

    coeff * (nu2 + pnu - p2)
}

/// Cross-section model bound to one set of constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct NcElasticCrossSection {
    pub constants: PhysicsConstants,
}

impl NcElasticCrossSection {
    pub fn new(constants: PhysicsConstants) -> Self {
        Self { constants }
    }

    pub fn differential(&self, e: f64, t_p: f64, sign: AxialSign) -> f64 {
        dxs_nc(e, t_p, sign, &self.constants)
    }
}
