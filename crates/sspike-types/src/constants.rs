// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

/// Proton mass energy equivalent [GeV] (CODATA 2018: 938.27208816 MeV).
pub const M_PROTON_GEV: f64 = 0.938_272_088_16;

/// Fermi coupling constant [GeV⁻²] (CODATA 2018).
pub const G_FERMI: f64 = 1.166_378_7e-5;

/// Reduced Planck constant times c [GeV·cm] (197.3269804 MeV·fm).
pub const HBAR_C_GEV_CM: f64 = 197.326_980_4 * 1e-13 * 1e-3;

/// Neutral-current vector coupling to the proton.
pub const C_VECTOR: f64 = 0.04;

/// Neutral-current axial coupling to the proton (g_A / 2).
pub const C_AXIAL: f64 = 1.27 / 2.0;

/// GLoBES cross-section tables are stored in units of 1e-38 cm² GeV⁻¹.
pub const XS_TABLE_SCALE: f64 = 1e-38;

/// Energy bin width of the reference fluence tables [GeV] (0.2 MeV).
pub const REFERENCE_FLUENCE_BIN_WIDTH: f64 = 2e-4;

/// Upper edge of simulated supernova spectra [GeV] (100 MeV).
pub const SPECTRUM_UPPER_ENERGY: f64 = 0.1;

/// KamLAND fiducial volume radius [cm].
pub const KAMLAND_FIDUCIAL_RADIUS_CM: f64 = 600.0;

/// KamLAND scintillator proton density [cm⁻³].
pub const KAMLAND_PROTON_DENSITY: f64 = 6.66e22;

/// KamLAND electrons per free proton in the scintillator.
pub const KAMLAND_ELECTRONS_PER_PROTON: f64 = 4.047;

/// KamLAND visible-energy threshold [GeV].
pub const KAMLAND_LOW_CUT_GEV: f64 = 2e-4;

/// Physical constants used by the neutral-current elastic cross-section.
///
/// Built once at startup and passed by reference; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConstants {
    /// Proton mass [GeV].
    #[serde(default = "default_m_p")]
    pub m_p: f64,
    /// Fermi coupling [GeV⁻²].
    #[serde(default = "default_g_f")]
    pub g_f: f64,
    /// ħc [GeV·cm].
    #[serde(default = "default_hbar_c")]
    pub hbar_c: f64,
    /// Vector coupling.
    #[serde(default = "default_c_v")]
    pub c_v: f64,
    /// Axial coupling.
    #[serde(default = "default_c_a")]
    pub c_a: f64,
}

fn default_m_p() -> f64 {
    M_PROTON_GEV
}
fn default_g_f() -> f64 {
    G_FERMI
}
fn default_hbar_c() -> f64 {
    HBAR_C_GEV_CM
}
fn default_c_v() -> f64 {
    C_VECTOR
}
fn default_c_a() -> f64 {
    C_AXIAL
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        PhysicsConstants {
            m_p: default_m_p(),
            g_f: default_g_f(),
            hbar_c: default_hbar_c(),
            c_v: default_c_v(),
            c_a: default_c_a(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hbar_c_in_gev_cm() {
        assert!((HBAR_C_GEV_CM - 1.973269804e-14).abs() < 1e-26);
    }

    #[test]
    fn test_default_constants() {
        let pc = PhysicsConstants::default();
        assert!((pc.m_p - 0.93827208816).abs() < 1e-14);
        assert!((pc.c_a - 0.635).abs() < 1e-15);
        assert_eq!(pc.c_v, 0.04);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let pc: PhysicsConstants = serde_json::from_str(r#"{"c_a": 0.6}"#).unwrap();
        assert_eq!(pc.c_a, 0.6);
        assert_eq!(pc.m_p, M_PROTON_GEV);
    }
}
