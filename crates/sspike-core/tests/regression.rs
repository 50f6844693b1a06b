// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Regression Checkpoints
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Recorded values of the reference configuration.

use ndarray::{Array1, Array2};
use sspike_core::basic::{bin_scale, e_scat, energy_grid};
use sspike_core::cross_section::{AxialSign, NcElasticCrossSection};
use sspike_core::detector::Detector;
use sspike_core::elastic::RecoilBinGrid;
use sspike_core::integrator::{kinematic_threshold, RateIntegrator};
use sspike_core::quenching::QuenchingTransform;
use sspike_core::totals::column_sum;
use sspike_types::config::{BasicGridConfig, IntegrationConfig, RecoilGridConfig};
use sspike_types::constants::{M_PROTON_GEV, REFERENCE_FLUENCE_BIN_WIDTH};
use sspike_types::state::{CrossSectionTable, FluenceSpectrum};

fn rel(a: f64, b: f64) -> f64 {
    ((a - b) / b).abs()
}

#[test]
fn visible_energy_checkpoints() {
    let q = QuenchingTransform::reference().unwrap();
    let grid = RecoilBinGrid::new(&RecoilGridConfig::default(), &q, M_PROTON_GEV).unwrap();
    assert_eq!(grid.len(), 175);
    assert!(rel(grid.e_vis[0], 4.812395531670816e-6) < 1e-6, "E_vis[0] = {}", grid.e_vis[0]);
    assert!(rel(grid.e_vis[174], 8.421692180423e-4) < 1e-6, "E_vis[174] = {}", grid.e_vis[174]);
}

#[test]
fn threshold_of_first_and_last_bins() {
    // E_min(0.1 MeV) ≈ 6.9 MeV; E_min(17.5 MeV) ≈ 99.8 MeV.
    let first = kinematic_threshold(1e-4, M_PROTON_GEV);
    let last = kinematic_threshold(0.0175, M_PROTON_GEV);
    assert!(rel(first, 0.006899533152558647) < 1e-12, "first = {first}");
    assert!(rel(last, 0.09977990317143043) < 1e-12, "last = {last}");
}

#[test]
fn integration_above_cutoff_is_zero() {
    let integrator = RateIntegrator::new(NcElasticCrossSection::default(), &IntegrationConfig::default());
    let energy: Array1<f64> = Array1::linspace(0.0, 0.1, 501);
    let fluence = energy.mapv(|e| 1e10 * (-e / 0.015).exp());
    for e_min in [0.1, 0.1000001, 0.5] {
        let r = integrator.rate(0.02, energy.view(), fluence.view(), e_min, 6e31, AxialSign::Neutrino);
        assert_eq!(r, 0.0);
    }
}

#[test]
fn electron_scattering_matches_closed_form() {
    // Flat spectra and flat cross-sections make interpolation exact, so
    // the table must equal the per-bin closed form bit for bit.
    let n_e = 2.438651797172892e32;
    let kamland_n_e = Detector::kamland().n_e().unwrap();
    assert!(rel(kamland_n_e, n_e) < 1e-14);

    let phi = [3.0e9, 2.0e9, 2.0e9, 2.5e9, 2.0e9, 2.0e9];
    let sigma = [9.0, 1.5, 1.5, 3.75, 1.25, 1.25];
    let energy_in = Array1::linspace(0.0, 0.1, 501);
    let fluence = FluenceSpectrum::new(
        energy_in,
        Array2::from_shape_fn((501, 6), |(_, j)| phi[j]),
    )
    .unwrap();
    let xs = CrossSectionTable::new(
        Array1::linspace(-4.0, 0.0, 81),
        Array2::from_shape_fn((81, 6), |(_, j)| sigma[j]),
    )
    .unwrap();

    let energy = energy_grid(&BasicGridConfig::default());
    let scale = bin_scale(energy.view(), REFERENCE_FLUENCE_BIN_WIDTH);
    let out = e_scat(&fluence, &xs, energy.view(), n_e, scale).unwrap();

    let x = |s: f64| s * 1e-38;
    let mut expected_total = 0.0f64;
    for (i, &e) in energy.iter().enumerate() {
        let nue = phi[0] * x(sigma[0]) * e * n_e * scale;
        let nuebar = phi[3] * x(sigma[3]) * e * n_e * scale;
        let nux = (phi[1] * 4.0) * x(sigma[1]) * e * n_e * scale;
        let expected = nue + nuebar + nux;
        assert_eq!(out[i].to_bits(), expected.to_bits(), "bin {i}");
        expected_total += expected;
    }
    assert_eq!(column_sum(out.view()).to_bits(), expected_total.to_bits());
}
