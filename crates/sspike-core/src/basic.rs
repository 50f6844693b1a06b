// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Basic Channels
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Inverse beta decay and neutrino-electron scattering.
//!
//! Per bin: events = Φ(E) · σ(E) · E · N_target · (ΔE / ΔE_ref), with
//! fluence and tabulated cross-section both interpolated onto the
//! shared energy grid. No integration is involved.

use crate::channels::RateInputs;
use ndarray::{Array1, ArrayView1, Zip};
use sspike_math::interp::{interp_many, linspace};
use sspike_types::config::BasicGridConfig;
use sspike_types::constants::XS_TABLE_SCALE;
use sspike_types::error::SspikeResult;
use sspike_types::state::{ChannelRateTable, CrossSectionTable, Flavor, FluenceSpectrum};

/// Muon and tau flavors (ν and ν̄) share one spectrum.
const NUX_MULTIPLICITY: f64 = 4.0;

/// Energy grid of the basic channels [GeV].
pub fn energy_grid(cfg: &BasicGridConfig) -> Array1<f64> {
    linspace(cfg.e_min, cfg.e_max, cfg.points)
}

/// Width of the grid relative to the fluence reference bin width.
pub fn bin_scale(energy: ArrayView1<f64>, reference_bin_width: f64) -> f64 {
    (energy[1] - energy[0]) / reference_bin_width
}

/// Cross-section column [cm² GeV⁻¹] interpolated onto `energy`.
fn table_xs(
    table: &CrossSectionTable,
    flavor: Flavor,
    energy: ArrayView1<f64>,
) -> SspikeResult<Array1<f64>> {
    let xs_energy = table.energy_gev();
    let xs = table.flavor(flavor)?.mapv(|v| v * XS_TABLE_SCALE);
    Ok(interp_many(energy, xs_energy.view(), xs.view()))
}

fn fluence_on(fluence: &FluenceSpectrum, flavor: Flavor, energy: ArrayView1<f64>) -> Array1<f64> {
    interp_many(energy, fluence.energy(), fluence.flavor(flavor))
}

/// Φ · σ · E · N · scale, evaluated left to right per bin.
fn events(
    flux: &Array1<f64>,
    xs: &Array1<f64>,
    energy: ArrayView1<f64>,
    n_targets: f64,
    scale: f64,
) -> Array1<f64> {
    Zip::from(flux)
        .and(xs)
        .and(energy)
        .map_collect(|&f, &x, &e| f * x * e * n_targets * scale)
}

/// ν̄_e + p → e⁺ + n per energy bin.
pub fn ibd_events(
    fluence: &FluenceSpectrum,
    xs_ibd: &CrossSectionTable,
    energy: ArrayView1<f64>,
    n_p: f64,
    scale: f64,
) -> SspikeResult<Array1<f64>> {
    let flux = fluence_on(fluence, Flavor::ANuE, energy);
    let xs = table_xs(xs_ibd, Flavor::ANuE, energy)?;
    Ok(events(&flux, &xs, energy, n_p, scale))
}

/// ν + e⁻ → ν + e⁻ summed over flavors per energy bin.
///
/// The ν_x term uses the ν_μ spectrum and cross-section, weighted ×4.
pub fn e_scat(
    fluence: &FluenceSpectrum,
    xs_e: &CrossSectionTable,
    energy: ArrayView1<f64>,
    n_e: f64,
    scale: f64,
) -> SspikeResult<Array1<f64>> {
    let nue = events(
        &fluence_on(fluence, Flavor::NuE, energy),
        &table_xs(xs_e, Flavor::NuE, energy)?,
        energy,
        n_e,
        scale,
    );
    let nuebar = events(
        &fluence_on(fluence, Flavor::ANuE, energy),
        &table_xs(xs_e, Flavor::ANuE, energy)?,
        energy,
        n_e,
        scale,
    );
    let nux = events(
        &fluence_on(fluence, Flavor::NuMu, energy).mapv(|f| f * NUX_MULTIPLICITY),
        &table_xs(xs_e, Flavor::NuMu, energy)?,
        energy,
        n_e,
        scale,
    );
    Ok(nue + &nuebar + &nux)
}

/// Table `E ibd e` on the basic energy grid.
pub fn basic_events(inputs: &RateInputs<'_>) -> SspikeResult<ChannelRateTable> {
    let cfg = inputs.config;
    let (n_p, n_e) = (inputs.detector.n_p()?, inputs.detector.n_e()?);
    let energy = energy_grid(&cfg.basic_grid);
    let scale = bin_scale(energy.view(), cfg.integration.reference_bin_width);

    let ibd = ibd_events(inputs.fluence, &inputs.reference.xs_ibd, energy.view(), n_p, scale)?;
    let e = e_scat(inputs.fluence, &inputs.reference.xs_nue_e, energy.view(), n_e, scale)?;

    let mut table = ChannelRateTable::new();
    table.push_grid("E", energy)?;
    table.push_rate("ibd", ibd)?;
    table.push_rate("e", e)?;
    Ok(table)
}
