// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Proton Elastic Channel
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Neutral-current ν + p → ν + p rates on a proton recoil grid.
//!
//! For each recoil bin the four flavor rates are integrated independently
//! (bins run in parallel), then summed into `nc_p` in a fixed order.

use crate::channels::RateInputs;
use crate::cross_section::{AxialSign, NcElasticCrossSection};
use crate::integrator::{kinematic_threshold, RateIntegrator};
use crate::quenching::QuenchingTransform;
use ndarray::Array1;
use rayon::prelude::*;
use sspike_math::interp::arange;
use sspike_types::config::RecoilGridConfig;
use sspike_types::error::{SspikeError, SspikeResult};
use sspike_types::state::{ChannelRateTable, Flavor};
use tracing::debug;

/// Elastic rate columns and the fluence each one integrates, in
/// summation order.
pub const ELASTIC_CHANNELS: [(&str, Flavor); 4] = [
    ("nc_nue_p", Flavor::NuE),
    ("nc_nuebar_p", Flavor::ANuE),
    ("nc_nux_p", Flavor::NuMu),
    ("nc_nuxbar_p", Flavor::ANuMu),
];

/// Name of the summed elastic column.
pub const TOTAL_COLUMN: &str = "nc_p";

/// Proton recoil bins with their visible energy and kinematic threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoilBinGrid {
    pub t_p: Array1<f64>,
    pub e_vis: Array1<f64>,
    pub e_min: Array1<f64>,
}

impl RecoilBinGrid {
    pub fn new(
        cfg: &RecoilGridConfig,
        quenching: &QuenchingTransform,
        m_p: f64,
    ) -> SspikeResult<Self> {
        let t_p = arange(cfg.start, cfg.stop, cfg.step);
        if t_p.len() < 2 {
            return Err(SspikeError::Precondition(format!(
                "recoil grid needs at least two bins, got {}",
                t_p.len()
            )));
        }
        let e_vis = quenching.visible_energies(t_p.view());
        let e_min = t_p.mapv(|t| kinematic_threshold(t, m_p));
        Ok(Self { t_p, e_vis, e_min })
    }

    pub fn len(&self) -> usize {
        self.t_p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_p.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        self.t_p[1] - self.t_p[0]
    }
}

fn axial_sign(flavor: Flavor, flip: bool) -> AxialSign {
    if flip && flavor.is_antineutrino() {
        AxialSign::Antineutrino
    } else {
        AxialSign::Neutrino
    }
}

/// Table `T_p E_vis E_min nc_nue_p nc_nuebar_p nc_nux_p nc_nuxbar_p nc_p`.
pub fn elastic_events(inputs: &RateInputs<'_>) -> SspikeResult<ChannelRateTable> {
    let cfg = inputs.config;
    let n_p = inputs.detector.n_p()?;
    let grid = RecoilBinGrid::new(&cfg.recoil_grid, &inputs.reference.quenching, cfg.physics.m_p)?;

    let bin_scale = grid.bin_width() / cfg.integration.reference_bin_width;
    let scale = n_p * bin_scale;
    let integrator = RateIntegrator::new(NcElasticCrossSection::new(cfg.physics), &cfg.integration);
    let fluence = inputs.fluence;
    let energy = fluence.energy();
    let signs = ELASTIC_CHANNELS.map(|(_, f)| axial_sign(f, cfg.antineutrino_axial_flip));

    debug!(bins = grid.len(), scale, "integrating elastic channel");

    let per_bin: Vec<[f64; 4]> = (0..grid.len())
        .into_par_iter()
        .map(|i| {
            let t_p = grid.t_p[i];
            let e_min = grid.e_min[i];
            let mut row = [0.0; 4];
            for (k, (_, flavor)) in ELASTIC_CHANNELS.iter().enumerate() {
                row[k] = integrator.rate(t_p, energy, fluence.flavor(*flavor), e_min, scale, signs[k]);
            }
            row
        })
        .collect();

    let n = grid.len();
    let mut table = ChannelRateTable::new();
    table.push_grid("T_p", grid.t_p)?;
    table.push_grid("E_vis", grid.e_vis)?;
    table.push_grid("E_min", grid.e_min)?;

    let mut total = Array1::<f64>::zeros(n);
    for (k, (name, _)) in ELASTIC_CHANNELS.iter().enumerate() {
        let column = Array1::from_shape_fn(n, |i| per_bin[i][k]);
        total += &column;
        table.push_rate(*name, column)?;
    }
    table.push_rate(TOTAL_COLUMN, total)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ReferenceData;
    use crate::detector::Detector;
    use ndarray::Array2;
    use sspike_types::config::RunConfig;
    use sspike_types::constants::M_PROTON_GEV;
    use sspike_types::state::{CrossSectionTable, FluenceSpectrum, QuenchingCurve};

    fn unit_quenching() -> QuenchingTransform {
        QuenchingTransform::new(QuenchingCurve::from_pairs(&[(0.0, 1.0), (1.0, 1.0)]).unwrap())
    }

    fn small_config(flip: bool) -> RunConfig {
        let mut cfg = RunConfig::new("Fornax_2021");
        cfg.recoil_grid.stop = 0.0011;
        cfg.recoil_grid.step = 2e-4;
        cfg.antineutrino_axial_flip = flip;
        cfg
    }

    /// Pinched spectrum, each flavor column scaled differently.
    fn fluence() -> FluenceSpectrum {
        let energy: Array1<f64> = Array1::linspace(0.0, 0.1, 501);
        let values = Array2::from_shape_fn((501, 6), |(i, j)| {
            let e = energy[i];
            (1.0 + 0.1 * j as f64) * 1e10 * e * e * (-e / 0.012).exp()
        });
        FluenceSpectrum::new(energy, values).unwrap()
    }

    fn events(cfg: &RunConfig) -> ChannelRateTable {
        let fluence = fluence();
        let xs = CrossSectionTable::new(
            Array1::linspace(-4.0, 0.0, 41),
            Array2::from_elem((41, 6), 1.0),
        )
        .unwrap();
        let reference = ReferenceData {
            xs_ibd: xs.clone(),
            xs_nue_e: xs,
            quenching: unit_quenching(),
        };
        let detector = Detector::from_name("kamland").unwrap();
        elastic_events(&RateInputs {
            fluence: &fluence,
            reference: &reference,
            detector: &detector,
            config: cfg,
        })
        .unwrap()
    }

    #[test]
    fn test_default_grid_has_175_bins() {
        let grid =
            RecoilBinGrid::new(&RecoilGridConfig::default(), &unit_quenching(), M_PROTON_GEV).unwrap();
        assert_eq!(grid.len(), 175);
        assert_eq!(grid.t_p[0], 1e-4);
        assert!((grid.t_p[174] - 0.0175).abs() < 1e-15);
        assert!((grid.bin_width() - 1e-4).abs() < 1e-18);
        assert_eq!(grid.e_vis, grid.t_p);
        for w in grid.e_min.windows(2) {
            assert!(w[1] > w[0]);
        }
    }

    #[test]
    fn test_single_bin_grid_rejected() {
        let cfg = RecoilGridConfig {
            start: 1e-4,
            stop: 1.5e-4,
            step: 1e-4,
        };
        assert!(RecoilBinGrid::new(&cfg, &unit_quenching(), M_PROTON_GEV).is_err());
    }

    #[test]
    fn test_axial_flip_only_for_antineutrinos() {
        assert_eq!(axial_sign(Flavor::ANuE, true), AxialSign::Antineutrino);
        assert_eq!(axial_sign(Flavor::NuE, true), AxialSign::Neutrino);
        assert_eq!(axial_sign(Flavor::ANuMu, false), AxialSign::Neutrino);
    }

    #[test]
    fn test_channel_order() {
        let names: Vec<&str> = ELASTIC_CHANNELS.iter().map(|c| c.0).collect();
        assert_eq!(names, ["nc_nue_p", "nc_nuebar_p", "nc_nux_p", "nc_nuxbar_p"]);
    }

    #[test]
    fn test_total_is_ordered_flavor_sum() {
        let table = events(&small_config(false));
        assert_eq!(table.len(), 5);
        let total = table.require(TOTAL_COLUMN).unwrap();
        for i in 0..table.len() {
            let mut sum = 0.0;
            for (name, _) in ELASTIC_CHANNELS {
                sum += table.require(name).unwrap()[i];
            }
            assert_eq!(total[i].to_bits(), sum.to_bits(), "bin {i}");
            assert!(total[i] > 0.0);
        }
    }

    #[test]
    fn test_flavor_columns_match_single_bin_rates() {
        let cfg = small_config(true);
        let table = events(&cfg);
        let fluence = fluence();
        let n_p = Detector::from_name("kamland").unwrap().n_p().unwrap();
        let t_p = table.require("T_p").unwrap();
        let e_min = table.require("E_min").unwrap();
        let scale = n_p * ((t_p[1] - t_p[0]) / cfg.integration.reference_bin_width);
        let integrator = RateIntegrator::new(NcElasticCrossSection::new(cfg.physics), &cfg.integration);

        for (name, flavor) in ELASTIC_CHANNELS {
            let column = table.require(name).unwrap();
            let sign = axial_sign(flavor, true);
            for i in 0..table.len() {
                let expected =
                    integrator.rate(t_p[i], fluence.energy(), fluence.flavor(flavor), e_min[i], scale, sign);
                assert_eq!(column[i].to_bits(), expected.to_bits(), "{name} bin {i}");
            }
        }
    }

    #[test]
    fn test_flip_changes_only_antineutrino_columns() {
        let plain = events(&small_config(false));
        let flipped = events(&small_config(true));
        for (name, flavor) in ELASTIC_CHANNELS {
            let a = plain.require(name).unwrap();
            let b = flipped.require(name).unwrap();
            if flavor.is_antineutrino() {
                for i in 0..a.len() {
                    assert_ne!(a[i], b[i], "{name} bin {i}");
                }
            } else {
                assert_eq!(a, b, "{name}");
            }
        }
        assert_eq!(plain.require("E_vis").unwrap(), flipped.require("E_vis").unwrap());
    }

    #[test]
    fn test_thread_count_does_not_change_rates() {
        let cfg = small_config(true);
        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let several = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let one = single.install(|| events(&cfg));
        let four = several.install(|| events(&cfg));
        for column in one.columns() {
            let other = four.require(&column.name).unwrap();
            for (x, y) in column.values.iter().zip(other) {
                assert_eq!(x.to_bits(), y.to_bits(), "{}", column.name);
            }
        }
    }
}
