// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Supernova Run Identity
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Model family, progenitor and observation settings of one run, with
//! the short names used for file layout.

use sspike_types::config::{ParamValue, Progenitor, RunConfig};
use sspike_types::error::{SspikeError, SspikeResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Supernova {
    pub model: String,
    pub progenitor: Progenitor,
    pub transform: String,
    /// Distance [kpc].
    pub distance: f64,
    pub t_bins: usize,
    /// Short name, e.g. `N13-20-20-300`.
    pub sn_name: String,
    /// Simulation file of the model family.
    pub sim_file: String,
    /// Simulation start and end time [s], where the family defines them.
    pub time_limits: Option<(f64, f64)>,
}

fn param<'a>(model: &str, progenitor: &'a Progenitor, key: &str) -> SspikeResult<&'a ParamValue> {
    progenitor.get(key).ok_or_else(|| {
        SspikeError::ConfigError(format!("{model} requires progenitor parameter '{key}'"))
    })
}

fn numeric(model: &str, progenitor: &Progenitor, key: &str) -> SspikeResult<f64> {
    let value = param(model, progenitor, key)?;
    value.as_f64().ok_or_else(|| {
        SspikeError::ConfigError(format!("{model}: progenitor '{key}' = {value} is not numeric"))
    })
}

/// Directory abbreviation of a flavor transformation.
pub fn transform_abbreviation(transform: &str) -> &str {
    match transform {
        "NoTransformation" => "NT",
        other => other,
    }
}

impl Supernova {
    pub fn new(
        model: &str,
        progenitor: Progenitor,
        transform: &str,
        distance: f64,
        t_bins: usize,
    ) -> SspikeResult<Self> {
        let p = &progenitor;
        let (sn_name, sim_file, time_limits) = match model {
            "Fornax_2021" => {
                let mass = param(model, p, "mass")?;
                (
                    format!("F21-{mass}"),
                    format!("lum_spec_{mass}M_r10000_dat.h5"),
                    Some((-0.2135, 4.4885)),
                )
            }
            "Kuroda_2020" => {
                let omega = param(model, p, "omega")?;
                let b0 = param(model, p, "B0")?;
                (
                    format!("K20-{omega}-{b0}"),
                    format!("LnuR{omega}B{b0}.dat"),
                    Some((-0.00482311, 0.316403)),
                )
            }
            "Nakazato_2013" => {
                let mass = param(model, p, "mass")?;
                let metal_value = param(model, p, "metal")?;
                let metal = numeric(model, p, "metal")?;
                let t_rev = param(model, p, "t_rev")?;
                let metal_code = (metal * 1e3) as i64;
                (
                    format!("N13-{mass}-{metal_code:02}-{t_rev}"),
                    format!("nakazato-shen-z{metal_value}-t_rev{t_rev}ms-s{mass}.0.fits"),
                    Some((-0.05, 20.0)),
                )
            }
            "Sukhbold_2015" => {
                let mass_value = param(model, p, "mass")?;
                let mass = numeric(model, p, "mass")?;
                let eos = param(model, p, "eos")?;
                // File prefix differs between the two progenitors.
                let prefix = if mass == 27.0 {
                    's'
                } else if mass == 9.6 {
                    'z'
                } else {
                    return Err(SspikeError::ConfigError(format!(
                        "Sukhbold_2015 has progenitors of 9.6 and 27.0 solar masses, got {mass}"
                    )));
                };
                (
                    format!("S15-{mass_value}-{eos}"),
                    format!("sukhbold-{eos}-{prefix}{mass:.1}.fits"),
                    None,
                )
            }
            "Tamborra_2014" => {
                let mass = param(model, p, "mass")?;
                (format!("T14-{mass}"), format!("s{mass}c_3D_dir1"), None)
            }
            "Walk_2018" => ("W18".to_string(), "s15.0c_3D_nonrot_dir1".to_string(), None),
            "Walk_2019" => ("W19".to_string(), "s40.0c_3DBH_dir1".to_string(), None),
            "Warren_2020" => {
                let mass = param(model, p, "mass")?;
                let stir = param(model, p, "stir")?;
                (
                    format!("W20-{mass}-{stir}"),
                    format!("stir_a{stir}/stir_multimessenger_a{stir}_m{mass}.h5"),
                    Some((-1.5788003, 1.6835847)),
                )
            }
            other => return Err(SspikeError::UnknownModel(other.to_string())),
        };

        Ok(Supernova {
            model: model.to_string(),
            progenitor,
            transform: transform.to_string(),
            distance,
            t_bins,
            sn_name,
            sim_file,
            time_limits,
        })
    }

    pub fn from_config(cfg: &RunConfig) -> SspikeResult<Self> {
        Self::new(
            &cfg.model,
            cfg.progenitor.clone(),
            &cfg.transform,
            cfg.distance,
            cfg.t_bins,
        )
    }

    pub fn xform(&self) -> &str {
        transform_abbreviation(&self.transform)
    }

    /// `<distance>kpc-<xform>`, the per-observation directory name.
    pub fn observation_name(&self) -> String {
        format!("{}kpc-{}", distance_label(self.distance), self.xform())
    }

    /// Progenitor values in key order, as written in visible totals.
    pub fn progenitor_values(&self) -> Vec<String> {
        self.progenitor.values().map(|v| v.to_string()).collect()
    }

    pub fn progenitor_keys(&self) -> Vec<String> {
        self.progenitor.keys().cloned().collect()
    }

    /// Rates are only computed for time-integrated (single bin) runs.
    pub fn require_single_bin(&self) -> SspikeResult<()> {
        if self.t_bins != 1 {
            return Err(SspikeError::Precondition(format!(
                "{}: fluence is only available for t_bins = 1, got {}",
                self.sn_name, self.t_bins
            )));
        }
        Ok(())
    }

    /// `<fluence_dir>/<sn_name>/<distance>kpc-<xform>/fluence_bin<i>.dat`
    pub fn fluence_path(&self, fluence_dir: &Path, bin_index: usize) -> PathBuf {
        fluence_dir
            .join(&self.sn_name)
            .join(self.observation_name())
            .join(format!("fluence_bin{bin_index}.dat"))
    }
}

/// Distance as written in directory names. Whole numbers keep one
/// decimal (`5.0`), anything else prints in shortest form (`2.5`).
pub fn distance_label(distance: f64) -> String {
    if distance.fract() == 0.0 {
        format!("{distance:.1}")
    } else {
        format!("{distance}")
    }
}
