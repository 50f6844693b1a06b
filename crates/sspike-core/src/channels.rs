// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Channel Dispatch
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Channel families and the inputs shared by every rate computation.

use crate::detector::Detector;
use crate::io;
use crate::quenching::QuenchingTransform;
use crate::{basic, elastic};
use sspike_types::config::{PathConfig, RunConfig};
use sspike_types::error::{SspikeError, SspikeResult};
use sspike_types::state::{ChannelRateTable, CrossSectionTable, FluenceSpectrum};
use std::fmt;
use tracing::{debug, info, warn};

/// Loaded once per invocation and shared read-only.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub xs_ibd: CrossSectionTable,
    pub xs_nue_e: CrossSectionTable,
    pub quenching: QuenchingTransform,
}

impl ReferenceData {
    /// Read the cross-section tables from `paths.data_dir`. The quenching
    /// curve is taken from the same directory when present, otherwise the
    /// bundled curve is used.
    pub fn load(paths: &PathConfig, quenching_lookup_scale: f64) -> SspikeResult<Self> {
        let xs_ibd = io::read_cross_section(paths.xs_ibd())?;
        let xs_nue_e = io::read_cross_section(paths.xs_nue_e())?;
        let q_path = paths.quenching();
        let quenching = if q_path.is_file() {
            info!(path = %q_path.display(), "using quenching curve");
            QuenchingTransform::from_file(&q_path)?
        } else {
            debug!("using bundled quenching curve");
            if quenching_lookup_scale != 1.0 {
                warn!(
                    scale = quenching_lookup_scale,
                    path = %q_path.display(),
                    "bundled quenching curve is a single point; scaled lookups clamp to it"
                );
            }
            QuenchingTransform::reference()?
        };
        Ok(Self {
            xs_ibd,
            xs_nue_e,
            quenching: quenching.with_lookup_scale(quenching_lookup_scale),
        })
    }
}

/// Everything a channel computer reads.
#[derive(Debug, Clone, Copy)]
pub struct RateInputs<'a> {
    pub fluence: &'a FluenceSpectrum,
    pub reference: &'a ReferenceData,
    pub detector: &'a Detector,
    pub config: &'a RunConfig,
}

pub type ChannelComputer = fn(&RateInputs<'_>) -> SspikeResult<ChannelRateTable>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    /// IBD and electron scattering on the shared energy grid.
    Basic,
    /// Proton NC elastic scattering on the recoil grid.
    Elastic,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Basic, ChannelKind::Elastic];

    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Basic => "basic",
            ChannelKind::Elastic => "elastic",
        }
    }

    /// File name of the cached rate table.
    pub fn file_name(self) -> &'static str {
        match self {
            ChannelKind::Basic => "sspike-basic.csv",
            ChannelKind::Elastic => "sspike-elastic.csv",
        }
    }

    pub fn from_name(name: &str) -> SspikeResult<Self> {
        match name {
            "basic" | "basic_events" => Ok(ChannelKind::Basic),
            "elastic" | "elastic_events" => Ok(ChannelKind::Elastic),
            other => Err(SspikeError::ConfigError(format!("unknown channel '{other}'"))),
        }
    }

    pub fn computer(self) -> ChannelComputer {
        match self {
            ChannelKind::Basic => basic::basic_events,
            ChannelKind::Elastic => elastic::elastic_events,
        }
    }

    pub fn compute(self, inputs: &RateInputs<'_>) -> SspikeResult<ChannelRateTable> {
        (self.computer())(inputs)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
