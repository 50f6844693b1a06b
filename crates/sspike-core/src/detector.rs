// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Detector Descriptor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Target counts, visibility threshold and event selection per detector.

use crate::channels::ChannelKind;
use crate::elastic::TOTAL_COLUMN;
use crate::totals::CUT_CHANNEL;
use sspike_types::constants::{
    KAMLAND_ELECTRONS_PER_PROTON, KAMLAND_FIDUCIAL_RADIUS_CM, KAMLAND_LOW_CUT_GEV,
    KAMLAND_PROTON_DENSITY,
};
use sspike_types::error::{SspikeError, SspikeResult};
use sspike_types::state::EventTotalsTable;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// File type of the smeared, efficiency-weighted detector response.
pub const SMEARED_WEIGHTED: &str = "smeared_weighted";
pub const UNSMEARED_WEIGHTED: &str = "unsmeared_weighted";

/// One input to the event totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalSource {
    /// External detector-response table `snow-<file_type>.csv`.
    Response(String),
    /// A rate table computed here.
    Channel(ChannelKind),
}

impl TotalSource {
    /// Value of the `file` column in the totals table.
    pub fn file_type(&self) -> &str {
        match self {
            TotalSource::Response(t) => t,
            TotalSource::Channel(kind) => kind.name(),
        }
    }
}

/// Chooses which totals count as visible events. Returns
/// `(channel, events)` pairs in table order.
pub trait VisibleSelection: fmt::Debug + Send + Sync {
    fn select(&self, totals: &EventTotalsTable) -> Vec<(String, f64)>;
}

/// Keep the smeared, weighted detector response only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmearedWeighted;

impl VisibleSelection for SmearedWeighted {
    fn select(&self, totals: &EventTotalsTable) -> Vec<(String, f64)> {
        totals
            .rows
            .iter()
            .filter(|r| r.file == SMEARED_WEIGHTED)
            .map(|r| (r.channel.clone(), r.events))
            .collect()
    }
}

/// Smeared response plus the threshold-cut proton elastic total,
/// reported as `nc_p`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmearedWeightedWithProtonCut;

impl VisibleSelection for SmearedWeightedWithProtonCut {
    fn select(&self, totals: &EventTotalsTable) -> Vec<(String, f64)> {
        totals
            .rows
            .iter()
            .filter(|r| r.file == SMEARED_WEIGHTED || r.channel == CUT_CHANNEL)
            .map(|r| {
                let channel = if r.channel == CUT_CHANNEL {
                    TOTAL_COLUMN.to_string()
                } else {
                    r.channel.clone()
                };
                (channel, r.events)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Detector {
    pub name: String,
    /// Target protons in the fiducial volume.
    pub n_p: Option<f64>,
    /// Target electrons in the fiducial volume.
    pub n_e: Option<f64>,
    /// Visible-energy threshold [GeV].
    pub low_cut: f64,
    pub channels: Vec<ChannelKind>,
    pub total_files: Vec<TotalSource>,
    pub selection: Arc<dyn VisibleSelection>,
}

impl Detector {
    /// KamLAND inside a 6 m fiducial radius.
    pub fn kamland() -> Self {
        let r = KAMLAND_FIDUCIAL_RADIUS_CM;
        let n_p = 4.0 * PI * KAMLAND_PROTON_DENSITY * r.powi(3) / 3.0;
        Detector {
            name: "kamland".to_string(),
            n_p: Some(n_p),
            n_e: Some(n_p * KAMLAND_ELECTRONS_PER_PROTON),
            low_cut: KAMLAND_LOW_CUT_GEV,
            channels: vec![ChannelKind::Basic, ChannelKind::Elastic],
            total_files: vec![
                TotalSource::Response(UNSMEARED_WEIGHTED.to_string()),
                TotalSource::Response(SMEARED_WEIGHTED.to_string()),
                TotalSource::Channel(ChannelKind::Basic),
                TotalSource::Channel(ChannelKind::Elastic),
            ],
            selection: Arc::new(SmearedWeightedWithProtonCut),
        }
    }

    pub fn from_name(name: &str) -> SspikeResult<Self> {
        match name {
            "kamland" => Ok(Self::kamland()),
            other => Err(SspikeError::UnknownDetector(other.to_string())),
        }
    }

    pub fn with_low_cut(mut self, low_cut: f64) -> Self {
        self.low_cut = low_cut;
        self
    }

    pub fn n_p(&self) -> SspikeResult<f64> {
        self.n_p.ok_or_else(|| SspikeError::MissingTargets {
            detector: self.name.clone(),
            target: "proton".to_string(),
        })
    }

    pub fn n_e(&self) -> SspikeResult<f64> {
        self.n_e.ok_or_else(|| SspikeError::MissingTargets {
            detector: self.name.clone(),
            target: "electron".to_string(),
        })
    }

    pub fn select_visible(&self, totals: &EventTotalsTable) -> Vec<(String, f64)> {
        self.selection.select(totals)
    }
}
