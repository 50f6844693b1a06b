// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cached orchestration of one run: rate tables → event totals →
//! visible totals.
//!
//! Fluence and reference tables are read only on a cache miss.

use crate::cache::{get_or_compute, Artifact, CacheKey, TableCache};
use crate::channels::{ChannelKind, RateInputs, ReferenceData};
use crate::detector::{Detector, TotalSource};
use crate::io;
use crate::supernova::Supernova;
use crate::totals::source_totals;
use sspike_types::config::RunConfig;
use sspike_types::error::SspikeResult;
use sspike_types::state::{
    ChannelRateTable, EventTotalsTable, FluenceSpectrum, VisibleRow, VisibleTotalsTable,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Time bin of a time-integrated run.
const INTEGRATED_BIN: usize = 0;

pub struct Pipeline<'a> {
    config: &'a RunConfig,
    supernova: Supernova,
    detector: Detector,
    cache: &'a dyn TableCache,
    key: CacheKey,
    fluence: OnceLock<FluenceSpectrum>,
    reference: OnceLock<ReferenceData>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig, cache: &'a dyn TableCache) -> SspikeResult<Self> {
        config.validate()?;
        let supernova = Supernova::from_config(config)?;
        let mut detector = Detector::from_name(&config.detector)?;
        if let Some(cut) = config.low_cut {
            detector = detector.with_low_cut(cut);
        }
        let settings = config.settings_fingerprint()?;
        let key = CacheKey::new(&supernova, &detector.name, INTEGRATED_BIN, &settings);
        Ok(Pipeline {
            config,
            supernova,
            detector,
            cache,
            key,
            fluence: OnceLock::new(),
            reference: OnceLock::new(),
        })
    }

    /// Use already loaded inputs instead of reading them from disk.
    pub fn with_inputs(self, fluence: FluenceSpectrum, reference: ReferenceData) -> Self {
        let _ = self.fluence.set(fluence);
        let _ = self.reference.set(reference);
        self
    }

    pub fn supernova(&self) -> &Supernova {
        &self.supernova
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    fn fluence_path(&self) -> PathBuf {
        match &self.config.paths.fluence_file {
            Some(path) => path.clone(),
            None => self
                .supernova
                .fluence_path(&self.config.paths.fluence_dir, self.key.bin_index),
        }
    }

    fn fluence(&self) -> SspikeResult<&FluenceSpectrum> {
        if let Some(f) = self.fluence.get() {
            return Ok(f);
        }
        self.supernova.require_single_bin()?;
        let path = self.fluence_path();
        info!(path = %path.display(), "loading fluence");
        let fluence = io::read_fluence(&path)?;
        Ok(self.fluence.get_or_init(|| fluence))
    }

    fn reference(&self) -> SspikeResult<&ReferenceData> {
        if let Some(r) = self.reference.get() {
            return Ok(r);
        }
        let reference = ReferenceData::load(&self.config.paths, self.config.quenching_lookup_scale)?;
        Ok(self.reference.get_or_init(|| reference))
    }

    fn compute_rates(&self, kind: ChannelKind) -> SspikeResult<ChannelRateTable> {
        self.supernova.require_single_bin()?;
        let inputs = RateInputs {
            fluence: self.fluence()?,
            reference: self.reference()?,
            detector: &self.detector,
            config: self.config,
        };
        info!(sn = %self.supernova.sn_name, channel = %kind, "computing rates");
        kind.compute(&inputs)
    }

    /// Rate table of one channel, from the cache when present.
    pub fn rate_table(&self, kind: ChannelKind) -> SspikeResult<ChannelRateTable> {
        get_or_compute(self.cache, &self.key, Artifact::Rates(kind), || {
            self.compute_rates(kind)
        })
    }

    /// Rate tables of every channel the detector uses, in detector order.
    pub fn rate_tables(&self) -> SspikeResult<Vec<(ChannelKind, ChannelRateTable)>> {
        self.detector
            .channels
            .iter()
            .map(|&kind| Ok((kind, self.rate_table(kind)?)))
            .collect()
    }

    /// Directory holding the external detector-response tables of this run.
    fn response_dir(&self) -> PathBuf {
        let root = self
            .config
            .paths
            .snow_dir
            .as_ref()
            .unwrap_or(&self.config.paths.cache_dir);
        root.join(self.key.relative_dir())
    }

    fn compute_totals(&self) -> SspikeResult<EventTotalsTable> {
        let mut rows = Vec::new();
        for source in &self.detector.total_files {
            let table = match source {
                TotalSource::Channel(kind) => self.rate_table(*kind)?,
                TotalSource::Response(file_type) => {
                    let path = self.response_dir().join(format!("snow-{file_type}.csv"));
                    if !path.is_file() {
                        warn!(path = %path.display(), "detector response not found, skipping");
                        continue;
                    }
                    io::read_response_table(&path)?
                }
            };
            rows.extend(source_totals(source, &table, self.detector.low_cut)?);
        }
        Ok(EventTotalsTable { rows })
    }

    /// Summed events per (file type, channel).
    pub fn event_totals(&self) -> SspikeResult<EventTotalsTable> {
        get_or_compute(self.cache, &self.key, Artifact::Totals, || self.compute_totals())
    }

    fn compute_visible(&self) -> SspikeResult<VisibleTotalsTable> {
        let totals = self.event_totals()?;
        let progenitor = self.supernova.progenitor_values();
        let rows = self
            .detector
            .select_visible(&totals)
            .into_iter()
            .map(|(channel, events)| VisibleRow {
                model: self.supernova.model.clone(),
                progenitor: progenitor.clone(),
                channel,
                events,
            })
            .collect();
        Ok(VisibleTotalsTable {
            progenitor_keys: self.supernova.progenitor_keys(),
            rows,
        })
    }

    /// Detector-visible events, prefixed with model and progenitor values.
    pub fn visible_totals(&self) -> SspikeResult<VisibleTotalsTable> {
        get_or_compute(self.cache, &self.key, Artifact::VisibleTotals, || {
            self.compute_visible()
        })
    }
}

/// Visible totals of every run, in order.
pub fn run_all(configs: &[RunConfig], cache: &dyn TableCache) -> SspikeResult<Vec<VisibleTotalsTable>> {
    configs
        .iter()
        .map(|cfg| Pipeline::new(cfg, cache)?.visible_totals())
        .collect()
}
