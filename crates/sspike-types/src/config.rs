// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{PhysicsConstants, REFERENCE_FLUENCE_BIN_WIDTH, SPECTRUM_UPPER_ENERGY};
use crate::error::{SspikeError, SspikeResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A progenitor parameter: numeric (mass, metallicity) or a label (EoS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            ParamValue::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Model-specific progenitor parameters, keyed by name.
pub type Progenitor = BTreeMap<String, ParamValue>;

/// One supernova/detector run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Supernova model family, e.g. "Nakazato_2013".
    pub model: String,
    #[serde(default)]
    pub progenitor: Progenitor,
    #[serde(default = "default_transform")]
    pub transform: String,
    /// Distance to the supernova [kpc].
    #[serde(default = "default_distance")]
    pub distance: f64,
    #[serde(default = "default_detector")]
    pub detector: String,
    #[serde(default = "default_t_bins")]
    pub t_bins: usize,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub recoil_grid: RecoilGridConfig,
    #[serde(default)]
    pub basic_grid: BasicGridConfig,
    #[serde(default)]
    pub physics: PhysicsConstants,
    /// Evaluate antineutrino NC channels with the flipped axial sign.
    /// Off by default to match recorded rates.
    #[serde(default)]
    pub antineutrino_axial_flip: bool,
    /// Multiplier applied to T_p [GeV] before the quenching-curve lookup.
    /// 1.0 reproduces recorded rates; 1e3 looks up a MeV-abscissa curve in MeV.
    #[serde(default = "default_quenching_lookup_scale")]
    pub quenching_lookup_scale: f64,
    /// Visible-energy threshold of the `nc_p_cut` total [GeV]. Falls back
    /// to the detector's own cut.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_cut: Option<f64>,
}

fn default_transform() -> String {
    "NoTransformation".to_string()
}
fn default_distance() -> f64 {
    5.0
}
fn default_detector() -> String {
    "kamland".to_string()
}
fn default_t_bins() -> usize {
    1
}
fn default_quenching_lookup_scale() -> f64 {
    1.0
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory holding `xs_ibd.dat`, `xs_nue_e.dat` and optionally
    /// `proton_quenching.csv`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Root of externally generated fluence files.
    #[serde(default = "default_fluence_dir")]
    pub fluence_dir: PathBuf,
    /// Root of the on-disk rate/totals cache.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Directory with external detector-response tables (`snow-*.csv`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_dir: Option<PathBuf>,
    /// Explicit fluence file, bypassing the `fluence_dir` layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluence_file: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_fluence_dir() -> PathBuf {
    PathBuf::from("fluences")
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("sspike-cache")
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            data_dir: default_data_dir(),
            fluence_dir: default_fluence_dir(),
            cache_dir: default_cache_dir(),
            snow_dir: None,
            fluence_file: None,
        }
    }
}

impl PathConfig {
    pub fn xs_ibd(&self) -> PathBuf {
        self.data_dir.join("xs_ibd.dat")
    }

    pub fn xs_nue_e(&self) -> PathBuf {
        self.data_dir.join("xs_nue_e.dat")
    }

    pub fn quenching(&self) -> PathBuf {
        self.data_dir.join("proton_quenching.csv")
    }
}

/// Settings for the fluence × cross-section integrals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Upper neutrino energy of the integral [GeV].
    #[serde(default = "default_upper_energy")]
    pub upper_energy: f64,
    #[serde(default = "default_epsabs")]
    pub epsabs: f64,
    #[serde(default = "default_epsrel")]
    pub epsrel: f64,
    /// Maximum subintervals per smooth segment.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Bin width the input fluences are normalised to [GeV].
    #[serde(default = "default_reference_bin_width")]
    pub reference_bin_width: f64,
}

fn default_upper_energy() -> f64 {
    SPECTRUM_UPPER_ENERGY
}
fn default_epsabs() -> f64 {
    0.0
}
fn default_epsrel() -> f64 {
    1e-8
}
fn default_limit() -> usize {
    200
}
fn default_reference_bin_width() -> f64 {
    REFERENCE_FLUENCE_BIN_WIDTH
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            upper_energy: default_upper_energy(),
            epsabs: default_epsabs(),
            epsrel: default_epsrel(),
            limit: default_limit(),
            reference_bin_width: default_reference_bin_width(),
        }
    }
}

/// Proton recoil grid, `arange(start, stop, step)` with exclusive stop [GeV].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecoilGridConfig {
    #[serde(default = "default_recoil_start")]
    pub start: f64,
    #[serde(default = "default_recoil_stop")]
    pub stop: f64,
    #[serde(default = "default_recoil_step")]
    pub step: f64,
}

fn default_recoil_start() -> f64 {
    1e-4
}
// Maximum recoil from a 100 MeV neutrino is 17.5 MeV.
fn default_recoil_stop() -> f64 {
    0.0176
}
fn default_recoil_step() -> f64 {
    1e-4
}

impl Default for RecoilGridConfig {
    fn default() -> Self {
        RecoilGridConfig {
            start: default_recoil_start(),
            stop: default_recoil_stop(),
            step: default_recoil_step(),
        }
    }
}

/// Neutrino energy grid of the IBD / electron-scattering channels,
/// `linspace(e_min, e_max, points)` [GeV]. Matches SNOwGLoBES binning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BasicGridConfig {
    #[serde(default = "default_basic_min")]
    pub e_min: f64,
    #[serde(default = "default_basic_max")]
    pub e_max: f64,
    #[serde(default = "default_basic_points")]
    pub points: usize,
}

fn default_basic_min() -> f64 {
    7.49e-4
}
fn default_basic_max() -> f64 {
    9.975e-2
}
fn default_basic_points() -> usize {
    200
}

impl Default for BasicGridConfig {
    fn default() -> Self {
        BasicGridConfig {
            e_min: default_basic_min(),
            e_max: default_basic_max(),
            points: default_basic_points(),
        }
    }
}

impl RunConfig {
    /// Configuration with defaults for everything but the model.
    pub fn new(model: impl Into<String>) -> Self {
        RunConfig {
            model: model.into(),
            progenitor: Progenitor::new(),
            transform: default_transform(),
            distance: default_distance(),
            detector: default_detector(),
            t_bins: default_t_bins(),
            paths: PathConfig::default(),
            integration: IntegrationConfig::default(),
            recoil_grid: RecoilGridConfig::default(),
            basic_grid: BasicGridConfig::default(),
            physics: PhysicsConstants::default(),
            antineutrino_axial_flip: false,
            quenching_lookup_scale: default_quenching_lookup_scale(),
            low_cut: None,
        }
    }

    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> SspikeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SspikeResult<()> {
        if self.model.trim().is_empty() {
            return Err(SspikeError::ConfigError("model must not be empty".to_string()));
        }
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(SspikeError::ConfigError(format!(
                "distance must be finite and > 0, got {}",
                self.distance
            )));
        }
        if self.t_bins == 0 {
            return Err(SspikeError::ConfigError("t_bins must be >= 1".to_string()));
        }
        let ig = &self.integration;
        if !(ig.upper_energy > 0.0) {
            return Err(SspikeError::ConfigError(format!(
                "integration.upper_energy must be > 0, got {}",
                ig.upper_energy
            )));
        }
        if ig.epsabs < 0.0 || ig.epsrel < 0.0 || (ig.epsabs == 0.0 && ig.epsrel == 0.0) {
            return Err(SspikeError::ConfigError(
                "integration tolerances must be >= 0 and not both zero".to_string(),
            ));
        }
        if ig.limit == 0 {
            return Err(SspikeError::ConfigError("integration.limit must be >= 1".to_string()));
        }
        if !(ig.reference_bin_width > 0.0) {
            return Err(SspikeError::ConfigError(
                "integration.reference_bin_width must be > 0".to_string(),
            ));
        }
        let rg = &self.recoil_grid;
        if !(rg.step > 0.0) || !(rg.start > 0.0) || rg.stop <= rg.start + rg.step {
            return Err(SspikeError::ConfigError(format!(
                "recoil_grid needs 0 < start, step > 0 and at least two bins, got {rg:?}"
            )));
        }
        if !(self.quenching_lookup_scale > 0.0) || !self.quenching_lookup_scale.is_finite() {
            return Err(SspikeError::ConfigError(format!(
                "quenching_lookup_scale must be finite and > 0, got {}",
                self.quenching_lookup_scale
            )));
        }
        if let Some(cut) = self.low_cut {
            if !cut.is_finite() || cut < 0.0 {
                return Err(SspikeError::ConfigError(format!(
                    "low_cut must be finite and >= 0, got {cut}"
                )));
            }
        }
        let bg = &self.basic_grid;
        if bg.points < 2 || !(bg.e_max > bg.e_min) || bg.e_min <= 0.0 {
            return Err(SspikeError::ConfigError(format!(
                "basic_grid needs 0 < e_min < e_max and >= 2 points, got {bg:?}"
            )));
        }
        Ok(())
    }
}

/// Everything besides the run identity that changes a computed table.
#[derive(Serialize)]
struct ResultSettings<'a> {
    data_dir: &'a Path,
    fluence_dir: &'a Path,
    fluence_file: Option<&'a Path>,
    integration: &'a IntegrationConfig,
    recoil_grid: &'a RecoilGridConfig,
    basic_grid: &'a BasicGridConfig,
    physics: &'a PhysicsConstants,
    antineutrino_axial_flip: bool,
    quenching_lookup_scale: f64,
    low_cut: Option<f64>,
}

impl RunConfig {
    /// Short hex digest of the settings that shape the results.
    ///
    /// Runs with the same identity but different grids, tolerances,
    /// constants or inputs get different fingerprints. Output locations
    /// (`cache_dir`, `snow_dir`) do not take part.
    pub fn settings_fingerprint(&self) -> SspikeResult<String> {
        let settings = ResultSettings {
            data_dir: &self.paths.data_dir,
            fluence_dir: &self.paths.fluence_dir,
            fluence_file: self.paths.fluence_file.as_deref(),
            integration: &self.integration,
            recoil_grid: &self.recoil_grid,
            basic_grid: &self.basic_grid,
            physics: &self.physics,
            antineutrino_axial_flip: self.antineutrino_axial_flip,
            quenching_lookup_scale: self.quenching_lookup_scale,
            low_cut: self.low_cut,
        };
        let json = serde_json::to_vec(&settings)?;
        let digest = Sha256::digest(&json);
        Ok(digest[..8].iter().map(|b| format!("{b:02x}")).collect())
    }
}

/// A group of simulations sharing one model family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSpec {
    pub model: Vec<String>,
    #[serde(default)]
    pub progenitor: Vec<Progenitor>,
}

/// Batch description expanded into individual runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    pub sim: Vec<SimSpec>,
    pub distance: Vec<f64>,
    #[serde(default = "default_plan_transforms")]
    pub transform: Vec<String>,
    #[serde(alias = "detector", default = "default_plan_targets")]
    pub target: Vec<String>,
}

fn default_plan_transforms() -> Vec<String> {
    vec![default_transform()]
}
fn default_plan_targets() -> Vec<String> {
    vec![default_detector()]
}

impl RunPlan {
    pub fn from_file(path: impl AsRef<Path>) -> SspikeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Cartesian product of (model, progenitor) pairs with
    /// (distance, transform, target), simulations outermost.
    ///
    /// Settings other than the run identity are copied from `template`.
    pub fn expand(&self, template: &RunConfig) -> SspikeResult<Vec<RunConfig>> {
        let mut sims: Vec<(&str, Progenitor)> = Vec::new();
        for spec in &self.sim {
            for model in &spec.model {
                if spec.progenitor.is_empty() {
                    sims.push((model, Progenitor::new()));
                }
                for prog in &spec.progenitor {
                    sims.push((model, prog.clone()));
                }
            }
        }

        let mut runs = Vec::new();
        for (model, progenitor) in &sims {
            for &distance in &self.distance {
                for transform in &self.transform {
                    for target in &self.target {
                        let mut run = template.clone();
                        run.model = model.to_string();
                        run.progenitor = progenitor.clone();
                        run.distance = distance;
                        run.transform = transform.clone();
                        run.detector = target.clone();
                        run.validate()?;
                        runs.push(run);
                    }
                }
            }
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_gets_defaults() {
        let cfg: RunConfig = serde_json::from_str(
            r#"{"model": "Nakazato_2013",
                "progenitor": {"mass": 20, "metal": 0.02, "t_rev": 300}}"#,
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.transform, "NoTransformation");
        assert_eq!(cfg.detector, "kamland");
        assert_eq!(cfg.distance, 5.0);
        assert_eq!(cfg.t_bins, 1);
        assert_eq!(cfg.integration.upper_energy, 0.1);
        assert_eq!(cfg.recoil_grid.step, 1e-4);
        assert_eq!(cfg.basic_grid.points, 200);
        assert_eq!(cfg.quenching_lookup_scale, 1.0);
        assert_eq!(cfg.low_cut, None);
        assert_eq!(cfg.progenitor["mass"], ParamValue::Number(20.0));
        assert_eq!(cfg.progenitor["mass"].to_string(), "20");
    }

    #[test]
    fn test_text_progenitor_values() {
        let cfg: RunConfig = serde_json::from_str(
            r#"{"model": "Kuroda_2020", "progenitor": {"omega": "10", "B0": "12"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.progenitor["omega"], ParamValue::Text("10".to_string()));
        assert_eq!(cfg.progenitor["omega"].as_f64(), Some(10.0));
    }

    #[test]
    fn test_validate_rejects_bad_distance() {
        let mut cfg = RunConfig::new("Nakazato_2013");
        cfg.distance = 0.0;
        assert!(matches!(cfg.validate(), Err(SspikeError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_zero_tolerances() {
        let mut cfg = RunConfig::new("Nakazato_2013");
        cfg.integration.epsabs = 0.0;
        cfg.integration.epsrel = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_fingerprint_tracks_result_settings() {
        let base = RunConfig::new("Fornax_2021");
        let fp = base.settings_fingerprint().unwrap();
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, base.clone().settings_fingerprint().unwrap());

        let mut other_output = base.clone();
        other_output.paths.cache_dir = PathBuf::from("elsewhere");
        other_output.paths.snow_dir = Some(PathBuf::from("snow"));
        assert_eq!(other_output.settings_fingerprint().unwrap(), fp);

        let mut flipped = base.clone();
        flipped.antineutrino_axial_flip = true;
        let mut cut = base.clone();
        cut.low_cut = Some(1e-3);
        let mut finer = base.clone();
        finer.recoil_grid.step = 5e-5;
        let mut tighter = base.clone();
        tighter.integration.epsrel = 1e-10;
        let mut fluence = base.clone();
        fluence.paths.fluence_file = Some(PathBuf::from("f.dat"));
        let mut m_p = base.clone();
        m_p.physics.m_p *= 1.0 + 1e-12;
        for changed in [flipped, cut, finer, tighter, fluence, m_p] {
            assert_ne!(changed.settings_fingerprint().unwrap(), fp);
        }
    }

    #[test]
    fn test_plan_expansion_order() {
        let plan: RunPlan = serde_json::from_str(
            r#"{"sim": [{"model": ["Nakazato_2013"],
                         "progenitor": [{"mass": 13, "metal": 0.02, "t_rev": 100},
                                        {"mass": 20, "metal": 0.02, "t_rev": 100}]},
                        {"model": ["Fornax_2021"],
                         "progenitor": [{"mass": 13}, {"mass": 20}]}],
                "distance": [5, 10],
                "transform": ["NoTransformation"],
                "target": ["kamland"]}"#,
        )
        .unwrap();
        let runs = plan.expand(&RunConfig::new("template")).unwrap();
        assert_eq!(runs.len(), 8);
        assert_eq!(runs[0].model, "Nakazato_2013");
        assert_eq!(runs[0].distance, 5.0);
        assert_eq!(runs[1].distance, 10.0);
        assert_eq!(runs[2].progenitor["mass"], ParamValue::Number(20.0));
        assert_eq!(runs[7].model, "Fornax_2021");
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut cfg = RunConfig::new("Fornax_2021");
        cfg.progenitor.insert("mass".to_string(), ParamValue::Number(13.0));
        std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model, "Fornax_2021");
        assert_eq!(loaded.progenitor, cfg.progenitor);
        assert_eq!(loaded.paths.xs_ibd(), PathBuf::from("data/xs_ibd.dat"));
    }
}
