// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{SspikeError, SspikeResult};
use ndarray::{Array1, Array2, ArrayView1};

/// Neutrino species, in the column order of the fluence tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flavor {
    NuE,
    NuMu,
    NuTau,
    ANuE,
    ANuMu,
    ANuTau,
}

impl Flavor {
    pub const ALL: [Flavor; 6] = [
        Flavor::NuE,
        Flavor::NuMu,
        Flavor::NuTau,
        Flavor::ANuE,
        Flavor::ANuMu,
        Flavor::ANuTau,
    ];

    /// Column header used in fluence files.
    pub fn column_name(self) -> &'static str {
        match self {
            Flavor::NuE => "NuE",
            Flavor::NuMu => "NuMu",
            Flavor::NuTau => "NuTau",
            Flavor::ANuE => "aNuE",
            Flavor::ANuMu => "aNuMu",
            Flavor::ANuTau => "aNuTau",
        }
    }

    /// Zero-based position among the six flavor columns.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_antineutrino(self) -> bool {
        matches!(self, Flavor::ANuE | Flavor::ANuMu | Flavor::ANuTau)
    }
}

fn check_grid(name: &str, energy: &Array1<f64>) -> SspikeResult<()> {
    if energy.is_empty() {
        return Err(SspikeError::Precondition(format!("{name}: empty energy column")));
    }
    for (i, &e) in energy.iter().enumerate() {
        if !e.is_finite() {
            return Err(SspikeError::Precondition(format!(
                "{name}: non-finite energy at row {i}"
            )));
        }
    }
    for i in 1..energy.len() {
        if energy[i] <= energy[i - 1] {
            return Err(SspikeError::Precondition(format!(
                "{name}: energy not strictly increasing at row {i}: {} <= {}",
                energy[i],
                energy[i - 1]
            )));
        }
    }
    Ok(())
}

/// Time-integrated neutrino fluence per flavor on a fixed energy grid.
///
/// Energies in GeV, fluences in cm⁻² per fluence bin.
#[derive(Debug, Clone, PartialEq)]
pub struct FluenceSpectrum {
    energy: Array1<f64>,
    /// [n_energy, 6] in `Flavor::ALL` order.
    fluence: Array2<f64>,
}

impl FluenceSpectrum {
    pub fn new(energy: Array1<f64>, fluence: Array2<f64>) -> SspikeResult<Self> {
        check_grid("fluence", &energy)?;
        if fluence.dim() != (energy.len(), Flavor::ALL.len()) {
            return Err(SspikeError::Precondition(format!(
                "fluence table shape {:?} does not match {} energies x 6 flavors",
                fluence.dim(),
                energy.len()
            )));
        }
        if let Some(bad) = fluence.iter().find(|v| !v.is_finite()) {
            return Err(SspikeError::Precondition(format!(
                "fluence table contains non-finite value {bad}"
            )));
        }
        Ok(FluenceSpectrum { energy, fluence })
    }

    pub fn energy(&self) -> ArrayView1<'_, f64> {
        self.energy.view()
    }

    pub fn flavor(&self, flavor: Flavor) -> ArrayView1<'_, f64> {
        self.fluence.column(flavor.index())
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// GLoBES-format cross-section table: log10(E/GeV) against per-flavor
/// cross-sections in units of 1e-38 cm² GeV⁻¹ (divided by energy).
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionTable {
    log10_energy: Array1<f64>,
    /// [n_energy, n_flavor_columns], raw table units.
    xs: Array2<f64>,
}

impl CrossSectionTable {
    pub fn new(log10_energy: Array1<f64>, xs: Array2<f64>) -> SspikeResult<Self> {
        check_grid("cross-section", &log10_energy)?;
        if xs.nrows() != log10_energy.len() {
            return Err(SspikeError::Precondition(format!(
                "cross-section table has {} rows but {} energies",
                xs.nrows(),
                log10_energy.len()
            )));
        }
        Ok(CrossSectionTable { log10_energy, xs })
    }

    /// Table energies converted to GeV.
    pub fn energy_gev(&self) -> Array1<f64> {
        self.log10_energy.mapv(|x| 10f64.powf(x))
    }

    /// Raw column for `flavor`, still in table units.
    pub fn flavor(&self, flavor: Flavor) -> SspikeResult<ArrayView1<'_, f64>> {
        let idx = flavor.index();
        if idx >= self.xs.ncols() {
            return Err(SspikeError::MissingColumn(format!(
                "cross-section column for {} (table has {} flavor columns)",
                flavor.column_name(),
                self.xs.ncols()
            )));
        }
        Ok(self.xs.column(idx))
    }

    pub fn len(&self) -> usize {
        self.log10_energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log10_energy.is_empty()
    }
}

/// Proton quenching curve: recoil energy against quenching factor.
#[derive(Debug, Clone, PartialEq)]
pub struct QuenchingCurve {
    energy: Array1<f64>,
    factor: Array1<f64>,
}

impl QuenchingCurve {
    pub fn new(energy: Array1<f64>, factor: Array1<f64>) -> SspikeResult<Self> {
        check_grid("quenching curve", &energy)?;
        if factor.len() != energy.len() {
            return Err(SspikeError::Precondition(format!(
                "quenching curve has {} energies but {} factors",
                energy.len(),
                factor.len()
            )));
        }
        Ok(QuenchingCurve { energy, factor })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> SspikeResult<Self> {
        let energy = pairs.iter().map(|p| p.0).collect();
        let factor = pairs.iter().map(|p| p.1).collect();
        Self::new(energy, factor)
    }

    pub fn energy(&self) -> ArrayView1<'_, f64> {
        self.energy.view()
    }

    pub fn factor(&self) -> ArrayView1<'_, f64> {
        self.factor.view()
    }
}

/// A named column of a rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Array1<f64>,
}

/// Per-bin event rates for one channel family.
///
/// Grid columns (`E`, or `T_p`/`E_vis`/`E_min`) come first, followed by
/// rate columns in insertion order. All columns share one length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelRateTable {
    grid: Vec<Column>,
    rates: Vec<Column>,
}

impl ChannelRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bins, or 0 for a table without columns.
    pub fn len(&self) -> usize {
        self.grid
            .first()
            .or_else(|| self.rates.first())
            .map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_insert(&self, name: &str, values: &Array1<f64>) -> SspikeResult<()> {
        if self.column(name).is_some() {
            return Err(SspikeError::Precondition(format!(
                "duplicate rate-table column '{name}'"
            )));
        }
        let has_columns = !self.grid.is_empty() || !self.rates.is_empty();
        if has_columns && values.len() != self.len() {
            return Err(SspikeError::Precondition(format!(
                "column '{name}' has {} bins, table has {}",
                values.len(),
                self.len()
            )));
        }
        Ok(())
    }

    pub fn push_grid(&mut self, name: impl Into<String>, values: Array1<f64>) -> SspikeResult<()> {
        let name = name.into();
        self.check_insert(&name, &values)?;
        if !self.rates.is_empty() {
            return Err(SspikeError::Precondition(format!(
                "grid column '{name}' added after rate columns"
            )));
        }
        self.grid.push(Column { name, values });
        Ok(())
    }

    pub fn push_rate(&mut self, name: impl Into<String>, values: Array1<f64>) -> SspikeResult<()> {
        let name = name.into();
        self.check_insert(&name, &values)?;
        self.rates.push(Column { name, values });
        Ok(())
    }

    pub fn grid_columns(&self) -> &[Column] {
        &self.grid
    }

    pub fn rate_columns(&self) -> &[Column] {
        &self.rates
    }

    /// All columns, grid first.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.grid.iter().chain(self.rates.iter())
    }

    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.columns().find(|c| c.name == name).map(|c| &c.values)
    }

    pub fn require(&self, name: &str) -> SspikeResult<&Array1<f64>> {
        self.column(name)
            .ok_or_else(|| SspikeError::MissingColumn(name.to_string()))
    }
}

/// One summed row: file type, channel, expected events.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsRow {
    pub file: String,
    pub channel: String,
    pub events: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventTotalsTable {
    pub rows: Vec<TotalsRow>,
}

impl EventTotalsTable {
    pub fn get(&self, file: &str, channel: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.file == file && r.channel == channel)
            .map(|r| r.events)
    }
}

/// Visible event totals annotated with the run's model and progenitor.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    pub model: String,
    pub progenitor: Vec<String>,
    pub channel: String,
    pub events: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibleTotalsTable {
    pub progenitor_keys: Vec<String>,
    pub rows: Vec<VisibleRow>,
}

impl VisibleTotalsTable {
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.channel == channel)
            .map(|r| r.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_flavor_columns_in_file_order() {
        let names: Vec<&str> = Flavor::ALL.iter().map(|f| f.column_name()).collect();
        assert_eq!(names, ["NuE", "NuMu", "NuTau", "aNuE", "aNuMu", "aNuTau"]);
        assert!(Flavor::ANuMu.is_antineutrino());
        assert!(!Flavor::NuTau.is_antineutrino());
    }

    #[test]
    fn test_fluence_rejects_non_monotonic_energy() {
        let e = array![0.0, 2e-4, 2e-4];
        let f = Array2::zeros((3, 6));
        let err = FluenceSpectrum::new(e, f).unwrap_err();
        assert!(matches!(err, SspikeError::Precondition(_)));
    }

    #[test]
    fn test_fluence_rejects_empty() {
        let err = FluenceSpectrum::new(Array1::zeros(0), Array2::zeros((0, 6))).unwrap_err();
        assert!(matches!(err, SspikeError::Precondition(_)));
    }

    #[test]
    fn test_fluence_flavor_view() {
        let e = array![0.0, 2e-4];
        let f = Array2::from_shape_fn((2, 6), |(i, j)| (10 * i + j) as f64);
        let flu = FluenceSpectrum::new(e, f).unwrap();
        assert_eq!(flu.flavor(Flavor::ANuE).to_vec(), vec![3.0, 13.0]);
        assert_eq!(flu.len(), 2);
    }

    #[test]
    fn test_cross_section_missing_column() {
        let xs = CrossSectionTable::new(array![-3.0, -2.0], Array2::zeros((2, 4))).unwrap();
        assert!(xs.flavor(Flavor::ANuE).is_ok());
        assert!(matches!(
            xs.flavor(Flavor::ANuMu),
            Err(SspikeError::MissingColumn(_))
        ));
        let e = xs.energy_gev();
        assert!((e[0] - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn test_rate_table_column_order_and_lengths() {
        let mut t = ChannelRateTable::new();
        t.push_grid("E", array![1.0, 2.0]).unwrap();
        t.push_rate("ibd", array![0.5, 0.25]).unwrap();
        t.push_rate("e", array![0.1, 0.2]).unwrap();
        let names: Vec<&str> = t.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["E", "ibd", "e"]);
        assert!(t.push_rate("bad", array![1.0]).is_err());
        assert!(t.push_rate("ibd", array![1.0, 1.0]).is_err());
        assert!(t.push_grid("T_p", array![1.0, 1.0]).is_err());
        assert!(matches!(t.require("nc_p"), Err(SspikeError::MissingColumn(_))));
    }
}
