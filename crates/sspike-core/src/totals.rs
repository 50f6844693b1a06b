// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Event Totals
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-channel sums of rate tables.
//!
//! Sums run left to right over bins so repeated runs (and cached tables
//! read back from text) give identical totals.

use crate::channels::ChannelKind;
use crate::detector::TotalSource;
use crate::elastic::TOTAL_COLUMN;
use ndarray::ArrayView1;
use sspike_types::error::SspikeResult;
use sspike_types::state::{ChannelRateTable, TotalsRow};

/// Elastic total restricted to visible energies above the detector cut.
pub const CUT_CHANNEL: &str = "nc_p_cut";

/// Column carrying the visible energy of each recoil bin.
pub const VISIBLE_ENERGY_COLUMN: &str = "E_vis";

pub fn column_sum(values: ArrayView1<f64>) -> f64 {
    values.iter().fold(0.0, |acc, &v| acc + v)
}

/// Sum of `rates[i]` over bins with `e_vis[i] >= low_cut`.
pub fn cut_sum(rates: ArrayView1<f64>, e_vis: ArrayView1<f64>, low_cut: f64) -> f64 {
    rates
        .iter()
        .zip(e_vis.iter())
        .filter(|(_, e)| **e >= low_cut)
        .fold(0.0, |acc, (&r, _)| acc + r)
}

/// One row per rate column, in column order.
pub fn channel_totals(file_type: &str, table: &ChannelRateTable) -> Vec<TotalsRow> {
    table
        .rate_columns()
        .iter()
        .map(|col| TotalsRow {
            file: file_type.to_string(),
            channel: col.name.clone(),
            events: column_sum(col.values.view()),
        })
        .collect()
}

/// `nc_p` and `nc_p_cut` rows of an elastic table.
pub fn elastic_totals(
    file_type: &str,
    table: &ChannelRateTable,
    low_cut: f64,
) -> SspikeResult<Vec<TotalsRow>> {
    let rates = table.require(TOTAL_COLUMN)?;
    let e_vis = table.require(VISIBLE_ENERGY_COLUMN)?;
    Ok(vec![
        TotalsRow {
            file: file_type.to_string(),
            channel: TOTAL_COLUMN.to_string(),
            events: column_sum(rates.view()),
        },
        TotalsRow {
            file: file_type.to_string(),
            channel: CUT_CHANNEL.to_string(),
            events: cut_sum(rates.view(), e_vis.view(), low_cut),
        },
    ])
}

/// Totals rows contributed by one detector source.
pub fn source_totals(
    source: &TotalSource,
    table: &ChannelRateTable,
    low_cut: f64,
) -> SspikeResult<Vec<TotalsRow>> {
    match source {
        TotalSource::Channel(ChannelKind::Elastic) => {
            elastic_totals(source.file_type(), table, low_cut)
        }
        _ => Ok(channel_totals(source.file_type(), table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn elastic_table() -> ChannelRateTable {
        let mut t = ChannelRateTable::new();
        t.push_grid("T_p", array![1e-4, 2e-4, 3e-4, 4e-4]).unwrap();
        t.push_grid("E_vis", array![1e-5, 1.5e-4, 2e-4, 3e-4]).unwrap();
        t.push_grid("E_min", array![0.007, 0.010, 0.012, 0.014]).unwrap();
        t.push_rate("nc_nue_p", array![1.0, 1.0, 1.0, 1.0]).unwrap();
        t.push_rate("nc_p", array![4.0, 3.0, 2.0, 1.0]).unwrap();
        t
    }

    #[test]
    fn test_cut_includes_threshold_bin() {
        let rows = elastic_totals("elastic", &elastic_table(), 2e-4).unwrap();
        assert_eq!(rows[0].channel, "nc_p");
        assert_eq!(rows[0].events, 10.0);
        assert_eq!(rows[1].channel, "nc_p_cut");
        assert_eq!(rows[1].events, 3.0);
    }

    #[test]
    fn test_zero_cut_keeps_everything() {
        let t = elastic_table();
        let rows = elastic_totals("elastic", &t, 0.0).unwrap();
        assert_eq!(rows[0].events, rows[1].events);
    }

    #[test]
    fn test_basic_totals_skip_grid() {
        let mut t = ChannelRateTable::new();
        t.push_grid("E", array![0.01, 0.02]).unwrap();
        t.push_rate("ibd", array![0.5, 0.25]).unwrap();
        t.push_rate("e", array![0.125, 0.0625]).unwrap();
        let rows = source_totals(&TotalSource::Channel(ChannelKind::Basic), &t, 2e-4).unwrap();
        let summary: Vec<(&str, &str, f64)> = rows
            .iter()
            .map(|r| (r.file.as_str(), r.channel.as_str(), r.events))
            .collect();
        assert_eq!(summary, vec![("basic", "ibd", 0.75), ("basic", "e", 0.1875)]);
    }

    #[test]
    fn test_elastic_without_visible_energy_fails() {
        let mut t = ChannelRateTable::new();
        t.push_grid("T_p", array![1e-4]).unwrap();
        t.push_rate("nc_p", array![1.0]).unwrap();
        assert!(elastic_totals("elastic", &t, 2e-4).is_err());
    }
}
