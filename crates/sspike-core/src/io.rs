// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Table I/O
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Text readers and writers for input spectra and result tables.
//!
//! Inputs:
//! - fluence: whitespace-delimited, 2 header lines, `E NuE NuMu NuTau aNuE aNuMu aNuTau`
//! - cross-section: whitespace-delimited, 3 header lines, `log10(E) xs...`
//! - quenching: comma-delimited `recoil,factor`, no header
//!
//! Outputs are space-delimited with one header row. Floats are written
//! with `{:e}`, the shortest representation that parses back to the
//! same bits.

use ndarray::{Array1, Array2};
use sspike_types::error::{SspikeError, SspikeResult};
use sspike_types::state::{
    ChannelRateTable, CrossSectionTable, EventTotalsTable, Flavor, FluenceSpectrum,
    QuenchingCurve, TotalsRow, VisibleRow, VisibleTotalsTable,
};
use std::fmt::Write as _;
use std::path::Path;

const FLUENCE_HEADER_LINES: usize = 2;
const CROSS_SECTION_HEADER_LINES: usize = 3;

/// Column names treated as grid columns when reading a rate table back.
pub const GRID_COLUMNS: [&str; 5] = ["E", "Energy", "T_p", "E_vis", "E_min"];

fn parse_err(source: &str, line: usize, message: impl Into<String>) -> SspikeError {
    SspikeError::Parse {
        path: source.to_string(),
        line,
        message: message.into(),
    }
}

fn parse_f64(token: &str, source: &str, line: usize) -> SspikeResult<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|e| parse_err(source, line, format!("bad number '{token}': {e}")))
}

fn read_text(path: &Path) -> SspikeResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        SspikeError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

/// Numeric rows after `skip` header lines, blank and `#` lines ignored.
/// Each row carries its 1-based line number.
fn numeric_rows(
    text: &str,
    source: &str,
    skip: usize,
    delimiter: Option<char>,
) -> SspikeResult<Vec<(usize, Vec<f64>)>> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate().skip(skip) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let lineno = i + 1;
        let values = match delimiter {
            Some(d) => trimmed
                .split(d)
                .map(|t| parse_f64(t, source, lineno))
                .collect::<SspikeResult<Vec<f64>>>()?,
            None => trimmed
                .split_whitespace()
                .map(|t| parse_f64(t, source, lineno))
                .collect::<SspikeResult<Vec<f64>>>()?,
        };
        rows.push((lineno, values));
    }
    Ok(rows)
}

// ── Inputs ───────────────────────────────────────────────────────────

pub fn parse_fluence(text: &str, source: &str) -> SspikeResult<FluenceSpectrum> {
    let rows = numeric_rows(text, source, FLUENCE_HEADER_LINES, None)?;
    let width = 1 + Flavor::ALL.len();
    let mut energy = Vec::with_capacity(rows.len());
    let mut fluence = Array2::zeros((rows.len(), Flavor::ALL.len()));
    for (r, (lineno, values)) in rows.iter().enumerate() {
        if values.len() < width {
            return Err(parse_err(
                source,
                *lineno,
                format!("expected {width} columns, found {}", values.len()),
            ));
        }
        energy.push(values[0]);
        for f in 0..Flavor::ALL.len() {
            fluence[[r, f]] = values[1 + f];
        }
    }
    FluenceSpectrum::new(Array1::from(energy), fluence)
}

pub fn read_fluence(path: impl AsRef<Path>) -> SspikeResult<FluenceSpectrum> {
    let path = path.as_ref();
    parse_fluence(&read_text(path)?, &path.display().to_string())
}

pub fn parse_cross_section(text: &str, source: &str) -> SspikeResult<CrossSectionTable> {
    let rows = numeric_rows(text, source, CROSS_SECTION_HEADER_LINES, None)?;
    let width = match rows.first() {
        Some((_, v)) => v.len(),
        None => {
            return Err(SspikeError::Precondition(format!(
                "{source}: cross-section table has no rows"
            )))
        }
    };
    if width < 2 {
        return Err(parse_err(source, rows[0].0, "expected at least 2 columns"));
    }
    let mut log_e = Vec::with_capacity(rows.len());
    let mut xs = Array2::zeros((rows.len(), width - 1));
    for (r, (lineno, values)) in rows.iter().enumerate() {
        if values.len() != width {
            return Err(parse_err(
                source,
                *lineno,
                format!("expected {width} columns, found {}", values.len()),
            ));
        }
        log_e.push(values[0]);
        for c in 1..width {
            xs[[r, c - 1]] = values[c];
        }
    }
    CrossSectionTable::new(Array1::from(log_e), xs)
}

pub fn read_cross_section(path: impl AsRef<Path>) -> SspikeResult<CrossSectionTable> {
    let path = path.as_ref();
    parse_cross_section(&read_text(path)?, &path.display().to_string())
}

pub fn parse_quenching(text: &str, source: &str) -> SspikeResult<QuenchingCurve> {
    let rows = numeric_rows(text, source, 0, Some(','))?;
    let mut pairs = Vec::with_capacity(rows.len());
    for (lineno, values) in rows {
        if values.len() != 2 {
            return Err(parse_err(
                source,
                lineno,
                format!("expected 2 comma-separated values, found {}", values.len()),
            ));
        }
        pairs.push((values[0], values[1]));
    }
    QuenchingCurve::from_pairs(&pairs)
}

pub fn read_quenching(path: impl AsRef<Path>) -> SspikeResult<QuenchingCurve> {
    let path = path.as_ref();
    parse_quenching(&read_text(path)?, &path.display().to_string())
}

// ── Rate tables ──────────────────────────────────────────────────────

pub fn format_rate_table(table: &ChannelRateTable) -> String {
    let columns: Vec<_> = table.columns().collect();
    let mut out = String::new();
    let header: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    out.push_str(&header.join(" "));
    out.push('\n');
    for i in 0..table.len() {
        for (j, col) in columns.iter().enumerate() {
            if j > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{:e}", col.values[i]);
        }
        out.push('\n');
    }
    out
}

/// Header row plus numeric columns of a space-delimited text table.
fn parse_columns(text: &str, source: &str) -> SspikeResult<(Vec<String>, Vec<Vec<f64>>)> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let header: Vec<String> = match lines.next() {
        Some((_, l)) => l.split_whitespace().map(str::to_string).collect(),
        None => return Err(parse_err(source, 1, "missing header row")),
    };
    let mut columns = vec![Vec::new(); header.len()];
    for (i, line) in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != header.len() {
            return Err(parse_err(
                source,
                i + 1,
                format!("expected {} fields, found {}", header.len(), tokens.len()),
            ));
        }
        for (col, tok) in columns.iter_mut().zip(tokens) {
            col.push(parse_f64(tok, source, i + 1)?);
        }
    }
    Ok((header, columns))
}

/// Read back a table written by [`format_rate_table`]. Leading columns
/// named in [`GRID_COLUMNS`] become grid columns.
pub fn parse_rate_table(text: &str, source: &str) -> SspikeResult<ChannelRateTable> {
    let (header, columns) = parse_columns(text, source)?;
    let mut table = ChannelRateTable::new();
    let mut in_grid = true;
    for (name, values) in header.into_iter().zip(columns) {
        in_grid &= GRID_COLUMNS.contains(&name.as_str());
        if in_grid {
            table.push_grid(name, Array1::from(values))?;
        } else {
            table.push_rate(name, Array1::from(values))?;
        }
    }
    Ok(table)
}

/// Externally generated detector-response table: space-delimited with a
/// header row. The first column is the energy grid, every other column
/// a channel.
pub fn parse_response_table(text: &str, source: &str) -> SspikeResult<ChannelRateTable> {
    let (header, columns) = parse_columns(text, source)?;
    let mut table = ChannelRateTable::new();
    for (j, (name, values)) in header.into_iter().zip(columns).enumerate() {
        if j == 0 {
            table.push_grid(name, Array1::from(values))?;
        } else {
            table.push_rate(name, Array1::from(values))?;
        }
    }
    Ok(table)
}

pub fn read_response_table(path: impl AsRef<Path>) -> SspikeResult<ChannelRateTable> {
    let path = path.as_ref();
    parse_response_table(&read_text(path)?, &path.display().to_string())
}

// ── Totals ───────────────────────────────────────────────────────────

fn check_token(field: &str, value: &str) -> SspikeResult<()> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(SspikeError::Precondition(format!(
            "{field} '{value}' cannot be written to a space-delimited table"
        )));
    }
    Ok(())
}

pub fn format_totals(table: &EventTotalsTable) -> SspikeResult<String> {
    let mut out = String::from("file channel events\n");
    for row in &table.rows {
        check_token("file", &row.file)?;
        check_token("channel", &row.channel)?;
        let _ = writeln!(out, "{} {} {:e}", row.file, row.channel, row.events);
    }
    Ok(out)
}

pub fn parse_totals(text: &str, source: &str) -> SspikeResult<EventTotalsTable> {
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(parse_err(source, i + 1, "expected 'file channel events'"));
        }
        rows.push(TotalsRow {
            file: fields[0].to_string(),
            channel: fields[1].to_string(),
            events: parse_f64(fields[2], source, i + 1)?,
        });
    }
    Ok(EventTotalsTable { rows })
}

pub fn format_visible_totals(table: &VisibleTotalsTable) -> SspikeResult<String> {
    let mut out = String::from("model");
    for key in &table.progenitor_keys {
        check_token("progenitor key", key)?;
        out.push(' ');
        out.push_str(key);
    }
    out.push_str(" channel events\n");
    for row in &table.rows {
        check_token("model", &row.model)?;
        out.push_str(&row.model);
        for v in &row.progenitor {
            check_token("progenitor value", v)?;
            out.push(' ');
            out.push_str(v);
        }
        check_token("channel", &row.channel)?;
        let _ = writeln!(out, " {} {:e}", row.channel, row.events);
    }
    Ok(out)
}

pub fn parse_visible_totals(text: &str, source: &str) -> SspikeResult<VisibleTotalsTable> {
    let mut lines = text.lines().enumerate();
    let header: Vec<&str> = match lines.next() {
        Some((_, l)) => l.split_whitespace().collect(),
        None => return Err(parse_err(source, 1, "missing header row")),
    };
    if header.len() < 3 || header[0] != "model" {
        return Err(parse_err(source, 1, "expected 'model [keys...] channel events'"));
    }
    let n_keys = header.len() - 3;
    let progenitor_keys = header[1..1 + n_keys].iter().map(|s| s.to_string()).collect();

    let mut rows = Vec::new();
    for (i, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != header.len() {
            return Err(parse_err(
                source,
                i + 1,
                format!("expected {} fields, found {}", header.len(), fields.len()),
            ));
        }
        rows.push(VisibleRow {
            model: fields[0].to_string(),
            progenitor: fields[1..1 + n_keys].iter().map(|s| s.to_string()).collect(),
            channel: fields[1 + n_keys].to_string(),
            events: parse_f64(fields[2 + n_keys], source, i + 1)?,
        });
    }
    Ok(VisibleTotalsTable {
        progenitor_keys,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const FLUENCE: &str = "\
# time bin 0
E NuE NuMu NuTau aNuE aNuMu aNuTau
0.0 0 0 0 0 0 0
2.0e-4 1.5e8 1.0e8 1.0e8 1.2e8 1.0e8 1.0e8
4.0e-4 3.0e8 2.0e8 2.0e8 2.4e8 2.0e8 2.0e8
";

    #[test]
    fn test_parse_fluence() {
        let flu = parse_fluence(FLUENCE, "test").unwrap();
        assert_eq!(flu.len(), 3);
        assert_eq!(flu.energy()[2], 4.0e-4);
        assert_eq!(flu.flavor(Flavor::ANuE)[1], 1.2e8);
    }

    #[test]
    fn test_parse_fluence_short_row_reports_line() {
        let text = "h1\nh2\n0.0 1 2 3\n";
        match parse_fluence(text, "short.dat") {
            Err(SspikeError::Parse { path, line, .. }) => {
                assert_eq!(path, "short.dat");
                assert_eq!(line, 3);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fluence_empty_is_precondition() {
        let err = parse_fluence("h1\nh2\n", "empty").unwrap_err();
        assert!(matches!(err, SspikeError::Precondition(_)));
    }

    #[test]
    fn test_parse_cross_section() {
        let text = "\
% GLoBES cross-section
% log(E) nue numu nutau anue anumu anutau
%
-3.0 0.1 0.2 0.3 0.4 0.5 0.6
-2.0 1.1 1.2 1.3 1.4 1.5 1.6
";
        let xs = parse_cross_section(text, "xs").unwrap();
        assert_eq!(xs.len(), 2);
        assert_eq!(xs.flavor(Flavor::ANuE).unwrap().to_vec(), vec![0.4, 1.4]);
    }

    #[test]
    fn test_parse_quenching_rejects_triplets() {
        assert!(parse_quenching("0.1,0.2\n0.2,0.3\n", "q").is_ok());
        assert!(matches!(
            parse_quenching("0.1,0.2,0.3\n", "q"),
            Err(SspikeError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_rate_table_text_is_bit_exact() {
        let mut t = ChannelRateTable::new();
        t.push_grid("T_p", array![1e-4, 2e-4, 3.0000000000000003e-4]).unwrap();
        t.push_grid("E_vis", array![4.812395531670816e-6, 0.1 + 0.2, 1.0 / 3.0]).unwrap();
        t.push_rate("nc_p", array![1.2345678901234567e-3, 0.0, 6.02582603699751e31]).unwrap();
        let text = format_rate_table(&t);
        assert!(text.starts_with("T_p E_vis nc_p\n"));
        let back = parse_rate_table(&text, "mem").unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_response_table_first_column_is_grid() {
        let text = "Energy ibd nue_e\n0.001 1.0 0.5\n0.002 2.0 0.25\n";
        let t = parse_response_table(text, "snow").unwrap();
        assert_eq!(t.grid_columns().len(), 1);
        assert_eq!(t.rate_columns().len(), 2);
        assert_eq!(t.require("nue_e").unwrap().to_vec(), vec![0.5, 0.25]);
    }

    #[test]
    fn test_totals_text_roundtrip() {
        let table = EventTotalsTable {
            rows: vec![
                TotalsRow {
                    file: "elastic".into(),
                    channel: "nc_p".into(),
                    events: 123.456789012345,
                },
                TotalsRow {
                    file: "elastic".into(),
                    channel: "nc_p_cut".into(),
                    events: 1e-300,
                },
            ],
        };
        let text = format_totals(&table).unwrap();
        assert_eq!(parse_totals(&text, "mem").unwrap(), table);
    }

    #[test]
    fn test_visible_totals_text_roundtrip() {
        let table = VisibleTotalsTable {
            progenitor_keys: vec!["mass".into(), "metal".into()],
            rows: vec![VisibleRow {
                model: "Nakazato_2013".into(),
                progenitor: vec!["20".into(), "0.02".into()],
                channel: "ibd".into(),
                events: 4321.5,
            }],
        };
        let text = format_visible_totals(&table).unwrap();
        assert!(text.starts_with("model mass metal channel events\n"));
        assert_eq!(parse_visible_totals(&text, "mem").unwrap(), table);
    }

    #[test]
    fn test_whitespace_in_channel_rejected() {
        let table = EventTotalsTable {
            rows: vec![TotalsRow {
                file: "basic".into(),
                channel: "two words".into(),
                events: 1.0,
            }],
        };
        assert!(matches!(format_totals(&table), Err(SspikeError::Precondition(_))));
    }
}
