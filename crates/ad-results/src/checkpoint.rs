//! Final-state checkpoints: a CSV header of compartment names and one row.
//!
//! Values are written with the shortest representation that parses back to
//! the same `f64`, so a saved state reloads bit for bit.

use std::io::Write;
use std::path::Path;

use ad_core::{Compartment, ReactorState, STATE_DIM};
use ad_sim::SimulationTrace;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{ResultsError, ResultsResult};

pub fn write_state<W: Write>(mut out: W, state: &ReactorState) -> ResultsResult<()> {
    let header: Vec<&str> = Compartment::all().map(|c| c.name()).collect();
    writeln!(out, "{}", header.join(","))?;
    let row: Vec<String> = state.as_slice().iter().map(|v| format!("{v:?}")).collect();
    writeln!(out, "{}", row.join(","))?;
    Ok(())
}

/// Persist the last state of `trace`.
pub fn save_final_state(trace: &SimulationTrace, path: &Path) -> ResultsResult<()> {
    let state = trace.last().ok_or(ResultsError::EmptyTrace)?;
    let mut buf = Vec::new();
    write_state(&mut buf, state)?;
    std::fs::write(path, buf)?;
    Ok(())
}

pub fn load_initial_state(path: &Path) -> ResultsResult<ReactorState> {
    let content = std::fs::read_to_string(path)?;
    parse_state(&content, &path.display().to_string())
}

/// Parse checkpoint text; `source_name` labels errors.
///
/// Columns may appear in any order but every compartment must be present
/// exactly once. Fields may be quoted.
pub fn parse_state(content: &str, source_name: &str) -> ResultsResult<ReactorState> {
    let err = |line: usize, column: usize, what: String| ResultsError::Parse {
        source_name: source_name.to_string(),
        line,
        column,
        what,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let mut records: Vec<(usize, StringRecord)> = Vec::with_capacity(2);
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(1, |p| p.line() as usize);
            err(line, 1, e.to_string())
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record
            .position()
            .map_or(records.len() + 1, |p| p.line() as usize);
        records.push((line, record));
    }
    let mut records = records.into_iter();

    let (header_line, header) = records
        .next()
        .ok_or_else(|| err(1, 1, "missing header row".to_string()))?;

    let mut slots: Vec<Option<usize>> = vec![None; STATE_DIM];
    let mut columns = Vec::with_capacity(STATE_DIM);
    for (col, name) in header.iter().enumerate() {
        let c = Compartment::from_name(name)
            .ok_or_else(|| err(header_line, col + 1, format!("unknown column '{name}'")))?;
        if slots[c.index()].is_some() {
            return Err(err(header_line, col + 1, format!("duplicate column '{name}'")));
        }
        slots[c.index()] = Some(col);
        columns.push(c);
    }
    if let Some(missing) = slots.iter().position(Option::is_none) {
        let name = Compartment::from_index(missing).map_or("?", |c| c.name());
        return Err(err(
            header_line,
            columns.len() + 1,
            format!("missing column '{name}'"),
        ));
    }

    let (row_line, row) = records
        .next()
        .ok_or_else(|| err(header_line + 1, 1, "missing data row".to_string()))?;
    if row.len() != columns.len() {
        return Err(err(
            row_line,
            row.len().min(columns.len()) + 1,
            format!("expected {} fields, found {}", columns.len(), row.len()),
        ));
    }

    let mut values = vec![0.0; STATE_DIM];
    for (col, (field, c)) in row.iter().zip(&columns).enumerate() {
        let v: f64 = field
            .parse()
            .map_err(|_| err(row_line, col + 1, format!("'{field}' is not a number")))?;
        if !v.is_finite() {
            return Err(err(row_line, col + 1, format!("{} is not finite", c.name())));
        }
        values[c.index()] = v;
    }

    if let Some((extra, _)) = records.next() {
        return Err(err(extra, 1, "expected a single data row".to_string()));
    }

    Ok(ReactorState::from_vec(values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(state: &ReactorState) -> String {
        let mut buf = Vec::new();
        write_state(&mut buf, state).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn parse_err(content: &str) -> (usize, usize, String) {
        match parse_state(content, "test.csv") {
            Err(ResultsError::Parse {
                line, column, what, ..
            }) => (line, column, what),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn sample() -> ReactorState {
        ReactorState::zeros()
            .with(Compartment::SAc, 0.197)
            .with(Compartment::PGas, 1.0696)
    }

    #[test]
    fn header_lists_compartments() {
        let t = text(&sample());
        let header = t.lines().next().unwrap();
        assert!(header.starts_with("S_su,S_aa,"));
        assert!(header.ends_with(",P_gas"));
    }

    #[test]
    fn reordered_columns_are_accepted() {
        let t = text(&sample());
        let mut lines = t.lines();
        let mut header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let mut row: Vec<&str> = lines.next().unwrap().split(',').collect();
        header.swap(0, 36);
        row.swap(0, 36);
        let swapped = format!("{}\r\n{}\r\n", header.join(","), row.join(","));
        let state = parse_state(&swapped, "swapped").unwrap();
        assert!(state.bit_eq(&sample()));
    }

    #[test]
    fn quoted_fields_are_accepted() {
        let t = text(&sample());
        let quoted: Vec<String> = t
            .lines()
            .map(|l| {
                l.split(',')
                    .map(|f| format!("\"{f}\""))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        let state = parse_state(&quoted.join("\r\n"), "quoted.csv").unwrap();
        assert!(state.bit_eq(&sample()));
    }

    #[test]
    fn reports_unknown_column_position() {
        let t = text(&sample()).replacen("S_aa", "S_xx", 1);
        let (line, column, what) = parse_err(&t);
        assert_eq!((line, column), (1, 2));
        assert!(what.contains("S_xx"));
    }

    #[test]
    fn reports_duplicate_and_missing_columns() {
        let t = text(&sample()).replacen("S_aa", "S_su", 1);
        let (_, column, what) = parse_err(&t);
        assert_eq!(column, 2);
        assert!(what.contains("duplicate"));

        let mut lines = text(&sample())
            .lines()
            .map(|l| l.rsplit_once(',').unwrap().0.to_string())
            .collect::<Vec<_>>();
        lines.push(String::new());
        let (_, _, what) = parse_err(&lines.join("\n"));
        assert!(what.contains("P_gas"));
    }

    #[test]
    fn reports_bad_values_with_location() {
        let t = text(&sample());
        let mut lines: Vec<String> = t.lines().map(str::to_string).collect();
        let mut row: Vec<&str> = lines[1].split(',').collect();
        row[6] = "abc";
        let replaced = row.join(",");
        lines[1] = replaced;
        let (line, column, _) = parse_err(&lines.join("\n"));
        assert_eq!((line, column), (2, 7));

        let mut row: Vec<&str> = t.lines().nth(1).unwrap().split(',').collect();
        row[3] = "NaN";
        let content = format!("{}\n{}", t.lines().next().unwrap(), row.join(","));
        let (_, column, what) = parse_err(&content);
        assert_eq!(column, 4);
        assert!(what.contains("S_va"));
    }

    #[test]
    fn reports_wrong_field_count_and_extra_rows() {
        let t = text(&sample());
        let short = format!("{}\n1,2,3\n", t.lines().next().unwrap());
        let (line, _, what) = parse_err(&short);
        assert_eq!(line, 2);
        assert!(what.contains("expected 37"));

        let doubled = format!("{t}{}\n", t.lines().nth(1).unwrap());
        let (line, _, _) = parse_err(&doubled);
        assert_eq!(line, 3);

        let (line, _, _) = parse_err("");
        assert_eq!(line, 1);
    }

    #[test]
    fn empty_trace_has_nothing_to_save() {
        let path = std::env::temp_dir().join("ad_results_empty_trace.csv");
        assert!(matches!(
            save_final_state(&SimulationTrace::default(), &path),
            Err(ResultsError::EmptyTrace)
        ));
    }

    proptest! {
        #[test]
        fn round_trip_is_exact(values in prop::collection::vec(
            prop_oneof![Just(0.0), Just(-0.0), 0.0f64..1e3, 1e-300f64..1e-3, -1e-10f64..0.0],
            STATE_DIM,
        )) {
            let state = ReactorState::from_vec(values).unwrap();
            let back = parse_state(&text(&state), "prop").unwrap();
            prop_assert!(back.bit_eq(&state));
        }
    }
}
