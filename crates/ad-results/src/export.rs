//! Derived output table: one CSV row per grid point.

use std::io::Write;

use ad_core::ReactorState;
use ad_sim::{SimError, SimResult, SimulationTrace, TraceSink};

use crate::ResultsResult;
use crate::extract::{Extractor, MonitoredVariables};
use crate::types::TimeseriesRecord;

fn header() -> String {
    let mut cols = vec!["time_d"];
    cols.extend(MonitoredVariables::NAMES);
    cols.join(",")
}

fn row(time_days: f64, vars: &MonitoredVariables) -> String {
    let mut fields = vec![format!("{time_days:?}")];
    fields.extend(vars.values().iter().map(|v| format!("{v:?}")));
    fields.join(",")
}

/// Write the whole trace as a table.
pub fn write_table<W: Write>(
    mut out: W,
    extractor: &Extractor,
    trace: &SimulationTrace,
) -> ResultsResult<()> {
    writeln!(out, "{}", header())?;
    for (t, vars) in extractor.extract_trace(trace) {
        writeln!(out, "{}", row(t, &vars))?;
    }
    out.flush()?;
    Ok(())
}

/// Write stored records, e.g. from a cached run.
pub fn write_records<W: Write>(mut out: W, records: &[TimeseriesRecord]) -> ResultsResult<()> {
    writeln!(out, "{}", header())?;
    for record in records {
        writeln!(out, "{}", row(record.time_d, &record.values))?;
    }
    out.flush()?;
    Ok(())
}

/// Streams table rows as states are recorded.
pub struct CsvTableSink<W: Write> {
    out: W,
    extractor: Extractor,
    rows: usize,
}

impl<W: Write> CsvTableSink<W> {
    pub fn new(out: W, extractor: Extractor) -> Self {
        Self {
            out,
            extractor,
            rows: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn sink_err(e: std::io::Error) -> SimError {
    SimError::Sink {
        message: e.to_string(),
    }
}

impl<W: Write> TraceSink for CsvTableSink<W> {
    fn record(&mut self, _index: usize, time_days: f64, state: &ReactorState) -> SimResult<()> {
        if self.rows == 0 {
            writeln!(self.out, "{}", header()).map_err(sink_err)?;
        }
        let vars = self.extractor.extract_state(state);
        writeln!(self.out, "{}", row(time_days, &vars)).map_err(sink_err)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> SimResult<()> {
        self.out.flush().map_err(sink_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::{Compartment, ReactorParams};
    use ad_sim::BufferedTrace;

    fn trace() -> SimulationTrace {
        let mut trace = SimulationTrace::default();
        for i in 0..4 {
            let s = ReactorState::zeros()
                .with(Compartment::SAc, 0.1 * i as f64)
                .with(Compartment::SHco3Ion, 0.1)
                .with(Compartment::PGas, 1.0);
            trace.record(i, i as f64, &s).unwrap();
        }
        trace
    }

    #[test]
    fn table_has_time_and_every_variable() {
        let extractor = Extractor::new(ReactorParams::default());
        let mut buf = Vec::new();
        write_table(&mut buf, &extractor, &trace()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("time_d,q_gas_m3_d,"));
        assert_eq!(lines[0].split(',').count(), 12);
        assert!(lines[3].starts_with("2.0,"));
    }

    #[test]
    fn streaming_sink_matches_table() {
        let extractor = Extractor::new(ReactorParams::default());
        let mut expected = Vec::new();
        write_table(&mut expected, &extractor, &trace()).unwrap();

        let mut sink = BufferedTrace::new(CsvTableSink::new(Vec::new(), extractor), 3);
        for (i, (t, s)) in trace().iter().enumerate() {
            sink.record(i, t, s).unwrap();
        }
        sink.finish().unwrap();
        let csv = sink.into_inner().unwrap();
        assert_eq!(csv.rows(), 4);
        assert_eq!(csv.into_inner(), expected);
    }

    #[test]
    fn stored_records_export_like_the_trace() {
        let extractor = Extractor::new(ReactorParams::default());
        let mut expected = Vec::new();
        write_table(&mut expected, &extractor, &trace()).unwrap();

        let records: Vec<TimeseriesRecord> = extractor
            .extract_trace(&trace())
            .into_iter()
            .map(|(time_d, values)| TimeseriesRecord { time_d, values })
            .collect();
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        assert_eq!(buf, expected);
    }
}
