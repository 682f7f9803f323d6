//! Time series logging.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::rc::Rc;

use csv::{Writer, WriterBuilder};
use sugars::{rc, refcell};

use crate::core::error::SimulationError;

/// Series recorded by the migration manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Series {
    PmLoads,
    PmSetPoints,
    PmRelocationThresholds,
    PmIntegratedOverload,
    PmWindowOverload,
    VmLoads,
    VmMigrations,
    /// One row per migration event instead of one row per step.
    Migrations,
}

impl Series {
    pub const ALL: [Series; 8] = [
        Series::PmLoads,
        Series::PmSetPoints,
        Series::PmRelocationThresholds,
        Series::PmIntegratedOverload,
        Series::PmWindowOverload,
        Series::VmLoads,
        Series::VmMigrations,
        Series::Migrations,
    ];

    /// Returns the name of file holding the series.
    pub fn file_name(&self) -> &'static str {
        match self {
            Series::PmLoads => "PMloads.csv",
            Series::PmSetPoints => "PMsetpoints.csv",
            Series::PmRelocationThresholds => "PMrelocationthresholds.csv",
            Series::PmIntegratedOverload => "PMioi.csv",
            Series::PmWindowOverload => "PMwoi.csv",
            Series::VmLoads => "VMloads.csv",
            Series::VmMigrations => "VMmigrations.csv",
            Series::Migrations => "MMmigrations.csv",
        }
    }
}

/// Formats a vector of values as a log row.
pub fn format_row<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Destination of series rows.
pub trait SeriesLogger {
    fn log_row(&mut self, series: Series, row: &[String]) -> Result<(), SimulationError>;

    fn flush(&mut self) -> Result<(), SimulationError>;
}

/// Writes every series to its own headerless CSV file in the output directory.
pub struct CsvSeriesLogger {
    writers: BTreeMap<Series, Writer<File>>,
}

impl CsvSeriesLogger {
    /// Creates (truncating) all series files in `outdir`, which must exist.
    pub fn new<P: AsRef<Path>>(outdir: P) -> Result<Self, SimulationError> {
        let mut writers = BTreeMap::new();
        for series in Series::ALL {
            let path = outdir.as_ref().join(series.file_name());
            let writer = WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&path)?;
            writers.insert(series, writer);
        }
        Ok(Self { writers })
    }
}

impl SeriesLogger for CsvSeriesLogger {
    fn log_row(&mut self, series: Series, row: &[String]) -> Result<(), SimulationError> {
        if let Some(writer) = self.writers.get_mut(&series) {
            writer.write_record(row)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimulationError> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Keeps rows in memory. Clones share the same storage, so a clone can be passed to the manager and inspected later.
#[derive(Clone, Default)]
pub struct MemorySeriesLogger {
    rows: Rc<RefCell<BTreeMap<Series, Vec<Vec<String>>>>>,
}

impl MemorySeriesLogger {
    pub fn new() -> Self {
        Self {
            rows: rc!(refcell!(BTreeMap::new())),
        }
    }

    /// Returns all rows of the series.
    pub fn rows(&self, series: Series) -> Vec<Vec<String>> {
        self.rows.borrow().get(&series).cloned().unwrap_or_default()
    }

    /// Returns the series rendered as CSV text.
    pub fn text(&self, series: Series) -> String {
        self.rows(series)
            .iter()
            .map(|row| format!("{}\n", row.join(",")))
            .collect()
    }
}

impl SeriesLogger for MemorySeriesLogger {
    fn log_row(&mut self, series: Series, row: &[String]) -> Result<(), SimulationError> {
        self.rows.borrow_mut().entry(series).or_default().push(row.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_shares_rows() {
        let logger = MemorySeriesLogger::new();
        let mut handle = logger.clone();
        handle.log_row(Series::PmLoads, &format_row(&[1.5, 2.])).unwrap();
        handle.log_row(Series::PmLoads, &format_row(&[0.25, 0.])).unwrap();
        assert_eq!(logger.rows(Series::PmLoads).len(), 2);
        assert_eq!(logger.text(Series::PmLoads), "1.5,2\n0.25,0\n");
        assert!(logger.rows(Series::VmLoads).is_empty());
    }
}
