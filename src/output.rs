//! Snapshot consumers for the command-line runner

use nbody_simulation::{SinkControl, Snapshot, SnapshotSink};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Writes `step,body,x,y,z` rows for every `every`-th snapshot.
///
/// A write error stops the run at the next step boundary and is reported by
/// [`CsvSink::finish`].
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    every: u64,
    rows: u64,
    error: Option<csv::Error>,
}

impl CsvSink {
    pub fn create(path: &Path, every: u64) -> csv::Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["step", "body", "x", "y", "z"])?;
        Ok(Self {
            path: path.to_owned(),
            writer,
            every: every.max(1),
            rows: 0,
            error: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot<'_>) -> csv::Result<()> {
        let step = snapshot.step().to_string();
        for (body, p) in snapshot.positions().iter().enumerate() {
            self.writer.write_record([
                step.clone(),
                body.to_string(),
                p.x.to_string(),
                p.y.to_string(),
                p.z.to_string(),
            ])?;
        }
        self.rows += snapshot.len() as u64;
        Ok(())
    }

    /// Flush and return the number of rows written
    pub fn finish(mut self) -> csv::Result<u64> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.rows)
    }
}

impl SnapshotSink for CsvSink {
    fn wants(&self, step: u64) -> bool {
        step % self.every == 0
    }

    fn consume(&mut self, snapshot: Snapshot<'_>) -> SinkControl {
        match self.write_snapshot(&snapshot) {
            Ok(()) => SinkControl::Continue,
            Err(err) => {
                log::error!("writing {} failed: {}", self.path.display(), err);
                self.error = Some(err);
                SinkControl::Stop
            }
        }
    }
}

/// Output selected on the command line
pub enum Output {
    /// Step without reading positions back
    Discard,
    Csv(CsvSink),
}

impl SnapshotSink for Output {
    fn wants(&self, step: u64) -> bool {
        match self {
            Output::Discard => false,
            Output::Csv(csv) => csv.wants(step),
        }
    }

    fn consume(&mut self, snapshot: Snapshot<'_>) -> SinkControl {
        match self {
            Output::Discard => SinkControl::Continue,
            Output::Csv(csv) => csv.consume(snapshot),
        }
    }
}
