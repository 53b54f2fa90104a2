use std::{
    io::Write,
    path::{Path, PathBuf},
};

use fs_err as fs;
use tracing::{debug, info};
use trial_arci::PoseSample;

use crate::{Error, Result, SpeedState, TrialType};

pub const RECORD_HEADER: &str = "x y z x_rot y_rot z_rot w_rot";
const RECORD_EXTENSION: &str = ".txt";

fn record_file_prefix(speed_state: SpeedState, trial_type: TrialType) -> String {
    format!("speed_{speed_state}_trial_{trial_type}_num_")
}

/// `speed_{s}_trial_{t}_num_{n}.txt`
pub fn record_file_name(speed_state: SpeedState, trial_type: TrialType, number: u64) -> String {
    format!(
        "{}{number}{RECORD_EXTENSION}",
        record_file_prefix(speed_state, trial_type)
    )
}

/// Digits of the sequence number, if `file_name` is a record of this pair.
fn sequence_digits<'a>(file_name: &'a str, prefix: &str) -> Option<&'a str> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_suffix(RECORD_EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

/// Scans `dir` once and returns 1 + the largest existing sequence number for
/// this pair, or 0 if there is none. Files of other pairs and names that do
/// not follow the pattern are ignored. A record whose number cannot be
/// incremented is an error.
pub fn next_sequence_number(
    dir: impl AsRef<Path>,
    speed_state: SpeedState,
    trial_type: TrialType,
) -> Result<u64> {
    let prefix = record_file_prefix(speed_state, trial_type);
    let mut max: Option<(u64, PathBuf)> = None;
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(digits) = name.to_str().and_then(|name| sequence_digits(name, &prefix)) else {
            continue;
        };
        // all digits, so parsing only fails past u64::MAX
        let n: u64 = digits
            .parse()
            .map_err(|_| Error::SequenceNumberOverflow(entry.path()))?;
        if max.as_ref().map_or(true, |(m, _)| n > *m) {
            max = Some((n, entry.path()));
        }
    }
    match max {
        None => Ok(0),
        Some((n, path)) => n
            .checked_add(1)
            .ok_or(Error::SequenceNumberOverflow(path)),
    }
}

/// Append-only output file of one trial.
///
/// Every line is flushed to the OS before `append` returns, so a killed
/// process never loses a sample that was reported as written.
#[derive(Debug)]
pub struct TrialRecord {
    file: fs::File,
    path: PathBuf,
    speed_state: SpeedState,
    trial_type: TrialType,
    sequence_number: u64,
    samples_written: usize,
    fsync_each_sample: bool,
}

impl TrialRecord {
    /// Creates the next free record for this pair in `dir` (creating `dir` if
    /// needed) and writes the header.
    pub fn create(
        dir: impl AsRef<Path>,
        speed_state: SpeedState,
        trial_type: TrialType,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let sequence_number = next_sequence_number(dir, speed_state, trial_type)?;
        let path = dir.join(record_file_name(speed_state, trial_type, sequence_number));
        // create_new: never clobber a record written by a concurrent run.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        writeln!(file, "{RECORD_HEADER}")?;
        file.flush()?;
        info!("created trial record {}", path.display());
        Ok(Self {
            file,
            path,
            speed_state,
            trial_type,
            sequence_number,
            samples_written: 0,
            fsync_each_sample: false,
        })
    }

    /// Record writing to an already open `file`, without a header.
    #[cfg(test)]
    pub(crate) fn from_file(
        file: fs::File,
        speed_state: SpeedState,
        trial_type: TrialType,
    ) -> Self {
        Self {
            path: file.path().to_owned(),
            file,
            speed_state,
            trial_type,
            sequence_number: 0,
            samples_written: 0,
            fsync_each_sample: false,
        }
    }

    /// Also `sync_data` after every line, surviving power loss rather than
    /// only process death.
    pub fn with_fsync_each_sample(mut self, fsync_each_sample: bool) -> Self {
        self.fsync_each_sample = fsync_each_sample;
        self
    }

    pub fn append(&mut self, sample: &PoseSample) -> Result<()> {
        let line = format_sample(sample);
        writeln!(self.file, "{line}")?;
        self.file.flush()?;
        if self.fsync_each_sample {
            self.file.sync_data()?;
        }
        self.samples_written += 1;
        debug!(samples = self.samples_written, "{line}");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn speed_state(&self) -> SpeedState {
        self.speed_state
    }

    pub fn trial_type(&self) -> TrialType {
        self.trial_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn samples_written(&self) -> usize {
        self.samples_written
    }

    /// Flushes and syncs the file, then closes it.
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// One record line: 7 space separated values, always with a decimal point.
pub fn format_sample(sample: &PoseSample) -> String {
    sample
        .values()
        .iter()
        .map(|v| format!("{v:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}
