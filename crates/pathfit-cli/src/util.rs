use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use pathfit_logs::collect::RunCollection;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)?;
        if let Output::File { path, .. } = &output {
            eprintln!("Saved to {}", path.display());
        }
        Ok(())
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Collect run logs from a directory, reporting progress on stderr.
///
/// Iterations whose log holds no matching record are reported as warnings;
/// they contribute nothing to the run's sample.
pub fn collect_runs<P>(dir: P) -> anyhow::Result<RunCollection>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    eprintln!("Collecting logs from {}...", dir.display());
    let collection = RunCollection::from_dir(dir)
        .with_context(|| format!("Failed to collect logs from {}", dir.display()))?;

    for (run, series) in collection.runs() {
        let empty = series.empty_iterations();
        if !empty.is_empty() {
            eprintln!(
                "Warning: run {run}: {} iteration(s) without any record: {empty:?}",
                empty.len()
            );
        }
    }
    eprintln!("Collected {} run(s)", collection.len());

    Ok(collection)
}

/// Format an error together with its chain of sources.
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use pathfit_analysis::{bootstrap::BootstrapError, family::Family, fit::FitError};

    use super::*;

    #[test]
    fn test_error_chain_includes_sources() {
        let err = BootstrapError::ResampleFit {
            replicate: 4,
            source: FitError {
                family: Family::Gamma,
                reason: pathfit_analysis::fit::FitFailure::Degenerate,
            },
        };
        let message = error_chain(&err);
        assert!(message.contains("4"));
        assert!(message.contains("cannot fit gamma distribution"));
    }

    #[test]
    fn test_read_json_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: anyhow::Result<serde_json::Value> =
            read_json_file("config", dir.path().join("missing.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));
    }
}
