//! JSON report writer for training and evaluation runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes run reports to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Reports are named `{experiment}_report.json`.
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Return the path the report is written to.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.json", self.experiment.as_str()))
    }

    /// Write `report` as pretty JSON, wrapped with the experiment name.
    ///
    /// The file holds `{"experiment": ..., "report": ...}`. Returns the path written.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | `report` cannot be encoded as JSON |
    /// | [`IoError::WriteFile`] | the file cannot be written |
    #[instrument(skip_all)]
    pub fn write_report<T: Serialize>(&self, report: &T) -> Result<PathBuf, IoError> {
        let path = self.report_path();
        let artifact = ReportArtifact {
            experiment: self.experiment.as_str(),
            report,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "report written");
        Ok(path)
    }
}

#[derive(Serialize)]
struct ReportArtifact<'a, T: Serialize> {
    experiment: &'a str,
    report: &'a T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Summary {
        accuracy: f64,
        n_test: usize,
    }

    #[test]
    fn write_report_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), ExperimentName::new("spect".into()).unwrap()).unwrap();
        let path = writer
            .write_report(&Summary {
                accuracy: 0.75,
                n_test: 4,
            })
            .unwrap();

        assert_eq!(path, dir.path().join("spect_report.json"));
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["experiment"], "spect");
        assert_eq!(content["report"]["n_test"], 4);
        assert!((content["report"]["accuracy"].as_f64().unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = ReportWriter::new(&nested, ExperimentName::new("x".into()).unwrap()).unwrap();
        writer.write_report(&Summary { accuracy: 1.0, n_test: 1 }).unwrap();
        assert!(nested.join("x_report.json").exists());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let result = ReportWriter::new(&blocker.join("out"), ExperimentName::new("x".into()).unwrap());
        assert!(matches!(result, Err(IoError::OutputDirCreate { .. })));
    }
}
