use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::report::RecommendationReport;
use crate::workflows::catalogue::CustomerId;

const FILE_PREFIX: &str = "recommendations_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where a saved report ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub customer_id: CustomerId,
    pub location: String,
}

/// Persistence for finished reports so transports can hand them back later.
pub trait ReportRepository: Send + Sync {
    fn save(&self, report: &RecommendationReport) -> Result<StoredReport, ReportStoreError>;
    fn latest(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<RecommendationReport>, ReportStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportStoreError {
    #[error("report store I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("report {} is not valid JSON: {source}", .path.display())]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("report serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("report store unavailable: {0}")]
    Unavailable(String),
}

/// Writes each report as pretty JSON named
/// `recommendations_{customer}_{YYYYMMDD_HHMMSS}.json`.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, report: &RecommendationReport) -> PathBuf {
        self.dir.join(format!(
            "{FILE_PREFIX}{}_{}.json",
            report.customer_id(),
            report.generated_at.format(TIMESTAMP_FORMAT)
        ))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportStoreError + '_ {
        move |source| ReportStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ReportRepository for FileReportStore {
    fn save(&self, report: &RecommendationReport) -> Result<StoredReport, ReportStoreError> {
        fs::create_dir_all(&self.dir).map_err(Self::io_error(&self.dir))?;

        let path = self.path_for(report);
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(Self::io_error(&path))?;

        tracing::info!(
            customer_id = %report.customer_id(),
            path = %path.display(),
            "recommendation report saved"
        );

        Ok(StoredReport {
            customer_id: report.customer_id().clone(),
            location: path.display().to_string(),
        })
    }

    fn latest(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<RecommendationReport>, ReportStoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(Self::io_error(&self.dir)(err)),
        };

        let prefix = format!("{FILE_PREFIX}{customer_id}_");
        let mut newest: Option<(String, PathBuf)> = None;
        for entry in entries {
            let entry = entry.map_err(Self::io_error(&self.dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(stamp) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".json"))
            else {
                continue;
            };
            if !is_timestamp(stamp) {
                continue;
            }
            if newest.as_ref().map_or(true, |(best, _)| stamp > best.as_str()) {
                newest = Some((stamp.to_string(), entry.path()));
            }
        }

        let Some((_, path)) = newest else {
            return Ok(None);
        };
        let raw = fs::read_to_string(&path).map_err(Self::io_error(&path))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ReportStoreError::Format { path, source })
    }
}

fn is_timestamp(stamp: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok()
}
