//! JSON report writer.
//!
//! Writes each report request as a pretty-printed JSON file into a
//! directory. File names carry the reason, the tick and a UTC timestamp so
//! several reports of one run never collide.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use synod_application::ports::report::{ReportError, ReportPort, ReportRequest};
use tracing::info;

#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: String,
    messages: usize,
    notices: usize,
    #[serde(flatten)]
    request: &'a ReportRequest,
}

/// [`ReportPort`] adapter writing `report-<reason>-t<tick>-<timestamp>.json` files.
pub struct JsonReportWriter {
    dir: PathBuf,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ReportPort for JsonReportWriter {
    async fn deliver(&self, request: ReportRequest) -> Result<String, ReportError> {
        let now = chrono::Utc::now();
        let messages = request.log.iter().filter(|e| e.as_message().is_some()).count();
        let file = ReportFile {
            generated_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            messages,
            notices: request.log.len() - messages,
            request: &request,
        };
        let content = serde_json::to_vec_pretty(&file)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "report-{}-t{}-{}.json",
            request.reason.as_str().to_lowercase(),
            request.tick,
            now.format("%Y%m%dT%H%M%S%3f")
        );
        let path = self.dir.join(name);
        tokio::fs::write(&path, content).await?;

        info!(reason = %request.reason, path = %path.display(), "Report written");
        Ok(path.display().to_string())
    }
}
