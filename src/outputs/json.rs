//! JSON output of a [`Report`].
//!
//! Reports can be printed as JSON or saved for later inspection. Saved
//! reports are grouped by local date:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 081500-042.json
//!     ├── 173002-917.json
//!     └── 173002-917-1.json
//! ```
//!
//! Existing files are never overwritten; a clashing name gets a `-N` suffix.

use crate::pipeline::Report;
use chrono::{DateTime, Local};
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

/// Pretty-printed JSON for `report`.
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Path of the file a report fetched at `at` is saved to, before any
/// clash suffix: `{json_output_dir}/{YYYY-MM-DD}/{HHMMSS-mmm}.json`.
pub fn report_path(json_output_dir: &str, at: DateTime<Local>) -> PathBuf {
    PathBuf::from(json_output_dir)
        .join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", at.format("%H%M%S-%3f")))
}

/// `base` with `-{n}` inserted before the extension; `n == 0` is `base`.
fn numbered(base: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return base.to_path_buf();
    }
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    base.with_file_name(format!("{stem}-{n}.json"))
}

/// Write a [`Report`] to a JSON file under a dated directory.
///
/// Creates the dated directory if needed and writes the pretty-printed
/// report. The file is opened with `create_new`, so a report from an
/// earlier run is never replaced; on a name clash a numeric suffix is
/// tried instead.
///
/// # Arguments
///
/// * `report` - The report to serialize
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path written, or an error if serialization, directory creation or
/// file writing fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    report: &Report,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = to_json(report)?;
    let base = report_path(json_output_dir, Local::now());

    if let Some(dir) = base.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    let mut n = 0;
    let (path, mut file) = loop {
        let candidate = numbered(&base, n);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => break (candidate, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    };

    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    info!(path = %path.display(), articles = report.article_count(), "Wrote JSON report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::tests::article;
    use crate::pipeline::FetchOutcome;
    use chrono::{TimeZone, Timelike};

    fn report() -> Report {
        Report::Single {
            summary: "Fetching General news for GB...".to_string(),
            outcome: FetchOutcome::Articles {
                articles: vec![article("one", None)],
            },
        }
    }

    #[test]
    fn test_report_path_layout() {
        let at = Local.with_ymd_and_hms(2025, 5, 6, 8, 15, 0).unwrap();
        let path = report_path("/tmp/news", at);
        assert_eq!(path, PathBuf::from("/tmp/news/2025-05-06/081500-000.json"));

        let at = Local
            .with_ymd_and_hms(2025, 5, 6, 8, 15, 0)
            .unwrap()
            .with_nanosecond(42_000_000)
            .unwrap();
        let path = report_path("/tmp/news", at);
        assert_eq!(path, PathBuf::from("/tmp/news/2025-05-06/081500-042.json"));
    }

    #[test]
    fn test_numbered_suffix() {
        let base = PathBuf::from("/tmp/news/2025-05-06/081500-042.json");
        assert_eq!(numbered(&base, 0), base);
        assert_eq!(
            numbered(&base, 2),
            PathBuf::from("/tmp/news/2025-05-06/081500-042-2.json")
        );
    }

    #[test]
    fn test_json_shape() {
        let v: serde_json::Value = serde_json::from_str(&to_json(&report()).unwrap()).unwrap();
        assert_eq!(v["mode"], "single");
        assert_eq!(v["summary"], "Fetching General news for GB...");
        assert_eq!(v["outcome"]["state"], "articles");
        assert_eq!(v["outcome"]["articles"][0]["title"], "one");
        assert_eq!(v["outcome"]["articles"][0]["source_name"], "Wire");
    }

    #[tokio::test]
    async fn test_write_report_creates_dated_file() {
        let dir = std::env::temp_dir().join(format!("headline_desk_json_{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();

        let path = write_report(&report(), &dir_str).await.unwrap();
        assert!(path.starts_with(&dir));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"title\": \"one\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_back_to_back_reports_do_not_overwrite() {
        let dir = std::env::temp_dir().join(format!("headline_desk_json_twice_{}", std::process::id()));
        let dir_str = dir.to_string_lossy().to_string();

        let report = report();
        let paths = futures::future::join_all((0..5).map(|_| write_report(&report, &dir_str)))
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(paths.len(), 5);
        for path in &paths {
            assert!(std::fs::read_to_string(path).unwrap().contains("\"title\": \"one\""));
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
