use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::conf::LogStreamConfig;
use crate::error::LogError;
use crate::parser::{FormatRegistry, LogEntry};
use crate::query::{LogQuery, QueryOptions, ScanStats};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Log(#[from] LogError),

    #[error("log service is shut down")]
    Closed,

    #[error("log read task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Log(e) if e.is_not_found())
    }
}

/// Async front for log queries.
///
/// Each query runs on the blocking pool; a semaphore caps how many run at
/// once. The registry is built once and shared read-only by every query.
#[derive(Clone)]
pub struct LogService {
    registry: Arc<FormatRegistry>,
    permits: Arc<Semaphore>,
    defaults: QueryOptions,
}

impl LogService {
    pub fn new(config: &LogStreamConfig) -> Self {
        info!(
            max_concurrent_reads = config.max_concurrent_reads,
            chunk_size = config.chunk_size,
            "log service ready"
        );
        Self::with_registry(
            Arc::new(config.registry()),
            config.max_concurrent_reads,
            config.query_options(),
        )
    }

    pub fn with_registry(registry: Arc<FormatRegistry>, max_concurrent_reads: usize, defaults: QueryOptions) -> Self {
        Self {
            registry,
            permits: Arc::new(Semaphore::new(max_concurrent_reads.max(1))),
            defaults,
        }
    }

    /// Options seeded from configuration, ready for per-request tweaks.
    pub fn options(&self) -> QueryOptions {
        self.defaults.clone()
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn get_entries(
        &self,
        path: impl Into<PathBuf>,
        options: QueryOptions,
    ) -> Result<Vec<LogEntry>, ServiceError> {
        self.query(path, options).await.map(|(entries, _)| entries)
    }

    pub async fn query(
        &self,
        path: impl Into<PathBuf>,
        options: QueryOptions,
    ) -> Result<(Vec<LogEntry>, ScanStats), ServiceError> {
        let path = path.into();
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| ServiceError::Closed)?;

        let registry = Arc::clone(&self.registry);
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            LogQuery::new(&registry).execute_with_stats(&path, &options)
        })
        .await?;

        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "log read finished");
        Ok(result?)
    }

    /// Refuse new queries. Queries already holding a permit run to completion.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Order;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(lines: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..lines {
            writeln!(file, r#"{{"level":"info","msg":"line {}"}}"#, i).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_query_through_service() {
        let file = fixture(10);
        let service = LogService::new(&LogStreamConfig::default());

        let entries = service
            .get_entries(file.path(), service.options().order(Order::Desc).limit(2))
            .await
            .unwrap();
        let messages: Vec<&str> = entries.iter().map(|e| e.message()).collect();
        assert_eq!(messages, vec!["line 9", "line 8"]);
    }

    #[tokio::test]
    async fn test_config_defaults_apply() {
        let file = fixture(10);
        let config = LogStreamConfig {
            default_limit: Some(3),
            ..Default::default()
        };
        let service = LogService::new(&config);

        let (entries, stats) = service.query(file.path(), service.options()).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(stats.lines_scanned, 3);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let service = LogService::new(&LogStreamConfig::default());
        let err = service
            .get_entries("/nonexistent/logstream/app.log", QueryOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "{}", err);
    }

    #[tokio::test]
    async fn test_concurrent_queries_share_registry() {
        let file = fixture(200);
        let config = LogStreamConfig {
            max_concurrent_reads: 2,
            ..Default::default()
        };
        let service = LogService::new(&config);

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let path = file.path().to_path_buf();
            handles.push(tokio::spawn(async move {
                let opts = QueryOptions::new().search(format!("line {}", i)).chunk_size(64);
                service.get_entries(path, opts).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let entries = handle.await.unwrap().unwrap();
            // "line 1" also matches "line 10".."line 199"
            let expected = (0..200).filter(|n| format!("line {}", n).contains(&format!("line {}", i))).count();
            assert_eq!(entries.len(), expected);
        }
        assert_eq!(service.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_closed_service_rejects_queries() {
        let file = fixture(1);
        let service = LogService::new(&LogStreamConfig::default());
        service.close();

        let err = service.get_entries(file.path(), QueryOptions::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Closed));
    }
}
