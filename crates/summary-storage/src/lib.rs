mod daily_log;
mod observer;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use summary_core::{
    day_stamp, derive_keywords, refine_content, summary_id, Clock, SummaryRecord, SystemClock,
};
use thiserror::Error;

pub use daily_log::{render_header, DailyLog, PersistOutcome, LOG_EXTENSION};
pub use observer::{NoopObserver, StoreObserver, TracingObserver};

const FIRST_ID: u64 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("nothing to save: no summaries recorded")]
    NothingToSave,
    #[error("no storage directory configured and home directory is unavailable")]
    HomeDirUnavailable,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedSummary {
    pub id: String,
    pub refined_content: String,
    pub formatted_summary: String,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryQuery {
    pub filter_keywords: Vec<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_day_stamp: Option<String>,
    pub keyword_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub file_path: PathBuf,
    pub saved_count: usize,
    pub summaries: Vec<String>,
    pub outcome: PersistOutcome,
}

/// Process-scoped, insertion-ordered collection of summaries.
pub struct SummaryStore {
    records: Vec<SummaryRecord>,
    next_id: u64,
    default_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn StoreObserver>,
}

impl SummaryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            next_id: FIRST_ID,
            default_dir: None,
            clock,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Directory used by [`SummaryStore::persist`] when no path is passed.
    pub fn with_default_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.default_dir = dir;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SummaryRecord] {
        &self.records
    }

    pub fn add<S: AsRef<str>>(
        &mut self,
        content: &str,
        keywords: &[S],
    ) -> Result<AddedSummary, StoreError> {
        if content.is_empty() {
            return Err(StoreError::InvalidArgument(
                "content must be a non-empty string".to_string(),
            ));
        }

        let refined = refine_content(content);
        let keywords = derive_keywords(&refined, keywords);
        let created_at = self.clock.now();
        let record = SummaryRecord {
            id: summary_id(self.next_id),
            day_stamp: day_stamp(&created_at),
            content: refined,
            keywords,
            created_at,
        };
        self.next_id += 1;

        let formatted_summary = record.formatted();
        self.observer.summary_added(&record, &formatted_summary);
        let added = AddedSummary {
            id: record.id.clone(),
            refined_content: record.content.clone(),
            formatted_summary,
        };
        self.records.push(record);
        Ok(added)
    }

    /// Formatted summaries matching `query`, oldest first.
    ///
    /// The keyword filter runs before the limit, so the limit keeps the most
    /// recent matches.
    pub fn query(&self, query: &SummaryQuery) -> Vec<String> {
        let matched = self
            .records
            .iter()
            .filter(|record| {
                query.filter_keywords.is_empty()
                    || record.matches_any(query.filter_keywords.as_slice())
            })
            .collect::<Vec<_>>();
        let skip = match query.limit {
            Some(limit) if limit > 0 => matched.len().saturating_sub(limit),
            _ => 0,
        };
        matched
            .into_iter()
            .skip(skip)
            .map(SummaryRecord::formatted)
            .collect()
    }

    pub fn list(&self) -> Vec<String> {
        self.query(&SummaryQuery::default())
    }

    pub fn stats(&self) -> SummaryStats {
        let mut keyword_counts = BTreeMap::new();
        for keyword in self.records.iter().flat_map(|r| r.keywords.iter()) {
            *keyword_counts.entry(keyword.clone()).or_insert(0) += 1;
        }
        SummaryStats {
            total: self.len(),
            latest_day_stamp: self.records.last().map(|r| r.day_stamp.clone()),
            keyword_counts,
        }
    }

    /// Drops every record and restarts id assignment. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.records.clear();
        self.next_id = FIRST_ID;
        self.observer.summaries_cleared(count);
        count
    }

    /// Writes every current summary under a fresh header to today's log file.
    pub fn persist(&self, custom_dir: Option<&Path>) -> Result<PersistReport, StoreError> {
        let result = self.persist_inner(custom_dir);
        if let Err(err) = &result {
            self.observer.persist_failed(err);
        }
        result
    }

    fn persist_inner(&self, custom_dir: Option<&Path>) -> Result<PersistReport, StoreError> {
        let summaries = self.list();
        if summaries.is_empty() {
            return Err(StoreError::NothingToSave);
        }

        let dir = self.resolve_dir(custom_dir)?;
        let now = self.clock.now();
        let log = DailyLog::for_day(&dir, &now);
        let outcome = log.write_block(&now, &summaries)?;
        self.observer
            .summaries_persisted(log.path(), summaries.len(), outcome);

        Ok(PersistReport {
            file_path: log.path().to_path_buf(),
            saved_count: summaries.len(),
            summaries,
            outcome,
        })
    }

    /// Explicit path, then the configured default, then the home directory.
    pub fn resolve_dir(&self, custom_dir: Option<&Path>) -> Result<PathBuf, StoreError> {
        custom_dir
            .filter(|p| !is_blank(p))
            .map(Path::to_path_buf)
            .or_else(|| self.default_dir.clone().filter(|p| !is_blank(p)))
            .or_else(dirs::home_dir)
            .ok_or(StoreError::HomeDirUnavailable)
    }
}

impl Default for SummaryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_blank(path: &Path) -> bool {
    path.to_str().map_or(path.as_os_str().is_empty(), |s| s.trim().is_empty())
}
