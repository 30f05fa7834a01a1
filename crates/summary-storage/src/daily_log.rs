use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, FixedOffset};
use parking_lot::Mutex;
use summary_core::{day_stamp, local_timestamp};

pub const LOG_EXTENSION: &str = "md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Created,
    Appended,
}

impl PersistOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Appended => "appended",
        }
    }
}

/// One `<YYYYMMDD>.md` file that accumulates save blocks for a calendar day.
#[derive(Debug, Clone)]
pub struct DailyLog {
    path: PathBuf,
}

impl DailyLog {
    pub fn for_day(dir: &Path, at: &DateTime<FixedOffset>) -> Self {
        Self {
            path: dir.join(format!("{}.{LOG_EXTENSION}", day_stamp(at))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a header stamped with `saved_at` followed by `lines`.
    ///
    /// A missing file is created; an existing one is only ever appended to.
    /// Concurrent writers to the same path are serialized.
    pub fn write_block(
        &self,
        saved_at: &DateTime<FixedOffset>,
        lines: &[String],
    ) -> io::Result<PersistOutcome> {
        let lock = path_lock(&self.path);
        let _guard = lock.lock();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let outcome = if self.path.exists() {
            PersistOutcome::Appended
        } else {
            PersistOutcome::Created
        };
        let mut file = self.open(outcome)?;
        file.write_all(render_block(saved_at, lines).as_bytes())?;
        file.flush()?;
        Ok(outcome)
    }

    fn open(&self, outcome: PersistOutcome) -> io::Result<File> {
        match outcome {
            PersistOutcome::Created => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path),
            PersistOutcome::Appended => OpenOptions::new().append(true).open(&self.path),
        }
    }
}

pub fn render_header(saved_at: &DateTime<FixedOffset>) -> String {
    format!("=== 保存时间: {} ===", local_timestamp(saved_at))
}

fn render_block(saved_at: &DateTime<FixedOffset>, lines: &[String]) -> String {
    let mut block = render_header(saved_at);
    block.push('\n');
    for line in lines {
        block.push_str(line);
        block.push('\n');
    }
    block
}

fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let registry = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locked = registry.lock();
    Arc::clone(locked.entry(path.to_path_buf()).or_default())
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).expect("valid instant")
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn file_name_uses_local_day() {
        let log = DailyLog::for_day(Path::new("/tmp/sums"), &at("2026-02-12T00:30:00+08:00"));
        assert_eq!(log.path(), Path::new("/tmp/sums/20260212.md"));
    }

    #[test]
    fn first_write_creates_then_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = DailyLog::for_day(dir.path(), &at("2026-02-11T21:30:00+08:00"));

        let first = log
            .write_block(&at("2026-02-11T21:30:00+08:00"), &lines(&["a", "b"]))
            .expect("first write");
        assert_eq!(first, PersistOutcome::Created);

        let second = log
            .write_block(&at("2026-02-11T22:00:05+08:00"), &lines(&["c"]))
            .expect("second write");
        assert_eq!(second, PersistOutcome::Appended);

        let text = fs::read_to_string(log.path()).expect("read log");
        assert_eq!(
            text,
            "=== 保存时间: 2026-02-11 21:30:00 ===\na\nb\n=== 保存时间: 2026-02-11 22:00:05 ===\nc\n"
        );
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let log = DailyLog::for_day(&nested, &at("2026-02-11T21:30:00+08:00"));
        log.write_block(&at("2026-02-11T21:30:00+08:00"), &lines(&["x"]))
            .expect("write");
        assert!(nested.is_dir());
    }

    #[test]
    fn concurrent_blocks_do_not_interleave() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = DailyLog::for_day(dir.path(), &at("2026-02-11T21:30:00+08:00"));
        let saved_at = at("2026-02-11T21:30:00+08:00");

        let handles = (0..8)
            .map(|worker| {
                let log = log.clone();
                thread::spawn(move || {
                    let body = (0..20)
                        .map(|n| format!("worker-{worker} line-{n}"))
                        .collect::<Vec<_>>();
                    log.write_block(&saved_at, &body).expect("write block")
                })
            })
            .collect::<Vec<_>>();
        let outcomes = handles
            .into_iter()
            .map(|h| h.join().expect("join"))
            .collect::<Vec<_>>();
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == PersistOutcome::Created)
                .count(),
            1
        );

        let text = fs::read_to_string(log.path()).expect("read log");
        let all = text.lines().collect::<Vec<_>>();
        assert_eq!(all.len(), 8 * 21);
        for block in all.chunks(21) {
            assert!(block[0].starts_with("=== 保存时间"));
            let worker = block[1].split(' ').next().expect("worker tag");
            assert!(block[1..].iter().all(|line| line.starts_with(worker)));
        }
    }
}
