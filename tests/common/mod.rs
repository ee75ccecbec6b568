//! Shared fixtures for the end-to-end tests
//!
//! - `TestEnvironment`: a temp directory plus an event channel
//! - `IndexBuilder`: writes CLIXML index documents the way the indexer does

use filever_events::{AppEvent, EventReceiver, EventSender};
use filever_hash::{hash_bytes, HashAlgorithm};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub event_sender: EventSender,
    pub event_receiver: EventReceiver,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = filever_events::channel();
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            event_sender,
            event_receiver,
        }
    }

    pub fn path<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    /// Write `data` to `rel` inside the temp dir and return the full path
    pub fn write_file(&self, rel: &str, data: &[u8]) -> PathBuf {
        let path = self.path(rel);
        std::fs::write(&path, data).expect("write fixture");
        path
    }

    /// Everything emitted so far
    pub fn drain_events(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

struct Record {
    ok: bool,
    path: String,
    length: u64,
    hash: Option<String>,
    error: Option<String>,
}

/// Builds a CLIXML index document in memory.
pub struct IndexBuilder {
    algorithm: HashAlgorithm,
    root: String,
    records: Vec<Record>,
}

impl IndexBuilder {
    pub fn new(algorithm: HashAlgorithm, root: impl Into<String>) -> Self {
        Self {
            algorithm,
            root: root.into(),
            records: Vec::new(),
        }
    }

    /// Record `path` with the digest of `content`, as a clean scan would
    pub fn file(mut self, path: &Path, content: &[u8]) -> Self {
        self.records.push(Record {
            ok: true,
            path: path.display().to_string(),
            length: content.len() as u64,
            hash: Some(hash_bytes(self.algorithm, content)),
            error: None,
        });
        self
    }

    /// Record arbitrary values, for files that have drifted since the scan
    pub fn raw(mut self, path: &Path, length: u64, hash: &str) -> Self {
        self.records.push(Record {
            ok: true,
            path: path.display().to_string(),
            length,
            hash: Some(hash.to_string()),
            error: None,
        });
        self
    }

    /// A record the indexer could not hash
    pub fn failed(mut self, path: &Path, length: u64, error: &str) -> Self {
        self.records.push(Record {
            ok: false,
            path: path.display().to_string(),
            length,
            hash: None,
            error: Some(error.to_string()),
        });
        self
    }

    pub fn build(&self) -> String {
        let ok_count = self.records.iter().filter(|r| r.ok).count();
        let mut items = String::new();
        for r in &self.records {
            items.push_str("<Obj><DCT>\n");
            items.push_str(&format!(
                "<En><S N=\"Key\">ok</S><B N=\"Value\">{}</B></En>\n",
                r.ok
            ));
            items.push_str(&format!(
                "<En><S N=\"Key\">path</S><S N=\"Value\">{}</S></En>\n",
                escape(&r.path)
            ));
            items.push_str(&format!(
                "<En><S N=\"Key\">length</S><I64 N=\"Value\">{}</I64></En>\n",
                r.length
            ));
            items.push_str(&value_element("hash", r.hash.as_deref()));
            items.push_str(&value_element("error", r.error.as_deref()));
            items.push_str("</DCT></Obj>\n");
        }

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Objs Version="1.1.0.1" xmlns="http://schemas.microsoft.com/powershell/2004/04">
  <Obj RefId="0">
    <MS>
      <S N="createdUtc">2026-10-01T08:00:00Z</S>
      <S N="algorithm">{algorithm}</S>
      <S N="root">{root}</S>
      <I32 N="total">{total}</I32>
      <I32 N="okCount">{ok_count}</I32>
      <I32 N="errorCount">{errors}</I32>
      <Obj N="items" RefId="1">
        <LST>
{items}        </LST>
      </Obj>
    </MS>
  </Obj>
</Objs>"#,
            algorithm = self.algorithm.as_str(),
            root = escape(&self.root),
            total = self.records.len(),
            errors = self.records.len() - ok_count,
        )
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).expect("write index");
    }
}

fn value_element(key: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!(
            "<En><S N=\"Key\">{key}</S><S N=\"Value\">{}</S></En>\n",
            escape(v)
        ),
        None => format!("<En><S N=\"Key\">{key}</S><Nil N=\"Value\" /></En>\n"),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
