// ── JSONL mirror sink ──
//
// Appends one JSON object per mirror write to a file. Each session opens
// the file in append mode, writes its lines and flushes on close.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use super::{MirrorError, MirrorSession, MirrorStore};
use crate::model::{GroupId, SystemId};

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Record<'a> {
    UpsertSystem {
        system_id: SystemId,
        comments: &'a str,
    },
    DeleteSystem {
        system_id: SystemId,
    },
    AddGroup {
        group_id: GroupId,
        description: &'a str,
        member_ids: &'a [SystemId],
    },
    DeleteGroup {
        group_id: GroupId,
        member_ids: &'a [SystemId],
    },
}

#[derive(Serialize)]
struct Line<'a> {
    at: String,
    #[serde(flatten)]
    record: Record<'a>,
}

/// Append-only journal used as the concrete mirror store.
#[derive(Debug, Clone)]
pub struct JournalMirror {
    path: PathBuf,
}

impl JournalMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MirrorStore for JournalMirror {
    async fn open(&self) -> Result<Box<dyn MirrorSession>, MirrorError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        Ok(Box::new(JournalSession {
            out: BufWriter::new(file),
        }))
    }
}

struct JournalSession {
    out: BufWriter<File>,
}

impl JournalSession {
    async fn write(&mut self, record: Record<'_>) -> Result<(), MirrorError> {
        let line = Line {
            at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            record,
        };
        let mut bytes = serde_json::to_vec(&line)?;
        bytes.push(b'\n');
        self.out.write_all(&bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl MirrorSession for JournalSession {
    async fn upsert_system(
        &mut self,
        system_id: SystemId,
        comments: &str,
    ) -> Result<(), MirrorError> {
        self.write(Record::UpsertSystem {
            system_id,
            comments,
        })
        .await
    }

    async fn delete_system(&mut self, system_id: SystemId) -> Result<(), MirrorError> {
        self.write(Record::DeleteSystem { system_id }).await
    }

    async fn add_group(
        &mut self,
        group_id: GroupId,
        description: &str,
        member_ids: &[SystemId],
    ) -> Result<(), MirrorError> {
        self.write(Record::AddGroup {
            group_id,
            description,
            member_ids,
        })
        .await
    }

    async fn delete_group(
        &mut self,
        group_id: GroupId,
        member_ids: &[SystemId],
    ) -> Result<(), MirrorError> {
        self.write(Record::DeleteGroup {
            group_id,
            member_ids,
        })
        .await
    }

    async fn close(mut self: Box<Self>) -> Result<(), MirrorError> {
        self.out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_append_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = JournalMirror::new(dir.path().join("mirror.jsonl"));

        let mut session = mirror.open().await.unwrap();
        session.upsert_system(31_000_005, "<a href=\"x\">y</a>").await.unwrap();
        session.close().await.unwrap();

        let mut session = mirror.open().await.unwrap();
        session.add_group(2, "C3 HS", &[1, 2]).await.unwrap();
        session.close().await.unwrap();

        let text = tokio::fs::read_to_string(mirror.path()).await.unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["op"], "upsert_system");
        assert_eq!(lines[0]["system_id"], 31_000_005);
        assert_eq!(lines[1]["op"], "add_group");
        assert_eq!(lines[1]["member_ids"], serde_json::json!([1, 2]));
        assert!(lines[1]["at"].is_string());
    }
}
