use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

use crate::Error;
use crate::command::Command;
use crate::diff::diff_json;
use crate::state::EvolutionState;

pub enum MessageLogMode {
    Full,
    Diffed,
}

/// Append-only NDJSON record of polls and commands.
pub(crate) struct SnapshotLogger {
    mode: MessageLogMode,
    file: File,
    previous_state: Option<Value>,
}

impl SnapshotLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_state: None,
        })
    }

    pub fn log_command(&mut self, command: &Command) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": command.action(),
            "system": command.system(),
            "zone": command.zone(),
            "body": command.body(),
        });
        self.write_line(&entry);
    }

    pub fn log_poll_error(&mut self, error: &Error) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "poll",
            "error": error.to_string(),
        });
        self.write_line(&entry);
    }

    pub fn log_snapshot(&mut self, state: &EvolutionState) {
        let body = match serde_json::to_value(state) {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to serialize snapshot: {e}");
                return;
            }
        };

        let entry = match (&self.mode, &self.previous_state) {
            (MessageLogMode::Full, _) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "poll",
                "body": body,
            }),
            (MessageLogMode::Diffed, None) => json!({
                "ts": Utc::now().to_rfc3339(),
                "dir": "poll",
                "full": true,
                "body": body,
            }),
            (MessageLogMode::Diffed, Some(prev)) => {
                let mut changes = Vec::new();
                diff_json(prev, &body, "", &mut changes);
                let change_entries: Vec<Value> = changes
                    .iter()
                    .map(|(path, old, new)| json!({ "path": path, "old": old, "new": new }))
                    .collect();
                json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "poll",
                    "changes": change_entries,
                })
            }
        };
        self.write_line(&entry);

        if matches!(self.mode, MessageLogMode::Diffed) {
            self.previous_state = Some(body);
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
