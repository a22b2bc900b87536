//! Reporter that prints detections as chat-style lines on stdout.

use std::io::{self, Write};

use holewatch_core::{EntityGroup, MonitoredEntity, Reporter};
use tracing::info;

pub struct LogReporter {
    killboard: String,
    hub: String,
}

impl LogReporter {
    pub fn new(killboard: &str, hub: &str) -> Self {
        Self {
            killboard: killboard.trim_end_matches('/').to_owned(),
            hub: hub.to_owned(),
        }
    }

    fn emit(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }

    pub fn kill_line(&self, entity: &MonitoredEntity) -> String {
        format!(
            "Kill detected in *{}* [{}] at {} - {}/kill/{}/",
            entity.name,
            entity.class,
            entity.watermark.event_time,
            self.killboard,
            entity.watermark.event_id,
        )
    }

    pub fn connection_line(&self, entity: &MonitoredEntity) -> String {
        format!(
            "{} connection to *{}* [{}] - Info: *{}*",
            self.hub, entity.name, entity.class, entity.comments
        )
    }

    pub fn group_line(&self, group: &EntityGroup, code: &str) -> String {
        format!("{} connection to *{code}* matches {group}", self.hub)
    }

    pub fn pattern_line(&self, code: &str) -> String {
        format!("{} connection to *{code}*", self.hub)
    }
}

impl Reporter for LogReporter {
    fn kill_detected(&self, entity: &MonitoredEntity) {
        info!(system = %entity.name, kill = entity.watermark.event_id, "report: kill");
        self.emit(&self.kill_line(entity));
    }

    fn connection_match(&self, entity: &MonitoredEntity) {
        info!(system = %entity.name, "report: connection");
        self.emit(&self.connection_line(entity));
    }

    fn group_match(&self, group: &EntityGroup, code: &str) {
        info!(group = group.id, system = code, "report: group");
        self.emit(&self.group_line(group, code));
    }

    fn pattern_match(&self, code: &str) {
        info!(system = code, "report: pattern");
        self.emit(&self.pattern_line(code));
    }
}
