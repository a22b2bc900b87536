// ── Check cycle ──
//
// One pass first reloads groups and roster from the primary store, then
// runs five phases in fixed order:
//   A  refresh the connection feed
//   B  evict expired dedup entries
//   C  report group and pattern matches in the feed
//   D  poll each watched system, report connections and new kills
//   E  advance the cycle counter
//
// Nothing in a pass is fatal. A failed fetch is counted and the pass
// moves on to the next system.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::dedup::DedupCaches;
use crate::error::CoreError;
use crate::feed::ConnectionFeed;
use crate::groups::GroupRegistry;
use crate::reporter::Reporter;
use crate::roster::{Roster, WatermarkUpdate};
use crate::status::StatusSource;
use crate::store::PrimaryStore;

/// What one pass saw and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleReport {
    /// Cycle counter value the pass ran with.
    pub cycle: u32,
    pub checked: usize,
    pub failed: usize,
    pub kills: usize,
    pub connection_matches: usize,
    pub group_matches: usize,
    pub pattern_matches: usize,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle {}: checked {}, failed {}, kills {}, connections {}, groups {}, patterns {}",
            self.cycle,
            self.checked,
            self.failed,
            self.kills,
            self.connection_matches,
            self.group_matches,
            self.pattern_matches,
        )
    }
}

const START_DELAY: Duration = Duration::from_secs(1);

pub struct Monitor {
    config: MonitorConfig,
    roster: Arc<Roster>,
    groups: Arc<GroupRegistry>,
    status: Arc<dyn StatusSource>,
    feed: Arc<dyn ConnectionFeed>,
    reporter: Arc<dyn Reporter>,
    /// Dedicated connection for watermark writes.
    store: PrimaryStore,
    caches: DedupCaches,
    pattern: Regex,
    cycle: u32,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        roster: Arc<Roster>,
        groups: Arc<GroupRegistry>,
        status: Arc<dyn StatusSource>,
        feed: Arc<dyn ConnectionFeed>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, CoreError> {
        let pattern = Regex::new(&config.pattern).map_err(|e| CoreError::Config {
            message: format!("invalid pattern '{}': {e}", config.pattern),
        })?;
        let store = PrimaryStore::open(&config.storage)?;
        Ok(Self {
            caches: DedupCaches::new(config.dedup_ttl),
            config,
            roster,
            groups,
            status,
            feed,
            reporter,
            store,
            pattern,
            cycle: 0,
        })
    }

    /// Current cycle counter.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// One full pass, using `now` as the dedup clock.
    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> CycleReport {
        let mut report = CycleReport {
            cycle: self.cycle,
            ..CycleReport::default()
        };

        self.resync();

        // A
        let feed: Vec<String> = self.feed.current_connections().await;
        let feed_set: BTreeSet<&str> = feed.iter().map(String::as_str).collect();
        debug!(cycle = self.cycle, feed = feed.len(), "connection feed fetched");

        // B
        let evicted = self.caches.evict_expired(now);
        if evicted > 0 {
            debug!(evicted, "dedup entries expired");
        }

        // C
        self.match_feed(&feed, now, &mut report);

        // D
        self.check_roster(&feed_set, now, &mut report).await;

        // E
        self.cycle += 1;
        if self.cycle >= self.config.cycle_limit {
            self.cycle = 0;
        }

        if report.failed > 0 {
            warn!(%report, "check cycle finished with failures");
        } else {
            info!(%report, "check cycle finished");
        }
        report
    }

    /// Reload groups and roster from the primary store so writes made
    /// through other connections reach this pass. On failure the pass
    /// runs on the state already in memory.
    fn resync(&self) {
        if let Err(e) = self.groups.load() {
            warn!(error = %e, "groups not reloaded");
        }
        if let Err(e) = self.roster.load() {
            warn!(error = %e, "roster not reloaded");
        }
    }

    fn match_feed(&mut self, feed: &[String], now: DateTime<Utc>, report: &mut CycleReport) {
        let groups = self.groups.list();
        for code in feed {
            for group in groups.iter() {
                if !group.contains(code) {
                    continue;
                }
                // Keyed on the code alone: one group report per code per window.
                if self.caches.groups.record(code, now) {
                    info!(group = group.id, system = %code, "group match");
                    self.reporter.group_match(group, code);
                    report.group_matches += 1;
                }
            }
        }

        for code in feed {
            if self.pattern.is_match(code) && self.caches.patterns.record(code, now) {
                info!(system = %code, "pattern match");
                self.reporter.pattern_match(code);
                report.pattern_matches += 1;
            }
        }
    }

    async fn check_roster(
        &mut self,
        feed: &BTreeSet<&str>,
        now: DateTime<Utc>,
        report: &mut CycleReport,
    ) {
        let snapshot = self.roster.list();
        let limit = self.config.limit_policy.limit_for(self.cycle);

        for entity in snapshot.iter().filter(|e| e.watched) {
            if feed.contains(entity.name.as_str())
                && self.caches.connections.record(entity.name.as_str(), now)
            {
                info!(system = %entity.name, "watched system connected");
                self.reporter.connection_match(entity);
                report.connection_matches += 1;
            }

            tokio::time::sleep(self.config.api_wait).await;
            report.checked += 1;
            let Some(mark) = self.status.latest_event(entity.id, limit).await else {
                report.failed += 1;
                debug!(system = %entity.name, limit, "no kill data");
                continue;
            };
            if !entity.watermark.is_superseded_by(mark.event_id) {
                continue;
            }

            match self.roster.apply_watermark(&entity.name, &mark) {
                WatermarkUpdate::Applied(updated) => {
                    if let Err(e) = self.store.update_watermark(updated.id, &mark) {
                        warn!(system = %updated.name, error = %e, "watermark not persisted");
                    }
                    info!(system = %updated.name, kill = mark.event_id, "new kill");
                    self.reporter.kill_detected(&updated);
                    report.kills += 1;
                }
                WatermarkUpdate::Missing => {
                    let mut removed = (**entity).clone();
                    removed.watermark = mark;
                    info!(system = %removed.name, kill = removed.watermark.event_id, "new kill on removed system");
                    self.reporter.kill_detected(&removed);
                    report.kills += 1;
                }
                WatermarkUpdate::Stale => {}
            }
        }
    }

    /// Run a pass every `interval` until `cancel` fires. The first pass
    /// starts after a short warm-up delay.
    pub async fn run(mut self, cancel: CancellationToken) {
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + START_DELAY, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "check cycle started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        _ = self.run_cycle() => {}
                    }
                }
            }
        }
        info!("check cycle stopped");
    }
}
