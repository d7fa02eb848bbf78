//! Decides when to scan.
//!
//! Two timers drive rescans: a debounce timer armed by DOM mutations and
//! a periodic timer armed by any scan that found targets. Each is a single
//! deadline, so arming it again replaces the pending one. Everything runs
//! on the caller's thread; a scan never yields halfway.

use std::time::Instant;
use tracing::{debug, error, info};

use super::clock::{Clock, SystemClock};
use super::scan::{self, ScanReport};
use crate::config::ConfigData;
use crate::dom::{Document, MutationRecord};
use crate::settings::{Command, EngineSettings, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Startup,
    Message(Command),
    Mutation(MutationRecord),
    /// Time passed; fire whatever timers are due.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No periodic rescan pending.
    Idle,
    /// A periodic rescan is pending.
    Scheduled,
}

pub struct Orchestrator<S, C = SystemClock> {
    store: S,
    clock: C,
    config: ConfigData,
    settings: EngineSettings,
    debounce_deadline: Option<Instant>,
    rescan_deadline: Option<Instant>,
    scans: usize,
}

impl<S: SettingsStore> Orchestrator<S> {
    pub fn new(store: S, config: ConfigData) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: SettingsStore, C: Clock> Orchestrator<S, C> {
    pub fn with_clock(store: S, clock: C, config: ConfigData) -> Self {
        Self {
            store,
            clock,
            config,
            settings: EngineSettings::default(),
            debounce_deadline: None,
            rescan_deadline: None,
            scans: 0,
        }
    }

    /// Feed one event. Returns the report when the event caused a scan.
    pub fn handle(&mut self, event: Event, doc: &mut Document, now: Instant) -> Option<ScanReport> {
        match event {
            Event::Startup | Event::Message(Command::ApplyStyles) => {
                self.reload();
                self.run_scan(doc, now)
            }
            Event::Mutation(record) => {
                if record.adds_nodes() {
                    self.arm_debounce(now);
                }
                None
            }
            Event::Tick => {
                let debounce_due = self.debounce_deadline.is_some_and(|at| at <= now);
                let rescan_due = self.rescan_deadline.is_some_and(|at| at <= now);
                if debounce_due {
                    self.debounce_deadline = None;
                }
                if rescan_due {
                    self.rescan_deadline = None;
                }
                if debounce_due || rescan_due {
                    debug!(debounce_due, rescan_due, "Timer fired");
                    self.run_scan(doc, now)
                } else {
                    None
                }
            }
        }
    }

    /// Drain mutations the page made to `doc` and treat them as observed.
    pub fn observe(&mut self, doc: &mut Document, now: Instant) {
        for record in doc.take_mutations() {
            self.handle(Event::Mutation(record), doc, now);
        }
    }

    /// Earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debounce_deadline, self.rescan_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn state(&self) -> State {
        if self.rescan_deadline.is_some() {
            State::Scheduled
        } else {
            State::Idle
        }
    }

    pub fn debounce_pending(&self) -> bool {
        self.debounce_deadline.is_some()
    }

    pub fn scans_run(&self) -> usize {
        self.scans
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    fn arm_debounce(&mut self, now: Instant) {
        let deadline = now + self.config.timing.debounce();
        if self.debounce_deadline.replace(deadline).is_some() {
            debug!("Debounce timer reset");
        }
    }

    /// Replace the settings wholesale with what the store holds now.
    fn reload(&mut self) {
        self.settings = match self.store.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!("Failed to load settings: {}", e);
                EngineSettings::default()
            }
        };

        let rules = self.settings.regex_configs.as_ref().map_or(0, Vec::len);
        info!(
            class_name = self.settings.class_name.as_deref().unwrap_or(""),
            rules, "Current settings loaded"
        );
    }

    fn run_scan(&mut self, doc: &mut Document, now: Instant) -> Option<ScanReport> {
        let Some((class_name, rules)) = self.settings.scan_target() else {
            debug!("Settings incomplete, nothing to scan");
            self.rescan_deadline = None;
            return None;
        };

        let report = scan::scan(doc, class_name, rules, &self.config, self.clock.now());
        self.scans += 1;

        // Our own edits are not page mutations.
        doc.take_mutations();

        self.rescan_deadline = if report.found_targets() {
            Some(now + self.config.timing.rescan_interval())
        } else {
            None
        };

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::FixedClock;
    use crate::settings::{MemoryStore, RuleConfig, CLASS_NAME_KEY};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn settings(class_name: &str) -> EngineSettings {
        EngineSettings {
            class_name: Some(class_name.to_string()),
            regex_configs: Some(vec![RuleConfig {
                id: "1".to_string(),
                name: "Deadlines".to_string(),
                pattern: "prazo".to_string(),
                enabled: true,
                enable_background: true,
                ..RuleConfig::default()
            }]),
        }
    }

    fn page() -> Document {
        Document::from_json(r#"{"children": [{"class": "event", "children": [{"children": ["Prazo"]}]}]}"#)
            .unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_startup_with_targets_schedules_rescan() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let t0 = Instant::now();

        let report = orchestrator.handle(Event::Startup, &mut doc, t0).unwrap();
        assert_eq!(report.decorated, 1);
        assert_eq!(orchestrator.state(), State::Scheduled);
        assert_eq!(orchestrator.next_deadline(), Some(t0 + ms(10_000)));
    }

    #[test]
    fn test_no_targets_stays_idle() {
        let store = MemoryStore::with_settings(&settings("nonexistent-xyz")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();

        let report = orchestrator.handle(Event::Startup, &mut doc, Instant::now()).unwrap();
        assert!(!report.found_targets());
        assert_eq!(orchestrator.state(), State::Idle);
        assert_eq!(orchestrator.next_deadline(), None);
    }

    #[test]
    fn test_absent_settings_do_nothing() {
        let store = MemoryStore::new();
        store.set(CLASS_NAME_KEY, json!("event"));
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let before = doc.to_html();

        assert!(orchestrator.handle(Event::Startup, &mut doc, Instant::now()).is_none());
        assert_eq!(orchestrator.scans_run(), 0);
        assert_eq!(doc.to_html(), before);
    }

    #[test]
    fn test_malformed_settings_treated_as_absent() {
        let store = MemoryStore::new();
        store.set(CLASS_NAME_KEY, json!("event"));
        store.set("regexConfigs", json!("not a list"));
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());

        assert!(orchestrator.handle(Event::Startup, &mut page(), Instant::now()).is_none());
        assert_eq!(orchestrator.settings(), &EngineSettings::default());
    }

    #[test]
    fn test_mutation_burst_coalesces_into_one_scan() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let t0 = Instant::now();
        orchestrator.handle(Event::Startup, &mut doc, t0);
        let record = MutationRecord {
            target: doc.root(),
            added_nodes: 1,
            removed_nodes: 0,
        };

        for i in 0..10 {
            let at = t0 + ms(i * 100);
            orchestrator.handle(Event::Mutation(record), &mut doc, at);
            assert!(orchestrator.handle(Event::Tick, &mut doc, at).is_none());
        }
        assert!(orchestrator.debounce_pending());

        assert!(orchestrator.handle(Event::Tick, &mut doc, t0 + ms(1_850)).is_none());
        assert!(orchestrator.handle(Event::Tick, &mut doc, t0 + ms(1_900)).is_some());
        assert!(!orchestrator.debounce_pending());
        assert_eq!(orchestrator.scans_run(), 2);
    }

    #[test]
    fn test_removal_only_mutations_ignored() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let record = MutationRecord {
            target: doc.root(),
            added_nodes: 0,
            removed_nodes: 2,
        };

        orchestrator.handle(Event::Mutation(record), &mut doc, Instant::now());
        assert!(!orchestrator.debounce_pending());
    }

    #[test]
    fn test_periodic_rescan_renews_itself() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let t0 = Instant::now();
        orchestrator.handle(Event::Startup, &mut doc, t0);

        assert!(orchestrator.handle(Event::Tick, &mut doc, t0 + ms(9_999)).is_none());
        assert!(orchestrator.handle(Event::Tick, &mut doc, t0 + ms(10_000)).is_some());
        assert_eq!(orchestrator.next_deadline(), Some(t0 + ms(20_000)));
        assert_eq!(orchestrator.scans_run(), 2);
    }

    #[test]
    fn test_own_decorations_do_not_trigger_debounce() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let t0 = Instant::now();
        orchestrator.handle(Event::Startup, &mut doc, t0);

        orchestrator.observe(&mut doc, t0);
        assert!(!orchestrator.debounce_pending());

        let root = doc.root();
        doc.append_text(root, "new content");
        orchestrator.observe(&mut doc, t0);
        assert!(orchestrator.debounce_pending());
    }

    #[test]
    fn test_reapply_reloads_settings() {
        let store = MemoryStore::with_settings(&settings("event")).unwrap();
        let handle = store.clone();
        let mut orchestrator = Orchestrator::with_clock(store, clock(), ConfigData::default());
        let mut doc = page();
        let t0 = Instant::now();
        orchestrator.handle(Event::Startup, &mut doc, t0);
        assert_eq!(orchestrator.state(), State::Scheduled);

        handle.replace(&settings("nonexistent-xyz")).unwrap();
        let report = orchestrator
            .handle(Event::Message(Command::ApplyStyles), &mut doc, t0 + ms(50))
            .unwrap();

        assert!(!report.found_targets());
        assert_eq!(orchestrator.state(), State::Idle);
        assert!(doc.elements_by_class("regex-styled-title").is_empty());
    }
}
