use anyhow::{bail, Context, Result};
use colored::Colorize;
use notify::{Config as WatchConfig, Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;
use tracing::{debug, info};

use regex_styler::config::Config;
use regex_styler::dom::{Document, MutationRecord};
use regex_styler::engine::{Event, Orchestrator, ScanReport};
use regex_styler::settings::{Command, JsonFileStore};

use super::config_dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Page,
    Settings,
}

/// The two files `watch` follows, as absolute paths inside their
/// (canonical) parent directories.
struct Watched {
    page: PathBuf,
    settings: PathBuf,
}

impl Watched {
    fn resolve(document: &Path, settings: &Path) -> Result<Self> {
        Ok(Self {
            page: absolute(document)?,
            settings: absolute(settings)?,
        })
    }

    fn dirs(&self) -> BTreeSet<PathBuf> {
        [&self.page, &self.settings]
            .iter()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect()
    }

    fn classify(&self, event: &FsEvent) -> Option<Change> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
            _ => return None,
        }
        if event.paths.iter().any(|p| *p == self.settings) {
            Some(Change::Settings)
        } else if event.paths.iter().any(|p| *p == self.page) {
            Some(Change::Page)
        } else {
            None
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;
    Ok(dir.join(name))
}

fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read page snapshot: {}", path.display()))?;
    Document::from_json(&content)
        .with_context(|| format!("Invalid page snapshot: {}", path.display()))
}

fn publish(doc: &Document, report: &ScanReport, out: Option<&PathBuf>) -> Result<()> {
    info!(
        targets = report.targets,
        decorated = report.decorated,
        badges = report.badges,
        "Scan finished"
    );
    for error in &report.errors {
        eprintln!("  {} {}", "✗".bright_red(), error);
    }
    if let Some(path) = out {
        std::fs::write(path, doc.to_html())
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Follow the page snapshot and the settings file. A rewritten page counts
/// as nodes added to the document; changed settings count as an
/// `applyStyles` message. Between file events the loop sleeps until the
/// orchestrator's next timer.
pub fn handle(store: &JsonFileStore, document: &Path, out: Option<PathBuf>) -> Result<()> {
    let config = Config::load_or_default(config_dir(store)).context("Failed to load engine config")?;
    let mut orchestrator = Orchestrator::new(store.clone(), config.data);
    let mut doc = load_document(document)?;

    std::fs::create_dir_all(config_dir(store)).context("Failed to create settings directory")?;
    let watched = Watched::resolve(document, store.path())?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<FsEvent>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        WatchConfig::default(),
    )
    .context("Failed to start file watcher")?;
    for dir in watched.dirs() {
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    println!(
        "{} Watching {} (settings: {})",
        "→".bright_green(),
        document.display(),
        store.path().display()
    );

    if let Some(report) = orchestrator.handle(Event::Startup, &mut doc, Instant::now()) {
        publish(&doc, &report, out.as_ref())?;
    }

    loop {
        let received = match orchestrator.next_deadline() {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let now = Instant::now();

        match received {
            Ok(event) => match watched.classify(&event) {
                Some(Change::Settings) => {
                    info!("Settings changed");
                    if let Some(report) =
                        orchestrator.handle(Event::Message(Command::ApplyStyles), &mut doc, now)
                    {
                        publish(&doc, &report, out.as_ref())?;
                    }
                }
                Some(Change::Page) if watched.page.exists() => match load_document(&watched.page) {
                    Ok(fresh) => {
                        debug!("Page snapshot changed");
                        doc = fresh;
                        let record = MutationRecord {
                            target: doc.root(),
                            added_nodes: 1,
                            removed_nodes: 0,
                        };
                        orchestrator.handle(Event::Mutation(record), &mut doc, now);
                    }
                    Err(e) => eprintln!("  {} {:#}", "⚠".bright_yellow(), e),
                },
                _ => {}
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => bail!("File watcher stopped"),
        }

        if let Some(report) = orchestrator.handle(Event::Tick, &mut doc, now) {
            publish(&doc, &report, out.as_ref())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, path: PathBuf) -> FsEvent {
        FsEvent::new(kind).add_path(path)
    }

    #[test]
    fn test_classify_watched_files() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let page = temp_dir.path().join("page.json");
        let settings = temp_dir.path().join("settings.json");
        let watched = Watched::resolve(&page, &settings)?;
        assert_eq!(watched.dirs().len(), 1);

        let modify = || EventKind::Modify(ModifyKind::Any);
        assert_eq!(watched.classify(&event(modify(), watched.page.clone())), Some(Change::Page));
        assert_eq!(
            watched.classify(&event(EventKind::Create(CreateKind::File), watched.settings.clone())),
            Some(Change::Settings)
        );

        let out = watched.page.with_file_name("out.html");
        assert_eq!(watched.classify(&event(modify(), out)), None);
        assert_eq!(
            watched.classify(&event(EventKind::Access(AccessKind::Any), watched.page.clone())),
            None
        );
        Ok(())
    }
}
