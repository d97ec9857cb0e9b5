//! Wrap CMS posts into full pages and rebuild the index

use anyhow::{Context, Result};
use chrono::Utc;
use notify::{RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::{Duration, Instant, SystemTime};

use crate::content::loader::file_name;
use crate::content::{
    looks_like_html, post_path, repair_rendered, slug_from_file_name, FrontMatter,
    MarkdownRenderer, PostLoader, PostSource,
};
use crate::helpers::{display_date, iso_timestamp};
use crate::templates::{PostContext, PostTemplate};
use crate::Site;

/// Minimum time between two batches in watch mode
const WATCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Batch options
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapOptions {
    /// Render and report, but write nothing
    pub dry_run: bool,
}

/// What a batch did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Front-matter posts rendered into pages
    pub wrapped: usize,
    /// Rendered pages whose leftover markdown was converted
    pub repaired: usize,
    /// Files that failed and were left alone
    pub skipped: usize,
    /// Entries written to the index
    pub indexed: usize,
    /// Files this batch wrote, including the index
    pub written: Vec<PathBuf>,
}

/// Stages of a batch, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    Classify,
    RenderOrSkip,
    RebuildIndex,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discover => "discover",
            Stage::Classify => "classify",
            Stage::RenderOrSkip => "render",
            Stage::RebuildIndex => "rebuild-index",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-file result of the render stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Wrapped,
    Repaired,
    Unchanged,
}

/// Run one batch over the posts directory
pub fn run(site: &Site, options: WrapOptions) -> Result<BatchReport> {
    let start = Instant::now();

    // Without a template no post can be rendered correctly
    let template = PostTemplate::load(&site.template_path)?;
    let renderer = MarkdownRenderer::new();
    let loader = PostLoader::new(site);
    let mut report = BatchReport::default();

    tracing::debug!("Stage: {}", Stage::Discover);
    let files = loader.discover()?;

    for path in &files {
        match process_file(site, &template, &renderer, path, options) {
            Ok(outcome) => {
                match outcome {
                    FileOutcome::Wrapped => report.wrapped += 1,
                    FileOutcome::Repaired => report.repaired += 1,
                    FileOutcome::Unchanged => continue,
                }
                if !options.dry_run {
                    report.written.push(path.clone());
                }
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {:#}", path, e);
                report.skipped += 1;
            }
        }
    }

    if report.wrapped + report.repaired > 0 {
        tracing::info!(
            "Wrapped {} post(s), converted markdown in {}",
            report.wrapped,
            report.repaired
        );
    }

    tracing::debug!("Stage: {}", Stage::RebuildIndex);
    let index = loader.load_index()?;
    report.indexed = index.items.len();
    if options.dry_run {
        tracing::info!("Dry run: index would hold {} posts", report.indexed);
    } else {
        index.save(&site.index_path)?;
        report.written.push(site.index_path.clone());
        tracing::info!("Updated {:?} with {} posts", site.index_path, report.indexed);
    }

    tracing::debug!("Stage: {}", Stage::Done);
    tracing::info!("Completed in {:.2}s", start.elapsed().as_secs_f64());
    Ok(report)
}

fn process_file(
    site: &Site,
    template: &PostTemplate,
    renderer: &MarkdownRenderer,
    path: &Path,
    options: WrapOptions,
) -> Result<FileOutcome> {
    let name = file_name(path).with_context(|| format!("non UTF-8 file name {:?}", path))?;
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", name))?;

    tracing::trace!("Stage: {} ({})", Stage::Classify, name);
    let source = PostSource::classify(&content);

    tracing::trace!("Stage: {} ({})", Stage::RenderOrSkip, name);
    let (output, outcome) = match source {
        PostSource::FrontMatter { front_matter, body } => {
            let html = render_post(site, template, renderer, name, &front_matter, body);
            (html, FileOutcome::Wrapped)
        }
        PostSource::Rendered(html) => match repair_rendered(html, renderer) {
            Some(repaired) => (repaired, FileOutcome::Repaired),
            None => return Ok(FileOutcome::Unchanged),
        },
    };

    if !options.dry_run {
        fs::write(path, output).with_context(|| format!("writing {}", name))?;
    }
    match outcome {
        FileOutcome::Wrapped => tracing::info!("Wrapped {}", name),
        FileOutcome::Repaired => tracing::info!("Converted markdown in {}", name),
        FileOutcome::Unchanged => {}
    }

    Ok(outcome)
}

/// Render a front-matter post into a full page
pub fn render_post(
    site: &Site,
    template: &PostTemplate,
    renderer: &MarkdownRenderer,
    file_name: &str,
    front_matter: &FrontMatter,
    body: &str,
) -> String {
    let config = &site.config;
    let date = front_matter.parse_date().unwrap_or_else(|| {
        if let Some(raw) = &front_matter.date {
            tracing::warn!("{}: unparseable date {:?}, using current time", file_name, raw);
        }
        Utc::now()
    });

    let content = if looks_like_html(body) {
        body.to_string()
    } else {
        renderer.render(body)
    };

    let ctx = PostContext {
        title: front_matter.title().unwrap_or("Blog Post").to_string(),
        summary: front_matter.summary().to_string(),
        date: display_date(&date, &config.date_format),
        date_iso: iso_timestamp(&date),
        tags: front_matter.tags(),
        content,
        slug: slug_from_file_name(file_name),
        path: post_path(&config.posts_url, file_name),
        site_name: config.site_name.clone(),
    };

    template.render(&ctx)
}

/// Files the last batch wrote, with their modification times right after
#[derive(Debug, Default)]
struct OwnWrites {
    files: HashMap<PathBuf, SystemTime>,
}

impl OwnWrites {
    fn record(paths: &[PathBuf]) -> Self {
        let files = paths
            .iter()
            .filter_map(|path| Some((canonical(path), modified(path)?)))
            .collect();
        OwnWrites { files }
    }

    /// True when every path in the event is a file we wrote and nobody has
    /// touched it since
    fn covers(&self, event: &notify::Event) -> bool {
        !event.paths.is_empty()
            && event.paths.iter().all(|path| {
                self.files
                    .get(&canonical(path))
                    .is_some_and(|written| modified(path).as_ref() == Some(written))
            })
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Watch the posts directory and re-run the batch on changes
pub fn watch(site: &Site, options: WrapOptions) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            if !event.kind.is_access() {
                let _ = tx.send(event);
            }
        }
    })?;

    watcher.watch(&site.posts_dir, RecursiveMode::NonRecursive)?;
    if !site.template_path.starts_with(&site.posts_dir) {
        watcher.watch(&site.template_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", site.posts_dir);

    let mut last_run = Instant::now();
    let mut own_writes = OwnWrites::default();
    let mut pending = false;

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // our own writes show up as events too
                if !own_writes.covers(&event) {
                    tracing::debug!("Change: {:?}", event.paths);
                    pending = true;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if pending && last_run.elapsed() > WATCH_DEBOUNCE {
            pending = false;
            tracing::info!("Posts changed, re-running...");
            match run(site, options) {
                Ok(report) => own_writes = OwnWrites::record(&report.written),
                Err(e) => tracing::error!("Batch failed: {:#}", e),
            }
            last_run = Instant::now();
        }
    }

    Ok(())
}
