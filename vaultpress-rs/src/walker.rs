//! Concurrent vault walk.
//!
//! The walk enumerates the source tree in sorted order on the calling
//! task. Directories are created and non-Markdown files copied right away;
//! Markdown files are handed to blocking workers, at most `concurrency` at
//! a time. A coordinator task collects one result per dispatched file and
//! raises cancellation on the first failure, after which no new file is
//! dispatched. Files already dispatched run to completion before the walk
//! returns.

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::processor::{ConvertFile, FileJob, Outcome};
use crate::skiplist::SkipList;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Root that vault-relative paths are computed against.
    pub vault_root: PathBuf,
    /// Directory actually walked: the vault root or a sub-target in it.
    pub source_root: PathBuf,
    /// Mirrors the layout under `source_root`.
    pub dest_root: PathBuf,
    pub skip: Arc<SkipList>,
    pub concurrency: usize,
}

impl WalkOptions {
    pub fn from_config(config: &Config, skip: Arc<SkipList>) -> Result<Self> {
        let vault_root = config.vault_root()?.to_path_buf();
        let source_root = match &config.target {
            Some(target) => vault_root.join(target),
            None => vault_root.clone(),
        };
        Ok(Self {
            vault_root,
            source_root,
            dest_root: config.dest_root()?.to_path_buf(),
            skip,
            concurrency: config.concurrency,
        })
    }
}

/// Counts of what a finished walk did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub converted: usize,
    /// Notes rejected by the publishability check.
    pub skipped: usize,
    /// Non-Markdown files copied as they are.
    pub copied: usize,
}

/// One finished conversion. The permit is released once the coordinator
/// has looked at the result.
struct Finished {
    result: Result<Outcome>,
    _permit: OwnedSemaphorePermit,
}

/// Walk `opts.source_root`, converting Markdown files with `converter`.
pub async fn walk<C>(opts: WalkOptions, converter: Arc<C>) -> Result<WalkSummary>
where
    C: ConvertFile + 'static,
{
    log::info!(
        "converting {} into {}",
        opts.source_root.display(),
        opts.dest_root.display()
    );

    let cancel = CancellationToken::new();
    let (tx, rx) = unbounded_channel();
    let coordinator = tokio::spawn(coordinate(rx, cancel.clone()));
    let mut workers = JoinSet::new();

    let traversed = traverse(&opts, &converter, &tx, &cancel, &mut workers).await;
    if traversed.is_err() {
        cancel.cancel();
    }

    // Barrier: every dispatched conversion finishes before the walk returns.
    let mut join_error = None;
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            cancel.cancel();
            join_error.get_or_insert(e);
        }
    }
    drop(tx);

    let (converted, skipped) = coordinator.await??;
    let copied = traversed?;
    if let Some(e) = join_error {
        return Err(e.into());
    }

    Ok(WalkSummary {
        converted,
        skipped,
        copied,
    })
}

/// Enumerate the tree and dispatch work. Returns the number of copied files.
async fn traverse<C>(
    opts: &WalkOptions,
    converter: &Arc<C>,
    tx: &UnboundedSender<Finished>,
    cancel: &CancellationToken,
    workers: &mut JoinSet<()>,
) -> Result<usize>
where
    C: ConvertFile + 'static,
{
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut copied = 0;

    let entries = WalkDir::new(&opts.source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, opts));

    for entry in entries {
        if cancel.is_cancelled() {
            break;
        }
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&opts.source_root)
            .unwrap_or(entry.path());
        let dest = opts.dest_root.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
            continue;
        }
        if !is_markdown(entry.path()) {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => permit
                .map_err(|_| VaultError::Io(std::io::Error::other("admission gate closed")))?,
        };
        if cancel.is_cancelled() {
            break;
        }

        let job = FileJob {
            source: entry.path().to_path_buf(),
            dest,
            vault_path: vault_path(entry.path(), &opts.vault_root),
        };
        log::debug!("dispatching {}", job.vault_path);

        let converter = Arc::clone(converter);
        let tx = tx.clone();
        workers.spawn_blocking(move || {
            let result = converter
                .convert_file(&job)
                .map_err(|e| e.in_file(&job.source));
            // The coordinator is gone once it has reported an error.
            let _ = tx.send(Finished {
                result,
                _permit: permit,
            });
        });
    }

    if cancel.is_cancelled() {
        log::warn!("walk cancelled, no further files dispatched");
    }
    Ok(copied)
}

/// Collect results until every sender is gone or a conversion fails.
/// Returns the converted and skipped counts.
async fn coordinate(
    mut rx: UnboundedReceiver<Finished>,
    cancel: CancellationToken,
) -> Result<(usize, usize)> {
    let mut converted = 0;
    let mut skipped = 0;
    while let Some(finished) = rx.recv().await {
        match finished.result {
            Ok(Outcome::Converted) => converted += 1,
            Ok(Outcome::Skipped) => skipped += 1,
            Err(e) => {
                cancel.cancel();
                return Err(e);
            }
        }
    }
    Ok((converted, skipped))
}

fn keep_entry(entry: &DirEntry, opts: &WalkOptions) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if entry.file_name().to_string_lossy().starts_with('.') {
        return false;
    }
    let path = vault_path(entry.path(), &opts.vault_root);
    if opts.skip.is_skipped(&path) {
        log::debug!("skip list excludes {}", path);
        return false;
    }
    true
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

/// `/`-separated path relative to the vault root.
fn vault_path(path: &Path, vault_root: &Path) -> String {
    path.strip_prefix(vault_root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
