// Bounded worker pool for svg -> png rasterization
//
// W workers share one queue. A worker exits once the queue has stayed empty
// for the configured wait; the pool returns only after every worker has been
// joined, so callers never see partially settled raster work.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::gate::AdmissionGate;
use super::process::ToolCommand;
use crate::event::{BuildMsg, Failure};
use crate::model::cursor::RasterTask;

/// Produces the bitmap for one task at `dest`, a scratch path in the same
/// directory as the final output.
pub trait TaskRunner: Send + Sync {
    fn run(&self, task: &RasterTask, dest: &Path) -> Result<(), String>;
}

/// Runs the configured rasterizer command as a child process per task.
pub struct ExternalRasterizer {
    command: ToolCommand,
    timeout: Option<Duration>,
}

impl ExternalRasterizer {
    pub fn new(command: ToolCommand, timeout: Option<Duration>) -> Self {
        Self { command, timeout }
    }
}

impl TaskRunner for ExternalRasterizer {
    fn run(&self, task: &RasterTask, dest: &Path) -> Result<(), String> {
        let vars = [
            ("input", task.svg_path.to_string_lossy().to_string()),
            ("output", dest.to_string_lossy().to_string()),
            ("dpi", task.dpi.to_string()),
        ];
        let process = self.command.spawn(&vars).map_err(|e| format!("{:#}", e))?;
        let outcome = process
            .supervise(self.timeout)
            .map_err(|e| format!("lost track of {}: {}", self.command.tool(), e))?;

        if outcome.success() {
            Ok(())
        } else {
            Err(outcome.describe())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Done,
    Failed(String),
}

/// Per-output results of one pool run.
#[derive(Debug, Default, Clone)]
pub struct RasterLedger {
    outcomes: HashMap<PathBuf, TaskStatus>,
}

impl RasterLedger {
    pub fn record(&mut self, png_path: PathBuf, status: TaskStatus) {
        self.outcomes.insert(png_path, status);
    }

    pub fn status(&self, png_path: &Path) -> Option<&TaskStatus> {
        self.outcomes.get(png_path)
    }

    pub fn is_failed(&self, png_path: &Path) -> bool {
        matches!(self.status(png_path), Some(TaskStatus::Failed(_)))
    }

    pub fn done_count(&self) -> usize {
        self.outcomes.values().filter(|s| **s == TaskStatus::Done).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.done_count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub workers: usize,
    pub queue_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            queue_timeout: Duration::from_secs(5),
        }
    }
}

pub struct WorkerPool<R> {
    runner: Arc<R>,
    options: PoolOptions,
}

struct WorkerContext<R> {
    queue: Receiver<RasterTask>,
    queue_timeout: Duration,
    gate: AdmissionGate,
    runner: Arc<R>,
    ledger: Arc<Mutex<RasterLedger>>,
    events: Sender<BuildMsg>,
    settled: Arc<AtomicUsize>,
    total: usize,
}

impl<R: TaskRunner + 'static> WorkerPool<R> {
    pub fn new(runner: R, options: PoolOptions) -> Self {
        Self {
            runner: Arc::new(runner),
            options: PoolOptions {
                workers: options.workers.max(1),
                ..options
            },
        }
    }

    pub fn run(&self, tasks: Vec<RasterTask>, events: &Sender<BuildMsg>) -> RasterLedger {
        let total = tasks.len();
        let (queue_tx, queue_rx) = unbounded();
        for task in tasks {
            let _ = queue_tx.send(task);
        }

        let gate = AdmissionGate::new(self.options.workers);
        let ledger = Arc::new(Mutex::new(RasterLedger::default()));
        let settled = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..self.options.workers)
            .map(|_| {
                let ctx = WorkerContext {
                    queue: queue_rx.clone(),
                    queue_timeout: self.options.queue_timeout,
                    gate: gate.clone(),
                    runner: Arc::clone(&self.runner),
                    ledger: Arc::clone(&ledger),
                    events: events.clone(),
                    settled: Arc::clone(&settled),
                    total,
                };
                thread::spawn(move || ctx.work())
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                let _ = events.send(BuildMsg::Warning("A raster worker panicked".to_string()));
            }
        }
        drop(queue_tx);

        let mut ledger = match Arc::try_unwrap(ledger) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
            Err(shared) => shared.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        };

        // Nothing may stay queued once every worker is gone.
        for task in queue_rx.try_iter() {
            let reason = "never picked up by a worker".to_string();
            let _ = events.send(BuildMsg::Failed(raster_failure(&task, &reason)));
            ledger.record(task.png_path, TaskStatus::Failed(reason));
        }

        ledger
    }
}

impl<R: TaskRunner> WorkerContext<R> {
    fn work(self) {
        while let Ok(task) = self.queue.recv_timeout(self.queue_timeout) {
            let status = {
                let _permit = self.gate.acquire();
                rasterize_atomically(self.runner.as_ref(), &task)
            };

            let msg = match &status {
                TaskStatus::Done => BuildMsg::TaskRasterized {
                    dpi: task.dpi,
                    svg_path: task.svg_path.clone(),
                    png_path: task.png_path.clone(),
                },
                TaskStatus::Failed(reason) => BuildMsg::Failed(raster_failure(&task, reason)),
            };
            let _ = self.events.send(msg);

            self.ledger
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .record(task.png_path, status);

            let settled = self.settled.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.events.send(BuildMsg::RasterProgress(settled, self.total));
        }
    }
}

fn raster_failure(task: &RasterTask, reason: &str) -> Failure {
    Failure::Raster {
        svg_path: task.svg_path.clone(),
        png_path: task.png_path.clone(),
        dpi: task.dpi,
        reason: reason.to_string(),
    }
}

/// Runs `runner` against a temporary file next to the output and renames it
/// into place only on success, so an interrupted or failed conversion never
/// leaves a file the existence check would accept.
pub fn rasterize_atomically<R: TaskRunner + ?Sized>(runner: &R, task: &RasterTask) -> TaskStatus {
    match try_rasterize(runner, task) {
        Ok(()) => TaskStatus::Done,
        Err(reason) => TaskStatus::Failed(reason),
    }
}

fn try_rasterize<R: TaskRunner + ?Sized>(runner: &R, task: &RasterTask) -> Result<(), String> {
    let parent = task
        .png_path
        .parent()
        .ok_or_else(|| format!("output {} has no parent directory", task.png_path.display()))?;
    fs::create_dir_all(parent).map_err(|e| format!("creating {}: {}", parent.display(), e))?;

    let stem = task
        .png_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let scratch = tempfile::Builder::new()
        .prefix(&format!(".{}-", stem))
        .suffix(".png")
        .tempfile_in(parent)
        .map_err(|e| format!("creating scratch file: {}", e))?;

    runner.run(task, scratch.path())?;

    let written = fs::metadata(scratch.path()).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err("rasterizer reported success but wrote no data".to_string());
    }

    scratch
        .persist(&task.png_path)
        .map_err(|e| format!("moving output into place: {}", e.error))?;
    Ok(())
}
