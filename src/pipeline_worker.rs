// Pipeline worker: runs a whole theme build, reporting over a BuildMsg channel

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::event::BuildMsg;
use crate::model::alias::AliasMap;
use crate::model::cursor::BuildResult;
use crate::pipeline::alias::link_aliases;
use crate::pipeline::compile::CompilerDriver;
use crate::pipeline::dedup::plan_raster_tasks;
use crate::pipeline::discover::discover;
use crate::pipeline::dist::{install_theme, prepare_dirs, user_icons_dir, write_theme_files};
use crate::pipeline::expand::Expander;
use crate::pipeline::pool::{ExternalRasterizer, PoolOptions, RasterLedger, WorkerPool};
use crate::pipeline::process::ToolCommand;

/// What a finished build produced. Recorded failures travel as events; this
/// only carries the per-cursor results and where things ended up.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub results: Vec<BuildResult>,
    pub ledger: RasterLedger,
    pub aliases_linked: usize,
    pub installed: Option<PathBuf>,
}

impl BuildOutcome {
    pub fn built_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_built()).count()
    }
}

pub struct PipelineWorker {
    tx: Sender<BuildMsg>,
    config: Config,
    icons_root: Option<PathBuf>,
}

impl PipelineWorker {
    pub fn new(config: Config, tx: Sender<BuildMsg>) -> Self {
        Self {
            tx,
            config,
            icons_root: None,
        }
    }

    /// Installs into `root` instead of `~/.icons`.
    pub fn with_icons_root(mut self, root: PathBuf) -> Self {
        self.icons_root = Some(root);
        self
    }

    pub fn start_build(self) -> JoinHandle<Result<BuildOutcome>> {
        thread::spawn(move || self.run_build())
    }

    fn stage(&self, name: &str) {
        let _ = self.tx.send(BuildMsg::Stage(name.to_string()));
    }

    fn log(&self, msg: String) {
        let _ = self.tx.send(BuildMsg::LogMessage(msg));
    }

    pub fn run_build(&self) -> Result<BuildOutcome> {
        let config = &self.config;
        let paths = config.paths();

        // Bad settings are caught before anything is touched on disk.
        config.validate()?;
        let rasterizer = ToolCommand::new("rasterizer", &config.rasterizer)?;
        let compiler = ToolCommand::new("compiler", &config.compiler)?;

        self.stage("Preparing directories");
        prepare_dirs(&paths)?;

        self.stage("Discovering sources");
        let sources = discover(&paths)?;
        self.log(format!(
            "Found {} cursors, {} svgs, {} theme files",
            sources.cursors.len(),
            sources.svgs.len(),
            sources.theme_files.len()
        ));

        let aliases = if paths.alias_file.exists() {
            AliasMap::load_from_file(&paths.alias_file)?
        } else {
            let _ = self.tx.send(BuildMsg::Warning(format!(
                "No alias file at {}, no aliases will be linked",
                paths.alias_file.display()
            )));
            AliasMap::default()
        };
        self.log(format!("Loaded {} aliases", aliases.alias_count()));

        self.stage("Loading cursors");
        let expander = Expander {
            resolutions: &config.resolutions,
            svgs: &sources.svgs,
            icon_build: &paths.icon_build,
        };
        let cursors = expander.load_all(&sources.cursors)?;
        for cursor in &cursors {
            self.log(cursor.info());
        }

        self.stage("Converting svgs");
        let plan = plan_raster_tasks(&cursors);
        for png in &plan.satisfied {
            let _ = self.tx.send(BuildMsg::TaskSkipped(png.clone()));
        }

        let ledger = if plan.pending.is_empty() {
            self.log("No svgs to convert".to_string());
            RasterLedger::default()
        } else {
            self.log(format!(
                "Converting {} of {} bitmaps with {} workers",
                plan.pending.len(),
                plan.total(),
                config.worker_count()
            ));
            let pool = WorkerPool::new(
                ExternalRasterizer::new(rasterizer, config.raster_timeout()),
                PoolOptions {
                    workers: config.worker_count(),
                    queue_timeout: config.queue_timeout(),
                },
            );
            pool.run(plan.pending, &self.tx)
        };
        let _ = self.tx.send(BuildMsg::StageDone(format!(
            "{} converted, {} failed",
            ledger.done_count(),
            ledger.failed_count()
        )));

        self.stage("Building cursors");
        let driver = CompilerDriver::new(compiler, paths.cursor_build.clone(), paths.cursor_dist.clone());
        let results = driver.compile_all(&cursors, &ledger, &self.tx);

        self.stage("Linking aliases");
        let aliases_linked = link_aliases(&aliases, &results, &paths.cursor_dist, &self.tx);

        self.stage("Writing theme files");
        write_theme_files(&sources.theme_files, &paths.dist_dir, &config.theme_name)?;

        let installed = if config.install {
            self.stage("Installing theme");
            let icons_root = match &self.icons_root {
                Some(root) => root.clone(),
                None => user_icons_dir()?,
            };
            let target = install_theme(&paths.dist_dir, &icons_root, &config.theme_name)
                .context("Failed to install theme")?;
            self.log(format!("Installed to {}", target.display()));
            Some(target)
        } else {
            None
        };

        Ok(BuildOutcome {
            results,
            ledger,
            aliases_linked,
            installed,
        })
    }
}
