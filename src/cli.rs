// Command-line surface

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use crossbeam_channel::unbounded;
use crossterm::style::Stylize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE_NAME, Config};
use crate::pipeline::builtin::{compile_descriptor, rasterize_file};
use crate::pipeline::dist;
use crate::pipeline_worker::PipelineWorker;
use crate::report::{Verbosity, print_summary, spawn_reporter};

#[derive(Parser)]
#[command(name = "cursor-forge", about = "Build an X11 cursor theme from svg sources", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Theme project directory (default: current directory)
    #[arg(short = 'C', long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of <root>/cursor-forge.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of concurrent rasterizer processes
    #[arg(short = 'j', long, global = true)]
    pub workers: Option<usize>,

    /// Use the bundled rasterizer and compiler instead of inkscape/xcursorgen
    #[arg(long, global = true)]
    pub builtin_tools: bool,

    /// Copy the finished theme into ~/.icons
    #[arg(long, global = true)]
    pub install: bool,

    /// Only print failures
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also print skipped tasks and per-cursor progress
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the theme (the default)
    Build,
    /// Render one svg to a png at the given dpi
    Rasterize(RasterizeArgs),
    /// Compile an xcursorgen-style descriptor into an Xcursor file
    Compile(CompileArgs),
    /// Remove build intermediates and the assembled theme
    Clean,
    /// Print the default configuration
    InitConfig(InitConfigArgs),
}

#[derive(Args)]
pub struct RasterizeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[arg(long, default_value_t = 96)]
    pub dpi: u32,
}

#[derive(Args)]
pub struct CompileArgs {
    pub descriptor: PathBuf,
    pub output: PathBuf,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Write cursor-forge.toml into the project root instead of printing it
    #[arg(long)]
    pub write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// The run finished but recorded failures.
    Failures,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn project_root(&self) -> Result<PathBuf> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        fs::canonicalize(&root).with_context(|| format!("Cannot resolve project directory {}", root.display()))
    }

    /// Config file settings with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let root = self.project_root()?;
        let mut config = Config::load_for_root(&root, self.config.as_deref())?;
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.builtin_tools {
            config.use_builtin_tools();
        }
        if self.install {
            config.install = true;
        }
        Ok(config)
    }
}

pub fn dispatch(cli: Cli) -> Result<RunStatus> {
    match &cli.command {
        None | Some(Commands::Build) => cmd_build(&cli),
        Some(Commands::Rasterize(args)) => {
            rasterize_file(&args.input, &args.output, args.dpi)?;
            Ok(RunStatus::Success)
        }
        Some(Commands::Compile(args)) => {
            compile_descriptor(&args.descriptor, &args.output)?;
            Ok(RunStatus::Success)
        }
        Some(Commands::Clean) => cmd_clean(&cli),
        Some(Commands::InitConfig(args)) => cmd_init_config(&cli, args),
    }
}

fn cmd_build(cli: &Cli) -> Result<RunStatus> {
    let config = cli.load_config()?;
    let verbosity = cli.verbosity();

    let (tx, rx) = unbounded();
    let reporter = spawn_reporter(rx, verbosity);
    let build = PipelineWorker::new(config, tx).start_build();
    let report = reporter
        .join()
        .map_err(|_| anyhow!("Console reporter thread panicked"))?;
    build.join().map_err(|_| anyhow!("Build thread panicked"))??;

    print_summary(&report, verbosity);
    if report.has_failures() {
        Ok(RunStatus::Failures)
    } else {
        Ok(RunStatus::Success)
    }
}

fn cmd_clean(cli: &Cli) -> Result<RunStatus> {
    let config = cli.load_config()?;
    for dir in dist::clean(&config.paths())? {
        if cli.verbosity() != Verbosity::Quiet {
            println!("{}", format!("Removed {}", dir.display()).blue());
        }
    }
    Ok(RunStatus::Success)
}

fn cmd_init_config(cli: &Cli, args: &InitConfigArgs) -> Result<RunStatus> {
    let content = Config::default().to_toml_string()?;
    if !args.write {
        print!("{}", content);
        return Ok(RunStatus::Success);
    }

    let dest = cli.project_root()?.join(CONFIG_FILE_NAME);
    write_new_file(&dest, &content)?;
    println!("{}", format!("Wrote {}", dest.display()).green());
    Ok(RunStatus::Success)
}

fn write_new_file(dest: &Path, content: &str) -> Result<()> {
    if dest.exists() {
        bail!("{} already exists", dest.display());
    }
    fs::write(dest, content).with_context(|| format!("Failed to write {}", dest.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "workers = 3\ntheme_name = \"Slim\"\n").unwrap();

        let root = dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(["cursor-forge", "-C", &root, "--builtin-tools", "-j", "5"]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.workers, 5);
        assert_eq!(config.theme_name, "Slim");
        assert_eq!(config.compiler[0], "{self}");
        assert!(config.source_dir.starts_with(fs::canonicalize(dir.path()).unwrap()));
    }

    #[test]
    fn test_build_is_the_default_command() {
        let cli = Cli::parse_from(["cursor-forge", "--verbose"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbosity(), Verbosity::Verbose);
        assert!(Cli::try_parse_from(["cursor-forge", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_rasterize_arguments() {
        let cli = Cli::parse_from(["cursor-forge", "rasterize", "in.svg", "out.png", "--dpi", "180"]);
        match cli.command {
            Some(Commands::Rasterize(args)) => {
                assert_eq!(args.dpi, 180);
                assert_eq!(args.output, PathBuf::from("out.png"));
            }
            _ => panic!("expected rasterize"),
        }
    }

    #[test]
    fn test_init_config_write_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join(CONFIG_FILE_NAME);
        write_new_file(&dest, "workers = 2\n").unwrap();
        assert!(write_new_file(&dest, "workers = 4\n").is_err());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "workers = 2\n");
    }
}
