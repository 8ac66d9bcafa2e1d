// Console reporting: drains BuildMsg events and prints them with colors,
// failures on stderr so they stay visible when stdout is redirected.

use crossbeam_channel::Receiver;
use crossterm::style::{StyledContent, Stylize};
use std::thread::{self, JoinHandle};

use crate::event::{BuildMsg, Failure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rasterized: usize,
    pub skipped_tasks: usize,
    pub compiled: usize,
    pub aliases_linked: usize,
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn record(&mut self, msg: &BuildMsg) {
        match msg {
            BuildMsg::TaskSkipped(_) => self.skipped_tasks += 1,
            BuildMsg::TaskRasterized { .. } => self.rasterized += 1,
            BuildMsg::CursorCompiled(_) => self.compiled += 1,
            BuildMsg::AliasLinked { .. } => self.aliases_linked += 1,
            BuildMsg::Failed(failure) => self.failures.push(failure.clone()),
            _ => {}
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Rasterized {} icons ({} already up to date)", self.rasterized, self.skipped_tasks),
            format!("Compiled {} cursors", self.compiled),
            format!("Linked {} aliases", self.aliases_linked),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Stage(String),
    Sub(String),
    Warn(String),
    Error(String),
}

impl Line {
    fn styled(&self) -> StyledContent<String> {
        match self {
            Line::Stage(s) => format!(":: :: {}", s).green(),
            Line::Sub(s) => s.clone().blue(),
            Line::Warn(s) => s.clone().yellow(),
            Line::Error(s) => format!("!! !! {}", s).red(),
        }
    }

    pub fn print(&self) {
        match self {
            Line::Error(_) => eprintln!("{}", self.styled()),
            _ => println!("{}", self.styled()),
        }
    }
}

/// Maps an event to the console line it produces at the given verbosity.
pub fn format_msg(msg: &BuildMsg, verbosity: Verbosity) -> Option<Line> {
    if let BuildMsg::Failed(failure) = msg {
        return Some(Line::Error(failure.to_string()));
    }
    if verbosity == Verbosity::Quiet {
        return None;
    }

    match msg {
        BuildMsg::Stage(s) => Some(Line::Stage(format!("{}...", s))),
        BuildMsg::StageDone(s) => Some(Line::Sub(s.clone())),
        BuildMsg::TaskSkipped(path) if verbosity == Verbosity::Verbose => Some(Line::Sub(format!(
            ":: :: Skipping {}, already exists",
            path.display()
        ))),
        BuildMsg::TaskRasterized {
            dpi,
            svg_path,
            png_path,
        } => Some(Line::Sub(format!(
            ":: :: {} dpi {} -> {}",
            dpi,
            svg_path.display(),
            png_path.display()
        ))),
        BuildMsg::RasterProgress(done, total) if verbosity == Verbosity::Verbose => {
            Some(Line::Sub(format!("Progress: {}/{}", done, total)))
        }
        BuildMsg::CursorCompiled(name) if verbosity == Verbosity::Verbose => {
            Some(Line::Sub(format!(":: :: Built {}", name)))
        }
        BuildMsg::AliasLinked { cursor, alias } if verbosity == Verbosity::Verbose => {
            Some(Line::Sub(format!(":: :: {} -> {}", alias, cursor)))
        }
        BuildMsg::LogMessage(s) => Some(Line::Sub(s.clone())),
        BuildMsg::Warning(s) => Some(Line::Warn(s.clone())),
        _ => None,
    }
}

/// Spawns the console reporter. It runs until every sender is dropped and
/// hands back the tallied report.
pub fn spawn_reporter(rx: Receiver<BuildMsg>, verbosity: Verbosity) -> JoinHandle<BuildReport> {
    thread::spawn(move || {
        let mut report = BuildReport::default();
        for msg in rx {
            report.record(&msg);
            if let Some(line) = format_msg(&msg, verbosity) {
                line.print();
            }
        }
        report
    })
}

pub fn print_summary(report: &BuildReport, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        for line in report.summary_lines() {
            Line::Stage(line).print();
        }
    }

    if report.has_failures() {
        eprintln!(
            "{}",
            format!("Build finished with {} failure(s):", report.failures.len()).red()
        );
        for failure in &report.failures {
            eprintln!("{}", format!("  - {}", failure).red());
        }
    }
}
