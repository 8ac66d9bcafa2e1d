// Theme compiler driver: one compiler invocation per cursor whose bitmaps
// are all in place

use crossbeam_channel::Sender;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::pool::RasterLedger;
use super::process::ToolCommand;
use crate::event::{BuildMsg, Failure};
use crate::model::cursor::{BuildResult, CursorDefinition};

pub struct CompilerDriver {
    command: ToolCommand,
    cursor_build: PathBuf,
    cursor_dist: PathBuf,
}

/// Checks that every bitmap of `cursor` exists and none of its raster tasks
/// failed in this run.
pub fn check_ready(cursor: &CursorDefinition, ledger: &RasterLedger) -> Result<(), String> {
    let mut failed: Vec<&Path> = Vec::new();
    let mut missing: Vec<&Path> = Vec::new();

    for frame in &cursor.frames {
        let png = frame.png_path.as_path();
        if ledger.is_failed(png) {
            if !failed.contains(&png) {
                failed.push(png);
            }
        } else if !png.exists() && !missing.contains(&png) {
            missing.push(png);
        }
    }

    if !failed.is_empty() {
        return Err(format!(
            "{} raster task(s) failed ({})",
            failed.len(),
            join_paths(&failed)
        ));
    }
    if !missing.is_empty() {
        return Err(format!("missing bitmap(s) {}", join_paths(&missing)));
    }
    Ok(())
}

fn join_paths(paths: &[&Path]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CompilerDriver {
    pub fn new(command: ToolCommand, cursor_build: PathBuf, cursor_dist: PathBuf) -> Self {
        Self {
            command,
            cursor_build,
            cursor_dist,
        }
    }

    pub fn descriptor_path(&self, cursor: &CursorDefinition) -> PathBuf {
        self.cursor_build.join(format!("{}.cursor", cursor.name))
    }

    pub fn output_path(&self, cursor: &CursorDefinition) -> PathBuf {
        self.cursor_dist.join(&cursor.name)
    }

    /// Compiles every cursor independently; one cursor failing never stops
    /// the others.
    pub fn compile_all(
        &self,
        cursors: &[CursorDefinition],
        ledger: &RasterLedger,
        events: &Sender<BuildMsg>,
    ) -> Vec<BuildResult> {
        cursors
            .iter()
            .map(|cursor| {
                let result = self.compile_one(cursor, ledger);
                let msg = match &result.outcome {
                    Ok(_) => BuildMsg::CursorCompiled(cursor.name.clone()),
                    Err(failure) => BuildMsg::Failed(failure.clone()),
                };
                let _ = events.send(msg);
                result
            })
            .collect()
    }

    pub fn compile_one(&self, cursor: &CursorDefinition, ledger: &RasterLedger) -> BuildResult {
        let output = self.output_path(cursor);

        let outcome = match check_ready(cursor, ledger) {
            Err(reason) => Err(Failure::CursorSkipped {
                cursor: cursor.name.clone(),
                reason,
            }),
            Ok(()) => self
                .run_compiler(cursor, &output)
                .map_err(|reason| Failure::Compile {
                    cursor: cursor.name.clone(),
                    reason,
                }),
        };

        // A cursor that did not build this run must not linger from an older one.
        if outcome.is_err() {
            let _ = remove_file_if_exists(&output);
        }

        BuildResult {
            name: cursor.name.clone(),
            outcome,
        }
    }

    fn run_compiler(&self, cursor: &CursorDefinition, output: &Path) -> Result<PathBuf, String> {
        let descriptor = self.descriptor_path(cursor);
        fs::write(&descriptor, cursor.to_descriptor())
            .map_err(|e| format!("writing {}: {}", descriptor.display(), e))?;

        // An alias link left under this name would make the compiler write
        // through it into another cursor.
        if fs::symlink_metadata(output).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(output).map_err(|e| format!("removing old link {}: {}", output.display(), e))?;
        }

        let vars = [
            ("descriptor", descriptor.to_string_lossy().to_string()),
            ("output", output.to_string_lossy().to_string()),
        ];
        let process = self.command.spawn(&vars).map_err(|e| format!("{:#}", e))?;
        let outcome = process.supervise(None).map_err(|e| e.to_string())?;

        if !outcome.success() {
            return Err(outcome.describe());
        }
        if !output.exists() {
            return Err(format!("compiler did not produce {}", output.display()));
        }
        Ok(output.to_path_buf())
    }
}

fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cursor::ExpandedFrame;
    use crate::pipeline::pool::TaskStatus;
    use crossbeam_channel::unbounded;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _dir: TempDir,
        icons: PathBuf,
        driver: CompilerDriver,
    }

    fn fixture(script: &str) -> Fixture {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("icons");
        let build = dir.path().join("cursor");
        let dist = dir.path().join("dist");
        for d in [&icons, &build, &dist] {
            fs::create_dir_all(d).unwrap();
        }

        let argv: Vec<String> = ["sh", "-c", script, "{descriptor}", "{output}"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let driver = CompilerDriver::new(ToolCommand::new("compiler", &argv).unwrap(), build, dist);
        Fixture {
            _dir: dir,
            icons,
            driver,
        }
    }

    fn cursor(name: &str, icons: &Path, pngs: &[&str]) -> CursorDefinition {
        CursorDefinition {
            name: name.to_string(),
            src_path: PathBuf::from(format!("{}.cursor", name)),
            frames: pngs
                .iter()
                .map(|png| ExpandedFrame {
                    dpi: 90,
                    scaled_size: 24,
                    scaled_hot_x: 3,
                    scaled_hot_y: 4,
                    svg_path: PathBuf::from("x.svg"),
                    png_path: icons.join(png),
                    delay_ms: 0,
                })
                .collect(),
        }
    }

    const COPY: &str = "cp \"$0\" \"$1\"";

    #[test]
    fn test_ready_cursor_is_compiled_with_descriptor() {
        let fx = fixture(COPY);
        fs::write(fx.icons.join("a_90.png"), b"png").unwrap();
        let c = cursor("left_ptr", &fx.icons, &["a_90.png"]);

        let result = fx.driver.compile_one(&c, &RasterLedger::default());
        let output = result.outcome.unwrap();

        let expected = format!("24 3 4 {}", fx.icons.join("a_90.png").display());
        assert_eq!(fs::read_to_string(&output).unwrap(), expected);
        assert_eq!(fs::read_to_string(fx.driver.descriptor_path(&c)).unwrap(), expected);
    }

    #[test]
    fn test_failed_raster_task_skips_cursor() {
        let fx = fixture(COPY);
        fs::write(fx.icons.join("ok_90.png"), b"png").unwrap();
        let good = cursor("text", &fx.icons, &["ok_90.png"]);
        let bad = cursor("wait", &fx.icons, &["ok_90.png", "broken_90.png"]);

        let mut ledger = RasterLedger::default();
        ledger.record(fx.icons.join("broken_90.png"), TaskStatus::Failed("exited with code 1".into()));

        let (tx, rx) = unbounded();
        let results = fx.driver.compile_all(&[good, bad], &ledger, &tx);
        drop(tx);

        assert!(results[0].is_built());
        assert!(!results[1].is_built());
        assert!(!fx.driver.cursor_dist.join("wait").exists());

        let msgs: Vec<_> = rx.iter().collect();
        assert_eq!(msgs[0], BuildMsg::CursorCompiled("text".to_string()));
        match &msgs[1] {
            BuildMsg::Failed(Failure::CursorSkipped { cursor, reason }) => {
                assert_eq!(cursor, "wait");
                assert!(reason.contains("1 raster task(s) failed"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_missing_bitmap_skips_cursor() {
        let fx = fixture(COPY);
        let c = cursor("pointer", &fx.icons, &["hand_90.png"]);
        let err = check_ready(&c, &RasterLedger::default()).unwrap_err();
        assert!(err.starts_with("missing bitmap"));
    }

    #[test]
    fn test_old_alias_link_is_replaced_not_written_through() {
        let fx = fixture(COPY);
        fs::write(fx.icons.join("a_90.png"), b"png").unwrap();
        let dist = fx.driver.cursor_dist.clone();
        fs::write(dist.join("left_ptr"), b"left_ptr artifact").unwrap();
        std::os::unix::fs::symlink("left_ptr", dist.join("arrow")).unwrap();

        let result = fx.driver.compile_one(&cursor("arrow", &fx.icons, &["a_90.png"]), &RasterLedger::default());

        assert!(result.is_built());
        assert!(!fs::symlink_metadata(dist.join("arrow")).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(dist.join("left_ptr")).unwrap(), b"left_ptr artifact");
    }

    #[test]
    fn test_compiler_failure_is_isolated_and_cleans_stale_output() {
        let fx = fixture("case \"$0\" in */wait.cursor) exit 2;; esac; cp \"$0\" \"$1\"");
        fs::write(fx.icons.join("a_90.png"), b"png").unwrap();
        fs::write(fx.driver.cursor_dist.join("wait"), b"stale").unwrap();

        let cursors = vec![
            cursor("wait", &fx.icons, &["a_90.png"]),
            cursor("left_ptr", &fx.icons, &["a_90.png"]),
        ];
        let (tx, _rx) = unbounded();
        let results = fx.driver.compile_all(&cursors, &RasterLedger::default(), &tx);

        assert_eq!(
            results[0].outcome,
            Err(Failure::Compile {
                cursor: "wait".to_string(),
                reason: "exited with code 2".to_string(),
            })
        );
        assert!(!fx.driver.cursor_dist.join("wait").exists());
        assert!(results[1].is_built());
    }
}
