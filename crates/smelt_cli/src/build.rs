//! `smelt build` — recompile stale translation units and relink.
//!
//! Orchestrates one incremental build:
//! 1. Resolve the project and its exclude patterns
//! 2. Discover translation units
//! 3. Compile each unit whose object is missing, older than the unit, or
//!    older than any header it transitively includes
//! 4. Link the executable if anything was recompiled

use std::io;
use std::path::{Path, PathBuf};

use smelt_config::ProjectConfig;
use smelt_deps::{file_mtime, DependencyGraph, DepsError};
use tracing::debug;

use crate::pipeline::{
    discover_files, executable_path, load_project, object_path, ExcludeSet, Project,
};
use crate::progress::ProgressBar;
use crate::toolchain::{CommandRunner, Invocation, ProcessRunner, ToolError, ToolOutput};
use crate::{BuildArgs, GlobalArgs};

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The include graph of a unit could not be built or evaluated.
    #[error(transparent)]
    Deps(#[from] DepsError),

    /// A compiler or linker could not be run or failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A build input or output could not be inspected.
    #[error("failed to inspect {}: {source}", .path.display())]
    Io {
        /// The file being inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl BuildError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What happened during a build.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Units that were recompiled.
    pub compiled: usize,
    /// Units whose object file was reused.
    pub up_to_date: usize,
    /// The executable, if it was relinked.
    pub executable: Option<PathBuf>,
}

/// Result of handling one translation unit.
struct Compiled {
    object: PathBuf,
    recompiled: bool,
}

/// Runs the `smelt build` command.
///
/// Returns exit code 0 on success. A missing main file, a dependency error
/// or a failing tool is reported as an error.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let config = &project.config;

    let mut patterns = config.project.excludes.clone();
    patterns.extend(args.excludes.iter().cloned());
    let excludes = ExcludeSet::new(&patterns)?;

    let main = project.main_path();
    if !main.is_file() {
        return Err(format!("could not find {}", config.project.main).into());
    }

    let units = discover_files(&project.root, &config.project.sources, &excludes)?;
    debug!(root = %project.root.display(), units = units.len(), "discovered translation units");

    if !global.quiet {
        eprintln!("   Building {} ({} units)", project.name(), units.len());
    }

    let mut progress =
        (!global.quiet && !global.verbose).then(|| ProgressBar::new(units.len() + 1));
    let mut builder = Builder::new(&project, ProcessRunner, global.verbose);
    let result = builder.build(&units, &main, progress.as_mut());
    if let Some(bar) = &progress {
        bar.finish();
    }
    let summary = result?;

    if !global.quiet {
        print_summary(&project, &summary);
    }
    Ok(0)
}

fn print_summary(project: &Project, summary: &BuildSummary) {
    match &summary.executable {
        Some(exe) => eprintln!(
            "    Finished {} ({} compiled, {} up to date)",
            project.display_path(exe),
            summary.compiled,
            summary.up_to_date
        ),
        None => eprintln!("    Finished {} is up to date", project.name()),
    }
}

/// Drives compilation and linking for one project through a [`CommandRunner`].
///
/// The builder owns the [`DependencyGraph`] for the build, so headers shared
/// by several units are scanned once.
pub struct Builder<'a, R> {
    root: &'a Path,
    config: &'a ProjectConfig,
    runner: R,
    graph: DependencyGraph,
    verbose: bool,
}

impl<'a, R: CommandRunner> Builder<'a, R> {
    /// Creates a builder for `project` that runs tools with `runner`.
    pub fn new(project: &'a Project, runner: R, verbose: bool) -> Self {
        Self::with_config(&project.root, &project.config, runner, verbose)
    }

    /// Creates a builder from a root directory and configuration.
    pub fn with_config(root: &'a Path, config: &'a ProjectConfig, runner: R, verbose: bool) -> Self {
        Self {
            root,
            config,
            runner,
            graph: DependencyGraph::with_options(config.graph_options()),
            verbose,
        }
    }

    /// Compiles every stale unit in order, then links `main` if any unit was
    /// recompiled. The progress bar, if given, advances once per unit and
    /// once for the link step.
    pub fn build(
        &mut self,
        units: &[PathBuf],
        main: &Path,
        mut progress: Option<&mut ProgressBar>,
    ) -> Result<BuildSummary, BuildError> {
        if let Some(bar) = progress.as_deref_mut() {
            bar.draw();
        }

        let mut summary = BuildSummary::default();
        let mut objects = Vec::with_capacity(units.len());
        for unit in units {
            let compiled = self.compile(unit)?;
            if compiled.recompiled {
                summary.compiled += 1;
            } else {
                summary.up_to_date += 1;
            }
            objects.push(compiled.object);
            if let Some(bar) = progress.as_deref_mut() {
                bar.tick();
            }
        }

        if summary.compiled > 0 {
            summary.executable = Some(self.link(main, &objects)?);
        } else {
            debug!("nothing was recompiled, skipping link");
        }
        if let Some(bar) = progress.as_deref_mut() {
            bar.tick();
        }
        Ok(summary)
    }

    fn compile(&mut self, source: &Path) -> Result<Compiled, BuildError> {
        let source = std::path::absolute(source).map_err(|e| BuildError::io(source, e))?;
        let compiler = self
            .config
            .compiler_for(&source)
            .ok_or_else(|| ToolError::NoCompiler {
                path: source.clone(),
            })?
            .to_string();
        let object = object_path(&source);

        if self.is_up_to_date(&source, &object)? {
            debug!(source = %self.display(&source), "skipping recompilation");
            return Ok(Compiled {
                object,
                recompiled: false,
            });
        }

        if self.verbose {
            eprintln!("   Compiling {}", self.display(&source));
        }
        let invocation = Invocation::new(compiler.as_str())
            .arg("-c")
            .args(self.config.compiler_args_for(&compiler).iter().cloned())
            .arg("-o")
            .arg(object.to_string_lossy())
            .arg(source.to_string_lossy());
        self.execute(&invocation, false)?;
        Ok(Compiled {
            object,
            recompiled: true,
        })
    }

    /// An object is up to date when it is newer than its unit and no file
    /// the unit transitively includes changed after it was written.
    fn is_up_to_date(&mut self, source: &Path, object: &Path) -> Result<bool, BuildError> {
        let object_time = match file_mtime(object) {
            Ok(time) => time,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(BuildError::io(object, e)),
        };
        let source_time = file_mtime(source).map_err(|e| BuildError::io(source, e))?;
        if object_time <= source_time {
            return Ok(false);
        }

        let root = self.graph.build(source)?;
        Ok(!self.graph.is_stale_after(root, object_time)?)
    }

    fn link(&mut self, main: &Path, objects: &[PathBuf]) -> Result<PathBuf, BuildError> {
        let main = std::path::absolute(main).map_err(|e| BuildError::io(main, e))?;
        let compiler = self
            .config
            .compiler_for(&main)
            .ok_or_else(|| ToolError::NoCompiler { path: main.clone() })?
            .to_string();
        let executable = executable_path(&main);

        if self.verbose {
            eprintln!("     Linking {}", self.display(&executable));
        }
        let invocation = Invocation::new(compiler)
            .arg("-o")
            .arg(executable.to_string_lossy())
            .args(objects.iter().map(|o| o.to_string_lossy()))
            .args(self.config.link.args.iter().cloned());
        self.execute(&invocation, true)?;
        Ok(executable)
    }

    /// Runs a tool and echoes its output. Stdout is shown in verbose mode;
    /// stderr also when `always_show_stderr` is set or the tool failed.
    fn execute(
        &mut self,
        invocation: &Invocation,
        always_show_stderr: bool,
    ) -> Result<ToolOutput, BuildError> {
        debug!(command = %invocation, "running");
        let output = self.runner.run(invocation)?;

        if self.verbose && !output.stdout.trim().is_empty() {
            println!("{}", output.stdout.trim_end());
        }
        let show_stderr = self.verbose || always_show_stderr || !output.success();
        if show_stderr && !output.stderr.trim().is_empty() {
            eprintln!("{}", output.stderr.trim_end());
        }

        if !output.success() {
            return Err(ToolError::Failed {
                command: invocation.to_string(),
                status: output.status,
            }
            .into());
        }
        Ok(output)
    }

    fn display<'p>(&self, path: &'p Path) -> std::path::Display<'p> {
        path.strip_prefix(self.root).unwrap_or(path).display()
    }
}
