//! External compiler and linker invocation.
//!
//! Build orchestration talks to tools only through [`CommandRunner`], so the
//! compile and link decisions can be tested with a recording runner instead
//! of a real compiler.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// A fully resolved tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run (e.g. `g++`).
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl Invocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished tool.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, or `None` if the tool was killed by a signal.
    pub status: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// Returns `true` if the tool exited with code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Errors raised while compiling or linking.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The tool could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The tool ran and reported failure.
    #[error("`{command}` failed with {}", describe_status(*.status))]
    Failed {
        /// The full command line.
        command: String,
        /// Exit code, if any.
        status: Option<i32>,
    },

    /// No compiler is configured for a file's extension.
    #[error("no compiler configured for {}", .path.display())]
    NoCompiler {
        /// The file that could not be compiled.
        path: PathBuf,
    },
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

/// Runs external tools to completion.
pub trait CommandRunner {
    /// Runs `invocation`, capturing its output.
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| ToolError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;
        Ok(ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
