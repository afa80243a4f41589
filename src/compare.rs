//! External TreeCmp invocation and the four distance metrics it scores.
//!
//! TreeCmp is a Java tool; each comparison is one blocking child process:
//!
//! ```text
//! java -jar TreeCmp.jar -r <reference> -d <metric flag> -i <input> -o <table> -N
//! ```
//!
//! In reference mode (`-r`) every tree in the input file is scored against the
//! reference tree and one row per pair is written to the output table. `-N`
//! appends normalized columns; we only consume the raw metric column but keep
//! the flag so the tables on disk stay complete.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

/// The four TreeCmp metrics applied to each tree pair, in run order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    /// Rooted Robinson-Foulds (`rc`): differing clusters between rooted trees.
    RootedRobinsonFoulds,
    /// Rooted Matching Cluster (`mc`): optimal cluster correspondence.
    MatchingCluster,
    /// Unrooted Robinson-Foulds (`rf`): differing bipartitions.
    RobinsonFoulds,
    /// Unrooted Matching Split (`ms`): optimal split correspondence.
    MatchingSplit,
}

impl Method {
    /// All metrics in the order they are scored.
    pub const ALL: [Method; 4] = [
        Method::RootedRobinsonFoulds,
        Method::MatchingCluster,
        Method::RobinsonFoulds,
        Method::MatchingSplit,
    ];

    /// The `-d` flag TreeCmp expects for this metric.
    pub fn flag(self) -> &'static str {
        match self {
            Method::RootedRobinsonFoulds => "rc",
            Method::MatchingCluster => "mc",
            Method::RobinsonFoulds => "rf",
            Method::MatchingSplit => "ms",
        }
    }

    /// Human-readable metric name for console summaries.
    pub fn label(self) -> &'static str {
        match self {
            Method::RootedRobinsonFoulds => "Rooted Robinson-Foulds",
            Method::MatchingCluster => "Rooted Matching Cluster",
            Method::RobinsonFoulds => "Unrooted Robinson-Foulds",
            Method::MatchingSplit => "Unrooted Matching Split",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors from launching or running the comparator process.
#[derive(Error, Debug)]
pub enum CompareError {
    /// The child process could not be spawned at all (missing java, bad path).
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The comparator ran but exited non-zero.
    #[error("TreeCmp exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

/// Handle on the external comparator: which java to launch and which jar to run.
#[derive(Debug, Clone)]
pub struct TreeCmp {
    java: String,
    jar: PathBuf,
}

impl TreeCmp {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>) -> Self {
        TreeCmp {
            java: java.into(),
            jar: jar.into(),
        }
    }

    /// Assemble the full argument vector for one comparison.
    ///
    /// Kept separate from [`TreeCmp::compare`] so the command line can be
    /// checked without spawning anything.
    pub fn args(&self, reference: &Path, input: &Path, output: &Path, method: Method) -> Vec<String> {
        vec![
            "-jar".to_string(),
            self.jar.display().to_string(),
            "-r".to_string(),
            reference.display().to_string(),
            "-d".to_string(),
            method.flag().to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-N".to_string(),
        ]
    }

    /// Score every tree in `input` against `reference` under `method`,
    /// writing the result table to `output`.
    ///
    /// Blocks until the child exits. Stdout/stderr are captured rather than
    /// inherited; a non-zero exit surfaces the child's stderr in the error.
    pub fn compare(
        &self,
        reference: &Path,
        input: &Path,
        output: &Path,
        method: Method,
    ) -> Result<(), CompareError> {
        let child = Command::new(&self.java)
            .args(self.args(reference, input, output, method))
            .output()
            .map_err(|source| CompareError::Launch {
                program: self.java.clone(),
                source,
            })?;

        if !child.status.success() {
            return Err(CompareError::Failed {
                status: child.status,
                stderr: String::from_utf8_lossy(&child.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[test]
fn method_flags_match_treecmp() {
    let flags: Vec<_> = Method::ALL.iter().map(|m| m.flag()).collect();
    assert_eq!(flags, vec!["rc", "mc", "rf", "ms"]);
}

#[test]
fn command_line_flag_order() {
    let cmp = TreeCmp::new("java", "TreeCmp/bin/TreeCmp.jar");
    let args = cmp.args(
        Path::new("ht.newick"),
        Path::new("mt.newick"),
        Path::new("out.txt"),
        Method::MatchingSplit,
    );

    assert_eq!(
        args,
        vec![
            "-jar",
            "TreeCmp/bin/TreeCmp.jar",
            "-r",
            "ht.newick",
            "-d",
            "ms",
            "-i",
            "mt.newick",
            "-o",
            "out.txt",
            "-N",
        ]
    );
}
