//! Run configuration: every knob of the pipeline plus the derived layout of
//! the files it reads and writes under the dataset directory.
//!
//! Layout, relative to `dir`:
//!
//! ```text
//! <dir>/<host file>                    input host tree
//! <dir>/<microbiome file>              input microbiome tree
//! <dir>/random_trees/tree_<i>.newick   one generated null tree per file
//! <dir>/random_trees.newick            all null trees, one per line
//! <dir>/compare_<flag>/compare_ht_mt.txt       observed-pair table
//! <dir>/compare_<flag>/compare_ht_random.txt   null-distribution table
//! ```

use std::path::PathBuf;

use crate::compare::Method;

/// Default number of random trees in the null distribution.
pub const DEFAULT_NUM_RANDOM: usize = 10_000;

/// Default RNG seed; fixed so repeated runs are reproducible.
pub const DEFAULT_SEED: u64 = 191_919;

/// Default location of the comparator jar, relative to the working directory.
pub const DEFAULT_JAR: &str = "TreeCmp/bin/TreeCmp.jar";

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Dataset directory holding the input trees and all generated files.
    pub dir: PathBuf,
    /// Host tree filename within `dir`.
    pub host_file: String,
    /// Microbiome tree filename within `dir`.
    pub microbiome_file: String,
    /// Number of random trees in the null distribution.
    pub num_random: usize,
    /// Seed for the null-model RNG.
    pub seed: u64,
    /// Path to the TreeCmp jar.
    pub jar: PathBuf,
    /// Java launcher used to run the jar.
    pub java: String,
    /// Metrics to score, in order.
    pub methods: Vec<Method>,
}

impl RunConfig {
    pub fn host_path(&self) -> PathBuf {
        self.dir.join(&self.host_file)
    }

    pub fn microbiome_path(&self) -> PathBuf {
        self.dir.join(&self.microbiome_file)
    }

    /// Directory holding one file per generated random tree.
    pub fn random_tree_dir(&self) -> PathBuf {
        self.dir.join("random_trees")
    }

    pub fn random_tree_path(&self, index: usize) -> PathBuf {
        self.random_tree_dir().join(format!("tree_{index}.newick"))
    }

    /// The concatenated multi-tree file handed to the comparator.
    pub fn random_trees_path(&self) -> PathBuf {
        self.dir.join("random_trees.newick")
    }

    pub fn method_dir(&self, method: Method) -> PathBuf {
        self.dir.join(format!("compare_{}", method.flag()))
    }

    /// Result table for the host-vs-microbiome pair.
    pub fn pair_report_path(&self, method: Method) -> PathBuf {
        self.method_dir(method).join("compare_ht_mt.txt")
    }

    /// Result table for host-vs-random-trees.
    pub fn null_report_path(&self, method: Method) -> PathBuf {
        self.method_dir(method).join("compare_ht_random.txt")
    }
}

#[test]
fn derived_paths_stay_inside_dataset_dir() {
    let cfg = RunConfig {
        dir: PathBuf::from("peromyscus"),
        host_file: "ht.newick".to_string(),
        microbiome_file: "mt.newick".to_string(),
        num_random: DEFAULT_NUM_RANDOM,
        seed: DEFAULT_SEED,
        jar: PathBuf::from(DEFAULT_JAR),
        java: "java".to_string(),
        methods: Method::ALL.to_vec(),
    };

    assert_eq!(cfg.host_path(), PathBuf::from("peromyscus/ht.newick"));
    assert_eq!(
        cfg.random_tree_path(17),
        PathBuf::from("peromyscus/random_trees/tree_17.newick")
    );
    assert_eq!(
        cfg.pair_report_path(Method::RootedRobinsonFoulds),
        PathBuf::from("peromyscus/compare_rc/compare_ht_mt.txt")
    );
    assert_eq!(
        cfg.null_report_path(Method::MatchingSplit),
        PathBuf::from("peromyscus/compare_ms/compare_ht_random.txt")
    );
}
