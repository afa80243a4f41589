//! Null-model generation: random trees sharing the observed leaf set.
//!
//! # Overview
//! The congruence test needs a null distribution of "how far apart are two
//! trees over these taxa when topology carries no signal at all". Each sample
//! is a tree with the same leaf count and leaf-name set as the host tree but
//! an independently randomized shape and name assignment.
//!
//! # Algorithm
//! One random tree is grown by repeated leaf splitting:
//! 1. Start from a root with two unnamed leaves.
//! 2. Until the target leaf count is reached, pick a leaf uniformly at random
//!    and attach two children to it (the leaf becomes internal).
//! 3. Shuffle the leaf-name list and label the leaves with it.
//!
//! Every binary topology is reachable this way, and the name shuffle
//! randomizes the assignment of taxa to positions independently of the shape.
//!
//! # Reproducibility
//! All randomness flows through a single `StdRng` seeded once per run, and
//! generation is strictly sequential, so a fixed seed, leaf set and tree count
//! reproduce the identical tree set file-for-file.

use std::fs;
use std::io;
use std::path::PathBuf;

use phylotree::tree::{Node, Tree, TreeError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::RunConfig;

#[derive(Error, Debug)]
pub enum NullModelError {
    #[error("cannot generate random trees over an empty leaf set")]
    EmptyLeafSet,
    #[error("failed to build random tree")]
    Tree(#[from] TreeError),
    #[error("failed to write random tree")]
    Io(#[from] io::Error),
}

/// Grow one random binary topology and label its leaves with `names`, in order.
///
/// Callers wanting a random name assignment shuffle `names` first; the
/// topology and the labeling then use the same RNG stream.
pub fn random_topology<R: Rng>(rng: &mut R, names: &[String]) -> Result<Tree, NullModelError> {
    if names.is_empty() {
        return Err(NullModelError::EmptyLeafSet);
    }

    let mut tree = Tree::new();
    let root = tree.add(Node::new());
    let mut leaves = Vec::with_capacity(names.len());

    if names.len() == 1 {
        leaves.push(tree.add_child(Node::new(), root, None)?);
    } else {
        leaves.push(tree.add_child(Node::new(), root, None)?);
        leaves.push(tree.add_child(Node::new(), root, None)?);

        while leaves.len() < names.len() {
            // Split a random leaf: it becomes internal, its two children leaves.
            let idx = rng.gen_range(0..leaves.len());
            let parent = leaves.swap_remove(idx);
            leaves.push(tree.add_child(Node::new(), parent, None)?);
            leaves.push(tree.add_child(Node::new(), parent, None)?);
        }
    }

    for (leaf, name) in leaves.iter().zip(names) {
        tree.get_mut(leaf)?.name = Some(name.clone());
    }

    Ok(tree)
}

/// Generate the full null set: `cfg.num_random` trees over `names`, one file
/// per tree under the random-tree directory. Returns the written paths in
/// generation order.
pub fn generate_null_set(names: &[String], cfg: &RunConfig) -> Result<Vec<PathBuf>, NullModelError> {
    if names.is_empty() {
        return Err(NullModelError::EmptyLeafSet);
    }

    fs::create_dir_all(cfg.random_tree_dir())?;

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut shuffled = names.to_vec();
    let mut paths = Vec::with_capacity(cfg.num_random);

    for index in 0..cfg.num_random {
        shuffled.shuffle(&mut rng);
        let tree = random_topology(&mut rng, &shuffled)?;

        let path = cfg.random_tree_path(index);
        tree.to_file(&path)?;
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
use crate::compare::Method;
#[cfg(test)]
use crate::validate::leaf_names;

#[cfg(test)]
fn test_config(dir: &std::path::Path, num_random: usize, seed: u64) -> RunConfig {
    RunConfig {
        dir: dir.to_path_buf(),
        host_file: "ht.newick".to_string(),
        microbiome_file: "mt.newick".to_string(),
        num_random,
        seed,
        jar: PathBuf::from("TreeCmp/bin/TreeCmp.jar"),
        java: "java".to_string(),
        methods: Method::ALL.to_vec(),
    }
}

#[test]
fn random_trees_preserve_the_leaf_set() {
    let names: Vec<String> = ["A", "B", "C", "D", "E", "F", "G", "H"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let tree = random_topology(&mut rng, &names).unwrap();
        assert_eq!(tree.n_leaves(), names.len());

        let mut generated = leaf_names(&tree).unwrap();
        generated.sort();
        assert_eq!(generated, names);
    }
}

#[test]
fn single_and_two_leaf_sets_are_handled() {
    let mut rng = StdRng::seed_from_u64(1);

    let one: Vec<String> = vec!["only".to_string()];
    let tree = random_topology(&mut rng, &one).unwrap();
    assert_eq!(tree.n_leaves(), 1);

    let two: Vec<String> = vec!["A".to_string(), "B".to_string()];
    let tree = random_topology(&mut rng, &two).unwrap();
    assert_eq!(tree.n_leaves(), 2);
}

#[test]
fn empty_leaf_set_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        random_topology(&mut rng, &[]),
        Err(NullModelError::EmptyLeafSet)
    ));
}

#[test]
fn null_set_writes_one_file_per_tree() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(dir.path(), 12, 7);
    let names: Vec<String> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let paths = generate_null_set(&names, &cfg).unwrap();
    assert_eq!(paths.len(), 12);
    for path in &paths {
        assert!(path.exists());
    }

    let dest = cfg.random_trees_path();
    crate::io::concat_newick(&paths, &dest).unwrap();
    let content = fs::read_to_string(&dest).unwrap();
    assert_eq!(content.matches(';').count(), 12);
}

#[test]
fn identical_seeds_reproduce_the_identical_tree_set() {
    let names: Vec<String> = ["A", "B", "C", "D", "E", "F"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let paths_a = generate_null_set(&names, &test_config(dir_a.path(), 8, 191_919)).unwrap();
    let paths_b = generate_null_set(&names, &test_config(dir_b.path(), 8, 191_919)).unwrap();

    for (a, b) in paths_a.iter().zip(&paths_b) {
        assert_eq!(
            fs::read_to_string(a).unwrap(),
            fs::read_to_string(b).unwrap()
        );
    }
}
