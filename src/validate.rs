//! Leaf-set correspondence checks between the host tree and the microbiome
//! dendrogram.
//!
//! The comparison downstream is only meaningful when both trees are built over
//! the same taxa: equal leaf counts and identical leaf-name sets. Findings are
//! collected into a [`LeafReport`] rather than failing eagerly, so the caller
//! decides whether a mismatch is fatal.

use std::collections::HashSet;

use phylotree::tree::{Tree, TreeError};

/// Outcome of cross-checking the two input trees' leaves.
#[derive(Debug, Clone)]
pub struct LeafReport {
    pub host_count: usize,
    pub microbiome_count: usize,
    /// Microbiome leaves absent from the host tree, sorted.
    pub missing_in_host: Vec<String>,
    /// Host leaves absent from the microbiome tree, sorted.
    pub missing_in_microbiome: Vec<String>,
}

impl LeafReport {
    /// True when counts agree and every leaf appears in both trees.
    pub fn is_consistent(&self) -> bool {
        self.host_count == self.microbiome_count
            && self.missing_in_host.is_empty()
            && self.missing_in_microbiome.is_empty()
    }

    /// Human-readable findings, one line each; empty when consistent.
    pub fn findings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.host_count != self.microbiome_count {
            out.push(format!(
                "host and microbiome trees have different numbers of leaves ({} vs {})",
                self.host_count, self.microbiome_count
            ));
        }
        for name in &self.missing_in_host {
            out.push(format!("{name} not found in host tree"));
        }
        for name in &self.missing_in_microbiome {
            out.push(format!("{name} not found in microbiome tree"));
        }
        out
    }
}

/// Ordered leaf names of a tree.
///
/// # Errors
/// `TreeError::UnnamedLeaves` if any leaf has no name; the null model and the
/// comparator both identify taxa by name alone.
pub fn leaf_names(tree: &Tree) -> Result<Vec<String>, TreeError> {
    let n_leaves = tree.n_leaves();
    let names: Vec<String> = tree.get_leaf_names().into_iter().flatten().collect();

    if names.len() != n_leaves {
        return Err(TreeError::UnnamedLeaves);
    }

    Ok(names)
}

/// Cross-check both trees' leaf-name sets against each other.
pub fn check_leaf_sets(host: &Tree, microbiome: &Tree) -> Result<LeafReport, TreeError> {
    let host_names = leaf_names(host)?;
    let microbiome_names = leaf_names(microbiome)?;

    let host_set: HashSet<&String> = host_names.iter().collect();
    let microbiome_set: HashSet<&String> = microbiome_names.iter().collect();

    let mut missing_in_host: Vec<String> = microbiome_set
        .difference(&host_set)
        .map(|name| (*name).clone())
        .collect();
    let mut missing_in_microbiome: Vec<String> = host_set
        .difference(&microbiome_set)
        .map(|name| (*name).clone())
        .collect();

    // Sorted so findings are stable across runs.
    missing_in_host.sort();
    missing_in_microbiome.sort();

    Ok(LeafReport {
        host_count: host_names.len(),
        microbiome_count: microbiome_names.len(),
        missing_in_host,
        missing_in_microbiome,
    })
}

#[test]
fn matching_leaf_sets_are_consistent() {
    let host = Tree::from_newick("((A,B),(C,D));").unwrap();
    let microbiome = Tree::from_newick("((A,C),(B,D));").unwrap();

    let report = check_leaf_sets(&host, &microbiome).unwrap();
    assert!(report.is_consistent());
    assert!(report.findings().is_empty());
}

#[test]
fn mismatched_names_are_reported_both_ways() {
    let host = Tree::from_newick("((A,B),(C,D));").unwrap();
    let microbiome = Tree::from_newick("((A,B),(C,E));").unwrap();

    let report = check_leaf_sets(&host, &microbiome).unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.missing_in_host, vec!["E"]);
    assert_eq!(report.missing_in_microbiome, vec!["D"]);
}

#[test]
fn leaf_count_mismatch_is_reported() {
    let host = Tree::from_newick("((A,B),(C,D));").unwrap();
    let microbiome = Tree::from_newick("((A,B),C);").unwrap();

    let report = check_leaf_sets(&host, &microbiome).unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.host_count, 4);
    assert_eq!(report.microbiome_count, 3);
    assert!(
        report
            .findings()
            .iter()
            .any(|f| f.contains("different numbers of leaves"))
    );
}
