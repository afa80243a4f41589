use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Stand-in for `java -jar TreeCmp.jar ...`: parses the `-i`/`-o` flags the
/// pipeline passes, counts the trees in the input file and writes a result
/// table with one all-zero score row per tree. Lets the whole pipeline run
/// end-to-end without a Java installation.
#[cfg(unix)]
fn write_stub_comparator(dir: &Path) -> anyhow::Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("treecmp-stub.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
         input=\"\"; out=\"\"\n\
         while [ \"$#\" -gt 0 ]; do\n\
           case \"$1\" in\n\
             -i) input=\"$2\"; shift 2 ;;\n\
             -o) out=\"$2\"; shift 2 ;;\n\
             *) shift ;;\n\
           esac\n\
         done\n\
         n=\"$(grep -c ';' \"$input\")\"\n\
         printf 'No.\\tMetric\\tMetric_toYuleAvg\\n' > \"$out\"\n\
         i=1\n\
         while [ \"$i\" -le \"$n\" ]; do\n\
           printf '%s\\t0\\t0.0\\n' \"$i\" >> \"$out\"\n\
           i=$((i+1))\n\
         done\n",
    )?;
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
    Ok(script)
}

#[test]
fn strict_mode_rejects_mismatched_leaf_sets() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("ht.newick"), "((A,B),(C,D));\n")?;
    fs::write(dir.path().join("mt.newick"), "((A,B),(C,E));\n")?;

    let mut cmd = Command::cargo_bin("topo-congruence")?;
    let output = cmd
        .arg("-d")
        .arg(dir.path())
        .arg("--strict")
        .arg("--quiet")
        .output()?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("E not found in host tree"));
    assert!(stderr.contains("D not found in microbiome tree"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn pipeline_runs_end_to_end_with_stub_comparator() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("ht.newick"), "((A,B),(C,D));\n")?;
    fs::write(dir.path().join("mt.newick"), "((A,B),(C,D));\n")?;
    let stub = write_stub_comparator(dir.path())?;

    let mut cmd = Command::cargo_bin("topo-congruence")?;
    let output = cmd
        .arg("-d")
        .arg(dir.path())
        .arg("--num-random")
        .arg("25")
        .arg("--seed")
        .arg("7")
        .arg("--java")
        .arg(&stub)
        .arg("--jar")
        .arg(&stub)
        .arg("--quiet")
        .output()?;

    let stderr = String::from_utf8(output.stderr)?;
    assert!(output.status.success(), "stderr: {stderr}");

    // 25 per-tree files plus the concatenated multi-tree file
    let generated = fs::read_dir(dir.path().join("random_trees"))?.count();
    assert_eq!(generated, 25);
    let concatenated = fs::read_to_string(dir.path().join("random_trees.newick"))?;
    assert_eq!(concatenated.matches(';').count(), 25);

    // All four method directories with both result tables
    for flag in ["rc", "mc", "rf", "ms"] {
        let method_dir = dir.path().join(format!("compare_{flag}"));
        assert!(method_dir.join("compare_ht_mt.txt").exists());
        assert!(method_dir.join("compare_ht_random.txt").exists());
    }

    // All-zero scores: normalization undefined, every random tree counts
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Normalized Score: undefined"));
    assert!(stdout.contains("Total Trees: 25"));
    assert!(stdout.contains("P-Value: 1"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn method_selection_scores_only_requested_metrics() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("ht.newick"), "((A,B),(C,D));\n")?;
    fs::write(dir.path().join("mt.newick"), "((A,C),(B,D));\n")?;
    let stub = write_stub_comparator(dir.path())?;

    let mut cmd = Command::cargo_bin("topo-congruence")?;
    let output = cmd
        .arg("-d")
        .arg(dir.path())
        .arg("--num-random")
        .arg("5")
        .arg("--method")
        .arg("rf")
        .arg("--method")
        .arg("ms")
        .arg("--java")
        .arg(&stub)
        .arg("--jar")
        .arg(&stub)
        .arg("--quiet")
        .output()?;

    assert!(output.status.success());
    assert!(dir.path().join("compare_rf").exists());
    assert!(dir.path().join("compare_ms").exists());
    assert!(!dir.path().join("compare_rc").exists());
    assert!(!dir.path().join("compare_mc").exists());

    Ok(())
}
