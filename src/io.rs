use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use phylotree::tree::{NewickParseError, Tree};
use thiserror::Error;

/// Column of a TreeCmp result row that carries the metric value.
/// Reference-mode tables put the pair identity first and the raw score second.
const SCORE_COLUMN: usize = 1;

/// Read a single Newick tree from a file.
///
/// Files ending in `.gz` are gunzipped transparently. Surrounding whitespace
/// (including the trailing newline most tree files carry) is stripped before
/// parsing.
pub fn read_newick<P: AsRef<Path>>(path: P) -> Result<Tree, NewickParseError> {
    let p = path.as_ref();

    let content = if p.to_string_lossy().ends_with(".gz") {
        let mut decoder = GzDecoder::new(File::open(p)?);
        let mut s = String::new();
        decoder.read_to_string(&mut s)?;
        s
    } else {
        fs::read_to_string(p)?
    };

    Tree::from_newick(content.trim())
}

/// Concatenate Newick files into one multi-tree file, one tree per line.
///
/// TreeCmp expects exactly this shape for its `-i` input when scoring a whole
/// set against a reference tree.
pub fn concat_newick<P: AsRef<Path>>(sources: &[P], dest: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(dest)?);

    for source in sources {
        let tree = fs::read_to_string(source.as_ref())?;
        writeln!(&mut out, "{}", tree.trim())?;
    }

    out.flush()?;
    Ok(())
}

/// A parsed TreeCmp result table: the header row plus the metric value of
/// every data row, in file order.
#[derive(Debug, Clone)]
pub struct Report {
    pub header: Vec<String>,
    pub scores: Vec<f64>,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("could not read result table")]
    Io(#[from] io::Error),
    #[error("result table is empty")]
    Empty,
    #[error("row {row} has no score column")]
    MissingScore { row: usize },
    #[error("row {row} has a non-numeric score")]
    BadScore {
        row: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// Read a tab-separated TreeCmp result table.
///
/// The first non-blank line is the header; every following line contributes
/// the value in [`SCORE_COLUMN`]. Blank lines are skipped.
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<Report, ReportError> {
    let content = fs::read_to_string(path.as_ref())?;
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or(ReportError::Empty)?
        .split('\t')
        .map(|field| field.trim().to_string())
        .collect();

    let scores = lines
        .enumerate()
        .map(|(idx, line)| {
            // Rows are 1-based in diagnostics, plus one for the header.
            let row = idx + 2;
            let field = line
                .split('\t')
                .nth(SCORE_COLUMN)
                .ok_or(ReportError::MissingScore { row })?;
            field
                .trim()
                .parse::<f64>()
                .map_err(|source| ReportError::BadScore { row, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report { header, scores })
}

#[cfg(test)]
use flate2::{write::GzEncoder, Compression};

#[test]
fn read_newick_plain_and_gzipped() {
    let dir = tempfile::tempdir().unwrap();

    let plain = dir.path().join("t.newick");
    fs::write(&plain, "((A,B),(C,D));\n").unwrap();
    let tree = read_newick(&plain).unwrap();
    assert_eq!(tree.n_leaves(), 4);

    let gz = dir.path().join("t.newick.gz");
    let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    enc.write_all(b"((A,B),(C,D));\n").unwrap();
    enc.finish().unwrap();
    let tree = read_newick(&gz).unwrap();
    assert_eq!(tree.n_leaves(), 4);
}

#[test]
fn concat_newick_writes_one_tree_per_line() {
    let dir = tempfile::tempdir().unwrap();

    let mut sources = Vec::new();
    for i in 0..5 {
        let p = dir.path().join(format!("tree_{i}.newick"));
        fs::write(&p, format!("((A,B),(C,D{i}));\n")).unwrap();
        sources.push(p);
    }

    let dest = dir.path().join("all.newick");
    concat_newick(&sources, &dest).unwrap();

    let content = fs::read_to_string(&dest).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert_eq!(content.matches(';').count(), 5);
}

#[test]
fn read_report_takes_second_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compare.txt");
    fs::write(
        &path,
        "No.\tMatchingSplit\tMatchingSplit_toYuleAvg\n1\t4.0\t0.52\n2\t0\t0.0\n3\t7.5\t0.96\n",
    )
    .unwrap();

    let report = read_report(&path).unwrap();
    assert_eq!(report.header[1], "MatchingSplit");
    assert_eq!(report.scores, vec![4.0, 0.0, 7.5]);
}

#[test]
fn read_report_rejects_empty_and_malformed_tables() {
    let dir = tempfile::tempdir().unwrap();

    let empty = dir.path().join("empty.txt");
    fs::write(&empty, "\n\n").unwrap();
    assert!(matches!(read_report(&empty), Err(ReportError::Empty)));

    let bad = dir.path().join("bad.txt");
    fs::write(&bad, "No.\tRF\n1\tnot-a-number\n").unwrap();
    assert!(matches!(
        read_report(&bad),
        Err(ReportError::BadScore { row: 2, .. })
    ));

    let short = dir.path().join("short.txt");
    fs::write(&short, "No.\tRF\nonly-one-field\n").unwrap();
    assert!(matches!(
        read_report(&short),
        Err(ReportError::MissingScore { row: 2 })
    ));
}
