use clap::{Parser, ValueEnum};
use itertools::Itertools;
use phylotree::tree::Tree;
use std::path::PathBuf;
use std::time::Instant;
use topo_congruence::compare::{Method, TreeCmp};
use topo_congruence::config::{RunConfig, DEFAULT_JAR, DEFAULT_NUM_RANDOM, DEFAULT_SEED};
use topo_congruence::io::{concat_newick, read_newick, read_report};
use topo_congruence::random::generate_null_set;
use topo_congruence::stats::summarize;
use topo_congruence::validate::{check_leaf_sets, leaf_names};

/// Test whether a host phylogeny and a microbiome dendrogram are more
/// topologically congruent than expected by chance: build a null distribution
/// of random trees over the same taxa, score everything with TreeCmp under
/// four metrics, and report normalized scores and empirical p-values.
#[derive(Parser, Debug)]
#[command(
    name = "topo-congruence",
    version,
    about = "Host-microbiome topological congruence test"
)]
struct Args {
    /// Dataset directory holding the input trees; all generated files land here too
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// Host tree filename within the dataset directory (.newick, optionally .gz)
    #[arg(long = "host", default_value = "ht.newick")]
    host: String,

    /// Microbiome tree filename within the dataset directory
    #[arg(long = "microbiome", default_value = "mt.newick")]
    microbiome: String,

    /// Number of random trees in the null distribution
    #[arg(short = 'n', long = "num-random", default_value_t = DEFAULT_NUM_RANDOM)]
    num_random: usize,

    /// Seed for the null-model RNG
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Path to the TreeCmp jar
    #[arg(long = "jar", default_value = DEFAULT_JAR)]
    jar: PathBuf,

    /// Java launcher used to run the jar
    #[arg(long = "java", default_value = "java")]
    java: String,

    /// Metric to score: rc | mc | rf | ms (repeatable; default is all four)
    #[arg(long = "method", value_enum)]
    methods: Vec<MethodArg>,

    /// Abort on leaf-set mismatch instead of continuing with a warning
    #[arg(long = "strict", default_value_t = false)]
    strict: bool,

    /// Quiet mode: suppresses progress messages and tree rendering on stdout
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MethodArg {
    Rc,
    Mc,
    Rf,
    Ms,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Rc => Method::RootedRobinsonFoulds,
            MethodArg::Mc => Method::MatchingCluster,
            MethodArg::Rf => Method::RobinsonFoulds,
            MethodArg::Ms => Method::MatchingSplit,
        }
    }
}

impl Args {
    fn into_config(self) -> RunConfig {
        let methods = if self.methods.is_empty() {
            Method::ALL.to_vec()
        } else {
            self.methods.into_iter().map(Method::from).collect()
        };

        RunConfig {
            dir: self.dir,
            host_file: self.host,
            microbiome_file: self.microbiome,
            num_random: self.num_random,
            seed: self.seed,
            jar: self.jar,
            java: self.java,
            methods,
        }
    }
}

fn main() {
    let args = Args::parse();
    let quiet = args.quiet;
    let strict = args.strict;
    let cfg = args.into_config();

    // Load and check the two input trees
    let t0 = Instant::now();
    let host = match read_newick(cfg.host_path()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read host tree {:?}: {e}", cfg.host_path());
            std::process::exit(2);
        }
    };
    let microbiome = match read_newick(cfg.microbiome_path()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!(
                "Failed to read microbiome tree {:?}: {e}",
                cfg.microbiome_path()
            );
            std::process::exit(2);
        }
    };
    log_if(!quiet, format!("Loaded both trees in {:.3}s", t0.elapsed().as_secs_f64()));

    if !quiet {
        show_tree("HOST TREE", &host);
        show_tree("MICROBIOME TREE", &microbiome);
    }

    let names = match leaf_names(&microbiome) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Microbiome tree has unusable leaves: {e}");
            std::process::exit(2);
        }
    };

    let leaf_report = match check_leaf_sets(&host, &microbiome) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Could not check leaf sets: {e}");
            std::process::exit(2);
        }
    };
    if !leaf_report.is_consistent() {
        for finding in leaf_report.findings() {
            eprintln!("ERROR - {finding}");
        }
        if strict {
            std::process::exit(2);
        }
    }

    // Null model: N random trees, then one concatenated file for batch scoring
    let t1 = Instant::now();
    let tree_files = match generate_null_set(&names, &cfg) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Failed to generate random trees: {e}");
            std::process::exit(3);
        }
    };
    if let Err(e) = concat_newick(&tree_files, &cfg.random_trees_path()) {
        eprintln!(
            "Failed to write {:?}: {e}",
            cfg.random_trees_path()
        );
        std::process::exit(3);
    }
    log_if(
        !quiet,
        format!(
            "Generated {} random trees in {:.3}s",
            tree_files.len(),
            t1.elapsed().as_secs_f64()
        ),
    );

    // Score the observed pair and the null set under each metric
    let comparator = TreeCmp::new(cfg.java.clone(), cfg.jar.clone());
    log_if(
        !quiet,
        format!(
            "Scoring methods: {}",
            cfg.methods.iter().map(|m| m.flag()).join(", ")
        ),
    );

    for &method in &cfg.methods {
        if let Err(e) = std::fs::create_dir_all(cfg.method_dir(method)) {
            eprintln!("Failed to create {:?}: {e}", cfg.method_dir(method));
            std::process::exit(4);
        }

        let t2 = Instant::now();
        if let Err(e) = comparator.compare(
            &cfg.host_path(),
            &cfg.microbiome_path(),
            &cfg.pair_report_path(method),
            method,
        ) {
            eprintln!("Host-microbiome comparison failed for {}: {e}", method.flag());
            std::process::exit(4);
        }
        if let Err(e) = comparator.compare(
            &cfg.host_path(),
            &cfg.random_trees_path(),
            &cfg.null_report_path(method),
            method,
        ) {
            eprintln!("Host-random comparison failed for {}: {e}", method.flag());
            std::process::exit(4);
        }
        log_if(
            !quiet,
            format!("Scored {} in {:.3}s", method.flag(), t2.elapsed().as_secs_f64()),
        );

        let pair = match read_report(cfg.pair_report_path(method)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "Failed to read {:?}: {e}",
                    cfg.pair_report_path(method)
                );
                std::process::exit(5);
            }
        };
        let null = match read_report(cfg.null_report_path(method)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "Failed to read {:?}: {e}",
                    cfg.null_report_path(method)
                );
                std::process::exit(5);
            }
        };

        match summarize(method, &pair, &null) {
            Ok(summary) => println!("{summary}"),
            Err(e) => {
                eprintln!("Could not summarize {}: {e}", method.flag());
                std::process::exit(5);
            }
        }
    }
}

fn log_if(show: bool, msg: String) {
    if show {
        println!("{}", msg);
    }
}

fn show_tree(label: &str, tree: &Tree) {
    println!("\n --- {label} --- ");
    if let Err(e) = tree.print() {
        eprintln!("Could not render {label}: {e}");
    }
}
