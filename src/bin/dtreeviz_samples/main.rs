//! dtreeviz-samples: render sample decision trees for visual inspection.
//!
//! Fits small CART trees on deterministic synthetic datasets and writes one
//! DOT document per dataset, orientation and depth, optionally piping each
//! through Graphviz.
//!
//! Run: `dtreeviz-samples --out samples --render`

// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cart;
mod datasets;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use log::{info, LevelFilter};
use trueno_treeviz::config::{ClassNames, Orientation, RenderConfig};
use trueno_treeviz::tree::TreeKind;
use trueno_treeviz::TreeViz;

use datasets::{Dataset, Task};

/// Orientation and depth of every rendered variant.
const VARIANTS: [(Orientation, usize); 3] = [(Orientation::TD, 2), (Orientation::TD, 4), (Orientation::LR, 3)];

/// dtreeviz-samples: decision tree visualization samples
#[derive(Parser, Debug)]
#[command(name = "dtreeviz-samples")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Render sample decision trees to Graphviz DOT", long_about = None)]
struct Cli {
    /// Output directory for DOT documents and node images
    #[arg(short, long, default_value = "samples")]
    out: PathBuf,

    /// Only render this dataset
    #[arg(short, long, value_parser = clap::builder::PossibleValuesParser::new(datasets::NAMES))]
    dataset: Option<String>,

    /// YAML render configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace this training row down every tree
    #[arg(long)]
    instance_row: Option<usize>,

    /// Run `dot -Tsvg` on every document
    #[arg(long)]
    render: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::builder().filter_level(level).parse_default_env().init();

    let base = match &cli.config {
        Some(path) => RenderConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => RenderConfig::default(),
    };
    fs::create_dir_all(&cli.out).with_context(|| format!("creating {}", cli.out.display()))?;

    let names: Vec<&str> = match &cli.dataset {
        Some(name) => vec![name.as_str()],
        None => datasets::NAMES.to_vec(),
    };
    for name in names {
        let Some(dataset) = datasets::by_name(name) else {
            bail!("unknown dataset {name}");
        };
        let dataset = dataset?;
        for (orientation, depth) in VARIANTS {
            let dot_path = render_variant(&cli, &base, &dataset, orientation, depth)?;
            if cli.render {
                run_dot(&dot_path)?;
            }
        }
    }
    Ok(())
}

/// Fit, render and write one variant. Returns the DOT file path.
fn render_variant(
    cli: &Cli,
    base: &RenderConfig,
    dataset: &Dataset,
    orientation: Orientation,
    depth: usize,
) -> Result<PathBuf> {
    let stem = format!("{}-{}-{depth}", dataset.name, orientation.rankdir());
    info!("Process {} orientation={} max_depth={depth}", dataset.name, orientation.rankdir());

    let kind = match dataset.n_classes() {
        Some(n_classes) => TreeKind::Classifier { n_classes },
        None => TreeKind::Regressor,
    };
    let model = cart::fit(&dataset.x, &dataset.y, kind, depth);

    let mut config = base
        .clone()
        .orientation(orientation)
        .artifact_dir(cli.out.join("artifacts").join(&stem));
    if let Some(row) = cli.instance_row {
        if row >= dataset.x.n_rows() {
            bail!("--instance-row {row} out of range: {} has {} rows", dataset.name, dataset.x.n_rows());
        }
        config = config.instance(dataset.x.row(row).to_vec());
    }

    let mut viz = TreeViz::new(&model, &dataset.x, &dataset.y)
        .feature_names(dataset.feature_names.iter().cloned())
        .target_name(dataset.target_name);
    if let Task::Classification { class_names, histtype } = &dataset.task {
        viz = viz.class_names(ClassNames::list(class_names.iter().cloned()));
        config = config.histtype(*histtype);
    }
    let dot = viz.config(config).render().with_context(|| format!("rendering {stem}"))?;

    let dot_path = cli.out.join(format!("{stem}.dot"));
    fs::write(&dot_path, dot).with_context(|| format!("writing {}", dot_path.display()))?;
    Ok(dot_path)
}

/// `dot -Tsvg` next to the DOT file.
fn run_dot(dot_path: &Path) -> Result<()> {
    let svg_path = dot_path.with_extension("svg");
    let status = Command::new("dot")
        .arg("-Tsvg")
        .arg("-o")
        .arg(&svg_path)
        .arg(dot_path)
        .status()
        .context("running dot (is Graphviz installed?)")?;
    if !status.success() {
        bail!("dot failed on {}: {status}", dot_path.display());
    }
    info!("wrote {}", svg_path.display());
    Ok(())
}
