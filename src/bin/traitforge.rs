use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "traitforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the requested layers and write the composite SVG.
    Compose(ComposeArgs),
    /// Print the canonical stacking order.
    Layers(LayersArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Recipe JSON.
    #[arg(long)]
    recipe: PathBuf,

    /// Directory of `<key>.json` outline descriptors.
    #[arg(long)]
    outlines: PathBuf,

    /// Layers to generate (comma separated). Defaults to every layer in the recipe.
    #[arg(long, value_delimiter = ',')]
    layers: Vec<String>,

    /// Override the recipe seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Generate layers in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel generation.
    #[arg(long)]
    threads: Option<usize>,

    /// Override the recipe's oracle technique.
    #[arg(long, value_enum)]
    oracle: Option<OracleChoice>,

    /// Run artifacts through the optimizer before writing.
    #[arg(long)]
    optimize: bool,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct LayersArgs {
    /// Recipe whose order to print; the built-in table otherwise.
    #[arg(long)]
    recipe: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OracleChoice {
    Winding,
    Raster,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Layers(args) => cmd_layers(args),
    }
}

fn read_recipe(path: &Path) -> anyhow::Result<traitforge::Recipe> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read recipe '{}'", path.display()))?;
    traitforge::Recipe::from_json_str(&text)
        .with_context(|| format!("parse recipe '{}'", path.display()))
}

fn cmd_layers(args: LayersArgs) -> anyhow::Result<()> {
    let order = match &args.recipe {
        Some(path) => read_recipe(path)?.canonical_order()?,
        None => traitforge::CanonicalOrder::default(),
    };
    for name in order.names() {
        println!("{name}");
    }
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut recipe = read_recipe(&args.recipe)?;
    if let Some(seed) = args.seed {
        recipe.seed = seed;
    }
    if args.parallel {
        recipe.compose.parallel = true;
    }
    if args.threads.is_some() {
        recipe.compose.threads = args.threads;
    }
    if let Some(oracle) = args.oracle {
        recipe.oracle = match oracle {
            OracleChoice::Winding => traitforge::OracleKind::Winding,
            OracleChoice::Raster => traitforge::OracleKind::Raster,
        };
    }
    if args.optimize {
        recipe.optimize.enabled = true;
    }

    let requested: Vec<String> = if args.layers.is_empty() {
        recipe.layers.keys().cloned().collect()
    } else {
        args.layers.clone()
    };

    let source = Arc::new(traitforge::DirSource::new(&args.outlines));
    let orchestrator = recipe.orchestrator(source)?;
    let report = orchestrator.compose(&requested)?;

    for name in &report.unknown {
        eprintln!("skipped unknown layer '{name}'");
    }
    for layer in &report.layers {
        if let traitforge::LayerStatus::Failed(reason) = &layer.status {
            eprintln!("layer '{}' failed: {reason}", layer.name);
        }
    }

    let composite = match &report.outcome {
        traitforge::ComposeOutcome::Composed(c) => c,
        traitforge::ComposeOutcome::NothingProduced => {
            anyhow::bail!("no layers produced; nothing to write")
        }
        traitforge::ComposeOutcome::Cancelled => anyhow::bail!("composition was cancelled"),
    };

    let optimizer = if recipe.optimize.enabled {
        Some(traitforge::OptimizerHandle::spawn_default(
            Duration::from_millis(recipe.optimize.timeout_ms),
        )?)
    } else {
        None
    };
    let embed = |text: &str| -> String {
        match &optimizer {
            Some(handle) => handle.optimize(text).text,
            None => text.to_owned(),
        }
    };

    // A lone survivor is written as-is rather than wrapped in a one-image composite.
    let svg = match composite.single() {
        Some(artifact) => embed(artifact.svg()),
        None => composite.to_svg_with(|a| Cow::Owned(embed(a.svg()))),
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, svg)
        .with_context(|| format!("write svg '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} layer(s): {})",
        args.out.display(),
        composite.layers().len(),
        composite.names().join(", ")
    );
    Ok(())
}
