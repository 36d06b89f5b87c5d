use anyhow::{Context, Result};
use choropleth::assets::{AssetSource, DirectorySource};
use choropleth::{ClusteringMode, FeatureCollection, RenderOptions, infer, map_types, rows};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "choropleth",
    version,
    about = "Join query results to map regions and classify them into color buckets"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a choropleth layer (styles, tooltips, legend) as JSON.
    Render(RenderArgs),
    /// Guess which region property a code column refers to.
    Infer(InferArgs),
    /// List the supported map types and their code types.
    MapTypes,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Clustering {
    Quantile,
    Equidistant,
    Kmeans,
}

impl From<Clustering> for ClusteringMode {
    fn from(c: Clustering) -> Self {
        match c {
            Clustering::Quantile => ClusteringMode::Quantile,
            Clustering::Equidistant => ClusteringMode::Equidistant,
            Clustering::Kmeans => ClusteringMode::Kmeans,
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Query rows (.csv or .json).
    #[arg(long)]
    rows: PathBuf,
    /// GeoJSON feature collection. If omitted, the map type's asset is read from --assets.
    #[arg(long)]
    geo: Option<PathBuf>,
    /// Directory holding the map type assets (e.g. countries.geo.json).
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// Options JSON; flags below override it.
    #[arg(long)]
    options: Option<PathBuf>,
    #[arg(long)]
    map_type: Option<String>,
    /// Column holding the region code.
    #[arg(long)]
    code_column: Option<String>,
    /// Region property the codes refer to (iso_a2, iso_a3, name, ...).
    #[arg(long)]
    code_type: Option<String>,
    /// Column holding the numeric value.
    #[arg(long)]
    value_column: Option<String>,
    #[arg(long, value_enum)]
    clustering: Option<Clustering>,
    /// Number of color buckets.
    #[arg(long)]
    steps: Option<usize>,
    /// Detect the code type from the data (keeps the configured one if unsure).
    #[arg(long, default_value_t = false)]
    infer_code_type: bool,
    /// Write the result here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InferArgs {
    /// Query rows (.csv or .json).
    #[arg(long)]
    rows: PathBuf,
    /// Column holding the region code.
    #[arg(short, long)]
    column: String,
    #[arg(long, default_value = "countries")]
    map_type: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Infer(args) => cmd_infer(args),
        Command::MapTypes => {
            for m in map_types::all() {
                let codes: Vec<&str> = m.code_types().iter().map(|c| c.key).collect();
                println!("{:<24} {:<24} {:<40} {}", m.id, m.label, m.asset, codes.join(","));
            }
            Ok(())
        }
    }
}

fn build_options(args: &RenderArgs) -> Result<RenderOptions> {
    let mut options = match args.options.as_ref() {
        Some(p) => RenderOptions::load_from_file(p)
            .with_context(|| format!("failed to read options from {}", p.display()))?,
        None => RenderOptions::default(),
    };
    if let Some(v) = &args.map_type {
        options.map_type = v.clone();
    }
    if let Some(v) = &args.code_column {
        options.code_column = v.clone();
    }
    if let Some(v) = &args.code_type {
        options.code_type = v.clone();
    }
    if let Some(v) = &args.value_column {
        options.value_column = v.clone();
    }
    if let Some(c) = args.clustering {
        options.clustering_mode = c.into();
    }
    if let Some(s) = args.steps {
        options.steps = s;
    }
    options.validate()?;
    Ok(options)
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut options = build_options(&args)?;
    let rows = rows::load_rows(&args.rows)
        .with_context(|| format!("failed to read rows from {}", args.rows.display()))?;

    if args.infer_code_type {
        infer::resolve_code_type(&mut options, &rows);
    }

    let collection: FeatureCollection = match &args.geo {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid GeoJSON in {}", path.display()))?
        }
        None => {
            let Some(entry) = map_types::lookup(&options.map_type) else {
                anyhow::bail!("unknown map type: {}", options.map_type);
            };
            if !entry.supports_code_type(&options.code_type) {
                let known: Vec<&str> = entry.code_types().iter().map(|c| c.key).collect();
                eprintln!(
                    "warning: code type `{}` is not a property of {} regions (expected one of: {}); no region will match",
                    options.code_type,
                    entry.id,
                    known.join(", ")
                );
            }
            DirectorySource::new(args.assets.clone()).fetch(entry.asset)?
        }
    };

    let out = choropleth::render_layer(&collection, &rows, &options)?;
    let json = serde_json::to_string_pretty(&out)?;
    match args.out.as_ref() {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!(
                "Wrote {} features ({} with data) to {}",
                out.features.len(),
                out.scale.samples,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_infer(args: InferArgs) -> Result<()> {
    let rows = rows::load_rows(&args.rows)
        .with_context(|| format!("failed to read rows from {}", args.rows.display()))?;
    match infer::infer_code_type(&args.map_type, &rows, &args.column) {
        Some(key) => println!("{key}"),
        None => println!("none"),
    }
    Ok(())
}
