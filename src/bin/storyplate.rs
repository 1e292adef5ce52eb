use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storyplate::geo::polyline;

#[derive(Parser, Debug)]
#[command(name = "storyplate", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a story state (optionally over a template page) to a PNG.
    Export(ExportArgs),
    /// Decode an encoded polyline and print the points as JSON.
    DecodePolyline(DecodeArgs),
    /// Check a template file and print a short summary.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Story state JSON. Defaults are used when omitted.
    #[arg(long)]
    story: Option<PathBuf>,

    /// Template JSON whose page is drawn as content.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Page id inside the template (first page by default).
    #[arg(long)]
    page: Option<String>,

    /// Encoded route polyline.
    #[arg(long)]
    polyline: Option<String>,

    /// Output aspect ratio: 9:16 or 4:5.
    #[arg(long, default_value = "9:16")]
    format: String,

    /// Config JSON (fonts, safe area, logos, cache size).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory asset URLs resolve against. Overrides the config.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Upper bound on load/render rounds before writing.
    #[arg(long, default_value_t = 16)]
    max_rounds: usize,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Encoded polyline.
    encoded: String,

    /// Decimal precision.
    #[arg(long, default_value_t = polyline::DEFAULT_PRECISION)]
    precision: u32,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Template JSON.
    template: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storyplate=info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::DecodePolyline(args) => cmd_decode(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_story_json(path: &Path) -> anyhow::Result<storyplate::StoryState> {
    let f = File::open(path).with_context(|| format!("open story '{}'", path.display()))?;
    let r = BufReader::new(f);
    let state: storyplate::StoryState =
        serde_json::from_reader(r).with_context(|| "parse story state JSON")?;
    Ok(state)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(p) => storyplate::StoryplateConfig::from_path(p)?,
        None => storyplate::StoryplateConfig {
            image_cache: storyplate::ImageCacheOpts::from_env(),
            ..Default::default()
        },
    };
    let format = storyplate::PageFormat::from_ratio(&args.format)?;

    let state = match &args.story {
        Some(p) => read_story_json(p)?,
        None => storyplate::StoryState::default(),
    };

    let page = match &args.template {
        Some(p) => {
            let template = storyplate::Template::from_path(p)?;
            template.validate()?;
            let page = match &args.page {
                Some(id) => template
                    .page(id)
                    .with_context(|| format!("template has no page '{id}'"))?,
                None => template
                    .pages
                    .first()
                    .context("template has no pages")?,
            };
            Some(page.clone())
        }
        None => None,
    };

    let assets_root = args
        .assets
        .clone()
        .or_else(|| config.assets_root.clone())
        .or_else(|| {
            args.story
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));

    let cache = storyplate::ImageCache::new(
        storyplate::FsLoader::new(assets_root),
        config.image_cache,
    );
    let compositor = storyplate::Compositor::new(config.compositor.clone());
    let mut session = storyplate::ExportSession::new(
        storyplate::StoryStore::new(state),
        cache,
        compositor,
        storyplate::ExportSessionOpts::default().with_format(format),
    );
    if let Some(encoded) = &args.polyline {
        // a bad polyline is logged by the session and the story renders without a route
        let _ = session.set_polyline(encoded);
    }
    session.set_page(page);
    session.settle(args.max_rounds)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    session.write_png(&args.out)?;

    let stats = session.stats();
    tracing::info!(renders = stats.renders, "export finished");
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let points = polyline::decode(&args.encoded, args.precision)?;
    let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.lat, p.lng]).collect();
    println!("{}", serde_json::to_string(&pairs)?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = storyplate::Template::from_path(&args.template)?;
    template.validate()?;
    let elements: usize = template
        .pages
        .iter()
        .map(|p| {
            let mut n = 0usize;
            p.walk(&mut |_| n += 1);
            n
        })
        .sum();
    println!(
        "{}: {} page(s), {} element(s)",
        template.id,
        template.pages.len(),
        elements
    );
    Ok(())
}
