use clap::{Parser, Subcommand};
use comic_shelf::catalog::CatalogStore;
use comic_shelf::config::{self, SiteConfig};
use comic_shelf::generate::MaudRenderer;
use comic_shelf::imaging::RustBackend;
use comic_shelf::output;
use comic_shelf::pipeline::{Pipeline, PipelineError, PublishMode, SiteLayout};
use comic_shelf::scan::LocalDir;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "comic-shelf")]
#[command(about = "Static site builder for a webcomic archive")]
#[command(long_about = "\
Static site builder for a webcomic archive

Drop comic images into the source directory and run 'comic-shelf build'.
New files are added to the catalog with their creation time, published
into the assets directory, and rendered as pages ordered oldest first.

Layout (defaults):

  comics/                 # Source images (png, jpg, jpeg, gif, webp)
  comics.toml             # Optional site config
  index.json              # Catalog: filename, createdAt, width, height
  docs/
  ├── index.html          # Every comic, newest first
  ├── _images/            # Published images
  └── first-strip/
      └── index.html      # One page per comic with previous/next links

A comic's place in the archive is fixed when it is first cataloged;
touching or re-copying the file later does not move it.

Run 'comic-shelf gen-config' to print a documented comics.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding the comic images
    #[arg(long, default_value = "comics", global = true)]
    source: PathBuf,

    /// Catalog file
    #[arg(long, default_value = "index.json", global = true)]
    catalog: PathBuf,

    /// Output directory for the generated site
    #[arg(long, default_value = "docs", global = true)]
    output: PathBuf,

    /// Site config file (optional)
    #[arg(long, default_value = "comics.toml", global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: catalog → publish images → render pages
    Build {
        /// Copy originals instead of re-encoding them
        #[arg(long)]
        no_compress: bool,
    },
    /// Add new comics to the catalog and fill in missing dimensions
    Sync,
    /// Publish cataloged images not yet in the output
    Publish,
    /// Render pages from the catalog
    Generate,
    /// Show what a build would change without writing anything
    Check,
    /// Print a stock comics.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.config).map_err(PipelineError::from)?;
    init_thread_pool(&site_config.processing);
    let pipeline = build_pipeline(&cli, &site_config);

    match cli.command {
        Command::Build { no_compress } => {
            let pipeline = if no_compress {
                pipeline.with_publish_mode(PublishMode::Copy)
            } else {
                pipeline
            };
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = pipeline.build()?;
            output::print_build_report(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Sync => {
            let report = pipeline.sync()?;
            output::print_sync_report(&report);
        }
        Command::Publish => {
            let report = pipeline.publish()?;
            output::print_publish_report(&report);
        }
        Command::Generate => {
            let report = pipeline.render_site()?;
            output::print_render_report(&report);
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = pipeline.check()?;
            output::print_check_output(&report);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

fn build_pipeline(
    cli: &Cli,
    site_config: &SiteConfig,
) -> Pipeline<LocalDir, RustBackend, MaudRenderer> {
    Pipeline::new(
        LocalDir::new(&cli.source),
        CatalogStore::new(&cli.catalog),
        RustBackend::new(),
        MaudRenderer::new(site_config),
        SiteLayout::from_config(site_config, &cli.output),
    )
    .with_publish_mode(PublishMode::from_config(&site_config.compression))
}

/// Send diagnostics to stderr. `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "comic_shelf=warn",
        1 => "comic_shelf=info",
        _ => "comic_shelf=debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
