use clap::{Parser, Subcommand};
use curio::{assemble, catalog, config, resolve};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Static site generator for curated catalogs of creative works")]
#[command(long_about = "\
Static site generator for curated catalogs of creative works

One YAML record per work is the data source. A build resolves every record's
remote assets and produces a deployable static site.

Content structure:

  content/
  ├── config.toml              # Site config (optional, sparse overrides)
  ├── works/
  │   ├── alpha.yaml           # One record per cataloged work
  │   └── beta.yaml
  ├── data/
  │   ├── type.yaml            # Shared vocabulary of type labels
  │   └── download.yaml        # Alias table pre-seeding known downloads
  ├── static/                  # Copied verbatim to the output root
  └── manual/                  # Manual archives (*.zip) to extract

A build clears the output directory, copies statics, renders index and 404
pages, fetches cover images and translation text, and unpacks manuals.
Covers shared between works are fetched once; items without localized text
get it scraped from the configured translation cache.

Run 'curio gen-config' to print a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full build: clear output, resolve assets, render, fetch
    Build,
    /// Load and resolve the catalog without touching network or output
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            let summary = assemble::build(&cli.source, &cli.output, &config).await?;
            println!(
                "Built {} works, {} translations, {} downloads, {} archives → {}",
                summary.works,
                summary.translates,
                summary.downloads,
                summary.archives,
                cli.output.display()
            );
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            let loaded = catalog::load(&cli.source.join("works"), &cli.source.join("data"))?;
            let mut works = loaded.works;
            let resolved =
                resolve::resolve(&mut works, loaded.downloads, &config.translation_cache);
            println!(
                "{} works, {} type labels",
                works.len(),
                loaded.types.len()
            );
            println!(
                "{} pending downloads, {} pending translations",
                resolved.downloads.len(),
                resolved.translates.len()
            );
            println!("Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "curio=info",
        1 => "curio=debug",
        _ => "curio=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
