use anyhow::{bail, Context, Result};
use campus_geofence::location::providers::DynGeocoder;
use campus_geofence::server::{self, AppState};
use campus_geofence::{
    AppConfig, Catalog, CatalogSource, GeofenceCache, GeofenceResolver, NominatimClient, Sampler,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Campus Geofence: resolve campus addresses and pick event locations.
///
/// Examples:
///   geofence resolve "1826 University Ave, Charlottesville, VA 22904"
///   geofence build --output locations.json
///   geofence pick -n 5 --catalog locations.json
///   geofence serve --port 3000
#[derive(Parser)]
#[command(name = "geofence", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Offline mode: only use the geocode cache.
    #[arg(long, global = true)]
    offline: bool,

    /// Skip the geocode cache entirely.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one address into a geofence (JSON on stdout).
    Resolve {
        address: String,
    },

    /// Resolve every catalog address and write the resolved catalog.
    Build {
        /// Catalog JSON; defaults to the built-in campus table.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print N category-diverse random picks.
    Pick {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Seed for a reproducible sequence.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Serve random picks over HTTP.
    Serve {
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration; using defaults");
        AppConfig::default()
    });
    let mut resolver = build_resolver(&cfg, &cli);

    match cli.command {
        Commands::Resolve { address } => {
            let fence = resolver
                .resolve(&address)
                .with_context(|| format!("cannot resolve '{}'", address))?;
            println!("{}", serde_json::to_string_pretty(&fence)?);
        }

        Commands::Build { catalog, output } => {
            let catalog = load_catalog(catalog, &cfg, &mut resolver)?;
            let json = serde_json::to_string_pretty(&catalog.to_source())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    info!(path = %path.display(), locations = catalog.len(), "catalog written");
                }
                None => println!("{}", json),
            }
        }

        Commands::Pick { catalog, count, seed } => {
            let catalog = Arc::new(load_catalog(catalog, &cfg, &mut resolver)?);
            let mut sampler = match seed {
                Some(seed) => Sampler::seeded(catalog, seed),
                None => Sampler::with_entropy(catalog),
            };

            for i in 1..=count {
                let pick = sampler.pick()?;
                eprintln!(
                    "  Pick {}: {} [{}] @ {:.5}, {:.5} r={:.3} km",
                    i,
                    pick.name,
                    pick.category,
                    pick.coordinates.latitude,
                    pick.coordinates.longitude,
                    pick.radius,
                );
                println!("{}", serde_json::to_string_pretty(&pick)?);
            }
        }

        Commands::Serve { catalog, host, port, seed } => {
            let catalog = Arc::new(load_catalog(catalog, &cfg, &mut resolver)?);
            let sampler = match seed {
                Some(seed) => Sampler::seeded(Arc::clone(&catalog), seed),
                None => Sampler::with_entropy(Arc::clone(&catalog)),
            };
            let state = Arc::new(AppState::new(catalog, sampler, resolver));

            let host = host.unwrap_or_else(|| cfg.host().to_string());
            let port = port.unwrap_or_else(|| cfg.port());
            let runtime = tokio::runtime::Runtime::new().context("cannot start tokio runtime")?;
            runtime
                .block_on(server::start(&host, port, state))
                .with_context(|| format!("server on {}:{} failed", host, port))?;
        }
    }

    Ok(())
}

fn build_resolver(cfg: &AppConfig, cli: &Cli) -> GeofenceResolver<DynGeocoder> {
    let geocoder: DynGeocoder = Box::new(NominatimClient::from_config(cfg));
    let mut resolver = if cli.no_cache {
        GeofenceResolver::new(geocoder)
    } else {
        GeofenceResolver::with_cache(geocoder, GeofenceCache::load_from(cfg.cache_path(), cfg.cache_ttl_days()))
    };
    resolver.set_offline(cli.offline);
    resolver
}

/// Load the catalog document and resolve its addresses.
fn load_catalog(
    path: Option<PathBuf>,
    cfg: &AppConfig,
    resolver: &mut GeofenceResolver<DynGeocoder>,
) -> Result<Catalog> {
    let source = match path.or_else(|| cfg.catalog_path()) {
        Some(path) => CatalogSource::from_path(&path)?,
        None => CatalogSource::embedded()?,
    };
    let pending = source.unresolved_count();
    if pending > 0 {
        info!(addresses = pending, "resolving catalog addresses");
    }

    let build = Catalog::build(source, |address| resolver.resolve(address));
    for missing in &build.unresolved {
        eprintln!("  \u{26A0}\u{FE0F}  {} / {}: {}", missing.category, missing.name, missing.reason);
    }
    if build.catalog.is_empty() {
        bail!("no catalog location could be resolved");
    }
    Ok(build.catalog)
}
