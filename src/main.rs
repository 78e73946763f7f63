use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_showcase::api::{self, AppState};
use portfolio_showcase::cache::{
    spawn_control, CacheStorage, ClientQueue, HttpNetwork, NotificationCenter, ResourceCache,
    Scope,
};
use portfolio_showcase::config::SiteConfig;
use portfolio_showcase::loader::{Availability, DemoLoader, HttpProbe};
use portfolio_showcase::proxy::{self, ProxyState};

#[derive(Parser)]
#[command(name = "showcase")]
#[command(about = "Serve and check a portfolio of demo applications")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the site and the project API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the built site
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
    /// Run the offline-first cache as a local proxy in front of a deployed site
    Proxy {
        /// Origin of the deployed site, e.g. https://example.github.io
        #[arg(short, long)]
        origin: String,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check which demo entry points are reachable
    Status {
        /// Base URL of the deployed site
        #[arg(short, long, default_value = "http://127.0.0.1:8080")]
        base: String,
    },
}

/// Initialize tracing; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "portfolio_showcase=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = SiteConfig::load(cli.config.as_deref());
    let registry = config.registry()?;
    let loader = DemoLoader::from_config(registry.clone(), &config.loader);

    match cli.command {
        Some(Commands::Serve { port, root }) => {
            let port = port.unwrap_or(config.port);
            let root = root.unwrap_or_else(|| config.root.clone());
            serve(loader, &config, root, port).await?;
        }
        None => {
            serve(loader, &config, config.root.clone(), config.port).await?;
        }
        Some(Commands::Proxy { origin, port }) => {
            let port = port.unwrap_or(config.port);
            let scope = Scope::new(&origin, &config.cache)
                .with_context(|| format!("Invalid origin {}", origin))?;
            let cache = ResourceCache::new(
                HttpNetwork::default(),
                CacheStorage::new(config.cache.quota_bytes),
                scope,
                config.cache.clone(),
                &registry,
            );

            match cache.install().await {
                Ok(report) => {
                    tracing::info!(
                        "Pre-cached {} shell assets and {} demos",
                        report.static_cached,
                        report.demos_cached
                    );
                    cache.activate();
                }
                Err(e) => {
                    tracing::error!("Cache install failed, proxying without cache: {}", e);
                }
            }

            let control = spawn_control(cache.clone());
            let app = proxy::proxy_router(ProxyState {
                cache,
                control,
                notifications: NotificationCenter::default(),
                clients: ClientQueue::default(),
            });

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!(
                "Offline proxy for {} listening on http://127.0.0.1:{}",
                origin,
                port
            );
            axum::serve(listener, app).await?;
        }
        Some(Commands::Status { base }) => {
            let probe = HttpProbe::new(base.clone());
            println!("Checking demos on {}...", base);
            let mut unavailable = 0;
            for key in registry.keys() {
                let status = loader.get_status(key, &probe).await;
                let label = match status.status {
                    Availability::Available => "available",
                    Availability::Unavailable => {
                        unavailable += 1;
                        "unavailable"
                    }
                };
                println!("  {:<24} {}", key, label);
            }
            if unavailable > 0 {
                anyhow::bail!("{} demo(s) unavailable", unavailable);
            }
        }
    }

    Ok(())
}

async fn serve(
    loader: DemoLoader,
    config: &SiteConfig,
    root: PathBuf,
    port: u16,
) -> anyhow::Result<()> {
    tracing::info!("Serving {} on port {}", root.display(), port);
    let state =
        AppState::for_site_root(loader, root.clone()).with_settings(config.client_settings());
    let app = api::create_router(state, root);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Portfolio listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
