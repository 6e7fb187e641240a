use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iaas_console::app::Console;
use iaas_console::config::ConsoleConfig;
use iaas_console::session::FileStorage;
use iaas_console::surface::PageSurface;
use iaas_console::version::VERSION;

/// Renders a one-shot snapshot of the IaaS console against a live backend.
///
/// Runs the same bootstrap sequence the web shell runs, then writes the
/// fully rendered dashboard page to a file. Useful for reports, smoke
/// checks, and debugging what the backend is actually serving.
#[derive(Parser, Debug)]
#[command(name = "snapshot", version = VERSION)]
struct Args {
    /// Path to a TOML config file; environment variables are used when omitted.
    #[arg(long)]
    config: Option<String>,
    /// Output path for the rendered page.
    #[arg(long, default_value = "console-snapshot.html")]
    output: String,
}

fn init_logging(log_dir: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            // Log to a file: JSON format, daily rotation
            let file_appender = rolling::daily(dir, "console.log");
            let file_layer = fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(fmt::layer().with_writer(std::io::stdout))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stdout))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::from_env()?,
    };
    init_logging(config.log_dir.as_deref());
    info!(api = %config.api_base_url, "rendering console snapshot");

    let storage = Box::new(FileStorage::open(&config.storage_path));
    let mut console = Console::new(&config, storage, PageSurface::new());
    console.initialize().await;

    let surface = console.into_surface();
    if surface.login_redirected() {
        error!("no valid session token; log in through the web console first");
        std::process::exit(1);
    }

    std::fs::write(&args.output, surface.render_page())?;
    info!(output = %args.output, "snapshot written");
    Ok(())
}
