use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use reshelve::config;
use reshelve::organize::Engine;

/// Sort freshly downloaded movies and TV episodes into the media library.
#[derive(Parser)]
#[command(name = "reshelve", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::default_path);
    let settings = config::load(&config_path)?;

    let file_appender = tracing_appender::rolling::never(&settings.log.dir, &settings.log.file);
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Engine::new(&settings)
        .run()
        .context("Post processing run failed")
}
