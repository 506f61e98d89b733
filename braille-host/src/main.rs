use std::sync::Arc;
use std::time::Instant;

use braille_core::Link;
use braille_host::{
    spawn_prediction_feed, AlertMailbox, AlertPolicy, Alphabet, BrailleText, Cli,
    ConsoleCapture, Host, HostConfig, SerialUart,
};
use clap::Parser;
use eyre::WrapErr;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.env_filter())
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => HostConfig::default(),
    };
    cli.apply(&mut config);
    tracing::debug!(?config, "configuration");

    let uart = SerialUart::open(&config.port, config.baud)
        .wrap_err("failed to open the display unit link")?;

    let mailbox = Arc::new(AlertMailbox::new());
    if let Some(feed) = &config.alert.feed {
        spawn_prediction_feed(
            feed.clone(),
            AlertPolicy::new(config.alert.clone()),
            mailbox.clone(),
        )
        .wrap_err("failed to start the prediction feed")?;
        tracing::info!(feed = %feed.display(), "following classifier predictions");
    }

    let mut host = Host::new(
        &config,
        Link::new(uart),
        BrailleText::new(Alphabet, Alphabet),
        ConsoleCapture::stdin(),
        mailbox,
        Instant::now(),
    );
    host.run()
}
