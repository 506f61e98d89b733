//! Command line

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::config::HostConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Speech and sound alerts to a braille display unit")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial device of the display unit
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Classifier prediction stream (file or named pipe)
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Apply command line overrides on top of the file configuration
    pub fn apply(&self, config: &mut HostConfig) {
        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud = baud;
        }
        if let Some(feed) = &self.feed {
            config.alert.feed = Some(feed.clone());
        }
    }

    /// Log filter: `-v` flags win, then `RUST_LOG`, then `info`
    pub fn env_filter(&self) -> EnvFilter {
        match self.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["braille-host", "-p", "/dev/ttyUSB0", "--feed", "/tmp/p", "-vv"]);
        let mut config = HostConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud, 115_200);
        assert_eq!(config.alert.feed, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
