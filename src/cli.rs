//! Command-line entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::RouteWeatherConfig;
use crate::report;
use crate::route_evaluator::{EvaluationMode, RouteEvaluator};
use crate::weather::{AccuWeatherClient, WeatherApi};
use crate::{bot, telemetry, web};

#[derive(Parser, Debug)]
#[command(
    name = "route-weather",
    about = "Weather assessment for travel routes: web dashboard, chat bot and CLI",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server (default command)
    Serve(ServeArgs),
    /// Run the Telegram bot
    Bot,
    /// Evaluate a route and print the result
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Cities along the route, in travel order
    #[arg(required = true, num_args = 2..)]
    pub cities: Vec<String>,
    /// Use the daily forecast for this many days instead of current conditions
    #[arg(long, value_name = "DAYS")]
    pub forecast: Option<usize>,
}

impl CheckArgs {
    fn mode(&self) -> EvaluationMode {
        match self.forecast {
            Some(days) => EvaluationMode::Forecast { days },
            None => EvaluationMode::Current,
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = RouteWeatherConfig::load_from_path(cli.config)?;
    telemetry::init(&config.logging)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            config.require_api_key()?;
            web::run(&config).await
        }
        Command::Bot => {
            config.require_api_key()?;
            bot::run(&config).await
        }
        Command::Check(args) => check(&config, &args).await,
    }
}

async fn check(config: &RouteWeatherConfig, args: &CheckArgs) -> Result<()> {
    config.require_api_key()?;
    let api: Arc<dyn WeatherApi> = Arc::new(AccuWeatherClient::new(&config.provider)?);
    let evaluator = RouteEvaluator::new(api, config.assessment.clone());

    let outcome = evaluator.evaluate_cities(&args.cities, args.mode()).await;
    if let Some(message) = report::failure_message(&outcome) {
        anyhow::bail!(message);
    }

    let (start, end) = match (args.cities.first(), args.cities.last()) {
        (Some(start), Some(end)) => (start.as_str(), end.as_str()),
        _ => ("", ""),
    };
    println!("{}", report::route_text(start, end, &outcome));
    println!(
        "Route is {}",
        if outcome.is_favorable() {
            "favorable"
        } else {
            "not favorable"
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::parse_from(["route-weather", "check", "Paris", "Berlin", "--forecast", "5"]);
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.cities, vec!["Paris", "Berlin"]);
        assert_eq!(args.mode(), EvaluationMode::Forecast { days: 5 });
    }

    #[test]
    fn test_check_needs_two_cities() {
        assert!(Cli::try_parse_from(["route-weather", "check", "Paris"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["route-weather", "serve", "--port", "9000", "--config", "a.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve command");
        };
        assert_eq!(args.port, Some(9000));
    }
}
