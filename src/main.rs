use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use feedgate::core::log::init_logging;
use feedgate::core::{CarbonInput, ProviderId};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for feedgate::AppCommand {
    fn from(cmd: Commands) -> feedgate::AppCommand {
        match cmd {
            Commands::Fetch { provider, params } => {
                feedgate::AppCommand::Fetch { provider, params }
            }
            Commands::Carbon {
                electricity_kwh,
                natural_gas_therms,
                fuel_liters,
                flights_km,
                json,
            } => feedgate::AppCommand::Carbon {
                input: CarbonInput {
                    electricity_kwh,
                    natural_gas_therms,
                    fuel_liters,
                    flights_km,
                },
                json,
            },
            Commands::Providers => feedgate::AppCommand::Providers,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch from one provider, e.g. `fetch weather lat=-1.29 lon=36.82`
    Fetch {
        #[arg(value_enum)]
        provider: ProviderId,
        /// Query parameters as key=value
        params: Vec<String>,
    },
    /// Estimate a carbon footprint from monthly usage
    Carbon {
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        electricity_kwh: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        natural_gas_therms: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        fuel_liters: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        flights_km: f64,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List providers with their resolved settings
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => feedgate::cli::setup::setup_at_path(path),
            None => feedgate::cli::setup::setup(),
        },
        Some(cmd) => feedgate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
