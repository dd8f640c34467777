mod common;
use std::env::{set_var, var};
use std::error::Error;
use std::path::Path;

use chrono::prelude::*;
use clap::{arg, command, Parser};

use common::config::models::{ProcessingMode, RunConfig};
use common::helpers::RunError;
use flies::models::table::Table;
use flies::modules::network::models::DenseNetwork;
use flies::modules::services::{
    cached::CachedSource,
    models::Services,
    prelude::{AtmosphereSource, ClimateSource, ElevationSource},
};
use flies::modules::table::functions::{process_flies_ann_table, process_flies_table};
use flies::version::LONG_VERSION;
use log::{info, trace, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    long_version=LONG_VERSION,
    about="FLiES-ANN shortwave radiation table processor",
    long_about="Estimates incoming shortwave radiation and its UV, visible and near-infrared components,
direct and diffuse, for every row of a table of site-time observations using the FLiES-ANN radiative transfer network."
)]
struct Args {
    #[arg(required = true, help = "Path to the input CSV table", index = 1)]
    input_path: String,

    #[arg(required = true, help = "Path of the output CSV table", index = 2)]
    output_path: String,

    #[arg(short, long, help = "Path to the YAML run configuration")]
    config: Option<String>,

    #[arg(short, long, help = "Path to the network weights, overrides the configuration")]
    network: Option<String>,
}

fn services(source: Option<&CachedSource>) -> Services<'_> {
    let Some(source) = source else {
        return Services::none();
    };
    Services {
        atmosphere: source
            .has_atmosphere()
            .then_some(source as &dyn AtmosphereSource),
        elevation: source
            .has_elevation()
            .then_some(source as &dyn ElevationSource),
        climate: source.has_climate().then_some(source as &dyn ClimateSource),
    }
}

fn run(args: &Args, config: &RunConfig) -> Result<(), RunError> {
    let network_path = args
        .network
        .as_ref()
        .or(config.network.as_ref())
        .ok_or("No network weights given, use --network or set network in the configuration")?;

    let c = Utc::now();
    let network = DenseNetwork::from_file(network_path)
        .map_err(|err| format!("Could not load network {}: {}", network_path, err))?;
    trace!("Loading network took {} seconds", Utc::now() - c);

    let table = Table::from_path(&args.input_path)
        .map_err(|err| format!("Could not read input table {}: {}", args.input_path, err))?;
    info!(
        "Processing {} rows from {} in {:?} mode",
        table.n_rows(),
        args.input_path,
        config.mode
    );

    let result = match config.mode {
        ProcessingMode::Strict => {
            if !config.cache.is_empty() {
                warn!("Cached services are ignored in strict mode");
            }
            process_flies_table(&table, &network)?
        }
        ProcessingMode::Retrieve => {
            let source = config.cache.load()?;
            process_flies_ann_table(&table, &network, services(source.as_ref()), &config.defaults)?
        }
    };

    let c = Utc::now();
    result
        .to_path(&args.output_path)
        .map_err(|err| format!("Could not write output table {}: {}", args.output_path, err))?;
    trace!("Writing output took {} seconds", Utc::now() - c);
    info!("Written {} rows to {}", result.n_rows(), args.output_path);
    Ok(())
}

/// main function
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if var("RUST_LOG").is_err() {
        set_var("RUST_LOG", "info")
    }
    pretty_env_logger::init();

    let config = match &args.config {
        Some(config_path) => {
            if !Path::new(config_path).is_file() {
                return Err(format!("Config file {} is not a file", config_path).into());
            }
            RunConfig::from_file(config_path)
                .map_err(|err| format!("Failed to load config: {}", err))?
        }
        None => RunConfig::default(),
    };

    let start_time = Utc::now();
    run(&args, &config)?;

    let elapsed_time = Utc::now() - start_time;
    info!("Elapsed time: {} seconds", elapsed_time.num_seconds());
    Ok(())
}
