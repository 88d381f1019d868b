mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use novoscore::SpectrumBatch;
use novoscore::data_sources::read_database_file;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::{
    Config,
    InputConfig,
    OutputConfig,
};
use processing::SharedTables;

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();

    let conf = match std::fs::File::open(args.config.clone()) {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::Io {
                source: e.to_string(),
                path: Some(args.config.to_string_lossy().to_string()),
            });
        }
    };
    let config: Result<Config, _> = serde_json::from_reader(conf);
    let mut config = match config {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::ParseError { msg: e.to_string() });
        }
    };

    // Override config with command line arguments if provided
    if let Some(spectra) = args.input {
        let database = config.input.as_ref().and_then(|x| x.database.clone());
        config.input = Some(InputConfig { spectra, database });
    }
    if let Some(database) = args.database {
        match config.input.as_mut() {
            Some(input) => input.database = Some(database),
            None => {
                return Err(errors::CliError::Config {
                    source: "A database file was given but no spectrum batch".to_string(),
                });
            }
        }
    }
    if let Some(output_dir) = args.output_dir {
        config.output = Some(OutputConfig {
            directory: output_dir,
        });
    }

    let input = config.input.clone().ok_or_else(|| errors::CliError::Config {
        source: "No input provided, please provide one in either the config file or with the --input flag".to_string(),
    })?;
    let output_config = config.output.clone().ok_or_else(|| errors::CliError::Config {
        source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
    })?;
    info!("Parsed configuration: {:#?}", config);

    std::fs::create_dir_all(&output_config.directory).map_err(|e| errors::CliError::Io {
        source: e.to_string(),
        path: Some(output_config.directory.to_string_lossy().to_string()),
    })?;

    let tables = SharedTables::new(&config.analysis)?;
    let database = match input.database {
        Some(ref path) => read_database_file(path, &tables.residues, &tables.scale)?,
        None => Vec::new(),
    };
    let batch = SpectrumBatch::from_file(&input.spectra)?;

    processing::process_batch(batch, &config.analysis, &database, &tables, &output_config)
}
