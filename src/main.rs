//! nvbind - inspect and control NVIDIA GPUs through NVML
//!
//! A command-line front end for the nvbind library.

use clap::Parser;
use nvbind::cli::args::{generate_completions, Cli, Commands};
use nvbind::commands::{
    open_library, run_clocks, run_compute_mode, run_ecc, run_fan, run_info, run_list,
    run_persistence, run_power, run_processes, run_version, run_video, with_session,
};
use nvbind::config::{Config, ConfigBuilder};
use nvbind::error::{AppError, NvmlError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| {
        // Set log level based on verbose flag or config
        if config.general.verbose {
            log::set_max_level(log::LevelFilter::Debug);
        }
        run(&cli, &config)
    });

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let config = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_env()
        .with_verbose(cli.verbose.then_some(true))
        .with_library_path(cli.library.clone())
        .build();
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    if let Commands::Completions { shell } = &cli.command {
        generate_completions(*shell);
        return Ok(());
    }

    let lib = open_library(config)?;
    with_session(lib, config, |nvml| match &cli.command {
        Commands::List => run_list(nvml, cli.format),

        Commands::Info(args) => run_info(nvml, args, cli.format, cli.gpu),

        Commands::Version => run_version(nvml, cli.format),

        Commands::Processes(args) => run_processes(nvml, args, cli.format, cli.gpu),

        Commands::ComputeMode(args) => run_compute_mode(nvml, args, cli.format, cli.gpu),

        Commands::Persistence(args) => run_persistence(nvml, args, cli.format, cli.gpu),

        Commands::Power(args) => run_power(nvml, args, cli.format, cli.gpu),

        Commands::Fan(args) => run_fan(nvml, args, cli.format, cli.gpu),

        Commands::Clocks(args) => run_clocks(nvml, args, cli.format, cli.gpu),

        Commands::Ecc(args) => run_ecc(nvml, args, cli.format, cli.gpu),

        Commands::Video => run_video(nvml, cli.format, cli.gpu),

        Commands::Completions { .. } => Ok(()),
    })
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Nvml(NvmlError::LibraryLoad { .. }) => {
            eprintln!();
            eprintln!("Hint: Make sure the NVIDIA driver is installed.");
            eprintln!("      Use --library or NVBIND_LIBRARY to point at libnvidia-ml directly.");
        }
        AppError::Nvml(NvmlError::NoPermission) => {
            eprintln!();
            eprintln!("Hint: Try running with sudo or as root.");
        }
        AppError::Nvml(e) if e.is_unsupported() => {
            eprintln!();
            eprintln!("Hint: This GPU or driver does not provide that operation.");
        }
        AppError::NoGpusFound => {
            eprintln!();
            eprintln!("Hint: Make sure you have an NVIDIA GPU installed.");
            eprintln!("      Check 'nvidia-smi' for GPU detection.");
        }
        _ => {}
    }
}
