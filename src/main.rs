use clap::Parser;
use signgate::GateConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Checks whether a file carries a valid embedded signature from an
/// allow-listed publisher.
#[derive(Parser)]
#[command(name = "signgate", version, about)]
struct Cli {
    /// File to verify
    path: String,

    /// TOML file with the allowed publisher prefixes; defaults to the
    /// built-in list when omitted
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the extracted signature details before the decision
    #[arg(long)]
    details: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match GateConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("signgate: {err}");
                return ExitCode::from(2);
            }
        },
        None => GateConfig::default(),
    };

    run(&cli, &config)
}

#[cfg(windows)]
fn run(cli: &Cli, config: &GateConfig) -> ExitCode {
    if cli.details {
        match signgate::extract_signature_info(&cli.path) {
            Ok(info) => println!("{info}\n"),
            Err(err) => eprintln!("signgate: {err}"),
        }
    }

    if signgate::is_trusted_signed_file(&cli.path, &config.allow_list()) {
        println!("{}: trusted publisher", cli.path);
        ExitCode::SUCCESS
    } else {
        println!("{}: untrusted", cli.path);
        ExitCode::FAILURE
    }
}

#[cfg(not(windows))]
fn run(_cli: &Cli, _config: &GateConfig) -> ExitCode {
    eprintln!("signgate: embedded-signature verification requires the Windows trust subsystem");
    ExitCode::from(2)
}
