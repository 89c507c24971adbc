//! waste server entrypoint.

use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waste_core::config::env_flag_enabled;
use waste_core::expiry::ExpiryPolicy;
use waste_server::expiry::spawn_expiry;
use waste_server::seeds::seed_database;
use waste_server::{resolve_bind_address, serve_router, AppState, Config, Database, DEFAULT_PORT};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    version: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--version" | "-V" => flags.version = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "waste=info,waste_server=info,waste_core=info,tower_http=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }
    if cli_flags.version {
        println!("waste {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::from_env();
    let database = Database::new(&config.db_path)?;
    let seeded = seed_database(&database)?;
    tracing::info!("Wrote {} bundled paste(s)", seeded);

    let state = AppState::new(config.clone(), database)?;

    let every = Duration::from_secs(config.expiry_interval_secs.max(1));
    let expiry = spawn_expiry(state.db.clone(), ExpiryPolicy::from_config(&config), every);

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    let bind_addr = resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - put a TLS proxy in front of it",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("waste running at http://{}", actual_addr);

    let serve_result = serve_router(listener, state, shutdown_signal()).await;
    expiry.abort();
    tracing::info!("Server stopped");

    serve_result?;
    Ok(())
}

fn print_help() {
    println!("waste paste server\n");
    println!("Usage: waste [OPTIONS]\n");
    println!("Options:");
    println!("  --help, -h        Show this help message");
    println!("  --version, -V     Show the version");
    println!("\nEnvironment variables:");
    println!("  DB_PATH               Database directory (default: ~/.cache/waste/db)");
    println!("  PORT                  Server port (default: {})", DEFAULT_PORT);
    println!("  MAX_PASTE_SIZE        Maximum paste size in bytes (default: 32MiB)");
    println!("  ID_SIZE_MIN           Minimum identifier size in bytes");
    println!("  EXPIRY_DAYS           Retention for an empty paste, in days");
    println!("  EXPIRY_SIZE_BIAS      Bytes of content per day of retention lost");
    println!("  EXPIRY_INTERVAL_SECS  Seconds between expiry sweeps");
    println!("  CANONICAL_HOST        Host used in URLs for punycode requests");
    println!("  TRUSTED_HOSTS         Comma-separated referer hosts allowed raw access");
    println!("  ALLOW_PUBLIC_ACCESS   Permit binding to non-loopback addresses");
    println!(
        "  BIND                  Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_flags, CliFlags};

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("waste")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parse_cli_flags_rejects_unknown_and_positional_arguments() {
        let cases = [
            (args(&["--force-unlock"]), "Unknown option"),
            (args(&["serve"]), "Unexpected positional argument"),
        ];

        for (argv, expected_fragment) in cases {
            let err = parse_cli_flags(&argv).expect_err("invalid args should be rejected");
            assert!(err.to_string().contains(expected_fragment));
        }
    }

    #[test]
    fn parse_cli_flags_accepts_supported_options() {
        assert_eq!(parse_cli_flags(&args(&[])).expect("no args"), CliFlags::default());
        assert_eq!(
            parse_cli_flags(&args(&["--help", "-V"])).expect("known options should parse"),
            CliFlags {
                help: true,
                version: true,
            }
        );
    }
}
