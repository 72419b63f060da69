use std::process::ExitCode;

pub mod config;
use config::app_config::load_config;
pub mod console;
pub mod http_probe;
use http_probe::prelude::*;

const USAGE: &str = "usage: urlprobe <url>";

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, ConfigurationError::MissingUrl) {
                eprintln!("{USAGE}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Probe the URL given on the command line with the canonical variants.
/// Remote errors and transport failures are printed, not returned.
async fn run() -> Result<(), ConfigurationError> {
    let base_url = std::env::args()
        .nth(1)
        .ok_or(ConfigurationError::MissingUrl)?;

    let app_config = load_config()?;
    if let Some(path) = &app_config.config_file {
        log::info!("Using config file {}", path);
    }

    let client = ReqwestClient::new(&app_config.probe.user_agent)?;
    let runner = ProbeRunner::new(client, app_config.runner_options());
    let variants = canonical_variants(&app_config.probe.safe_characters);

    let results = runner.run(&base_url, &variants).await?;

    let width = console::name_width(&results);
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", console::render(result, width));
    }

    let failures = results.iter().filter(|r| r.is_transport_failure()).count();
    log::debug!(
        "Probed {} variants with timeout {:?}, {} transport failures",
        results.len(),
        runner.options().timeout,
        failures
    );

    Ok(())
}
