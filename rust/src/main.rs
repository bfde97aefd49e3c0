use std::io::Write;

use cmdrun::config::{parse_config, Config};
use cmdrun::support::telemetry::init_telemetry;
use cmdrun::{Invocation, Outcome, RunError, RunReport};

#[tokio::main]
async fn main() {
    let config = match parse_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[cmdrun] Error: {err}");
            std::process::exit(1);
        }
    };

    init_telemetry(config.log_level);

    let json = config.json;
    match run(config).await {
        Ok(outcome) => {
            if let Err(err) = print_outcome(&outcome, json) {
                eprintln!("[cmdrun] Error: Failed to write output: {err}");
                std::process::exit(1);
            }
        }
        Err(err) => {
            tracing::error!("Run failed: {err}");
            if json {
                print_report(&RunReport::failure(&err));
            } else {
                eprintln!("[cmdrun] Error: {err}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(config: Config) -> Result<Outcome, RunError> {
    tracing::info!("Starting...");
    tracing::info!("  - executable: {}", config.executable);
    tracing::info!("  - args: {:?}", config.args);
    tracing::info!("  - exit policy: {:?}", config.exit_policy);

    Invocation::new(config.executable, config.input, config.args)
        .envs(config.env)
        .exit_policy(config.exit_policy)
        .run()
        .await
}

fn print_outcome(outcome: &Outcome, json: bool) -> std::io::Result<()> {
    if json {
        print_report(&outcome.report());
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    match outcome {
        Outcome::Output(text) => stdout.write_all(text.as_bytes())?,
        Outcome::Success => writeln!(stdout, "true")?,
    }
    stdout.flush()
}

fn print_report(report: &RunReport) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(err) => eprintln!("[cmdrun] Error: Failed to serialize result: {err}"),
    }
}
