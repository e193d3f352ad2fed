use std::io::BufRead;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use frontend::api::{CourseApi, HttpCourseApi, InMemoryCourseApi};
use frontend::config::ClientConfig;
use frontend::logging;
use frontend::shell::Shell;

#[derive(Parser)]
#[command(name = "frontend")]
#[command(version, about = "Course enrollment front end for the enrollment service", long_about = None)]
struct Cli {
    /// Base URL of the enrollment service (overrides ENROLLMENT_API_URL)
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    /// Run against an in-process service instead of the network
    #[arg(long)]
    offline: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let api: Arc<dyn CourseApi> = if cli.offline {
        info!("running offline against an in-memory service");
        Arc::new(InMemoryCourseApi::new())
    } else {
        let config = match &cli.base_url {
            Some(url) => ClientConfig::new(url)?,
            None => ClientConfig::new_from_env()?,
        };
        let api = HttpCourseApi::new(config)?;
        info!("using enrollment service at {}", api.base_url());
        Arc::new(api)
    };

    // a blocking stdin read cannot be cancelled, so keep it off the runtime
    let (tx, rx) = mpsc::channel(32);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    Shell::new(api).run(rx).await;
    Ok(())
}
