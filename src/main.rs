use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use smokewatch::config::{MalformedPolicy, Settings};
use smokewatch::duration::parse_duration;
use smokewatch::transport::amqp::{self, AmqpSink};
use smokewatch::{console, replay, Consumer, CsvSource, Publisher, SampleSource, SensorMonitor};
use smokewatch_types::Sensor;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smokewatch")]
#[command(about = "Stream smoker and food temperatures over RabbitMQ and alert on drops and stalls")]
struct Args {
    /// Path to a TOML config file (optional)
    #[arg(short, long, default_value = "smokewatch.toml", global = true)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish readings from a CSV file onto the sensor queues
    Emit {
        /// CSV file with Time (UTC), Channel1, Channel2, Channel3 columns
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Pause after each row (e.g. "30s", "0s")
        #[arg(short, long, value_parser = parse_duration)]
        interval: Option<Duration>,

        /// AMQP URI of the broker
        #[arg(long)]
        url: Option<String>,

        /// Don't offer to open the RabbitMQ console
        #[arg(long)]
        no_prompt: bool,
    },

    /// Consume the sensor queues and raise alerts
    Listen {
        /// AMQP URI of the broker
        #[arg(long)]
        url: Option<String>,

        /// What to do with a record that cannot be decoded
        #[arg(long, value_enum)]
        on_malformed: Option<MalformedPolicy>,
    },

    /// Evaluate a CSV file offline through in-process queues
    Replay {
        /// CSV file with Time (UTC), Channel1, Channel2, Channel3 columns
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Pause after each row
        #[arg(short, long, default_value = "0s", value_parser = parse_duration)]
        interval: Duration,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut settings = Settings::load(Some(args.config.as_path()))?;

    match args.command {
        Command::Emit {
            csv,
            interval,
            url,
            no_prompt,
        } => {
            if let Some(csv) = csv {
                settings.emitter.csv = csv;
            }
            if let Some(interval) = interval {
                settings.emitter.interval = interval;
            }
            if let Some(url) = url {
                settings.amqp.url = url;
            }
            if no_prompt {
                settings.amqp.offer_console = false;
            }
            run_emit(&settings)
        }
        Command::Listen { url, on_malformed } => {
            if let Some(url) = url {
                settings.amqp.url = url;
            }
            if let Some(policy) = on_malformed {
                settings.monitor.on_malformed = policy;
            }
            run_listen(&settings)
        }
        Command::Replay { csv, interval } => {
            if let Some(csv) = csv {
                settings.emitter.csv = csv;
            }
            run_replay(&settings, interval)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Publish the CSV rows onto RabbitMQ
fn run_emit(settings: &Settings) -> Result<()> {
    if settings.amqp.offer_console && io::stdin().is_terminal() {
        console::offer(&settings.amqp.console_url)?;
    }

    let mut source = CsvSource::new(&settings.emitter.csv);
    let rows = source.rows()?;
    info!(source = source.description(), rows = rows.len(), "Loaded readings");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let sink = AmqpSink::connect(&settings.amqp.url, settings.queues.clone()).await?;
        let mut publisher = Publisher::new(sink, settings.emitter.interval);
        info!(interval = ?publisher.interval(), "Publishing");
        let sent = publisher.run(rows).await?;
        publisher.into_sink().close().await?;
        info!(sent, "Finished publishing");
        Ok::<_, anyhow::Error>(())
    })
}

/// Run one consumer per sensor queue until they all stop
fn run_listen(settings: &Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut tasks = JoinSet::new();
        for sensor in Sensor::ALL {
            let monitor = SensorMonitor::from_settings(sensor, &settings.monitor)?;
            let consumer = Consumer::new(monitor, settings.monitor.on_malformed);
            let url = settings.amqp.url.clone();
            let queue = settings.queues.for_sensor(sensor).to_string();
            tasks.spawn(async move { (sensor, amqp::consume(&url, &queue, consumer).await) });
        }

        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            let (sensor, result) = joined.context("Consumer task panicked")?;
            match result {
                Ok(stats) => info!(
                    %sensor,
                    processed = stats.processed,
                    alerts = stats.alerts,
                    "Consumer finished"
                ),
                Err(e) => {
                    error!(%sensor, "{:#}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            bail!("{} of {} consumers failed", failed, Sensor::ALL.len());
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Evaluate the CSV rows without a broker and print a summary
fn run_replay(settings: &Settings, interval: Duration) -> Result<()> {
    let mut source = CsvSource::new(&settings.emitter.csv);
    let rows = source.rows()?;
    info!(path = %source.path().display(), rows = rows.len(), "Replaying");

    let rt = tokio::runtime::Runtime::new()?;
    let stats = rt.block_on(replay(rows, &settings.monitor, interval))?;

    println!();
    println!("{:<8} {:>10} {:>8} {:>9}", "Sensor", "Processed", "Alerts", "Rejected");
    for (sensor, stats) in &stats {
        println!(
            "{:<8} {:>10} {:>8} {:>9}",
            sensor.label(),
            stats.processed,
            stats.alerts,
            stats.rejected
        );
    }
    Ok(())
}
