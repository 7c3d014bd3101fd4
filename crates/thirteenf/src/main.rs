mod cli;
mod spider;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use thirteenf_spider::holdings::UnitResolver;
use tracing::{subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level
fn preprocess(trace_level: Level) -> anyhow::Result<()> {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        })?;
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();
    let resolver = UnitResolver::new(cli.thresholds.into());

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `thirteenf sec --csv <path>`: EDGAR holdings for a list of managers
        Sec { csv, workers } => spider::run_sec(&csv, workers, &resolver, tui).await?,

        // `thirteenf info --filing-url <url>`: one 13f.info filing
        Info {
            filing_url,
            mode,
            dry_run,
            reported_total,
        } => spider::run_info(&filing_url, mode, dry_run, reported_total, &resolver).await?,

        // `thirteenf resolve --file <path>`: offline
        Resolve {
            file,
            reported_total,
        } => spider::run_resolve(&file, reported_total, &resolver).await?,
    }

    Ok(())
}
