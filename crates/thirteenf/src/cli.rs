use bigdecimal::BigDecimal;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thirteenf_spider::holdings::UnitThresholds;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

/// Cut-offs of the unit resolver; the defaults suit 13F filings.
#[derive(Args, Debug)]
pub struct ThresholdArgs {
    /// Reported totals above this are taken to be in dollars.
    #[arg(long, global = true, default_value = "25000000")]
    pub extreme_total: BigDecimal,

    /// Average raw value per share above this means the values are in dollars.
    #[arg(long, global = true, default_value = "2")]
    pub implied_price: BigDecimal,

    /// Relative deviation under which the holdings agree with the reported total.
    #[arg(long, global = true, default_value = "0.20")]
    pub tolerance: BigDecimal,
}

impl From<ThresholdArgs> for UnitThresholds {
    fn from(args: ThresholdArgs) -> Self {
        UnitThresholds {
            extreme_total: args.extreme_total,
            implied_price: args.implied_price,
            tolerance: args.tolerance,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect 13F holdings from SEC EDGAR for each (CIK, period end) of a CSV file.
    Sec {
        /// CSV with `cik` and `period_end` columns.
        #[arg(short, long)]
        csv: PathBuf,

        /// Filings processed concurrently.
        #[arg(short, long, default_value_t = 10)]
        workers: usize,
    },

    /// Collect the holdings of one 13f.info filing.
    Info {
        /// e.g. https://13f.info/13f/000091957414001804-kingdon-capital-management-l-l-c-q4-2013
        #[arg(short, long)]
        filing_url: String,

        #[arg(short, long, value_enum, default_value_t = Mode::Replace)]
        mode: Mode,

        /// Print the first rows instead of writing to the database.
        #[arg(long)]
        dry_run: bool,

        /// Cover-page total of the filing, in the filer's units.
        #[arg(long)]
        reported_total: Option<BigDecimal>,
    },

    /// Resolve the holdings of a local JSON payload and print them; no network or database.
    Resolve {
        /// JSON file in the 13f.info API shape (or any payload holding a table).
        #[arg(short, long)]
        file: PathBuf,

        /// Cover-page total of the filing, in the filer's units.
        #[arg(long)]
        reported_total: Option<BigDecimal>,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Delete the filing's stored rows first.
    Replace,

    /// Keep stored rows and add the new ones.
    Append,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}
