use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

const TOTAL_TEMPLATE: &str = "{spinner:.cyan} 13F filings [{bar:40.cyan/blue}] {pos}/{len} \
     ({percent}%) elapsed {elapsed_precise}, eta {eta}";
const STORED_TEMPLATE: &str = "  filings stored  [{bar:40.green}] {pos:>5.green}";
const MISSED_TEMPLATE: &str = "  filings missed  [{bar:40.red}] {pos:>5.red}";
const BAR_CHARS: &str = "=> ";

/// Progress of a run over `len` filings: a total bar with successes and failures beneath it.
///
/// Every bar is hidden when the run is not interactive, so callers update it unconditionally.
#[derive(Clone)]
pub(crate) struct Progress {
    multi: Option<MultiProgress>,
    total: ProgressBar,
    success: ProgressBar,
    fail: ProgressBar,
}

impl Progress {
    pub(crate) fn new(len: usize, tui: bool) -> anyhow::Result<Self> {
        if !tui {
            return Ok(Self {
                multi: None,
                total: ProgressBar::hidden(),
                success: ProgressBar::hidden(),
                fail: ProgressBar::hidden(),
            });
        }

        let multi = MultiProgress::new();

        let total = multi.add(
            ProgressBar::new(len as u64)
                .with_style(ProgressStyle::with_template(TOTAL_TEMPLATE)?.progress_chars(BAR_CHARS)),
        );
        total.enable_steady_tick(Duration::from_millis(120));

        let success = multi.insert_after(&total, count_bar(len, STORED_TEMPLATE)?);
        // no filing, no holdings, or an error
        let fail = multi.insert_after(&success, count_bar(len, MISSED_TEMPLATE)?);

        Ok(Self {
            multi: Some(multi),
            total,
            success,
            fail,
        })
    }

    /// A spinner below the bars for one in-flight filing.
    pub(crate) fn spinner(&self, msg: String) -> ProgressBar {
        match &self.multi {
            Some(m) => {
                let spinner = m.add(ProgressBar::new_spinner().with_message(msg).with_style(
                    ProgressStyle::default_spinner()
                        .template("    {spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                ));
                spinner.enable_steady_tick(Duration::from_millis(50));
                spinner
            }
            None => ProgressBar::hidden(),
        }
    }

    pub(crate) fn succeed(&self) {
        self.success.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn failed(&self) {
        self.fail.inc(1);
        self.total.inc(1);
    }

    pub(crate) fn finish(&self) {
        self.fail.finish_and_clear();
        self.success.finish_and_clear();
        self.total.finish_and_clear();
    }
}

fn count_bar(len: usize, template: &str) -> anyhow::Result<ProgressBar> {
    Ok(ProgressBar::new(len as u64)
        .with_style(ProgressStyle::with_template(template)?.progress_chars(BAR_CHARS)))
}

/// A single spinner for a step with no count, such as loading indexes.
pub(crate) fn step_spinner(msg: &str, tui: bool) -> ProgressBar {
    if !tui {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner()
        .with_message(msg.to_string())
        .with_style(
            ProgressStyle::default_spinner()
                .template("{msg} {spinner:.magenta}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
