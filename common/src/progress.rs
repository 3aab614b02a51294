use std::time::Duration;

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};

lazy_static::lazy_static! {
    static ref DOTS_STYLE: ProgressStyle = ProgressStyle::with_template("{spinner} {msg} {elapsed_precise}").unwrap().tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    static ref GREEN_TICK: StyledObject<&'static str> = style("✔").green();
    static ref RED_CROSS: StyledObject<&'static str> = style("✗").red();
}

pub const GENERATE: [&str; 3] = [
    "Generating lab definition",
    "Could not generate lab definition",
    "Lab definition written",
];

/// Spinner shown while work is in progress, `None` when running verbose
/// so log lines are not interleaved with the spinner.
pub fn progress(msg: &str, verbose: bool) -> Option<ProgressBar> {
    if verbose {
        return None;
    }

    let w = ProgressBar::new_spinner();
    w.set_style(DOTS_STYLE.clone());
    w.enable_steady_tick(Duration::from_millis(80));
    w.set_message(msg.to_owned());
    Some(w)
}

fn elapsed_time_str(dur: &Duration) -> String {
    format!("{}.{:03}s", dur.as_secs(), dur.subsec_millis())
}

pub fn finish_progress(
    status_message: &str,
    context: &str,
    dur: Duration,
    pb: Option<ProgressBar>,
) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    println!(
        "{} {} ({}) took, {}",
        GREEN_TICK.to_string(),
        status_message,
        context,
        elapsed_time_str(&dur)
    );
}

pub fn fail_progress(status_message: &str, context: &str, pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    eprintln!("{} {} ({})", RED_CROSS.to_string(), status_message, context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_has_millisecond_precision() {
        assert_eq!(elapsed_time_str(&Duration::from_millis(1_042)), "1.042s");
        assert_eq!(elapsed_time_str(&Duration::from_millis(7)), "0.007s");
    }

    #[test]
    fn verbose_runs_have_no_spinner() {
        assert!(progress("working", true).is_none());
    }

    #[test]
    fn status_marks() {
        assert_eq!(console::strip_ansi_codes(&GREEN_TICK.to_string()), "✔");
        assert_eq!(console::strip_ansi_codes(&RED_CROSS.to_string()), "✗");
    }
}
