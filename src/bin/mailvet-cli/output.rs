use anyhow::{Result, bail};
use mailvet::verify::{Stage, TracingObserver, VerificationResult, VerifyObserver};
use mailvet::BatchReport;

/// Prints one progress line per address and forwards everything to the log.
pub struct ConsoleObserver;

impl VerifyObserver for ConsoleObserver {
    fn on_stage(&self, address: &str, stage: Stage, detail: &str) {
        TracingObserver.on_stage(address, stage, detail);
    }

    fn on_result(&self, index: usize, total: usize, result: &VerificationResult) {
        TracingObserver.on_result(index, total, result);
        println!("{}", progress_line(index, total, result));
    }
}

pub fn progress_line(index: usize, total: usize, result: &VerificationResult) -> String {
    format!(
        "[{index}/{total}] Email: {}, Valid: {}, Message: {}",
        result.address, result.is_valid, result.message
    )
}

pub fn summary_line(report: &BatchReport) -> String {
    format!(
        "Summary: {}/{} emails are valid ({:.1}%)",
        report.valid_count(),
        report.len(),
        report.valid_percent()
    )
}

pub fn print_result(result: &VerificationResult, format: &str) -> Result<()> {
    match format {
        "human" => {
            let tag = if result.is_valid { "[OK]     " } else { "[INVALID]" };
            println!("{tag} {} :: {}", result.address, result.message);
        }
        "json" => {
            #[cfg(feature = "with-serde")]
            {
                println!("{}", serde_json::to_string_pretty(result)?);
            }
            #[cfg(not(feature = "with-serde"))]
            {
                bail!("format=json nécessite la feature 'with-serde'");
            }
        }
        other => bail!("format inconnu '{other}', utilisez human|json"),
    }
    Ok(())
}
