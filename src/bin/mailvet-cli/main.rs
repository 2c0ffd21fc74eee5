mod args;
mod logging;
mod output;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use mailvet::{
    BatchReport, DnsResolver, LookupMx, Probe, SmtpProber, Verifier, VerifyConfig,
    read_sheet_path, write_sheet_path,
};
use tracing::{error, info};

use args::{Cli, Commands};
use output::ConsoleObserver;

// codes de sortie : 0 OK, 2 adresse invalide (check), 1 fatal
const EXIT_OK: u8 = 0;
const EXIT_FATAL: u8 = 1;
const EXIT_INVALID: u8 = 2;

fn main() -> ExitCode {
    ExitCode::from(exit_status(run(Cli::parse())))
}

fn exit_status(outcome: Result<u8>) -> u8 {
    match outcome {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            EXIT_FATAL
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    logging::init(&cli.log_file, cli.smtp_debug)?;
    let config = cli.verify.to_config()?;
    let resolver =
        DnsResolver::from_system_conf(config.dns_timeout).context("initialise DNS resolver")?;
    let prober = SmtpProber::new(&config.probe);

    match &cli.cmd {
        Commands::Check { email, format } => {
            let verifier = Verifier::new(&config, &resolver, prober);
            let result = verifier.verify_one(email.trim());
            output::print_result(&result, format)?;
            Ok(if result.is_valid {
                EXIT_OK
            } else {
                EXIT_INVALID
            })
        }
        Commands::Batch {
            input,
            column,
            output,
        } => {
            let job = BatchJob {
                input,
                column,
                output,
            };
            run_batch(&config, &resolver, prober, &job, &mut io::stdout().lock())?;
            Ok(EXIT_OK)
        }
    }
}

struct BatchJob<'a> {
    input: &'a Path,
    column: &'a str,
    output: &'a Path,
}

/// Reads the sheet, verifies every address and writes the annotated copy.
/// Returns `None` when the sheet holds no address; no output file is written
/// in that case.
fn run_batch<R, P, W>(
    config: &VerifyConfig,
    resolver: R,
    prober: P,
    job: &BatchJob<'_>,
    out: &mut W,
) -> Result<Option<BatchReport>>
where
    R: LookupMx,
    P: Probe,
    W: Write,
{
    writeln!(out, "Starting email validation process...")?;
    let sheet = read_sheet_path(job.input, job.column)?;
    let addresses = sheet.addresses();
    info!(count = addresses.len(), input = %job.input.display(), "addresses loaded");
    if addresses.is_empty() {
        error!("no emails to process");
        writeln!(
            out,
            "No emails to process. Please check your input file and column name."
        )?;
        return Ok(None);
    }
    writeln!(out, "Found {} emails to validate.", addresses.len())?;

    let verifier = Verifier::new(config, resolver, prober).with_observer(ConsoleObserver);
    let report = verifier.verify_batch(&addresses);

    write_sheet_path(job.output, &sheet, &report)?;
    info!(output = %job.output.display(), "results written");
    writeln!(
        out,
        "Validation complete! Results saved to {}",
        job.output.display()
    )?;
    writeln!(out)?;
    writeln!(out, "{}", output::summary_line(&report))?;
    Ok(Some(report))
}
