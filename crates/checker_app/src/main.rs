mod cli;
mod logging;

use anyhow::{bail, Context};
use checker_engine::{
    append_run_timestamp, run_once, ConsoleNotifier, Credentials, HistoryStore, HttpPortalSession,
    MailSettings, Notifier, PortalEndpoints, SessionSettings, SmtpNotifier,
};
use checker_logging::checker_info;

const RUN_LOG_FILENAME: &str = "portalchecker.log";

fn main() -> anyhow::Result<()> {
    let options = match cli::parse(std::env::args().skip(1)) {
        Ok(cli::Invocation::Help) => {
            print!("{}", cli::USAGE);
            return Ok(());
        }
        Ok(cli::Invocation::Run(options)) => options,
        Err(message) => {
            eprint!("{}", cli::USAGE);
            bail!("{message}");
        }
    };
    logging::initialize(options.log_destination);

    let credentials =
        Credentials::load_or_prompt(&options.config_path).context("loading credentials")?;

    let notifier: Box<dyn Notifier> = if options.print_only {
        Box::new(ConsoleNotifier)
    } else {
        Box::new(
            SmtpNotifier::new(&MailSettings::default(), &credentials)
                .context("configuring mail notifier")?,
        )
    };

    let store = HistoryStore::new(&options.data_dir);
    let mut session = HttpPortalSession::new(
        PortalEndpoints::default(),
        SessionSettings::default(),
        &credentials,
    )
    .context("building portal session")?;

    let runtime = tokio::runtime::Runtime::new().context("building async runtime")?;
    let outcomes = runtime.block_on(run_once(&mut session, &store, notifier.as_ref()));

    append_run_timestamp(&options.data_dir.join(RUN_LOG_FILENAME))
        .context("appending run log")?;
    checker_info!("run complete");

    let mut failed = Vec::new();
    let mut delivery_failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                println!(
                    "{}: {} new ({} rows scanned, {} skipped)",
                    outcome.category,
                    report.new_records.len(),
                    report.rows_scanned,
                    report.rows_skipped,
                );
                delivery_failures += report.delivery_failures;
            }
            Err(err) => {
                eprintln!("{}: check failed: {err}", outcome.category);
                failed.push(outcome.category);
            }
        }
    }
    if delivery_failures > 0 {
        // History is already updated; the user has to look into the
        // mail account rather than wait for a re-send.
        eprintln!("warning: {delivery_failures} notification(s) could not be delivered");
    }
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(|c| c.to_string()).collect();
        bail!("check failed for: {}", names.join(", "));
    }
    Ok(())
}
