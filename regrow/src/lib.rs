use anyhow::Context;
use clap::Parser;
use regrow_core::cli::Cli;
use regrow_core::config::RegrowConfig;
use regrow_core::module::{self, RunDisposition, RunOptions};
use regrow_core::report::ResizeReport;
use regrow_hal::HostHal;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    regrow_core::logging::init(cli.verbose);

    let config = RegrowConfig::load(&cli.config)?;
    let cfg = cli.apply_overrides(config.growpart());
    log::debug!("growpart config: {:?}", cfg);

    let hal = HostHal::new();
    let opts = RunOptions {
        sentinel: cli.sentinel.clone(),
        ..RunOptions::default()
    };
    let disposition = module::handle(&cfg, &hal, &opts).context("growpart failed")?;

    if let Some(output) = render(&disposition, cli.json)? {
        print!("{}", output);
    }
    Ok(())
}

/// Text to print for a finished run. Runs that stopped early only print in JSON mode,
/// as an empty report.
pub fn render(disposition: &RunDisposition, json: bool) -> anyhow::Result<Option<String>> {
    let empty = ResizeReport::default();
    let report = match disposition {
        RunDisposition::Completed(report) => report,
        RunDisposition::Disabled(reason) => {
            log::info!("growpart disabled: {}", reason);
            &empty
        }
        RunDisposition::NoDevices => {
            log::info!("growpart: empty device list");
            &empty
        }
        RunDisposition::NoBackend(err) => {
            log::info!("growpart: {}", err);
            &empty
        }
    };

    if json {
        let mut out = serde_json::to_string_pretty(report).context("failed to encode report")?;
        out.push('\n');
        return Ok(Some(out));
    }
    if matches!(disposition, RunDisposition::Completed(_)) {
        return Ok(Some(report.render_table()));
    }
    Ok(None)
}
