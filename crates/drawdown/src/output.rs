//! Report rendering for the CLI

use std::fmt::Write;

use drawdown_core::Report;
use drawdown_core::model::{SimulationResult, SweepSummary};
use drawdown_core::report::{SEPARATOR, format_currency};

use crate::Format;

pub fn render_run(result: &SimulationResult, format: Format) -> color_eyre::Result<String> {
    Ok(match format {
        Format::Csv => Report::new(result).render(),
        Format::Json => serde_json::to_string_pretty(result)? + "\n",
    })
}

pub fn render_sweep(summary: &SweepSummary, format: Format) -> color_eyre::Result<String> {
    if format == Format::Json {
        return Ok(serde_json::to_string_pretty(summary)? + "\n");
    }

    let sep = SEPARATOR;
    let mut out = format!("historic_year{sep}outcome{sep}failed_year{sep}final_net_worth\n");
    for run in &summary.runs {
        let failed_year = run.failed_year.map(|y| y.to_string()).unwrap_or_default();
        let outcome = run.failure.as_deref().unwrap_or("ok");
        writeln!(
            out,
            "{}{sep}{outcome}{sep}{failed_year}{sep}{}",
            run.historic_year,
            format_currency(run.final_net_worth)
        )?;
    }
    writeln!(
        out,
        "# success rate: {:.1}% ({}/{})",
        summary.success_rate() * 100.0,
        summary.successes(),
        summary.runs.len()
    )?;
    Ok(out)
}
