//! Day results command implementation.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use crate::cli::ConnectionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct DayResultsArgs {
    /// Employee id
    #[arg(long)]
    pub employee: i64,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Last day (YYYY-MM-DD), defaults to `--from`
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

pub async fn run(args: &ConnectionArgs, cmd: DayResultsArgs, pretty: bool) -> Result<()> {
    let to = cmd.to.unwrap_or(cmd.from);
    if to < cmd.from {
        anyhow::bail!("--to ({to}) is before --from ({})", cmd.from);
    }

    let mut client = super::connect(args).await?;
    let result = client.get_day_results(cmd.employee, cmd.from, to).await;
    super::close(client).await;

    let results = result.context("Failed to fetch day results")?;
    output::json(&results, pretty)
}
