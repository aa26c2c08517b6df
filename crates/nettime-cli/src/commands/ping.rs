//! Ping command implementation.

use anyhow::{Context, Result};

use crate::cli::ConnectionArgs;
use crate::output;

pub async fn run(args: &ConnectionArgs) -> Result<()> {
    output::progress("Connecting...");
    let mut client = super::connect(args).await?;
    output::success("Connected");
    if let Some(role) = client.role() {
        output::field("Role", role);
    }

    client.disconnect().await.context("Failed to logout")?;
    output::success("Disconnected");

    Ok(())
}
