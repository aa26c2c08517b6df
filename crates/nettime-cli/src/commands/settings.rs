//! Settings command implementation.

use anyhow::Result;
use serde_json::json;

use crate::cli::ConnectionArgs;
use crate::output;

pub async fn run(args: &ConnectionArgs, pretty: bool) -> Result<()> {
    let client = super::connect(args).await?;

    let report = json!({
        "role": client.role(),
        "settings": client.settings(),
    });
    super::close(client).await;

    output::json(&report, pretty)
}
