//! Subcommand implementations.

pub mod container;
pub mod day_results;
pub mod ping;
pub mod profile;
pub mod settings;
pub mod stage;

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use nettime_core::{BaseUrl, Credentials, PollConfig};
use nettime_http::{ClientConfig, NetTimeClient};

use crate::cli::{Cli, Commands, ConnectionArgs};

pub async fn handle(cli: Cli) -> Result<()> {
    let pretty = cli.pretty;
    let connection = &cli.connection;

    match cli.command {
        Commands::Settings => settings::run(connection, pretty).await,
        Commands::Fields(args) => container::fields(connection, args, pretty).await,
        Commands::Elements(args) => container::elements(connection, args, pretty).await,
        Commands::Employees => container::employees(connection, pretty).await,
        Commands::Action(args) => container::action(connection, args, pretty).await,
        Commands::DayResults(args) => day_results::run(connection, args, pretty).await,
        Commands::Ping => ping::run(connection).await,
        Commands::StageEmployees(args) => stage::run(connection, args, pretty).await,
        Commands::Profile(cmd) => profile::handle(connection, cmd, pretty),
    }
}

/// Build a client configuration from flags, environment and saved profile.
pub fn client_setup(args: &ConnectionArgs) -> Result<(ClientConfig, Credentials)> {
    let saved = crate::profile::load().context("Failed to load profile")?.unwrap_or_default();

    let url = args
        .url
        .clone()
        .or(saved.url)
        .context("No server URL. Pass --url, set NETTIME_URL or save a profile.")?;
    let username = args
        .username
        .clone()
        .or(saved.username)
        .context("No user name. Pass --username, set NETTIME_USERNAME or save a profile.")?;
    let password = args
        .password
        .clone()
        .context("No password. Pass --password or set NETTIME_PASSWORD.")?;

    let base_url = BaseUrl::new(&url).context("Invalid server URL")?;
    let poll = PollConfig::default().with_max_wait(Duration::from_secs(args.poll_max_wait));
    let config = ClientConfig::new(base_url)
        .with_request_timeout(Duration::from_secs(args.timeout))
        .with_poll_config(poll);

    Ok((config, Credentials::new(username, password)))
}

/// Log in with the resolved connection settings.
pub async fn connect(args: &ConnectionArgs) -> Result<NetTimeClient> {
    let (config, credentials) = client_setup(args)?;
    NetTimeClient::login(config, credentials)
        .await
        .context("Failed to login")
}

/// Log out, reporting but not failing on errors.
pub async fn close(mut client: NetTimeClient) {
    if let Err(e) = client.disconnect().await {
        warn!(error = %e, "Logout failed");
    }
}
