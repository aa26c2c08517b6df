//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};

use crate::commands::container::{ActionArgs, ElementsArgs, FieldsArgs};
use crate::commands::day_results::DayResultsArgs;
use crate::commands::profile::ProfileCommand;
use crate::commands::stage::StageEmployeesArgs;

/// Command-line client for the netTime API.
#[derive(Parser, Debug)]
#[command(name = "nettime")]
#[command(author, version = env!("NETTIME_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Pretty-print JSON results
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how to connect. Unset values fall back to the saved profile.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Server base URL
    #[arg(long, env = "NETTIME_URL", global = true)]
    pub url: Option<String>,

    /// Login user name
    #[arg(long, env = "NETTIME_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "NETTIME_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Upper bound in seconds on waiting for an async job
    #[arg(long, default_value_t = 300, global = true)]
    pub poll_max_wait: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect and print the session settings
    Settings,

    /// List the fields of a container
    Fields(FieldsArgs),

    /// List the elements of a container
    Elements(ElementsArgs),

    /// List employees
    Employees,

    /// Execute an action on container elements
    Action(ActionArgs),

    /// Fetch day results of an employee
    DayResults(DayResultsArgs),

    /// Connect and disconnect
    Ping,

    /// Copy employees into a local staging database
    StageEmployees(StageEmployeesArgs),

    /// Manage the saved connection profile
    Profile(ProfileCommand),
}
