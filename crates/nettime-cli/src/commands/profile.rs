//! Profile subcommand implementations.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use nettime_core::BaseUrl;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::profile::{self, Profile};

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    /// Save --url and --username as defaults
    Save,

    /// Print the saved profile
    Show,

    /// Delete the saved profile
    Clear,
}

pub fn handle(args: &ConnectionArgs, cmd: ProfileCommand, pretty: bool) -> Result<()> {
    match cmd.command {
        ProfileSubcommand::Save => save(args),
        ProfileSubcommand::Show => {
            let saved = profile::load()
                .context("Failed to load profile")?
                .context("No saved profile. Run 'nettime --url .. --username .. profile save' first.")?;
            output::json(&saved, pretty)
        }
        ProfileSubcommand::Clear => {
            if profile::clear()? {
                output::success("Profile removed");
            } else {
                output::progress("No saved profile");
            }
            Ok(())
        }
    }
}

fn save(args: &ConnectionArgs) -> Result<()> {
    if args.url.is_none() && args.username.is_none() {
        anyhow::bail!("Nothing to save. Pass --url and/or --username.");
    }

    let url = args
        .url
        .as_deref()
        .map(|url| BaseUrl::new(url).map(|u| u.to_string()))
        .transpose()
        .context("Invalid server URL")?;

    let existing = profile::load().context("Failed to load profile")?.unwrap_or_default();
    let updated = Profile {
        url: url.or(existing.url),
        username: args.username.clone().or(existing.username),
    };

    let path = profile::save(&updated).context("Failed to save profile")?;
    output::success("Profile saved");
    output::field("Path", &path.display().to_string());

    Ok(())
}
