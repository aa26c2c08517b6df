//! Container command implementations.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use nettime_core::Query;
use nettime_http::{ContainerAction, ElementsOptions};

use crate::cli::ConnectionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Container name (e.g. Persona)
    pub container: String,

    /// Only fields usable in filters
    #[arg(long)]
    pub filterable: bool,
}

#[derive(Args, Debug)]
pub struct ElementsArgs {
    /// Container name (e.g. Persona)
    pub container: String,

    /// Field to return; repeat for several
    #[arg(long = "field", default_values = ["id", "name"])]
    pub fields: Vec<String>,

    /// Filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// First element index
    #[arg(long, default_value_t = 0)]
    pub page_start: u32,

    /// Elements per page
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    /// Free-text search
    #[arg(long, default_value = "")]
    pub search: String,
}

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Container name
    pub container: String,

    /// Action name (e.g. Save, Delete, Copy)
    pub action: String,

    /// Element id; repeat for several
    #[arg(long = "element")]
    pub elements: Vec<i64>,

    /// Apply to every element of the container
    #[arg(long)]
    pub all: bool,

    /// Action data as a JSON object
    #[arg(long)]
    pub data: Option<String>,
}

pub async fn fields(args: &ConnectionArgs, cmd: FieldsArgs, pretty: bool) -> Result<()> {
    let mut client = super::connect(args).await?;
    let result = client.get_fields(&cmd.container, cmd.filterable).await;
    super::close(client).await;

    let fields = result.with_context(|| format!("Failed to fetch fields of {}", cmd.container))?;
    output::json(&fields, pretty)
}

pub async fn elements(args: &ConnectionArgs, cmd: ElementsArgs, pretty: bool) -> Result<()> {
    let mut query = Query::new(&cmd.fields);
    if let Some(filter) = &cmd.filter {
        query = query.with_filter(filter);
    }
    let options = ElementsOptions {
        page_start_index: cmd.page_start,
        page_size: cmd.page_size,
        search: cmd.search,
        ..ElementsOptions::default()
    };

    let mut client = super::connect(args).await?;
    let result = client.get_elements(&cmd.container, query, &options).await;
    super::close(client).await;

    let elements =
        result.with_context(|| format!("Failed to fetch elements of {}", cmd.container))?;
    output::json(&elements, pretty)
}

pub async fn employees(args: &ConnectionArgs, pretty: bool) -> Result<()> {
    let mut client = super::connect(args).await?;
    let result = client
        .get_employees(Query::id_and_nif(), &ElementsOptions::default())
        .await;
    super::close(client).await;

    let employees = result.context("Failed to fetch employees")?;
    output::json(&employees, pretty)
}

pub async fn action(args: &ConnectionArgs, cmd: ActionArgs, pretty: bool) -> Result<()> {
    if cmd.elements.is_empty() && !cmd.all {
        anyhow::bail!("Pass at least one --element or --all");
    }

    let mut action = ContainerAction::new(&cmd.container, &cmd.action, cmd.elements);
    if cmd.all {
        action = action.for_all();
    }
    if let Some(data) = &cmd.data {
        let data: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        action = action.with_data(data);
    }

    let mut client = super::connect(args).await?;
    let result = client.container_action_exec(&action).await;
    super::close(client).await;

    let response = result
        .with_context(|| format!("Failed to execute {} on {}", cmd.action, cmd.container))?;
    output::json(&response, pretty)
}
