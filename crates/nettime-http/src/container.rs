//! Generic container operations.
//!
//! A container is a named collection on the server (`Persona` holds the
//! employees). Reads go through the fields/elements endpoints; every write
//! is an action executed on a set of element ids.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use nettime_core::error::InvalidInputError;
use nettime_core::{Query, Result};

use crate::client::NetTimeClient;
use crate::endpoints::*;

/// Container holding the employee records.
pub const EMPLOYEES_CONTAINER: &str = "Persona";

/// Element id the server uses for "a new element".
pub const NEW_ELEMENT: i64 = -1;

/// Paging and ordering of a container elements request.
#[derive(Debug, Clone)]
pub struct ElementsOptions {
    pub page_start_index: u32,
    pub page_size: u32,
    pub search: String,
    pub order: String,
    pub desc: String,
}

impl Default for ElementsOptions {
    fn default() -> Self {
        Self {
            page_start_index: 0,
            page_size: 50,
            search: String::new(),
            order: String::new(),
            desc: String::new(),
        }
    }
}

/// An action to execute on container elements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAction {
    pub container: String,
    pub action: String,
    pub all: bool,
    pub elements: Vec<i64>,
    pub data_obj: Option<Value>,
}

impl ContainerAction {
    /// Run `action` on `elements` of `container`.
    pub fn new(container: impl Into<String>, action: impl Into<String>, elements: Vec<i64>) -> Self {
        Self {
            container: container.into(),
            action: action.into(),
            all: false,
            elements,
            data_obj: None,
        }
    }

    /// Apply the action to every element of the container.
    pub fn for_all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Attach the data object the action saves.
    pub fn with_data(mut self, data_obj: Value) -> Self {
        self.data_obj = Some(data_obj);
        self
    }
}

impl NetTimeClient {
    /// Field definitions of a container.
    #[instrument(skip(self))]
    pub async fn get_fields(&mut self, container: &str, filter_fields: bool) -> Result<Value> {
        self.get(
            CONTAINER_FIELDS,
            &FieldsQuery {
                container,
                filter_fields,
            },
        )
        .await
    }

    /// One page of container elements.
    #[instrument(skip(self, query, options), fields(fields = query.fields().len()))]
    pub async fn get_elements(
        &mut self,
        container: &str,
        query: Query,
        options: &ElementsOptions,
    ) -> Result<Value> {
        let params = ElementsQuery {
            page_start_index: options.page_start_index,
            page_size: options.page_size,
            search: &options.search,
            order: &options.order,
            desc: &options.desc,
            container,
            query: query.prepare(),
        };

        self.get(CONTAINER_ELEMENTS, &params).await
    }

    /// One page of employees. [`Query::id_and_nif`] is the usual query.
    pub async fn get_employees(&mut self, query: Query, options: &ElementsOptions) -> Result<Value> {
        self.get_elements(EMPLOYEES_CONTAINER, query, options).await
    }

    /// Execute an action on container elements.
    #[instrument(skip(self, action), fields(container = %action.container, action = %action.action))]
    pub async fn container_action_exec(&mut self, action: &ContainerAction) -> Result<Value> {
        debug!(elements = action.elements.len(), all = action.all, "Executing container action");
        self.post(CONTAINER_ACTION_EXEC, action).await
    }

    /// Save `data_obj` into the given elements.
    pub async fn container_save(
        &mut self,
        container: &str,
        elements: Vec<i64>,
        data_obj: Value,
    ) -> Result<Value> {
        let action = ContainerAction::new(container, "Save", elements).with_data(data_obj);
        self.container_action_exec(&action).await
    }

    /// Delete the given elements.
    pub async fn container_delete(&mut self, container: &str, elements: Vec<i64>) -> Result<Value> {
        let action = ContainerAction::new(container, "Delete", elements);
        self.container_action_exec(&action).await
    }

    /// Form for a new element prefilled with the data of `element`.
    pub async fn get_for_duplicate(&mut self, container: &str, element: i64) -> Result<Value> {
        let action = ContainerAction::new(container, "Copy", vec![element]);
        let response = self.container_action_exec(&action).await?;

        first_data_obj(response).ok_or_else(|| {
            InvalidInputError::EmptyResponse {
                operation: format!("duplicate form of {container}/{element}"),
            }
            .into()
        })
    }

    /// Every property of the given elements, as editable or read-only forms.
    pub async fn get_element_def(
        &mut self,
        container: &str,
        elements: Vec<i64>,
        read_only: bool,
    ) -> Result<Vec<Value>> {
        let name = if read_only { "View" } else { "editForm" };
        let action = ContainerAction::new(container, name, elements);
        let response = self.container_action_exec(&action).await?;

        Ok(data_objs(response))
    }

    /// Default data for a new element of `container`.
    pub async fn get_create_form(&mut self, container: &str) -> Result<Value> {
        self.get_element_def(container, vec![NEW_ELEMENT], false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                InvalidInputError::EmptyResponse {
                    operation: format!("create form of {container}"),
                }
                .into()
            })
    }
}

/// The `dataObj` of every entry of an action response.
fn data_objs(response: Value) -> Vec<Value> {
    match response {
        Value::Array(items) => items
            .into_iter()
            .map(|mut item| item.get_mut("dataObj").map(Value::take).unwrap_or(Value::Null))
            .collect(),
        _ => Vec::new(),
    }
}

fn first_data_obj(response: Value) -> Option<Value> {
    data_objs(response).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_serializes_with_null_data_obj() {
        let action = ContainerAction::new("Persona", "Copy", vec![7]);
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "container": "Persona",
                "action": "Copy",
                "all": false,
                "elements": [7],
                "dataObj": null
            })
        );
    }

    #[test]
    fn data_objs_keeps_order_and_fills_missing() {
        let response = json!([{"dataObj": {"id": 1}}, {"other": true}, {"dataObj": {"id": 3}}]);
        assert_eq!(
            data_objs(response),
            vec![json!({"id": 1}), Value::Null, json!({"id": 3})]
        );
    }

    #[test]
    fn data_objs_of_non_array_is_empty() {
        assert!(data_objs(json!({"ok": true})).is_empty());
        assert!(first_data_obj(json!([])).is_none());
    }
}
