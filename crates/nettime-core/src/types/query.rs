//! Container element query.

use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Field selection and filter for a container elements request.
///
/// The server expects the query as a compact JSON string in the `query`
/// URL parameter. Every field is requested as of `start_date`, which
/// defaults to the current local date at construction time.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use nettime_core::Query;
///
/// let query = Query::new(["id", "nif"])
///     .with_start_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
///     .with_filter(r#"this.nif == "X""#);
///
/// assert_eq!(
///     query.prepare(),
///     r#"{"fields":[{"name":"id","startDate":"2024-01-31"},{"name":"nif","startDate":"2024-01-31"}],"filterExp":"this.nif == 'X'"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    fields: Vec<String>,
    start_date: NaiveDate,
    filter_exp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    fields: Vec<QueryField<'a>>,
    #[serde(skip_serializing_if = "str::is_empty")]
    filter_exp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryField<'a> {
    name: &'a str,
    start_date: String,
}

impl Query {
    /// Create a query for the given field names, as of today.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            start_date: Local::now().date_naive(),
            filter_exp: String::new(),
        }
    }

    /// Query `id` and `name`, the default for generic container listings.
    pub fn id_and_name() -> Self {
        Self::new(["id", "name"])
    }

    /// Query `id` and `nif`, the default for employee listings.
    pub fn id_and_nif() -> Self {
        Self::new(["id", "nif"])
    }

    /// Request the fields as of another date.
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// Set a filter expression.
    ///
    /// Double quotes would terminate the embedded string, so they are
    /// replaced by single quotes.
    pub fn with_filter(mut self, expression: &str) -> Self {
        self.filter_exp = expression.replace('"', "'");
        self
    }

    /// Returns the requested field names.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns the date the fields are requested for.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the normalized filter expression (empty when unset).
    pub fn filter(&self) -> &str {
        &self.filter_exp
    }

    /// Render the query as the compact JSON string the server expects.
    pub fn prepare(&self) -> String {
        let start_date = self.start_date.format("%Y-%m-%d").to_string();
        let body = QueryBody {
            fields: self
                .fields
                .iter()
                .map(|name| QueryField {
                    name,
                    start_date: start_date.clone(),
                })
                .collect(),
            filter_exp: &self.filter_exp,
        };

        // A struct of strings always serializes.
        serde_json::to_string(&body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 2).unwrap()
    }

    #[test]
    fn prepare_without_filter_omits_filter_exp() {
        let query = Query::new(["id"]).with_start_date(date());
        assert_eq!(
            query.prepare(),
            r#"{"fields":[{"name":"id","startDate":"2023-05-02"}]}"#
        );
    }

    #[test]
    fn filter_double_quotes_become_single_quotes() {
        let query = Query::id_and_name().with_filter(r#"name == "Ana""#);
        assert_eq!(query.filter(), "name == 'Ana'");
    }

    #[test]
    fn empty_field_list_is_rendered() {
        let query = Query::new(Vec::<String>::new()).with_start_date(date());
        assert_eq!(query.prepare(), r#"{"fields":[]}"#);
    }

    #[test]
    fn defaults_are_built_fresh() {
        let mut first = Query::id_and_nif();
        first = first.with_filter("x");
        let second = Query::id_and_nif();
        assert_eq!(first.filter(), "x");
        assert_eq!(second.filter(), "");
        assert_eq!(second.fields(), ["id".to_string(), "nif".to_string()]);
    }
}
