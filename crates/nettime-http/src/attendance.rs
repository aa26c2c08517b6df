//! Attendance operations: results, clockings, plannings and activators.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use nettime_core::Result;

use crate::client::NetTimeClient;
use crate::container::NEW_ELEMENT;
use crate::endpoints::*;

/// Container holding the activators.
pub const ACTIVATORS_CONTAINER: &str = "Activadores";

/// Reader id the server records for clockings entered through the API.
pub const API_READER: i64 = -1;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A clocking to register for an employee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clocking {
    pub id_emp: i64,
    #[serde(serialize_with = "serialize_date_time")]
    pub date: NaiveDateTime,
    pub id_reader: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Clocking {
    /// A plain clocking at `date` through the API reader.
    pub fn new(employee: i64, date: NaiveDateTime) -> Self {
        Self {
            id_emp: employee,
            date,
            id_reader: API_READER,
            action: None,
        }
    }

    /// Tag the clocking with an action (e.g. an incidence code).
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// A planned absence or incidence over a date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub id_emp: i64,
    pub name: String,
    pub incidence: i64,
    #[serde(serialize_with = "serialize_date")]
    pub date_ini: NaiveDate,
    #[serde(serialize_with = "serialize_date")]
    pub date_end: NaiveDate,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Day-level changes posted for one employee and date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayPost<'a> {
    id_emp: i64,
    #[serde(serialize_with = "serialize_date")]
    date: NaiveDate,
    changes: &'a Value,
}

impl NetTimeClient {
    /// Computed day results of an employee over a date range.
    #[instrument(skip(self))]
    pub async fn get_day_results(
        &mut self,
        employee: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Value> {
        self.run_task(DAY_RESULTS, &range_query(employee, from, to, None))
            .await
    }

    /// Access-control clockings of an employee over a date range.
    #[instrument(skip(self))]
    pub async fn get_access_clockings(
        &mut self,
        employee: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Value> {
        self.run_task(ACCESS_CLOCKINGS, &range_query(employee, from, to, None))
            .await
    }

    /// Named results (balances, counters) of an employee over a date range.
    #[instrument(skip(self, results))]
    pub async fn get_results(
        &mut self,
        employee: i64,
        from: NaiveDate,
        to: NaiveDate,
        results: &[&str],
    ) -> Result<Value> {
        let names = (!results.is_empty()).then(|| results.join(","));
        self.run_task(RESULTS, &range_query(employee, from, to, names))
            .await
    }

    /// Register a clocking.
    #[instrument(skip(self), fields(employee = clocking.id_emp))]
    pub async fn add_clocking(&mut self, clocking: &Clocking) -> Result<Value> {
        self.post(CLOCKINGS, clocking).await
    }

    /// Post day-level changes for an employee.
    #[instrument(skip(self, changes))]
    pub async fn post_day(&mut self, employee: i64, date: NaiveDate, changes: &Value) -> Result<Value> {
        let body = DayPost {
            id_emp: employee,
            date,
            changes,
        };
        self.post(DAY_POST, &body).await
    }

    /// Create a planning.
    #[instrument(skip(self), fields(employee = planning.id_emp))]
    pub async fn create_planning(&mut self, planning: &Planning) -> Result<Value> {
        self.post(PLANIFICATION_MANAGER, planning).await
    }

    /// Create an activator from the server's create form, overridden by
    /// the fields of `values`.
    #[instrument(skip(self, values))]
    pub async fn create_activator(&mut self, values: &Value) -> Result<Value> {
        let mut form = self.get_create_form(ACTIVATORS_CONTAINER).await?;
        merge_into(&mut form, values);
        self.container_save(ACTIVATORS_CONTAINER, vec![NEW_ELEMENT], form)
            .await
    }
}

fn range_query(
    employee: i64,
    from: NaiveDate,
    to: NaiveDate,
    results: Option<String>,
) -> EmployeeRangeQuery {
    EmployeeRangeQuery {
        id_emp: employee,
        date_ini: from.format(DATE_FORMAT).to_string(),
        date_end: to.format(DATE_FORMAT).to_string(),
        results,
    }
}

/// Overwrite the top-level fields of `form` with those of `values`.
fn merge_into(form: &mut Value, values: &Value) {
    match (form, values) {
        (Value::Object(form), Value::Object(values)) => {
            for (key, value) in values {
                form.insert(key.clone(), value.clone());
            }
        }
        (form, values) if !values.is_null() => *form = values.clone(),
        _ => {}
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}

fn serialize_date_time<S>(date: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&date.format(DATE_TIME_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clocking_body_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let clocking = Clocking::new(12, date).with_action("IN");
        assert_eq!(
            serde_json::to_value(&clocking).unwrap(),
            json!({"idEmp": 12, "date": "2024-03-01T08:05:00", "idReader": -1, "action": "IN"})
        );
    }

    #[test]
    fn planning_dates_are_plain_days() {
        let planning = Planning {
            id_emp: 3,
            name: "Vacaciones".into(),
            incidence: 9,
            date_ini: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            date_end: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            all_day: true,
            comment: None,
        };
        let value = serde_json::to_value(&planning).unwrap();
        assert_eq!(value["dateIni"], "2024-08-01");
        assert_eq!(value["dateEnd"], "2024-08-15");
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn range_query_joins_result_names() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = range_query(5, from, from, Some("a,b".into()));
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"idEmp": 5, "dateIni": "2024-01-01", "dateEnd": "2024-01-01", "results": "a,b"})
        );
    }

    #[test]
    fn merge_overrides_top_level_fields() {
        let mut form = json!({"name": "", "active": true});
        merge_into(&mut form, &json!({"name": "Night shift"}));
        assert_eq!(form, json!({"name": "Night shift", "active": true}));
    }
}
