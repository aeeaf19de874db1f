// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{de::{DeserializeOwned, IntoDeserializer}, Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::UserSummary;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub symptoms: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Populated from `users` via `patient_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<UserSummary>,
    /// Populated from `users` via `doctor_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking payload. `date` is either an RFC 3339 timestamp, or a calendar
/// date (`YYYY-MM-DD`) combined with `time` (`HH:MM`, UTC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    #[serde(alias = "doctorId")]
    pub doctor_id: Uuid,
    pub date: String,
    pub time: Option<String>,
    #[serde(alias = "reason")]
    pub symptoms: String,
    pub notes: Option<String>,
}

impl BookAppointmentRequest {
    pub fn scheduled_for(&self) -> Result<DateTime<Utc>, AppointmentError> {
        if let Ok(at) = DateTime::parse_from_rfc3339(self.date.trim()) {
            return Ok(at.with_timezone(&Utc));
        }

        let day = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppointmentError::ValidationError(format!("Invalid appointment date: {}", self.date)))?;

        let time = match self.time.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => NaiveTime::parse_from_str(raw, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                .map_err(|_| AppointmentError::ValidationError(format!("Invalid appointment time: {}", raw)))?,
            _ => return Err(AppointmentError::ValidationError(
                "Appointment time is required when date has no time component".to_string(),
            )),
        };

        Ok(day.and_time(time).and_utc())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateWindow {
    Today,
    Tomorrow,
    Upcoming,
    Past,
}

impl DateWindow {
    /// PostgREST filters on `date` for this window, relative to `now`.
    pub fn filters(&self, now: DateTime<Utc>) -> Vec<String> {
        let fmt = |at: DateTime<Utc>| at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let today = now.date_naive();
        let start_of = |day: NaiveDate| day.and_time(NaiveTime::MIN).and_utc();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let day_after = today.checked_add_days(Days::new(2)).unwrap_or(tomorrow);

        match self {
            DateWindow::Today => vec![
                format!("date=gte.{}", fmt(start_of(today))),
                format!("date=lt.{}", fmt(start_of(tomorrow))),
            ],
            DateWindow::Tomorrow => vec![
                format!("date=gte.{}", fmt(start_of(tomorrow))),
                format!("date=lt.{}", fmt(start_of(day_after))),
            ],
            DateWindow::Upcoming => vec![format!("date=gte.{}", fmt(start_of(today)))],
            DateWindow::Past => vec![format!("date=lt.{}", fmt(start_of(today)))],
        }
    }
}

/// List filters. `status` and `when` take `all` (or nothing) for no filter;
/// `search` matches the reason and either party's name, case-insensitively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    #[serde(default, deserialize_with = "optional_filter")]
    pub status: Option<AppointmentStatus>,
    #[serde(default, deserialize_with = "optional_filter")]
    pub when: Option<DateWindow>,
    #[serde(default)]
    pub search: Option<String>,
}

impl AppointmentListQuery {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        let party_name = |party: &Option<UserSummary>| party.as_ref().map(|p| p.name.to_lowercase());

        appointment.symptoms.to_lowercase().contains(&term)
            || party_name(&appointment.patient).is_some_and(|name| name.contains(&term))
            || party_name(&appointment.doctor).is_some_and(|name| name.contains(&term))
    }
}

fn optional_filter<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => {
            T::deserialize(IntoDeserializer::<'de, D::Error>::into_deserializer(value.to_string())).map(Some)
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment not found or cannot be cancelled")]
    NotCancellable,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment status changed while updating; reload and try again")]
    StatusChanged,

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn booking(date: &str, time: Option<&str>) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: Uuid::new_v4(),
            date: date.to_string(),
            time: time.map(str::to_string),
            symptoms: "Cough".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_scheduled_for_accepts_rfc3339() {
        let at = booking("2030-03-01T14:30:00Z", None).scheduled_for().unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2030, 3, 1, 14, 30, 0).unwrap());
    }

    #[test]
    fn test_scheduled_for_combines_date_and_time() {
        let at = booking("2030-03-01", Some("09:00")).scheduled_for().unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_scheduled_for_rejects_garbage() {
        assert!(booking("next tuesday", Some("09:00")).scheduled_for().is_err());
        assert!(booking("2030-03-01", None).scheduled_for().is_err());
        assert!(booking("2030-03-01", Some("9am")).scheduled_for().is_err());
    }

    #[test]
    fn test_request_accepts_client_field_names() {
        let doctor_id = Uuid::new_v4();
        let request: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "doctorId": doctor_id,
            "date": "2030-03-01",
            "time": "10:00",
            "reason": "Back pain"
        }))
        .unwrap();
        assert_eq!(request.doctor_id, doctor_id);
        assert_eq!(request.symptoms, "Back pain");
    }

    #[test]
    fn test_date_window_filters() {
        let now = Utc.with_ymd_and_hms(2030, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(
            DateWindow::Today.filters(now),
            vec!["date=gte.2030-03-01T00:00:00Z".to_string(), "date=lt.2030-03-02T00:00:00Z".to_string()]
        );
        assert_eq!(DateWindow::Past.filters(now), vec!["date=lt.2030-03-01T00:00:00Z".to_string()]);
        assert_eq!(
            DateWindow::Tomorrow.filters(now),
            vec!["date=gte.2030-03-02T00:00:00Z".to_string(), "date=lt.2030-03-03T00:00:00Z".to_string()]
        );
        assert_eq!(DateWindow::Upcoming.filters(now), vec!["date=gte.2030-03-01T00:00:00Z".to_string()]);
    }

    #[test]
    fn test_date_window_crosses_month_end() {
        let now = Utc.with_ymd_and_hms(2030, 2, 28, 23, 59, 0).unwrap();
        assert_eq!(
            DateWindow::Tomorrow.filters(now),
            vec!["date=gte.2030-03-01T00:00:00Z".to_string(), "date=lt.2030-03-02T00:00:00Z".to_string()]
        );
    }

    fn list_query(value: serde_json::Value) -> Result<AppointmentListQuery, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_list_query_treats_all_as_no_filter() {
        let query = list_query(serde_json::json!({ "status": "all", "when": "ALL" })).unwrap();
        assert_eq!(query.status, None);
        assert_eq!(query.when, None);

        let query = list_query(serde_json::json!({ "status": "scheduled", "when": "tomorrow" })).unwrap();
        assert_eq!(query.status, Some(AppointmentStatus::Scheduled));
        assert_eq!(query.when, Some(DateWindow::Tomorrow));

        assert!(list_query(serde_json::json!({ "status": "archived" })).is_err());
        assert!(list_query(serde_json::json!({})).unwrap().status.is_none());
    }

    #[test]
    fn test_list_query_search_matches_reason_and_names() {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap(),
            status: AppointmentStatus::Pending,
            symptoms: "Persistent headache".to_string(),
            notes: None,
            created_at: None,
            updated_at: None,
            patient: Some(UserSummary {
                id: Uuid::new_v4(),
                name: "Maria Lopez".to_string(),
                email: "maria@example.com".to_string(),
                specialization: None,
                phone: None,
            }),
            doctor: None,
        };

        let search = |term: &str| AppointmentListQuery { search: Some(term.to_string()), ..Default::default() };

        assert!(search("HEADACHE").matches(&appointment));
        assert!(search("lopez").matches(&appointment));
        assert!(search("  ").matches(&appointment));
        assert!(!search("cardio").matches(&appointment));
    }
}
