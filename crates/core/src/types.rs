/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Free-form event payload: a JSON object keyed by field name.
pub type EventData = serde_json::Map<String, serde_json::Value>;
