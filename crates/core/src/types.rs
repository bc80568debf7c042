/// User ids are opaque strings (UUIDv7 text for newly registered users).
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
