/// HTTP health endpoints
pub mod health;
