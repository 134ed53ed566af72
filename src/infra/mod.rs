pub mod db;
pub mod error;
pub mod http;
pub mod identity;
pub mod telemetry;
