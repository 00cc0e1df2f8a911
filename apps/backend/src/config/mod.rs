pub mod admin_allowlist;
pub mod db;
pub mod payments;
