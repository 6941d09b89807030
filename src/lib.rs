//! rowwatch: read-only JSON views over the tables of a local SQLite file,
//! plus a small polling dashboard.

pub mod api;
pub mod config;
pub mod db;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_util;
