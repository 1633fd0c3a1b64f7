//! `ichor` server: business layer, SQL and in-memory stores, the `/v1` HTTP
//! API with JWT auth, workflow automation, and the server lifecycle.

pub mod api;
pub mod app;
pub mod auth;
pub mod bus;
pub mod cmd;
pub mod config;
pub mod domain;
pub mod network;
pub mod sqldb;
pub mod store;
pub mod telemetry;
pub mod workflow;

pub use app::{App, AppDomain};
pub use bus::{BusError, Business, Domain, Entity, Storer};
pub use domain::Domains;
pub use store::Backend;
