//! studiodesk — synchronization core of the StudioDesk client portal.
//!
//! The portal's pages and widgets are presentational; the one stateful
//! subsystem is the client project dashboard, and this crate is that
//! subsystem: a snapshot store backed by the remote portal service, the
//! deliverable approval workflow, the message thread tracker, the file
//! upload pipeline, and the view activation coordinator that ties their
//! side effects to navigation.

pub mod config;
pub mod dashboard;
pub mod portal_api;
pub mod types;

pub use config::PortalConfig;
pub use dashboard::store::FetchOutcome;
pub use dashboard::Dashboard;
pub use portal_api::{HttpPortalApi, PortalApi, PortalError};
