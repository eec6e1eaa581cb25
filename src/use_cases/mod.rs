// Use cases layer: connection policy, saved locations, and the dashboard loop.

pub mod connection;
pub mod dashboard;
pub mod location_store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::ConnectionManager;
pub use dashboard::{Dashboard, dashboard_task};
pub use location_store::{LocationStore, STORAGE_KEY, StoredLocations};
pub use types::{ConnectionState, DashboardEvent, DashboardSnapshot, FeedEvent};
