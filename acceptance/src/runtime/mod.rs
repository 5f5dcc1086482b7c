//! Runtime Adapters
//!
//! Concrete clients for the deployed stack: the broker and time-series REST
//! APIs, the Keycloak token endpoint, Grafana and the remote browser.

pub mod api_client;
pub mod auth;
pub mod dashboard;
pub mod webdriver;

// Re-export main types
pub use api_client::FiwareApiClient;
pub use auth::KeycloakTokenSource;
pub use dashboard::DashboardClient;
pub use webdriver::WebDriverSession;
