// Legacy API client modules
//
// Hand-written client for the controller's legacy (non-OpenAPI) endpoints,
// all wrapped in the standard `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod auth;
pub mod client;
pub mod models;
pub mod networks;
pub mod users;

pub use client::LegacyClient;
