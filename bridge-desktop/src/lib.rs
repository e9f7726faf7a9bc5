//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides production-ready implementations of the bridge traits
//! using desktop-appropriate libraries:
//! - `DurableStore` using a SQLite-backed key-value table
//! - `NetworkMonitor` using a simple connectivity probe
//!
//! Mobile hosts inject their own adapters (UserDefaults/SharedPreferences for
//! storage, Reachability/ConnectivityManager for network) instead of this crate.

mod durable;
mod network;

pub use durable::SqliteDurableStore;
pub use network::DesktopNetworkMonitor;
