//! Network Monitoring Abstraction
//!
//! Provides network connectivity and status information.

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Cellular/mobile data connection
    Cellular,
    /// WiFi connection
    WiFi,
    /// Ethernet connection
    Ethernet,
    /// Other or unknown connection type
    Other,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Cellular => "cellular",
            NetworkType::WiFi => "wifi",
            NetworkType::Ethernet => "ethernet",
            NetworkType::Other => "other",
        }
    }
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// Connected to network
    Connected,
    /// Not connected to any network
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

/// Network information
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub network_type: Option<NetworkType>,
    /// Whether the connection is metered (has data limits/costs)
    pub is_metered: bool,
}

/// Network monitor trait
///
/// Provides connectivity information so callers can decide whether to attempt
/// downloads at all (e.g., skip auto-caching while offline). The cache layer
/// itself never consults the network; only the service facade does.
#[async_trait::async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }

    /// Check if connected via WiFi
    async fn is_wifi(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                network_type: Some(NetworkType::WiFi),
                ..
            })
        )
    }
}

/// Fixed network monitor for testing/development
///
/// Reports whatever `NetworkInfo` it was constructed with.
#[derive(Debug, Clone)]
pub struct StaticNetworkMonitor {
    info: NetworkInfo,
}

impl StaticNetworkMonitor {
    pub fn new(info: NetworkInfo) -> Self {
        Self { info }
    }

    /// Always-online monitor over WiFi.
    pub fn online() -> Self {
        Self::new(NetworkInfo {
            status: NetworkStatus::Connected,
            network_type: Some(NetworkType::WiFi),
            is_metered: false,
        })
    }

    /// Always-offline monitor.
    pub fn offline() -> Self {
        Self::new(NetworkInfo {
            status: NetworkStatus::Disconnected,
            network_type: None,
            is_metered: false,
        })
    }
}

#[async_trait::async_trait]
impl NetworkMonitor for StaticNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        Ok(self.info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_monitor() {
        assert!(StaticNetworkMonitor::online().is_connected().await);
        assert!(StaticNetworkMonitor::online().is_wifi().await);
        assert!(!StaticNetworkMonitor::offline().is_connected().await);
    }

    #[test]
    fn test_network_type_labels() {
        assert_eq!(NetworkType::WiFi.as_str(), "wifi");
        assert_eq!(NetworkType::Cellular.as_str(), "cellular");
    }
}
