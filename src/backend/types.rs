// Backend API types.
// Subscription records and page scopes as the price backend reports them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned subscription identifier.
pub type SubscriptionId = i64;

/// Which page a subscription or view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Asset,
    Dex,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Asset, Scope::Dex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Asset => "asset",
            Scope::Dex => "dex",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked symbol or trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    #[serde(rename = "sub_type")]
    pub scope: Scope,
    pub symbol: String,
    pub display_name: Option<String>,
    /// Data provider the backend polls for this subscription.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub recording_enabled: bool,
}

impl Subscription {
    pub fn new(id: SubscriptionId, scope: Scope, symbol: impl Into<String>) -> Self {
        Self {
            id,
            scope,
            symbol: symbol.into(),
            display_name: None,
            provider: None,
            asset_type: None,
            recording_enabled: false,
        }
    }

    /// Name to show for this subscription.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.symbol)
    }
}

/// Body of `POST /api/visible`.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleRequest<'a> {
    pub ids: &'a [SubscriptionId],
    pub scope: Scope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_from_backend_json() {
        let json = r#"{
            "id": 7,
            "sub_type": "dex",
            "symbol": "SOL/USDC",
            "display_name": null,
            "provider": "jupiter",
            "asset_type": "crypto",
            "recording_enabled": true
        }"#;

        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.id, 7);
        assert_eq!(sub.scope, Scope::Dex);
        assert_eq!(sub.provider.as_deref(), Some("jupiter"));
        assert!(sub.recording_enabled);
    }

    #[test]
    fn test_label_falls_back_to_symbol() {
        let mut sub = Subscription::new(1, Scope::Asset, "BTCUSDT");
        assert_eq!(sub.label(), "BTCUSDT");

        sub.display_name = Some("  ".to_string());
        assert_eq!(sub.label(), "BTCUSDT");

        sub.display_name = Some("Bitcoin".to_string());
        assert_eq!(sub.label(), "Bitcoin");
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Asset.to_string(), "asset");
        assert_eq!(serde_json::to_string(&Scope::Dex).unwrap(), "\"dex\"");
    }
}
