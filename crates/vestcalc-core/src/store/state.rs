use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grant::{Grant, PortfolioSettings};
use crate::VestCalcResult;

/// Schema version written with every record.
pub const STATE_VERSION: u32 = 1;

/// The single persisted portfolio record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub grants: Vec<Grant>,
    /// Reserved; carried through untouched.
    #[serde(default)]
    pub scenarios: Vec<serde_json::Value>,
    #[serde(default)]
    pub settings: PortfolioSettings,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl Default for PersistedState {
    fn default() -> Self {
        PersistedState {
            version: STATE_VERSION,
            grants: Vec::new(),
            scenarios: Vec::new(),
            settings: PortfolioSettings::default(),
            last_updated: Utc::now(),
        }
    }
}

impl PersistedState {
    /// Parse a stored record. Grants and settings that fail validation are
    /// dropped (with a warning) rather than rejecting the whole record.
    pub fn decode(raw: &str) -> VestCalcResult<Self> {
        let mut state: PersistedState = serde_json::from_str(raw)?;

        if state.version != STATE_VERSION {
            warn!(version = state.version, "Stored portfolio has unexpected version; reading as v{STATE_VERSION}");
        }

        state.grants.retain(|g| match g.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(grant_id = %g.id, error = %e, "Dropping invalid stored grant");
                false
            }
        });

        if let Err(e) = state.settings.validate() {
            warn!(error = %e, "Stored settings invalid; using defaults");
            state.settings = PortfolioSettings::default();
        }

        Ok(state)
    }

    pub fn encode(&self) -> VestCalcResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decode_browser_record() {
        let raw = r#"{
            "version": 1,
            "grants": [{
                "id": "1700000000000",
                "name": "Initial grant",
                "numOptions": 4800,
                "strikePrice": 1.25,
                "grantDate": "2023-02-01",
                "vestingPeriod": 4,
                "cliffPeriod": 1,
                "vestingFrequency": "monthly"
            }],
            "scenarios": [],
            "settings": { "currentStockPrice": 12.5, "taxRate": 37 },
            "lastUpdated": "2024-05-01T10:00:00.000Z"
        }"#;
        let s = PersistedState::decode(raw).unwrap();
        assert_eq!(s.grants.len(), 1);
        assert_eq!(s.grants[0].strike_price, dec!(1.25));
        assert_eq!(s.settings.current_stock_price, dec!(12.5));
        assert_eq!(s.settings.tax_rate, dec!(37));
    }

    #[test]
    fn test_decode_fills_missing_sections() {
        let s = PersistedState::decode(r#"{"grants": []}"#).unwrap();
        assert_eq!(s.version, STATE_VERSION);
        assert_eq!(s.settings, PortfolioSettings::default());
        assert!(s.scenarios.is_empty());
    }

    #[test]
    fn test_decode_drops_invalid_grants() {
        let raw = r#"{"grants": [
            {"id":"1","name":"ok","numOptions":10,"strikePrice":1,"grantDate":"2023-01-01","vestingPeriod":4,"cliffPeriod":1},
            {"id":"2","name":"bad","numOptions":10,"strikePrice":1,"grantDate":"2023-01-01","vestingPeriod":0,"cliffPeriod":0}
        ]}"#;
        let s = PersistedState::decode(raw).unwrap();
        assert_eq!(s.grants.len(), 1);
        assert_eq!(s.grants[0].id, "1");
    }

    #[test]
    fn test_decode_drops_oversized_grants() {
        let raw = r#"{"grants": [
            {"id":"1","name":"ok","numOptions":10,"strikePrice":1,"grantDate":"2023-01-01","vestingPeriod":4,"cliffPeriod":1},
            {"id":"2","name":"huge","numOptions":18446744073709551615,"strikePrice":1,"grantDate":"2023-01-01","vestingPeriod":4,"cliffPeriod":1},
            {"id":"3","name":"pricey","numOptions":10,"strikePrice":"10000000000000","grantDate":"2023-01-01","vestingPeriod":4,"cliffPeriod":1}
        ]}"#;
        let s = PersistedState::decode(raw).unwrap();
        let ids: Vec<&str> = s.grants.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(PersistedState::decode("{not json").is_err());
        assert!(PersistedState::decode(r#"{"grants": "nope"}"#).is_err());
    }

    #[test]
    fn test_scenarios_survive_round_trip() {
        let mut s = PersistedState::default();
        s.scenarios.push(serde_json::json!({"name": "IPO", "price": 80}));
        let back = PersistedState::decode(&s.encode().unwrap()).unwrap();
        assert_eq!(back.scenarios, s.scenarios);
    }
}
