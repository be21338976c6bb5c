// ── Routing item ──
//
// The lookup key handed over by navigation. Never carries device state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity_id::{GroupId, MacAddress};
use crate::error::CoreError;

const GROUP_PREFIX: &str = "group:";

/// A selectable target: one known device or one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    Known(MacAddress),
    Group(GroupId),
}

impl Item {
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(mac) => write!(f, "{mac}"),
            Self::Group(id) => write!(f, "{GROUP_PREFIX}{id}"),
        }
    }
}

/// Parses `group:<uuid>` as a group, anything else as a MAC.
impl FromStr for Item {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(raw) = s.strip_prefix(GROUP_PREFIX) {
            let id = raw.parse::<GroupId>().map_err(|e| CoreError::ValidationFailed {
                message: format!("invalid group id '{raw}': {e}"),
            })?;
            return Ok(Self::Group(id));
        }
        if s.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "item must be a MAC address or group:<uuid>".into(),
            });
        }
        Ok(Self::Known(MacAddress::new(s)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_mac_item() {
        let item: Item = "aa-bb".parse().unwrap();
        assert_eq!(item, Item::Known(MacAddress::new("AA:BB")));
        assert!(!item.is_group());
    }

    #[test]
    fn parses_group_item_and_round_trips_display() {
        let raw = "group:550e8400-e29b-41d4-a716-446655440000";
        let item: Item = raw.parse().unwrap();
        assert!(item.is_group());
        assert_eq!(item.to_string(), raw);
    }

    #[test]
    fn rejects_bad_group_and_empty_input() {
        assert!("group:nope".parse::<Item>().is_err());
        assert!("   ".parse::<Item>().is_err());
    }
}
