// ── Device group ──

use serde::{Deserialize, Serialize};

use super::entity_id::{GroupId, MacAddress};

/// A named set of devices. Owns membership only; member state lives in
/// the registry's device records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceGroup {
    pub id: GroupId,
    pub name: String,
    /// Member identities in the order the user arranged them.
    #[serde(default)]
    pub members: Vec<MacAddress>,
}

impl DeviceGroup {
    pub fn contains(&self, mac: &MacAddress) -> bool {
        self.members.contains(mac)
    }
}
