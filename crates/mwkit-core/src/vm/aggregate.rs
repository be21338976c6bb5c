// ── Group aggregation rules ──
//
// Pure functions that fold member devices into the single value a group
// cell shows. A solo device goes through the same functions as a
// one-member slice.

use crate::model::{ConnectionState, KnownDevice, MacAddress, Model, SignalLevel};

/// `(mac, model)` per member, in membership order. Not deduplicated.
pub fn models(members: &[KnownDevice]) -> Vec<(MacAddress, Model)> {
    members
        .iter()
        .map(|d| (d.meta.mac.clone(), d.meta.model))
        .collect()
}

/// Representative connection state.
///
/// All members connected → `Connected`. Otherwise any member connecting →
/// `Connecting`, then any disconnecting → `Disconnecting`, else
/// `Disconnected`. An empty group is `Disconnected`.
pub fn connection(members: &[KnownDevice]) -> ConnectionState {
    if members.is_empty() {
        return ConnectionState::Disconnected;
    }
    if members.iter().all(|d| d.connection.is_connected()) {
        return ConnectionState::Connected;
    }
    let any = |state: ConnectionState| members.iter().any(|d| d.connection == state);
    if any(ConnectionState::Connecting) {
        ConnectionState::Connecting
    } else if any(ConnectionState::Disconnecting) {
        ConnectionState::Disconnecting
    } else {
        ConnectionState::Disconnected
    }
}

/// Weakest member signal. An empty group has no signal.
pub fn rssi(members: &[KnownDevice]) -> SignalLevel {
    members
        .iter()
        .map(KnownDevice::signal)
        .min()
        .unwrap_or(SignalLevel::None)
}

/// True only if every member is resolvable from this host's local state.
pub fn is_locally_known(members: &[KnownDevice]) -> bool {
    members.iter().all(KnownDevice::is_locally_known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceMetadata, PeripheralId};
    use pretty_assertions::assert_eq;

    fn member(
        mac: &str,
        connection: ConnectionState,
        rssi: Option<i32>,
        local: bool,
    ) -> KnownDevice {
        KnownDevice {
            local_id: local.then(PeripheralId::new_v4),
            meta: DeviceMetadata {
                mac: MacAddress::new(mac),
                serial: "SN".into(),
                model: Model::MetaMotionRL,
                name: mac.into(),
            },
            connection,
            rssi,
        }
    }

    #[test]
    fn models_keep_membership_order_and_duplicates() {
        let mut b = member("BB", ConnectionState::Connected, None, true);
        b.meta.model = Model::MetaWearC;
        let members = vec![
            b,
            member("AA", ConnectionState::Connected, None, true),
            member("AA", ConnectionState::Connected, None, true),
        ];
        let macs: Vec<String> = models(&members).iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(macs, vec!["BB", "AA", "AA"]);
        assert_eq!(models(&members)[0].1, Model::MetaWearC);
    }

    #[test]
    fn connection_connected_only_when_all_connected() {
        let all = vec![
            member("AA", ConnectionState::Connected, None, true),
            member("BB", ConnectionState::Connected, None, true),
        ];
        assert_eq!(connection(&all), ConnectionState::Connected);

        let mixed = vec![
            member("AA", ConnectionState::Connected, None, true),
            member("BB", ConnectionState::Disconnected, None, true),
        ];
        assert_eq!(connection(&mixed), ConnectionState::Disconnected);
    }

    #[test]
    fn connection_prefers_in_flight_states() {
        let members = vec![
            member("AA", ConnectionState::Disconnecting, None, true),
            member("BB", ConnectionState::Connecting, None, true),
        ];
        assert_eq!(connection(&members), ConnectionState::Connecting);

        let members = vec![
            member("AA", ConnectionState::Disconnecting, None, true),
            member("BB", ConnectionState::Connected, None, true),
        ];
        assert_eq!(connection(&members), ConnectionState::Disconnecting);
    }

    #[test]
    fn empty_group_defaults() {
        assert_eq!(connection(&[]), ConnectionState::Disconnected);
        assert_eq!(rssi(&[]), SignalLevel::None);
        assert!(is_locally_known(&[]));
    }

    #[test]
    fn rssi_is_weakest_member() {
        let members = vec![
            member("AA", ConnectionState::Connected, Some(-45), true),
            member("BB", ConnectionState::Connected, Some(-80), true),
        ];
        assert_eq!(rssi(&members), SignalLevel::Weak);
    }

    #[test]
    fn locally_known_requires_every_member() {
        let members = vec![
            member("AA", ConnectionState::Connected, None, true),
            member("BB", ConnectionState::Connected, None, false),
        ];
        assert!(!is_locally_known(&members));
        assert!(is_locally_known(&members[..1]));
    }
}
