//! Availability checks run before an operation is requested.

use overcloud_core::Node;

use super::Availability;

const ACTIVE_STATE: &str = "active";

/// Starting requires the node to be off.
#[must_use]
pub fn validate_start(node: &Node) -> Availability {
    if node.state.eq_ignore_ascii_case("off") {
        Availability::available()
    } else {
        Availability::unavailable("Cannot start. Already on.")
    }
}

/// Stopping requires the node to be on.
#[must_use]
pub fn validate_stop(node: &Node) -> Availability {
    if node.state.eq_ignore_ascii_case("on") {
        Availability::available()
    } else {
        Availability::unavailable("Cannot stop. Already off.")
    }
}

/// Deployed nodes cannot be removed. Archived nodes always can.
#[must_use]
pub fn validate_destroy(node: &Node) -> Availability {
    if node.archived {
        return Availability::available();
    }

    match node.provision_state() {
        Some(state) if state == ACTIVE_STATE => Availability::unavailable(format!(
            "Cannot remove {} because it is in {state} state.",
            node.name
        )),
        _ => Availability::available(),
    }
}

/// Maintenance mode can always be entered.
#[must_use]
pub const fn validate_set_node_maintenance(_node: &Node) -> Availability {
    Availability::available()
}

/// Maintenance mode can always be left.
#[must_use]
pub const fn validate_unset_node_maintenance(_node: &Node) -> Availability {
    Availability::available()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("off", true)]
    #[case("Off", true)]
    #[case("OFF", true)]
    #[case("on", false)]
    #[case("unknown", false)]
    fn start_requires_off(#[case] state: &str, #[case] available: bool) {
        let node = Node::new("node-0", None).with_state(state);
        let result = validate_start(&node);

        assert_eq!(result.available, available);
        if !available {
            assert_eq!(result.message.as_deref(), Some("Cannot start. Already on."));
        }
    }

    #[rstest]
    #[case("on", true)]
    #[case("ON", true)]
    #[case("off", false)]
    fn stop_requires_on(#[case] state: &str, #[case] available: bool) {
        let node = Node::new("node-0", None).with_state(state);
        let result = validate_stop(&node);

        assert_eq!(result.available, available);
        if !available {
            assert_eq!(result.message.as_deref(), Some("Cannot stop. Already off."));
        }
    }

    #[test]
    fn active_node_cannot_be_destroyed() {
        let node = Node::new("overcloud-controller-0", None).with_provision_state("active");
        assert_eq!(
            validate_destroy(&node),
            Availability::unavailable(
                "Cannot remove overcloud-controller-0 because it is in active state."
            )
        );
    }

    #[rstest]
    #[case::manageable(Some("manageable"), false)]
    #[case::no_state(None, false)]
    #[case::archived_active(Some("active"), true)]
    fn other_nodes_can_be_destroyed(#[case] provision_state: Option<&str>, #[case] archived: bool) {
        let mut node = Node::new("node-0", None);
        node.hardware.provision_state = provision_state.map(ToOwned::to_owned);
        node.archived = archived;

        assert_eq!(validate_destroy(&node), Availability::available());
    }

    #[test]
    fn maintenance_always_available() {
        let node = Node::new("node-0", None).with_provision_state("active");
        assert!(validate_set_node_maintenance(&node).available);
        assert!(validate_unset_node_maintenance(&node).available);
    }
}
