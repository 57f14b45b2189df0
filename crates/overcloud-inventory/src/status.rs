//! Parsing of the service status report collected from a node.
//!
//! The report is produced by [`SERVICE_STATUS_COMMAND`] and holds one line
//! per systemd unit:
//!
//! ```text
//! openstack-nova-api: active
//! openstack-nova-compute: inactive (disabled)
//! ```
//!
//! Units are grouped by family (`openstack-nova-api` belongs to
//! `Nova Service`). A `== Title ==` line opens an explicit group that
//! collects every following unit until the next title.

use crate::types::GroupStatus;

/// Shell pipeline listing OpenStack units as `<unit>: <state>[ (disabled)]`.
pub const SERVICE_STATUS_COMMAND: &str = concat!(
    "systemctl -la --plain | awk '/openstack|telefonica/ ",
    "{gsub(/ +/, \" \"); gsub(\".service\", \":\"); gsub(\"not-found\",\"(disabled)\"); ",
    "split($0,s,\" \"); print s[1],s[3],s[2]}' | sed \"s/ loaded//g\""
);

const FAMILY_PREFIXES: [&str; 2] = ["openstack-", "telefonica-"];

/// One unit line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedService {
    pub name: String,
    pub status: String,
    /// The unit file was not found or is disabled.
    pub disabled: bool,
}

impl ParsedService {
    /// Whether the unit reported `active`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// A group of units from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGroup {
    pub name: String,
    pub services: Vec<ParsedService>,
    pub status: GroupStatus,
}

impl ParsedGroup {
    fn new(name: String) -> Self {
        Self {
            name,
            services: Vec::new(),
            status: GroupStatus::default(),
        }
    }

    /// Names of the member services.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|s| s.name.clone()).collect()
    }
}

/// Parse a status report into groups, in order of first appearance.
///
/// Lines that are neither a title nor a `<unit>: <state>` pair are skipped.
#[must_use]
pub fn parse_service_status(text: &str) -> Vec<ParsedGroup> {
    let mut groups: Vec<ParsedGroup> = Vec::new();
    let mut explicit: Option<usize> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(title) = parse_title(line) {
            explicit = Some(group_index(&mut groups, title));
            continue;
        }

        let Some(service) = parse_service(line) else {
            continue;
        };

        let index = match explicit {
            Some(index) => index,
            None => group_index(&mut groups, &family_group_name(&service.name)),
        };
        groups[index].services.push(service);
    }

    for group in &mut groups {
        let active = group.services.iter().filter(|s| s.is_active()).count();
        group.status = GroupStatus::from_counts(active, group.services.len());
    }

    groups
}

/// Group name for a unit: `openstack-nova-api` becomes `Nova Service`.
#[must_use]
pub fn family_group_name(unit: &str) -> String {
    let stripped = FAMILY_PREFIXES
        .iter()
        .find_map(|prefix| unit.strip_prefix(prefix))
        .unwrap_or(unit);
    let family = stripped.split('-').next().unwrap_or(stripped);

    let mut chars = family.chars();
    let capitalised: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{capitalised} Service")
}

fn parse_title(line: &str) -> Option<&str> {
    let title = line.strip_prefix("==")?.strip_suffix("==")?.trim();
    (!title.is_empty()).then_some(title)
}

fn parse_service(line: &str) -> Option<ParsedService> {
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut words = rest.split_whitespace();
    let status = words.next()?.to_owned();
    let disabled = words.any(|w| w == "(disabled)");

    Some(ParsedService {
        name: name.to_owned(),
        status,
        disabled,
    })
}

fn group_index(groups: &mut Vec<ParsedGroup>, name: &str) -> usize {
    if let Some(index) = groups.iter().position(|g| g.name == name) {
        return index;
    }
    groups.push(ParsedGroup::new(name.to_owned()));
    groups.len() - 1
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("openstack-nova-api", "Nova Service")]
    #[case("openstack-nova-compute", "Nova Service")]
    #[case("telefonica-sensu-client", "Sensu Service")]
    #[case("neutron-server", "Neutron Service")]
    #[case("openstack-glance", "Glance Service")]
    fn family_names(#[case] unit: &str, #[case] expected: &str) {
        assert_eq!(family_group_name(unit), expected);
    }

    #[test]
    fn groups_by_family() {
        let groups = parse_service_status(
            "openstack-nova-api: active\n\
             openstack-glance-api: active\n\
             openstack-nova-compute: inactive (disabled)\n",
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Nova Service");
        assert_eq!(
            groups[0].service_names(),
            vec!["openstack-nova-api", "openstack-nova-compute"]
        );
        assert_eq!(groups[0].status, GroupStatus::Degraded);
        assert!(groups[0].services[1].disabled);
        assert_eq!(groups[1].name, "Glance Service");
        assert_eq!(groups[1].status, GroupStatus::Active);
    }

    #[test]
    fn titles_open_explicit_groups() {
        let groups = parse_service_status(
            "== Compute Service ==\n\
             openstack-nova-compute: active\n\
             libvirtd: active\n\
             == Network Service ==\n\
             neutron-openvswitch-agent: failed\n",
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Compute Service");
        assert_eq!(groups[0].services.len(), 2);
        assert_eq!(groups[1].name, "Network Service");
        assert_eq!(groups[1].status, GroupStatus::Inactive);
    }

    #[test]
    fn skips_noise() {
        let groups = parse_service_status("\n  \nno separator here\n: active\nopenstack-heat-api:\n");
        assert!(groups.is_empty());
    }

    #[test]
    fn empty_title_is_treated_as_noise() {
        let groups = parse_service_status("== ==\nopenstack-heat-api: active\n");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Heat Service");
    }

    #[test]
    fn collection_command_targets_openstack_units() {
        assert!(SERVICE_STATUS_COMMAND.starts_with("systemctl -la --plain"));
        assert!(SERVICE_STATUS_COMMAND.contains("/openstack|telefonica/"));
    }
}
