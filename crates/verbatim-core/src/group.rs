//! Grouping of prepared members by target.

use std::collections::BTreeMap;

use crate::marker::QualificationTarget;
use crate::prepare::PreparedMember;

/// All members destined for one target type.
#[derive(Debug, Clone)]
pub struct Group {
    /// The shared target.
    pub target: QualificationTarget,
    /// Members in discovery order.
    pub members: Vec<PreparedMember>,
}

impl Group {
    /// The target string shared by every member.
    #[must_use]
    pub fn key(&self) -> &str {
        self.target.raw()
    }
}

/// Partitions members by their exact target string.
///
/// Within a group members keep the order they were given in; the map orders
/// groups by key. `a::B` and `crate::a::B` name the same type but form two
/// groups; [`aliased_duplicates`](crate::emit::aliased_duplicates) checks
/// constants across them.
#[must_use]
pub fn group(members: impl IntoIterator<Item = PreparedMember>) -> BTreeMap<String, Group> {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();
    for member in members {
        groups
            .entry(member.key.clone())
            .or_insert_with(|| Group {
                target: member.target.clone(),
                members: Vec::new(),
            })
            .members
            .push(member);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;
    use std::path::PathBuf;

    fn member(key: &str, field: &str) -> PreparedMember {
        PreparedMember {
            key: key.to_string(),
            target: QualificationTarget::parse(key).unwrap(),
            field_name: field.to_string(),
            symbol: format!("crate::{field}"),
            text: String::new(),
            location: Location::new(PathBuf::from("src/lib.rs"), 1, 1),
        }
    }

    #[test]
    fn equal_targets_share_a_group() {
        let groups = group(vec![
            member("a::B", "One"),
            member("c::D", "Two"),
            member("a::B", "Three"),
        ]);
        assert_eq!(groups.len(), 2);
        let fields: Vec<&str> = groups["a::B"]
            .members
            .iter()
            .map(|m| m.field_name.as_str())
            .collect();
        assert_eq!(fields, vec!["One", "Three"]);
        assert_eq!(groups["c::D"].key(), "c::D");
    }

    #[test]
    fn keys_are_case_sensitive_and_exact() {
        let groups = group(vec![
            member("a::B", "One"),
            member("a::b", "Two"),
            member("crate::a::B", "Three"),
        ]);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn group_order_does_not_depend_on_input_order() {
        let forward: Vec<String> = group(vec![member("z::Y", "A"), member("a::B", "B")])
            .into_keys()
            .collect();
        let backward: Vec<String> = group(vec![member("a::B", "B"), member("z::Y", "A")])
            .into_keys()
            .collect();
        assert_eq!(forward, backward);
    }
}
