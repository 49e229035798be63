//! Named sub-lists inside a string-list body.
//!
//! Some messages carry several variable-length lists at once. Each list
//! is written as a marker field `"<name> <count>"` followed by `count`
//! plain fields:
//!
//! ```text
//! 1114|Game1,R,O 2,PLB,VP,C 2,alice,1118
//!              ^^^        ^^^
//!              group O    group C
//! ```
//!
//! The decoder checks every marker against what is actually left on the
//! line, so a lying count can't read past the end or swallow the next
//! group's marker.

use crate::field::is_single_line_and_safe;
use crate::{DecodeError, ProtocolError};

/// One decoded group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub items: Vec<String>,
}

/// Appends a marker and its items to `into`.
///
/// The name must be non-empty, safe and contain no space; items must pass
/// the usual string-field check.
pub fn encode_group(
    name: &str,
    items: &[String],
    into: &mut Vec<String>,
) -> Result<(), ProtocolError> {
    if !is_single_line_and_safe(name, false) || name.contains(' ') {
        return Err(ProtocolError::invalid(
            "group",
            format!("bad group name {name:?}"),
        ));
    }
    for item in items {
        crate::field::check_str("group item", item)?;
    }
    push_group(name, items, into);
    Ok(())
}

/// Appends a marker and its items without checking them.
///
/// For types whose constructor already validated the items.
pub fn push_group(name: &str, items: &[String], into: &mut Vec<String>) {
    into.push(format!("{name} {}", items.len()));
    into.extend(items.iter().cloned());
}

/// Splits `fields` into groups.
///
/// Every field must belong to a group. Fails on a malformed or negative
/// count, a count that overruns the remaining fields, a name not in
/// `known`, or a name seen twice.
pub fn parse_groups(fields: &[String], known: &[&str]) -> Result<Vec<Group>, DecodeError> {
    let mut groups: Vec<Group> = Vec::new();
    let mut i = 0;

    while i < fields.len() {
        let marker = &fields[i];
        let (name, count) = parse_marker(marker)?;

        if !known.contains(&name) {
            return Err(DecodeError::UnknownGroup(name.to_string()));
        }
        if groups.iter().any(|g| g.name == name) {
            return Err(DecodeError::DuplicateGroup(name.to_string()));
        }

        let start = i + 1;
        let available = fields.len() - start;
        if count > available {
            return Err(DecodeError::GroupOverrun {
                name: name.to_string(),
                declared: count,
                available,
            });
        }

        groups.push(Group {
            name: name.to_string(),
            items: fields[start..start + count].to_vec(),
        });
        i = start + count;
    }

    Ok(groups)
}

/// Parses `"<name> <count>"`. The name is everything before the first
/// space and must be non-empty.
fn parse_marker(marker: &str) -> Result<(&str, usize), DecodeError> {
    let bad = || DecodeError::BadGroupMarker(marker.to_string());
    let (name, count) = marker.split_once(' ').ok_or_else(bad)?;
    if name.is_empty() {
        return Err(bad());
    }
    // Parse signed first so "-1" is reported as a bad marker rather than
    // wrapping.
    let count: i64 = count.parse().map_err(|_| bad())?;
    let count = usize::try_from(count).map_err(|_| bad())?;
    Ok((name, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_encode_then_parse_two_groups() {
        let mut fields = Vec::new();
        encode_group("O", &strs(&["PLB", "VP"]), &mut fields).unwrap();
        encode_group("C", &strs(&["alice", "1118"]), &mut fields).unwrap();
        assert_eq!(fields, strs(&["O 2", "PLB", "VP", "C 2", "alice", "1118"]));

        let groups = parse_groups(&fields, &["O", "C"]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "O");
        assert_eq!(groups[0].items, strs(&["PLB", "VP"]));
        assert_eq!(groups[1].items, strs(&["alice", "1118"]));
    }

    #[test]
    fn test_empty_group_is_allowed() {
        let groups = parse_groups(&strs(&["O 0"]), &["O"]).unwrap();
        assert!(groups[0].items.is_empty());
    }

    #[test]
    fn test_overrun_fails() {
        let err = parse_groups(&strs(&["O 5", "PLB", "VP"]), &["O"]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::GroupOverrun {
                declared: 5,
                available: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_count_exactly_to_end_is_fine() {
        let groups = parse_groups(&strs(&["O 2", "a", "b"]), &["O"]).unwrap();
        assert_eq!(groups[0].items.len(), 2);
    }

    #[test]
    fn test_unknown_and_duplicate_groups_fail() {
        assert!(matches!(
            parse_groups(&strs(&["X 0"]), &["O"]),
            Err(DecodeError::UnknownGroup(_))
        ));
        assert!(matches!(
            parse_groups(&strs(&["O 0", "O 0"]), &["O"]),
            Err(DecodeError::DuplicateGroup(_))
        ));
    }

    #[test]
    fn test_bad_markers_fail() {
        for marker in ["O", " 2", "O -1", "O two", "O 99999999999999999999"] {
            let result = parse_groups(&strs(&[marker]), &["O"]);
            assert!(
                matches!(result, Err(DecodeError::BadGroupMarker(_))),
                "{marker:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_rejects_bad_name_or_item() {
        let mut fields = Vec::new();
        assert!(encode_group("", &[], &mut fields).is_err());
        assert!(encode_group("A B", &[], &mut fields).is_err());
        assert!(encode_group("O", &strs(&["a,b"]), &mut fields).is_err());
        assert!(fields.is_empty());
    }
}
