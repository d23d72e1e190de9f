//! Property-based tests for the parser
//!
//! Generated inputs check the structural guarantees: parsing is total and
//! deterministic, child order survives, separators are interchangeable,
//! property blocks read back exactly, and escape blocks capture any payload
//! verbatim.

use don::parse;
use proptest::prelude::*;

proptest! {
    #[test]
    fn parsing_never_panics(input in ".*") {
        let _ = parse(&input);
    }

    #[test]
    fn reparsing_is_deterministic(input in ".*") {
        prop_assert_eq!(parse(&input), parse(&input));
    }

    #[test]
    fn child_order_is_preserved(
        names in prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,8}", 1..8),
    ) {
        let tree = parse(&names.join(",")).unwrap();
        prop_assert_eq!(tree.children.len(), names.len());
        for (child, name) in tree.children.iter().zip(&names) {
            prop_assert_eq!(&child.name, name);
        }
    }

    #[test]
    fn comma_and_newline_separators_are_equivalent(
        names in prop::collection::vec("[A-Za-z][A-Za-z0-9]{0,8}", 1..8),
    ) {
        prop_assert_eq!(
            parse(&names.join(",")).unwrap(),
            parse(&names.join("\n")).unwrap(),
        );
    }

    #[test]
    fn properties_survive_a_round_trip(
        entries in prop::collection::hash_map(
            "[a-z][a-z0-9]{0,8}",
            "[A-Za-z0-9][A-Za-z0-9 ]{0,10}",
            1..6,
        ),
    ) {
        let body = entries
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",");
        let tree = parse(&format!("Item({body})")).unwrap();

        let item = &tree.children[0];
        prop_assert_eq!(item.properties.len(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(item.properties.get(key), Some(Some(value.as_str())));
        }
    }

    #[test]
    fn escape_blocks_capture_anything(payload in "[^|]{1,30}") {
        let tree = parse(&format!("||{payload}||")).unwrap();
        prop_assert_eq!(tree.children.len(), 1);
        prop_assert_eq!(tree.children[0].name.as_str(), payload.as_str());
    }

    #[test]
    fn integer_lists_round_trip(values in prop::collection::vec(any::<i64>(), 0..10)) {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let tree = parse(&joined).unwrap();
        prop_assert_eq!(tree.deserialize::<Vec<i64>>().unwrap(), values);
    }
}
