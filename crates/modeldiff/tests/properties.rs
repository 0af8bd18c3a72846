//! Property-based checks of the diff engine.

use std::collections::BTreeMap;

use modeldiff::{diff, record, DiffKind};
use proptest::prelude::*;

record! {
    #[derive(Clone, Debug)]
    pub struct Item {
        pub id: u32 as "Id",
        pub label: String as "Label",
        pub weight: Option<i64> as "Weight",
        pub reading: f64 as "Reading",
    }
}

record! {
    #[derive(Clone, Debug)]
    pub struct Inventory {
        pub owner: String as "Owner",
        pub items: Vec<Item> as "Items" => "Id",
        pub pinned: Vec<Item> as "Pinned" => "Id,direct",
        pub history: Vec<i32> as "History",
        pub samples: Vec<f64> as "Samples",
        pub attributes: BTreeMap<String, bool> as "Attributes",
        pub note: Option<Box<Item>> as "Note",
    }
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (
        any::<u32>(),
        "[a-z]{0,8}",
        proptest::option::of(any::<i64>()),
        proptest::num::f64::ANY,
    )
        .prop_map(|(id, label, weight, reading)| Item {
            id,
            label,
            weight,
            reading,
        })
}

/// Items with pairwise distinct ids.
fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::btree_map(any::<u32>(), item_strategy(), 0..6).prop_map(|by_id| {
        by_id
            .into_iter()
            .map(|(id, item)| Item { id, ..item })
            .collect()
    })
}

fn inventory_strategy() -> impl Strategy<Value = Inventory> {
    (
        "[a-z]{1,10}",
        items_strategy(),
        items_strategy(),
        proptest::collection::vec(any::<i32>(), 0..5),
        proptest::collection::vec(proptest::num::f64::ANY, 0..5),
        proptest::collection::btree_map("[a-z]{1,4}", any::<bool>(), 0..4),
        proptest::option::of(item_strategy()),
    )
        .prop_map(|(owner, items, pinned, history, samples, attributes, note)| Inventory {
            owner,
            items,
            pinned,
            history,
            samples,
            attributes,
            note: note.map(Box::new),
        })
}

proptest! {
    #[test]
    fn diff_with_itself_is_empty(inventory in inventory_strategy()) {
        let details = diff(&inventory, &inventory).unwrap();
        prop_assert!(details.is_empty());
        prop_assert!(details.change.is_none());
        prop_assert!(details.add.is_none());
        prop_assert!(details.del.is_none());
    }

    #[test]
    fn owner_change_is_a_single_change(inventory in inventory_strategy(), suffix in "[0-9]{1,3}") {
        let mut new = inventory.clone();
        new.owner.push_str(&suffix);
        let details = diff(&new, &inventory).unwrap();
        prop_assert_eq!(details.len(), 1);
        prop_assert_eq!(
            details.get(DiffKind::Change, "Owner"),
            Some(&serde_json::Value::String(inventory.owner.clone()))
        );
    }

    #[test]
    fn dropping_all_items_deletes_each(inventory in inventory_strategy()) {
        let mut new = inventory.clone();
        new.items.clear();
        let details = diff(&new, &inventory).unwrap();
        prop_assert_eq!(details.deletions(), inventory.items.len());
        prop_assert_eq!(details.additions(), 0);
        for item in &inventory.items {
            let path = format!("Items.#(Id=={})", item.id);
            prop_assert!(details.get(DiffKind::Del, &path).is_some());
        }
    }
}
