//! Identifier invariants of element collections under arbitrary edits.

use balloon_model::{Element, ElementCollection, SchemaError, Telecommand};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Append(u8),
    Replace(usize, u8),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0u8..12).prop_map(Edit::Append),
        (0usize..16, 0u8..12).prop_map(|(index, name)| Edit::Replace(index, name)),
    ]
}

fn command(name: u8) -> Telecommand {
    Telecommand::new(format!("CMD_{name}"), "")
}

proptest! {
    #[test]
    fn ids_stay_dense_and_names_unique(edits in prop::collection::vec(edit_strategy(), 0..40)) {
        let mut collection: ElementCollection<Telecommand> = ElementCollection::new();
        for edit in edits {
            let before = collection.clone();
            let result = match edit {
                Edit::Append(name) => collection.append(command(name)),
                Edit::Replace(index, name) => collection.replace_at(index, command(name)),
            };
            match result {
                Ok(id) => {
                    let stamped = collection.get(id.index()).map(Element::id);
                    prop_assert_eq!(stamped, Some(id));
                }
                Err(_) => {
                    prop_assert_eq!(&collection, &before);
                }
            }
            for (index, element) in collection.iter().enumerate() {
                prop_assert_eq!(element.id().index(), index);
            }
            let mut names = collection.names();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), collection.len());
        }
    }
}

#[test]
fn append_then_replace_last_keeps_length() {
    let mut collection = ElementCollection::new();
    collection.append(command(1)).unwrap();
    collection.append(command(2)).unwrap();
    let last = collection.len() - 1;

    let id = collection
        .replace_at(last, Telecommand::new("CMD_2", "renamed fields").debug(true))
        .unwrap();

    assert_eq!(collection.len(), 2);
    assert_eq!(id.index(), last);
    let replaced = collection.get(last).unwrap();
    assert!(replaced.is_debug);
    assert_eq!(replaced.id().index(), last);
}

#[test]
fn ping_example() {
    let mut collection = ElementCollection::new();
    let id = collection.append(Telecommand::new("PING", "")).unwrap();
    assert_eq!(id.index(), 0);
    assert_eq!(collection.get(0).unwrap().id().index(), 0);

    let err = collection.append(Telecommand::new("PING", "")).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, SchemaError::DuplicateName { .. }));
    assert_eq!(collection.len(), 1);
}
