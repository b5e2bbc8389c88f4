//! Ordered, uniquely named, densely identified element lists.
//!
//! Identifiers are positions: after every mutation `elements[i].id() == i`.
//! Collections grow by [`ElementCollection::append`] and change by
//! [`ElementCollection::replace_at`]; they never shrink.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EntryKind, Result, SchemaError, validate_name};

/// Position of an element in its collection.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(usize);

impl ElementId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entry that lives in an [`ElementCollection`].
pub trait Element: Clone {
    const KIND: EntryKind;

    fn id(&self) -> ElementId;

    fn name(&self) -> &str;

    /// Re-stamp the element with a new identifier.
    fn with_id(self, id: ElementId) -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementCollection<T> {
    elements: Vec<T>,
}

impl<T> Default for ElementCollection<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T: Element> ElementCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.elements.iter().find(|element| element.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn names(&self) -> Vec<&str> {
        self.elements.iter().map(Element::name).collect()
    }

    /// Add `element` at the end. Returns the identifier it was stamped with.
    pub fn append(&mut self, element: T) -> Result<ElementId> {
        let (next, id) = self.renumbered(element, None)?;
        self.elements = next;
        Ok(id)
    }

    /// Overwrite the element at `index`, keeping its position and identifier.
    ///
    /// The new element may keep the old name; it may not take the name of
    /// any other element.
    pub fn replace_at(&mut self, index: usize, element: T) -> Result<ElementId> {
        let (next, id) = self.renumbered(element, Some(index))?;
        self.elements = next;
        Ok(id)
    }

    /// Removal would need a renumbering policy for every reference to the
    /// shifted identifiers, which the schema does not define.
    pub fn remove(&mut self, _index: usize) -> Result<T> {
        Err(SchemaError::Unsupported {
            operation: "removing schema elements",
        })
    }

    /// Build the next element list without touching `self`.
    fn renumbered(&self, element: T, replace_index: Option<usize>) -> Result<(Vec<T>, ElementId)> {
        validate_name(T::KIND, element.name())?;
        let prior_names = self.names();
        if let Some(index) = replace_index {
            if prior_names.is_empty() {
                return Err(SchemaError::EmptyCollection { kind: T::KIND });
            }
            if index >= prior_names.len() {
                return Err(SchemaError::IndexOutOfRange {
                    kind: T::KIND,
                    index,
                    len: prior_names.len(),
                });
            }
        }
        let clashes = prior_names
            .iter()
            .enumerate()
            .any(|(position, name)| Some(position) != replace_index && *name == element.name());
        if clashes {
            return Err(SchemaError::DuplicateName {
                kind: T::KIND,
                name: element.name().to_string(),
            });
        }

        let mut candidate_names = prior_names;
        candidate_names.push(element.name());
        let id_space: Vec<ElementId> = (0..candidate_names.len()).map(ElementId::new).collect();

        let mut next: Vec<T> = self
            .elements
            .iter()
            .cloned()
            .zip(id_space.iter().copied())
            .map(|(prior, id)| prior.with_id(id))
            .collect();
        let id = match replace_index {
            None => {
                let id = id_space[next.len()];
                next.push(element.with_id(id));
                id
            }
            Some(index) => {
                // The fresh identifier at the end of the space belongs to no
                // slot; a replacement takes the identifier of its position.
                let id = id_space[index];
                next[index] = element.with_id(id);
                id
            }
        };
        tracing::debug!(
            kind = %T::KIND,
            id = id.index(),
            len = next.len(),
            replaced = replace_index.is_some(),
            "renumbered collection"
        );
        Ok((next, id))
    }
}

impl<'a, T> IntoIterator for &'a ElementCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: ElementId,
        name: String,
        payload: u32,
    }

    impl Item {
        fn new(name: &str, payload: u32) -> Self {
            Self {
                id: ElementId::new(99),
                name: name.to_string(),
                payload,
            }
        }
    }

    impl Element for Item {
        const KIND: EntryKind = EntryKind::Configuration;

        fn id(&self) -> ElementId {
            self.id
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn with_id(self, id: ElementId) -> Self {
            Self { id, ..self }
        }
    }

    fn assert_dense(collection: &ElementCollection<Item>) {
        for (index, item) in collection.iter().enumerate() {
            assert_eq!(item.id().index(), index);
        }
    }

    #[test]
    fn first_append_gets_id_zero() {
        let mut collection = ElementCollection::new();
        let id = collection.append(Item::new("PING", 1)).unwrap();
        assert_eq!(id, ElementId::new(0));
        assert_eq!(collection.len(), 1);
        assert_dense(&collection);
    }

    #[test]
    fn duplicate_append_leaves_collection_unchanged() {
        let mut collection = ElementCollection::new();
        collection.append(Item::new("PING", 1)).unwrap();
        collection.append(Item::new("RESET", 2)).unwrap();
        let before = collection.clone();

        let err = collection.append(Item::new("PING", 3)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName {
                kind: EntryKind::Configuration,
                name: "PING".to_string(),
            }
        );
        assert_eq!(collection, before);
    }

    #[test]
    fn replace_keeps_position_and_identifier() {
        let mut collection = ElementCollection::new();
        collection.append(Item::new("A", 1)).unwrap();
        collection.append(Item::new("B", 2)).unwrap();
        collection.append(Item::new("C", 3)).unwrap();

        let id = collection.replace_at(1, Item::new("B2", 20)).unwrap();
        assert_eq!(id, ElementId::new(1));
        assert_eq!(collection.names(), vec!["A", "B2", "C"]);
        assert_eq!(collection.get(1).unwrap().payload, 20);
        assert_dense(&collection);
    }

    #[test]
    fn replace_last_with_same_name() {
        let mut collection = ElementCollection::new();
        collection.append(Item::new("A", 1)).unwrap();
        collection.append(Item::new("B", 2)).unwrap();

        collection.replace_at(1, Item::new("B", 5)).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(1).unwrap().id(), ElementId::new(1));
        assert_eq!(collection.get(1).unwrap().payload, 5);
    }

    #[test]
    fn replace_rejects_name_of_another_element() {
        let mut collection = ElementCollection::new();
        collection.append(Item::new("A", 1)).unwrap();
        collection.append(Item::new("B", 2)).unwrap();
        let before = collection.clone();

        assert!(matches!(
            collection.replace_at(0, Item::new("B", 3)),
            Err(SchemaError::DuplicateName { .. })
        ));
        assert_eq!(collection, before);
    }

    #[test]
    fn replace_rejects_bad_indices() {
        let mut collection: ElementCollection<Item> = ElementCollection::new();
        assert_eq!(
            collection.replace_at(0, Item::new("A", 1)).unwrap_err(),
            SchemaError::EmptyCollection {
                kind: EntryKind::Configuration
            }
        );
        collection.append(Item::new("A", 1)).unwrap();
        assert_eq!(
            collection.replace_at(1, Item::new("B", 1)).unwrap_err(),
            SchemaError::IndexOutOfRange {
                kind: EntryKind::Configuration,
                index: 1,
                len: 1,
            }
        );
        assert_eq!(collection.names(), vec!["A"]);
    }

    #[test]
    fn remove_is_unsupported() {
        let mut collection = ElementCollection::new();
        collection.append(Item::new("A", 1)).unwrap();
        assert!(matches!(
            collection.remove(0),
            Err(SchemaError::Unsupported { .. })
        ));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn rejects_invalid_names() {
        let mut collection = ElementCollection::new();
        assert!(matches!(
            collection.append(Item::new("", 1)),
            Err(SchemaError::InvalidName { .. })
        ));
        assert!(collection.is_empty());
    }
}
