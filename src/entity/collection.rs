//! Containers that can back a collection relation.

use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::set::MutableValues;
use indexmap::IndexSet;

use crate::schema::Record;

/// A collection member: something children can be appended to and searched.
///
/// Implemented for `Vec`, `VecDeque`, `IndexSet` and `Option<C>` of any of
/// them. An `Option` container starts as `None` and is allocated by
/// [`initialize`] the first time its parent is materialized, so
/// `Option<IndexSet<C>>` is the lazily created set-backed member.
///
/// [`initialize`]: MemberCollection::initialize
pub trait MemberCollection: 'static {
    type Item: Record;

    /// Makes the container ready for appends. Idempotent.
    fn initialize(&mut self) {}

    fn position(&self, matches: &dyn Fn(&Self::Item) -> bool) -> Option<usize>;

    fn get_mut(&mut self, index: usize) -> Option<&mut Self::Item>;

    fn add(&mut self, item: Self::Item);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: Record> MemberCollection for Vec<C> {
    type Item = C;

    fn position(&self, matches: &dyn Fn(&C) -> bool) -> Option<usize> {
        self.iter().position(matches)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.as_mut_slice().get_mut(index)
    }

    fn add(&mut self, item: C) {
        self.push(item);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<C: Record> MemberCollection for VecDeque<C> {
    type Item = C;

    fn position(&self, matches: &dyn Fn(&C) -> bool) -> Option<usize> {
        self.iter().position(matches)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        VecDeque::get_mut(self, index)
    }

    fn add(&mut self, item: C) {
        self.push_back(item);
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

/// Insertion-ordered set. Adding an item equal to one already present is a
/// no-op. `Hash` and `Eq` of the item must not depend on its nested
/// relations, since those are filled in after insertion.
impl<C: Record + Hash + Eq> MemberCollection for IndexSet<C> {
    type Item = C;

    fn position(&self, matches: &dyn Fn(&C) -> bool) -> Option<usize> {
        self.iter().position(matches)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.get_index_mut2(index)
    }

    fn add(&mut self, item: C) {
        self.insert(item);
    }

    fn len(&self) -> usize {
        IndexSet::len(self)
    }
}

impl<L: MemberCollection + Default> MemberCollection for Option<L> {
    type Item = L::Item;

    fn initialize(&mut self) {
        self.get_or_insert_with(L::default).initialize();
    }

    fn position(&self, matches: &dyn Fn(&Self::Item) -> bool) -> Option<usize> {
        self.as_ref().and_then(|inner| inner.position(matches))
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut Self::Item> {
        self.as_mut().and_then(|inner| inner.get_mut(index))
    }

    fn add(&mut self, item: Self::Item) {
        self.get_or_insert_with(L::default).add(item);
    }

    fn len(&self) -> usize {
        self.as_ref().map_or(0, |inner| inner.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Item;
    use rstest::rstest;

    fn item(sku: &str) -> Item {
        Item {
            sku: sku.into(),
            quantity: 1,
        }
    }

    #[rstest]
    fn test_vec_add_and_find() {
        let mut items: Vec<Item> = Vec::new();
        items.add(item("A"));
        items.add(item("B"));
        assert_eq!(MemberCollection::len(&items), 2);
        assert_eq!(items.position(&|i: &Item| i.sku == "B"), Some(1));
        assert_eq!(items.position(&|i: &Item| i.sku == "C"), None);
    }

    #[rstest]
    fn test_option_initializes_lazily() {
        let mut items: Option<Vec<Item>> = None;
        assert_eq!(MemberCollection::len(&items), 0);
        assert_eq!(items.position(&|_: &Item| true), None);

        items.initialize();
        assert_eq!(items, Some(Vec::new()));

        // A second initialization keeps existing children
        items.add(item("A"));
        items.initialize();
        assert_eq!(items.as_ref().map(Vec::len), Some(1));
    }

    #[rstest]
    fn test_vec_deque_get_mut() {
        let mut items: VecDeque<Item> = VecDeque::new();
        items.add(item("A"));
        if let Some(first) = MemberCollection::get_mut(&mut items, 0) {
            first.quantity = 5;
        }
        assert_eq!(items[0].quantity, 5);
    }

    #[rstest]
    fn test_index_set_keeps_insertion_order_without_duplicates() {
        let mut items: IndexSet<Item> = IndexSet::new();
        items.add(item("B"));
        items.add(item("A"));
        items.add(item("B"));
        assert_eq!(MemberCollection::len(&items), 2);
        assert_eq!(items.position(&|i: &Item| i.sku == "A"), Some(1));
        assert_eq!(MemberCollection::get_mut(&mut items, 1).map(|i| i.sku.clone()), Some("A".to_string()));
    }

    #[rstest]
    fn test_optional_index_set_initializes_lazily() {
        let mut items: Option<IndexSet<Item>> = None;
        items.initialize();
        assert_eq!(items.as_ref().map(IndexSet::len), Some(0));
        items.add(item("A"));
        items.add(item("A"));
        assert_eq!(MemberCollection::len(&items), 1);
    }
}
