//! Destination → element map
//!
//! One element per destination. Inserting an existing destination replaces
//! its element. Iteration follows [`Destination`] ordering, so it is stable
//! for a given set of keys.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::destination::Destination;
use super::element::ElementRef;

/// Registry of published elements
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<Destination, ElementRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `element` with `dest`
    ///
    /// Returns the element previously registered there, if any.
    pub fn insert(&mut self, dest: Destination, element: ElementRef) -> Option<ElementRef> {
        self.entries.insert(dest, element)
    }

    /// Shared handle to the element registered at `dest`
    pub fn get(&self, dest: &Destination) -> Option<ElementRef> {
        self.entries.get(dest).map(Rc::clone)
    }

    pub fn remove(&mut self, dest: &Destination) -> Option<ElementRef> {
        self.entries.remove(dest)
    }

    pub fn contains(&self, dest: &Destination) -> bool {
        self.entries.contains_key(dest)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Destination, ElementRef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = (&'a Destination, &'a ElementRef);
    type IntoIter = btree_map::Iter<'a, Destination, ElementRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::element::Element;

    #[test]
    fn test_insert_and_get() {
        let mut registry = Registry::new();
        let dest = Destination::new("127.0.0.1", 9000, "/a");
        let elem = Element::new(1).into_ref();

        assert!(registry.insert(dest.clone(), elem.clone()).is_none());
        let found = registry.get(&dest).unwrap();
        assert!(Rc::ptr_eq(&found, &elem));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = Registry::new();
        let dest = Destination::new("127.0.0.1", 9000, "/a");
        let first = Element::new(1).into_ref();
        let second = Element::new(2).into_ref();

        registry.insert(dest.clone(), first.clone());
        let replaced = registry.insert(dest.clone(), second.clone()).unwrap();

        assert!(Rc::ptr_eq(&replaced, &first));
        assert!(Rc::ptr_eq(&registry.get(&dest).unwrap(), &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_miss_is_none() {
        let registry = Registry::new();
        assert!(registry.get(&Destination::new("h", 1, "/x")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unicast_and_multicast_are_distinct() {
        let mut registry = Registry::new();
        registry.insert(Destination::new("239.0.0.1", 9000, "/x"), Element::new(1).into_ref());
        registry.insert(
            Destination::multicast("239.0.0.1", 9000, "/x"),
            Element::new(2).into_ref(),
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iteration_is_complete_and_ordered() {
        let mut registry = Registry::new();
        for (host, port) in [("c", 1), ("a", 2), ("b", 3)] {
            registry.insert(Destination::new(host, port, "/v"), Element::new(0).into_ref());
        }

        let hosts: Vec<&str> = registry.iter().map(|(d, _)| d.host()).collect();
        assert_eq!(hosts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_drops_registry_handle() {
        let mut registry = Registry::new();
        let dest = Destination::new("h", 1, "/x");
        let elem = Element::new(0).into_ref();
        registry.insert(dest.clone(), elem.clone());
        assert_eq!(Rc::strong_count(&elem), 2);

        registry.remove(&dest);
        assert_eq!(Rc::strong_count(&elem), 1);
        assert!(!registry.contains(&dest));
    }
}
