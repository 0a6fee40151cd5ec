//! Navigation and ordered mutation helpers for [`Element`].

use crate::ooxml::xml::namespace;
use crate::ooxml::xml::tree::{Element, Node, Tree};

/// Depth-first, document-order iterator over the descendants of an element.
///
/// Each call to [`Element::descendants`] starts a fresh traversal.
pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Node::Element(e)) => {
                    self.stack.push(e.children.iter());
                    return Some(e);
                },
                Some(_) => continue,
                None => {
                    self.stack.pop();
                },
            }
        }
    }
}

impl Element {
    /// Direct element children.
    #[inline]
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    #[inline]
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// The `n`th element child, ignoring passthrough nodes.
    #[inline]
    pub fn nth_element(&self, n: usize) -> Option<&Element> {
        self.elements().nth(n)
    }

    #[inline]
    pub fn nth_element_mut(&mut self, n: usize) -> Option<&mut Element> {
        self.elements_mut().nth(n)
    }

    /// First child with the given name.
    #[inline]
    pub fn child(&self, ns: &str, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(ns, local))
    }

    #[inline]
    pub fn child_mut(&mut self, ns: &str, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(ns, local))
    }

    /// All children with the given name.
    pub fn children_named<'a>(
        &'a self,
        ns: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(ns, local))
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        ns: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.elements_mut().filter(move |e| e.is(ns, local))
    }

    /// Follow a chain of child names.
    pub fn path(&self, steps: &[(&str, &str)]) -> Option<&Element> {
        let mut current = self;
        for (ns, local) in steps {
            current = current.child(ns, local)?;
        }
        Some(current)
    }

    pub fn path_mut(&mut self, steps: &[(&str, &str)]) -> Option<&mut Element> {
        let mut current = self;
        for (ns, local) in steps {
            current = current.child_mut(ns, local)?;
        }
        Some(current)
    }

    /// All descendants in document order, excluding `self`.
    #[inline]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Visit every descendant element in document order.
    ///
    /// The callback runs on a parent before its children, so children it
    /// inserts are visited as well.
    pub fn for_each_element_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        for child in self.elements_mut() {
            f(child);
            child.for_each_element_mut(f);
        }
    }

    /// Insert `child` at the position given by a schema sequence.
    ///
    /// `order` lists local names in the order the schema requires. The new
    /// element goes before the first existing sibling that the sequence
    /// places after it; names absent from `order` are appended.
    pub fn insert_ordered(&mut self, child: Element, order: &[&str]) -> usize {
        let index = match order.iter().position(|n| *n == child.local_name()) {
            Some(rank) => self
                .children
                .iter()
                .position(|node| {
                    node.as_element()
                        .and_then(|e| order.iter().position(|n| *n == e.local_name()))
                        .is_some_and(|r| r > rank)
                })
                .unwrap_or(self.children.len()),
            None => self.children.len(),
        };
        self.children.insert(index, Node::Element(child));
        index
    }

    /// Get the named child in `self`'s namespace, creating it in schema
    /// position when absent.
    pub fn ensure_child(&mut self, local: &str, order: &[&str]) -> &mut Element {
        let template = self.sibling(local);
        self.ensure_with(template, order)
    }

    /// Like [`Element::ensure_child`] for a child in a different namespace.
    pub fn ensure_child_in(&mut self, ns: &str, local: &str, order: &[&str]) -> &mut Element {
        let prefix = self
            .elements()
            .find(|e| e.namespace() == Some(ns))
            .map(|e| e.prefix().to_string())
            .or_else(|| namespace::preferred_prefix(ns).map(str::to_string))
            .unwrap_or_default();
        self.ensure_with(Element::new(&prefix, ns, local), order)
    }

    fn ensure_with(&mut self, template: Element, order: &[&str]) -> &mut Element {
        let ns = template.namespace().unwrap_or_default().to_string();
        let existing = self
            .children
            .iter()
            .position(|n| n.as_element().is_some_and(|e| e.is(&ns, template.local_name())));
        let index = match existing {
            Some(index) => index,
            None => self.insert_ordered(template, order),
        };
        if let Node::Element(e) = &mut self.children[index] {
            return e;
        }
        unreachable!("child {index} was located as an element")
    }

    /// Remove direct element children matching `pred`, returning how many.
    pub fn remove_elements(&mut self, mut pred: impl FnMut(&Element) -> bool) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if pred(e)));
        before - self.children.len()
    }
}

impl Tree {
    /// Lazily find every element, including the root, matching `pred`.
    ///
    /// The iterator is finite and each call restarts from the root.
    pub fn find_all<'a, P>(&'a self, pred: P) -> impl Iterator<Item = &'a Element> + 'a
    where
        P: Fn(&Element) -> bool + 'a,
    {
        std::iter::once(self.root())
            .chain(self.root().descendants())
            .filter(move |e| pred(e))
    }
}
