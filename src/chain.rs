//! Singly-linked ownership chains
//!
//! Repeatable sub-records of an entity (binary data chunks, object-id
//! references) are kept in a [`LinkedChain`]. Every node is owned by exactly
//! one predecessor (or by the chain head) and there are no back-pointers, so
//! appending walks to the tail.

use std::fmt;

struct ChainNode<T> {
    value: T,
    next: Option<Box<ChainNode<T>>>,
}

/// A singly-linked chain of homogeneous sub-records.
pub struct LinkedChain<T> {
    head: Option<Box<ChainNode<T>>>,
}

impl<T> LinkedChain<T> {
    /// Create an empty chain
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Attach `value` after the current tail. O(n).
    pub fn append(&mut self, value: T) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(ChainNode { value, next: None }));
    }

    /// The first node, if any.
    pub fn first(&self) -> Option<&T> {
        self.head.as_deref().map(|node| &node.value)
    }

    /// The tail node. A one-node chain returns its head; only an empty chain
    /// returns `None`.
    pub fn last(&self) -> Option<&T> {
        let mut node = self.head.as_deref()?;
        while let Some(next) = node.next.as_deref() {
            node = next;
        }
        Some(&node.value)
    }

    /// Mutable access to the tail node.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        let mut node = self.head.as_deref_mut()?;
        while node.next.is_some() {
            node = node.next.as_deref_mut()?;
        }
        Some(&mut node.value)
    }

    /// Node at position `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.iter().nth(index)
    }

    /// Number of nodes (walks the chain).
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterate in chain order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Consume the chain, releasing every node.
    ///
    /// Each node is detached from its successor before it is dropped, so the
    /// walk is iterative however long the chain is.
    pub fn free_all(mut self) {
        self.release();
    }

    /// Detach and release every node, leaving the chain empty.
    pub fn clear(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
    }
}

impl<T> Drop for LinkedChain<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> Default for LinkedChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for LinkedChain<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for LinkedChain<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for LinkedChain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = LinkedChain::new();
        // Keep a cursor on the tail so collecting stays linear.
        let mut tail = &mut chain.head;
        for value in iter {
            let node = tail.insert(Box::new(ChainNode { value, next: None }));
            tail = &mut node.next;
        }
        chain
    }
}

impl<T> Extend<T> for LinkedChain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

/// Borrowing iterator over a chain.
pub struct Iter<'a, T> {
    next: Option<&'a ChainNode<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a LinkedChain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator; nodes are unlinked one at a time.
pub struct IntoIter<T> {
    chain: LinkedChain<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut node = self.chain.head.take()?;
        self.chain.head = node.next.take();
        Some(node.value)
    }
}

impl<T> IntoIterator for LinkedChain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { chain: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut chain = LinkedChain::new();
        chain.append(1);
        chain.append(2);
        chain.append(3);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(chain.first(), Some(&1));
        assert_eq!(chain.get(1), Some(&2));
    }

    #[test]
    fn test_last_contract() {
        let mut chain: LinkedChain<&str> = LinkedChain::new();
        assert_eq!(chain.last(), None);
        chain.append("head");
        assert_eq!(chain.last(), Some(&"head"));
        chain.append("tail");
        assert_eq!(chain.last(), Some(&"tail"));
        *chain.last_mut().unwrap() = "changed";
        assert_eq!(chain.last(), Some(&"changed"));
    }

    #[test]
    fn test_free_all_long_chain() {
        let chain: LinkedChain<u32> = (0..200_000).collect();
        assert_eq!(chain.last(), Some(&199_999));
        chain.free_all();
    }

    #[test]
    fn test_into_iter_and_eq() {
        let a: LinkedChain<i32> = vec![4, 5, 6].into_iter().collect();
        let b = a.clone();
        assert_eq!(a, b);
        let values: Vec<i32> = a.into_iter().collect();
        assert_eq!(values, vec![4, 5, 6]);
        assert_eq!(format!("{:?}", b), "[4, 5, 6]");
    }

    #[test]
    fn test_clear_and_extend() {
        let mut chain: LinkedChain<i32> = LinkedChain::new();
        chain.extend([1, 2]);
        chain.clear();
        assert!(chain.is_empty());
        chain.extend([7]);
        assert_eq!(chain.len(), 1);
    }
}
