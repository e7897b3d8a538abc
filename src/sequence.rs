//! Navigation between the pages of the comic. A [`Sequence`] is the only
//! ordering authority: pages are kept in the order they were published, and
//! the first/previous/next/last relations of a page are computed from its
//! position rather than stored on the page. Relinking after a change is
//! therefore implicit: every call to [`Sequence::links`] sees the current
//! collection.

use std::fmt;

/// The navigational references of one item of an ordered collection. Each
/// reference is `None` at the corresponding boundary of the collection.
pub struct Links<'a, T> {
    /// The collection's first item, unless this *is* the first item.
    pub first: Option<&'a T>,

    /// The item immediately before this one.
    pub previous: Option<&'a T>,

    /// The item immediately after this one.
    pub next: Option<&'a T>,

    /// The collection's last item, unless this *is* the last item.
    pub last: Option<&'a T>,
}

impl<'a, T> Links<'a, T> {
    /// Links with every reference empty, which is what the sole item of a
    /// one-item collection gets.
    pub fn empty() -> Links<'a, T> {
        Links {
            first: None,
            previous: None,
            next: None,
            last: None,
        }
    }

    /// `true` when the item is the first of its collection.
    pub fn is_first(&self) -> bool {
        self.first.is_none()
    }

    /// `true` when the item is the newest one. The newest page is also
    /// written as the site's home page.
    pub fn is_last(&self) -> bool {
        self.last.is_none()
    }
}

// Manual impls: deriving would needlessly require `T: Clone`.
impl<T> Clone for Links<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Links<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Links<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Links")
            .field("first", &self.first)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("last", &self.last)
            .finish()
    }
}

/// Computes the [`Links`] for the item at `index` of `items`.
pub fn link<T>(items: &[T], index: usize) -> Links<'_, T> {
    let len = items.len();
    Links {
        first: if len > 0 && index != 0 {
            items.first()
        } else {
            None
        },
        previous: index.checked_sub(1).and_then(|i| items.get(i)),
        next: index.checked_add(1).and_then(|i| items.get(i)),
        last: if len > 0 && index != len - 1 {
            items.last()
        } else {
            None
        },
    }
}

/// An ordered collection of pages (or anything else that needs linking).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Sequence<T> {
    pub fn new(items: Vec<T>) -> Sequence<T> {
        Sequence { items }
    }

    /// Appends an item. Links of existing items reflect the new item
    /// immediately.
    pub fn push(&mut self, item: T) {
        self.items.push(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// The links for the item at `index`. See [`link`].
    pub fn links(&self, index: usize) -> Links<'_, T> {
        link(&self.items, index)
    }

    /// Iterates over every item together with its links, in sequence order.
    pub fn linked(&self) -> impl Iterator<Item = (&T, Links<'_, T>)> {
        self.items
            .iter()
            .enumerate()
            .map(move |(i, item)| (item, self.links(i)))
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Sequence { items: Vec::new() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn all_links<T: Copy>(items: &[T]) -> Vec<[Option<T>; 4]> {
        (0..items.len())
            .map(|i| {
                let l = link(items, i);
                [
                    l.first.copied(),
                    l.previous.copied(),
                    l.next.copied(),
                    l.last.copied(),
                ]
            })
            .collect()
    }

    #[test]
    fn test_link_empty() {
        let items: [char; 0] = [];
        assert!(all_links(&items).is_empty());
        let sequence = Sequence::<char>::default();
        assert!(sequence.is_empty());
        assert!(sequence.linked().next().is_none());
    }

    #[test]
    fn test_link_single() {
        let links = link(&['A'], 0);
        assert!(links.first.is_none());
        assert!(links.previous.is_none());
        assert!(links.next.is_none());
        assert!(links.last.is_none());
        assert!(links.is_first() && links.is_last());
    }

    #[test]
    fn test_link_three() {
        let got = all_links(&['A', 'B', 'C']);
        assert_eq!(
            vec![
                [None, None, Some('B'), Some('C')],
                [Some('A'), Some('A'), Some('C'), Some('C')],
                [Some('A'), Some('B'), None, None],
            ],
            got
        );
    }

    #[test]
    fn test_link_interior_fully_populated() {
        let items: Vec<u32> = (0..7).collect();
        for i in 1..items.len() - 1 {
            let l = link(&items, i);
            assert!(l.first.is_some());
            assert!(l.previous.is_some());
            assert!(l.next.is_some());
            assert!(l.last.is_some());
        }
        let head = link(&items, 0);
        assert!(head.first.is_none() && head.previous.is_none());
        let tail = link(&items, items.len() - 1);
        assert!(tail.last.is_none() && tail.next.is_none());
    }

    #[test]
    fn test_only_final_item_is_last() {
        let sequence = Sequence::new(vec![1, 2, 3, 4]);
        let last: Vec<i32> = sequence
            .linked()
            .filter(|(_, links)| links.is_last())
            .map(|(item, _)| *item)
            .collect();
        assert_eq!(vec![4], last);
    }

    #[test]
    fn test_push_relinks() {
        let mut sequence = Sequence::new(vec!['A', 'B']);
        assert!(sequence.links(1).is_last());
        sequence.push('C');
        assert_eq!(3, sequence.len());
        assert!(!sequence.is_empty());
        let links = sequence.links(1);
        assert_eq!(Some(&'C'), links.next);
        assert_eq!(Some(&'C'), links.last);
    }
}
