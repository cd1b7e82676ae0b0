use std::cmp::Ordering;

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    children: Vec<usize>,
}

/// Meldable min heap, a pairing heap with one pass pairing on extraction.
///
/// Nodes live in an arena and refer to their children by index. Slots of extracted nodes go
/// to a free list and are reused by later insertions, so the arena never grows beyond the
/// largest number of values held at once.
///
/// # Examples
/// ```
/// use table_file_sort::pairing_heap::PairingHeap;
/// let mut heap = PairingHeap::natural();
/// for i in [5, 4, 3, 2, 1] {
///     heap.insert(i);
/// }
/// assert_eq!(heap.extract_min(), Some(1));
/// assert_eq!(heap.peek_min(), Some(&2));
/// ```
pub struct PairingHeap<T, C>
    where C: Fn(&T, &T) -> Ordering {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
    cmp: C,
}

impl<T: Ord> PairingHeap<T, fn(&T, &T) -> Ordering> {
    /// Heap ordered by the natural order of `T`
    pub fn natural() -> Self {
        PairingHeap::new(T::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C> PairingHeap<T, C>
    where C: Fn(&T, &T) -> Ordering {
    pub fn new(cmp: C) -> PairingHeap<T, C> {
        PairingHeap {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn insert(&mut self, value: T) {
        let node = self.allocate(value);
        self.root = match self.root {
            None => Some(node),
            Some(root) => Some(self.meld_nodes(root, node)),
        };
        self.len += 1;
    }

    pub fn insert_all<I: IntoIterator<Item=T>>(&mut self, values: I) {
        for value in values {
            self.insert(value);
        }
    }

    pub fn peek_min(&self) -> Option<&T> {
        self.root.and_then(|root| self.nodes[root].value.as_ref())
    }

    pub fn extract_min(&mut self) -> Option<T> {
        let root = self.root?;
        let value = self.nodes[root].value.take();
        let children = std::mem::take(&mut self.nodes[root].children);
        self.free.push(root);
        self.len -= 1;
        let new_root = children.into_iter()
            .reduce(|melded, child| self.meld_nodes(melded, child));
        self.root = new_root;
        value
    }

    /// Move every value of `other` into this heap
    pub fn meld(&mut self, mut other: PairingHeap<T, C>) {
        let other_root = match other.root {
            None => return,
            Some(root) => root,
        };
        let base = self.nodes.len();
        for node in other.nodes.drain(..) {
            self.nodes.push(
                Node {
                    value: node.value,
                    children: node.children.into_iter().map(|child| child + base).collect(),
                }
            );
        }
        self.free.extend(other.free.iter().map(|i| i + base));
        self.len += other.len;
        self.root = match self.root {
            None => Some(other_root + base),
            Some(root) => Some(self.meld_nodes(root, other_root + base)),
        };
    }

    fn allocate(&mut self, value: T) -> usize {
        let node = Node {
            value: Some(value),
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = node;
                i
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    // the root with the larger value becomes a child of the other, ties keep `a` on top
    fn meld_nodes(&mut self, a: usize, b: usize) -> usize {
        let a_first = match (&self.nodes[a].value, &self.nodes[b].value) {
            (Some(va), Some(vb)) => (self.cmp)(va, vb) != Ordering::Greater,
            (_, None) => true,
            (None, _) => false,
        };
        if a_first {
            self.nodes[a].children.push(b);
            a
        } else {
            self.nodes[b].children.push(a);
            b
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::{Ordering, Reverse};
    use std::collections::BinaryHeap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::pairing_heap::PairingHeap;

    #[test]
    fn test_simple() {
        let mut heap = PairingHeap::natural();
        heap.insert_all(vec![5, 4, 3, 2, 1]);
        assert_eq!(heap.len(), 5);
        for expected in 1..=5 {
            assert_eq!(heap.extract_min(), Some(expected));
        }
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), None);
        assert_eq!(heap.peek_min(), None);

        heap.insert_all(vec![1, 2, 1, 2, 1]);
        let drained: Vec<i32> = std::iter::from_fn(|| heap.extract_min()).collect();
        assert_eq!(drained, vec![1, 1, 1, 2, 2]);

        heap.insert(5);
        assert_eq!(heap.extract_min(), Some(5));
        heap.insert(1);
        assert_eq!(heap.extract_min(), Some(1));
    }

    #[test]
    fn test_custom_order() {
        let mut heap = PairingHeap::new(|a: &i32, b: &i32| b.cmp(a));
        heap.insert_all(vec![3, 9, 1]);
        assert_eq!(heap.extract_min(), Some(9));
        assert_eq!(heap.extract_min(), Some(3));
    }

    #[test]
    fn test_meld() {
        let mut a = PairingHeap::natural();
        a.insert_all(vec![7, 3, 11]);
        let mut b = PairingHeap::natural();
        b.insert_all(vec![4, 1, 20]);
        b.extract_min();
        a.meld(b);
        assert_eq!(a.len(), 5);
        let drained: Vec<i32> = std::iter::from_fn(|| a.extract_min()).collect();
        assert_eq!(drained, vec![3, 4, 7, 11, 20]);

        let mut empty: PairingHeap<i32, fn(&i32, &i32) -> Ordering> = PairingHeap::natural();
        empty.meld(PairingHeap::natural());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_slots_reused() {
        let mut heap = PairingHeap::natural();
        for i in 0..1000 {
            heap.insert(i % 7);
            heap.insert(i % 5);
            heap.extract_min();
            heap.extract_min();
        }
        assert!(heap.nodes.len() <= 2);
    }

    #[test]
    fn test_against_binary_heap() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut heap = PairingHeap::new(|a: &i64, b: &i64| a.cmp(b));
        let mut queue = BinaryHeap::new();
        for _ in 0..200_000 {
            match rng.gen_range(0..4) {
                0 | 1 => {
                    let value = rng.gen_range(-1000..1000);
                    heap.insert(value);
                    queue.push(Reverse(value));
                }
                2 => {
                    assert_eq!(heap.peek_min().copied(), queue.peek().map(|r| r.0));
                }
                _ => {
                    assert_eq!(heap.extract_min(), queue.pop().map(|r| r.0));
                }
            }
            assert_eq!(heap.len(), queue.len());
        }
        let mut previous = None;
        while let Some(value) = heap.extract_min() {
            if let Some(p) = previous {
                assert_ne!(value.cmp(&p), Ordering::Less);
            }
            previous = Some(value);
        }
    }
}
