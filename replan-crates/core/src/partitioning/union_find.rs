/// Disjoint sets over `0..n`, used to merge partitions.
#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    parents: Vec<usize>,
    ranks: Vec<u8>,
}

impl UnionFind {
    pub(crate) fn new(size: usize) -> Self {
        UnionFind {
            parents: (0..size).collect(),
            ranks: vec![0; size],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.parents.len()
    }

    /// The representative of the set of `element`.
    pub(crate) fn find(&mut self, element: usize) -> usize {
        let mut root = element;
        while self.parents[root] != root {
            root = self.parents[root];
        }
        let mut current = element;
        while self.parents[current] != root {
            let next = self.parents[current];
            self.parents[current] = root;
            current = next;
        }
        root
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a == b {
            return;
        }
        match self.ranks[a].cmp(&self.ranks[b]) {
            std::cmp::Ordering::Less => self.parents[a] = b,
            std::cmp::Ordering::Greater => self.parents[b] = a,
            std::cmp::Ordering::Equal => {
                self.parents[b] = a;
                self.ranks[a] += 1;
            }
        }
    }

    /// Merge every set containing one of `elements`.
    pub(crate) fn union_all(&mut self, elements: impl IntoIterator<Item = usize>) {
        let mut elements = elements.into_iter();
        if let Some(first) = elements.next() {
            for element in elements {
                self.union(first, element);
            }
        }
    }
}
