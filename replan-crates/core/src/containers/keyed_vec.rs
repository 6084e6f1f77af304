use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// A key which is a dense index into a [`KeyedVec`].
pub trait StorageKey: Clone {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

impl StorageKey for usize {
    fn index(&self) -> usize {
        *self
    }

    fn create_from_index(index: usize) -> Self {
        index
    }
}

/// A vector which is indexed by a typed key rather than a bare `usize`, so that for instance a
/// propagator id cannot be used to look up a domain.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct KeyedVec<Key, Value> {
    elements: Vec<Value>,
    key: PhantomData<Key>,
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            elements: Vec::new(),
            key: PhantomData,
        }
    }
}

// Derived Clone would require `Key: Clone`.
impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        KeyedVec {
            elements: self.elements.clone(),
            key: PhantomData,
        }
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends `value` and returns the key it is stored under.
    pub fn push(&mut self, value: Value) -> Key {
        let key = Key::create_from_index(self.elements.len());
        self.elements.push(value);
        key
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> {
        (0..self.elements.len()).map(Key::create_from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.elements.iter()
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, key: Key) -> &Value {
        &self.elements[key.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, key: Key) -> &mut Value {
        &mut self.elements[key.index()]
    }
}
