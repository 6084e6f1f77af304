use std::collections::BTreeMap;

use super::Element;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    Integer(i32),
    Boolean(bool),
    Text(String),
}

/// Key/value hints attached to nodes and VMs, e.g. the expected duration of their actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    values: BTreeMap<Element, BTreeMap<String, AttributeValue>>,
}

impl Attributes {
    pub fn put(
        &mut self,
        element: impl Into<Element>,
        key: impl Into<String>,
        value: AttributeValue,
    ) {
        let _ = self
            .values
            .entry(element.into())
            .or_default()
            .insert(key.into(), value);
    }

    pub fn put_integer(&mut self, element: impl Into<Element>, key: impl Into<String>, value: i32) {
        self.put(element, key, AttributeValue::Integer(value))
    }

    pub fn put_boolean(
        &mut self,
        element: impl Into<Element>,
        key: impl Into<String>,
        value: bool,
    ) {
        self.put(element, key, AttributeValue::Boolean(value))
    }

    pub fn put_text(
        &mut self,
        element: impl Into<Element>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.put(element, key, AttributeValue::Text(value.into()))
    }

    pub fn get(&self, element: impl Into<Element>, key: &str) -> Option<&AttributeValue> {
        self.values
            .get(&element.into())
            .and_then(|values| values.get(key))
    }

    /// The integer stored under `key`; `None` if it is absent or not an integer.
    pub fn get_integer(&self, element: impl Into<Element>, key: &str) -> Option<i32> {
        match self.get(element, key) {
            Some(AttributeValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_boolean(&self, element: impl Into<Element>, key: &str) -> Option<bool> {
        match self.get(element, key) {
            Some(AttributeValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_text(&self, element: impl Into<Element>, key: &str) -> Option<&str> {
        match self.get(element, key) {
            Some(AttributeValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn remove(&mut self, element: impl Into<Element>, key: &str) -> Option<AttributeValue> {
        self.values
            .get_mut(&element.into())
            .and_then(|values| values.remove(key))
    }

    /// The keys set on `element`, in lexicographic order.
    pub fn keys(&self, element: impl Into<Element>) -> impl Iterator<Item = &str> + '_ {
        self.values
            .get(&element.into())
            .into_iter()
            .flat_map(|values| values.keys().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use crate::model::Vm;

    #[test]
    fn values_are_typed() {
        let mut attributes = Attributes::default();
        let vm = Vm::new(0);
        attributes.put_integer(vm, "migrate", 20);
        attributes.put_boolean(vm, "critical", true);
        attributes.put_text(Node::new(0), "rack", "r1");

        assert_eq!(Some(20), attributes.get_integer(vm, "migrate"));
        assert_eq!(None, attributes.get_integer(vm, "critical"));
        assert_eq!(Some(true), attributes.get_boolean(vm, "critical"));
        assert_eq!(Some("r1"), attributes.get_text(Node::new(0), "rack"));
        assert_eq!(None, attributes.get_text(Node::new(1), "rack"));
        assert_eq!(vec!["critical", "migrate"], attributes.keys(vm).collect::<Vec<_>>());
    }

    #[test]
    fn removed_values_are_gone() {
        let mut attributes = Attributes::default();
        let node = Node::new(4);
        attributes.put_integer(node, "boot", 7);

        assert_eq!(Some(AttributeValue::Integer(7)), attributes.remove(node, "boot"));
        assert_eq!(None, attributes.get(node, "boot"));
    }
}
