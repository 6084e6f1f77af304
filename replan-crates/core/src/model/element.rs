use std::fmt::Display;

/// A physical server of the datacenter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node {
    id: u32,
}

impl Node {
    pub const fn new(id: u32) -> Node {
        Node { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.id)
    }
}

/// A virtual machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Vm {
    id: u32,
}

impl Vm {
    pub const fn new(id: u32) -> Vm {
        Vm { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Display for Vm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vm#{}", self.id)
    }
}

/// Either a [`Node`] or a [`Vm`]; the key of per-element data such as attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    Node(Node),
    Vm(Vm),
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

impl From<Vm> for Element {
    fn from(vm: Vm) -> Self {
        Element::Vm(vm)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Node(node) => node.fmt(f),
            Element::Vm(vm) => vm.fmt(f),
        }
    }
}
