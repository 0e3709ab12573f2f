//! Node structures for document tree representation.
//!
//! Every document, markup or data, is represented as a tree of `NodeInner`
//! values. Parents own their children through strong references; children
//! point back at their parent through a weak reference that is only used for
//! upward lookups (whitespace-sensitivity checks, path rendering).

mod content;
pub mod namespace;

pub use content::{Attribute, Comment, Element, NodeContent, ProcessingInstruction, Text};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique node IDs.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique node ID.
fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// A non-owning reference to a node.
pub type WeakNodeRef = Weak<RefCell<NodeInner>>;

/// The inner data of a node in a document tree.
#[derive(Debug)]
pub struct NodeInner {
    /// Unique identifier for this node.
    id: u64,
    /// Child nodes.
    children: Vec<NodeRef>,
    /// Content of this node.
    content: NodeContent,
    /// Weak reference to parent node.
    parent: WeakNodeRef,
    /// Zero-based position among siblings; `None` until attached.
    child_pos: Option<usize>,
}

impl NodeInner {
    /// Creates a detached node with the given content.
    pub fn new(content: NodeContent) -> Self {
        NodeInner {
            id: next_node_id(),
            children: Vec::new(),
            content,
            parent: Weak::new(),
            child_pos: None,
        }
    }

    /// Returns the unique ID of this node.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the content of this node.
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns a reference to the child at the given index.
    pub fn child(&self, index: usize) -> Option<&NodeRef> {
        self.children.get(index)
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns the parent node, if it is still alive.
    pub fn parent(&self) -> Option<NodeRef> {
        self.parent.upgrade()
    }

    /// Returns the 0-based index among all siblings, or `None` for a
    /// detached node or the root.
    pub fn child_pos(&self) -> Option<usize> {
        self.child_pos
    }

    /// Returns the element content, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        self.content.as_element()
    }

    /// Adds a child node. Must be called on the NodeRef wrapper.
    pub fn add_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = Some(parent_ref.borrow().children.len());
        }
        parent_ref.borrow_mut().children.push(child_ref);
    }
}

/// Creates a new node reference.
pub fn new_node(content: NodeContent) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(content)))
}

/// Creates a new document root.
pub fn new_root() -> NodeRef {
    new_node(NodeContent::Root)
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors {
    next: Option<NodeRef>,
}

impl Ancestors {
    /// Starts at the parent of `node`.
    pub fn new(node: &NodeRef) -> Self {
        Ancestors {
            next: node.borrow().parent(),
        }
    }
}

impl Iterator for Ancestors {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.borrow().parent();
        Some(current)
    }
}

/// Iterator for traversing a tree in depth-first order.
pub struct DfsTreeIterator {
    /// Stack of (node, next_child_index) pairs for iterating.
    stack: Vec<(NodeRef, usize)>,
}

impl DfsTreeIterator {
    /// Creates a new DFS iterator starting at the given root.
    pub fn new(root: NodeRef) -> Self {
        DfsTreeIterator {
            stack: vec![(root, 0)],
        }
    }
}

impl Iterator for DfsTreeIterator {
    type Item = NodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, child_idx)) = self.stack.pop() {
            let borrowed = node.borrow();
            let child_count = borrowed.child_count();

            if child_idx == 0 {
                let first_child = borrowed.child(0).cloned();
                drop(borrowed);
                if let Some(child) = first_child {
                    self.stack.push((node.clone(), 1));
                    self.stack.push((child, 0));
                }
                return Some(node);
            } else if child_idx < child_count {
                let next_child = borrowed.child(child_idx).cloned();
                drop(borrowed);
                self.stack.push((node, child_idx + 1));
                if let Some(child) = next_child {
                    self.stack.push((child, 0));
                }
            }
        }
        None
    }
}

/// Counts the nodes of a subtree, including its root.
pub fn subtree_size(root: &NodeRef) -> usize {
    DfsTreeIterator::new(root.clone()).count()
}

/// Renders a slash-separated location for a node, e.g. `/doc/item[2]/#text`.
///
/// Element steps carry a 1-based index among same-named siblings when the
/// name is not unique.
pub fn node_path(node: &NodeRef) -> String {
    let mut steps = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        let borrowed = n.borrow();
        if let Some(step) = path_step(&borrowed) {
            steps.push(step);
        }
        current = borrowed.parent();
    }
    steps.reverse();
    format!("/{}", steps.join("/"))
}

fn path_step(node: &NodeInner) -> Option<String> {
    let label = match node.content() {
        NodeContent::Root => return None,
        NodeContent::Element(e) => e.qname(),
        NodeContent::Text(_) => "#text".to_string(),
        NodeContent::CData(_) => "#cdata".to_string(),
        NodeContent::Comment(_) => "#comment".to_string(),
        NodeContent::ProcessingInstruction(pi) => format!("?{}", pi.target()),
    };

    let Some(parent) = node.parent() else {
        return Some(label);
    };
    let parent = parent.borrow();
    let mut same = 0;
    let mut index = 0;
    for sibling in parent.children() {
        let sibling = sibling.borrow();
        if sibling.content().same_label(node.content()) {
            same += 1;
            if sibling.id() == node.id() {
                index = same;
            }
        }
    }
    if same > 1 {
        Some(format!("{}[{}]", label, index))
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> NodeRef {
        new_node(NodeContent::Element(Element::new(name)))
    }

    #[test]
    fn test_add_child() {
        let parent = element("parent");
        let child1 = element("child1");
        let child2 = element("child2");

        NodeInner::add_child_to_ref(&parent, child1.clone());
        NodeInner::add_child_to_ref(&parent, child2.clone());

        assert_eq!(parent.borrow().child_count(), 2);
        assert_eq!(child1.borrow().child_pos(), Some(0));
        assert_eq!(child2.borrow().child_pos(), Some(1));
        let back = child2.borrow().parent().unwrap();
        assert_eq!(back.borrow().id(), parent.borrow().id());
    }

    #[test]
    fn test_root_has_no_parent() {
        let root = new_root();
        assert!(root.borrow().parent().is_none());
        assert_eq!(root.borrow().child_pos(), None);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let root = new_root();
        let a = element("a");
        let b = element("b");
        let t = new_node(NodeContent::Text(Text::new("x")));
        NodeInner::add_child_to_ref(&root, a.clone());
        NodeInner::add_child_to_ref(&a, b.clone());
        NodeInner::add_child_to_ref(&b, t.clone());

        let ids: Vec<u64> = Ancestors::new(&t).map(|n| n.borrow().id()).collect();
        assert_eq!(
            ids,
            vec![b.borrow().id(), a.borrow().id(), root.borrow().id()]
        );
    }

    #[test]
    fn test_dfs_iterator_tree() {
        //       root
        //      /    \
        //     a      b
        //    / \
        //   c   d
        let root = element("root");
        let a = element("a");
        let b = element("b");
        let c = element("c");
        let d = element("d");

        NodeInner::add_child_to_ref(&root, a.clone());
        NodeInner::add_child_to_ref(&root, b.clone());
        NodeInner::add_child_to_ref(&a, c.clone());
        NodeInner::add_child_to_ref(&a, d.clone());

        let names: Vec<String> = DfsTreeIterator::new(root.clone())
            .map(|n| n.borrow().as_element().map(|e| e.qname()).unwrap_or_default())
            .collect();

        assert_eq!(names, vec!["root", "a", "c", "d", "b"]);
        assert_eq!(subtree_size(&root), 5);
    }

    #[test]
    fn test_node_path_indexes_repeated_names() {
        let root = new_root();
        let list = element("list");
        let first = element("item");
        let second = element("item");
        let text = new_node(NodeContent::Text(Text::new("v")));
        NodeInner::add_child_to_ref(&root, list.clone());
        NodeInner::add_child_to_ref(&list, first);
        NodeInner::add_child_to_ref(&list, second.clone());
        NodeInner::add_child_to_ref(&second, text.clone());

        assert_eq!(node_path(&list), "/list");
        assert_eq!(node_path(&second), "/list/item[2]");
        assert_eq!(node_path(&text), "/list/item[2]/#text");
        assert_eq!(node_path(&root), "/");
    }

    #[test]
    fn test_unique_node_ids() {
        let node1 = new_root();
        let node2 = element("x");
        assert_ne!(node1.borrow().id(), node2.borrow().id());
    }
}
