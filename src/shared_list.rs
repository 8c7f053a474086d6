use std::cell::{RefCell, RefMut};
use std::rc::Rc;

/// Persistent singly-linked list whose nodes are shared between clones.
/// Pushing onto a clone never affects the original, but mutating a shared
/// node through one handle is visible through every handle that reaches it.
#[derive(Debug)]
pub struct SharedList<T> {
    head: Link<T>,
}

type Link<T> = Option<Rc<RefCell<Node<T>>>>;

#[derive(Debug)]
struct Node<T> {
    elem: T,
    next: Link<T>,
}

impl<T> Node<T> {
    fn new(elem: T) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Node { elem, next: None }))
    }
}

impl<T> Clone for SharedList<T> {
    fn clone(&self) -> SharedList<T> {
        SharedList {
            head: self.head.clone(),
        }
    }
}

impl<T> SharedList<T> {
    pub fn new() -> Self {
        SharedList { head: None }
    }

    pub fn push(&mut self, elem: T) {
        let new_head = Node::new(elem);
        if let Some(old_head) = self.head.take() {
            new_head.borrow_mut().next = Some(old_head);
        }
        self.head = Some(new_head);
    }

    pub fn peek_mut(&mut self) -> Option<RefMut<T>> {
        self.head
            .as_ref()
            .map(|node| RefMut::map(node.borrow_mut(), |node| &mut node.elem))
    }

    /// Walks from the head towards the tail, returning the first value `f`
    /// produces.
    pub fn find_map<R>(&self, mut f: impl FnMut(&T) -> Option<R>) -> Option<R> {
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            let next = {
                let node = node.borrow();
                if let Some(found) = f(&node.elem) {
                    return Some(found);
                }
                node.next.clone()
            };
            cursor = next;
        }
        None
    }

    /// Like `find_map`, but with mutable access to each element.
    pub fn find_map_mut<R>(&self, mut f: impl FnMut(&mut T) -> Option<R>) -> Option<R> {
        let mut cursor = self.head.clone();
        while let Some(node) = cursor {
            let next = {
                let mut node = node.borrow_mut();
                if let Some(found) = f(&mut node.elem) {
                    return Some(found);
                }
                node.next.clone()
            };
            cursor = next;
        }
        None
    }

    pub fn equals(&self, other: &SharedList<T>) -> bool {
        match (&self.head, &other.head) {
            (None, None) => true,
            (Some(l), Some(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

// Unlink one node at a time so long chains do not recurse on drop.
impl<T> Drop for SharedList<T> {
    fn drop(&mut self) {
        while let Some(node) = self.head.take() {
            match Rc::try_unwrap(node) {
                Ok(node) => self.head = node.into_inner().next,
                Err(_) => break,
            }
        }
    }
}
