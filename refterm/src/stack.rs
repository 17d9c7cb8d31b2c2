//! A `Vec` that is iterated from the last to the first pushed element.

use alloc::vec::Vec;

/// A `Vec` that is iterated from the last to the first pushed element.
///
/// The nth element of a `Stack` is the nth-*last* pushed element,
/// that is, the nth element counted from the end of the underlying `Vec`.
/// This corresponds to de Bruijn indices:
/// when every binder pushes its variables,
/// the element at position `n` belongs to the binder `n` levels out.
///
/// ~~~
/// # use refterm::Stack;
/// let mut stack = Stack::from(vec![["x", "y"], ["z", "y"]]);
/// assert_eq!(stack.get(0), Some(&["z", "y"]));
/// assert_eq!(stack.find(|b| b.iter().position(|v| *v == "x")), Some((1, 0)));
/// assert_eq!(stack.find(|b| b.iter().position(|v| *v == "y")), Some((0, 1)));
///
/// let inner = stack.with_pushed(["w", "x"], |stack| {
///     Ok::<_, ()>(stack.find(|b| b.iter().position(|v| *v == "x")))
/// });
/// assert_eq!(inner, Ok(Some((0, 1))));
/// assert_eq!(stack.len(), 2);
/// ~~~
#[derive(Clone, Debug)]
pub struct Stack<A>(Vec<A>);

impl<A> Stack<A> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Default::default()
    }

    /// Add an element to the top of the stack.
    pub fn push(&mut self, x: A) {
        self.0.push(x)
    }

    /// Remove and return an element from the top of the stack.
    pub fn pop(&mut self) -> Option<A> {
        self.0.pop()
    }

    /// Return the number of elements on the stack.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the stack contains no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Obtain the nth element counted from the top of the stack.
    pub fn get(&self, n: usize) -> Option<&A> {
        self.iter().nth(n)
    }

    /// Return the first result of `f` counted from the top, together with its position.
    pub fn find<B>(&self, mut f: impl FnMut(&A) -> Option<B>) -> Option<(usize, B)> {
        self.iter().enumerate().find_map(|(n, x)| Some((n, f(x)?)))
    }

    /// Push an element on the stack, run a function on it, then pop the element.
    ///
    /// The element is popped also if the function fails,
    /// so the stack afterwards contains the same elements as before.
    pub fn with_pushed<F, Y, E>(&mut self, x: A, f: F) -> Result<Y, E>
    where
        F: FnOnce(&mut Stack<A>) -> Result<Y, E>,
    {
        self.0.push(x);
        let y = f(self);
        self.0.pop();
        y
    }

    /// Iterate through the elements of the stack starting from the top.
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.0.iter().rev()
    }
}

impl<A> Default for Stack<A> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<A> From<Vec<A>> for Stack<A> {
    fn from(v: Vec<A>) -> Self {
        Self(v)
    }
}
