//! Stack of previously shown playlist indices.

/// Unbounded stack consulted by `previous()`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct PlayHistory {
    stack: Vec<usize>,
}

impl PlayHistory {
    pub fn push(&mut self, index: usize) { self.stack.push(index); }

    pub fn pop(&mut self) -> Option<usize> { self.stack.pop() }

    /// Removes every occurrence of a pruned index and shifts higher ones down.
    pub fn forget(&mut self, removed: usize) {
        self.stack.retain(|&index| index != removed);
        for index in &mut self.stack {
            if *index > removed {
                *index -= 1;
            }
        }
    }

    /// Replaces the stack, oldest first.
    pub fn replace(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.stack = indices.into_iter().collect();
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ { self.stack.iter().copied() }

    #[must_use]
    pub fn len(&self) -> usize { self.stack.len() }
}
