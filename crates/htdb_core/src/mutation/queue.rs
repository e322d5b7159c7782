//! Single-flight FIFO of pending mutations.

use super::Mutation;
use std::collections::VecDeque;
use std::thread::{self, ThreadId};

/// What the submitter of a mutation must do next.
#[derive(Debug)]
pub(crate) enum Admission {
    /// The caller became the drainer and must drain the queue.
    Drain,
    /// The caller is already draining; run the mutation immediately.
    Inline(Mutation),
    /// Another thread is draining and will reach the mutation.
    Queued {
        /// Number of mutations ahead of and including this one.
        position: usize,
    },
}

/// Pending writes plus the identity of the thread draining them.
///
/// At most one thread drains at a time. The drain itself runs without the
/// queue lock held, so a migration body can submit further writes.
#[derive(Debug, Default)]
pub(crate) struct MutationQueue {
    pending: VecDeque<Mutation>,
    drainer: Option<ThreadId>,
}

impl MutationQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Admits a mutation from the current thread.
    pub(crate) fn admit(&mut self, mutation: Mutation) -> Admission {
        let current = thread::current().id();
        match self.drainer {
            Some(drainer) if drainer == current => Admission::Inline(mutation),
            Some(_) => {
                self.pending.push_back(mutation);
                Admission::Queued {
                    position: self.pending.len(),
                }
            }
            None => {
                self.pending.push_back(mutation);
                self.drainer = Some(current);
                Admission::Drain
            }
        }
    }

    /// Pops the head of the queue.
    ///
    /// Returns `None` once the queue is empty and the drain is over.
    pub(crate) fn next(&mut self) -> Option<Mutation> {
        let next = self.pending.pop_front();
        if next.is_none() {
            self.drainer = None;
        }
        next
    }

    /// Gives up the drainer slot if the current thread holds it.
    pub(crate) fn release(&mut self) {
        if self.drainer == Some(thread::current().id()) {
            self.drainer = None;
        }
    }

    /// Returns the number of mutations waiting.
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if some thread is draining.
    pub(crate) fn is_draining(&self) -> bool {
        self.drainer.is_some()
    }
}
