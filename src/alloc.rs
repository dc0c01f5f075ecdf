//! Per-thread monotonic stack allocator (spec §4.5, component C5).
//!
//! Each worker thread owns a fixed-size `f32` arena; `ScopedVector` ties an
//! allocation to a lexical scope and returns it on drop, enforcing LIFO
//! (stack) discipline. Over-allocation is a programming error and aborts.

use std::cell::UnsafeCell;

pub const MAX_NUM_THREADS: usize = 64;
const KB: usize = 1 << 10;
const STACK_BYTES_PER_THREAD: usize = 512 * KB;
const STACK_LEN_PER_THREAD: usize = STACK_BYTES_PER_THREAD / std::mem::size_of::<f32>();

struct ThreadArena {
    stack: UnsafeCell<Vec<f32>>,
    stack_pointer: UnsafeCell<usize>,
    max_usage: UnsafeCell<usize>,
}

// SAFETY: each `ThreadArena` is accessed by exactly one worker thread (its own
// index into `StackAllocator::arenas`), enforced by `ScopedVector`'s borrow
// discipline and the fork-join scheduler never reassigning a live task to a
// different thread index.
unsafe impl Sync for ThreadArena {}

impl ThreadArena {
    fn new() -> Self {
        Self {
            stack: UnsafeCell::new(vec![0.0; STACK_LEN_PER_THREAD]),
            stack_pointer: UnsafeCell::new(0),
            max_usage: UnsafeCell::new(0),
        }
    }
}

/// Per-thread monotonic bump arena of `f32` scratch space.
pub struct StackAllocator {
    arenas: Vec<ThreadArena>,
}

impl StackAllocator {
    pub fn new(num_threads: usize) -> Self {
        assert!(num_threads <= MAX_NUM_THREADS, "thread count exceeds MAX_NUM_THREADS");
        Self {
            arenas: (0..num_threads).map(|_| ThreadArena::new()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.arenas
            .iter()
            .all(|a| unsafe { *a.stack_pointer.get() == 0 })
    }

    /// Allocates `size` `f32`s from `thread`'s arena. Panics (programming
    /// invariant violation) on overflow, matching spec §4.5's abort semantics.
    ///
    /// # Safety
    /// The returned slice borrows from the arena; the caller must return it
    /// via [`StackAllocator::deallocate`] in LIFO order before any other
    /// allocation from the same thread outlives it. [`ScopedVector`] enforces
    /// this automatically and should be preferred over calling this directly.
    #[allow(clippy::mut_from_ref)]
    unsafe fn allocate(&self, thread: usize, size: usize) -> &mut [f32] {
        let arena = &self.arenas[thread];
        let sp = &mut *arena.stack_pointer.get();
        let stack = &mut *arena.stack.get();
        assert!(
            *sp + size <= stack.len(),
            "stack allocator overflow on thread {thread}: requested {size}, {} available",
            stack.len() - *sp
        );
        let start = *sp;
        *sp += size;
        let max_usage = &mut *arena.max_usage.get();
        *max_usage = (*max_usage).max(*sp);
        &mut stack[start..start + size]
    }

    unsafe fn deallocate(&self, thread: usize, size: usize) {
        let arena = &self.arenas[thread];
        let sp = &mut *arena.stack_pointer.get();
        assert!(*sp >= size, "stack allocator underflow on thread {thread}");
        *sp -= size;
    }

    /// High-water mark of arena usage per thread, for reporting.
    pub fn max_usage(&self) -> Vec<usize> {
        self.arenas
            .iter()
            .map(|a| unsafe { *a.max_usage.get() })
            .collect()
    }
}

/// RAII scratch buffer borrowed from a [`StackAllocator`]. Non-movable,
/// non-copyable: it must be allocated on the Rust call stack and released in
/// strict LIFO order, mirroring the source's `StackVector`.
pub struct ScopedVector<'a> {
    allocator: &'a StackAllocator,
    thread: usize,
    data: &'a mut [f32],
}

impl<'a> ScopedVector<'a> {
    pub fn new(allocator: &'a StackAllocator, thread: usize, size: usize) -> Self {
        let data = unsafe { allocator.allocate(thread, size) };
        Self {
            allocator,
            thread,
            data,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Drop for ScopedVector<'_> {
    fn drop(&mut self) {
        unsafe { self.allocator.deallocate(self.thread, self.data.len()) };
    }
}

impl std::ops::Deref for ScopedVector<'_> {
    type Target = [f32];
    fn deref(&self) -> &[f32] {
        self.data
    }
}

impl std::ops::DerefMut for ScopedVector<'_> {
    fn deref_mut(&mut self) -> &mut [f32] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_allocation_returns_on_drop() {
        let alloc = StackAllocator::new(1);
        assert!(alloc.is_empty());
        {
            let mut v = ScopedVector::new(&alloc, 0, 16);
            v.as_mut_slice()[0] = 1.0;
            assert!(!alloc.is_empty());
        }
        assert!(alloc.is_empty());
    }

    #[test]
    fn nested_scopes_are_lifo() {
        let alloc = StackAllocator::new(1);
        let _outer = ScopedVector::new(&alloc, 0, 4);
        {
            let _inner = ScopedVector::new(&alloc, 0, 8);
        }
        assert!(!alloc.is_empty());
    }

    #[test]
    #[should_panic(expected = "overflow")]
    fn overflow_aborts() {
        let alloc = StackAllocator::new(1);
        let _v = ScopedVector::new(&alloc, 0, STACK_LEN_PER_THREAD + 1);
    }
}
