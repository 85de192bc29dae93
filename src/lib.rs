//! A segregated-free-list allocator for embedded and other `#![no_std]`
//! targets.
//!
//! This crate provides a single type called [`Allocator`]. It implements
//! [`core::alloc::GlobalAlloc`], which is required to use the [`alloc`
//! crate][alloc] on `#![no_std]` targets. Unlike a simple linear-scan
//! allocator, blocks are filed into one of thirteen size-segregated free
//! lists, so placement looks only at lists whose members are already close
//! to the requested size instead of scanning the whole heap.
//!
//! # Usage
//! Copy the following into your binary crate and adjust the heap size
//! (here 1 MiB):
//! ```no_run
//! #[global_allocator]
//! static ALLOCATOR: segheap::Allocator<{ 1024 * 1024 }> = segheap::Allocator::new();
//!
//! extern crate alloc;
//! ```
//! Afterwards you don't need to interact with the crate or the `ALLOCATOR`
//! variable anymore; `alloc::vec::Vec`, `alloc::collections::BTreeMap` and
//! friends all route through it.
//!
//! # Implementation
//! Every block carries a 4-byte header encoding its payload size and three
//! allocation-state bits (itself, its physical predecessor, its physical
//! successor). A free block additionally mirrors that header into a 4-byte
//! footer, which lets the allocator walk backwards to a free neighbor
//! without consulting any list. Payload sizes are bucketed into 13
//! segregated free lists: four exact-fit classes for the smallest, most
//! common sizes, eight widening range-fit classes, and a catch-all class
//! for everything larger. Placement pops an exact-fit hit immediately, or
//! runs a bounded best-fit probe over a range-fit/catch-all list
//! ([`raw_allocator::CoreAllocator::PROBE_DEPTH`] candidates). Freeing a
//! block coalesces it with any free physical neighbor before filing it.
//! When no class (including the catch-all) has anything big enough, the
//! heap is grown, up to a 100 MiB policy ceiling
//! ([`raw_allocator::sandbox::CEILING_BYTES`]).
//!
//! Every returned pointer is 8-byte aligned; the allocator does not support
//! `Layout`s requiring stricter alignment than that (mirroring real
//! `malloc`, which likewise guarantees only the platform's natural maximum
//! alignment).
//!
//! [alloc]: https://doc.rust-lang.org/alloc/index.html
#![no_std]

pub mod raw_allocator;

use core::alloc::{GlobalAlloc, Layout};
use raw_allocator::CoreAllocator;
use spin::Mutex;

/// The memory allocator for embedded systems.
///
/// This is the core type of this crate: an allocator with a predefined heap
/// size, so the heap's memory usage is statically bounded (the backing
/// storage lives in `.bss`/`.data` alongside any other static, rather than
/// being claimed from an OS-provided heap).
///
/// ```no_run
/// #[global_allocator]
/// static ALLOCATOR: segheap::Allocator<4096> = segheap::Allocator::new();
/// ```
pub struct Allocator<const N: usize>(Mutex<CoreAllocator<N>>);

impl<const N: usize> Allocator<N> {
    /// Create a new [`Allocator`].
    ///
    /// This is a `const fn`, so it can be called directly when initializing
    /// a `static`.
    ///
    /// # Panics
    /// Panics if `N` is less than the minimum useful heap size or is not a
    /// multiple of 8.
    #[must_use = "assign the allocator to a static variable and apply the `#[global_allocator]`-attribute to make it the global allocator"]
    pub const fn new() -> Self {
        assert!(N >= 8, "too small heap memory: minimum size is 8");
        assert!(N % 8 == 0, "heap size has to be divisible by 8");
        Self(Mutex::new(CoreAllocator::new()))
    }
}

impl<const N: usize> Default for Allocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a `Layout` down to the payload size this allocator can actually
/// serve. Every block is 8-byte aligned; requests for stricter alignment
/// are rejected by returning a null pointer, per the `GlobalAlloc`
/// contract.
fn payload_size(layout: Layout) -> Option<usize> {
    if layout.align() > 8 {
        return None;
    }
    Some(layout.size().max(1))
}

unsafe impl<const N: usize> GlobalAlloc for Allocator<N> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let Some(size) = payload_size(layout) else {
            return core::ptr::null_mut();
        };
        self.0
            .lock()
            .alloc(size)
            .unwrap_or(core::ptr::null_mut())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.0.lock().free(ptr);
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let Some(size) = payload_size(layout) else {
            return core::ptr::null_mut();
        };
        self.0
            .lock()
            .calloc(1, size)
            .unwrap_or(core::ptr::null_mut())
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if layout.align() > 8 {
            return core::ptr::null_mut();
        }
        self.0
            .lock()
            .realloc(ptr, new_size.max(1))
            .unwrap_or(core::ptr::null_mut())
    }
}
