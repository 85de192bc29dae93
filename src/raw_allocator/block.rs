//! Block headers and footers: the boundary tags every block carries.
//!
//! A block's header is a single 32-bit word living at its first four bytes.
//! Bits 3..=31 hold the payload size (always a multiple of 8); bit 0 marks
//! the block itself allocated, bit 2 mirrors whether its physical
//! predecessor is allocated. Bit 1 is unused: coalescing only ever needs a
//! block's own PREV-ALLOC bit, and an allocated predecessor has no footer
//! to update through when its successor's state changes later, so a
//! NEXT-ALLOC mirror can't actually be kept consistent. A free block
//! mirrors its header into a footer word at the end of its payload, so that
//! [`Block::physical_prev`] can walk backwards without consulting a free
//! list.
//!
//! The footer's four-byte slot is reserved in *every* block's span, whether
//! or not the block is currently allocated, so that every header sits at a
//! constant phase relative to the sandbox base regardless of the traffic
//! history of the bytes before it. See the footer-omission discussion in
//! `SPEC_FULL.md` for why this is load-bearing and not just defensive.

use core::ptr;

/// Size in bytes of a header or footer word.
pub const TAG_SIZE: usize = 4;

/// Bytes of bookkeeping overhead every block carries beyond its payload: one
/// header word plus one (always reserved, not always written) footer word.
pub const OVERHEAD: usize = 2 * TAG_SIZE;

/// Alignment every payload (and therefore every returned user pointer) is
/// held to.
pub const ALIGN: usize = 8;

/// Smallest payload a block can carry; also the payload of size class 0.
pub const MIN_PAYLOAD: usize = 8;

/// A free block's span must exceed a candidate's requested payload by at
/// least this many bytes before the candidate is worth splitting: one
/// header word, one reserved footer word, and the eight-byte minimum
/// payload a carved-off remainder would need.
pub const MIN_SPLIT_SURPLUS: usize = OVERHEAD + MIN_PAYLOAD;

const ALLOC_BIT: u32 = 1 << 0;
const PREV_ALLOC_BIT: u32 = 1 << 2;
const SIZE_MASK: u32 = !0b111;

/// A decoded header/footer word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u32);

impl Tag {
    pub const fn new(size: usize, alloc: bool, prev_alloc: bool) -> Self {
        debug_assert!(size & 0b111 == 0, "payload size must be a multiple of 8");
        debug_assert!(size as u32 & ALLOC_BIT == 0);
        let mut bits = size as u32;
        if alloc {
            bits |= ALLOC_BIT;
        }
        if prev_alloc {
            bits |= PREV_ALLOC_BIT;
        }
        Self(bits)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn size(self) -> usize {
        (self.0 & SIZE_MASK) as usize
    }

    pub const fn is_alloc(self) -> bool {
        self.0 & ALLOC_BIT != 0
    }

    pub const fn prev_alloc(self) -> bool {
        self.0 & PREV_ALLOC_BIT != 0
    }
}

/// A cursor onto a block's header, living somewhere inside a sandbox.
///
/// `Block` does not own anything; it is a thin, `Copy` wrapper around a raw
/// pointer to the header's first byte. Every method is `unsafe` because
/// nothing here can check that the pointer actually addresses a live block
/// inside a live sandbox; that invariant is the caller's (the core
/// allocator's) responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block(*mut u8);

impl Block {
    /// Wrap a pointer that is known to address a block's header.
    pub const unsafe fn at(header_addr: *mut u8) -> Self {
        Self(header_addr)
    }

    pub const fn addr(self) -> *mut u8 {
        self.0
    }

    unsafe fn tag(self) -> Tag {
        Tag::from_raw(ptr::read_unaligned(self.0 as *const u32))
    }

    unsafe fn set_tag(self, tag: Tag) {
        ptr::write_unaligned(self.0 as *mut u32, tag.raw());
    }

    pub unsafe fn size(self) -> usize {
        self.tag().size()
    }

    pub unsafe fn is_alloc(self) -> bool {
        self.tag().is_alloc()
    }

    pub unsafe fn is_free(self) -> bool {
        !self.is_alloc()
    }

    pub unsafe fn prev_alloc(self) -> bool {
        self.tag().prev_alloc()
    }

    /// Total span of this block, header through reserved footer slot.
    pub unsafe fn span(self) -> usize {
        OVERHEAD + self.size()
    }

    /// Pointer to the first payload byte.
    pub unsafe fn payload(self) -> *mut u8 {
        self.0.add(TAG_SIZE)
    }

    /// Overwrite this block's header in place, preserving no prior state.
    pub unsafe fn set_header(self, size: usize, alloc: bool, prev_alloc: bool) {
        self.set_tag(Tag::new(size, alloc, prev_alloc));
    }

    pub unsafe fn set_alloc(self, alloc: bool) {
        let t = self.tag();
        self.set_tag(Tag::new(t.size(), alloc, t.prev_alloc()));
    }

    pub unsafe fn set_prev_alloc(self, prev_alloc: bool) {
        let t = self.tag();
        self.set_tag(Tag::new(t.size(), t.is_alloc(), prev_alloc));
    }

    /// Mirror the current header into the footer slot. Only meaningful (and
    /// only ever consulted by [`Block::physical_prev`]) while the block is
    /// free.
    pub unsafe fn write_footer(self) {
        let tag = self.tag();
        let footer_addr = self.0.add(TAG_SIZE + tag.size());
        ptr::write_unaligned(footer_addr as *mut u32, tag.raw());
    }

    unsafe fn footer(self) -> Tag {
        let size = self.size();
        Tag::from_raw(ptr::read_unaligned(self.0.add(TAG_SIZE + size) as *const u32))
    }

    /// Header and footer must agree for a free block; used by the heap
    /// checker.
    pub unsafe fn header_footer_consistent(self) -> bool {
        self.tag() == self.footer()
    }

    /// The block immediately following this one in physical address order.
    pub unsafe fn physical_next(self) -> Block {
        Block(self.0.add(self.span()))
    }

    /// The block immediately preceding this one in physical address order.
    ///
    /// Only valid when `prev_alloc()` is `false`: an allocated predecessor's
    /// footer slot is never written, so its size cannot be recovered this
    /// way.
    pub unsafe fn physical_prev(self) -> Block {
        let footer = ptr::read_unaligned(self.0.sub(TAG_SIZE) as *const u32);
        let prev_size = Tag::from_raw(footer).size();
        Block(self.0.sub(OVERHEAD + prev_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        let tag = Tag::new(32, true, false);
        assert_eq!(tag.size(), 32);
        assert!(tag.is_alloc());
        assert!(!tag.prev_alloc());
    }

    #[test]
    fn block_header_and_footer_roundtrip() {
        let mut buf = [0u8; 64];
        let block = unsafe { Block::at(buf.as_mut_ptr()) };
        unsafe {
            block.set_header(24, false, true);
            block.write_footer();
            assert_eq!(block.size(), 24);
            assert!(block.is_free());
            assert!(block.prev_alloc());
            assert!(block.header_footer_consistent());
        }
    }

    #[test]
    fn physical_next_and_prev_agree() {
        let mut buf = [0u8; 64];
        let first = unsafe { Block::at(buf.as_mut_ptr()) };
        unsafe {
            first.set_header(16, false, true);
            first.write_footer();
            let second = first.physical_next();
            assert_eq!(second.addr(), buf.as_mut_ptr().add(OVERHEAD + 16));
            second.set_header(8, true, false);
            let back = second.physical_prev();
            assert_eq!(back.addr(), first.addr());
        }
    }
}
