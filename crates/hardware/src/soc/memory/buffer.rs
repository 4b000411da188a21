//! Die Storage.
//!
//! Backing store for one simulated HyperRAM die. A die is addressed in 16-bit words and is
//! mostly untouched by any one simulation, so on Unix the store is an anonymous `mmap`
//! whose pages are only materialised by the OS when first written. Other platforms fall
//! back to a zeroed `Vec`.

use crate::common::error::SimError;

/// Word-addressed storage for one die.
#[derive(Debug)]
pub struct WordBuffer {
    ptr: *mut u16,
    words: usize,
    is_mmap: bool,
}

// SAFETY: the buffer exclusively owns its allocation; all access goes through `&self`/`&mut self`.
unsafe impl Send for WordBuffer {}

impl WordBuffer {
    /// Allocates a zero-filled buffer.
    ///
    /// # Arguments
    ///
    /// * `words` - Capacity in 16-bit words.
    ///
    /// # Returns
    ///
    /// The buffer, or [`SimError::Allocation`] if the host refused the mapping.
    pub fn new(words: usize) -> Result<Self, SimError> {
        let bytes = words * size_of::<u16>();

        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no address hint; the result is checked below.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    bytes,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };
            if ptr == libc::MAP_FAILED {
                return Err(SimError::Allocation { bytes });
            }
            Ok(Self {
                ptr: ptr.cast::<u16>(),
                words,
                is_mmap: true,
            })
        }

        #[cfg(not(unix))]
        {
            let mut vec = vec![0u16; words];
            let ptr = vec.as_mut_ptr();
            std::mem::forget(vec);
            let _ = bytes;
            Ok(Self {
                ptr,
                words,
                is_mmap: false,
            })
        }
    }

    /// Capacity in 16-bit words.
    pub const fn len(&self) -> usize {
        self.words
    }

    /// Returns `true` for a zero-capacity buffer.
    pub const fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Reads one word; out-of-range reads return zero.
    pub fn read(&self, index: usize) -> u16 {
        if index >= self.words {
            return 0;
        }
        // SAFETY: `index` is in bounds of the live allocation.
        unsafe { *self.ptr.add(index) }
    }

    /// Writes the bytes of `value` selected by `byte_enable`.
    ///
    /// Bit 1 of `byte_enable` selects the high byte, bit 0 the low byte. Out-of-range
    /// writes are ignored.
    pub fn write(&mut self, index: usize, value: u16, byte_enable: u8) {
        if index >= self.words || byte_enable & 0b11 == 0 {
            return;
        }
        let mut mask = 0u16;
        if byte_enable & 0b10 != 0 {
            mask |= 0xFF00;
        }
        if byte_enable & 0b01 != 0 {
            mask |= 0x00FF;
        }
        // SAFETY: `index` is in bounds and `&mut self` guarantees exclusive access.
        unsafe {
            let slot = self.ptr.add(index);
            *slot = (*slot & !mask) | (value & mask);
        }
    }
}

impl Drop for WordBuffer {
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: `ptr`/`words` describe the mapping created in `new`.
            unsafe {
                libc::munmap(self.ptr.cast(), self.words * size_of::<u16>());
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: `ptr`/`words` come from the `Vec` leaked in `new`.
            unsafe {
                drop(Vec::from_raw_parts(self.ptr, self.words, self.words));
            }
        }
    }
}
