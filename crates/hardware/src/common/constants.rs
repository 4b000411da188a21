//! HyperBus Protocol Constants.
//!
//! This module defines the fixed encodings shared by the controller, the register space,
//! and the simulated device. It includes:
//! 1. **Command-Address Layout:** Bit positions inside the 48-bit CA packet.
//! 2. **Register Layout:** CR0 fields and the latency code table.
//! 3. **Register Space Addressing:** Where register number, type, and die land in an address.
//! 4. **Lane Constants:** Half-word width and strobe bits used by both bus widths.

/// CA bit 47: set for a read transaction, clear for a write.
pub const CA_READ_BIT: u32 = 47;

/// CA bit 46: set when the transaction targets register space.
pub const CA_REGISTER_SPACE_BIT: u32 = 46;

/// CA bit 45: set for a linear burst, clear for a wrapped burst.
pub const CA_LINEAR_BURST_BIT: u32 = 45;

/// Lowest CA bit of the upper address field (address bits 31..3 land in CA 44..16).
pub const CA_UPPER_ADDR_SHIFT: u32 = 16;

/// Number of address bits carried in the lower CA field (CA 2..0).
pub const CA_LOWER_ADDR_BITS: u32 = 3;

/// Mask for the upper address field once shifted down to bit 0 (29 bits).
pub const CA_UPPER_ADDR_MASK: u64 = 0x1FFF_FFFF;

/// Mask for the lower address field (3 bits).
pub const CA_LOWER_ADDR_MASK: u64 = 0x7;

/// Total width of a CA packet in bits.
pub const CA_BITS: u32 = 48;

/// Number of 16-bit half-words in a CA packet.
pub const CA_HALF_WORDS: u32 = CA_BITS / HALF_WORD_BITS;

/// Reset value of the CA register: zero-latency write of CR0, linear burst, die 0.
pub const CA_INITIAL_CR0_WRITE: u64 = 0x6000_0100_0000;

/// Fixed bits of CR0 as written by the controller.
///
/// Deep power-down disabled, default drive strength, reserved bits set,
/// legacy wrapped burst, 32-byte burst length.
pub const CR0_BASE: u16 = 0x8F07;

/// Bit position of the initial latency code inside CR0.
pub const CR0_LATENCY_SHIFT: u32 = 4;

/// Mask of the initial latency code inside CR0 (after shifting).
pub const CR0_LATENCY_MASK: u16 = 0xF;

/// CR0 fixed-latency enable bit.
pub const CR0_FIXED_LATENCY: u16 = 0x0008;

/// Mask of the burst length field inside CR0.
pub const CR0_BURST_LENGTH_MASK: u16 = 0x3;

/// Reset value of CR0 in a HyperRAM die (latency 6, fixed latency, 32-byte bursts).
pub const CR0_DEVICE_DEFAULT: u16 = 0x8F1F;

/// Reset value of CR1 in a HyperRAM die.
pub const CR1_DEVICE_DEFAULT: u16 = 0xFFC1;

/// Smallest initial latency the protocol can encode.
pub const MIN_INITIAL_LATENCY: u8 = 3;

/// CR0 latency codes indexed by `initial_latency - MIN_INITIAL_LATENCY`.
pub const LATENCY_CODES: [u16; 5] = [0b1110, 0b1111, 0b0000, 0b0001, 0b0010];

/// Mask of the register number field (address bits 0..2).
pub const REG_NR_MASK: u32 = 0x7;

/// Address bit position of the register type field.
pub const REG_TYPE_SHIFT: u32 = 11;

/// Mask of the register type field.
pub const REG_TYPE_MASK: u32 = 0xFF;

/// Register type: identification registers.
pub const REG_TYPE_ID: u8 = 0;

/// Register type: configuration registers.
pub const REG_TYPE_CONFIG: u8 = 1;

/// Width of one HyperBus transfer unit (one bus clock, both edges) in bits.
pub const HALF_WORD_BITS: u32 = 16;

/// Mask of one 16-bit half-word.
pub const HALF_WORD_MASK: u32 = 0xFFFF;

/// Number of RWDS bits per half-word (one per byte, first edge in the high bit).
pub const RWDS_BITS_PER_HALF: u32 = 2;

/// Controller clock used as the reset timer base: one reset tick per 200 ns.
pub const RESET_TICK_HZ: u64 = 5_000_000;
