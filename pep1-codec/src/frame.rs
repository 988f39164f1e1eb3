//! On-wire layout of a PEP1 frame.
//!
//! A frame is `Magic || EncMeta || EncIv || PayloadBlocks`:
//!
//! | Offset | Len | Contents                                  | Key     |
//! |--------|-----|-------------------------------------------|---------|
//! | 0      | 4   | ASCII `"Pep1"`                            | none    |
//! | 4      | 4   | `auth_id`, little-endian                  | common  |
//! | 8      | 4   | `payload_size`, little-endian             | common  |
//! | 12     | 4   | nonce, little-endian, bit 31 reserved     | common  |
//! | 16     | 4   | CRC-32 over bytes [4..16) before encrypt  | common  |
//! | 20     | 1   | pad length, 0-15                          | private |
//! | 21     | 15  | random bytes                              | private |
//! | 36     | 16K | payload blocks, CBC chained               | private |
//!
//! The ciphertext of the block at [20..36) doubles as the CBC IV for the
//! payload region. Every 32-bit field is serialized little-endian through
//! the helpers below, regardless of the native byte order of the target.

/// Plaintext tag opening every frame.
pub const MAGIC: [u8; 4] = *b"Pep1";

/// Twofish block length; the frame's atomic unit.
pub const BLOCK_LEN: usize = 16;

/// Twofish-128 key length.
pub const KEY_LEN: usize = 16;

/// Length of the CRC-32 trailer closing the payload region.
pub const CRC_TRAILER_LEN: usize = 4;

/// Byte value used for payload padding.
pub const PAD_BYTE: u8 = 0xff;

/// Largest valid pad length.
pub const MAX_PAD: u8 = (BLOCK_LEN - 1) as u8;

pub const AUTH_ID_OFFSET: usize = 4;
pub const PAYLOAD_SIZE_OFFSET: usize = 8;
pub const NONCE_OFFSET: usize = 12;
pub const HEADER_CRC_OFFSET: usize = 16;
pub const IV_OFFSET: usize = 20;
pub const PAYLOAD_OFFSET: usize = 36;

/// Length of the plaintext magic plus the two encrypted header blocks.
pub const PROLOGUE_LEN: usize = PAYLOAD_OFFSET;

/// Nonce bit reserved for protocol extensions, always zero on the wire.
pub const NONCE_RESERVED_MASK: u32 = 0x8000_0000;

/// Smallest possible frame: prologue plus the one payload block an empty
/// payload still needs for its checksum trailer.
pub const ENCODED_MIN_LEN: usize = PROLOGUE_LEN + BLOCK_LEN;

/// Payload cap of the simple-mode wrappers.
pub const SIMPLE_MAX_PLAIN: usize = 16 * 1024;

/// Worst-case framing overhead of a simple-mode encode.
pub const SIMPLE_ENC_OVERHEAD: usize = PROLOGUE_LEN + BLOCK_LEN;

/// Largest frame a simple-mode encode can produce.
pub const SIMPLE_MAX_ENCODED: usize = SIMPLE_MAX_PLAIN + SIMPLE_ENC_OVERHEAD;

/// Number of `0xff` bytes appended so that payload plus pad plus checksum
/// trailer fills whole blocks.
pub fn padding_for(payload_size: u32) -> u8 {
    let tail = (payload_size as u64 + CRC_TRAILER_LEN as u64) % BLOCK_LEN as u64;
    ((BLOCK_LEN as u64 - tail) % BLOCK_LEN as u64) as u8
}

/// Number of 16-byte blocks in the payload region,
/// `ceil((payload_size + 4) / 16)`.
pub fn payload_blocks(payload_size: u32) -> u64 {
    (payload_size as u64 + CRC_TRAILER_LEN as u64).div_ceil(BLOCK_LEN as u64)
}

/// Total encoded length of a frame carrying `payload_size` payload bytes.
pub fn frame_len(payload_size: u32) -> u64 {
    PROLOGUE_LEN as u64 + BLOCK_LEN as u64 * payload_blocks(payload_size)
}

pub(crate) fn get_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().expect("4-byte field"))
}

pub(crate) fn put_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
