//! Streaming frame encoder.

use rand::{Rng, thread_rng};

use crate::crypto::{Block, BlockCrypt, Crc32, xor_block};
use crate::frame::{
    AUTH_ID_OFFSET, BLOCK_LEN, CRC_TRAILER_LEN, HEADER_CRC_OFFSET, IV_OFFSET, KEY_LEN, MAGIC,
    NONCE_OFFSET, PAD_BYTE, PAYLOAD_SIZE_OFFSET, PROLOGUE_LEN, padding_for, put_u32_le,
};

/// A single encoding session.
///
/// Construction builds the 36-byte frame prologue; [`next_block`] then
/// turns the plaintext into ciphertext blocks 16 bytes at a time, injecting
/// the `0xff` padding and the CRC-32 trailer behind the last payload byte.
///
/// One `Encoder` drives one frame. Sessions own their cipher schedules and
/// checksum state, so independent sessions may run in parallel.
///
/// ## Example
///
/// ```rust
/// use pep1_codec::Encoder;
///
/// let payload = b"per-block encoding";
/// let mut encoder = Encoder::new(
///     7,
///     payload.len() as u32,
///     b"0123456789ABCDEF",
///     b"abcdef0123456789",
/// );
///
/// let mut frame = encoder.header().to_vec();
/// while let Some(block) = encoder.next_block(payload) {
///     frame.extend_from_slice(&block);
/// }
/// assert_eq!(frame.len(), 36 + 32);
/// ```
///
/// [`next_block`]: Self::next_block
pub struct Encoder {
    header: [u8; PROLOGUE_LEN],
    payload_size: u32,
    pad: u8,
    emitted: u64,
    chain: Block,
    crc: Crc32,
    cipher: BlockCrypt,
}

impl Encoder {
    /// Opens an encoding session for `payload_size` plaintext bytes and
    /// builds the frame prologue.
    pub fn new(
        auth_id: u32,
        payload_size: u32,
        key_common: &[u8; KEY_LEN],
        key_priv: &[u8; KEY_LEN],
    ) -> Self {
        let mut rng = thread_rng();
        let mut header = [0u8; PROLOGUE_LEN];

        header[..MAGIC.len()].copy_from_slice(&MAGIC);
        put_u32_le(&mut header, AUTH_ID_OFFSET, auth_id);
        put_u32_le(&mut header, PAYLOAD_SIZE_OFFSET, payload_size);
        // bit 31 of the nonce is reserved for extensions, always zero
        let nonce = rng.r#gen::<u32>() & 0x7fff_ffff;
        put_u32_le(&mut header, NONCE_OFFSET, nonce);

        let mut hdr_crc = Crc32::start();
        hdr_crc.append(&header[AUTH_ID_OFFSET..HEADER_CRC_OFFSET]);
        put_u32_le(&mut header, HEADER_CRC_OFFSET, hdr_crc.finalize());
        BlockCrypt::new(key_common).encrypt(&mut header[AUTH_ID_OFFSET..IV_OFFSET]);

        let pad = padding_for(payload_size);
        header[IV_OFFSET] = pad;
        rng.fill(&mut header[IV_OFFSET + 1..PROLOGUE_LEN]);

        // The payload checksum covers the IV block plaintext before any
        // payload bytes.
        let mut crc = Crc32::start();
        crc.append(&header[IV_OFFSET..PROLOGUE_LEN]);

        let cipher = BlockCrypt::new(key_priv);
        cipher.encrypt(&mut header[IV_OFFSET..PROLOGUE_LEN]);

        // The IV block ciphertext seeds the CBC chain.
        let mut chain = [0u8; BLOCK_LEN];
        chain.copy_from_slice(&header[IV_OFFSET..PROLOGUE_LEN]);

        Self {
            header,
            payload_size,
            pad,
            emitted: 0,
            chain,
            crc,
            cipher,
        }
    }

    /// The 36-byte frame prologue: magic, encrypted metadata block and
    /// encrypted IV block.
    pub fn header(&self) -> &[u8; PROLOGUE_LEN] {
        &self.header
    }

    /// Encrypts the next 16-byte stride of `payload`.
    ///
    /// `payload` is the full plaintext buffer, passed on every call; the
    /// session tracks its own position and must see the same buffer each
    /// time. Keep calling until `None`, which signals that the final block
    /// carrying the checksum trailer has been produced.
    pub fn next_block(&mut self, payload: &[u8]) -> Option<Block> {
        debug_assert_eq!(payload.len() as u64, self.payload_size as u64);

        let psz = self.payload_size as u64;
        let need = psz + self.pad as u64 + CRC_TRAILER_LEN as u64;
        if self.emitted >= need {
            return None;
        }

        let mut blk: Block;
        if self.emitted + BLOCK_LEN as u64 > psz {
            // Last payload bytes, 0xff padding and the checksum trailer
            // meet inside this block.
            blk = [PAD_BYTE; BLOCK_LEN];
            let r = psz.saturating_sub(self.emitted) as usize;
            if r > 0 {
                let at = self.emitted as usize;
                blk[..r].copy_from_slice(&payload[at..at + r]);
            }
            self.crc.append(&blk[..BLOCK_LEN - CRC_TRAILER_LEN]);
            if r <= BLOCK_LEN - CRC_TRAILER_LEN {
                // plaintext and pad end within the first 12 bytes, the
                // finalized checksum closes this block
                let sum = self.crc.finalize();
                blk[BLOCK_LEN - CRC_TRAILER_LEN..].copy_from_slice(&sum.to_le_bytes());
            } else {
                // bytes [12..16) still hold plaintext and pad, they take
                // part in the checksum and the trailer lands in the next,
                // all-pad block
                self.crc.append(&blk[BLOCK_LEN - CRC_TRAILER_LEN..]);
            }
        } else {
            let at = self.emitted as usize;
            blk = payload[at..at + BLOCK_LEN]
                .try_into()
                .expect("16-byte stride");
            self.crc.append(&blk);
        }

        xor_block(&mut blk, &self.chain);
        self.cipher.encrypt(&mut blk);
        self.chain = blk;
        self.emitted += BLOCK_LEN as u64;
        Some(blk)
    }
}
