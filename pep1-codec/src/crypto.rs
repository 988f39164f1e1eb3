//! Adapters over the two external collaborators, the Twofish block cipher
//! and the CRC-32 accumulator. Chaining, padding and framing all live in
//! the codec modules; this module only moves 16-byte blocks and checksum
//! bytes through the underlying crates.

use crc32fast::Hasher;
use twofish::Twofish;
use twofish::cipher::generic_array::GenericArray;
use twofish::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::frame::{BLOCK_LEN, KEY_LEN};

pub(crate) type Block = [u8; BLOCK_LEN];

/// One installed Twofish key schedule.
///
/// Each codec session owns its own schedules, one per key, so sessions can
/// run concurrently without sharing cipher state.
pub(crate) struct BlockCrypt {
    schedule: Twofish,
}

impl BlockCrypt {
    pub(crate) fn new(key: &[u8; KEY_LEN]) -> Self {
        // 128-bit keys are always within Twofish's accepted range.
        let schedule = Twofish::new_from_slice(key).expect("16-byte Twofish key");
        Self { schedule }
    }

    /// ECB-encrypt `buf` in place; `buf.len()` must be a multiple of 16.
    pub(crate) fn encrypt(&self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(BLOCK_LEN) {
            self.schedule.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }

    /// ECB-decrypt `buf` in place; `buf.len()` must be a multiple of 16.
    pub(crate) fn decrypt(&self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(BLOCK_LEN) {
            self.schedule.decrypt_block(GenericArray::from_mut_slice(block));
        }
    }
}

/// Incremental CRC-32 accumulator over a byte stream, IEEE 802.3
/// polynomial, little-endian 32-bit result on the wire.
pub(crate) struct Crc32 {
    acc: Hasher,
}

impl Crc32 {
    pub(crate) fn start() -> Self {
        Self { acc: Hasher::new() }
    }

    pub(crate) fn append(&mut self, dat: &[u8]) {
        self.acc.update(dat);
    }

    /// Finalized value over everything appended so far. The accumulator
    /// stays usable, appending may continue after a peek.
    pub(crate) fn finalize(&self) -> u32 {
        self.acc.clone().finalize()
    }
}

/// XOR `chain` into `block`, the CBC chaining step.
pub(crate) fn xor_block(block: &mut Block, chain: &Block) {
    block
        .iter_mut()
        .enumerate()
        .for_each(|(ix, byte)| *byte ^= chain[ix]);
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockCrypt, Crc32, xor_block};

    #[test]
    fn block_round_trip() {
        let crypt = BlockCrypt::new(b"0123456789ABCDEF");
        let plain: Block = *b"sixteen byte msg";

        let mut buf = plain;
        crypt.encrypt(&mut buf);
        assert_ne!(buf, plain);

        crypt.decrypt(&mut buf);
        assert_eq!(buf, plain);
    }

    #[test]
    fn crc_peek_does_not_disturb_the_stream() {
        let mut crc = Crc32::start();
        crc.append(b"hello ");
        let midway = crc.finalize();
        crc.append(b"world");

        let mut whole = Crc32::start();
        whole.append(b"hello world");

        assert_ne!(midway, crc.finalize());
        assert_eq!(whole.finalize(), crc.finalize());
    }

    #[test]
    fn xor_is_self_inverse() {
        let chain: Block = [0x5a; 16];
        let mut block: Block = *b"0123456789abcdef";
        let before = block;

        xor_block(&mut block, &chain);
        xor_block(&mut block, &chain);
        assert_eq!(block, before);
    }
}
