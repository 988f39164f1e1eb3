//! Two-phase streaming frame decoder.
//!
//! Decoding is split so the receiver can pick the private key after reading
//! the header: [`Header::parse`] verifies the prologue under the common key
//! and yields the `auth_id`; [`Header::into_decoder`] then opens the
//! payload stage under whichever private key that `auth_id` maps to.

use crate::crypto::{Block, BlockCrypt, Crc32, xor_block};
use crate::frame::{
    AUTH_ID_OFFSET, BLOCK_LEN, CRC_TRAILER_LEN, HEADER_CRC_OFFSET, IV_OFFSET, KEY_LEN, MAGIC,
    MAX_PAD, NONCE_OFFSET, NONCE_RESERVED_MASK, PAYLOAD_SIZE_OFFSET, PROLOGUE_LEN, get_u32_le,
};
use crate::{Reason, bail};

/// A verified, decrypted frame prologue.
///
/// Holds everything the first decode phase learns: the `auth_id` to select
/// the private key with, the advertised payload size, and the still
/// encrypted IV block for the payload phase.
#[derive(Debug)]
pub struct Header {
    auth_id: u32,
    payload_size: u32,
    iv: Block,
}

impl Header {
    /// Verifies and decrypts the 36-byte frame prologue under the
    /// common key.
    pub fn parse(
        prologue: &[u8; PROLOGUE_LEN],
        key_common: &[u8; KEY_LEN],
    ) -> Result<Self, Reason> {
        bail!(prologue[..MAGIC.len()] != MAGIC, Reason::UnknownMagic);

        let mut hdr = *prologue;
        BlockCrypt::new(key_common).decrypt(&mut hdr[AUTH_ID_OFFSET..IV_OFFSET]);

        let mut crc = Crc32::start();
        crc.append(&hdr[AUTH_ID_OFFSET..HEADER_CRC_OFFSET]);
        bail!(
            crc.finalize() != get_u32_le(&hdr, HEADER_CRC_OFFSET),
            Reason::HeaderCrcMismatch
        );

        let nonce = get_u32_le(&hdr, NONCE_OFFSET);
        bail!(nonce & NONCE_RESERVED_MASK != 0, Reason::ReservedBitSet);

        Ok(Self {
            auth_id: get_u32_le(&hdr, AUTH_ID_OFFSET),
            payload_size: get_u32_le(&hdr, PAYLOAD_SIZE_OFFSET),
            iv: hdr[IV_OFFSET..PROLOGUE_LEN]
                .try_into()
                .expect("16-byte IV block"),
        })
    }

    /// Identifier the sender chose for private-key selection.
    pub fn auth_id(&self) -> u32 {
        self.auth_id
    }

    /// Plaintext byte count the frame advertises.
    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Opens the payload phase under the private key selected for
    /// [`auth_id`](Self::auth_id).
    pub fn into_decoder(self, key_priv: &[u8; KEY_LEN]) -> Result<Decoder, Reason> {
        let cipher = BlockCrypt::new(key_priv);

        // The IV block ciphertext seeds the chain; decryption happens on
        // a copy afterwards.
        let chain = self.iv;
        let mut iv = self.iv;
        cipher.decrypt(&mut iv);

        // The payload checksum covers the IV block plaintext before any
        // payload bytes.
        let mut crc = Crc32::start();
        crc.append(&iv);

        let pad = iv[0];
        bail!(pad > MAX_PAD, Reason::PadOutOfRange(pad));

        Ok(Decoder {
            payload_size: self.payload_size,
            pad,
            consumed: 0,
            chain,
            crc,
            cipher,
        })
    }
}

/// Outcome of feeding one ciphertext block to [`Decoder::next_block`].
pub enum Step {
    /// More blocks are expected. Carries the block's decrypted
    /// contribution; bytes past the payload boundary are `0xff` padding
    /// and must be discarded.
    NeedMore(Block),
    /// Terminal block, running checksum verified. The first 12 bytes are
    /// the last payload and pad bytes, the rest is the checksum trailer.
    Verified(Block),
}

/// The payload phase of a decoding session.
///
/// Feed the ciphertext blocks at frame offsets 36, 52, 68, ... in order.
/// Plaintext handed back before [`Step::Verified`] is decrypted but not
/// yet authenticated and must be treated as untrusted until the terminal
/// checksum matches.
pub struct Decoder {
    payload_size: u32,
    pad: u8,
    consumed: u64,
    chain: Block,
    crc: Crc32,
    cipher: BlockCrypt,
}

impl Decoder {
    /// Plaintext byte count the frame advertises.
    pub fn payload_size(&self) -> u32 {
        self.payload_size
    }

    /// Decrypts and de-chains the next 16-byte ciphertext block.
    ///
    /// Errors are terminal: a session that returned
    /// [`Reason::DecodeVerificationFailed`] cannot make further progress,
    /// and neither can one that already reported [`Step::Verified`].
    pub fn next_block(&mut self, dat: &[u8; BLOCK_LEN]) -> Result<Step, Reason> {
        let expected = self.payload_size as u64 + self.pad as u64;
        bail!(self.consumed > expected, Reason::DecodeVerificationFailed);

        let prev = self.chain;
        self.chain = *dat;
        let mut blk = *dat;
        self.cipher.decrypt(&mut blk);
        xor_block(&mut blk, &prev);

        let remaining = expected - self.consumed;
        self.consumed += BLOCK_LEN as u64;

        if remaining == (BLOCK_LEN - CRC_TRAILER_LEN) as u64 {
            // terminal block: 12 bytes of payload/pad, then the trailer
            self.crc.append(&blk[..BLOCK_LEN - CRC_TRAILER_LEN]);
            bail!(
                self.crc.finalize() != get_u32_le(&blk, BLOCK_LEN - CRC_TRAILER_LEN),
                Reason::DecodeVerificationFailed
            );
            Ok(Step::Verified(blk))
        } else {
            self.crc.append(&blk);
            Ok(Step::NeedMore(blk))
        }
    }
}
