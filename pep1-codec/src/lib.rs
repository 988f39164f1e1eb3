//! # PEP1 Codec Library
//!
//! This crate implements PEP1, a small symmetric-key encapsulation protocol
//! for constrained environments where full TLS is not an option. It wraps a
//! payload of arbitrary size into an authenticated, encrypted frame built
//! from 16-byte Twofish blocks chained CBC-style, with a CRC-32 trailer for
//! integrity against transmission errors.
//!
//! ## Features
//!
//! - Two-key scheme: a `common` key protects the frame header, a per-auth-id
//!   `private` key protects the payload.
//! - Streaming block-at-a-time [`Encoder`] and [`Decoder`] state machines,
//!   safe to run on many sessions concurrently.
//! - Two-stage decoding: the header yields the `auth_id` first, so the
//!   receiver can look up the matching private key before touching the
//!   payload, see [`simple_decode_stage1`].
//! - Whole-buffer convenience wrappers [`simple_encode`] / [`simple_decode`]
//!   for payloads up to 16 KiB.
//!
//! ## Example
//!
//! ```rust
//! use pep1_codec::{simple_decode, simple_encode};
//!
//! let key_common = b"0123456789ABCDEF";
//! let key_priv = b"abcdef0123456789";
//!
//! let frame = simple_encode(0x1234, b"attack at dawn", key_common, key_priv).unwrap();
//! let (info, payload) = simple_decode(&frame, key_common, key_priv).unwrap();
//!
//! assert_eq!(info.auth_id, 0x1234);
//! assert_eq!(payload, b"attack at dawn");
//! ```
//!
//! # Security
//!
//! PEP1 provides confidentiality and integrity against random channel
//! errors, not against active forgery: the trailer is a CRC-32, not a MAC.
//! There is no replay protection, key agreement or forward secrecy, and the
//! algorithms are fixed to Twofish-128 and CRC-32 at both endpoints.
use hex::FromHexError;
use thiserror::Error;

pub use crate::{
    decode::{Decoder, Header, Step},
    encode::Encoder,
    frame::{
        BLOCK_LEN, ENCODED_MIN_LEN, KEY_LEN, MAGIC, PROLOGUE_LEN, SIMPLE_ENC_OVERHEAD,
        SIMPLE_MAX_ENCODED, SIMPLE_MAX_PLAIN, frame_len, padding_for, payload_blocks,
    },
    init::init,
    simple::{HeaderInfo, Stage1, simple_decode, simple_decode_stage1, simple_encode},
};

mod crypto;
mod decode;
mod encode;
mod frame;
mod init;
mod simple;

#[cfg(test)]
mod tests;

/// Errors returned by the codec as reasons during encode
/// and decode sessions.
///
/// Decode failures keep the numeric status codes of the wire protocol
/// documentation (`1` unknown magic through `6` verification failed); the
/// code each variant corresponds to is noted on the variant.
#[derive(Error, Debug)]
pub enum Reason {
    /// Status `1`: the frame does not start with the `"Pep1"` magic.
    #[error("[PEP1-Error] frame does not carry the Pep1 magic tag")]
    UnknownMagic,
    /// Status `2`: the header checksum does not match, wrong common key
    /// or corrupted prologue.
    #[error("[PEP1-Error] header checksum mismatch")]
    HeaderCrcMismatch,
    /// Status `3`: nonce bit 31 is reserved for protocol extensions.
    #[error("[PEP1-Error] reserved nonce bit is set")]
    ReservedBitSet,
    /// Status `4`: the decrypted pad length is not a valid 0-15 value,
    /// usually a sign of the wrong private key.
    #[error("[PEP1-Error] pad length {0} out of range, must be 0-15")]
    PadOutOfRange(u8),
    /// Status `5`: the advertised payload exceeds the simple-mode cap.
    #[error("[PEP1-Error] decoded payload size {0} exceeds the {cap} byte simple-mode cap", cap = SIMPLE_MAX_PLAIN)]
    OversizeDecoded(u32),
    /// Status `6`: payload checksum mismatch at the terminal block, wrong
    /// private key or corrupted data.
    #[error("[PEP1-Error] payload verification failed")]
    DecodeVerificationFailed,
    /// The buffer is shorter than the frame it advertises.
    #[error("[PEP1-Error] truncated frame, expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    /// Simple-mode encoding refuses payloads over the cap.
    #[error("[PEP1-Error] payload of {0} bytes exceeds the {cap} byte simple-mode cap", cap = SIMPLE_MAX_PLAIN)]
    OversizePlain(usize),
    #[error("[PEP1-Error] unable to parse hex-string {0}")]
    ParseHex(#[from] FromHexError),
    #[error("[PEP1-Error] key must be {len} bytes, got {0}", len = KEY_LEN)]
    KeyInvalid(usize),
}

/// Parse a 128-bit key from a hex-encoded string, validating
/// length = [`KEY_LEN`].
///
/// ## Example
///
/// ```rust
/// let key = pep1_codec::key_from_hex("30313233343536373839414243444546").unwrap();
/// assert_eq!(&key, b"0123456789ABCDEF");
/// ```
pub fn key_from_hex<S>(hex_key: S) -> Result<[u8; KEY_LEN], Reason>
where
    S: AsRef<[u8]>,
{
    let bytes = hex::decode(hex_key)?;
    bail!(bytes.len() != KEY_LEN, Reason::KeyInvalid(bytes.len()));

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Helper macro to bail out early with a `Reason` error
/// if any condition is true.
#[macro_export]
macro_rules! bail {
    ($expression:expr, $err:expr) => {
        if $expression {
            return Err($err);
        }
    };
    ( $( $cond:expr , $err:expr ),+ $(,)? ) => {
        $(
            if $cond {
                return Err($err);
            }
        )+
    };
}
