//! Whole-buffer convenience wrappers that drive the streaming codecs to
//! completion, capped at [`SIMPLE_MAX_PLAIN`] payload bytes.

use crate::decode::{Header, Step};
use crate::encode::Encoder;
use crate::frame::{
    BLOCK_LEN, ENCODED_MIN_LEN, KEY_LEN, PAYLOAD_OFFSET, PROLOGUE_LEN, SIMPLE_MAX_PLAIN,
    frame_len,
};
use crate::init::init;
use crate::{Reason, bail};

/// `auth_id` and advertised payload size recovered from a frame prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    pub auth_id: u32,
    pub payload_size: u32,
}

/// Encodes `payload` into one contiguous frame.
///
/// Refuses payloads over [`SIMPLE_MAX_PLAIN`]; the streaming [`Encoder`]
/// has no such cap.
pub fn simple_encode(
    auth_id: u32,
    payload: &[u8],
    key_common: &[u8; KEY_LEN],
    key_priv: &[u8; KEY_LEN],
) -> Result<Vec<u8>, Reason> {
    init();
    bail!(
        payload.len() > SIMPLE_MAX_PLAIN,
        Reason::OversizePlain(payload.len())
    );

    let size = payload.len() as u32;
    let mut encoder = Encoder::new(auth_id, size, key_common, key_priv);

    let mut out = Vec::with_capacity(frame_len(size) as usize);
    out.extend_from_slice(encoder.header());
    while let Some(block) = encoder.next_block(payload) {
        out.extend_from_slice(&block);
    }
    Ok(out)
}

/// First decode stage: verifies the prologue under the common key.
///
/// Returns a [`Stage1`] handle exposing the `auth_id`, so the caller can
/// look up the matching private key before [`Stage1::finish`].
pub fn simple_decode_stage1<'a>(
    frame: &'a [u8],
    key_common: &[u8; KEY_LEN],
) -> Result<Stage1<'a>, Reason> {
    init();
    bail!(
        frame.len() < ENCODED_MIN_LEN,
        Reason::Truncated {
            expected: ENCODED_MIN_LEN,
            actual: frame.len(),
        }
    );

    let prologue: &[u8; PROLOGUE_LEN] = frame[..PROLOGUE_LEN]
        .try_into()
        .expect("length checked above");
    let header = Header::parse(prologue, key_common)?;

    let payload_size = header.payload_size();
    bail!(
        payload_size as usize > SIMPLE_MAX_PLAIN,
        Reason::OversizeDecoded(payload_size)
    );

    let expected = frame_len(payload_size) as usize;
    bail!(
        frame.len() < expected,
        Reason::Truncated {
            expected,
            actual: frame.len(),
        }
    );

    Ok(Stage1 { frame, header })
}

/// A frame whose prologue has been verified, waiting for the private key.
#[derive(Debug)]
pub struct Stage1<'a> {
    frame: &'a [u8],
    header: Header,
}

impl Stage1<'_> {
    pub fn auth_id(&self) -> u32 {
        self.header.auth_id()
    }

    pub fn payload_size(&self) -> u32 {
        self.header.payload_size()
    }

    pub fn info(&self) -> HeaderInfo {
        HeaderInfo {
            auth_id: self.header.auth_id(),
            payload_size: self.header.payload_size(),
        }
    }

    /// Second decode stage: decrypts and verifies the payload region,
    /// returning exactly the advertised plaintext bytes.
    pub fn finish(self, key_priv: &[u8; KEY_LEN]) -> Result<Vec<u8>, Reason> {
        let size = self.header.payload_size() as usize;
        let mut decoder = self.header.into_decoder(key_priv)?;
        let mut out = Vec::with_capacity(size);

        for (ix, dat) in self.frame[PAYLOAD_OFFSET..]
            .chunks_exact(BLOCK_LEN)
            .enumerate()
        {
            let dat: &[u8; BLOCK_LEN] = dat.try_into().expect("exact chunk");
            // Only the plaintext portion of the delivered block reaches
            // the caller; pad and trailer bytes stay behind.
            let keep = size.saturating_sub(ix * BLOCK_LEN).min(BLOCK_LEN);

            match decoder.next_block(dat)? {
                Step::NeedMore(plain) => out.extend_from_slice(&plain[..keep]),
                Step::Verified(plain) => {
                    out.extend_from_slice(&plain[..keep]);
                    return Ok(out);
                }
            }
        }
        Err(Reason::DecodeVerificationFailed)
    }
}

/// One-call decode for callers that already know the private key.
pub fn simple_decode(
    frame: &[u8],
    key_common: &[u8; KEY_LEN],
    key_priv: &[u8; KEY_LEN],
) -> Result<(HeaderInfo, Vec<u8>), Reason> {
    let stage1 = simple_decode_stage1(frame, key_common)?;
    let info = stage1.info();
    let payload = stage1.finish(key_priv)?;
    Ok((info, payload))
}
