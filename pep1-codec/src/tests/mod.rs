use crate::frame::KEY_LEN;

mod framing;
mod streaming;

pub(crate) const KEY_COMMON: &[u8; KEY_LEN] = b"0123456789ABCDEF";
pub(crate) const KEY_PRIV: &[u8; KEY_LEN] = b"abcdef0123456789";

/// Deterministic payload filler so failures reproduce.
pub(crate) fn sample_payload(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(7))
        .collect()
}
