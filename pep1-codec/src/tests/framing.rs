use crate::crypto::BlockCrypt;
use crate::frame::{
    AUTH_ID_OFFSET, IV_OFFSET, NONCE_OFFSET, NONCE_RESERVED_MASK, PROLOGUE_LEN,
};
use crate::tests::{KEY_COMMON, KEY_PRIV, sample_payload};
use crate::{MAGIC, Reason, simple_encode};

#[test]
fn nonce_reserved_bit_is_always_zero() -> Result<(), Reason> {
    let crypt = BlockCrypt::new(KEY_COMMON);

    for _ in 0..64 {
        let frame = simple_encode(3, b"nonce probe", KEY_COMMON, KEY_PRIV)?;

        let mut meta = [0u8; 16];
        meta.copy_from_slice(&frame[AUTH_ID_OFFSET..IV_OFFSET]);
        crypt.decrypt(&mut meta);

        let nonce = u32::from_le_bytes(meta[NONCE_OFFSET - AUTH_ID_OFFSET..][..4].try_into().unwrap());
        assert_eq!(nonce & NONCE_RESERVED_MASK, 0);
    }
    Ok(())
}

#[test]
fn same_inputs_produce_different_frames() -> Result<(), Reason> {
    let payload = sample_payload(64);
    let first = simple_encode(17, &payload, KEY_COMMON, KEY_PRIV)?;
    let second = simple_encode(17, &payload, KEY_COMMON, KEY_PRIV)?;

    assert_eq!(first.len(), second.len());
    assert_eq!(first[..4], MAGIC);
    assert_eq!(second[..4], MAGIC);
    // the nonce and the random pad tail keep repeated frames distinct
    assert_ne!(first[4..PROLOGUE_LEN], second[4..PROLOGUE_LEN]);
    assert_ne!(first[PROLOGUE_LEN..], second[PROLOGUE_LEN..]);
    Ok(())
}
