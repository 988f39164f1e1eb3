use crate::frame::{BLOCK_LEN, PAD_BYTE, PAYLOAD_OFFSET, PROLOGUE_LEN};
use crate::tests::{KEY_COMMON, KEY_PRIV, sample_payload};
use crate::{Decoder, Encoder, Header, Reason, Step, simple_encode};

fn collect_frame(encoder: &mut Encoder, payload: &[u8]) -> Vec<u8> {
    let mut frame = encoder.header().to_vec();
    while let Some(block) = encoder.next_block(payload) {
        frame.extend_from_slice(&block);
    }
    frame
}

fn open_payload(frame: &[u8]) -> Result<Decoder, Reason> {
    let prologue: &[u8; PROLOGUE_LEN] = frame[..PROLOGUE_LEN].try_into().unwrap();
    Header::parse(prologue, KEY_COMMON)?.into_decoder(KEY_PRIV)
}

fn payload_chunks(frame: &[u8]) -> impl Iterator<Item = &[u8; BLOCK_LEN]> {
    frame[PAYLOAD_OFFSET..]
        .chunks_exact(BLOCK_LEN)
        .map(|chunk| chunk.try_into().unwrap())
}

#[test]
fn empty_payload_verifies_on_first_block() -> Result<(), Reason> {
    let mut encoder = Encoder::new(0, 0, KEY_COMMON, KEY_PRIV);

    let first = encoder.next_block(b"");
    assert!(first.is_some());
    assert!(encoder.next_block(b"").is_none());

    let mut frame = encoder.header().to_vec();
    frame.extend_from_slice(&first.unwrap());

    let prologue: &[u8; PROLOGUE_LEN] = frame[..PROLOGUE_LEN].try_into().unwrap();
    let header = Header::parse(prologue, KEY_COMMON)?;
    assert_eq!(header.auth_id(), 0);
    assert_eq!(header.payload_size(), 0);

    let mut decoder = header.into_decoder(KEY_PRIV)?;
    let step = decoder.next_block(frame[PAYLOAD_OFFSET..].try_into().unwrap())?;
    match step {
        // 12 bytes of pure padding ahead of the trailer, no plaintext
        Step::Verified(plain) => assert_eq!(plain[..12], [PAD_BYTE; 12]),
        Step::NeedMore(_) => panic!("single-block frame must verify immediately"),
    }
    Ok(())
}

#[test]
fn step_sequence_for_three_block_payload() -> Result<(), Reason> {
    let payload = sample_payload(42);
    let mut encoder = Encoder::new(5, 42, KEY_COMMON, KEY_PRIV);
    let frame = collect_frame(&mut encoder, &payload);

    let mut decoder = open_payload(&frame)?;
    let mut steps = payload_chunks(&frame);

    let Step::NeedMore(first) = decoder.next_block(steps.next().unwrap())? else {
        panic!("block 0 of 3 cannot be terminal");
    };
    assert_eq!(first[..], payload[..16]);

    let Step::NeedMore(second) = decoder.next_block(steps.next().unwrap())? else {
        panic!("block 1 of 3 cannot be terminal");
    };
    assert_eq!(second[..], payload[16..32]);

    let Step::Verified(last) = decoder.next_block(steps.next().unwrap())? else {
        panic!("block 2 of 3 must verify");
    };
    assert_eq!(last[..10], payload[32..]);
    assert_eq!(last[10..12], [PAD_BYTE; 2]);
    Ok(())
}

#[test]
fn pad_bytes_are_ff_in_delivered_blocks() -> Result<(), Reason> {
    let payload = sample_payload(13);
    let frame = simple_encode(9, &payload, KEY_COMMON, KEY_PRIV)?;

    let mut decoder = open_payload(&frame)?;
    let mut chunks = payload_chunks(&frame);

    // 13 payload bytes, 15 pad bytes, 4 trailer bytes across two blocks
    let Step::NeedMore(first) = decoder.next_block(chunks.next().unwrap())? else {
        panic!("straddled tail needs a second block");
    };
    assert_eq!(first[..13], payload[..]);
    assert_eq!(first[13..], [PAD_BYTE; 3]);

    let Step::Verified(last) = decoder.next_block(chunks.next().unwrap())? else {
        panic!("second block must verify");
    };
    assert_eq!(last[..12], [PAD_BYTE; 12]);
    Ok(())
}

#[test]
fn decoder_rejects_blocks_after_verification() -> Result<(), Reason> {
    let payload = sample_payload(8);
    let frame = simple_encode(1, &payload, KEY_COMMON, KEY_PRIV)?;

    let mut decoder = open_payload(&frame)?;
    let block: &[u8; BLOCK_LEN] = frame[PAYLOAD_OFFSET..].try_into().unwrap();
    assert!(matches!(decoder.next_block(block)?, Step::Verified(_)));

    assert!(matches!(
        decoder.next_block(block),
        Err(Reason::DecodeVerificationFailed)
    ));
    Ok(())
}

#[test]
fn interleaved_sessions_stay_isolated() -> Result<(), Reason> {
    let payload_a = sample_payload(40);
    let payload_b: Vec<u8> = sample_payload(77).iter().map(|b| !b).collect();

    let mut enc_a = Encoder::new(0xa, 40, KEY_COMMON, KEY_PRIV);
    let mut enc_b = Encoder::new(0xb, 77, KEY_COMMON, KEY_PRIV);
    let mut frame_a = enc_a.header().to_vec();
    let mut frame_b = enc_b.header().to_vec();

    // alternate the two sessions block by block
    loop {
        let a = enc_a.next_block(&payload_a);
        let b = enc_b.next_block(&payload_b);
        if let Some(block) = a {
            frame_a.extend_from_slice(&block);
        }
        if let Some(block) = b {
            frame_b.extend_from_slice(&block);
        }
        if a.is_none() && b.is_none() {
            break;
        }
    }

    let (info_a, plain_a) = crate::simple_decode(&frame_a, KEY_COMMON, KEY_PRIV)?;
    let (info_b, plain_b) = crate::simple_decode(&frame_b, KEY_COMMON, KEY_PRIV)?;

    assert_eq!(info_a.auth_id, 0xa);
    assert_eq!(info_b.auth_id, 0xb);
    assert_eq!(plain_a, payload_a);
    assert_eq!(plain_b, payload_b);
    Ok(())
}

#[test]
fn two_stage_decode_selects_key_by_auth_id() -> Result<(), Reason> {
    let keyring = |auth_id: u32| -> &'static [u8; 16] {
        match auth_id {
            1 => b"abcdef0123456789",
            _ => b"FEDCBA9876543210",
        }
    };

    let frame = simple_encode(1, b"routed by auth id", KEY_COMMON, keyring(1))?;

    let stage1 = crate::simple_decode_stage1(&frame, KEY_COMMON)?;
    let key_priv = keyring(stage1.auth_id());
    let decoded = stage1.finish(key_priv)?;

    assert_eq!(decoded, b"routed by auth id");
    Ok(())
}
