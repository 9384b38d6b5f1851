use corecrypt::camellia::{CamelliaBackend, EcbContext, generate};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[test]
fn rfc3713_128bit_ecb_vector() {
    let key = unhex("0123456789abcdeffedcba9876543210");
    let plaintext = unhex("0123456789abcdeffedcba9876543210");
    let expected = unhex("67673138549669730857065648eabe43");

    let ctx = EcbContext::new(generate(&key, true));
    let mut out = vec![0u8; 16];
    ctx.process_blocks(&mut out, &plaintext, 16).unwrap();
    assert_eq!(hex(&out), hex(&expected));
}

#[test]
fn rfc3713_192bit_ecb_vector() {
    let key = unhex("0123456789abcdeffedcba98765432100011223344556677");
    let plaintext = unhex("0123456789abcdeffedcba9876543210");
    let expected = unhex("b4993401b3e996f84ee5cee7d79b09b9");

    let ctx = EcbContext::new(generate(&key, true));
    let mut out = vec![0u8; 16];
    ctx.process_blocks(&mut out, &plaintext, 16).unwrap();
    assert_eq!(hex(&out), hex(&expected));
}

#[test]
fn rfc3713_256bit_ecb_vector() {
    let key = unhex("0123456789abcdeffedcba987654321000112233445566778899aabbccddeeff");
    let plaintext = unhex("0123456789abcdeffedcba9876543210");
    let expected = unhex("9acc237dff16d76c20ef7c919e3a7509");

    let ctx = EcbContext::new(generate(&key, true));
    let mut out = vec![0u8; 16];
    ctx.process_blocks(&mut out, &plaintext, 16).unwrap();
    assert_eq!(hex(&out), hex(&expected));
}

#[test]
fn ecb_decrypt_inverts_encrypt_for_every_key_size() {
    for key_len in [16, 24, 32] {
        let key: Vec<u8> = (0..key_len as u32).map(|i| (i * 29) as u8).collect();
        let plaintext: Vec<u8> = (0..48u32).map(|i| (i * 7) as u8).collect();

        let enc = EcbContext::new(generate(&key, true));
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.process_blocks(&mut ciphertext, &plaintext, plaintext.len())
            .unwrap();

        let dec = EcbContext::new(generate(&key, false));
        let mut recovered = vec![0u8; plaintext.len()];
        dec.process_blocks(&mut recovered, &ciphertext, ciphertext.len())
            .unwrap();

        assert_eq!(recovered, plaintext, "key_len={key_len}");
    }
}

#[test]
fn all_back_ends_agree_on_128bit_ecb() {
    let key = unhex("0123456789abcdeffedcba9876543210");
    let plaintext: Vec<u8> = (0..(64 * 16u32)).map(|i| i as u8).collect();

    let portable = EcbContext::with_backend(generate(&key, true), CamelliaBackend::Portable);
    let mut expected = vec![0u8; plaintext.len()];
    portable
        .process_blocks(&mut expected, &plaintext, plaintext.len())
        .unwrap();

    if corecrypt::cpu::features().avx2 {
        for backend in [CamelliaBackend::Avx2x8, CamelliaBackend::Avx2x32Gather] {
            let ctx = EcbContext::with_backend(generate(&key, true), backend);
            let mut out = vec![0u8; plaintext.len()];
            ctx.process_blocks(&mut out, &plaintext, plaintext.len())
                .unwrap();
            assert_eq!(out, expected, "backend={backend:?}");
        }
    }
}
