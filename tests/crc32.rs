use corecrypt::crc32::{Crc32Backend, Crc32Context, checksum};

#[test]
fn empty_input_is_zero() {
    assert_eq!(checksum(&[]), 0);
}

#[test]
fn single_zero_byte_vector() {
    assert_eq!(checksum(&[0x00]), 0xD202_EF8D);
}

#[test]
fn sixteen_zero_bytes_vector() {
    assert_eq!(checksum(&[0u8; 16]), 0xD7D3_03E7);
}

#[test]
fn ascii_string_vector() {
    // Well-known CRC32 of the literal bytes "123456789".
    assert_eq!(checksum(b"123456789"), 0xCBF4_3926);
}

#[test]
fn streaming_in_arbitrary_chunks_matches_one_shot() {
    let data: Vec<u8> = (0..10_000u32).map(|i| (i * 251) as u8).collect();
    let whole = checksum(&data);

    let mut ctx = Crc32Context::new();
    for chunk in data.chunks(37) {
        ctx.update(chunk);
    }
    assert_eq!(ctx.current(), whole);
}

#[test]
fn every_back_end_agrees_on_every_length_class() {
    let data: Vec<u8> = (0..600u32).map(|i| (i * 97) as u8).collect();

    let mut portable = Crc32Context::with_backend(Crc32Backend::Portable);
    portable.update(&data);
    let expected = portable.current();

    let f = corecrypt::cpu::features();
    if f.avx2 {
        let mut gather = Crc32Context::with_backend(Crc32Backend::Avx2Gather);
        gather.update(&data);
        assert_eq!(gather.current(), expected);
    }
    if f.avx2 && f.pclmulqdq {
        let mut clmul = Crc32Context::with_backend(Crc32Backend::Avx2Clmul);
        clmul.update(&data);
        assert_eq!(clmul.current(), expected);
    }
}
