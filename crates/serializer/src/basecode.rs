//! Radix-64 codec for byte buffers
//!
//! Standard Base64 packing (3 bytes → 4 symbols) over the Haxe alphabet,
//! which replaces `+` and `/` with `%` and `:`. No `=` padding is written:
//! a 1-byte tail becomes 2 symbols and a 2-byte tail becomes 3, with the
//! unused low bits set to zero.
//!
//! ```text
//! "Hello World!"  →  SGVsbG8gV29ybGQh
//! [0xfb, 0xff]    →  %:8
//! ```

use base64::Engine;
use base64::alphabet::Alphabet;
use base64::engine::{GeneralPurpose, general_purpose};

const HAXE_ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789%:") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("invalid radix-64 alphabet"),
    };

const HAXE_ENGINE: GeneralPurpose = GeneralPurpose::new(&HAXE_ALPHABET, general_purpose::NO_PAD);

/// Encode bytes with the Haxe alphabet
pub fn encode(bytes: &[u8]) -> String {
    HAXE_ENGINE.encode(bytes)
}

/// Number of symbols `encode` produces for `len` input bytes
pub fn encoded_len(len: usize) -> usize {
    let full = (len / 3) * 4;
    match len % 3 {
        0 => full,
        rest => full + rest + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_world() {
        assert_eq!(encode(b"Hello World!"), "SGVsbG8gV29ybGQh");
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encoded_len(0), 0);
    }

    #[test]
    fn test_substituted_symbols() {
        // 0xfb 0xff 0xbf packs to sextets 62 63 62 63
        assert_eq!(encode(&[0xfb, 0xff, 0xbf]), "%:%:");
    }

    #[test]
    fn test_tails_are_unpadded() {
        assert_eq!(encode(b"a"), "YQ");
        assert_eq!(encode(b"ab"), "YWI");
        assert_eq!(encode(b"abc"), "YWJj");
        assert_eq!(encode(&[0xfb, 0xff]), "%:8");
    }

    #[test]
    fn test_encoded_len_matches_output() {
        for len in 0..10 {
            let data = vec![0x5a; len];
            assert_eq!(encode(&data).len(), encoded_len(len), "len {}", len);
        }
    }
}
