//! Unpadded base64url encoding used by token segments

use crate::Result;
use base64::{engine::general_purpose, Engine as _};

/// Encode bytes as base64url without padding
pub fn encode(data: impl AsRef<[u8]>) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(data)
}

/// Decode an unpadded base64url string
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::URL_SAFE_NO_PAD.decode(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_removed_for_every_remainder() {
        assert_eq!(encode(b"abc"), "YWJj");
        assert_eq!(encode(b"abcd"), "YWJjZA");
        assert_eq!(encode(b"abcde"), "YWJjZGU");
    }

    #[test]
    fn test_url_alphabet() {
        let bytes = [0xfb, 0xff, 0xbf];
        assert_eq!(encode(bytes), "-_-_");
    }

    #[test]
    fn test_decode_lengths() {
        for len in 0..10usize {
            let data: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
            assert_eq!(decode(&encode(&data)).unwrap(), data);
        }
    }

    #[test]
    fn test_padded_input_rejected() {
        assert!(decode("YWJjZA==").is_err());
    }
}
