// * Device identity derivation.
// * The remote accepts any device id that looks like a browser-generated v4
// * UUID, paired with a token the site's own JS derives from it:
// *   1. 16 random bytes, version nibble forced to 4, variant bits to 10
// *   2. lowercase hex grouped 8-4-4-4-12 (hyphens before bytes 4, 6, 8, 10)
// *   3. token = base64(`{"id":"<id>"}`) + "." + hex(HMAC-SHA1(base64, "device"))

use crate::config::constants::DEVICE_TOKEN_KEY;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

// * Generates a fresh device id from thread-local randomness.
pub fn generate_device_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    device_id_from_bytes(bytes)
}

// * Forces the UUID-v4 version/variant bits and renders the canonical
// * 36-character form. Split out so the bit surgery is testable with fixed input.
pub fn device_id_from_bytes(mut bytes: [u8; 16]) -> String {
    bytes[6] = bytes[6] & 0x0f | 0x40;
    bytes[8] = bytes[8] & 0x3f | 0x80;

    let mut id = String::with_capacity(36);
    for (index, byte) in bytes.iter().enumerate() {
        if matches!(index, 4 | 6 | 8 | 10) {
            id.push('-');
        }
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

// * Deterministic for a fixed id; all randomness lives in the id itself.
pub fn derive_device_token(device_id: &str) -> String {
    let payload = serde_json::json!({ "id": device_id }).to_string();
    let encoded = STANDARD.encode(payload.as_bytes());

    let mut mac = HmacSha1::new_from_slice(DEVICE_TOKEN_KEY)
        .expect("! CRITICAL: HMAC accepts keys of any length");
    mac.update(encoded.as_bytes());
    let digest = mac.finalize().into_bytes();

    format!("{}.{}", encoded, hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_surgery_is_applied() {
        assert_eq!(
            device_id_from_bytes([0x00; 16]),
            "00000000-0000-4000-8000-000000000000"
        );
        assert_eq!(
            device_id_from_bytes([0xff; 16]),
            "ffffffff-ffff-4fff-bfff-ffffffffffff"
        );
    }

    #[test]
    fn hyphens_land_on_byte_boundaries_4_6_8_10() {
        let id = device_id_from_bytes([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ]);
        assert_eq!(id, "00112233-4455-4677-8899-aabbccddeeff");
    }

    #[test]
    fn token_has_base64_and_sha1_hex_parts() {
        let token = derive_device_token("550e8400-e29b-41d4-a716-446655440000");
        let (encoded, digest) = token.split_once('.').expect("dot separator");

        let decoded = STANDARD.decode(encoded).expect("valid base64");
        assert_eq!(
            decoded,
            br#"{"id":"550e8400-e29b-41d4-a716-446655440000"}"#.to_vec()
        );

        // * SHA1 digests are 20 bytes, 40 hex characters
        assert_eq!(digest.len(), 40);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
