//! Provider payment signatures: hex(HMAC-SHA256(secret, "order_id|payment_id")).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature; payment verification failed")]
    Mismatch,

    #[error("signing secret is not configured")]
    MissingSecret,
}

fn mac_for(secret: &[u8], order_id: &str, payment_id: &str) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::MissingSecret);
    }
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::MissingSecret)?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Ok(mac)
}

/// Compute the lowercase hex signature the provider would send.
pub fn sign(secret: &[u8], order_id: &str, payment_id: &str) -> Result<String, SignatureError> {
    let mac = mac_for(secret, order_id, payment_id)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a supplied signature in constant time.
///
/// Anything that is not valid hex of the right length is a mismatch.
pub fn verify(
    secret: &[u8],
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> Result<(), SignatureError> {
    let mac = mac_for(secret, order_id, payment_id)?;
    let supplied = hex::decode(signature.trim()).map_err(|_| SignatureError::Mismatch)?;
    mac.verify_slice(&supplied).map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &[u8] = b"rzp_test_secret";

    #[test]
    fn signed_payload_verifies() {
        let sig = sign(b"key", "order_1", "pay_1").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(verify(b"key", "order_1", "pay_1", &sig).is_ok());
    }

    #[test]
    fn separator_is_part_of_the_message() {
        let a = sign(SECRET, "order_1", "2pay").unwrap();
        let b = sign(SECRET, "order_12", "pay").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn non_hex_and_wrong_length_are_mismatches() {
        assert_eq!(verify(SECRET, "o", "p", "zzzz"), Err(SignatureError::Mismatch));
        assert_eq!(verify(SECRET, "o", "p", "abcd"), Err(SignatureError::Mismatch));
        assert_eq!(verify(SECRET, "o", "p", ""), Err(SignatureError::Mismatch));
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert_eq!(sign(b"", "o", "p"), Err(SignatureError::MissingSecret));
    }

    proptest! {
        /// Property: flipping any bit of a valid signature makes it fail.
        #[test]
        fn tampered_signature_never_verifies(
            order in "[a-zA-Z0-9_]{1,24}",
            payment in "[a-zA-Z0-9_]{1,24}",
            byte in 0usize..32,
            bit in 0u8..8,
        ) {
            let good = sign(SECRET, &order, &payment).unwrap();
            let mut raw = hex::decode(&good).unwrap();
            raw[byte] ^= 1 << bit;
            let tampered = hex::encode(raw);
            prop_assert_eq!(verify(SECRET, &order, &payment, &tampered), Err(SignatureError::Mismatch));
            prop_assert!(verify(SECRET, &order, &payment, &good).is_ok());
        }

        /// Property: a signature for one order never verifies another.
        #[test]
        fn signature_is_bound_to_its_order(a in "[a-z0-9]{4,16}", b in "[a-z0-9]{4,16}") {
            prop_assume!(a != b);
            let sig = sign(SECRET, &a, "pay_1").unwrap();
            prop_assert_eq!(verify(SECRET, &b, "pay_1", &sig), Err(SignatureError::Mismatch));
        }
    }
}
