//! JSON message codec.
//!
//! Messages are compact JSON objects with a stable field order. Non-ASCII
//! text is written as raw UTF-8, and control characters (including NUL) are
//! always escaped, so an encoded document never contains the frame
//! terminator.

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use spiceapi_frame::encode_frame;

use crate::error::{ClientError, Result};

/// Serialize a message to its JSON payload, without the terminator.
pub fn to_payload<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(Into::into)
}

/// Serialize a message to its full wire form: JSON followed by one zero byte.
pub fn encode<T: Serialize>(message: &T) -> Result<BytesMut> {
    let payload = to_payload(message)?;
    let mut dst = BytesMut::with_capacity(payload.len() + 1);
    encode_frame(&payload, &mut dst)?;
    Ok(dst)
}

/// Parse a message from the bytes before its terminator.
///
/// Fails with [`ClientError::MalformedMessage`] when the bytes are not
/// UTF-8, not a JSON document, or miss a required field.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(payload)
        .map_err(|err| ClientError::MalformedMessage(format!("invalid utf-8: {err}")))?;
    serde_json::from_str(text).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Probe {
        id: u64,
        text: String,
    }

    #[test]
    fn encode_is_compact_and_terminated() {
        let probe = Probe {
            id: 3,
            text: "a b".into(),
        };
        let wire = encode(&probe).unwrap();
        assert_eq!(wire.as_ref(), b"{\"id\":3,\"text\":\"a b\"}\0");
    }

    #[test]
    fn nul_in_text_is_escaped() {
        let probe = Probe {
            id: 1,
            text: "a\0b".into(),
        };
        let wire = encode(&probe).unwrap();
        assert_eq!(wire.iter().filter(|&&b| b == 0).count(), 1);
        assert_eq!(wire.last(), Some(&0));

        let back: Probe = decode(&wire[..wire.len() - 1]).unwrap();
        assert_eq!(back, probe);
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let probe = Probe {
            id: 1,
            text: "ビートマニア".into(),
        };
        let payload = to_payload(&probe).unwrap();
        let text = String::from_utf8(payload).unwrap();
        assert!(text.contains("ビートマニア"));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode::<Probe>(&[0x7B, 0xFF, 0x7D]).unwrap_err();
        assert!(matches!(err, ClientError::MalformedMessage(msg) if msg.contains("utf-8")));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let err = decode::<Probe>(b"{\"id\":").unwrap_err();
        assert!(matches!(err, ClientError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_missing_field() {
        let err = decode::<Probe>(b"{\"id\":1}").unwrap_err();
        assert!(matches!(err, ClientError::MalformedMessage(msg) if msg.contains("text")));
    }
}
