use crate::decode::{decode_text, DecodeError, DecodedText};

/// Files above this size are offered for download instead of being shown inline.
pub const MAX_PREVIEW_BYTES: usize = 200_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Text(DecodedText),
    TooLarge { size: usize },
}

pub fn prepare_preview(bytes: &[u8], content_type: Option<&str>) -> Result<Preview, DecodeError> {
    if bytes.len() > MAX_PREVIEW_BYTES {
        return Ok(Preview::TooLarge { size: bytes.len() });
    }
    decode_text(bytes, content_type).map(Preview::Text)
}

#[cfg(test)]
mod tests {
    use super::{prepare_preview, Preview, MAX_PREVIEW_BYTES};

    #[test]
    fn threshold_size_is_still_shown() {
        let content = "a".repeat(MAX_PREVIEW_BYTES);
        match prepare_preview(content.as_bytes(), None).unwrap() {
            Preview::Text(decoded) => assert_eq!(decoded.text.len(), MAX_PREVIEW_BYTES),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn one_byte_over_is_too_large() {
        let content = vec![b'a'; MAX_PREVIEW_BYTES + 1];
        assert_eq!(
            prepare_preview(&content, None).unwrap(),
            Preview::TooLarge {
                size: MAX_PREVIEW_BYTES + 1
            }
        );
    }

    #[test]
    fn oversized_binary_skips_decoding() {
        let content = vec![0u8; MAX_PREVIEW_BYTES * 2];
        assert!(matches!(
            prepare_preview(&content, None),
            Ok(Preview::TooLarge { .. })
        ));
    }

    #[test]
    fn empty_file_is_empty_text() {
        match prepare_preview(b"", Some("text/plain")).unwrap() {
            Preview::Text(decoded) => assert!(decoded.text.is_empty()),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
