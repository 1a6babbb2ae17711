use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not valid {encoding} text")]
    Malformed { encoding: String },
}

/// Decodes file bytes as text: BOM, then the Content-Type charset, then plain UTF-8, then detection.
pub fn decode_text(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedText, DecodeError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_with(&bytes[bom_len..], encoding);
    }

    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_string(),
            encoding_label: UTF_8.name().to_string(),
        });
    }

    // Spool output is plain text, so a NUL byte means binary content.
    if bytes.contains(&0) {
        return Err(DecodeError::Malformed {
            encoding: UTF_8.name().to_string(),
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        Some(value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> Result<DecodedText, DecodeError> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_stripped() {
        let decoded = decode_text(b"\xEF\xBB\xBFJOB00042 ENDED", None).unwrap();
        assert_eq!(decoded.text, "JOB00042 ENDED");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn header_charset_wins_over_detection() {
        let decoded = decode_text(b"caf\xE9", Some("text/plain; Charset=\"ISO-8859-1\"")).unwrap();
        assert_eq!(decoded.text, "café");
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn valid_utf8_needs_no_detection() {
        let decoded = decode_text("día 1".as_bytes(), Some("text/plain")).unwrap();
        assert_eq!(decoded.text, "día 1");
    }

    #[test]
    fn binary_content_is_rejected() {
        let err = decode_text(&[0x01, 0x00, 0xC3, 0x28, 0x00], None).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Malformed {
                encoding: "UTF-8".into()
            }
        );
    }

    #[test]
    fn charset_param_parses_loosely() {
        assert_eq!(charset_param("text/plain; charset=utf-8").as_deref(), Some("utf-8"));
        assert_eq!(charset_param("text/plain;CHARSET='latin1'").as_deref(), Some("latin1"));
        assert_eq!(charset_param("text/plain"), None);
    }
}
