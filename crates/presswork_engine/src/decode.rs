use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedXml {
    pub xml: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode export with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode a raw export file into UTF-8 using: BOM -> XML declaration
/// charset -> chardetng fallback.
pub fn decode_export(bytes: &[u8]) -> Result<DecodedXml, DecodeError> {
    // 1) BOM aware decode using encoding_rs helper
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // 2) charset named by the XML declaration
    if let Some(label) = extract_declared_charset(bytes) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    // 3) chardetng detection over the whole document
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

/// Pull the `encoding="..."` label out of a leading `<?xml ...?>`
/// declaration, if there is one. Only the first kilobyte is inspected;
/// the declaration itself is ASCII-compatible in every encoding we accept.
fn extract_declared_charset(bytes: &[u8]) -> Option<String> {
    let head_len = bytes.len().min(1024);
    let head = String::from_utf8_lossy(&bytes[..head_len]);
    let declaration_end = head.find("?>")?;
    let declaration = &head[..declaration_end];
    if !declaration.trim_start().starts_with("<?xml") {
        return None;
    }
    let after_key = declaration.split("encoding=").nth(1)?;
    let mut chars = after_key.chars();
    let quote = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let label: String = chars.take_while(|c| *c != quote).collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedXml, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "decoding error".into(),
        });
    }
    Ok(DecodedXml {
        xml: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_export, extract_declared_charset};

    #[test]
    fn declared_charset_is_honoured() {
        let bytes = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><rss>caf\xe9</rss>";
        let decoded = decode_export(bytes).unwrap();
        assert!(decoded.xml.contains("caf\u{e9}"));
    }

    #[test]
    fn utf8_bom_wins_over_declaration() {
        let bytes = b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><rss/>";
        let decoded = decode_export(bytes).unwrap();
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn missing_declaration_yields_none() {
        assert_eq!(extract_declared_charset(b"<rss><channel/></rss>"), None);
    }
}
