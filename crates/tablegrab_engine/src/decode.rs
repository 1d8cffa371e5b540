use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

/// Best-effort decode of a response body into UTF-8.
///
/// Tries, in order: a byte-order mark, the Content-Type charset, chardetng
/// detection. Decoding is lossy and never fails; malformed sequences become
/// replacement characters, which the HTML parser handles like any other
/// text.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| {
            content_type
                .and_then(extract_charset)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, actual, _had_errors) = encoding.decode(bytes);
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: actual.name().to_string(),
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::decode_html;

    #[test]
    fn charset_header_is_honoured() {
        let bytes = b"caf\xe9"; // latin-1
        let decoded = decode_html(bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(decoded.html, "caf\u{e9}");
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = b"\xEF\xBB\xBFhello";
        let decoded = decode_html(bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(decoded.html, "hello");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn undeclared_bytes_are_still_decoded() {
        let decoded = decode_html(b"<p>plain ascii</p>", None);
        assert_eq!(decoded.html, "<p>plain ascii</p>");
    }
}
