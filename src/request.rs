//! Query-string and form-body parsing.

use bytes::Bytes;
use futures_util::stream;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use multer::Multipart;

/// Decoded key-value pairs from a query string or form body.
pub type Params = Vec<(String, String)>;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";

/// Decode one query/form component: `+` means space, then percent-decode.
#[inline]
fn decode_component(s: &str) -> String {
    if s.contains('%') || s.contains('+') {
        let plus_decoded = s.replace('+', " ");
        percent_encoding::percent_decode_str(&plus_decoded)
            .decode_utf8_lossy()
            .into_owned()
    } else {
        s.to_string()
    }
}

/// Parse a query string (or urlencoded form body) into key-value pairs.
///
/// Pairs without `=` are kept with an empty value; empty keys are dropped.
pub fn parse_query_string(query: &str) -> Params {
    let pair_count = query.matches('&').count() + 1;
    let mut params = Vec::with_capacity(pair_count.min(16));

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }

        let (key, value) = match pair.find('=') {
            Some(pos) => (&pair[..pos], &pair[pos + 1..]),
            None => (pair, ""),
        };

        if !key.is_empty() {
            params.push((decode_component(key), decode_component(value)));
        }
    }

    params
}

/// Parse a form-encoded request body into key-value pairs.
///
/// Supports `application/x-www-form-urlencoded` and `multipart/form-data`;
/// any other content type yields no pairs. Malformed bodies also yield no
/// pairs rather than failing the request, matching the lenient behavior of
/// common form readers.
pub async fn parse_form_body(headers: &HeaderMap, body: Bytes) -> Params {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with(FORM_URLENCODED) {
        return parse_query_string(&String::from_utf8_lossy(&body));
    }

    if content_type.starts_with(MULTIPART_FORM) {
        return match parse_multipart_fields(content_type, body).await {
            Ok(params) => params,
            Err(e) => {
                tracing::debug!("multipart parse failed: {}", e);
                Vec::new()
            }
        };
    }

    Vec::new()
}

/// Parse multipart form data, collecting text fields only.
///
/// File parts (fields carrying a filename) are skipped; this layer has no
/// upload handling.
async fn parse_multipart_fields(content_type: &str, body: Bytes) -> Result<Params, String> {
    let boundary = content_type
        .split(';')
        .find_map(|part| {
            let trimmed = part.trim();
            // Case-insensitive boundary search
            if trimmed.to_lowercase().starts_with("boundary=") {
                Some(trimmed[9..].trim_matches('"').to_string())
            } else {
                None
            }
        })
        .ok_or("missing boundary in multipart content-type")?;

    let mut multipart = Multipart::new(
        stream::once(async { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut params = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name.is_empty() || field.file_name().is_some() {
            continue;
        }

        let value = field.text().await.map_err(|e| e.to_string())?;
        params.push((field_name, value));
    }

    Ok(params)
}
