//! Request body parsing by content type.

use std::io;

use bytes::Bytes;
use mime::Mime;
use signet_core::{Location, RawBody, RawData, RawValue, UploadedFile};

use crate::multi::{collapse, text_pair};
use crate::ExtractionError;

/// The body formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// `application/json` or any `+json` suffix
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `multipart/form-data`
    Multipart,
    /// Anything else, read as an empty payload
    Unsupported,
}

impl BodyFormat {
    /// Detects the format from a Content-Type header value.
    #[must_use]
    pub fn detect(content_type: Option<&str>) -> Self {
        let Some(parsed) = content_type.and_then(|ct| ct.parse::<Mime>().ok()) else {
            return Self::Unsupported;
        };
        if parsed.type_() == mime::APPLICATION
            && (parsed.subtype() == mime::JSON || parsed.suffix() == Some(mime::JSON))
        {
            Self::Json
        } else if parsed.type_() == mime::APPLICATION && parsed.subtype() == mime::WWW_FORM_URLENCODED
        {
            Self::Form
        } else if parsed.type_() == mime::MULTIPART && parsed.subtype() == mime::FORM_DATA {
            Self::Multipart
        } else {
            Self::Unsupported
        }
    }
}

/// Parses a JSON body. Objects become named fields, other documents are
/// kept whole so validation can reject them.
///
/// # Errors
///
/// Returns a malformed body error for invalid JSON.
pub fn parse_json(body: &[u8]) -> Result<RawBody, ExtractionError> {
    serde_json::from_slice(body)
        .map(RawBody::from_json)
        .map_err(|e| {
            ExtractionError::malformed(Location::Body, format!("Unable to parse JSON data: {e}"))
        })
}

/// Parses a URL-encoded form body.
///
/// # Errors
///
/// Returns a malformed body error if the form cannot be decoded.
pub fn parse_form(body: &[u8]) -> Result<RawBody, ExtractionError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
        ExtractionError::malformed(Location::Body, format!("Unable to parse form data: {e}"))
    })?;
    Ok(RawBody::Object(collapse(pairs.into_iter().map(text_pair))))
}

/// Parses a `multipart/form-data` body. Parts with a filename become
/// uploaded files, the rest become text values.
///
/// # Errors
///
/// Returns an error if the boundary is missing, the stream is invalid, or
/// the part count exceeds `max_fields`.
pub async fn parse_multipart(
    content_type: &str,
    body: Bytes,
    max_fields: usize,
) -> Result<RawBody, ExtractionError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ExtractionError::invalid_content_type(format!("invalid multipart boundary: {e}")))?;

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts: Vec<(String, RawValue)> = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if parts.len() >= max_fields {
            return Err(ExtractionError::malformed(
                Location::Body,
                format!("too many multipart fields (max {max_fields})"),
            ));
        }

        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(ToOwned::to_owned);
        let content_type = field.content_type().map(ToString::to_string);

        let value = if file_name.is_some() {
            let data = field.bytes().await.map_err(multipart_error)?;
            RawValue::File(UploadedFile::new(name.clone(), file_name, content_type, data))
        } else {
            RawValue::text(field.text().await.map_err(multipart_error)?)
        };
        parts.push((name, value));
    }

    Ok(RawBody::Object(collapse(parts)))
}

fn multipart_error(err: multer::Error) -> ExtractionError {
    ExtractionError::malformed(Location::Body, format!("Unable to parse multipart data: {err}"))
}

/// Parses a body according to its content type. An empty body reads as an
/// empty object.
///
/// # Errors
///
/// Returns the parser's error for an undecodable payload.
pub async fn parse_body(
    content_type: Option<&str>,
    body: &Bytes,
    max_fields: usize,
) -> Result<RawBody, ExtractionError> {
    if body.is_empty() {
        return Ok(RawBody::Object(RawData::new()));
    }
    match BodyFormat::detect(content_type) {
        BodyFormat::Json => parse_json(body),
        BodyFormat::Form => parse_form(body),
        BodyFormat::Multipart => {
            parse_multipart(content_type.unwrap_or_default(), body.clone(), max_fields).await
        }
        BodyFormat::Unsupported => {
            tracing::debug!(content_type = ?content_type, "ignoring body with unsupported content type");
            Ok(RawBody::Object(RawData::new()))
        }
    }
}
