/// Errors from splitting a framed object back into tag and payload.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The space after the tag or the NUL after the length is absent.
    #[error("missing {0} separator in object header")]
    MissingSeparator(&'static str),

    /// The kind tag is not ASCII text.
    #[error("object tag is not valid text")]
    InvalidTag,

    /// The length field is not a decimal integer.
    #[error("invalid length field: {0:?}")]
    InvalidLength(String),

    /// The declared length disagrees with the bytes that follow the header.
    #[error("declared length {declared} but payload is {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },
}

/// The header that precedes a payload: `"<kind> <len>\0"`.
pub fn frame_header(kind: &str, payload_len: usize) -> Vec<u8> {
    format!("{kind} {payload_len}\0").into_bytes()
}

/// Frame a payload: `"<kind> <len(payload)>\0" + payload`.
pub fn frame(kind: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = frame_header(kind, payload.len());
    out.reserve_exact(payload.len());
    out.extend_from_slice(payload);
    out
}

/// Split framed bytes into the kind tag and the payload.
///
/// The declared length must match the payload exactly; trailing or missing
/// bytes mean the object is corrupt.
pub fn parse_frame(framed: &[u8]) -> Result<(&str, &[u8]), FrameError> {
    let space = framed
        .iter()
        .position(|&b| b == b' ')
        .ok_or(FrameError::MissingSeparator("space"))?;
    let nul = framed[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| space + 1 + p)
        .ok_or(FrameError::MissingSeparator("NUL"))?;

    let tag = std::str::from_utf8(&framed[..space]).map_err(|_| FrameError::InvalidTag)?;
    if tag.is_empty() || !tag.is_ascii() {
        return Err(FrameError::InvalidTag);
    }

    let len_field = &framed[space + 1..nul];
    if len_field.is_empty() || !len_field.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::InvalidLength(
            String::from_utf8_lossy(len_field).into_owned(),
        ));
    }
    // Digits only, so this is valid UTF-8.
    let len_text = std::str::from_utf8(len_field).map_err(|_| FrameError::InvalidTag)?;
    let declared: usize = len_text
        .parse()
        .map_err(|_| FrameError::InvalidLength(len_text.to_string()))?;

    let payload = &framed[nul + 1..];
    if payload.len() != declared {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    Ok((tag, payload))
}
