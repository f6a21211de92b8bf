//! Length-prefixed wire framing for the TCP publisher variant, plus the
//! envelope DTO carried by both the TCP and HTTP publisher variants.

use facet::Facet;
use probe_types::Report;

/// Frames larger than this are rejected rather than allocated — guards
/// against a malformed or hostile peer driving unbounded memory use.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024 * 1024;

/// Content-type header value for the HTTP publisher variant's POST body.
pub const REPORT_CONTENT_TYPE: &str = "application/vnd.probe.report+json";

#[derive(Debug)]
pub enum WireError {
    Encode(String),
    Decode(String),
    FrameTooLarge { len: usize, max: usize },
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::Encode(e) => write!(f, "encode error: {e}"),
            WireError::Decode(e) => write!(f, "decode error: {e}"),
            WireError::FrameTooLarge { len, max } => {
                write!(f, "frame too large: {len} bytes (max {max})")
            }
        }
    }
}

impl std::error::Error for WireError {}

/// What actually crosses the wire: the report plus the scope that produced
/// it, so a collector receiving reports from many probes can tell them
/// apart without re-deriving it from node ids.
#[derive(Facet, Clone, Debug, PartialEq, Eq)]
pub struct ReportEnvelope {
    pub scope: String,
    pub report: Report,
}

/// Encode a payload as a 4-byte big-endian length prefix followed by its
/// JSON bytes. Used by the TCP publisher; the HTTP publisher variant instead
/// sends the JSON bytes directly as a request body (HTTP already delimits
/// the body, so no framing is needed there).
pub fn encode_frame(envelope: &ReportEnvelope) -> Result<Vec<u8>, WireError> {
    let payload = facet_json::to_vec(envelope).map_err(|e| WireError::Encode(e.to_string()))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| WireError::Encode(format!("payload too large: {} bytes", payload.len())))?;
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode a length-prefixed frame previously produced by [`encode_frame`].
/// `frame` must contain exactly one frame (the 4-byte length prefix plus its
/// payload) — callers reading from a stream split frames off first.
pub fn decode_frame(frame: &[u8]) -> Result<ReportEnvelope, WireError> {
    if frame.len() < 4 {
        return Err(WireError::Decode("frame shorter than length prefix".into()));
    }
    let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    if len > DEFAULT_MAX_FRAME_BYTES {
        return Err(WireError::FrameTooLarge {
            len,
            max: DEFAULT_MAX_FRAME_BYTES,
        });
    }
    let payload = frame.get(4..4 + len).ok_or_else(|| {
        WireError::Decode(format!(
            "frame payload shorter than declared length {len}"
        ))
    })?;
    facet_json::from_slice(payload).map_err(|e| WireError::Decode(e.to_string()))
}

/// Read just the length prefix, for callers that read payload bytes
/// themselves off an async stream rather than handing us the whole frame.
pub fn decode_frame_len(len_prefix: [u8; 4]) -> Result<usize, WireError> {
    let len = u32::from_be_bytes(len_prefix) as usize;
    if len > DEFAULT_MAX_FRAME_BYTES {
        return Err(WireError::FrameTooLarge {
            len,
            max: DEFAULT_MAX_FRAME_BYTES,
        });
    }
    Ok(len)
}

/// Encode the JSON payload alone, without the length prefix. Used by the
/// HTTP publisher variant.
pub fn encode_payload(envelope: &ReportEnvelope) -> Result<Vec<u8>, WireError> {
    facet_json::to_vec(envelope).map_err(|e| WireError::Encode(e.to_string()))
}

pub fn decode_payload(bytes: &[u8]) -> Result<ReportEnvelope, WireError> {
    facet_json::from_slice(bytes).map_err(|e| WireError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_types::{Node, NodeId, Report};

    fn sample_envelope() -> ReportEnvelope {
        let mut report = Report::new();
        report.host.add_node(NodeId::raw("host-a"), Node::new());
        ReportEnvelope {
            scope: "probe-a".into(),
            report,
        }
    }

    #[test]
    fn frame_round_trips() {
        let envelope = sample_envelope();
        let frame = encode_frame(&envelope).expect("encode");
        let decoded = decode_frame(&frame).expect("decode");
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn frame_prefix_matches_payload_len() {
        let envelope = sample_envelope();
        let frame = encode_frame(&envelope).expect("encode");
        let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert_eq!(len, frame.len() - 4);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&((DEFAULT_MAX_FRAME_BYTES + 1) as u32).to_be_bytes());
        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(err, WireError::FrameTooLarge { .. }));
    }

    #[test]
    fn payload_round_trips_without_framing() {
        let envelope = sample_envelope();
        let bytes = encode_payload(&envelope).expect("encode");
        let decoded = decode_payload(&bytes).expect("decode");
        assert_eq!(decoded, envelope);
    }
}
