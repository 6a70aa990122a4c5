use thiserror::Error;

/// Errors returned by the codec (C1) and identifier (C2).
///
/// Neither variant is fatal to a session — callers drop the datagram and
/// move on (see the error philosophy in the crate's top-level docs).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("packet too short: expected at least {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("truncated variable-length packet: header declares {declared} payload bytes, buffer has {available}")]
    Truncated { declared: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_display() {
        let e = CodecError::TooShort { expected: 16, got: 5 };
        let msg = e.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn truncated_display() {
        let e = CodecError::Truncated { declared: 100, available: 40 };
        let msg = e.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("40"));
    }
}
