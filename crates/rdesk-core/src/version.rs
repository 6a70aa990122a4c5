//! The 4-octet protocol version tag exchanged once immediately after the
//! DTLS handshake completes (spec.md §3, §9 Open Questions). The tag itself
//! is just a byte comparison; who sends first and the timeout are a
//! session-layer concern (resolved in SPEC_FULL.md: host sends first).

/// `C S 0 1` in ASCII.
pub const PROTOCOL_VERSION_TAG: [u8; 4] = *b"CS01";

/// Compare a received tag against [`PROTOCOL_VERSION_TAG`].
pub fn check_tag(received: &[u8]) -> bool {
    received == PROTOCOL_VERSION_TAG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_tag() {
        assert!(check_tag(b"CS01"));
    }

    #[test]
    fn mismatched_tag() {
        assert!(!check_tag(b"CS02"));
        assert!(!check_tag(b"CS0"));
        assert!(!check_tag(b""));
    }
}
