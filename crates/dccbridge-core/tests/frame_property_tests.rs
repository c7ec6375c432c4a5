//! Property-based tests for the frame forwarding and broadcast filters
//!
//! These tests verify the two filtering invariants of the bridge over
//! arbitrary inputs: client frames reach the serial path iff they start with
//! the command marker, and serial lines are broadcast iff they still carry
//! more than one character after terminator stripping.

use dccbridge_core::{
    frame::{is_broadcastable, preview, strip_line_terminator},
    ClientId, Frame, COMMAND_START_MARKER, DISPLAY_PREVIEW_CHARS,
};
use proptest::prelude::*;

/// Generate arbitrary frame text, biased toward the interesting prefixes
fn arb_frame_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex(".*").unwrap(),
        prop::string::string_regex(r"<[a-zA-Z0-9 ]{0,40}>").unwrap(),
        prop::string::string_regex(r"[a-zA-Z0-9 ]{0,40}").unwrap(),
    ]
}

/// Generate arbitrary serial lines with assorted terminators
fn arb_serial_line() -> impl Strategy<Value = String> {
    (".*", prop_oneof![Just(""), Just("\n"), Just("\r"), Just("\r\n")])
        .prop_map(|(body, term)| format!("{}{}", body, term))
}

proptest! {
    /// Property: a client frame is forwardable iff its first byte is `<`
    #[test]
    fn forwardable_iff_start_marker(text in arb_frame_text()) {
        let frame = Frame::client(ClientId::new(1), text.clone());
        let starts_with_marker = text.as_bytes().first() == Some(&COMMAND_START_MARKER);
        prop_assert_eq!(frame.is_forwardable(), starts_with_marker);
    }

    /// Property: serial-originated frames never qualify for forwarding
    #[test]
    fn serial_origin_never_forwardable(text in arb_frame_text()) {
        prop_assert!(!Frame::serial(text).is_forwardable());
    }

    /// Property: stripping removes at most one CR+LF pair, from the end only
    #[test]
    fn stripping_is_bounded_and_prefix_preserving(line in arb_serial_line()) {
        let stripped = strip_line_terminator(&line);
        prop_assert!(line.starts_with(stripped));
        prop_assert!(line.len() - stripped.len() <= 2);
        prop_assert!(!stripped.ends_with('\n'));
    }

    /// Property: a stripped line broadcasts iff it is longer than one byte
    #[test]
    fn broadcast_iff_nontrivial(line in arb_serial_line()) {
        let stripped = strip_line_terminator(&line);
        prop_assert_eq!(is_broadcastable(stripped), stripped.len() > 1);
    }

    /// Property: previews are bounded and are exact prefixes of the payload
    #[test]
    fn preview_bounded_prefix(text in ".*") {
        let p = preview(&text);
        prop_assert!(p.chars().count() <= DISPLAY_PREVIEW_CHARS);
        prop_assert!(text.starts_with(p));
        // Short payloads pass through untouched.
        if text.chars().count() <= DISPLAY_PREVIEW_CHARS {
            prop_assert_eq!(p, text.as_str());
        }
    }
}
