use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves alone; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a profile name for use as a single path segment.
///
/// Callers must refuse `.` and `..` first (`isolator_core::check_profile_name`);
/// URL parsing resolves them as dot segments whether escaped or not.
pub fn encode_path_segment(name: &str) -> String {
    utf8_percent_encode(name, COMPONENT).to_string()
}
