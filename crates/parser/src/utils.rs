//! Utility macros and helpers shared by the parser sub-machines.

/// Returns early with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(digits < 3, ParseError::BadStatus);
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

pub(crate) const SPACE: u8 = b' ';
pub(crate) const TAB: u8 = b'\t';
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const COLON: u8 = b':';
pub(crate) const SEMI_COLON: u8 = b';';

/// Returns true for bytes that may start or continue a token on the start line.
///
/// Bytes above 0x7f are accepted so that ISO-8859-1 input is never rejected here.
#[inline]
pub(crate) fn is_token_byte(ch: u8) -> bool {
    ch > SPACE
}

/// Returns true for control bytes, which end a start-line token.
#[inline]
pub(crate) fn is_control(ch: u8) -> bool {
    ch < SPACE
}

/// Maps bytes to chars one for one (ISO-8859-1), the way header text is accumulated.
#[inline]
pub(crate) fn push_latin1(string: &mut String, ch: u8) {
    string.push(char::from(ch));
}
