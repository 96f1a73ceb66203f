//! Conversion between argument vectors and single-line command strings.
//!
//! Nothing here ever reaches a shell. [`split`] turns a caller-supplied
//! command line into tokens with POSIX quoting rules; `;`, `|` and `&`
//! stay plain characters. [`join`] renders tokens for display so that
//! `split(join(x))` gives back `x`.

use std::borrow::Cow;

/// Quote a single token for display.
pub fn quote(token: &str) -> Cow<'_, str> {
    // Only a NUL byte is unquotable, and no process argument can carry one.
    shlex::try_quote(token).unwrap_or_else(|_| Cow::Owned(format!("{token:?}")))
}

/// Render a program and its arguments as one display string.
pub fn join<'a>(program: &str, args: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = quote(program).into_owned();
    for arg in args {
        out.push(' ');
        out.push_str(&quote(arg));
    }
    out
}

/// Split a command line into tokens.
///
/// # Errors
///
/// Returns `InvalidParameterValue` for `command` when a quote is left
/// open or the line ends in a lone backslash.
pub fn split(line: &str) -> cf_core::Result<Vec<String>> {
    shlex::split(line).ok_or_else(|| {
        cf_core::Error::invalid("command", "unbalanced quotes or trailing backslash")
    })
}
