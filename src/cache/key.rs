//! Cache key helpers.

use std::fmt::{Display, Write};

/// Separator placed between key segments.
pub const KEY_DELIMITER: char = ':';

/// Builds a cache key from a prefix and optional parts.
///
/// `None` parts are skipped entirely, so
/// `generate_key("p", [Some("a"), None, Some("c")])` is `"p:a:c"`, the same
/// as `generate_key("p", [Some("a"), Some("c")])`.
pub fn generate_key<I, P>(prefix: &str, parts: I) -> String
where
    I: IntoIterator<Item = Option<P>>,
    P: Display,
{
    let mut key = String::from(prefix);
    for part in parts.into_iter().flatten() {
        key.push(KEY_DELIMITER);
        // writing into a String cannot fail
        let _ = write!(key, "{part}");
    }
    key
}
