//! Functions supporting common UI behaviour and standards

use std::path::Path;

/// Renders a Path with double quotes. This is the standard
/// for displaying paths in flexfn. It is preferred to the {:?}
/// format because the latter does not quote all paths and escapes
/// backslashes on Windows.
pub fn quoted_path(path: impl AsRef<Path>) -> impl std::fmt::Display {
    format!("\"{}\"", path.as_ref().display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_quoted() {
        assert_eq!("\"stack.toml\"", quoted_path("stack.toml").to_string());
    }
}
