use std::borrow::Cow;

const USR_PREFIX: &str = "s:";

/// Rewrites an index-store reference name into a mangled symbol.
///
/// Names that start with `s:` are replaced by the text after their last `:`, prefixed with the `$S` marker. Other
/// names are returned unchanged.
///
/// ```rust
/// use swift_demangle_tree::swift::normalize_symbol;
///
/// assert_eq!(normalize_symbol("s:foo.bar:baz"), "$Sbaz");
/// assert_eq!(normalize_symbol("s:4main3FooC"), "$S4main3FooC");
/// assert_eq!(normalize_symbol("$S4main3FooC"), "$S4main3FooC");
/// ```
#[must_use]
pub fn normalize_symbol(symbol: &str) -> Cow<'_, str> {
    if symbol.starts_with(USR_PREFIX) {
        let body = symbol.rsplit(':').next().unwrap_or_default();

        Cow::Owned(format!("$S{body}"))
    } else {
        Cow::Borrowed(symbol)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    #[track_caller]
    fn check(symbol: &str, expected: &str) {
        assert_eq!(super::normalize_symbol(symbol), expected);
    }

    #[test]
    fn test_normalize_symbol() {
        check("s:", "$S");
        check("s:foo.bar:baz", "$Sbaz");
        check(
            "s:10DriverCore28AddPhoneVerifyViewControllerC",
            "$S10DriverCore28AddPhoneVerifyViewControllerC",
        );
        check("s:é:x", "$Sx");
        check("s:a:é", "$Sé");
        check("c:objc(cs)CIVector", "c:objc(cs)CIVector");
        check("", "");
    }

    #[test]
    fn test_passthrough_borrows() {
        assert!(matches!(super::normalize_symbol("$S4mainyyF"), Cow::Borrowed(_)));
        assert!(matches!(super::normalize_symbol("s:4mainyyF"), Cow::Owned(_)));
    }
}
