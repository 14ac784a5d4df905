/// Extension of a filename, including the leading dot.
///
/// Only a dot after the last path separator (`/` or `\`) counts; anything
/// else yields an empty string.
///
/// ```
/// use orderly_rename::extension;
///
/// assert_eq!(extension("photo.final.png"), ".png");
/// assert_eq!(extension("noext"), "");
/// assert_eq!(extension("a/b.c/d"), "");
/// ```
pub fn extension(name: &str) -> &str {
    let basename_start = name.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match name[basename_start..].rfind('.') {
        Some(dot) => &name[basename_start + dot..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.final.png", ".png")]
    #[case("noext", "")]
    #[case("a/b.c/d", "")]
    #[case("a\\b.c\\d.jpeg", ".jpeg")]
    #[case("dir/.hidden", ".hidden")]
    #[case("trailing.", ".")]
    #[case("", "")]
    fn test_extension(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(extension(name), expected);
    }
}
