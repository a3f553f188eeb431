/*!
Small helpers shared by the declaration and resolution code: the naming
grammar for path segments and flags, the reserved help markers, and
shell-like splitting of a whole command line.
 */

/// The tokens that trigger help mode when they're the very first argument.
/// None of them can be used as a path segment or an option name.
pub const HELP_MARKERS: [&str; 3] = ["help", "--help", "?"];

#[inline]
#[must_use]
pub fn is_help_marker(token: &str) -> bool {
    HELP_MARKERS.contains(&token)
}

/// `[a-z][a-z0-9-]*`, not ending in a dash, and not a help marker.
#[must_use]
pub fn is_segment_name(text: &str) -> bool {
    let mut chars = text.chars();

    matches!(chars.next(), Some('a'..='z'))
        && chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'))
        && !text.ends_with('-')
        && !is_help_marker(text)
}

/// `--[a-zA-Z][a-zA-Z0-9-]*`, not ending in a dash, and not `--help`.
#[must_use]
pub fn is_long_option_name(text: &str) -> bool {
    let Some(name) = text.strip_prefix("--") else {
        return false;
    };

    let mut chars = name.chars();

    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !name.ends_with('-')
        && !is_help_marker(text)
}

/// A single ASCII letter.
#[inline]
#[must_use]
pub fn is_short_alias(alias: char) -> bool {
    alias.is_ascii_alphabetic()
}

/**
Split a command line into arguments the way a simple shell would: on
whitespace, with `'single'` and `"double"` quotes grouping text (quotes
themselves are dropped) and a backslash escaping the next character outside
single quotes. An unterminated quote runs to the end of the line.

```
use argtree::util::split_line;

assert_eq!(
    split_line(r#"build "my project" --name='a b' x\ y"#),
    ["build", "my project", "--name=a b", "x y"],
);
```
*/
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty argument) from no argument at all
    let mut started = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::None, c) if c.is_whitespace() => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            (Quote::None, '\'') => {
                quote = Quote::Single;
                started = true;
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                started = true;
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::None | Quote::Double, '\\') => {
                started = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => current.push('\\'),
                }
            }
            (_, c) => {
                started = true;
                current.push(c);
            }
        }
    }

    if started {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("build", true)]
    #[case("remote-add", true)]
    #[case("v2", true)]
    #[case("Build", false)]
    #[case("2fast", false)]
    #[case("trailing-", false)]
    #[case("", false)]
    #[case("help", false)]
    #[case("?", false)]
    #[case("has space", false)]
    fn segment_grammar(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_segment_name(text), valid);
    }

    #[rstest]
    #[case("--verbose", true)]
    #[case("--dry-run", true)]
    #[case("--X11", true)]
    #[case("--help", false)]
    #[case("-v", false)]
    #[case("--", false)]
    #[case("--1st", false)]
    #[case("--end-", false)]
    #[case("verbose", false)]
    fn long_option_grammar(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_long_option_name(text), valid);
    }

    #[test]
    fn short_aliases_are_letters() {
        assert!(is_short_alias('v'));
        assert!(is_short_alias('V'));
        assert!(!is_short_alias('?'));
        assert!(!is_short_alias('1'));
    }

    #[rstest]
    #[case("", &[])]
    #[case("  a   b  ", &["a", "b"])]
    #[case(r#"say "hello world""#, &["say", "hello world"])]
    #[case(r#"say 'it''s'"#, &["say", "its"])]
    #[case(r#"empty """#, &["empty", ""])]
    #[case(r#"a\ b"#, &["a b"])]
    #[case(r#"'unterminated quote"#, &["unterminated quote"])]
    fn splitting(#[case] line: &str, #[case] expected: &[&str]) {
        assert_eq!(split_line(line), expected);
    }
}
