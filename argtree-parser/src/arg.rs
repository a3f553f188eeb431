use core::{fmt, mem, str};

/**
One raw command line argument, or a piece of one.

Given `--jobs 4 --out=bin -v build`, the parser hands out `jobs`, `4`,
`out`, `bin` and `build` as [`Arg`] values; short flags are handed out as
single bytes instead. The operating system gives us bytes, not text, so an
[`Arg`] is a byte slice. It displays lossily, with U+FFFD standing in for
anything that isn't UTF-8.
*/
#[derive(Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Arg([u8]);

impl Arg {
    pub const fn new(bytes: &[u8]) -> &Self {
        // SAFETY: Arg is repr transparent to a byte slice
        unsafe { mem::transmute(bytes) }
    }

    pub const fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// The argument as a string, if it's valid UTF-8
    pub fn to_str(&self) -> Option<&str> {
        str::from_utf8(&self.0).ok()
    }

    /// Split `name=value` at the first `=`
    pub fn split_value(&self) -> Option<(&Arg, &Arg)> {
        memchr::memchr(b'=', &self.0)
            .map(|index| (Arg::new(&self.0[..index]), Arg::new(&self.0[index + 1..])))
    }
}

impl AsRef<[u8]> for Arg {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for Arg {
    fn eq(&self, other: &str) -> bool {
        self.0 == *other.as_bytes()
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.utf8_chunks().try_for_each(|chunk| {
            f.write_str(chunk.valid())?;

            match chunk.invalid().is_empty() {
                true => Ok(()),
                false => f.write_str("\u{FFFD}"),
            }
        })
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(s) => write!(f, "{s:?}"),
            None => write!(f, "{:?}", &self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn split_value_at_first_equals() {
        let (name, value) = Arg::new(b"define=a=b").split_value().unwrap();

        assert_eq!(name, "define");
        assert_eq!(value, "a=b");
        assert!(Arg::new(b"verbose").split_value().is_none());
    }

    #[test]
    fn display_replaces_invalid_bytes() {
        assert_eq!(Arg::new(b"caf\xc3\xa9").to_string(), "café");
        assert_eq!(Arg::new(b"a\xffb").to_string(), "a\u{FFFD}b");
    }
}
