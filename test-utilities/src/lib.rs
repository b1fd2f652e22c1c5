#![expect(missing_docs, reason = "internal crate")]

use std::fmt::{self, Debug, Write};

pub struct BoundedWriter<T> {
    inner: T,
    capacity: usize,
}

impl<T> BoundedWriter<T> {
    pub const fn new(inner: T, capacity: usize) -> Self {
        Self { inner, capacity }
    }

    pub const fn remaining(&self) -> usize {
        self.capacity
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Write for BoundedWriter<T>
where
    T: Write,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.capacity = self.capacity.checked_sub(s.len()).ok_or(fmt::Error)?;

        self.inner.write_str(s)
    }
}

/// Formats `value` with [`Debug`], giving up once the output exceeds `capacity` bytes.
pub fn bounded_debug<T>(value: &T, capacity: usize) -> Option<String>
where
    T: Debug + ?Sized,
{
    let mut writer = BoundedWriter::new(String::new(), capacity);

    write!(writer, "{value:?}").ok()?;

    Some(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::BoundedWriter;
    use std::fmt::Write;

    #[test]
    fn test_bounded_writer() {
        let mut writer = BoundedWriter::new(String::new(), 5);

        assert!(writer.write_str("abc").is_ok());
        assert_eq!(writer.remaining(), 2);
        assert!(writer.write_str("def").is_err());
        assert!(writer.write_str("de").is_ok());
        assert_eq!(writer.into_inner(), "abcde");
    }

    #[test]
    fn test_bounded_debug() {
        assert_eq!(super::bounded_debug("abc", 5).as_deref(), Some(r#""abc""#));
        assert_eq!(super::bounded_debug(&[1, 2, 3], 5), None);
    }
}
