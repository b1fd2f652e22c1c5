/// Byte-oriented input that parsers consume from the front.
pub trait Input {
    type Slice;

    fn peek(&self) -> Option<u8>;

    /// Number of leading bytes accepted by `f`.
    fn prefix_length<F>(&self, f: F) -> usize
    where
        F: FnMut(u8) -> bool;

    /// Consumes `length` bytes. Returns `None` without consuming anything if the input is too short or `length` does
    /// not end on a character boundary.
    fn take(&mut self, length: usize) -> Option<Self::Slice>;
}
