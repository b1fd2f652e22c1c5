use crate::input::Input;
use crate::Parser;
use std::marker::PhantomData;

pub struct Tag<C>
where
    C: ?Sized,
{
    byte: u8,
    _phantom: PhantomData<fn(&mut C)>,
}

impl<C> Parser<C> for Tag<C>
where
    C: Input + ?Sized,
{
    type Output = ();

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        if context.peek() == Some(self.byte) {
            context.take(1).map(|_| ()).ok_or(())
        } else {
            Err(())
        }
    }
}

pub const fn tag<C>(byte: u8) -> Tag<C>
where
    C: ?Sized,
{
    Tag {
        byte,
        _phantom: PhantomData,
    }
}

pub struct Take<C>
where
    C: ?Sized,
{
    length: usize,
    _phantom: PhantomData<fn(&mut C)>,
}

impl<C> Parser<C> for Take<C>
where
    C: Input + ?Sized,
{
    type Output = C::Slice;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        context.take(self.length).ok_or(())
    }
}

pub const fn take<C>(length: usize) -> Take<C>
where
    C: ?Sized,
{
    Take {
        length,
        _phantom: PhantomData,
    }
}

pub struct TakeWhile1<C, F>
where
    C: ?Sized,
{
    f: F,
    _phantom: PhantomData<fn(&mut C)>,
}

impl<C, F> Parser<C> for TakeWhile1<C, F>
where
    C: Input + ?Sized,
    F: FnMut(u8) -> bool,
{
    type Output = C::Slice;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        match context.prefix_length(&mut self.f) {
            0 => Err(()),
            length => context.take(length).ok_or(()),
        }
    }
}

pub const fn take_while1<C, F>(f: F) -> TakeWhile1<C, F>
where
    C: ?Sized,
    F: FnMut(u8) -> bool,
{
    TakeWhile1 {
        f,
        _phantom: PhantomData,
    }
}

pub fn any_byte<C>(context: &mut C) -> Result<u8, ()>
where
    C: Input + ?Sized,
{
    let byte = context.peek().ok_or(())?;

    context.take(1).map(|_| byte).ok_or(())
}

pub fn digit1<C>(context: &mut C) -> Result<C::Slice, ()>
where
    C: Input + ?Sized,
{
    take_while1(|c: u8| c.is_ascii_digit()).parse(context)
}

#[cfg(test)]
mod tests {
    use super::{any_byte, digit1, tag, take, take_while1};
    use crate::combinators::terminated;
    use crate::input::Input;
    use crate::{Cursor, Parser, ParserExt};

    struct Text<'a> {
        data: &'a str,
        position: usize,
    }

    impl<'a> Text<'a> {
        fn new(data: &'a str) -> Self {
            Self { data, position: 0 }
        }

        fn rest(&self) -> &'a str {
            &self.data[self.position..]
        }
    }

    impl Cursor for Text<'_> {
        type Cursor = usize;

        fn get_cursor(&mut self) -> Self::Cursor {
            self.position
        }

        fn set_cursor(&mut self, cursor: Self::Cursor) {
            self.position = cursor;
        }
    }

    impl<'a> Input for Text<'a> {
        type Slice = &'a str;

        fn peek(&self) -> Option<u8> {
            self.data.as_bytes().get(self.position).copied()
        }

        fn prefix_length<F>(&self, mut f: F) -> usize
        where
            F: FnMut(u8) -> bool,
        {
            self.rest().bytes().take_while(|&c| f(c)).count()
        }

        fn take(&mut self, length: usize) -> Option<Self::Slice> {
            let end = self.position.checked_add(length)?;
            let slice = self.data.get(self.position..end)?;

            self.position = end;

            Some(slice)
        }
    }

    #[test]
    fn test_tag() {
        let mut text = Text::new("ab");

        assert_eq!(tag(b'b').parse(&mut text), Err(()));
        assert_eq!(tag(b'a').parse(&mut text), Ok(()));
        assert_eq!(text.rest(), "b");
    }

    #[test]
    fn test_take() {
        let mut text = Text::new("abc");

        assert_eq!(take(4).parse(&mut text), Err(()));
        assert_eq!(take(2).parse(&mut text), Ok("ab"));
        assert_eq!(text.rest(), "c");

        let mut text = Text::new("é");

        assert_eq!(take(1).parse(&mut text), Err(()));
        assert_eq!(text.rest(), "é");
    }

    #[test]
    fn test_take_while1_and_digit1() {
        let mut text = Text::new("123abc");

        assert_eq!(take_while1(|c: u8| c.is_ascii_alphabetic()).parse(&mut text), Err(()));
        assert_eq!(digit1.parse(&mut text), Ok("123"));
        assert_eq!(digit1.parse(&mut text), Err(()));
        assert_eq!(any_byte.parse(&mut text), Ok(b'a'));
        assert_eq!(text.rest(), "bc");
    }

    #[test]
    fn test_or_restores_cursor() {
        let mut text = Text::new("12x");

        let mut parser = terminated(digit1, tag(b'_')).map(str::len).or(digit1.map(|digits: &str| digits.len() * 10));

        assert_eq!(parser.parse(&mut text), Ok(20));
        assert_eq!(text.rest(), "x");

        let mut parser = tag(b'_').map(|()| 0).or(digit1.map(str::len));

        assert_eq!(parser.parse(&mut text), Err(()));
        assert_eq!(text.rest(), "x");
    }
}
