#![expect(missing_docs, clippy::missing_errors_doc, reason = "internal crate")]

use self::combinators::{Map, MapOpt, Or};

pub mod combinators;
pub mod input;
pub mod parsers;

pub trait Cursor {
    type Cursor;

    fn get_cursor(&mut self) -> Self::Cursor;
    fn set_cursor(&mut self, cursor: Self::Cursor);
}

pub trait CursorExt: Cursor {
    #[expect(clippy::result_unit_err, reason = "internal usage")]
    fn transaction<F, T>(&mut self, f: F) -> Result<T, ()>
    where
        F: FnOnce(&mut Self) -> Result<T, ()>,
    {
        let saved_cursor = self.get_cursor();
        let result = f(self);

        if result.is_err() {
            self.set_cursor(saved_cursor);
        }

        result
    }
}

impl<T> CursorExt for T where T: Cursor + ?Sized {}

pub trait Parser<C>
where
    C: ?Sized,
{
    type Output;

    #[expect(clippy::result_unit_err, reason = "internal usage")]
    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()>;
}

impl<C, F, T> Parser<C> for F
where
    C: ?Sized,
    F: FnMut(&mut C) -> Result<T, ()>,
{
    type Output = T;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        self(context)
    }
}

pub trait ParserExt<C>: Parser<C>
where
    C: ?Sized,
{
    fn map<F, T>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Output) -> T,
    {
        combinators::map(self, f)
    }

    fn map_opt<F, T>(self, f: F) -> MapOpt<Self, F>
    where
        Self: Sized,
        F: FnMut(&mut C, Self::Output) -> Option<T>,
    {
        combinators::map_opt(self, f)
    }

    fn or<Q>(self, rhs: Q) -> Or<Self, Q>
    where
        Self: Sized,
        C: Cursor,
        Q: Parser<C, Output = Self::Output>,
    {
        combinators::or(self, rhs)
    }
}

impl<C, P> ParserExt<C> for P
where
    C: ?Sized,
    P: Parser<C>,
{
}
