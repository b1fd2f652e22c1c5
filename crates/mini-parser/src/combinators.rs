use crate::{Cursor, CursorExt, Parser};

pub struct Map<P, F>
where
    F: ?Sized,
{
    parser: P,
    f: F,
}

impl<C, P, F, T> Parser<C> for Map<P, F>
where
    C: ?Sized,
    P: Parser<C>,
    F: FnMut(P::Output) -> T + ?Sized,
{
    type Output = T;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        self.parser.parse(context).map(|output| (self.f)(output))
    }
}

pub const fn map<P, F>(parser: P, f: F) -> Map<P, F> {
    Map { parser, f }
}

pub struct MapOpt<P, F>
where
    F: ?Sized,
{
    parser: P,
    f: F,
}

impl<C, P, F, U> Parser<C> for MapOpt<P, F>
where
    C: ?Sized,
    P: Parser<C>,
    F: FnMut(&mut C, P::Output) -> Option<U> + ?Sized,
{
    type Output = U;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        let output = self.parser.parse(context)?;

        (self.f)(context, output).ok_or(())
    }
}

pub const fn map_opt<P, F>(parser: P, f: F) -> MapOpt<P, F> {
    MapOpt { parser, f }
}

pub struct Or<P, Q>
where
    Q: ?Sized,
{
    lhs: P,
    rhs: Q,
}

impl<C, P, Q> Parser<C> for Or<P, Q>
where
    C: Cursor + ?Sized,
    P: Parser<C>,
    Q: Parser<C, Output = P::Output> + ?Sized,
{
    type Output = Q::Output;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        context
            .transaction(|context: &mut _| self.lhs.parse(context))
            .or_else(|()| self.rhs.parse(context))
    }
}

pub const fn or<P, Q>(lhs: P, rhs: Q) -> Or<P, Q> {
    Or { lhs, rhs }
}

pub struct Terminated<P, Q>
where
    P: ?Sized,
{
    right: Q,
    left: P,
}

impl<C, P, Q> Parser<C> for Terminated<P, Q>
where
    C: ?Sized,
    P: Parser<C> + ?Sized,
    Q: Parser<C>,
{
    type Output = P::Output;

    fn parse(&mut self, context: &mut C) -> Result<Self::Output, ()> {
        let output = self.left.parse(context)?;

        self.right.parse(context)?;

        Ok(output)
    }
}

pub const fn terminated<P, Q>(left: P, right: Q) -> Terminated<P, Q> {
    Terminated { right, left }
}
