//! Abstract operations.

use std::marker::PhantomData;

/// Operation to insert a value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation to replace a value wholesale.
#[derive(Clone, Copy, Debug)]
pub struct Replace<T>(pub T);

/// Operation to delete a value.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation to select a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation to subscribe to changes of a value.
#[derive(Clone, Copy, Debug)]
pub struct Subscribe<T>(pub T);

/// Operation to start a value.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Operation to generate a value.
#[derive(Clone, Debug)]
pub struct Generate<T>(pub T);

/// Selector of `W` by `B`.
#[derive(Debug)]
pub struct By<W, B> {
    /// Type of the value to select.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] with the given value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}

// Manual impls, so `W` is not required to be `Clone`/`Copy`.
impl<W, B: Clone> Clone for By<W, B> {
    fn clone(&self) -> Self {
        Self::new(self.by.clone())
    }
}

impl<W, B: Copy> Copy for By<W, B> {}
