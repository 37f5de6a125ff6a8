//! The two-case `Eventual` type and its combinators.
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::{Future, IntoFuture};

/// A result that is either available now or will be available later.
///
/// Continuations chained with [`Eventual::and_then`] run synchronously while
/// every step is `Ready`. The first `Deferred` step switches the rest of the
/// chain into a single boxed future, so callers on the synchronous path never
/// allocate or suspend.
pub enum Eventual<'a, T, E> {
    /// The computation already finished.
    Ready(Result<T, E>),
    /// The computation completes when the future resolves.
    Deferred(BoxFuture<'a, Result<T, E>>),
}

impl<'a, T, E> Eventual<'a, T, E>
where
    T: Send + 'a,
    E: Send + 'a,
{
    pub fn ready(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    pub fn failed(error: E) -> Self {
        Self::Ready(Err(error))
    }

    /// Wraps a future as a deferred result.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'a,
    {
        Self::Deferred(future.boxed())
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Takes the result out if it is already available, otherwise hands the
    /// deferred computation back unchanged.
    pub fn into_ready(self) -> Result<Result<T, E>, Self> {
        match self {
            Self::Ready(result) => Ok(result),
            deferred => Err(deferred),
        }
    }

    /// Applies `f` to the value once it is available.
    ///
    /// The result is `Ready` if both `self` and the value returned by `f` are
    /// ready. Failures skip `f` and propagate unchanged.
    pub fn and_then<U, F>(self, f: F) -> Eventual<'a, U, E>
    where
        U: Send + 'a,
        F: FnOnce(T) -> Eventual<'a, U, E> + Send + 'a,
    {
        match self {
            Self::Ready(Ok(value)) => f(value),
            Self::Ready(Err(error)) => Eventual::Ready(Err(error)),
            Self::Deferred(pending) => Eventual::Deferred(Box::pin(async move {
                let value = pending.await?;
                f(value).await
            })),
        }
    }

    pub fn map<U, F>(self, f: F) -> Eventual<'a, U, E>
    where
        U: Send + 'a,
        F: FnOnce(T) -> U + Send + 'a,
    {
        self.and_then(move |value| Eventual::ready(f(value)))
    }

    pub fn map_err<E2, F>(self, f: F) -> Eventual<'a, T, E2>
    where
        E2: Send + 'a,
        F: FnOnce(E) -> E2 + Send + 'a,
    {
        match self {
            Self::Ready(result) => Eventual::Ready(result.map_err(f)),
            Self::Deferred(pending) => {
                Eventual::Deferred(Box::pin(async move { pending.await.map_err(f) }))
            }
        }
    }

    /// Intercepts a failure and replaces it with whatever `handler` produces.
    ///
    /// Works for failures that are already known and for failures raised
    /// later by a deferred computation. Chain after [`Eventual::and_then`] to
    /// also cover failures raised by the continuation itself.
    pub fn recover<F>(self, handler: F) -> Self
    where
        F: FnOnce(E) -> Eventual<'a, T, E> + Send + 'a,
    {
        match self {
            Self::Ready(Err(error)) => handler(error),
            Self::Ready(ok) => Self::Ready(ok),
            Self::Deferred(pending) => Self::Deferred(Box::pin(async move {
                match pending.await {
                    Ok(value) => Ok(value),
                    Err(error) => handler(error).await,
                }
            })),
        }
    }
}

impl<'a, T, E> From<Result<T, E>> for Eventual<'a, T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::Ready(result)
    }
}

impl<'a, T, E> IntoFuture for Eventual<'a, T, E>
where
    T: Send + 'a,
    E: Send + 'a,
{
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'a, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(result) => future::ready(result).boxed(),
            Self::Deferred(pending) => pending,
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Eventual<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}
