//! Sequential iteration helpers that preserve eager/deferred transparency.
//!
//! Items are processed one at a time in source order. Everything stays on
//! the synchronous path until the first item that produces a `Deferred`
//! result; the remaining items are then driven from inside one future.
use crate::Eventual;
use indexmap::IndexMap;
use std::hash::Hash;

/// Maps `f` over `items`, collecting the results in order.
pub fn map_seq<'a, I, F, U, E>(items: I, mut f: F) -> Eventual<'a, Vec<U>, E>
where
    I: IntoIterator,
    I::IntoIter: Send + 'a,
    I::Item: Send + 'a,
    F: FnMut(I::Item) -> Eventual<'a, U, E> + Send + 'a,
    U: Send + 'a,
    E: Send + 'a,
{
    let mut iter = items.into_iter();
    let mut results = Vec::with_capacity(iter.size_hint().0);

    while let Some(item) = iter.next() {
        match f(item) {
            Eventual::Ready(Ok(value)) => results.push(value),
            Eventual::Ready(Err(error)) => return Eventual::Ready(Err(error)),
            Eventual::Deferred(pending) => {
                return Eventual::Deferred(Box::pin(async move {
                    results.push(pending.await?);
                    for item in iter {
                        results.push(f(item).await?);
                    }
                    Ok(results)
                }));
            }
        }
    }

    Eventual::Ready(Ok(results))
}

/// Runs `f` for every item, stopping at the first failure.
pub fn for_each_seq<'a, I, F, E>(items: I, f: F) -> Eventual<'a, (), E>
where
    I: IntoIterator,
    I::IntoIter: Send + 'a,
    I::Item: Send + 'a,
    F: FnMut(I::Item) -> Eventual<'a, (), E> + Send + 'a,
    E: Send + 'a,
{
    map_seq(items, f).map(|_| ())
}

/// Folds `items` into an accumulator, one step at a time.
pub fn reduce_seq<'a, I, A, F, E>(items: I, init: A, mut f: F) -> Eventual<'a, A, E>
where
    I: IntoIterator,
    I::IntoIter: Send + 'a,
    I::Item: Send + 'a,
    A: Send + 'a,
    F: FnMut(A, I::Item) -> Eventual<'a, A, E> + Send + 'a,
    E: Send + 'a,
{
    let mut iter = items.into_iter();
    let mut accumulator = init;

    while let Some(item) = iter.next() {
        match f(accumulator, item) {
            Eventual::Ready(Ok(next)) => accumulator = next,
            Eventual::Ready(Err(error)) => return Eventual::Ready(Err(error)),
            Eventual::Deferred(pending) => {
                return Eventual::Deferred(Box::pin(async move {
                    let mut accumulator = pending.await?;
                    for item in iter {
                        accumulator = f(accumulator, item).await?;
                    }
                    Ok(accumulator)
                }));
            }
        }
    }

    Eventual::Ready(Ok(accumulator))
}

/// Maps `f` over the values of a key/value sequence, keeping keys and order.
pub fn map_values<'a, I, K, V, F, U, E>(entries: I, mut f: F) -> Eventual<'a, IndexMap<K, U>, E>
where
    I: IntoIterator<Item = (K, V)>,
    I::IntoIter: Send + 'a,
    K: Hash + Eq + Send + 'a,
    V: Send + 'a,
    F: FnMut(V) -> Eventual<'a, U, E> + Send + 'a,
    U: Send + 'a,
    E: Send + 'a,
{
    map_seq(entries, move |(key, value)| {
        f(value).map(move |mapped| (key, mapped))
    })
    .map(|pairs| pairs.into_iter().collect())
}
