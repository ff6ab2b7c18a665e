//! The `Renewable` trait shared by all strategies.

use std::fmt::Display;
use std::sync::Arc;

/// A single slot holding the latest outcome of a production function.
///
/// `get` either returns the cached outcome or produces a new one, as the
/// strategy decides. A failed production is an outcome like any other: it is
/// cached for the error period and handed back as `Err`.
///
/// It is always safe to call `get` from many threads at once.
pub trait Renewable<V, E>: Send + Sync {
    /// Produce a new outcome or return the cached one.
    fn get(&self) -> Result<V, E>;
}

impl<V, E, R> Renewable<V, E> for Arc<R>
where
    R: Renewable<V, E> + ?Sized,
{
    fn get(&self) -> Result<V, E> {
        (**self).get()
    }
}

impl<V, E, R> Renewable<V, E> for Box<R>
where
    R: Renewable<V, E> + ?Sized,
{
    fn get(&self) -> Result<V, E> {
        (**self).get()
    }
}

/// Call `get` and panic if the outcome is an error.
///
/// # Panics
///
/// When the current outcome is `Err`.
pub fn must<V, E, R>(renewable: &R) -> V
where
    E: Display,
    R: Renewable<V, E> + ?Sized,
{
    match renewable.get() {
        Ok(value) => value,
        Err(e) => panic!("renewable produced an error: {}", e),
    }
}
