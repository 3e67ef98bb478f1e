//! Bulk conversion between collections and external sequences.
//!
//! A host-language adapter exposes its native sequences through
//! [`HandleSequence`] (indexed access plus length) and receives results
//! through [`HandleSink`]. Every bulk conversion builds its result in a local
//! value and returns it only once every element has converted; on the first
//! failure the partial result is dropped and a single [`ConvertError`] comes
//! back.

use crate::id::PoolTag;
use crate::pool::CollectionError;
use std::collections::TryReserveError;
use thiserror::Error;

/// Boxed error returned by adapter callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by bulk conversions.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// An external handle could not be fetched or resolved to an id.
    #[error("failed to resolve element {index}: {source}")]
    Resolution {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// An id could not be wrapped into an external handle, or the sink
    /// refused it.
    #[error("failed to project element {index}: {source}")]
    Projection {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// A collection could not grow.
    #[error("allocation failed during conversion: {0}")]
    AllocationExhausted(#[from] TryReserveError),
}

impl ConvertError {
    /// Index of the element that failed, if the failure was element-level.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Resolution { index, .. } | Self::Projection { index, .. } => Some(*index),
            Self::AllocationExhausted(_) => None,
        }
    }
}

/// A handle produced by a different pool than the collection it was fed to.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("handle belongs to {found}, expected {expected}")]
pub struct ForeignHandle {
    pub expected: PoolTag,
    pub found: PoolTag,
}

/// Element fetched past the end of a sequence.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("index {index} out of range for sequence of length {len}")]
pub struct OutOfRange {
    pub index: usize,
    pub len: usize,
}

/// An external ordered collection that can be walked by index.
pub trait HandleSequence {
    type Handle;
    type Error: Into<BoxError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch element `index`. Failure aborts the conversion walking it.
    fn get(&self, index: usize) -> Result<Self::Handle, Self::Error>;
}

impl<T: Clone> HandleSequence for [T] {
    type Handle = T;
    type Error = OutOfRange;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Result<T, OutOfRange> {
        <[T]>::get(self, index).cloned().ok_or(OutOfRange {
            index,
            len: <[T]>::len(self),
        })
    }
}

/// A freshly built external collection that handles are appended to.
pub trait HandleSink: Default {
    type Handle;
    type Error: Into<BoxError>;

    fn append(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;
}

impl<T> HandleSink for Vec<T> {
    type Handle = T;
    type Error = TryReserveError;

    fn append(&mut self, handle: T) -> Result<(), TryReserveError> {
        self.try_reserve(1)?;
        self.push(handle);
        Ok(())
    }
}

fn boxed(err: impl Into<BoxError>) -> BoxError {
    err.into()
}

/// Walk `source`, resolving each handle and feeding the result to `accept`.
pub(crate) fn ingest<S, T, E, F, A>(
    source: &S,
    mut resolve: F,
    mut accept: A,
) -> Result<(), ConvertError>
where
    S: HandleSequence + ?Sized,
    E: Into<BoxError>,
    F: FnMut(S::Handle) -> Result<T, E>,
    A: FnMut(T) -> Result<(), CollectionError>,
{
    for index in 0..source.len() {
        let resolved = source
            .get(index)
            .map_err(boxed)
            .and_then(|handle| resolve(handle).map_err(boxed));
        let accepted = match resolved {
            Ok(item) => accept(item).map_err(|err| match err {
                CollectionError::Alloc(err) => ConvertError::AllocationExhausted(err),
                err => ConvertError::Resolution {
                    index,
                    source: Box::new(err),
                },
            }),
            Err(source) => Err(ConvertError::Resolution { index, source }),
        };
        if let Err(err) = accepted {
            tracing::debug!(index, "bulk ingestion aborted");
            return Err(err);
        }
    }
    Ok(())
}

/// Wrap each item of `items` into a fresh sink.
pub(crate) fn project<K, T, E, I, F>(items: I, mut wrap: F) -> Result<K, ConvertError>
where
    K: HandleSink,
    E: Into<BoxError>,
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Result<K::Handle, E>,
{
    let mut sink = K::default();
    for (index, item) in items.into_iter().enumerate() {
        let appended = wrap(item)
            .map_err(boxed)
            .and_then(|handle| sink.append(handle).map_err(boxed));
        if let Err(source) = appended {
            tracing::debug!(index, "bulk projection aborted");
            return Err(ConvertError::Projection { index, source });
        }
    }
    Ok(sink)
}

/// Copy a sentinel-terminated array of text into a fresh sink.
///
/// `None` is the sentinel: conversion stops at the first one, or at the end
/// of the slice if there is none.
pub fn string_array_to_sequence<K, S>(array: &[Option<S>]) -> Result<K, ConvertError>
where
    K: HandleSink<Handle = String>,
    S: AsRef<str>,
{
    let terminated = array
        .iter()
        .map_while(|item| item.as_ref().map(<S as AsRef<str>>::as_ref));
    project(terminated, |text: &str| Ok::<_, BoxError>(text.to_string()))
}
