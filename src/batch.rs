//! Fixed-size chunking of update lists for batch endpoints

use std::num::NonZeroUsize;

/// Splits `items` into ordered, contiguous chunks of at most `size` elements.
///
/// The last chunk may be shorter. An empty slice yields no chunks.
pub fn batches<T>(items: &[T], size: NonZeroUsize) -> impl Iterator<Item = &[T]> {
    items.chunks(size.get())
}

/// Number of chunks [`batches`] yields for `len` items
pub fn batch_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}
