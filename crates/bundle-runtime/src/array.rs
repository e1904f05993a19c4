//! Storage helpers for fixed-rank arrays.
//!
//! Rank-1 arrays are plain `Box<[T]>`. Higher ranks use [`NdArray`], a
//! row-major buffer with its dimensions alongside.

use std::ops::{Index, IndexMut};

use crate::error::BundleError;

/// Allocates `len` default elements.
pub fn default_boxed_slice<T: Default>(len: usize) -> Box<[T]> {
    std::iter::repeat_with(T::default).take(len).collect()
}

/// Reallocates `slice` only when its length differs from `len`.
///
/// Existing storage of the right length is kept as is; callers overwrite
/// every element afterwards.
pub fn resize_boxed_slice<T: Default>(slice: &mut Box<[T]>, len: usize) {
    if slice.len() != len {
        *slice = default_boxed_slice(len);
    }
}

/// A dense array of rank `RANK`, indexed by `[usize; RANK]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NdArray<T, const RANK: usize> {
    dims: [usize; RANK],
    data: Vec<T>,
}

impl<T, const RANK: usize> Default for NdArray<T, RANK> {
    fn default() -> Self {
        Self {
            dims: [0; RANK],
            data: Vec::new(),
        }
    }
}

impl<T, const RANK: usize> NdArray<T, RANK> {
    /// Builds an array from row-major `data`.
    ///
    /// Returns `None` when `data` does not hold exactly the element count
    /// the dimensions describe.
    pub fn from_vec(dims: [usize; RANK], data: Vec<T>) -> Option<Self> {
        match element_count(&dims) {
            Some(count) if count == data.len() => Some(Self { dims, data }),
            _ => None,
        }
    }

    pub fn dims(&self) -> [usize; RANK] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: [usize; RANK]) -> Option<&T> {
        self.offset(index).map(|o| &self.data[o])
    }

    pub fn get_mut(&mut self, index: [usize; RANK]) -> Option<&mut T> {
        self.offset(index).map(move |o| &mut self.data[o])
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn offset(&self, index: [usize; RANK]) -> Option<usize> {
        let mut offset = 0;
        for (axis, &i) in index.iter().enumerate() {
            if i >= self.dims[axis] {
                return None;
            }
            offset = offset * self.dims[axis] + i;
        }
        Some(offset)
    }
}

impl<T: Default, const RANK: usize> NdArray<T, RANK> {
    /// Allocates an array of default elements.
    pub fn new(dims: [usize; RANK]) -> Result<Self, BundleError> {
        let count = element_count(&dims).ok_or_else(|| BundleError::DimensionsOverflow {
            dims: dims.to_vec(),
        })?;
        Ok(Self {
            dims,
            data: std::iter::repeat_with(T::default).take(count).collect(),
        })
    }

    /// Reallocates only when `dims` differ from the current dimensions.
    pub fn reshape(&mut self, dims: [usize; RANK]) -> Result<(), BundleError> {
        if self.dims != dims {
            *self = Self::new(dims)?;
        }
        Ok(())
    }
}

fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

impl<T, const RANK: usize> Index<[usize; RANK]> for NdArray<T, RANK> {
    type Output = T;

    fn index(&self, index: [usize; RANK]) -> &T {
        match self.offset(index) {
            Some(offset) => &self.data[offset],
            None => panic!("index {:?} out of bounds for dimensions {:?}", index, self.dims),
        }
    }
}

impl<T, const RANK: usize> IndexMut<[usize; RANK]> for NdArray<T, RANK> {
    fn index_mut(&mut self, index: [usize; RANK]) -> &mut T {
        match self.offset(index) {
            Some(offset) => &mut self.data[offset],
            None => panic!("index {:?} out of bounds for dimensions {:?}", index, self.dims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_keeps_matching_storage() {
        let mut slice: Box<[i32]> = vec![1, 2, 3].into_boxed_slice();
        let before = slice.as_ptr();
        resize_boxed_slice(&mut slice, 3);
        assert_eq!(slice.as_ptr(), before);
        assert_eq!(&*slice, &[1, 2, 3]);

        resize_boxed_slice(&mut slice, 2);
        assert_eq!(&*slice, &[0, 0]);
    }

    #[test]
    fn test_row_major_indexing() {
        let grid = NdArray::from_vec([2, 3], vec![0, 1, 2, 10, 11, 12]).unwrap();
        assert_eq!(grid[[0, 2]], 2);
        assert_eq!(grid[[1, 0]], 10);
        assert_eq!(grid.get([2, 0]), None);
        assert_eq!(grid.dims(), [2, 3]);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(NdArray::<u8, 2>::from_vec([2, 2], vec![1, 2, 3]).is_none());
    }

    #[test]
    fn test_reshape() {
        let mut cube = NdArray::<u16, 3>::default();
        assert!(cube.is_empty());
        cube.reshape([2, 2, 2]).unwrap();
        assert_eq!(cube.len(), 8);
        cube[[1, 1, 1]] = 7;
        cube.reshape([2, 2, 2]).unwrap();
        assert_eq!(cube[[1, 1, 1]], 7);
    }

    #[test]
    fn test_dimension_overflow() {
        let err = NdArray::<u8, 3>::new([usize::MAX, 2, 2]).unwrap_err();
        assert!(matches!(err, BundleError::DimensionsOverflow { .. }));
    }
}
