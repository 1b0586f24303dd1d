//! Row-major 2D grid used for height maps and masks.

use rayon::prelude::*;

/// A `width × height` grid stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2D<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Array2D<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T: Clone + Default> Array2D<T> {
    /// Creates a grid filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> Array2D<T> {
    /// Wraps row-major `data`. Returns `None` if the length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == width * height).then_some(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a mutable reference to the cell at (x, y).
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    /// Sets the cell at (x, y).
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterates over rows mutably.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, T> {
        self.data.chunks_exact_mut(self.width.max(1))
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) out of bounds for {}x{} grid",
            self.width,
            self.height
        );
        y * self.width + x
    }
}

impl<T: Copy> Array2D<T> {
    /// Returns the cell at (x, y).
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }
}

impl Array2D<f32> {
    /// Returns the smallest and largest value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let (min, max) = self
            .data
            .par_iter()
            .fold(
                || (f32::MAX, f32::MIN),
                |(min, max), &v| (min.min(v), max.max(v)),
            )
            .reduce(
                || (f32::MAX, f32::MIN),
                |(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)),
            );
        Some((min, max))
    }

    /// Linearly rescales values into [0, 1]. A flat grid becomes all zeros.
    pub fn normalize(&mut self) {
        let Some((min, max)) = self.min_max() else {
            return;
        };
        let range = max - min;
        if range <= f32::EPSILON {
            self.data.par_iter_mut().for_each(|v| *v = 0.0);
            return;
        }
        self.data
            .par_iter_mut()
            .for_each(|v| *v = ((*v - min) / range).clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let grid = Array2D::from_vec(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.get(2, 0), 2);
        assert_eq!(grid.get(0, 1), 3);
        assert_eq!(grid.get(2, 1), 5);
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        assert!(Array2D::from_vec(3, 3, vec![0u8; 8]).is_none());
    }

    #[test]
    fn test_set_and_rows() {
        let mut grid: Array2D<u8> = Array2D::new(4, 3);
        grid.set(1, 2, 7);
        *grid.get_mut(3, 0) = 9;

        let rows: Vec<Vec<u8>> = grid.rows_mut().map(|row| row.to_vec()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![0, 0, 0, 9]);
        assert_eq!(rows[2], vec![0, 7, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        let grid: Array2D<f32> = Array2D::new(2, 2);
        grid.get(2, 0);
    }

    #[test]
    fn test_normalize() {
        let mut grid = Array2D::from_vec(2, 2, vec![-2.0f32, 0.0, 2.0, 1.0]).unwrap();
        grid.normalize();

        assert_eq!(grid.min_max(), Some((0.0, 1.0)));
        assert!((grid.get(1, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_flat_grid() {
        let mut grid = Array2D::filled(3, 3, 4.0f32);
        grid.normalize();
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
    }
}
