use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use std::fmt;
use serde::{Serialize, Deserialize};

/// Row-major 2D matrix. A batch of vectors is one row per sample.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: Vec<f32>,
    pub rows: usize,
    pub cols: usize,
}

impl Tensor {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    pub fn random_normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f32, rng: &mut R) -> Self {
        let data = (0..rows * cols)
            .map(|_| {
                let z: f32 = StandardNormal.sample(rng);
                z * std_dev
            })
            .collect();
        Self { data, rows, cols }
    }

    pub fn from_vec(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "data does not fit a {rows}x{cols} tensor");
        Self { data, rows, cols }
    }

    /// 1 x n tensor holding a single sample.
    pub fn row_vector(data: Vec<f32>) -> Self {
        let cols = data.len();
        Self { data, rows: 1, cols }
    }

    /// Stacks equally sized rows into a batch.
    pub fn stack<'a, I>(rows: I, cols: usize) -> Self
    where I: IntoIterator<Item = &'a [f32]> {
        let mut data = Vec::new();
        let mut count = 0;
        for row in rows {
            assert_eq!(row.len(), cols, "all rows must have {cols} columns");
            data.extend_from_slice(row);
            count += 1;
        }
        Self { data, rows: count, cols }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn read(&self) -> &[f32] {
        &self.data
    }

    pub fn write(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        let cols = self.cols;
        &mut self.data[i * cols..(i + 1) * cols]
    }

    /// self (m x k) @ other (k x n)
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.cols, other.rows, "self columns must equal other rows");

        let k = self.cols;
        let n = other.cols;
        let mut out = Tensor::zeros(self.rows, n);
        if n == 0 {
            return out;
        }

        out.data.par_chunks_mut(n).enumerate().for_each(|(m_idx, out_row)| {
            let a_row = &self.data[m_idx * k..(m_idx + 1) * k];
            for (k_idx, &a_val) in a_row.iter().enumerate() {
                let b_row = &other.data[k_idx * n..(k_idx + 1) * n];
                for (o, &b_val) in out_row.iter_mut().zip(b_row) {
                    *o += a_val * b_val;
                }
            }
        });

        out
    }

    /// self.T (k x m) @ other (m x n), without materializing the transpose
    pub fn t_matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.rows, other.rows, "self rows must equal other rows");

        let k = self.cols;
        let n = other.cols;
        let mut out = Tensor::zeros(k, n);
        if n == 0 {
            return out;
        }

        out.data.par_chunks_mut(n).enumerate().for_each(|(k_idx, out_row)| {
            for m_idx in 0..self.rows {
                let a_val = self.data[m_idx * k + k_idx];
                let b_row = &other.data[m_idx * n..(m_idx + 1) * n];
                for (o, &b_val) in out_row.iter_mut().zip(b_row) {
                    *o += a_val * b_val;
                }
            }
        });

        out
    }

    /// self (m x n) @ other.T (n x k)
    pub fn matmul_t(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.cols, other.cols, "self columns must equal other columns");

        let k = other.rows;
        let mut out = Tensor::zeros(self.rows, k);
        if k == 0 {
            return out;
        }

        out.data.par_chunks_mut(k).enumerate().for_each(|(m_idx, out_row)| {
            let a_row = self.row(m_idx);
            for (k_idx, o) in out_row.iter_mut().enumerate() {
                *o = a_row.iter().zip(other.row(k_idx)).map(|(a, b)| a * b).sum();
            }
        });

        out
    }

    /// Column sums as a 1 x n tensor.
    pub fn sum_rows(&self) -> Tensor {
        let n = self.cols;
        let sums = self.data.par_chunks(n.max(1)).fold(
            || vec![0.0; n],
            |mut acc, row| {
                for (a, &x) in acc.iter_mut().zip(row) {
                    *a += x;
                }
                acc
            },
        ).reduce(
            || vec![0.0; n],
            |mut acc, part| {
                for (a, x) in acc.iter_mut().zip(part) {
                    *a += x;
                }
                acc
            },
        );

        Tensor::from_vec(sums, 1, n)
    }

    pub fn map<F>(&self, f: F) -> Tensor
    where F: Fn(f32) -> f32 + Sync + Send {
        let data = self.data.par_iter().map(|&x| f(x)).collect();
        Tensor { data, rows: self.rows, cols: self.cols }
    }

    // map through self allowing access to second tensor
    pub fn map2<F>(&self, other: &Tensor, f: F) -> Tensor
    where F: Fn(f32, f32) -> f32 + Sync + Send {
        assert_eq!(self.shape(), other.shape(), "tensors must have the same shape");

        let data = self.data.par_iter().zip(other.data.par_iter()).map(|(&x1, &x2)| f(x1, x2)).collect();
        Tensor { data, rows: self.rows, cols: self.cols }
    }

    pub fn max_per_row(&self) -> Vec<f32> {
        (0..self.rows)
            .map(|i| self.row(i).iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b)))
            .collect()
    }

    /// Index of the largest value in row `i`; ties go to the lowest index.
    pub fn argmax_row(&self, i: usize) -> usize {
        let mut best = 0;
        for (j, &v) in self.row(i).iter().enumerate().skip(1) {
            if v > self.row(i)[best] {
                best = j;
            }
        }
        best
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
         .field("shape", &self.shape())
         .field("data", &self.data)
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_vec_approx_eq(a: &[f32], b: &[f32]) {
        let tolerance = 1e-4;
        assert_eq!(a.len(), b.len(), "vectors have different lengths");
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            assert!((x - y).abs() < tolerance, "mismatch at index {}: {} vs {}", i, x, y);
        }
    }

    fn transpose(t: &Tensor) -> Tensor {
        let mut out = Tensor::zeros(t.cols, t.rows);
        for i in 0..t.rows {
            for j in 0..t.cols {
                out.write()[j * t.rows + i] = t.row(i)[j];
            }
        }
        out
    }

    fn reference_matmul(a: &Tensor, b: &Tensor) -> Vec<f32> {
        let mut result = vec![0.0; a.rows * b.cols];
        for i in 0..a.rows {
            for j in 0..b.cols {
                let mut sum = 0.0;
                for l in 0..a.cols {
                    sum += a.row(i)[l] * b.row(l)[j];
                }
                result[i * b.cols + j] = sum;
            }
        }
        result
    }

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(2, 3);
        assert_eq!(t.read(), &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(t.shape(), (2, 3));
    }

    #[test]
    fn test_random_normal_is_seeded() {
        let a = Tensor::random_normal(10, 4, 0.5, &mut StdRng::seed_from_u64(1));
        let b = Tensor::random_normal(10, 4, 0.5, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.read().len(), 40);
        assert_eq!(a, b);
    }

    #[test]
    #[should_panic]
    fn test_from_vec_wrong_size() {
        Tensor::from_vec(vec![1.0, 2.0, 3.0], 2, 2);
    }

    #[test]
    fn test_stack_rows() {
        let first = [1.0, 2.0];
        let second = [3.0, 4.0];
        let t = Tensor::stack([&first[..], &second[..]], 2);
        assert_eq!(t.shape(), (2, 2));
        assert_eq!(t.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_matmul_simple() {
        // A: [[1, 2, 3], [4, 5, 6]]
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        // B: [[7, 8], [9, 10], [11, 12]]
        let b = Tensor::from_vec(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2);

        let c = a.matmul(&b);

        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.read(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_matmul_against_reference() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = Tensor::random_normal(64, 32, 1.0, &mut rng);
        let b = Tensor::random_normal(32, 70, 1.0, &mut rng);

        let result = a.matmul(&b);

        assert_eq!(result.shape(), (64, 70));
        assert_vec_approx_eq(result.read(), &reference_matmul(&a, &b));
    }

    #[test]
    fn test_transposed_products_against_reference() {
        let mut rng = StdRng::seed_from_u64(9);
        let a = Tensor::random_normal(20, 7, 1.0, &mut rng);
        let b = Tensor::random_normal(20, 5, 1.0, &mut rng);
        let c = Tensor::random_normal(9, 7, 1.0, &mut rng);

        let at_b = a.t_matmul(&b);
        assert_eq!(at_b.shape(), (7, 5));
        assert_vec_approx_eq(at_b.read(), &reference_matmul(&transpose(&a), &b));

        let a_ct = a.matmul_t(&c);
        assert_eq!(a_ct.shape(), (20, 9));
        assert_vec_approx_eq(a_ct.read(), &reference_matmul(&a, &transpose(&c)));
    }

    #[test]
    fn test_sum_rows() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let s = t.sum_rows();

        assert_eq!(s.shape(), (1, 3));
        assert_vec_approx_eq(s.read(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_map_empty_tensor() {
        let t = Tensor::zeros(0, 5);
        let result = t.map(|x| x + 1.0);

        assert_eq!(result.shape(), (0, 5));
        assert!(result.read().is_empty());
    }

    #[test]
    fn test_map2_simple_add() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], 1, 3);
        let b = Tensor::from_vec(vec![10.0, 20.0, 30.0], 1, 3);
        let result = a.map2(&b, |x, y| x + y);

        assert_vec_approx_eq(result.read(), &[11.0, 22.0, 33.0]);
    }

    #[test]
    #[should_panic]
    fn test_map2_shape_mismatch() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], 1, 3);
        let b = Tensor::from_vec(vec![10.0, 20.0], 1, 2);
        a.map2(&b, |x, y| x + y);
    }

    #[test]
    fn test_row_reductions() {
        let t = Tensor::from_vec(vec![0.5, 2.0, 2.0, -1.0, -3.0, -1.0], 2, 3);

        assert_eq!(t.max_per_row(), vec![2.0, -1.0]);
        assert_eq!(t.argmax_row(0), 1);
        assert_eq!(t.argmax_row(1), 0);
    }
}
