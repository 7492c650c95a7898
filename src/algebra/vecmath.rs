use super::FloatT;
use itertools::izip;
use std::iter::zip;

/// Elementwise operations on scalars of type [`FloatT`](crate::algebra::FloatT)
pub trait ScalarMath<T> {
    /// Restrict a value to the interval `[min_thresh, max_thresh]`.
    fn clip(&self, min_thresh: T, max_thresh: T) -> T;

    /// Safe logarithm for barrier computations.
    ///
    /// Returns `ln(s)` for s > 0, and a large negative *finite* value
    /// otherwise.  Feasibility predicates rely on this never producing
    /// a NaN or -Inf that could poison downstream comparisons.
    fn logsafe(&self) -> T;
}

impl<T: FloatT> ScalarMath<T> for T {
    fn clip(&self, min_thresh: T, max_thresh: T) -> T {
        T::min(T::max(*self, min_thresh), max_thresh)
    }

    fn logsafe(&self) -> T {
        if *self <= T::zero() {
            -T::max_value()
        } else {
            self.ln()
        }
    }
}

/// Operations on slices of [`FloatT`](crate::algebra::FloatT)
pub trait VectorMath<T> {
    /// Copy values from `src` into `self`.
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Apply an elementwise operation to `self`.
    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self;

    /// Apply an elementwise operation to `v`, assigning results to `self`.
    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &Self) -> &mut Self;

    /// Elementwise shift by a constant.
    fn translate(&mut self, c: T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: T) -> &mut Self;

    /// Elementwise reciprocal.
    fn recip(&mut self) -> &mut Self;

    /// Elementwise square root.
    fn sqrt(&mut self) -> &mut Self;

    /// Elementwise inverse square root.
    fn rsqrt(&mut self) -> &mut Self;

    /// Elementwise negation.
    fn negate(&mut self) -> &mut Self;

    /// Elementwise product `self[i] *= y[i]`.
    fn hadamard(&mut self, y: &Self) -> &mut Self;

    /// Vector version of [`clip`](crate::algebra::ScalarMath::clip).
    fn clip(&mut self, min_thresh: T, max_thresh: T) -> &mut Self;

    /// Dot product.
    fn dot(&self, y: &Self) -> T;

    /// Computes `dot(z + αdz, s + αds)` without forming the shifted vectors.
    fn dot_shifted(z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T;

    /// Euclidean distance from `self` to `y`.
    fn dist(&self, y: &Self) -> T;

    /// Sum of elements.
    fn sum(&self) -> T;

    /// Sum of squares.
    fn sumsq(&self) -> T;

    /// 2-norm.
    fn norm(&self) -> T;

    /// Infinity norm.  Propagates NaN.
    fn norm_inf(&self) -> T;

    /// 2-norm of the elementwise product of `self` and `v`.
    fn norm_scaled(&self, v: &Self) -> T;

    /// Minimum value.
    fn minimum(&self) -> T;

    /// Mean value.
    fn mean(&self) -> T;

    /// True if no element is Inf or NaN.
    fn is_finite(&self) -> bool;

    /// BLAS-like operation `self = a*x + b*self`.
    fn axpby(&mut self, a: T, x: &Self, b: T) -> &mut Self;

    /// BLAS-like operation `self = a*x + b*y`.
    fn waxpby(&mut self, a: T, x: &Self, b: T, y: &Self) -> &mut Self;
}

impl<T: FloatT> VectorMath<T> for [T] {
    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        for x in &mut *self {
            *x = op(*x);
        }
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, v: &[T]) -> &mut Self {
        for (x, v) in zip(&mut *self, v) {
            *x = op(*v);
        }
        self
    }

    fn translate(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| x + c)
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.scalarop(|x| x * c)
    }

    fn recip(&mut self) -> &mut Self {
        self.scalarop(T::recip)
    }

    fn sqrt(&mut self) -> &mut Self {
        self.scalarop(T::sqrt)
    }

    fn rsqrt(&mut self) -> &mut Self {
        self.scalarop(|x| T::recip(T::sqrt(x)))
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        zip(&mut *self, y).for_each(|(x, y)| *x *= *y);
        self
    }

    fn clip(&mut self, min_thresh: T, max_thresh: T) -> &mut Self {
        self.scalarop(|x| x.clip(min_thresh, max_thresh))
    }

    fn dot(&self, y: &[T]) -> T {
        accumulate_pairwise(zip(self, y), |(&x, &y)| x * y)
    }

    fn dot_shifted(z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        assert_eq!(z.len(), s.len());
        assert_eq!(z.len(), dz.len());
        assert_eq!(s.len(), ds.len());

        let op = |(&s, &ds, &z, &dz): (&T, &T, &T, &T)| {
            let si = s + α * ds;
            let zi = z + α * dz;
            si * zi
        };
        accumulate_pairwise(izip!(s, ds, z, dz), op)
    }

    fn dist(&self, y: &Self) -> T {
        let dist2 = accumulate_pairwise(zip(self, y), |(&x, &y)| T::powi(x - y, 2));
        T::sqrt(dist2)
    }

    fn sum(&self) -> T {
        accumulate_pairwise(self.iter(), |&x| x)
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        T::sqrt(self.sumsq())
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = if v > out { v } else { out };
        }
        out
    }

    fn norm_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        let total = accumulate_pairwise(zip(self, v), |(&x, &y)| {
            let prod = x * y;
            prod * prod
        });
        T::sqrt(total)
    }

    fn minimum(&self) -> T {
        self.iter().fold(T::infinity(), |r, &s| T::min(r, s))
    }

    fn mean(&self) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            self.sum() / T::from_usize(self.len()).unwrap()
        }
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|&x| T::is_finite(x))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        zip(&mut *self, x).for_each(|(y, x)| *y = a * (*x) + b * (*y));
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, (x, y)) in zip(&mut *self, zip(x, y)) {
            *w = a * (*x) + b * (*y);
        }
        self
    }
}

// ---------------------------------------------------------------------
// pairwise accumulation for sums and dot products.  Plain left folds
// lose accuracy badly on long low-precision vectors.

fn accumulate_pairwise<T, I, A, F>(x: I, op: F) -> T
where
    T: FloatT,
    I: IntoIterator<Item = A> + Clone,
    I::IntoIter: ExactSizeIterator,
    F: Fn(A) -> T,
{
    const BASE_CASE_DIM: usize = 16;

    let n = x.clone().into_iter().len();
    return if n == 0 {
        T::zero()
    } else {
        inner(x, &op, 0, n)
    };

    fn inner<T, I, A, F>(x: I, op: &F, i1: usize, n: usize) -> T
    where
        T: FloatT,
        I: IntoIterator<Item = A> + Clone,
        I::IntoIter: ExactSizeIterator,
        F: Fn(A) -> T,
    {
        if n < BASE_CASE_DIM {
            x.into_iter()
                .skip(i1)
                .take(n)
                .fold(T::zero(), |acc, x| acc + op(x))
        } else {
            let n2 = n / 2;
            inner(x.clone(), op, i1, n2) + inner(x, op, i1 + n2, n - n2)
        }
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let maxlen = 128 * 7 + 1; //awkward length to exercise the base case
        let x: Vec<f64> = (1..=maxlen).map(|x| x as f64).collect();
        let y: Vec<f64> = (1..=maxlen).map(|y| (y as f64 - 3.0) / 2.0).collect();

        for i in 0..=x.len() {
            let xt = &x[0..i];
            let yt = &y[0..i];
            let dot1 = zip(xt, yt).fold(0.0, |acc, (&x, &y)| acc + x * y);
            let dot2 = xt.dot(yt);
            assert_eq!(dot1, dot2);
        }
    }

    #[test]
    fn test_mean_pairwise() {
        let x = vec![1., 2., 3., 4., 5.];
        assert_eq!(x.mean(), 3.);
        assert_eq!(x[0..0].mean(), 0.);

        //the mean of many f32 values is inaccurate under naive
        //summation but fine with the pairwise accumulator
        let n = 10000000usize;
        let x = vec![1.5f32; n];
        assert_eq!(x.mean(), 1.5f32);
    }

    #[test]
    fn test_dot_shifted() {
        let maxlen = 128 * 7 + 1;
        let z: Vec<f64> = (1..=maxlen).map(|z| z as f64).collect();
        let s: Vec<f64> = (1..=maxlen).map(|s| (s as f64 - 3.0) / 2.0).collect();

        let dz = vec![1.0; z.len()];
        let ds = vec![0.5; s.len()];
        let α = 0.5;

        for i in 0..=z.len() {
            let (zt, st) = (&z[0..i], &s[0..i]);
            let (dzt, dst) = (&dz[0..i], &ds[0..i]);
            let dot1 = <[f64] as VectorMath<f64>>::dot_shifted(zt, st, dzt, dst, α);
            let dot2 = zt.dot(st) + α * zt.dot(dst) + α * st.dot(dzt) + α * α * dzt.dot(dst);
            assert!((dot1 - dot2).abs() <= 1e-10 * dot2.abs().max(1.));
        }
    }

    #[test]
    fn test_logsafe_is_finite() {
        assert!(0.0f64.logsafe().is_finite());
        assert!((-1.0f64).logsafe().is_finite());
        assert_eq!(1.0f64.logsafe(), 0.0);
    }
}
