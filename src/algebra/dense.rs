#![allow(non_snake_case)]

//Dense kernels backing the PSD cone.  Factorisation engines use cyclic
//Jacobi iterations throughout, so no external BLAS/LAPACK is required
//and the same code runs at any precision implementing FloatT.

use super::{Adjoint, AsFloatT, FloatT, VectorMath};
use thiserror::Error;

/// Error codes from dense factorisation engines
#[derive(Error, Debug)]
pub enum DenseFactorizationError {
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,
    #[error("SVD iteration failed to converge")]
    SVDNotConverged,
}

/// Dense matrix in column major format
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major format
    pub data: Vec<T>,
}

impl<T> std::ops::Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    #[inline]
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.data[idx.0 + idx.1 * self.m]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        &mut self.data[idx.0 + idx.1 * self.m]
    }
}

/// Read access shared by a dense matrix and its transpose view
pub trait DenseView<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn at(&self, i: usize, j: usize) -> T;
}

impl<T: FloatT> DenseView<T> for Matrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
    #[inline]
    fn at(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }
}

impl<'a, T: FloatT> DenseView<T> for Adjoint<'a, Matrix<T>> {
    fn nrows(&self) -> usize {
        self.src.n
    }
    fn ncols(&self) -> usize {
        self.src.m
    }
    #[inline]
    fn at(&self, i: usize, j: usize) -> T {
        self.src[(j, i)]
    }
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    /// Matrix of zeros.
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        Self {
            m,
            n,
            data: vec![T::zero(); m * n],
        }
    }

    /// transpose view
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Overwrite with the identity.
    pub fn set_identity(&mut self) {
        assert_eq!(self.m, self.n);
        self.data.fill(T::zero());
        for i in 0..self.n {
            self[(i, i)] = T::one();
        }
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// General product `self = α*A*B + β*self`.
    pub fn mul<MA, MB>(&mut self, A: &MA, B: &MB, α: T, β: T)
    where
        MA: DenseView<T>,
        MB: DenseView<T>,
    {
        assert_eq!(A.ncols(), B.nrows());
        assert_eq!(self.m, A.nrows());
        assert_eq!(self.n, B.ncols());

        let inner = A.ncols();
        for j in 0..self.n {
            for i in 0..self.m {
                let mut acc = T::zero();
                for k in 0..inner {
                    acc += A.at(i, k) * B.at(k, j);
                }
                self[(i, j)] = α * acc + β * self[(i, j)];
            }
        }
    }

    /// Left multiply by `Diagonal(l)`.
    pub fn lscale(&mut self, l: &[T]) {
        for j in 0..self.n {
            for i in 0..self.m {
                self[(i, j)] *= l[i];
            }
        }
    }

    /// Right multiply by `Diagonal(r)`.
    pub fn rscale(&mut self, r: &[T]) {
        for j in 0..self.n {
            for i in 0..self.m {
                self[(i, j)] *= r[j];
            }
        }
    }

    /// Two sided diagonal scaling `self = Diagonal(l)*self*Diagonal(r)`.
    pub fn lrscale(&mut self, l: &[T], r: &[T]) {
        for j in 0..self.n {
            for i in 0..self.m {
                self[(i, j)] *= l[i] * r[j];
            }
        }
    }

    /// Symmetric rank-k style product `self = α*A*A' + β*self`.
    ///
    /// The full (not just triangular) result is written.
    pub fn syrk(&mut self, A: &Matrix<T>, α: T, β: T) {
        assert_eq!(self.m, A.m);
        assert_eq!(self.n, A.m);

        for j in 0..self.n {
            for i in 0..=j {
                let mut acc = T::zero();
                for k in 0..A.n {
                    acc += A[(i, k)] * A[(j, k)];
                }
                let v = α * acc + β * self[(i, j)];
                self[(i, j)] = v;
                self[(j, i)] = v;
            }
        }
    }

    /// Symmetric product `self = α*(A*B' + B*A') + β*self`.
    ///
    /// The full (not just triangular) result is written.
    pub fn syr2k(&mut self, A: &Matrix<T>, B: &Matrix<T>, α: T, β: T) {
        assert_eq!(A.m, B.m);
        assert_eq!(A.n, B.n);
        assert_eq!(self.m, A.m);
        assert_eq!(self.n, A.m);

        for j in 0..self.n {
            for i in 0..=j {
                let mut acc = T::zero();
                for k in 0..A.n {
                    acc += A[(i, k)] * B[(j, k)] + B[(i, k)] * A[(j, k)];
                }
                let v = α * acc + β * self[(i, j)];
                self[(i, j)] = v;
                self[(j, i)] = v;
            }
        }
    }

    /// Pack the upper triangle columnwise into `v`.
    pub fn pack_triu(&self, v: &mut [T]) {
        assert_eq!(self.m, self.n);
        assert_eq!(v.len(), triangular_number(self.n));

        let mut k = 0;
        for col in 0..self.n {
            for row in 0..=col {
                v[k] = self[(row, col)];
                k += 1;
            }
        }
    }
}

/// Number of elements in the triangle of a `k` x `k` matrix.
pub fn triangular_number(k: usize) -> usize {
    (k * (k + 1)) >> 1
}

/// 0-based position of the `k`th diagonal element in packed triangular storage.
pub fn triangular_index(k: usize) -> usize {
    (k * (k + 3)) >> 1
}

// ---------------------------------------------------------------------
// scaled vectorization of symmetric matrices.  Off diagonal terms
// carry a factor of √2 so that inner products are preserved.

/// Unpack a scaled triangular vectorization into a full symmetric matrix.
pub fn svec_to_mat<T: FloatT>(M: &mut Matrix<T>, x: &[T]) {
    let isqrt2 = T::FRAC_1_SQRT_2();
    let mut k = 0;
    for col in 0..M.n {
        for row in 0..=col {
            if row == col {
                M[(row, col)] = x[k];
            } else {
                let v = x[k] * isqrt2;
                M[(row, col)] = v;
                M[(col, row)] = v;
            }
            k += 1;
        }
    }
}

/// Pack a (symmetrized) matrix into scaled triangular vectorization.
pub fn mat_to_svec<T: FloatT>(x: &mut [T], M: &Matrix<T>) {
    let isqrt2 = T::FRAC_1_SQRT_2();
    let mut k = 0;
    for col in 0..M.n {
        for row in 0..=col {
            x[k] = if row == col {
                M[(row, col)]
            } else {
                (M[(row, col)] + M[(col, row)]) * isqrt2
            };
            k += 1;
        }
    }
}

// produce the upper triangle of the symmetric Kronecker product of a
// symmetric matrix A with itself, i.e. triu(A ⊗_s A)
pub(crate) fn skron<T>(out: &mut Matrix<T>, A: &Matrix<T>)
where
    T: FloatT,
{
    let sqrt2 = T::SQRT_2();
    let n = A.n;

    let mut col = 0;
    for l in 0..n {
        for k in 0..=l {
            let mut row = 0;
            let kl_eq = k == l;

            for j in 0..n {
                let Ajl = A[(j, l)];
                let Ajk = A[(j, k)];

                for i in 0..=j {
                    if row > col {
                        break;
                    }

                    let ij_eq = i == j;

                    out[(row, col)] = match (ij_eq, kl_eq) {
                        (false, false) => A[(i, k)] * Ajl + A[(i, l)] * Ajk,
                        (true, false) => sqrt2 * Ajl * Ajk,
                        (false, true) => sqrt2 * A[(i, l)] * Ajk,
                        (true, true) => Ajl * Ajl,
                    };

                    row += 1;
                } //end i
            } //end j
            col += 1;
        } //end k
    } //end l
}

// ---------------------------------------------------------------------
// Cholesky

/// Cholesky factorisation engine for symmetric positive definite matrices
#[derive(Debug)]
pub struct CholeskyEngine<T> {
    n: usize,
    /// lower triangular factor
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            L: Matrix::zeros((n, n)),
        }
    }

    /// Factor `A = L*L'`, reading the lower triangle of `A`.
    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        assert_eq!(A.m, self.n);
        assert_eq!(A.n, self.n);

        let L = &mut self.L;
        L.data.fill(T::zero());

        for j in 0..self.n {
            let mut d = A[(j, j)];
            for k in 0..j {
                d -= L[(j, k)] * L[(j, k)];
            }
            if !(d > T::zero()) || !d.is_finite() {
                return Err(DenseFactorizationError::NotPositiveDefinite);
            }
            let Ljj = T::sqrt(d);
            L[(j, j)] = Ljj;

            for i in (j + 1)..self.n {
                let mut v = A[(i, j)];
                for k in 0..j {
                    v -= L[(i, k)] * L[(j, k)];
                }
                L[(i, j)] = v / Ljj;
            }
        }
        Ok(())
    }

    /// log(det(A)) from the factors of the most recent `factor` call.
    pub fn logdet(&self) -> T {
        let two: T = (2.).as_T();
        let mut out = T::zero();
        for i in 0..self.n {
            out += two * self.L[(i, i)].ln();
        }
        out
    }
}

// ---------------------------------------------------------------------
// symmetric eigenvalues via cyclic Jacobi sweeps

const JACOBI_MAX_SWEEPS: usize = 60;

/// Eigenvalue engine for symmetric matrices
#[derive(Debug)]
pub struct EigEngine<T> {
    n: usize,
    /// eigenvalues in ascending order after a call to `eigvals`
    pub λ: Vec<T>,
}

impl<T> EigEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            λ: vec![T::zero(); n],
        }
    }

    /// Eigenvalues of the symmetric matrix `A`.
    ///
    /// `A` is used as workspace and destroyed.  Jacobi iterations on a
    /// symmetric matrix converge unconditionally, so a sweep cap is a
    /// tolerance statement rather than a failure mode and the diagonal
    /// is taken as the spectrum once sweeps stop.
    pub fn eigvals(&mut self, A: &mut Matrix<T>) {
        let n = self.n;
        assert_eq!(A.m, n);
        assert_eq!(A.n, n);

        let normA = A.data.norm();
        let tol = T::epsilon() * T::max(T::one(), normA);

        for _ in 0..JACOBI_MAX_SWEEPS {
            let mut offA = T::zero();
            for j in 0..n {
                for i in 0..j {
                    offA += A[(i, j)] * A[(i, j)];
                }
            }
            if T::sqrt(offA) <= tol {
                break;
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let Apq = A[(p, q)];
                    if Apq == T::zero() {
                        continue;
                    }
                    let (c, s) = jacobi_rotation(Apq, A[(p, p)], A[(q, q)]);
                    apply_jacobi_rotation(A, p, q, c, s);
                }
            }
        }

        for i in 0..n {
            self.λ[i] = A[(i, i)];
        }
        self.λ
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    }
}

// rotation (c,s) zeroing the (p,q) element.  Same construction as for
// the smallest-angle root in Numerical Recipes §11.1
fn jacobi_rotation<T: FloatT>(Apq: T, App: T, Aqq: T) -> (T, T) {
    let θ = (Aqq - App) / (Apq * (2.0).as_T());
    let θsq = θ * θ;
    let t = {
        if θsq.is_finite() {
            θ.signum() / (θ.abs() + T::sqrt(T::one() + θsq))
        } else {
            //θ² overflowed; the limiting rotation is 1/(2θ)
            let half: T = (0.5).as_T();
            half / θ
        }
    };
    let c = T::recip(T::sqrt(T::one() + t * t));
    (c, t * c)
}

// A <- G'AG for the Givens-like rotation G acting on the (p,q) plane
fn apply_jacobi_rotation<T: FloatT>(A: &mut Matrix<T>, p: usize, q: usize, c: T, s: T) {
    let n = A.n;
    for k in 0..n {
        let Akp = A[(k, p)];
        let Akq = A[(k, q)];
        A[(k, p)] = c * Akp - s * Akq;
        A[(k, q)] = s * Akp + c * Akq;
    }
    for k in 0..n {
        let Apk = A[(p, k)];
        let Aqk = A[(q, k)];
        A[(p, k)] = c * Apk - s * Aqk;
        A[(q, k)] = s * Apk + c * Aqk;
    }
}

// ---------------------------------------------------------------------
// SVD via one-sided Jacobi orthogonalization

/// SVD engine for square matrices
#[derive(Debug)]
pub struct SVDEngine<T> {
    n: usize,
    /// left singular vectors
    pub U: Matrix<T>,
    /// singular values in descending order
    pub s: Vec<T>,
    /// transposed right singular vectors
    pub Vt: Matrix<T>,

    //accumulator for the right singular vectors
    V: Matrix<T>,
}

impl<T> SVDEngine<T>
where
    T: FloatT,
{
    pub fn new(size: (usize, usize)) -> Self {
        let (m, n) = size;
        assert_eq!(m, n);
        Self {
            n,
            U: Matrix::zeros((n, n)),
            s: vec![T::zero(); n],
            Vt: Matrix::zeros((n, n)),
            V: Matrix::zeros((n, n)),
        }
    }

    /// Factor `A = U*Diagonal(s)*Vt`.  `A` is used as workspace.
    pub fn factor(&mut self, A: &mut Matrix<T>) -> Result<(), DenseFactorizationError> {
        let n = self.n;
        assert_eq!(A.m, n);
        assert_eq!(A.n, n);

        let U = &mut self.U;
        let V = &mut self.V;
        U.data.copy_from(&A.data);
        V.set_identity();

        let tol = T::epsilon();
        let mut converged = false;

        for _ in 0..JACOBI_MAX_SWEEPS {
            converged = true;

            for p in 0..n {
                for q in (p + 1)..n {
                    //inner products of the (p,q) column pair
                    let mut upp = T::zero();
                    let mut uqq = T::zero();
                    let mut upq = T::zero();
                    for k in 0..n {
                        upp += U[(k, p)] * U[(k, p)];
                        uqq += U[(k, q)] * U[(k, q)];
                        upq += U[(k, p)] * U[(k, q)];
                    }

                    if upq.abs() <= tol * T::sqrt(upp * uqq) || upq == T::zero() {
                        continue;
                    }
                    converged = false;

                    let (c, s) = jacobi_rotation(upq, upp, uqq);
                    for k in 0..n {
                        let Ukp = U[(k, p)];
                        let Ukq = U[(k, q)];
                        U[(k, p)] = c * Ukp - s * Ukq;
                        U[(k, q)] = s * Ukp + c * Ukq;

                        let Vkp = V[(k, p)];
                        let Vkq = V[(k, q)];
                        V[(k, p)] = c * Vkp - s * Vkq;
                        V[(k, q)] = s * Vkp + c * Vkq;
                    }
                }
            }
            if converged {
                break;
            }
        }
        if !converged {
            return Err(DenseFactorizationError::SVDNotConverged);
        }

        //column norms are the singular values
        for j in 0..n {
            let mut nrm = T::zero();
            for k in 0..n {
                nrm += U[(k, j)] * U[(k, j)];
            }
            let nrm = T::sqrt(nrm);
            self.s[j] = nrm;
            if nrm > T::zero() {
                let inv = T::recip(nrm);
                for k in 0..n {
                    U[(k, j)] *= inv;
                }
            }
        }

        //sort descending, carrying the singular vectors along
        for i in 0..n {
            let mut imax = i;
            for j in (i + 1)..n {
                if self.s[j] > self.s[imax] {
                    imax = j;
                }
            }
            if imax != i {
                self.s.swap(i, imax);
                for k in 0..n {
                    let tmp = U[(k, i)];
                    U[(k, i)] = U[(k, imax)];
                    U[(k, imax)] = tmp;
                    let tmp = V[(k, i)];
                    V[(k, i)] = V[(k, imax)];
                    V[(k, imax)] = tmp;
                }
            }
        }

        for j in 0..n {
            for i in 0..n {
                self.Vt[(j, i)] = V[(i, j)];
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn example_sym() -> Matrix<f64> {
        // A = [ 4. 2. 2.]
        //     [ 2. 3. 1.]
        //     [ 2. 1. -3.]
        let mut A = Matrix::zeros((3, 3));
        let vals = [[4., 2., 2.], [2., 3., 1.], [2., 1., -3.]];
        for i in 0..3 {
            for j in 0..3 {
                A[(i, j)] = vals[i][j];
            }
        }
        A
    }

    #[test]
    fn test_gemm() {
        let A = example_sym();
        let mut B = Matrix::<f64>::zeros((3, 3));
        B.set_identity();

        let mut C = Matrix::<f64>::zeros((3, 3));
        C.mul(&A, &B, 2.0, 0.0);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(C[(i, j)], 2.0 * A[(i, j)]);
            }
        }

        //transpose views
        let mut D = Matrix::<f64>::zeros((3, 3));
        D.mul(&A.t(), &A, 1.0, 0.0);
        let mut E = Matrix::<f64>::zeros((3, 3));
        E.syrk(&A, 1.0, 0.0); //A symmetric, so A*A' == A'*A
        for i in 0..3 {
            for j in 0..3 {
                assert!((D[(i, j)] - E[(i, j)]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_eigvals() {
        let mut A = example_sym();
        let mut eng = EigEngine::<f64>::new(3);
        eng.eigvals(&mut A);

        let trueλ = [-3.565507919110752, 1.47313296881958, 6.092374950291167];
        for (λ, t) in eng.λ.iter().zip(trueλ.iter()) {
            assert!((λ - t).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cholesky() {
        // A = example + shift to make it PD
        let mut A = example_sym();
        for i in 0..3 {
            A[(i, i)] += 5.0;
        }

        let mut chol = CholeskyEngine::<f64>::new(3);
        assert!(chol.factor(&A).is_ok());

        //L*L' should reproduce A
        let mut LLt = Matrix::<f64>::zeros((3, 3));
        LLt.syrk(&chol.L, 1.0, 0.0);
        for i in 0..3 {
            for j in 0..3 {
                assert!((LLt[(i, j)] - A[(i, j)]).abs() < 1e-12);
            }
        }

        //eigenvalue product agrees with logdet
        let mut eng = EigEngine::<f64>::new(3);
        let mut Awork = A.clone();
        eng.eigvals(&mut Awork);
        let logdet_eig: f64 = eng.λ.iter().map(|λ| λ.ln()).sum();
        assert!((chol.logdet() - logdet_eig).abs() < 1e-9);

        //indefinite input must fail
        let A = example_sym();
        assert!(chol.factor(&A).is_err());
    }

    #[test]
    fn test_svd() {
        let A = example_sym();
        let mut svd = SVDEngine::<f64>::new((3, 3));
        let mut Awork = A.clone();
        assert!(svd.factor(&mut Awork).is_ok());

        //reconstruct U*S*Vt
        let mut US = svd.U.clone();
        US.rscale(&svd.s);
        let mut R = Matrix::<f64>::zeros((3, 3));
        R.mul(&US, &svd.Vt, 1.0, 0.0);

        for i in 0..3 {
            for j in 0..3 {
                assert!((R[(i, j)] - A[(i, j)]).abs() < 1e-9);
            }
        }

        //singular values descending
        assert!(svd.s.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_svec_roundtrip() {
        let x = vec![1., 2., 3., 4., 5., 6.];
        let mut M = Matrix::<f64>::zeros((3, 3));
        svec_to_mat(&mut M, &x);

        let mut y = vec![0.; 6];
        mat_to_svec(&mut y, &M);
        assert!(x.dist(&y) < 1e-14);
    }
}
