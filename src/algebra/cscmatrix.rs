#![allow(non_snake_case)]

use super::{FloatT, VectorMath};
use std::iter::zip;
use thiserror::Error;

/// Error codes from sparse format checking
#[derive(Error, Debug)]
pub enum SparseFormatError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Data is not sorted by row index within each column")]
    BadRowval,
    #[error("Column pointers are not monotonically increasing")]
    BadColptr,
}

/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone)]
pub enum MatrixShape {
    /// Normal orientation
    N,
    /// Transposed orientation
    T,
}

/// Triangle marker for symmetric matrices held as one triangle
#[derive(PartialEq, Eq, Copy, Clone)]
pub enum MatrixTriangle {
    /// Upper triangle
    Triu,
    /// Lower triangle
    Tril,
}

/// Lazy transpose view of a matrix
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// Symmetric view of a matrix held as its upper triangle
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : to construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use conix::algebra::CscMatrix;
///
/// let A : CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 // colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        // rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], // nzval
///  );
///
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointers, length `n+1`; the final entry is the nonzero count
    pub colptr: Vec<usize>,
    /// row indices
    pub rowval: Vec<usize>,
    /// nonzero values
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  Does __not__ check that row indices are in bounds or in
    /// increasing order within each column; use
    /// [`check_format`](CscMatrix::check_format) for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// Allocate an `m` x `n` matrix with space for `nnz` structural entries.
    pub fn spalloc(size: (usize, usize), nnz: usize) -> Self {
        let (m, n) = size;
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// A matrix of zeros (no structural entries).
    pub fn zeros(size: (usize, usize)) -> Self {
        Self::spalloc(size, 0)
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of rows
    pub fn nrows(&self) -> usize {
        self.m
    }
    /// number of columns
    pub fn ncols(&self) -> usize {
        self.n
    }
    /// dimensions as a tuple
    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }
    /// true if square
    pub fn is_square(&self) -> bool {
        self.m == self.n
    }
    /// number of structural nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transpose view
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// symmetric view of a matrix held as its upper triangle
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check that the matrix data is well formed.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowval);
            }
        }
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// True if no structural entries appear below the diagonal.
    pub fn is_triu(&self) -> bool {
        for col in 0..self.n {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            if self.rowval[first..last].iter().any(|&row| row > col) {
                return false;
            }
        }
        true
    }

    /// New matrix keeping only entries on or above the diagonal.
    ///
    /// Assumes rows are sorted within each column.
    pub fn to_triu(&self) -> Self {
        assert_eq!(self.m, self.n);
        let (m, n) = (self.m, self.n);
        let mut colptr = vec![0; n + 1];
        let mut nnz = 0;

        for col in 0..n {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            let rows = &self.rowval[first..last];
            colptr[col + 1] = rows.iter().filter(|&row| *row <= col).count();
            nnz += colptr[col + 1];
        }

        let mut rowval = vec![0; nnz];
        let mut nzval = vec![T::zero(); nnz];

        for col in 0..n {
            let ntriu = colptr[col + 1];
            let fdest = colptr[col];
            let ldest = fdest + ntriu;
            let fsrc = self.colptr[col];
            let lsrc = fsrc + ntriu;

            rowval[fdest..ldest].copy_from_slice(&self.rowval[fsrc..lsrc]);
            nzval[fdest..ldest].copy_from_slice(&self.nzval[fsrc..lsrc]);
            colptr[col + 1] = ldest;
        }
        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Horizontal concatenation `[A B]`.
    pub fn hcat(A: &Self, B: &Self) -> Self {
        assert_eq!(A.m, B.m);

        let mut C = CscMatrix::spalloc((A.m, A.n + B.n), A.nnz() + B.nnz());
        let mut amap = vec![0usize; A.nnz()];
        let mut bmap = vec![0usize; B.nnz()];

        C.colcount_block(A, 0, MatrixShape::N);
        C.colcount_block(B, A.n, MatrixShape::N);
        C.colcount_to_colptr();

        C.fill_block(A, &mut amap, 0, 0, MatrixShape::N);
        C.fill_block(B, &mut bmap, 0, A.n, MatrixShape::N);
        C.backshift_colptrs();
        C
    }

    /// Vertical concatenation `[A; B]`.
    pub fn vcat(A: &Self, B: &Self) -> Self {
        assert_eq!(A.n, B.n);

        let mut C = CscMatrix::spalloc((A.m + B.m, A.n), A.nnz() + B.nnz());
        let mut amap = vec![0usize; A.nnz()];
        let mut bmap = vec![0usize; B.nnz()];

        C.colcount_block(A, 0, MatrixShape::N);
        C.colcount_block(B, 0, MatrixShape::N);
        C.colcount_to_colptr();

        C.fill_block(A, &mut amap, 0, 0, MatrixShape::N);
        C.fill_block(B, &mut bmap, A.m, 0, MatrixShape::N);
        C.backshift_colptrs();
        C
    }

    /// Elementwise scaling of all nonzeros.
    pub fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    /// Elementwise negation of all nonzeros.
    pub fn negate(&mut self) {
        self.nzval.negate();
    }

    /// Left multiply by `Diagonal(l)`.
    pub fn lscale(&mut self, l: &[T]) {
        for (val, row) in zip(&mut self.nzval, &self.rowval) {
            *val *= l[*row];
        }
    }

    /// Right multiply by `Diagonal(r)`.
    pub fn rscale(&mut self, r: &[T]) {
        assert_eq!(self.nzval.len(), *self.colptr.last().unwrap());
        for i in 0..self.n {
            self.nzval[self.colptr[i]..self.colptr[i + 1]].scale(r[i]);
        }
    }

    /// Two sided diagonal scaling `A = Diagonal(l)*A*Diagonal(r)`.
    pub fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(self.nzval.len(), *self.colptr.last().unwrap());

        for (col, &ri) in r.iter().enumerate() {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];

            for (val, row) in zip(vals, rows) {
                *val *= l[*row] * ri;
            }
        }
    }

    /// Columnwise infinity norms, assigned to `norms`.
    pub fn col_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_no_reset(norms);
    }

    /// Columnwise infinity norms without resetting `norms` first.
    pub fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.colptr.len() - 1);

        for (i, v) in norms.iter_mut().enumerate() {
            *v = self.nzval[self.colptr[i]..self.colptr[i + 1]]
                .iter()
                .fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    /// Columnwise infinity norms of a symmetric matrix held as one triangle.
    pub fn col_norms_sym(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_sym_no_reset(norms);
    }

    /// As [`col_norms_sym`](CscMatrix::col_norms_sym), without reset.
    pub fn col_norms_sym_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.colptr.len() - 1);

        for i in 0..norms.len() {
            for j in self.colptr[i]..self.colptr[i + 1] {
                let tmp = T::abs(self.nzval[j]);
                let r = self.rowval[j];
                norms[i] = T::max(norms[i], tmp);
                norms[r] = T::max(norms[r], tmp);
            }
        }
    }

    /// Rowwise infinity norms, assigned to `norms`.
    pub fn row_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.row_norms_no_reset(norms);
    }

    /// Rowwise infinity norms without resetting `norms` first.
    pub fn row_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(self.rowval.len(), *self.colptr.last().unwrap());

        for (row, val) in zip(&self.rowval, &self.nzval) {
            norms[*row] = T::max(norms[*row], T::abs(*val));
        }
    }

    /// BLAS-like product `y = a*A*x + b*y`.
    pub fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }

    /// Quadratic form `y'*M*x` for a symmetric `M` held as its upper triangle.
    pub fn quad_form(&self, y: &[T], x: &[T]) -> T {
        _csc_quad_form(self, y, x)
    }

    /// Count of structural entries on the diagonal.
    pub(crate) fn count_diagonal_entries(&self) -> usize {
        let mut count = 0;
        for i in 0..self.n {
            // the last entry in a column of sorted triu data is the
            // diagonal entry, if the column has one at all
            if self.colptr[i + 1] != self.colptr[i] && self.rowval[self.colptr[i + 1] - 1] == i {
                count += 1;
            }
        }
        count
    }
}

impl<'a, T> Adjoint<'a, CscMatrix<T>>
where
    T: FloatT,
{
    /// BLAS-like product `y = a*A'*x + b*y`.
    pub fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<'a, T> Symmetric<'a, CscMatrix<T>>
where
    T: FloatT,
{
    /// BLAS-like product `y = a*A*x + b*y` with `A` symmetric and
    /// stored as its upper triangle.
    pub fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

// construction from row-major dense data, for tests and doc examples
impl<T, const R: usize, const C: usize> From<&[[T; C]; R]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; C]; R]) -> CscMatrix<T> {
        let nnz = rows.iter().flatten().filter(|&&v| v != T::zero()).count();
        let mut A = CscMatrix::spalloc((R, C), nnz);

        let mut ptr = 0;
        for col in 0..C {
            A.colptr[col] = ptr;
            for (row, vals) in rows.iter().enumerate() {
                if vals[col] != T::zero() {
                    A.rowval[ptr] = row;
                    A.nzval[ptr] = vals[col];
                    ptr += 1;
                }
            }
        }
        A.colptr[C] = ptr;
        A
    }
}

fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    y.scale(b);

    assert!(x.len() == A.n);
    assert!(y.len() == A.n);
    assert!(A.n == A.m);

    for (col, &xcol) in x.iter().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];

        for j in first..last {
            let row = A.rowval[j];
            let Aij = A.nzval[j];
            y[row] += a * Aij * xcol;

            if row != col {
                //don't double count the diagonal
                y[col] += a * Aij * x[row];
            }
        }
    }
}

fn _csc_quad_form<T: FloatT>(M: &CscMatrix<T>, y: &[T], x: &[T]) -> T {
    assert_eq!(M.n, M.m);
    assert_eq!(x.len(), M.n);
    assert_eq!(y.len(), M.n);

    let mut out = T::zero();

    for col in 0..M.n {
        let mut tmp1 = T::zero();
        let mut tmp2 = T::zero();

        let first = M.colptr[col];
        let last = M.colptr[col + 1];

        for j in first..last {
            let Mv = M.nzval[j];
            let row = M.rowval[j];

            if row < col {
                tmp1 += Mv * x[row];
                tmp2 += Mv * y[row];
            } else if row == col {
                out += Mv * x[col] * y[col];
            } else {
                panic!("matrix data must be upper triangular");
            }
        }
        out += tmp1 * y[col] + tmp2 * x[col];
    }
    out
}

fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //y = b*y
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == -T::one() {
        y.negate();
    } else if b != T::one() {
        y.scale(b);
    }

    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.n);

    //y += a*A*x
    for (j, xj) in x.iter().enumerate() {
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += a * A.nzval[i] * *xj;
        }
    }
}

fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    //y = b*y
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == -T::one() {
        y.negate();
    } else if b != T::one() {
        y.scale(b);
    }

    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.m);

    //y += a*A'*x
    for (j, yj) in y.iter_mut().enumerate().take(A.n) {
        for k in A.colptr[j]..A.colptr[j + 1] {
            *yj += a * A.nzval[k] * x[A.rowval[k]];
        }
    }
}

//---------------------------------------------------------
// low level utilities for counting and filling entries in
// block partitioned sparse matrices.  Used by KKT assembly.
//---------------------------------------------------------

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    // increment colptr by the number of nonzeros in a dense
    // upper/lower triangle placed on the diagonal
    pub(crate) fn colcount_dense_triangle(
        &mut self,
        initcol: usize,
        blockcols: usize,
        shape: MatrixTriangle,
    ) {
        let cols = self.colptr[initcol..(initcol + blockcols)].iter_mut();
        let counts = 1..(blockcols + 1);
        match shape {
            MatrixTriangle::Triu => {
                zip(cols, counts).for_each(|(x, c)| *x += c);
            }
            MatrixTriangle::Tril => {
                zip(cols, counts.rev()).for_each(|(x, c)| *x += c);
            }
        }
    }

    // increment colptr by the number of nonzeros in a square
    // diagonal block placed on the diagonal
    pub(crate) fn colcount_diag(&mut self, initcol: usize, blockcols: usize) {
        let cols = self.colptr[initcol..(initcol + blockcols)].iter_mut();
        cols.for_each(|x| *x += 1);
    }

    // as colcount_diag, but counting only places where the square
    // triu matrix M has a missing diagonal entry
    pub(crate) fn colcount_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        assert_eq!(M.colptr.len(), M.n + 1);
        assert!(self.colptr.len() >= M.n + initcol);

        for i in 0..M.n {
            if M.colptr[i] == M.colptr[i + 1]              // empty column
                || M.rowval[M.colptr[i + 1] - 1] != i
            // last entry is not on the diagonal
            {
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // account for a column vector partially populating one column
    pub(crate) fn colcount_colvec(&mut self, n: usize, _firstrow: usize, firstcol: usize) {
        self.colptr[firstcol] += n;
    }

    // account for a row vector spread across n consecutive columns
    pub(crate) fn colcount_rowvec(&mut self, n: usize, _firstrow: usize, firstcol: usize) {
        let cols = self.colptr[firstcol..(firstcol + n)].iter_mut();
        cols.for_each(|x| *x += 1);
    }

    // increment colptr by the entry counts of M (or its transpose)
    pub(crate) fn colcount_block(&mut self, M: &CscMatrix<T>, initcol: usize, shape: MatrixShape) {
        match shape {
            MatrixShape::T => {
                for row in M.rowval.iter() {
                    self.colptr[initcol + row] += 1;
                }
            }
            MatrixShape::N => {
                for i in 0..M.n {
                    self.colptr[initcol + i] += M.colptr[i + 1] - M.colptr[i];
                }
            }
        }
    }

    // fill a partial column with structural zeros, using colptr as
    // the next-free-slot cursor per column
    pub(crate) fn fill_colvec(&mut self, vtoKKT: &mut [usize], initrow: usize, initcol: usize) {
        for (i, v) in vtoKKT.iter_mut().enumerate() {
            let dest = self.colptr[initcol];
            self.rowval[dest] = initrow + i;
            self.nzval[dest] = T::zero();
            *v = dest;
            self.colptr[initcol] += 1;
        }
    }

    // fill a partial row with structural zeros
    pub(crate) fn fill_rowvec(&mut self, vtoKKT: &mut [usize], initrow: usize, initcol: usize) {
        for (i, v) in vtoKKT.iter_mut().enumerate() {
            let col = initcol + i;
            let dest = self.colptr[col];
            self.rowval[dest] = initrow;
            self.nzval[dest] = T::zero();
            *v = dest;
            self.colptr[col] += 1;
        }
    }

    // fill values from M (or its transpose), recording the
    // destination of every entry of M into MtoKKT
    pub(crate) fn fill_block(
        &mut self,
        M: &CscMatrix<T>,
        MtoKKT: &mut [usize],
        initrow: usize,
        initcol: usize,
        shape: MatrixShape,
    ) {
        for i in 0..M.n {
            for j in M.colptr[i]..M.colptr[i + 1] {
                let (row, col) = match shape {
                    MatrixShape::T => (i + initrow, M.rowval[j] + initcol),
                    MatrixShape::N => (M.rowval[j] + initrow, i + initcol),
                };
                let dest = self.colptr[col];
                self.rowval[dest] = row;
                self.nzval[dest] = M.nzval[j];
                self.colptr[col] += 1;
                MtoKKT[j] = dest;
            }
        }
    }

    // fill a dense triangle on the diagonal with structural zeros
    pub(crate) fn fill_dense_triangle(
        &mut self,
        blocktoKKT: &mut [usize],
        offset: usize,
        blockdim: usize,
        shape: MatrixTriangle,
    ) {
        // the data to be written later is always triu, so a tril
        // target takes the transposed fill pattern
        match shape {
            MatrixTriangle::Triu => {
                let mut kidx = 0;
                for col in offset..(offset + blockdim) {
                    for row in offset..=col {
                        let dest = self.colptr[col];
                        self.rowval[dest] = row;
                        self.nzval[dest] = T::zero();
                        self.colptr[col] += 1;
                        blocktoKKT[kidx] = dest;
                        kidx += 1;
                    }
                }
            }
            MatrixTriangle::Tril => {
                let mut kidx = 0;
                for row in offset..(offset + blockdim) {
                    for col in offset..=row {
                        let dest = self.colptr[col];
                        self.rowval[dest] = row;
                        self.nzval[dest] = T::zero();
                        self.colptr[col] += 1;
                        blocktoKKT[kidx] = dest;
                        kidx += 1;
                    }
                }
            }
        }
    }

    // fill a diagonal block with structural zeros
    pub(crate) fn fill_diag(&mut self, diagtoKKT: &mut [usize], offset: usize, blockdim: usize) {
        for (i, col) in (offset..(offset + blockdim)).enumerate() {
            let dest = self.colptr[col];
            self.rowval[dest] = col;
            self.nzval[dest] = T::zero();
            self.colptr[col] += 1;
            diagtoKKT[i] = dest;
        }
    }

    // as fill_diag, but only where the square triu matrix M has a
    // missing diagonal entry
    pub(crate) fn fill_missing_diag(&mut self, M: &CscMatrix<T>, initcol: usize) {
        for i in 0..M.n {
            if M.colptr[i] == M.colptr[i + 1] || M.rowval[M.colptr[i + 1] - 1] != i {
                let dest = self.colptr[i + initcol];
                self.rowval[dest] = i + initcol;
                self.nzval[dest] = T::zero();
                self.colptr[i + initcol] += 1;
            }
        }
    }

    // convert per-column counts held in colptr into cumulative offsets
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // colptr entries were advanced during filling; shift them back
    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        // A = [1.  3.  5.]
        //     [2.  0.  6.]
        //     [0.  4.  7.]
        CscMatrix::new(
            3,
            3,
            vec![0, 2, 4, 7],
            vec![0, 1, 0, 2, 0, 1, 2],
            vec![1., 2., 3., 4., 5., 6., 7.],
        )
    }

    #[test]
    fn test_gemv() {
        let A = test_matrix();
        let x = vec![1., 2., 3.];
        let mut y = vec![1., 1., 1.];

        A.gemv(&mut y, &x, 2.0, 1.0);
        assert_eq!(y, vec![45., 41., 59.]);

        let mut y = vec![1., -1., 1.];
        A.t().gemv(&mut y, &x, 1.0, -1.0);
        assert_eq!(y, vec![4., 16., 37.]);
    }

    #[test]
    fn test_symv_and_quad_form() {
        // S = [1. 2. 0]
        //     [2. 3. 4.]
        //     [0. 4. 5.]  held as triu
        let S = CscMatrix::new(
            3,
            3,
            vec![0, 1, 3, 5],
            vec![0, 0, 1, 1, 2],
            vec![1., 2., 3., 4., 5.],
        );

        let x = vec![1., 2., 3.];
        let mut y = vec![0.; 3];
        S.sym().symv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![5., 20., 23.]);

        assert_eq!(S.quad_form(&x, &x), x.dot(&y));
    }

    #[test]
    fn test_from_dense() {
        let A = CscMatrix::from(&[
            [1., 3., 5.], //
            [2., 0., 6.], //
            [0., 4., 7.], //
        ]);
        assert_eq!(A, test_matrix());
        assert!(A.check_format().is_ok());
    }

    #[test]
    fn test_to_triu() {
        let A = CscMatrix::from(&[
            [1., 2.], //
            [3., 4.], //
        ]);
        let B = CscMatrix::from(&[
            [1., 2.], //
            [0., 4.], //
        ]);
        assert!(!A.is_triu());
        assert_eq!(A.to_triu(), B);
    }

    #[test]
    fn test_vcat_hcat() {
        let I: CscMatrix<f64> = CscMatrix::identity(2);
        let V = CscMatrix::vcat(&I, &I);
        assert_eq!(V.size(), (4, 2));
        assert_eq!(V.nnz(), 4);

        let H = CscMatrix::hcat(&I, &I);
        assert_eq!(H.size(), (2, 4));
        assert_eq!(H.nnz(), 4);
    }
}
