#![allow(non_snake_case)]

//! LDLᵀ factorisation for symmetric quasidefinite matrices in upper
//! triangular CSC form, in the style of the QDLDL solver.  Fill reducing
//! orderings come from the `amd` crate; dynamic regularisation keeps
//! pivots away from zero with the expected signs of D.

use crate::algebra::*;
use core::cmp::{max, min};
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes from factor operations
#[derive(Error, Debug)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix has a zero column")]
    EmptyColumn,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix factorisation produced a zero pivot")]
    ZeroPivot,
    #[error("Invalid permutation vector")]
    InvalidPermutation,
}

/// Options for [`QDLDLFactors`](QDLDLFactors)
#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    /// scaling applied to the AMD dense-row threshold
    #[builder(default = "1.0")]
    amd_dense_scale: f64,
    /// user supplied ordering (AMD is used if none)
    #[builder(default = "None", setter(strip_option))]
    perm: Option<Vec<usize>>,
    /// symbolic factorisation only
    #[builder(default = "false")]
    logical: bool,
    /// expected signs of the elements of D
    #[builder(default = "None", setter(strip_option))]
    Dsigns: Option<Vec<i8>>,
    /// enable dynamic regularisation of near-zero pivots
    #[builder(default = "true")]
    regularize_enable: bool,
    /// pivot magnitude threshold for dynamic regularisation
    #[builder(default = "(1e-12).as_T()")]
    regularize_eps: T,
    /// replacement pivot magnitude for dynamic regularisation
    #[builder(default = "(1e-7).as_T()")]
    regularize_delta: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// LDLᵀ factorisation of a symmetric quasidefinite matrix
#[derive(Debug)]
pub struct QDLDLFactors<T = f64> {
    /// permutation vector
    pub perm: Vec<usize>,
    // inverse permutation.  Unused after construction since solves
    // use perm directly, but kept for callers that want it
    #[allow(dead_code)]
    iperm: Vec<usize>,
    /// lower triangular factor
    pub L: CscMatrix<T>,
    /// diagonal of D in A = LDLᵀ
    pub D: Vec<T>,
    /// inverse of the diagonal of D
    pub Dinv: Vec<T>,
    workspace: Workspace<T>,
    is_logical: bool,
}

impl<T> QDLDLFactors<T>
where
    T: FloatT,
{
    pub fn new(Ain: &CscMatrix<T>, opts: Option<QDLDLSettings<T>>) -> Result<Self, QDLDLError> {
        check_structure(Ain)?;
        _qdldl_new(Ain, opts)
    }

    /// Count of regularized pivots in the most recent factorisation.
    pub fn regularize_count(&self) -> usize {
        self.workspace.regularize_count
    }

    /// Solve `Ax = b` in place, with `x` replacing `b`.
    pub fn solve(&mut self, b: &mut [T]) {
        //solves are not possible on a logical factorisation
        assert!(!self.is_logical);
        assert_eq!(b.len(), self.D.len());

        let tmp = &mut self.workspace.fwork;
        permute(tmp, b, &self.perm);
        _solve(
            &self.L.colptr,
            &self.L.rowval,
            &self.L.nzval,
            &self.Dinv,
            tmp,
        );
        ipermute(b, tmp, &self.perm);
    }

    /// Overwrite entries of the internal (permuted) matrix copy.
    ///
    /// Indices are positions in the nonzero data of the matrix passed
    /// at construction.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (i, &idx) in indices.iter().enumerate() {
            nzval[AtoPAPt[idx]] = values[i];
        }
    }

    /// Scale entries of the internal (permuted) matrix copy.
    pub fn scale_values(&mut self, indices: &[usize], scale: T) {
        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for &idx in indices.iter() {
            nzval[AtoPAPt[idx]] *= scale;
        }
    }

    /// Add signed offsets to entries of the internal matrix copy.
    pub fn offset_values(&mut self, indices: &[usize], offset: T, signs: &[i8]) {
        assert_eq!(indices.len(), signs.len());

        let nzval = &mut self.workspace.triuA.nzval;
        let AtoPAPt = &self.workspace.AtoPAPt;

        for (&idx, &sign) in zip(indices, signs) {
            let sign: T = T::from_i8(sign).unwrap();
            nzval[AtoPAPt[idx]] += offset * sign;
        }
    }

    /// Refactor after values have been updated.  The sparsity pattern
    /// of the factors is unchanged.
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        // a numerical factorisation is implied even if the original
        // construction was logical only
        self.is_logical = false;
        _factor(
            &mut self.L,
            &mut self.D,
            &mut self.Dinv,
            &mut self.workspace,
            self.is_logical,
        )
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }

    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }

    //every column must have at least one entry
    if !A.colptr.windows(2).all(|c| c[0] < c[1]) {
        return Err(QDLDLError::EmptyColumn);
    }

    Ok(())
}

fn _qdldl_new<T: FloatT>(
    Ain: &CscMatrix<T>,
    opts: Option<QDLDLSettings<T>>,
) -> Result<QDLDLFactors<T>, QDLDLError> {
    let n = Ain.nrows();
    let opts = opts.unwrap_or_default();

    //AMD ordering unless one was supplied.  For no ordering at all
    //the caller passes (0..n).collect() explicitly
    let (perm, iperm);
    if let Some(_perm) = opts.perm {
        iperm = invperm(&_perm)?;
        perm = _perm;
    } else {
        (perm, iperm) = _get_amd_ordering(Ain, opts.amd_dense_scale);
    }

    //permute to another upper triangular matrix, recording the
    //mapping from input entries to the permuted entries
    let (A, AtoPAPt) = permute_symmetric(Ain, &iperm);

    //permuted sign pattern for D, all positive if unspecified
    let mut Dsigns = vec![1_i8; n];
    if let Some(ds) = opts.Dsigns {
        permute(&mut Dsigns, &ds, &perm);
    }

    let mut workspace = Workspace::<T>::new(
        A,
        AtoPAPt,
        Dsigns,
        opts.regularize_enable,
        opts.regularize_eps,
        opts.regularize_delta,
    )?;

    let sumLnz = workspace.Lnz.iter().sum();
    let mut L = CscMatrix::spalloc((n, n), sumLnz);
    let mut D = vec![T::zero(); n];
    let mut Dinv = vec![T::zero(); n];

    _factor(&mut L, &mut D, &mut Dinv, &mut workspace, opts.logical)?;

    Ok(QDLDLFactors {
        perm,
        iperm,
        L,
        D,
        Dinv,
        workspace,
        is_logical: opts.logical,
    })
}

#[derive(Debug)]
struct Workspace<T> {
    //elimination tree and per-column fill counts
    etree: Vec<usize>,
    Lnz: Vec<usize>,

    iwork: Vec<usize>,
    bwork: Vec<bool>,
    fwork: Vec<T>,

    //permuted triu copy of the factorisation target
    triuA: CscMatrix<T>,

    //map from entries of the input matrix to the permuted copy
    AtoPAPt: Vec<usize>,

    Dsigns: Vec<i8>,
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,
    regularize_count: usize,
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    fn new(
        triuA: CscMatrix<T>,
        AtoPAPt: Vec<usize>,
        Dsigns: Vec<i8>,
        regularize_enable: bool,
        regularize_eps: T,
        regularize_delta: T,
    ) -> Result<Self, QDLDLError> {
        let mut etree = vec![0; triuA.ncols()];
        let mut Lnz = vec![0; triuA.ncols()];
        let mut iwork = vec![0; triuA.ncols() * 3];
        let bwork = vec![false; triuA.ncols()];
        let fwork = vec![T::zero(); triuA.ncols()];

        _etree(
            triuA.nrows(),
            &triuA.colptr,
            &triuA.rowval,
            &mut iwork,
            &mut Lnz,
            &mut etree,
        )?;

        Ok(Self {
            etree,
            Lnz,
            iwork,
            bwork,
            fwork,
            triuA,
            AtoPAPt,
            Dsigns,
            regularize_enable,
            regularize_eps,
            regularize_delta,
            regularize_count: 0,
        })
    }
}

fn _factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    workspace: &mut Workspace<T>,
    logical: bool,
) -> Result<(), QDLDLError> {
    if logical {
        L.nzval.fill(T::zero());
        D.fill(T::zero());
        Dinv.fill(T::zero());
    }

    let A = &workspace.triuA;

    _factor_inner(
        A.n,
        &A.colptr,
        &A.rowval,
        &A.nzval,
        &mut L.colptr,
        &mut L.rowval,
        &mut L.nzval,
        D,
        Dinv,
        &workspace.Lnz,
        &workspace.etree,
        &mut workspace.bwork,
        &mut workspace.iwork,
        &mut workspace.fwork,
        logical,
        &workspace.Dsigns,
        workspace.regularize_enable,
        workspace.regularize_eps,
        workspace.regularize_delta,
        &mut workspace.regularize_count,
    )
}

const UNKNOWN: usize = usize::MAX;
const USED: bool = true;
const UNUSED: bool = false;

// Elimination tree of a quasidefinite matrix in compressed sparse
// column form.  Returns column counts in Lnz and parents in etree.
fn _etree(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    work: &mut [usize],
    Lnz: &mut [usize],
    etree: &mut [usize],
) -> Result<(), QDLDLError> {
    work.fill(0);
    Lnz.fill(0);
    etree.fill(UNKNOWN);

    for j in 0..n {
        work[j] = j;
        for istart in Ai.iter().take(Ap[j + 1]).skip(Ap[j]) {
            let mut i = *istart;

            while work[i] != j {
                if etree[i] == UNKNOWN {
                    etree[i] = j;
                }
                Lnz[i] += 1;
                work[i] = j;
                i = etree[i];
            }
        }
    }

    Ok(())
}

//arguments follow the structure of the reference C implementation
#[allow(clippy::too_many_arguments)]
fn _factor_inner<T: FloatT>(
    n: usize,
    Ap: &[usize],
    Ai: &[usize],
    Ax: &[T],
    Lp: &mut [usize],
    Li: &mut [usize],
    Lx: &mut [T],
    D: &mut [T],
    Dinv: &mut [T],
    Lnz: &[usize],
    etree: &[usize],
    bwork: &mut [bool],
    iwork: &mut [usize],
    fwork: &mut [T],
    logical_factor: bool,
    Dsigns: &[i8],
    regularize_enable: bool,
    regularize_eps: T,
    regularize_delta: T,
    regularize_count: &mut usize,
) -> Result<(), QDLDLError> {
    *regularize_count = 0;

    //partition the working memory
    let y_markers = bwork;
    let (y_idx, iwork) = iwork.split_at_mut(n);
    let (elim_buffer, next_colspace) = iwork.split_at_mut(n);
    let y_vals = fwork;

    //set Lp to cumsum(Lnz), starting from zero
    Lp[0] = 0;
    let mut acc = 0;
    for (Lp, Lnz) in zip(&mut Lp[1..], Lnz) {
        *Lp = acc + Lnz;
        acc = *Lp;
    }

    y_markers.fill(UNUSED);
    y_vals.fill(T::zero());
    D.fill(T::zero());
    next_colspace.copy_from_slice(&Lp[0..Lp.len() - 1]);

    if !logical_factor {
        //first element of D.  The upper LH corner has no elimination
        D[0] = Ax[0];
        if regularize_enable {
            let sign = T::from_i8(Dsigns[0]).unwrap();
            if D[0] * sign < regularize_eps {
                D[0] = regularize_delta * sign;
                *regularize_count += 1;
            }
        }

        if D[0] == T::zero() {
            return Err(QDLDLError::ZeroPivot);
        }
        Dinv[0] = T::recip(D[0]);
    }

    // for each k we compute a solution to y = L(0:(k-1),0:k-1)) \ b,
    // where b is the kth column of A above the diagonal.  The solution
    // y is the kth row of L, with an implied 1 at the diagonal
    for k in 1..n {
        //number of nonzeros in this row of L
        let mut nnz_y = 0;

        //decide where nonzeros will go in the kth row of L without
        //computing the actual values yet
        for i in Ap[k]..Ap[k + 1] {
            let bidx = Ai[i];

            //the diagonal entry seeds D[k] and is not part of the
            //elimination for the kth row
            if bidx == k {
                D[k] = Ax[i];
                continue;
            }

            y_vals[bidx] = Ax[i];

            //walk the elimination tree to find the entries that must
            //be eliminated after this element of b
            let next_idx = bidx;

            if y_markers[next_idx] == UNUSED {
                y_markers[next_idx] = USED;
                elim_buffer[0] = next_idx;
                let mut nnz_e = 1; //length of unvisited path from here

                let mut next_idx = etree[bidx];

                while next_idx != UNKNOWN && next_idx < k {
                    if y_markers[next_idx] == USED {
                        break;
                    }

                    y_markers[next_idx] = USED;
                    elim_buffer[nnz_e] = next_idx;
                    next_idx = etree[next_idx];
                    nnz_e += 1;
                }

                //put the buffered elimination list into the current
                //ordering in reverse
                while nnz_e != 0 {
                    nnz_e -= 1;
                    y_idx[nnz_y] = elim_buffer[nnz_e];
                    nnz_y += 1;
                }
            }
        }

        //place the values into the kth row
        for i in (0..nnz_y).rev() {
            let cidx = y_idx[i];
            let tmp_idx = next_colspace[cidx];

            if !logical_factor {
                let y_vals_cidx = y_vals[cidx];

                let (f, l) = (Lp[cidx], tmp_idx);
                unsafe {
                    //Safety : the Lij index comes from the rowval field
                    //of the factor L and is bounded by the dimension
                    for j in f..l {
                        let Lxj = *Lx.get_unchecked(j);
                        let Lij = *Li.get_unchecked(j);
                        *(y_vals.get_unchecked_mut(Lij)) -= Lxj * y_vals_cidx;
                    }
                }

                Lx[tmp_idx] = y_vals_cidx * Dinv[cidx];
                D[k] -= y_vals_cidx * Lx[tmp_idx];
            }

            Li[tmp_idx] = k;
            next_colspace[cidx] += 1;

            //reset the sparse scatter for the next row
            y_vals[cidx] = T::zero();
            y_markers[cidx] = UNUSED;
        }

        if regularize_enable {
            let sign = T::from_i8(Dsigns[k]).unwrap();
            if D[k] * sign < regularize_eps {
                D[k] = regularize_delta * sign;
                *regularize_count += 1;
            }
        }

        //a zero pivot means the matrix cannot be factored
        if D[k] == T::zero() {
            return Err(QDLDLError::ZeroPivot);
        }

        Dinv[k] = T::recip(D[k]);
    }

    Ok(())
}

// -------------------------------------
// triangular solves with unchecked indexing.
//
// Safety : the colptr values in Lp are bounded by the lengths of the
// Lx and Li arrays, and x is compatible with the row indices in Li
// -------------------------------------

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    unsafe {
        for i in 0..x.len() {
            let xi = *x.get_unchecked(i);
            let f = *Lp.get_unchecked(i);
            let l = *Lp.get_unchecked(i + 1);
            for j in f..l {
                let Lxj = *Lx.get_unchecked(j);
                let Lij = *Li.get_unchecked(j);
                *(x.get_unchecked_mut(Lij)) -= Lxj * xi;
            }
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    unsafe {
        for i in (0..x.len()).rev() {
            let mut s = T::zero();
            let f = *Lp.get_unchecked(i);
            let l = *Lp.get_unchecked(i + 1);
            for j in f..l {
                let Lxj = *Lx.get_unchecked(j);
                let Lij = *Li.get_unchecked(j);
                s += Lxj * (*x.get_unchecked(Lij));
            }
            *x.get_unchecked_mut(i) -= s;
        }
    }
}

// Solves Ax = b given LDL factors of A, with x replacing b
fn _solve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], Dinv: &[T], b: &mut [T]) {
    _lsolve(Lp, Li, Lx, b);
    zip(b.iter_mut(), Dinv).for_each(|(b, d)| *b *= *d);
    _ltsolve(Lp, Li, Lx, b);
}

// Construct an inverse permutation from a permutation
fn invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let mut b = vec![0; p.len()];

    for (i, j) in p.iter().enumerate() {
        if *j < p.len() && b[*j] == 0 {
            b[*j] = i;
        } else {
            return Err(QDLDLError::InvalidPermutation);
        }
    }
    Ok(b)
}

// allocation free permutation and inverse permutation

pub(crate) fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

pub(crate) fn ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Given a sparse symmetric matrix A (upper triangular entries only),
// return the permuted matrix PAP' (also upper triangular) for the
// inverse permutation iperm, together with an entry map from A.
//
// Follows: Timothy Davis, Direct Methods for Sparse Linear Systems
fn permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.ncols();
    let mut P = CscMatrix::<T>::spalloc((n, n), A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    let Ar = &A.rowval;
    let Ac = &A.colptr;
    let Av = &A.nzval;

    // 1. count the entries each column of P will receive,
    // keeping the row permutation in mind
    let mut num_entries = vec![0; n];
    for colA in 0..n {
        let colP = iperm[colA];
        for rowA in Ar.iter().take(Ac[colA + 1]).skip(Ac[colA]) {
            let rowP = iperm[*rowA];
            if *rowA <= colA {
                //entry stays in the upper triangle of whichever
                //column index is larger after permutation
                let col_idx = max(rowP, colP);
                num_entries[col_idx] += 1;
            }
        }
    }

    // 2. cumulative sum into the column pointers of P
    P.colptr[0] = 0;
    let mut acc = 0;
    for (Pckp1, ne) in zip(&mut P.colptr[1..], &num_entries) {
        *Pckp1 = acc + ne;
        acc = *Pckp1;
    }
    //reuse as a cursor of free slots per column
    num_entries.copy_from_slice(&P.colptr[0..n]);
    let mut row_starts = num_entries;

    // 3. place the permuted entries
    for colA in 0..n {
        let colP = iperm[colA];
        for rowA_idx in Ac[colA]..Ac[colA + 1] {
            let rowA = Ar[rowA_idx];
            if rowA <= colA {
                let rowP = iperm[rowA];
                let col_idx = max(colP, rowP);

                //columns of P come out with unsorted rows
                let rowP_idx = row_starts[col_idx];
                P.rowval[rowP_idx] = min(colP, rowP);
                P.nzval[rowP_idx] = Av[rowA_idx];
                AtoPAPt[rowA_idx] = rowP_idx;
                row_starts[col_idx] += 1;
            }
        }
    }

    (P, AtoPAPt)
}

fn _get_amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> (Vec<usize>, Vec<usize>) {
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control).unwrap();
    (perm, iperm)
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // quasidefinite, with diagonal signs (+,+,-,-)
    fn test_matrix_4x4() -> (CscMatrix<f64>, Vec<i8>) {
        // A = [ 4.  1.  0.  1.]
        //     [ 1.  5.  2.  0.]
        //     [ 0.  2. -6.  1.]
        //     [ 1.  0.  1. -7.]  held as triu
        let A = CscMatrix::new(
            4,
            4,
            vec![0, 1, 3, 5, 8],
            vec![0, 0, 1, 1, 2, 0, 2, 3],
            vec![4., 1., 5., 2., -6., 1., 1., -7.],
        );
        (A, vec![1, 1, -1, -1])
    }

    fn qd_opts(Dsigns: Vec<i8>, logical: bool) -> QDLDLSettings<f64> {
        QDLDLSettingsBuilder::<f64>::default()
            .Dsigns(Dsigns)
            .logical(logical)
            .build()
            .unwrap()
    }

    fn residual_inf(A: &CscMatrix<f64>, x: &[f64], b: &[f64]) -> f64 {
        let mut r = b.to_vec();
        A.sym().symv(&mut r, x, -1.0, 1.0);
        r.norm_inf()
    }

    #[test]
    fn test_factor_and_solve_spd() {
        // positive definite, so the default settings apply directly
        let A = CscMatrix::new(
            3,
            3,
            vec![0, 1, 3, 5],
            vec![0, 0, 1, 1, 2],
            vec![4., 1., 3., 1., 5.],
        );
        let mut factors = QDLDLFactors::<f64>::new(&A, None).unwrap();

        let b = vec![1., 2., 3.];
        let mut x = b.clone();
        factors.solve(&mut x);

        assert!(residual_inf(&A, &x, &b) < 1e-12);
    }

    #[test]
    fn test_factor_and_solve_quasidefinite() {
        let (A, signs) = test_matrix_4x4();
        let mut factors = QDLDLFactors::<f64>::new(&A, Some(qd_opts(signs, false))).unwrap();

        let b = vec![1., 2., 3., 4.];
        let mut x = b.clone();
        factors.solve(&mut x);

        assert!(residual_inf(&A, &x, &b) < 1e-12);
    }

    #[test]
    fn test_update_and_refactor() {
        let (A, signs) = test_matrix_4x4();
        //logical first, numeric values arrive only via refactor
        let mut factors = QDLDLFactors::<f64>::new(&A, Some(qd_opts(signs, true))).unwrap();
        factors.refactor().unwrap();

        let b = vec![1., 2., 3., 4.];
        let mut x = b.clone();
        factors.solve(&mut x);
        assert!(residual_inf(&A, &x, &b) < 1e-12);

        //scale every entry of A by 2 and refactor.  The solution
        //should halve
        let all: Vec<usize> = (0..A.nnz()).collect();
        factors.scale_values(&all, 2.0);
        factors.refactor().unwrap();

        let mut x2 = b.clone();
        factors.solve(&mut x2);
        for (v1, v2) in zip(&x, &x2) {
            assert!((0.5 * v1 - v2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_update_idempotence() {
        let (A, signs) = test_matrix_4x4();
        let mut factors = QDLDLFactors::<f64>::new(&A, Some(qd_opts(signs, false))).unwrap();

        let b = vec![-1., 1., -1., 1.];
        let mut x1 = b.clone();
        factors.solve(&mut x1);

        //rewriting the currently stored values must leave the
        //factorisation unchanged
        let all: Vec<usize> = (0..A.nnz()).collect();
        factors.update_values(&all, &A.nzval);
        factors.refactor().unwrap();

        let mut x2 = b.clone();
        factors.solve(&mut x2);
        assert!(x1.dist(&x2) < 1e-15);
    }

    #[test]
    fn test_zero_pivot() {
        // singular 2x2 with regularisation disabled
        let A = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1., 1., 1.]);
        let opts = QDLDLSettingsBuilder::<f64>::default()
            .regularize_enable(false)
            .build()
            .unwrap();

        assert!(matches!(
            QDLDLFactors::<f64>::new(&A, Some(opts)),
            Err(QDLDLError::ZeroPivot)
        ));
    }
}
