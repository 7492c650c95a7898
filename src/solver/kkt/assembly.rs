#![allow(non_snake_case)]

use super::datamap::*;
use crate::algebra::*;
use crate::solver::cones::*;

// Assemble the KKT matrix
//
//   [ P     A'      sparse cols ]
//   [ A   -Hs       sparse cols ]
//   [ .     .       sparse diag ]
//
// as one triangle in CSC form, together with the index map from every
// logical data slot into the nonzero values.  Hs blocks, expansion
// columns and the extended diagonal are filled with structural zeros
// here and receive values on each scaling update.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    cones: &ConeSet<T>,
    shape: MatrixTriangle,
) -> (CscMatrix<T>, KKTDataMap) {
    let mut map = KKTDataMap::new(P, A, cones);
    let (m, n) = A.size();
    let p = map.pdim();

    //entries actually on the diagonal of P
    let nnz_diagP = P.count_diagonal_entries();

    //total entries in the Hs blocks
    let nnz_Hsblocks = map.Hsblocks.len();

    //entries in the expansion columns of the sparse expandable cones
    let nnz_SOC_vecs = map.SOC_u.iter().fold(0, |acc, block| acc + 2 * block.len());
    let nnz_GenPow_vecs = map.GenPow_p.iter().fold(0, |acc, block| acc + block.len())
        + map.GenPow_q.iter().fold(0, |acc, block| acc + block.len())
        + map.GenPow_r.iter().fold(0, |acc, block| acc + block.len());

    let nnzKKT = P.nnz() +       // nonzeros in P
    n -                          // diagonal of the upper left block
    nnz_diagP +                  // remove the double count where P has diagonal entries
    A.nnz() +                    // nonzeros in A
    nnz_Hsblocks +               // Hs blocks below A'
    nnz_SOC_vecs +               // SOC expansion columns
    nnz_GenPow_vecs +            // GenPow expansion columns
    p; // extended diagonal of the expansion block

    let mut K = CscMatrix::<T>::spalloc((m + n + p, m + n + p), nnzKKT);

    _kkt_assemble_colcounts(&mut K, P, A, cones, &map, shape);
    _kkt_assemble_fill(&mut K, P, A, cones, &mut map, shape);

    (K, map)
}

fn _kkt_assemble_colcounts<T: FloatT>(
    K: &mut CscMatrix<T>,
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    cones: &ConeSet<T>,
    map: &KKTDataMap,
    shape: MatrixTriangle,
) {
    let (m, n) = A.size();
    let p_socs = map.SOC_D.len();

    //K.colptr holds nonzero counts per column during assembly
    K.colptr.fill(0);

    match shape {
        MatrixTriangle::Triu => {
            K.colcount_block(P, 0, MatrixShape::N);
            K.colcount_missing_diag(P, 0);
            K.colcount_block(A, n, MatrixShape::T);
        }
        MatrixTriangle::Tril => {
            K.colcount_missing_diag(P, 0);
            K.colcount_block(P, 0, MatrixShape::T);
            K.colcount_block(A, 0, MatrixShape::N);
        }
    }

    //Hs blocks in the lower right
    for (i, cone) in cones.iter().enumerate() {
        let firstcol = cones.rng_cones[i].start + n;
        let blockdim = cone.numel();
        if cone.Hs_is_diagonal() {
            K.colcount_diag(firstcol, blockdim);
        } else {
            K.colcount_dense_triangle(firstcol, blockdim, shape);
        }
    }

    //expansion columns for the sparse expandable SOCs
    let mut socidx = 0;
    for (i, cone) in cones.iter().enumerate() {
        if let ConeImpl::SecondOrderCone(SOC) = cone {
            if !SOC.is_sparse_expandable() {
                continue;
            }
            let nvars = SOC.numel();
            let headidx = cones.rng_cones[i].start;
            let col = m + n + 2 * socidx;

            match shape {
                MatrixTriangle::Triu => {
                    K.colcount_colvec(nvars, headidx + n, col); //v column
                    K.colcount_colvec(nvars, headidx + n, col + 1); //u column
                }
                MatrixTriangle::Tril => {
                    K.colcount_rowvec(nvars, col, headidx + n); //v row
                    K.colcount_rowvec(nvars, col + 1, headidx + n); //u row
                }
            }
            socidx += 1;
        }
    }
    K.colcount_diag(n + m, p_socs);

    //expansion columns for the generalized power cones
    let mut genpowidx = 0;
    for (i, cone) in cones.iter().enumerate() {
        if let ConeImpl::GenPowerCone(GenPow) = cone {
            let nvars = GenPow.numel();
            let dim1 = GenPow.dim1();
            let dim2 = GenPow.dim2();
            let headidx = cones.rng_cones[i].start;
            let col = m + n + p_socs + 3 * genpowidx;

            match shape {
                MatrixTriangle::Triu => {
                    K.colcount_colvec(dim1, headidx + n, col); //q column
                    K.colcount_colvec(dim2, headidx + n + dim1, col + 1); //r column
                    K.colcount_colvec(nvars, headidx + n, col + 2); //p column
                }
                MatrixTriangle::Tril => {
                    K.colcount_rowvec(dim1, col, headidx + n); //q row
                    K.colcount_rowvec(dim2, col + 1, headidx + n + dim1); //r row
                    K.colcount_rowvec(nvars, col + 2, headidx + n); //p row
                }
            }
            genpowidx += 1;
        }
    }
    K.colcount_diag(n + m + p_socs, 3 * genpowidx);
}

fn _kkt_assemble_fill<T: FloatT>(
    K: &mut CscMatrix<T>,
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    cones: &ConeSet<T>,
    map: &mut KKTDataMap,
    shape: MatrixTriangle,
) {
    let (m, n) = A.size();
    let p_socs = map.SOC_D.len();
    let p_genpows = map.GenPow_D.len();

    //cumsum the counts to convert K.colptr to offsets
    K.colcount_to_colptr();

    match shape {
        MatrixTriangle::Triu => {
            K.fill_block(P, &mut map.P, 0, 0, MatrixShape::N);
            K.fill_missing_diag(P, 0); //after P, since triu form
            //A' goes in the top right
            K.fill_block(A, &mut map.A, 0, n, MatrixShape::T);
        }
        MatrixTriangle::Tril => {
            K.fill_missing_diag(P, 0); //before P, since tril form
            K.fill_block(P, &mut map.P, 0, 0, MatrixShape::T);
            //A goes in the bottom left
            K.fill_block(A, &mut map.A, n, 0, MatrixShape::N);
        }
    }

    //Hs blocks in the lower right
    for (i, cone) in cones.iter().enumerate() {
        let firstcol = cones.rng_cones[i].start + n;
        let blockdim = cone.numel();
        let block = &mut map.Hsblocks[cones.rng_blocks[i].clone()];
        if cone.Hs_is_diagonal() {
            K.fill_diag(block, firstcol, blockdim);
        } else {
            K.fill_dense_triangle(block, firstcol, blockdim, shape);
        }
    }

    //expansion columns for the sparse expandable SOCs.
    //NB: v is the first extra column, u the second
    let mut socidx = 0;
    for (i, cone) in cones.iter().enumerate() {
        if let ConeImpl::SecondOrderCone(SOC) = cone {
            if !SOC.is_sparse_expandable() {
                continue;
            }
            let headidx = cones.rng_cones[i].start;
            let col = m + n + 2 * socidx;

            match shape {
                MatrixTriangle::Triu => {
                    K.fill_colvec(&mut map.SOC_v[socidx], headidx + n, col);
                    K.fill_colvec(&mut map.SOC_u[socidx], headidx + n, col + 1);
                }
                MatrixTriangle::Tril => {
                    K.fill_rowvec(&mut map.SOC_v[socidx], col, headidx + n);
                    K.fill_rowvec(&mut map.SOC_u[socidx], col + 1, headidx + n);
                }
            }
            socidx += 1;
        }
    }
    K.fill_diag(&mut map.SOC_D, n + m, p_socs);

    //expansion columns for the generalized power cones
    let mut genpowidx = 0;
    for (i, cone) in cones.iter().enumerate() {
        if let ConeImpl::GenPowerCone(GenPow) = cone {
            let headidx = cones.rng_cones[i].start;
            let dim1 = GenPow.dim1();
            let col = m + n + p_socs + 3 * genpowidx;

            match shape {
                MatrixTriangle::Triu => {
                    K.fill_colvec(&mut map.GenPow_q[genpowidx], headidx + n, col);
                    K.fill_colvec(&mut map.GenPow_r[genpowidx], headidx + n + dim1, col + 1);
                    K.fill_colvec(&mut map.GenPow_p[genpowidx], headidx + n, col + 2);
                }
                MatrixTriangle::Tril => {
                    K.fill_rowvec(&mut map.GenPow_q[genpowidx], col, headidx + n);
                    K.fill_rowvec(&mut map.GenPow_r[genpowidx], col + 1, headidx + n + dim1);
                    K.fill_rowvec(&mut map.GenPow_p[genpowidx], col + 2, headidx + n);
                }
            }
            genpowidx += 1;
        }
    }
    K.fill_diag(&mut map.GenPow_D, n + m + p_socs, p_genpows);

    //restore K.colptr, which was advanced during filling
    K.backshift_colptrs();

    //all diagonal entries now exist, structurally at least, so the
    //full diagonal index can be extracted
    match shape {
        MatrixTriangle::Triu => {
            //diagonal is last in each column
            map.diag_full.copy_from_slice(&K.colptr[1..]);
            map.diag_full.iter_mut().for_each(|x| *x -= 1);
            map.diagP.copy_from_slice(&K.colptr[1..=n]);
            map.diagP.iter_mut().for_each(|x| *x -= 1);
        }

        MatrixTriangle::Tril => {
            //diagonal is first in each column
            map.diag_full
                .copy_from_slice(&K.colptr[0..K.colptr.len() - 1]);
            map.diagP.copy_from_slice(&K.colptr[0..n]);
        }
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kkt_assembly_upper_lower() {
        let P = CscMatrix::from(&[
            [1., 2., 4.], //
            [0., 3., 5.], //
            [0., 0., 6.], //
        ]);
        let A = CscMatrix::from(&[
            [7., 0., 8.],  //
            [0., 9., 10.], //
            [1., 2., 3.],
        ]);

        let Ku_true_diag = CscMatrix::from(&[
            [1., 2., 4., 7., 0., 1.],  //
            [0., 3., 5., 0., 9., 2.],  //
            [0., 0., 6., 8., 10., 3.], //
            [0., 0., 0., -1., 0., 0.], //
            [0., 0., 0., 0., -1., 0.], //
            [0., 0., 0., 0., 0., -1.], //
        ]);

        let Kl_true_diag = CscMatrix::from(&[
            [1., 0., 0., 0., 0., 0.],   //
            [2., 3., 0., 0., 0., 0.],   //
            [4., 5., 6., 0., 0., 0.],   //
            [7., 0., 8., -1., 0., 0.],  //
            [0., 9., 10., 0., -1., 0.], //
            [1., 2., 3., 0., 0., -1.],  //
        ]);

        let Ku_true_dense = CscMatrix::from(&[
            [1., 2., 4., 7., 0., 1.],    //
            [0., 3., 5., 0., 9., 2.],    //
            [0., 0., 6., 8., 10., 3.],   //
            [0., 0., 0., -1., -1., -1.], //
            [0., 0., 0., 0., -1., -1.],  //
            [0., 0., 0., 0., 0., -1.],   //
        ]);

        let Kl_true_dense = CscMatrix::from(&[
            [1., 0., 0., 0., 0., 0.],    //
            [2., 3., 0., 0., 0., 0.],    //
            [4., 5., 6., 0., 0., 0.],    //
            [7., 0., 8., -1., 0., 0.],   //
            [0., 9., 10., -1., -1., 0.], //
            [1., 2., 3., -1., -1., -1.], //
        ]);

        // diagonal lower right block
        // --------------------------------
        let cones = ConeSet::new(&[SupportedCone::Nonnegative(3)]);

        let (mut Ku, mapu) = assemble_kkt_matrix(&P, &A, &cones, MatrixTriangle::Triu);
        for i in mapu.Hsblocks {
            Ku.nzval[i] = -1.;
        }
        assert_eq!(Ku, Ku_true_diag);

        let (mut Kl, mapl) = assemble_kkt_matrix(&P, &A, &cones, MatrixTriangle::Tril);
        for i in mapl.Hsblocks {
            Kl.nzval[i] = -1.;
        }
        assert_eq!(Kl, Kl_true_diag);

        // dense lower right block (small SOCs are not expanded)
        // --------------------------------
        let cones = ConeSet::new(&[SupportedCone::SecondOrder(3)]);

        let (mut Ku, mapu) = assemble_kkt_matrix(&P, &A, &cones, MatrixTriangle::Triu);
        for i in mapu.Hsblocks {
            Ku.nzval[i] = -1.;
        }
        assert_eq!(Ku, Ku_true_dense);

        let (mut Kl, mapl) = assemble_kkt_matrix(&P, &A, &cones, MatrixTriangle::Tril);
        for i in mapl.Hsblocks {
            Kl.nzval[i] = -1.;
        }
        assert_eq!(Kl, Kl_true_dense);
    }

    #[test]
    fn test_kkt_assembly_expanded_soc() {
        //a large SOC takes the sparse rank-2 expansion, adding two
        //extra rows and columns to the KKT system
        let n = 2;
        let dim = 5;
        let P = CscMatrix::<f64>::identity(n).to_triu();
        let A = CscMatrix::from(&[
            [1., 0.], //
            [0., 1.], //
            [1., 1.], //
            [1., -1.], //
            [0., 2.], //
        ]);

        let cones = ConeSet::new(&[SupportedCone::SecondOrder(dim)]);
        let (K, map) = assemble_kkt_matrix(&P, &A, &cones, MatrixTriangle::Triu);

        assert_eq!(map.pdim(), 2);
        assert_eq!(K.nrows(), n + dim + 2);

        //Hs block is diagonal in expanded form, plus two dense
        //columns of the cone dimension and two extended diagonals
        assert_eq!(map.Hsblocks.len(), dim);
        assert_eq!(map.SOC_u[0].len(), dim);
        assert_eq!(map.SOC_v[0].len(), dim);
        assert_eq!(K.nnz(), P.nnz() + A.nnz() + dim + 2 * dim + 2);

        //the full diagonal map must point at genuine diagonal entries
        for (col, &idx) in map.diag_full.iter().enumerate() {
            assert_eq!(K.rowval[idx], col);
        }
    }
}
