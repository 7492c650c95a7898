#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::cones::*;
use num_traits::Zero;

// Index map from logical problem data slots into the nonzero values
// of the assembled KKT matrix.  The nonzero pattern of K is fixed at
// assembly, so all subsequent numeric updates are pure scatter
// operations through these indices.
pub(crate) struct KKTDataMap {
    pub P: Vec<usize>,
    pub A: Vec<usize>,

    //indices of the Hs block entries, ordered by cone
    pub Hsblocks: Vec<usize>,

    //rank-2 expansion columns and extended diagonal entries for the
    //sparse expandable second order cones, in cone order
    pub SOC_u: Vec<Vec<usize>>,
    pub SOC_v: Vec<Vec<usize>>,
    pub SOC_D: Vec<usize>,

    //rank-3 expansion columns and extended diagonal entries for the
    //generalized power cones, in cone order
    pub GenPow_p: Vec<Vec<usize>>,
    pub GenPow_q: Vec<Vec<usize>>,
    pub GenPow_r: Vec<Vec<usize>>,
    pub GenPow_D: Vec<usize>,

    //the indices above are disjoint and cover all of the assembled
    //data.  Two further index sets locate the diagonal, including
    //structural zeros
    pub diagP: Vec<usize>,
    pub diag_full: Vec<usize>,
}

impl KKTDataMap {
    pub fn new<T: FloatT>(
        Pmat: &CscMatrix<T>,
        Amat: &CscMatrix<T>,
        cones: &ConeSet<T>,
    ) -> Self {
        let (m, n) = (Amat.nrows(), Pmat.nrows());
        let P = vec![0; Pmat.nnz()];
        let A = vec![0; Amat.nnz()];

        //structural zeros are filled on the diagonal of the upper
        //left block even if P is empty, so diagP can carry indices
        //that do not appear in the P map
        let diagP = vec![0; n];

        let Hsblocks = allocate_kkt_Hsblocks::<T, usize>(cones);

        let mut SOC_u = Vec::new();
        let mut SOC_v = Vec::new();
        let mut GenPow_p = Vec::new();
        let mut GenPow_q = Vec::new();
        let mut GenPow_r = Vec::new();

        for cone in cones.iter() {
            match cone {
                ConeImpl::SecondOrderCone(sc) => {
                    if sc.is_sparse_expandable() {
                        SOC_u.push(vec![0; sc.numel()]);
                        SOC_v.push(vec![0; sc.numel()]);
                    }
                }
                ConeImpl::GenPowerCone(gp) => {
                    GenPow_p.push(vec![0; gp.numel()]);
                    GenPow_q.push(vec![0; gp.dim1()]);
                    GenPow_r.push(vec![0; gp.dim2()]);
                }
                _ => {}
            }
        }

        let SOC_D = vec![0; 2 * SOC_u.len()];
        let GenPow_D = vec![0; 3 * GenPow_p.len()];

        let p = SOC_D.len() + GenPow_D.len();
        let diag_full = vec![0; m + n + p];

        Self {
            P,
            A,
            Hsblocks,
            SOC_u,
            SOC_v,
            SOC_D,
            GenPow_p,
            GenPow_q,
            GenPow_r,
            GenPow_D,
            diagP,
            diag_full,
        }
    }

    //dimension of the sparse expansion block appended to K
    pub fn pdim(&self) -> usize {
        self.SOC_D.len() + self.GenPow_D.len()
    }
}

pub(crate) fn allocate_kkt_Hsblocks<T, Z>(cones: &ConeSet<T>) -> Vec<Z>
where
    T: FloatT,
    Z: Zero + Clone,
{
    let mut nnz = 0;
    if let Some(rng_last) = cones.rng_blocks.last() {
        nnz = rng_last.end;
    }
    vec![Z::zero(); nnz]
}
