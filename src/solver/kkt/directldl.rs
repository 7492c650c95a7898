#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::cones::*;
use crate::solver::Settings;

// -------------------------------------
// KKT solver using a direct LDLᵀ factorisation of the static
// regularized quasidefinite KKT matrix
// -------------------------------------

pub(crate) struct DirectKKTSolver<T> {
    //problem dimensions, with p the sparse expansion size
    m: usize,
    n: usize,
    p: usize,

    //LHS and RHS for solves
    x: Vec<T>,
    b: Vec<T>,

    //workspace for the iterative refinement loop
    work_e: Vec<T>,
    work_dx: Vec<T>,

    //mapping from problem data to the KKT entries
    map: KKTDataMap,

    //expected signs of D in K = LDLᵀ
    dsigns: Vec<i8>,

    //staging area for the Hs blocks of the diagonal
    Hsblocks: Vec<T>,

    //unpermuted KKT matrix
    KKT: CscMatrix<T>,

    //the direct LDL backend
    ldlsolver: BoxedDirectLDLSolver<T>,
}

impl<T> DirectKKTSolver<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        cones: &ConeSet<T>,
        m: usize,
        n: usize,
        settings: &Settings<T>,
    ) -> Self {
        //a backend constructor and the triangle it wants
        let (kktshape, ldl_ctor) = get_ldlsolver_config(settings);

        let (mut KKT, map) = assemble_kkt_matrix(P, A, cones, kktshape);
        let p = map.pdim();

        //LHS/RHS/workspace, sized for the extended system
        let x = vec![T::zero(); n + m + p];
        let b = vec![T::zero(); n + m + p];
        let work_e = vec![T::zero(); n + m + p];
        let work_dx = vec![T::zero(); n + m + p];

        let mut dsigns = vec![1_i8; n + m + p];
        _fill_signs(&mut dsigns, m, n, &map);

        let Hsblocks = allocate_kkt_Hsblocks::<T, T>(cones);

        //static regularisation on the P block.  Applied once here and
        //never overwritten, since updates only touch the lower blocks
        if settings.static_regularization_enable {
            let eps = settings.static_regularization_eps;
            _offset_values_KKT(&mut KKT, &map.diag_full[0..n], eps, &dsigns[0..n]);
        }

        let ldlsolver = ldl_ctor(&KKT, &dsigns, settings);

        Self {
            m,
            n,
            p,
            x,
            b,
            work_e,
            work_dx,
            map,
            dsigns,
            Hsblocks,
            KKT,
            ldlsolver,
        }
    }

    pub fn setrhs(&mut self, rhsx: &[T], rhsz: &[T]) {
        let (m, n, p) = (self.m, self.n, self.p);

        self.b[0..n].copy_from(rhsx);
        self.b[n..(n + m)].copy_from(rhsz);
        self.b[n + m..(n + m + p)].fill(T::zero());
    }

    //write the scaled Hs blocks and sparse expansion terms into K,
    //re-apply the static regularisation on the overwritten diagonal,
    //and refactor
    pub fn update(&mut self, cones: &ConeSet<T>, settings: &Settings<T>) -> bool {
        let map = &self.map;
        let (ldlsolver, KKT) = (&mut self.ldlsolver, &mut self.KKT);

        //Hs blocks, negated for the -Hs placement
        cones.get_Hs(&mut self.Hsblocks);
        self.Hsblocks.negate();
        _update_values(ldlsolver, KKT, &map.Hsblocks, &self.Hsblocks);

        //rank-2 expansion terms for the sparse SOCs
        let mut socidx = 0;
        for cone in cones.iter() {
            if let ConeImpl::SecondOrderCone(SOC) = cone {
                if let Some(sparse_data) = &SOC.sparse_data {
                    let η2 = SOC.η * SOC.η;

                    _update_values(ldlsolver, KKT, &map.SOC_u[socidx], &sparse_data.u);
                    _update_values(ldlsolver, KKT, &map.SOC_v[socidx], &sparse_data.v);
                    _scale_values(ldlsolver, KKT, &map.SOC_u[socidx], -η2);
                    _scale_values(ldlsolver, KKT, &map.SOC_v[socidx], -η2);

                    //±η² on the extended diagonal
                    _update_values(
                        ldlsolver,
                        KKT,
                        &map.SOC_D[2 * socidx..2 * socidx + 2],
                        &[-η2, η2],
                    );

                    socidx += 1;
                }
            }
        }

        //rank-3 expansion terms for the generalized power cones, with
        //√μ distributed onto the off diagonal columns
        let mut genpowidx = 0;
        for cone in cones.iter() {
            if let ConeImpl::GenPowerCone(GenPow) = cone {
                let data = &GenPow.data;
                let sqrtμ = data.μ.sqrt();

                _update_values(ldlsolver, KKT, &map.GenPow_q[genpowidx], &data.q);
                _update_values(ldlsolver, KKT, &map.GenPow_r[genpowidx], &data.r);
                _update_values(ldlsolver, KKT, &map.GenPow_p[genpowidx], &data.p);
                _scale_values(ldlsolver, KKT, &map.GenPow_q[genpowidx], -sqrtμ);
                _scale_values(ldlsolver, KKT, &map.GenPow_r[genpowidx], -sqrtμ);
                _scale_values(ldlsolver, KKT, &map.GenPow_p[genpowidx], -sqrtμ);

                _update_values(
                    ldlsolver,
                    KKT,
                    &map.GenPow_D[3 * genpowidx..3 * genpowidx + 3],
                    &[-T::one(), -T::one(), T::one()],
                );

                genpowidx += 1;
            }
        }

        //static regularisation on the diagonal terms just overwritten.
        //The leading n entries were shifted at assembly and are not
        //touched again
        if settings.static_regularization_enable {
            let eps = settings.static_regularization_eps;
            let (m, n, p) = (self.m, self.n, self.p);
            _offset_values(
                ldlsolver,
                KKT,
                &map.diag_full[n..(n + m + p)],
                eps,
                &self.dsigns[n..(n + m + p)],
            );
        }

        self.ldlsolver.refactor(&self.KKT)
    }

    pub fn solve(
        &mut self,
        lhsx: Option<&mut [T]>,
        lhsz: Option<&mut [T]>,
        settings: &Settings<T>,
    ) -> bool {
        self.ldlsolver.solve(&mut self.x, &self.b);

        let is_success = {
            if settings.iterative_refinement_enable {
                self.iterative_refinement(settings)
            } else {
                self.x.is_finite()
            }
        };

        if is_success {
            self.getlhs(lhsx, lhsz);
        }
        is_success
    }

    fn getlhs(&self, lhsx: Option<&mut [T]>, lhsz: Option<&mut [T]>) {
        let x = &self.x;
        let (m, n) = (self.m, self.n);

        if let Some(v) = lhsx {
            v.copy_from(&x[0..n]);
        }
        if let Some(v) = lhsz {
            v.copy_from(&x[n..(n + m)]);
        }
    }

    fn iterative_refinement(&mut self, settings: &Settings<T>) -> bool {
        let (x, b) = (&mut self.x, &self.b);
        let (e, dx) = (&mut self.work_e, &mut self.work_dx);

        let reltol = settings.iterative_refinement_reltol;
        let abstol = settings.iterative_refinement_abstol;
        let maxiter = settings.iterative_refinement_max_iter;
        let stopratio = settings.iterative_refinement_stop_ratio;

        let eps = {
            if settings.static_regularization_enable {
                settings.static_regularization_eps
            } else {
                T::zero()
            }
        };

        //Note that K holds only one triangle, so the residual must go
        //through its symmetric view
        let K = &self.KKT;
        let normb = b.norm_inf();

        //error at the initial solution
        let mut norme = _get_refine_error(e, b, K, &self.dsigns, eps, x);
        if !norme.is_finite() {
            return false;
        }

        for _ in 0..maxiter {
            if norme <= (abstol + reltol * normb) {
                break;
            }
            let lastnorme = norme;

            //refinement step
            self.ldlsolver.solve(dx, e);

            //prospective solution is x + dx, formed in dx so that it
            //can be checked before being accepted
            dx.axpby(T::one(), x, T::one());
            norme = _get_refine_error(e, b, K, &self.dsigns, eps, dx);
            if !norme.is_finite() {
                return false;
            }

            if lastnorme / norme < stopratio {
                //insufficient improvement.  Exit without accepting
                //the candidate
                break;
            } else {
                //swap instead of copying the candidate into x
                std::mem::swap(x, dx);
            }
        }
        true
    }
}

// update entries of the KKT matrix through the given CSC indices.
// Applied both to the unpermuted copy and to the backend, which may
// mirror its own permuted version
fn _update_values<T: FloatT>(
    ldlsolver: &mut BoxedDirectLDLSolver<T>,
    KKT: &mut CscMatrix<T>,
    index: &[usize],
    values: &[T],
) {
    for (idx, v) in index.iter().zip(values.iter()) {
        KKT.nzval[*idx] = *v;
    }
    ldlsolver.update_values(index, values);
}

fn _scale_values<T: FloatT>(
    ldlsolver: &mut BoxedDirectLDLSolver<T>,
    KKT: &mut CscMatrix<T>,
    index: &[usize],
    scale: T,
) {
    for idx in index.iter() {
        KKT.nzval[*idx] *= scale;
    }
    ldlsolver.scale_values(index, scale);
}

fn _offset_values<T: FloatT>(
    ldlsolver: &mut BoxedDirectLDLSolver<T>,
    KKT: &mut CscMatrix<T>,
    index: &[usize],
    offset: T,
    signs: &[i8],
) {
    _offset_values_KKT(KKT, index, offset, signs);
    ldlsolver.offset_values(index, offset, signs);
}

fn _offset_values_KKT<T: FloatT>(KKT: &mut CscMatrix<T>, index: &[usize], offset: T, signs: &[i8]) {
    assert_eq!(index.len(), signs.len());

    for (&idx, &sign) in index.iter().zip(signs.iter()) {
        let sign = T::from_i8(sign).unwrap();
        KKT.nzval[idx] += sign * offset;
    }
}

// expected signs of D: +1 for the n P-block rows, -1 for the m cone
// rows, then (-1,+1) per expanded SOC and (-1,-1,+1) per GenPow
fn _fill_signs(signs: &mut [i8], m: usize, n: usize, map: &KKTDataMap) {
    signs.fill(1);

    signs[n..(n + m)].iter_mut().for_each(|x| *x = -1);

    let mut idx = n + m;
    for _ in 0..(map.SOC_D.len() / 2) {
        signs[idx] = -1;
        signs[idx + 1] = 1;
        idx += 2;
    }
    for _ in 0..(map.GenPow_D.len() / 3) {
        signs[idx] = -1;
        signs[idx + 1] = -1;
        signs[idx + 2] = 1;
        idx += 3;
    }
}

// e = b - Kξ, computed through the symmetric view of K.  When static
// regularisation is enabled the stored K is K̃ = K + εD on its lower
// block, so the εDξ term is added back to cancel it
fn _get_refine_error<T: FloatT>(
    e: &mut [T],
    b: &[T],
    K: &CscMatrix<T>,
    dsigns: &[i8],
    eps: T,
    ξ: &[T],
) -> T {
    e.copy_from(b);
    K.sym().symv(e, ξ, -T::one(), T::one()); // e = b - Kξ

    if eps != T::zero() {
        for (i, eval) in e.iter_mut().enumerate() {
            let s = T::from_i8(dsigns[i]).unwrap();
            *eval += eps * s * ξ[i];
        }
    }

    e.norm_inf()
}
