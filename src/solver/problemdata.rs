#![allow(non_snake_case)]

use super::*;
use crate::algebra::*;
use crate::solver::cones::ConeSet;
use itertools::izip;

// ---------------
// problem data and its Ruiz equilibration
// ---------------

/// Scaling terms produced by the Ruiz equilibration procedure
pub struct EquilibrationData<T> {
    //diagonal scalings for the problem data
    /// variable scaling
    pub d: Vec<T>,
    /// inverse variable scaling
    pub dinv: Vec<T>,
    /// constraint scaling
    pub e: Vec<T>,
    /// inverse constraint scaling
    pub einv: Vec<T>,
    /// overall scaling of the objective
    pub c: T,
}

impl<T> EquilibrationData<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        //identity scalings to start
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }
}

/// Internal copy of the problem data, equilibrated in place
pub struct ProblemData<T> {
    /// quadratic cost matrix (upper triangle)
    pub P: CscMatrix<T>,
    /// linear cost vector
    pub q: Vec<T>,
    /// constraint matrix
    pub A: CscMatrix<T>,
    /// constraint right hand side
    pub b: Vec<T>,
    /// number of variables
    pub n: usize,
    /// number of constraints
    pub m: usize,
    /// equilibration scalings
    pub equilibration: EquilibrationData<T>,

    //unscaled inf-norms of the linear cost terms, captured before
    //equilibration for use in termination checks
    pub(crate) normq: T,
    pub(crate) normb: T,
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    pub fn new(P: &CscMatrix<T>, q: &[T], A: &CscMatrix<T>, b: &[T]) -> Self {
        //the solver scales its internal copy, so the user data is
        //never modified
        let P_new = if P.is_triu() { P.clone() } else { P.to_triu() };
        let q_new = q.to_vec();
        let A_new = A.clone();
        let mut b_new = b.to_vec();

        //cap large entries of b at the configured infinity
        let infbound: T = crate::solver::get_infinity().as_T();
        b_new.scalarop(|x| T::min(x, infbound));

        let (m, n) = A_new.size();
        let equilibration = EquilibrationData::<T>::new(n, m);

        let normq = q_new.norm_inf();
        let normb = b_new.norm_inf();

        Self {
            P: P_new,
            q: q_new,
            A: A_new,
            b: b_new,
            n,
            m,
            equilibration,
            normq,
            normb,
        }
    }

    /// Ruiz equilibration of the internal data copy.
    pub fn equilibrate(&mut self, cones: &ConeSet<T>, settings: &Settings<T>) {
        //the equilibration structure starts as identity scaling, so
        //nothing to do if disabled
        if !settings.equilibrate_enable {
            return;
        }

        let data = self;
        let equil = &mut data.equilibration;

        let (d, e) = (&mut equil.d, &mut equil.e);

        //inverse scalings serve as work vectors until the end
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;

        //P may be triu only, which the norm helpers account for
        let (P, A, q, b) = (&mut data.P, &mut data.A, &mut data.q, &mut data.b);

        let scale_min = settings.equilibrate_min_scaling;
        let scale_max = settings.equilibrate_max_scaling;

        //fixed number of scaling rounds
        for _ in 0..settings.equilibrate_max_iter {
            kkt_col_norms(P, A, dwork, ework);

            //zero rows or columns should not get scaled
            dwork.scalarop(|x| if x == T::zero() { T::one() } else { x });
            ework.scalarop(|x| if x == T::zero() { T::one() } else { x });

            dwork.rsqrt();
            ework.rsqrt();

            //bound the cumulative scaling
            for (dwork, &d) in izip!(dwork.iter_mut(), d.iter()) {
                *dwork = dwork.clip(scale_min / d, scale_max / d);
            }
            for (ework, &e) in izip!(ework.iter_mut(), e.iter()) {
                *ework = ework.clip(scale_min / e, scale_max / e);
            }

            //apply the round and accumulate
            scale_data(P, A, q, b, Some(dwork), ework);
            d.hadamard(dwork);
            e.hadamard(ework);

            //normalize the objective against the columns of the
            //newly scaled P
            P.col_norms(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = q.norm_inf();

            if mean_col_norm_P != T::zero() && inf_norm_q != T::zero() {
                let scale_cost = T::max(inf_norm_q, mean_col_norm_P);
                let ctmp = T::recip(scale_cost);
                let ctmp = ctmp.clip(scale_min / equil.c, scale_max / equil.c);

                P.scale(ctmp);
                q.scale(ctmp);
                equil.c *= ctmp;
            }
        }

        //cones that only admit scalar scaling rectify the elementwise
        //equilibration over their own blocks
        if cones.rectify_equilibration(ework, e) {
            scale_data(P, A, q, b, None, ework);
            e.hadamard(ework);
        }

        equil.dinv.scalarop_from(T::recip, d);
        equil.einv.scalarop_from(T::recip, e);
    }
}

// inf-norms of the columns of [P A'; A 0], with the A' part computed
// from the rows of A
fn kkt_col_norms<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    norm_LHS: &mut [T],
    norm_RHS: &mut [T],
) {
    P.col_norms_sym(norm_LHS); // P can be triu
    A.col_norms_no_reset(norm_LHS); // incrementally from the P norms
    A.row_norms(norm_RHS); // same as column norms of A'
}

fn scale_data<T: FloatT>(
    P: &mut CscMatrix<T>,
    A: &mut CscMatrix<T>,
    q: &mut [T],
    b: &mut [T],
    d: Option<&[T]>,
    e: &[T],
) {
    match d {
        Some(d) => {
            P.lrscale(d, d); // P = D*P*D
            A.lrscale(e, d); // A = E*A*D
            q.hadamard(d);
        }
        None => {
            A.lscale(e); // A = E*A
        }
    }
    b.hadamard(e);
}
