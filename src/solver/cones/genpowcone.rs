use super::*;
use crate::algebra::*;
use crate::solver::Settings;
use itertools::izip;
use std::iter::zip;

// -------------------------------------
// Generalized power cone
// -------------------------------------

pub struct GenPowerConeData<T> {
    //gradient of the dual barrier at z
    grad: Vec<T>,

    //central path parameter at the last scaling update
    pub(crate) μ: T,

    //vectors of the diag + rank-3 representation of Hs
    pub(crate) p: Vec<T>,
    pub(crate) q: Vec<T>,
    pub(crate) r: Vec<T>,
    pub(crate) d1: Vec<T>,

    //scalar part of the diagonal
    d2: T,
    //constant used to initialize the Newton-Raphson iteration
    ψ: T,

    //work vector of the cone dimension, e.g. for line searches
    work: Vec<T>,
    //work vector reserved for the primal barrier computation
    work_pb: Vec<T>,
}

impl<T> GenPowerConeData<T>
where
    T: FloatT,
{
    pub fn new(α: &[T], dim2: usize) -> Self {
        let dim1 = α.len();
        let dim = dim1 + dim2;

        assert!(α.iter().all(|r| *r > T::zero()));
        assert!((T::one() - α.sum()).abs() < T::epsilon() * (α.len()).as_T() * (0.5).as_T());

        Self {
            grad: vec![T::zero(); dim],
            μ: T::one(),
            p: vec![T::zero(); dim],
            q: vec![T::zero(); dim1],
            r: vec![T::zero(); dim2],
            d1: vec![T::zero(); dim1],
            d2: T::zero(),
            ψ: T::one() / (α.sumsq()),
            work: vec![T::zero(); dim],
            work_pb: vec![T::zero(); dim],
        }
    }
}

pub struct GenPowerCone<T> {
    //exponents defining the cone.  Length gives dim1
    pub(crate) α: Vec<T>,
    dim2: usize,
    //boxed so the cone variant enum stays small
    pub(crate) data: Box<GenPowerConeData<T>>,
}

impl<T> GenPowerCone<T>
where
    T: FloatT,
{
    pub fn new(α: Vec<T>, dim2: usize) -> Self {
        let data = Box::new(GenPowerConeData::<T>::new(&α, dim2));
        Self { α, dim2, data }
    }

    pub fn dim1(&self) -> usize {
        self.α.len()
    }
    pub fn dim2(&self) -> usize {
        self.dim2
    }
    pub fn dim(&self) -> usize {
        self.dim1() + self.dim2()
    }
}

impl<T> Cone<T> for GenPowerCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.dim1() + 1
    }

    fn numel(&self) -> usize {
        self.dim()
    }

    fn is_symmetric(&self) -> bool {
        false
    }

    fn is_sparse_expandable(&self) -> bool {
        //the diag + rank-3 scaling always enters the KKT matrix in
        //expanded form
        true
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        //scalar equilibration over the cone
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    fn margins(&mut self, _z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        //asymmetric cones always use unit initialization, so margin
        //based shifting is never reached
        unreachable!();
    }

    fn scaled_unit_shift(&self, _z: &mut [T], _α: T, _pd: PrimalOrDualCone) {
        unreachable!();
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        let α = &self.α;
        let dim1 = self.dim1();

        s[..dim1].scalarop_from(|αi| T::sqrt(T::one() + αi), α);
        s[dim1..].fill(T::zero());

        z.copy_from(s);
    }

    fn set_identity_scaling(&mut self) {
        //asymmetric cones do not allow symmetric initialization
        unreachable!();
    }

    fn update_scaling(&mut self, _s: &[T], z: &[T], μ: T) -> bool {
        //gradient and Hessian of f*(z) at the new point
        self.update_dual_grad_H(z);
        self.data.μ = μ;
        true
    }

    fn Hs_is_diagonal(&self) -> bool {
        true
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        //only the diagonal block D = [d1; d2] is reported here.  The
        //p,q,r columns and the extended diagonal are handled by the
        //KKT assembly separately
        let dim1 = self.dim1();
        let data = &self.data;

        Hsblock[..dim1].scalarop_from(|d1| data.μ * d1, &data.d1);
        Hsblock[dim1..].fill(data.μ * data.d2);
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], _work: &mut [T]) {
        // Hs = μ(D + pp' - qq' - rr')
        let dim1 = self.dim1();
        let data = &self.data;

        let coef_p = data.p.dot(x);
        let coef_q = data.q.dot(&x[..dim1]);
        let coef_r = data.r.dot(&x[dim1..]);

        for (y, &x, &d1, &q) in izip!(&mut y[..dim1], &x[..dim1], &data.d1, &data.q) {
            *y = d1 * x - coef_q * q;
        }

        for (y, &x, &r) in izip!(&mut y[dim1..], &x[dim1..], &data.r) {
            *y = data.d2 * x - coef_r * r;
        }

        y.axpby(coef_p, &data.p, T::one());
        y.scale(data.μ);
    }

    fn affine_ds(&self, ds: &mut [T], s: &[T]) {
        ds.copy_from(s);
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], _step_z: &mut [T], _step_s: &mut [T], σμ: T) {
        //no higher order correction
        shift.scalarop_from(|g| g * σμ, &self.data.grad);
    }

    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], _work: &mut [T], _z: &[T]) {
        out.copy_from(ds);
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &Settings<T>,
        αmax: T,
    ) -> (T, T) {
        let step = settings.linesearch_backtrack_step;
        let αmin = settings.min_terminate_step_length;

        //"work" cannot be borrowed while the feasibility closures
        //capture self, so move it out for the duration
        let mut work = std::mem::take(&mut self.data.work);

        let is_prim_feasible_fcn = |s: &[T]| -> bool { self.is_primal_feasible(s) };
        let is_dual_feasible_fcn = |s: &[T]| -> bool { self.is_dual_feasible(s) };

        let αz = backtrack_search(dz, z, αmax, αmin, step, is_dual_feasible_fcn, &mut work);
        let αs = backtrack_search(ds, s, αmax, αmin, step, is_prim_feasible_fcn, &mut work);

        self.data.work = work;

        (αz, αs)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let mut barrier = T::zero();
        let mut work = std::mem::take(&mut self.data.work);

        work.waxpby(T::one(), s, α, ds);
        barrier += self.barrier_primal(&work);

        work.waxpby(T::one(), z, α, dz);
        barrier += self.barrier_dual(&work);

        self.data.work = work;

        barrier
    }
}

impl<T> NonsymmetricCone<T> for GenPowerCone<T>
where
    T: FloatT,
{
    fn is_primal_feasible(&self, s: &[T]) -> bool {
        let α = &self.α;
        let two: T = (2.).as_T();
        let dim1 = self.dim1();

        //test in log space to avoid overflow of the product
        if s[..dim1].iter().all(|&x| x > T::zero()) {
            let res = zip(α, &s[..dim1]).fold(T::zero(), |res, (&αi, &si)| -> T {
                res + two * αi * si.logsafe()
            });
            let res = T::exp(res) - s[dim1..].sumsq();

            if res > T::zero() {
                return true;
            }
        }
        false
    }

    fn is_dual_feasible(&self, z: &[T]) -> bool {
        let α = &self.α;
        let two: T = (2.).as_T();
        let dim1 = self.dim1();

        if z[..dim1].iter().all(|&x| x > T::zero()) {
            let res = zip(α, &z[..dim1]).fold(T::zero(), |res, (&αi, &zi)| -> T {
                res + two * αi * (zi / αi).logsafe()
            });
            let res = T::exp(res) - z[dim1..].sumsq();

            if res > T::zero() {
                return true;
            }
        }
        false
    }

    fn barrier_primal(&mut self, s: &[T]) -> T {
        // f(s) = ⟨s,g(s)⟩ - f*(-g(s)), with ⟨s,g(s)⟩ = -ν

        //"work" may already hold the barrier argument, so the primal
        //gradient gets its own buffer
        let mut g = std::mem::take(&mut self.data.work_pb);

        self.gradient_primal(&mut g, s);
        g.negate(); //-g(s)

        let out = -self.barrier_dual(&g) - (self.degree()).as_T();

        self.data.work_pb = g;

        out
    }

    fn barrier_dual(&mut self, z: &[T]) -> T {
        // f*(z) = -log(Π(zᵢ/αᵢ)^2αᵢ - ‖w‖²) - Σ(1-αᵢ)log(zᵢ)
        let α = &self.α;
        let dim1 = self.dim1();
        let two: T = (2.).as_T();

        let mut res = T::zero();
        for (&zi, &αi) in zip(&z[..dim1], α) {
            res += two * αi * (zi / αi).logsafe();
        }
        res = T::exp(res) - z[dim1..].sumsq();

        let mut barrier: T = -res.logsafe();
        for (&zi, &αi) in zip(&z[..dim1], α) {
            barrier -= (zi).logsafe() * (T::one() - αi);
        }

        barrier
    }

    fn update_dual_grad_H(&mut self, z: &[T]) {
        let α = &self.α;
        let dim1 = self.dim1();
        let data = &mut self.data;
        let two: T = (2.).as_T();

        let phi = zip(α, z).fold(T::one(), |phi, (&αi, &zi)| phi * (zi / αi).powf(two * αi));

        let norm2w = z[dim1..].sumsq();
        let ζ = phi - norm2w;
        debug_assert!(ζ > T::zero());

        //gradient at z.  τ shares memory with q below
        let grad = &mut data.grad;
        let τ = &mut data.q;

        for (τ, grad, &α, &z) in izip!(τ.iter_mut(), &mut grad[..dim1], α, &z[..dim1]) {
            *τ = two * α / z;
            *grad = -(*τ) * phi / ζ - (T::one() - α) / z;
        }

        grad[dim1..].scalarop_from(|z| (two / ζ) * z, &z[dim1..]);

        //Hessian representation at z
        let p0 = T::sqrt(phi * (phi + norm2w) / two);
        let p1 = -two * phi / p0;
        let q0 = T::sqrt(ζ * phi / two);
        let r1 = two * T::sqrt(ζ / (phi + norm2w));

        //diagonal terms d1, d2
        for (d1, &τ, &α, &z) in izip!(&mut data.d1, τ.iter(), α, &z[..dim1]) {
            *d1 = (τ) * phi / (ζ * z) + (T::one() - α) / (z * z);
        }
        data.d2 = two / ζ;

        //p, q, r
        data.p[..dim1].scalarop_from(|τi| (p0 / ζ) * τi, τ);
        data.p[dim1..].scalarop_from(|zi| (p1 / ζ) * zi, &z[dim1..]);

        data.q.scale(q0 / ζ);
        data.r.scalarop_from(|zi| (r1 / ζ) * zi, &z[dim1..]);
    }

    // primal gradient of f(s) at s, with the leading scalar recovered
    // by Newton-Raphson on a one dimensional auxiliary equation
    fn gradient_primal(&self, g: &mut [T], s: &[T]) {
        let dim1 = self.dim1();
        let two: T = (2.).as_T();
        let data = &self.data;

        //unscaled phi
        let phi =
            zip(&s[..dim1], &self.α).fold(T::one(), |phi, (&si, &αi)| phi * si.powf(two * αi));

        let (p, r) = s.split_at(dim1);
        let (gp, gr) = g.split_at_mut(dim1);
        let norm_r = r.norm();

        if norm_r > T::epsilon() {
            let g1 = _newton_raphson_genpowcone(norm_r, p, phi, &self.α, data.ψ);

            gr.scalarop_from(|r| (g1 / norm_r) * r, r);

            for (gp, &α, &p) in izip!(gp.iter_mut(), &self.α, p) {
                *gp = -(T::one() + α + α * g1 * norm_r) / p;
            }
        } else {
            gr.fill(T::zero());

            for (gp, &α, &p) in izip!(gp.iter_mut(), &self.α, p) {
                *gp = -(T::one() + α) / p;
            }
        }
    }
}

// ----------------------------------------------
// internal operations for generalized power cones

// Newton-Raphson method on the scalar equation f(x) = 0.  The starting
// point x0 satisfies 0 < x0 < x* and f(x0) > 0, which gives quadratic
// convergence from the left of the root
fn _newton_raphson_genpowcone<T>(norm_r: T, p: &[T], phi: T, α: &[T], ψ: T) -> T
where
    T: FloatT,
{
    let two: T = (2.).as_T();

    // bracketing initial point with f(x0) > 0
    let x0 = -norm_r.recip()
        + (ψ * norm_r + ((phi / norm_r / norm_r + ψ * ψ - T::one()) * phi).sqrt())
            / (phi - norm_r * norm_r);

    // function for f(x) = 0
    let f0 = {
        |x: T| -> T {
            let finit = -(two * x / norm_r + x * x).logsafe();

            zip(α, p).fold(finit, |f, (&αi, &pi)| {
                f + two * αi * ((x * norm_r + (T::one() + αi) / αi).logsafe() - pi.logsafe())
            })
        }
    };

    // first derivative
    let f1 = {
        |x: T| -> T {
            let finit = -(two * x + two / norm_r) / (x * x + two * x / norm_r);

            α.iter().fold(finit, |f, &αi| {
                f + two * (αi) * norm_r / (norm_r * x + (T::one() + αi) / αi)
            })
        }
    };
    newton_raphson_onesided(x0, f0, f1)
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    //deterministic low state LCG, avoiding an external rand dependency
    fn lcg(state: &mut u64) -> f64 {
        *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*state >> 11) as f64) / ((1u64 << 53) as f64)
    }

    #[test]
    fn test_feasibility_boundary() {
        let K = GenPowerCone::<f64>::new(vec![0.5, 0.5], 1);

        //boundary point: √(u₁u₂) = ‖w‖ exactly
        let boundary = vec![2.0, 2.0, 2.0];
        assert!(!K.is_primal_feasible(&boundary));

        //detection tolerance well inside 1e-10
        let mut inside = boundary.clone();
        inside[2] = 2.0 - 1e-10;
        let mut outside = boundary.clone();
        outside[2] = 2.0 + 1e-10;
        assert!(K.is_primal_feasible(&inside));
        assert!(!K.is_primal_feasible(&outside));

        //negative u is never feasible
        assert!(!K.is_primal_feasible(&[-1.0, 2.0, 0.1]));
    }

    #[test]
    fn test_gradient_primal_conjugacy() {
        //for the recovered primal gradient g(s), the point -g(s) must
        //be strictly dual feasible and satisfy ∇f*(-g(s)) = -s.  This
        //exercises the Newton-Raphson recovery end to end
        let mut K = GenPowerCone::<f64>::new(vec![0.5, 0.5], 2);

        let mut state = 0x2c9277b5u64;
        for _ in 0..20 {
            //uniform random interior points
            let u1 = 0.1 + lcg(&mut state) * 10.0;
            let u2 = 0.1 + lcg(&mut state) * 10.0;
            let scale = (u1 * u2).sqrt();
            let w1 = (lcg(&mut state) - 0.5) * scale;
            let w2 = (lcg(&mut state) - 0.5) * (scale * scale - w1 * w1).sqrt();
            let s = vec![u1, u2, w1, w2];
            assert!(K.is_primal_feasible(&s));

            let mut g = vec![0.0; 4];
            K.gradient_primal(&mut g, &s);
            g.negate();
            assert!(K.is_dual_feasible(&g));

            K.update_dual_grad_H(&g);
            for (gi, si) in zip(&K.data.grad, &s) {
                assert!((gi + si).abs() < 1e-6 * si.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_dual_grad_matches_barrier() {
        //finite difference check of the dual gradient
        let mut K = GenPowerCone::<f64>::new(vec![0.3, 0.7], 2);
        let z = vec![1.3, 0.9, 0.2, -0.3];
        assert!(K.is_dual_feasible(&z));

        K.update_dual_grad_H(&z);
        let grad = K.data.grad.clone();

        let h = 1e-6;
        for i in 0..z.len() {
            let mut zp = z.clone();
            let mut zm = z.clone();
            zp[i] += h;
            zm[i] -= h;
            let fd = (K.barrier_dual(&zp) - K.barrier_dual(&zm)) / (2.0 * h);
            assert!((fd - grad[i]).abs() < 1e-5 * grad[i].abs().max(1.0));
        }
    }

    #[test]
    fn test_mul_Hs_matches_rank3_form() {
        let mut K = GenPowerCone::<f64>::new(vec![0.5, 0.5], 1);
        let z = vec![1.0, 2.0, 0.5];
        assert!(K.is_dual_feasible(&z));
        K.update_scaling(&[], &z, 2.0);

        //Hs must be symmetric: ⟨y, Hs x⟩ = ⟨x, Hs y⟩
        let x = vec![0.3, -0.2, 0.9];
        let y = vec![-1.0, 0.4, 0.1];
        let mut hx = vec![0.0; 3];
        let mut hy = vec![0.0; 3];
        let mut work = vec![0.0; 3];
        K.mul_Hs(&mut hx, &x, &mut work);
        K.mul_Hs(&mut hy, &y, &mut work);
        assert!((y.dot(&hx) - x.dot(&hy)).abs() < 1e-12);
    }
}
