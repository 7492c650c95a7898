use super::*;
use crate::algebra::*;
use crate::solver::Settings;

// -------------------------------------
// Second order cone
// -------------------------------------

//cones with dimension above this threshold enter the KKT matrix in
//sparsified rank-2 form rather than as a dense Hs block
const SOC_NO_EXPANSION_MAX_SIZE: usize = 4;

pub struct SecondOrderConeSparseData<T> {
    //vectors of the rank-2 update representation of W²
    pub u: Vec<T>,
    pub v: Vec<T>,

    //scalar term for the diagonal of the rank-2 representation
    pub d: T,
}

impl<T> SecondOrderConeSparseData<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            u: vec![T::zero(); dim],
            v: vec![T::zero(); dim],
            d: T::one(),
        }
    }
}

pub struct SecondOrderCone<T> {
    pub(crate) dim: usize,
    //internal working variables for W and its products
    w: Vec<T>,
    //scaled version of (s,z)
    λ: Vec<T>,
    pub(crate) η: T,
    pub(crate) sparse_data: Option<SecondOrderConeSparseData<T>>,
}

impl<T> SecondOrderCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        assert!(dim >= 2);

        let sparse_data = {
            if dim > SOC_NO_EXPANSION_MAX_SIZE {
                Some(SecondOrderConeSparseData::new(dim))
            } else {
                None
            }
        };

        Self {
            dim,
            w: vec![T::zero(); dim],
            λ: vec![T::zero(); dim],
            η: T::zero(),
            sparse_data,
        }
    }
}

impl<T> Cone<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        // e'e = 1 for the SOC
        1
    }

    fn numel(&self) -> usize {
        self.dim
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn is_sparse_expandable(&self) -> bool {
        self.sparse_data.is_some()
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        //scalar equilibration over the cone
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    fn margins(&mut self, z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        let α = z[0] - z[1..].norm();
        let β = T::max(T::zero(), α);
        (α, β)
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, _pd: PrimalOrDualCone) {
        z[0] += α;
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        s.fill(T::zero());
        z.fill(T::zero());
        self.scaled_unit_shift(s, T::one(), PrimalOrDualCone::PrimalCone);
        self.scaled_unit_shift(z, T::one(), PrimalOrDualCone::DualCone);
    }

    fn set_identity_scaling(&mut self) {
        self.w.fill(T::zero());
        self.w[0] = T::one();
        self.η = T::one();

        if let Some(sparse_data) = &mut self.sparse_data {
            sparse_data.d = (0.5).as_T();
            sparse_data.u.fill(T::zero());
            sparse_data.u[0] = T::FRAC_1_SQRT_2();
            sparse_data.v.fill(T::zero());
        }
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T) -> bool {
        let two: T = (2.0).as_T();
        let half: T = (0.5).as_T();

        let zscale = _sqrt_soc_residual(z);
        let sscale = _sqrt_soc_residual(s);

        //fail if either s or z is not interior
        if zscale == T::zero() || sscale == T::zero() {
            return false;
        }

        //leading scalar of WᵀW
        self.η = T::sqrt(sscale / zscale);

        //construct the scaled vector w and normalize
        let w = &mut self.w;
        w.copy_from(s);
        w.scale(sscale.recip());
        w[0] += z[0] / zscale;
        w[1..].axpby(-zscale.recip(), &z[1..], T::one());

        let wscale = _sqrt_soc_residual(w);
        if wscale == T::zero() {
            return false;
        }
        w.scale(wscale.recip());

        //force badly scaled w back towards unit residual
        let w1sq = w[1..].sumsq();
        w[0] = T::sqrt(T::one() + w1sq);

        //scaling point λ, satisfying λ = Wz = W⁻ᵀs
        let γ = half * wscale;
        self.λ[0] = γ;
        self.λ[1..].waxpby(
            (γ + z[0] / zscale) / sscale,
            &s[1..],
            (γ + s[0] / sscale) / zscale,
            &z[1..],
        );
        self.λ[1..]
            .scale(T::recip(s[0] / sscale + z[0] / zscale + two * γ));
        self.λ.scale(T::sqrt(sscale * zscale));

        if let Some(sparse_data) = &mut self.sparse_data {
            let α = two * w[0];

            //d is the upper LH corner of the diagonal term in the
            //rank-2 update form of WᵀW
            let wsq = w[0] * w[0] + w1sq;
            let wsqinv = wsq.recip();
            sparse_data.d = half * wsqinv;

            //vectors of the rank-2 representation of WᵀW
            let u0 = T::sqrt(wsq - sparse_data.d);
            let u1 = α / u0;
            let v1 = T::sqrt(two * (two + wsqinv) / (two * wsq - wsqinv));

            sparse_data.u[0] = u0;
            sparse_data.u[1..].axpby(u1, &self.w[1..], T::zero());
            sparse_data.v[0] = T::zero();
            sparse_data.v[1..].axpby(v1, &self.w[1..], T::zero());
        }

        true
    }

    fn Hs_is_diagonal(&self) -> bool {
        self.is_sparse_expandable()
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        if let Some(sparse_data) = &self.sparse_data {
            //sparse form reports only the diagonal D block of the
            //rank-2 representation.  The u/v columns and the two
            //extended diagonal entries are handled by the KKT
            //assembly separately
            Hsblock.fill(self.η * self.η);
            Hsblock[0] *= sparse_data.d;
        } else {
            //dense form returns Hs = η²(2ww' - J) in packed triu
            //form, with J = diag(1,-I)
            let two: T = (2.).as_T();
            Hsblock[0] = two * self.w[0] * self.w[0] - T::one();
            let mut hidx = 1;

            for col in 1..self.dim {
                let wcol = self.w[col];
                for row in 0..=col {
                    Hsblock[hidx] = two * self.w[row] * wcol;
                    hidx += 1
                }
                //add the J offset to the diagonal term just written
                Hsblock[hidx - 1] += T::one()
            }
            Hsblock.scale(self.η * self.η);
        }
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], _work: &mut [T]) {
        //Hs x = η²(2w(w'x) - Jx), avoiding the double W product
        let c = self.w.dot(x) * (2.).as_T();
        y.copy_from(x);
        y[0] = -x[0];
        y.axpby(c, &self.w, T::one());
        y.scale(self.η * self.η);
    }

    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        _circ_op(ds, &self.λ, &self.λ);
    }

    fn combined_ds_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        self._combined_ds_shift_symmetric(shift, step_z, step_s, σμ);
    }

    fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], _z: &[T]) {
        self._Δs_from_Δz_offset_symmetric(out, ds, work);
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        _settings: &Settings<T>,
        αmax: T,
    ) -> (T, T) {
        let αz = _step_length_soc_component(z, dz, αmax);
        let αs = _step_length_soc_component(s, ds, αmax);

        (αz, αs)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let res_s = _soc_residual_shifted(s, ds, α);
        let res_z = _soc_residual_shifted(z, dz, α);

        if res_s > T::zero() && res_z > T::zero() {
            -(res_s * res_z).logsafe() * (0.5).as_T()
        } else {
            T::infinity()
        }
    }
}

// ---------------------------------------------
// symmetric cone operations
// ---------------------------------------------

impl<T> SymmetricCone<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]) {
        _inv_circ_op(x, &self.λ, z);
    }

    fn mul_W(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        //W is symmetric, so transposition is immaterial
        _soc_mul_W_inner(y, x, α, β, &self.w, self.η);
    }

    fn mul_Winv(&mut self, _is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        _soc_mul_Winv_inner(y, x, α, β, &self.w, self.η);
    }
}

impl<T> JordanAlgebra<T> for SecondOrderCone<T>
where
    T: FloatT,
{
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        _circ_op(x, y, z);
    }

    fn inv_circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        _inv_circ_op(x, y, z);
    }
}

// standalone implementations, so that products like λ = Wz can be
// formed without borrowing self twice

fn _circ_op<T>(x: &mut [T], y: &[T], z: &[T])
where
    T: FloatT,
{
    x[0] = y.dot(z);
    let (y0, z0) = (y[0], z[0]);
    x[1..].waxpby(y0, &z[1..], z0, &y[1..]);
}

fn _inv_circ_op<T>(x: &mut [T], y: &[T], z: &[T])
where
    T: FloatT,
{
    let p = _soc_residual(y);
    let pinv = T::recip(p);
    let v = y[1..].dot(&z[1..]);

    x[0] = (y[0] * z[0] - v) * pinv;

    let c1 = pinv * (v / y[0] - z[0]);
    let c2 = T::recip(y[0]);
    x[1..].waxpby(c1, &y[1..], c2, &z[1..]);
}

// ---------------------------------------------
// internal operations for second order cones
// ---------------------------------------------

fn _soc_residual<T>(z: &[T]) -> T
where
    T: FloatT,
{
    z[0] * z[0] - z[1..].sumsq()
}

fn _sqrt_soc_residual<T>(z: &[T]) -> T
where
    T: FloatT,
{
    let res = _soc_residual(z);
    if res > T::zero() {
        T::sqrt(res)
    } else {
        T::zero()
    }
}

// residual at z + αdz without forming the intermediate vector
fn _soc_residual_shifted<T>(z: &[T], dz: &[T], α: T) -> T
where
    T: FloatT,
{
    let x0 = z[0] + α * dz[0];
    let x1_sq = <[T] as VectorMath<T>>::dot_shifted(&z[1..], &z[1..], &dz[1..], &dz[1..], α);

    x0 * x0 - x1_sq
}

// maximum α ≥ 0 such that x + αy stays in the SOC
fn _step_length_soc_component<T>(x: &[T], y: &[T], αmax: T) -> T
where
    T: FloatT,
{
    // minimum positive root of ||x₁+αy₁||² = (x₀ + αy₀)²,
    // assuming x in the cone

    let two: T = (2.).as_T();
    let four: T = (4.).as_T();

    let a = _soc_residual(y); //can be negative
    let b = two * (x[0] * y[0] - x[1..].dot(&y[1..]));
    let c = T::max(T::zero(), _soc_residual(x));
    let d = b * b - four * a * c;

    #[allow(clippy::if_same_then_else)] //keeps the case explanations separate
    if (a > T::zero() && b > T::zero()) || d < T::zero() {
        //roots all negative or complex pair : unrestricted step
        return αmax;
    } else if a == T::zero() {
        // only one root.  The search direction sits exactly on the
        // cone boundary.  The root would be -c/b, but b can't be
        // negative since both (x,y) are in the self dual cone, so
        // <x,y> ≥ 0 necessarily
        return αmax;
    } else if c == T::zero() {
        // one root at 0, i.e. the starting point is on the boundary.
        // The other root is -b/a.  If the direction is in the cone
        // then a ≥ 0 and b can't be negative by self duality.  If
        // a < 0 the direction is outside and b can't be positive.
        // Either way the step depends on whether the direction is
        // in the cone
        return if a >= T::zero() { αmax } else { T::zero() };
    }

    // a real root pair.  Take the smallest positive root, guarding
    // against cancellation per §1.4 of Goldberg, ACM Computing
    // Surveys 1991
    let t = {
        if b >= T::zero() {
            -b - T::sqrt(d)
        } else {
            -b + T::sqrt(d)
        }
    };

    let r1: T = (two * c) / t;
    let r2: T = t / (two * a);

    let r1 = if r1 < T::zero() { T::infinity() } else { r1 };
    let r2 = if r2 < T::zero() { T::infinity() } else { r2 };

    T::min(αmax, T::min(r1, r2))
}

#[allow(non_snake_case)]
fn _soc_mul_W_inner<T>(y: &mut [T], x: &[T], α: T, β: T, w: &[T], η: T)
where
    T: FloatT,
{
    // fast product form from the ECOS / ECC papers
    let ζ = w[1..].dot(&x[1..]);
    let c = x[0] + ζ / (T::one() + w[0]);

    y[0] = (α * η) * (w[0] * x[0] + ζ) + β * y[0];

    y[1..].axpby(α * η * c, &w[1..], β);
    y[1..].axpby(α * η, &x[1..], T::one());
}

fn _soc_mul_Winv_inner<T>(y: &mut [T], x: &[T], α: T, β: T, w: &[T], η: T)
where
    T: FloatT,
{
    // fast inverse product form from the ECOS / ECC papers
    let ζ = w[1..].dot(&x[1..]);
    let c = -x[0] + ζ / (T::one() + w[0]);

    y[0] = (α / η) * (w[0] * x[0] - ζ) + β * y[0];

    y[1..].axpby(α / η * c, &w[1..], β);
    y[1..].axpby(α / η, &x[1..], T::one());
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    fn scaled_cone() -> (SecondOrderCone<f64>, Vec<f64>, Vec<f64>) {
        let mut K = SecondOrderCone::<f64>::new(3);
        let s = vec![2.0, 0.5, -0.3];
        let z = vec![1.5, -0.2, 0.8];
        assert!(K.update_scaling(&s, &z, 1.0));
        (K, s, z)
    }

    #[test]
    fn test_scaling_point_identities() {
        let (mut K, s, z) = scaled_cone();

        //λ = Wz and λ = W⁻ᵀs must agree
        let mut wz = vec![0.; 3];
        let mut winvs = vec![0.; 3];
        K.mul_W(MatrixShape::N, &mut wz, &z, 1.0, 0.0);
        K.mul_Winv(MatrixShape::T, &mut winvs, &s, 1.0, 0.0);
        assert!(wz.dist(&winvs) < 1e-12);
        assert!(wz.dist(&K.λ) < 1e-12);
    }

    #[test]
    fn test_mul_Hs_consistency() {
        let (mut K, _s, _z) = scaled_cone();

        //W'(Wx) agrees with the fast Hs product
        let x = vec![0.7, -0.3, 0.4];
        let mut wx = vec![0.; 3];
        let mut wtwx = vec![0.; 3];
        K.mul_W(MatrixShape::N, &mut wx, &x, 1.0, 0.0);
        let tmp = wx.clone();
        K.mul_W(MatrixShape::T, &mut wtwx, &tmp, 1.0, 0.0);

        let mut hsx = vec![0.; 3];
        let mut work = vec![0.; 3];
        K.mul_Hs(&mut hsx, &x, &mut work);
        assert!(hsx.dist(&wtwx) < 1e-12);
    }

    #[test]
    fn test_jordan_inverse() {
        let (mut K, _s, _z) = scaled_cone();

        //λ ∘ (λ \ v) = v
        let v = vec![1.1, 0.2, -0.4];
        let mut u = vec![0.; 3];
        let mut w = vec![0.; 3];
        K.λ_inv_circ_op(&mut u, &v);
        let λ = K.λ.clone();
        K.circ_op(&mut w, &λ, &u);
        assert!(w.dist(&v) < 1e-12);
    }

    #[test]
    fn test_step_length_boundary() {
        let mut K = SecondOrderCone::<f64>::new(3);
        let z = vec![1.0, 0.0, 0.0];
        let s = vec![1.0, 0.0, 0.0];

        //direction leaving the cone at α = 0.5 for z
        let dz = vec![-2.0, 0.0, 0.0];
        let ds = vec![1.0, 0.0, 0.0];
        let settings = crate::solver::Settings::default();
        let (αz, αs) = K.step_length(&dz, &ds, &z, &s, &settings, 1.0);
        assert!((αz - 0.5).abs() < 1e-12);
        assert_eq!(αs, 1.0);
    }
}
