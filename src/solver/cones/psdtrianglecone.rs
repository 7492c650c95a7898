use super::*;
use crate::algebra::*;
use crate::solver::Settings;

// ------------------------------------
// Positive semidefinite cone (scaled triangular form)
// ------------------------------------

pub struct PSDConeData<T> {
    chol1: CholeskyEngine<T>,
    chol2: CholeskyEngine<T>,
    svd: SVDEngine<T>,
    eig: EigEngine<T>,
    λ: Vec<T>,
    Λisqrt: Vec<T>,
    R: Matrix<T>,
    Rinv: Matrix<T>,
    Hs: Matrix<T>,

    //workspace for various internal uses
    workmat1: Matrix<T>,
    workmat2: Matrix<T>,
    workmat3: Matrix<T>,
    workvec: Vec<T>,
}

impl<T> PSDConeData<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let Bm = triangular_number(n);

        Self {
            chol1: CholeskyEngine::<T>::new(n),
            chol2: CholeskyEngine::<T>::new(n),
            svd: SVDEngine::<T>::new((n, n)),
            eig: EigEngine::<T>::new(n),

            λ: vec![T::zero(); n],
            Λisqrt: vec![T::zero(); n],
            R: Matrix::zeros((n, n)),
            Rinv: Matrix::zeros((n, n)),
            Hs: Matrix::zeros((Bm, Bm)),

            workmat1: Matrix::zeros((n, n)),
            workmat2: Matrix::zeros((n, n)),
            workmat3: Matrix::zeros((n, n)),
            workvec: vec![T::zero(); Bm],
        }
    }
}

pub struct PSDTriangleCone<T> {
    n: usize,     //matrix dimension, i.e. the matrix is n x n
    numel: usize, //number of elements in the packed triangle
    //boxed so the cone variant enum stays small
    data: Box<PSDConeData<T>>,
}

impl<T> PSDTriangleCone<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            n,
            numel: triangular_number(n),
            data: Box::new(PSDConeData::<T>::new(n)),
        }
    }
}

impl<T> Cone<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.n
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn is_symmetric(&self) -> bool {
        true
    }

    fn is_sparse_expandable(&self) -> bool {
        false
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        //scalar equilibration over the cone
        δ.copy_from(e).recip().scale(e.mean());
        true
    }

    fn margins(&mut self, z: &mut [T], _pd: PrimalOrDualCone) -> (T, T) {
        if z.is_empty() {
            (T::max_value(), T::zero())
        } else {
            let Z = &mut self.data.workmat1;
            svec_to_mat(Z, z);
            self.data.eig.eigvals(Z);
            let e = &self.data.eig.λ;
            let α = e.minimum();
            let β = e.iter().fold(T::zero(), |s, x| s + T::max(*x, T::zero()));
            (α, β)
        }
    }

    fn scaled_unit_shift(&self, z: &mut [T], α: T, _pd: PrimalOrDualCone) {
        //adds αI to the vectorized triangle
        for k in 0..self.n {
            z[triangular_index(k)] += α
        }
    }

    fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        s.fill(T::zero());
        z.fill(T::zero());
        self.scaled_unit_shift(s, T::one(), PrimalOrDualCone::PrimalCone);
        self.scaled_unit_shift(z, T::one(), PrimalOrDualCone::DualCone);
    }

    fn set_identity_scaling(&mut self) {
        self.data.R.set_identity();
        self.data.Rinv.set_identity();
        self.data.Hs.set_identity();
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T) -> bool {
        if s.is_empty() {
            //bail early on zero length cone
            return true;
        }

        let f = &mut self.data;
        let (S, Z) = (&mut f.workmat1, &mut f.workmat2);
        svec_to_mat(S, s);
        svec_to_mat(Z, z);

        //Cholesky factors of S and Z.  Failure means the pair is
        //not numerically interior
        if f.chol1.factor(S).is_err() || f.chol2.factor(Z).is_err() {
            return false;
        }
        let (L1, L2) = (&f.chol1.L, &f.chol2.L);

        //SVD of L2'L1
        let tmp = &mut f.workmat1;
        tmp.mul(&L2.t(), L1, T::one(), T::zero());
        if f.svd.factor(tmp).is_err() {
            return false;
        }

        //assemble λ (diagonal), R and Rinv
        f.λ.copy_from(&f.svd.s);
        f.Λisqrt.copy_from(&f.λ).sqrt().recip();

        //R = L1 * V * Λ^{-1/2}
        f.R.mul(L1, &f.svd.Vt.t(), T::one(), T::zero());
        f.R.rscale(&f.Λisqrt);

        //Rinv = Λ^{-1/2} * U' * L2'
        f.Rinv.mul(&f.svd.U.t(), &L2.t(), T::one(), T::zero());
        f.Rinv.lscale(&f.Λisqrt);

        //Hs = (RR') ⊗_s (RR'), stored as its upper triangle
        let RRt = &mut f.workmat1;
        RRt.syrk(&f.R, T::one(), T::zero());
        skron(&mut f.Hs, RRt);

        true
    }

    fn Hs_is_diagonal(&self) -> bool {
        false
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        self.data.Hs.pack_triu(Hsblock);
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        self.mul_W(MatrixShape::N, work, x, T::one(), T::zero()); // work = Wx
        self.mul_W(MatrixShape::T, y, work, T::one(), T::zero()); // y = WᵀWx
    }

    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        ds.fill(T::zero());
        for k in 0..self.n {
            ds[triangular_index(k)] = self.data.λ[k] * self.data.λ[k];
        }
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
        _z: &[T],
        _s: &[T],
        _settings: &Settings<T>,
        αmax: T,
    ) -> (T, T) {
        // d = Δz̃ = WΔz
        _mul_Wx_inner(
            MatrixShape::N,
            &mut self.data.workvec,
            dz,
            T::one(),
            T::zero(),
            &self.data.R,
            &mut self.data.workmat1,
            &mut self.data.workmat2,
            &mut self.data.workmat3,
        );
        let αz = _step_length_psd_component(
            &mut self.data.workmat1,
            &mut self.data.eig,
            &self.data.workvec,
            &self.data.Λisqrt,
            αmax,
        );

        // d = Δs̃ = W⁻ᵀΔs
        _mul_Wx_inner(
            MatrixShape::T,
            &mut self.data.workvec,
            ds,
            T::one(),
            T::zero(),
            &self.data.Rinv,
            &mut self.data.workmat1,
            &mut self.data.workmat2,
            &mut self.data.workmat3,
        );
        let αs = _step_length_psd_component(
            &mut self.data.workmat1,
            &mut self.data.eig,
            &self.data.workvec,
            &self.data.Λisqrt,
            αmax,
        );

        (αz, αs)
    }

    fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let mut barrier = T::zero();
        barrier -= self.logdet_shifted(z, dz, α);
        barrier -= self.logdet_shifted(s, ds, α);
        barrier
    }
}

impl<T> PSDTriangleCone<T>
where
    T: FloatT,
{
    // log(det(X + αdX)), or +∞ if the shifted point is not positive
    // definite
    fn logdet_shifted(&mut self, x: &[T], dx: &[T], α: T) -> T {
        let (Q, q) = (&mut self.data.workmat1, &mut self.data.workvec);
        q.waxpby(T::one(), x, α, dx);
        svec_to_mat(Q, q);

        match self.data.chol1.factor(Q) {
            Ok(_) => self.data.chol1.logdet(),
            Err(_) => T::infinity(),
        }
    }
}

// ---------------------------------------------
// symmetric cone operations
// ---------------------------------------------

impl<T> SymmetricCone<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    // x = λ \ z for the PSD cone
    fn λ_inv_circ_op(&mut self, x: &mut [T], z: &[T]) {
        let X = &mut self.data.workmat1;
        let Z = &mut self.data.workmat2;

        svec_to_mat(X, x);
        svec_to_mat(Z, z);

        let λ = &self.data.λ;
        let two: T = (2.).as_T();
        for i in 0..self.n {
            for j in 0..self.n {
                X[(i, j)] = (two * Z[(i, j)]) / (λ[i] + λ[j]);
            }
        }
        mat_to_svec(x, X);
    }

    fn mul_W(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        _mul_Wx_inner(
            is_transpose,
            y,
            x,
            α,
            β,
            &self.data.R,
            &mut self.data.workmat1,
            &mut self.data.workmat2,
            &mut self.data.workmat3,
        )
    }

    fn mul_Winv(&mut self, is_transpose: MatrixShape, y: &mut [T], x: &[T], α: T, β: T) {
        _mul_Wx_inner(
            is_transpose,
            y,
            x,
            α,
            β,
            &self.data.Rinv,
            &mut self.data.workmat1,
            &mut self.data.workmat2,
            &mut self.data.workmat3,
        )
    }
}

impl<T> JordanAlgebra<T> for PSDTriangleCone<T>
where
    T: FloatT,
{
    fn circ_op(&mut self, x: &mut [T], y: &[T], z: &[T]) {
        let (Y, Z, X) = (
            &mut self.data.workmat1,
            &mut self.data.workmat2,
            &mut self.data.workmat3,
        );
        svec_to_mat(Y, y);
        svec_to_mat(Z, z);

        // X = (YZ + ZY)/2, using that Y and Z are symmetric
        X.syr2k(Y, Z, (0.5).as_T(), T::zero());
        mat_to_svec(x, X);
    }

    fn inv_circ_op(&mut self, _x: &mut [T], _y: &[T], _z: &[T]) {
        // requires solution to a symmetric Sylvester equation for
        // general arguments and is never needed by the solver
        unreachable!();
    }
}

//-----------------------------------------
// internal operations for PSD cones
// ----------------------------------------

#[allow(clippy::too_many_arguments)]
fn _mul_Wx_inner<T>(
    is_transpose: MatrixShape,
    y: &mut [T],
    x: &[T],
    α: T,
    β: T,
    Rx: &Matrix<T>,
    workmat1: &mut Matrix<T>,
    workmat2: &mut Matrix<T>,
    workmat3: &mut Matrix<T>,
) where
    T: FloatT,
{
    let (X, Y, tmp) = (workmat1, workmat2, workmat3);
    svec_to_mat(X, x);
    svec_to_mat(Y, y);

    match is_transpose {
        MatrixShape::T => {
            // Y = α(R X R') + βY, used for Wᵀx and W⁻ᵀx
            tmp.mul(X, &Rx.t(), T::one(), T::zero());
            Y.mul(Rx, tmp, α, β);
        }
        MatrixShape::N => {
            // Y = α(R' X R) + βY, used for Wx and W⁻¹x
            tmp.mul(&Rx.t(), X, T::one(), T::zero());
            Y.mul(tmp, Rx, α, β);
        }
    }
    mat_to_svec(y, Y);
}

fn _step_length_psd_component<T>(
    workΔ: &mut Matrix<T>,
    engine: &mut EigEngine<T>,
    d: &[T],
    Λisqrt: &[T],
    αmax: T,
) -> T
where
    T: FloatT,
{
    let γ = {
        if d.is_empty() {
            T::max_value()
        } else {
            svec_to_mat(workΔ, d);
            workΔ.lrscale(Λisqrt, Λisqrt);
            engine.eigvals(workΔ);
            engine.λ.minimum()
        }
    };

    if γ < T::zero() {
        T::min(-γ.recip(), αmax)
    } else {
        αmax
    }
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    //interior points for the 2x2 PSD cone in svec form
    fn test_pair() -> (Vec<f64>, Vec<f64>) {
        //S = [3 1; 1 2], Z = [2 -0.5; -0.5 1.5]
        let sqrt2 = std::f64::consts::SQRT_2;
        let s = vec![3.0, 1.0 * sqrt2, 2.0];
        let z = vec![2.0, -0.5 * sqrt2, 1.5];
        (s, z)
    }

    #[test]
    fn test_nt_scaling_identities() {
        let mut K = PSDTriangleCone::<f64>::new(2);
        let (s, z) = test_pair();
        assert!(K.update_scaling(&s, &z, 1.0));

        //λ = Wz = W⁻ᵀs
        let mut wz = vec![0.; 3];
        let mut winvs = vec![0.; 3];
        K.mul_W(MatrixShape::N, &mut wz, &z, 1.0, 0.0);
        K.mul_Winv(MatrixShape::T, &mut winvs, &s, 1.0, 0.0);
        assert!(wz.dist(&winvs) < 1e-10);

        //W'(Wx) = (W'W)x via the Hs block
        let x = vec![0.3, -0.7, 1.1];
        let mut wx = vec![0.; 3];
        let mut wtwx = vec![0.; 3];
        K.mul_W(MatrixShape::N, &mut wx, &x, 1.0, 0.0);
        let tmp = wx.clone();
        K.mul_W(MatrixShape::T, &mut wtwx, &tmp, 1.0, 0.0);

        let mut hs = vec![0.; 6];
        K.get_Hs(&mut hs);
        //expand triu packed Hs and multiply
        let mut H = Matrix::<f64>::zeros((3, 3));
        let mut k = 0;
        for col in 0..3 {
            for row in 0..=col {
                H[(row, col)] = hs[k];
                H[(col, row)] = hs[k];
                k += 1;
            }
        }
        let mut hx = vec![0.; 3];
        for i in 0..3 {
            for j in 0..3 {
                hx[i] += H[(i, j)] * x[j];
            }
        }
        assert!(hx.dist(&wtwx) < 1e-9);
    }

    #[test]
    fn test_margins_and_barrier() {
        let mut K = PSDTriangleCone::<f64>::new(2);

        //identity has unit margin
        let mut z = vec![0.; 3];
        K.scaled_unit_shift(&mut z, 1.0, PrimalOrDualCone::PrimalCone);
        let (α, β) = K.margins(&mut z, PrimalOrDualCone::PrimalCone);
        assert!((α - 1.0).abs() < 1e-12);
        assert!((β - 2.0).abs() < 1e-12);

        //barrier is finite inside, infinite outside
        let (s, z) = test_pair();
        let ds = vec![0.; 3];
        let dz = vec![0.; 3];
        assert!(K.compute_barrier(&z, &s, &dz, &ds, 0.0).is_finite());

        let s_bad = vec![1.0, 0.0, -1.0];
        assert!(K
            .compute_barrier(&z, &s_bad, &dz, &ds, 0.0)
            .is_infinite());
    }
}
