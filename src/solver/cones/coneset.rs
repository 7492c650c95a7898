use super::*;
use crate::algebra::*;
use crate::solver::Settings;
use std::ops::Range;

// -------------------------------------
// Cartesian product of cones, in the order given by the problem
// specification
// -------------------------------------

pub struct ConeSet<T: FloatT = f64> {
    cones: Vec<ConeImpl<T>>,

    //overall size and barrier degree
    numel: usize,
    degree: usize,

    //index ranges of the constituent cones within (s,z)
    pub(crate) rng_cones: Vec<Range<usize>>,

    //index ranges of the constituent Hs blocks, which are larger
    //than the cone ranges for cones with dense Hs blocks
    pub(crate) rng_blocks: Vec<Range<usize>>,

    _is_symmetric: bool,
}

impl<T> ConeSet<T>
where
    T: FloatT,
{
    pub fn new(types: &[SupportedCone<T>]) -> Self {
        let mut cones: Vec<ConeImpl<T>> = Vec::with_capacity(types.len());
        let mut _is_symmetric = true;

        for t in types.iter() {
            let cone = make_cone(t);
            _is_symmetric = _is_symmetric && cone.is_symmetric();
            cones.push(cone);
        }

        let numel = cones.iter().map(|c| c.numel()).sum();
        let degree = cones.iter().map(|c| c.degree()).sum();

        let rng_cones = _make_rng_cones(&cones);
        let rng_blocks = _make_rng_blocks(&cones);

        Self {
            cones,
            numel,
            degree,
            rng_cones,
            rng_blocks,
            _is_symmetric,
        }
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
    pub(crate) fn iter(&self) -> std::slice::Iter<'_, ConeImpl<T>> {
        self.cones.iter()
    }
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ConeImpl<T>> {
        self.cones.iter_mut()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }
    pub fn numel(&self) -> usize {
        self.numel
    }
    pub fn is_symmetric(&self) -> bool {
        self._is_symmetric
    }

    // total count of the aggregated margins over all cones, and
    // the minimum margin
    pub(crate) fn margins(&mut self, z: &mut [T], pd: PrimalOrDualCone) -> (T, T) {
        let mut α = T::max_value();
        let mut β = T::zero();

        for (cone, rng) in self.cones.iter_mut().zip(self.rng_cones.iter()) {
            let (αi, βi) = cone.margins(&mut z[rng.clone()], pd);
            α = T::min(α, αi);
            β += βi;
        }
        (α, β)
    }

    pub(crate) fn scaled_unit_shift(&self, z: &mut [T], α: T, pd: PrimalOrDualCone) {
        for (cone, rng) in self.iter().zip(self.rng_cones.iter()) {
            cone.scaled_unit_shift(&mut z[rng.clone()], α, pd);
        }
    }

    pub(crate) fn unit_initialization(&self, z: &mut [T], s: &mut [T]) {
        for (cone, rng) in self.iter().zip(self.rng_cones.iter()) {
            cone.unit_initialization(&mut z[rng.clone()], &mut s[rng.clone()]);
        }
    }

    pub(crate) fn set_identity_scaling(&mut self) {
        for cone in self.iter_mut() {
            cone.set_identity_scaling();
        }
    }

    pub(crate) fn update_scaling(&mut self, s: &[T], z: &[T], μ: T) -> bool {
        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        let mut is_scaling_success = true;
        for (cone, rng) in cones.iter_mut().zip(rngs.iter()) {
            let si = &s[rng.clone()];
            let zi = &z[rng.clone()];
            is_scaling_success = cone.update_scaling(si, zi, μ);
            if !is_scaling_success {
                break;
            }
        }
        is_scaling_success
    }

    pub(crate) fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        let mut any_changed = false;

        //the caller updates e <- δ .* e if anything changed here
        δ.fill(T::one());
        for (cone, rng) in self.iter().zip(self.rng_cones.iter()) {
            let δi = &mut δ[rng.clone()];
            let ei = &e[rng.clone()];
            any_changed |= cone.rectify_equilibration(δi, ei);
        }
        any_changed
    }

    pub(crate) fn get_Hs(&self, Hsblock: &mut [T]) {
        for (cone, rng) in self.iter().zip(self.rng_blocks.iter()) {
            cone.get_Hs(&mut Hsblock[rng.clone()]);
        }
    }

    pub(crate) fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        for (cone, rng) in cones.iter_mut().zip(rngs.iter()) {
            cone.mul_Hs(&mut y[rng.clone()], &x[rng.clone()], &mut work[rng.clone()]);
        }
    }

    pub(crate) fn affine_ds(&self, ds: &mut [T], s: &[T]) {
        for (cone, rng) in self.iter().zip(self.rng_cones.iter()) {
            cone.affine_ds(&mut ds[rng.clone()], &s[rng.clone()]);
        }
    }

    pub(crate) fn combined_ds_shift(
        &mut self,
        shift: &mut [T],
        step_z: &mut [T],
        step_s: &mut [T],
        σμ: T,
    ) {
        // cones may modify internal state when computing the shift,
        // so an explicit mutable borrow of the cone vector is needed
        // alongside the ranges
        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        for (cone, rng) in cones.iter_mut().zip(rngs) {
            let shifti = &mut shift[rng.clone()];
            let step_zi = &mut step_z[rng.clone()];
            let step_si = &mut step_s[rng.clone()];
            cone.combined_ds_shift(shifti, step_zi, step_si, σμ);
        }
    }

    pub(crate) fn Δs_from_Δz_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]) {
        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        for (cone, rng) in cones.iter_mut().zip(rngs) {
            let outi = &mut out[rng.clone()];
            let dsi = &ds[rng.clone()];
            let worki = &mut work[rng.clone()];
            let zi = &z[rng.clone()];
            cone.Δs_from_Δz_offset(outi, dsi, worki, zi);
        }
    }

    pub(crate) fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &Settings<T>,
        αmax: T,
    ) -> (T, T) {
        let mut α = αmax;

        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        // symmetric cones first
        for (cone, rng) in cones.iter_mut().zip(rngs.iter()) {
            if !cone.is_symmetric() {
                continue;
            }
            let (dzi, dsi) = (&dz[rng.clone()], &ds[rng.clone()]);
            let (zi, si) = (&z[rng.clone()], &s[rng.clone()]);
            let (nextαz, nextαs) = cone.step_length(dzi, dsi, zi, si, settings, α);
            α = T::min(α, T::min(nextαz, nextαs));
        }

        // back away from a full step for asymmetric cones, so that
        // centrality checks and logarithms stay off the boundary
        if !self._is_symmetric {
            let ceil: T = (0.99_f64).as_T();
            α = T::min(ceil, α);
        }

        // asymmetric cones last
        for (cone, rng) in cones.iter_mut().zip(rngs.iter()) {
            if cone.is_symmetric() {
                continue;
            }
            let (dzi, dsi) = (&dz[rng.clone()], &ds[rng.clone()]);
            let (zi, si) = (&z[rng.clone()], &s[rng.clone()]);
            let (nextαz, nextαs) = cone.step_length(dzi, dsi, zi, si, settings, α);
            α = T::min(α, T::min(nextαz, nextαs));
        }

        (α, α)
    }

    pub(crate) fn compute_barrier(&mut self, z: &[T], s: &[T], dz: &[T], ds: &[T], α: T) -> T {
        let mut barrier = T::zero();

        let cones = &mut self.cones;
        let rngs = &self.rng_cones;

        for (cone, rng) in cones.iter_mut().zip(rngs.iter()) {
            let zi = &z[rng.clone()];
            let si = &s[rng.clone()];
            let dzi = &dz[rng.clone()];
            let dsi = &ds[rng.clone()];
            barrier += cone.compute_barrier(zi, si, dzi, dsi, α);
        }
        barrier
    }
}

fn _make_rng_cones<T>(cones: &[ConeImpl<T>]) -> Vec<Range<usize>>
where
    T: FloatT,
{
    let mut rngs = Vec::with_capacity(cones.len());
    let mut start = 0;

    for cone in cones {
        let stop = start + cone.numel();
        rngs.push(start..stop);
        start = stop;
    }
    rngs
}

fn _make_rng_blocks<T>(cones: &[ConeImpl<T>]) -> Vec<Range<usize>>
where
    T: FloatT,
{
    let mut rngs = Vec::with_capacity(cones.len());
    let mut start = 0;

    for cone in cones {
        let nvars = cone.numel();
        let stop = start + {
            if cone.Hs_is_diagonal() {
                nvars
            } else {
                triangular_number(nvars)
            }
        };
        rngs.push(start..stop);
        start = stop;
    }
    rngs
}

// ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_and_degree() {
        let cones = ConeSet::<f64>::new(&[
            SupportedCone::Zero(2),
            SupportedCone::Nonnegative(3),
            SupportedCone::SecondOrder(3),
        ]);

        assert_eq!(cones.numel(), 8);
        assert_eq!(cones.degree(), 4); //0 + 3 + 1
        assert!(cones.is_symmetric());
        assert_eq!(cones.rng_cones, vec![0..2, 2..5, 5..8]);

        //small SOC is not expandable, so its Hs block is a dense triangle
        assert_eq!(cones.rng_blocks, vec![0..2, 2..5, 5..11]);
    }

    #[test]
    fn test_asymmetric_flag() {
        let cones = ConeSet::<f64>::new(&[
            SupportedCone::Nonnegative(1),
            SupportedCone::GenPower(vec![0.5, 0.5], 1),
        ]);
        assert!(!cones.is_symmetric());
        assert_eq!(cones.degree(), 1 + 3);
    }
}
