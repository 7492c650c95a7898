#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  min q'x  s.t. x ≥ 0, 1'x = 1
#[allow(clippy::type_complexity)]
fn simplex_lp_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<SupportedCone<f64>>,
) {
    let P = CscMatrix::<f64>::zeros((2, 2));
    let q = vec![1., 1.];

    // A = [-I; 1']
    let A = CscMatrix::new(
        3,
        2,
        vec![0, 2, 4],
        vec![0, 2, 1, 2],
        vec![-1., 1., -1., 1.],
    );
    let b = vec![0., 0., 1.];

    let cones = vec![SupportedCone::Nonnegative(2), SupportedCone::Zero(1)];

    (P, q, A, b, cones)
}

#[test]
fn test_lp_simplex() {
    let (P, q, A, b, cones) = simplex_lp_data();

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //optimal value is 1 anywhere on the simplex
    assert!(f64::abs(solver.solution.obj_val - 1.) <= 1e-8);
    assert!(f64::abs(solver.solution.obj_val_dual - 1.) <= 1e-8);

    //feasibility ‖Ax + s - b‖ and the duality gap.  The dual
    //objective in this formulation is -b'z
    let x = &solver.solution.x;
    let z = &solver.solution.z;
    let mut r = b.clone();
    A.gemv(&mut r, x, 1.0, -1.0);
    r.axpby(1.0, &solver.solution.s, 1.0);
    assert!(r.norm_inf() < 1e-8);
    assert!(f64::abs(q.dot(x) + b.dot(z)) <= 1e-8);
}

#[test]
fn test_lp_primal_infeasible() {
    // x ≥ 0 and x ≤ -1 simultaneously
    let P = CscMatrix::<f64>::zeros((1, 1));
    let q = vec![1.];
    let A = CscMatrix::new(2, 1, vec![0, 2], vec![0, 1], vec![-1., 1.]);
    let b = vec![0., -1.];
    let cones = vec![SupportedCone::Nonnegative(2)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
    assert!(solver.solution.obj_val.is_nan());
    assert!(solver.solution.obj_val_dual.is_nan());
}

#[test]
fn test_lp_dual_infeasible() {
    // min -x s.t. x ≥ 0 is unbounded below
    let P = CscMatrix::<f64>::zeros((1, 1));
    let q = vec![-1.];
    let A = CscMatrix::new(1, 1, vec![0, 1], vec![0], vec![-1.]);
    let b = vec![0.];
    let cones = vec![SupportedCone::Nonnegative(1)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::DualInfeasible);
    assert!(solver.solution.obj_val.is_nan());
}

#[test]
fn test_lp_box() {
    // min q'x over the box -1 ≤ x ≤ 1, scaled by 2
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![3., -2., 1.];

    let I1 = CscMatrix::<f64>::identity(3);
    let mut I2 = CscMatrix::<f64>::identity(3);
    I2.negate();
    let mut A = CscMatrix::vcat(&I1, &I2);
    A.scale(2.);

    let b = vec![1.; 6];
    let cones = vec![SupportedCone::Nonnegative(3), SupportedCone::Nonnegative(3)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![-0.5, 0.5, -0.5];
    assert!(solver.solution.x.dist(&refsol) <= 1e-8);
    assert!(f64::abs(solver.solution.obj_val - (-3.)) <= 1e-8);
}
