#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  min t  s.t. ‖(x₁,x₂)‖ ≤ t,  x₁ + x₂ = 1
//
//  variables ordered (x₁, x₂, t)
#[allow(clippy::type_complexity)]
fn min_norm_socp_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<SupportedCone<f64>>,
) {
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![0., 0., 1.];

    //first row is the equality, then the cone rows (t, x₁, x₂)
    let A = CscMatrix::new(
        4,
        3,
        vec![0, 2, 4, 5],
        vec![0, 2, 0, 3, 1],
        vec![1., -1., 1., -1., -1.],
    );
    let b = vec![1., 0., 0., 0.];

    let cones = vec![SupportedCone::Zero(1), SupportedCone::SecondOrder(3)];

    (P, q, A, b, cones)
}

#[test]
fn test_socp_min_norm() {
    let (P, q, A, b, cones) = min_norm_socp_data();

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let isqrt2 = std::f64::consts::FRAC_1_SQRT_2;
    let refsol = vec![0.5, 0.5, isqrt2];
    assert!(solver.solution.x.dist(&refsol) <= 1e-7);
    assert!(f64::abs(solver.solution.obj_val - isqrt2) <= 1e-8);
}

#[test]
fn test_socp_expanded_cone() {
    //a cone large enough to take the sparse rank-2 KKT expansion:
    //projection of a point onto a shifted second order cone
    let n = 6;
    let P = CscMatrix::<f64>::identity(n);

    //target point outside the cone
    let c = vec![-1., 1., 1., 1., 1., 1.];
    let mut q = c.clone();
    q.negate();

    let mut A = CscMatrix::<f64>::identity(n);
    A.negate();
    let b = vec![0.; n];

    let cones = vec![SupportedCone::SecondOrder(n)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //the projection satisfies x - c ⊥ boundary ray and x on the cone
    let x = &solver.solution.x;
    let t = x[0];
    let xr = &x[1..];
    assert!((t - xr.norm()).abs() <= 1e-6);

    //projection of (-1, v) with ‖v‖ = √5: radial part shrinks to
    //(√5 - 1)/2 of length, axial part equals the radial norm
    let norm_v = (5.0f64).sqrt();
    let scale = (norm_v - 1.0) / 2.0 / norm_v;
    let tref = scale * norm_v;
    assert!((t - tref).abs() <= 1e-6);
    for xi in &x[1..] {
        assert!((xi - scale).abs() <= 1e-6);
    }
}

#[test]
fn test_socp_infeasible() {
    //‖(x₁,x₂)‖ ≤ t with t forced negative
    let (P, q, mut A, mut b, mut cones) = min_norm_socp_data();

    //add the row t ≤ -1
    let row = CscMatrix::new(1, 3, vec![0, 0, 0, 1], vec![0], vec![1.]);
    A = CscMatrix::vcat(&A, &row);
    b.push(-1.);
    cones.push(SupportedCone::Nonnegative(1));

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
}
