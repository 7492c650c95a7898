#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  min (1/2)‖x - c‖²  s.t. x ≥ 0, with c = [1,2,3]
#[allow(clippy::type_complexity)]
fn projection_qp_data() -> (
    CscMatrix<f64>,
    Vec<f64>,
    CscMatrix<f64>,
    Vec<f64>,
    Vec<SupportedCone<f64>>,
) {
    let P = CscMatrix::<f64>::identity(3);
    let q = vec![-1., -2., -3.];

    let mut A = CscMatrix::<f64>::identity(3);
    A.negate();
    let b = vec![0.; 3];

    let cones = vec![SupportedCone::Nonnegative(3)];

    (P, q, A, b, cones)
}

#[test]
fn test_qp_projection() {
    let (P, q, A, b, cones) = projection_qp_data();

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //the target point is feasible, so the projection is exact and
    //(1/2)‖x - c‖² = obj_val + (1/2)c'c = 0
    let refsol = vec![1., 2., 3.];
    assert!(solver.solution.x.dist(&refsol) <= 1e-6);
    assert!(f64::abs(solver.solution.obj_val + 7.) <= 1e-6);
}

#[test]
fn test_qp_feasible() {
    // P = [4 1; 1 2], box constrained
    let P = CscMatrix::new(
        2,
        2,
        vec![0, 2, 4],
        vec![0, 1, 0, 1],
        vec![4., 1., 1., 2.],
    );

    let A = CscMatrix::new(
        3,
        2,
        vec![0, 2, 4],
        vec![0, 1, 0, 2],
        vec![1., 1., 1., 1.],
    );
    let (mut A1, A2) = (A.clone(), A);
    A1.negate();
    let A = CscMatrix::vcat(&A1, &A2);

    let q = vec![1., 1.];
    let b = vec![-1., 0., 0., 1., 0.7, 0.7];

    let cones = vec![SupportedCone::Nonnegative(3), SupportedCone::Nonnegative(3)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![0.3, 0.7];
    assert!(solver.solution.x.dist(&refsol) <= 1e-6);

    let refobj = 1.8800000298331538;
    assert!(f64::abs(solver.solution.obj_val - refobj) <= 1e-6);
    assert!(f64::abs(solver.solution.obj_val_dual - refobj) <= 1e-6);
}

#[test]
fn test_qp_dual_infeasible() {
    // P singular along the unbounded direction
    let P = CscMatrix::<f64>::new(
        2,
        2,
        vec![0, 2, 4],
        vec![0, 1, 0, 1],
        vec![1., 1., 1., 1.],
    );

    let A = CscMatrix::<f64>::new(2, 2, vec![0, 2, 3], vec![0, 1, 0], vec![1., 1., 1.]);

    let q = vec![1., -1.];
    let b = vec![1., 1.];

    let cones = vec![SupportedCone::Nonnegative(2)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::DualInfeasible);
    assert!(solver.solution.obj_val.is_nan());
    assert!(solver.solution.obj_val_dual.is_nan());
}
