#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  equality constrained QP: min (1/2)‖x‖² s.t. 1'x = 1
#[test]
fn test_eq_constrained_qp() {
    let P = CscMatrix::<f64>::identity(2);
    let q = vec![0., 0.];
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1., 1.]);
    let b = vec![1.];
    let cones = vec![SupportedCone::Zero(1)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![0.5, 0.5];
    assert!(solver.solution.x.dist(&refsol) <= 1e-8);
    assert!(f64::abs(solver.solution.obj_val - 0.25) <= 1e-8);

    //with no conic part the problem reduces to a single Newton
    //solve of the augmented system
    assert!(solver.solution.iterations <= 3);
}

#[test]
fn test_eq_constrained_lp() {
    //a pure equality LP is solved by its unique feasible point
    let P = CscMatrix::<f64>::zeros((2, 2));
    let q = vec![1., -1.];
    let A = CscMatrix::from(&[
        [1., 1.], //
        [1., -1.], //
    ]);
    let b = vec![1., 0.];
    let cones = vec![SupportedCone::Zero(2)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);
    let refsol = vec![0.5, 0.5];
    assert!(solver.solution.x.dist(&refsol) <= 1e-8);
}
