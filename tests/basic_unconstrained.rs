#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

#[test]
fn test_unconstrained_qp() {
    // min (1/2)x'x + q'x with no constraints: x = -q
    let P = CscMatrix::<f64>::identity(3);
    let q = vec![1., 2., 3.];
    let A = CscMatrix::<f64>::zeros((0, 3));
    let b = vec![];
    let cones = vec![];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![-1., -2., -3.];
    assert!(solver.solution.x.dist(&refsol) <= 1e-8);
}

#[test]
fn test_unconstrained_rank_deficient() {
    //without any regularization, a rank deficient P must surface as
    //a numerical error rather than a wrong answer
    let P = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.]);
    let q = vec![1., 1.];
    let A = CscMatrix::<f64>::zeros((0, 2));
    let b = vec![];
    let cones = vec![];

    let settings = SettingsBuilder::default()
        .static_regularization_enable(false)
        .dynamic_regularization_enable(false)
        .build()
        .unwrap();

    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::NumericalError);
}
