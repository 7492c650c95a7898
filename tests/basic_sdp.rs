#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  min x  s.t.  [x 1; 1 x] ⪰ 0
//
//  the PSD slack in svec form is s = (x, √2, x)
#[test]
fn test_sdp_scalar_bound() {
    let sqrt2 = std::f64::consts::SQRT_2;

    let P = CscMatrix::<f64>::zeros((1, 1));
    let q = vec![1.];
    let A = CscMatrix::new(3, 1, vec![0, 2], vec![0, 2], vec![-1., -1.]);
    let b = vec![0., sqrt2, 0.];
    let cones = vec![SupportedCone::PSDTriangle(2)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //X = [x 1; 1 x] is PSD iff x ≥ 1
    assert!(f64::abs(solver.solution.x[0] - 1.) <= 1e-6);
    assert!(f64::abs(solver.solution.obj_val - 1.) <= 1e-6);
}

//  projection onto the PSD cone: min (1/2)‖X - C‖²_F over X ⪰ 0
//
//  with C = diag(1, -1) the projection is diag(1, 0)
#[test]
fn test_sdp_projection() {
    let sqrt2 = std::f64::consts::SQRT_2;

    // variables are svec(X) = (x₁₁, √2·x₁₂, x₂₂), in which the
    // Frobenius norm is the Euclidean norm
    let P = CscMatrix::<f64>::identity(3);
    let c = vec![1., 0.4 * sqrt2, -1.];
    let mut q = c.clone();
    q.negate();

    let mut A = CscMatrix::<f64>::identity(3);
    A.negate();
    let b = vec![0.; 3];
    let cones = vec![SupportedCone::PSDTriangle(2)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //eigen decomposition of C = [1 0.4; 0.4 -1] and projection by
    //truncating the negative eigenvalue
    let lam = (1.0f64 + 0.4 * 0.4).sqrt(); //eigenvalues are ±√1.16
    //unit eigenvector for +λ
    let v = {
        let vx = 0.4;
        let vy = lam - 1.0;
        let nrm = (vx * vx + vy * vy).sqrt();
        [vx / nrm, vy / nrm]
    };
    let refX = [
        lam * v[0] * v[0], //x₁₁
        lam * v[0] * v[1] * sqrt2,
        lam * v[1] * v[1], //x₂₂
    ];

    assert!(solver.solution.x.dist(&refX) <= 1e-6);
}

#[test]
fn test_sdp_infeasible() {
    //X ⪰ 0 with trace(X) forced negative
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![0., 0., 0.];

    let mut A1 = CscMatrix::<f64>::identity(3);
    A1.negate();
    //trace row in svec coordinates
    let A2 = CscMatrix::new(1, 3, vec![0, 1, 1, 2], vec![0, 0], vec![1., 1.]);
    let A = CscMatrix::vcat(&A1, &A2);
    let b = vec![0., 0., 0., -1.];

    let cones = vec![SupportedCone::PSDTriangle(2), SupportedCone::Nonnegative(1)];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
}
