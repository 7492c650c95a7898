#![allow(non_snake_case)]

use conix::{algebra::*, solver::*};

//  max w  s.t. (u₁, u₂, w) ∈ GenPow(0.5, 0.5),  u₁ + u₂ = 2
//
//  at the optimum u₁ = u₂ = 1 and w = √(u₁u₂) = 1
#[test]
fn test_genpow_feasible() {
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![0., 0., -1.];

    // cone rows first, then the equality
    let mut A1 = CscMatrix::<f64>::identity(3);
    A1.negate();
    let A2 = CscMatrix::new(1, 3, vec![0, 1, 2, 2], vec![0, 0], vec![1., 1.]);
    let A = CscMatrix::vcat(&A1, &A2);
    let b = vec![0., 0., 0., 2.];

    let cones = vec![
        SupportedCone::GenPower(vec![0.5, 0.5], 1),
        SupportedCone::Zero(1),
    ];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    let refsol = vec![1., 1., 1.];
    assert!(solver.solution.x.dist(&refsol) <= 1e-6);
    assert!(f64::abs(solver.solution.obj_val + 1.) <= 1e-7);
}

//  asymmetric exponents, with the analytic optimum w* = Π uᵢ^αᵢ
#[test]
fn test_genpow_asymmetric_exponents() {
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![0., 0., -1.];

    let mut A1 = CscMatrix::<f64>::identity(3);
    A1.negate();
    //pin u₁ = 1 and u₂ = 8
    let A2 = CscMatrix::new(2, 3, vec![0, 1, 2, 2], vec![0, 1], vec![1., 1.]);
    let A = CscMatrix::vcat(&A1, &A2);
    let b = vec![0., 0., 0., 1., 8.];

    let cones = vec![
        SupportedCone::GenPower(vec![0.75, 0.25], 1),
        SupportedCone::Zero(2),
    ];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::Solved);

    //w* = 1^0.75 * 8^0.25 = 2^0.75
    let wref = (2.0f64).powf(0.75);
    assert!(f64::abs(solver.solution.x[2] - wref) <= 1e-6);
}

#[test]
fn test_genpow_primal_infeasible() {
    //u₁ pinned negative is incompatible with the cone
    let P = CscMatrix::<f64>::zeros((3, 3));
    let q = vec![0., 0., 0.];

    let mut A1 = CscMatrix::<f64>::identity(3);
    A1.negate();
    let A2 = CscMatrix::new(1, 3, vec![0, 1, 1, 1], vec![0], vec![1.]);
    let A = CscMatrix::vcat(&A1, &A2);
    let b = vec![0., 0., 0., -1.];

    let cones = vec![
        SupportedCone::GenPower(vec![0.5, 0.5], 1),
        SupportedCone::Zero(1),
    ];

    let settings = Settings::default();
    let mut solver = Solver::new(&P, &q, &A, &b, &cones, settings);
    solver.solve();

    assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
}
