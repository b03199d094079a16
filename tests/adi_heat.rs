//! Two-dimensional diffusion checked against separable decay solutions.

use std::cell::RefCell;
use std::rc::Rc;

use openferric_fdm::boundary::{BoundaryConditionSet, BoundaryKind, BoundarySide};
use openferric_fdm::conditions::StepConditionSet;
use openferric_fdm::core::FdmError;
use openferric_fdm::mesher::{GridMesher, Mesh1d};
use openferric_fdm::operator::derivative::second_derivative;
use openferric_fdm::operator::{mixed_derivative, NinePointOp, PdeOperator, TripleBandOp};
use openferric_fdm::scheme::SchemeDesc;
use openferric_fdm::solver::BackwardSolver;

/// Constant-coefficient diffusion `kappa (u_xx + u_yy) + cross u_xy`.
struct DiffusionOp {
    ops: Vec<TripleBandOp>,
    mixed: NinePointOp,
}

impl DiffusionOp {
    fn new(mesher: &GridMesher, kappa: f64, cross: f64) -> Result<Self, FdmError> {
        let ops = vec![
            second_derivative(mesher, 0)?.mult(&[kappa]),
            second_derivative(mesher, 1)?.mult(&[kappa]),
        ];
        let mixed = mixed_derivative(mesher, 0, 1)?.mult(&[cross]);
        Ok(Self { ops, mixed })
    }
}

impl PdeOperator for DiffusionOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&mut self, _t1: f64, _t2: f64) -> Result<(), FdmError> {
        Ok(())
    }

    fn apply(&self, r: &[f64]) -> Vec<f64> {
        let mut out = self.ops[0].apply(r);
        for (o, v) in out.iter_mut().zip(self.ops[1].apply(r)) {
            *o += v;
        }
        for (o, v) in out.iter_mut().zip(self.mixed.apply(r)) {
            *o += v;
        }
        out
    }

    fn apply_direction(&self, direction: usize, r: &[f64]) -> Vec<f64> {
        self.ops[direction].apply(r)
    }

    fn apply_mixed(&self, r: &[f64]) -> Vec<f64> {
        self.mixed.apply(r)
    }

    fn solve_splitting(&self, direction: usize, r: &[f64], s: f64) -> Result<Vec<f64>, FdmError> {
        self.ops[direction].solve_splitting(r, s, 1.0)
    }

    fn preconditioner(&self, r: &[f64], s: f64) -> Result<Vec<f64>, FdmError> {
        let first = self.ops[0].solve_splitting(r, s, 1.0)?;
        self.ops[1].solve_splitting(&first, s, 1.0)
    }
}

fn unit_square(n: usize) -> Rc<GridMesher> {
    Rc::new(
        GridMesher::from_axes(vec![
            Mesh1d::uniform(0.0, 1.0, n).unwrap(),
            Mesh1d::uniform(0.0, 1.0, n).unwrap(),
        ])
        .unwrap(),
    )
}

fn zero_faces(mesher: &GridMesher) -> Rc<BoundaryConditionSet> {
    let mut set = BoundaryConditionSet::new();
    for direction in 0..2 {
        for side in [BoundarySide::Lower, BoundarySide::Upper] {
            set.push(
                BoundaryKind::Dirichlet { value: 0.0 }
                    .build(mesher, direction, side)
                    .unwrap(),
            );
        }
    }
    Rc::new(set)
}

fn sine_mode(mesher: &GridMesher) -> Vec<f64> {
    mesher
        .layout()
        .clone()
        .cells()
        .map(|c| {
            let x = mesher.location(&c.coords, 0);
            let y = mesher.location(&c.coords, 1);
            (std::f64::consts::PI * x).sin() * (std::f64::consts::PI * y).sin()
        })
        .collect()
}

fn rollback(
    mesher: &Rc<GridMesher>,
    cross: f64,
    scheme: SchemeDesc,
    steps: usize,
) -> Vec<f64> {
    let map = Rc::new(RefCell::new(DiffusionOp::new(mesher, 1.0, cross).unwrap()));
    let solver = BackwardSolver::new(
        map,
        zero_faces(mesher),
        Rc::new(StepConditionSet::new()),
        scheme,
    );
    let mut rhs = sine_mode(mesher);
    solver.rollback(&mut rhs, 0.05, 0.0, steps, 0).unwrap();
    rhs
}

#[test]
fn separable_mode_decays_at_the_analytic_rate() {
    let mesher = unit_square(30);
    let tau = 0.05;
    let factor = (-2.0 * std::f64::consts::PI * std::f64::consts::PI * tau).exp();
    let initial = sine_mode(&mesher);

    for scheme in [
        SchemeDesc::douglas(),
        SchemeDesc::craig_sneyd(),
        SchemeDesc::modified_craig_sneyd(),
        SchemeDesc::hundsdorfer(),
        SchemeDesc::modified_hundsdorfer(),
        SchemeDesc::trbdf2(),
        SchemeDesc::implicit_euler(),
        SchemeDesc::implicit_euler().with_gmres(),
        SchemeDesc::method_of_lines(),
    ] {
        let result = rollback(&mesher, 0.0, scheme, 50);
        let layout = mesher.layout().clone();
        for cell in layout.cells() {
            let expect = factor * initial[cell.index];
            let tol = 0.02 * factor + 1.0e-4;
            assert!(
                (result[cell.index] - expect).abs() < tol,
                "{:?} at {:?}: {} vs {expect}",
                scheme.kind,
                cell.coords,
                result[cell.index]
            );
        }
    }
}

#[test]
fn mixed_derivative_schemes_agree_on_a_correlated_operator() {
    let mesher = unit_square(25);
    // fine-step backward Euler as the reference for the correlated case
    let reference = rollback(&mesher, 0.5, SchemeDesc::implicit_euler(), 800);
    let peak = reference
        .iter()
        .cloned()
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    assert!(peak > 0.1, "reference decayed implausibly far: {peak}");

    for scheme in [
        SchemeDesc::craig_sneyd(),
        SchemeDesc::modified_craig_sneyd(),
        SchemeDesc::hundsdorfer(),
    ] {
        let result = rollback(&mesher, 0.5, scheme, 50);
        for (i, (&r, &q)) in result.iter().zip(&reference).enumerate() {
            assert!(
                (r - q).abs() < 0.02 * peak,
                "{:?} at {i}: {r} vs {q}",
                scheme.kind
            );
        }
    }
}

#[test]
fn neumann_faces_preserve_a_flat_profile() {
    let mesher = unit_square(20);
    let mut set = BoundaryConditionSet::new();
    for direction in 0..2 {
        for side in [BoundarySide::Lower, BoundarySide::Upper] {
            set.push(
                BoundaryKind::Neumann { value: 0.0 }
                    .build(&mesher, direction, side)
                    .unwrap(),
            );
        }
    }
    let map = Rc::new(RefCell::new(DiffusionOp::new(&mesher, 1.0, 0.0).unwrap()));
    let solver = BackwardSolver::new(
        map,
        Rc::new(set),
        Rc::new(StepConditionSet::new()),
        SchemeDesc::douglas(),
    );
    // a constant is in the kernel of the diffusion operator
    let mut rhs = vec![0.75; mesher.layout().size()];
    solver.rollback(&mut rhs, 0.05, 0.0, 20, 0).unwrap();
    for &v in &rhs {
        assert!((v - 0.75).abs() < 1.0e-10);
    }
}
