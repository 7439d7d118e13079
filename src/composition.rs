//! Composition polynomial (§4.4). Combines an AIR's transition and boundary
//! constraints into a single polynomial `H` whose evaluation over the LDE
//! domain the prover commits to; `H` has low degree exactly when every
//! constraint is satisfied everywhere (outside declared exemptions).

use crate::air::{Air, BoundaryCondition, Frame, MaskItem};
use crate::field::{BaseFE, ExtFE, IsField};
use crate::lde::LdeManager;

/// Divides out the vanishing polynomial of the full trace domain,
/// `Z_trace(x) = x^n - 1`, from the transition part of `H`.
fn eval_trace_zerofier(trace_length: usize, point: ExtFE) -> ExtFE {
    point.pow(trace_length as u64) - ExtFE::one()
}

/// Divides out `(x - root^row)` for a single boundary condition.
fn eval_boundary_zerofier(root: BaseFE, row: usize, point: ExtFE) -> ExtFE {
    point - ExtFE::from_base(root.pow(row as u64))
}

/// Evaluates `H` at one out-of-domain or in-domain point `x`, given the
/// trace's (and, for the second round, composition-trace's) column values
/// at every mask position already gathered into `frame`.
pub struct CompositionEvaluator<'a, A: Air> {
    pub air: &'a A,
    pub trace_root: BaseFE,
    pub random_coefficients: &'a [ExtFE],
}

impl<'a, A: Air> CompositionEvaluator<'a, A> {
    pub fn eval_at_point(
        &self,
        point: ExtFE,
        frame: &Frame<ExtFE>,
        periodic_values: &[ExtFE],
        trace_values_at_point: &[ExtFE],
    ) -> ExtFE {
        let transition_num = self
            .air
            .eval_transition(frame, periodic_values, self.random_coefficients);
        let transition_den = eval_trace_zerofier(self.air.trace_length(), point);
        let mut acc = transition_num * transition_den.inv().expect("trace zerofier is nonzero off-domain");

        let boundary_conditions = self.air.boundary_conditions();
        let n_transition_coeffs = self.air.mask().len().max(1);
        for (i, bc) in boundary_conditions.iter().enumerate() {
            let coeff = self
                .random_coefficients
                .get(n_transition_coeffs + i)
                .copied()
                .unwrap_or(ExtFE::one());
            let column_value = trace_values_at_point[bc.column];
            let num = column_value - bc.value;
            let den = eval_boundary_zerofier(self.trace_root, bc.row, point);
            acc += num * coeff * den.inv().expect("boundary zerofier is nonzero off-domain");
        }
        acc
    }
}

/// Evaluates `H` over every point of the LDE domain, reading trace column
/// values out of `lde` rather than recomputing them (§4.4: "bit-reversed
/// coset evaluation"). Parallelized over LDE domain chunks per §5.
pub fn eval_on_domain<A: Air + Sync>(
    air: &A,
    lde: &LdeManager<BaseFE>,
    mask: &[MaskItem],
    random_coefficients: &[ExtFE],
) -> Vec<ExtFE> {
    let trace_length = air.trace_length();
    let lde_size = lde.lde_domain().size();
    let lde_gen = lde.lde_domain().generator();
    let trace_root = lde
        .trace_domain()
        .generator();

    let evaluator = CompositionEvaluator {
        air,
        trace_root,
        random_coefficients,
    };

    let eval_one = |natural_index: usize| -> ExtFE {
        let point = ExtFE::from_base(lde.lde_domain().point_at_natural_index(natural_index));
        let frame_values: Vec<ExtFE> = mask
            .iter()
            .map(|item| {
                let shifted = (natural_index + item.row_offset * (lde_size / trace_length)) % lde_size;
                ExtFE::from_base(lde.eval_on_lde_domain(item.column, shifted))
            })
            .collect();
        let frame = Frame { values: &frame_values };
        let n_columns = air.n_columns();
        let trace_values_at_point: Vec<ExtFE> = (0..n_columns)
            .map(|c| ExtFE::from_base(lde.eval_on_lde_domain(c, natural_index)))
            .collect();
        let periodic_values: Vec<ExtFE> = air
            .periodic_columns()
            .iter()
            .map(|col| ExtFE::from_base(col.eval_at_row(natural_index % trace_length)))
            .collect();
        evaluator.eval_at_point(point, &frame, &periodic_values, &trace_values_at_point)
    };

    let _ = lde_gen;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..lde_size).into_par_iter().map(eval_one).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..lde_size).map(eval_one).collect()
    }
}
