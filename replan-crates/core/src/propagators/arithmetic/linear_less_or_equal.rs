use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// The [`PropagatorConstructor`] for the [`LinearLessOrEqualPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct LinearLessOrEqualPropagatorArgs {
    /// The weighted terms `w_i * x_i` of the left-hand side.
    pub(crate) terms: Box<[(i32, DomainId)]>,
    pub(crate) c: i32,
}

impl PropagatorConstructor for LinearLessOrEqualPropagatorArgs {
    type PropagatorImpl = LinearLessOrEqualPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let LinearLessOrEqualPropagatorArgs { terms, mut c } = self;

        // Fixed terms are folded into the right-hand side.
        let domains = context.domains();
        c -= terms
            .iter()
            .filter(|&&(_, var)| domains.is_fixed(var))
            .map(|&(weight, var)| weight * domains.lower_bound(var))
            .sum::<i32>();
        let terms: Box<[(i32, DomainId)]> = terms
            .iter()
            .filter(|&&(weight, var)| weight != 0 && !domains.is_fixed(var))
            .copied()
            .collect();

        for &(weight, var) in terms.iter() {
            // The minimum of the left-hand side only depends on one bound of each variable.
            let events = if weight > 0 {
                DomainEvents::LOWER_BOUND
            } else {
                DomainEvents::UPPER_BOUND
            };
            context.register(var, events);
        }

        LinearLessOrEqualPropagator { terms, c }
    }
}

/// Propagator for the constraint `\sum w_i * x_i <= c`.
#[derive(Clone, Debug)]
pub(crate) struct LinearLessOrEqualPropagator {
    terms: Box<[(i32, DomainId)]>,
    c: i32,
}

impl LinearLessOrEqualPropagator {
    fn minimum_term<Context: ReadDomains>(context: &Context, weight: i32, var: DomainId) -> i64 {
        if weight > 0 {
            weight as i64 * context.lower_bound(var) as i64
        } else {
            weight as i64 * context.upper_bound(var) as i64
        }
    }

    fn maximum_term<Context: ReadDomains>(context: &Context, weight: i32, var: DomainId) -> i64 {
        if weight > 0 {
            weight as i64 * context.upper_bound(var) as i64
        } else {
            weight as i64 * context.lower_bound(var) as i64
        }
    }
}

impl Propagator for LinearLessOrEqualPropagator {
    fn name(&self) -> &str {
        "LinearLeq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        let lower_bound_left_hand_side = self
            .terms
            .iter()
            .map(|&(weight, var)| Self::minimum_term(&context, weight, var))
            .sum::<i64>();

        let c = self.c as i64;
        if lower_bound_left_hand_side > c {
            return Err(Contradiction::Conflict);
        }

        for &(weight, var) in self.terms.iter() {
            let others = lower_bound_left_hand_side - Self::minimum_term(&context, weight, var);
            let slack = c - others;
            let weight = weight as i64;

            if weight > 0 {
                let bound = slack.div_euclid(weight).clamp(i32::MIN as i64, i32::MAX as i64);
                let _ = context.set_upper_bound(var, bound as i32)?;
            } else {
                let bound = -slack.div_euclid(-weight);
                let bound = bound.clamp(i32::MIN as i64, i32::MAX as i64);
                let _ = context.set_lower_bound(var, bound as i32)?;
            }
        }

        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        let (minimum, maximum) = self.terms.iter().fold((0, 0), |(min, max), &(weight, var)| {
            (
                min + Self::minimum_term(&context, weight, var),
                max + Self::maximum_term(&context, weight, var),
            )
        });

        if maximum <= self.c as i64 {
            Entailment::True
        } else if minimum > self.c as i64 {
            Entailment::False
        } else {
            Entailment::Undefined
        }
    }
}
