//! The invocation dispatcher: executes a resolved chain around the real
//! call, implementing before/after/around semantics and fault propagation.
//!
//! The machine runs `NotStarted → BeforeRunning → TargetRunning →
//! {ReturnedNormally, ThrewException} → AfterRunning → Done` per nesting
//! segment. Around advice splits the chain into segments: everything after
//! an Around entry only runs if its body invokes [`Proceed`]. Within a
//! segment, Before advice run in chain order and the After family runs
//! innermost-first, so that across precedence tiers advice observe the call
//! first-in, last-out.
//!
//! Fault rules: the dispatcher never catches-and-discards. A Before fault
//! short-circuits the target and becomes the underlying outcome. Faults
//! raised by After-family bodies replace the in-flight outcome but are
//! never re-offered to AfterThrowing advice; AfterThrowing selection is
//! decided once, against the underlying outcome. At most one fault is in
//! flight — the latest wins.

use std::{cell::Cell, sync::Arc};

use log::trace;

use crate::{
    advice::Advice,
    advisor::Advisor,
    chain::InterceptorChain,
    invocation::{CallOutcome, Fault, JoinPoint},
};

/// One-shot capability handed to an Around body: invoking it runs the rest
/// of the chain and the target. Dropping it without invoking keeps the
/// target (and all deeper advice) from ever running; the Around body's own
/// return value then becomes the outcome directly.
pub struct Proceed<'a> {
    inner: Box<dyn FnOnce() -> CallOutcome + 'a>,
}

impl<'a> Proceed<'a> {
    /// Run the rest of the chain and the underlying call.
    pub fn invoke(self) -> CallOutcome {
        (self.inner)()
    }
}

impl std::fmt::Debug for Proceed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Proceed")
    }
}

/// Dispatch one call through a resolved chain.
///
/// `terminal` performs the real target invocation; it runs at most once,
/// and not at all when a Before fault short-circuits or an Around body
/// declines to proceed. An empty chain degenerates to calling `terminal`
/// directly.
pub fn run(
    chain: &InterceptorChain,
    jp: &JoinPoint<'_>,
    terminal: impl FnOnce() -> CallOutcome,
) -> CallOutcome {
    run_frames(chain.entries(), jp, Box::new(terminal)).result
}

/// In-flight outcome plus the marker distinguishing advice-stage faults
/// (raised by After-family bodies) from underlying ones. AfterThrowing
/// advice never observe advice-stage faults.
struct Flow {
    result: CallOutcome,
    advice_fault: bool,
}

/// What an Around body's proceed produced, recorded so the frame can tell
/// a forwarded fault from a substituted one.
struct InnerMeta {
    advice_fault: bool,
    fault: Option<Fault>,
}

fn run_frames(
    entries: &[Arc<Advisor>],
    jp: &JoinPoint<'_>,
    terminal: Box<dyn FnOnce() -> CallOutcome + '_>,
) -> Flow {
    if entries.is_empty() {
        trace!("invoking target for {}", jp.signature());
        return Flow {
            result: terminal(),
            advice_fault: false,
        };
    }

    if let Advice::Around(body) = entries[0].advice() {
        let advisor = &entries[0];
        let rest = &entries[1..];
        let meta: Cell<Option<InnerMeta>> = Cell::new(None);
        let proceed = Proceed {
            inner: Box::new(|| {
                let flow = run_frames(rest, jp, terminal);
                meta.set(Some(InnerMeta {
                    advice_fault: flow.advice_fault,
                    fault: flow.result.as_ref().err().cloned(),
                }));
                flow.result
            }),
        };

        trace!("around '{}' wrapping {}", advisor.name(), jp.signature());
        let outcome = (body.as_ref())(jp, proceed);

        // An Around outcome is underlying for everything outside it, unless
        // the body forwarded the identical fault its proceed returned.
        let advice_fault = match (&outcome, meta.take()) {
            (
                Err(fault),
                Some(InnerMeta {
                    advice_fault,
                    fault: Some(inner),
                }),
            ) if fault.same(&inner) => advice_fault,
            _ => false,
        };

        return Flow {
            result: outcome,
            advice_fault,
        };
    }

    // Leading run of non-Around advice forms one flat segment.
    let split = entries
        .iter()
        .position(|a| matches!(a.advice(), Advice::Around(_)))
        .unwrap_or(entries.len());
    let (segment, rest) = entries.split_at(split);

    for advisor in segment {
        if let Advice::Before(body) = advisor.advice() {
            trace!("before '{}' for {}", advisor.name(), jp.signature());
            if let Err(fault) = (body.as_ref())(jp) {
                // Short-circuit: remaining Before advice, deeper segments
                // and the target are skipped; the fault is the underlying
                // outcome of this segment.
                return after_phase(
                    segment,
                    jp,
                    Flow {
                        result: Err(fault),
                        advice_fault: false,
                    },
                );
            }
        }
    }

    let inner = if rest.is_empty() {
        trace!("invoking target for {}", jp.signature());
        Flow {
            result: terminal(),
            advice_fault: false,
        }
    } else {
        run_frames(rest, jp, terminal)
    };

    after_phase(segment, jp, inner)
}

fn after_phase(segment: &[Arc<Advisor>], jp: &JoinPoint<'_>, flow: Flow) -> Flow {
    let mut override_fault: Option<Fault> = None;

    match (&flow.result, flow.advice_fault) {
        (Ok(value), _) => {
            for advisor in segment.iter().rev() {
                if let Advice::AfterReturning { binding, body } = advisor.advice() {
                    if binding.accepts(value.as_ref()) {
                        trace!("after_returning '{}' for {}", advisor.name(), jp.signature());
                        if let Err(fault) = (body.as_ref())(jp, value.as_ref()) {
                            override_fault = Some(fault);
                        }
                    }
                }
            }
        }
        (Err(fault), false) => {
            for advisor in segment.iter().rev() {
                if let Advice::AfterThrowing { binding, body } = advisor.advice() {
                    if binding.accepts(fault) {
                        trace!("after_throwing '{}' for {}", advisor.name(), jp.signature());
                        if let Err(raised) = (body.as_ref())(jp, fault) {
                            override_fault = Some(raised);
                        }
                    }
                }
            }
        }
        // Advice-stage fault: AfterThrowing never observes it.
        (Err(_), true) => {}
    }

    for advisor in segment.iter().rev() {
        if let Advice::After(body) = advisor.advice() {
            trace!("after '{}' for {}", advisor.name(), jp.signature());
            if let Err(fault) = (body.as_ref())(jp) {
                override_fault = Some(fault);
            }
        }
    }

    match override_fault {
        Some(fault) => Flow {
            result: Err(fault),
            advice_fault: true,
        },
        None => flow,
    }
}
