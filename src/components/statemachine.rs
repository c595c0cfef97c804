//! Generic finite state machine with guarded transitions.
//!
//! A machine is declared once with [`StateMachineBuilder`] and frozen into an
//! immutable, shareable [`StateMachineDef`]. Each entity then drives its own
//! [`StateMachine`] cursor over that definition.
//!
//! # Transition rule
//!
//! [`StateMachine::advance`] evaluates, in declaration order, every transition
//! leaving the current state. The first guard that returns `true` wins. When
//! no guard passes the state is unchanged.
//!
//! # Brains
//!
//! States are plain tags; behavior is attached separately. [`Brain`] binds a
//! machine guarded over [`Signals`] to a [`StateBehaviors`] table of per-state
//! callbacks. A state with no behavior, or one explicitly marked with
//! [`StateBehaviors::unimplemented`], fails with [`SimError::NotImplemented`]
//! when the brain enters it.
//!
//! ```ignore
//! let def = StateMachineBuilder::new()
//!     .initial(Jump::Crouch)
//!     .states([Jump::Crouch, Jump::Rise, Jump::Fall])
//!     .transition(Jump::Crouch, Jump::Rise, |s: &Signals| s.has_flag("ready"))
//!     .transition(Jump::Rise, Jump::Fall, |s: &Signals| s.has_flag("apex"))
//!     .build()?;
//! ```

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::Component;

use crate::components::signals::Signals;
use crate::components::updatables::UpdateCtx;
use crate::error::{SimError, SimResult};

/// Signal text holding the active state's debug name, written by [`Brain::run`].
pub const STATE_SIGNAL: &str = "state";

/// Bounds a state tag must satisfy. Tags may carry data.
pub trait StateTag: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> StateTag for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

pub type Guard<C> = Arc<dyn Fn(&C) -> bool + Send + Sync>;

struct Transition<S, C> {
    from: S,
    to: S,
    guard: Guard<C>,
}

/// Immutable machine declaration.
pub struct StateMachineDef<S, C> {
    initial: S,
    states: Vec<S>,
    transitions: Vec<Transition<S, C>>,
}

impl<S: StateTag, C> StateMachineDef<S, C> {
    pub fn initial(&self) -> &S {
        &self.initial
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn is_declared(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }
}

impl<S: fmt::Debug, C> fmt::Debug for StateMachineDef<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachineDef")
            .field("initial", &self.initial)
            .field("states", &self.states)
            .field(
                "transitions",
                &self
                    .transitions
                    .iter()
                    .map(|t| (&t.from, &t.to))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

pub struct StateMachineBuilder<S, C> {
    initial: Option<S>,
    states: Vec<S>,
    transitions: Vec<Transition<S, C>>,
}

impl<S: StateTag, C: 'static> Default for StateMachineBuilder<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateTag, C: 'static> StateMachineBuilder<S, C> {
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// The initial state is declared implicitly.
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state.clone());
        self.declare(state);
        self
    }

    pub fn state(mut self, state: S) -> Self {
        self.declare(state);
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = S>) -> Self {
        for s in states {
            self.declare(s);
        }
        self
    }

    pub fn transition<G>(mut self, from: S, to: S, guard: G) -> Self
    where
        G: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.transitions.push(Transition {
            from,
            to,
            guard: Arc::new(guard),
        });
        self
    }

    /// Unconditional transition, taken on the first advance from `from`.
    pub fn always(self, from: S, to: S) -> Self {
        self.transition(from, to, |_| true)
    }

    fn declare(&mut self, state: S) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }

    pub fn build(self) -> SimResult<Arc<StateMachineDef<S, C>>> {
        let initial = self.initial.ok_or(SimError::MissingInitialState)?;
        for t in &self.transitions {
            for end in [&t.from, &t.to] {
                if !self.states.contains(end) {
                    return Err(SimError::UndeclaredState(format!("{end:?}")));
                }
            }
        }
        Ok(Arc::new(StateMachineDef {
            initial,
            states: self.states,
            transitions: self.transitions,
        }))
    }
}

/// Cursor over a shared [`StateMachineDef`].
pub struct StateMachine<S, C> {
    def: Arc<StateMachineDef<S, C>>,
    current: S,
    previous: Option<S>,
    time_in_state: f32,
    changed: bool,
}

impl<S: StateTag, C> Clone for StateMachine<S, C> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            current: self.current.clone(),
            previous: self.previous.clone(),
            time_in_state: self.time_in_state,
            changed: self.changed,
        }
    }
}

impl<S: fmt::Debug, C> fmt::Debug for StateMachine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("time_in_state", &self.time_in_state)
            .finish()
    }
}

impl<S: StateTag, C> StateMachine<S, C> {
    pub fn new(def: Arc<StateMachineDef<S, C>>) -> Self {
        let current = def.initial.clone();
        Self {
            def,
            current,
            previous: None,
            time_in_state: 0.0,
            changed: false,
        }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn previous(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Whether the last [`advance`](Self::advance) or
    /// [`set_state`](Self::set_state) changed state.
    pub fn just_changed(&self) -> bool {
        self.changed
    }

    pub fn definition(&self) -> &Arc<StateMachineDef<S, C>> {
        &self.def
    }

    pub fn tick(&mut self, dt: f32) {
        self.time_in_state += dt;
    }

    /// Take the first passing transition out of the current state.
    pub fn advance(&mut self, ctx: &C) -> &S {
        let next = self
            .def
            .transitions
            .iter()
            .filter(|t| t.from == self.current)
            .find(|t| (t.guard)(ctx))
            .map(|t| t.to.clone());
        match next {
            Some(to) => self.enter(to),
            None => self.changed = false,
        }
        &self.current
    }

    /// Force a state. Fails for states outside the declaration.
    pub fn set_state(&mut self, state: S) -> SimResult<()> {
        if !self.def.is_declared(&state) {
            return Err(SimError::UndeclaredState(format!("{state:?}")));
        }
        self.enter(state);
        Ok(())
    }

    /// Back to the initial state with no history.
    pub fn reset(&mut self) {
        self.current = self.def.initial.clone();
        self.previous = None;
        self.time_in_state = 0.0;
        self.changed = false;
    }

    fn enter(&mut self, to: S) {
        let from = std::mem::replace(&mut self.current, to);
        self.previous = Some(from);
        self.time_in_state = 0.0;
        self.changed = true;
    }
}

/// Runs while in a state; receives the time spent in it.
pub type StateUpdate = fn(&mut UpdateCtx<'_>, f32) -> SimResult<()>;
/// Runs once on entering a state.
pub type StateEnter = fn(&mut UpdateCtx<'_>) -> SimResult<()>;

enum Behavior {
    Defined {
        on_enter: Option<StateEnter>,
        on_update: Option<StateUpdate>,
    },
    Unimplemented,
}

/// Per-state callbacks for a [`Brain`].
pub struct StateBehaviors<S> {
    entries: Vec<(S, Behavior)>,
}

impl<S: StateTag> Default for StateBehaviors<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateTag> StateBehaviors<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn on_update(mut self, state: S, f: StateUpdate) -> Self {
        if let Some((_, on_update)) = self.defined_mut(state) {
            *on_update = Some(f);
        }
        self
    }

    pub fn on_enter(mut self, state: S, f: StateEnter) -> Self {
        if let Some((on_enter, _)) = self.defined_mut(state) {
            *on_enter = Some(f);
        }
        self
    }

    /// Mark a state whose behavior has not been written yet.
    pub fn unimplemented(mut self, state: S) -> Self {
        match self.entries.iter_mut().find(|(s, _)| *s == state) {
            Some(slot) => slot.1 = Behavior::Unimplemented,
            None => self.entries.push((state, Behavior::Unimplemented)),
        }
        self
    }

    pub fn is_implemented(&self, state: &S) -> bool {
        matches!(self.find(state), Some(Behavior::Defined { .. }))
    }

    fn find(&self, state: &S) -> Option<&Behavior> {
        self.entries
            .iter()
            .find(|(s, _)| s == state)
            .map(|(_, b)| b)
    }

    fn defined_mut(
        &mut self,
        state: S,
    ) -> Option<(&mut Option<StateEnter>, &mut Option<StateUpdate>)> {
        let idx = match self.entries.iter().position(|(s, _)| *s == state) {
            Some(idx) => idx,
            None => {
                self.entries.push((
                    state,
                    Behavior::Defined {
                        on_enter: None,
                        on_update: None,
                    },
                ));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx].1 {
            Behavior::Defined {
                on_enter,
                on_update,
            } => Some((on_enter, on_update)),
            Behavior::Unimplemented => None,
        }
    }
}

/// State machine plus behavior table, driven each tick by
/// [`crate::systems::brain::run_brains`].
#[derive(Component)]
pub struct Brain<S: StateTag> {
    pub machine: StateMachine<S, Signals>,
    behaviors: Arc<StateBehaviors<S>>,
    entered: bool,
}

impl<S: StateTag> fmt::Debug for Brain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brain")
            .field("machine", &self.machine)
            .finish_non_exhaustive()
    }
}

impl<S: StateTag> Brain<S> {
    pub fn new(def: Arc<StateMachineDef<S, Signals>>, behaviors: Arc<StateBehaviors<S>>) -> Self {
        Self {
            machine: StateMachine::new(def),
            behaviors,
            entered: false,
        }
    }

    pub fn current(&self) -> &S {
        self.machine.current()
    }

    /// One tick: advance the machine over the entity's signals, then run the
    /// current state's behavior. Entering a state runs its `on_enter` first,
    /// including the initial state on the very first tick.
    pub fn run(&mut self, ctx: &mut UpdateCtx<'_>) -> SimResult<()> {
        self.machine.tick(ctx.dt);
        self.machine.advance(&*ctx.signals);
        let state = self.machine.current().clone();
        let first = !self.entered;
        self.entered = true;

        let (on_enter, on_update) = match self.behaviors.find(&state) {
            Some(Behavior::Defined {
                on_enter,
                on_update,
            }) => (*on_enter, *on_update),
            Some(Behavior::Unimplemented) | None => {
                return Err(SimError::NotImplemented {
                    entity: ctx.tag.to_string(),
                    state: format!("{state:?}"),
                });
            }
        };

        ctx.signals.set_text(STATE_SIGNAL, format!("{state:?}"));
        if first || self.machine.just_changed() {
            if let Some(enter) = on_enter {
                enter(ctx)?;
            }
        }
        if let Some(update) = on_update {
            update(ctx, self.machine.time_in_state())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::body::Body;
    use crate::components::updatables::CtxParts;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum S {
        One,
        Two,
        Three,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Carrying {
        Idle,
        Holding(u32),
    }

    #[test]
    fn first_declared_true_guard_wins() {
        let def = StateMachineBuilder::<S, ()>::new()
            .initial(S::One)
            .states([S::Two, S::Three])
            .transition(S::One, S::Two, |_| true)
            .transition(S::One, S::Three, |_| true)
            .build()
            .unwrap();
        let mut sm = StateMachine::new(def);
        assert_eq!(*sm.advance(&()), S::Two);
        assert_eq!(sm.previous(), Some(&S::One));
        assert!(sm.just_changed());
    }

    #[test]
    fn no_passing_guard_keeps_state() {
        let def = StateMachineBuilder::<S, bool>::new()
            .initial(S::One)
            .state(S::Two)
            .transition(S::One, S::Two, |go: &bool| *go)
            .build()
            .unwrap();
        let mut sm = StateMachine::new(def);
        assert_eq!(*sm.advance(&false), S::One);
        assert!(!sm.just_changed());
        assert_eq!(*sm.advance(&true), S::Two);
        // no transitions out of Two
        assert_eq!(*sm.advance(&true), S::Two);
    }

    #[test]
    fn guards_only_considered_from_current_state() {
        let def = StateMachineBuilder::<S, ()>::new()
            .initial(S::One)
            .states([S::Two, S::Three])
            .always(S::Two, S::Three)
            .always(S::One, S::Two)
            .build()
            .unwrap();
        let mut sm = StateMachine::new(def);
        assert_eq!(*sm.advance(&()), S::Two);
        assert_eq!(*sm.advance(&()), S::Three);
    }

    #[test]
    fn build_rejects_undeclared_and_missing_initial() {
        let err = StateMachineBuilder::<S, ()>::new()
            .initial(S::One)
            .always(S::One, S::Two)
            .build()
            .unwrap_err();
        assert_eq!(err, SimError::UndeclaredState("Two".into()));

        let err = StateMachineBuilder::<S, ()>::new()
            .state(S::One)
            .build()
            .unwrap_err();
        assert_eq!(err, SimError::MissingInitialState);
    }

    #[test]
    fn shared_definition_is_deterministic() {
        let def = StateMachineBuilder::<S, u32>::new()
            .initial(S::One)
            .states([S::Two, S::Three])
            .transition(S::One, S::Two, |n: &u32| *n % 2 == 0)
            .transition(S::Two, S::Three, |n: &u32| *n > 3)
            .transition(S::Three, S::One, |_| true)
            .build()
            .unwrap();
        let mut a = StateMachine::new(def.clone());
        let mut b = StateMachine::new(def);
        for n in 0..10u32 {
            assert_eq!(a.advance(&n), b.advance(&n));
        }
    }

    #[test]
    fn set_state_and_reset() {
        let def = StateMachineBuilder::<Carrying, ()>::new()
            .initial(Carrying::Idle)
            .state(Carrying::Holding(3))
            .build()
            .unwrap();
        let mut sm = StateMachine::new(def);
        assert!(sm.set_state(Carrying::Holding(3)).is_ok());
        assert_eq!(
            sm.set_state(Carrying::Holding(4)),
            Err(SimError::UndeclaredState("Holding(4)".into()))
        );
        sm.tick(0.5);
        assert_eq!(sm.time_in_state(), 0.5);
        sm.reset();
        assert_eq!(*sm.current(), Carrying::Idle);
        assert_eq!(sm.previous(), None);
        assert_eq!(sm.time_in_state(), 0.0);
    }

    fn enter_two(ctx: &mut UpdateCtx<'_>) -> SimResult<()> {
        ctx.signals.set_flag("entered_two");
        Ok(())
    }

    fn update_two(ctx: &mut UpdateCtx<'_>, time: f32) -> SimResult<()> {
        ctx.signals.set_scalar("time_in_two", time);
        Ok(())
    }

    fn update_one(_: &mut UpdateCtx<'_>, _: f32) -> SimResult<()> {
        Ok(())
    }

    #[test]
    fn brain_runs_enter_then_update() {
        let def = StateMachineBuilder::<S, Signals>::new()
            .initial(S::One)
            .states([S::Two, S::Three])
            .transition(S::One, S::Two, |s: &Signals| s.has_flag("go"))
            .transition(S::Two, S::Three, |s: &Signals| s.has_flag("stun"))
            .build()
            .unwrap();
        let behaviors = StateBehaviors::new()
            .on_update(S::One, update_one)
            .on_enter(S::Two, enter_two)
            .on_update(S::Two, update_two)
            .unimplemented(S::Three);
        let mut brain = Brain::new(def, Arc::new(behaviors));
        let mut parts = CtxParts::new(Body::with_size(1.0, 1.0));

        brain.run(&mut parts.ctx(0.1)).unwrap();
        assert_eq!(*brain.current(), S::One);
        assert_eq!(parts.signals.text(STATE_SIGNAL), Some("One"));

        parts.signals.set_flag("go");
        brain.run(&mut parts.ctx(0.1)).unwrap();
        assert!(parts.signals.has_flag("entered_two"));
        assert_eq!(parts.signals.scalar("time_in_two"), Some(0.0));

        brain.run(&mut parts.ctx(0.25)).unwrap();
        assert_eq!(parts.signals.scalar("time_in_two"), Some(0.25));

        parts.signals.set_flag("stun");
        let err = brain.run(&mut parts.ctx(0.1)).unwrap_err();
        assert_eq!(
            err,
            SimError::NotImplemented {
                entity: "test".into(),
                state: "Three".into()
            }
        );
    }

    #[test]
    fn brain_state_without_behavior_is_not_implemented() {
        let def = StateMachineBuilder::<S, Signals>::new()
            .initial(S::One)
            .build()
            .unwrap();
        let mut brain = Brain::new(def, Arc::new(StateBehaviors::new()));
        let mut parts = CtxParts::new(Body::with_size(1.0, 1.0));
        assert!(matches!(
            brain.run(&mut parts.ctx(0.1)),
            Err(SimError::NotImplemented { .. })
        ));
    }
}
