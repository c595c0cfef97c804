//! Springer: a state-machine driven jumper.
//!
//! ```text
//! Crouch --crouch_done--> Jump --head_bump--> Stunned
//!                          \---vy <= 0-----> Fall --landed--> Crouch
//! ```
//!
//! `Stunned` is declared but has no behavior yet: a springer that bumps its
//! head on a block fails with `NotImplemented` and is culled.

use std::sync::Arc;

use bevy_ecs::world::EntityWorldMut;
use glam::Vec2;

use crate::components::animation::{Animation, AnimationSelector, KeySupplier};
use crate::components::body::{BodySense, DEFAULT_HOOK, floor_clamp_hook};
use crate::components::damage::{Damager, DamagerVariant, Health};
use crate::components::facing::Facing;
use crate::components::fixture::{Fixture, FixtureType};
use crate::components::shape::Shape;
use crate::components::signals::Signals;
use crate::components::sprite::SpriteFrame;
use crate::components::statemachine::{
    Brain, STATE_SIGNAL, StateBehaviors, StateMachineBuilder, StateMachineDef,
};
use crate::components::timer::Timers;
use crate::components::updatables::{UpdateCtx, Updatables};
use crate::enemies::{
    Regions, enemy_body, enemy_capabilities, enemy_negotiations, offscreen_cull, standing_bounds,
};
use crate::entity::{EntityDefinition, SpawnCtx};
use crate::error::SimResult;
use crate::resources::assets::AssetRegistry;
use crate::spawn::SpawnConfig;

pub const TAG: &str = "springer";
const SIZE: Vec2 = Vec2::new(1.0, 1.0);
const HEALTH: i32 = 15;

const CROUCH_DONE: &str = "crouch_done";
const HEAD_BUMP: &str = "head_bump";
const LANDED: &str = "landed";
const VY: &str = "vy";
const CROUCH_TIME: &str = "crouch_time";
const JUMP_IMPULSE: &str = "jump_impulse";
const JUMP_SPEED: &str = "jump_speed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpringerState {
    Crouch,
    Jump,
    Fall,
    Stunned,
}

pub fn springer_machine() -> SimResult<Arc<StateMachineDef<SpringerState, Signals>>> {
    use SpringerState::*;
    StateMachineBuilder::new()
        .initial(Crouch)
        .states([Jump, Fall, Stunned])
        .transition(Crouch, Jump, |s: &Signals| s.has_flag(CROUCH_DONE))
        .transition(Jump, Stunned, |s: &Signals| s.has_flag(HEAD_BUMP))
        .transition(Jump, Fall, |s: &Signals| s.scalar_or(VY, 0.0) <= 0.0)
        .transition(Fall, Crouch, |s: &Signals| s.has_flag(LANDED))
        .build()
}

fn enter_crouch(ctx: &mut UpdateCtx<'_>) -> SimResult<()> {
    ctx.signals.clear_flag(LANDED);
    ctx.body.physics.velocity.x = 0.0;
    Ok(())
}

fn crouch(ctx: &mut UpdateCtx<'_>, time_in_state: f32) -> SimResult<()> {
    ctx.face_target();
    if time_in_state >= ctx.signals.scalar_or(CROUCH_TIME, 0.5) {
        ctx.signals.set_flag(CROUCH_DONE);
    }
    Ok(())
}

fn enter_jump(ctx: &mut UpdateCtx<'_>) -> SimResult<()> {
    ctx.signals.clear_flag(CROUCH_DONE);
    let facing = ctx.facing().value();
    let impulse = ctx.signals.scalar_or(JUMP_IMPULSE, 0.0);
    let speed = ctx.signals.scalar_or(JUMP_SPEED, 0.0);
    ctx.body.physics.velocity = Vec2::new(speed * facing, impulse);
    ctx.body.physics.gravity_on = true;
    ctx.play_sound("springer_jump", false);
    Ok(())
}

fn airborne(_ctx: &mut UpdateCtx<'_>, _time_in_state: f32) -> SimResult<()> {
    Ok(())
}

pub fn springer_behaviors() -> StateBehaviors<SpringerState> {
    use SpringerState::*;
    StateBehaviors::new()
        .on_enter(Crouch, enter_crouch)
        .on_update(Crouch, crouch)
        .on_enter(Jump, enter_jump)
        .on_update(Jump, airborne)
        .on_update(Fall, airborne)
        .unimplemented(Stunned)
}

#[derive(Default)]
pub struct Springer {
    regions: Regions,
    machine: Option<Arc<StateMachineDef<SpringerState, Signals>>>,
    behaviors: Option<Arc<StateBehaviors<SpringerState>>>,
}

impl std::fmt::Debug for Springer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Springer")
            .field("regions", &self.regions)
            .field("initialized", &self.machine.is_some())
            .finish()
    }
}

impl EntityDefinition for Springer {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn init(&mut self, assets: &mut AssetRegistry) -> SimResult<()> {
        self.regions = Regions::load(assets, &["springer_crouch", "springer_jump"])?;
        self.machine = Some(springer_machine()?);
        self.behaviors = Some(Arc::new(springer_behaviors()));
        Ok(())
    }

    fn on_spawn(
        &self,
        entity: &mut EntityWorldMut<'_>,
        config: &SpawnConfig,
        ctx: &SpawnCtx,
    ) -> SimResult<()> {
        let bounds = standing_bounds(config, ctx, SIZE)?;
        let gravity = ctx.scale(config.f32_or("gravity", ctx.sim.gravity)?);
        let signals = Signals::default()
            .with_scalar(CROUCH_TIME, config.f32_or("crouch_time", 0.5)?)
            .with_scalar(JUMP_IMPULSE, ctx.scale(config.f32_or("jump_impulse", 12.0)?))
            .with_scalar(JUMP_SPEED, ctx.scale(config.f32_or("jump_speed", 3.0)?));

        let machine = match &self.machine {
            Some(machine) => machine.clone(),
            None => springer_machine()?,
        };
        let behaviors = match &self.behaviors {
            Some(behaviors) => behaviors.clone(),
            None => Arc::new(springer_behaviors()),
        };

        let mut body = enemy_body(bounds)
            .with_gravity(Vec2::new(0.0, gravity), false)
            .with_fixture(
                Fixture::new(FixtureType::Head, Shape::rect(bounds.width * 0.5, 0.1))
                    .with_offset(Vec2::new(0.0, bounds.height / 2.0)),
            );
        body.put_boxed_post_hook(
            DEFAULT_HOOK,
            floor_clamp_hook(bounds.y, |_, hook| hook.signals.set_flag(LANDED)),
        );

        // facts the guards read, written before the brain runs
        let updatables = Updatables::new().with(|ctx| {
            let vy = ctx.body.velocity().y;
            ctx.signals.set_scalar(VY, vy);
            let bumped = ctx.body.is_sensing(BodySense::HeadTouchingBlock);
            ctx.signals.put_flag(HEAD_BUMP, bumped);
            Ok(())
        });

        let animations = AnimationSelector::new(KeySupplier::func(|s: &Signals| {
            match s.text(STATE_SIGNAL) {
                Some("Jump") | Some("Fall") => "jump",
                _ => "crouch",
            }
            .to_string()
        }))
        .with("crouch", Animation::still(self.regions.get("springer_crouch")))
        .with("jump", Animation::still(self.regions.get("springer_jump")));

        entity.insert((
            body,
            Timers::new(),
            signals,
            config.facing_or("facing", Facing::Left)?,
            updatables,
            Brain::new(machine, behaviors),
            animations,
            SpriteFrame::default(),
            enemy_capabilities(),
            enemy_negotiations(),
            Damager::new(DamagerVariant::EnemyContact),
            Health::new(HEALTH),
            offscreen_cull(config, ctx)?,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::statemachine::StateMachine;

    #[test]
    fn head_bump_wins_over_falling() {
        let mut machine = StateMachine::new(springer_machine().unwrap());
        let mut signals = Signals::default().with_flag(CROUCH_DONE);
        assert_eq!(*machine.advance(&signals), SpringerState::Jump);

        signals.clear_flag(CROUCH_DONE);
        signals.set_scalar(VY, -1.0);
        signals.set_flag(HEAD_BUMP);
        assert_eq!(*machine.advance(&signals), SpringerState::Stunned);
    }

    #[test]
    fn stunned_has_no_behavior() {
        let behaviors = springer_behaviors();
        assert!(behaviors.is_implemented(&SpringerState::Fall));
        assert!(!behaviors.is_implemented(&SpringerState::Stunned));
    }
}
