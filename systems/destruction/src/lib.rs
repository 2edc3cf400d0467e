#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives a group's multi-step shatter sequence.
//!
//! Every participant (member block or absorbed platform) runs its own
//! `Idle -> Shattering -> Destroyed` machine with an elapsed-time field that
//! the scheduler advances once per step. The group itself owns the finale:
//! once every participant is destroyed it requests a shake, decays a
//! distortion value to zero and finally asks for the whole group to be
//! retired. Nothing here can be cancelled once triggered.

use std::time::Duration;

use passblock_core::{EntityRef, ShatterConfig, ShatterPhase};

/// Destruction state of a single participant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShatterState {
    /// No shatter has been triggered.
    Idle,
    /// Waiting out the pre-delay or ramping intensity.
    Shattering {
        /// Time accumulated since the trigger.
        elapsed: Duration,
        /// Whether collision was already switched off.
        collision_disabled: bool,
    },
    /// Terminal state; the body is invisible and non-collidable.
    Destroyed,
}

/// Requests produced while advancing the sequence.
///
/// The world turns these into state changes and broadcast events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// The participant must stop colliding.
    CollisionDisabled(EntityRef),
    /// The participant finished its ramp: hide it, drop its attachments and
    /// play a burst of the provided intensity.
    Shattered {
        /// Body that finished shattering.
        entity: EntityRef,
        /// Intensity reached at the end of the ramp.
        intensity: f32,
    },
    /// Every participant is destroyed; play the group-wide effects.
    Finale {
        /// Camera shake amplitude.
        shake: f32,
        /// Initial distortion value.
        distortion: f32,
    },
    /// Distortion value after this step's decay.
    Distortion(f32),
    /// The distortion has faded; remove every participant.
    Retire,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Standing,
    Shattering,
    Distorting { value: f32 },
    Retired,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Participant {
    entity: EntityRef,
    state: ShatterState,
}

/// Shatter sequence owned by a single group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupDestruction {
    participants: Vec<Participant>,
    config: ShatterConfig,
    stage: Stage,
}

impl GroupDestruction {
    /// Creates an idle sequence for the provided participants.
    #[must_use]
    pub fn new<I>(participants: I) -> Self
    where
        I: IntoIterator<Item = EntityRef>,
    {
        Self {
            participants: participants
                .into_iter()
                .map(|entity| Participant {
                    entity,
                    state: ShatterState::Idle,
                })
                .collect(),
            config: ShatterConfig::default(),
            stage: Stage::Standing,
        }
    }

    /// Starts the sequence for every participant.
    ///
    /// Returns `false` without touching any state when the sequence is
    /// already running, so repeated triggers yield a single run. Under quick
    /// destroy every participant loses collision immediately.
    pub fn trigger(&mut self, config: ShatterConfig, out: &mut Vec<Signal>) -> bool {
        if self.stage != Stage::Standing {
            return false;
        }

        self.config = config;
        self.stage = Stage::Shattering;
        let quick = config.quick_destroy;
        for participant in &mut self.participants {
            participant.state = ShatterState::Shattering {
                elapsed: Duration::ZERO,
                collision_disabled: quick,
            };
            if quick {
                out.push(Signal::CollisionDisabled(participant.entity));
            }
        }

        log::debug!(
            "shatter triggered for {} participants (quick: {quick})",
            self.participants.len()
        );
        true
    }

    /// Advances the sequence by one step of `dt`.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Signal>) {
        match self.stage {
            Stage::Standing | Stage::Retired => {}
            Stage::Shattering => self.advance_participants(dt, out),
            Stage::Distorting { value } => {
                let decay = self.config.distortion_decay_per_second * dt.as_secs_f32();
                let value = if self.config.distortion_decay_per_second > 0.0 {
                    (value - decay).max(0.0)
                } else {
                    0.0
                };
                out.push(Signal::Distortion(value));
                if value <= 0.0 {
                    out.push(Signal::Retire);
                    self.stage = Stage::Retired;
                } else {
                    self.stage = Stage::Distorting { value };
                }
            }
        }
    }

    fn advance_participants(&mut self, dt: Duration, out: &mut Vec<Signal>) {
        let pre_delay = self.config.effective_pre_delay();
        let total = self.config.total_duration();

        for index in 0..self.participants.len() {
            let participant = self.participants[index];
            let ShatterState::Shattering {
                elapsed,
                mut collision_disabled,
            } = participant.state
            else {
                continue;
            };

            let elapsed = elapsed.saturating_add(dt);
            if !collision_disabled && elapsed >= pre_delay {
                collision_disabled = true;
                out.push(Signal::CollisionDisabled(participant.entity));
            }

            self.participants[index].state = if elapsed >= total {
                out.push(Signal::Shattered {
                    entity: participant.entity,
                    intensity: self.config.max_intensity,
                });
                ShatterState::Destroyed
            } else {
                ShatterState::Shattering {
                    elapsed,
                    collision_disabled,
                }
            };
        }

        let finished = self
            .participants
            .iter()
            .all(|participant| participant.state == ShatterState::Destroyed);
        if finished {
            let distortion = self.config.distortion_start.max(0.0);
            out.push(Signal::Finale {
                shake: self.config.shake_amplitude,
                distortion,
            });
            self.stage = Stage::Distorting { value: distortion };
        }
    }

    /// Whether the sequence was triggered.
    #[must_use]
    pub fn is_shattering(&self) -> bool {
        self.stage != Stage::Standing
    }

    /// Whether the sequence finished and the group was retired.
    #[must_use]
    pub fn is_retired(&self) -> bool {
        self.stage == Stage::Retired
    }

    /// Current distortion value while the finale is running.
    #[must_use]
    pub fn distortion(&self) -> Option<f32> {
        match self.stage {
            Stage::Distorting { value } => Some(value),
            Stage::Standing | Stage::Shattering | Stage::Retired => None,
        }
    }

    /// Configuration captured when the sequence was triggered.
    #[must_use]
    pub const fn config(&self) -> &ShatterConfig {
        &self.config
    }

    /// State of a single participant.
    #[must_use]
    pub fn state_of(&self, entity: EntityRef) -> Option<ShatterState> {
        self.participants
            .iter()
            .find(|participant| participant.entity == entity)
            .map(|participant| participant.state)
    }

    /// Coarse phase of a single participant.
    #[must_use]
    pub fn phase_of(&self, entity: EntityRef) -> Option<ShatterPhase> {
        let pre_delay = self.config.effective_pre_delay();
        self.state_of(entity).map(|state| match state {
            ShatterState::Idle => ShatterPhase::Idle,
            ShatterState::Shattering { elapsed, .. } if elapsed < pre_delay => {
                ShatterPhase::Delaying
            }
            ShatterState::Shattering { .. } => ShatterPhase::Ramping,
            ShatterState::Destroyed => ShatterPhase::Destroyed,
        })
    }

    /// Ramp intensity of a single participant, clamped to the maximum.
    #[must_use]
    pub fn intensity_of(&self, entity: EntityRef) -> Option<f32> {
        self.state_of(entity).map(|state| self.intensity(state))
    }

    /// Highest intensity across every participant.
    #[must_use]
    pub fn peak_intensity(&self) -> f32 {
        self.participants
            .iter()
            .map(|participant| self.intensity(participant.state))
            .fold(0.0, f32::max)
    }

    fn intensity(&self, state: ShatterState) -> f32 {
        let max = self.config.max_intensity;
        match state {
            ShatterState::Idle => 0.0,
            ShatterState::Destroyed => max,
            ShatterState::Shattering { elapsed, .. } => {
                let ramp = elapsed.saturating_sub(self.config.effective_pre_delay());
                if self.config.ramp_duration.is_zero() {
                    return if ramp.is_zero() { 0.0 } else { max };
                }
                let progress = ramp.as_secs_f32() / self.config.ramp_duration.as_secs_f32();
                (max * progress).clamp(0.0, max.max(0.0))
            }
        }
    }
}
