//! Phase sequencing, per-phase statistics and the transition overlays that
//! bridge phases.
//!
//! The manager never touches entities. It reports what the session should do
//! next through [`PhaseSignal`] values and leaves applying them to `compute`.

use crate::boss::BossKind;
use crate::config::{GameConfig, PhaseDescriptor, PhaseKind, NO_DAMAGE_BONUS, PHASE_COMPLETE_BONUS};
use crate::entities::{EnemyKind, GameState};
use crate::error::ConfigError;

/// Upper bound of the time bonus; one point is lost every `TIME_BONUS_STEP` ticks.
const TIME_BONUS_MAX: u64 = 500;
const TIME_BONUS_STEP: u64 = 6;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub enemies_killed: u32,
    pub enemies_spawned: u32,
    pub power_ups_collected: u32,
    pub damage_received: u32,
    pub time_elapsed: u64,
    pub start_hp: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    BossIntro,
    PhaseComplete,
    GameOver,
    Victory,
}

/// A running overlay. Gameplay is frozen until `remaining` reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub remaining: u32,
    pub duration: u32,
}

impl Transition {
    /// 0.0 when the overlay starts, 1.0 when it ends.
    pub fn progress(&self) -> f32 {
        if self.duration == 0 {
            return 1.0;
        }
        1.0 - self.remaining as f32 / self.duration as f32
    }
}

/// What the session has to do after a phase-manager step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseSignal {
    /// Switch the top-level state.
    Enter(GameState),
    /// An overlay started; the top-level state stays as it is.
    Overlay(TransitionKind),
}

/// A phase descriptor with its type names resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Wave { kind: EnemyKind, count: u32, spawn_rate: u64 },
    Boss { kind: BossKind, hp: i32 },
}

impl Objective {
    fn resolve(phase: &PhaseDescriptor) -> Result<Self, ConfigError> {
        match &phase.kind {
            PhaseKind::NormalCombat { enemy_count, enemy_type, spawn_rate } => {
                if *spawn_rate == 0 {
                    return Err(ConfigError::InvalidSpawnRate { phase: phase.id });
                }
                Ok(Objective::Wave {
                    kind: enemy_type.parse()?,
                    count: *enemy_count,
                    spawn_rate: *spawn_rate,
                })
            }
            PhaseKind::BossFight { boss_type, boss_hp } => Ok(Objective::Boss {
                kind: boss_type.parse()?,
                hp: *boss_hp,
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PhaseManager {
    phases: Vec<PhaseDescriptor>,
    transition_ticks: u32,
    current_index: usize,
    objective: Option<Objective>,
    pub stats: PhaseStats,
    transition: Option<Transition>,
}

impl PhaseManager {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phases: config.phases.clone(),
            transition_ticks: config.transition_ticks,
            current_index: 0,
            objective: None,
            stats: PhaseStats::default(),
            transition: None,
        }
    }

    // ── Sequencing ────────────────────────────────────────────────────────

    pub fn start_first_phase(&mut self, player_hp: i32) -> PhaseSignal {
        self.load_phase(0, player_hp)
    }

    /// Make `index` the current phase. Past the last phase the victory overlay
    /// starts instead. A phase whose enemy or boss type cannot be resolved is
    /// logged and skipped.
    pub fn load_phase(&mut self, index: usize, player_hp: i32) -> PhaseSignal {
        let mut index = index;
        loop {
            self.current_index = index;
            let Some(phase) = self.phases.get(index) else {
                tracing::info!("all phases cleared");
                self.objective = None;
                self.start_transition(TransitionKind::Victory);
                return PhaseSignal::Overlay(TransitionKind::Victory);
            };

            match Objective::resolve(phase) {
                Ok(objective) => {
                    tracing::info!(phase = phase.id, name = %phase.name, "loading phase");
                    self.objective = Some(objective);
                    self.stats = PhaseStats { start_hp: player_hp, ..PhaseStats::default() };
                    return match objective {
                        Objective::Boss { .. } => {
                            self.start_transition(TransitionKind::BossIntro);
                            PhaseSignal::Enter(GameState::BossIntro)
                        }
                        Objective::Wave { .. } => PhaseSignal::Enter(GameState::Playing),
                    };
                }
                Err(err) => {
                    tracing::error!(phase = phase.id, error = %err, "skipping unplayable phase");
                    index += 1;
                }
            }
        }
    }

    pub fn next_phase(&mut self, player_hp: i32) -> PhaseSignal {
        self.load_phase(self.current_index + 1, player_hp)
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn start_transition(&mut self, kind: TransitionKind) {
        tracing::info!(?kind, "transition started");
        self.transition = Some(Transition {
            kind,
            remaining: self.transition_ticks,
            duration: self.transition_ticks,
        });
    }

    /// Count the running overlay down by one tick. When it runs out, the
    /// follow-up action is returned (and for a completed phase, performed).
    pub fn update_transition(&mut self, player_hp: i32) -> Option<PhaseSignal> {
        let transition = self.transition.as_mut()?;
        transition.remaining = transition.remaining.saturating_sub(1);
        if transition.remaining > 0 {
            return None;
        }

        let kind = transition.kind;
        self.transition = None;
        tracing::info!(?kind, "transition finished");
        let signal = match kind {
            TransitionKind::BossIntro => PhaseSignal::Enter(GameState::BossFight),
            TransitionKind::PhaseComplete => self.next_phase(player_hp),
            TransitionKind::GameOver => PhaseSignal::Enter(GameState::GameOver),
            TransitionKind::Victory => PhaseSignal::Enter(GameState::Victory),
        };
        Some(signal)
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Close out the current phase: start the phase-complete overlay and return
    /// the bonus to award.
    pub fn complete_phase(&mut self) -> u32 {
        let bonus = self.calculate_phase_bonus();
        tracing::info!(phase = self.current_index + 1, bonus, "phase complete");
        self.start_transition(TransitionKind::PhaseComplete);
        bonus
    }

    /// Start the game-over overlay unless one is already running.
    pub fn begin_game_over(&mut self) {
        if !matches!(self.transition, Some(Transition { kind: TransitionKind::GameOver, .. })) {
            self.start_transition(TransitionKind::GameOver);
        }
    }

    // ── Statistics ────────────────────────────────────────────────────────

    pub fn update_stats(&mut self) {
        self.stats.time_elapsed += 1;
    }

    pub fn record_enemy_killed(&mut self) {
        self.stats.enemies_killed += 1;
    }

    pub fn record_enemy_spawned(&mut self) {
        self.stats.enemies_spawned += 1;
    }

    /// An enemy left the arena alive; its slot goes back to the spawn budget.
    pub fn record_enemy_escaped(&mut self) {
        self.stats.enemies_spawned = self.stats.enemies_spawned.saturating_sub(1);
    }

    pub fn record_power_up_collected(&mut self) {
        self.stats.power_ups_collected += 1;
    }

    pub fn record_damage(&mut self, amount: i32) {
        self.stats.damage_received += amount.max(0) as u32;
    }

    pub fn calculate_phase_bonus(&self) -> u32 {
        let mut bonus = PHASE_COMPLETE_BONUS;
        if self.stats.damage_received == 0 {
            bonus += NO_DAMAGE_BONUS;
        }
        let time_bonus = TIME_BONUS_MAX.saturating_sub(self.stats.time_elapsed / TIME_BONUS_STEP);
        bonus + time_bonus as u32
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Combat phases finish on kill count. Boss phases never report complete
    /// here; the boss's defeat closes them.
    pub fn is_phase_complete(&self) -> bool {
        match self.objective {
            Some(Objective::Wave { count, .. }) => self.stats.enemies_killed >= count,
            _ => false,
        }
    }

    /// Enemy type to spawn this frame, if the wave cadence and budget allow it.
    pub fn spawn_due(&self, frame: u64) -> Option<EnemyKind> {
        match self.objective {
            Some(Objective::Wave { kind, count, spawn_rate })
                if self.stats.enemies_spawned < count && frame % spawn_rate == 0 =>
            {
                Some(kind)
            }
            _ => None,
        }
    }

    pub fn current_phase(&self) -> Option<&PhaseDescriptor> {
        self.objective.and(self.phases.get(self.current_index))
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn objective(&self) -> Option<Objective> {
        self.objective
    }

    /// Fraction of the wave destroyed; always 0.0 in boss fights.
    pub fn phase_progress(&self) -> f32 {
        match self.objective {
            Some(Objective::Wave { count, .. }) if count > 0 => {
                (self.stats.enemies_killed as f32 / count as f32).min(1.0)
            }
            Some(Objective::Wave { .. }) => 1.0,
            _ => 0.0,
        }
    }
}
