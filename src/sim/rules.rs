//! Game rules: score, lives, milestones and phase transitions
//!
//! The rules engine never touches the ball, paddle or bricks directly. It
//! reacts to physics events and answers with [`RuleCommand`]s, which the
//! orchestration layer applies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::bricks::BrickColor;
use super::events::{GameEvent, Outbox, RuleCommand};
use crate::tuning::RulesTuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball waiting at the serve point
    Serving,
    /// Active gameplay
    Playing,
    /// Out of lives
    GameOver,
    /// Every brick destroyed
    LevelComplete,
}

/// One-shot speed milestones
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Milestones {
    /// Hit thresholds that already fired
    pub hits: BTreeSet<u32>,
    pub orange_contact: bool,
    pub red_contact: bool,
}

/// Rules-owned game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub lives: u32,
    /// 1-based level number
    pub level: u32,
    /// Bricks destroyed this level
    pub total_hits: u32,
    pub milestones: Milestones,
    pub paddle_shrunk: bool,
    /// Set by the first red brick, cleared when the shrink fires
    pub red_row_broken: bool,
    pub phase: GamePhase,
}

impl GameState {
    fn new(starting_lives: u32) -> Self {
        Self {
            score: 0,
            lives: starting_lives,
            level: 1,
            total_hits: 0,
            milestones: Milestones::default(),
            paddle_shrunk: false,
            red_row_broken: false,
            phase: GamePhase::Serving,
        }
    }

    fn reset_level_counters(&mut self) {
        self.total_hits = 0;
        self.milestones = Milestones::default();
        self.paddle_shrunk = false;
        self.red_row_broken = false;
    }
}

/// Simple decrementing timer
#[derive(Debug, Clone, Copy, PartialEq)]
struct Countdown {
    remaining: f32,
}

impl Countdown {
    fn new(secs: f32) -> Self {
        Self { remaining: secs }
    }

    /// Whole seconds left, rounded up
    fn whole_secs(&self) -> u32 {
        self.remaining.max(0.0).ceil() as u32
    }

    fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// The game-state machine
#[derive(Debug, Clone)]
pub struct RulesEngine {
    state: GameState,
    tuning: RulesTuning,
    continue_timer: Option<Countdown>,
    advance_timer: Option<Countdown>,
}

impl RulesEngine {
    pub fn new(tuning: RulesTuning) -> Self {
        Self {
            state: GameState::new(tuning.starting_lives),
            tuning,
            continue_timer: None,
            advance_timer: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Seconds left on the continue countdown, if running
    pub fn continue_secs_left(&self) -> Option<f32> {
        self.continue_timer.map(|t| t.remaining.max(0.0))
    }

    /// Serving -> Playing once the serve completes
    pub fn begin_play(&mut self, out: &mut Outbox) {
        if self.state.phase != GamePhase::Serving {
            log::debug!("begin_play ignored in {:?}", self.state.phase);
            return;
        }
        self.set_phase(GamePhase::Playing, out);
        out.emit(GameEvent::BallServed);
    }

    /// A brick was destroyed; `cleared` is set when it was the last one
    pub fn on_brick_destroyed(&mut self, color: BrickColor, cleared: bool, out: &mut Outbox) {
        if self.state.phase != GamePhase::Playing {
            log::debug!("Brick event ignored in {:?}", self.state.phase);
            return;
        }

        self.state.total_hits += 1;
        self.state.score += u64::from(self.tuning.points.for_color(color));
        out.emit(GameEvent::ScoreChanged(self.state.score));

        let hits = self.state.total_hits;
        if self.tuning.hit_milestones.contains(&hits) && self.state.milestones.hits.insert(hits) {
            log::debug!("Hit milestone {hits} reached");
            self.speed_up(out);
        }

        match color {
            BrickColor::Orange if !self.state.milestones.orange_contact => {
                self.state.milestones.orange_contact = true;
                log::debug!("First orange brick");
                self.speed_up(out);
            }
            BrickColor::Red if !self.state.milestones.red_contact => {
                self.state.milestones.red_contact = true;
                self.state.red_row_broken = true;
                log::debug!("First red brick, paddle shrink armed");
                self.speed_up(out);
            }
            _ => {}
        }

        if cleared {
            log::info!(
                "Level {} complete with score {}",
                self.state.level,
                self.state.score
            );
            self.set_phase(GamePhase::LevelComplete, out);
            out.emit(GameEvent::LevelComplete);
            self.advance_timer = self.tuning.level_advance_secs.map(Countdown::new);
        }
    }

    /// The ball bounced off the ceiling
    pub fn on_ceiling_hit(&mut self, out: &mut Outbox) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        if self.state.red_row_broken && !self.state.paddle_shrunk {
            self.state.paddle_shrunk = true;
            self.state.red_row_broken = false;
            log::debug!("Ceiling hit after red row, shrinking paddle");
            out.command(RuleCommand::ShrinkPaddle);
        }
    }

    /// The ball left through the bottom
    pub fn on_out_of_bounds(&mut self, out: &mut Outbox) {
        if self.state.phase != GamePhase::Playing {
            log::debug!("Out-of-bounds ignored in {:?}", self.state.phase);
            return;
        }

        self.state.lives = self.state.lives.saturating_sub(1);
        out.emit(GameEvent::LivesChanged(self.state.lives));

        if self.state.lives == 0 {
            log::info!("Game over with score {}", self.state.score);
            self.set_phase(GamePhase::GameOver, out);
            out.emit(GameEvent::GameOver);
            self.continue_timer = self.tuning.continue_secs.map(Countdown::new);
            if let Some(timer) = self.continue_timer {
                out.emit(GameEvent::ContinueCountdown(timer.whole_secs()));
            }
        } else {
            log::debug!("Life lost, {} remaining", self.state.lives);
            self.set_phase(GamePhase::Serving, out);
            out.command(RuleCommand::RespawnBall);
        }
    }

    /// Full restart: score, lives and every flag reset
    pub fn restart(&mut self, out: &mut Outbox) {
        log::info!("Restarting game");
        self.state = GameState::new(self.tuning.starting_lives);
        self.continue_timer = None;
        self.advance_timer = None;

        out.command(RuleCommand::ResetLevel { new_game: true });
        out.emit(GameEvent::ScoreChanged(0));
        out.emit(GameEvent::LivesChanged(self.state.lives));
        out.emit(GameEvent::LevelStarted(self.state.level));
        out.emit(GameEvent::StateChanged(GamePhase::Serving));
    }

    /// Next level after a clear: score and lives carry over
    pub fn advance_level(&mut self, out: &mut Outbox) {
        if self.state.phase != GamePhase::LevelComplete {
            log::debug!("advance_level ignored in {:?}", self.state.phase);
            return;
        }

        self.state.level += 1;
        self.state.reset_level_counters();
        self.advance_timer = None;
        log::info!("Starting level {}", self.state.level);

        out.command(RuleCommand::ResetLevel { new_game: false });
        out.emit(GameEvent::LevelStarted(self.state.level));
        self.set_phase(GamePhase::Serving, out);
    }

    /// Per-frame timers: the continue countdown and level auto-advance
    pub fn update_timers(&mut self, dt: f32, out: &mut Outbox) {
        if let Some(timer) = self.continue_timer.as_mut() {
            let before = timer.whole_secs();
            let expired = timer.tick(dt);
            let after = timer.whole_secs();
            if after != before && !expired {
                out.emit(GameEvent::ContinueCountdown(after));
            }
            if expired {
                log::info!("Continue countdown expired");
                self.continue_timer = None;
                if before != 0 {
                    out.emit(GameEvent::ContinueCountdown(0));
                }
                out.emit(GameEvent::ContinueExpired);
            }
        }

        if let Some(timer) = self.advance_timer.as_mut() {
            if timer.tick(dt) {
                self.advance_timer = None;
                self.advance_level(out);
            }
        }
    }

    fn speed_up(&mut self, out: &mut Outbox) {
        out.command(RuleCommand::IncreaseSpeed {
            factor: self.tuning.milestone_factor,
        });
    }

    fn set_phase(&mut self, phase: GamePhase, out: &mut Outbox) {
        if self.state.phase != phase {
            log::debug!("Phase {:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
            out.emit(GameEvent::StateChanged(phase));
        }
    }
}
