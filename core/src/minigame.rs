//! Rule machines for the two embedded minigames. Rendering and input
//! plumbing live in the client; the numbers here are the reward source of
//! truth.

use rand::Rng;

use crate::constants::{
    PENALTY_GOAL_XP, PENALTY_SAVE_XP, SPRINT_FAST_SECS, SPRINT_FAST_XP, SPRINT_GOOD_SECS,
    SPRINT_GOOD_XP, SPRINT_SLOW_XP, SPRINT_TAP_PROGRESS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameKind {
    Penalty,
    Sprint,
}

/// Goal zones for the penalty shootout; shooter aim and keeper dive use the
/// same three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AimZone {
    Left,
    Center,
    Right,
}

impl AimZone {
    const ALL: [AimZone; 3] = [AimZone::Left, AimZone::Center, AimZone::Right];

    /// Horizontal position of the zone as a percentage of goal width.
    pub fn percent(self) -> f32 {
        match self {
            AimZone::Left => 20.0,
            AimZone::Center => 50.0,
            AimZone::Right => 80.0,
        }
    }
}

/// Outcome of one penalty kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    pub aim: AimZone,
    pub dive: AimZone,
    pub saved: bool,
    pub xp: i64,
}

/// Resolves a kick: the keeper dives to a random zone, and the shot is saved
/// exactly when the dive zone equals the shot zone.
pub fn resolve_penalty<R: Rng>(aim: AimZone, rng: &mut R) -> PenaltyOutcome {
    let dive = AimZone::ALL[rng.gen_range(0..AimZone::ALL.len())];
    let saved = dive == aim;
    PenaltyOutcome {
        aim,
        dive,
        saved,
        xp: if saved { PENALTY_SAVE_XP } else { PENALTY_GOAL_XP },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintSide {
    Left,
    Right,
}

/// The 100m dash: alternate left/right taps to fill the progress bar; the
/// finish time decides the reward.
#[derive(Debug, Clone)]
pub struct SprintRun {
    progress: f32,
    elapsed: f32,
    last_tap: Option<SprintSide>,
    finished: bool,
}

impl Default for SprintRun {
    fn default() -> Self {
        Self::new()
    }
}

impl SprintRun {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            elapsed: 0.0,
            last_tap: None,
            finished: false,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the race clock. No-op once finished.
    pub fn tick(&mut self, dt_secs: f32) {
        if !self.finished {
            self.elapsed += dt_secs;
        }
    }

    /// Registers a tap. Only alternating sides advance the runner; mashing
    /// one side does nothing.
    pub fn tap(&mut self, side: SprintSide) -> bool {
        if self.finished || self.last_tap == Some(side) {
            return false;
        }
        self.last_tap = Some(side);
        self.progress = (self.progress + SPRINT_TAP_PROGRESS).min(100.0);
        if self.progress >= 100.0 {
            self.finished = true;
        }
        true
    }

    /// Reward for the finish time.
    pub fn xp(&self) -> i64 {
        xp_for_time(self.elapsed)
    }

    /// Result banner text matching the reward.
    pub fn verdict(&self) -> &'static str {
        if self.elapsed < SPRINT_FAST_SECS {
            "LIGHTNING FAST!"
        } else if self.elapsed < SPRINT_GOOD_SECS {
            "Great Run!"
        } else {
            "Good Effort!"
        }
    }
}

/// Sprint reward table: under 8s scores 100, under 12s scores 50, anything
/// slower 20.
pub fn xp_for_time(secs: f32) -> i64 {
    if secs < SPRINT_FAST_SECS {
        SPRINT_FAST_XP
    } else if secs < SPRINT_GOOD_SECS {
        SPRINT_GOOD_XP
    } else {
        SPRINT_SLOW_XP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn save_exactly_when_dive_matches_aim() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let outcome = resolve_penalty(AimZone::Left, &mut rng);
            assert_eq!(outcome.saved, outcome.dive == AimZone::Left);
            if outcome.saved {
                assert_eq!(outcome.xp, PENALTY_SAVE_XP);
            } else {
                assert_eq!(outcome.xp, PENALTY_GOAL_XP);
            }
        }
    }

    #[test]
    fn keeper_eventually_covers_every_zone() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..200 {
            match resolve_penalty(AimZone::Center, &mut rng).dive {
                AimZone::Left => seen[0] = true,
                AimZone::Center => seen[1] = true,
                AimZone::Right => seen[2] = true,
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn sprint_requires_alternating_taps() {
        let mut run = SprintRun::new();
        assert!(run.tap(SprintSide::Left));
        assert!(!run.tap(SprintSide::Left), "same side must not advance");
        assert!(run.tap(SprintSide::Right));
        assert_eq!(run.progress(), 10.0);
    }

    #[test]
    fn sprint_finishes_after_twenty_alternations() {
        let mut run = SprintRun::new();
        let mut taps = 0;
        let mut side = SprintSide::Left;
        while !run.is_finished() {
            assert!(run.tap(side));
            side = match side {
                SprintSide::Left => SprintSide::Right,
                SprintSide::Right => SprintSide::Left,
            };
            taps += 1;
        }
        assert_eq!(taps, 20);
        assert_eq!(run.progress(), 100.0);
        assert!(!run.tap(side), "taps after the finish are ignored");
    }

    #[test]
    fn sprint_reward_follows_time_thresholds() {
        assert_eq!(xp_for_time(5.0), 100);
        assert_eq!(xp_for_time(7.99), 100);
        assert_eq!(xp_for_time(8.0), 50);
        assert_eq!(xp_for_time(11.9), 50);
        assert_eq!(xp_for_time(12.0), 20);
        assert_eq!(xp_for_time(30.0), 20);
    }

    #[test]
    fn sprint_clock_stops_at_the_finish() {
        let mut run = SprintRun::new();
        run.tick(4.0);
        let mut side = SprintSide::Left;
        while !run.is_finished() {
            run.tap(side);
            side = match side {
                SprintSide::Left => SprintSide::Right,
                SprintSide::Right => SprintSide::Left,
            };
        }
        run.tick(10.0);
        assert_eq!(run.elapsed(), 4.0);
        assert_eq!(run.xp(), 100);
        assert_eq!(run.verdict(), "LIGHTNING FAST!");
    }
}
