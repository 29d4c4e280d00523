use crate::config::Config;
use crate::score::{self, Summary};
use crate::target::{Direction, Target, TargetGenerator};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// One play session: the current target, the round clock, and every counter
/// the scorer needs. Owned by the event loop and mutated one event at a time.
#[derive(Debug)]
pub struct Game {
    pub config: Config,
    pub phase: Phase,
    pub hits: usize,
    pub misses: usize,
    pub idle_misses: usize,
    pub sequential_idle_misses: u32,
    /// Elapsed milliseconds per hit, in round order. Never longer than
    /// `config.max_matches`.
    pub results: Vec<f64>,
    started_at: Option<Instant>,
    deadline: Option<Instant>,
    target: Target,
    generator: TargetGenerator,
    summary: Option<Summary>,
}

impl Game {
    pub fn new(config: Config) -> Self {
        let generator = TargetGenerator::new(config.playfield());
        Self::with_generator(config, generator)
    }

    /// Deterministic target sequence, for replays and tests.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        let generator = TargetGenerator::seeded(seed, config.playfield());
        Self::with_generator(config, generator)
    }

    fn with_generator(config: Config, mut generator: TargetGenerator) -> Self {
        let target = generator.generate();
        Self {
            config,
            phase: Phase::Idle,
            hits: 0,
            misses: 0,
            idle_misses: 0,
            sequential_idle_misses: 0,
            results: Vec::with_capacity(config.max_matches),
            started_at: None,
            deadline: None,
            target,
            generator,
            summary: None,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Begin a session. No-op while one is already running.
    pub fn start(&mut self, now: Instant) {
        if self.phase == Phase::Running {
            return;
        }
        self.clear();
        self.target = self.generator.generate();
        self.started_at = Some(now);
        self.deadline = Some(now + self.config.idle_timeout());
        self.phase = Phase::Running;
    }

    /// Feed one classified keypress. Only meaningful while running.
    ///
    /// Every keypress counts as activity, so even a wrong key pushes the
    /// idle deadline out; the round clock (`started_at`) only moves on a hit.
    pub fn on_key(&mut self, direction: Option<Direction>, now: Instant) {
        if self.phase != Phase::Running {
            return;
        }

        self.deadline = Some(now + self.config.idle_timeout());

        match direction {
            Some(d) if d == self.target.direction => self.register_hit(now),
            _ => self.misses += 1,
        }
    }

    /// Check the idle deadline. Only ticks that are not keypresses land here;
    /// the comparison is strictly past-the-deadline.
    pub fn on_tick(&mut self, now: Instant) {
        if self.phase != Phase::Running {
            return;
        }
        let deadline = match self.deadline {
            Some(d) => d,
            None => return,
        };
        if now <= deadline {
            return;
        }

        self.misses += 1;
        self.idle_misses += 1;
        self.sequential_idle_misses += 1;

        if self.sequential_idle_misses == self.config.max_idle_misses {
            self.finish();
            return;
        }

        self.target = self.generator.generate();
        self.started_at = Some(now);
        self.deadline = Some(now + self.config.idle_timeout());
    }

    /// Back to the idle screen, dropping all counters, results and the
    /// summary. Safe to call in any phase.
    pub fn reset(&mut self) {
        self.clear();
        self.phase = Phase::Idle;
    }

    fn register_hit(&mut self, now: Instant) {
        let elapsed = match self.started_at {
            Some(t0) => now.duration_since(t0),
            None => Duration::ZERO,
        };
        self.results.push(elapsed.as_secs_f64() * 1000.0);
        self.hits += 1;
        self.sequential_idle_misses = 0;
        self.target = self.generator.generate();

        if self.hits == self.config.max_matches {
            self.finish();
        } else {
            self.started_at = Some(now);
            self.deadline = Some(now + self.config.idle_timeout());
        }
    }

    fn finish(&mut self) {
        self.summary = Some(score::finalize(
            &self.results,
            self.hits,
            self.misses,
            self.idle_misses,
            self.config.idle_punishment_ms,
        ));
        self.started_at = None;
        self.deadline = None;
        self.phase = Phase::Finished;
    }

    fn clear(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.idle_misses = 0;
        self.sequential_idle_misses = 0;
        self.results.clear();
        self.started_at = None;
        self.deadline = None;
        self.summary = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_game() -> Game {
        Game::with_seed(Config::default(), 42)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Press the key matching the current target.
    fn hit(game: &mut Game, at: Instant) {
        let expected = game.target().direction;
        game.on_key(Some(expected), at);
    }

    /// Press a key that does not match the current target.
    fn wrong_key(game: &mut Game, at: Instant) {
        let expected = game.target().direction;
        let wrong = Direction::ALL
            .into_iter()
            .find(|d| *d != expected)
            .unwrap();
        game.on_key(Some(wrong), at);
    }

    #[test]
    fn test_new_game_is_idle() {
        let game = test_game();

        assert_matches!(game.phase, Phase::Idle);
        assert_eq!(game.hits, 0);
        assert_eq!(game.misses, 0);
        assert!(game.results.is_empty());
        assert!(game.summary().is_none());
        assert!(game.deadline().is_none());
    }

    #[test]
    fn test_start_enters_running_and_arms_deadline() {
        let mut game = test_game();
        let t0 = Instant::now();

        game.start(t0);

        assert_matches!(game.phase, Phase::Running);
        assert_eq!(game.deadline(), Some(t0 + ms(3000)));
    }

    #[test]
    fn test_start_is_a_noop_while_running() {
        let mut game = test_game();
        let t0 = Instant::now();

        game.start(t0);
        hit(&mut game, t0 + ms(500));
        let target_before = *game.target();

        game.start(t0 + ms(600));

        assert_eq!(game.hits, 1);
        assert_eq!(*game.target(), target_before);
    }

    #[test]
    fn test_hits_append_results_in_lockstep() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        for round in 1..=5u64 {
            hit(&mut game, t0 + ms(round * 400));
            assert_eq!(game.results.len(), game.hits);
        }

        assert_eq!(game.hits, 5);
    }

    #[test]
    fn test_hit_records_elapsed_from_round_start() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        hit(&mut game, t0 + ms(500));
        // round clock restarts at the hit, so the next hit is measured
        // from there
        hit(&mut game, t0 + ms(1200));

        assert_eq!(game.results, vec![500.0, 700.0]);
    }

    #[test]
    fn test_wrong_key_counts_a_miss_without_advancing() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        let target_before = *game.target();

        wrong_key(&mut game, t0 + ms(200));

        assert_eq!(game.misses, 1);
        assert_eq!(game.hits, 0);
        assert!(game.results.is_empty());
        assert_eq!(*game.target(), target_before);
    }

    #[test]
    fn test_unclassified_key_counts_a_miss() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        game.on_key(None, t0 + ms(200));

        assert_eq!(game.misses, 1);
    }

    #[test]
    fn test_any_keypress_refreshes_the_deadline() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        wrong_key(&mut game, t0 + ms(2500));

        assert_eq!(game.deadline(), Some(t0 + ms(2500) + ms(3000)));
        // the round clock did not move: a hit right after still measures
        // from t0
        hit(&mut game, t0 + ms(2600));
        assert_eq!(game.results, vec![2600.0]);
    }

    #[test]
    fn test_session_finishes_after_max_matches() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        for round in 1..=10u64 {
            hit(&mut game, t0 + ms(round * 300));
        }

        assert_matches!(game.phase, Phase::Finished);
        assert_eq!(game.results.len(), 10);
        let summary = game.summary().unwrap();
        assert_eq!(summary.average_ms, 300.0);
        assert_eq!(summary.score, 10);
    }

    #[test]
    fn test_input_after_finish_is_ignored() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        for round in 1..=10u64 {
            hit(&mut game, t0 + ms(round * 300));
        }

        hit(&mut game, t0 + ms(4000));
        game.on_tick(t0 + ms(60_000));

        assert_eq!(game.hits, 10);
        assert_eq!(game.misses, 0);
    }

    #[test]
    fn test_tick_at_the_deadline_is_not_idle() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        game.on_tick(t0 + ms(3000));

        assert_eq!(game.idle_misses, 0);
        assert_eq!(game.misses, 0);
    }

    #[test]
    fn test_tick_past_the_deadline_is_an_idle_miss() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        let target_before = *game.target();

        let tick = t0 + ms(3001);
        game.on_tick(tick);

        assert_eq!(game.misses, 1);
        assert_eq!(game.idle_misses, 1);
        assert_eq!(game.sequential_idle_misses, 1);
        // round regenerated and rearmed from the tick time
        assert_ne!(*game.target(), target_before);
        assert_eq!(game.deadline(), Some(tick + ms(3000)));
        assert_matches!(game.phase, Phase::Running);
    }

    #[test]
    fn test_three_sequential_idle_misses_finish_the_session() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        let mut now = t0;
        for _ in 0..3 {
            now += ms(3001);
            game.on_tick(now);
        }

        assert_matches!(game.phase, Phase::Finished);
        assert_eq!(game.idle_misses, 3);
        let summary = game.summary().unwrap();
        assert_eq!(summary.score, -3);
        assert_eq!(summary.average_ms, 0.0);
    }

    #[test]
    fn test_a_hit_resets_the_sequential_idle_count() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);

        game.on_tick(t0 + ms(3001));
        game.on_tick(t0 + ms(6003));
        assert_eq!(game.sequential_idle_misses, 2);

        hit(&mut game, t0 + ms(6500));

        assert_eq!(game.sequential_idle_misses, 0);
        // two more idle rounds are survivable again
        game.on_tick(t0 + ms(9502));
        game.on_tick(t0 + ms(12_503));
        assert_matches!(game.phase, Phase::Running);
    }

    #[test]
    fn test_idle_penalties_show_up_in_the_summary() {
        let mut config = Config::default();
        config.max_matches = 2;
        let mut game = Game::with_seed(config, 42);
        let t0 = Instant::now();
        game.start(t0);

        game.on_tick(t0 + ms(3001));
        let after_idle = t0 + ms(3001);
        hit(&mut game, after_idle + ms(100));
        hit(&mut game, after_idle + ms(300));

        // results [100, 200] plus one 3000ms penalty on index 0
        let summary = game.summary().unwrap();
        assert_eq!(summary.average_ms, (3100.0 + 200.0) / 2.0);
        assert_eq!(summary.score, 1);
    }

    #[test]
    fn test_reset_returns_to_idle_from_finished() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        for round in 1..=10u64 {
            hit(&mut game, t0 + ms(round * 300));
        }
        assert_matches!(game.phase, Phase::Finished);

        game.reset();

        assert_matches!(game.phase, Phase::Idle);
        assert_eq!(game.hits, 0);
        assert_eq!(game.misses, 0);
        assert_eq!(game.idle_misses, 0);
        assert!(game.results.is_empty());
        assert!(game.summary().is_none());
    }

    #[test]
    fn test_reset_cancels_a_running_session() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        hit(&mut game, t0 + ms(400));

        game.reset();

        assert_matches!(game.phase, Phase::Idle);
        assert!(game.deadline().is_none());
        assert!(game.results.is_empty());
    }

    #[test]
    fn test_start_from_finished_begins_a_fresh_session() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        for round in 1..=10u64 {
            hit(&mut game, t0 + ms(round * 300));
        }

        let t1 = t0 + ms(20_000);
        game.start(t1);

        assert_matches!(game.phase, Phase::Running);
        assert_eq!(game.hits, 0);
        assert!(game.results.is_empty());
        assert!(game.summary().is_none());
        assert_eq!(game.deadline(), Some(t1 + ms(3000)));
    }

    #[test]
    fn test_key_and_tick_before_start_are_noops() {
        let mut game = test_game();
        let t0 = Instant::now();

        game.on_key(Some(Direction::Up), t0);
        game.on_tick(t0 + ms(10_000));

        assert_matches!(game.phase, Phase::Idle);
        assert_eq!(game.misses, 0);
        assert_eq!(game.idle_misses, 0);
    }

    #[test]
    fn test_targets_always_fit_the_playfield() {
        let mut game = test_game();
        let t0 = Instant::now();
        game.start(t0);
        let field = game.config.playfield();

        let mut now = t0;
        for _ in 0..50 {
            assert!(field.contains(game.target()));
            now += ms(100);
            hit(&mut game, now);
            if !game.is_running() {
                game.start(now);
            }
        }
    }
}
