use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use rand::Rng;
use tracing::debug;

use crate::corpus::Corpus;

/// Words sampled per trial unless configured otherwise.
pub const DEFAULT_WORD_COUNT: usize = 25;

/// Source of "now" for timing anchors and live wpm.
pub trait Clock: Debug {
    fn now(&self) -> SystemTime;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually advanced clock. Clones share the same reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::at(SystemTime::UNIX_EPOCH)
    }

    pub fn at(t: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(t)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TrialState {
    #[strum(to_string = "not started")]
    NotStarted,
    #[strum(to_string = "in progress")]
    InProgress,
    #[strum(to_string = "complete")]
    Complete,
}

/// What a word boundary did to the trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Trial was already complete (or has no words); nothing changed.
    Ignored,
    /// A word was scored and more remain.
    Scored { correct: bool },
    /// The final word was scored; the trial is now complete.
    Completed { correct: bool },
}

/// One typing trial: target words, cursor, per-word results and timing anchors.
///
/// Metrics are derived on every read and never stored.
#[derive(Debug)]
pub struct Trial<C: Clock = SystemClock> {
    corpus: Corpus,
    count: usize,
    clock: C,
    target_words: Vec<String>,
    active_index: usize,
    pending_input: String,
    word_results: Vec<bool>,
    started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,
}

impl Trial<SystemClock> {
    pub fn with_system_clock(corpus: Corpus, count: usize) -> Self {
        Self::new(corpus, count, SystemClock)
    }
}

impl<C: Clock> Trial<C> {
    pub fn new(corpus: Corpus, count: usize, clock: C) -> Self {
        let mut trial = Self {
            corpus,
            count,
            clock,
            target_words: Vec::new(),
            active_index: 0,
            pending_input: String::new(),
            word_results: Vec::new(),
            started_at: None,
            finished_at: None,
        };
        trial.reset();
        trial
    }

    /// Discard all state and sample a fresh target sequence.
    pub fn reset(&mut self) {
        self.reset_with_rng(&mut rand::thread_rng());
    }

    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.target_words = self.corpus.sample(self.count, rng);
        self.active_index = 0;
        self.pending_input.clear();
        self.word_results.clear();
        self.started_at = None;
        self.finished_at = None;
        debug!(words = self.target_words.len(), "trial reset");
    }

    fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    pub fn submit_character(&mut self, ch: char) {
        if self.is_complete() {
            return;
        }
        self.mark_started();
        self.pending_input.push(ch);
    }

    /// Backspace within the current word. Submitted words stay as scored.
    pub fn erase_character(&mut self) {
        if self.is_complete() {
            return;
        }
        self.pending_input.pop();
    }

    /// Score the pending input against the active word.
    ///
    /// Whitespace-only input still consumes the slot and scores as incorrect.
    pub fn submit_word_boundary(&mut self) -> Submission {
        if self.is_complete() || self.active_index >= self.target_words.len() {
            return Submission::Ignored;
        }
        self.mark_started();

        let correct = self.pending_input.trim() == self.target_words[self.active_index];
        self.word_results.push(correct);
        self.active_index += 1;
        self.pending_input.clear();

        if self.active_index == self.target_words.len() {
            self.finished_at = Some(self.clock.now());
            debug!(
                wpm = self.wpm(),
                accuracy = self.accuracy(),
                "trial complete"
            );
            Submission::Completed { correct }
        } else {
            Submission::Scored { correct }
        }
    }

    /// Route a raw key: whitespace is a word boundary, anything else is input.
    pub fn type_key(&mut self, ch: char) -> Option<Submission> {
        if ch.is_whitespace() {
            Some(self.submit_word_boundary())
        } else {
            self.submit_character(ch);
            None
        }
    }

    pub fn correct_count(&self) -> usize {
        self.word_results.iter().filter(|&&ok| ok).count()
    }

    /// Live estimate while typing, frozen once the trial completes.
    pub fn wpm(&self) -> u32 {
        self.wpm_at(self.clock.now())
    }

    pub fn wpm_at(&self, now: SystemTime) -> u32 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let end = self.finished_at.unwrap_or(now);
        let elapsed_minutes = end
            .duration_since(started_at)
            .unwrap_or_default()
            .as_secs_f64()
            / 60.0;
        if elapsed_minutes == 0.0 {
            return 0;
        }

        let wpm = (self.correct_count() as f64 / elapsed_minutes).round();
        if wpm.is_finite() {
            wpm as u32
        } else {
            0
        }
    }

    pub fn accuracy(&self) -> u8 {
        if self.word_results.is_empty() {
            return 0;
        }
        (100.0 * self.correct_count() as f64 / self.word_results.len() as f64).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn state(&self) -> TrialState {
        match (self.started_at, self.finished_at) {
            (_, Some(_)) => TrialState::Complete,
            (Some(_), None) => TrialState::InProgress,
            (None, None) => TrialState::NotStarted,
        }
    }

    pub fn target_words(&self) -> &[String] {
        &self.target_words
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_word(&self) -> Option<&str> {
        self.target_words.get(self.active_index).map(String::as_str)
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn word_results(&self) -> &[bool] {
        &self.word_results
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_trial(words: &[&str]) -> (Trial<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let corpus = Corpus::from_words("test", words.iter().copied());
        let mut trial = Trial::new(corpus, words.len(), clock.clone());
        // Pin the order so scenarios can name their targets
        trial.target_words = words.iter().map(|w| w.to_string()).collect();
        (trial, clock)
    }

    fn type_word(trial: &mut Trial<ManualClock>, word: &str) -> Submission {
        for c in word.chars() {
            trial.submit_character(c);
        }
        trial.submit_word_boundary()
    }

    fn assert_cursor_invariant<C: Clock>(trial: &Trial<C>) {
        assert_eq!(trial.word_results().len(), trial.active_index());
    }

    #[test]
    fn test_new_trial_is_fresh() {
        let (trial, _) = fixed_trial(&["the", "quick", "brown"]);

        assert_eq!(trial.active_index(), 0);
        assert!(trial.word_results().is_empty());
        assert_eq!(trial.pending_input(), "");
        assert_eq!(trial.started_at(), None);
        assert_eq!(trial.finished_at(), None);
        assert_eq!(trial.state(), TrialState::NotStarted);
        assert_eq!(trial.wpm(), 0);
        assert_eq!(trial.accuracy(), 0);
    }

    #[test]
    fn test_reset_samples_min_of_count_and_corpus() {
        let corpus = Corpus::from_words("t", ["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(1);

        let mut trial = Trial::new(corpus.clone(), 25, ManualClock::new());
        trial.reset_with_rng(&mut rng);
        assert_eq!(trial.target_words().len(), 4);
        let mut sorted = trial.target_words().to_vec();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);

        let mut trial = Trial::new(corpus, 2, ManualClock::new());
        trial.reset_with_rng(&mut rng);
        assert_eq!(trial.target_words().len(), 2);
    }

    #[test]
    fn test_reset_mid_trial_discards_everything() {
        let (mut trial, clock) = fixed_trial(&["the", "quick", "brown"]);
        type_word(&mut trial, "the");
        clock.advance(Duration::from_secs(1));
        trial.submit_character('q');

        trial.reset();

        assert_eq!(trial.active_index(), 0);
        assert!(trial.word_results().is_empty());
        assert_eq!(trial.pending_input(), "");
        assert_eq!(trial.started_at(), None);
        assert_eq!(trial.finished_at(), None);
        assert_eq!(trial.target_words().len(), 3);
    }

    #[test]
    fn test_reset_after_completion_returns_to_not_started() {
        let (mut trial, _) = fixed_trial(&["a"]);
        assert_matches!(type_word(&mut trial, "a"), Submission::Completed { correct: true });

        trial.reset();
        assert_eq!(trial.state(), TrialState::NotStarted);
        assert!(!trial.is_complete());
    }

    #[test]
    fn test_first_character_starts_clock_once() {
        let (mut trial, clock) = fixed_trial(&["the", "quick"]);
        clock.advance(Duration::from_secs(5));

        trial.submit_character('t');
        let started = trial.started_at();
        assert_eq!(started, Some(SystemTime::UNIX_EPOCH + Duration::from_secs(5)));
        assert_eq!(trial.state(), TrialState::InProgress);

        clock.advance(Duration::from_secs(1));
        trial.submit_character('h');
        assert_eq!(trial.started_at(), started);
        assert_eq!(trial.pending_input(), "th");
    }

    #[test]
    fn test_perfect_scenario_scores_90_wpm() {
        let (mut trial, clock) = fixed_trial(&["the", "quick", "brown"]);

        assert_matches!(type_word(&mut trial, "the"), Submission::Scored { correct: true });
        assert_cursor_invariant(&trial);
        clock.advance(Duration::from_secs(1));
        assert_matches!(type_word(&mut trial, "quick"), Submission::Scored { correct: true });
        assert_cursor_invariant(&trial);
        clock.advance(Duration::from_secs(1));
        assert_matches!(
            type_word(&mut trial, "brown"),
            Submission::Completed { correct: true }
        );
        assert_cursor_invariant(&trial);

        assert_eq!(trial.word_results(), &[true, true, true]);
        assert_eq!(trial.active_index(), 3);
        assert!(trial.is_complete());
        assert_eq!(trial.state(), TrialState::Complete);
        assert_eq!(trial.accuracy(), 100);
        assert_eq!(trial.wpm(), 90);
    }

    #[test]
    fn test_wpm_is_frozen_after_completion() {
        let (mut trial, clock) = fixed_trial(&["the", "quick", "brown"]);
        type_word(&mut trial, "the");
        clock.advance(Duration::from_secs(1));
        type_word(&mut trial, "quick");
        clock.advance(Duration::from_secs(1));
        type_word(&mut trial, "brown");

        clock.advance(Duration::from_secs(600));
        assert_eq!(trial.wpm(), 90);
    }

    #[test]
    fn test_mistyped_word_scenario() {
        let (mut trial, _) = fixed_trial(&["the", "quick", "brown"]);

        type_word(&mut trial, "the");
        assert_matches!(type_word(&mut trial, "slow"), Submission::Scored { correct: false });
        type_word(&mut trial, "brown");

        assert_eq!(trial.word_results(), &[true, false, true]);
        assert_eq!(trial.accuracy(), 67);
    }

    #[test]
    fn test_empty_submission_consumes_slot() {
        let (mut trial, _) = fixed_trial(&["the", "quick", "brown"]);

        assert_eq!(trial.type_key(' '), Some(Submission::Scored { correct: false }));

        assert_eq!(trial.word_results(), &[false]);
        assert_eq!(trial.active_index(), 1);
        assert!(trial.has_started());
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let (mut trial, _) = fixed_trial(&["the", "quick"]);
        for c in "\tthe ".chars() {
            trial.submit_character(c);
        }
        assert_eq!(trial.submit_word_boundary(), Submission::Scored { correct: true });
    }

    #[test]
    fn test_match_is_exact() {
        let (mut trial, _) = fixed_trial(&["the", "quick"]);
        assert_eq!(type_word(&mut trial, "The"), Submission::Scored { correct: false });
        assert_eq!(type_word(&mut trial, "quic"), Submission::Completed { correct: false });
        assert_eq!(trial.accuracy(), 0);
    }

    #[test]
    fn test_complete_trial_ignores_input() {
        let (mut trial, clock) = fixed_trial(&["a", "b"]);
        type_word(&mut trial, "a");
        type_word(&mut trial, "b");
        assert!(trial.is_complete());
        let finished = trial.finished_at();

        clock.advance(Duration::from_secs(3));
        trial.submit_character('x');
        trial.erase_character();
        assert_eq!(trial.submit_word_boundary(), Submission::Ignored);
        assert_eq!(trial.type_key(' '), Some(Submission::Ignored));

        assert_eq!(trial.pending_input(), "");
        assert_eq!(trial.word_results(), &[true, true]);
        assert_eq!(trial.active_index(), 2);
        assert_eq!(trial.finished_at(), finished);
    }

    #[test]
    fn test_erase_character_edits_pending_only() {
        let (mut trial, _) = fixed_trial(&["the", "quick"]);
        type_word(&mut trial, "the");

        trial.erase_character();
        assert_eq!(trial.pending_input(), "");
        assert_eq!(trial.word_results(), &[true]);

        trial.submit_character('q');
        trial.submit_character('x');
        trial.erase_character();
        assert_eq!(trial.pending_input(), "q");
    }

    #[test]
    fn test_type_key_routes_by_whitespace() {
        let (mut trial, _) = fixed_trial(&["hi", "yo"]);
        assert_eq!(trial.type_key('h'), None);
        assert_eq!(trial.type_key('i'), None);
        assert_eq!(trial.type_key('\n'), Some(Submission::Scored { correct: true }));
    }

    #[test]
    fn test_wpm_guards_zero_elapsed() {
        let (mut trial, _) = fixed_trial(&["a", "b"]);
        // Clock never moves: elapsed stays zero
        type_word(&mut trial, "a");
        assert_eq!(trial.wpm(), 0);
        type_word(&mut trial, "b");
        assert!(trial.is_complete());
        assert_eq!(trial.wpm(), 0);
    }

    #[test]
    fn test_wpm_tiny_elapsed_stays_finite() {
        let (mut trial, clock) = fixed_trial(&["a", "b"]);
        type_word(&mut trial, "a");
        clock.advance(Duration::from_nanos(1));
        let wpm = trial.wpm();
        assert!(wpm > 0);
    }

    #[test]
    fn test_wpm_with_clock_before_start() {
        let (mut trial, clock) = fixed_trial(&["a", "b"]);
        clock.advance(Duration::from_secs(10));
        type_word(&mut trial, "a");
        assert_eq!(trial.wpm_at(SystemTime::UNIX_EPOCH), 0);
    }

    #[test]
    fn test_live_wpm_tracks_clock() {
        let (mut trial, clock) = fixed_trial(&["a", "b", "c"]);
        type_word(&mut trial, "a");
        clock.advance(Duration::from_secs(30));
        assert_eq!(trial.wpm(), 2);
        clock.advance(Duration::from_secs(30));
        assert_eq!(trial.wpm(), 1);
    }

    #[test]
    fn test_accuracy_rounding() {
        let (mut trial, _) = fixed_trial(&["a", "b", "c"]);
        type_word(&mut trial, "a");
        type_word(&mut trial, "x");
        assert_eq!(trial.accuracy(), 50);
        type_word(&mut trial, "x");
        assert_eq!(trial.accuracy(), 33);
    }

    #[test]
    fn test_empty_corpus_never_completes() {
        let mut trial = Trial::new(Corpus::from_words("empty", [""; 0]), 25, ManualClock::new());
        assert!(trial.target_words().is_empty());
        assert_eq!(trial.submit_word_boundary(), Submission::Ignored);
        assert!(!trial.is_complete());
        assert_cursor_invariant(&trial);
    }

    #[test]
    fn test_invariant_holds_across_random_walk() {
        let corpus = Corpus::load(crate::corpus::DEFAULT_CORPUS).unwrap();
        let clock = ManualClock::new();
        let mut trial = Trial::new(corpus, DEFAULT_WORD_COUNT, clock.clone());
        let mut rng = StdRng::seed_from_u64(99);
        trial.reset_with_rng(&mut rng);

        for step in 0..400u32 {
            clock.advance(Duration::from_millis(120));
            match rng.gen_range(0..10) {
                0..=5 => trial.submit_character(rng.gen_range(b'a'..=b'z') as char),
                6 => trial.erase_character(),
                _ => {
                    if let Some(word) = trial.active_word().map(str::to_owned) {
                        if step % 3 == 0 {
                            for c in word.chars() {
                                trial.submit_character(c);
                            }
                        }
                    }
                    trial.submit_word_boundary();
                }
            }
            assert_cursor_invariant(&trial);
            assert!(trial.accuracy() <= 100);
            assert_eq!(trial.is_complete(), trial.active_index() == trial.target_words().len());
        }
        assert!(trial.is_complete());
    }
}
