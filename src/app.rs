use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::celebration::Confetti;
use crate::high_score::{FileSlot, HighScoreStore, ScoreOutcome, ScoreSlot};
use crate::trial::{Clock, Submission, SystemClock, Trial};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// One trial plus the personal best, driven by key events
#[derive(Debug)]
pub struct App<C: Clock = SystemClock, S: ScoreSlot = FileSlot> {
    pub trial: Trial<C>,
    pub store: HighScoreStore<S>,
    pub state: AppState,
    /// Result of the last completed trial, for the completion panel
    pub last_outcome: Option<ScoreOutcome>,
    pub confetti: Confetti,
    viewport: (u16, u16),
}

impl<C: Clock, S: ScoreSlot> App<C, S> {
    pub fn new(trial: Trial<C>, store: HighScoreStore<S>) -> Self {
        Self {
            trial,
            store,
            state: AppState::Typing,
            last_outcome: None,
            confetti: Confetti::new(),
            viewport: (80, 24),
        }
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
    }

    pub fn restart(&mut self) {
        self.trial.reset();
        self.state = AppState::Typing;
        self.last_outcome = None;
        self.confetti.stop();
    }

    pub fn on_tick(&mut self) {
        self.confetti.update();
    }

    pub fn on_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return AppAction::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Tab => self.restart(),
                KeyCode::Backspace => self.trial.erase_character(),
                KeyCode::Enter => {
                    let submission = self.trial.submit_word_boundary();
                    self.after_submission(submission);
                }
                KeyCode::Char(c) => {
                    if let Some(submission) = self.trial.type_key(c) {
                        self.after_submission(submission);
                    }
                }
                _ => {}
            },
            AppState::Complete => match key.code {
                KeyCode::Tab | KeyCode::Enter | KeyCode::Char('r') => self.restart(),
                _ => {}
            },
        }

        AppAction::Continue
    }

    fn after_submission(&mut self, submission: Submission) {
        match submission {
            Submission::Completed { .. } => self.finish(),
            Submission::Scored { correct } => {
                debug!(index = self.trial.active_index(), correct, "word scored");
            }
            Submission::Ignored => {}
        }
    }

    fn finish(&mut self) {
        let (wpm, accuracy) = (self.trial.wpm(), self.trial.accuracy());
        let outcome = self.store.consider_and_save(wpm, accuracy);
        info!(wpm, accuracy, new_best = outcome.is_new_best, "trial finished");

        self.last_outcome = Some(outcome);
        self.state = AppState::Complete;
        let (width, height) = self.viewport;
        self.confetti.start(width, height);
    }
}
