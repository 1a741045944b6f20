//! App-level navigation state machine.
//!
//! One `Screen` value decides which feature view the UI mounts. Events from
//! user actions and from the generation pipeline move it along; an event
//! that makes no sense on the current screen is rejected with
//! `HookyError::InvalidTransition` and leaves the state untouched.
//!
//! Each submitted recording starts a new pipeline run with a fresh id.
//! Stage results carry that id, and results for any run other than the
//! active one (the user went back, reset, or resubmitted) are discarded.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

use crate::error::{HookyError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    References,
    Transcription,
    Generation,
}

impl Stage {
    /// Stage after this one, `None` after generation.
    pub fn next(self) -> Option<Stage> {
        match self {
            Self::References => Some(Self::Transcription),
            Self::Transcription => Some(Self::Generation),
            Self::Generation => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Welcome,
    Quiz,
    Dashboard,
    Recorder,
    Processing { stage: Stage },
    Result,
    Error { message: String },
    Library,
    Paywall,
    Badges,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Quiz => "quiz",
            Self::Dashboard => "dashboard",
            Self::Recorder => "recorder",
            Self::Processing { .. } => "processing",
            Self::Result => "result",
            Self::Error { .. } => "error",
            Self::Library => "library",
            Self::Paywall => "paywall",
            Self::Badges => "badges",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FlowEvent {
    /// Leave the welcome screen.
    Start,
    QuizCompleted,
    OpenRecorder,
    /// Recording finished; starts a new pipeline run.
    Submit {
        #[serde(default)]
        has_references: bool,
    },
    StageCompleted { run_id: u64, stage: Stage },
    StageFailed { run_id: u64, message: String },
    /// Start over from the recorder after a failure.
    Retry,
    OpenLibrary,
    OpenBadges,
    OpenPaywall,
    PremiumActivated,
    Back,
    /// Back to the welcome screen, abandoning any run.
    Reset,
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::QuizCompleted => "quiz_completed",
            Self::OpenRecorder => "open_recorder",
            Self::Submit { .. } => "submit",
            Self::StageCompleted { .. } => "stage_completed",
            Self::StageFailed { .. } => "stage_failed",
            Self::Retry => "retry",
            Self::OpenLibrary => "open_library",
            Self::OpenBadges => "open_badges",
            Self::OpenPaywall => "open_paywall",
            Self::PremiumActivated => "premium_activated",
            Self::Back => "back",
            Self::Reset => "reset",
        }
    }
}

/// Facts from the progress store that guard some transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowContext {
    pub has_completed_quiz: bool,
    /// Premium, or free scripts remaining.
    pub can_generate: bool,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowOutcome {
    Applied,
    /// A stage result for a run that is no longer active.
    Discarded,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppFlow {
    #[serde(flatten)]
    screen: Screen,
    active_run: Option<u64>,
    #[serde(skip)]
    last_run: u64,
}

impl Default for AppFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AppFlow {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            active_run: None,
            last_run: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn active_run(&self) -> Option<u64> {
        self.active_run
    }

    pub fn apply(&mut self, event: FlowEvent, ctx: FlowContext) -> Result<FlowOutcome> {
        let next = match (&self.screen, &event) {
            (_, FlowEvent::Reset) => {
                self.active_run = None;
                Screen::Welcome
            }

            (_, FlowEvent::StageCompleted { run_id, .. } | FlowEvent::StageFailed { run_id, .. })
                if self.active_run != Some(*run_id) =>
            {
                log::debug!(target: "hooky::flow", "discarding result for stale run {}", run_id);
                return Ok(FlowOutcome::Discarded);
            }

            (Screen::Welcome, FlowEvent::Start) => {
                if ctx.has_completed_quiz {
                    Screen::Dashboard
                } else {
                    Screen::Quiz
                }
            }
            (Screen::Quiz, FlowEvent::QuizCompleted) => Screen::Dashboard,

            (
                Screen::Dashboard | Screen::Library | Screen::Result | Screen::Badges,
                FlowEvent::OpenRecorder,
            ) => {
                if ctx.can_generate {
                    Screen::Recorder
                } else {
                    Screen::Paywall
                }
            }
            (Screen::Recorder, FlowEvent::Submit { has_references }) => {
                self.last_run += 1;
                self.active_run = Some(self.last_run);
                let stage = if *has_references {
                    Stage::References
                } else {
                    Stage::Transcription
                };
                Screen::Processing { stage }
            }
            (Screen::Processing { stage: current }, FlowEvent::StageCompleted { stage, .. })
                if current == stage =>
            {
                match stage.next() {
                    Some(stage) => Screen::Processing { stage },
                    None => {
                        self.active_run = None;
                        Screen::Result
                    }
                }
            }
            (Screen::Processing { .. }, FlowEvent::StageFailed { message, .. }) => {
                self.active_run = None;
                Screen::Error {
                    message: message.clone(),
                }
            }
            (Screen::Error { .. }, FlowEvent::Retry) => {
                if ctx.can_generate {
                    Screen::Recorder
                } else {
                    Screen::Paywall
                }
            }

            (
                Screen::Dashboard | Screen::Result | Screen::Badges,
                FlowEvent::OpenLibrary,
            ) => Screen::Library,
            (
                Screen::Dashboard | Screen::Result | Screen::Library,
                FlowEvent::OpenBadges,
            ) => Screen::Badges,
            (
                Screen::Dashboard | Screen::Result | Screen::Library | Screen::Recorder,
                FlowEvent::OpenPaywall,
            ) => Screen::Paywall,
            (Screen::Paywall, FlowEvent::PremiumActivated) => Screen::Dashboard,

            (Screen::Quiz, FlowEvent::Back) => Screen::Welcome,
            (Screen::Processing { .. }, FlowEvent::Back) => {
                self.active_run = None;
                Screen::Dashboard
            }
            (
                Screen::Recorder
                | Screen::Result
                | Screen::Error { .. }
                | Screen::Library
                | Screen::Paywall
                | Screen::Badges,
                FlowEvent::Back,
            ) => Screen::Dashboard,

            (screen, event) => {
                return Err(HookyError::InvalidTransition {
                    screen: screen.name().to_string(),
                    event: event.name().to_string(),
                });
            }
        };

        log::debug!(
            target: "hooky::flow",
            "{} --{}--> {}",
            self.screen.name(),
            event.name(),
            next.name()
        );
        self.screen = next;
        Ok(FlowOutcome::Applied)
    }
}

// ── Worker-hosted flow ─────────────────────────────────────────────

thread_local! {
    static FLOW: RefCell<AppFlow> = RefCell::new(AppFlow::new());
}

pub fn with_flow_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut AppFlow) -> R,
{
    FLOW.with(|flow| f(&mut flow.borrow_mut()))
}

pub fn reset_flow() {
    FLOW.with(|flow| *flow.borrow_mut() = AppFlow::new());
}
