//! Submission pipeline state machine
//!
//! Each submission advances Idle → Submitted → Optimizing → Generating →
//! Resolved | Failed. The transition function is pure: it maps a
//! (state, event) pair to the next state plus the effects the driver must
//! carry out, which keeps the orchestration testable without a network.
//! Terminal states ignore further events; concurrent submissions each own
//! an independent [`Pipeline`].

/// Shown when submitting without a stored API key
pub const MISSING_KEY_MESSAGE: &str = "No API key found. Please enter your OpenAI API key below.";

/// Shown when the page was opened from a local file instead of a served origin
pub const LOCAL_FILE_WARNING: &str = "This application does not work when it is opened directly from a local file (file://). Please serve it over http (for example with \"python -m http.server\") and open it via http://localhost:PORT.";

/// Events fed into the state machine by the driver
#[derive(Debug, Clone)]
pub enum Event {
    /// The user submitted input, with the page origin scheme and the
    /// current credential and settings state
    Submit {
        prompt: String,
        origin: Option<String>,
        has_credential: bool,
        auto_download: bool,
    },
    /// The driver is about to run stage one
    OptimizationStarted,
    /// Stage one finished; it cannot fail
    Optimized { enhanced_prompt: String },
    /// Stage two returned a hosted image URL
    Generated { image_url: String },
    /// Stage two failed with a user-facing message
    GenerationFailed { message: String },
}

/// Side effects the driver performs after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append the submission to the conversation history
    AppendToHistory { prompt: String },
    /// Run stage one on the original prompt
    OptimizePrompt { prompt: String },
    /// Run stage two on the enhanced prompt
    GenerateImage { prompt: String },
    /// Bind the image to the entry and show it enlarged
    ShowImage { url: String },
    /// Start a detached automatic download
    DownloadImage { url: String },
    /// Render an error line in the entry
    ShowError { message: String },
    /// Show a terminal notice without creating an entry
    Notice { message: String },
}

/// Stages of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Submitted { prompt: String, auto_download: bool },
    Optimizing { prompt: String, auto_download: bool },
    Generating { enhanced_prompt: String, auto_download: bool },
    Resolved { image_url: String },
    Failed { message: String },
}

/// Pure transition function from (state, event) to (state, effects)
pub fn transition(state: State, event: Event) -> (State, Vec<Effect>) {
    match (state, event) {
        (
            State::Idle,
            Event::Submit {
                prompt,
                origin,
                has_credential,
                auto_download,
            },
        ) => {
            let trimmed = prompt.trim();
            if trimmed.is_empty() {
                return (State::Idle, vec![]);
            }
            if origin.as_deref().is_some_and(|o| o.starts_with("file:")) {
                return (
                    State::Idle,
                    vec![Effect::Notice {
                        message: LOCAL_FILE_WARNING.to_string(),
                    }],
                );
            }
            if !has_credential {
                return (
                    State::Idle,
                    vec![Effect::Notice {
                        message: MISSING_KEY_MESSAGE.to_string(),
                    }],
                );
            }
            let prompt = trimmed.to_string();
            let effects = vec![Effect::AppendToHistory {
                prompt: prompt.clone(),
            }];
            (
                State::Submitted {
                    prompt,
                    auto_download,
                },
                effects,
            )
        }
        (
            State::Submitted {
                prompt,
                auto_download,
            },
            Event::OptimizationStarted,
        ) => {
            let effects = vec![Effect::OptimizePrompt {
                prompt: prompt.clone(),
            }];
            (
                State::Optimizing {
                    prompt,
                    auto_download,
                },
                effects,
            )
        }
        (State::Optimizing { auto_download, .. }, Event::Optimized { enhanced_prompt }) => {
            let effects = vec![Effect::GenerateImage {
                prompt: enhanced_prompt.clone(),
            }];
            (
                State::Generating {
                    enhanced_prompt,
                    auto_download,
                },
                effects,
            )
        }
        (State::Generating { auto_download, .. }, Event::Generated { image_url }) => {
            let mut effects = vec![Effect::ShowImage {
                url: image_url.clone(),
            }];
            if auto_download {
                effects.push(Effect::DownloadImage {
                    url: image_url.clone(),
                });
            }
            (State::Resolved { image_url }, effects)
        }
        (State::Generating { .. }, Event::GenerationFailed { message }) => {
            let effects = vec![Effect::ShowError {
                message: message.clone(),
            }];
            (State::Failed { message }, effects)
        }
        // Terminal states and stray events change nothing
        (state, _) => (state, vec![]),
    }
}

/// One submission's pipeline, wrapping the pure transition function
#[derive(Debug)]
pub struct Pipeline {
    state: State,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Advances the machine and returns the effects to perform
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let (next, effects) = transition(state, event);
        self.state = next;
        effects
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
