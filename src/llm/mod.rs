//! Language model boundary
//!
//! The rest of the crate only sees [`LanguageModel::complete`]: a rendered
//! prompt in, free text out. Nothing about the output is trusted; callers run
//! it through [`json_extract`].

pub mod json_extract;
pub mod ollama;
pub mod prompts;

use async_trait::async_trait;

use crate::error::TrackerResult;

pub use json_extract::{extract_first_json_array, extract_first_json_object};
pub use ollama::OllamaClient;

/// A text completion service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> TrackerResult<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::TrackerError;

    /// Replays canned responses and records the prompts it saw
    #[derive(Default)]
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<TrackerResult<String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn replying(responses: &[&str]) -> Self {
            let model = Self::default();
            for response in responses {
                model.push(Ok(response.to_string()));
            }
            model
        }

        pub fn failing(message: &str) -> Self {
            let model = Self::default();
            model.push(Err(TrackerError::Llm(message.to_string())));
            model
        }

        pub fn push(&self, response: TrackerResult<String>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> TrackerResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TrackerError::Llm("no scripted response left".into())))
        }
    }
}
