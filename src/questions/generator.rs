//! Question generation from chapter text.

use super::{DifficultyDistribution, Question};
use crate::chapter::Chapter;
use crate::completion::{CompletionClient, CompletionRequest};
use crate::config::Prompts;
use crate::error::{QuizcastError, Result};
use crate::retry::RetryPolicy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, instrument, warn};

/// Generation parameters that do not change between chapters.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub num_questions: usize,
    pub distribution: DifficultyDistribution,
    pub max_tokens: u32,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_questions: 7,
            distribution: DifficultyDistribution::default(),
            max_tokens: 2000,
            temperature: 0.7,
            retry: RetryPolicy::default(),
        }
    }
}

/// Expected top-level shape of the model's reply.
#[derive(Deserialize)]
struct QuestionsEnvelope {
    questions: Vec<serde_json::Value>,
}

/// Builds prompts, calls the completion service and parses its reply.
pub struct QuestionGenerator {
    client: Arc<dyn CompletionClient>,
    prompts: Prompts,
    config: GeneratorConfig,
}

impl QuestionGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, prompts: Prompts, config: GeneratorConfig) -> Self {
        Self {
            client,
            prompts,
            config,
        }
    }

    /// Build the completion request for a chapter.
    pub fn build_request(&self, chapter_text: &str, chapter_name: &str) -> CompletionRequest {
        let mut vars = HashMap::new();
        vars.insert("chapter_name".to_string(), chapter_name.to_string());
        vars.insert("num_questions".to_string(), self.config.num_questions.to_string());
        vars.insert(
            "distribution".to_string(),
            self.config.distribution.to_prompt_list(),
        );

        let system = self
            .prompts
            .render_with_custom(&self.prompts.questions.system, &vars);
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.questions.user, &vars);

        CompletionRequest {
            system,
            // Substituted last so chapter text is never scanned for placeholders
            prompt: prompt.replace("{{chapter_text}}", chapter_text),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Generate questions for a chapter's text.
    ///
    /// Transport and API failures are retried per the configured policy; a
    /// reply that is not valid JSON fails immediately.
    #[instrument(skip(self, chapter_text), fields(chapter = %chapter_name))]
    pub async fn generate(&self, chapter_text: &str, chapter_name: &str) -> Result<Vec<Question>> {
        let request = self.build_request(chapter_text, chapter_name);
        debug!("Requesting questions from {}", self.client.model());

        let reply = self
            .config
            .retry
            .run("Completion request", || self.client.complete(&request))
            .await?;

        let questions = parse_questions(&reply)?;

        // The requested count and distribution are advisory only
        if questions.len() != self.config.num_questions {
            warn!(
                "Requested {} questions, model returned {}",
                self.config.num_questions,
                questions.len()
            );
        }

        Ok(questions)
    }

    /// Extract a chapter and generate its questions, labelled with the chapter name.
    ///
    /// Never fails: any error is logged and yields an empty list so that other
    /// chapters can still be processed.
    pub async fn process_chapter(&self, pdf_path: &Path) -> Vec<Question> {
        match self.try_process_chapter(pdf_path).await {
            Ok(questions) => questions,
            Err(e) => {
                error!("Error processing {}: {}", pdf_path.display(), e);
                Vec::new()
            }
        }
    }

    async fn try_process_chapter(&self, pdf_path: &Path) -> Result<Vec<Question>> {
        let chapter = Chapter::from_pdf(pdf_path).await?;
        self.generate_for_chapter(&chapter).await
    }

    /// Generate questions for an extracted chapter, each labelled with its name.
    pub async fn generate_for_chapter(&self, chapter: &Chapter) -> Result<Vec<Question>> {
        info!("Processing {} ({} words)", chapter.name, chapter.word_count());

        let mut questions = self.generate(&chapter.text, &chapter.name).await?;
        for q in &mut questions {
            q.chapter = Some(chapter.name.clone());
        }

        info!("Generated {} questions for {}", questions.len(), chapter.name);
        Ok(questions)
    }
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex")
    })
}

/// Parse the model's reply into validated questions.
///
/// The reply must be a JSON object with a `questions` array, optionally
/// wrapped in a Markdown code fence.
pub fn parse_questions(reply: &str) -> Result<Vec<Question>> {
    let body = code_fence()
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply);

    let envelope: QuestionsEnvelope = serde_json::from_str(body)
        .map_err(|e| QuizcastError::InvalidResponse(format!("response is not valid JSON: {}", e)))?;

    envelope
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value::<Question>(value).map_err(|e| {
                QuizcastError::InvalidQuestion(format!("question {}: {}", i + 1, e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Difficulty;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const REPLY: &str = r#"{"questions": [
        {"difficulty": "Easy", "question": "Q1?", "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
         "correct_answer": "A", "explanation": "Because."},
        {"difficulty": "Easy", "question": "Q2?", "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
         "correct_answer": "D", "explanation": "Because."}
    ]}"#;

    /// Fails with a transient error for the first `failures` calls, then replies.
    struct ScriptedClient {
        failures: u32,
        reply: String,
        calls: AtomicU32,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedClient {
        fn new(failures: u32, reply: &str) -> Arc<Self> {
            Arc::new(Self {
                failures,
                reply: reply.to_string(),
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(QuizcastError::Api {
                    status: 529,
                    message: "overloaded".into(),
                })
            } else {
                Ok(self.reply.clone())
            }
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn generator(client: Arc<ScriptedClient>) -> QuestionGenerator {
        QuestionGenerator::new(client, Prompts::default(), GeneratorConfig::default())
    }

    #[test]
    fn test_build_request_embeds_everything() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("subject".into(), "CSCS".into());
        let gen = QuestionGenerator::new(
            ScriptedClient::new(0, REPLY),
            prompts,
            GeneratorConfig::default(),
        );

        let request = gen.build_request("Muscle fibers contract. {{subject}}", "chapter 1");
        assert!(request.prompt.contains("from chapter 1, create 7 multiple-choice"));
        assert!(request.prompt.contains("- 2 Easy\n- 2 Medium\n- 2 Hard\n- 1 Intense"));
        // Placeholders inside the chapter text are left alone
        assert!(request.prompt.ends_with("Muscle fibers contract. {{subject}}"));
        assert!(request.system.starts_with("You are a CSCS expert"));
        assert_eq!(request.max_tokens, 2000);
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn test_parse_plain_and_fenced() {
        assert_eq!(parse_questions(REPLY).unwrap().len(), 2);

        let fenced = format!("```json\n{}\n```", REPLY);
        let questions = parse_questions(&fenced).unwrap();
        assert_eq!(questions[1].question, "Q2?");
    }

    #[test]
    fn test_parse_rejects_missing_questions_key() {
        let err = parse_questions(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, QuizcastError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_record() {
        let reply = r#"{"questions": [{"difficulty": "Easy", "question": "Q?",
            "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
            "correct_answer": "F", "explanation": "x"}]}"#;
        let err = parse_questions(reply).unwrap_err();
        assert!(matches!(err, QuizcastError::InvalidQuestion(ref m) if m.starts_with("question 1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_json_is_not_retried() {
        let client = ScriptedClient::new(0, "Sure! Here are your questions: {oops");
        let err = generator(client.clone()).generate("text", "ch").await.unwrap_err();

        assert!(matches!(err, QuizcastError::InvalidResponse(ref m) if m.contains("not valid JSON")));
        assert!(!err.is_transient());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success_waits_one_then_two_seconds() {
        let client = ScriptedClient::new(2, REPLY);
        let start = tokio::time::Instant::now();

        let questions = generator(client.clone()).generate("text", "ch").await.unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(client.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_give_up_without_fourth_attempt() {
        let client = ScriptedClient::new(3, REPLY);

        let err = generator(client.clone()).generate("text", "ch").await.unwrap_err();

        assert!(matches!(err, QuizcastError::Api { status: 529, .. }));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_skewed_distribution_is_accepted() {
        // Both questions are Easy; no distribution check applies
        let client = ScriptedClient::new(0, REPLY);
        let questions = generator(client).generate("text", "ch").await.unwrap();
        assert!(questions.iter().all(|q| q.difficulty == Difficulty::Easy));
    }

    #[tokio::test]
    async fn test_generate_for_chapter_labels_questions() {
        let client = ScriptedClient::new(0, REPLY);
        let chapter = Chapter {
            name: "chapter 1".into(),
            text: "Muscle fibers contract.".into(),
        };

        let questions = generator(client.clone())
            .generate_for_chapter(&chapter)
            .await
            .unwrap();

        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.chapter.as_deref() == Some("chapter 1")));

        let request = client.last_request.lock().unwrap().clone().unwrap();
        assert!(request.prompt.contains("from chapter 1"));
        assert!(request.prompt.ends_with("Muscle fibers contract."));
    }

    #[tokio::test]
    async fn test_process_chapter_swallows_errors() {
        let client = ScriptedClient::new(0, REPLY);
        let questions = generator(client.clone())
            .process_chapter(Path::new("/no/such/chapter_9.pdf"))
            .await;

        assert!(questions.is_empty());
        assert_eq!(client.calls(), 0);
        assert!(client.last_request.lock().unwrap().is_none());
    }
}
