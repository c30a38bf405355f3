//! Prompt templates for Quizcast.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory:
//! `questions.toml` for the generation prompt and `narration.toml` for the spoken
//! intros.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub questions: QuestionPrompts,
    pub narration: NarrationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for question generation.
///
/// Placeholders: `{{subject}}`, `{{chapter_name}}`, `{{num_questions}}`,
/// `{{distribution}}`, `{{chapter_text}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QuestionPrompts {
    fn default() -> Self {
        Self {
            system: "You are a {{subject}} expert creating accurate multiple choice questions. \
                     Always return responses in valid JSON format."
                .to_string(),
            user: r#"Based on this {{subject}} textbook content from {{chapter_name}}, create {{num_questions}} multiple-choice questions.
Distribute the questions across these difficulty levels:
{{distribution}}

Return the questions in this exact JSON format:
{
    "questions": [
        {
            "difficulty": "Easy/Medium/Hard/Intense",
            "question": "The question text",
            "options": {
                "A": "First option",
                "B": "Second option",
                "C": "Third option",
                "D": "Fourth option"
            },
            "correct_answer": "A/B/C/D",
            "explanation": "Why this answer is correct"
        }
    ]
}

Return only the JSON object, with no surrounding text.

Textbook Content:
{{chapter_text}}"#
                .to_string(),
        }
    }
}

/// Spoken intros, one per difficulty level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationPrompts {
    pub easy: String,
    pub medium: String,
    pub hard: String,
    pub intense: String,
    /// Used when a question carries an unrecognized difficulty label.
    pub fallback: String,
}

impl Default for NarrationPrompts {
    fn default() -> Self {
        Self {
            easy: "Here's a basic {{subject}} concept everyone should know.".to_string(),
            medium: "Let's test your {{subject}} knowledge with this one.".to_string(),
            hard: "Here's a challenging {{subject}} question for you.".to_string(),
            intense: "This is an advanced {{subject}} concept. Are you ready?".to_string(),
            fallback: "Here's your {{subject}} trivia question.".to_string(),
        }
    }
}

impl NarrationPrompts {
    /// Return a copy with every intro rendered against the given variables.
    pub fn rendered(&self, vars: &HashMap<String, String>) -> Self {
        Self {
            easy: Prompts::render(&self.easy, vars),
            medium: Prompts::render(&self.medium, vars),
            hard: Prompts::render(&self.hard, vars),
            intense: Prompts::render(&self.intense, vars),
            fallback: Prompts::render(&self.fallback, vars),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let questions_path = custom_path.join("questions.toml");
            if questions_path.exists() {
                let content = std::fs::read_to_string(&questions_path)?;
                prompts.questions = toml::from_str(&content)?;
            }

            let narration_path = custom_path.join("narration.toml");
            if narration_path.exists() {
                let content = std::fs::read_to_string(&narration_path)?;
                prompts.narration = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Narration intros with config variables substituted.
    pub fn narration_intros(&self) -> NarrationPrompts {
        self.narration.rendered(&self.variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.questions.user.contains("{{chapter_text}}"));
        assert!(prompts.questions.system.contains("valid JSON"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_narration_intros_use_subject() {
        let mut vars = HashMap::new();
        vars.insert("subject".to_string(), "Biology".to_string());
        let prompts = Prompts::load(None, Some(&vars)).unwrap();

        let intros = prompts.narration_intros();
        assert_eq!(intros.hard, "Here's a challenging Biology question for you.");
        assert_eq!(intros.fallback, "Here's your Biology trivia question.");
    }

    #[test]
    fn test_custom_dir_overrides_narration() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("narration.toml"),
            "easy = \"Warm up time.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.narration.easy, "Warm up time.");
        // Unspecified keys fall back to defaults
        assert!(prompts.narration.intense.contains("Are you ready?"));
    }
}
