//! Data models for trivia questions.

use crate::error::QuizcastError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Difficulty label attached to a question.
///
/// The four known levels are matched case-insensitively. Any other label is
/// preserved as [`Difficulty::Other`] so that a response with an unexpected
/// label still loads; narration falls back to a generic intro for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Intense,
    Other(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Intense => "Intense",
            Difficulty::Other(label) => label,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            "intense" => Difficulty::Intense,
            _ => Difficulty::Other(trimmed.to_string()),
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        // FromStr is infallible
        Ok(label.parse().unwrap_or(Difficulty::Other(label)))
    }
}

/// Advisory mix of difficulty levels requested per chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyDistribution(pub Vec<(Difficulty, usize)>);

impl Default for DifficultyDistribution {
    fn default() -> Self {
        Self(vec![
            (Difficulty::Easy, 2),
            (Difficulty::Medium, 2),
            (Difficulty::Hard, 2),
            (Difficulty::Intense, 1),
        ])
    }
}

impl DifficultyDistribution {
    /// Total number of questions the distribution asks for.
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    /// Bullet list used inside the generation prompt.
    pub fn to_prompt_list(&self) -> String {
        self.0
            .iter()
            .map(|(level, n)| format!("- {} {}", n, level))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One of the four answer letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four answer options, serialized as a `{"A": …, "B": …, "C": …, "D": …}` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl Options {
    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.a,
            AnswerKey::B => &self.b,
            AnswerKey::C => &self.c,
            AnswerKey::D => &self.d,
        }
    }

    /// Options in letter order.
    pub fn iter(&self) -> impl Iterator<Item = (AnswerKey, &str)> {
        AnswerKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}

/// Loosely-typed record as it arrives from the model or from disk.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    difficulty: Option<Difficulty>,
    question: Option<String>,
    options: Option<BTreeMap<String, String>>,
    correct_answer: Option<String>,
    explanation: Option<String>,
    #[serde(default)]
    chapter: Option<String>,
}

/// A validated multiple-choice question.
///
/// Deserialization rejects records with missing fields, an options map that
/// is not exactly `A`–`D`, blank text, or a `correct_answer` that is not one of
/// the option keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    pub difficulty: Difficulty,
    pub question: String,
    pub options: Options,
    pub correct_answer: AnswerKey,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

impl Question {
    /// The text of the correct option.
    pub fn correct_option(&self) -> &str {
        self.options.get(self.correct_answer)
    }

    /// Options rendered one per line as `A) text`.
    pub fn options_text(&self) -> String {
        self.options
            .iter()
            .map(|(k, text)| format!("{}) {}", k, text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, QuizcastError> {
    value.ok_or_else(|| QuizcastError::InvalidQuestion(format!("missing field '{}'", field)))
}

fn non_blank(value: String, field: &str) -> Result<String, QuizcastError> {
    if value.trim().is_empty() {
        Err(QuizcastError::InvalidQuestion(format!("field '{}' is empty", field)))
    } else {
        Ok(value)
    }
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuizcastError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let difficulty = required(raw.difficulty, "difficulty")?;
        let question = non_blank(required(raw.question, "question")?, "question")?;
        let mut options = required(raw.options, "options")?;
        let correct = required(raw.correct_answer, "correct_answer")?;
        let explanation = required(raw.explanation, "explanation")?;

        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        if keys != ["A", "B", "C", "D"] {
            return Err(QuizcastError::InvalidQuestion(format!(
                "options must have exactly the keys A, B, C, D (got {})",
                keys.join(", ")
            )));
        }

        let correct_answer = match correct.trim() {
            "A" => AnswerKey::A,
            "B" => AnswerKey::B,
            "C" => AnswerKey::C,
            "D" => AnswerKey::D,
            other => {
                return Err(QuizcastError::InvalidQuestion(format!(
                    "correct_answer '{}' is not one of the option keys",
                    other
                )))
            }
        };

        let mut take = |key: &str| -> Result<String, QuizcastError> {
            let text = options.remove(key).unwrap_or_default();
            non_blank(text, &format!("options.{}", key))
        };
        let options = Options {
            a: take("A")?,
            b: take("B")?,
            c: take("C")?,
            d: take("D")?,
        };

        Ok(Question {
            difficulty,
            question,
            options,
            correct_answer,
            explanation,
            chapter: raw.chapter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_json() -> serde_json::Value {
        json!({
            "difficulty": "Hard",
            "question": "Which energy system dominates a 400m sprint?",
            "options": {
                "A": "Phosphagen",
                "B": "Fast glycolysis",
                "C": "Oxidative",
                "D": "Beta oxidation"
            },
            "correct_answer": "B",
            "explanation": "Efforts of 30s to 2 min rely mostly on fast glycolysis."
        })
    }

    #[test]
    fn test_valid_question_parses() {
        let q: Question = serde_json::from_value(valid_json()).unwrap();
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert_eq!(q.correct_answer, AnswerKey::B);
        assert_eq!(q.correct_option(), "Fast glycolysis");
        assert!(q.chapter.is_none());
    }

    #[test]
    fn test_correct_answer_must_be_an_option_key() {
        let mut value = valid_json();
        value["correct_answer"] = json!("E");
        let err = serde_json::from_value::<Question>(value).unwrap_err();
        assert!(err.to_string().contains("not one of the option keys"));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("explanation");
        let err = serde_json::from_value::<Question>(value).unwrap_err();
        assert!(err.to_string().contains("explanation"));
    }

    #[test]
    fn test_options_must_be_exactly_four() {
        let mut value = valid_json();
        value["options"].as_object_mut().unwrap().remove("D");
        assert!(serde_json::from_value::<Question>(value).is_err());

        let mut value = valid_json();
        value["options"]["E"] = json!("Extra");
        assert!(serde_json::from_value::<Question>(value).is_err());
    }

    #[test]
    fn test_blank_option_is_rejected() {
        let mut value = valid_json();
        value["options"]["C"] = json!("  ");
        assert!(serde_json::from_value::<Question>(value).is_err());
    }

    #[test]
    fn test_unknown_difficulty_is_kept() {
        let mut value = valid_json();
        value["difficulty"] = json!("Expert");
        let q: Question = serde_json::from_value(value).unwrap();
        assert_eq!(q.difficulty, Difficulty::Other("Expert".into()));
        assert_eq!(q.difficulty.to_string(), "Expert");
    }

    #[test]
    fn test_difficulty_is_case_insensitive() {
        assert_eq!("intense".parse::<Difficulty>().unwrap(), Difficulty::Intense);
        assert_eq!(" EASY ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    }

    #[test]
    fn test_serialized_shape() {
        let mut q: Question = serde_json::from_value(valid_json()).unwrap();
        q.chapter = Some("chapter 1".into());
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["options"]["A"], "Phosphagen");
        assert_eq!(value["correct_answer"], "B");
        assert_eq!(value["chapter"], "chapter 1");
    }

    #[test]
    fn test_options_text() {
        let q: Question = serde_json::from_value(valid_json()).unwrap();
        assert_eq!(
            q.options_text(),
            "A) Phosphagen\nB) Fast glycolysis\nC) Oxidative\nD) Beta oxidation"
        );
    }

    #[test]
    fn test_default_distribution() {
        let dist = DifficultyDistribution::default();
        assert_eq!(dist.total(), 7);
        assert_eq!(dist.to_prompt_list(), "- 2 Easy\n- 2 Medium\n- 2 Hard\n- 1 Intense");
    }
}
