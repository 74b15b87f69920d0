use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// A file the user picked for intake. Replaced wholesale on re-selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Please select a PDF file")]
    NotPdf,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, DocumentError> {
        let file_name = file_name.into();
        if !is_pdf_name(&file_name) {
            return Err(DocumentError::NotPdf);
        }
        Ok(Self { file_name, bytes })
    }

    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        if !is_pdf_name(&file_name) {
            return Err(DocumentError::NotPdf);
        }
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { file_name, bytes })
    }
}

fn is_pdf_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf") && file_name.len() > 4
}

/// Result of a successful parse-document call: the extracted text and the
/// topics in service order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intake {
    pub extracted_text: String,
    pub topics: Vec<String>,
}

/// Question identifier as sent by the service. Numeric ids are kept in their
/// decimal form so both `1` and `"1"` name the same question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for QuestionId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => QuestionId(n.to_string()),
            RawId::Text(s) => QuestionId(s),
        })
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

/// Letter-keyed answer options in display order.
///
/// A JSON object on the wire; the key order of the object is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet(Vec<(String, String)>);

impl OptionSet {
    pub fn new(options: Vec<(String, String)>) -> Self {
        let mut set = OptionSet::default();
        for (letter, text) in options {
            set.insert(letter, text);
        }
        set
    }

    /// Inserts or replaces an option. A repeated key keeps its first position.
    pub fn insert(&mut self, letter: String, text: String) {
        match self.0.iter_mut().find(|(existing, _)| *existing == letter) {
            Some(entry) => entry.1 = text,
            None => self.0.push((letter, text)),
        }
    }

    pub fn get(&self, letter: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == letter)
            .map(|(_, text)| text.as_str())
    }

    pub fn contains(&self, letter: &str) -> bool {
        self.get(letter).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (letter, text) in &self.0 {
            map.serialize_entry(letter, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionSetVisitor;

        impl<'de> Visitor<'de> for OptionSetVisitor {
            type Value = OptionSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping option letters to option text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = OptionSet::default();
                while let Some((letter, text)) = access.next_entry::<String, String>()? {
                    if set.contains(&letter) {
                        return Err(de::Error::custom(format!(
                            "duplicate option letter {}",
                            letter
                        )));
                    }
                    set.0.push((letter, text));
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(OptionSetVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: OptionSet,
    #[serde(rename = "answer")]
    pub correct_letter: String,
}

impl Question {
    pub fn is_correct(&self, letter: &str) -> bool {
        letter == self.correct_letter
    }

    /// Text of the correct option, if the service kept its contract.
    pub fn correct_text(&self) -> Option<&str> {
        self.options.get(&self.correct_letter)
    }
}

/// Questions generated for one topic, in service order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub topic: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

pub type AnswerMap = HashMap<QuestionId, String>;

/// Per-question explanation lifecycle. A question with no entry is "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationState {
    Pending,
    Ready(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn compute(quiz: &Quiz, answers: &AnswerMap) -> Self {
        let correct = quiz
            .questions
            .iter()
            .filter(|q| answers.get(&q.id).is_some_and(|letter| q.is_correct(letter)))
            .count();
        Score {
            correct,
            total: quiz.len(),
        }
    }

    /// Rounded percentage; an empty quiz scores 0%.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.correct as f64 / self.total as f64).round() as u32
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u32, answer: &str) -> Question {
        Question {
            id: QuestionId::from(id),
            prompt: format!("Q{}", id),
            options: OptionSet::new(vec![
                ("A".to_string(), "one".to_string()),
                ("B".to_string(), "two".to_string()),
            ]),
            correct_letter: answer.to_string(),
        }
    }

    #[test]
    fn test_question_deserializes_numeric_id_and_keeps_option_order() {
        let json = r#"{"id": 3, "question": "Pick", "options": {"C": "c", "A": "a", "B": "b"}, "answer": "A"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, QuestionId::from(3));
        assert_eq!(q.options.letters().collect::<Vec<_>>(), vec!["C", "A", "B"]);
        assert_eq!(q.correct_text(), Some("a"));
    }

    #[test]
    fn test_question_id_string_and_number_are_equal() {
        let a: QuestionId = serde_json::from_str("7").unwrap();
        let b: QuestionId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "7");
        let c: QuestionId = serde_json::from_str("\"q-1\"").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"q-1\"");
    }

    #[test]
    fn test_duplicate_option_letter_is_rejected() {
        let json = r#"{"A": "x", "A": "y"}"#;
        let result: Result<OptionSet, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_option_set_serializes_in_order() {
        let set = OptionSet::new(vec![
            ("B".to_string(), "b".to_string()),
            ("A".to_string(), "a".to_string()),
        ]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"B":"b","A":"a"}"#);
    }

    #[test]
    fn test_score_percentage_rounds() {
        let score = Score {
            correct: 2,
            total: 3,
        };
        assert_eq!(score.percentage(), 67);
        assert_eq!(score.to_string(), "2 / 3");
    }

    #[test]
    fn test_score_empty_quiz_is_zero_percent() {
        let quiz = Quiz {
            topic: "T".to_string(),
            questions: vec![],
        };
        let score = Score::compute(&quiz, &AnswerMap::new());
        assert_eq!(score.total, 0);
        assert_eq!(score.percentage(), 0);
    }

    #[test]
    fn test_score_ignores_option_order() {
        let mut reordered = question(1, "B");
        reordered.options = OptionSet::new(vec![
            ("B".to_string(), "two".to_string()),
            ("A".to_string(), "one".to_string()),
        ]);
        let quiz_a = Quiz {
            topic: "T".to_string(),
            questions: vec![question(1, "B")],
        };
        let quiz_b = Quiz {
            topic: "T".to_string(),
            questions: vec![reordered],
        };
        let answers: AnswerMap = [(QuestionId::from(1), "B".to_string())].into();
        assert_eq!(Score::compute(&quiz_a, &answers), Score::compute(&quiz_b, &answers));
        assert_eq!(Score::compute(&quiz_a, &answers), Score::compute(&quiz_a, &answers));
    }

    #[test]
    fn test_correct_letter_missing_from_options_scores_incorrect() {
        let quiz = Quiz {
            topic: "T".to_string(),
            questions: vec![question(1, "Z")],
        };
        let answers: AnswerMap = [(QuestionId::from(1), "A".to_string())].into();
        assert_eq!(Score::compute(&quiz, &answers).correct, 0);
        assert_eq!(quiz.questions[0].correct_text(), None);
    }

    #[test]
    fn test_document_requires_pdf_name() {
        assert!(Document::new("notes.PDF", vec![1]).is_ok());
        assert!(matches!(
            Document::new("notes.txt", vec![1]),
            Err(DocumentError::NotPdf)
        ));
        assert!(matches!(Document::new(".pdf", vec![]), Err(DocumentError::NotPdf)));
    }

    #[test]
    fn test_document_from_path_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.file_name, "syllabus.pdf");
        assert_eq!(doc.bytes, b"%PDF-1.4");
    }

    #[test]
    fn test_document_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");
        assert!(matches!(
            Document::from_path(&path),
            Err(DocumentError::Read { .. })
        ));
    }
}
