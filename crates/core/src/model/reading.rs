use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::model::ids::{QuestionId, ReadingId};

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A comprehension question attached to a reading.
///
/// `answer` starts empty and is filled in by the player; it is only checked
/// when the reading is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    #[serde(default)]
    answer: String,
    points: u32,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, points: u32) -> Self {
        Self {
            id,
            text: text.into(),
            answer: String::new(),
            points,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// True when the answer has content after trimming whitespace.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points;
    }

    pub(crate) fn clear_answer(&mut self) {
        self.answer.clear();
    }
}

//
// ─── READING ───────────────────────────────────────────────────────────────────
//

/// A reading passage with its questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    id: ReadingId,
    title: String,
    content: String,
    questions: Vec<Question>,
    #[serde(default)]
    completed: bool,
    difficulty: Difficulty,
}

impl Reading {
    #[must_use]
    pub fn new(
        id: ReadingId,
        title: impl Into<String>,
        content: impl Into<String>,
        questions: Vec<Question>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            questions,
            completed: false,
            difficulty,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ReadingId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn question_mut(&mut self, id: QuestionId) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == id)
    }

    /// Questions whose trimmed answer is still empty, in reading order.
    #[must_use]
    pub fn unanswered(&self) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|q| !q.is_answered())
            .map(Question::id)
            .collect()
    }

    /// Sum of question points before the difficulty multiplier.
    #[must_use]
    pub fn base_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0_u32, |sum, q| sum.saturating_add(q.points))
    }

    /// Points awarded for completing this reading.
    #[must_use]
    pub fn award_points(&self) -> u32 {
        self.difficulty.apply_multiplier(self.base_points())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    pub(crate) fn questions_mut(&mut self) -> &mut Vec<Question> {
        &mut self.questions
    }

    pub(crate) fn clear_answers(&mut self) {
        for question in &mut self.questions {
            question.clear_answer();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
