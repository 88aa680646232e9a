//! Automatic grading.
//!
//! Choice questions score all-or-nothing: the selected set must equal the
//! correct set. Text questions are never auto-scored.

use std::collections::BTreeSet;

use super::model::{PassingScoreType, Question, QuestionType, Test, TestAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub score: u32,
    pub max_score: u32,
    /// At least one answer must be read by a person.
    pub needs_review: bool,
}

fn is_correct(question: &Question, answer: &TestAnswer) -> bool {
    let Some(selected) = &answer.selected_options else {
        return false;
    };
    let selected: BTreeSet<usize> = selected.iter().copied().collect();
    let correct: BTreeSet<usize> = question.correct_answers.iter().copied().collect();
    !correct.is_empty() && selected == correct
}

pub fn grade(test: &Test, answers: &[TestAnswer]) -> Grade {
    let mut score = 0;
    let mut needs_review = test.requires_manual_check;

    for question in &test.questions {
        let answer = answers.iter().find(|a| a.question_id == question.id);
        match question.question_type {
            QuestionType::Text => {
                if answer.and_then(|a| a.text_answer.as_deref()).is_some_and(|t| !t.trim().is_empty()) {
                    needs_review = true;
                }
            }
            QuestionType::Single | QuestionType::Multiple => {
                if answer.is_some_and(|a| is_correct(question, a)) {
                    score += question.points;
                }
            }
        }
    }

    Grade {
        score,
        max_score: test.max_score(),
        needs_review,
    }
}

pub fn is_passing(test: &Test, score: u32) -> bool {
    match test.passing_score_type {
        PassingScoreType::Points => score >= test.passing_score,
        PassingScoreType::Percentage => {
            let max = test.max_score();
            if max == 0 {
                return true;
            }
            u64::from(score) * 100 >= u64::from(test.passing_score) * u64::from(max)
        }
    }
}
