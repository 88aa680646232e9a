//! Staff knowledge tests: authoring, assignment, attempts and review.

pub mod grading;
pub mod model;

use mdc_store::keys;
use mdc_sync::SyncEvent;
use model::{
    AssignmentStatus, NewTest, QuestionType, Test, TestAnswer, TestAssignment, TestStatistics,
};
use tracing::info;
use uuid::Uuid;

use crate::console::Console;
use crate::error::{MdcError, MdcResult};
use crate::timestamp;

pub async fn list_tests(console: &Console) -> MdcResult<Vec<Test>> {
    console.load(keys::TESTS).await
}

async fn save_tests(console: &Console, tests: &[Test]) -> MdcResult<()> {
    console.commit(keys::TESTS, tests, SyncEvent::TestsUpdated).await
}

pub async fn list_assignments(console: &Console) -> MdcResult<Vec<TestAssignment>> {
    console.load(keys::TEST_ASSIGNMENTS).await
}

async fn save_assignments(console: &Console, assignments: &[TestAssignment]) -> MdcResult<()> {
    console
        .commit(keys::TEST_ASSIGNMENTS, assignments, SyncEvent::TestAssignmentsUpdated)
        .await
}

pub async fn get_test(console: &Console, id: &str) -> MdcResult<Test> {
    list_tests(console)
        .await?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| MdcError::TestNotFound(id.to_string()))
}

fn validate(new: &NewTest) -> MdcResult<()> {
    if new.title.trim().is_empty() {
        return Err(MdcError::validation("test title is required"));
    }
    if new.questions.is_empty() {
        return Err(MdcError::validation("a test needs at least one question"));
    }
    for q in &new.questions {
        if q.question_type == QuestionType::Text {
            continue;
        }
        if q.options.len() < 2 {
            return Err(MdcError::validation(format!("question '{}' needs two or more options", q.text)));
        }
        if q.correct_answers.is_empty() || q.correct_answers.iter().any(|&i| i >= q.options.len()) {
            return Err(MdcError::validation(format!("question '{}' has no valid correct answer", q.text)));
        }
        if q.question_type == QuestionType::Single && q.correct_answers.len() != 1 {
            return Err(MdcError::validation(format!("question '{}' allows one correct answer", q.text)));
        }
    }
    Ok(())
}

pub async fn create_test(console: &Console, new: NewTest, created_by: &str) -> MdcResult<Test> {
    validate(&new)?;
    let mut tests = list_tests(console).await?;
    let test = Test {
        id: Uuid::new_v4().to_string(),
        title: new.title,
        description: new.description,
        questions: new.questions,
        passing_score: new.passing_score,
        passing_score_type: new.passing_score_type,
        show_answers: new.show_answers,
        requires_manual_check: new.requires_manual_check,
        created_by: created_by.to_string(),
        created_at: timestamp(),
    };
    tests.push(test.clone());
    save_tests(console, &tests).await?;

    info!(test_id = %test.id, questions = test.questions.len(), "Test created");
    Ok(test)
}

/// Delete a test together with its assignments.
pub async fn delete_test(console: &Console, id: &str) -> MdcResult<()> {
    let mut tests = list_tests(console).await?;
    tests.retain(|t| t.id != id);
    save_tests(console, &tests).await?;

    let mut assignments = list_assignments(console).await?;
    let before = assignments.len();
    assignments.retain(|a| a.test_id != id);
    if assignments.len() != before {
        save_assignments(console, &assignments).await?;
    }
    Ok(())
}

/// Copy a test under a new id and a "(copy)" title.
pub async fn duplicate_test(console: &Console, id: &str, created_by: &str) -> MdcResult<Test> {
    let original = get_test(console, id).await?;
    let mut tests = list_tests(console).await?;
    let copy = Test {
        id: Uuid::new_v4().to_string(),
        title: format!("{} (copy)", original.title),
        created_by: created_by.to_string(),
        created_at: timestamp(),
        ..original
    };
    tests.push(copy.clone());
    save_tests(console, &tests).await?;
    Ok(copy)
}

pub async fn assign_test(
    console: &Console,
    test_id: &str,
    user_id: &str,
    assigned_by: &str,
    due_date: Option<String>,
) -> MdcResult<TestAssignment> {
    get_test(console, test_id).await?;
    let mut assignments = list_assignments(console).await?;
    let assignment = TestAssignment {
        id: Uuid::new_v4().to_string(),
        test_id: test_id.to_string(),
        user_id: user_id.to_string(),
        assigned_by: assigned_by.to_string(),
        assigned_at: timestamp(),
        due_date,
        status: AssignmentStatus::Pending,
        started_at: None,
        completed_at: None,
        answers: Vec::new(),
        score: None,
        question_order: Vec::new(),
    };
    assignments.push(assignment.clone());
    save_assignments(console, &assignments).await?;

    info!(test_id = %test_id, user_id = %user_id, "Test assigned");
    Ok(assignment)
}

pub async fn user_assignments(console: &Console, user_id: &str) -> MdcResult<Vec<TestAssignment>> {
    let all = list_assignments(console).await?;
    Ok(all.into_iter().filter(|a| a.user_id == user_id).collect())
}

pub async fn get_assignment(console: &Console, id: &str) -> MdcResult<TestAssignment> {
    list_assignments(console)
        .await?
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| MdcError::AssignmentNotFound(id.to_string()))
}

/// Load every assignment, apply `f` to one, save.
async fn modify_assignment<F>(console: &Console, id: &str, f: F) -> MdcResult<TestAssignment>
where
    F: FnOnce(&mut TestAssignment) -> MdcResult<()>,
{
    let mut assignments = list_assignments(console).await?;
    let assignment = assignments
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| MdcError::AssignmentNotFound(id.to_string()))?;
    f(assignment)?;
    let updated = assignment.clone();
    save_assignments(console, &assignments).await?;
    Ok(updated)
}

/// Open an attempt. Resuming an attempt in progress is a no-op.
pub async fn start_test_attempt(console: &Console, assignment_id: &str) -> MdcResult<TestAssignment> {
    let assignment = get_assignment(console, assignment_id).await?;
    let test = get_test(console, &assignment.test_id).await?;

    modify_assignment(console, assignment_id, |a| match a.status {
        AssignmentStatus::InProgress => Ok(()),
        AssignmentStatus::Pending => {
            a.status = AssignmentStatus::InProgress;
            a.started_at = Some(timestamp());
            a.question_order = test.questions.iter().map(|q| q.id.clone()).collect();
            Ok(())
        }
        finished => Err(MdcError::transition(finished.as_str(), AssignmentStatus::InProgress.as_str())),
    })
    .await
}

/// Hand in answers. Fully auto-gradable attempts are passed or failed
/// right away; the rest wait for review with the partial score.
pub async fn submit_test_answers(
    console: &Console,
    assignment_id: &str,
    answers: Vec<TestAnswer>,
) -> MdcResult<TestAssignment> {
    let assignment = get_assignment(console, assignment_id).await?;
    let test = get_test(console, &assignment.test_id).await?;
    let grade = grading::grade(&test, &answers);

    let updated = modify_assignment(console, assignment_id, |a| {
        if a.status.is_finished() {
            return Err(MdcError::transition(a.status.as_str(), "submitted"));
        }
        a.answers = answers;
        a.score = Some(grade.score);
        a.completed_at = Some(timestamp());
        a.status = if grade.needs_review {
            AssignmentStatus::Completed
        } else if grading::is_passing(&test, grade.score) {
            AssignmentStatus::Passed
        } else {
            AssignmentStatus::Failed
        };
        Ok(())
    })
    .await?;

    info!(
        assignment_id = %assignment_id,
        score = grade.score,
        max_score = grade.max_score,
        status = updated.status.as_str(),
        "Test submitted"
    );
    Ok(updated)
}

/// Settle an attempt waiting for review with a final score.
pub async fn review_assignment(console: &Console, assignment_id: &str, score: u32) -> MdcResult<TestAssignment> {
    let assignment = get_assignment(console, assignment_id).await?;
    let test = get_test(console, &assignment.test_id).await?;
    if score > test.max_score() {
        return Err(MdcError::validation(format!(
            "score {} exceeds the maximum of {}",
            score,
            test.max_score()
        )));
    }

    modify_assignment(console, assignment_id, |a| {
        if a.status != AssignmentStatus::Completed {
            return Err(MdcError::transition(a.status.as_str(), "reviewed"));
        }
        a.score = Some(score);
        a.status = if grading::is_passing(&test, score) {
            AssignmentStatus::Passed
        } else {
            AssignmentStatus::Failed
        };
        Ok(())
    })
    .await
}

/// Put an assignment back to pending, discarding the attempt.
pub async fn reset_assignment(console: &Console, assignment_id: &str) -> MdcResult<TestAssignment> {
    modify_assignment(console, assignment_id, |a| {
        a.status = AssignmentStatus::Pending;
        a.started_at = None;
        a.completed_at = None;
        a.answers.clear();
        a.score = None;
        a.question_order.clear();
        Ok(())
    })
    .await
}

pub async fn delete_assignment(console: &Console, assignment_id: &str) -> MdcResult<()> {
    let mut assignments = list_assignments(console).await?;
    assignments.retain(|a| a.id != assignment_id);
    save_assignments(console, &assignments).await
}

pub async fn test_statistics(console: &Console, test_id: &str) -> MdcResult<TestStatistics> {
    let all = list_assignments(console).await?;
    let mine: Vec<&TestAssignment> = all.iter().filter(|a| a.test_id == test_id).collect();

    let settled: Vec<u32> = mine
        .iter()
        .filter(|a| matches!(a.status, AssignmentStatus::Passed | AssignmentStatus::Failed))
        .filter_map(|a| a.score)
        .collect();
    let average_score = if settled.is_empty() {
        0.0
    } else {
        settled.iter().map(|&s| f64::from(s)).sum::<f64>() / settled.len() as f64
    };
    let count = |status: AssignmentStatus| mine.iter().filter(|a| a.status == status).count();

    Ok(TestStatistics {
        assigned: mine.len(),
        in_progress: count(AssignmentStatus::InProgress),
        awaiting_review: count(AssignmentStatus::Completed),
        passed: count(AssignmentStatus::Passed),
        failed: count(AssignmentStatus::Failed),
        average_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing;
    use model::{PassingScoreType, Question};

    fn radio_codes(with_text: bool) -> NewTest {
        let mut questions = vec![
            Question {
                id: "q1".into(),
                text: "What does 10-4 mean?".into(),
                question_type: QuestionType::Single,
                options: vec!["Acknowledged".into(), "Repeat".into()],
                correct_answers: vec![0],
                points: 2,
                time_limit: Some(30),
            },
            Question {
                id: "q2".into(),
                text: "Which are priority codes?".into(),
                question_type: QuestionType::Multiple,
                options: vec!["Code 3".into(), "Code 0".into(), "Lunch".into()],
                correct_answers: vec![0, 1],
                points: 2,
                time_limit: None,
            },
        ];
        if with_text {
            questions.push(Question {
                id: "q3".into(),
                text: "Describe Signal 100".into(),
                question_type: QuestionType::Text,
                options: vec![],
                correct_answers: vec![],
                points: 4,
                time_limit: None,
            });
        }
        NewTest {
            title: "Radio codes".into(),
            description: String::new(),
            questions,
            passing_score: 50,
            passing_score_type: PassingScoreType::Percentage,
            show_answers: true,
            requires_manual_check: false,
        }
    }

    fn pick(question_id: &str, options: &[usize]) -> TestAnswer {
        TestAnswer {
            question_id: question_id.into(),
            selected_options: Some(options.to_vec()),
            text_answer: None,
            time_spent: 5,
        }
    }

    #[tokio::test]
    async fn test_auto_graded_attempt_passes() {
        let console = testing::console();
        let test = create_test(&console, radio_codes(false), "10001").await.unwrap();
        let a = assign_test(&console, &test.id, "10004", "10001", None).await.unwrap();
        assert_eq!(a.status, AssignmentStatus::Pending);

        let started = start_test_attempt(&console, &a.id).await.unwrap();
        assert_eq!(started.status, AssignmentStatus::InProgress);
        assert_eq!(started.question_order, vec!["q1", "q2"]);

        let done = submit_test_answers(&console, &a.id, vec![pick("q1", &[0]), pick("q2", &[1])])
            .await
            .unwrap();
        assert_eq!(done.score, Some(2));
        assert_eq!(done.status, AssignmentStatus::Passed);

        assert!(matches!(
            submit_test_answers(&console, &a.id, vec![]).await,
            Err(MdcError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_text_answers_wait_for_review() {
        let console = testing::console();
        let test = create_test(&console, radio_codes(true), "10001").await.unwrap();
        let a = assign_test(&console, &test.id, "10004", "10001", None).await.unwrap();
        start_test_attempt(&console, &a.id).await.unwrap();

        let text = TestAnswer {
            question_id: "q3".into(),
            selected_options: None,
            text_answer: Some("Radio silence".into()),
            time_spent: 40,
        };
        let done = submit_test_answers(&console, &a.id, vec![pick("q1", &[0]), text])
            .await
            .unwrap();
        assert_eq!(done.status, AssignmentStatus::Completed);
        assert_eq!(done.score, Some(2));
        assert_eq!(test_statistics(&console, &test.id).await.unwrap().awaiting_review, 1);

        assert!(review_assignment(&console, &a.id, 99).await.is_err());
        let reviewed = review_assignment(&console, &a.id, 6).await.unwrap();
        assert_eq!(reviewed.status, AssignmentStatus::Passed);

        let stats = test_statistics(&console, &test.id).await.unwrap();
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.average_score, 6.0);
    }

    #[tokio::test]
    async fn test_reset_and_delete() {
        let console = testing::console();
        let test = create_test(&console, radio_codes(false), "10001").await.unwrap();
        let a = assign_test(&console, &test.id, "10004", "10001", Some("2026-12-01".into()))
            .await
            .unwrap();
        start_test_attempt(&console, &a.id).await.unwrap();
        submit_test_answers(&console, &a.id, vec![]).await.unwrap();

        let reset = reset_assignment(&console, &a.id).await.unwrap();
        assert_eq!(reset.status, AssignmentStatus::Pending);
        assert!(reset.answers.is_empty() && reset.score.is_none());

        delete_test(&console, &test.id).await.unwrap();
        assert!(user_assignments(&console, "10004").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_tests_are_rejected() {
        let console = testing::console();
        let mut bad = radio_codes(false);
        bad.questions[0].correct_answers = vec![0, 1];
        assert!(matches!(
            create_test(&console, bad, "10001").await,
            Err(MdcError::ValidationError(_))
        ));

        let mut bad = radio_codes(false);
        bad.questions[1].correct_answers = vec![7];
        assert!(create_test(&console, bad, "10001").await.is_err());
        assert!(list_tests(&console).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_gets_new_id() {
        let console = testing::console();
        let test = create_test(&console, radio_codes(false), "10001").await.unwrap();
        let copy = duplicate_test(&console, &test.id, "10003").await.unwrap();
        assert_ne!(copy.id, test.id);
        assert_eq!(copy.title, "Radio codes (copy)");
        assert_eq!(copy.questions, test.questions);
        assert_eq!(list_tests(&console).await.unwrap().len(), 2);
    }
}
