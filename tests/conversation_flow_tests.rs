mod common;

use common::*;
use std::sync::Arc;
use survey_bot::sinks::AnswerSink;
use survey_bot::survey::{
    after_submit, AnswerRecord, AnswerValue, Effect, Event, Question, QuestionKind, Session,
    SurveyError, SurveyState,
};

/// Answer the first three sample questions, ending on the multiple choice one
fn at_multiple_question(questions: &survey_bot::survey::QuestionSet) -> SurveyState {
    let state = accepted(questions);
    let state = step(questions, state, typed("3")).state;
    let state = step(questions, state, button("Blue")).state;
    step(questions, state, Event::Skip).state
}

fn current_question(state: &SurveyState) -> u32 {
    state.session().expect("No running session").question_id
}

#[test]
fn test_start_and_accept_prompts_first_question() {
    let questions = sample_questions();

    let welcome = step(&questions, SurveyState::Idle, Event::Start);
    assert_eq!(welcome.state, SurveyState::Welcome);
    assert_eq!(welcome.effects, vec![Effect::Welcome]);

    let started = step(&questions, welcome.state, Event::Accept);
    assert_eq!(started.effects, vec![Effect::Accepted, Effect::Prompt(1)]);
    assert!(matches!(started.state, SurveyState::Answering(_)));
    assert_eq!(current_question(&started.state), 1);
}

#[test]
fn test_welcome_waits_for_the_button() {
    let questions = sample_questions();
    let welcome = step(&questions, SurveyState::Idle, Event::Start).state;

    let result = step(&questions, welcome, typed("hello"));
    assert_eq!(result.state, SurveyState::Welcome);
    assert_eq!(
        result.effects,
        vec![Effect::Rejected("Please press the button above to continue.".to_string())]
    );

    let again = step(&questions, result.state, Event::Start);
    assert_eq!(again.state, SurveyState::Welcome);
    assert_eq!(again.effects, vec![Effect::Welcome]);
}

#[test]
fn test_out_of_range_number_is_rejected_and_question_repeats() {
    let questions = sample_questions();
    let state = accepted(&questions);

    let rejected = step(&questions, state, typed("7"));
    assert_eq!(current_question(&rejected.state), 1);
    match rejected.effects.as_slice() {
        [Effect::Rejected(reason)] => assert!(reason.contains('5'), "unexpected reason: {reason}"),
        other => panic!("Expected a single rejection, got {other:?}"),
    }

    let answered = step(&questions, rejected.state, typed("3"));
    assert_eq!(answered.effects, vec![Effect::Answered(1), Effect::Prompt(2)]);
    let session = answered.state.session().expect("No running session");
    assert_eq!(session.question_id, 2);
    assert_eq!(session.answers.get(&1), Some(&AnswerValue::Number(3)));
}

#[test]
fn test_inline_choice_only_takes_listed_buttons() {
    let questions = sample_questions();
    let state = step(&questions, accepted(&questions), typed("3")).state;

    let typed_answer = step(&questions, state, typed("Red"));
    assert_eq!(
        typed_answer.effects,
        vec![Effect::Rejected("Please use the buttons above.".to_string())]
    );

    let unknown = step(&questions, typed_answer.state, button("Green"));
    assert_eq!(unknown.effects, vec![Effect::Rejected("Invalid option.".to_string())]);
    assert_eq!(current_question(&unknown.state), 2);

    let picked = step(&questions, unknown.state, button("Blue"));
    assert_eq!(picked.effects, vec![Effect::Answered(2), Effect::Prompt(3)]);
}

#[test]
fn test_skip_optional_question_leaves_no_answer() {
    let questions = sample_questions();
    let state = step(&questions, accepted(&questions), typed("3")).state;
    let state = step(&questions, state, button("Red")).state;

    let skipped = step(&questions, state, Event::Skip);
    assert_eq!(skipped.effects, vec![Effect::Skipped(3), Effect::Prompt(4)]);
    let session = skipped.state.session().expect("No running session");
    assert_eq!(session.question_id, 4);
    assert!(!session.answers.contains_key(&3));
}

#[test]
fn test_skip_required_question_is_rejected() {
    let questions = sample_questions();
    let result = step(&questions, accepted(&questions), Event::Skip);

    assert_eq!(
        result.effects,
        vec![Effect::Rejected("This question is required.".to_string())]
    );
    assert_eq!(current_question(&result.state), 1);
}

#[test]
fn test_multiple_choice_refreshes_until_limit() {
    let questions = sample_questions();
    let state = at_multiple_question(&questions);

    let first = step(&questions, state, button("A"));
    assert_eq!(first.effects, vec![Effect::Refresh(4)]);
    let progress = first
        .state
        .session()
        .and_then(|s| s.multiple.clone())
        .expect("No selection progress");
    assert_eq!(progress.selected, vec!["A".to_string()]);
    assert_eq!(
        progress.remaining,
        vec![
            vec!["B".to_string()],
            vec!["C".to_string()],
            vec!["Done".to_string()],
        ]
    );

    let duplicate = step(&questions, first.state, button("A"));
    assert_eq!(
        duplicate.effects,
        vec![Effect::Rejected("A is already selected.".to_string())]
    );

    // A typed "other" option counts toward the limit of two
    let finished = step(&questions, duplicate.state, typed("  Vim  "));
    assert_eq!(finished.effects, vec![Effect::Answered(4), Effect::Prompt(5)]);
    let session = finished.state.session().expect("No running session");
    assert_eq!(session.answers.get(&4), Some(&AnswerValue::Text("A, Vim".to_string())));
    assert!(session.multiple.is_none());
}

#[test]
fn test_multiple_choice_done_excludes_sentinel() {
    let questions = sample_questions();
    let state = step(&questions, at_multiple_question(&questions), button("C")).state;

    let done = step(&questions, state, button("Done"));
    assert_eq!(done.effects, vec![Effect::Answered(4), Effect::Prompt(5)]);
    let answer = done.state.session().and_then(|s| s.answers.get(&4).cloned());
    assert_eq!(answer, Some(AnswerValue::Text("C".to_string())));
}

#[test]
fn test_required_multiple_choice_needs_a_selection() {
    let questions = sample_questions();
    let result = step(&questions, at_multiple_question(&questions), button("Done"));

    assert_eq!(
        result.effects,
        vec![Effect::Rejected("This field is required.".to_string())]
    );
    assert_eq!(current_question(&result.state), 4);
}

#[test]
fn test_optional_multiple_choice_done_without_selection_skips() {
    let questions = questions_from_json(
        r#"[{"id": 1, "type": "multiple", "text": "Extras?", "choices": [["X"]], "required": false}]"#,
    );
    let result = step(&questions, accepted(&questions), button("Done"));

    assert_eq!(result.effects, vec![Effect::Skipped(1), Effect::Submit]);
    let session = result.state.session().expect("No running session");
    assert!(session.answers.is_empty());
}

#[test]
fn test_multiple_choice_finishes_when_options_run_out() {
    let questions = questions_from_json(
        r#"[{"id": 1, "type": "multiple", "text": "Which?", "choices": [["X", "Y"]]}]"#,
    );
    let state = step(&questions, accepted(&questions), button("Y")).state;

    let result = step(&questions, state, button("X"));
    assert_eq!(result.effects, vec![Effect::Answered(1), Effect::Submit]);
    let answer = result.state.session().and_then(|s| s.answers.get(&1).cloned());
    assert_eq!(answer, Some(AnswerValue::Text("Y, X".to_string())));
}

#[test]
fn test_sessions_keep_their_own_choice_rows() {
    let questions = sample_questions();
    let first = at_multiple_question(&questions);
    let second = at_multiple_question(&questions);

    let first = step(&questions, first, button("B")).state;

    let first_session = first.session().expect("No running session");
    let second_session = second.session().expect("No running session");
    assert_ne!(first_session.id, second_session.id);

    let remaining = |session: &Session| {
        session
            .multiple
            .as_ref()
            .map(|p| p.remaining.iter().flatten().cloned().collect::<Vec<_>>())
            .unwrap_or_default()
    };
    assert!(!remaining(first_session).contains(&"B".to_string()));
    assert!(remaining(second_session).contains(&"B".to_string()));

    // The untouched session can still pick B
    let second = step(&questions, second, button("B"));
    assert_eq!(second.effects, vec![Effect::Refresh(4)]);
}

#[test]
fn test_full_run_prompts_each_question_once_and_submits_once() {
    let questions = sample_questions();
    let welcome = step(&questions, SurveyState::Idle, Event::Start);
    let mut state = welcome.state;
    let mut effects = welcome.effects;

    for event in [
        Event::Accept,
        typed("4"),
        button("Red"),
        typed("No, thanks"),
        button("B"),
        button("Done"),
        Event::Skip,
    ] {
        let next = step(&questions, state, event);
        state = next.state;
        effects.extend(next.effects);
    }

    let prompted: Vec<u32> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Prompt(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(prompted, vec![1, 2, 3, 4, 5]);
    assert_eq!(effects.iter().filter(|e| **e == Effect::Submit).count(), 1);
    assert!(matches!(state, SurveyState::Submitting(_)));
}

#[test]
fn test_submitting_waits_for_retry_or_cancel() {
    let questions = questions_from_json(r#"[{"id": 1, "type": "text", "text": "Name?"}]"#);
    let submitting = step(&questions, accepted(&questions), typed("Ada"));
    assert_eq!(submitting.effects, vec![Effect::Answered(1), Effect::Submit]);

    let blocked = step(&questions, submitting.state, typed("more"));
    assert_eq!(
        blocked.effects,
        vec![Effect::Rejected(
            "Your answers are waiting to be saved. Press Retry or /cancel.".to_string()
        )]
    );

    let retried = step(&questions, blocked.state.clone(), Event::Retry);
    assert_eq!(retried.effects, vec![Effect::Submit]);
    assert_eq!(retried.state, blocked.state);

    let cancelled = step(&questions, retried.state, Event::Cancel);
    assert_eq!(cancelled.state, SurveyState::Idle);
    assert_eq!(cancelled.effects, vec![Effect::Cancelled]);
}

#[test]
fn test_cancel_discards_session_without_submitting() {
    let questions = sample_questions();
    let state = step(&questions, at_multiple_question(&questions), button("A")).state;

    let cancelled = step(&questions, state, Event::Cancel);
    assert_eq!(cancelled.state, SurveyState::Idle);
    assert_eq!(cancelled.effects, vec![Effect::Cancelled]);

    let idle = step(&questions, cancelled.state, typed("3"));
    assert_eq!(idle.state, SurveyState::Idle);
    assert_eq!(idle.effects, vec![Effect::NotRunning]);
}

#[test]
fn test_start_while_answering_keeps_session() {
    let questions = sample_questions();
    let state = step(&questions, accepted(&questions), typed("2")).state;

    let result = step(&questions, state.clone(), Event::Start);
    assert_eq!(result.effects, vec![Effect::AlreadyRunning]);
    assert_eq!(result.state, state);
}

#[test]
fn test_idle_commands_report_no_survey() {
    let questions = sample_questions();
    for event in [Event::Cancel, Event::Skip, Event::Retry, Event::Accept] {
        let result = step(&questions, SurveyState::Idle, event);
        assert_eq!(result.state, SurveyState::Idle);
        assert_eq!(result.effects, vec![Effect::NotRunning]);
    }
}

#[test]
fn test_session_on_unknown_question_is_an_error() {
    let questions = sample_questions();
    let stray = Question {
        id: 9,
        text: "Gone".to_string(),
        description: None,
        required: true,
        last: false,
        form_entry: None,
        kind: QuestionKind::Text,
    };
    let state = SurveyState::Answering(Session::start(&stray));

    let result = survey_bot::survey::transition(&questions, state, typed("hi"));
    assert!(matches!(result, Err(SurveyError::UnknownQuestion(9))));
}

#[tokio::test]
async fn test_completed_session_reaches_sink_in_question_order() {
    let questions = sample_questions();
    let mut state = accepted(&questions);
    for event in [
        typed("3"),
        button("Blue"),
        Event::Skip,
        button("A"),
        typed("Vim"),
        typed("7"),
    ] {
        state = step(&questions, state, event).state;
    }
    let SurveyState::Submitting(session) = &state else {
        panic!("Expected Submitting, got {state:?}");
    };

    let sink = Arc::new(RecordingSink::default());
    let record = AnswerRecord::from_session(&questions, session, 42);
    sink.submit(&record).await.expect("Failed to submit");

    let records = sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].chat_id, 42);
    assert_eq!(records[0].session_id, session.id);
    assert_eq!(records[0].values(), vec!["3", "Blue", "", "A, Vim", "7"]);
    assert_eq!(
        records[0].answers[0].form_entry.as_deref(),
        Some("entry.101")
    );
}

#[test]
fn test_typed_other_option_is_noted_without_redrawing_keyboard() {
    let questions = questions_from_json(
        r#"[{"id": 1, "type": "multiple", "text": "Editors?", "choices": [["A", "B"]], "allow_other": true}]"#,
    );
    let state = accepted(&questions);
    let before = state
        .session()
        .and_then(|s| s.multiple.clone())
        .expect("No selection progress");

    let result = step(&questions, state, typed("Vim"));
    assert_eq!(result.effects, vec![Effect::Noted(1, "Vim".to_string())]);
    assert!(!result.effects.contains(&Effect::Refresh(1)));

    let after = result
        .state
        .session()
        .and_then(|s| s.multiple.clone())
        .expect("No selection progress");
    assert_eq!(after.remaining, before.remaining);
    assert_eq!(after.selected, vec!["Vim".to_string()]);

    // The noted pick is kept in the final answer
    let state = step(&questions, result.state, button("B")).state;
    let done = step(&questions, state, button("Done"));
    assert_eq!(done.effects, vec![Effect::Answered(1), Effect::Submit]);
    let answer = done.state.session().and_then(|s| s.answers.get(&1).cloned());
    assert_eq!(answer, Some(AnswerValue::Text("Vim, B".to_string())));
}

#[tokio::test]
async fn test_failed_submit_keeps_session_until_retry_succeeds() {
    let questions = questions_from_json(r#"[{"id": 1, "type": "text", "text": "Name?"}]"#);
    let submitting = step(&questions, accepted(&questions), typed("Ada")).state;
    let SurveyState::Submitting(session) = &submitting else {
        panic!("Expected Submitting, got {submitting:?}");
    };
    let record = AnswerRecord::from_session(&questions, session, 7);

    let failing = FailingSink::default();
    let outcome = failing.submit(&record).await;
    assert!(outcome.is_err());
    let state = after_submit(submitting.clone(), &outcome);
    assert_eq!(state, submitting);
    assert_eq!(*failing.attempts.lock().unwrap(), 1);

    let retry = step(&questions, state, Event::Retry);
    assert_eq!(retry.effects, vec![Effect::Submit]);

    let recording = RecordingSink::default();
    let outcome = recording.submit(&record).await;
    assert_eq!(after_submit(retry.state, &outcome), SurveyState::Idle);
    assert_eq!(recording.records.lock().unwrap().len(), 1);
}

#[test]
fn test_submit_outcome_outside_submitting_keeps_state() {
    let questions = sample_questions();
    let answering = accepted(&questions);
    let ok: Result<(), ()> = Ok(());
    assert_eq!(after_submit(answering.clone(), &ok), answering);
    assert_eq!(after_submit(SurveyState::Idle, &Err(())), SurveyState::Idle);
}
