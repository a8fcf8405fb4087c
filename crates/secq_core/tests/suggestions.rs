use std::time::Duration;

use pretty_assertions::assert_eq;
use secq_core::{update, AppState, Effect, Msg, RequestFailure, Settings};

fn with_one_question() -> AppState {
    let (state, _) = update(AppState::new(), Msg::AddQuestionClicked);
    state
}

fn edit(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::QuestionEdited {
            question: 1,
            text: text.to_string(),
        },
    )
}

fn fetches(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::FetchSuggestions { partial, .. } => Some(partial.clone()),
            _ => None,
        })
        .collect()
}

fn visible_suggestions(state: &AppState) -> Option<Vec<String>> {
    state.view().composer.questions[0].suggestions.clone()
}

#[test]
fn short_input_never_schedules_a_lookup() {
    for text in ["", "a", "ab", "é€"] {
        let (state, effects) = edit(with_one_question(), text);
        assert!(effects.is_empty(), "lookup scheduled for {text:?}");
        assert!(state.is_settled());
    }
}

#[test]
fn lookup_waits_for_the_debounce_window() {
    let (state, effects) = edit(with_one_question(), "encr");

    assert_eq!(
        effects,
        vec![Effect::ScheduleSuggestionLookup {
            question: 1,
            generation: 1,
            delay: Duration::from_millis(300),
        }]
    );
    assert!(!state.is_settled());
}

#[test]
fn debounce_uses_configured_delay() {
    let settings = Settings {
        debounce: Duration::from_millis(50),
        ..Settings::default()
    };
    let (state, _) = update(AppState::with_settings(settings), Msg::AddQuestionClicked);
    let (_, effects) = edit(state, "encr");

    assert!(matches!(
        effects.as_slice(),
        [Effect::ScheduleSuggestionLookup { delay, .. }] if *delay == Duration::from_millis(50)
    ));
}

#[test]
fn rapid_edits_collapse_to_one_request_with_latest_text() {
    let state = with_one_question();
    let (state, _) = edit(state, "enc");
    let (state, _) = edit(state, "encr");
    let (state, _) = edit(state, "encry");

    // Timers for the first two edits fire late and are ignored.
    let mut requested = Vec::new();
    let mut state = state;
    for generation in 1..=3 {
        let (next, effects) = update(
            state,
            Msg::SuggestionTimerElapsed {
                question: 1,
                generation,
            },
        );
        requested.extend(fetches(&effects));
        state = next;
    }

    assert_eq!(requested, vec!["encry".to_string()]);
}

#[test]
fn shrinking_below_minimum_hides_list_and_cancels_pending_lookup() {
    let (state, _) = edit(with_one_question(), "encr");
    let (state, _) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 1,
        },
    );
    let (state, _) = update(
        state,
        Msg::SuggestionsLoaded {
            question: 1,
            generation: 1,
            result: Ok(vec!["Is data encrypted at rest?".to_string()]),
        },
    );
    assert!(visible_suggestions(&state).is_some());

    let (state, effects) = edit(state, "en");
    assert!(effects.is_empty());
    assert_eq!(visible_suggestions(&state), None);
    assert!(state.is_settled());
}

#[test]
fn results_render_and_pick_fills_the_input() {
    let (state, _) = edit(with_one_question(), "encr");
    let (state, _) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 1,
        },
    );
    let (state, _) = update(
        state,
        Msg::SuggestionsLoaded {
            question: 1,
            generation: 1,
            result: Ok(vec![
                "Is data encrypted at rest?".to_string(),
                "Is data encrypted in transit?".to_string(),
            ]),
        },
    );
    assert_eq!(
        visible_suggestions(&state),
        Some(vec![
            "Is data encrypted at rest?".to_string(),
            "Is data encrypted in transit?".to_string(),
        ])
    );
    assert!(state.is_settled());

    let (state, effects) = update(
        state,
        Msg::SuggestionPicked {
            question: 1,
            index: 1,
        },
    );
    assert!(effects.is_empty());
    let row = &state.view().composer.questions[0];
    assert_eq!(row.text, "Is data encrypted in transit?");
    assert_eq!(row.suggestions, None);
}

#[test]
fn empty_or_failed_lookups_hide_the_list() {
    let (state, _) = edit(with_one_question(), "encr");
    let (state, _) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 1,
        },
    );
    let (state, _) = update(
        state,
        Msg::SuggestionsLoaded {
            question: 1,
            generation: 1,
            result: Ok(Vec::new()),
        },
    );
    assert_eq!(visible_suggestions(&state), None);

    let (state, _) = edit(state, "encry");
    let (state, _) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 2,
        },
    );
    let (state, effects) = update(
        state,
        Msg::SuggestionsLoaded {
            question: 1,
            generation: 2,
            result: Err(RequestFailure::HttpStatus(500)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(visible_suggestions(&state), None);
    assert!(state.is_settled());
}

#[test]
fn stale_responses_are_ignored() {
    let (state, _) = edit(with_one_question(), "encr");
    let (state, _) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 1,
        },
    );
    let (state, _) = edit(state, "encryption");

    let (state, _) = update(
        state,
        Msg::SuggestionsLoaded {
            question: 1,
            generation: 1,
            result: Ok(vec!["old".to_string()]),
        },
    );

    assert_eq!(visible_suggestions(&state), None);
    assert!(!state.is_settled());
}

#[test]
fn deleted_question_ignores_its_timer() {
    let (state, _) = edit(with_one_question(), "encr");
    let (state, _) = update(state, Msg::DeleteQuestionClicked { question: 1 });

    let (state, effects) = update(
        state,
        Msg::SuggestionTimerElapsed {
            question: 1,
            generation: 1,
        },
    );

    assert!(effects.is_empty());
    assert!(state.is_settled());
}
