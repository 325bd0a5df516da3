mod common;

use common::{clip_config, Call, CountingCues, Harness};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use vidchoice_core::{
    ControlId, Cue, FeedbackTone, PlaybackState, TimerId, TrialPhase, TrialResult, WindowState,
};
use vidchoice_media::{ExtensionResolver, ResolveError};
use vidchoice_timing::ManualTimer;
use vidchoice_trial::{
    CompletionSource, ConfigError, TrialConfig, TrialController, TrialError, TrialEvent,
};

fn assert_rt(result: &TrialResult, expected_ms: f64) {
    let rt = result.reaction_time_ms.expect("reaction time recorded");
    assert!((rt - expected_ms).abs() < 1e-6, "rt {rt} != {expected_ms}");
}

#[test]
fn near_end_position_opens_window_and_click_produces_record() {
    let mut h = Harness::start(clip_config());
    assert_eq!(h.trial.phase(), TrialPhase::AwaitingCompletion);
    assert_eq!(h.enabled(), [false, false]);

    h.metadata(4.0);
    h.position(3.4);
    assert_eq!(h.trial.window_state(), WindowState::Closed);
    assert_eq!(h.enabled(), [false, false]);

    h.position(3.6);
    assert_eq!(h.trial.phase(), TrialPhase::ResponseOpen);
    assert_eq!(h.enabled(), [true, true]);
    assert_eq!(h.trial.playback().completed_by(), Some(CompletionSource::NearEnd));

    h.advance_ms(800);
    assert!(h.click(ControlId::Left));
    assert_eq!(h.trial.phase(), TrialPhase::Feedback);
    assert_eq!(h.enabled(), [false, false]);
    assert!(h.results().is_empty());

    assert!(h.fire(TimerId::Feedback));
    assert_eq!(h.trial.phase(), TrialPhase::Done);

    let results = h.results();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.response, 0);
    assert_eq!(result.correct, None);
    assert_eq!(result.trial_type, "video-button-response");
    assert_eq!(
        result.stimulus,
        vec!["stimuli/clip01.mp4".to_string(), "stimuli/clip01.webm".to_string()]
    );
    assert_rt(result, 800.0);
}

#[test]
fn looping_clip_opens_on_near_end_without_ended() {
    let mut h = Harness::start(clip_config().with_loop(true));
    assert!(h.metadata(2.0));
    for position in [0.5, 1.0, 1.25] {
        assert!(!h.position(position));
    }
    assert_eq!(h.trial.window_state(), WindowState::Closed);

    assert!(h.position(1.6));
    assert_eq!(h.trial.phase(), TrialPhase::ResponseOpen);
    assert_eq!(h.trial.playback().completed_by(), Some(CompletionSource::NearEnd));

    // Second pass through the clip must not reopen anything.
    for position in [0.1, 0.9, 1.7] {
        assert!(!h.position(position));
    }
    assert_eq!(h.count(&Call::Enable(ControlId::Left, true)), 1);

    h.advance_ms(350);
    assert!(h.click(ControlId::Right));
    assert!(h.fire(TimerId::Feedback));

    let results = h.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].response, 1);
    assert_rt(&results[0], 350.0);
}

#[test]
fn playback_events_after_completion_are_not_handled() {
    let mut h = Harness::start(clip_config());
    assert!(!h.send(TrialEvent::MetadataLoaded { duration: None }));
    assert!(h.metadata(4.0));
    assert!(!h.metadata(4.0));
    assert!(!h.position(1.0));
    assert!(h.position(3.6));

    h.click(ControlId::Left);
    assert_eq!(h.trial.phase(), TrialPhase::Feedback);
    assert!(!h.position(3.9));
    assert!(!h.metadata(5.0));
    assert!(!h.send(TrialEvent::Ended));
    assert_eq!(h.trial.phase(), TrialPhase::Feedback);
}

#[test]
fn expected_answer_scores_the_selected_label() {
    let config = clip_config()
        .with_choices("dog", "cat")
        .with_expected_answer("cat");

    let mut h = Harness::start(config.clone());
    h.send(TrialEvent::Ended);
    h.click(ControlId::Right);
    assert_eq!(h.count(&Call::Feedback(ControlId::Right, FeedbackTone::Positive)), 1);
    h.fire(TimerId::Feedback);
    assert_eq!(h.results()[0].correct, Some(true));
    assert_eq!(*h.cues.borrow(), vec![Cue::Bleep]);

    let mut h = Harness::start(config);
    h.send(TrialEvent::Ended);
    h.click(ControlId::Left);
    assert_eq!(h.count(&Call::Feedback(ControlId::Left, FeedbackTone::Negative)), 1);
    h.fire(TimerId::Feedback);
    assert_eq!(h.results()[0].correct, Some(false));
    assert_eq!(*h.cues.borrow(), vec![Cue::Buzz]);
}

#[test]
fn without_expected_answer_correctness_is_undetermined() {
    for control in ControlId::ALL {
        let mut h = Harness::start(clip_config().with_choices("yes", "no"));
        h.send(TrialEvent::Ended);
        h.click(control);
        h.fire(TimerId::Feedback);

        let result = &h.results()[0];
        assert_eq!(result.response, control.index());
        assert_eq!(result.correct, None);
    }
}

#[test]
fn first_completion_fires_once_across_both_paths() {
    let mut h = Harness::start(clip_config());
    h.metadata(4.0);
    h.position(3.7);
    assert!(!h.send(TrialEvent::Ended));
    h.position(3.95);

    assert_eq!(h.count(&Call::Enable(ControlId::Left, true)), 1);
    assert_eq!(h.count(&Call::Enable(ControlId::Right, true)), 1);
    assert_eq!(h.trial.playback_state(), PlaybackState::Completed);
}

#[test]
fn ended_wins_when_it_arrives_first() {
    let mut h = Harness::start(clip_config());
    h.metadata(4.0);
    h.position(3.2);
    assert!(h.send(TrialEvent::Ended));
    let started = h.trial.reaction_clock().started_at();
    h.advance_ms(100);
    h.position(3.8);

    assert_eq!(h.trial.playback().completed_by(), Some(CompletionSource::Ended));
    assert_eq!(h.trial.reaction_clock().started_at(), started);
    assert_eq!(h.count(&Call::Enable(ControlId::Left, true)), 1);
}

#[test]
fn missing_duration_falls_back_to_ended() {
    let mut h = Harness::start(clip_config());
    h.send(TrialEvent::MetadataLoaded { duration: None });
    h.position(3.9);
    h.position(100.0);
    assert_eq!(h.trial.window_state(), WindowState::Closed);

    h.send(TrialEvent::Ended);
    assert_eq!(h.trial.window_state(), WindowState::Open);
}

#[test]
fn click_before_window_opens_is_ignored() {
    let mut h = Harness::start(clip_config());
    let before = h.calls();

    assert!(!h.click(ControlId::Right));
    assert_eq!(h.trial.phase(), TrialPhase::AwaitingCompletion);
    assert_eq!(h.trial.window_state(), WindowState::Closed);
    assert_eq!(h.calls(), before);
    assert!(h.cues.borrow().is_empty());

    h.metadata(4.0);
    h.position(3.6);
    h.advance_ms(250);
    h.click(ControlId::Left);
    h.fire(TimerId::Feedback);

    let results = h.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].response, 0);
    assert_rt(&results[0], 250.0);
}

#[test]
fn double_click_produces_one_record() {
    let mut h = Harness::start(clip_config());
    h.send(TrialEvent::Ended);
    h.advance_ms(300);
    assert!(h.click(ControlId::Left));
    h.advance_ms(15);
    assert!(!h.click(ControlId::Left));
    assert!(!h.click(ControlId::Right));

    assert_eq!(h.count(&Call::Schedule(TimerId::Feedback, Duration::from_millis(400))), 1);
    assert_eq!(h.cues.borrow().len(), 1);

    h.fire(TimerId::Feedback);
    assert!(!h.click(ControlId::Right));
    assert!(!h.send(TrialEvent::TimerElapsed(TimerId::Feedback)));

    let results = h.results();
    assert_eq!(results.len(), 1);
    assert_rt(&results[0], 300.0);
}

#[test]
fn capture_disables_controls_before_feedback() {
    let mut h = Harness::start(clip_config());
    h.send(TrialEvent::Ended);
    h.click(ControlId::Right);

    let calls = h.calls();
    let feedback_at = calls
        .iter()
        .position(|c| matches!(c, Call::Feedback(..)))
        .unwrap();
    let disables: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Enable(_, false)))
        .map(|(i, _)| i)
        .collect();
    // two at render time, two at capture
    assert_eq!(disables.len(), 4);
    assert!(disables.iter().all(|&i| i < feedback_at));
}

#[test]
fn stalled_playback_never_produces_a_record() {
    let mut h = Harness::start(clip_config());
    h.metadata(4.0);
    h.position(1.0);
    h.advance_ms(60_000);
    assert_eq!(h.trial.window_state(), WindowState::Closed);
    assert!(h.results().is_empty());

    h.trial.teardown();
    h.trial.teardown();
    assert_eq!(h.trial.phase(), TrialPhase::Done);
    assert_eq!(h.count(&Call::Teardown), 1);
    assert!(!h.send(TrialEvent::Ended));
    assert!(h.results().is_empty());
}

#[test]
fn grace_period_delays_window_and_clock() {
    let config = clip_config().with_grace_period(Duration::from_millis(500));
    let mut h = Harness::start(config);
    h.metadata(4.0);
    h.position(3.6);

    assert_eq!(h.trial.phase(), TrialPhase::AwaitingCompletion);
    assert_eq!(h.trial.playback_state(), PlaybackState::Completed);
    assert!(h.is_armed(TimerId::Grace));
    assert!(!h.click(ControlId::Left));

    assert!(h.fire(TimerId::Grace));
    assert_eq!(h.trial.phase(), TrialPhase::ResponseOpen);
    assert_eq!(h.enabled(), [true, true]);

    h.advance_ms(120);
    h.click(ControlId::Right);
    h.fire(TimerId::Feedback);
    assert_rt(&h.results()[0], 120.0);
}

#[test]
fn teardown_during_grace_cancels_timer() {
    let mut h = Harness::start(clip_config().with_grace_period(Duration::from_millis(200)));
    h.send(TrialEvent::Ended);
    h.trial.teardown();

    assert!(!h.is_armed(TimerId::Grace));
    assert_eq!(h.count(&Call::Cancel(TimerId::Grace)), 1);
    assert!(!h.send(TrialEvent::TimerElapsed(TimerId::Grace)));
    assert_eq!(h.trial.window_state(), WindowState::Closed);
}

#[test]
fn teardown_during_feedback_drops_the_record() {
    let mut h = Harness::start(clip_config());
    h.send(TrialEvent::Ended);
    h.click(ControlId::Left);
    h.trial.teardown();

    assert_eq!(h.count(&Call::Cancel(TimerId::Feedback)), 1);
    assert!(!h.send(TrialEvent::TimerElapsed(TimerId::Feedback)));
    assert!(h.results().is_empty());
}

#[test]
fn rejected_cue_does_not_delay_completion() {
    let cues = CountingCues {
        reject: true,
        ..Default::default()
    };
    let mut h = Harness::start_with_cues(clip_config(), cues);
    h.send(TrialEvent::Ended);
    h.click(ControlId::Left);
    assert!(h.is_armed(TimerId::Feedback));
    h.fire(TimerId::Feedback);
    assert_eq!(h.results().len(), 1);
}

#[test]
fn view_is_cleared_before_record_is_delivered() {
    let surface = common::RecordingSurface::default();
    let log = surface.log.clone();
    let timer = ManualTimer::new();
    let mut trial =
        TrialController::new(clip_config(), timer, surface, CountingCues::default()).unwrap();

    let cleared_at_delivery = Rc::new(Cell::new(false));
    let flag = Rc::clone(&cleared_at_delivery);
    let seen = Rc::clone(&log);
    trial
        .start(&ExtensionResolver::default(), move |_| {
            flag.set(seen.borrow().last() == Some(&Call::Teardown));
        })
        .unwrap();

    trial.handle_event(TrialEvent::Ended);
    trial.handle_event(TrialEvent::Response(ControlId::Right));
    trial.handle_event(TrialEvent::TimerElapsed(TimerId::Feedback));
    assert!(cleared_at_delivery.get());

    trial.teardown();
    drop(trial);
    let teardowns = log.borrow().iter().filter(|c| **c == Call::Teardown).count();
    assert_eq!(teardowns, 1);
}

#[test]
fn dropping_a_running_trial_tears_it_down() {
    let h = Harness::start(clip_config().with_grace_period(Duration::from_millis(50)));
    let Harness {
        mut trial, log, ..
    } = h;
    trial.handle_event(TrialEvent::Ended);
    drop(trial);

    let calls = log.borrow();
    assert!(calls.contains(&Call::Cancel(TimerId::Grace)));
    assert_eq!(calls.last(), Some(&Call::Teardown));
}

#[test]
fn render_gets_effective_labels_and_disabled_controls() {
    let mut config = clip_config();
    config.choices = vec!["walk".into()];
    let h = Harness::start(config);

    let calls = h.calls();
    assert_eq!(
        calls[..3],
        [
            Call::Render(["walk".to_string(), "right".to_string()]),
            Call::Enable(ControlId::Left, false),
            Call::Enable(ControlId::Right, false),
        ]
    );
}

#[test]
fn configuration_defects_fail_before_start() {
    let err = TrialController::new(
        TrialConfig::new(Vec::<String>::new()),
        ManualTimer::new(),
        common::RecordingSurface::default(),
        CountingCues::default(),
    )
    .err()
    .expect("empty stimulus must be rejected");
    assert!(matches!(err, TrialError::Config(ConfigError::EmptyStimulus)));
}

#[test]
fn unresolvable_stimulus_fails_start_without_rendering() {
    let surface = common::RecordingSurface::default();
    let log = surface.log.clone();
    let mut trial = TrialController::new(
        TrialConfig::new(["stimuli/noextension"]),
        ManualTimer::new(),
        surface,
        CountingCues::default(),
    )
    .unwrap();

    let err = trial
        .start(&ExtensionResolver::default(), |_| {})
        .unwrap_err();
    assert!(matches!(
        err,
        TrialError::Resolve(ResolveError::MissingExtension(_))
    ));
    assert_eq!(trial.phase(), TrialPhase::Initializing);
    assert!(log.borrow().is_empty());
}

#[test]
fn start_twice_is_rejected() {
    let mut h = Harness::start(clip_config());
    let err = h
        .trial
        .start(&ExtensionResolver::default(), |_| {})
        .unwrap_err();
    assert!(matches!(err, TrialError::AlreadyStarted));
}

#[test]
fn events_before_start_are_ignored() {
    let mut trial = TrialController::new(
        clip_config(),
        ManualTimer::new(),
        common::RecordingSurface::default(),
        CountingCues::default(),
    )
    .unwrap();
    assert!(!trial.handle_event(TrialEvent::Ended));
    assert!(!trial.handle_event(TrialEvent::Response(ControlId::Left)));
    assert_eq!(trial.phase(), TrialPhase::Initializing);
    assert_eq!(trial.window_state(), WindowState::Closed);
}
