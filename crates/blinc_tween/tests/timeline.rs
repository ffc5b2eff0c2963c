use blinc_tween::registry::Extension;
use blinc_tween::{Position, Timeline, TimelineOptions, Value};
use serde_json::{json, Value as Json};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn number(timeline: &Timeline, key: &str) -> f64 {
    timeline.state().borrow().number(key).unwrap_or(f64::NAN)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn segments_play_in_sequence() {
    let timeline = Timeline::new(json!({ "x": 0, "y": 0 }));
    timeline
        .to(json!({ "x": 100 }))
        .to(json!({ "y": 100 }));
    assert_eq!(timeline.get_duration(), 2.0);

    timeline.play_at(0.0);
    timeline.update(500.0);
    assert!(close(number(&timeline, "x"), 50.0));
    assert_eq!(number(&timeline, "y"), 0.0);

    timeline.update(1500.0);
    assert_eq!(number(&timeline, "x"), 100.0);
    assert!(close(number(&timeline, "y"), 50.0));

    assert!(!timeline.update(2000.0));
    assert_eq!(number(&timeline, "y"), 100.0);
    assert_eq!(timeline.progress(), 1.0);
    assert!(!timeline.is_playing());
}

#[test]
fn overlapping_segments() {
    let timeline = Timeline::new(json!({ "x": 0, "y": 0 }));
    timeline
        .to(json!({ "x": 100, "duration": 2 }))
        .to_at(json!({ "y": 100, "duration": 1 }), "-=1");
    assert_eq!(timeline.get_duration(), 2.0);

    timeline.play_at(0.0);
    timeline.update(1500.0);
    assert!(close(number(&timeline, "x"), 75.0));
    assert!(close(number(&timeline, "y"), 50.0));
    assert!(close(timeline.progress(), 0.75));
}

#[test]
fn later_segment_starts_from_live_value() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline
        .to(json!({ "x": 100 }))
        .to(json!({ "x": 0, "duration": 2 }));

    timeline.play_at(0.0);
    timeline.update(1000.0);
    assert_eq!(number(&timeline, "x"), 100.0);
    timeline.update(2000.0);
    assert!(close(number(&timeline, "x"), 50.0));
}

#[test]
fn segment_easing_from_payload() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": 100, "easing": "ease-in-quad" }));

    timeline.play_at(0.0);
    timeline.update(500.0);
    assert!(close(number(&timeline, "x"), 25.0));
}

#[test]
fn seek_to_label() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline
        .to(json!({ "x": 100 }))
        .label("mid", 0.5)
        .label("end", Position::Append);
    assert_eq!(timeline.label_position("mid"), Some(0.5));
    assert_eq!(timeline.label_position("end"), Some(1.0));
    assert_eq!(timeline.label_position("nope"), None);

    timeline.play_at(0.0);
    timeline.seek("mid");
    timeline.update(0.0);
    assert!(close(number(&timeline, "x"), 50.0));

    timeline.seek(0.25);
    timeline.update(0.0);
    assert!(close(number(&timeline, "x"), 25.0));
}

#[test]
fn repeat_restores_initial_state() {
    let repeats = Rc::new(Cell::new(0));
    let timeline = Timeline::new(json!({ "x": 0 }));
    {
        let repeats = repeats.clone();
        timeline
            .to(json!({ "x": 100 }))
            .repeat(1)
            .on_repeat(move |_, _| repeats.set(repeats.get() + 1));
    }
    assert_eq!(timeline.total_duration(), 2.0);

    timeline.play_at(0.0);
    assert!(timeline.update(1000.0));
    assert_eq!(repeats.get(), 1);
    assert_eq!(number(&timeline, "x"), 0.0);

    timeline.update(1500.0);
    assert!(close(number(&timeline, "x"), 50.0));

    assert!(!timeline.update(2000.0));
    assert_eq!(number(&timeline, "x"), 100.0);
}

#[test]
fn repeat_delay_waits_before_next_cycle() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": 100 })).repeat(1).repeat_delay(0.5);
    assert!(close(timeline.total_duration(), 2.5));

    timeline.play_at(0.0);
    timeline.update(1000.0);
    assert!(timeline.update(1300.0));
    assert_eq!(number(&timeline, "x"), 0.0);

    timeline.update(1500.0);
    assert!(close(number(&timeline, "x"), 20.0));
}

#[test]
fn yoyo_plays_second_cycle_backwards() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline
        .to(json!({ "x": 100 }))
        .configure(&TimelineOptions {
            repeat: 1,
            yoyo: true,
            ..Default::default()
        });

    timeline.play_at(0.0);
    timeline.update(1000.0);
    timeline.update(1250.0);
    assert!(close(number(&timeline, "x"), 75.0));
}

#[test]
fn reverse_mirrors_playhead() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": 100 }));

    timeline.play_at(0.0);
    timeline.update(250.0);
    assert!(close(number(&timeline, "x"), 25.0));

    timeline.reverse();
    timeline.update(400.0);
    assert!(close(number(&timeline, "x"), 10.0));

    assert!(!timeline.update(500.0));
    assert_eq!(number(&timeline, "x"), 0.0);
}

#[test]
fn pause_and_resume() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": 100 }));

    timeline.play_at(0.0);
    timeline.update(250.0);
    timeline.pause_at(250.0);
    assert!(timeline.is_paused());

    timeline.update(900.0);
    assert!(close(number(&timeline, "x"), 25.0));

    // play() on a paused timeline resumes it
    timeline.play_at(1000.0);
    assert!(timeline.is_playing());
    timeline.update(1250.0);
    assert!(close(number(&timeline, "x"), 50.0));
}

#[test]
fn lifecycle_callbacks_receive_progress() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let timeline = Timeline::new(json!({ "x": 0 }));
    {
        let start = log.clone();
        let complete = log.clone();
        let stop = log.clone();
        timeline
            .to(json!({ "x": 100 }))
            .on_start(move |_, progress| start.borrow_mut().push(("start", progress)))
            .on_complete(move |_, progress| complete.borrow_mut().push(("complete", progress)))
            .on_stop(move |_, progress| stop.borrow_mut().push(("stop", progress)));
    }

    timeline.play_at(0.0);
    timeline.update(1200.0);
    timeline.play_at(2000.0);
    timeline.update(2500.0);
    timeline.stop();

    assert_eq!(
        *log.borrow(),
        vec![
            ("start", 0.0),
            ("complete", 1.0),
            ("start", 0.0),
            ("stop", 0.5)
        ]
    );
}

#[test]
fn replay_from_complete_callback() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    let replays = Rc::new(Cell::new(0));
    {
        let handle = timeline.clone();
        let replays = replays.clone();
        timeline.to(json!({ "x": 100 })).on_complete(move |_, _| {
            if replays.get() == 0 {
                replays.set(1);
                handle.play_at(1000.0);
            }
        });
    }

    timeline.play_at(0.0);
    assert!(timeline.update(1000.0));
    assert_eq!(number(&timeline, "x"), 0.0);
    timeline.update(1500.0);
    assert!(close(number(&timeline, "x"), 50.0));
}

#[test]
fn invalid_segment_blocks_play() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": "far" }));
    assert!(!timeline.is_valid());
    assert!(timeline.is_empty());

    timeline.play_at(0.0);
    assert!(!timeline.is_playing());
}

#[test]
fn clear_drops_segments_and_labels() {
    let timeline = Timeline::new(json!({ "x": 0 }));
    timeline.to(json!({ "x": 100 })).label("a", 0.5);
    timeline.clear();

    assert!(timeline.is_empty());
    assert_eq!(timeline.get_duration(), 0.0);
    assert_eq!(timeline.label_position("a"), None);
}

fn snap(target: &mut Value, start: &Value, end: &Value, t: f64) {
    let source = if t < 0.5 { start } else { end };
    target.assign_from(source);
}

fn any_array(prop: &str, value: &Json, _reference: Option<&Json>) -> Result<(), String> {
    if value.is_array() {
        Ok(())
    } else {
        Err(format!("Property \"{prop}\" must be an array."))
    }
}

#[test]
fn custom_extension() {
    let timeline = Timeline::new(json!({ "frame": [0, 0] }));
    assert!(!timeline.is_valid_state());

    timeline.use_extension("frame", Extension::new(snap, any_array));
    assert!(timeline.is_valid_state());

    timeline.to(json!({ "frame": "4,8" }));
    assert!(timeline.errors()["frame"].to_string().contains("must be an array"));

    timeline.to(json!({ "frame": [4, 8] }));
    assert!(timeline.is_valid());

    timeline.play_at(0.0);
    timeline.update(250.0);
    assert_eq!(timeline.state().borrow().array("frame"), Some(&[0.0, 0.0][..]));
    timeline.update(750.0);
    assert_eq!(timeline.state().borrow().array("frame"), Some(&[4.0, 8.0][..]));
}

#[test]
fn seek_between_segments_shows_boundary_values() {
    let timeline = Timeline::new(json!({ "x": 0, "y": 0 }));
    timeline
        .to(json!({ "x": 100 }))
        .label("mid", Position::Append)
        .to(json!({ "y": 100 }));

    timeline.play_at(0.0);
    timeline.seek("mid");
    timeline.update(0.0);
    assert_eq!(number(&timeline, "x"), 100.0);
    assert_eq!(number(&timeline, "y"), 0.0);
}

#[test]
fn replay_from_update_callback() {
    let completes = Rc::new(Cell::new(0));
    let timeline = Timeline::new(json!({ "x": 0 }));
    {
        let handle = timeline.clone();
        let replayed = Cell::new(false);
        let completes = completes.clone();
        timeline
            .to(json!({ "x": 100 }))
            .on_update(move |_, progress| {
                if progress >= 0.5 && !replayed.replace(true) {
                    handle.stop();
                    handle.play_at(500.0);
                }
            })
            .on_complete(move |_, _| completes.set(completes.get() + 1));
    }

    timeline.play_at(0.0);
    assert!(timeline.update(500.0));
    assert!(timeline.is_playing());

    timeline.update(750.0);
    assert!(close(number(&timeline, "x"), 25.0));

    assert!(!timeline.update(1500.0));
    assert_eq!(number(&timeline, "x"), 100.0);
    assert_eq!(completes.get(), 1);
}

#[test]
fn stop_on_final_frame_skips_complete() {
    let completes = Rc::new(Cell::new(0));
    let timeline = Timeline::new(json!({ "x": 0 }));
    {
        let handle = timeline.clone();
        let completes = completes.clone();
        timeline
            .to(json!({ "x": 100 }))
            .on_update(move |_, progress| {
                if progress >= 1.0 {
                    handle.stop();
                }
            })
            .on_complete(move |_, _| completes.set(completes.get() + 1));
    }

    timeline.play_at(0.0);
    assert!(!timeline.update(1000.0));
    assert_eq!(completes.get(), 0);
    assert!(!timeline.is_playing());
}
