use uuid::Uuid;

use super::*;

#[test]
fn default_state_is_idle() {
    assert!(matches!(InputState::default(), InputState::Idle));
}

#[test]
fn idle_is_not_dragging() {
    assert!(!InputState::Idle.is_dragging());
}

#[test]
fn dragging_state_reports_dragging() {
    let state = InputState::Dragging {
        id: Uuid::new_v4(),
        start: Point::new(10.0, 20.0),
        origin: Point::new(5.0, 5.0),
    };
    assert!(state.is_dragging());
}

#[test]
fn dragging_keeps_grab_context() {
    let id = Uuid::new_v4();
    let state = InputState::Dragging {
        id,
        start: Point::new(10.0, 20.0),
        origin: Point::new(5.0, 6.0),
    };
    match state {
        InputState::Dragging { id: drag_id, start, origin } => {
            assert_eq!(drag_id, id);
            assert_eq!(start, Point::new(10.0, 20.0));
            assert_eq!(origin, Point::new(5.0, 6.0));
        }
        InputState::Idle => panic!("expected Dragging"),
    }
}

#[test]
fn buttons_compare_by_variant() {
    assert_eq!(Button::Primary, Button::Primary);
    assert_ne!(Button::Primary, Button::Secondary);
    assert_ne!(Button::Middle, Button::Secondary);
}
