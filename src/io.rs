use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;

use crate::events::AppEvent;
use crate::events::Event;
use crate::events::SimEvent;

/// Converts a crossterm event into a lifegrid event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        // Some platforms report releases too; a key only counts once
        CrossTermEvent::Key(KeyEvent {
            kind: KeyEventKind::Release,
            ..
        }) => None,

        CrossTermEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Some(Event::AppEvent(AppEvent::Exit)),
            KeyEvent {
                code: KeyCode::Char(' '),
                ..
            } => Some(Event::SimEvent(SimEvent::TogglePause)),
            KeyEvent {
                code: KeyCode::Char('n'),
                ..
            } => Some(Event::SimEvent(SimEvent::Step)),
            KeyEvent {
                code: KeyCode::Char('r'),
                ..
            } => Some(Event::SimEvent(SimEvent::Reset)),
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => Some(Event::SimEvent(SimEvent::Faster)),
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => Some(Event::SimEvent(SimEvent::Slower)),
            _ => None,
        },
        CrossTermEvent::Resize(cols, rows) => Some(Event::AppEvent(AppEvent::Resize { cols, rows })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrossTermEvent {
        CrossTermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn keybinds() {
        let none = KeyModifiers::NONE;

        assert_eq!(
            convert_event(key(KeyCode::Char(' '), none)),
            Some(Event::SimEvent(SimEvent::TogglePause))
        );
        assert_eq!(
            convert_event(key(KeyCode::Right, none)),
            Some(Event::SimEvent(SimEvent::Faster))
        );
        assert_eq!(
            convert_event(key(KeyCode::Left, none)),
            Some(Event::SimEvent(SimEvent::Slower))
        );
        assert_eq!(
            convert_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::AppEvent(AppEvent::Exit))
        );
        assert_eq!(convert_event(key(KeyCode::Char('c'), none)), None);
    }

    #[test]
    fn ignores_key_release() {
        let release = KeyEvent::new_with_kind(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );

        assert_eq!(convert_event(CrossTermEvent::Key(release)), None);
    }

    #[test]
    fn resize() {
        assert_eq!(
            convert_event(CrossTermEvent::Resize(80, 24)),
            Some(Event::AppEvent(AppEvent::Resize { cols: 80, rows: 24 }))
        );
    }
}
