use crate::target::Direction;
use crossterm::event::KeyCode;

/// Map a raw key to the direction it answers, if any. Everything outside the
/// four arrow keys is a non-answer and scores as a miss while a round is live.
pub fn classify(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Right => Some(Direction::Right),
        KeyCode::Left => Some(Direction::Left),
        _ => None,
    }
}
