//! Typed notifications produced by the engine.
//!
//! Listeners are plain closures registered on an [`EventBus`]. Every
//! listener sees every event, in emission order, after the mutation that
//! caused it has fully completed.

use std::{cell::RefCell, fmt, rc::Rc};

use serde::Serialize;

use crate::core::{
    cell::Occupant,
    coord::{GridPos, WorldPos},
    shape::PieceKind,
};

/// A cell that left the grid, with the occupant it held.
///
/// This is the exit-visual payload: the presentation layer reads it once to
/// play the dying-cell effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovedCell {
    pub pos: GridPos,
    pub occupant: Occupant,
}

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// One batch of grid mutations has completed.
    GridChanged,
    /// Cells went through `Filled -> Dying -> Empty` in the last batch.
    CellsRemoved { cells: Vec<RemovedCell> },
    /// Full rows were removed. Indices are pre-compaction, ascending.
    RowsCleared { rows: Vec<usize> },
    PieceSpawned { kind: PieceKind },
    /// The active piece was written into the grid and no longer exists.
    PieceLocked {
        kind: Option<PieceKind>,
        cells: [GridPos; 4],
    },
    /// A piece could not be placed; the board is full.
    PieceOutOfBounds { kind: PieceKind },
    SlideStarted { from: WorldPos, to: WorldPos },
    SlideFinished,
}

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Fire-and-forget fan-out of [`GameEvent`]s to registered listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn emit(&mut self, event: &GameEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

/// Shared recorder of emitted events.
///
/// # Example
///
/// ```
/// use stacker_engine::{EventLog, GameEvent, Grid, PieceKind, Color};
///
/// let log = EventLog::new();
/// let mut grid = Grid::new(4, 4);
/// grid.subscribe(log.listener());
/// grid.set_filled(0, 0, PieceKind::T, Color::WHITE);
/// assert_eq!(log.take(), vec![GameEvent::GridChanged]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a listener that appends into this log.
    pub fn listener(&self) -> impl FnMut(&GameEvent) + 'static {
        let events = Rc::clone(&self.events);
        move |event| events.borrow_mut().push(event.clone())
    }

    /// Drains and returns all recorded events.
    #[must_use]
    pub fn take(&self) -> Vec<GameEvent> {
        self.events.take()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listener_receives_events_in_order() {
        let first = EventLog::new();
        let second = EventLog::new();
        let mut bus = EventBus::new();
        bus.subscribe(first.listener());
        bus.subscribe(second.listener());
        assert_eq!(bus.listener_count(), 2);

        bus.emit(&GameEvent::PieceSpawned { kind: PieceKind::I });
        bus.emit(&GameEvent::GridChanged);

        let expected = vec![
            GameEvent::PieceSpawned { kind: PieceKind::I },
            GameEvent::GridChanged,
        ];
        assert_eq!(first.take(), expected);
        assert_eq!(second.take(), expected);
        assert!(first.is_empty());
    }

    #[test]
    fn test_count_filters() {
        let log = EventLog::new();
        let mut bus = EventBus::new();
        bus.subscribe(log.listener());
        bus.emit(&GameEvent::GridChanged);
        bus.emit(&GameEvent::SlideFinished);
        bus.emit(&GameEvent::GridChanged);
        assert_eq!(log.count(GameEvent::is_grid_changed), 2);
        assert_eq!(log.count(GameEvent::is_slide_finished), 1);
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let event = GameEvent::RowsCleared { rows: vec![0, 2] };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"RowsCleared","rows":[0,2]}"#
        );
        assert_eq!(
            serde_json::to_string(&GameEvent::GridChanged).unwrap(),
            r#"{"type":"GridChanged"}"#
        );
    }
}
