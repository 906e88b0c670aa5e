use std::time::Duration;

use crate::{
    MoveError,
    config::{ConfigError, GameConfig},
    core::PieceKind,
    events::GameEvent,
};

use super::{
    piece_buffer::{PieceBuffer, PieceSeed},
    playfield::{DropOutcome, InputCommand, Playfield},
};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A playfield driven by time: natural fall, piece dealing and top-out.
///
/// New pieces come from a [`PieceBuffer`]. The first piece is dealt on the
/// first [`Self::tick`] or [`Self::handle_input`], so listeners subscribed
/// right after construction see its [`GameEvent::PieceSpawned`]. When a
/// piece cannot be placed the grid is reset and the session is over until
/// [`Self::restart`].
#[derive(Debug)]
pub struct GameSession {
    field: Playfield,
    pieces: PieceBuffer,
    state: SessionState,
    fall_interval: Duration,
    fall_elapsed: Duration,
    total_time: Duration,
    pieces_dealt: u64,
}

impl GameSession {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_buffer(config, PieceBuffer::new())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece
    /// generation.
    pub fn with_seed(config: &GameConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        Self::with_buffer(config, PieceBuffer::with_seed(seed))
    }

    fn with_buffer(config: &GameConfig, pieces: PieceBuffer) -> Result<Self, ConfigError> {
        Ok(Self {
            field: Playfield::from_config(config)?,
            pieces,
            state: SessionState::Playing,
            fall_interval: config.fall_interval(),
            fall_elapsed: Duration::ZERO,
            total_time: Duration::ZERO,
            pieces_dealt: 0,
        })
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.field.subscribe(listener);
    }

    #[must_use]
    pub fn field(&self) -> &Playfield {
        &self.field
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.pieces.seed()
    }

    /// Number of pieces placed on the field so far, including a piece that
    /// failed to spawn.
    #[must_use]
    pub fn pieces_dealt(&self) -> u64 {
        self.pieces_dealt
    }

    /// Time spent in the playing state.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.total_time
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pieces.next_pieces()
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    /// Clears the field and starts over with the next pieces of the bag.
    pub fn restart(&mut self) {
        self.field.reset();
        self.state = SessionState::Playing;
        self.fall_elapsed = Duration::ZERO;
    }

    /// Advances time by `dt`: progresses the slide and applies one natural
    /// drop per elapsed fall interval.
    pub fn tick(&mut self, dt: Duration) {
        if !self.state.is_playing() {
            return;
        }
        self.ensure_piece();
        self.total_time += dt;
        self.field.tick(dt);
        self.fall_elapsed += dt;
        while self.state.is_playing() && self.fall_elapsed >= self.fall_interval {
            self.fall_elapsed -= self.fall_interval;
            _ = self.try_drop();
        }
    }

    /// Applies one player command. Ignored unless playing.
    pub fn handle_input(&mut self, command: InputCommand) {
        if !self.state.is_playing() {
            return;
        }
        self.ensure_piece();
        match command {
            InputCommand::Drop => _ = self.try_drop(),
            InputCommand::HardDrop => _ = self.try_hard_drop(),
            InputCommand::ShiftLeft
            | InputCommand::ShiftRight
            | InputCommand::RotateCw
            | InputCommand::RotateCcw => self.field.handle_input(command),
        }
    }

    pub fn try_drop(&mut self) -> Result<(), MoveError> {
        let outcome = self.field.attempt_drop()?;
        self.complete(&outcome);
        Ok(())
    }

    pub fn try_hard_drop(&mut self) -> Result<(), MoveError> {
        let outcome = self.field.hard_drop()?;
        self.complete(&outcome);
        Ok(())
    }

    fn complete(&mut self, outcome: &DropOutcome) {
        if outcome.is_locked() {
            self.fall_elapsed = Duration::ZERO;
            self.ensure_piece();
        }
    }

    fn ensure_piece(&mut self) {
        if !self.state.is_playing() || self.field.active_piece().is_some() {
            return;
        }
        let kind = self.pieces.pop_next();
        self.pieces_dealt += 1;
        if self.field.spawn(kind).is_err() {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.state = SessionState::GameOver;
        self.field.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GridConfig, events::EventLog};

    const SEED: PieceSeed = PieceSeed::from_bytes([7; 16]);

    fn config(width: usize, height: usize) -> GameConfig {
        GameConfig {
            grid: GridConfig { width, height },
            slide_duration_ms: 0,
            fall_interval_ms: 100,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_first_piece_dealt_lazily() {
        let mut session = GameSession::with_seed(&config(10, 20), SEED).unwrap();
        let log = EventLog::new();
        session.subscribe(log.listener());
        assert!(session.field().active_piece().is_none());

        let expected = session.next_pieces().next().unwrap();
        session.tick(Duration::ZERO);
        assert_eq!(
            log.take(),
            vec![GameEvent::PieceSpawned { kind: expected }]
        );
        assert_eq!(session.pieces_dealt(), 1);
    }

    #[test]
    fn test_natural_fall_follows_interval() {
        let mut session = GameSession::with_seed(&config(10, 20), SEED).unwrap();
        session.tick(Duration::ZERO);
        let start = session.field().active_piece().unwrap().anchor();

        session.tick(Duration::from_millis(99));
        assert_eq!(session.field().active_piece().unwrap().anchor(), start);
        session.tick(Duration::from_millis(1));
        assert_eq!(
            session.field().active_piece().unwrap().anchor(),
            start.below()
        );
        session.tick(Duration::from_millis(250));
        assert_eq!(
            session.field().active_piece().unwrap().anchor().y,
            start.y - 3
        );
    }

    #[test]
    fn test_hard_drop_deals_next_piece() {
        let mut session = GameSession::with_seed(&config(10, 20), SEED).unwrap();
        let log = EventLog::new();
        session.subscribe(log.listener());
        session.handle_input(InputCommand::HardDrop);
        assert_eq!(log.count(GameEvent::is_piece_locked), 1);
        assert_eq!(log.count(GameEvent::is_piece_spawned), 2);
        assert!(session.field().active_piece().is_some());
        assert_eq!(session.field().grid().occupied_count(), 4);
    }

    #[test]
    fn test_top_out_resets_and_ends_session() {
        let mut session = GameSession::with_seed(&config(4, 2), SEED).unwrap();
        let log = EventLog::new();
        session.subscribe(log.listener());
        for _ in 0..50 {
            if session.session_state().is_game_over() {
                break;
            }
            session.handle_input(InputCommand::HardDrop);
        }
        assert!(session.session_state().is_game_over());
        assert_eq!(log.count(GameEvent::is_piece_out_of_bounds), 1);
        assert_eq!(session.field().grid().occupied_count(), 0);
        assert!(session.field().active_piece().is_none());

        let dealt = session.pieces_dealt();
        session.handle_input(InputCommand::HardDrop);
        session.tick(Duration::from_secs(1));
        assert_eq!(session.pieces_dealt(), dealt);

        session.restart();
        assert!(session.session_state().is_playing());
        session.tick(Duration::ZERO);
        assert!(session.field().active_piece().is_some());
    }

    #[test]
    fn test_pause_stops_time() {
        let mut session = GameSession::with_seed(&config(10, 20), SEED).unwrap();
        session.tick(Duration::ZERO);
        let start = session.field().active_piece().unwrap().anchor();
        session.toggle_pause();
        session.tick(Duration::from_secs(5));
        session.handle_input(InputCommand::ShiftLeft);
        assert_eq!(session.field().active_piece().unwrap().anchor(), start);
        assert_eq!(session.duration(), Duration::ZERO);
        session.toggle_pause();
        assert!(session.session_state().is_playing());
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = || {
            let mut session = GameSession::with_seed(&config(10, 20), SEED).unwrap();
            for _ in 0..6 {
                session.handle_input(InputCommand::ShiftLeft);
                session.handle_input(InputCommand::HardDrop);
            }
            session.field().grid().to_string()
        };
        assert_eq!(run(), run());
    }
}
