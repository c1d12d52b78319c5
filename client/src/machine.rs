use crate::matchmaking::Matchmaker;
use crate::reconciler::{Reconciled, TerminationReconciler};
use crate::relay::Relay;
use crate::session::SessionDescriptor;
use common::messages::{
    Announcement, ClientEvent, MatchStart, ParticipantId, RoomId, ServerEvent, SubmitMove,
};
use common::{check_outcome, Board, BoardError, CellIndex, Move, Outcome, Symbol};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Searching,
    Matched { room_id: RoomId },
    Active,
    Terminal,
}

// None of these are failures, the move just has no effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IgnoreReason {
    NoSession,
    NotLocalTurn,
    GameOver,
    OutOfBounds(usize),
    Occupied(usize),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NoSession => write!(f, "no game in progress"),
            IgnoreReason::NotLocalTurn => write!(f, "not your turn"),
            IgnoreReason::GameOver => write!(f, "the game is over"),
            IgnoreReason::OutOfBounds(idx) => write!(f, "cell {} is off the board", idx),
            IgnoreReason::Occupied(idx) => write!(f, "cell {} is taken", idx),
        }
    }
}

impl From<BoardError> for IgnoreReason {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::OutOfBounds(idx) => IgnoreReason::OutOfBounds(idx),
            BoardError::Occupied { index, .. } => IgnoreReason::Occupied(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveResult {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RequestMatch,
    SubmitMove(usize),
    // Play again
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Event(ServerEvent),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub board: Board,
    pub is_local_turn: bool,
    pub local_symbol: Option<Symbol>,
    pub outcome: Outcome,
    pub has_active_room: bool,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.phase, self.local_symbol) {
            (Phase::Idle, _) => writeln!(f, "Type `play` to search for a game"),
            (Phase::Searching, _) => writeln!(f, "Searching for an opponent..."),
            (Phase::Matched { room_id }, _) => {
                writeln!(f, "Paired in room {}, waiting for the start", room_id)
            }
            (_, Some(symbol)) => {
                writeln!(f, "You are {}", symbol)?;
                write!(f, "{}", self.board)?;
                match self.outcome {
                    Outcome::InProgress if self.is_local_turn => writeln!(f, "Your turn!"),
                    Outcome::InProgress => writeln!(f, "Waiting for opponent..."),
                    Outcome::Won(winner) => {
                        writeln!(f, "{} wins! Type `again` to play again", winner)
                    }
                    Outcome::Draw => writeln!(f, "It's a draw! Type `again` to play again"),
                }
            }
            (_, None) => Ok(()),
        }
    }
}

// Every relay event and user command goes through `handle` on the live state
pub struct GameStateMachine<R: Relay> {
    relay: R,
    matchmaker: Matchmaker,
    phase: Phase,
    board: Board,
    session: Option<SessionDescriptor>,
    reconciler: TerminationReconciler,
}

impl<R: Relay> GameStateMachine<R> {
    pub fn new(local_id: ParticipantId, relay: R) -> Self {
        GameStateMachine {
            relay,
            matchmaker: Matchmaker::new(local_id),
            phase: Phase::Idle,
            board: Board::default(),
            session: None,
            reconciler: TerminationReconciler::default(),
        }
    }

    pub fn handle(&mut self, input: Input) {
        match input {
            Input::Command(Command::RequestMatch) => self.request_match(),
            Input::Command(Command::SubmitMove(cell_index)) => {
                if let MoveResult::Ignored(reason) = self.submit_local_move(cell_index) {
                    info!("Move ignored: {}", reason);
                }
            }
            Input::Command(Command::Reset) => self.reset(),
            Input::Event(event) => self.handle_event(event),
        }
    }

    pub fn handle_event(&mut self, event: ServerEvent) {
        debug!("Handling relay event {:?} while {:?}", event, self.phase);
        match event {
            ServerEvent::PairingFound(room_id) => {
                if let Some(phase) = self.matchmaker.pairing_found(&self.phase, room_id) {
                    self.phase = phase;
                }
            }
            ServerEvent::MatchStart(start) => self.start_session(&start),
            ServerEvent::MoveMade(mv) => {
                if let MoveResult::Ignored(reason) = self.receive_remote_move(mv) {
                    warn!("Remote move {:?} ignored: {}", mv, reason);
                }
            }
            ServerEvent::AnnounceOutcome(announcement) => self.receive_announcement(&announcement),
        }
    }

    // From a finished game this is the same as `reset`, so the old board never
    // lingers into the next search
    pub fn request_match(&mut self) {
        if self.phase == Phase::Terminal {
            self.reset();
            return;
        }
        if let Some(phase) = self.matchmaker.request_match(&self.phase, &self.relay) {
            self.phase = phase;
        }
    }

    fn start_session(&mut self, start: &MatchStart) {
        if let Some(session) = self.matchmaker.match_start(&self.phase, start) {
            self.board = Board::default();
            self.reconciler.reset();
            self.session = Some(session);
            self.phase = Phase::Active;
        }
    }

    // Optimistic: the move lands on the local board before the peer has seen it
    pub fn submit_local_move(&mut self, cell_index: usize) -> MoveResult {
        let Some(session) = self.session.as_mut() else {
            return MoveResult::Ignored(IgnoreReason::NoSession);
        };
        if self.reconciler.is_resolved() {
            return MoveResult::Ignored(IgnoreReason::GameOver);
        }
        if !session.is_local_turn() {
            return MoveResult::Ignored(IgnoreReason::NotLocalTurn);
        }
        let symbol = session.local_symbol();
        let placed = CellIndex::new(cell_index).and_then(|idx| self.board.place(idx, symbol));
        if let Err(err) = placed {
            return MoveResult::Ignored(err.into());
        }
        session.end_local_turn();
        let room_id = session.room_id().to_string();

        self.send(ClientEvent::SubmitMove(SubmitMove::new(
            room_id,
            Move::new(cell_index, symbol),
        )));
        self.evaluate();
        MoveResult::Applied
    }

    // Turn order is trusted to the sender. An occupied cell is still refused,
    // which makes a redelivered move a no-op instead of a second turn flip.
    pub fn receive_remote_move(&mut self, mv: Move) -> MoveResult {
        let Some(session) = self.session.as_mut() else {
            return MoveResult::Ignored(IgnoreReason::NoSession);
        };
        if self.reconciler.is_resolved() {
            return MoveResult::Ignored(IgnoreReason::GameOver);
        }
        if let Err(err) = mv.cell().and_then(|idx| self.board.place(idx, mv.symbol)) {
            return MoveResult::Ignored(err.into());
        }
        session.start_local_turn();
        debug!("Peer placed {} on cell {}", mv.symbol, mv.cell_index);

        self.evaluate();
        MoveResult::Applied
    }

    pub fn receive_announcement(&mut self, announcement: &Announcement) {
        match &self.session {
            Some(session) if session.in_room(&announcement.room_id) => {}
            _ => {
                warn!(
                    "Ignoring outcome announced for room {} outside the current session",
                    announcement.room_id
                );
                return;
            }
        }
        if self.reconciler.receive(announcement) == Reconciled::Adopted {
            info!("Outcome is now {}", self.reconciler.outcome());
        }
        self.phase = Phase::Terminal;
    }

    fn evaluate(&mut self) {
        let outcome = check_outcome(&self.board);
        if !outcome.is_resolved() {
            return;
        }
        let Some(session) = &self.session else {
            return;
        };
        if let Some(announcement) = self.reconciler.record_local(session.room_id(), outcome) {
            self.send(ClientEvent::AnnounceOutcome(announcement));
        }
        self.phase = Phase::Terminal;
    }

    // Board, outcome and session go together, then straight back to searching
    pub fn reset(&mut self) {
        info!("Resetting session in {:?}", self.phase);
        self.board = Board::default();
        self.reconciler.reset();
        self.session = None;
        self.phase = Phase::Idle;
        self.request_match();
    }

    fn send(&self, event: ClientEvent) {
        // Nothing to retry against here; the driver notices a dead connection
        if let Err(err) = self.relay.send(&event) {
            warn!("Failed to send {:?}: {}", event, err);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            board: self.board.clone(),
            is_local_turn: self.session.as_ref().map_or(false, |s| s.is_local_turn()),
            local_symbol: self.session.as_ref().map(|s| s.local_symbol()),
            outcome: self.reconciler.outcome(),
            has_active_room: matches!(
                self.phase,
                Phase::Matched { .. } | Phase::Active | Phase::Terminal
            ),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Outcome {
        self.reconciler.outcome()
    }

    pub fn session(&self) -> Option<&SessionDescriptor> {
        self.session.as_ref()
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }
}
