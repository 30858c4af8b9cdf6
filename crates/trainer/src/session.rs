//! One study interaction: engine, board, feedback and host bridge wired
//! together the way the card widget drives them.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use chess_core::fen::normalize_position_input;
use chess_core::sequence::parse_sequence_field;
use chess_core::{resolve_factory, AuthorityFactory};

use crate::board::{board_position, BoardSink, DropResponse};
use crate::bridge::{HostBridge, HostChannel};
use crate::config::TrainerOptions;
use crate::engine::{create_engine, ExpectedMove, MoveAttempt, MoveEngine};
use crate::error::EngineError;
use crate::feedback::FeedbackSink;
use crate::status::GameStatus;

/// Raw card fields as stored by the host.
#[derive(Debug, Clone, Default)]
pub struct CardFields {
    pub position: String,
    /// JSON array of SAN tokens, or PGN movetext.
    pub sequence: String,
}

impl CardFields {
    pub fn new(position: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            sequence: sequence.into(),
        }
    }
}

/// A delayed opponent reply. Only valid for the engine generation that
/// scheduled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub generation: u64,
    pub delay: Duration,
    /// Reference token due next.
    pub notation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Wrong or meaningless drop; the board snaps back.
    Snapback,
    /// Correct move with more to play.
    Accepted(Option<PendingReply>),
    /// Correct move finishing the sequence.
    Completed,
}

impl DropOutcome {
    pub fn board_response(&self) -> DropResponse {
        match self {
            DropOutcome::Snapback => DropResponse::Snapback,
            _ => DropResponse::Accept,
        }
    }
}

pub struct TrainerSession<B, F, C> {
    engine: Box<dyn MoveEngine>,
    factory: Arc<dyn AuthorityFactory>,
    board: B,
    feedback: F,
    bridge: HostBridge<C>,
    options: TrainerOptions,
    generation: u64,
}

impl<B, F, C> TrainerSession<B, F, C>
where
    B: BoardSink,
    F: FeedbackSink,
    C: HostChannel,
{
    /// Resolve the configured rules authority and start a session.
    pub fn init(
        fields: &CardFields,
        options: TrainerOptions,
        board: B,
        feedback: F,
        channel: Option<C>,
    ) -> Result<Self, EngineError> {
        let factory = resolve_factory(&options.authority)
            .ok_or_else(|| EngineError::UnknownAuthority(options.authority.clone()))?;
        Self::with_factory(fields, options, factory, board, feedback, channel)
    }

    pub fn with_factory(
        fields: &CardFields,
        options: TrainerOptions,
        factory: Arc<dyn AuthorityFactory>,
        board: B,
        feedback: F,
        channel: Option<C>,
    ) -> Result<Self, EngineError> {
        let engine = build_engine(fields, &factory)?;
        let bridge = HostBridge::new(channel, options.auto_answer);
        let mut session = Self {
            engine,
            factory,
            board,
            feedback,
            bridge,
            options,
            generation: 0,
        };
        session.repaint();
        info!(
            plies = session.engine.total(),
            authority = session.factory.name(),
            "Trainer session started"
        );
        Ok(session)
    }

    /// Handle a piece dropped on the board.
    pub fn handle_drop(&mut self, source: &str, target: &str, promotion: Option<char>) -> DropOutcome {
        if source == target {
            return DropOutcome::Snapback;
        }

        let attempt = MoveAttempt {
            origin: source.to_string(),
            destination: target.to_string(),
            promotion,
        };
        let res = self.engine.try_user_move(Some(&attempt));

        if !res.correct {
            self.feedback.flash_wrong(res.expected.as_ref());
            self.bridge.fail();
            self.board.set_position(board_position(&res.position));
            return DropOutcome::Snapback;
        }

        self.feedback.clear_annotations();
        self.publish_progress();

        if self.engine.step() == self.engine.total() {
            self.bridge.pass();
            return DropOutcome::Completed;
        }

        let reply = self.engine.sequence().get(self.engine.step()).map(|token| PendingReply {
            generation: self.generation,
            delay: self.options.reply_delay(),
            notation: token.clone(),
        });
        DropOutcome::Accepted(reply)
    }

    /// Run a reply once its delay has elapsed. Replies scheduled before a
    /// reset or reload are dropped.
    pub fn run_reply(&mut self, reply: &PendingReply) -> Option<ExpectedMove> {
        if reply.generation != self.generation {
            debug!(
                scheduled = reply.generation,
                current = self.generation,
                "Dropping stale opponent reply"
            );
            return None;
        }
        if self.engine.sequence().get(self.engine.step()) != Some(&reply.notation) {
            return None;
        }

        let expected = self.engine.expected_move()?;
        if self.options.auto_reply && self.engine.redo() {
            self.board.set_position(board_position(&self.engine.position()));
            self.publish_progress();
            if self.engine.step() == self.engine.total() {
                self.bridge.pass();
            }
        }
        Some(expected)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.engine.undo();
        if undone {
            self.generation += 1;
            self.repaint();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.engine.redo();
        if redone {
            self.generation += 1;
            self.repaint();
        }
        redone
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.generation += 1;
        self.repaint();
    }

    /// Swap in a new card: fresh engine, fresh answer latch.
    pub fn reload(&mut self, fields: &CardFields) -> Result<(), EngineError> {
        self.engine = build_engine(fields, &self.factory)?;
        self.bridge.renew();
        self.generation += 1;
        self.repaint();
        Ok(())
    }

    pub fn status(&self) -> GameStatus {
        self.engine.status()
    }

    pub fn engine(&self) -> &dyn MoveEngine {
        self.engine.as_ref()
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn bridge(&self) -> &HostBridge<C> {
        &self.bridge
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn publish_progress(&mut self) {
        self.feedback.progress(self.engine.step(), self.engine.total());
        self.feedback.list_played(self.engine.sequence(), self.engine.step());
    }

    fn repaint(&mut self) {
        self.board.set_position(board_position(&self.engine.position()));
        self.feedback.clear_annotations();
        self.publish_progress();
    }
}

fn build_engine(
    fields: &CardFields,
    factory: &Arc<dyn AuthorityFactory>,
) -> Result<Box<dyn MoveEngine>, EngineError> {
    let position = normalize_position_input(&fields.position);
    let sequence = parse_sequence_field(&fields.sequence);
    create_engine(Some(&position), Some(&sequence), Some(Arc::clone(factory)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use chess_core::fen::STANDARD_START_FEN;

    #[derive(Default)]
    struct Board {
        shown: Vec<String>,
    }

    impl BoardSink for Board {
        fn set_position(&mut self, position: &str) {
            self.shown.push(position.to_string());
        }
    }

    #[derive(Default)]
    struct Feedback {
        flashes: Vec<Option<ExpectedMove>>,
        progress: Vec<(usize, usize)>,
    }

    impl FeedbackSink for Feedback {
        fn flash_wrong(&mut self, hint: Option<&ExpectedMove>) {
            self.flashes.push(hint.cloned());
        }
        fn progress(&mut self, step: usize, total: usize) {
            self.progress.push((step, total));
        }
        fn list_played(&mut self, _sequence: &[String], _step: usize) {}
        fn clear_annotations(&mut self) {}
    }

    #[derive(Default)]
    struct Host {
        sent: Vec<&'static str>,
    }

    impl HostChannel for Host {
        fn send(&mut self, command: &'static str) -> Result<(), BridgeError> {
            self.sent.push(command);
            Ok(())
        }
    }

    type Session = TrainerSession<Board, Feedback, Host>;

    fn session(sequence: &str, options: TrainerOptions) -> Session {
        TrainerSession::init(
            &CardFields::new("start", sequence),
            options,
            Board::default(),
            Feedback::default(),
            Some(Host::default()),
        )
        .unwrap()
    }

    fn sent(s: &Session) -> Vec<&'static str> {
        s.bridge().channel().map(|h| h.sent.clone()).unwrap_or_default()
    }

    #[test]
    fn test_init_paints_board_and_progress() {
        let s = session(r#"["e4", "e5"]"#, TrainerOptions::default());
        assert_eq!(s.board().shown, vec![STANDARD_START_FEN.to_string()]);
        assert_eq!(s.feedback().progress, vec![(0, 2)]);
    }

    #[test]
    fn test_unknown_authority() {
        let options = TrainerOptions { authority: "chess.js".into(), ..Default::default() };
        let res = TrainerSession::init(
            &CardFields::new("start", "[]"),
            options,
            Board::default(),
            Feedback::default(),
            Some(Host::default()),
        );
        assert!(matches!(res, Err(EngineError::UnknownAuthority(_))));
    }

    #[test]
    fn test_same_square_snaps_back_silently() {
        let mut s = session(r#"["e4"]"#, TrainerOptions::default());
        assert_eq!(s.handle_drop("e2", "e2", None), DropOutcome::Snapback);
        assert!(s.feedback().flashes.is_empty());
        assert!(sent(&s).is_empty());
    }

    #[test]
    fn test_wrong_move_fails_once_and_repaints() {
        let mut s = session(r#"["e4", "e5"]"#, TrainerOptions::default());
        assert_eq!(s.handle_drop("d2", "d4", None), DropOutcome::Snapback);
        assert_eq!(s.handle_drop("g1", "f3", None), DropOutcome::Snapback);
        assert_eq!(sent(&s), vec!["fail_line"]);
        assert_eq!(s.feedback().flashes.len(), 2);
        assert_eq!(
            s.feedback().flashes[0].as_ref().map(|h| h.origin.as_str()),
            Some("e2")
        );
        assert_eq!(s.board().shown.last().map(String::as_str), Some(STANDARD_START_FEN));
    }

    #[test]
    fn test_correct_moves_schedule_reply_then_pass() {
        let mut s = session(r#"["e4", "e5"]"#, TrainerOptions::default());
        let reply = match s.handle_drop("e2", "e4", None) {
            DropOutcome::Accepted(Some(reply)) => reply,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(reply.notation, "e5");
        assert_eq!(reply.delay, Duration::from_millis(450));
        assert_eq!(s.handle_drop("e7", "e5", None), DropOutcome::Completed);
        assert_eq!(sent(&s), vec!["pass_line"]);
        assert_eq!(s.feedback().progress.last(), Some(&(2, 2)));
    }

    #[test]
    fn test_stale_reply_is_dropped_after_reset() {
        let mut s = session(r#"["e4", "e5", "Nf3"]"#, TrainerOptions::default());
        let DropOutcome::Accepted(Some(reply)) = s.handle_drop("e2", "e4", None) else {
            panic!("expected a scheduled reply");
        };
        s.reset();
        assert_eq!(s.run_reply(&reply), None);
        assert_eq!(s.engine().step(), 0);
    }

    #[test]
    fn test_reply_reports_expected_move() {
        let mut s = session(r#"["e4", "e5"]"#, TrainerOptions::default());
        let DropOutcome::Accepted(Some(reply)) = s.handle_drop("e2", "e4", None) else {
            panic!("expected a scheduled reply");
        };
        let exp = s.run_reply(&reply).unwrap();
        assert_eq!((exp.origin.as_str(), exp.destination.as_str()), ("e7", "e5"));
        assert_eq!(s.engine().step(), 1);
    }

    #[test]
    fn test_auto_reply_plays_the_opponent_move() {
        let options = TrainerOptions { auto_reply: true, ..Default::default() };
        let mut s = session(r#"["e4", "e5"]"#, options);
        let DropOutcome::Accepted(Some(reply)) = s.handle_drop("e2", "e4", None) else {
            panic!("expected a scheduled reply");
        };
        assert!(s.run_reply(&reply).is_some());
        assert_eq!(s.engine().step(), 2);
        assert_eq!(sent(&s), vec!["pass_line"]);
    }

    #[test]
    fn test_reload_uses_fresh_latch() {
        let mut s = session(r#"["e4"]"#, TrainerOptions::default());
        s.handle_drop("d2", "d4", None);
        s.reload(&CardFields::new("", "1. d4")).unwrap();
        assert_eq!(s.engine().total(), 1);
        assert_eq!(s.handle_drop("d2", "d4", None), DropOutcome::Completed);
        assert_eq!(sent(&s), vec!["fail_line", "pass_line"]);
    }

    #[test]
    fn test_card_without_moves_rejects_everything() {
        let mut s = session("not json at all", TrainerOptions::default());
        assert_eq!(s.engine().total(), 0);
        assert_eq!(s.handle_drop("e2", "e4", None), DropOutcome::Snapback);
    }

    #[test]
    fn test_malformed_position_gives_degenerate_engine() {
        let mut s = TrainerSession::init(
            &CardFields::new("not a fen", r#"["e4"]"#),
            TrainerOptions::default(),
            Board::default(),
            Feedback::default(),
            Some(Host::default()),
        )
        .unwrap();
        assert_eq!(s.board().shown, vec!["start".to_string()]);
        assert_eq!(s.handle_drop("e2", "e4", None), DropOutcome::Snapback);
        assert_eq!(s.status(), GameStatus::Unknown);
    }

    #[test]
    fn test_undo_redo_bump_generation() {
        let mut s = session(r#"["e4", "e5"]"#, TrainerOptions::default());
        let DropOutcome::Accepted(Some(reply)) = s.handle_drop("e2", "e4", None) else {
            panic!("expected a scheduled reply");
        };
        assert!(s.undo());
        assert!(s.redo());
        assert_eq!(s.engine().step(), 1);
        assert_eq!(s.run_reply(&reply), None);
        assert_eq!(s.status(), GameStatus::Ongoing);
    }
}
