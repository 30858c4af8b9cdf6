use std::sync::Arc;

use chess_core::{AuthorityError, AuthorityFactory, MoveResult, MoveSpec, PositionAuthority};

/// One scripted transition: in `before`, `san` (or the `origin`-`destination`
/// drag) leads to `after`.
#[derive(Clone)]
pub struct Step {
    pub before: &'static str,
    pub san: &'static str,
    pub origin: &'static str,
    pub destination: &'static str,
    pub after: &'static str,
}

/// Rules authority that only knows the transitions it was given.
pub struct ScriptedAuthority {
    position: String,
    stack: Vec<String>,
    steps: Arc<Vec<Step>>,
    mates: Arc<Vec<&'static str>>,
}

impl PositionAuthority for ScriptedAuthority {
    fn apply_move(&mut self, spec: &MoveSpec) -> Result<Option<MoveResult>, AuthorityError> {
        let found = self.steps.iter().find(|s| {
            s.before == self.position
                && match spec {
                    MoveSpec::Notation(token) => token == s.san,
                    MoveSpec::Coordinates {
                        origin,
                        destination,
                        ..
                    } => origin == s.origin && destination == s.destination,
                }
        });
        let Some(step) = found.cloned() else {
            return Ok(None);
        };
        self.stack.push(std::mem::replace(&mut self.position, step.after.to_string()));
        Ok(Some(MoveResult {
            origin: step.origin.to_string(),
            destination: step.destination.to_string(),
            promotion: None,
            notation: step.san.to_string(),
        }))
    }

    fn serialize(&self) -> String {
        self.position.clone()
    }

    fn undo_last_move(&mut self) -> bool {
        match self.stack.pop() {
            Some(previous) => {
                self.position = previous;
                true
            }
            None => false,
        }
    }

    fn is_checkmate(&self) -> Result<bool, AuthorityError> {
        Ok(self.mates.contains(&self.position.as_str()))
    }
}

pub struct ScriptedFactory {
    steps: Arc<Vec<Step>>,
    mates: Arc<Vec<&'static str>>,
}

impl ScriptedFactory {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(steps),
            mates: Arc::new(Vec::new()),
        }
    }

    pub fn with_mates(mut self, mates: Vec<&'static str>) -> Self {
        self.mates = Arc::new(mates);
        self
    }
}

impl AuthorityFactory for ScriptedFactory {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn create(&self, position: &str) -> Result<Box<dyn PositionAuthority>, AuthorityError> {
        Ok(Box::new(ScriptedAuthority {
            position: position.to_string(),
            stack: Vec::new(),
            steps: Arc::clone(&self.steps),
            mates: Arc::clone(&self.mates),
        }))
    }
}

/// `start` -d4-> `after-d4` -d5-> `after-d5`.
pub fn queens_pawn() -> Arc<dyn AuthorityFactory> {
    Arc::new(ScriptedFactory::new(vec![
        Step { before: "start", san: "d4", origin: "d2", destination: "d4", after: "after-d4" },
        Step { before: "after-d4", san: "d5", origin: "d7", destination: "d5", after: "after-d5" },
        Step { before: "start", san: "Nf3", origin: "g1", destination: "f3", after: "after-nf3" },
    ]))
}

pub fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}
