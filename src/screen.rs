//! Per-screen request bookkeeping.
//!
//! Every screen action that calls the Assessment API goes through an
//! [`InFlight`] tracker: `begin` marks the action busy and hands out a
//! [`Ticket`] stamped with that action's current generation, `settle` clears
//! the busy flag and tells the screen whether the response still belongs to
//! it. Generations are kept per action: `restart` supersedes only the
//! restarted action (screen reload), so a reload never orphans or un-busies
//! a different action still in flight. `invalidate` supersedes everything.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ScreenError;

/// Short calendar date as the screens print it, e.g. `3/10/2024`.
pub fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// A named, re-invocable screen action.
pub trait Action: Copy + Eq + std::fmt::Debug {
    fn name(&self) -> &'static str;
}

/// Proof that an action was started at a given generation.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket<A> {
    action: A,
    epoch: u64,
    generation: u64,
}

impl<A: Action> Ticket<A> {
    pub fn action(&self) -> A {
        self.action
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A started request: its ticket plus the payload to send.
#[derive(Debug)]
pub struct Pending<A, P> {
    pub ticket: Ticket<A>,
    pub payload: P,
}

/// Busy flags and per-action request generations for one screen instance.
#[derive(Debug)]
pub struct InFlight<A> {
    /// Bumped by `invalidate`; orphans every outstanding ticket.
    epoch: u64,
    /// Generation of each action that has been restarted at least once.
    generations: Vec<(A, u64)>,
    busy: Vec<A>,
}

impl<A> Default for InFlight<A> {
    fn default() -> Self {
        Self {
            epoch: 0,
            generations: Vec::new(),
            busy: Vec::new(),
        }
    }
}

impl<A: Action> InFlight<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `action`, refusing if the same action is still pending.
    pub fn begin(&mut self, action: A) -> Result<Ticket<A>, ScreenError> {
        if self.busy.contains(&action) {
            return Err(ScreenError::Busy {
                action: action.name(),
            });
        }
        self.busy.push(action);
        Ok(self.ticket(action))
    }

    /// Finish a request. Returns `false` when the ticket has been
    /// superseded; the caller must then ignore the response.
    pub fn settle(&mut self, ticket: Ticket<A>) -> bool {
        let current = self.generation(ticket.action);
        if ticket.epoch != self.epoch || ticket.generation != current {
            debug!(
                action = ticket.action.name(),
                ticket_generation = ticket.generation,
                current_generation = current,
                "Discarding stale response"
            );
            return false;
        }
        self.busy.retain(|a| *a != ticket.action);
        true
    }

    pub fn is_busy(&self, action: A) -> bool {
        self.busy.contains(&action)
    }

    pub fn any_busy(&self) -> bool {
        !self.busy.is_empty()
    }

    /// Orphan the outstanding ticket of `action` (if any) and start it
    /// afresh. Other actions keep their tickets and busy flags.
    pub fn restart(&mut self, action: A) -> Ticket<A> {
        match self.generations.iter_mut().find(|(a, _)| *a == action) {
            Some((_, generation)) => *generation += 1,
            None => self.generations.push((action, 1)),
        }
        if !self.busy.contains(&action) {
            self.busy.push(action);
        }
        self.ticket(action)
    }

    /// Orphan every outstanding ticket and clear all busy flags.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.busy.clear();
    }

    /// Current generation of `action`.
    pub fn generation(&self, action: A) -> u64 {
        self.generations
            .iter()
            .find(|(a, _)| *a == action)
            .map_or(0, |(_, generation)| *generation)
    }

    fn ticket(&self, action: A) -> Ticket<A> {
        Ticket {
            action,
            epoch: self.epoch,
            generation: self.generation(action),
        }
    }
}
