#[cfg(test)]
mod agent_test;

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use shared::error::{Error, Result};

use crate::message::{Message, TransactionId};

/// `Event` is pushed to the agent's caller once a transaction concludes,
/// either because a matching response arrived, the transaction was
/// explicitly stopped, or its deadline passed.
#[derive(Debug)]
pub struct Event {
    pub id: TransactionId,
    pub result: Result<Message>,
}

/// `ClientAgent` is the set of events the agent reacts to, matching the
/// sans-io style used throughout the workspace: callers drive state by
/// feeding in events and draining `poll_event`/`poll_timeout` afterwards.
pub enum ClientAgent {
    Process(Message),
    Start(TransactionId, Instant),
    Stop(TransactionId),
    Close,
    Collect(Instant),
}

struct AgentTransaction {
    deadline: Instant,
}

/// Agent is a STUN client transaction multiplexer (RFC5389 section 7.2.1):
/// it tracks in-flight transactions by transaction ID, matches incoming
/// responses against them, and raises timeouts for ones that take too long.
pub struct Agent {
    transactions: HashMap<TransactionId, AgentTransaction>,
    events: VecDeque<Event>,
    closed: bool,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent {
    pub fn new() -> Self {
        Agent {
            transactions: HashMap::new(),
            events: VecDeque::new(),
            closed: false,
        }
    }

    /// Registers a new transaction `id`, due to time out at `deadline`.
    pub fn start(&mut self, id: TransactionId, deadline: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        if self.transactions.contains_key(&id) {
            return Err(Error::ErrTransactionExists);
        }
        self.transactions.insert(id, AgentTransaction { deadline });
        Ok(())
    }

    /// Stops transaction `id`, delivering `ErrTransactionStopped` to its
    /// caller.
    pub fn stop(&mut self, id: TransactionId) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        if self.transactions.remove(&id).is_none() {
            return Err(Error::ErrTransactionNotExists);
        }
        self.events.push_back(Event {
            id,
            result: Err(Error::ErrTransactionStopped),
        });
        Ok(())
    }

    /// Matches an incoming message against its transaction, if any is still
    /// pending; unmatched messages are silently ignored (they may belong to
    /// a transaction this agent already gave up on).
    pub fn process(&mut self, m: Message) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        let id = m.transaction_id;
        if self.transactions.remove(&id).is_some() {
            self.events.push_back(Event { id, result: Ok(m) });
        }
        Ok(())
    }

    /// Times out every transaction whose deadline is at or before `now`.
    pub fn collect(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        let expired: Vec<TransactionId> = self
            .transactions
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.transactions.remove(&id);
            self.events.push_back(Event {
                id,
                result: Err(Error::ErrTransactionTimeOut),
            });
        }
        Ok(())
    }

    /// Closes the agent, failing every still-pending transaction.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        self.closed = true;
        let pending: Vec<TransactionId> = self.transactions.keys().copied().collect();
        for id in pending {
            self.transactions.remove(&id);
            self.events.push_back(Event {
                id,
                result: Err(Error::ErrAgentClosed),
            });
        }
        Ok(())
    }

    /// Single entry point driving the agent from a `ClientAgent` event,
    /// used by `Client`.
    pub fn handle_event(&mut self, e: ClientAgent) -> Result<()> {
        match e {
            ClientAgent::Process(m) => self.process(m),
            ClientAgent::Start(id, deadline) => self.start(id, deadline),
            ClientAgent::Stop(id) => self.stop(id),
            ClientAgent::Close => self.close(),
            ClientAgent::Collect(now) => self.collect(now),
        }
    }

    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Returns the earliest pending transaction's deadline, if any; callers
    /// should call `collect` no later than this.
    pub fn poll_timeout(&mut self) -> Option<Instant> {
        self.transactions.values().map(|t| t.deadline).min()
    }
}
