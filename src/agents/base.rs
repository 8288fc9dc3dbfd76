// Agent core: naming, directory, delivery and logs
//
// Delivery is a nested await chain. A send resolves the receiver in the
// sender's own directory, records the message on both sides and awaits the
// receiver's handler, so the reply flows straight back up the call stack.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use tracing::{debug, info, warn};

use super::errors::{AgentError, AgentResult};
use super::history::BoundedLog;
use super::messages::{ConversationRecord, Message, Payload};
use super::types::Reply;

/// Default nesting limit for one chain of agent-to-agent calls
pub const DEFAULT_MAX_HOPS: usize = 8;

/// Per-agent settings applied at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_hops: usize,
    /// `None` keeps every message for the process lifetime
    pub history_capacity: Option<usize>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            history_capacity: None,
        }
    }
}

/// Chain of agents a delivery has passed through
///
/// Threaded through every nested send; a send that would exceed `max_hops`
/// is rejected instead of recursing further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    chain: Vec<String>,
    max_hops: usize,
}

impl CallContext {
    pub fn root(origin: impl Into<String>, max_hops: usize) -> Self {
        Self {
            chain: vec![origin.into()],
            max_hops,
        }
    }

    /// Number of deliveries made so far in this chain
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn descend(&self, sender: &str, receiver: &str) -> AgentResult<Self> {
        if self.depth() >= self.max_hops {
            return Err(AgentError::HopLimitExceeded {
                limit: self.max_hops,
                sender: sender.to_string(),
                receiver: receiver.to_string(),
                chain: self.chain.join(" -> "),
            });
        }

        let mut chain = self.chain.clone();
        chain.push(receiver.to_string());
        Ok(Self {
            chain,
            max_hops: self.max_hops,
        })
    }
}

/// Peers an agent can address, by name
///
/// Holds non-owning references: the network that built the agents owns them.
/// Entries keep registration order and are one-directional.
#[derive(Clone, Default)]
pub struct Directory {
    entries: Vec<(String, Weak<dyn Agent>)>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer under its own name, replacing any previous entry
    pub fn register<A: Agent + 'static>(&mut self, agent: &Arc<A>) {
        let name = agent.name().to_string();
        let peer: Weak<A> = Arc::downgrade(agent);
        let peer: Weak<dyn Agent> = peer;

        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = peer,
            None => self.entries.push((name, peer)),
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .and_then(|(_, peer)| peer.upgrade())
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|(name, _)| name)).finish()
    }
}

/// State shared by every agent: name, peers, inbound log and history
pub struct AgentCore {
    name: String,
    max_hops: usize,
    directory: OnceLock<Directory>,
    inbox: Mutex<BoundedLog<Message>>,
    history: Mutex<BoundedLog<ConversationRecord>>,
}

impl AgentCore {
    pub fn new(name: impl Into<String>, settings: &AgentSettings) -> Self {
        Self {
            name: name.into(),
            max_hops: settings.max_hops,
            directory: OnceLock::new(),
            inbox: Mutex::new(BoundedLog::new(settings.history_capacity)),
            history: Mutex::new(BoundedLog::new(settings.history_capacity)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install the peer directory; only the first install takes effect
    pub fn install_directory(&self, directory: Directory) -> AgentResult<()> {
        let peers = directory.names();
        self.directory.set(directory).map_err(|_| {
            AgentError::NetworkAssembly(format!("directory for {} already installed", self.name))
        })?;
        info!(agent = %self.name, peers = ?peers, "Registered peers");
        Ok(())
    }

    pub fn peers(&self) -> Vec<String> {
        self.directory.get().map(Directory::names).unwrap_or_default()
    }

    /// Start a fresh call chain originating at this agent
    pub fn root_context(&self) -> CallContext {
        CallContext::root(self.name.clone(), self.max_hops)
    }

    /// Deliver a payload to a named peer and await its reply
    pub async fn send(
        &self,
        ctx: &CallContext,
        receiver: &str,
        payload: Payload,
    ) -> AgentResult<Reply> {
        let target = self
            .directory
            .get()
            .and_then(|directory| directory.resolve(receiver))
            .ok_or_else(|| AgentError::AgentNotFound(receiver.to_string()))?;
        let next = ctx.descend(&self.name, receiver)?;

        let message = Message::new(self.name.as_str(), receiver, payload);
        debug!(
            id = %message.id(),
            depth = next.depth(),
            "A2A {} -> {}: {}",
            self.name,
            receiver,
            message.kind()
        );
        self.record(&message);

        Ok(target.receive(&next, message).await)
    }

    /// Ask a peer a read-only question
    pub async fn query(&self, ctx: &CallContext, receiver: &str, text: &str) -> AgentResult<Reply> {
        self.send(ctx, receiver, Payload::query(text)).await
    }

    /// Send the same payload to every peer in registration order
    ///
    /// A failed delivery is logged and recorded as `None`; it never stops
    /// delivery to the remaining peers.
    pub async fn broadcast(
        &self,
        ctx: &CallContext,
        payload: Payload,
    ) -> BTreeMap<String, Option<Reply>> {
        let mut replies = BTreeMap::new();

        for peer in self.peers() {
            let reply = match self.send(ctx, &peer, payload.clone()).await {
                Ok(reply) => Some(reply),
                Err(e) => {
                    warn!(
                        sender = %self.name,
                        receiver = %peer,
                        error = %e,
                        "Broadcast delivery failed"
                    );
                    None
                }
            };
            replies.insert(peer, reply);
        }

        replies
    }

    /// Log an inbound message on the receiving side
    pub fn accept(&self, message: &Message) {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        self.record(message);
    }

    fn record(&self, message: &Message) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ConversationRecord::from(message));
    }

    pub fn history(&self) -> Vec<ConversationRecord> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn recent_history(&self, n: usize) -> Vec<ConversationRecord> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tail(n)
    }

    pub fn history_len(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn inbox(&self) -> Vec<Message> {
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }
}

impl std::fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCore")
            .field("name", &self.name)
            .field("max_hops", &self.max_hops)
            .field("peers", &self.peers())
            .finish()
    }
}

/// A named actor on the agent network
#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    /// Interpret a delivered message; the default acknowledges without acting
    async fn handle(&self, _ctx: &CallContext, _message: &Message) -> Reply {
        Reply::unhandled()
    }

    async fn receive(&self, ctx: &CallContext, message: Message) -> Reply {
        self.core().accept(&message);
        self.handle(ctx, &message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::messages::{ActionRequest, MessageKind};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts handler invocations and echoes the message kind
    struct Echo {
        core: AgentCore,
        handled: AtomicUsize,
    }

    impl Echo {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                core: AgentCore::new(name, &AgentSettings::default()),
                handled: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Agent for Echo {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn handle(&self, _ctx: &CallContext, message: &Message) -> Reply {
            self.handled.fetch_add(1, Ordering::SeqCst);
            Reply::ok().with("kind", message.kind())
        }
    }

    /// Forwards every query to a fixed peer, creating a cycle when paired
    struct Relay {
        core: AgentCore,
        peer: String,
    }

    #[async_trait]
    impl Agent for Relay {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn handle(&self, ctx: &CallContext, message: &Message) -> Reply {
            match self.core.send(ctx, &self.peer, message.payload().clone()).await {
                Ok(reply) => reply,
                Err(e) => Reply::from(e),
            }
        }
    }

    /// An agent with the default handler
    struct Silent {
        core: AgentCore,
    }

    impl Agent for Silent {
        fn core(&self) -> &AgentCore {
            &self.core
        }
    }

    fn wire(agent: &dyn Agent, peers: Vec<Arc<Echo>>) {
        let mut directory = Directory::new();
        for peer in &peers {
            directory.register(peer);
        }
        agent.core().install_directory(directory).unwrap();
    }

    #[tokio::test]
    async fn send_delivers_and_records_both_sides() {
        let sender = Echo::new("A");
        let receiver = Echo::new("B");
        wire(sender.as_ref(), vec![receiver.clone()]);

        let ctx = sender.core().root_context();
        let reply = sender
            .core()
            .send(&ctx, "B", Payload::request(ActionRequest::new("list")))
            .await
            .unwrap();

        assert_eq!(reply.get("kind"), Some(&json!("request")));
        assert_eq!(receiver.handled.load(Ordering::SeqCst), 1);
        assert_eq!(sender.core().history_len(), 1);
        assert_eq!(receiver.core().history_len(), 1);
        assert_eq!(receiver.core().inbox().len(), 1);
        assert_eq!(sender.core().history()[0].id, receiver.core().history()[0].id);
    }

    #[tokio::test]
    async fn unknown_receiver_is_a_routing_error() {
        let sender = Echo::new("A");
        let bystander = Echo::new("B");
        wire(sender.as_ref(), vec![bystander.clone()]);

        let ctx = sender.core().root_context();
        let result = sender.core().query(&ctx, "C", "anyone there").await;

        assert!(matches!(result, Err(AgentError::AgentNotFound(name)) if name == "C"));
        assert_eq!(bystander.handled.load(Ordering::SeqCst), 0);
        assert_eq!(sender.core().history_len(), 0);
        assert_eq!(bystander.core().history_len(), 0);
    }

    #[tokio::test]
    async fn send_before_assembly_is_a_routing_error() {
        let lonely = Echo::new("A");
        let ctx = lonely.core().root_context();
        assert!(matches!(
            lonely.core().query(&ctx, "B", "hello").await,
            Err(AgentError::AgentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn broadcast_reaches_every_peer_once_despite_failures() {
        let hub = Echo::new("Hub");
        let first = Echo::new("P1");
        let second = Echo::new("P2");
        let doomed = Echo::new("P3");
        wire(hub.as_ref(), vec![first.clone(), second.clone(), doomed.clone()]);
        drop(doomed);

        let ctx = hub.core().root_context();
        let replies = hub
            .core()
            .broadcast(&ctx, Payload::notification(json!({"event": "ready"})))
            .await;

        assert_eq!(replies.len(), 3);
        assert!(replies["P1"].is_some());
        assert!(replies["P2"].is_some());
        assert!(replies["P3"].is_none());
        assert_eq!(first.handled.load(Ordering::SeqCst), 1);
        assert_eq!(second.handled.load(Ordering::SeqCst), 1);
        assert_eq!(hub.core().history_len(), 2);
    }

    #[tokio::test]
    async fn cyclic_relay_stops_at_hop_limit() {
        let settings = AgentSettings {
            max_hops: 4,
            history_capacity: None,
        };
        let ping = Arc::new(Relay {
            core: AgentCore::new("Ping", &settings),
            peer: "Pong".to_string(),
        });
        let pong = Arc::new(Relay {
            core: AgentCore::new("Pong", &settings),
            peer: "Ping".to_string(),
        });

        let mut ping_dir = Directory::new();
        ping_dir.register(&pong);
        ping.core().install_directory(ping_dir).unwrap();
        let mut pong_dir = Directory::new();
        pong_dir.register(&ping);
        pong.core().install_directory(pong_dir).unwrap();

        let ctx = ping.core().root_context();
        let reply = ping.core().query(&ctx, "Pong", "loop").await.unwrap();

        assert!(reply.error_text().unwrap().starts_with("Hop limit of 4 exceeded"));
        assert_eq!(ping.core().history_len() + pong.core().history_len(), 8);
    }

    #[tokio::test]
    async fn registration_is_one_directional() {
        let a = Echo::new("A");
        let b = Echo::new("B");
        wire(a.as_ref(), vec![b.clone()]);
        b.core().install_directory(Directory::new()).unwrap();

        let ctx = b.core().root_context();
        assert!(a.core().peers().contains(&"B".to_string()));
        assert!(matches!(
            b.core().query(&ctx, "A", "hi").await,
            Err(AgentError::AgentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn default_handler_acknowledges() {
        let silent = Arc::new(Silent {
            core: AgentCore::new("Quiet", &AgentSettings::default()),
        });
        let caller = Echo::new("Caller");
        let mut directory = Directory::new();
        directory.register(&silent);
        caller.core().install_directory(directory).unwrap();

        let ctx = caller.core().root_context();
        let reply = caller.core().query(&ctx, "Quiet", "status").await.unwrap();

        assert_eq!(reply, Reply::unhandled());
        assert_eq!(silent.core().inbox()[0].kind(), MessageKind::Query);
    }

    #[test]
    fn directory_installs_once() {
        let agent = Echo::new("A");
        agent.core().install_directory(Directory::new()).unwrap();
        assert!(matches!(
            agent.core().install_directory(Directory::new()),
            Err(AgentError::NetworkAssembly(_))
        ));
    }

    #[test]
    fn directory_registers_concrete_agents_by_name() {
        let first = Echo::new("P1");
        let replacement = Echo::new("P1");
        let other = Echo::new("P2");

        let mut directory = Directory::new();
        directory.register(&first);
        directory.register(&other);
        directory.register(&replacement);

        assert_eq!(directory.names(), vec!["P1", "P2"]);
        let resolved = directory.resolve("P1").unwrap();
        assert!(std::ptr::eq(resolved.core(), replacement.core()));

        drop(other);
        assert!(directory.resolve("P2").is_none());
    }

    #[test]
    fn context_tracks_chain() {
        let root = CallContext::root("A", 2);
        let one = root.descend("A", "B").unwrap();
        let two = one.descend("B", "C").unwrap();

        assert_eq!(two.chain(), ["A", "B", "C"]);
        assert_eq!(two.depth(), 2);
        assert!(matches!(
            two.descend("C", "A"),
            Err(AgentError::HopLimitExceeded { limit: 2, .. })
        ));
    }
}
