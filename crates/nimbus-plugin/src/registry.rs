// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command registry mapping command names to handlers.
//!
//! The registry is built once at startup and injected wherever dispatch
//! happens; it is never a process global. A missing name is reported as
//! [`ExecuteOutcome::NotFound`] so the router can fall back to its
//! built-in command table, while handler failures propagate as errors.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use nimbus_core::{CommandContext, CommandHandler, NimbusError};

/// Result of asking the registry to run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// A registered handler ran (successfully).
    Handled,
    /// No handler is registered under this name.
    NotFound,
}

/// Registry of named command handlers.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its own name. Re-registering the same
    /// name replaces the previous handler (last write wins).
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        let name = handler.name().to_string();
        debug!(command = %name, "registered command handler");
        self.handlers.insert(name, handler);
    }

    /// Look up a handler by command name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(name)
    }

    /// All registered command names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute the handler registered under `name`.
    ///
    /// Returns `NotFound` when the name is unregistered; handler errors
    /// propagate to the caller, which owns logging and the user-facing
    /// failure reply.
    pub async fn execute(
        &self,
        name: &str,
        ctx: &CommandContext,
    ) -> Result<ExecuteOutcome, NimbusError> {
        match self.handlers.get(name) {
            Some(handler) => {
                handler.handle(ctx).await?;
                Ok(ExecuteOutcome::Handled)
            }
            None => Ok(ExecuteOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler for CountingHandler {
        fn name(&self) -> &str {
            self.name
        }

        async fn handle(&self, _ctx: &CommandContext) -> Result<(), NimbusError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl CommandHandler for FailingHandler {
        fn name(&self) -> &str {
            "boom"
        }

        async fn handle(&self, _ctx: &CommandContext) -> Result<(), NimbusError> {
            Err(NimbusError::Internal("handler exploded".into()))
        }
    }

    fn make_ctx() -> CommandContext {
        nimbus_test_support::context("ping", "")
    }

    // Minimal inline context builder; the full mock lives in nimbus-test-utils,
    // which depends on this crate and cannot be used here.
    mod nimbus_test_support {
        use super::*;
        use nimbus_core::{
            GroupMetadata, InboundEvent, Jid, MediaRef, MessageContent, MessageKey,
            OutboundPayload, ProtocolClient, SendOptions,
        };

        struct NullSocket;

        #[async_trait]
        impl ProtocolClient for NullSocket {
            fn self_jid(&self) -> Jid {
                Jid::new("bot@s.whatsapp.net")
            }

            async fn send(
                &self,
                _to: &Jid,
                _payload: OutboundPayload,
                _options: SendOptions,
            ) -> Result<(), NimbusError> {
                Ok(())
            }

            async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, NimbusError> {
                Ok(GroupMetadata {
                    jid: group.clone(),
                    subject: "Test Group".into(),
                    participants: Vec::new(),
                })
            }

            async fn download_media(&self, _media: &MediaRef) -> Result<Vec<u8>, NimbusError> {
                Ok(Vec::new())
            }

            async fn close(&self) -> Result<(), NimbusError> {
                Ok(())
            }
        }

        pub fn context(command: &str, args: &str) -> CommandContext {
            let jid = Jid::new("254712345678@s.whatsapp.net");
            CommandContext {
                event: InboundEvent {
                    key: MessageKey {
                        id: "MSG".into(),
                        remote_jid: jid.clone(),
                        from_me: false,
                        participant: None,
                    },
                    from: jid.clone(),
                    sender: jid,
                    is_group: false,
                    is_self: false,
                    push_name: "User".into(),
                    content: MessageContent::Text(format!(".{command} {args}")),
                    view_once: false,
                    quoted_media: None,
                },
                command: command.into(),
                args: args.into(),
                socket: Arc::new(NullSocket),
            }
        }
    }

    #[tokio::test]
    async fn execute_runs_registered_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(CountingHandler {
            name: "ping",
            calls: calls.clone(),
        }));

        let outcome = registry.execute("ping", &make_ctx()).await.expect("execute");
        assert_eq!(outcome, ExecuteOutcome::Handled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_reports_not_found_without_error() {
        let registry = CommandRegistry::new();
        let outcome = registry.execute("ghost", &make_ctx()).await.expect("execute");
        assert_eq!(outcome, ExecuteOutcome::NotFound);
    }

    #[tokio::test]
    async fn handler_errors_propagate() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(FailingHandler));
        let err = registry.execute("boom", &make_ctx()).await.unwrap_err();
        assert!(err.to_string().contains("handler exploded"));
    }

    #[test]
    fn register_same_name_overwrites() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(CountingHandler {
            name: "ping",
            calls: first,
        }));
        registry.register(Arc::new(CountingHandler {
            name: "ping",
            calls: second,
        }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list(), vec!["ping".to_string()]);
    }
}
