//! Answers the service-side message catalogue.
//!
//! Only messages a client sends to the service are handled: authentication,
//! client ready, shutdown requests, password replies and reconfiguration.
//! Intents the service itself sends to clients (`Shutdown`, password requests,
//! reconfiguration denials) are answered `UnknownMessage`.

use communication_core::data::{
    AuthenticationResponse, Message, PasswordReplyMessage, Response, SimpleMessagePurport,
    SimpleResponsePurport,
};
use communication_core::host::RequestHandler;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;
use uuid::Uuid;

/// Request handler for the enforcement service.
///
/// Cheap to clone; clones share state, so the binary keeps one to watch for
/// shutdown while the host owns another.
#[derive(Clone)]
pub struct ServiceRequestHandler {
    process_id: u32,
    client_ready: Arc<AtomicBool>,
    password_replies: Arc<Mutex<HashMap<Uuid, PasswordReplyMessage>>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ServiceRequestHandler {
    pub fn new() -> Self {
        Self::with_process_id(std::process::id())
    }

    pub fn with_process_id(process_id: u32) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            process_id,
            client_ready: Arc::new(AtomicBool::new(false)),
            password_replies: Arc::new(Mutex::new(HashMap::new())),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn is_client_ready(&self) -> bool {
        self.client_ready.load(Ordering::SeqCst)
    }

    /// Remove and return the client's answer to a password request.
    pub fn take_password_reply(&self, request_id: Uuid) -> Option<PasswordReplyMessage> {
        self.password_replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id)
    }

    /// Receiver that flips to `true` once a client sent `RequestShutdown`.
    pub fn shutdown_requested(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    fn request_shutdown(&self) {
        info!("Shutdown requested by client");
        self.shutdown.send_replace(true);
    }
}

impl Default for ServiceRequestHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestHandler for ServiceRequestHandler {
    async fn handle(&self, message: Message) -> Option<Response> {
        debug!("Handling {}", message.kind());

        let response = match message {
            Message::Simple(simple) => match simple.purport {
                SimpleMessagePurport::Authenticate => Response::from(AuthenticationResponse {
                    process_id: self.process_id,
                }),
                SimpleMessagePurport::ClientIsReady => {
                    info!("Client reported ready");
                    self.client_ready.store(true, Ordering::SeqCst);
                    Response::acknowledged()
                }
                SimpleMessagePurport::RequestShutdown => {
                    self.request_shutdown();
                    Response::acknowledged()
                }
                purport => {
                    warn!("No handler for {purport:?}");
                    Response::simple(SimpleResponsePurport::UnknownMessage)
                }
            },
            Message::PasswordReply(reply) => {
                info!(
                    "Password reply for request {} (success: {})",
                    reply.request_id, reply.success
                );
                self.password_replies
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(reply.request_id, reply);
                Response::acknowledged()
            }
            Message::Reconfiguration(reconfiguration) => {
                info!(
                    "Reconfiguration requested: {} from {}",
                    reconfiguration.configuration_path, reconfiguration.resource_url
                );
                Response::acknowledged()
            }
            other => {
                warn!("No handler for {}", other.kind());
                Response::simple(SimpleResponsePurport::UnknownMessage)
            }
        };

        Some(response)
    }
}
