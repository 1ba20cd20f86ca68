use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use routa_core::session::SessionState;

/// What the chat layer can deliver: free text (button taps echo their label
/// as text), a structured contact capture, or a forwarded-identity hint used
/// during driver/admin addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    Text(String),
    Contact { phone: String },
    Forwarded { id: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub participant: i64,
    pub payload: EventPayload,
}

/// Prompt text plus suggested reply options, rendered by the transport. The
/// keyboard is rows of button labels; tapping one sends its label back as
/// text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<String>>,
    pub state: SessionState,
}

impl Reply {
    /// `state` is stamped by the engine once the handler has run.
    pub fn new(text: impl Into<String>, keyboard: Vec<Vec<String>>) -> Self {
        Self { text: text.into(), keyboard, state: SessionState::Idle }
    }
}

/// Boundary to any messaging platform. Real chat adapters live outside this
/// repository; the console transport below covers local runs.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, participant: i64, reply: &Reply) -> anyhow::Result<()>;

    /// Start listening for inbound events (long-running).
    async fn listen(&self, tx: mpsc::Sender<InboundEvent>) -> anyhow::Result<()>;
}

/// Console transport: stdin/stdout, always available. `/contact <phone>`
/// simulates a contact capture, `/forward <id>` a forwarded identity,
/// `/quit` exits.
pub struct ConsoleTransport {
    participant: i64,
}

impl ConsoleTransport {
    pub fn new(participant: i64) -> Self {
        Self { participant }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, _participant: i64, reply: &Reply) -> anyhow::Result<()> {
        println!("{}", reply.text);
        for row in &reply.keyboard {
            println!("  {}", row.iter().map(|b| format!("[{b}]")).collect::<Vec<_>>().join(" "));
        }
        Ok(())
    }

    async fn listen(&self, tx: mpsc::Sender<InboundEvent>) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if line == "/quit" || line == "/exit" {
                break;
            }

            let payload = if let Some(phone) = line.strip_prefix("/contact ") {
                EventPayload::Contact { phone: phone.trim().to_string() }
            } else if let Some(id) = line.strip_prefix("/forward ") {
                match id.trim().parse() {
                    Ok(id) => EventPayload::Forwarded { id },
                    Err(_) => {
                        println!("usage: /forward <numeric id>");
                        continue;
                    }
                }
            } else {
                EventPayload::Text(line)
            };

            let event = InboundEvent { participant: self.participant, payload };
            if tx.send(event).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}
