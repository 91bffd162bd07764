//! STOMP 1.2 frame subset
//!
//! Only the commands this client exchanges with the broker are modeled.
//! A frame is a command line, `key:value` header lines, a blank line, an
//! optional body, and a trailing NUL.

use std::collections::HashMap;
use std::fmt;

/// STOMP commands used by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Client opens a session (client only)
    Connect,
    /// Broker confirms the session (server only)
    Connected,
    /// Client subscribes to a destination (client only)
    Subscribe,
    /// Client cancels a subscription (client only)
    Unsubscribe,
    /// Client publishes to a destination (client only)
    Send,
    /// Broker delivers a message for a subscription (server only)
    Message,
    /// Broker reports an error (server only)
    Error,
    /// Client closes the session (client only)
    Disconnect,
}

impl Command {
    /// Parse a command line
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CONNECT" => Some(Self::Connect),
            "CONNECTED" => Some(Self::Connected),
            "SUBSCRIBE" => Some(Self::Subscribe),
            "UNSUBSCRIBE" => Some(Self::Unsubscribe),
            "SEND" => Some(Self::Send),
            "MESSAGE" => Some(Self::Message),
            "ERROR" => Some(Self::Error),
            "DISCONNECT" => Some(Self::Disconnect),
            _ => None,
        }
    }

    /// Get the wire name of this command
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Message => "MESSAGE",
            Self::Error => "ERROR",
            Self::Disconnect => "DISCONNECT",
        }
    }

    /// Check if this command can be sent by the client
    #[must_use]
    pub const fn is_client_command(self) -> bool {
        matches!(
            self,
            Self::Connect | Self::Subscribe | Self::Unsubscribe | Self::Send | Self::Disconnect
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One STOMP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Frame {
    /// Create a frame with no headers or body
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// Add a header (builder style)
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body (builder style)
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a header value
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    // === Client frame constructors ===

    /// CONNECT with a bearer credential attached to the handshake
    #[must_use]
    pub fn connect(token: &str) -> Self {
        Self::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("heart-beat", "0,0")
            .header("Authorization", format!("Bearer {token}"))
    }

    /// SUBSCRIBE to a destination under a client-chosen subscription id
    #[must_use]
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(Command::Subscribe)
            .header("id", id)
            .header("destination", destination)
    }

    /// UNSUBSCRIBE a previously subscribed id
    #[must_use]
    pub fn unsubscribe(id: &str) -> Self {
        Self::new(Command::Unsubscribe).header("id", id)
    }

    /// SEND a JSON body to a destination
    #[must_use]
    pub fn send(destination: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", body.len().to_string())
            .with_body(body)
    }

    /// DISCONNECT the session
    #[must_use]
    pub fn disconnect() -> Self {
        Self::new(Command::Disconnect)
    }

    // === Wire codec ===

    /// Encode to the wire text representation
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push_str(self.command.name());
        out.push('\n');
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse a frame from its wire text representation
    pub fn parse(raw: &str) -> Result<Self, FrameParseError> {
        // Heartbeat frames are bare newlines; callers filter those out first
        let raw = raw.trim_end_matches('\0');
        let mut lines = raw.split('\n');

        let command_line = lines.next().unwrap_or("").trim_end_matches('\r');
        let command = Command::from_name(command_line)
            .ok_or_else(|| FrameParseError::UnknownCommand(command_line.to_string()))?;

        let mut headers = HashMap::new();
        for line in lines.by_ref() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FrameParseError::MalformedHeader(line.to_string()))?;
            // First occurrence wins, per STOMP repeated-header rules
            headers
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }

        let body: String = lines.collect::<Vec<_>>().join("\n");

        Ok(Self {
            command,
            headers,
            body,
        })
    }

    /// Check if a raw websocket text payload is a STOMP heartbeat
    #[must_use]
    pub fn is_heartbeat(raw: &str) -> bool {
        raw.trim_matches(['\n', '\r', '\0']).is_empty()
    }
}

/// Frame parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameParseError {
    #[error("Unknown STOMP command: {0:?}")]
    UnknownCommand(String),

    #[error("Malformed header line: {0:?}")]
    MalformedHeader(String),
}
