use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::model::BookingRequest;

/// Where booking requests come from. The session loop is agnostic to the
/// boundary — interactive prompts, a request body, a queue — as long as it
/// produces one request per call or signals end of input with `None`.
#[async_trait]
pub trait RequestSource: Send {
    async fn next_request(&mut self) -> Option<BookingRequest>;
}

/// Interactive boundary: prompts on stdout, reads one field per line.
pub struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    async fn prompt(&mut self, label: &str) -> Option<String> {
        self.stdout.write_all(label.as_bytes()).await.ok()?;
        self.stdout.flush().await.ok()?;
        let line = self.lines.next_line().await.ok()??;
        Some(line.trim().to_string())
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestSource for StdinSource {
    async fn next_request(&mut self) -> Option<BookingRequest> {
        let first_name = self.prompt("Enter your first name: ").await?;
        let last_name = self.prompt("Enter your last name: ").await?;
        let email = self.prompt("Enter your email: ").await?;
        let raw = self.prompt("Enter number of tickets: ").await?;
        // Non-numeric input falls through as 0 and fails the quantity check.
        let tickets = raw.parse().unwrap_or(0);
        Some(BookingRequest::new(first_name, last_name, email, tickets))
    }
}

/// In-memory source backed by a fixed queue of requests. Used by tests and
/// anywhere a scripted run is wanted.
pub struct ScriptedSource {
    queue: VecDeque<BookingRequest>,
}

impl ScriptedSource {
    pub fn new(requests: impl IntoIterator<Item = BookingRequest>) -> Self {
        Self {
            queue: requests.into_iter().collect(),
        }
    }

    pub fn remaining_requests(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl RequestSource for ScriptedSource {
    async fn next_request(&mut self) -> Option<BookingRequest> {
        self.queue.pop_front()
    }
}
