use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use tracing::debug;

use super::error::ProbeError;
use super::types::{AttemptStage, SmtpEvent, SmtpReply};

const QUIT_CMD: &str = "QUIT";
/// Replies a session may wait for before `QUIT`: greeting, EHLO, HELO,
/// MAIL FROM, RCPT TO.
const SESSION_STEPS: u32 = 5;
const MAX_REPLY_LINES: usize = 64;
const MAX_LINE_LEN: usize = 1024;

/// One SMTP connection. Dropping the session sends `QUIT` if it was not sent
/// already, so every exit path of a probe releases the server cleanly.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    transcript: Vec<SmtpEvent>,
    command_timeout: Duration,
    // every reply before QUIT must complete by then
    deadline: Option<Instant>,
    closed: bool,
    // set after an I/O failure; QUIT is then sent without waiting for a reply
    broken: bool,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    return Self::from_stream(host, stream, command_timeout)
                        .map_err(|err| ProbeError::io(AttemptStage::Connect, err));
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(match last_err {
            Some(err) if err.kind() == io::ErrorKind::TimedOut => ProbeError::Timeout {
                stage: AttemptStage::Connect,
            },
            Some(err) => ProbeError::connect(host, err),
            None => ProbeError::NoAddress {
                host: host.to_string(),
            },
        })
    }

    fn from_stream(host: &str, stream: TcpStream, command_timeout: Duration) -> io::Result<Self> {
        stream.set_read_timeout(Some(command_timeout))?;
        stream.set_write_timeout(Some(command_timeout))?;
        let reader = BufReader::new(stream.try_clone()?);
        debug!(host, peer = ?stream.peer_addr().ok(), "connected");
        Ok(Self {
            host: host.to_string(),
            stream,
            reader,
            transcript: Vec::new(),
            command_timeout,
            deadline: command_timeout
                .checked_mul(SESSION_STEPS)
                .and_then(|budget| Instant::now().checked_add(budget)),
            closed: false,
            broken: false,
        })
    }

    pub(crate) fn read_greeting(&mut self) -> Result<SmtpReply, ProbeError> {
        self.receive(AttemptStage::Greeting)
    }

    /// Sends `command` and waits for the matching reply.
    pub(crate) fn command(
        &mut self,
        stage: AttemptStage,
        command: &str,
    ) -> Result<SmtpReply, ProbeError> {
        self.record(SmtpEvent::Sent {
            stage,
            command: command.to_string(),
        });
        if let Err(err) = self.write_line(command) {
            return Err(self.fail(stage, err));
        }
        self.receive(stage)
    }

    /// Best-effort `QUIT`; errors are recorded, never returned.
    pub(crate) fn quit(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.record(SmtpEvent::Sent {
            stage: AttemptStage::Quit,
            command: QUIT_CMD.to_string(),
        });
        match self.write_line(QUIT_CMD) {
            Ok(()) if !self.broken => match self.read_quit_reply() {
                Ok(reply) => self.record(SmtpEvent::Received {
                    stage: AttemptStage::Quit,
                    reply,
                }),
                Err(err) => self.record(SmtpEvent::Error {
                    stage: AttemptStage::Quit,
                    message: err.to_string(),
                }),
            },
            Ok(()) => {}
            Err(err) => self.record(SmtpEvent::Error {
                stage: AttemptStage::Quit,
                message: err.to_string(),
            }),
        }
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// Compact `stage:code` rendering of the exchange, e.g.
    /// `greeting:220 EHLO:250 MAIL FROM:250 RCPT TO:550 QUIT:221`.
    pub(crate) fn dialogue(&self) -> String {
        self.transcript
            .iter()
            .filter_map(|event| match event {
                SmtpEvent::Sent { .. } => None,
                SmtpEvent::Received { stage, reply } => Some(format!("{stage}:{}", reply.code)),
                SmtpEvent::Error { stage, .. } => Some(format!("{stage}:error")),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn read_quit_reply(&mut self) -> io::Result<SmtpReply> {
        let deadline = Instant::now().checked_add(self.command_timeout);
        self.stream.set_read_timeout(Some(self.command_timeout))?;
        read_reply(&mut self.reader, deadline)
    }

    fn receive(&mut self, stage: AttemptStage) -> Result<SmtpReply, ProbeError> {
        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.fail(stage, deadline_exceeded()));
            }
            if let Err(err) = self
                .stream
                .set_read_timeout(Some(remaining.min(self.command_timeout)))
            {
                return Err(self.fail(stage, err));
            }
        }
        match read_reply(&mut self.reader, self.deadline) {
            Ok(reply) => {
                self.record(SmtpEvent::Received {
                    stage,
                    reply: reply.clone(),
                });
                Ok(reply)
            }
            Err(err) => Err(self.fail(stage, err)),
        }
    }

    fn fail(&mut self, stage: AttemptStage, err: io::Error) -> ProbeError {
        self.broken = true;
        self.record(SmtpEvent::Error {
            stage,
            message: err.to_string(),
        });
        ProbeError::io(stage, err)
    }

    fn write_line(&mut self, command: &str) -> io::Result<()> {
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()
    }

    fn record(&mut self, event: SmtpEvent) {
        match &event {
            SmtpEvent::Sent { command, .. } => debug!(host = %self.host, "C: {command}"),
            SmtpEvent::Received { reply, .. } => debug!(host = %self.host, "S: {reply}"),
            SmtpEvent::Error { stage, message } => {
                debug!(host = %self.host, %stage, "error: {message}")
            }
        }
        self.transcript.push(event);
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        self.quit();
    }
}

fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "session deadline exceeded")
}

/// Reads one (possibly multi-line) SMTP reply. Fails with `TimedOut` once
/// `deadline` has passed and with `InvalidData` on oversized replies.
pub(crate) fn read_reply<R: BufRead>(
    reader: &mut R,
    deadline: Option<Instant>,
) -> io::Result<SmtpReply> {
    let mut code = None;
    let mut message_lines = Vec::new();
    loop {
        if message_lines.len() >= MAX_REPLY_LINES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply longer than {MAX_REPLY_LINES} lines"),
            ));
        }
        let mut raw = read_line_bounded(reader, deadline)?;
        if raw.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            ));
        }
        if raw.ends_with('\n') {
            raw.pop();
            if raw.ends_with('\r') {
                raw.pop();
            }
        }

        if raw.len() < 3 || !raw.is_char_boundary(3) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP reply: '{raw}'"),
            ));
        }
        let code_part = &raw[..3];
        let parsed_code = code_part.parse::<u16>().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid SMTP status code: '{code_part}'"),
            )
        })?;
        if let Some(existing) = code {
            if existing != parsed_code {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "inconsistent SMTP reply codes: {} vs {}",
                        existing, parsed_code
                    ),
                ));
            }
        } else {
            code = Some(parsed_code);
        }
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        let text = raw.get(4..).unwrap_or_default().to_string();
        message_lines.push(text);
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
        })?,
        message: message_lines.join("\n"),
    })
}

fn read_line_bounded<R: BufRead>(reader: &mut R, deadline: Option<Instant>) -> io::Result<String> {
    let mut line = Vec::new();
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(deadline_exceeded());
        }
        let available = reader.fill_buf()?;
        if available.is_empty() {
            break;
        }
        let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (&available[..=end], true),
            None => (available, false),
        };
        let used = chunk.len();
        line.extend_from_slice(chunk);
        reader.consume(used);
        if line.len() > MAX_LINE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("SMTP reply line longer than {MAX_LINE_LEN} bytes"),
            ));
        }
        if done {
            break;
        }
    }
    String::from_utf8(line).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
