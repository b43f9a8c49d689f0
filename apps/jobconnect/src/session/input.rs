use std::io::{BufRead, Write};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::AppError;

/// Where human lines come from.
#[async_trait]
pub trait InputSource: Send {
    /// Shows `prompt` and waits for one line. `Ok(None)` at end of input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, AppError>;
}

/// Terminal input. A dedicated thread blocks on stdin and forwards each line, so
/// an interrupt can end the runtime without waiting for the next Enter.
pub struct StdinInput {
    lines: mpsc::Receiver<Result<String, AppError>>,
}

impl StdinInput {
    pub fn spawn() -> Result<Self, AppError> {
        let (tx, rx) = mpsc::channel(1);
        std::thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || forward_lines(std::io::stdin().lock(), tx))?;
        Ok(Self { lines: rx })
    }
}

/// Sends one item per line until end of input, a read failure, or the receiver
/// going away. A line that is not UTF-8 is reported and reading goes on.
fn forward_lines<R: BufRead>(mut reader: R, tx: mpsc::Sender<Result<String, AppError>>) {
    let mut raw = Vec::new();
    loop {
        raw.clear();
        let (item, last) = match reader.read_until(b'\n', &mut raw) {
            Ok(0) => return,
            Ok(_) => (decode_line(&raw), false),
            Err(e) => (Err(AppError::Io(e)), true),
        };
        if tx.blocking_send(item).is_err() || last {
            return;
        }
    }
}

fn decode_line(raw: &[u8]) -> Result<String, AppError> {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8(line.to_vec())
        .map_err(|_| AppError::Input("That line was not valid UTF-8 and was ignored.".to_string()))
}

#[async_trait]
impl InputSource for StdinInput {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        self.lines.recv().await.transpose()
    }
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn forwarded(bytes: &'static [u8]) -> Vec<Result<String, AppError>> {
        let (tx, mut rx) = mpsc::channel(16);
        forward_lines(Cursor::new(bytes), tx);
        let mut items = Vec::new();
        while let Some(item) = rx.blocking_recv() {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_decode_line_strips_line_endings() {
        assert_eq!(decode_line(b"find python\r\n").unwrap(), "find python");
        assert_eq!(decode_line(b"exit").unwrap(), "exit");
    }

    #[test]
    fn test_invalid_utf8_line_is_reported_and_reading_continues() {
        let items = forwarded(b"caf\xe9 jobs\nfind python\nexit\n");

        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], Err(AppError::Input(_))));
        assert_eq!(items[1].as_ref().unwrap(), "find python");
        assert_eq!(items[2].as_ref().unwrap(), "exit");
    }

    #[test]
    fn test_reader_exits_once_the_session_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        forward_lines(Cursor::new(&b"one\ntwo\nthree\n"[..]), tx);
    }

    #[test]
    fn test_reader_stops_at_end_of_input() {
        assert!(forwarded(b"").is_empty());
    }
}
