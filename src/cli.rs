//! CLI channel — stdin/stdout REPL for local testing.

use std::pin::Pin;

use futures::{Stream, StreamExt, stream};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::classifier::Classifier;

/// Command that ends the session.
pub const QUIT_COMMAND: &str = "/quit";

/// Stream of lines typed by the user.
pub type LineStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// A REPL that classifies each line read and writes the reply.
pub struct CliChannel<R> {
    reader: R,
}

impl CliChannel<BufReader<tokio::io::Stdin>> {
    /// A channel reading from stdin.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> CliChannel<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Turn the reader into a stream of lines, ending at EOF or on a read error.
    fn start(self) -> LineStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let reader = self.reader;

        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (line, rx))
        }))
    }

    /// Run the REPL until EOF or `/quit`, writing replies to `out`.
    pub async fn run<W>(self, classifier: &Classifier, out: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut lines = self.start();

        out.write_all(b"> ").await?;
        out.flush().await?;

        while let Some(line) = lines.next().await {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim() == QUIT_COMMAND {
                break;
            }
            if line.trim().is_empty() {
                out.write_all(b"> ").await?;
                out.flush().await?;
                continue;
            }

            let reply = classifier.classify(line);
            out.write_all(format!("\n{reply}\n\n> ").as_bytes()).await?;
            out.flush().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_session(input: &'static str) -> String {
        let channel = CliChannel::new(BufReader::new(input.as_bytes()));
        let mut out = Vec::new();
        channel.run(&Classifier::new(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn replies_to_each_line() {
        let output = run_session("banana\n2 + 2\n").await;
        assert!(output.contains("ananab"));
        assert!(output.contains("The result is: 4"));
    }

    #[tokio::test]
    async fn quit_stops_the_session() {
        let output = run_session("/quit\nbanana\n").await;
        assert!(!output.contains("ananab"));
    }

    #[tokio::test]
    async fn blank_lines_only_reprompt() {
        let output = run_session("\n   \n").await;
        assert_eq!(output, "> > > ");
    }
}
