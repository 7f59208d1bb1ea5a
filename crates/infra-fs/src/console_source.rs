// Interactive price source
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;

use pricecalc_core::domain::{parse_price, Record};
use pricecalc_core::port::{PriceSource, SourceError};

const ORIGIN: &str = "console";

/// Prompts for id, title and price of each item in turn
///
/// An empty id (or end of input) finishes the list. The reader sits behind
/// a shared lock so several jobs can prompt on the same stdin one after
/// another without losing buffered input.
pub struct ConsolePriceSource<R, W> {
    reader: Arc<Mutex<R>>,
    writer: W,
}

impl ConsolePriceSource<BufReader<Stdin>, Stdout> {
    /// Source over the process stdin/stdout
    pub fn stdio(stdin: Arc<Mutex<BufReader<Stdin>>>) -> Self {
        Self::new(stdin, tokio::io::stdout())
    }
}

impl<R, W> ConsolePriceSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: Arc<Mutex<R>>, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn from_reader(reader: R, writer: W) -> Self {
        Self::new(Arc::new(Mutex::new(reader)), writer)
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> PriceSource for ConsolePriceSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read(&mut self) -> Result<Vec<Record>, SourceError> {
        let reader = Arc::clone(&self.reader);
        let mut input = reader.lock().await;

        write_line(&mut self.writer, "Enter items (leave the id empty to finish).\n").await?;

        let mut records = Vec::new();
        let mut entry: u64 = 0;
        loop {
            entry += 1;

            let id = match prompt(&mut *input, &mut self.writer, "Item id").await? {
                Some(id) if !id.is_empty() => id,
                _ => break,
            };
            let title = prompt(&mut *input, &mut self.writer, "Title")
                .await?
                .ok_or_else(|| malformed(entry, "input ended before the title"))?;
            let raw_price = prompt(&mut *input, &mut self.writer, "Price")
                .await?
                .ok_or_else(|| malformed(entry, "input ended before the price"))?;

            let price = parse_price(&raw_price).map_err(|e| malformed(entry, e.to_string()))?;
            let record = Record::new(id, title, price).map_err(|e| malformed(entry, e.to_string()))?;
            records.push(record);
        }

        Ok(records)
    }

    fn describe(&self) -> String {
        ORIGIN.to_string()
    }
}

/// Print a prompt and read one trimmed line; `None` at end of input
async fn prompt<R, W>(reader: &mut R, writer: &mut W, label: &str) -> Result<Option<String>, SourceError>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    write_line(writer, &format!("{}: ", label)).await?;

    let mut line = String::new();
    let read = reader.read_line(&mut line).await.map_err(unavailable)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn write_line<W>(writer: &mut W, text: &str) -> Result<(), SourceError>
where
    W: AsyncWrite + Unpin + Send,
{
    writer.write_all(text.as_bytes()).await.map_err(unavailable)?;
    writer.flush().await.map_err(unavailable)
}

fn unavailable(err: std::io::Error) -> SourceError {
    SourceError::Unavailable {
        origin: ORIGIN.to_string(),
        reason: err.to_string(),
    }
}

fn malformed(entry: u64, reason: impl Into<String>) -> SourceError {
    SourceError::MalformedRecord {
        origin: ORIGIN.to_string(),
        entry,
        reason: reason.into(),
    }
}
