use std::fmt::Display;
use std::pin::Pin;

use futures::stream::{self, BoxStream, Stream, StreamExt};

use crate::GenerateError;

struct LineReader<S> {
    inner: Pin<Box<S>>,
    buf: Vec<u8>,
    done: bool,
}

/// Re-chunk a byte stream into text lines without their terminators.
///
/// Handles `\n` and `\r\n`. A trailing line without a newline is still
/// yielded. A transport error ends the stream after being reported once.
pub(crate) fn lines<S, B, E>(inner: S) -> BoxStream<'static, Result<String, GenerateError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let reader = LineReader {
        inner: Box::pin(inner),
        buf: Vec::new(),
        done: false,
    };
    stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(pos) = reader.buf.iter().position(|b| *b == b'\n') {
                let mut line: Vec<u8> = reader.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Some((Ok(String::from_utf8_lossy(&line).into_owned()), reader));
            }
            if reader.done {
                if reader.buf.is_empty() {
                    return None;
                }
                let rest = std::mem::take(&mut reader.buf);
                return Some((Ok(String::from_utf8_lossy(&rest).into_owned()), reader));
            }
            match reader.inner.next().await {
                Some(Ok(bytes)) => reader.buf.extend_from_slice(bytes.as_ref()),
                Some(Err(e)) => {
                    reader.done = true;
                    reader.buf.clear();
                    return Some((Err(GenerateError::Unavailable(e.to_string())), reader));
                }
                None => reader.done = true,
            }
        }
    })
    .boxed()
}
