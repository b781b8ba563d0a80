//! Pull-based access to synthesized audio.

use bytes::Bytes;
use tracing::debug;

use super::base::{
    AudioChunkReceiver, CancellationDetails, CancellationErrorCode, ResultReason, SynthesisResult,
    TTSError, TTSResult,
};

/// Read buffer size used when draining a stream.
pub const AUDIO_READ_CHUNK_SIZE: usize = 2048;

/// Audio of one synthesis result, read in caller-sized pieces.
///
/// Built from a started result the stream follows the live audio channel until
/// the synthesizer closes it. Built from a completed result it replays the
/// buffered payload.
#[derive(Debug)]
pub struct AudioDataStream {
    receiver: Option<AudioChunkReceiver>,
    pending: Bytes,
    finished: bool,
    bytes_read: usize,
}

impl AudioDataStream {
    /// Creates a stream from a synthesis result.
    ///
    /// Canceled results carry no audio and yield [`TTSError::Canceled`].
    pub fn from_result(mut result: SynthesisResult) -> TTSResult<Self> {
        if result.reason == ResultReason::Canceled {
            let details = result.cancellation.take().unwrap_or_else(|| {
                CancellationDetails::error(
                    CancellationErrorCode::RuntimeError,
                    "result was canceled without details",
                )
            });
            return Err(TTSError::Canceled(details));
        }

        let receiver = result.take_audio_stream();
        let pending = Bytes::from(std::mem::take(&mut result.audio_data));

        Ok(Self {
            receiver,
            pending,
            finished: false,
            bytes_read: 0,
        })
    }

    /// Reads up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` at end of stream. Errors raised by the synthesizer while
    /// the audio was arriving are returned once, after which the stream is
    /// finished.
    pub async fn read(&mut self, buf: &mut [u8]) -> TTSResult<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.pending.is_empty() {
                let n = buf.len().min(self.pending.len());
                let chunk = self.pending.split_to(n);
                buf[..n].copy_from_slice(&chunk);
                self.bytes_read += n;
                return Ok(n);
            }

            if self.finished {
                return Ok(0);
            }

            let Some(receiver) = self.receiver.as_mut() else {
                self.finished = true;
                continue;
            };

            match receiver.recv().await {
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(e)) => {
                    self.finished = true;
                    self.receiver = None;
                    return Err(e);
                }
                None => {
                    debug!("Audio stream closed after {} bytes", self.bytes_read);
                    self.finished = true;
                    self.receiver = None;
                }
            }
        }
    }

    /// Drains the stream through a [`AUDIO_READ_CHUNK_SIZE`] buffer.
    pub async fn read_to_end(&mut self) -> TTSResult<Vec<u8>> {
        let mut all_audio = Vec::new();
        let mut chunk = [0u8; AUDIO_READ_CHUNK_SIZE];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            all_audio.extend_from_slice(&chunk[..n]);
        }
        Ok(all_audio)
    }

    /// Total bytes handed out by `read` so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn streaming_result(chunks: Vec<TTSResult<Bytes>>) -> SynthesisResult {
        let (tx, rx) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            tx.try_send(chunk).unwrap();
        }
        SynthesisResult::started(rx)
    }

    #[tokio::test]
    async fn test_read_buffered_result_in_pieces() {
        let result = SynthesisResult::completed((0u8..10).collect());
        let mut stream = AudioDataStream::from_result(result).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).await.unwrap(), 4);
        assert_eq!(buf, [0, 1, 2, 3]);
        assert_eq!(stream.read(&mut buf).await.unwrap(), 4);
        assert_eq!(stream.read(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], &[8, 9]);
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
        assert_eq!(stream.bytes_read(), 10);
    }

    #[tokio::test]
    async fn test_read_spans_channel_chunks() {
        let result = streaming_result(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defgh")),
        ]);
        let mut stream = AudioDataStream::from_result(result).unwrap();

        let audio = stream.read_to_end().await.unwrap();
        assert_eq!(audio, b"abcdefgh");
        assert_eq!(stream.bytes_read(), 8);
    }

    #[tokio::test]
    async fn test_read_to_end_counts_every_byte() {
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let chunks = payload
            .chunks(700)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        let mut stream = AudioDataStream::from_result(streaming_result(chunks)).unwrap();

        let audio = stream.read_to_end().await.unwrap();
        assert_eq!(audio.len(), 5000);
        assert_eq!(audio, payload);
    }

    #[tokio::test]
    async fn test_stream_error_is_reported_once() {
        let result = streaming_result(vec![
            Ok(Bytes::from_static(b"ok")),
            Err(TTSError::NetworkError("connection reset".to_string())),
        ]);
        let mut stream = AudioDataStream::from_result(result).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(stream.read(&mut buf).await.unwrap(), 2);
        assert!(matches!(
            stream.read(&mut buf).await,
            Err(TTSError::NetworkError(_))
        ));
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_canceled_result_has_no_stream() {
        let details = CancellationDetails::error(CancellationErrorCode::Forbidden, "denied");
        let err = AudioDataStream::from_result(SynthesisResult::canceled(details.clone()))
            .unwrap_err();
        match err {
            TTSError::Canceled(got) => assert_eq!(got, details),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
