use bytes::{BufMut, Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll, ready},
};

/// A [`Body`] that consist of a single chunk.
#[derive(Clone, Debug, Default)]
pub struct Full {
    data: Bytes,
}

impl Full {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl Body for Full {
    type Data = Bytes;

    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let me = self.get_mut();
        if me.data.is_empty() {
            return Poll::Ready(None);
        }
        Poll::Ready(Some(Ok(Frame::data(std::mem::take(&mut me.data)))))
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.data.len().try_into().unwrap_or(u64::MAX))
    }
}

// ===== Collect =====

/// Upper bound of the buffer allocated before any data arrives.
const MAX_PREALLOC: u64 = 64 * 1024;

/// Future that buffers every data frame of a body, trailers are discarded.
///
/// The size hint sizes the initial buffer up to 64 KiB, the buffer grows as data arrives.
#[derive(Debug)]
pub struct Collect<B> {
    body: B,
    buffer: BytesMut,
}

impl<B: Body + Unpin> Collect<B> {
    pub fn new(body: B) -> Self {
        let size_hint = body.size_hint();
        let capacity = size_hint.upper().unwrap_or(size_hint.lower()).min(MAX_PREALLOC);
        Self {
            body,
            buffer: BytesMut::with_capacity(capacity.try_into().unwrap_or(0)),
        }
    }
}

impl<B: Body + Unpin> Future for Collect<B> {
    type Output = Result<Bytes, B::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();

        loop {
            let Some(frame) = ready!(Pin::new(&mut me.body).poll_frame(cx)) else {
                return Poll::Ready(Ok(std::mem::take(&mut me.buffer).freeze()));
            };

            if let Ok(data) = frame?.into_data() {
                me.buffer.put(data);
            }
        }
    }
}
