//! Minimal `multipart/mixed` body writer.

use rand::RngCore;

const CRLF: &[u8] = b"\r\n";

/// Builds one `multipart/mixed` body in memory.
///
/// Parts are written as they are added; [`finish`](Self::finish) appends the
/// closing delimiter. A nested container is written as a part whose
/// `Content-Type` is the inner writer's [`content_type`](Self::content_type).
#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: Vec<u8>,
    parts: usize,
}

impl MultipartWriter {
    /// Create a writer with a random boundary.
    pub fn new() -> Self {
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::with_boundary(hex::encode(bytes))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
            parts: 0,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `Content-Type` value describing this container.
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }

    pub fn part_count(&self) -> usize {
        self.parts
    }

    /// Append one part with the given headers and body.
    pub fn add_part<K, V>(&mut self, headers: &[(K, V)], body: &[u8])
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if self.parts > 0 {
            self.buf.extend_from_slice(CRLF);
        }
        self.delimiter();
        self.buf.extend_from_slice(CRLF);
        for (name, value) in headers {
            self.buf.extend_from_slice(name.as_ref().as_bytes());
            self.buf.extend_from_slice(b": ");
            self.buf.extend_from_slice(value.as_ref().as_bytes());
            self.buf.extend_from_slice(CRLF);
        }
        self.buf.extend_from_slice(CRLF);
        self.buf.extend_from_slice(body);
        self.parts += 1;
    }

    /// Append a finished inner container as one part.
    pub fn add_nested(&mut self, inner: MultipartWriter) {
        let content_type = inner.content_type();
        let body = inner.finish();
        self.add_part(&[("Content-Type", content_type)], &body);
    }

    /// Close the container and return the encoded body.
    pub fn finish(mut self) -> Vec<u8> {
        if self.parts > 0 {
            self.buf.extend_from_slice(CRLF);
        }
        self.delimiter();
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(CRLF);
        self.buf
    }

    fn delimiter(&mut self) {
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}
