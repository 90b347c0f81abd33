use std::io::{self, Read, Write};

use encoding_rs::{CoderResult, Encoder, Encoding};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::model::error::ProcessorError;

/// Looks up a WHATWG encoding label such as `utf-8` or `latin-1`.
///
/// Encodings that can only be decoded (UTF-16, `replacement`) are refused,
/// since the output file is written in the same encoding.
pub fn resolve(label: &str) -> Result<&'static Encoding, ProcessorError> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ProcessorError::InvalidArguments(format!("unknown encoding '{}'", label))
    })?;

    if encoding.output_encoding() != encoding {
        return Err(ProcessorError::InvalidArguments(format!(
            "encoding '{}' cannot be used for output",
            label
        )));
    }

    Ok(encoding)
}

/// Wraps `input` so it yields UTF-8. UTF-8 input is passed through untouched.
pub fn decode_reader<R: Read>(input: R, encoding: &'static Encoding) -> impl Read {
    DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .utf8_passthru(true)
        .strip_bom(true)
        .build(input)
}

/// Accepts UTF-8 bytes and writes them to `inner` in the target encoding.
///
/// Characters split across `write` calls are held back until complete.
/// Unmappable characters become HTML numeric references. Call `finish` once
/// the last byte is written.
pub struct EncodeWriter<W: Write> {
    inner: W,
    encoder: Encoder,
    pending: Vec<u8>,
    buffer: Vec<u8>,
}

impl<W: Write> EncodeWriter<W> {
    pub fn new(inner: W, encoding: &'static Encoding) -> Self {
        EncodeWriter {
            inner,
            encoder: encoding.new_encoder(),
            pending: Vec::new(),
            buffer: Vec::new(),
        }
    }

    pub fn finish(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "output ends inside a UTF-8 sequence",
            ));
        }
        self.encode("", true)?;
        self.inner.flush()
    }

    fn encode(&mut self, mut text: &str, last: bool) -> io::Result<()> {
        loop {
            let needed = self
                .encoder
                .max_buffer_length_from_utf8_if_no_unmappables(text.len())
                .unwrap_or(text.len() * 4 + 16);
            self.buffer.reserve(needed);

            let (result, read, _) = self.encoder.encode_from_utf8_to_vec(text, &mut self.buffer, last);
            text = &text[read..];
            if result == CoderResult::InputEmpty {
                break;
            }
        }

        self.inner.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }
}

impl<W: Write> Write for EncodeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let complete = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "output is not valid UTF-8",
                ))
            }
        };

        let chunk: Vec<u8> = self.pending.drain(..complete).collect();
        let text = String::from_utf8(chunk)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.encode(&text, false)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
