use std::io::{BufWriter, Write};

use crate::error::Result;

// ---------------------------------------------------------------------------
// LineSink – where encoded lines go
// ---------------------------------------------------------------------------

/// Receives finished, newline-terminated lines in record order.
pub trait LineSink {
    fn emit(&mut self, line: &str) -> Result<()>;

    /// Flush whatever is buffered. Called once after the last line.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Buffered sink over any writer (file, stdout, ...).
pub struct WriterSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects lines in memory.
impl LineSink for Vec<String> {
    fn emit(&mut self, line: &str) -> Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sink_keeps_order() {
        let mut out = Vec::new();
        {
            let mut sink = WriterSink::new(&mut out);
            sink.emit("1 |a x\n").unwrap();
            sink.emit("0 |a y\n").unwrap();
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "1 |a x\n0 |a y\n");
    }

    #[test]
    fn vec_sink_collects_lines() {
        let mut lines: Vec<String> = Vec::new();
        lines.emit("1 |a x\n").unwrap();
        assert_eq!(lines, vec!["1 |a x\n"]);
    }
}
