//! Indenting JSON formatter that keeps arrays on a single line

use serde_json::ser::Formatter;
use std::io;

/// Pretty formatter whose arrays, and everything nested inside them, stay
/// on one line.
///
/// ```text
/// {
///   "$metadata.schema.compact": ["Name@type=string", "Tags@type=string[]"],
///   "Name": "Ada",
///   "Tags": ["math", "engines"]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CompactArrayFormatter<'a> {
    indent: &'a [u8],
    current_indent: usize,
    array_depth: usize,
    has_value: bool,
}

impl Default for CompactArrayFormatter<'_> {
    fn default() -> Self {
        Self::with_indent(b"  ")
    }
}

impl<'a> CompactArrayFormatter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            indent,
            current_indent: 0,
            array_depth: 0,
            has_value: false,
        }
    }

    fn inline(&self) -> bool {
        self.array_depth > 0
    }
}

fn write_indent<W>(writer: &mut W, n: usize, indent: &[u8]) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    for _ in 0..n {
        writer.write_all(indent)?;
    }
    Ok(())
}

impl Formatter for CompactArrayFormatter<'_> {
    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.array_depth += 1;
        writer.write_all(b"[")
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.array_depth -= 1;
        writer.write_all(b"]")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn end_array_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        Ok(())
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !self.inline() {
            self.current_indent += 1;
            self.has_value = false;
        }
        writer.write_all(b"{")
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !self.inline() {
            self.current_indent -= 1;
            if self.has_value {
                writer.write_all(b"\n")?;
                write_indent(writer, self.current_indent, self.indent)?;
            }
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.inline() {
            return if first {
                Ok(())
            } else {
                writer.write_all(b", ")
            };
        }
        writer.write_all(if first { b"\n" } else { b",\n" })?;
        write_indent(writer, self.current_indent, self.indent)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn end_object_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if !self.inline() {
            self.has_value = true;
        }
        Ok(())
    }
}
