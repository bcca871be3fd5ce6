//! Codec registry report
//!
//! Builds the `name(t), name(t), ` listing shown on the host info page.
//! [`ReportBuffer`] grows to exactly the bytes written so far; each entry
//! reserves `len(name) + 5` bytes before it is appended, and the finished
//! report carries one extra byte for the NUL terminator.

use std::ffi::CStr;
use std::fmt;

use crate::error::{Error, Result};
use crate::library::{CodecDescriptor, CodecRegistry};

pub mod info;

pub use info::{InfoPage, InfoRow};

/// Bytes an entry adds on top of the codec name: `(`, type char, `)`, `,`, ` `
pub const ENTRY_OVERHEAD: usize = 5;

/// Bytes a codec entry occupies in the report
pub const fn entry_len(name: &str) -> usize {
    name.len() + ENTRY_OVERHEAD
}

/// Exact-fit growable buffer for a single report request
#[derive(Debug, Default)]
pub struct ReportBuffer {
    text: String,
    reserved: usize,
    limit: Option<usize>,
}

impl ReportBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that refuses to grow past `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Bytes written
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if nothing was written
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes requested from the allocator so far
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Capacity the allocator actually handed out (at least `reserved`)
    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// Contents written so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    fn grow(&mut self, additional: usize) -> Result<()> {
        let target = self.reserved.checked_add(additional).ok_or(Error::Memory)?;
        if self.limit.is_some_and(|limit| target > limit) {
            log::warn!(
                "Codec report would need {} bytes, limit is {:?}",
                target,
                self.limit
            );
            return Err(Error::Memory);
        }

        self.text.try_reserve_exact(target - self.text.len())?;
        self.reserved = target;
        Ok(())
    }

    /// Append one `name(t), ` entry
    pub fn append(&mut self, codec: &CodecDescriptor<'_>) -> Result<()> {
        self.grow(entry_len(codec.name))?;

        self.text.push_str(codec.name);
        self.text.push('(');
        self.text.push(codec.media_type.type_char());
        self.text.push_str("), ");

        debug_assert_eq!(self.text.len(), self.reserved);
        Ok(())
    }

    /// Terminate the buffer and hand it out
    pub fn finish(mut self) -> Result<CodecReport> {
        self.grow(1)?;
        self.text.push('\0');
        Ok(CodecReport { text: self.text })
    }
}

/// A finished, NUL-terminated codec listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecReport {
    text: String,
}

impl CodecReport {
    /// Listing without the terminator
    pub fn as_str(&self) -> &str {
        &self.text[..self.text.len() - 1]
    }

    /// Listing as a C string
    pub fn as_c_str(&self) -> &CStr {
        // Codec names never contain NUL, so this stops at our terminator
        CStr::from_bytes_until_nul(self.text.as_bytes()).unwrap_or_default()
    }

    /// Underlying storage, terminator included
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Check if the registry was empty
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for CodecReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the codec listing for `registry`
pub fn build_report<R>(registry: &R) -> Result<CodecReport>
where
    R: CodecRegistry + ?Sized,
{
    fill(registry, ReportBuffer::new())
}

/// Build the codec listing, failing with [`Error::Memory`] past `limit` bytes
pub fn build_report_with_limit<R>(registry: &R, limit: usize) -> Result<CodecReport>
where
    R: CodecRegistry + ?Sized,
{
    fill(registry, ReportBuffer::with_limit(limit))
}

fn fill<R>(registry: &R, mut buffer: ReportBuffer) -> Result<CodecReport>
where
    R: CodecRegistry + ?Sized,
{
    let mut count = 0usize;
    for codec in registry.codecs() {
        buffer.append(&codec)?;
        count += 1;
    }

    log::debug!("Codec report: {} codecs, {} bytes", count, buffer.len());
    buffer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MediaType;

    fn is_entry(entry: &str) -> bool {
        let Some(body) = entry.strip_suffix("), ") else {
            return false;
        };
        let Some((name, tag)) = body.split_once('(') else {
            return false;
        };
        !name.is_empty()
            && !name.contains(['(', ')'])
            && matches!(tag, "v" | "a" | "s" | "u")
    }

    #[test]
    fn test_two_codecs() {
        let registry = vec![
            CodecDescriptor::new("h264", MediaType::Video),
            CodecDescriptor::new("mp3", MediaType::Audio),
        ];
        let report = build_report(&registry).unwrap();
        assert_eq!(report.as_str(), "h264(v), mp3(a), ");
        assert_eq!(report.as_c_str().to_str().unwrap(), "h264(v), mp3(a), ");
        assert_eq!(report.to_string(), "h264(v), mp3(a), ");
    }

    #[test]
    fn test_empty_registry() {
        let registry: Vec<CodecDescriptor<'static>> = Vec::new();
        let report = build_report(&registry).unwrap();
        assert_eq!(report.as_str(), "");
        assert!(report.is_empty());
        assert_eq!(report.as_bytes_with_nul(), b"\0");
    }

    #[test]
    fn test_entries_in_registration_order() {
        let registry = vec![
            CodecDescriptor::new("zlib", MediaType::Video),
            CodecDescriptor::new("aac", MediaType::Audio),
            CodecDescriptor::new("ass", MediaType::Subtitle),
            CodecDescriptor::new("bin_data", MediaType::Unknown),
        ];
        let report = build_report(&registry).unwrap();

        let entries: Vec<String> = report
            .as_str()
            .split_inclusive(", ")
            .map(str::to_string)
            .collect();
        assert_eq!(entries.len(), registry.len());
        assert!(entries.iter().all(|e| is_entry(e)));
        assert_eq!(entries, ["zlib(v), ", "aac(a), ", "ass(s), ", "bin_data(u), "]);
    }

    #[test]
    fn test_exact_fit_growth() {
        let names = ["a", "mpeg4", "pcm_s16le", "libx264rgb"];
        let mut buffer = ReportBuffer::new();
        let mut expected = 0;

        for name in names {
            expected += name.len() + 5;
            buffer
                .append(&CodecDescriptor::new(name, MediaType::Audio))
                .unwrap();
            assert_eq!(buffer.reserved(), expected);
            assert_eq!(buffer.len(), expected);
            assert!(buffer.capacity() >= buffer.reserved());
        }

        let report = buffer.finish().unwrap();
        assert_eq!(report.as_bytes_with_nul().len(), expected + 1);
        assert_eq!(report.as_bytes_with_nul()[expected], 0);
    }

    #[test]
    fn test_appends_do_not_touch_previous_bytes() {
        let mut buffer = ReportBuffer::new();
        buffer
            .append(&CodecDescriptor::new("h264", MediaType::Video))
            .unwrap();
        let before = buffer.as_str().to_string();

        buffer
            .append(&CodecDescriptor::new("flac", MediaType::Audio))
            .unwrap();
        assert!(buffer.as_str().starts_with(&before));
        assert_eq!(&buffer.as_str()[before.len()..], "flac(a), ");
    }

    #[test]
    fn test_limit_reports_out_of_memory() {
        let registry = vec![
            CodecDescriptor::new("h264", MediaType::Video),
            CodecDescriptor::new("mp3", MediaType::Audio),
        ];

        // 9 + 8 bytes of entries fit, the terminator does not
        let result = build_report_with_limit(&registry, 17);
        assert!(matches!(result, Err(Error::Memory)));

        let report = build_report_with_limit(&registry, 18).unwrap();
        assert_eq!(report.as_str(), "h264(v), mp3(a), ");
    }

    #[test]
    fn test_failed_growth_leaves_buffer_intact() {
        let mut buffer = ReportBuffer::with_limit(10);
        buffer
            .append(&CodecDescriptor::new("h264", MediaType::Video))
            .unwrap();

        let err = buffer
            .append(&CodecDescriptor::new("mp3", MediaType::Audio))
            .unwrap_err();
        assert!(matches!(err, Error::Memory));
        assert_eq!(buffer.as_str(), "h264(v), ");
        assert_eq!(buffer.reserved(), 9);
    }
}
