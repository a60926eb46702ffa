use std::fs::File;
use std::io::{BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::error::Error;

const SPACE: u8 = b' ';
const NEWLINE: u8 = b'\n';

/// Owns the data file's write end. Appends `species SP id SP payload LF`
/// records and reports back the absolute byte offset and length of the
/// payload. Reads go through a separate handle opened on the same path, so
/// a `Store`'s append and a concurrent `Load`'s read never contend on a
/// shared file cursor.
pub(crate) struct FileLog {
    writer: BufWriter<File>,
    reader: File,
    eof: u64,
}

impl FileLog {
    /// Opens (creating if absent) the file at `path` for append, plus a
    /// second read-only handle, and positions the end-of-file counter at
    /// `eof` (the length the caller already determined by parsing).
    pub(crate) fn open(path: &Path, eof: u64) -> Result<Self, Error> {
        let write_handle = File::options().create(true).append(true).open(path)?;
        let reader = File::open(path)?;
        Ok(FileLog { writer: BufWriter::new(write_handle), reader, eof })
    }

    pub(crate) fn eof(&self) -> u64 {
        self.eof
    }

    /// Appends one record and flushes it before returning. Returns the
    /// payload's offset and length. On any I/O error the internal `eof`
    /// counter is left unchanged so the caller's in-memory state does not
    /// drift from what actually made it to disk.
    pub(crate) fn append(&mut self, species: &str, id: &str, payload: &[u8]) -> Result<(u64, u64), Error> {
        validate_field(species)?;
        validate_field(id)?;
        if payload.contains(&NEWLINE) {
            return Err(Error::ContractViolation("payload must not contain a line feed byte".into()));
        }

        let payload_offset = self.eof + species.len() as u64 + 1 + id.len() as u64 + 1;
        let payload_length = payload.len() as u64;

        self.writer.write_all(species.as_bytes())?;
        self.writer.write_all(&[SPACE])?;
        self.writer.write_all(id.as_bytes())?;
        self.writer.write_all(&[SPACE])?;
        self.writer.write_all(payload)?;
        self.writer.write_all(&[NEWLINE])?;
        self.writer.flush()?;

        self.eof = payload_offset + payload_length;
        Ok((payload_offset, payload_length))
    }

    /// Reads exactly `length` bytes starting at `offset`. A short read is
    /// reported as [`Error::Corrupt`], never silently truncated.
    pub(crate) fn read_at(&self, offset: u64, length: u64) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; length as usize];
        read_exact_at(&self.reader, &mut buf, offset)
            .map_err(|_| Error::corrupt(None, "short read"))?;
        Ok(buf)
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    file.read_exact_at(buf, offset)
}

#[cfg(not(unix))]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::io::{Read, Seek, SeekFrom};
    let mut file = file.try_clone()?;
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)
}

/// `SPECIES` and `ID` must be non-empty and free of the bytes the format
/// treats as structural. Checking raw bytes (rather than decoding UTF-8
/// first) is sufficient: `SP`/`LF` are ASCII code points, and no valid UTF-8
/// encoding of a non-ASCII character ever produces an ASCII byte value, so a
/// byte-level scan can't misidentify a multi-byte character as a separator.
fn validate_field(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(Error::ContractViolation("species/id must not be empty".into()));
    }
    if s.as_bytes().iter().any(|&b| b == SPACE || b == NEWLINE) {
        return Err(Error::ContractViolation("species/id must not contain a space or line feed".into()));
    }
    Ok(())
}
