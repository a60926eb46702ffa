use std::io::Read;

use crate::error::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// One parsed record: the tuple the startup scan emits for each line.
pub(crate) struct ParsedRecord {
    pub species: String,
    pub id: String,
    pub payload_offset: u64,
    pub payload_length: u64,
}

/// Scans `reader` left to right in fixed-size chunks, calling `on_record`
/// for each complete line and returning the total byte length scanned (the
/// file's end-of-file position).
///
/// Only a bounded "carry" buffer (the current incomplete trailing line) is
/// held across reads, so this does not load the whole file into memory.
/// Splitting a chunk mid-record, including mid multi-byte character, cannot
/// corrupt the scan: newline and space are ASCII bytes, and UTF-8 guarantees
/// no multi-byte sequence ever contains a byte in the ASCII range, so a
/// byte-level search for them is safe regardless of where a chunk boundary
/// falls.
pub(crate) fn parse_log<R: Read>(
    mut reader: R,
    mut on_record: impl FnMut(ParsedRecord) -> Result<(), Error>,
) -> Result<u64, Error> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut carry: Vec<u8> = Vec::new();
    let mut abs_offset: u64 = 0;
    let mut line_no: usize = 0;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        carry.extend_from_slice(&buf[..n]);

        loop {
            let Some(pos) = carry.iter().position(|&b| b == b'\n') else {
                break;
            };
            line_no += 1;
            let line_start_abs = abs_offset;
            let record = parse_line(&carry[..pos], line_start_abs, line_no)?;
            on_record(record)?;

            let consumed = pos + 1;
            carry.drain(..consumed);
            abs_offset += consumed as u64;
        }
    }

    if !carry.is_empty() {
        return Err(Error::corrupt(Some(line_no + 1), "truncated trailing line"));
    }

    Ok(abs_offset)
}

/// Parses one line (without its trailing LF) into a record. `line_start_abs`
/// is the absolute file offset of the line's first byte.
fn parse_line(line: &[u8], line_start_abs: u64, line_no: usize) -> Result<ParsedRecord, Error> {
    let Some(first_space) = line.iter().position(|&b| b == b' ') else {
        return Err(Error::corrupt(Some(line_no), "fewer than two spaces"));
    };
    let Some(second_space_rel) = line[first_space + 1..].iter().position(|&b| b == b' ') else {
        return Err(Error::corrupt(Some(line_no), "fewer than two spaces"));
    };
    let second_space = first_space + 1 + second_space_rel;

    let species_bytes = &line[..first_space];
    let id_bytes = &line[first_space + 1..second_space];
    let payload_len = (line.len() - (second_space + 1)) as u64;

    if species_bytes.is_empty() {
        return Err(Error::corrupt(Some(line_no), "empty species field"));
    }
    if id_bytes.is_empty() {
        return Err(Error::corrupt(Some(line_no), "empty id field"));
    }

    let species = std::str::from_utf8(species_bytes)
        .map_err(|e| Error::corrupt(Some(line_no), format!("species is not utf-8: {e}")))?
        .to_string();
    let id = std::str::from_utf8(id_bytes)
        .map_err(|e| Error::corrupt(Some(line_no), format!("id is not utf-8: {e}")))?
        .to_string();

    let payload_offset = line_start_abs + second_space as u64 + 1;

    Ok(ParsedRecord { species, id, payload_offset, payload_length: payload_len })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(bytes: &[u8]) -> Result<Vec<(String, String, u64, u64)>, Error> {
        let mut out = Vec::new();
        parse_log(bytes, |r| {
            out.push((r.species, r.id, r.payload_offset, r.payload_length));
            Ok(())
        })?;
        Ok(out)
    }

    #[test]
    fn parses_simple_records() {
        let data = b"test id1 {\"field\":\"value 1\"}\ntest id2 {\"field\":\"value 2\"}\n";
        let records = scan(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "test");
        assert_eq!(records[0].1, "id1");
        let payload = &data[records[0].2 as usize..(records[0].2 + records[0].3) as usize];
        assert_eq!(payload, b"{\"field\":\"value 1\"}");
    }

    #[test]
    fn rejects_truncated_trailing_line() {
        let data = b"test id1 {\"field\":\"value 1\"}\ntest id2 no newline here";
        let err = scan(data).unwrap_err();
        assert!(matches!(err, Error::Corrupt { line: Some(2), .. }));
    }

    #[test]
    fn rejects_line_with_fewer_than_two_spaces() {
        let data = b"test id1 {\"field\":\"value 1\"}\ntest id\ntest id3 asdasd\n";
        let err = scan(data).unwrap_err();
        assert!(matches!(err, Error::Corrupt { line: Some(2), .. }));
    }

    #[test]
    fn rejects_empty_species_or_id() {
        let data = b" id1 payload\n";
        let err = scan(data).unwrap_err();
        assert!(matches!(err, Error::Corrupt { line: Some(1), .. }));
    }

    #[test]
    fn is_correct_regardless_of_where_chunk_boundaries_fall() {
        let data = b"test id1 {\"field\":\"value \xc3\xa6\xc5\x9d\"}\ntest id2 {\"field\":\"value 2\"}\n";
        // Re-parse the same bytes with a reader that yields one byte at a
        // time, forcing a chunk boundary inside the multi-byte UTF-8
        // sequence above.
        struct OneByteAtATime<'a>(&'a [u8]);
        impl<'a> Read for OneByteAtATime<'a> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }
        let mut out = Vec::new();
        parse_log(OneByteAtATime(data), |r| {
            out.push((r.species, r.id));
            Ok(())
        })
        .unwrap();
        assert_eq!(out, vec![("test".to_string(), "id1".to_string()), ("test".to_string(), "id2".to_string())]);
    }
}
