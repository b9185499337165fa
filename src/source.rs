use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Reads fixed-size chunks from a seekable stream, one index at a time.
///
/// Chunk `i` covers `[i * unit_size, (i + 1) * unit_size)`. When the stream ends inside
/// that range the chunk is shorter, and past the end it is empty.
#[derive(Debug)]
pub struct ChunkSource<R> {
    reader: R,
    unit_size: usize,
    buffer: Vec<u8>,
    short_read_seen: bool,
}

impl<R: Read + Seek> ChunkSource<R> {
    pub fn new(reader: R, unit_size: usize) -> Self {
        ChunkSource {
            reader,
            unit_size,
            buffer: Vec::with_capacity(unit_size),
            short_read_seen: false,
        }
    }

    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    pub fn read_chunk(&mut self, index: u64) -> io::Result<&[u8]> {
        let offset = index
            .checked_mul(self.unit_size as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "chunk offset overflow"))?;
        self.reader.seek(SeekFrom::Start(offset))?;

        self.buffer.clear();
        let read = (&mut self.reader)
            .take(self.unit_size as u64)
            .read_to_end(&mut self.buffer)?;

        if read < self.unit_size && !self.short_read_seen {
            self.short_read_seen = true;
            log::warn!(
                "input ends inside chunk {index} (offset {offset}); remaining chunks are short or empty"
            );
        }
        Ok(&self.buffer)
    }
}

impl ChunkSource<File> {
    pub fn open<P: AsRef<Path>>(path: P, unit_size: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, unit_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn reads_chunks_at_their_offsets() {
        let mut source = ChunkSource::new(Cursor::new(b"AAAABBBBCC".to_vec()), 4);
        assert_eq!(source.read_chunk(0).unwrap(), b"AAAA");
        assert_eq!(source.read_chunk(1).unwrap(), b"BBBB");
        assert_eq!(source.read_chunk(2).unwrap(), b"CC");
        assert_eq!(source.read_chunk(3).unwrap(), b"");
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[7u8; 10_000]).unwrap();
        file.flush().unwrap();

        let mut source = ChunkSource::open(file.path(), 4096).unwrap();
        assert_eq!(source.read_chunk(0).unwrap().len(), 4096);
        assert_eq!(source.read_chunk(2).unwrap(), &[7u8; 10_000 - 8192][..]);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChunkSource::open(dir.path().join("missing"), 4096).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
