use std::io::{self, Write};
use std::str::FromStr;

use lz4_flex::block;
use lz4_flex::frame::{BlockMode, FrameEncoder, FrameInfo};

/// A compressor whose output is measured, never kept.
pub trait Codec {
    /// Length of `chunk` compressed on its own, without any cross-chunk dictionary.
    fn compressed_len(&mut self, chunk: &[u8]) -> io::Result<usize>;
}

#[derive(Debug, Default)]
struct WriteCount {
    written: usize,
}

impl Write for WriteCount {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// LZ4 frame format, headers and end mark included.
///
/// Frames carry the content size and link their blocks, matching the defaults of the
/// reference `lz4.frame` tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lz4Frame;

impl Codec for Lz4Frame {
    fn compressed_len(&mut self, chunk: &[u8]) -> io::Result<usize> {
        // a zero content size means "unknown" and is not stored
        let content_size = match chunk.len() {
            0 => None,
            len => Some(len as u64),
        };
        let info = FrameInfo::new()
            .content_size(content_size)
            .block_mode(BlockMode::Linked);
        let mut encoder = FrameEncoder::with_frame_info(info, WriteCount::default());
        encoder.write_all(chunk)?;
        let counter = encoder.finish().map_err(io::Error::other)?;
        Ok(counter.written)
    }
}

/// Raw LZ4 block, no framing.
#[derive(Debug, Default)]
pub struct Lz4Block {
    scratch: Vec<u8>,
}

impl Codec for Lz4Block {
    fn compressed_len(&mut self, chunk: &[u8]) -> io::Result<usize> {
        let bound = block::get_maximum_output_size(chunk.len());
        if self.scratch.len() < bound {
            self.scratch.resize(bound, 0);
        }
        block::compress_into(chunk, &mut self.scratch).map_err(io::Error::other)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    #[default]
    Lz4Frame,
    Lz4Block,
}

impl CodecKind {
    pub fn build(self) -> Box<dyn Codec> {
        match self {
            CodecKind::Lz4Frame => Box::new(Lz4Frame),
            CodecKind::Lz4Block => Box::new(Lz4Block::default()),
        }
    }
}

impl FromStr for CodecKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lz4" | "lz4-frame" => Ok(CodecKind::Lz4Frame),
            "lz4-block" | "lz4_raw" => Ok(CodecKind::Lz4Block),
            other => Err(format!("Unknown codec: {other}")),
        }
    }
}

impl<C: Codec + ?Sized> Codec for Box<C> {
    fn compressed_len(&mut self, chunk: &[u8]) -> io::Result<usize> {
        (**self).compressed_len(chunk)
    }
}

/// Per-chunk compressed size, clamped so that a chunk never counts as larger than itself.
#[derive(Debug, Default)]
pub struct CompressionSizer<C> {
    codec: C,
}

impl<C: Codec> CompressionSizer<C> {
    pub fn new(codec: C) -> Self {
        CompressionSizer { codec }
    }

    pub fn compressed_size(&mut self, chunk: &[u8]) -> io::Result<usize> {
        let compressed = self.codec.compressed_len(chunk)?;
        Ok(compressed.min(chunk.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // xorshift, enough to defeat LZ4
    fn noise(len: usize) -> Vec<u8> {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect()
    }

    #[test]
    fn never_larger_than_input() {
        let inputs = [vec![], vec![0u8; 1], noise(16), noise(4096), vec![0u8; 4096]];
        for kind in [CodecKind::Lz4Frame, CodecKind::Lz4Block] {
            let mut sizer = CompressionSizer::new(kind.build());
            for input in &inputs {
                let size = sizer.compressed_size(input).unwrap();
                assert!(size <= input.len(), "{kind:?}: {size} > {}", input.len());
            }
        }
    }

    #[test]
    fn incompressible_data_clamps_to_length() {
        let data = noise(4096);
        let mut codec = Lz4Frame;
        assert!(codec.compressed_len(&data).unwrap() > data.len());

        let mut sizer = CompressionSizer::new(Lz4Frame);
        assert_eq!(sizer.compressed_size(&data).unwrap(), data.len());
        assert_eq!(sizer.compressed_size(&[]).unwrap(), 0);
    }

    #[test]
    fn zeros_compress_well() {
        let zeros = vec![0u8; 64 * 1024];
        let mut frame = CompressionSizer::new(Lz4Frame);
        let mut raw = CompressionSizer::new(Lz4Block::default());
        let framed = frame.compressed_size(&zeros).unwrap();
        let unframed = raw.compressed_size(&zeros).unwrap();
        assert!(framed < 1024, "{framed}");
        assert!(unframed < 1024, "{unframed}");
    }

    #[test]
    fn frame_stores_content_size() {
        // 7-byte descriptor + 8-byte content size, one block, 4-byte end mark
        let mut codec = Lz4Frame;
        assert_eq!(codec.compressed_len(&[0u8; 4096]).unwrap(), 50);
    }

    #[test]
    fn frame_spans_several_linked_blocks() {
        let zeros = vec![0u8; 256 * 1024];
        let mut codec = Lz4Frame;
        let len = codec.compressed_len(&zeros).unwrap();
        assert!(len > 50 && len < 4096, "{len}");
    }

    #[test]
    fn block_scratch_is_reused_across_sizes() {
        let mut codec = Lz4Block::default();
        let big = codec.compressed_len(&noise(8192)).unwrap();
        let small = codec.compressed_len(&noise(64)).unwrap();
        assert!(small < big);
    }

    #[test]
    fn parses_codec_names() {
        assert_eq!("lz4".parse::<CodecKind>().unwrap(), CodecKind::Lz4Frame);
        assert_eq!("LZ4-Block".parse::<CodecKind>().unwrap(), CodecKind::Lz4Block);
        assert!("zstd".parse::<CodecKind>().is_err());
    }
}
