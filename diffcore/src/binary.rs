use std::io::{self, Read};

/// Bytes sniffed from the head of a file when deciding text vs binary.
const SNIFF_LEN: usize = 1024;
/// Chunk size for the byte-wise comparison.
const CHUNK_LEN: usize = 8 * 1024;

/// Outcome of the binary fast paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryVerdict {
    Same,
    Different,
    /// The checks performed so far could not decide.
    Unknown,
}

/// True when the data smells binary: a NUL byte within the first kilobyte.
pub fn looks_binary(data: &[u8]) -> bool {
    data[..data.len().min(SNIFF_LEN)].contains(&0)
}

/// Resolves a comparison by size alone when possible. Equal sizes stay
/// `Unknown` until the content has been read.
pub fn verdict_from_sizes(len0: u64, len1: u64) -> BinaryVerdict {
    if len0 != len1 {
        BinaryVerdict::Different
    } else {
        BinaryVerdict::Unknown
    }
}

fn read_block(input: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let count = input.read(&mut buf[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    Ok(filled)
}

/// Compares two streams in aligned chunks. Any length or content mismatch
/// is `Different`; exhausting both with no mismatch is `Same`.
pub fn compare_binary(
    input0: &mut impl Read,
    input1: &mut impl Read,
) -> io::Result<BinaryVerdict> {
    let mut buf0 = [0u8; CHUNK_LEN];
    let mut buf1 = [0u8; CHUNK_LEN];
    loop {
        let filled0 = read_block(input0, &mut buf0)?;
        let filled1 = read_block(input1, &mut buf1)?;
        if filled0 != filled1 || buf0[..filled0] != buf1[..filled1] {
            return Ok(BinaryVerdict::Different);
        }
        if filled0 < CHUNK_LEN {
            return Ok(BinaryVerdict::Same);
        }
    }
}
