use std::io::{Read, Seek, SeekFrom};

use crate::error::SortError;

/// A contiguous pre-sorted run inside a binary file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    start: u64,
    len: u64,
}

impl Region {
    pub fn new(start: u64, len: u64) -> Region {
        Region {
            start,
            len,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    pub fn is_consecutive(&self, other: &Region) -> bool {
        self.end() == other.start
    }

    /// Split `[start, start + total)` into consecutive regions of `len` bytes, the last one may
    /// be shorter.
    pub fn split(start: u64, total: u64, len: u64) -> Vec<Region> {
        let mut regions = Vec::new();
        let mut pos = start;
        while len > 0 && pos < start + total {
            let region_len = len.min(start + total - pos);
            regions.push(Region::new(pos, region_len));
            pos += region_len;
        }
        regions
    }
}

#[derive(Debug)]
struct Window {
    cursor: u64,
    cache: Vec<u8>,
    // file position of cache[0], valid bytes are cache[..filled]
    cache_pos: u64,
    filled: usize,
}

/// Reads fixed length records sequentially from each of several consecutive regions of one
/// input, keeping a window of at most `cache_size` bytes per region.
pub struct RegionReader<R: Read + Seek> {
    input: R,
    regions: Vec<Region>,
    windows: Vec<Window>,
    cache_size: usize,
}

impl<R: Read + Seek> RegionReader<R> {
    pub fn new(input: R, regions: Vec<Region>, cache_size: usize) -> Result<RegionReader<R>, SortError> {
        if let Some(pair) = regions.windows(2).find(|pair| !pair[0].is_consecutive(&pair[1])) {
            return Err(
                SortError::Configuration(
                    format!("only consecutive regions are supported, got {:?} followed by {:?}", pair[0], pair[1])
                )
            );
        }
        if cache_size == 0 {
            return Err(SortError::Configuration("region cache size must be positive".to_string()));
        }
        let windows = regions.iter()
            .map(|region| Window {
                cursor: region.start(),
                cache: Vec::new(),
                cache_pos: region.start(),
                filled: 0,
            })
            .collect();
        Ok(
            RegionReader {
                input,
                regions,
                windows,
                cache_size,
            }
        )
    }

    pub fn regions(&self) -> &Vec<Region> {
        &self.regions
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Read the next `buf.len()` bytes of `region`, or what is left of it. Returns the number
    /// of bytes read.
    pub fn read(&mut self, buf: &mut [u8], region: usize) -> Result<usize, SortError> {
        let current = self.regions[region];
        let window = &mut self.windows[region];
        let len = (buf.len() as u64).min(current.end() - window.cursor) as usize;
        if len > self.cache_size {
            return Err(
                SortError::InternalInvariant(
                    format!("read of {} bytes does not fit a region cache of {} bytes", len, self.cache_size)
                )
            );
        }

        let window_end = window.cache_pos + window.filled as u64;
        if window.cursor < window.cache_pos || window.cursor + len as u64 > window_end {
            let load = (self.cache_size as u64).min(current.end() - window.cursor) as usize;
            window.cache.resize(load, 0);
            self.input.seek(SeekFrom::Start(window.cursor))?;
            read_fully(&mut self.input, &mut window.cache).and_then(|n| {
                if n < load {
                    Err(
                        SortError::InternalInvariant(
                            format!("region {} ends at {} but the input ends at {}", region, current.end(), window.cursor + n as u64)
                        )
                    )
                } else {
                    Ok(n)
                }
            })?;
            window.cache_pos = window.cursor;
            window.filled = load;
        }

        let from = (window.cursor - window.cache_pos) as usize;
        buf[..len].copy_from_slice(&window.cache[from..from + len]);
        window.cursor += len as u64;
        Ok(len)
    }

    pub fn is_over(&self, region: usize) -> bool {
        self.windows[region].cursor >= self.regions[region].end()
    }

    pub fn region_len_sum(&self) -> u64 {
        self.regions.iter().map(|r| r.len()).sum()
    }
}

/// Read until `buf` is full or the input ends
pub(crate) fn read_fully<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize, SortError> {
    let mut done = 0;
    while done < buf.len() {
        match input.read(&mut buf[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SortError::Io(e)),
        }
    }
    Ok(done)
}
