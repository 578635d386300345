//! BIFF record sources
//!
//! The workbook stream is read in one of two ways: a slice held in memory
//! (streams stored in the mini stream, and bare BIFF2-4 files), or a walk
//! over the FAT chain that keeps at most two sectors buffered.

use std::io::{Read, Seek};

use crate::common::{Error, Result};
use crate::ole::binary::read_u16_le;
use crate::ole::consts::ENDOFCHAIN;
use crate::ole::file::OleFile;
use crate::ole::xls::records::BiffRecord;

/// Size of a record header: type and payload length
const RECORD_HEADER_SIZE: usize = 4;

/// Produces BIFF records in stream order.
pub trait RecordSource {
    /// The next record, or `None` at the end of the stream. A record whose
    /// payload is cut short by the end of the stream also ends it.
    fn next_record(&mut self) -> Result<Option<BiffRecord<'_>>>;
}

/// Records read from a byte slice
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteStream { data, pos: 0 }
    }
}

impl RecordSource for ByteStream<'_> {
    fn next_record(&mut self) -> Result<Option<BiffRecord<'_>>> {
        let Some(header) = self.data.get(self.pos..self.pos + RECORD_HEADER_SIZE) else {
            return Ok(None);
        };
        let record_type = read_u16_le(header, 0)?;
        let size = read_u16_le(header, 2)? as usize;

        let start = self.pos + RECORD_HEADER_SIZE;
        let Some(data) = self.data.get(start..start + size) else {
            log::warn!("record 0x{:04X} at {} runs past the stream end", record_type, self.pos);
            self.pos = self.data.len();
            return Ok(None);
        };

        let offset = self.pos as u32;
        self.pos = start + size;
        Ok(Some(BiffRecord {
            record_type,
            offset,
            data,
        }))
    }
}

/// Records read sector by sector along the workbook stream's FAT chain.
///
/// Sectors are loaded into a window twice the sector size; once the read
/// position passes the first half, the second half slides down. Record
/// payloads are copied out into their own buffer, so a record may span any
/// number of sectors.
pub struct SectorStream<'o, R: Read + Seek> {
    ole: &'o mut OleFile<R>,
    sector_size: usize,
    /// Declared stream length
    size: usize,
    /// Stream bytes loaded into the window so far
    loaded: usize,
    next_sector: u32,
    hops: usize,
    window: Vec<u8>,
    pos: usize,
    end: usize,
    /// Stream offset of `window[0]`
    base: usize,
    record: Vec<u8>,
}

impl<'o, R: Read + Seek> SectorStream<'o, R> {
    pub fn new(ole: &'o mut OleFile<R>) -> Self {
        let sector_size = ole.sector_size();
        let extent = ole.workbook();
        SectorStream {
            ole,
            sector_size,
            size: extent.size as usize,
            loaded: 0,
            next_sector: extent.start_sector,
            hops: 0,
            window: vec![0; sector_size * 2],
            pos: 0,
            end: 0,
            base: 0,
            record: Vec::new(),
        }
    }

    /// Load the next sector of the chain behind the buffered bytes.
    /// Returns `false` at the end of the stream.
    fn load_next(&mut self) -> Result<bool> {
        if self.loaded >= self.size || self.next_sector == ENDOFCHAIN {
            return Ok(false);
        }

        let sector = self.next_sector;
        let fat = self.ole.fat();
        if self.hops >= fat.len() {
            return Err(Error::CfbfIllegalFatEntry(sector));
        }
        let next = *fat
            .get(sector as usize)
            .ok_or(Error::CfbfIllegalFatEntry(sector))?;

        if self.pos >= self.sector_size {
            self.window.copy_within(self.sector_size..self.end, 0);
            self.pos -= self.sector_size;
            self.end -= self.sector_size;
            self.base += self.sector_size;
        }

        let slot = self.end..self.end + self.sector_size;
        self.ole.read_sector_into(sector, &mut self.window[slot])?;

        let valid = self.sector_size.min(self.size - self.loaded);
        self.end += valid;
        self.loaded += valid;
        self.next_sector = next;
        self.hops += 1;
        Ok(true)
    }

    fn ensure(&mut self, needed: usize) -> Result<bool> {
        while self.end - self.pos < needed {
            if !self.load_next()? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<R: Read + Seek> RecordSource for SectorStream<'_, R> {
    fn next_record(&mut self) -> Result<Option<BiffRecord<'_>>> {
        if !self.ensure(RECORD_HEADER_SIZE)? {
            return Ok(None);
        }

        let offset = self.base + self.pos;
        let header = &self.window[self.pos..self.pos + RECORD_HEADER_SIZE];
        let record_type = read_u16_le(header, 0)?;
        let mut remaining = read_u16_le(header, 2)? as usize;
        self.pos += RECORD_HEADER_SIZE;

        self.record.clear();
        while remaining > 0 {
            if self.pos == self.end && !self.load_next()? {
                log::warn!("record 0x{:04X} at {} runs past the stream end", record_type, offset);
                return Ok(None);
            }
            let take = remaining.min(self.end - self.pos);
            self.record
                .extend_from_slice(&self.window[self.pos..self.pos + take]);
            self.pos += take;
            remaining -= take;
        }

        Ok(Some(BiffRecord {
            record_type,
            offset: offset as u32,
            data: &self.record,
        }))
    }
}
