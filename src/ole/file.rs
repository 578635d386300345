use super::binary::{decode_utf16le, read_u16_le, read_u32_le};
use super::consts::*;
use crate::common::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom};
use zerocopy::{FromBytes, LE, U16, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Size of a sector inside the mini stream.
pub const MINI_SECTOR_SIZE: usize = 64;

/// Raw OLE directory entry structure (128 bytes)
///
/// This represents the on-disk format of a directory entry.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    /// Left, right and child SIDs
    siblings: [U32<LE>; 3],
    /// CLSID (16 bytes)
    clsid: [u8; 16],
    /// State bits
    state_bits: U32<LE>,
    /// Creation and modification FILETIMEs
    timestamps: [u8; 16],
    /// Starting sector
    start_sector: U32<LE>,
    /// Stream size (low 32 bits)
    stream_size: U32<LE>,
    /// Stream size (high 32 bits, only meaningful for version 4)
    stream_size_high: U32<LE>,
}

/// Location of a stream inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamExtent {
    /// First sector (or mini sector) of the stream
    pub start_sector: u32,
    /// Stream length in bytes
    pub size: u32,
}

/// Compound file with its allocation tables resolved.
///
/// Opening walks the header, the FAT (including DIFAT extension sectors),
/// the miniFAT and the directory, and remembers where the root mini stream
/// and the BIFF workbook stream live. Stream data itself is read on demand.
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    /// File handle or reader
    reader: R,
    /// Major version from the header (3 or 4)
    major_version: u16,
    /// Sector size (512 or 4096 bytes)
    sector_size: usize,
    /// Streams shorter than this live in the mini stream
    mini_cutoff: u32,
    /// File Allocation Table - maps sector to next sector in chain
    fat: Vec<u32>,
    /// Mini FAT - for streams smaller than cutoff size
    minifat: Vec<u32>,
    /// Root entry: owner of the mini stream
    root: Option<StreamExtent>,
    /// The `Workbook` or `Book` stream
    workbook: StreamExtent,
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse a compound file from a reader
    ///
    /// # Arguments
    /// * `reader` - A reader that implements Read + Seek
    ///
    /// # Returns
    /// * `Result<OleFile<R>>` - The resolved container, or the first
    ///   structural fault met while reading it
    pub fn open(mut reader: R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0)).map_err(Error::CfbfSeek)?;

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header).map_err(Error::CfbfRead)?;

        if &header[0..8] != MAGIC {
            return Err(Error::CfbfInvalidSignature);
        }

        let major_version = read_u16_le(&header, OFFSET_MAJOR_VERSION)?;
        let sector_shift = read_u16_le(&header, OFFSET_SECTOR_SHIFT)?;
        let sector_size = match sector_shift {
            9 => SECTOR_SIZE_V3,
            12 => SECTOR_SIZE_V4,
            other => return Err(Error::CfbfInvalidSectorSize(other)),
        };

        let directory_start = read_u32_le(&header, OFFSET_DIRECTORY_START)?;
        let mini_cutoff = read_u32_le(&header, OFFSET_MINI_CUTOFF)?;
        let minifat_start = read_u32_le(&header, OFFSET_MINIFAT_START)?;
        let num_minifat_sectors = read_u32_le(&header, OFFSET_NUM_MINIFAT_SECTORS)?;

        let mut ole = OleFile {
            reader,
            major_version,
            sector_size,
            mini_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            root: None,
            workbook: StreamExtent {
                start_sector: ENDOFCHAIN,
                size: 0,
            },
        };

        ole.load_fat(&header)?;
        log::debug!(
            "CFBF v{} container: {}-byte sectors, {} FAT entries",
            major_version,
            sector_size,
            ole.fat.len()
        );

        if num_minifat_sectors > 0 {
            ole.load_minifat(minifat_start, num_minifat_sectors)?;
        }

        ole.load_directory(directory_start)?;

        Ok(ole)
    }

    /// Load the File Allocation Table (FAT)
    ///
    /// The first 109 FAT sector indexes are stored in the header; any
    /// further indexes live in a chain of DIFAT sectors whose last slot
    /// points to the next DIFAT sector.
    fn load_fat(&mut self, header: &[u8; HEADER_SIZE]) -> Result<()> {
        let num_difat_sectors = read_u32_le(header, OFFSET_NUM_DIFAT_SECTORS)?;
        let mut fat_sectors = Vec::new();

        for i in 0..HEADER_DIFAT_ENTRIES {
            let sector = read_u32_le(header, OFFSET_HEADER_DIFAT + i * 4)?;
            if sector <= MAXREGSECT {
                fat_sectors.push(sector);
            }
        }

        if num_difat_sectors > 0 {
            let entries_per_sector = self.sector_size / 4 - 1;
            let mut difat_sector = read_u32_le(header, OFFSET_DIFAT_START)?;
            let mut blocks = 0u32;
            let mut terminated = false;

            while blocks < num_difat_sectors && difat_sector <= MAXREGSECT {
                let sector_data = self.read_sector(difat_sector)?;
                blocks += 1;

                for i in 0..entries_per_sector {
                    let sector = read_u32_le(&sector_data, i * 4)?;
                    match sector {
                        ENDOFCHAIN => {
                            terminated = true;
                            break;
                        },
                        FREESECT => continue,
                        _ => fat_sectors.push(sector),
                    }
                }
                if terminated {
                    break;
                }

                difat_sector = read_u32_le(&sector_data, entries_per_sector * 4)?;
            }

            if !terminated && blocks != num_difat_sectors {
                return Err(Error::CfbfRead(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("DIFAT chain holds {blocks} of {num_difat_sectors} sectors"),
                )));
            }
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat
            .try_reserve_exact(fat_sectors.len() * entries_per_sector)
            .map_err(|_| Error::InsufficientMemory)?;

        for &sector_id in &fat_sectors {
            let sector_data = self.read_sector(sector_id)?;
            self.fat.extend(
                sector_data
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }

        if self.fat.is_empty() {
            return Err(Error::CfbfEmptyFatChain);
        }
        Ok(())
    }

    /// Load the Mini FAT (for small streams)
    fn load_minifat(&mut self, start: u32, num_sectors: u32) -> Result<()> {
        let chain = sector_chain(&self.fat, start)?;
        for &sector_id in chain.iter().take(num_sectors as usize) {
            let sector_data = self.read_sector(sector_id)?;
            self.minifat.extend(
                sector_data
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }
        Ok(())
    }

    /// Scan the directory for the root entry and the workbook stream
    fn load_directory(&mut self, start: u32) -> Result<()> {
        let mut workbook = None;

        for sector_id in sector_chain(&self.fat, start)? {
            let sector_data = self.read_sector(sector_id)?;
            for chunk in sector_data.chunks_exact(DIRENTRY_SIZE) {
                let raw = RawDirectoryEntry::read_from_bytes(chunk)
                    .map_err(|_| Error::CfbfRead(io::ErrorKind::InvalidData.into()))?;
                if raw.entry_type == STGTY_EMPTY {
                    continue;
                }

                let name_len = (raw.name_len.get() as usize).min(raw.name.len());
                let name = decode_utf16le(&raw.name[..name_len]).ok_or(Error::InvalidCharacter)?;
                let extent = StreamExtent {
                    start_sector: raw.start_sector.get(),
                    size: raw.stream_size.get(),
                };

                if raw.entry_type == STGTY_ROOT || name == ROOT_ENTRY_NAME {
                    if self.root.is_none() {
                        self.root = Some(extent);
                    }
                } else if raw.entry_type == STGTY_STREAM
                    && workbook.is_none()
                    && WORKBOOK_STREAM_NAMES.contains(&name.as_str())
                {
                    log::debug!(
                        "found '{}' stream: start sector {}, {} bytes",
                        name,
                        extent.start_sector,
                        extent.size
                    );
                    workbook = Some(extent);
                }
            }
        }

        self.workbook = workbook.ok_or(Error::WorkbookNotFound)?;
        Ok(())
    }

    /// Read one full sector
    pub(crate) fn read_sector_into(&mut self, sector_id: u32, buffer: &mut [u8]) -> Result<()> {
        // Sector position in file: (sector_id + 1) * sector_size
        let position = ((sector_id as u64) + 1) * (self.sector_size as u64);
        self.reader
            .seek(SeekFrom::Start(position))
            .map_err(Error::CfbfSeek)?;
        self.reader.read_exact(buffer).map_err(Error::CfbfRead)
    }

    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.sector_size];
        self.read_sector_into(sector_id, &mut buffer)?;
        Ok(buffer)
    }

    /// Load the root entry's mini stream into memory.
    ///
    /// The mini stream is an ordinary FAT chain; its byte count must match
    /// the size recorded in the root entry.
    fn read_mini_stream(&mut self) -> Result<Vec<u8>> {
        let root = self.root.ok_or(Error::InvalidMiniStream)?;
        let chain = sector_chain(&self.fat, root.start_sector)?;
        let size = root.size as usize;
        if chain.len() != size.div_ceil(self.sector_size) {
            return Err(Error::InvalidMiniStream);
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| Error::InsufficientMemory)?;
        for sector_id in chain {
            let sector_data = self.read_sector(sector_id)?;
            let take = (size - data.len()).min(self.sector_size);
            data.extend_from_slice(&sector_data[..take]);
        }
        Ok(data)
    }

    /// Read the workbook stream out of the mini stream by following its
    /// miniFAT chain.
    pub fn read_workbook_from_mini_stream(&mut self) -> Result<Vec<u8>> {
        let ministream = self.read_mini_stream()?;
        let chain =
            sector_chain(&self.minifat, self.workbook.start_sector).map_err(|_| Error::InvalidMiniStream)?;
        let size = self.workbook.size as usize;

        let mut data = Vec::with_capacity(size);
        for mini_sector in chain {
            if data.len() >= size {
                break;
            }
            let offset = mini_sector as usize * MINI_SECTOR_SIZE;
            let sector_data = ministream
                .get(offset..offset + MINI_SECTOR_SIZE)
                .ok_or(Error::InvalidMiniStream)?;
            let take = (size - data.len()).min(MINI_SECTOR_SIZE);
            data.extend_from_slice(&sector_data[..take]);
        }

        if data.len() != size {
            return Err(Error::InvalidMiniStream);
        }
        Ok(data)
    }

    /// Whether the workbook stream is stored in the mini stream.
    pub fn workbook_in_mini_stream(&self) -> bool {
        self.workbook.size < self.mini_cutoff
    }

    pub fn workbook(&self) -> StreamExtent {
        self.workbook
    }

    pub fn major_version(&self) -> u16 {
        self.major_version
    }

    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn fat(&self) -> &[u32] {
        &self.fat
    }

    /// Give up the reader and keep the allocation table.
    pub fn into_fat(self) -> Vec<u32> {
        self.fat
    }
}

/// Follow a sector chain from `start` until ENDOFCHAIN.
///
/// Every walk takes at most `table.len()` steps: a chain that runs longer
/// must contain a cycle and is rejected, as is any link that points outside
/// the table.
pub fn sector_chain(table: &[u32], start: u32) -> Result<Vec<u32>> {
    let mut chain = Vec::new();
    let mut sector = start;

    while sector != ENDOFCHAIN {
        let next = *table
            .get(sector as usize)
            .ok_or(Error::CfbfIllegalFatEntry(sector))?;
        if chain.len() >= table.len() {
            return Err(Error::CfbfIllegalFatEntry(sector));
        }
        chain.push(sector);
        sector = next;
    }

    Ok(chain)
}
