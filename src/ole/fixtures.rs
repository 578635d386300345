//! Byte-level builders for compound files and BIFF streams used by tests.
//!
//! The goal is not to be an `.xls` writer; it produces just enough CFBF and
//! BIFF to drive the reader through specific container layouts and record
//! sequences.
#![allow(dead_code)]

use super::consts::*;
use super::xls::records::*;

const SECTOR: usize = 512;
const MINI_SECTOR: usize = 64;
const MINI_CUTOFF: u32 = 4096;

/// Eight bytes of magic and nothing else: too short for a header.
pub const MAGIC_ONLY: &[u8] = MAGIC;

/// Builds a version 3 compound file with 512-byte sectors and a single FAT
/// sector (enough for 64 KiB of content).
pub struct CfbBuilder {
    streams: Vec<(String, Vec<u8>)>,
    difat: bool,
    mini_cutoff: u32,
}

impl Default for CfbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CfbBuilder {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            difat: false,
            mini_cutoff: MINI_CUTOFF,
        }
    }

    pub fn stream(mut self, name: &str, data: &[u8]) -> Self {
        self.streams.push((name.to_string(), data.to_vec()));
        self
    }

    /// Reference the FAT sector from a DIFAT sector instead of the header.
    pub fn fat_through_difat(mut self) -> Self {
        self.difat = true;
        self
    }

    /// Override the mini stream cutoff recorded in the header.
    pub fn mini_cutoff(mut self, cutoff: u32) -> Self {
        self.mini_cutoff = cutoff;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut fat = vec![FREESECT; SECTOR / 4];
        let mut sectors: Vec<Vec<u8>> = vec![Vec::new()];
        fat[0] = FATSECT;

        let difat_start = if self.difat {
            sectors.push(Vec::new());
            fat[1] = DIFSECT;
            1
        } else {
            ENDOFCHAIN
        };

        // Small streams go to the mini stream, one chain per stream
        let mut mini_data = Vec::new();
        let mut minifat: Vec<u32> = Vec::new();
        let mut entries = Vec::new();
        for (name, data) in &self.streams {
            if (data.len() as u32) < self.mini_cutoff {
                let start = minifat.len() as u32;
                let count = data.len().div_ceil(MINI_SECTOR);
                for i in 0..count {
                    let next = if i + 1 == count { ENDOFCHAIN } else { start + i as u32 + 1 };
                    minifat.push(next);
                    let chunk = &data[i * MINI_SECTOR..((i + 1) * MINI_SECTOR).min(data.len())];
                    mini_data.extend_from_slice(chunk);
                    mini_data.resize((i + 1 + start as usize) * MINI_SECTOR, 0);
                }
                let start = if count == 0 { ENDOFCHAIN } else { start };
                entries.push((name.clone(), STGTY_STREAM, start, data.len() as u32));
            } else {
                let start = append_chain(&mut sectors, &mut fat, data);
                entries.push((name.clone(), STGTY_STREAM, start, data.len() as u32));
            }
        }

        let root_start = append_chain(&mut sectors, &mut fat, &mini_data);
        let (minifat_start, minifat_sectors) = if minifat.is_empty() {
            (ENDOFCHAIN, 0)
        } else {
            minifat.resize(minifat.len().div_ceil(SECTOR / 4) * (SECTOR / 4), FREESECT);
            let bytes = u32s(&minifat);
            let count = bytes.len() / SECTOR;
            (append_chain(&mut sectors, &mut fat, &bytes), count as u32)
        };

        let mut directory = Vec::new();
        directory.extend(dir_entry(
            ROOT_ENTRY_NAME,
            STGTY_ROOT,
            root_start,
            mini_data.len() as u32,
        ));
        for (name, kind, start, size) in &entries {
            directory.extend(dir_entry(name, *kind, *start, *size));
        }
        let directory_start = append_chain(&mut sectors, &mut fat, &directory);

        sectors[0] = u32s(&fat);
        if self.difat {
            let mut difat = vec![FREESECT; SECTOR / 4];
            difat[0] = 0;
            difat[SECTOR / 4 - 1] = ENDOFCHAIN;
            sectors[1] = u32s(&difat);
        }

        let mut header = vec![0u8; SECTOR];
        header[0..8].copy_from_slice(MAGIC);
        put16(&mut header, 0x18, 0x003E);
        put16(&mut header, OFFSET_MAJOR_VERSION, 3);
        put16(&mut header, 0x1C, 0xFFFE);
        put16(&mut header, OFFSET_SECTOR_SHIFT, 9);
        put16(&mut header, 0x20, 6);
        put32(&mut header, 0x2C, 1);
        put32(&mut header, OFFSET_DIRECTORY_START, directory_start);
        put32(&mut header, OFFSET_MINI_CUTOFF, self.mini_cutoff);
        put32(&mut header, OFFSET_MINIFAT_START, minifat_start);
        put32(&mut header, OFFSET_NUM_MINIFAT_SECTORS, minifat_sectors);
        put32(&mut header, OFFSET_DIFAT_START, difat_start);
        put32(&mut header, OFFSET_NUM_DIFAT_SECTORS, u32::from(self.difat));
        for i in 0..HEADER_DIFAT_ENTRIES {
            let value = if i == 0 && !self.difat { 0 } else { FREESECT };
            put32(&mut header, OFFSET_HEADER_DIFAT + i * 4, value);
        }

        let mut out = header;
        for sector in sectors {
            debug_assert_eq!(sector.len(), SECTOR);
            out.extend(sector);
        }
        out
    }
}

fn append_chain(sectors: &mut Vec<Vec<u8>>, fat: &mut [u32], data: &[u8]) -> u32 {
    if data.is_empty() {
        return ENDOFCHAIN;
    }
    let start = sectors.len();
    let count = data.len().div_ceil(SECTOR);
    for i in 0..count {
        let mut sector = data[i * SECTOR..((i + 1) * SECTOR).min(data.len())].to_vec();
        sector.resize(SECTOR, 0);
        sectors.push(sector);
        fat[start + i] = if i + 1 == count {
            ENDOFCHAIN
        } else {
            (start + i + 1) as u32
        };
    }
    start as u32
}

fn dir_entry(name: &str, kind: u8, start: u32, size: u32) -> Vec<u8> {
    let mut entry = vec![0u8; DIRENTRY_SIZE];
    let units: Vec<u16> = name.encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        put16(&mut entry, i * 2, *unit);
    }
    put16(&mut entry, 0x40, ((units.len() + 1) * 2) as u16);
    entry[0x42] = kind;
    entry[0x43] = 1;
    put32(&mut entry, 0x44, FREESECT);
    put32(&mut entry, 0x48, FREESECT);
    put32(&mut entry, 0x4C, FREESECT);
    put32(&mut entry, 0x74, start);
    put32(&mut entry, 0x78, size);
    entry
}

fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn put16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Frame a payload as a BIFF record.
pub fn record(record_type: u16, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + data.len());
    out.extend_from_slice(&record_type.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Little-endian byte sink for record payloads.
#[derive(Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    /// BIFF8 unicode string body: flags byte then compressed or UTF-16
    /// characters (no length prefix).
    pub fn unicode_body(self, text: &str) -> Self {
        if text.chars().all(|c| (c as u32) < 0x100) {
            let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
            self.u8(0x00).bytes(&bytes)
        } else {
            let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
            self.u8(0x01).bytes(&bytes)
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

pub fn bof8(dt: u16) -> Vec<u8> {
    record(
        RECORD_BOF,
        &Payload::new()
            .u16(BOF_VERSION_BIFF8)
            .u16(dt)
            .bytes(&[0; 12])
            .finish(),
    )
}

pub fn bof5(dt: u16) -> Vec<u8> {
    record(
        RECORD_BOF,
        &Payload::new().u16(BOF_VERSION_BIFF5).u16(dt).bytes(&[0; 4]).finish(),
    )
}

pub fn eof() -> Vec<u8> {
    record(RECORD_EOF, &[])
}

pub fn codepage(cp: u16) -> Vec<u8> {
    record(RECORD_CODEPAGE, &cp.to_le_bytes())
}

pub fn datemode(mode: u16) -> Vec<u8> {
    record(RECORD_DATEMODE, &mode.to_le_bytes())
}

pub fn dimension8(rows: u32, cols: u16) -> Vec<u8> {
    record(
        RECORD_DIMENSION,
        &Payload::new().u32(0).u32(rows).u16(0).u16(cols).u16(0).finish(),
    )
}

pub fn dimension5(rows: u16, cols: u16) -> Vec<u8> {
    record(
        RECORD_DIMENSION,
        &Payload::new().u16(0).u16(rows).u16(0).u16(cols).u16(0).finish(),
    )
}

pub fn xf(format_index: u16) -> Vec<u8> {
    record(
        RECORD_XF,
        &Payload::new().u16(0).u16(format_index).bytes(&[0; 16]).finish(),
    )
}

pub fn format8(index: u16, mask: &str) -> Vec<u8> {
    record(
        RECORD_FORMAT,
        &Payload::new()
            .u16(index)
            .u16(mask.chars().count() as u16)
            .unicode_body(mask)
            .finish(),
    )
}

pub fn format5(index: u16, mask: &str) -> Vec<u8> {
    record(
        RECORD_FORMAT,
        &Payload::new().u16(index).u8(mask.len() as u8).bytes(mask.as_bytes()).finish(),
    )
}

pub fn number(row: u16, col: u16, xf: u16, value: f64) -> Vec<u8> {
    record(
        RECORD_NUMBER,
        &Payload::new().u16(row).u16(col).u16(xf).f64(value).finish(),
    )
}

pub fn rk(row: u16, col: u16, xf: u16, value: u32) -> Vec<u8> {
    record(
        RECORD_RK,
        &Payload::new().u16(row).u16(col).u16(xf).u32(value).finish(),
    )
}

pub fn mulrk(row: u16, first_col: u16, cells: &[(u16, u32)]) -> Vec<u8> {
    let mut payload = Payload::new().u16(row).u16(first_col);
    for &(xf, value) in cells {
        payload = payload.u16(xf).u32(value);
    }
    let last_col = first_col + cells.len() as u16 - 1;
    record(RECORD_MULRK, &payload.u16(last_col).finish())
}

pub fn boolerr(row: u16, col: u16, value: u8) -> Vec<u8> {
    record(
        RECORD_BOOLERR,
        &Payload::new().u16(row).u16(col).u16(0).u8(value).u8(0).finish(),
    )
}

pub fn label8(row: u16, col: u16, text: &str) -> Vec<u8> {
    record(
        RECORD_LABEL,
        &Payload::new()
            .u16(row)
            .u16(col)
            .u16(0)
            .u16(text.chars().count() as u16)
            .unicode_body(text)
            .finish(),
    )
}

pub fn label5(row: u16, col: u16, text: &[u8]) -> Vec<u8> {
    record(
        RECORD_LABEL,
        &Payload::new()
            .u16(row)
            .u16(col)
            .u16(0)
            .u16(text.len() as u16)
            .bytes(text)
            .finish(),
    )
}

pub fn label_sst(row: u16, col: u16, xf: u16, index: u32) -> Vec<u8> {
    record(
        RECORD_LABEL_SST,
        &Payload::new().u16(row).u16(col).u16(xf).u32(index).finish(),
    )
}

/// An SST record holding every string unsplit.
pub fn sst(strings: &[&str]) -> Vec<u8> {
    let mut payload = Payload::new()
        .u32(strings.len() as u32)
        .u32(strings.len() as u32);
    for s in strings {
        payload = payload.u16(s.encode_utf16().count() as u16).unicode_body(s);
    }
    record(RECORD_SST, &payload.finish())
}

/// BIFF5 or BIFF8 workbook stream with one globals substream followed by
/// one substream per sheet. SHEET records are generated with the right
/// stream offsets.
pub struct WorkbookStream {
    biff8: bool,
    globals: Vec<Vec<u8>>,
    sheets: Vec<(String, Vec<Vec<u8>>)>,
}

impl WorkbookStream {
    pub fn biff8() -> Self {
        Self {
            biff8: true,
            globals: Vec::new(),
            sheets: Vec::new(),
        }
    }

    pub fn biff5() -> Self {
        Self {
            biff8: false,
            globals: Vec::new(),
            sheets: Vec::new(),
        }
    }

    pub fn global(mut self, rec: Vec<u8>) -> Self {
        self.globals.push(rec);
        self
    }

    pub fn sheet(mut self, name: &str, records: Vec<Vec<u8>>) -> Self {
        self.sheets.push((name.to_string(), records));
        self
    }

    fn sheet_record(&self, offset: u32, name: &str) -> Vec<u8> {
        let payload = Payload::new().u32(offset).u8(0).u8(0).u8(name.chars().count() as u8);
        let payload = if self.biff8 {
            payload.unicode_body(name)
        } else {
            payload.bytes(name.as_bytes())
        };
        record(RECORD_SHEET, &payload.finish())
    }

    fn bof(&self, dt: u16) -> Vec<u8> {
        if self.biff8 { bof8(dt) } else { bof5(dt) }
    }

    pub fn build(&self) -> Vec<u8> {
        let globals_len: usize = self.bof(0x0005).len()
            + self.globals.iter().map(Vec::len).sum::<usize>()
            + self
                .sheets
                .iter()
                .map(|(name, _)| self.sheet_record(0, name).len())
                .sum::<usize>()
            + eof().len();

        let mut bodies = Vec::new();
        let mut offsets = Vec::new();
        let mut offset = globals_len;
        for (_, records) in &self.sheets {
            let mut body = self.bof(0x0010);
            for rec in records {
                body.extend_from_slice(rec);
            }
            body.extend(eof());
            offsets.push(offset as u32);
            offset += body.len();
            bodies.push(body);
        }

        let mut out = self.bof(0x0005);
        for rec in &self.globals {
            out.extend_from_slice(rec);
        }
        for ((name, _), &offset) in self.sheets.iter().zip(&offsets) {
            out.extend(self.sheet_record(offset, name));
        }
        out.extend(eof());
        for body in bodies {
            out.extend(body);
        }
        out
    }
}

/// Legacy BOF record for BIFF2 (0x0009), BIFF3 (0x0209) or BIFF4 (0x0409).
pub fn legacy_bof(record_type: u16) -> Vec<u8> {
    record(record_type, &Payload::new().u16(0).u16(0x0010).u16(0).finish())
}
