//! Workbook implementation for XLS files

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::str::FromStr;

use crate::common::{Error, Result};
use crate::config::OpenOptions;
use crate::ole::codepage::Codepage;
use crate::ole::file::OleFile;
use crate::ole::stream::{ByteStream, RecordSource, SectorStream};
use crate::ole::xls::book::BookData;
use crate::ole::xls::cell::CellValue;
use crate::ole::xls::legacy;
use crate::ole::xls::parser::{BiffParser, Pass, settle_dimensions};
use crate::ole::xls::records::BiffVersion;
use crate::ole::xls::utils::DateMode;
use crate::ole::xls::worksheet::Worksheet;

/// How the BIFF records were read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Workbook stream stored in the container's mini stream
    MiniStream,
    /// Workbook stream stored as a chain of regular sectors
    SectorChain,
    /// Bare BIFF2-4 file without a container
    Legacy,
}

/// Queries answered by [`Workbook::info`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    CfbfVersion,
    CfbfSectorSize,
    CfbfFatCount,
    BiffMaxRecordSize,
    BiffDateMode,
    BiffCodepage,
    BiffVersion,
    BiffSstCount,
    BiffSheetCount,
    BiffFormatCount,
    BiffXfCount,
    BiffPassword,
}

impl InfoKind {
    pub const ALL: [InfoKind; 12] = [
        InfoKind::CfbfVersion,
        InfoKind::CfbfSectorSize,
        InfoKind::CfbfFatCount,
        InfoKind::BiffMaxRecordSize,
        InfoKind::BiffDateMode,
        InfoKind::BiffCodepage,
        InfoKind::BiffVersion,
        InfoKind::BiffSstCount,
        InfoKind::BiffSheetCount,
        InfoKind::BiffFormatCount,
        InfoKind::BiffXfCount,
        InfoKind::BiffPassword,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InfoKind::CfbfVersion => "cfbf_version",
            InfoKind::CfbfSectorSize => "cfbf_sector_size",
            InfoKind::CfbfFatCount => "cfbf_fat_count",
            InfoKind::BiffMaxRecordSize => "biff_max_record_size",
            InfoKind::BiffDateMode => "biff_date_mode",
            InfoKind::BiffCodepage => "biff_codepage",
            InfoKind::BiffVersion => "biff_version",
            InfoKind::BiffSstCount => "biff_sst_count",
            InfoKind::BiffSheetCount => "biff_sheet_count",
            InfoKind::BiffFormatCount => "biff_format_count",
            InfoKind::BiffXfCount => "biff_xf_count",
            InfoKind::BiffPassword => "biff_password",
        }
    }
}

impl FromStr for InfoKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InfoKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidInfoArgument(s.to_string()))
    }
}

/// Compound file format version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfbfVersion {
    V3,
    V4,
    /// Not a compound file
    Unknown,
}

/// Whether the workbook carries a FILEPASS record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Password {
    Plain,
    Obfuscated,
}

/// Answer to an [`InfoKind`] query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Info {
    CfbfVersion(CfbfVersion),
    /// 512 or 4096; 0 outside a compound file
    CfbfSectorSize(usize),
    Count(usize),
    /// Largest record payload; unknown for BIFF2-4
    MaxRecordSize(Option<u16>),
    DateMode(DateMode),
    /// `None` when the stream has no CODEPAGE record
    Codepage(Option<Codepage>),
    BiffVersion(BiffVersion),
    Password(Password),
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Info::CfbfVersion(CfbfVersion::V3) => f.write_str("3"),
            Info::CfbfVersion(CfbfVersion::V4) => f.write_str("4"),
            Info::CfbfVersion(CfbfVersion::Unknown) => f.write_str("unknown"),
            Info::CfbfSectorSize(n) | Info::Count(n) => write!(f, "{}", n),
            Info::MaxRecordSize(Some(n)) => write!(f, "{}", n),
            Info::MaxRecordSize(None) => f.write_str("unknown"),
            Info::DateMode(DateMode::Date1900) => f.write_str("1900"),
            Info::DateMode(DateMode::Date1904) => f.write_str("1904"),
            Info::Codepage(Some(cp)) => f.write_str(cp.name()),
            Info::Codepage(None) => f.write_str("unknown"),
            Info::BiffVersion(v) => write!(f, "BIFF{}", v.number()),
            Info::Password(Password::Plain) => f.write_str("plain"),
            Info::Password(Password::Obfuscated) => f.write_str("obfuscated"),
        }
    }
}

/// Container facts kept after the file has been read
#[derive(Debug)]
struct Container {
    major_version: u16,
    sector_size: usize,
    fat: Vec<u32>,
}

/// A legacy Excel workbook read fully into memory.
///
/// Opening reads the container, every BIFF record and every cell; the file
/// is not touched again afterwards. One sheet is active at a time and all
/// dimension and cell queries refer to it. The first sheet is active after
/// opening.
///
/// # Examples
///
/// ```no_run
/// use freexl::Workbook;
///
/// # fn main() -> freexl::Result<()> {
/// let mut workbook = Workbook::open("data.xls")?;
/// for index in 0..workbook.sheet_count() {
///     workbook.select_active_worksheet(index)?;
///     let (rows, columns) = workbook.worksheet_dimensions()?;
///     println!("{}: {} x {}", workbook.worksheet_name(index)?, rows, columns);
///     for row in 0..rows {
///         for col in 0..columns {
///             print!("{}\t", workbook.cell(row, col)?);
///         }
///         println!();
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Workbook {
    book: BookData,
    stream_kind: StreamKind,
    container: Option<Container>,
}

impl Workbook {
    /// Open and fully parse a workbook.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open a workbook for metadata queries only.
    ///
    /// Cell values and shared strings are not loaded; querying them fails
    /// with [`Error::InvalidHandle`].
    pub fn open_info<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::info_only())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.display().to_string()),
            _ => Error::CfbfRead(err),
        })?;
        Self::from_reader(BufReader::new(file), options)
    }

    /// Parse a workbook from any seekable source.
    ///
    /// A source without the compound file signature, or too short to hold
    /// a compound file header, is read as a bare BIFF2-4 stream.
    pub fn from_reader<R: Read + Seek>(mut reader: R, options: &OpenOptions) -> Result<Self> {
        let mut book = BookData::new(options);

        let (stream_kind, container) = match OleFile::open(&mut reader) {
            Ok(ole) => {
                let (kind, container) = Self::parse_container(&mut book, ole)?;
                (kind, Some(container))
            },
            Err(err @ (Error::CfbfInvalidSignature | Error::CfbfRead(_))) => {
                let mut data = Vec::new();
                reader.seek(SeekFrom::Start(0)).map_err(Error::CfbfSeek)?;
                reader.read_to_end(&mut data).map_err(Error::CfbfRead)?;
                if legacy::detect(&data).is_none() {
                    return Err(err);
                }
                legacy::parse_legacy(&mut book, &data)?;
                (StreamKind::Legacy, None)
            },
            Err(err) => return Err(err),
        };

        book.active = if book.sheets.is_empty() { None } else { Some(0) };
        log::debug!(
            "workbook open: {} sheets via {:?}",
            book.sheets.len(),
            stream_kind
        );

        Ok(Workbook {
            book,
            stream_kind,
            container,
        })
    }

    fn parse_container<R: Read + Seek>(
        book: &mut BookData,
        mut ole: OleFile<R>,
    ) -> Result<(StreamKind, Container)> {
        let kind = if ole.workbook_in_mini_stream() {
            StreamKind::MiniStream
        } else {
            StreamKind::SectorChain
        };
        log::debug!(
            "workbook stream: {} bytes, {:?}",
            ole.workbook().size,
            kind
        );

        if kind == StreamKind::MiniStream {
            let data = ole.read_workbook_from_mini_stream()?;
            if first_pass(book, &mut ByteStream::new(&data))? {
                BiffParser::new(book, Pass::Second).run(&mut ByteStream::new(&data))?;
            }
        } else if first_pass(book, &mut SectorStream::new(&mut ole))? {
            BiffParser::new(book, Pass::Second).run(&mut SectorStream::new(&mut ole))?;
        }

        let container = Container {
            major_version: ole.major_version(),
            sector_size: ole.sector_size(),
            fat: ole.into_fat(),
        };
        Ok((kind, container))
    }

    /// Release the workbook and everything it holds.
    pub fn close(self) {}

    pub fn stream_kind(&self) -> StreamKind {
        self.stream_kind
    }

    pub fn biff_version(&self) -> Option<BiffVersion> {
        self.book.version
    }

    pub fn date_mode(&self) -> DateMode {
        self.book.date_mode
    }

    pub fn codepage(&self) -> Option<Codepage> {
        self.book.codepage()
    }

    pub fn is_obfuscated(&self) -> bool {
        self.book.obfuscated
    }

    pub fn is_info_only(&self) -> bool {
        self.book.is_info_only()
    }

    pub fn info(&self, kind: InfoKind) -> Info {
        let container = self.container.as_ref();
        match kind {
            InfoKind::CfbfVersion => Info::CfbfVersion(match container.map(|c| c.major_version) {
                Some(3) => CfbfVersion::V3,
                Some(4) => CfbfVersion::V4,
                _ => CfbfVersion::Unknown,
            }),
            InfoKind::CfbfSectorSize => Info::CfbfSectorSize(container.map_or(0, |c| c.sector_size)),
            InfoKind::CfbfFatCount => Info::Count(container.map_or(0, |c| c.fat.len())),
            InfoKind::BiffMaxRecordSize => {
                Info::MaxRecordSize(self.book.version.and_then(BiffVersion::max_record_size))
            },
            InfoKind::BiffDateMode => Info::DateMode(self.book.date_mode),
            InfoKind::BiffCodepage => Info::Codepage(self.book.codepage()),
            // A successful open always saw a BOF record
            InfoKind::BiffVersion => Info::BiffVersion(self.book.version.unwrap_or(BiffVersion::Biff8)),
            InfoKind::BiffSstCount => Info::Count(self.book.sst.declared() as usize),
            InfoKind::BiffSheetCount => Info::Count(self.book.sheets.len()),
            InfoKind::BiffFormatCount => Info::Count(self.book.formats.count()),
            InfoKind::BiffXfCount => Info::Count(self.book.xfs.count()),
            InfoKind::BiffPassword => Info::Password(if self.book.obfuscated {
                Password::Obfuscated
            } else {
                Password::Plain
            }),
        }
    }

    /// [`info`](Self::info) addressed by query name, such as `"biff_version"`.
    pub fn info_by_name(&self, name: &str) -> Result<Info> {
        match name.parse() {
            Ok(kind) => Ok(self.info(kind)),
            Err(err) => {
                log::warn!("unknown info query '{}'", name);
                Err(err)
            },
        }
    }

    /// Raw FAT entry: the sector following `index` in its chain.
    pub fn fat_entry(&self, index: u32) -> Result<u32> {
        self.container
            .as_ref()
            .and_then(|c| c.fat.get(index as usize).copied())
            .ok_or(Error::CfbfIllegalFatEntry(index))
    }

    pub fn sheet_count(&self) -> usize {
        self.book.sheets.len()
    }

    pub fn sheet(&self, index: usize) -> Result<&Worksheet> {
        self.book
            .sheets
            .get(index)
            .ok_or(Error::IllegalSheetIndex(index))
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.book.sheets.iter()
    }

    pub fn worksheet_name(&self, index: usize) -> Result<&str> {
        self.sheet(index).map(Worksheet::name)
    }

    /// Make sheet `index` the target of dimension and cell queries.
    pub fn select_active_worksheet(&mut self, index: usize) -> Result<()> {
        self.sheet(index)?;
        self.book.active = Some(index);
        Ok(())
    }

    pub fn active_worksheet(&self) -> Result<usize> {
        self.book.active.ok_or(Error::UnselectedSheet)
    }

    /// Row and column counts of the active sheet
    pub fn worksheet_dimensions(&self) -> Result<(u32, u16)> {
        self.book
            .active_sheet()
            .map(Worksheet::dimensions)
            .ok_or(Error::UnselectedSheet)
    }

    /// Entry `index` of the shared string table.
    pub fn sst_string(&self, index: u32) -> Result<&str> {
        if self.book.is_info_only() {
            return Err(Error::InvalidHandle);
        }
        self.book
            .sst
            .get(index)
            .ok_or(Error::BiffIllegalSstIndex(index))
    }

    /// Value of a cell of the active sheet.
    pub fn cell(&self, row: u32, col: u16) -> Result<CellValue<'_>> {
        if self.book.is_info_only() {
            return Err(Error::InvalidHandle);
        }
        let sheet = self.book.active_sheet().ok_or(Error::UnselectedSheet)?;
        sheet
            .cell(row, col)
            .map(|cell| cell.value(&self.book.sst))
            .ok_or(Error::IllegalCellRowCol {
                row,
                col: col as u32,
            })
    }
}

/// Run the first pass and size the sheets that lacked a DIMENSION record.
/// Returns whether a second pass is needed.
fn first_pass(book: &mut BookData, source: &mut impl RecordSource) -> Result<bool> {
    BiffParser::new(book, Pass::First).run(source)?;
    settle_dimensions(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::fixtures::*;
    use crate::ole::xls::cell::CellKind;
    use crate::ole::xls::records::*;
    use std::io::{Cursor, Write};

    fn open_bytes(bytes: Vec<u8>) -> Result<Workbook> {
        Workbook::from_reader(Cursor::new(bytes), &OpenOptions::default())
    }

    fn sample_stream(rows: u16) -> Vec<u8> {
        let mut cells = vec![dimension8(rows as u32, 3)];
        for row in 0..rows {
            cells.push(number(row, 0, 0, row as f64 * 1.5));
            cells.push(rk(row, 1, 1, ((row as u32 + 1) << 2) | 0x02));
            cells.push(label_sst(row, 2, 0, (row % 2) as u32));
        }
        WorkbookStream::biff8()
            .global(codepage(0x04B0))
            .global(xf(0))
            .global(xf(14))
            .global(sst(&["even", "odd"]))
            .sheet("Numbers", cells)
            .sheet("Second", vec![dimension8(1, 1), label8(0, 0, "x")])
            .build()
    }

    fn grid(workbook: &Workbook) -> Vec<String> {
        let (rows, cols) = workbook.worksheet_dimensions().unwrap();
        let mut out = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let value = workbook.cell(row, col).unwrap();
                out.push(format!("{:?}", value));
            }
        }
        out
    }

    #[test]
    fn test_legacy_biff4_number() {
        let stream = [
            legacy_bof(RECORD_BOF_4),
            codepage(0x016F),
            number(0, 0, 0, 3.14),
            eof(),
        ]
        .concat();
        let workbook = open_bytes(stream).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::Legacy);
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (1, 1));
        assert_eq!(workbook.cell(0, 0).unwrap(), CellValue::Double(3.14));
        assert_eq!(workbook.info(InfoKind::BiffVersion), Info::BiffVersion(BiffVersion::Biff4));
        assert_eq!(workbook.info(InfoKind::CfbfVersion), Info::CfbfVersion(CfbfVersion::Unknown));
        assert_eq!(workbook.info(InfoKind::CfbfSectorSize), Info::CfbfSectorSize(0));
        assert_eq!(workbook.info(InfoKind::BiffMaxRecordSize), Info::MaxRecordSize(None));
        assert_eq!(workbook.info(InfoKind::BiffCodepage), Info::Codepage(Some(Codepage::Ascii)));
        assert!(workbook.fat_entry(0).is_err());
    }

    #[test]
    fn test_mini_and_sector_streams_agree() {
        let stream = sample_stream(20);
        assert!(stream.len() < 4096);

        let mini = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        let sectors = open_bytes(
            CfbBuilder::new()
                .stream("Workbook", &stream)
                .mini_cutoff(0)
                .build(),
        )
        .unwrap();

        assert_eq!(mini.stream_kind(), StreamKind::MiniStream);
        assert_eq!(sectors.stream_kind(), StreamKind::SectorChain);
        assert_eq!(grid(&mini), grid(&sectors));
        assert_eq!(mini.cell(3, 1).unwrap(), CellValue::Date("1900-01-04"));
        assert_eq!(mini.cell(3, 2).unwrap(), CellValue::SstText("odd"));
    }

    #[test]
    fn test_large_stream_spans_many_sectors() {
        let stream = sample_stream(400);
        assert!(stream.len() > 4096);
        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::SectorChain);
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (400, 3));
        assert_eq!(workbook.cell(399, 0).unwrap(), CellValue::Double(598.5));
        assert_eq!(workbook.info(InfoKind::CfbfVersion), Info::CfbfVersion(CfbfVersion::V3));
        assert_eq!(workbook.info(InfoKind::CfbfSectorSize), Info::CfbfSectorSize(512));
        assert_eq!(workbook.info(InfoKind::CfbfFatCount), Info::Count(128));
    }

    #[test]
    fn test_container_written_by_cfb_crate() {
        let stream = sample_stream(30);
        let mut ole = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        let mut writer = ole.create_stream("Workbook").unwrap();
        writer.write_all(&stream).unwrap();
        drop(writer);
        let bytes = ole.into_inner().into_inner();

        let expected = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        let workbook = open_bytes(bytes).unwrap();
        assert_eq!(grid(&workbook), grid(&expected));
        assert_eq!(workbook.worksheet_name(1).unwrap(), "Second");
    }

    fn cfb_v4_container(stream: &[u8]) -> Vec<u8> {
        let mut ole =
            cfb::CompoundFile::create_with_version(cfb::Version::V4, Cursor::new(Vec::new())).unwrap();
        let mut writer = ole.create_stream("Workbook").unwrap();
        writer.write_all(stream).unwrap();
        drop(writer);
        ole.into_inner().into_inner()
    }

    #[test]
    fn test_v4_container_mini_stream() {
        let stream = sample_stream(10);
        assert!(stream.len() < 4096);
        let expected = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();

        let workbook = open_bytes(cfb_v4_container(&stream)).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::MiniStream);
        assert_eq!(workbook.info(InfoKind::CfbfVersion), Info::CfbfVersion(CfbfVersion::V4));
        assert_eq!(workbook.info(InfoKind::CfbfSectorSize), Info::CfbfSectorSize(4096));
        assert_eq!(grid(&workbook), grid(&expected));
        assert_eq!(workbook.cell(9, 2).unwrap(), CellValue::SstText("odd"));
    }

    #[test]
    fn test_v4_container_sector_chain() {
        let stream = sample_stream(200);
        assert!(stream.len() > 4096);
        let expected = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();

        let mut workbook = open_bytes(cfb_v4_container(&stream)).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::SectorChain);
        assert_eq!(workbook.info(InfoKind::CfbfVersion), Info::CfbfVersion(CfbfVersion::V4));
        assert_eq!(workbook.info(InfoKind::CfbfSectorSize), Info::CfbfSectorSize(4096));
        assert_eq!(grid(&workbook), grid(&expected));
        assert_eq!(workbook.cell(199, 0).unwrap(), CellValue::Double(298.5));
        workbook.select_active_worksheet(1).unwrap();
        assert_eq!(workbook.cell(0, 0).unwrap(), CellValue::Text("x"));
    }

    #[test]
    fn test_stream_at_cutoff_uses_sectors() {
        let padded = |pad: usize| {
            WorkbookStream::biff8()
                .global(xf(0))
                .sheet(
                    "Padded",
                    vec![dimension8(1, 1), number(0, 0, 0, 4.0), record(0x0225, &vec![0; pad])],
                )
                .build()
        };
        let unpadded = padded(0).len();
        let stream = padded(4096 - unpadded);
        assert_eq!(stream.len(), 4096);

        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::SectorChain);
        assert_eq!(workbook.cell(0, 0).unwrap(), CellValue::Double(4.0));

        let below = padded(4095 - unpadded);
        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &below).build()).unwrap();
        assert_eq!(workbook.stream_kind(), StreamKind::MiniStream);
    }

    #[test]
    fn test_builtin_date_serials() {
        let stream = WorkbookStream::biff8()
            .global(xf(0))
            .global(xf(14))
            .sheet(
                "Dates",
                vec![
                    dimension8(2, 1),
                    rk(0, 0, 1, (1 << 2) | 0x02),
                    rk(1, 0, 1, (2 << 2) | 0x02),
                ],
            )
            .build();
        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        assert_eq!(workbook.cell(0, 0).unwrap(), CellValue::Date("1900-01-01"));
        assert_eq!(workbook.cell(1, 0).unwrap(), CellValue::Date("1900-01-02"));
    }

    #[test]
    fn test_sheet_selection_and_metadata() {
        let stream = sample_stream(2);
        let mut workbook = open_bytes(CfbBuilder::new().stream("Book", &stream).build()).unwrap();

        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.active_worksheet().unwrap(), 0);
        assert_eq!(workbook.worksheet_name(0).unwrap(), "Numbers");
        assert!(matches!(workbook.worksheet_name(2), Err(Error::IllegalSheetIndex(2))));

        workbook.select_active_worksheet(1).unwrap();
        assert_eq!(workbook.active_worksheet().unwrap(), 1);
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (1, 1));
        assert_eq!(workbook.cell(0, 0).unwrap(), CellValue::Text("x"));
        assert_eq!(workbook.cell(0, 0).unwrap().kind(), CellKind::Text);
        assert!(matches!(
            workbook.cell(1, 0),
            Err(Error::IllegalCellRowCol { row: 1, col: 0 })
        ));
        assert!(matches!(
            workbook.select_active_worksheet(5),
            Err(Error::IllegalSheetIndex(5))
        ));
        assert_eq!(workbook.active_worksheet().unwrap(), 1);

        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.kind(), SheetKind::Worksheet);
        assert_eq!(sheet.visibility(), SheetVisibility::Visible);
        assert_eq!(workbook.sheets().count(), 2);
    }

    #[test]
    fn test_info_queries() {
        let stream = WorkbookStream::biff8()
            .global(codepage(0x04B0))
            .global(datemode(1))
            .global(record(RECORD_FILEPASS, &[0; 6]))
            .global(format8(164, "0.00"))
            .global(xf(0))
            .global(xf(0))
            .global(sst(&["a", "b", "c"]))
            .build();
        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();

        assert_eq!(workbook.info(InfoKind::BiffVersion), Info::BiffVersion(BiffVersion::Biff8));
        assert_eq!(workbook.info(InfoKind::BiffMaxRecordSize), Info::MaxRecordSize(Some(8224)));
        assert_eq!(workbook.info(InfoKind::BiffDateMode), Info::DateMode(DateMode::Date1904));
        assert_eq!(workbook.info(InfoKind::BiffCodepage), Info::Codepage(Some(Codepage::Utf16Le)));
        assert_eq!(workbook.info(InfoKind::BiffSstCount), Info::Count(3));
        assert_eq!(workbook.info(InfoKind::BiffSheetCount), Info::Count(0));
        assert_eq!(workbook.info(InfoKind::BiffFormatCount), Info::Count(1));
        assert_eq!(workbook.info(InfoKind::BiffXfCount), Info::Count(2));
        assert_eq!(workbook.info(InfoKind::BiffPassword), Info::Password(Password::Obfuscated));
        assert_eq!(
            workbook.info_by_name("BIFF_SST_COUNT").unwrap(),
            Info::Count(3)
        );
        assert!(matches!(
            workbook.info_by_name("bogus"),
            Err(Error::InvalidInfoArgument(_))
        ));
        assert!(matches!(workbook.active_worksheet(), Err(Error::UnselectedSheet)));
        assert!(matches!(workbook.worksheet_dimensions(), Err(Error::UnselectedSheet)));
        assert_eq!(workbook.sst_string(2).unwrap(), "c");
        assert!(matches!(workbook.sst_string(3), Err(Error::BiffIllegalSstIndex(3))));
        assert_eq!(Info::DateMode(DateMode::Date1904).to_string(), "1904");
    }

    #[test]
    fn test_fat_entries() {
        let stream = sample_stream(2);
        let workbook = open_bytes(CfbBuilder::new().stream("Workbook", &stream).build()).unwrap();
        assert_eq!(workbook.fat_entry(0).unwrap(), crate::ole::consts::FATSECT);
        assert!(matches!(
            workbook.fat_entry(128),
            Err(Error::CfbfIllegalFatEntry(128))
        ));
    }

    #[test]
    fn test_info_only_refuses_data_queries() {
        let stream = sample_stream(3);
        let bytes = CfbBuilder::new().stream("Workbook", &stream).build();
        let workbook = Workbook::from_reader(Cursor::new(bytes), &OpenOptions::info_only()).unwrap();

        assert!(workbook.is_info_only());
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (3, 3));
        assert_eq!(workbook.info(InfoKind::BiffSstCount), Info::Count(2));
        assert!(matches!(workbook.cell(0, 0), Err(Error::InvalidHandle)));
        assert!(matches!(workbook.sst_string(0), Err(Error::InvalidHandle)));
    }

    #[test]
    fn test_undeclared_dimensions_through_container() {
        let stream = WorkbookStream::biff8()
            .global(xf(0))
            .sheet("Loose", vec![number(2, 1, 0, 7.0), label8(0, 3, "far")])
            .build();
        let workbook = open_bytes(
            CfbBuilder::new()
                .stream("Workbook", &stream)
                .mini_cutoff(0)
                .build(),
        )
        .unwrap();
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (3, 4));
        assert_eq!(workbook.cell(2, 1).unwrap(), CellValue::Double(7.0));
        assert_eq!(workbook.cell(0, 3).unwrap(), CellValue::Text("far"));
        assert_eq!(workbook.cell(1, 1).unwrap(), CellValue::Null);
    }

    #[test]
    fn test_not_a_spreadsheet() {
        let text = b"neither a compound file nor a BIFF stream\n".repeat(20);
        assert!(matches!(open_bytes(text), Err(Error::CfbfInvalidSignature)));
        assert!(matches!(
            open_bytes(b"short text".to_vec()),
            Err(Error::CfbfRead(_))
        ));

        assert!(matches!(open_bytes(Vec::new()), Err(Error::CfbfRead(_))));
    }

    #[test]
    fn test_corrupt_container_is_not_retried() {
        let mut bytes = CfbBuilder::new().stream("Workbook", &sample_stream(2)).build();
        bytes[crate::ole::consts::OFFSET_SECTOR_SHIFT] = 7;
        assert!(matches!(open_bytes(bytes), Err(Error::CfbfInvalidSectorSize(7))));
    }

    #[test]
    fn test_open_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xls");
        std::fs::write(&path, CfbBuilder::new().stream("Workbook", &sample_stream(4)).build()).unwrap();

        let workbook = Workbook::open(&path).unwrap();
        assert_eq!(workbook.worksheet_dimensions().unwrap(), (4, 3));
        workbook.close();

        let info = Workbook::open_info(&path).unwrap();
        assert_eq!(info.info(InfoKind::BiffSheetCount), Info::Count(2));

        let missing = dir.path().join("missing.xls");
        assert!(matches!(Workbook::open(&missing), Err(Error::FileNotFound(_))));
        assert!(matches!(Workbook::open("bad\0name.xls"), Err(Error::CfbfRead(_))));
    }

    #[test]
    fn test_info_kind_names_round_trip() {
        for kind in InfoKind::ALL {
            assert_eq!(kind.name().parse::<InfoKind>().unwrap(), kind);
        }
    }
}
