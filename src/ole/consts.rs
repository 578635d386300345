/// Magic bytes that should be at the beginning of every OLE file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Size of the compound file header in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Sector size for version 3 (512 bytes)
pub const SECTOR_SIZE_V3: usize = 512;

/// Sector size for version 4 (4096 bytes)
pub const SECTOR_SIZE_V4: usize = 4096;

/// Number of FAT sector pointers stored in the header itself
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Sector IDs
/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFFFFFA; // -6
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC; // -4
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD; // -3
/// End of a virtual stream chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE; // -2
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF; // -1

// Object types in storage
/// Empty directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Header field offsets
pub const OFFSET_MAJOR_VERSION: usize = 0x1A;
pub const OFFSET_SECTOR_SHIFT: usize = 0x1E;
pub const OFFSET_DIRECTORY_START: usize = 0x30;
pub const OFFSET_MINI_CUTOFF: usize = 0x38;
pub const OFFSET_MINIFAT_START: usize = 0x3C;
pub const OFFSET_NUM_MINIFAT_SECTORS: usize = 0x40;
pub const OFFSET_DIFAT_START: usize = 0x44;
pub const OFFSET_NUM_DIFAT_SECTORS: usize = 0x48;
pub const OFFSET_HEADER_DIFAT: usize = 0x4C;

/// Directory entry name of the root storage (owner of the mini stream)
pub const ROOT_ENTRY_NAME: &str = "Root Entry";

/// Stream names that hold the BIFF workbook (BIFF8 and BIFF5 respectively)
pub const WORKBOOK_STREAM_NAMES: [&str; 2] = ["Workbook", "Book"];
