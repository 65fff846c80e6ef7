pub mod entry;
pub mod error;
pub mod codec;
pub mod frame;
pub mod index;
pub mod ledger;
pub mod path;
pub mod report;
pub mod io_stream;
pub mod archive;

pub use entry::{Entry, NAME_LEN, RECORD_SIZE, MAX_ENTRIES};
pub use error::{FfaError, Result};
pub use codec::{CodecId, get_codec};
pub use frame::{FrameHeader, frame, unframe};
pub use ledger::OrderLedger;
pub use archive::{ArchivePaths, PackOptions, PackOrder, UnpackOptions, pack, unpack, list};
