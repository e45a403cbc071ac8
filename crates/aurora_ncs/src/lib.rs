//! This library frames compiled **NWScript** bytecode (NCS) and parses the
//! **NDB** debug-symbol sidecar the script compiler can emit next to it.
//!
//! # NCS Format Documentation
//!
//! | Offset (bytes) | Field        | Description                                      |
//! |----------------|--------------|--------------------------------------------------|
//! | 0x0000         | Magic number | 4 bytes: `"NCS "`                                |
//! | 0x0004         | Version      | 4 bytes: `"V1.0"`                                |
//! | 0x0008         | Size Opcode  | 1 byte: `0x42` ("T"), the program-size operand   |
//! | 0x0009         | Program Size | 4 bytes **big-endian**: total file size in bytes |
//!
//! Instruction bytes run from offset 13 to the declared program size.
//! Decoding the instructions themselves is the virtual machine's job; this
//! library only validates the frame and hands out the code range.
//!
//! # NDB Format Documentation
//!
//! NDB is a line-oriented text file:
//!
//! ```text
//! NDB V1.0
//! N 1 2 1 2
//! f 0 tester.nss
//! fn 0x0D 0x20 main
//! v 0x10 0x1C nCount
//! l 0 4 0x0D 0x18
//! ```
//!
//! After the `N` counts line (files, functions, variables, line spans),
//! each record is tagged: `f` names a source file, `fn` spans a function,
//! `v` spans a variable's liveness, and `l` maps a source line to a range
//! of code offsets. Offsets accept decimal or `0x` hex. Unknown tags are
//! skipped so newer emitters stay readable. A missing NDB file is not an
//! error; symbols are optional.

pub mod error;
pub mod ndb;
pub mod read;

pub use ndb::{LineSpan, LineTable, Ndb, NdbFile, NdbSymbol};
pub use read::Ncs;
