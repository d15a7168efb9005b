pub mod assembler;
pub mod checksum;
pub mod config;
pub mod error;
pub mod field;
pub mod image;
pub mod record;
pub mod srec;

pub use assembler::ImageAssembler;
pub use config::SrecConfig;
pub use error::{ErrorKind, Field, FieldError, SrecError};
pub use image::{Image, WriteBounds};
pub use record::{DataKind, DataRecord, FooterKind, FooterRecord, HeaderRecord, Record};
pub use srec::SrecFile;


/*
Layout of a 16-bit data record

S1 13 0000 214601360021470136007EFE09D21901 40
|  |  |    |                                |
|  |  |    data (length - 3 bytes)          checksum
|  |  address
|  length: address + data + checksum bytes
type

S2 and S3 widen the address to 3 and 4 bytes; S7/S8/S9 carry only an
entry address of 4/3/2 bytes.
*/
