//! Filesystem side of the log file lifecycle: creation, directories and relocation.

mod copy;
mod create;
mod dir;
mod helpers;
mod relocate;
mod util;

pub use create::{FILE_TIMESTAMP_FORMAT, create_initial, create_initial_at, log_file_name};
pub use dir::ensure_directory;
pub use relocate::{Relocation, relocate};

pub(crate) use helpers::{io_error_with_help, io_error_with_help_io};
pub(crate) use relocate::relocate_with;
