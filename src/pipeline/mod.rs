//! Building blocks of a conversion call.
//!
//! Each submodule does one job and knows nothing about the others; the
//! [`crate::convert::Converter`] composes them.
//!
//! ## Data Flow
//!
//! ```text
//! options ──▶ args ──▶ workspace ──▶ locate + process ──▶ artifacts
//!            (flags)   (temp path)   (run the Xpdf tool)  (read results)
//! ```
//!
//! 1. [`args`]      : options → ordered flag tokens → argument vector
//! 2. [`workspace`] : unique temporary file/directory with guaranteed removal
//! 3. [`locate`]    : `<root>/<OS>/<arch>/<tool>.<ext>` for the running host
//! 4. [`process`]   : spawn, await exit, kill on cancellation
//! 5. [`artifacts`] : enumerate outputs by creation time and decode them

pub mod args;
pub mod artifacts;
pub mod locate;
pub mod process;
pub mod workspace;
