//! Argument building: options → ordered flag tokens → argument vector.
//!
//! Each kind has a fixed mapping from option field to flag. A flag with a
//! value is one token (`"-r 300"`); boolean flags are bare tokens (`"-gray"`)
//! emitted only when set. Fields left at their default never produce a flag,
//! except the text encoding and end-of-line convention which are always
//! emitted.
//!
//! [`argv`] turns the tokens plus the input and output paths into the
//! child's argument vector without ever going through a shell-style string,
//! so no quoting rules apply. [`command_line`] renders the same call with
//! double-quoted paths for logs.

use crate::config::{ConversionOptions, ImageOptions, MarkupOptions, TextOptions};
use std::ffi::OsString;
use std::fmt::Display;
use std::path::Path;

/// Build the flag tokens for any options variant.
pub fn build(options: &ConversionOptions) -> Vec<String> {
    match options {
        ConversionOptions::Text(o) => text_args(o),
        ConversionOptions::Image(o) => image_args(o),
        ConversionOptions::Markup(o) => markup_args(o),
    }
}

/// Flags for `pdftotext`.
pub fn text_args(o: &TextOptions) -> Vec<String> {
    let mut args = Vec::new();

    push_pages(&mut args, o.first_page, o.last_page);
    push_flag(&mut args, o.layout, "-layout");
    push_flag(&mut args, o.simple, "-simple");
    push_flag(&mut args, o.simple2, "-simple2");
    push_flag(&mut args, o.table, "-table");
    push_flag(&mut args, o.line_printer, "-lineprinter");
    push_flag(&mut args, o.raw, "-raw");

    for (flag, margin) in [
        ("-marginl", o.margin_left),
        ("-marginr", o.margin_right),
        ("-margint", o.margin_top),
        ("-marginb", o.margin_bottom),
    ] {
        if margin > 0.0 {
            args.push(valued(flag, margin));
        }
    }

    args.push(valued("-enc", &o.encoding));
    args.push(valued("-eol", o.eol.as_flag()));

    push_flag(&mut args, o.bom, "-bom");
    push_flag(&mut args, o.no_diagonal, "-nodiag");
    push_flag(&mut args, o.clip, "-clip");
    push_flag(&mut args, o.no_page_breaks, "-nopgbrk");
    push_passwords(&mut args, &o.owner_password, &o.user_password);

    args
}

/// Flags for `pdftopng`.
pub fn image_args(o: &ImageOptions) -> Vec<String> {
    let mut args = Vec::new();

    push_pages(&mut args, o.first_page, o.last_page);
    push_flag(&mut args, o.mono, "-mono");
    push_flag(&mut args, o.gray, "-gray");
    push_flag(&mut args, o.alpha, "-alpha");

    if o.resolution != ImageOptions::DEFAULT_RESOLUTION {
        args.push(valued("-r", o.resolution));
    }
    if o.rotation.degrees() != 0 {
        args.push(valued("-rot", o.rotation.degrees()));
    }

    // Rasteriser features are on by default; only switching one off is news
    // to the tool.
    push_flag(&mut args, !o.freetype, "-freetype no");
    push_flag(&mut args, !o.font_anti_aliasing, "-aa no");
    push_flag(&mut args, !o.vector_anti_aliasing, "-aaVector no");
    push_passwords(&mut args, &o.owner_password, &o.user_password);

    args
}

/// Flags for `pdftohtml`.
pub fn markup_args(o: &MarkupOptions) -> Vec<String> {
    let mut args = Vec::new();

    push_pages(&mut args, o.first_page, o.last_page);
    if o.zoom != 1.0 {
        args.push(valued("-z", o.zoom));
    }
    if o.resolution > 0 {
        args.push(valued("-r", o.resolution));
    }
    if o.vstretch != 1.0 {
        args.push(valued("-vstretch", o.vstretch));
    }
    push_flag(&mut args, o.embed_background, "-embedbackground");
    push_flag(&mut args, o.no_fonts, "-nofonts");
    push_flag(&mut args, o.embed_fonts, "-embedfonts");
    push_flag(&mut args, o.skip_invisible, "-skipinvisible");
    push_flag(&mut args, o.all_invisible, "-allinvisible");
    push_flag(&mut args, o.form_fields, "-formfields");
    push_flag(&mut args, o.table, "-table");
    push_passwords(&mut args, &o.owner_password, &o.user_password);

    args
}

fn push_pages(args: &mut Vec<String>, first: i32, last: i32) {
    if first > 0 {
        args.push(valued("-f", first));
    }
    if last > 0 {
        args.push(valued("-l", last));
    }
}

fn push_flag(args: &mut Vec<String>, enabled: bool, flag: &str) {
    if enabled {
        args.push(flag.to_string());
    }
}

fn push_passwords(args: &mut Vec<String>, owner: &Option<String>, user: &Option<String>) {
    for (flag, pwd) in [("-opw", owner), ("-upw", user)] {
        if let Some(pwd) = pwd.as_deref().filter(|p| !p.is_empty()) {
            args.push(valued(flag, pwd));
        }
    }
}

/// `"-flag value"` as a single token. The value is kept verbatim.
fn valued(flag: &str, value: impl Display) -> String {
    format!("{flag} {value}")
}

/// The argument vector handed to the tool.
///
/// A valued token splits at its first space into flag and value (flags never
/// contain spaces, values may), and the paths follow as-is. Nothing is ever
/// re-parsed, so quotes, spaces and non-UTF-8 bytes reach the tool intact.
pub fn argv(flags: &[String], input: &Path, output: &Path) -> Vec<OsString> {
    let mut argv = Vec::with_capacity(flags.len() * 2 + 2);
    for token in flags {
        match token.split_once(' ') {
            Some((flag, value)) => {
                argv.push(OsString::from(flag));
                argv.push(OsString::from(value));
            }
            None => argv.push(OsString::from(token)),
        }
    }
    argv.push(input.as_os_str().to_os_string());
    argv.push(output.as_os_str().to_os_string());
    argv
}

/// Wrap a path in double quotes for display.
pub fn quote_path(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Human-readable command line: flag tokens then the quoted paths. Used for
/// logging only; the tool receives [`argv`].
pub fn command_line(flags: &[String], input: &Path, output: &Path) -> String {
    let mut tokens = flags.to_vec();
    tokens.push(quote_path(input));
    tokens.push(quote_path(output));
    tokens.join(" ")
}
