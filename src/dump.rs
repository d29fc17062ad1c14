// Mon Oct 19 2026 - Alex

use crate::kernel::{KernelImage, Region};
use crate::utils::binary::{format_bytes, hex_dump};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Write};
use std::process::{Command, Stdio};

pub const MAX_INSTRUCTION_BYTES: usize = 20;

static DISAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"0x[0-9a-f]+\s+<\w+\+(\d+)>:").expect("disassembly regex is valid"));

/// Prints what a maintainer needs to add support for a new kernel: the
/// version string and a disassembly of each region with its raw bytes.
pub fn dump<'a, W: Write>(
    image: &KernelImage,
    regions: impl IntoIterator<Item = &'a Region>,
    program: &str,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "{}", image.path().display())?;
    writeln!(out, "version: {}", image.version())?;

    for region in regions {
        let code = &image.image()[region.range.clone()];
        // the debugger knows C names, the symbol table has the leading underscore
        let name = region.name.strip_prefix('_').unwrap_or(&region.name);

        writeln!(out, "$ {} {} # disas {}", program, image.path().display(), name)?;
        match run_disassembler(program, image, name) {
            Ok(listing) => out.write_all(annotate_disassembly(&listing, code).as_bytes())?,
            Err(e) => {
                log::warn!("cannot run {}: {}", program, e);
                writeln!(out, "running {} 'disas {}': {}", program, name, e)?;
                out.write_all(hex_dump(code, region.range.start).as_bytes())?;
            }
        }
    }

    Ok(())
}

fn run_disassembler(program: &str, image: &KernelImage, name: &str) -> io::Result<String> {
    let mut child = Command::new(program)
        .arg(image.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // a program that exits without reading stdin may still have printed something
        match writeln!(stdin, "disas {}", name) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
            _ => {}
        }
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        log::warn!("{} exited with {}", program, output.status);
    }

    let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
    listing.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(listing)
}

/// Interleaves `code` into a debugger listing: each `0x... <name+N>:` line is
/// followed by the bytes from its offset up to the next instruction (or the
/// end of `code` for the last one), capped at [`MAX_INSTRUCTION_BYTES`].
pub fn annotate_disassembly(listing: &str, code: &[u8]) -> String {
    let mut result = String::new();
    let mut last: Option<usize> = None;

    let mut flush = |result: &mut String, next: Option<usize>| {
        if let Some(start) = last {
            let end = next.unwrap_or(code.len());
            if end > start && end <= code.len() {
                let n = (end - start).min(MAX_INSTRUCTION_BYTES);
                result.push('\t');
                result.push_str(&format_bytes(&code[start..start + n]));
                result.push('\n');
            }
        }
        last = next;
    };

    for line in listing.lines() {
        let offset = DISAS_RE
            .captures(line)
            .and_then(|m| m.get(1))
            .and_then(|n| n.as_str().parse::<usize>().ok());
        flush(&mut result, offset);
        result.push_str(line);
        result.push('\n');
    }
    flush(&mut result, None);

    result
}
