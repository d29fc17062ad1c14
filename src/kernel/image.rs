// Mon Oct 19 2026 - Alex

use crate::kernel::{KernelError, Region};
use chrono::{DateTime, Utc};
use goblin::mach::cputype::{CPU_SUBTYPE_X86_64_ALL, CPU_TYPE_X86_64};
use goblin::mach::fat::FAT_MAGIC;
use goblin::mach::{peek, MultiArch};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

// High byte of cpusubtype carries capability flags, not the subtype.
const CPU_SUBTYPE_CAPABILITY_MASK: u32 = 0xff00_0000;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Darwin Kernel Version [0-9]+\.[0-9]+\.[0-9]+: ([A-Z][a-z]{2} [A-Z][a-z]{2} [ 1-9][0-9] [0-9]{2}:[0-9]{2}:[0-9]{2} [A-Z]{3} [0-9]{4});(?-u:[^\x00])*")
        .expect("version regex is valid")
});

/// A kernel file held in memory. All offsets handed out by [`KernelImage::image`]
/// and [`Region`] are relative to the x86-64 image, which for a fat file is
/// one slice of the whole.
pub struct KernelImage {
    path: PathBuf,
    data: Vec<u8>,
    slice: Range<usize>,
    version: Range<usize>,
    timestamp: Range<usize>,
}

impl KernelImage {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, KernelError> {
        let path_buf = path.as_ref().to_path_buf();
        let data = fs::read(&path_buf)?;
        log::debug!("read {} bytes from {}", data.len(), path_buf.display());
        Self::from_bytes(path_buf, data)
    }

    pub fn from_bytes(path: PathBuf, data: Vec<u8>) -> Result<Self, KernelError> {
        let slice = select_slice(&data)?;
        let (version, timestamp) = find_version(&data[slice.clone()])?;

        Ok(Self {
            path,
            data,
            slice,
            version,
            timestamp,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn image(&self) -> &[u8] {
        &self.data[self.slice.clone()]
    }

    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.slice.clone()]
    }

    pub fn version(&self) -> String {
        String::from_utf8_lossy(&self.image()[self.version.clone()]).into_owned()
    }

    pub fn timestamp(&self) -> String {
        String::from_utf8_lossy(&self.image()[self.timestamp.clone()]).into_owned()
    }

    /// Overwrites the build date in the version string so a patched kernel can
    /// be told apart from the stock one. The string keeps its length.
    pub fn stamp_timestamp(&mut self, now: DateTime<Utc>) {
        let stamp = now.format("%a %b %e %H:%M:%S UTC %Y").to_string();
        let range = self.timestamp.clone();
        let dst = &mut self.image_mut()[range];
        let n = dst.len().min(stamp.len());
        dst[..n].copy_from_slice(&stamp.as_bytes()[..n]);
        log::debug!("stamped version timestamp with {}", stamp);
    }

    pub fn split_regions(
        &mut self,
        anchor: &Region,
        target: &Region,
    ) -> Result<(&[u8], &mut [u8]), KernelError> {
        let len = self.slice.len();
        let out_of_bounds = |region: &Region| KernelError::InvalidRegionBounds {
            name: region.name.clone(),
            start: region.range.start as u64,
            end: region.range.end as u64,
            len,
        };
        for region in [anchor, target] {
            if region.range.start > region.range.end || region.range.end > len {
                return Err(out_of_bounds(region));
            }
        }

        let image = self.image_mut();
        if anchor.range.end <= target.range.start {
            let (head, tail) = image.split_at_mut(target.range.start);
            Ok((&head[anchor.range.clone()], &mut tail[..target.range.len()]))
        } else if target.range.end <= anchor.range.start {
            let (head, tail) = image.split_at_mut(anchor.range.start);
            Ok((&tail[..anchor.range.len()], &mut head[target.range.clone()]))
        } else {
            Err(KernelError::OverlappingRegions(anchor.name.clone(), target.name.clone()))
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KernelError> {
        fs::write(path.as_ref(), &self.data)?;
        log::info!("wrote {} bytes to {}", self.data.len(), path.as_ref().display());
        Ok(())
    }
}

pub fn select_slice(data: &[u8]) -> Result<Range<usize>, KernelError> {
    if data.len() < 4 || peek(data, 0)? != FAT_MAGIC {
        return Ok(0..data.len());
    }

    let multi = MultiArch::new(data)?;
    for arch in multi.arches()? {
        log::debug!(
            "fat slice: cputype {:#x} subtype {:#x} at {:#x}+{:#x}",
            arch.cputype,
            arch.cpusubtype,
            arch.offset,
            arch.size
        );
        if arch.cputype != CPU_TYPE_X86_64
            || arch.cpusubtype & !CPU_SUBTYPE_CAPABILITY_MASK != CPU_SUBTYPE_X86_64_ALL
        {
            continue;
        }

        let offset = arch.offset as usize;
        let end = offset.saturating_add(arch.size as usize);
        if end > data.len() {
            return Err(KernelError::InvalidSlice {
                offset,
                end,
                len: data.len(),
            });
        }
        return Ok(offset..end);
    }

    Err(KernelError::NoX86Slice)
}

pub fn find_version(image: &[u8]) -> Result<(Range<usize>, Range<usize>), KernelError> {
    let mut found = VERSION_RE.captures_iter(image);
    let first = found.next().ok_or(KernelError::VersionNotFound)?;

    let extra = found.count();
    if extra > 0 {
        log::warn!("found {} kernel version strings, using the first", extra + 1);
    }

    let version = first.get(0).ok_or(KernelError::VersionNotFound)?.range();
    let timestamp = first.get(1).ok_or(KernelError::VersionNotFound)?.range();
    Ok((version, timestamp))
}
