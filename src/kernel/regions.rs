// Mon Oct 19 2026 - Alex

use crate::kernel::KernelError;
use goblin::mach::MachO;
use indexmap::IndexMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct NamedRegions {
    regions: IndexMap<String, Region>,
}

impl NamedRegions {
    pub fn get(&self, name: &str) -> Result<&Region, KernelError> {
        self.regions
            .get(name)
            .ok_or_else(|| KernelError::RegionNotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    pub addr: u64,
    pub size: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub address: u64,
    pub section: SectionEntry,
}

/// Resolves each requested symbol to the bytes between it and the next symbol
/// by address (or the end of its section for the last one).
pub fn locate_named_regions(image: &[u8], names: &[&str]) -> Result<NamedRegions, KernelError> {
    let symbols = read_symbols(image)?;
    log::debug!("read {} section symbols", symbols.len());
    resolve_regions(symbols, names, image.len())
}

pub fn read_symbols(image: &[u8]) -> Result<Vec<SymbolEntry>, KernelError> {
    let macho = MachO::parse(image, 0)?;

    let mut sections = Vec::new();
    for segment in macho.segments.iter() {
        for (section, _data) in segment.sections()? {
            sections.push(SectionEntry {
                addr: section.addr,
                size: section.size,
                offset: section.offset as u64,
            });
        }
    }

    let mut symbols = Vec::new();
    for sym in macho.symbols() {
        let (name, nlist) = sym?;
        // n_sect is 1-based, 0 means NO_SECT
        let Some(&section) = nlist.n_sect.checked_sub(1).and_then(|i| sections.get(i)) else {
            continue;
        };
        symbols.push(SymbolEntry {
            name: name.to_string(),
            address: nlist.n_value,
            section,
        });
    }

    Ok(symbols)
}

pub fn resolve_regions(
    mut symbols: Vec<SymbolEntry>,
    names: &[&str],
    len: usize,
) -> Result<NamedRegions, KernelError> {
    symbols.sort_by_key(|s| s.address);

    let mut regions = NamedRegions::default();
    for (i, sym) in symbols.iter().enumerate() {
        if !names.contains(&sym.name.as_str()) {
            continue;
        }
        if regions.regions.contains_key(&sym.name) {
            log::warn!("duplicate symbol {} at {:#x}, keeping the first", sym.name, sym.address);
            continue;
        }

        let section = sym.section;
        let invalid = |start: u64, end: u64| KernelError::InvalidRegionBounds {
            name: sym.name.clone(),
            start,
            end,
            len,
        };

        let size = match symbols.get(i + 1) {
            Some(next) => next.address - sym.address,
            None => (section.addr + section.size)
                .checked_sub(sym.address)
                .ok_or_else(|| invalid(sym.address, sym.address))?,
        };
        let start = sym.address
            .checked_sub(section.addr)
            .map(|delta| section.offset + delta)
            .ok_or_else(|| invalid(sym.address, sym.address))?;
        let end = start.checked_add(size).ok_or_else(|| invalid(start, u64::MAX))?;
        if end > len as u64 {
            return Err(invalid(start, end));
        }

        log::debug!("{}: [{:#x}:{:#x}]", sym.name, start, end);
        regions.regions.insert(
            sym.name.clone(),
            Region {
                name: sym.name.clone(),
                range: start as usize..end as usize,
            },
        );
    }

    for name in names {
        if !regions.regions.contains_key(*name) {
            return Err(KernelError::RegionNotFound(name.to_string()));
        }
    }

    Ok(regions)
}
