// Mon Oct 19 2026 - Alex

use crate::fix::generator::{CallSite, SiteLayout};
use crate::fix::FixError;
use crate::pattern::Pattern;
use crate::utils::binary::read_u32_le;

pub const TLS: &str = "tls";

/// Shared contract of everything the version selector can try.
pub trait Fix {
    fn version(&self) -> &str;

    /// Matches and rewrites without touching the target region.
    fn plan(&self, anchor: &[u8], target: &[u8]) -> Result<PatchPlan, FixError>;

    fn apply(&self, anchor: &[u8], target: &mut [u8]) -> Result<PatchReport, FixError> {
        let plan = self.plan(anchor, target)?;
        Ok(plan.commit(target))
    }
}

/// The fix for one kernel version: an anchor pattern expected exactly once at
/// the start of the anchor region, and target patterns expected exactly twice
/// in total across the target region.
#[derive(Debug, Clone)]
pub struct FixDescriptor {
    version: String,
    anchor: Pattern,
    targets: Vec<Pattern>,
}

impl FixDescriptor {
    pub fn new(version: &str, anchor: Pattern, targets: Vec<Pattern>) -> Result<Self, FixError> {
        let tls = anchor.mark_by_label(TLS).ok_or(FixError::MissingCapture(TLS))?;
        if tls.index + 4 > anchor.len() {
            return Err(FixError::InvalidLayout(anchor.to_hex_string()));
        }
        for target in &targets {
            SiteLayout::from_pattern(target)?;
        }

        Ok(Self {
            version: version.to_string(),
            anchor,
            targets,
        })
    }

    pub fn anchor(&self) -> &Pattern {
        &self.anchor
    }

    pub fn targets(&self) -> &[Pattern] {
        &self.targets
    }

    pub fn tls_offset(&self, anchor: &[u8]) -> Result<u32, FixError> {
        let Some(captures) = self.anchor.match_start(anchor, 0) else {
            log::debug!("{}: anchor {} does not match", self.version, self.anchor);
            return Err(FixError::AnchorMismatch);
        };
        let at = captures.offset(TLS).ok_or(FixError::MissingCapture(TLS))?;
        read_u32_le(anchor, at).ok_or(FixError::AnchorMismatch)
    }

    pub fn find_targets(&self, target: &[u8]) -> Result<Vec<(usize, usize)>, FixError> {
        let found: Vec<(usize, usize)> = self.targets.iter()
            .enumerate()
            .flat_map(|(i, pattern)| pattern.find_all(target).map(move |offset| (i, offset)))
            .collect();

        match found.len() {
            0 => Err(FixError::NoTargetMatch),
            1 => Err(FixError::IncompleteTargetMatch { offsets: starts(&found) }),
            2 => Ok(found),
            count => Err(FixError::AmbiguousTargetMatch { count, offsets: starts(&found) }),
        }
    }
}

fn starts(found: &[(usize, usize)]) -> Vec<usize> {
    found.iter().map(|&(_, offset)| offset).collect()
}

impl Fix for FixDescriptor {
    fn version(&self) -> &str {
        &self.version
    }

    fn plan(&self, anchor: &[u8], target: &[u8]) -> Result<PatchPlan, FixError> {
        let tls_offset = self.tls_offset(anchor)?;
        log::debug!("{}: tls offset {:#x}", self.version, tls_offset);

        let mut replacements = Vec::new();
        for (i, offset) in self.find_targets(target)? {
            let captures = self.targets[i]
                .match_start(target, offset)
                .ok_or(FixError::TargetRematch(offset))?;
            log::debug!(
                "{}: {} at {:#x}: {:?}",
                self.version,
                self.targets[i].name().unwrap_or("target"),
                offset,
                captures.named().collect::<Vec<_>>()
            );
            let layout = SiteLayout::from_captures(&captures)?;
            let site = CallSite::new(offset, &target[offset..], layout);
            replacements.push(Replacement {
                offset,
                bytes: site.rewrite(tls_offset)?,
            });
        }

        Ok(PatchPlan { tls_offset, replacements })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// Replacement blocks for every matched site, built before anything is
/// written. Committing is the only step that mutates the target region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    tls_offset: u32,
    replacements: Vec<Replacement>,
}

impl PatchPlan {
    pub fn commit(self, target: &mut [u8]) -> PatchReport {
        let mut sites = Vec::with_capacity(self.replacements.len());
        for replacement in &self.replacements {
            let end = replacement.offset + replacement.bytes.len();
            target[replacement.offset..end].copy_from_slice(&replacement.bytes);
            sites.push(replacement.offset);
        }

        PatchReport {
            tls_offset: self.tls_offset,
            sites,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub tls_offset: u32,
    pub sites: Vec<usize>,
}
