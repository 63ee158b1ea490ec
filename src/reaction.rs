// Reaction-code normalization between the EXFOR convention (projectile +
// SF3 process code), the ENDF MT convention, and the partial/discrete-level
// code convention used by both file trees.
use crate::data::{MT_FY_SF5, MT_NU_SF5, MT_RANGE, SF3_MT};
use crate::error::{Error, Result};

/// A reaction channel as a (projectile, process) pair in the EXFOR style,
/// e.g. `N,INL` or `N,P1`. Both fields are stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCode {
    pub projectile: String,
    pub process: String,
}

impl ReactionCode {
    /// Parse a user-facing reaction string such as `"n,p"` or `"n,n1"`.
    pub fn parse(reaction: &str) -> Result<Self> {
        let mut parts = reaction.trim().splitn(2, ',');
        let projectile = parts.next().unwrap_or("").trim();
        let process = parts.next().unwrap_or("").trim();
        if projectile.is_empty() || process.is_empty() {
            return Err(Error::InvalidParameter {
                name: "reaction",
                value: reaction.to_string(),
            });
        }
        Ok(ReactionCode {
            projectile: projectile.to_uppercase(),
            process: process.to_uppercase(),
        })
    }

    /// The discrete level number when this is a partial code (`P1` -> 1).
    pub fn level_num(&self) -> Option<i32> {
        let (_, level) = split_process_code(&self.process);
        level
    }
}

/// Split a process code into its particle part and trailing level number,
/// `"P2"` -> `("P", Some(2))`, `"INL"` -> `("INL", None)`.
///
/// Codes listed in the SF3 table ("2N", "HE3", ...) contain digits without
/// being partial codes, so the table is consulted before splitting.
fn split_process_code(process: &str) -> (&str, Option<i32>) {
    if SF3_MT.contains_key(process) {
        return (process, None);
    }
    let split = process
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(process.len());
    let (letters, digits) = process.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return (process, None);
    }
    (letters, digits.parse().ok())
}

/// Normalize a reaction string to the EXFOR process spelling: upper-case,
/// with the verbose `TOTAL` reduced to the stored `TOT` code.
pub fn convert_reaction_to_exfor_style(reaction: &str) -> String {
    reaction.trim().to_uppercase().replace("TOTAL", "TOT")
}

/// Rewrite a partial reaction string to its EXFOR equivalent.
///
/// If the outgoing particle equals the projectile the discrete level belongs
/// to inelastic scattering: `"n,n1"` -> `"N,INL"` (and `"a,a1"` -> `"A,INL"`).
/// Otherwise the level number is simply dropped: `"n,a1"` -> `"N,A"`.
pub fn convert_partial_reactionstr_to_inl(reaction: &str) -> String {
    let upper = reaction.trim().to_uppercase();
    let mut parts = upper.splitn(2, ',');
    let projectile = parts.next().unwrap_or("");
    let process = parts.next().unwrap_or("");
    let (particle, _) = split_process_code(process);

    if particle == projectile {
        format!("{},INL", projectile)
    } else {
        format!("{},{}", projectile, particle)
    }
}

/// MT number for a (projectile, process) pair.
///
/// Plain codes go through the SF3 table. Partial codes where the outgoing
/// particle equals the projectile are rewritten to `INL` first; all other
/// partial codes map into the particle's reserved MT range indexed by level
/// number. A level number beyond the end of the range CLAMPS to the range
/// maximum instead of failing: the file naming convention has no way to
/// express higher levels, so the top of the range doubles as "last level or
/// continuum". Callers that care must check the level against the range
/// themselves.
pub fn get_mt(projectile: &str, process: &str) -> Result<i32> {
    let projectile = projectile.trim().to_uppercase();
    let process = process.trim().to_uppercase();

    let (particle, level) = split_process_code(&process);
    match level {
        None => SF3_MT
            .get(process.as_str())
            .copied()
            .ok_or_else(|| Error::UnknownReaction(format!("{},{}", projectile, process))),
        Some(level) => {
            if particle == projectile {
                // (n,n1) and friends collapse to inelastic before lookup
                return Ok(SF3_MT["INL"]);
            }
            mt_for_level(particle, level)
                .ok_or_else(|| Error::UnknownReaction(format!("{},{}", projectile, process)))
        }
    }
}

/// Synthetic MT for a discrete-level code: range start plus level number,
/// clamped at the range end. `None` when the particle has no reserved range.
pub fn mt_for_level(particle: &str, level: i32) -> Option<i32> {
    MT_RANGE
        .iter()
        .find(|(p, _)| *p == particle)
        .map(|(_, (lo, hi))| lo.saturating_add(level).min(*hi))
}

/// Outgoing-particle bucket an MT number belongs to, if any. The first
/// matching range wins.
pub fn particle_for_mt(mt: i32) -> Option<&'static str> {
    MT_RANGE
        .iter()
        .find(|(_, (lo, hi))| (*lo..=*hi).contains(&mt))
        .map(|(p, _)| *p)
}

/// MT number for a fission-yield branch code (`IND`, `CUM`, ...).
pub fn mt_for_fy_branch(branch: &str) -> Option<i32> {
    MT_FY_SF5.get(branch.to_uppercase().as_str()).copied()
}

/// MT number for a neutron-multiplicity branch code (`PR`, `DL`, `TOT`).
pub fn mt_for_nu_branch(branch: &str) -> Option<i32> {
    MT_NU_SF5.get(branch.to_uppercase().as_str()).copied()
}
