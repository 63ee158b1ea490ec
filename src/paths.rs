// Path generation for the two mirrored file trees (EXFORtables, ENDFtables).
//
// Both trees are read-only corpora maintained by an external ingestion
// pipeline; this module only renders the directory convention for a request
// and lists what is already there. A directory that does not exist yields an
// empty file list, never an error.
//
// The public functions read the tree roots from the global `Config`; the
// `*_in` variants take an explicit root so callers (and tests) can point at
// an arbitrary tree.
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Config;
use crate::error::Result;
use crate::nuclide::{capitalize, elemtoz, exforstyle_residual_expression, split_mass_field};
use crate::reaction::convert_partial_reactionstr_to_inl;
use crate::request::{Observable, QueryParams};

/// Directory and matching files in the EXFORtables tree for a request,
/// rooted at the configured `exfortables_path`.
pub fn exfortables_file_path(params: &QueryParams) -> Result<(PathBuf, Vec<String>)> {
    let root = Config::global().exfortables_path.clone();
    exfortables_file_path_in(&root, params)
}

/// Directory and matching files in the ENDFtables tree for a request,
/// rooted at the configured `endftables_path`.
pub fn endftables_file_path(params: &QueryParams) -> Result<(PathBuf, Vec<String>)> {
    let root = Config::global().endftables_path.clone();
    endftables_file_path_in(&root, params)
}

/// EXFORtables lookup under an explicit tree root.
///
/// Layout is `{root}/{projectile}/{Elem-Mass}/{reaction-dashed}/{obs}` with
/// two specializations: discrete-level requests rewrite the reaction to its
/// inelastic form and append `-L{n}` to the reaction directory, and fission
/// yields nest under `fission/yield/{fy_type}`. Residual-production requests
/// list the plain cross-section directory filtered by the residual token.
pub fn exfortables_file_path_in(
    root: &Path,
    params: &QueryParams,
) -> Result<(PathBuf, Vec<String>)> {
    let obs = params.observable()?;
    let reaction = params.reaction()?.to_lowercase();
    let (mass_num, _) = split_mass_field(params.target_mass()?)?;
    let target = format!("{}-{}", capitalize(params.target_elem()?), mass_num);

    let projectile = reaction.split(',').next().unwrap_or("").to_string();

    let dir = if let Some(level) = params.level_num {
        let reaction = convert_partial_reactionstr_to_inl(&reaction).to_lowercase();
        root.join(&projectile)
            .join(&target)
            .join(format!("{}-L{}", reaction.replace(',', "-"), level))
            .join(obs.exfortables_subdir())
    } else if obs == Observable::Fy {
        root.join(&projectile)
            .join(&target)
            .join(reaction.replace(',', "-"))
            .join("fission")
            .join("yield")
            .join(params.fy_type()?.to_lowercase())
    } else {
        root.join(&projectile)
            .join(&target)
            .join(reaction.replace(',', "-"))
            .join(obs.exfortables_subdir())
    };
    debug!("exfortables dir: {}", dir.display());

    let files = if obs == Observable::Rp {
        let residual = exforstyle_residual_expression(params.rp_elem()?, params.rp_mass()?)?;
        list_dir(&dir, Some(&residual))
    } else {
        list_dir(&dir, None)
    };

    Ok((dir, files))
}

/// ENDFtables lookup under an explicit tree root.
///
/// Every known evaluation is probed in turn: `{root}/{projectile}/{Elem}{AAA}/
/// {lib}/tables/{obs}` (fission yields instead live under a top-level `FY`
/// branch, `{root}/FY/{projectile}/{Elem}{AAA}/{lib}/tables/FY`). Files are
/// matched by the `MT{mt}` token, or for residual production by the
/// `rp{ZZZ}{AAA}.{lib}` filename stem. The returned directory is the last
/// candidate probed; filenames carry the library tag so the accumulated list
/// stays unambiguous.
pub fn endftables_file_path_in(
    root: &Path,
    params: &QueryParams,
) -> Result<(PathBuf, Vec<String>)> {
    let obs = params.observable()?;
    let reaction = params.reaction()?.to_lowercase();
    let (mass_num, _) = split_mass_field(params.target_mass()?)?;
    let target = format!("{}{:03}", capitalize(params.target_elem()?), mass_num);

    let projectile = reaction.split(',').next().unwrap_or("").to_string();

    let mut dir = PathBuf::new();
    let mut libfiles = Vec::new();

    for lib in crate::data::LIB_LIST {
        dir = if obs == Observable::Fy {
            root.join("FY")
                .join(&projectile)
                .join(&target)
                .join(lib)
                .join("tables")
                .join("FY")
        } else {
            root.join(&projectile)
                .join(&target)
                .join(lib)
                .join("tables")
                .join(obs.endf_type())
        };

        if obs == Observable::Rp {
            let zzz = elemtoz(params.rp_elem()?)?;
            let (aaa, _) = split_mass_field(params.rp_mass()?)?;
            let stem = format!("rp{:03}{:03}.{}", zzz, aaa, lib);
            libfiles.extend(list_dir(&dir, Some(&stem)));
        } else {
            let token = format!("MT{}", params.mt_padded()?);
            libfiles.extend(list_dir(&dir, Some(&token)));
        }
    }
    debug!("endftables dir: {}, {} files", dir.display(), libfiles.len());

    Ok((dir, libfiles))
}

/// Render download links for files under a directory: the given data root is
/// stripped so the result is relative to wherever the corpus is served from.
/// Output is sorted by filename.
pub fn link_of_files_in(data_dir: &Path, dir: &Path, files: &[String]) -> Vec<String> {
    let mut sorted: Vec<&String> = files.iter().collect();
    sorted.sort();

    sorted
        .into_iter()
        .map(|f| {
            let full = dir.join(f);
            full.strip_prefix(data_dir)
                .unwrap_or(&full)
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// [`link_of_files_in`] against the configured data root.
pub fn link_of_files(dir: &Path, files: &[String]) -> Vec<String> {
    let data_dir = Config::global().data_dir.clone();
    link_of_files_in(&data_dir, dir, files)
}

/// Sorted filenames in `dir`, optionally restricted to names containing
/// `token`. A missing or unreadable directory is an empty listing.
fn list_dir(dir: &Path, token: Option<&str>) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| token.map_or(true, |t| name.contains(t)))
        .collect();
    files.sort();
    files
}
