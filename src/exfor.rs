// Queries against the experimental-data (EXFOR) store.
//
// Every public method builds its WHERE clause dynamically from the request
// parameters: a predicate is only appended when the corresponding parameter
// is present, so absent keys never inject false NULL-equality filters. The
// one exception is the junk-exclusion switch, which deliberately filters on
// NULL sub-field codes to avoid double counting derived quantities.
use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use rusqlite::{Connection, OpenFlags, ToSql};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::FY_BRANCH_ALIASES;
use crate::error::Result;
use crate::nuclide::{exforstyle_residual_expression, x4style_nuclide_expression};
use crate::reaction::{convert_partial_reactionstr_to_inl, convert_reaction_to_exfor_style};
use crate::request::{Observable, QueryParams};

/// One row of the reaction index, keyed by entry id in query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub level_num: Option<i32>,
    pub e_inc_min: Option<f64>,
    pub e_inc_max: Option<f64>,
    pub points: Option<i32>,
    pub x4_code: Option<String>,
    pub mt: Option<i32>,
    pub mf: Option<i32>,
}

/// Author / year summary used for plot legends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BibEntry {
    pub author: Option<String>,
    pub year: i32,
}

/// One measurement row. Columns not selected for the requested observable
/// stay `None`, so the same row type serves every observable's frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataRow {
    pub entry_id: String,
    pub en_inc: Option<f64>,
    pub den_inc: Option<f64>,
    pub data: Option<f64>,
    pub ddata: Option<f64>,
    pub level_num: Option<i32>,
    pub residual: Option<String>,
    pub angle: Option<f64>,
    pub dangle: Option<f64>,
    pub e_out: Option<f64>,
    pub de_out: Option<f64>,
    pub charge: Option<i32>,
    pub mass: Option<i32>,
    pub isomer: Option<i32>,
}

/// Filters accepted by the multi-criteria entry search. Empty vectors and
/// `None` fields add no predicate, so the default value matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// SF6 quantity codes (`SIG`, `DA`, ...).
    pub types: Vec<String>,
    pub target_elem: Option<String>,
    /// When absent, `target_elem` alone matches every isotope of the element.
    pub target_mass: Option<String>,
    pub projectile: Option<String>,
    /// Reaction strings in the `projectile,process` form.
    pub reactions: Vec<String>,
    pub sf4: Option<String>,
    pub sf5: Vec<String>,
    pub sf7: Option<String>,
    pub sf8: Vec<String>,
    pub first_author: Option<String>,
    pub authors: Option<String>,
    /// Facility institute codes, stored parenthesized (`(2GERKFK)`).
    pub facilities: Vec<String>,
    pub facility_types: Vec<String>,
}

/// One search hit: the reaction index row joined with its bibliography and
/// the incident-energy envelope over the entry's data sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRow {
    pub entry: String,
    pub entry_id: String,
    pub target: Option<String>,
    pub projectile: Option<String>,
    pub process: Option<String>,
    pub sf4: Option<String>,
    pub sf5: Option<String>,
    pub sf6: Option<String>,
    pub sf7: Option<String>,
    pub sf8: Option<String>,
    pub x4_code: Option<String>,
    pub first_author: Option<String>,
    pub authors: Option<String>,
    pub year: Option<i32>,
    pub main_reference: Option<String>,
    pub main_doi: Option<String>,
    pub main_facility_institute: Option<String>,
    pub main_facility_type: Option<String>,
    pub e_inc_min: Option<f64>,
    pub e_inc_max: Option<f64>,
}

/// Index summary returned by the fission branch presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FissionIndexEntry {
    pub e_inc_min: Option<f64>,
    pub e_inc_max: Option<f64>,
    pub points: Option<i32>,
    pub sf5: Option<String>,
    pub sf8: Option<String>,
    pub x4_code: Option<String>,
}

/// Expand a user-facing fission-yield branch to the SF5 codes reporting the
/// same quantity. Unlisted branches expand to themselves.
pub fn fy_branch(branch: &str) -> Vec<String> {
    let upper = branch.to_uppercase();
    match FY_BRANCH_ALIASES.get(upper.as_str()) {
        Some(codes) => codes.iter().map(|c| c.to_string()).collect(),
        None => vec![upper],
    }
}

/// Read-only handle on the experimental-data store.
pub struct ExforStore {
    conn: Connection,
}

impl ExforStore {
    /// Open the store at the given SQLite file, read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(ExforStore { conn })
    }

    /// Open the store configured in [`Config::global`].
    pub fn open_default() -> Result<Self> {
        let path = Config::global().exfor_db.clone();
        Self::open(path)
    }

    /// Wrap an existing connection (test fixtures use in-memory databases).
    pub fn from_connection(conn: Connection) -> Self {
        ExforStore { conn }
    }

    /// Query the reaction index for the requested nuclide / channel /
    /// observable and return `entry_id -> IndexEntry`, ordered by entry id.
    /// No matching rows is an empty map, not an error.
    pub fn index_query(&self, params: &QueryParams) -> Result<BTreeMap<String, IndexEntry>> {
        let obs = params.observable()?;
        let target = x4style_nuclide_expression(params.target_elem()?, params.target_mass()?)?;
        let mut reaction = convert_reaction_to_exfor_style(params.reaction()?);

        let mut clauses: Vec<String> = vec!["target = ?".into(), "arbitrary_data = 0".into()];
        let mut binds: Vec<Box<dyn ToSql>> = vec![Box::new(target)];

        // Branch / discrete level / junk-exclusion arm: exactly one applies.
        if let Some(branch) = params.branch.as_deref() {
            let branch = branch.to_uppercase();
            if obs == Observable::Fy {
                let codes = fy_branch(&branch);
                clauses.push(format!("sf5 IN ({})", placeholders(codes.len())));
                for code in codes {
                    binds.push(Box::new(code));
                }
            } else {
                clauses.push("sf5 = ?".into());
                binds.push(Box::new(branch));
            }
        } else if let Some(level) = params.level_num {
            reaction = convert_partial_reactionstr_to_inl(&reaction);
            clauses.push("sf5 = 'PAR'".into());
            clauses.push("level_num = ?".into());
            binds.push(Box::new(level));
        } else if params.excl_junk_switch {
            clauses.push("sf5 IS NULL".into());
        }

        if obs == Observable::Rp {
            let residual =
                exforstyle_residual_expression(params.rp_elem()?, params.rp_mass()?)?;
            let projectile = reaction.split(',').next().unwrap_or("").to_string();
            clauses.push("projectile = ?".into());
            binds.push(Box::new(projectile));
            clauses.push("residual = ?".into());
            binds.push(Box::new(residual));
        } else {
            clauses.push("process = ?".into());
            binds.push(Box::new(reaction.clone()));

            // For discrete channels, drop index rows whose residual carries
            // a ground/metastable tag; those are counted via RP instead.
            if !reaction.contains("TOT") && !reaction.contains('F') {
                for tag in ["-G", "-M", "-L", "-M1", "-M2"] {
                    clauses.push(format!("(sf4 IS NULL OR sf4 NOT LIKE '%{}')", tag));
                }
            }
        }

        if obs == Observable::Fy {
            match params.mesurement_opt_fy.as_deref() {
                Some("A") => clauses.push("sf4 = 'MASS'".into()),
                Some("Z") => clauses.push("sf4 = 'ELEM'".into()),
                _ => clauses.push("sf4 IS NOT NULL".into()),
            }
            if let Some(product) = params.reac_product_fy.as_deref() {
                clauses.push("residual = ?".into());
                binds.push(Box::new(product.to_string()));
            }
        }

        if params.excl_junk_switch {
            clauses.push("sf7 IS NULL".into());
            clauses.push("sf8 IS NULL".into());
        }

        clauses.push("sf6 = ?".into());
        binds.push(Box::new(obs.exfor_sf6().to_string()));

        let sql = format!(
            "SELECT entry_id, level_num, e_inc_min, e_inc_max, points, x4_code, mt, mf
             FROM exfor_index WHERE {}",
            clauses.join(" AND ")
        );
        debug!("exfor index query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            let entry_id: String = row.get(0)?;
            Ok((
                entry_id,
                IndexEntry {
                    level_num: row.get(1)?,
                    e_inc_min: row.get(2)?,
                    e_inc_max: row.get(3)?,
                    points: row.get(4)?,
                    x4_code: row.get(5)?,
                    mt: row.get(6)?,
                    mf: row.get(7)?,
                },
            ))
        })?;

        let mut entries = BTreeMap::new();
        for row in rows {
            let (entry_id, entry) = row?;
            entries.insert(entry_id, entry);
        }
        Ok(entries)
    }

    /// Multi-criteria entry search backing the search endpoint: the reaction
    /// index joined with the bibliography, grouped per entry id with the
    /// min/max incident energy over the entry's data sets, ordered by year
    /// descending. Element without mass matches every isotope of the element.
    pub fn entries_query(&self, criteria: &SearchCriteria) -> Result<Vec<SearchRow>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<Box<dyn ToSql>> = Vec::new();

        if !criteria.types.is_empty() {
            clauses.push(format!("i.sf6 IN ({})", placeholders(criteria.types.len())));
            for t in &criteria.types {
                binds.push(Box::new(t.to_uppercase()));
            }
        }

        if let Some(elem) = criteria.target_elem.as_deref() {
            match criteria.target_mass.as_deref() {
                Some(mass) => {
                    clauses.push("i.target = ?".into());
                    binds.push(Box::new(x4style_nuclide_expression(elem, mass)?));
                }
                None => {
                    let z = crate::nuclide::elemtoz(elem)?;
                    clauses.push("i.target LIKE ?".into());
                    binds.push(Box::new(format!("%{}-{}-%", z, elem.to_uppercase())));
                }
            }
        }

        if !criteria.reactions.is_empty() {
            clauses.push(format!(
                "i.process IN ({})",
                placeholders(criteria.reactions.len())
            ));
            for r in &criteria.reactions {
                binds.push(Box::new(convert_reaction_to_exfor_style(r)));
            }
        } else if let Some(projectile) = criteria.projectile.as_deref() {
            clauses.push("i.projectile = ?".into());
            binds.push(Box::new(projectile.to_uppercase()));
        }

        if let Some(author) = criteria.first_author.as_deref() {
            clauses.push("b.first_author LIKE ?".into());
            binds.push(Box::new(format!("%{}%", crate::nuclide::capitalize(author))));
        }
        if let Some(authors) = criteria.authors.as_deref() {
            clauses.push("b.authors LIKE ?".into());
            binds.push(Box::new(format!("%{}%", crate::nuclide::capitalize(authors))));
        }

        if let Some(sf4) = criteria.sf4.as_deref() {
            clauses.push("i.sf4 = ?".into());
            binds.push(Box::new(sf4.to_uppercase()));
        }

        if !criteria.facilities.is_empty() {
            clauses.push(format!(
                "b.main_facility_institute IN ({})",
                placeholders(criteria.facilities.len())
            ));
            for f in &criteria.facilities {
                binds.push(Box::new(format!("({})", f)));
            }
        }
        if !criteria.facility_types.is_empty() {
            clauses.push(format!(
                "b.main_facility_type IN ({})",
                placeholders(criteria.facility_types.len())
            ));
            for f in &criteria.facility_types {
                binds.push(Box::new(format!("({})", f)));
            }
        }

        if !criteria.sf5.is_empty() {
            clauses.push(format!("i.sf5 IN ({})", placeholders(criteria.sf5.len())));
            for code in &criteria.sf5 {
                binds.push(Box::new(code.to_uppercase()));
            }
        }
        if let Some(sf7) = criteria.sf7.as_deref() {
            clauses.push("i.sf7 = ?".into());
            binds.push(Box::new(sf7.to_uppercase()));
        }
        if !criteria.sf8.is_empty() {
            clauses.push(format!("i.sf8 IN ({})", placeholders(criteria.sf8.len())));
            for code in &criteria.sf8 {
                binds.push(Box::new(code.to_uppercase()));
            }
        }

        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT i.entry, i.entry_id, i.target, i.projectile, i.process,
                    i.sf4, i.sf5, i.sf6, i.sf7, i.sf8, i.x4_code,
                    b.first_author, b.authors, b.year, b.main_reference,
                    b.main_doi, b.main_facility_institute, b.main_facility_type,
                    MIN(i.e_inc_min), MAX(i.e_inc_max)
             FROM exfor_index i LEFT JOIN exfor_bib b ON i.entry = b.entry
             {} GROUP BY i.entry_id ORDER BY b.year DESC",
            filter
        );
        debug!("exfor entries query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            Ok(SearchRow {
                entry: row.get(0)?,
                entry_id: row.get(1)?,
                target: row.get(2)?,
                projectile: row.get(3)?,
                process: row.get(4)?,
                sf4: row.get(5)?,
                sf5: row.get(6)?,
                sf6: row.get(7)?,
                sf7: row.get(8)?,
                sf8: row.get(9)?,
                x4_code: row.get(10)?,
                first_author: row.get(11)?,
                authors: row.get(12)?,
                year: row.get(13)?,
                main_reference: row.get(14)?,
                main_doi: row.get(15)?,
                main_facility_institute: row.get(16)?,
                main_facility_type: row.get(17)?,
                e_inc_min: row.get(18)?,
                e_inc_max: row.get(19)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// All index rows belonging to the given entry numbers, keyed by the
    /// full entry id. Covers the by-entry lookups of the search endpoint;
    /// the bibliography counterpart is [`ExforStore::entry_bib`].
    pub fn index_query_by_id(
        &self,
        entries: &[String],
    ) -> Result<BTreeMap<String, IndexEntry>> {
        if entries.is_empty() {
            return Ok(BTreeMap::new());
        }
        let sql = format!(
            "SELECT entry_id, level_num, e_inc_min, e_inc_max, points, x4_code, mt, mf
             FROM exfor_index WHERE entry IN ({})",
            placeholders(entries.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = entries.iter().map(|e| e as &dyn ToSql).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            let entry_id: String = row.get(0)?;
            Ok((
                entry_id,
                IndexEntry {
                    level_num: row.get(1)?,
                    e_inc_min: row.get(2)?,
                    e_inc_max: row.get(3)?,
                    points: row.get(4)?,
                    x4_code: row.get(5)?,
                    mt: row.get(6)?,
                    mf: row.get(7)?,
                },
            ))
        })?;

        let mut index = BTreeMap::new();
        for row in rows {
            let (entry_id, entry) = row?;
            index.insert(entry_id, entry);
        }
        Ok(index)
    }

    /// Author / year legend for a set of entries, ordered year-descending.
    /// Entries without a recorded year sort as 1900.
    pub fn entry_bib(&self, entries: &[String]) -> Result<Vec<(String, BibEntry)>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT entry, first_author, year FROM exfor_bib WHERE entry IN ({})",
            placeholders(entries.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = entries.iter().map(|e| e as &dyn ToSql).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            let entry: String = row.get(0)?;
            let author: Option<String> = row.get(1)?;
            let year: Option<i32> = row.get(2)?;
            Ok((
                entry,
                BibEntry {
                    author,
                    year: year.unwrap_or(1900),
                },
            ))
        })?;

        let mut legend: Vec<(String, BibEntry)> = rows.collect::<std::result::Result<_, _>>()?;
        legend.sort_by(|a, b| b.1.year.cmp(&a.1.year));
        Ok(legend)
    }

    /// Measurement rows for the given entry ids, with the column set of the
    /// requested observable. The level-number filter is applied when present.
    pub fn data_query(&self, params: &QueryParams, entry_ids: &[String]) -> Result<Vec<DataRow>> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let obs = params.observable()?;

        let columns = match obs {
            Observable::Xs | Observable::Th => {
                "entry_id, en_inc, den_inc, data, ddata, level_num, residual, \
                 NULL, NULL, NULL, NULL, NULL, NULL, NULL"
            }
            Observable::Rp => {
                "entry_id, en_inc, den_inc, data, ddata, NULL, residual, \
                 NULL, NULL, NULL, NULL, NULL, NULL, NULL"
            }
            Observable::Fy => {
                "entry_id, en_inc, den_inc, data, ddata, NULL, residual, \
                 NULL, NULL, NULL, NULL, charge, mass, isomer"
            }
            Observable::Da => {
                "entry_id, en_inc, den_inc, data, ddata, NULL, NULL, \
                 angle, dangle, NULL, NULL, NULL, NULL, NULL"
            }
            Observable::De => {
                "entry_id, en_inc, den_inc, data, ddata, NULL, NULL, \
                 NULL, NULL, e_out, de_out, NULL, NULL, NULL"
            }
            Observable::Nu => {
                "entry_id, en_inc, den_inc, data, ddata, level_num, residual, \
                 angle, dangle, e_out, de_out, charge, mass, isomer"
            }
        };

        let level = params.level_num;
        let mut clauses = vec![format!("entry_id IN ({})", placeholders(entry_ids.len()))];
        let mut binds: Vec<&dyn ToSql> = entry_ids.iter().map(|e| e as &dyn ToSql).collect();

        if let Some(ref l) = level {
            clauses.push("level_num = ?".into());
            binds.push(l);
        }

        let sql = format!(
            "SELECT {} FROM exfor_data WHERE {}",
            columns,
            clauses.join(" AND ")
        );
        debug!("exfor data query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(binds.as_slice(), |row| {
            Ok(DataRow {
                entry_id: row.get(0)?,
                en_inc: row.get(1)?,
                den_inc: row.get(2)?,
                data: row.get(3)?,
                ddata: row.get(4)?,
                level_num: row.get(5)?,
                residual: row.get(6)?,
                angle: row.get(7)?,
                dangle: row.get(8)?,
                e_out: row.get(9)?,
                de_out: row.get(10)?,
                charge: row.get(11)?,
                mass: row.get(12)?,
                isomer: row.get(13)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Index query for the prompt/delayed fission observables, driven by a
    /// branch preset over the SF4/SF5/SF6 sub-fields. Branches outside the
    /// preset list return empty rather than scanning the whole index.
    pub fn index_query_fission(
        &self,
        elem: &str,
        mass: &str,
        reaction: &str,
        branch: &str,
        e_inc_range: Option<(f64, f64)>,
    ) -> Result<(BTreeMap<String, FissionIndexEntry>, Vec<String>)> {
        let (sf4, sf5, sf6): (Option<&str>, &[&str], &[&str]) = match branch {
            "nu_n" => (None, &["PR"], &["NU"]),
            "nu_g" => (Some("0-G-0"), &["PR"], &["FY"]),
            "dn" => (None, &["DL"], &["NU"]),
            "pfns" => (None, &["PR"], &["NU/DE"]),
            "pfgs" => (Some("0-G-0"), &["PR"], &["FY/DE"]),
            _ => return Ok((BTreeMap::new(), Vec::new())),
        };

        let target = x4style_nuclide_expression(elem, mass)?;
        let process = convert_reaction_to_exfor_style(reaction);

        let mut clauses: Vec<String> = vec![
            "target = ?".into(),
            "process = ?".into(),
            "arbitrary_data = 0".into(),
        ];
        let mut binds: Vec<Box<dyn ToSql>> = vec![Box::new(target), Box::new(process)];

        if let Some(sf4) = sf4 {
            clauses.push("sf4 = ?".into());
            binds.push(Box::new(sf4.to_string()));
        }
        clauses.push(format!("sf5 IN ({})", placeholders(sf5.len())));
        for code in sf5 {
            binds.push(Box::new(code.to_string()));
        }
        clauses.push(format!("sf6 IN ({})", placeholders(sf6.len())));
        for code in sf6 {
            binds.push(Box::new(code.to_string()));
        }

        if let Some((lower, upper)) = e_inc_range {
            clauses.push("e_inc_min >= ?".into());
            binds.push(Box::new(lower));
            clauses.push("e_inc_max <= ?".into());
            binds.push(Box::new(upper));
        }

        let sql = format!(
            "SELECT entry_id, entry, e_inc_min, e_inc_max, points, sf5, sf8, x4_code
             FROM exfor_index WHERE {}",
            clauses.join(" AND ")
        );
        debug!("exfor fission index query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            let entry_id: String = row.get(0)?;
            let entry: String = row.get(1)?;
            Ok((
                entry_id,
                entry,
                FissionIndexEntry {
                    e_inc_min: row.get(2)?,
                    e_inc_max: row.get(3)?,
                    points: row.get(4)?,
                    sf5: row.get(5)?,
                    sf8: row.get(6)?,
                    x4_code: row.get(7)?,
                },
            ))
        })?;

        let mut entids = BTreeMap::new();
        let mut entries = Vec::new();
        for row in rows {
            let (entry_id, entry, index) = row?;
            entids.insert(entry_id, index);
            entries.push(entry);
        }
        Ok((entids, entries))
    }
}

/// `?,?,...` placeholder list for IN clauses.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}
