// Queries against the evaluated-library (ENDF tables) store.
//
// The store indexes one row per (evaluation, target, projectile, reaction)
// in `endf_reactions` and keeps the tabulated values in per-observable data
// tables keyed by `reaction_id`. As in the EXFOR module, predicates are
// appended only for parameters that are present, and "no rows" is an empty
// result rather than an error.
use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use rusqlite::{Connection, OpenFlags, ToSql};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::nuclide::libstyle_nuclide_expression;
use crate::request::{Observable, QueryParams};

/// Incident energy window (MeV) for the thermal-point observable.
const THERMAL_E_INC_MIN: f64 = 2.52e-8;
const THERMAL_E_INC_MAX: f64 = 2.54e-8;

/// One tabulated row from any of the per-observable data tables. Columns a
/// table does not carry stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndfDataRow {
    pub reaction_id: i64,
    pub en_inc: Option<f64>,
    pub data: Option<f64>,
    pub ddata: Option<f64>,
    pub angle: Option<f64>,
    pub residual: Option<String>,
    pub charge: Option<i32>,
    pub mass: Option<i32>,
    pub isomer: Option<i32>,
}

/// Read-only handle on the evaluated-library store.
pub struct EndfStore {
    conn: Connection,
}

impl EndfStore {
    /// Open the store at the given SQLite file, read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(EndfStore { conn })
    }

    /// Open the store configured in [`Config::global`].
    pub fn open_default() -> Result<Self> {
        let path = Config::global().endftables_db.clone();
        Self::open(path)
    }

    /// Wrap an existing connection (test fixtures use in-memory databases).
    pub fn from_connection(conn: Connection) -> Self {
        EndfStore { conn }
    }

    /// Find the evaluations holding the requested reaction and return
    /// `reaction_id -> evaluation tag`, ordered by reaction id.
    pub fn lib_query(&self, params: &QueryParams) -> Result<BTreeMap<i64, String>> {
        let obs = params.observable()?;
        let target = libstyle_nuclide_expression(params.target_elem()?, params.target_mass()?)?;
        let reaction = params.reaction()?;
        let projectile = reaction
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        let mut clauses: Vec<String> = vec!["target = ?".into(), "projectile = ?".into()];
        let mut binds: Vec<Box<dyn ToSql>> = vec![Box::new(target), Box::new(projectile)];

        match obs {
            Observable::Xs | Observable::Da | Observable::Fy | Observable::Th => {
                clauses.push("mt = ?".into());
                binds.push(Box::new(params.mt_padded()?));
            }
            Observable::Rp => {
                let residual =
                    libstyle_nuclide_expression(params.rp_elem()?, params.rp_mass()?)?;
                clauses.push("residual = ?".into());
                binds.push(Box::new(residual));
            }
            Observable::De | Observable::Nu => {
                let process = reaction
                    .split(',')
                    .nth(1)
                    .unwrap_or("")
                    .trim()
                    .to_uppercase();
                clauses.push("process = ?".into());
                binds.push(Box::new(process));
            }
        }

        clauses.push("type = ?".into());
        binds.push(Box::new(obs.endf_type().to_string()));

        let sql = format!(
            "SELECT reaction_id, evaluation FROM endf_reactions WHERE {}",
            clauses.join(" AND ")
        );
        debug!("endf lib query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = binds.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            let id: i64 = row.get(0)?;
            let evaluation: String = row.get(1)?;
            Ok((id, evaluation))
        })?;

        let mut libs = BTreeMap::new();
        for row in rows {
            let (id, evaluation) = row?;
            libs.insert(id, evaluation);
        }
        Ok(libs)
    }

    /// All residual nuclides any evaluation produces for the given target and
    /// projectile, sorted. Empty when the store has no residual tables for it.
    pub fn residual_nuclide_list(
        &self,
        elem: &str,
        mass: &str,
        projectile: &str,
    ) -> Result<Vec<String>> {
        let target = libstyle_nuclide_expression(elem, mass)?;
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT residual FROM endf_reactions
             WHERE type = 'residual' AND projectile = ? AND target = ?
               AND residual IS NOT NULL",
        )?;
        let rows = stmt.query_map([&projectile.to_lowercase(), &target], |row| {
            row.get::<_, String>(0)
        })?;

        let mut residuals: Vec<String> = rows.collect::<std::result::Result<_, _>>()?;
        residuals.sort();
        Ok(residuals)
    }

    /// Tabulated rows for the given reaction ids, dispatched to the data
    /// table of the requested observable.
    pub fn data_query(&self, params: &QueryParams, ids: &[i64]) -> Result<Vec<EndfDataRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match params.observable()? {
            Observable::Xs => self.xs_data_query(ids, None),
            Observable::Th => {
                self.xs_data_query(ids, Some((THERMAL_E_INC_MIN, THERMAL_E_INC_MAX)))
            }
            Observable::Fy => self.fy_data_query(ids),
            Observable::Da => self.angle_data_query(ids),
            Observable::Rp => {
                let projectile = params
                    .reaction()?
                    .split(',')
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_lowercase();
                self.residual_data_query(&projectile, ids)
            }
            // No dedicated tables for DE / NU; nothing to return.
            Observable::De | Observable::Nu => Ok(Vec::new()),
        }
    }

    fn xs_data_query(&self, ids: &[i64], window: Option<(f64, f64)>) -> Result<Vec<EndfDataRow>> {
        let mut clauses = vec![format!("reaction_id IN ({})", placeholders(ids.len()))];
        let mut binds: Vec<&dyn ToSql> = ids.iter().map(|i| i as &dyn ToSql).collect();

        let (lo, hi);
        if let Some((l, h)) = window {
            lo = l;
            hi = h;
            clauses.push("en_inc >= ?".into());
            binds.push(&lo);
            clauses.push("en_inc <= ?".into());
            binds.push(&hi);
        }

        let sql = format!(
            "SELECT reaction_id, en_inc, data FROM endf_xs_data WHERE {}",
            clauses.join(" AND ")
        );
        debug!("endf xs data query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(binds.as_slice(), |row| {
            Ok(EndfDataRow {
                reaction_id: row.get(0)?,
                en_inc: row.get(1)?,
                data: row.get(2)?,
                ..Default::default()
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn angle_data_query(&self, ids: &[i64]) -> Result<Vec<EndfDataRow>> {
        let sql = format!(
            "SELECT reaction_id, en_inc, angle, data FROM endf_angle_data
             WHERE reaction_id IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = ids.iter().map(|i| i as &dyn ToSql).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            Ok(EndfDataRow {
                reaction_id: row.get(0)?,
                en_inc: row.get(1)?,
                angle: row.get(2)?,
                data: row.get(3)?,
                ..Default::default()
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    fn fy_data_query(&self, ids: &[i64]) -> Result<Vec<EndfDataRow>> {
        let sql = format!(
            "SELECT reaction_id, en_inc, charge, mass, isomer, data, ddata FROM endf_fy_data
             WHERE reaction_id IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = ids.iter().map(|i| i as &dyn ToSql).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            Ok(EndfDataRow {
                reaction_id: row.get(0)?,
                en_inc: row.get(1)?,
                charge: row.get(2)?,
                mass: row.get(3)?,
                isomer: row.get(4)?,
                data: row.get(5)?,
                ddata: row.get(6)?,
                ..Default::default()
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    /// Residual-production rows. Neutron-induced residuals are voluminous
    /// enough to live in their own table; other projectiles share one.
    fn residual_data_query(&self, projectile: &str, ids: &[i64]) -> Result<Vec<EndfDataRow>> {
        let table = if projectile == "n" {
            "endf_n_residual_data"
        } else {
            "endf_residual_data"
        };
        let sql = format!(
            "SELECT reaction_id, en_inc, residual, data FROM {}
             WHERE reaction_id IN ({})",
            table,
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let refs: Vec<&dyn ToSql> = ids.iter().map(|i| i as &dyn ToSql).collect();
        let rows = stmt.query_map(refs.as_slice(), |row| {
            Ok(EndfDataRow {
                reaction_id: row.get(0)?,
                en_inc: row.get(1)?,
                residual: row.get(2)?,
                data: row.get(3)?,
                ..Default::default()
            })
        })?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}
