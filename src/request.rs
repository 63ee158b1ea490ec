// Typed request parameters shared by the query and path-generation layers.
// This replaces the untyped key/value bag the dashboard hands over: absent
// fields stay None and are skipped when building predicates, while fields an
// operation genuinely requires are checked through the accessors below.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The physical quantity being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Observable {
    /// Cross section
    Xs,
    /// Residual production cross section
    Rp,
    /// Fission yield
    Fy,
    /// Angular distribution
    Da,
    /// Energy distribution
    De,
    /// Thermal-point cross section
    Th,
    /// Neutron multiplicity (nubar)
    Nu,
}

impl Observable {
    /// Parse the user-facing type keyword (case-insensitive).
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "XS" | "SIG" => Ok(Observable::Xs),
            "RP" => Ok(Observable::Rp),
            "FY" => Ok(Observable::Fy),
            "DA" => Ok(Observable::Da),
            "DE" => Ok(Observable::De),
            "TH" => Ok(Observable::Th),
            "NU" => Ok(Observable::Nu),
            _ => Err(Error::InvalidParameter {
                name: "observable",
                value: s.to_string(),
            }),
        }
    }

    /// EXFOR SF6 quantity code stored in the experimental-data store.
    /// Cross sections (including residual production and the thermal point)
    /// are indexed as `SIG`.
    pub fn exfor_sf6(&self) -> &'static str {
        match self {
            Observable::Xs | Observable::Rp | Observable::Th => "SIG",
            Observable::Fy => "FY",
            Observable::Da => "DA",
            Observable::De => "DE",
            Observable::Nu => "NU",
        }
    }

    /// Table-type tag used by the evaluated-library store and the ENDFtables
    /// directory layout.
    pub fn endf_type(&self) -> &'static str {
        match self {
            Observable::Xs | Observable::Th => "xs",
            Observable::Rp => "residual",
            Observable::Fy => "fy",
            Observable::Da => "da",
            Observable::De => "de",
            Observable::Nu => "nu",
        }
    }

    /// Observable sub-directory in the EXFORtables tree. Residual production
    /// files live under the plain cross-section directory; every other
    /// observable has a directory of its own, the thermal point included.
    pub fn exfortables_subdir(&self) -> &'static str {
        match self {
            Observable::Xs | Observable::Rp => "xs",
            Observable::Fy => "fy",
            Observable::Da => "da",
            Observable::De => "de",
            Observable::Th => "th",
            Observable::Nu => "nu",
        }
    }
}

/// Flat request parameter bag with the documented key vocabulary.
///
/// Everything is optional at construction time; each operation validates the
/// subset it needs. `excl_junk_switch` filters out index rows carrying
/// extraneous SF5/SF7/SF8 codes to avoid double counting derived quantities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    pub observable: Option<Observable>,
    pub target_elem: Option<String>,
    pub target_mass: Option<String>,
    pub reaction: Option<String>,
    pub branch: Option<String>,
    pub level_num: Option<i32>,
    pub rp_elem: Option<String>,
    pub rp_mass: Option<String>,
    pub mt: Option<String>,
    pub fy_type: Option<String>,
    pub mesurement_opt_fy: Option<String>,
    pub reac_product_fy: Option<String>,
    #[serde(default)]
    pub excl_junk_switch: bool,
}

impl QueryParams {
    /// Parse a parameter bag from its JSON rendering, the form the dashboard
    /// hands over.
    pub fn from_json(doc: &str) -> Result<Self> {
        Ok(serde_json::from_str(doc)?)
    }

    pub fn observable(&self) -> Result<Observable> {
        self.observable.ok_or(Error::MissingParameter("observable"))
    }

    pub fn target_elem(&self) -> Result<&str> {
        self.target_elem
            .as_deref()
            .ok_or(Error::MissingParameter("target_elem"))
    }

    pub fn target_mass(&self) -> Result<&str> {
        self.target_mass
            .as_deref()
            .ok_or(Error::MissingParameter("target_mass"))
    }

    pub fn reaction(&self) -> Result<&str> {
        self.reaction
            .as_deref()
            .ok_or(Error::MissingParameter("reaction"))
    }

    pub fn rp_elem(&self) -> Result<&str> {
        self.rp_elem
            .as_deref()
            .ok_or(Error::MissingParameter("rp_elem"))
    }

    pub fn rp_mass(&self) -> Result<&str> {
        self.rp_mass
            .as_deref()
            .ok_or(Error::MissingParameter("rp_mass"))
    }

    pub fn fy_type(&self) -> Result<&str> {
        self.fy_type
            .as_deref()
            .ok_or(Error::MissingParameter("fy_type"))
    }

    /// MT number zero-padded to the three-character form both stores index.
    pub fn mt_padded(&self) -> Result<String> {
        let mt = self.mt.as_deref().ok_or(Error::MissingParameter("mt"))?;
        Ok(format!("{:0>3}", mt.trim()))
    }
}
