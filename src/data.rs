// src/data.rs
// This module contains the static lookup tables for the query layer: the
// periodic table used for nuclide formatting, and the mapping tables between
// the EXFOR reaction-code convention and ENDF MT numbers. Doc comments
// summarize the intent of each table while the literals provide the
// canonical values.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Element symbols ordered by atomic number; Z = index + 1.
///
/// This is the single source for symbol -> Z conversion; nuclide expression
/// formatting derives everything else from it.
pub const ELEMENT_SYMBOLS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr",
];

/// Map from element symbol to atomic number, derived from [`ELEMENT_SYMBOLS`]
/// so the two can never disagree.
pub static ELEMENT_Z: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    ELEMENT_SYMBOLS
        .iter()
        .enumerate()
        .map(|(i, &sym)| (sym, i as u32 + 1))
        .collect()
});

/// A static HashMap that maps EXFOR SF3 process codes to ENDF MT numbers.
///
/// Only non-partial codes appear here; partial (discrete-level) codes such
/// as `N1` or `P2` are derived from [`MT_RANGE`] instead. Codes absent from
/// this table have no MT equivalent and lookups return `None`.
pub static SF3_MT: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    [
        ("TOT", 1),
        ("EL", 2),
        ("NON", 3),
        ("INL", 4),
        ("X", 5),
        ("2N", 16),
        ("3N", 17),
        ("F", 18),
        ("NA", 22),
        ("N+A", 22),
        ("2NA", 24),
        ("ABS", 27),
        ("NP", 28),
        ("N+P", 28),
        ("ND", 32),
        ("NT", 33),
        ("4N", 37),
        ("2NP", 41),
        ("G", 102),
        ("P", 103),
        ("D", 104),
        ("T", 105),
        ("HE3", 106),
        ("A", 107),
        ("2A", 108),
        ("2P", 111),
        ("PA", 112),
        ("XN", 201),
        ("XP", 203),
        ("XD", 204),
        ("XT", 205),
        ("XHE3", 206),
        ("XA", 207),
    ]
    .iter()
    .cloned()
    .collect()
});

/// Human-readable descriptions for the explicitly listed MT numbers.
pub static MT_DESCRIPTION: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    [
        (1, "(n,total)"),
        (2, "(n,elastic)"),
        (3, "(n,nonelastic)"),
        (4, "(n,inelastic)"),
        (5, "(n,misc)"),
        (16, "(n,2n)"),
        (17, "(n,3n)"),
        (18, "(n,fission)"),
        (22, "(n,na)"),
        (24, "(n,2na)"),
        (27, "(n,absorption)"),
        (28, "(n,np)"),
        (32, "(n,nd)"),
        (33, "(n,nt)"),
        (37, "(n,4n)"),
        (41, "(n,2np)"),
        (102, "(n,gamma)"),
        (103, "(n,p)"),
        (104, "(n,d)"),
        (105, "(n,t)"),
        (106, "(n,3He)"),
        (107, "(n,a)"),
        (108, "(n,2a)"),
        (111, "(n,2p)"),
        (112, "(n,pa)"),
        (452, "nubar-total"),
        (454, "independent fission yield"),
        (455, "nubar-delayed"),
        (456, "nubar-prompt"),
        (459, "cumulative fission yield"),
    ]
    .iter()
    .cloned()
    .collect()
});

/// Reserved MT ranges for discrete-level (partial) reactions, keyed by the
/// outgoing particle code. Ranges are inclusive.
///
/// Kept as an ordered slice rather than a map: an MT number is assigned to
/// the FIRST bucket that contains it, which resolves any overlap between
/// ranges deterministically.
pub const MT_RANGE: &[(&str, (i32, i32))] = &[
    ("N", (50, 91)),
    ("P", (600, 649)),
    ("D", (650, 699)),
    ("T", (700, 749)),
    ("HE3", (750, 799)),
    ("A", (800, 849)),
    ("2N", (875, 891)),
];

/// Fission-yield branch (EXFOR SF5) to ENDF MT number.
pub static MT_FY_SF5: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    [("IND", 454), ("CUM", 459), ("CHN", 459), ("SEC", 454)]
        .iter()
        .cloned()
        .collect()
});

/// Neutron-multiplicity (nubar) branch (EXFOR SF5) to ENDF MT number.
pub static MT_NU_SF5: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    [("TOT", 452), ("DL", 455), ("PR", 456)]
        .iter()
        .cloned()
        .collect()
});

/// Expansion of user-facing fission-yield branch names to the set of EXFOR
/// SF5 codes that report the same quantity. Branches not listed here expand
/// to themselves.
pub static FY_BRANCH_ALIASES: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("PRE", &["PRE", "TER", "QTR", "PRV", "TER/CHG"]);
        m.insert("IND", &["IND", "SEC", "MAS", "CHG", "SEC/CHN"]);
        m.insert("CUM", &["CUM", "CHN"]);
        m
    });

/// Evaluated-library tags present in the ENDFtables tree, in the descending
/// name order the mirrored directories are scanned in.
pub const LIB_LIST: &[&str] = &[
    "tendl.2021",
    "jendl5.0",
    "jeff3.3",
    "irdff2.0",
    "iaea.pd",
    "iaea.2019",
    "endfb8.0",
    "cendl3.2",
];
