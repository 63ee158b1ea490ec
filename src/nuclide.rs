// Nuclide identifier formatting across the conventions used by the two data
// stores. There is deliberately no canonical nuclide struct: every consumer
// re-derives the textual form it needs from the raw element / mass inputs,
// which mirrors how the stores and the mirrored file trees are keyed.
use crate::data::ELEMENT_Z;
use crate::error::{Error, Result};

/// Atomic number for an element symbol (case-insensitive).
pub fn elemtoz(elem: &str) -> Result<u32> {
    ELEMENT_Z
        .get(capitalize(elem).as_str())
        .copied()
        .ok_or_else(|| Error::UnknownElement(elem.to_string()))
}

/// Split a mass field into its mass number and optional isomer suffix.
///
/// The mass field may carry a trailing state tag (`"109m"`, `"180m1"`,
/// `"242G"`); separators (`-`, `_`) inside the tag are dropped. Returns the
/// numeric mass and the raw suffix as found.
pub fn split_mass_field(mass: &str) -> Result<(u32, Option<String>)> {
    let trimmed = mass.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, rest) = trimmed.split_at(split);

    let mass_num: u32 = digits.parse().map_err(|_| Error::InvalidParameter {
        name: "mass",
        value: mass.to_string(),
    })?;

    let suffix: String = rest.chars().filter(|c| *c != '-' && *c != '_').collect();
    if suffix.is_empty() {
        Ok((mass_num, None))
    } else {
        Ok((mass_num, Some(suffix)))
    }
}

/// EXFOR-style nuclide expression used as the target / residual key of the
/// experimental-data store, e.g. `("Ag", "109m")` -> `"47-AG-109-M"` and
/// `("Al", "27")` -> `"13-AL-27"`.
pub fn x4style_nuclide_expression(elem: &str, mass: &str) -> Result<String> {
    let z = elemtoz(elem)?;
    let (mass_num, suffix) = split_mass_field(mass)?;
    match suffix {
        Some(s) => Ok(format!(
            "{}-{}-{}-{}",
            z,
            elem.to_uppercase(),
            mass_num,
            s.to_uppercase()
        )),
        None => Ok(format!("{}-{}-{}", z, elem.to_uppercase(), mass_num)),
    }
}

/// Library-style nuclide expression used by the evaluated-library store and
/// the ENDFtables tree, e.g. `("Ag", "109m")` -> `"Ag109m"` and
/// `("Al", "27")` -> `"Al027"` (mass zero-padded to three digits).
pub fn libstyle_nuclide_expression(elem: &str, mass: &str) -> Result<String> {
    let (mass_num, suffix) = split_mass_field(mass)?;
    match suffix {
        Some(s) => Ok(format!(
            "{}{:03}{}",
            capitalize(elem),
            mass_num,
            s.to_lowercase()
        )),
        None => Ok(format!("{}{:03}", capitalize(elem), mass_num)),
    }
}

/// Residual-nuclide expression in the EXFORtables filename convention,
/// e.g. `("Ag", "109m")` -> `"Ag-109-M"` and `("Nb", "095")` -> `"Nb-95"`
/// (leading zeros stripped, isomer tag uppercased).
pub fn exforstyle_residual_expression(elem: &str, mass: &str) -> Result<String> {
    let (mass_num, suffix) = split_mass_field(mass)?;
    match suffix {
        Some(s) => Ok(format!(
            "{}-{}-{}",
            capitalize(elem),
            mass_num,
            s.to_uppercase()
        )),
        None => Ok(format!("{}-{}", capitalize(elem), mass_num)),
    }
}

/// First letter upper-case, rest lower-case (element symbols as stored).
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elemtoz_case_insensitive() {
        assert_eq!(elemtoz("Ag").unwrap(), 47);
        assert_eq!(elemtoz("ag").unwrap(), 47);
        assert_eq!(elemtoz("AG").unwrap(), 47);
        assert!(matches!(elemtoz("Zz"), Err(Error::UnknownElement(_))));
    }

    #[test]
    fn test_split_mass_field() {
        assert_eq!(split_mass_field("27").unwrap(), (27, None));
        assert_eq!(
            split_mass_field("109m").unwrap(),
            (109, Some("m".to_string()))
        );
        assert_eq!(
            split_mass_field("180m1").unwrap(),
            (180, Some("m1".to_string()))
        );
        assert_eq!(
            split_mass_field("242-G").unwrap(),
            (242, Some("G".to_string()))
        );
        assert!(split_mass_field("").is_err());
        assert!(split_mass_field("m109").is_err());
    }

    #[test]
    fn test_x4style_expression() {
        assert_eq!(
            x4style_nuclide_expression("Ag", "109m").unwrap(),
            "47-AG-109-M"
        );
        assert_eq!(x4style_nuclide_expression("Al", "27").unwrap(), "13-AL-27");
        assert_eq!(x4style_nuclide_expression("U", "235").unwrap(), "92-U-235");
    }

    #[test]
    fn test_libstyle_expression() {
        assert_eq!(libstyle_nuclide_expression("Ag", "109m").unwrap(), "Ag109m");
        assert_eq!(libstyle_nuclide_expression("Al", "27").unwrap(), "Al027");
        assert_eq!(libstyle_nuclide_expression("u", "235").unwrap(), "U235");
    }

    #[test]
    fn test_residual_expression_strips_leading_zeros() {
        assert_eq!(
            exforstyle_residual_expression("Ag", "109m").unwrap(),
            "Ag-109-M"
        );
        assert_eq!(exforstyle_residual_expression("Nb", "095").unwrap(), "Nb-95");
    }
}
