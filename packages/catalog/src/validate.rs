//! Check-and-normalize rules applied before a flavor enters the catalog.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CatalogError;
use crate::flavor::{CreateFlavor, ExtraSpecs, NewFlavor, Param};

/// Largest value of the storage integer columns.
pub const MAX_INT: i64 = 0x7FFF_FFFF;

/// Largest value a single-precision SQL float column holds without
/// silently truncating.
pub const SQL_SP_FLOAT_MAX: f64 = 3.40282e38;

/// Maximum length, in characters, of names, flavor ids and extra spec
/// keys/values.
pub const MAX_FIELD_LEN: usize = 255;

const TRUE_TOKENS: &[&str] = &["TRUE", "true", "Yes", "Y", "1"];
const FALSE_TOKENS: &[&str] = &["False", "false", "No", "N", "0"];

/// Control, format, private-use, unassigned and separator code points,
/// except the plain space.
static NON_PRINTABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Cc}\p{Cf}\p{Co}\p{Cn}\p{Zl}\p{Zp}\p{Zs}--\x20]")
        .expect("non-printable class compiles")
});

static FLAVORID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\- ]+$").expect("flavor id pattern compiles"));

static EXTRA_SPEC_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\- :]+$").expect("extra spec key pattern compiles"));

/// Validate a creation request.
///
/// The returned flavor id is empty when the request did not supply one;
/// the catalog assigns it.
pub fn validate(req: &CreateFlavor) -> Result<NewFlavor, CatalogError> {
    let name = validate_name(&req.name)?;
    let flavorid = match req.flavorid.as_deref() {
        Some(id) if !id.is_empty() => validate_flavorid(id)?,
        _ => String::new(),
    };

    Ok(NewFlavor {
        name,
        flavorid,
        memory_mb: validate_integer("memory_mb", &req.memory_mb, 1)?,
        vcpus: validate_integer("vcpus", &req.vcpus, 1)?,
        root_gb: validate_integer("root_gb", &req.root_gb, 0)?,
        ephemeral_gb: validate_integer("ephemeral_gb", &req.ephemeral_gb, 0)?,
        swap: validate_integer("swap", &req.swap, 0)?,
        rxtx_factor: validate_rxtx_factor(&req.rxtx_factor)?,
        is_public: parse_bool("is_public", &req.is_public)?,
    })
}

/// Validate a flavor name: 1-255 printable characters, not all whitespace.
pub fn validate_name(name: &str) -> Result<String, CatalogError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_FIELD_LEN {
        return Err(CatalogError::invalid(
            "name",
            format!("name must be 1-{MAX_FIELD_LEN} characters long"),
        ));
    }
    if name.trim().is_empty() {
        return Err(CatalogError::invalid(
            "name",
            "name must contain a non-whitespace character",
        ));
    }
    if let Some(c) = NON_PRINTABLE
        .find(name)
        .and_then(|m| m.as_str().chars().next())
    {
        return Err(CatalogError::invalid(
            "name",
            format!("name contains non-printable character {}", c.escape_unicode()),
        ));
    }
    Ok(name.to_string())
}

/// Validate an explicitly supplied flavor id: 1-255 characters of
/// `[A-Za-z0-9_.\- ]`.
pub fn validate_flavorid(flavorid: &str) -> Result<String, CatalogError> {
    let len = flavorid.chars().count();
    if len == 0 || len > MAX_FIELD_LEN {
        return Err(CatalogError::invalid(
            "flavorid",
            format!("id must be 1-{MAX_FIELD_LEN} characters long"),
        ));
    }
    if !FLAVORID.is_match(flavorid) {
        return Err(CatalogError::invalid(
            "flavorid",
            "id can only contain [a-zA-Z0-9_.- ]",
        ));
    }
    Ok(flavorid.to_string())
}

/// Validate extra spec keys and values before they are stored.
pub fn validate_extra_specs(specs: &ExtraSpecs) -> Result<(), CatalogError> {
    for (key, value) in specs {
        let len = key.chars().count();
        if len == 0 || len > MAX_FIELD_LEN {
            return Err(CatalogError::invalid(
                "extra_specs",
                format!("key {key:?} must be 1-{MAX_FIELD_LEN} characters long"),
            ));
        }
        if !EXTRA_SPEC_KEY.is_match(key) {
            return Err(CatalogError::invalid(
                "extra_specs",
                format!(
                    "key {key:?} may only contain word characters, periods, dashes, \
                     underscores, colons and spaces"
                ),
            ));
        }
        if value.chars().count() > MAX_FIELD_LEN {
            return Err(CatalogError::invalid(
                "extra_specs",
                format!("value for {key:?} must be at most {MAX_FIELD_LEN} characters long"),
            ));
        }
    }
    Ok(())
}

/// Parse an integer attribute and check it against `min..=MAX_INT`.
pub fn validate_integer(field: &str, value: &Param, min: i64) -> Result<i32, CatalogError> {
    let parsed = match value {
        Param::Int(v) => *v,
        Param::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CatalogError::invalid(field, format!("{field} must be an integer")))?,
        Param::Float(_) | Param::Bool(_) => {
            return Err(CatalogError::invalid(
                field,
                format!("{field} must be an integer"),
            ));
        }
    };
    if parsed < min {
        return Err(CatalogError::invalid(
            field,
            format!("{field} must be >= {min}"),
        ));
    }
    if parsed > MAX_INT {
        return Err(CatalogError::invalid(
            field,
            format!("{field} must be <= {MAX_INT}"),
        ));
    }
    // In range of MAX_INT, so the narrowing cannot fail.
    i32::try_from(parsed).map_err(|_| CatalogError::invalid(field, "out of range"))
}

/// Parse `rxtx_factor`: a float in `(0, SQL_SP_FLOAT_MAX]`.
pub fn validate_rxtx_factor(value: &Param) -> Result<f64, CatalogError> {
    const FIELD: &str = "rxtx_factor";
    let parsed = match value {
        Param::Float(v) => *v,
        Param::Int(v) => *v as f64,
        Param::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CatalogError::invalid(FIELD, "rxtx_factor must be a float"))?,
        Param::Bool(_) => {
            return Err(CatalogError::invalid(FIELD, "rxtx_factor must be a float"));
        }
    };
    if parsed.is_nan() || parsed <= 0.0 {
        return Err(CatalogError::invalid(FIELD, "rxtx_factor must be > 0"));
    }
    if parsed > SQL_SP_FLOAT_MAX {
        return Err(CatalogError::invalid(
            FIELD,
            format!("rxtx_factor must be <= {SQL_SP_FLOAT_MAX:e}"),
        ));
    }
    Ok(parsed)
}

/// Parse a boolean from a fixed token vocabulary.
///
/// Accepts exactly `TRUE`, `true`, `Yes`, `Y`, `1` and `False`, `false`,
/// `No`, `N`, `0`, real booleans, and the integers 1 and 0.
pub fn parse_bool(field: &str, value: &Param) -> Result<bool, CatalogError> {
    match value {
        Param::Bool(b) => Ok(*b),
        Param::Int(1) => Ok(true),
        Param::Int(0) => Ok(false),
        Param::Text(s) if TRUE_TOKENS.contains(&s.as_str()) => Ok(true),
        Param::Text(s) if FALSE_TOKENS.contains(&s.as_str()) => Ok(false),
        _ => Err(CatalogError::invalid(
            field,
            format!("{field} must be a boolean, got {value}"),
        )),
    }
}

/// Whether `c` renders as a visible glyph or the plain space.
pub fn is_printable(c: char) -> bool {
    !NON_PRINTABLE.is_match(c.encode_utf8(&mut [0; 4]))
}
