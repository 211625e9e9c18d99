//! Survey schema registry for uploaded target lists.
//!
//! The registry is the single source of truth for which columns an upload must
//! or may carry, what datatype each known column has, and which input column
//! names are accepted as flux aliases for each photometric band. It is built
//! once at process start and passed by reference into every validation stage;
//! nothing in it is mutated at runtime.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Datatype a known column is expected to carry after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Integer,
    Float,
}

/// Photometric band for which flux information can be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    G,
    R,
    I,
    Z,
    Y,
    J,
}

impl Band {
    pub const ALL: [Band; 6] = [Band::G, Band::R, Band::I, Band::Z, Band::Y, Band::J];

    pub fn as_str(&self) -> &'static str {
        match self {
            Band::G => "g",
            Band::R => "r",
            Band::I => "i",
            Band::Z => "z",
            Band::Y => "y",
            Band::J => "j",
        }
    }

    /// Name of the normalized filter-name column for this band.
    pub fn filter_column(&self) -> String {
        format!("filter_{}", self.as_str())
    }

    /// Name of the normalized flux column for this band.
    pub fn flux_column(&self) -> String {
        format!("flux_{}", self.as_str())
    }

    /// Name of the normalized flux-error column for this band.
    pub fn flux_error_column(&self) -> String {
        format!("flux_error_{}", self.as_str())
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from canonical band to the ordered set of accepted input column
/// aliases.
///
/// The alias order is load-bearing: during flux normalization the first alias
/// in this order that carries a finite value for a row wins, and later matches
/// for the same row and band are skipped with a warning. The generic
/// `flux_<band>` column comes first, followed by survey-specific names.
#[derive(Debug, Clone)]
pub struct FilterCategoryTable {
    entries: Vec<(Band, Vec<&'static str>)>,
}

impl FilterCategoryTable {
    fn survey_defaults() -> Self {
        Self {
            entries: vec![
                (Band::G, vec!["flux_g", "g_hsc", "g_ps1", "g_sdss", "g_gaia", "bp_gaia"]),
                (Band::R, vec!["flux_r", "r_old_hsc", "r2_hsc", "r_ps1", "r_sdss", "rp_gaia"]),
                (Band::I, vec!["flux_i", "i_old_hsc", "i2_hsc", "i_ps1", "i_sdss"]),
                (Band::Z, vec!["flux_z", "z_hsc", "z_ps1", "z_sdss"]),
                (Band::Y, vec!["flux_y", "y_hsc", "y_ps1"]),
                (Band::J, vec!["flux_j"]),
            ],
        }
    }

    /// Bands in fixed table order.
    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.entries.iter().map(|(band, _)| *band)
    }

    /// Accepted aliases for one band, in tie-break order.
    pub fn aliases_of(&self, band: Band) -> &[&'static str] {
        self.entries
            .iter()
            .find(|(b, _)| *b == band)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Canonical band an input column name denotes, if any.
    pub fn band_of_alias(&self, column: &str) -> Option<Band> {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.contains(&column))
            .map(|(band, _)| *band)
    }
}

/// Immutable description of the upload schema.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    required_keys: Vec<&'static str>,
    optional_keys: Vec<&'static str>,
    kinds: HashMap<&'static str, ColumnKind>,
    filters: FilterCategoryTable,
}

static DEFAULT_SCHEMA: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::survey_defaults);

impl SchemaRegistry {
    /// Build the survey's default schema.
    pub fn survey_defaults() -> Self {
        let required_keys = vec![
            "obj_id",
            "ob_code",
            "ra",
            "dec",
            "equinox",
            "priority",
            "exptime",
            "resolution",
        ];

        let mut optional_keys: Vec<&'static str> =
            vec!["pmra", "pmdec", "parallax", "tract", "patch"];

        let mut kinds: HashMap<&'static str, ColumnKind> = HashMap::new();
        kinds.insert("obj_id", ColumnKind::Integer);
        kinds.insert("ob_code", ColumnKind::String);
        kinds.insert("ra", ColumnKind::Float);
        kinds.insert("dec", ColumnKind::Float);
        kinds.insert("equinox", ColumnKind::String);
        kinds.insert("priority", ColumnKind::Integer);
        kinds.insert("exptime", ColumnKind::Float);
        kinds.insert("resolution", ColumnKind::String);
        kinds.insert("pmra", ColumnKind::Float);
        kinds.insert("pmdec", ColumnKind::Float);
        kinds.insert("parallax", ColumnKind::Float);
        kinds.insert("tract", ColumnKind::Integer);
        kinds.insert("patch", ColumnKind::Integer);

        // Per-band filter/flux/flux-error columns are optional; the names are
        // 'static by construction, so leak the formatted strings once here.
        for band in Band::ALL {
            let filter: &'static str = Box::leak(band.filter_column().into_boxed_str());
            let flux: &'static str = Box::leak(band.flux_column().into_boxed_str());
            let flux_error: &'static str = Box::leak(band.flux_error_column().into_boxed_str());
            optional_keys.push(filter);
            optional_keys.push(flux);
            optional_keys.push(flux_error);
            kinds.insert(filter, ColumnKind::String);
            kinds.insert(flux, ColumnKind::Float);
            kinds.insert(flux_error, ColumnKind::Float);
        }

        Self {
            required_keys,
            optional_keys,
            kinds,
            filters: FilterCategoryTable::survey_defaults(),
        }
    }

    /// Process-wide default schema instance.
    pub fn global() -> &'static SchemaRegistry {
        &DEFAULT_SCHEMA
    }

    pub fn required_keys(&self) -> &[&'static str] {
        &self.required_keys
    }

    pub fn optional_keys(&self) -> &[&'static str] {
        &self.optional_keys
    }

    /// Expected datatype of a known column, `None` for unknown columns.
    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Whether a known column is schema-typed as a string.
    pub fn is_string_key(&self, column: &str) -> bool {
        self.column_kind(column) == Some(ColumnKind::String)
    }

    pub fn filters(&self) -> &FilterCategoryTable {
        &self.filters
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::survey_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_keys() {
        let schema = SchemaRegistry::global();
        assert_eq!(schema.required_keys().len(), 8);
        assert!(schema.required_keys().contains(&"ob_code"));
        assert!(schema.required_keys().contains(&"resolution"));
    }

    #[test]
    fn test_optional_keys_include_band_columns() {
        let schema = SchemaRegistry::global();
        // 5 astrometric keys + 3 columns per band.
        assert_eq!(schema.optional_keys().len(), 5 + 3 * Band::ALL.len());
        assert!(schema.optional_keys().contains(&"flux_g"));
        assert!(schema.optional_keys().contains(&"flux_error_j"));
        assert!(schema.optional_keys().contains(&"filter_y"));
    }

    #[test]
    fn test_column_kinds() {
        let schema = SchemaRegistry::global();
        assert_eq!(schema.column_kind("ob_code"), Some(ColumnKind::String));
        assert_eq!(schema.column_kind("ra"), Some(ColumnKind::Float));
        assert_eq!(schema.column_kind("tract"), Some(ColumnKind::Integer));
        assert_eq!(schema.column_kind("filter_z"), Some(ColumnKind::String));
        assert_eq!(schema.column_kind("nonsense"), None);
        assert!(schema.is_string_key("equinox"));
        assert!(!schema.is_string_key("exptime"));
    }

    #[test]
    fn test_band_alias_lookup() {
        let table = FilterCategoryTable::survey_defaults();
        assert_eq!(table.band_of_alias("g_hsc"), Some(Band::G));
        assert_eq!(table.band_of_alias("flux_r"), Some(Band::R));
        assert_eq!(table.band_of_alias("rp_gaia"), Some(Band::R));
        assert_eq!(table.band_of_alias("u_sdss"), None);
        assert_eq!(table.band_of_alias("ra"), None);
    }

    #[test]
    fn test_alias_order_generic_first() {
        let table = FilterCategoryTable::survey_defaults();
        for band in table.bands() {
            let aliases = table.aliases_of(band);
            assert!(!aliases.is_empty());
            assert_eq!(aliases[0], format!("flux_{}", band.as_str()));
        }
    }
}
