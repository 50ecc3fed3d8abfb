//! Merge options and configuration.

use chrono::{DateTime, Utc};

use crate::detect::PdfVersion;

/// Options controlling a merge.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Scan and rewrite inputs on the rayon thread pool
    pub parallel: bool,

    /// Version to declare in the output header (highest input version if unset)
    pub version: Option<PdfVersion>,

    /// Write a document information dictionary
    pub info: bool,

    /// Fixed `/CreationDate` for the information dictionary (now if unset)
    pub creation_date: Option<DateTime<Utc>>,

    /// Copy attributes pages inherit from their page-tree ancestors
    pub inherit_attributes: bool,
}

impl MergeOptions {
    /// Create new merge options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel scanning and rewriting.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel scanning and rewriting.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the output header version.
    pub fn with_version(mut self, version: PdfVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Enable or disable the information dictionary.
    pub fn with_info(mut self, info: bool) -> Self {
        self.info = info;
        self
    }

    /// Set the creation date written to the information dictionary.
    pub fn with_creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Enable or disable copying of inherited page attributes.
    pub fn with_inherited_attributes(mut self, inherit: bool) -> Self {
        self.inherit_attributes = inherit;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            version: None,
            info: false,
            creation_date: None,
            inherit_attributes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MergeOptions::default();
        assert!(options.parallel);
        assert!(options.version.is_none());
        assert!(!options.info);
        assert!(!options.inherit_attributes);
    }

    #[test]
    fn test_builder_chain() {
        let options = MergeOptions::new()
            .sequential()
            .with_version(PdfVersion { major: 1, minor: 7 })
            .with_info(true)
            .with_inherited_attributes(true);

        assert!(!options.parallel);
        assert_eq!(options.version.unwrap().to_string(), "1.7");
        assert!(options.info);
        assert!(options.inherit_attributes);
    }
}
