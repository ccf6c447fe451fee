use serde::Deserialize;

use crate::error::ReconError;
use crate::extract::CandidateStrategy;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every section has defaults, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub names: NameConfig,
    #[serde(default)]
    pub columns: ColumnAliases,
}

fn default_name() -> String {
    "reconciliation".into()
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            matching: MatchingConfig::default(),
            extraction: ExtractionConfig::default(),
            names: NameConfig::default(),
            columns: ColumnAliases::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching cascade
// ---------------------------------------------------------------------------

/// Which resolution steps run after the exact index lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Mirror-key lookup (10↔9, 9↔8 digits). Off unless asked for: it can
    /// merge two distinct identifiers that differ only in the last digit.
    #[serde(default)]
    pub tolerant: bool,
    /// Scan raw filenames for the client's identifier as a substring.
    #[serde(default = "default_true")]
    pub filename_contains: bool,
    /// Token-overlap match of the client name against filenames.
    #[serde(default = "default_true")]
    pub name_fallback: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerant: false,
            filename_contains: true,
            name_fallback: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Candidate generators, in order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<CandidateStrategy>,
    /// File extensions (without dot, case-insensitive) that count as documents.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            extensions: default_extensions(),
        }
    }
}

fn default_strategies() -> Vec<CandidateStrategy> {
    CandidateStrategy::ALL.to_vec()
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".into()]
}

// ---------------------------------------------------------------------------
// Name fallback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NameConfig {
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Added to the built-in legal-suffix / connector stopwords.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            min_token_len: default_min_token_len(),
            extra_stopwords: Vec::new(),
        }
    }
}

fn default_min_token_len() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Client source columns
// ---------------------------------------------------------------------------

/// Accepted header spellings for each client column, compared after
/// lowercasing, trimming and replacing spaces with underscores.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnAliases {
    #[serde(default = "default_identifier_aliases")]
    pub identifier: Vec<String>,
    #[serde(default = "default_name_aliases")]
    pub name: Vec<String>,
    #[serde(default = "default_email_aliases")]
    pub email: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            identifier: default_identifier_aliases(),
            name: default_name_aliases(),
            email: default_email_aliases(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_identifier_aliases() -> Vec<String> {
    strings(&["nit", "nit_comprador", "numero_identificacion", "identificacion", "num_id"])
}

fn default_name_aliases() -> Vec<String> {
    strings(&[
        "nombre",
        "nombre_del_comprador",
        "nombre_comprador",
        "nombre_cliente",
        "razon_social",
        "cliente",
        "empresa",
    ])
}

fn default_email_aliases() -> Vec<String> {
    strings(&["email", "correos", "correo", "correo_electronico", "e-mail", "mail"])
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.extraction.strategies.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one extraction strategy is required".into(),
            ));
        }

        for (i, strategy) in self.extraction.strategies.iter().enumerate() {
            if self.extraction.strategies[..i].contains(strategy) {
                return Err(ReconError::ConfigValidation(format!(
                    "extraction strategy '{strategy}' listed twice"
                )));
            }
        }

        if self.extraction.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ReconError::ConfigValidation(
                "at least one document extension is required".into(),
            ));
        }

        if self.names.min_token_len == 0 {
            return Err(ReconError::ConfigValidation(
                "names.min_token_len must be at least 1".into(),
            ));
        }

        for (column, aliases) in [
            ("identifier", &self.columns.identifier),
            ("name", &self.columns.name),
            ("email", &self.columns.email),
        ] {
            if aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{column} needs at least one alias"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
