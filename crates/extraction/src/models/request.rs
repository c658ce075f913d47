use crate::errors::{ExtractionError, ExtractionResult};
use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CNES codes are exactly seven digits
pub static CNES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{7}$").expect("Invalid regex pattern for CNES"));

/// Competência: four-digit year followed by a 01-12 month
pub static COMPETENCIA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<year>[0-9]{4})(?P<month>0[1-9]|1[0-2])$")
        .expect("Invalid regex pattern for competência")
});

/// Portuguese month names, indexed by month - 1
pub const MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Facility identifier (Cadastro Nacional de Estabelecimentos de Saúde)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnes(String);

impl Cnes {
    pub fn parse(value: &str) -> ExtractionResult<Self> {
        let value = value.trim();
        if CNES_PATTERN.is_match(value) {
            Ok(Cnes(value.to_string()))
        } else {
            Err(ExtractionError::InvalidCnes(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cnes {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cnes::parse(s)
    }
}

impl TryFrom<String> for Cnes {
    type Error = ExtractionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cnes::parse(&value)
    }
}

impl From<Cnes> for String {
    fn from(value: Cnes) -> Self {
        value.0
    }
}

impl fmt::Display for Cnes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reporting period key, `YYYYMM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competencia {
    year: u16,
    month: u8,
}

impl Competencia {
    pub fn new(year: u16, month: u8) -> ExtractionResult<Self> {
        if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
            return Err(ExtractionError::InvalidCompetencia(format!("{:04}{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn parse(value: &str) -> ExtractionResult<Self> {
        let value = value.trim();
        let invalid = || ExtractionError::InvalidCompetencia(value.to_string());

        let captures = COMPETENCIA_PATTERN.captures(value).ok_or_else(invalid)?;
        let year = captures["year"].parse::<u16>().map_err(|_| invalid())?;
        let month = captures["month"].parse::<u8>().map_err(|_| invalid())?;
        Competencia::new(year, month)
    }

    /// The current month on the local clock
    pub fn current() -> Self {
        let now = Local::now();
        Self {
            year: now.year() as u16,
            month: now.month() as u8,
        }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// `"Janeiro/2025"`
    pub fn label(&self) -> String {
        format!("{}/{}", MONTHS[(self.month - 1) as usize], self.year)
    }
}

impl FromStr for Competencia {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Competencia::parse(s)
    }
}

impl TryFrom<String> for Competencia {
    type Error = ExtractionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Competencia::parse(&value)
    }
}

impl From<Competencia> for String {
    fn from(value: Competencia) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Competencia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

/// Parameters of one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub cnes: Cnes,
    pub competencia: Competencia,
    /// `None` extracts everything
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl ExtractionRequest {
    pub fn new(cnes: Cnes, competencia: Competencia) -> Self {
        Self {
            cnes,
            competencia,
            limit: None,
            offset: 0,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Query string pairs sent to the backend
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("cnes", self.cnes.to_string()),
            ("competencia", self.competencia.to_string()),
        ];
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        pairs
    }
}
