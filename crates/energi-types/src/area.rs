// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of EnergiData.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Market area (bidding zone) a price applies to.
///
/// Energidataservice reports more areas than the two Danish ones (neighbouring
/// zones show up in some datasets), so unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PriceArea {
    /// West Denmark
    Dk1,
    /// East Denmark
    Dk2,
    Other(String),
}

impl PriceArea {
    pub fn code(&self) -> &str {
        match self {
            Self::Dk1 => "DK1",
            Self::Dk2 => "DK2",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for PriceArea {
    fn from(code: String) -> Self {
        let code = code.trim();
        match code.to_uppercase().as_str() {
            "DK1" => Self::Dk1,
            "DK2" => Self::Dk2,
            _ => Self::Other(code.to_owned()),
        }
    }
}

impl From<&str> for PriceArea {
    fn from(code: &str) -> Self {
        Self::from(code.to_owned())
    }
}

impl From<PriceArea> for String {
    fn from(area: PriceArea) -> Self {
        area.code().to_owned()
    }
}

impl FromStr for PriceArea {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PriceArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Ordered by area code
impl Ord for PriceArea {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code().cmp(other.code())
    }
}

impl PartialOrd for PriceArea {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
