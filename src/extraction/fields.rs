// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Regex field extraction over raw OCR text

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// 12 digits, optionally space-grouped in runs of 4. Only neighbouring digits
// disqualify a match, so labels glued on by OCR (`VID1234 ...`) still match.
static AADHAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{4}\s?\d{4}\s?\d{4})(?:\D|$)").unwrap()
});

// dd/mm/yyyy with -, / or . separators; no calendar validation
static DOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)((?:0[1-9]|[12][0-9]|3[01])[-/.](?:0[1-9]|1[0-2])[-/.]\d{4})(?:\D|$)")
        .unwrap()
});

static PERCENTAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d+)?\s?%").unwrap());

/// Fields pulled out of a document's text; absent fields are omitted when serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
}

impl DocumentFields {
    pub fn is_empty(&self) -> bool {
        self.aadhar.is_none() && self.dob.is_none() && self.percentage.is_none()
    }

    pub fn count(&self) -> usize {
        [&self.aadhar, &self.dob, &self.percentage]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// First match of `re`; its first capture group when the pattern has one
fn first_match(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// Run each field pattern independently over the full text
pub fn extract_fields(text: &str) -> DocumentFields {
    DocumentFields {
        aadhar: first_match(&AADHAR_RE, text),
        dob: first_match(&DOB_RE, text),
        percentage: first_match(&PERCENTAGE_RE, text),
    }
}
