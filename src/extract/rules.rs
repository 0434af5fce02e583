//! Per-template field rules.
//!
//! Each card layout is a table of [`FieldRule`]s: where the value is anchored,
//! how to get from the anchor to the value, and how to clean it up. The tables
//! are evaluated in order and the record keeps that order.

use crate::ocr::PageSegMode;
use crate::record::{DocumentType, Field};

use super::clean;

/// How a text line is located among the OCR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The line contains the keyword.
    Contains(&'static str),
    /// The line is exactly the token, including case and whitespace.
    Exact(&'static str),
}

impl Anchor {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Anchor::Contains(keyword) => text.contains(keyword),
            Anchor::Exact(token) => text == *token,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Anchor::Contains(keyword) | Anchor::Exact(keyword) => keyword,
        }
    }
}

/// How to get from the anchored line to the field's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Split the anchored line on `delimiter` and take the second segment.
    SameLine { delimiter: &'static str },
    /// Text of the line right after the anchor.
    NextLine,
    /// OCR the box right after the anchor again, in `mode`.
    NextBox { mode: PageSegMode },
    /// OCR the region from the anchor box's lower-left corner to the upper-right
    /// corner of the box matching `until`.
    Span { until: Anchor },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    StripSpecialChars,
    TrimStart,
    Uppercase,
    /// OCR reads the blood group `O` as a zero.
    ZeroAsLetterO,
    NewlinesToSpaces,
    Gender,
}

impl PostProcess {
    pub fn apply(&self, value: String) -> String {
        match self {
            PostProcess::StripSpecialChars => clean::strip_special_chars(&value),
            PostProcess::TrimStart => value.trim_start().to_string(),
            PostProcess::Uppercase => value.to_uppercase(),
            PostProcess::ZeroAsLetterO => {
                if value == "0" {
                    "O".to_string()
                } else {
                    value
                }
            }
            PostProcess::NewlinesToSpaces => value.replace('\n', " "),
            PostProcess::Gender => clean::gender(&value).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub anchor: Anchor,
    pub strategy: Strategy,
    pub post: &'static [PostProcess],
}

/// The rules for one card layout.
#[derive(Debug)]
pub struct Template {
    pub doc_type: DocumentType,
    pub rules: &'static [FieldRule],
}

impl Template {
    pub fn for_document(doc_type: DocumentType) -> &'static Template {
        match doc_type {
            DocumentType::DrivingLicence => &DRIVING_LICENCE,
            DocumentType::VoterId => &VOTER_ID,
        }
    }

    pub fn rule(&self, field: Field) -> Option<&'static FieldRule> {
        self.rules.iter().find(|r| r.field == field)
    }
}

/// First-line keyword that marks a Driving Licence; anything else is a Voter ID.
pub const DRIVING_LICENCE_MARKER: &str = "Transport";

pub static DRIVING_LICENCE: Template = Template {
    doc_type: DocumentType::DrivingLicence,
    rules: &[
        FieldRule {
            field: Field::LicenseIdNumber,
            anchor: Anchor::Contains("Licence No"),
            strategy: Strategy::SameLine { delimiter: ": " },
            post: &[PostProcess::Uppercase],
        },
        FieldRule {
            field: Field::Name,
            anchor: Anchor::Exact("Name"),
            strategy: Strategy::NextLine,
            post: &[PostProcess::StripSpecialChars],
        },
        FieldRule {
            field: Field::FatherOrHusbandName,
            anchor: Anchor::Exact("S/W/D"),
            strategy: Strategy::NextLine,
            post: &[PostProcess::StripSpecialChars],
        },
        FieldRule {
            field: Field::DateOfBirth,
            anchor: Anchor::Contains("DOB"),
            strategy: Strategy::SameLine { delimiter: " " },
            post: &[],
        },
        // the address has no caption; it sits between the blood group and issue date lines
        FieldRule {
            field: Field::Address,
            anchor: Anchor::Contains("BG"),
            strategy: Strategy::Span {
                until: Anchor::Contains("Date of Issue"),
            },
            post: &[PostProcess::NewlinesToSpaces],
        },
        FieldRule {
            field: Field::BloodGroup,
            anchor: Anchor::Contains("BG"),
            strategy: Strategy::SameLine { delimiter: "BG: " },
            post: &[PostProcess::ZeroAsLetterO],
        },
    ],
};

pub static VOTER_ID: Template = Template {
    doc_type: DocumentType::VoterId,
    rules: &[
        FieldRule {
            field: Field::VoterIdNumber,
            anchor: Anchor::Contains("IDENTITY CARD"),
            strategy: Strategy::SameLine { delimiter: "CARD" },
            post: &[PostProcess::TrimStart, PostProcess::Uppercase],
        },
        FieldRule {
            field: Field::Name,
            anchor: Anchor::Contains("Elector's Name"),
            strategy: Strategy::SameLine { delimiter: ": " },
            post: &[PostProcess::StripSpecialChars],
        },
        // layout assumption: the detector puts the circled gender mark right after "Sex"
        FieldRule {
            field: Field::Gender,
            anchor: Anchor::Exact("Sex"),
            strategy: Strategy::NextBox {
                mode: PageSegMode::CircleWord,
            },
            post: &[PostProcess::Gender],
        },
        FieldRule {
            field: Field::FatherOrHusbandName,
            anchor: Anchor::Contains("Husband's Name"),
            strategy: Strategy::SameLine { delimiter: ": " },
            post: &[PostProcess::StripSpecialChars],
        },
        FieldRule {
            field: Field::Age,
            anchor: Anchor::Contains("Age"),
            strategy: Strategy::SameLine { delimiter: ": " },
            post: &[],
        },
    ],
};
