//! Extracted records and their JSON form.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::Result;

/// The two supported card templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    DrivingLicence,
    VoterId,
}

impl DocumentType {
    /// Key the record is filed under in the JSON output.
    pub fn tag(&self) -> &'static str {
        match self {
            DocumentType::DrivingLicence => "DL",
            DocumentType::VoterId => "VID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LicenseIdNumber,
    VoterIdNumber,
    Name,
    FatherOrHusbandName,
    DateOfBirth,
    Address,
    BloodGroup,
    Age,
    Gender,
}

impl Field {
    /// JSON key for this field.
    pub fn label(&self) -> &'static str {
        match self {
            Field::LicenseIdNumber => "License Id Number",
            Field::VoterIdNumber => "Voter Id Number",
            Field::Name => "Name",
            Field::FatherOrHusbandName => "Father/Husband Name",
            Field::DateOfBirth => "DoB/YoB",
            Field::Address => "Address",
            Field::BloodGroup => "Blood Group",
            Field::Age => "Age",
            Field::Gender => "Gender",
        }
    }
}

/// Field values in the order they were extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    fields: Vec<(Field, String)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field`, replacing any earlier value in place.
    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, old)) => *old = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.label(), value)?;
        }
        map.end()
    }
}

/// A fully extracted card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub doc_type: DocumentType,
    pub record: FieldRecord,
}

impl Serialize for Extraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.doc_type.tag(), std::slice::from_ref(&self.record))?;
        map.end()
    }
}

impl Extraction {
    /// Writes `{"<tag>": [{...}]}` with four-space indentation.
    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut serializer)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// The image path with its extension replaced by `.json`.
pub fn output_path(image_path: impl AsRef<Path>) -> PathBuf {
    image_path.as_ref().with_extension("json")
}
