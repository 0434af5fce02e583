//! Keyword-anchored field extraction over detected text lines.
//!
//! Lookups work on the top-to-bottom ordered [`TextLine`]s. A rule that cannot
//! find its anchor, or whose target line does not exist, aborts the whole
//! extraction: there is no partial record.

mod clean;
pub mod rules;

pub use clean::strip_special_chars;
pub use rules::{Anchor, FieldRule, PostProcess, Strategy, Template};

use geo_types::{coord, Rect};
use itertools::Itertools;

use crate::error::{ExtractionError, Result};
use crate::ocr::{PageSegMode, Recognizer};
use crate::record::{DocumentType, Extraction, Field, FieldRecord};
use crate::text_line::{crop_region, TextLine};

/// Decides the card layout from the first text line.
pub fn classify(lines: &[TextLine]) -> Result<DocumentType, ExtractionError> {
    let first = lines.first().ok_or(ExtractionError::NoTextLines)?;

    if first.text.contains(rules::DRIVING_LICENCE_MARKER) {
        Ok(DocumentType::DrivingLicence)
    } else {
        Ok(DocumentType::VoterId)
    }
}

/// Index of the first line matching `anchor`. Later matches are ignored.
pub fn find_anchor(
    lines: &[TextLine],
    field: Field,
    anchor: Anchor,
) -> Result<usize, ExtractionError> {
    let mut matches = lines.iter().positions(|l| anchor.matches(&l.text));

    let index = matches.next().ok_or_else(|| ExtractionError::MissingAnchor {
        field,
        anchor: anchor.keyword().to_string(),
    })?;

    let others = matches.count();
    if others > 0 {
        tracing::debug!(
            "{field:?}: anchor {:?} matched {} lines, using line {index}",
            anchor.keyword(),
            others + 1
        );
    }

    Ok(index)
}

/// The segment after the first `delimiter` in the anchored line, up to the next one.
pub fn same_line_split(
    lines: &[TextLine],
    field: Field,
    anchor: Anchor,
    delimiter: &str,
) -> Result<String, ExtractionError> {
    let index = find_anchor(lines, field, anchor)?;

    lines[index]
        .text
        .split(delimiter)
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::MissingSegment {
            field,
            delimiter: delimiter.to_string(),
        })
}

/// Index of the line right after the anchor.
pub fn next_index(
    lines: &[TextLine],
    field: Field,
    anchor: Anchor,
) -> Result<usize, ExtractionError> {
    let index = find_anchor(lines, field, anchor)? + 1;

    if index >= lines.len() {
        return Err(ExtractionError::IndexOutOfRange {
            field,
            index,
            len: lines.len(),
        });
    }

    Ok(index)
}

pub fn next_line(
    lines: &[TextLine],
    field: Field,
    anchor: Anchor,
) -> Result<String, ExtractionError> {
    let index = next_index(lines, field, anchor)?;
    Ok(lines[index].text.clone())
}

/// Region from the lower-left corner of the `from` line to the upper-right corner
/// of the `until` line.
pub fn span_region(
    lines: &[TextLine],
    field: Field,
    from: Anchor,
    until: Anchor,
) -> Result<Rect<i32>, ExtractionError> {
    let upper = lines[find_anchor(lines, field, from)?].bbox;
    let lower = lines[find_anchor(lines, field, until)?].bbox;

    let (x_min, y_min) = (upper.min().x, upper.max().y);
    let (x_max, y_max) = (lower.max().x, lower.min().y);

    if x_max <= x_min || y_max <= y_min {
        return Err(ExtractionError::DegenerateRegion { field });
    }

    Ok(Rect::new(
        coord! { x: x_min, y: y_min },
        coord! { x: x_max, y: y_max },
    ))
}

/// Applies rule tables to one card's text lines.
///
/// The source image and a recognizer are needed for rules that OCR a region again.
pub struct FieldExtractor<'a, R> {
    lines: &'a [TextLine],
    image: &'a image::DynamicImage,
    recognizer: R,
}

impl<'a, R: Recognizer> FieldExtractor<'a, R> {
    pub fn new(lines: &'a [TextLine], image: &'a image::DynamicImage, recognizer: R) -> Self {
        Self {
            lines,
            image,
            recognizer,
        }
    }

    pub fn document_type(&self) -> Result<DocumentType> {
        Ok(classify(self.lines)?)
    }

    /// Classifies the card and extracts every field of its template.
    pub fn extract(&mut self) -> Result<Extraction> {
        let doc_type = self.document_type()?;
        tracing::info!("document looks like a {doc_type:?} ({})", doc_type.tag());

        let record = self.extract_template(Template::for_document(doc_type))?;

        Ok(Extraction { doc_type, record })
    }

    pub fn extract_template(&mut self, template: &Template) -> Result<FieldRecord> {
        let mut record = FieldRecord::new();

        for rule in template.rules {
            let value = self.apply(rule)?;
            tracing::debug!("{:?} = {value:?}", rule.field);
            record.insert(rule.field, value);
        }

        Ok(record)
    }

    /// Runs one rule, including its post-processing.
    pub fn apply(&mut self, rule: &FieldRule) -> Result<String> {
        let raw = self.raw_value(rule)?;
        Ok(rule.post.iter().fold(raw, |value, post| post.apply(value)))
    }

    fn raw_value(&mut self, rule: &FieldRule) -> Result<String> {
        let (lines, field) = (self.lines, rule.field);

        match rule.strategy {
            Strategy::SameLine { delimiter } => {
                Ok(same_line_split(lines, field, rule.anchor, delimiter)?)
            }
            Strategy::NextLine => Ok(next_line(lines, field, rule.anchor)?),
            Strategy::NextBox { mode } => {
                let index = next_index(lines, field, rule.anchor)?;
                self.recognize_region(field, lines[index].bbox, mode)
            }
            Strategy::Span { until } => {
                let region = span_region(lines, field, rule.anchor, until)?;
                self.recognize_region(field, region, PageSegMode::UniformBlock)
            }
        }
    }

    fn recognize_region(
        &mut self,
        field: Field,
        region: Rect<i32>,
        mode: PageSegMode,
    ) -> Result<String> {
        let crop =
            crop_region(self.image, region).ok_or(ExtractionError::DegenerateRegion { field })?;
        self.recognizer.recognize(&crop, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::{DynamicImage, GenericImageView};
    use pretty_assertions::assert_eq;

    /// Returns scripted responses in order and remembers what it was asked.
    #[derive(Default)]
    struct ScriptedRecognizer {
        responses: Vec<String>,
        calls: Vec<((u32, u32), PageSegMode)>,
    }

    impl ScriptedRecognizer {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().rev().map(|s| s.to_string()).collect(),
                calls: vec![],
            }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn recognize(&mut self, img: &DynamicImage, mode: PageSegMode) -> Result<String> {
            self.calls.push((img.dimensions(), mode));
            Ok(self.responses.pop().unwrap_or_default())
        }
    }

    /// Lines stacked 40px apart, each 30px tall.
    fn stacked(texts: &[&str]) -> Vec<TextLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let y = i as i32 * 40;
                TextLine::new(10, y, 400, y + 30, *t)
            })
            .collect()
    }

    fn apply(
        template: &Template,
        field: Field,
        lines: &[TextLine],
        ocr: &mut ScriptedRecognizer,
    ) -> Result<String> {
        let img = DynamicImage::new_rgb8(500, 500);
        let rule = template.rule(field).unwrap();
        let value = FieldExtractor::new(lines, &img, ocr).apply(rule);
        value
    }

    fn missing_anchor(result: Result<impl std::fmt::Debug>) -> (Field, String) {
        match result {
            Err(Error::Extraction(ExtractionError::MissingAnchor { field, anchor })) => {
                (field, anchor)
            }
            other => panic!("expected a missing anchor, got {other:?}"),
        }
    }

    #[test]
    fn classifies_on_first_line() {
        let dl = stacked(&["Transport Department", "Name"]);
        let vid = stacked(&["ELECTION COMMISSION OF INDIA", "Transport"]);

        assert_eq!(classify(&dl), Ok(DocumentType::DrivingLicence));
        assert_eq!(classify(&vid), Ok(DocumentType::VoterId));
        assert_eq!(classify(&[]), Err(ExtractionError::NoTextLines));
    }

    #[test]
    fn licence_names_come_from_next_line() {
        let lines = stacked(&["GOVERNMENT", "Name", "JOHN DOE", "S/W/D", "RICHARD DOE"]);
        let mut ocr = ScriptedRecognizer::default();

        let name = apply(&rules::DRIVING_LICENCE, Field::Name, &lines, &mut ocr).unwrap();
        let father =
            apply(&rules::DRIVING_LICENCE, Field::FatherOrHusbandName, &lines, &mut ocr).unwrap();

        assert_eq!(name, "JOHN DOE");
        assert_eq!(father, "RICHARD DOE");
        assert!(ocr.calls.is_empty());
    }

    #[test]
    fn elector_name_is_split_on_colon() {
        let lines = stacked(&["ELECTION COMMISSION OF INDIA", "Elector's Name: JANE SMITH"]);
        let mut ocr = ScriptedRecognizer::default();

        let name = apply(&rules::VOTER_ID, Field::Name, &lines, &mut ocr).unwrap();
        assert_eq!(name, "JANE SMITH");
    }

    #[test]
    fn blood_group_zero_is_corrected() {
        let lines = stacked(&["Transport", "BG: 0"]);
        let mut ocr = ScriptedRecognizer::default();

        let bg = apply(&rules::DRIVING_LICENCE, Field::BloodGroup, &lines, &mut ocr).unwrap();
        assert_eq!(bg, "O");
    }

    #[test]
    fn date_of_birth_is_second_token() {
        let lines = stacked(&["Transport", "DOB 12-05-1990 extra"]);
        let mut ocr = ScriptedRecognizer::default();

        let dob = apply(&rules::DRIVING_LICENCE, Field::DateOfBirth, &lines, &mut ocr).unwrap();
        assert_eq!(dob, "12-05-1990");
    }

    #[test]
    fn ids_are_uppercased() {
        let mut ocr = ScriptedRecognizer::default();

        let lines = stacked(&["ELECTION COMMISSION OF INDIA IDENTITY CARD   abc1234567"]);
        let vid = apply(&rules::VOTER_ID, Field::VoterIdNumber, &lines, &mut ocr).unwrap();
        assert_eq!(vid, "ABC1234567");

        let lines = stacked(&["Transport", "Licence No: dl-0420110149646"]);
        let dl = apply(&rules::DRIVING_LICENCE, Field::LicenseIdNumber, &lines, &mut ocr).unwrap();
        assert_eq!(dl, "DL-0420110149646");
    }

    #[test]
    fn gender_reads_the_box_after_sex() {
        let lines = stacked(&[
            "ELECTION COMMISSION",
            "IDENTITY CARD X1",
            "Elector's Name: A",
            "Sex",
            "(F)",
        ]);

        let mut ocr = ScriptedRecognizer::new(&["F"]);
        let gender = apply(&rules::VOTER_ID, Field::Gender, &lines, &mut ocr).unwrap();
        assert_eq!(gender, "Female");
        assert_eq!(ocr.calls, vec![((390, 30), PageSegMode::CircleWord)]);

        let mut ocr = ScriptedRecognizer::new(&["X"]);
        let gender = apply(&rules::VOTER_ID, Field::Gender, &lines, &mut ocr).unwrap();
        assert_eq!(gender, "Not Recognized");
    }

    #[test]
    fn anchor_on_last_line_is_out_of_range() {
        let lines = stacked(&["ELECTION COMMISSION", "Sex"]);
        let mut ocr = ScriptedRecognizer::default();

        let err = apply(&rules::VOTER_ID, Field::Gender, &lines, &mut ocr).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::IndexOutOfRange {
                field: Field::Gender,
                index: 2,
                len: 2
            })
        ));
    }

    #[test]
    fn missing_name_anchor_fails() {
        let lines = stacked(&["GOVERNMENT", "Name:", "JOHN DOE"]);
        let mut ocr = ScriptedRecognizer::default();

        let result = apply(&rules::DRIVING_LICENCE, Field::Name, &lines, &mut ocr);
        let (field, anchor) = missing_anchor(result);
        assert_eq!(field, Field::Name);
        assert_eq!(anchor, "Name");
    }

    #[test]
    fn line_without_delimiter_is_missing_segment() {
        let lines = stacked(&["Transport", "DOB"]);
        let mut ocr = ScriptedRecognizer::default();

        let err =
            apply(&rules::DRIVING_LICENCE, Field::DateOfBirth, &lines, &mut ocr).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::MissingSegment {
                field: Field::DateOfBirth,
                ..
            })
        ));
    }

    #[test]
    fn first_matching_line_wins() {
        let lines = stacked(&["ELECTION COMMISSION", "Age: 34", "Age: 99"]);
        let mut ocr = ScriptedRecognizer::default();

        let age = apply(&rules::VOTER_ID, Field::Age, &lines, &mut ocr).unwrap();
        assert_eq!(age, "34");
    }

    #[test]
    fn address_is_read_between_blood_group_and_issue_date() {
        let lines = vec![
            TextLine::new(10, 0, 400, 30, "Transport"),
            TextLine::new(20, 100, 200, 120, "BG: B+"),
            TextLine::new(15, 200, 300, 220, "Date of Issue 01-01-2015"),
        ];
        let mut ocr = ScriptedRecognizer::new(&["12 MAIN ST\nNEW DELHI"]);

        let address = apply(&rules::DRIVING_LICENCE, Field::Address, &lines, &mut ocr).unwrap();

        assert_eq!(address, "12 MAIN ST NEW DELHI");
        assert_eq!(ocr.calls, vec![((280, 80), PageSegMode::UniformBlock)]);
    }

    #[test]
    fn inverted_address_region_is_rejected() {
        let lines = vec![
            TextLine::new(10, 0, 400, 30, "Transport"),
            TextLine::new(15, 100, 300, 120, "Date of Issue 01-01-2015"),
            TextLine::new(20, 200, 200, 220, "BG: B+"),
        ];
        let mut ocr = ScriptedRecognizer::default();

        let err = apply(&rules::DRIVING_LICENCE, Field::Address, &lines, &mut ocr).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::DegenerateRegion { field: Field::Address })
        ));
        assert!(ocr.calls.is_empty());
    }

    #[test]
    fn extraction_stops_at_first_failure() {
        let lines = stacked(&["Transport Department", "Licence No: DL-1", "GOVERNMENT"]);
        let img = DynamicImage::new_rgb8(500, 500);
        let mut ocr = ScriptedRecognizer::default();

        let result = FieldExtractor::new(&lines, &img, &mut ocr).extract();

        assert_eq!(missing_anchor(result), (Field::Name, "Name".to_string()));
    }
}
