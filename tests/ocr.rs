#![cfg(feature = "ocr")]

use std::collections::HashSet;
use std::ffi::OsString;

use image::{DynamicImage, Rgb, RgbImage};

use idcard_ort::ocr::{PageSegMode, TesseractAgent};

fn ocr_temp_files() -> HashSet<OsString> {
    std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .filter(|name| name.to_string_lossy().starts_with("idcard-ocr-"))
        .collect()
}

// Needs tesseract trained data; run with:
// cargo test --test ocr -- --ignored
#[test]
#[ignore = "needs tessdata/ with eng.traineddata"]
fn temp_images_are_removed_after_ocr() {
    let before = ocr_temp_files();

    let mut ocr =
        TesseractAgent::new_data_path("tessdata", &["eng"]).expect("tesseract initialises");
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 40, Rgb([255, 255, 255])));

    for mode in [PageSegMode::UniformBlock, PageSegMode::SingleWord, PageSegMode::CircleWord] {
        ocr.extract_text(&img, mode).unwrap();
    }

    let left: Vec<_> = ocr_temp_files().difference(&before).cloned().collect();
    assert!(left.is_empty(), "temp images left behind: {left:?}");
}
