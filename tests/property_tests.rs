use image::GenericImageView;
use photo_squeeze::crop::{crop_region, crop_to_fill};
use photo_squeeze::export::output_file_name;
use photo_squeeze::formats::OutputFormat;
use photo_squeeze::options::{Options, TargetPreset};
use proptest::prelude::*;
use std::str::FromStr;

proptest! {
    #[test]
    fn crop_region_stays_inside_source(
        source_w in 1u32..=4000u32,
        source_h in 1u32..=4000u32,
        target_w in 1u32..=1000u32,
        target_h in 1u32..=1000u32,
    ) {
        let (x, y, w, h) = crop_region(source_w, source_h, target_w, target_h);

        prop_assert!(w >= 1 && h >= 1);
        prop_assert!(x + w <= source_w);
        prop_assert!(y + h <= source_h);
    }

    #[test]
    fn crop_region_is_centered(
        source_w in 1u32..=4000u32,
        source_h in 1u32..=4000u32,
        target_w in 1u32..=1000u32,
        target_h in 1u32..=1000u32,
    ) {
        let (x, y, w, h) = crop_region(source_w, source_h, target_w, target_h);

        // Leftover margin splits evenly, within one pixel for odd leftovers.
        let right = source_w - (x + w);
        let bottom = source_h - (y + h);
        prop_assert!(x.abs_diff(right) <= 1);
        prop_assert!(y.abs_diff(bottom) <= 1);
    }

    #[test]
    fn crop_region_keeps_one_full_axis(
        source_w in 1u32..=4000u32,
        source_h in 1u32..=4000u32,
        target_w in 1u32..=1000u32,
        target_h in 1u32..=1000u32,
    ) {
        let (_, _, w, h) = crop_region(source_w, source_h, target_w, target_h);
        prop_assert!(w == source_w || h == source_h);
    }

    #[test]
    fn crop_to_fill_output_dimensions_exact(
        source_w in 1u32..=256u32,
        source_h in 1u32..=256u32,
        target in prop::sample::select(&[(295u32, 413u32), (413u32, 579u32), (100u32, 100u32)]),
    ) {
        let img = image::DynamicImage::new_rgb8(source_w, source_h);
        let out = crop_to_fill(&img, target.0, target.1);
        prop_assert_eq!(out.dimensions(), target);
    }

    #[test]
    fn options_quality_validation(quality in 0.0f32..2.0f32) {
        let result = Options::new(5.0, 2560, true, OutputFormat::Jpeg, quality);
        if (0.1..=1.0).contains(&quality) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn output_format_from_str_known_names(
        name in prop::sample::select(&["jpeg", "jpg", "png", "webp", "JPEG", "PNG"])
    ) {
        prop_assert!(OutputFormat::from_str(name).is_ok());
    }

    #[test]
    fn preset_from_str_round_trip(
        preset in prop::sample::select(&[
            TargetPreset::Original,
            TargetPreset::OneInch,
            TargetPreset::TwoInch,
            TargetPreset::Custom,
        ])
    ) {
        let parsed = TargetPreset::from_str(&preset.to_string()).unwrap();
        prop_assert_eq!(parsed, preset);
    }

    #[test]
    fn output_file_name_convention(
        stem in "[a-zA-Z0-9_-]{1,12}",
        ext in prop::sample::select(&["jpg", "png", "webp", "gif"]),
        format in prop::sample::select(&[OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP]),
    ) {
        let name = format!("{}.{}", stem, ext);
        let out = output_file_name(&name, format);
        prop_assert_eq!(out, format!("{}_compressed.{}", stem, format.extension()));
    }
}
