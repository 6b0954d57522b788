//! Name-based attribute type refinement.
//!
//! The model files underspecify many attributes; the original tooling
//! types them from naming conventions. Applied exactly once per lookup,
//! after the declared type has been resolved through the parent chain.

use super::types::AttrTypeMask;

/// Alias element names accepted where a layout class is expected, with the
/// classes they stand for.
pub const CLASS_ALIASES: &[(&str, &[&str])] = &[
    ("box", &["Horizontal", "Vertical"]),
    ("clipper", &["Layout"]),
    ("sizevariant", &["SizeVariant"]),
    ("table", &["Table"]),
];

/// Refine a declared attribute type from the attribute's (and element's)
/// name. A matching rule replaces the declared mask; otherwise the declared
/// mask is kept.
pub fn guess_type(elem: &str, attr: &str, declared: AttrTypeMask) -> AttrTypeMask {
    let lower = attr.to_ascii_lowercase();

    if lower.ends_with("color") || lower.ends_with("color.disabled") || lower.ends_with("color.on")
    {
        return AttrTypeMask::COLOR;
    }
    if attr == "style" || attr == "inherit" {
        return AttrTypeMask::STYLE_ARRAY;
    }
    if attr == "image"
        || attr == "icon"
        || attr == "background"
        || lower.ends_with(".image")
        || lower.ends_with(".icon")
    {
        return AttrTypeMask::IMAGE;
    }
    if attr == "url" {
        return if elem == "ShapeImage" {
            AttrTypeMask::SHAPE | AttrTypeMask::URI
        } else {
            AttrTypeMask::URI
        };
    }
    if attr == "shaperef" {
        return AttrTypeMask::SHAPE;
    }
    if elem == "Font" && attr == "themeid" {
        return AttrTypeMask::FONT;
    }
    if attr == "form.name" || (attr == "name" && matches!(elem, "View" | "Target" | "ScrollView"))
    {
        return AttrTypeMask::FORM;
    }
    if elem == "Layout" && attr == "layout.class" {
        return AttrTypeMask::ENUM;
    }
    if (elem == "StyleAlias" || elem == "styleselector") && attr == "styles" {
        return AttrTypeMask::STYLE_ARRAY;
    }
    if (elem == "Font" && attr == "size") || (elem == "Style" && attr == "textsize") {
        return AttrTypeMask::FONT_SIZE;
    }
    if elem == "Animation" && attr == "repeat" {
        return AttrTypeMask::INT | AttrTypeMask::STR_FOREVER;
    }
    if attr == "sizelimits" {
        return AttrTypeMask::RECT | AttrTypeMask::STR_NONE;
    }
    if lower.ends_with("duration") {
        return AttrTypeMask::DURATION;
    }

    declared
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Button", "textcolor", AttrTypeMask::COLOR)]
    #[case("Button", "color.disabled", AttrTypeMask::COLOR)]
    #[case("Button", "color.on", AttrTypeMask::COLOR)]
    #[case("Button", "style", AttrTypeMask::STYLE_ARRAY)]
    #[case("Style", "inherit", AttrTypeMask::STYLE_ARRAY)]
    #[case("Button", "icon", AttrTypeMask::IMAGE)]
    #[case("Button", "background", AttrTypeMask::IMAGE)]
    #[case("Image", "url", AttrTypeMask::URI)]
    #[case("Button", "shaperef", AttrTypeMask::SHAPE)]
    #[case("Font", "themeid", AttrTypeMask::FONT)]
    #[case("View", "name", AttrTypeMask::FORM)]
    #[case("ScrollView", "name", AttrTypeMask::FORM)]
    #[case("Delegate", "form.name", AttrTypeMask::FORM)]
    #[case("Layout", "layout.class", AttrTypeMask::ENUM)]
    #[case("styleselector", "styles", AttrTypeMask::STYLE_ARRAY)]
    #[case("Font", "size", AttrTypeMask::FONT_SIZE)]
    #[case("Style", "textsize", AttrTypeMask::FONT_SIZE)]
    #[case("Button", "fadeduration", AttrTypeMask::DURATION)]
    fn test_single_bit_rules(
        #[case] elem: &str,
        #[case] attr: &str,
        #[case] expected: AttrTypeMask,
    ) {
        assert_eq!(guess_type(elem, attr, AttrTypeMask::STRING), expected);
    }

    #[test]
    fn test_shape_image_url_is_composite() {
        let mask = guess_type("ShapeImage", "url", AttrTypeMask::NO_TYPE);
        assert!(mask.contains(AttrTypeMask::SHAPE));
        assert!(mask.contains(AttrTypeMask::URI));
    }

    #[test]
    fn test_animation_repeat() {
        let mask = guess_type("Animation", "repeat", AttrTypeMask::INT);
        assert!(mask.contains(AttrTypeMask::INT));
        assert!(mask.contains(AttrTypeMask::STR_FOREVER));
    }

    #[test]
    fn test_sizelimits() {
        let mask = guess_type("Button", "sizelimits", AttrTypeMask::NO_TYPE);
        assert!(mask.contains(AttrTypeMask::RECT));
        assert!(mask.contains(AttrTypeMask::STR_NONE));
    }

    #[test]
    fn test_unmatched_name_keeps_declared() {
        assert_eq!(
            guess_type("Button", "text", AttrTypeMask::STRING),
            AttrTypeMask::STRING
        );
    }

    #[test]
    fn test_plain_name_is_not_a_form_elsewhere() {
        assert_eq!(
            guess_type("Button", "name", AttrTypeMask::STRING),
            AttrTypeMask::STRING
        );
    }
}
