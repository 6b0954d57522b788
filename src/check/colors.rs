//! Color literal parsing and presentation.
//!
//! Accepted forms: `#RGB[A]`, `#RRGGBB[AA]`, `rgb[a](r,g,b[,a])` with
//! 0–255 components or percentages, `hsl[a](h,s[%],l[%][,a])`,
//! `hsv[a](…)`, and the model's default color names. Presentations render
//! back in the kind of the original text so round-trips hold to 1/255.

use crate::model::ClassModel;

/// A parsed color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise equality up to 1/255.
    pub fn close_to(&self, other: &Color) -> bool {
        let eps = 1.0 / 255.0 + f32::EPSILON;
        (self.r - other.r).abs() <= eps
            && (self.g - other.g).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.a - other.a).abs() <= eps
    }
}

/// Parse a color literal. Default color names resolve through the model.
pub fn parse_color(text: &str, model: Option<&ClassModel>) -> Option<Color> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    for (prefix, hsv) in [("hsl", false), ("hsv", true)] {
        if let Some(args) = function_args(text, prefix) {
            return parse_hsl_hsv(&args, hsv);
        }
    }
    if let Some(args) = function_args(text, "rgb") {
        return parse_rgb(&args);
    }
    if let Some(model) = model {
        if let Some(literal) = model.default_color(text) {
            if literal != text {
                return parse_color(literal, None);
            }
        }
    }
    None
}

/// `rgb(…)` / `rgba(…)` / `hsl(…)` … argument extraction.
fn function_args(text: &str, name: &str) -> Option<Vec<String>> {
    let rest = text
        .strip_prefix(name)
        .or_else(|| text.strip_prefix(&name.to_ascii_uppercase()))?;
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.split(',').map(|s| s.trim().to_string()).collect())
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits: Vec<u32> = hex.chars().map(|c| c.to_digit(16)).collect::<Option<_>>()?;
    let (r, g, b, a) = match digits.len() {
        3 => (
            (digits[0] * 17) as f32,
            (digits[1] * 17) as f32,
            (digits[2] * 17) as f32,
            255.0,
        ),
        4 => (
            (digits[0] * 17) as f32,
            (digits[1] * 17) as f32,
            (digits[2] * 17) as f32,
            (digits[3] * 17) as f32,
        ),
        6 => (
            (digits[0] * 16 + digits[1]) as f32,
            (digits[2] * 16 + digits[3]) as f32,
            (digits[4] * 16 + digits[5]) as f32,
            255.0,
        ),
        8 => (
            (digits[0] * 16 + digits[1]) as f32,
            (digits[2] * 16 + digits[3]) as f32,
            (digits[4] * 16 + digits[5]) as f32,
            (digits[6] * 16 + digits[7]) as f32,
        ),
        _ => return None,
    };
    Some(Color::rgba(r / 255.0, g / 255.0, b / 255.0, a / 255.0))
}

fn parse_component(text: &str) -> Option<f32> {
    if let Some(pct) = text.strip_suffix('%') {
        let value: f32 = pct.trim().parse().ok()?;
        if !(0.0..=100.0).contains(&value) {
            return None;
        }
        return Some(value / 100.0);
    }
    let value: f32 = text.parse().ok()?;
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value / 255.0)
}

fn parse_alpha(text: &str) -> Option<f32> {
    if let Some(pct) = text.strip_suffix('%') {
        let value: f32 = pct.trim().parse().ok()?;
        return Some((value / 100.0).clamp(0.0, 1.0));
    }
    let value: f32 = text.parse().ok()?;
    if value > 1.0 {
        return Some((value / 255.0).clamp(0.0, 1.0));
    }
    Some(value.clamp(0.0, 1.0))
}

fn parse_rgb(args: &[String]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let r = parse_component(&args[0])?;
    let g = parse_component(&args[1])?;
    let b = parse_component(&args[2])?;
    let a = match args.get(3) {
        Some(alpha) => parse_alpha(alpha)?,
        None => 1.0,
    };
    Some(Color::rgba(r, g, b, a))
}

fn parse_hsl_hsv(args: &[String], hsv: bool) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let h: f32 = args[0].trim_end_matches("deg").trim().parse().ok()?;
    let s = parse_fraction(&args[1])?;
    let lv = parse_fraction(&args[2])?;
    let a = match args.get(3) {
        Some(alpha) => parse_alpha(alpha)?,
        None => 1.0,
    };
    let (r, g, b) = if hsv {
        hsv_to_rgb(h, s, lv)
    } else {
        hsl_to_rgb(h, s, lv)
    };
    Some(Color::rgba(r, g, b, a))
}

/// Saturation/lightness: `50%` or a bare `0..=1` (or `0..=100`) number.
fn parse_fraction(text: &str) -> Option<f32> {
    if let Some(pct) = text.strip_suffix('%') {
        let value: f32 = pct.trim().parse().ok()?;
        return Some((value / 100.0).clamp(0.0, 1.0));
    }
    let value: f32 = text.parse().ok()?;
    if value > 1.0 {
        return Some((value / 100.0).clamp(0.0, 1.0));
    }
    Some(value.clamp(0.0, 1.0))
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let h = (h.rem_euclid(360.0)) / 360.0;
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(360.0) / 60.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i as i32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, l)
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    let d = max - min;
    let s = if max == 0.0 { 0.0 } else { d / max };
    if d == 0.0 {
        return (0.0, 0.0, v);
    }
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, v)
}

fn channel(value: f32) -> u32 {
    (value * 255.0).round().clamp(0.0, 255.0) as u32
}

/// Render a color in the kind of formatting the original text used.
pub fn color_to_string(color: Color, original: &str) -> String {
    let original = original.trim();
    let lower = original.to_ascii_lowercase();
    if lower.starts_with("rgb") {
        if color.a < 1.0 || lower.starts_with("rgba") {
            format!(
                "rgba({},{},{},{:.2})",
                channel(color.r),
                channel(color.g),
                channel(color.b),
                color.a
            )
        } else {
            format!(
                "rgb({},{},{})",
                channel(color.r),
                channel(color.g),
                channel(color.b)
            )
        }
    } else if lower.starts_with("hsl") {
        let (h, s, l) = rgb_to_hsl(color.r, color.g, color.b);
        if color.a < 1.0 || lower.starts_with("hsla") {
            format!(
                "hsla({},{}%,{}%,{:.2})",
                h.round(),
                (s * 100.0).round(),
                (l * 100.0).round(),
                color.a
            )
        } else {
            format!(
                "hsl({},{}%,{}%)",
                h.round(),
                (s * 100.0).round(),
                (l * 100.0).round()
            )
        }
    } else if lower.starts_with("hsv") {
        let (h, s, v) = rgb_to_hsv(color.r, color.g, color.b);
        if color.a < 1.0 || lower.starts_with("hsva") {
            format!(
                "hsva({},{}%,{}%,{:.2})",
                h.round(),
                (s * 100.0).round(),
                (v * 100.0).round(),
                color.a
            )
        } else {
            format!(
                "hsv({},{}%,{}%)",
                h.round(),
                (s * 100.0).round(),
                (v * 100.0).round()
            )
        }
    } else if color.a < 1.0 || (original.starts_with('#') && original.len() > 7) {
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            channel(color.r),
            channel(color.g),
            channel(color.b),
            channel(color.a)
        )
    } else {
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(color.r),
            channel(color.g),
            channel(color.b)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#fff", Color::rgba(1.0, 1.0, 1.0, 1.0))]
    #[case("#FF0000", Color::rgba(1.0, 0.0, 0.0, 1.0))]
    #[case("#FF000080", Color::rgba(1.0, 0.0, 0.0, 128.0 / 255.0))]
    #[case("rgb(255,0,0)", Color::rgba(1.0, 0.0, 0.0, 1.0))]
    #[case("rgba(0,255,0,0.5)", Color::rgba(0.0, 1.0, 0.0, 0.5))]
    #[case("rgb(100%,0%,0%)", Color::rgba(1.0, 0.0, 0.0, 1.0))]
    #[case("hsl(0,100%,50%)", Color::rgba(1.0, 0.0, 0.0, 1.0))]
    #[case("hsv(0,100%,100%)", Color::rgba(1.0, 0.0, 0.0, 1.0))]
    fn test_parse(#[case] text: &str, #[case] expected: Color) {
        let parsed = parse_color(text, None).unwrap_or_else(|| panic!("failed: {text}"));
        assert!(parsed.close_to(&expected), "{text} → {parsed:?}");
    }

    #[rstest]
    #[case("nonsense")]
    #[case("#ff")]
    #[case("#ggg")]
    #[case("rgb(300,0,0)")]
    #[case("rgb(1,2)")]
    fn test_parse_failures(#[case] text: &str) {
        assert!(parse_color(text, None).is_none());
    }

    #[rstest]
    #[case("#FF0000")]
    #[case("#12345678")]
    #[case("rgb(10,20,30)")]
    #[case("rgba(10,20,30,0.5)")]
    #[case("hsl(120,50%,50%)")]
    #[case("hsv(200,40%,80%)")]
    fn test_round_trip(#[case] text: &str) {
        let color = parse_color(text, None).unwrap();
        let rendered = color_to_string(color, text);
        let reparsed = parse_color(&rendered, None)
            .unwrap_or_else(|| panic!("unparseable render: {rendered}"));
        assert!(color.close_to(&reparsed), "{text} → {rendered}");
    }

    #[test]
    fn test_default_color_names() {
        use crate::model::ModelSource;
        let mut model = crate::model::ClassModel::new();
        model
            .load_from_str(
                r##"<Model><Model.Class name="DefaultColors">
                     <List x:id="members">
                       <Model.Member name="red" type="color" default="#FF0000"/>
                     </List>
                   </Model.Class></Model>"##,
                ModelSource::Elements,
            )
            .unwrap();
        let color = parse_color("red", Some(&model)).unwrap();
        assert!(color.close_to(&Color::rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(parse_color("blue", Some(&model)).is_none());
    }
}
