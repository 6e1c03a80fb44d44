use image::Rgb;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// Hue coding
//------------------------------------------------------------------------------

/// Fully saturated color whose hue is `value / 255` of the color wheel
pub fn hue_color(value: u8) -> Rgb<u8> {
    let (r, g, b) = hsv_to_rgb(value as f64 / 255.0, 1.0, 1.0);
    Rgb([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8])
}

/// Inverse of [`hue_color`]. Black, and white or grey, read as the sentinel 0.
pub fn classify(px: Rgb<f64>) -> u8 {
    let Rgb([r, g, b]) = px;
    let (h, s, v) = rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0);
    if v < 0.1 || (v > 0.9 && s < 0.1) {
        return 0;
    }
    (h * 255.0).round() as u8
}

/// Saturated and bright enough to carry a hue
pub fn is_colored(px: Rgb<f64>) -> bool {
    let Rgb([r, g, b]) = px;
    let (_, s, v) = rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0);
    s > 0.5 && v > 0.5
}

/// Mean channel intensity below half scale
pub fn is_dark(px: Rgb<f64>) -> bool {
    let Rgb([r, g, b]) = px;
    (r + g + b) / 3.0 < 128.0
}

/// Close to pure black. Finder markers pass, saturated hues and the red marker do not.
pub fn is_black(px: Rgb<f64>) -> bool {
    let Rgb([r, g, b]) = px;
    (r + g + b) / 3.0 < 64.0
}

// HSV conversion
//------------------------------------------------------------------------------
// All components in [0, 1]

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }

    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let v = maxc;
    if minc == maxc {
        return (0.0, 0.0, v);
    }

    let d = maxc - minc;
    let s = d / maxc;
    let rc = (maxc - r) / d;
    let gc = (maxc - g) / d;
    let bc = (maxc - b) / d;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((h / 6.0).rem_euclid(1.0), s, v)
}

#[cfg(test)]
mod color_tests {
    use super::{
        classify, hsv_to_rgb, hue_color, is_black, is_colored, is_dark, rgb_to_hsv, BLACK, WHITE,
    };
    use image::Rgb;
    use test_case::test_case;

    fn to_f64(px: Rgb<u8>) -> Rgb<f64> {
        Rgb(px.0.map(|c| c as f64))
    }

    #[test_case(0, Rgb([255, 0, 0]))]
    #[test_case(85, Rgb([0, 255, 0]))]
    #[test_case(170, Rgb([0, 0, 255]))]
    #[test_case(10, Rgb([255, 60, 0]))]
    fn test_hue_color(value: u8, exp: Rgb<u8>) {
        assert_eq!(hue_color(value), exp);
    }

    #[test]
    fn test_hue_round_trip() {
        for v in 1..=254u8 {
            assert_eq!(classify(to_f64(hue_color(v))), v, "value {v}");
        }
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(classify(to_f64(BLACK)), 0);
        assert_eq!(classify(to_f64(WHITE)), 0);
        assert_eq!(classify(Rgb([240.0, 240.0, 235.0])), 0);
        // Full circle wraps to red, which reads back as 0
        assert_eq!(classify(to_f64(hue_color(255))), 0);
    }

    #[test]
    fn test_predicates() {
        assert!(is_dark(to_f64(BLACK)));
        assert!(!is_dark(to_f64(WHITE)));
        assert!(is_colored(to_f64(hue_color(10))));
        assert!(!is_colored(to_f64(WHITE)));
        assert!(!is_colored(to_f64(BLACK)));
        assert!(is_black(to_f64(BLACK)));
        assert!(is_dark(to_f64(hue_color(0))));
        assert!(!is_black(to_f64(hue_color(0))));
        assert!(!is_black(to_f64(hue_color(170))));
    }

    #[test]
    fn test_hsv_inverse() {
        let (r, g, b) = hsv_to_rgb(0.3, 0.7, 0.9);
        let (h, s, v) = rgb_to_hsv(r, g, b);
        assert!((h - 0.3).abs() < 1e-9);
        assert!((s - 0.7).abs() < 1e-9);
        assert!((v - 0.9).abs() < 1e-9);
    }
}
