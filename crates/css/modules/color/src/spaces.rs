//! Color space conversions.
//! Spec: <https://www.w3.org/TR/css-color-4/#color-conversion-code>
//! Spec: <https://bottosson.github.io/posts/oklab/>

type Matrix = [[f64; 3]; 3];
type Triple = [f64; 3];

const LINEAR_SRGB_TO_XYZ: Matrix = [
    [0.412_390_799_265_959_34, 0.357_584_339_383_878, 0.180_480_788_401_834_3],
    [0.212_639_005_871_510_27, 0.715_168_678_767_756, 0.072_192_315_360_733_71],
    [0.019_330_818_715_591_82, 0.119_194_779_794_625_98, 0.950_532_152_249_660_7],
];

const XYZ_TO_LINEAR_SRGB: Matrix = [
    [3.240_969_941_904_522_6, -1.537_383_177_570_094, -0.498_610_760_293_003_4],
    [-0.969_243_636_280_879_6, 1.875_967_501_507_720_2, 0.041_555_057_407_175_59],
    [0.055_630_079_696_993_66, -0.203_976_958_888_976_52, 1.056_971_514_242_878_6],
];

const LINEAR_P3_TO_XYZ: Matrix = [
    [0.486_570_948_648_216_2, 0.265_667_693_169_093_06, 0.198_217_285_234_362_5],
    [0.228_974_564_069_748_8, 0.691_738_521_836_506_4, 0.079_286_914_093_745],
    [0.0, 0.045_113_381_858_902_64, 1.043_944_368_900_976],
];

const D65_TO_D50: Matrix = [
    [1.047_929_820_840_548_8, 0.022_946_793_341_019_088, -0.050_192_229_543_135_57],
    [0.029_627_815_688_159_344, 0.990_434_484_573_249, -0.017_073_825_029_385_14],
    [-0.009_243_058_152_591_178, 0.015_055_144_896_577_895, 0.751_874_289_958_000_8],
];

const D50_TO_D65: Matrix = [
    [0.955_473_452_704_218_2, -0.023_098_536_874_261_423, 0.063_259_308_661_021_7],
    [-0.028_369_706_963_208_136, 1.009_995_458_005_822_6, 0.021_041_398_966_943_008],
    [0.012_314_001_688_319_899, -0.020_507_696_433_477_912, 1.330_365_936_608_075_3],
];

const D50_WHITE: Triple = [0.964_295_676_429_567_7, 1.0, 0.825_104_602_510_460_2];

/// CIE κ and ε.
const KAPPA: f64 = 24_389.0 / 27.0;
const EPSILON: f64 = 216.0 / 24_389.0;

fn multiply(matrix: &Matrix, vector: Triple) -> Triple {
    let row = |index: usize| {
        let coefficients = matrix[index];
        coefficients[0] * vector[0] + coefficients[1] * vector[1] + coefficients[2] * vector[2]
    };
    [row(0), row(1), row(2)]
}

/// sRGB transfer function, inverse direction.
fn to_linear(channel: f64) -> f64 {
    let magnitude = channel.abs();
    if magnitude <= 0.040_45 {
        channel / 12.92
    } else {
        channel.signum() * ((magnitude + 0.055) / 1.055).powf(2.4)
    }
}

fn to_gamma(channel: f64) -> f64 {
    let magnitude = channel.abs();
    if magnitude > 0.003_130_8 {
        channel.signum() * (1.055 * magnitude.powf(1.0 / 2.4) - 0.055)
    } else {
        channel * 12.92
    }
}

pub(crate) fn srgb_to_linear(rgb: Triple) -> Triple {
    rgb.map(to_linear)
}

pub(crate) fn linear_to_srgb(rgb: Triple) -> Triple {
    rgb.map(to_gamma)
}

pub(crate) fn xyz_d65_to_srgb(xyz: Triple) -> Triple {
    linear_to_srgb(multiply(&XYZ_TO_LINEAR_SRGB, xyz))
}

pub(crate) fn srgb_to_xyz_d65(rgb: Triple) -> Triple {
    multiply(&LINEAR_SRGB_TO_XYZ, srgb_to_linear(rgb))
}

pub(crate) fn xyz_d50_to_d65(xyz: Triple) -> Triple {
    multiply(&D50_TO_D65, xyz)
}

pub(crate) fn xyz_d65_to_d50(xyz: Triple) -> Triple {
    multiply(&D65_TO_D50, xyz)
}

pub(crate) fn display_p3_to_srgb(rgb: Triple) -> Triple {
    xyz_d65_to_srgb(multiply(&LINEAR_P3_TO_XYZ, srgb_to_linear(rgb)))
}

/// CIE Lab (D50) to XYZ D50.
pub(crate) fn lab_to_xyz_d50([lightness, a_axis, b_axis]: Triple) -> Triple {
    let f1 = (lightness + 16.0) / 116.0;
    let f0 = a_axis / 500.0 + f1;
    let f2 = f1 - b_axis / 200.0;
    let x = if f0.powi(3) > EPSILON {
        f0.powi(3)
    } else {
        (116.0 * f0 - 16.0) / KAPPA
    };
    let y = if lightness > KAPPA * EPSILON {
        f1.powi(3)
    } else {
        lightness / KAPPA
    };
    let z = if f2.powi(3) > EPSILON {
        f2.powi(3)
    } else {
        (116.0 * f2 - 16.0) / KAPPA
    };
    [x * D50_WHITE[0], y * D50_WHITE[1], z * D50_WHITE[2]]
}

pub(crate) fn xyz_d50_to_lab(xyz: Triple) -> Triple {
    let scaled = [xyz[0] / D50_WHITE[0], xyz[1] / D50_WHITE[1], xyz[2] / D50_WHITE[2]];
    let [fx, fy, fz] = scaled.map(|value| {
        if value > EPSILON {
            value.cbrt()
        } else {
            (KAPPA * value + 16.0) / 116.0
        }
    });
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

pub(crate) fn oklab_to_linear_srgb([lightness, a_axis, b_axis]: Triple) -> Triple {
    let long = (lightness + 0.396_337_777_4 * a_axis + 0.215_803_757_3 * b_axis).powi(3);
    let medium = (lightness - 0.105_561_345_8 * a_axis - 0.063_854_172_8 * b_axis).powi(3);
    let short = (lightness - 0.089_484_177_5 * a_axis - 1.291_485_548 * b_axis).powi(3);
    [
        4.076_741_662_1 * long - 3.307_711_591_3 * medium + 0.230_969_929_2 * short,
        -1.268_438_004_6 * long + 2.609_757_401_1 * medium - 0.341_319_396_5 * short,
        -0.004_196_086_3 * long - 0.703_418_614_7 * medium + 1.707_614_701 * short,
    ]
}

pub(crate) fn linear_srgb_to_oklab([red, green, blue]: Triple) -> Triple {
    let long = (0.412_221_470_8 * red + 0.536_332_536_3 * green + 0.051_445_992_9 * blue).cbrt();
    let medium = (0.211_903_498_2 * red + 0.680_699_545_1 * green + 0.107_396_956_6 * blue).cbrt();
    let short = (0.088_302_461_9 * red + 0.281_718_837_6 * green + 0.629_978_700_5 * blue).cbrt();
    [
        0.210_454_255_3 * long + 0.793_617_785 * medium - 0.004_072_046_8 * short,
        1.977_998_495_1 * long - 2.428_592_205 * medium + 0.450_593_709_9 * short,
        0.025_904_037_1 * long + 0.782_771_766_2 * medium - 0.808_675_766 * short,
    ]
}

/// Polar (lightness, chroma, hue°) to rectangular (lightness, a, b).
pub(crate) fn polar_to_rectangular([lightness, chroma, hue]: Triple) -> Triple {
    let radians = hue.to_radians();
    [lightness, chroma * radians.cos(), chroma * radians.sin()]
}

pub(crate) fn rectangular_to_polar([lightness, a_axis, b_axis]: Triple) -> Triple {
    let chroma = a_axis.hypot(b_axis);
    let hue = if chroma < 1e-6 {
        0.0
    } else {
        b_axis.atan2(a_axis).to_degrees().rem_euclid(360.0)
    };
    [lightness, chroma, hue]
}

/// `hsl()` to sRGB, with saturation and lightness in `0..=1`.
pub(crate) fn hsl_to_srgb([hue, saturation, lightness]: Triple) -> Triple {
    let hue = hue.rem_euclid(360.0);
    let amount = saturation * lightness.min(1.0 - lightness);
    let channel = |offset: f64| {
        let sector = (offset + hue / 30.0) % 12.0;
        lightness - amount * (sector - 3.0).min(9.0 - sector).clamp(-1.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}

pub(crate) fn srgb_to_hsl([red, green, blue]: Triple) -> Triple {
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let lightness = f64::midpoint(max, min);
    let delta = max - min;
    if delta.abs() < 1e-9 {
        return [0.0, 0.0, lightness];
    }
    let saturation = if lightness <= 0.0 || lightness >= 1.0 {
        0.0
    } else {
        (max - lightness) / lightness.min(1.0 - lightness)
    };
    let hue = if red >= green && red >= blue {
        (green - blue) / delta + if green < blue { 6.0 } else { 0.0 }
    } else if green >= blue {
        (blue - red) / delta + 2.0
    } else {
        (red - green) / delta + 4.0
    };
    [hue * 60.0, saturation, lightness]
}

/// `hwb()` to sRGB, with whiteness and blackness in `0..=1`.
pub(crate) fn hwb_to_srgb([hue, whiteness, blackness]: Triple) -> Triple {
    if whiteness + blackness >= 1.0 {
        let gray = whiteness / (whiteness + blackness);
        return [gray, gray, gray];
    }
    hsl_to_srgb([hue, 1.0, 0.5]).map(|channel| channel * (1.0 - whiteness - blackness) + whiteness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: Triple, right: Triple) -> bool {
        left.iter().zip(right).all(|(expected, actual)| (expected - actual).abs() < 1e-3)
    }

    #[test]
    fn oklab_round_trip() {
        let rgb = [0.2, 0.5, 0.8];
        let back = linear_to_srgb(oklab_to_linear_srgb(linear_srgb_to_oklab(srgb_to_linear(rgb))));
        assert!(close(rgb, back));
    }

    #[test]
    fn lab_round_trip() {
        let rgb = [0.9, 0.1, 0.3];
        let lab = xyz_d50_to_lab(xyz_d65_to_d50(srgb_to_xyz_d65(rgb)));
        let back = xyz_d65_to_srgb(xyz_d50_to_d65(lab_to_xyz_d50(lab)));
        assert!(close(rgb, back));
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_srgb([0.0, 1.0, 0.5]), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_srgb([120.0, 1.0, 0.5]), [0.0, 1.0, 0.0]));
        assert!(close(hwb_to_srgb([0.0, 0.6, 0.6]), [0.5, 0.5, 0.5]));
        assert!(close(srgb_to_hsl([1.0, 0.0, 0.0]), [0.0, 1.0, 0.5]));
    }
}
