use std::fmt::Display;

// Shapes are stored with 7 decimal digits
const QUANT_DIGITS: u32 = 7;
const QUANT: f64 = 1e-7;

/// One number of a stored shape: either a (quantized) sample or derivative,
/// or the repeat count following two equal derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeWord {
    Value(i64),
    Count(u64),
}

impl Display for ShapeWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeWord::Count(n) => write!(f, "{n}"),
            ShapeWord::Value(q) => {
                let sign = if *q < 0 { "-" } else { "" };
                let scale = 10u64.pow(QUANT_DIGITS);
                let (int, frac) = (q.unsigned_abs() / scale, q.unsigned_abs() % scale);
                if frac == 0 {
                    write!(f, "{sign}{int}")
                } else {
                    let digits = format!("{frac:0width$}", width = QUANT_DIGITS as usize);
                    write!(f, "{sign}{int}.{}", digits.trim_end_matches('0'))
                }
            }
        }
    }
}

/// Shape as written to the `[SHAPES]` section. If `data` is shorter than
/// `num_samples` it is run-length encoded derivative data, otherwise the
/// samples themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedShape {
    pub num_samples: usize,
    pub data: Vec<ShapeWord>,
}

/// Pulseq shape compression: differentiate, then replace runs of equal
/// derivatives by two copies followed by the number of further repeats.
pub fn compress_shape(waveform: &[f64]) -> CompressedShape {
    let samples: Vec<i64> = waveform.iter().map(|x| (x / QUANT).round() as i64).collect();

    let deriv: Vec<i64> = samples
        .iter()
        .scan(0, |prev, &x| {
            let d = x - *prev;
            *prev = x;
            Some(d)
        })
        .collect();

    let mut data = Vec::new();
    let mut i = 0;
    while i < deriv.len() {
        let value = deriv[i];
        let run = deriv[i..].iter().take_while(|&&d| d == value).count();
        data.push(ShapeWord::Value(value));
        if run > 1 {
            data.push(ShapeWord::Value(value));
            data.push(ShapeWord::Count((run - 2) as u64));
        }
        i += run;
    }

    if data.len() >= samples.len() {
        data = samples.into_iter().map(ShapeWord::Value).collect();
    }

    CompressedShape {
        num_samples: waveform.len(),
        data,
    }
}

#[cfg(test)]
fn decompress_shape(shape: &CompressedShape) -> Vec<i64> {
    let words = shape.data.iter().map(|w| match *w {
        ShapeWord::Value(v) => v,
        ShapeWord::Count(n) => n as i64,
    });
    if shape.data.len() == shape.num_samples {
        return words.collect();
    }

    let mut deriv = Vec::with_capacity(shape.num_samples);
    // The two samples before the current one, to detect RLE
    let mut a = i64::MIN;
    let mut b = i64::MAX;
    // After a detected RLE, skip the RLE check for two samples
    let mut skip = 0;

    for sample in words {
        if a == b && skip == 0 {
            skip = 2;
            for _ in 0..sample {
                deriv.push(b);
            }
        } else {
            skip = skip.max(1) - 1;
            deriv.push(sample);
        }
        a = b;
        b = sample;
    }
    assert_eq!(deriv.len(), shape.num_samples);

    deriv
        .into_iter()
        .scan(0, |acc, x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn quantized(waveform: &[f64]) -> Vec<i64> {
        waveform.iter().map(|x| (x / QUANT).round() as i64).collect()
    }

    #[test]
    fn ramp_compresses_to_four_words() {
        let ramp: Vec<f64> = (0..100).map(|i| i as f64 * 0.01).collect();
        let shape = compress_shape(&ramp);
        check!(shape.data.len() == 4);
        check!(decompress_shape(&shape) == quantized(&ramp));
    }

    #[test]
    fn random_piecewise_constant_shapes() {
        for _ in 0..200 {
            let mut waveform = Vec::new();
            while waveform.len() < 300 {
                let level = rand::random::<f64>() * 2.0 - 1.0;
                let run = rand::random::<usize>() % 6 + 1;
                waveform.extend(std::iter::repeat(level).take(run));
            }
            let shape = compress_shape(&waveform);
            check!(shape.num_samples == waveform.len());
            check!(decompress_shape(&shape) == quantized(&waveform));
        }
    }

    #[test]
    fn noisy_shape_is_stored_uncompressed() {
        let waveform: Vec<f64> = (0..50).map(|_| rand::random::<f64>()).collect();
        let shape = compress_shape(&waveform);
        check!(shape.data.len() == 50);
        check!(decompress_shape(&shape) == quantized(&waveform));
    }

    #[test]
    fn words_are_printed_as_decimals() {
        check!(ShapeWord::Value(0).to_string() == "0");
        check!(ShapeWord::Value(10_000_000).to_string() == "1");
        check!(ShapeWord::Value(-5_000_000).to_string() == "-0.5");
        check!(ShapeWord::Value(3).to_string() == "0.0000003");
        check!(ShapeWord::Value(-12_345_678).to_string() == "-1.2345678");
        check!(ShapeWord::Count(42).to_string() == "42");
    }
}
