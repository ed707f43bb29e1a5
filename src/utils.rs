// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions.

use std::{fs::OpenOptions, io::Write, time::Duration};

pub fn xor_in_place(a: &mut [u64], b: &[u64]) {
    for (b1, b2) in a.iter_mut().zip(b.iter()) {
        *b1 ^= *b2;
    }
}

/// Print a line and append it to the result file.
pub fn write_and_print(line: impl AsRef<str>, file_path: &str) -> std::io::Result<()> {
    let line = line.as_ref();
    println!("{}", line);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    writeln!(file, "{}", line)
}

/// Format a duration into a short pretty String.
/// e.g. 1.5 s is "1.500 s", 2.25 ms is "2.250 ms"
pub fn format_elapsed_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m {:.1} s", (secs / 60.0).floor(), secs % 60.0)
    } else if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else {
        format!("{:.3} us", secs * 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_words() {
        let mut a = [0b1100u64, u64::MAX];
        xor_in_place(&mut a, &[0b1010, 1]);
        assert_eq!(a, [0b0110, u64::MAX - 1]);
    }

    #[test]
    fn elapsed_time_units() {
        assert_eq!(format_elapsed_time(Duration::from_millis(1500)), "1.500 s");
        assert_eq!(format_elapsed_time(Duration::from_micros(2250)), "2.250 ms");
        assert_eq!(format_elapsed_time(Duration::from_nanos(1500)), "1.500 us");
        assert_eq!(format_elapsed_time(Duration::from_secs(90)), "1m 30.0 s");
    }
}
